//! PostgreSQL repository: generic CRUD execution against the resolved model.

use crate::config::{ResolvedEntity, ResolvedModel};
use crate::error::AppError;
use crate::query::ListQuery;
use crate::repository::{EntityId, Repository};
use crate::service::RequestValidator;
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

/// CRUD facade for one entity, backed by a shared pool and the resolved
/// model. Cheap to construct; holds no per-call state.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
    model: Arc<ResolvedModel>,
    path: String,
}

impl PgRepository {
    /// Repository for the entity mounted at `path` (e.g. "proposals").
    pub fn for_entity(
        pool: PgPool,
        model: Arc<ResolvedModel>,
        path: &str,
    ) -> Result<Self, AppError> {
        if model.entity_by_path(path).is_none() {
            return Err(AppError::NotFound(path.to_string()));
        }
        Ok(PgRepository {
            pool,
            model,
            path: path.to_string(),
        })
    }

    pub fn entity(&self) -> &ResolvedEntity {
        // Presence checked in for_entity; the model is immutable afterwards.
        self.model
            .entity_by_path(&self.path)
            .unwrap_or_else(|| unreachable!("entity '{}' vanished from model", self.path))
    }

    /// List rows with filters, paging (default 100, max 1000), and the
    /// includes attached to the query.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, AppError> {
        let entity = self.entity();
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = query.offset.unwrap_or(0);
        let includes = query.include_selects(&self.model)?;
        let q = if includes.is_empty() {
            sql::select_list(entity, &query.filters, Some(limit), Some(offset))
        } else {
            sql::select_list_with_includes(entity, &query.filters, Some(limit), Some(offset), &includes)
        };
        self.query_many(&q).await
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_optional(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(row_to_json))
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn all(&self) -> Result<Vec<Value>, AppError> {
        let q = sql::select_list(self.entity(), &[], None, None);
        self.query_many(&q).await
    }

    async fn find(&self, id: &EntityId) -> Result<Value, AppError> {
        let entity = self.entity();
        let mut q = sql::select_by_id(entity);
        q.params.push(id.to_value());
        self.query_optional(&q)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", entity.path_segment, id)))
    }

    async fn create(&self, data: &HashMap<String, Value>) -> Result<Value, AppError> {
        let entity = self.entity();
        RequestValidator::validate(data, &entity.validation)?;
        let include_pk = data.contains_key(&entity.pk_column);
        let q = sql::insert(entity, data, include_pk);
        self.query_optional(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, data: &HashMap<String, Value>, id: &EntityId) -> Result<bool, AppError> {
        let entity = self.entity();
        RequestValidator::validate_partial(data, &entity.validation)?;
        let has_sets = entity
            .columns
            .iter()
            .any(|c| !c.is_pk && data.contains_key(&c.name));
        let q = sql::update(entity, &id.to_value(), data);
        let row = self.query_optional(&q).await?;
        match row {
            // The no-op body degrades to a SELECT: the row exists but
            // nothing was modified.
            Some(_) => Ok(has_sets),
            None => Err(AppError::NotFound(format!("{}/{}", entity.path_segment, id))),
        }
    }

    async fn delete(&self, id: &EntityId) -> Result<u64, AppError> {
        let mut q = sql::delete(self.entity());
        q.params.push(id.to_value());
        self.execute(&q).await
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
