//! Entity CRUD handlers: list, read, create, update, delete.

use crate::case;
use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::query::{IncludeRegistry, ListQuery};
use crate::repository::{EntityId, PgRepository, Repository};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn repository(state: &AppState, path_segment: &str) -> Result<PgRepository, AppError> {
    PgRepository::for_entity(state.pool.clone(), state.model.clone(), path_segment)
}

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => {
            let map = m.into_iter().collect();
            Ok(case::hashmap_keys_to_snake_case(&map))
        }
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Coerce a raw query-string value to the column's JSON type so uuid, int,
/// and bool filters bind correctly.
fn query_value_for_column(entity: &ResolvedEntity, col: &str, s: &str) -> Value {
    let raw_type = entity.column(col).map(|c| c.raw_type.as_str()).unwrap_or("");
    if raw_type.contains("uuid") {
        if let Ok(u) = uuid::Uuid::parse_str(s) {
            return Value::String(u.to_string());
        }
    }
    if raw_type.contains("int") || raw_type.contains("serial") {
        if let Ok(n) = s.parse::<i64>() {
            return Value::Number(n.into());
        }
    }
    if raw_type.starts_with("bool") {
        if s.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
    }
    Value::String(s.to_string())
}

/// Strip configured sensitive columns and camelCase keys for the client.
fn present(entity: &ResolvedEntity, mut row: Value) -> Value {
    if let Value::Object(ref mut map) = row {
        for col in &entity.sensitive_columns {
            map.remove(col);
        }
    }
    case::value_keys_to_camel_case_recursive(&mut row);
    row
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let repo = repository(&state, &path_segment)?;
    let entity = repo.entity();
    if !entity.allows("read") {
        return Err(AppError::BadRequest("read not allowed".into()));
    }

    let registry = IncludeRegistry::for_entity(entity);
    let mut query = ListQuery::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => {
                query.limit = v.parse().ok();
            }
            "offset" => {
                query.offset = v.parse().ok();
            }
            "include" => {
                registry.apply_all(&mut query, v.split(','))?;
            }
            _ => {
                let col = case::to_snake_case(&k);
                if entity.column(&col).is_some() {
                    let val = query_value_for_column(entity, &col, &v);
                    query.filters.push((col, val));
                }
            }
        }
    }

    let rows = repo.list(&query).await?;
    let entity = repo.entity();
    let rows: Vec<Value> = rows.into_iter().map(|r| present(entity, r)).collect();
    Ok(crate::response::success_many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let repo = repository(&state, &path_segment)?;
    if !repo.entity().allows("create") {
        return Err(AppError::BadRequest("create not allowed".into()));
    }
    let body = body_to_map(body)?;
    let row = repo.create(&body).await?;
    let row = present(repo.entity(), row);
    Ok(crate::response::created_one(row))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let repo = repository(&state, &path_segment)?;
    if !repo.entity().allows("read") {
        return Err(AppError::BadRequest("read not allowed".into()));
    }
    let id = EntityId::parse(&id_str, repo.entity().pk_type)?;
    let row = repo.find(&id).await?;
    let row = present(repo.entity(), row);
    Ok(crate::response::success_one(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let repo = repository(&state, &path_segment)?;
    if !repo.entity().allows("update") {
        return Err(AppError::BadRequest("update not allowed".into()));
    }
    let id = EntityId::parse(&id_str, repo.entity().pk_type)?;
    let body = body_to_map(body)?;
    repo.update(&body, &id).await?;
    let row = repo.find(&id).await?;
    let row = present(repo.entity(), row);
    Ok(crate::response::success_one(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let repo = repository(&state, &path_segment)?;
    if !repo.entity().allows("delete") {
        return Err(AppError::BadRequest("delete not allowed".into()));
    }
    let id = EntityId::parse(&id_str, repo.entity().pk_type)?;
    repo.delete(&id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
