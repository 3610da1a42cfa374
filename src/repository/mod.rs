//! Storage-engine-agnostic CRUD contract over one entity type.

mod pg;
pub use pg::PgRepository;

use crate::config::PkType;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Opaque entity identifier: integer or string, per the entity's primary-key
/// type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl EntityId {
    /// Parse a path-supplied id according to the entity's pk type.
    pub fn parse(raw: &str, pk_type: PkType) -> Result<Self, AppError> {
        match pk_type {
            PkType::Uuid => {
                let u = uuid::Uuid::parse_str(raw)
                    .map_err(|_| AppError::BadRequest("invalid uuid".into()))?;
                Ok(EntityId::Text(u.to_string()))
            }
            PkType::BigInt | PkType::Int => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| AppError::BadRequest("invalid id".into()))?;
                Ok(EntityId::Int(n))
            }
            PkType::Text => Ok(EntityId::Text(raw.to_string())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            EntityId::Int(n) => Value::Number((*n).into()),
            EntityId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Int(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

/// Uniform CRUD surface every entity repository implements. Stateless per
/// call: each operation is one storage-engine round trip, no caching.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Every row of the entity, ordered by primary key. Pagination, if any,
    /// is the caller's concern.
    async fn all(&self) -> Result<Vec<Value>, AppError>;

    /// One row by id. NotFound when the id does not exist.
    async fn find(&self, id: &EntityId) -> Result<Value, AppError>;

    /// Insert one row after validating against the entity's configured
    /// rules. Returns the stored row.
    async fn create(&self, data: &HashMap<String, Value>) -> Result<Value, AppError>;

    /// Update one row by id. NotFound when the id does not exist; true when
    /// exactly one row was modified.
    async fn update(&self, data: &HashMap<String, Value>, id: &EntityId) -> Result<bool, AppError>;

    /// Delete by id. Returns the number of rows removed (0 or 1); absent ids
    /// are not an error.
    async fn delete(&self, id: &EntityId) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_by_pk_type() {
        let id = EntityId::parse("42", PkType::BigInt).unwrap();
        assert_eq!(id, EntityId::Int(42));
        assert_eq!(id.to_value(), serde_json::json!(42));

        let id = EntityId::parse("gov-action-7", PkType::Text).unwrap();
        assert_eq!(id.to_string(), "gov-action-7");

        let uuid = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let id = EntityId::parse(uuid, PkType::Uuid).unwrap();
        assert_eq!(id, EntityId::Text(uuid.into()));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(matches!(
            EntityId::parse("not-a-uuid", PkType::Uuid),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            EntityId::parse("abc", PkType::Int),
            Err(AppError::BadRequest(_))
        ));
    }
}
