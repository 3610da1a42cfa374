//! Resolved entity model: config validated and flattened for runtime use.

use crate::config::ValidationRule;
use std::collections::{HashMap, HashSet};

/// Direction of a relation include: to_one (we hold the FK) or to_many
/// (the related table holds a FK to us).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncludeDirection {
    ToOne,
    ToMany,
}

/// Spec for eager-loading a related entity in list responses. The name is the
/// related entity's path_segment (e.g. "fund", "reviews").
#[derive(Clone, Debug)]
pub struct IncludeSpec {
    pub name: String,
    pub direction: IncludeDirection,
    /// Path segment of the related entity (for lookup in the model).
    pub related_path_segment: String,
    /// Our column in the join (our FK for to_one; our PK for to_many).
    pub our_key_column: String,
    /// Their column in the join (their PK for to_one; their FK for to_many).
    pub their_key_column: String,
}

/// Primary key type for parsing path/body ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkType {
    Uuid,
    BigInt,
    Int,
    Text,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub is_pk: bool,
    pub nullable: bool,
    /// Whether the column has a DB default (e.g. gen_random_uuid(), NOW()).
    pub has_default: bool,
    /// Declared PostgreSQL type, lowercased (for query-value coercion).
    pub raw_type: String,
    /// PostgreSQL type name for SQL casts (e.g. "timestamptz") when binding
    /// string values.
    pub pg_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub table_id: String,
    pub schema_name: String,
    pub table_name: String,
    pub path_segment: String,
    pub pk_column: String,
    pub pk_type: PkType,
    pub columns: Vec<ColumnInfo>,
    pub operations: Vec<String>,
    /// Column names to strip from all API responses.
    pub sensitive_columns: HashSet<String>,
    /// Relation includes available for ?include=name1,name2, built from
    /// relationships.
    pub includes: Vec<IncludeSpec>,
    /// Names registered to the inert include handler.
    pub noop_includes: Vec<String>,
    pub validation: HashMap<String, ValidationRule>,
}

impl ResolvedEntity {
    pub fn allows(&self, operation: &str) -> bool {
        self.operations.iter().any(|o| o == operation)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub entities: Vec<ResolvedEntity>,
    pub entity_by_path: HashMap<String, ResolvedEntity>,
}

impl ResolvedModel {
    pub fn entity_by_path(&self, path: &str) -> Option<&ResolvedEntity> {
        self.entity_by_path.get(path)
    }
}
