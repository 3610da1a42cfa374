//! Build the resolved model from raw config, and load raw config from a
//! directory of JSON files.

use crate::config::resolved::{ColumnInfo, IncludeDirection, IncludeSpec, PkType, ResolvedEntity, ResolvedModel};
use crate::config::types::*;
use crate::config::{default_schema_id, validate};
use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Build resolved model from full config (validates first).
pub fn resolve(config: &FullConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;
    let default_sid = default_schema_id(config)?;

    let schemas_by_id: HashMap<_, _> = config.schemas.iter().map(|s| (s.id.as_str(), s)).collect();
    let tables_by_id: HashMap<_, _> = config.tables.iter().map(|t| (t.id.as_str(), t)).collect();
    let columns_by_table: HashMap<_, Vec<&ColumnConfig>> =
        config.columns.iter().fold(HashMap::new(), |mut m, c| {
            m.entry(c.table_id.as_str()).or_default().push(c);
            m
        });
    let column_id_to_name: HashMap<&str, &str> =
        config.columns.iter().map(|c| (c.id.as_str(), c.name.as_str())).collect();
    let table_id_to_path: HashMap<&str, &str> = config
        .api_entities
        .iter()
        .map(|api| (api.entity_id.as_str(), api.path_segment.as_str()))
        .collect();

    let mut entities = Vec::new();
    let mut entity_by_path = HashMap::new();

    for api in &config.api_entities {
        let table = tables_by_id
            .get(api.entity_id.as_str())
            .ok_or_else(|| ConfigError::MissingReference {
                kind: "table",
                id: api.entity_id.clone(),
            })?;
        let table_sid = table.schema_id.as_deref().unwrap_or(default_sid);
        let schema = schemas_by_id
            .get(table_sid)
            .ok_or_else(|| ConfigError::MissingReference {
                kind: "schema",
                id: table_sid.to_string(),
            })?;
        let table_columns = columns_by_table
            .get(table.id.as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let pk_col = table_columns
            .iter()
            .find(|c| c.name == table.primary_key)
            .ok_or_else(|| ConfigError::InvalidPrimaryKey {
                table_id: table.id.clone(),
                column: table.primary_key.clone(),
            })?;
        let pk_type = infer_pk_type(pk_col);

        let mut columns: Vec<ColumnInfo> = table_columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                is_pk: c.name == table.primary_key,
                nullable: c.nullable,
                has_default: c.default.is_some(),
                raw_type: c.type_.to_lowercase(),
                pg_type: cast_type_name(&c.type_),
            })
            .collect();

        // Timestamp columns injected by the migration layer when config omits them.
        let config_col_names: HashSet<String> = columns.iter().map(|c| c.name.clone()).collect();
        for (name, nullable, has_default) in [
            ("created_at", false, true),
            ("updated_at", false, true),
        ] {
            if !config_col_names.contains(name) {
                columns.push(ColumnInfo {
                    name: name.to_string(),
                    is_pk: false,
                    nullable,
                    has_default,
                    raw_type: "timestamptz".into(),
                    pg_type: Some("timestamptz".into()),
                });
            }
        }

        let includes = build_includes_for_table(
            &table.id,
            &config.relationships,
            &column_id_to_name,
            &table_id_to_path,
        );
        let entity = ResolvedEntity {
            table_id: table.id.clone(),
            schema_name: schema.name.clone(),
            table_name: table.name.clone(),
            path_segment: api.path_segment.clone(),
            pk_column: table.primary_key.clone(),
            pk_type,
            columns,
            operations: api.operations.clone(),
            sensitive_columns: api.sensitive_columns.iter().cloned().collect(),
            includes,
            noop_includes: api.noop_includes.clone(),
            validation: api.validation.clone(),
        };
        entity_by_path.insert(api.path_segment.clone(), entity.clone());
        entities.push(entity);
    }

    Ok(ResolvedModel {
        entities,
        entity_by_path,
    })
}

/// Relation includes for one table: to_one where it holds the FK, to_many
/// where another API entity points at it. Relationships touching tables with
/// no API entity are skipped (nothing to include).
fn build_includes_for_table(
    our_table_id: &str,
    relationships: &[RelationshipConfig],
    column_id_to_name: &HashMap<&str, &str>,
    table_id_to_path: &HashMap<&str, &str>,
) -> Vec<IncludeSpec> {
    let mut includes = Vec::new();
    for rel in relationships {
        let from_col = column_id_to_name.get(rel.from_column_id.as_str()).map(|s| s.to_string());
        let to_col = column_id_to_name.get(rel.to_column_id.as_str()).map(|s| s.to_string());
        let from_path = table_id_to_path.get(rel.from_table_id.as_str()).map(|s| s.to_string());
        let to_path = table_id_to_path.get(rel.to_table_id.as_str()).map(|s| s.to_string());
        if rel.from_table_id == our_table_id {
            if let (Some(our_key), Some(their_key), Some(related_path)) =
                (from_col.clone(), to_col.clone(), to_path)
            {
                includes.push(IncludeSpec {
                    name: related_path.clone(),
                    direction: IncludeDirection::ToOne,
                    related_path_segment: related_path,
                    our_key_column: our_key,
                    their_key_column: their_key,
                });
            }
        }
        if rel.to_table_id == our_table_id {
            if let (Some(our_key), Some(their_key), Some(related_path)) =
                (to_col, from_col, from_path)
            {
                includes.push(IncludeSpec {
                    name: related_path.clone(),
                    direction: IncludeDirection::ToMany,
                    related_path_segment: related_path,
                    our_key_column: our_key,
                    their_key_column: their_key,
                });
            }
        }
    }
    includes
}

/// Type name for SQL casts when binding string values; None means no cast.
fn cast_type_name(type_: &str) -> Option<String> {
    let lower = type_.to_lowercase();
    if lower == "timestamptz" || lower == "timestamp with time zone" {
        Some("timestamptz".into())
    } else if lower == "timestamp" || lower.starts_with("timestamp ") {
        Some("timestamp".into())
    } else if lower == "date" {
        Some("date".into())
    } else if lower.contains("uuid") {
        Some("uuid".into())
    } else if lower == "numeric" || lower.starts_with("numeric(") {
        Some("numeric".into())
    } else {
        None
    }
}

fn infer_pk_type(col: &ColumnConfig) -> PkType {
    let type_lower = col.type_.to_lowercase();
    if type_lower.contains("uuid") {
        PkType::Uuid
    } else if type_lower.contains("bigserial") || type_lower.contains("bigint") {
        PkType::BigInt
    } else if type_lower.contains("serial") || type_lower.contains("int") {
        PkType::Int
    } else {
        PkType::Text
    }
}

/// Load full config from a directory of JSON files: schemas.json, tables.json,
/// columns.json, relationships.json, api_entities.json. Missing
/// api_entities.json is treated as empty.
pub async fn load_from_dir(dir: impl AsRef<Path>) -> Result<FullConfig, ConfigError> {
    let dir = dir.as_ref();
    Ok(FullConfig {
        schemas: load_json_file(&dir.join("schemas.json")).await?,
        tables: load_json_file(&dir.join("tables.json")).await?,
        columns: load_json_file(&dir.join("columns.json")).await?,
        relationships: load_json_file(&dir.join("relationships.json")).await?,
        api_entities: load_json_file_or_default(&dir.join("api_entities.json")).await?,
    })
}

async fn load_json_file<T>(path: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

async fn load_json_file_or_default<T>(path: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => {
            serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
        }
        Err(_) => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_fixtures::catalyst_config;

    #[test]
    fn resolves_catalyst_entities() {
        let model = resolve(&catalyst_config()).unwrap();
        let proposals = model.entity_by_path("proposals").unwrap();
        assert_eq!(proposals.table_name, "proposals");
        assert_eq!(proposals.pk_column, "id");
        assert_eq!(proposals.pk_type, PkType::Uuid);
        assert!(proposals.column("created_at").is_some());
        assert!(proposals.column("updated_at").is_some());
    }

    #[test]
    fn derives_includes_from_relationships() {
        let model = resolve(&catalyst_config()).unwrap();
        let proposals = model.entity_by_path("proposals").unwrap();

        let fund = proposals.includes.iter().find(|i| i.name == "funds").unwrap();
        assert_eq!(fund.direction, IncludeDirection::ToOne);
        assert_eq!(fund.our_key_column, "fund_id");
        assert_eq!(fund.their_key_column, "id");

        let reviews = proposals.includes.iter().find(|i| i.name == "reviews").unwrap();
        assert_eq!(reviews.direction, IncludeDirection::ToMany);
        assert_eq!(reviews.our_key_column, "id");
        assert_eq!(reviews.their_key_column, "proposal_id");
    }

    #[test]
    fn carries_noop_include_names() {
        let model = resolve(&catalyst_config()).unwrap();
        let proposals = model.entity_by_path("proposals").unwrap();
        assert_eq!(proposals.noop_includes, vec!["ai_summary".to_string()]);
    }

    #[test]
    fn infers_pk_types() {
        assert_eq!(
            infer_pk_type(&ColumnConfig {
                id: "c".into(),
                table_id: "t".into(),
                name: "id".into(),
                type_: "BIGSERIAL".into(),
                nullable: false,
                default: None,
                comment: None,
            }),
            PkType::BigInt
        );
        assert_eq!(cast_type_name("TIMESTAMPTZ").as_deref(), Some("timestamptz"));
        assert_eq!(cast_type_name("text"), None);
    }
}
