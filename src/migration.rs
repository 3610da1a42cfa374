//! Apply config to the database: DDL for schemas, tables, and foreign keys,
//! in PostgreSQL dependency order.

use crate::config::types::*;
use crate::config::{default_schema_id, validate, FullConfig};
use crate::error::AppError;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Apply full config to the database: CREATE SCHEMA, CREATE TABLE, ADD FK.
/// Validates config first. Idempotent: IF NOT EXISTS for schemas and tables,
/// FK creation failures on re-run are ignored.
pub async fn apply_migrations(pool: &PgPool, config: &FullConfig) -> Result<(), AppError> {
    validate(config)?;
    let default_sid = default_schema_id(config)?.to_string();

    let schemas_by_id: HashMap<_, _> = config.schemas.iter().map(|s| (s.id.as_str(), s)).collect();
    let tables_by_id: HashMap<_, _> = config.tables.iter().map(|t| (t.id.as_str(), t)).collect();
    let columns_by_table: HashMap<_, Vec<&ColumnConfig>> =
        config.columns.iter().fold(HashMap::new(), |mut m, c| {
            m.entry(c.table_id.as_str()).or_default().push(c);
            m
        });

    for s in &config.schemas {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote(&s.name)))
            .execute(pool)
            .await?;
    }

    for t in &config.tables {
        let sid = t.schema_id.as_deref().unwrap_or(&default_sid);
        let schema = schemas_by_id
            .get(sid)
            .ok_or_else(|| AppError::Config(crate::error::ConfigError::MissingReference {
                kind: "schema",
                id: sid.to_string(),
            }))?;
        let full_name = format!("{}.{}", quote(&schema.name), quote(&t.name));

        let cols = columns_by_table
            .get(t.id.as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut col_defs: Vec<String> = Vec::new();
        for c in cols {
            let mut def = format!("{} {}", quote(&c.name), c.type_);
            if !c.nullable {
                def.push_str(" NOT NULL");
            }
            if let Some(ref d) = c.default {
                def.push_str(" DEFAULT ");
                def.push_str(d);
            }
            col_defs.push(def);
        }

        let config_col_names: HashSet<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        for (name, def_suffix) in [
            ("created_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
            ("updated_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
        ] {
            if !config_col_names.contains(name) {
                col_defs.push(format!("{} {}", quote(name), def_suffix));
            }
        }

        col_defs.push(format!("PRIMARY KEY ({})", quote(&t.primary_key)));
        for u in &t.unique {
            let cols: Vec<String> = u.iter().map(|s| quote(s)).collect();
            col_defs.push(format!("UNIQUE ({})", cols.join(", ")));
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            full_name,
            col_defs.join(",\n  ")
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    for rel in &config.relationships {
        let from_table = tables_by_id.get(rel.from_table_id.as_str()).ok_or_else(|| {
            AppError::Config(crate::error::ConfigError::MissingReference {
                kind: "table",
                id: rel.from_table_id.clone(),
            })
        })?;
        let to_table = tables_by_id.get(rel.to_table_id.as_str()).ok_or_else(|| {
            AppError::Config(crate::error::ConfigError::MissingReference {
                kind: "table",
                id: rel.to_table_id.clone(),
            })
        })?;
        let from_col = column_name(config, &rel.from_column_id)?;
        let to_col = column_name(config, &rel.to_column_id)?;

        let from_full = qualified(&schemas_by_id, from_table, &default_sid)?;
        let to_full = qualified(&schemas_by_id, to_table, &default_sid)?;
        let constraint_name = rel.name.as_deref().unwrap_or(&rel.id);
        let on_update = rel.on_update.as_deref().unwrap_or("NO ACTION");
        let on_delete = rel.on_delete.as_deref().unwrap_or("NO ACTION");

        let sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {}",
            from_full,
            quote(constraint_name),
            quote(from_col),
            to_full,
            quote(to_col),
            on_update,
            on_delete
        );
        // Constraint already present on re-run.
        let _ = sqlx::query(&sql).execute(pool).await;
    }

    Ok(())
}

fn qualified(
    schemas_by_id: &HashMap<&str, &SchemaConfig>,
    table: &TableConfig,
    default_sid: &str,
) -> Result<String, AppError> {
    let sid = table.schema_id.as_deref().unwrap_or(default_sid);
    let schema = schemas_by_id
        .get(sid)
        .ok_or_else(|| AppError::Config(crate::error::ConfigError::MissingReference {
            kind: "schema",
            id: sid.to_string(),
        }))?;
    Ok(format!("{}.{}", quote(&schema.name), quote(&table.name)))
}

fn column_name<'a>(config: &'a FullConfig, column_id: &str) -> Result<&'a str, AppError> {
    config
        .columns
        .iter()
        .find(|c| c.id == column_id)
        .map(|c| c.name.as_str())
        .ok_or_else(|| {
            AppError::Config(crate::error::ConfigError::MissingReference {
                kind: "column",
                id: column_id.to_string(),
            })
        })
}
