//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a resolved entity.

use crate::config::{IncludeDirection, ResolvedEntity};
use serde_json::Value;
use std::collections::HashMap;

/// One relation include lowered for a single-query list: include name,
/// direction, related entity, our key column, their key column.
pub struct IncludeSelect<'a> {
    pub name: &'a str,
    pub direction: IncludeDirection,
    pub related: &'a ResolvedEntity,
    pub our_key: &'a str,
    pub their_key: &'a str,
}

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Fully qualified table name.
fn qualified_table(entity: &ResolvedEntity) -> String {
    format!("{}.{}", quoted(&entity.schema_name), quoted(&entity.table_name))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: each column as-is, except numeric as col::text so sqlx
/// returns String.
fn select_column_list(entity: &ResolvedEntity) -> String {
    entity
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            if c.pg_type.as_deref() == Some("numeric") {
                format!("{}::text", q)
            } else {
                q
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Placeholder with a SQL cast when the column type needs one (e.g.
/// $1::timestamptz) so string values bind correctly.
fn cast_placeholder(entity: &ResolvedEntity, column: &str, param_num: usize) -> String {
    entity
        .column(column)
        .and_then(|c| c.pg_type.as_deref())
        .map(|t| format!("${}::{}", param_num, t))
        .unwrap_or_else(|| format!("${}", param_num))
}

/// SELECT by primary key. Caller binds the id as the sole param.
pub fn select_by_id(entity: &ResolvedEntity) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols = select_column_list(entity);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        cols,
        qualified_table(entity),
        quoted(&entity.pk_column),
        cast_placeholder(entity, &entity.pk_column, 1)
    );
    q
}

/// SELECT list with optional filters (exact match per column), ORDER BY pk,
/// optional LIMIT/OFFSET. Filters on unknown columns are ignored.
pub fn select_list(
    entity: &ResolvedEntity,
    filters: &[(String, Value)],
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = filter_clause(entity, filters, &mut q, None);
    let cols = select_column_list(entity);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}{}",
        cols,
        qualified_table(entity),
        where_clause,
        quoted(&entity.pk_column),
        limit_clause(limit),
        offset_clause(offset)
    );
    q
}

/// SELECT list with includes in a single query: main table aliased as
/// "main", each include as a scalar subquery (json_agg for to_many,
/// row_to_json for to_one).
pub fn select_list_with_includes(
    entity: &ResolvedEntity,
    filters: &[(String, Value)],
    limit: Option<u32>,
    offset: Option<u32>,
    includes: &[IncludeSelect<'_>],
) -> QueryBuf {
    const MAIN_ALIAS: &str = "main";
    let mut q = QueryBuf::new();

    let mut select_parts: Vec<String> = entity
        .columns
        .iter()
        .map(|c| {
            let name = quoted(&c.name);
            let expr = if c.pg_type.as_deref() == Some("numeric") {
                format!("{}.{}::text", MAIN_ALIAS, name)
            } else {
                format!("{}.{}", MAIN_ALIAS, name)
            };
            format!("{} AS {}", expr, name)
        })
        .collect();

    for inc in includes {
        let rel_cols = select_column_list(inc.related);
        let sub_from = format!(
            "{} WHERE {} = {}.{}",
            qualified_table(inc.related),
            quoted(inc.their_key),
            MAIN_ALIAS,
            quoted(inc.our_key)
        );
        let subquery = match inc.direction {
            IncludeDirection::ToOne => format!(
                "(SELECT row_to_json(sub) FROM (SELECT {} FROM {}) sub)",
                rel_cols, sub_from
            ),
            IncludeDirection::ToMany => format!(
                "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM (SELECT {} FROM {}) sub)",
                rel_cols, sub_from
            ),
        };
        select_parts.push(format!("{} AS {}", subquery, quoted(inc.name)));
    }

    let where_clause = filter_clause(entity, filters, &mut q, Some(MAIN_ALIAS));
    q.sql = format!(
        "SELECT {} FROM {} {}{} ORDER BY {}.{}{}{}",
        select_parts.join(", "),
        qualified_table(entity),
        MAIN_ALIAS,
        where_clause,
        MAIN_ALIAS,
        quoted(&entity.pk_column),
        limit_clause(limit),
        offset_clause(offset)
    );
    q
}

/// INSERT: columns and placeholders from entity; values from body. Excludes
/// the PK unless the body supplies one. Omits columns with a DB default when
/// the body does not provide a value (so the DB fills it in).
pub fn insert(entity: &ResolvedEntity, body: &HashMap<String, Value>, include_pk: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &entity.columns {
        if c.is_pk && !include_pk {
            continue;
        }
        let val = body.get(&c.name).cloned();
        if val.is_none() && c.has_default {
            continue;
        }
        let param_num = q.push_param(val.unwrap_or(Value::Null));
        cols.push(quoted(&c.name));
        placeholders.push(cast_placeholder(entity, &c.name, param_num));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(entity),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(entity)
    );
    q
}

/// UPDATE by id: SET only columns present in body (and in entity columns),
/// plus updated_at. With nothing to set, degrades to a SELECT by id so the
/// caller still learns whether the row exists.
pub fn update(entity: &ResolvedEntity, id: &Value, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &entity.columns {
        if c.is_pk {
            continue;
        }
        let Some(v) = body.get(&c.name) else { continue };
        let param_num = q.push_param(v.clone());
        sets.push(format!(
            "{} = {}",
            quoted(&c.name),
            cast_placeholder(entity, &c.name, param_num)
        ));
    }
    if sets.is_empty() {
        let mut fallback = select_by_id(entity);
        fallback.params.push(id.clone());
        return fallback;
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified_table(entity),
        sets.join(", "),
        quoted(&entity.pk_column),
        cast_placeholder(entity, &entity.pk_column, id_param),
        select_column_list(entity)
    );
    q
}

/// DELETE by id. Caller binds the id as the sole param; rows_affected is the
/// delete count.
pub fn delete(entity: &ResolvedEntity) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        qualified_table(entity),
        quoted(&entity.pk_column),
        cast_placeholder(entity, &entity.pk_column, 1)
    );
    q
}

fn filter_clause(
    entity: &ResolvedEntity,
    filters: &[(String, Value)],
    q: &mut QueryBuf,
    alias: Option<&str>,
) -> String {
    let mut parts = Vec::new();
    for (col, val) in filters {
        if entity.column(col).is_none() {
            continue;
        }
        let param_num = q.push_param(val.clone());
        let ph = cast_placeholder(entity, col, param_num);
        let lhs = match alias {
            Some(a) => format!("{}.{}", a, quoted(col)),
            None => quoted(col),
        };
        parts.push(format!("{} = {}", lhs, ph));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

fn limit_clause(limit: Option<u32>) -> String {
    limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default()
}

fn offset_clause(offset: Option<u32>) -> String {
    offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_fixtures::catalyst_config;
    use crate::config::{resolve, ResolvedModel};
    use serde_json::json;

    fn model() -> ResolvedModel {
        resolve(&catalyst_config()).unwrap()
    }

    #[test]
    fn select_by_id_casts_uuid_pk() {
        let model = model();
        let funds = model.entity_by_path("funds").unwrap();
        let q = select_by_id(funds);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"title\", \"amount\"::text, \"created_at\", \"updated_at\" \
             FROM \"public\".\"funds\" WHERE \"id\" = $1::uuid"
        );
    }

    #[test]
    fn select_list_with_filters_orders_by_pk() {
        let model = model();
        let proposals = model.entity_by_path("proposals").unwrap();
        let filters = vec![("status".to_string(), json!("funded"))];
        let q = select_list(proposals, &filters, Some(25), Some(50));
        assert!(q.sql.contains("WHERE \"status\" = $1"));
        assert!(q.sql.ends_with("ORDER BY \"id\" LIMIT 25 OFFSET 50"));
        assert_eq!(q.params, vec![json!("funded")]);
    }

    #[test]
    fn select_list_ignores_unknown_filter_columns() {
        let model = model();
        let proposals = model.entity_by_path("proposals").unwrap();
        let filters = vec![("no_such_column".to_string(), json!("x"))];
        let q = select_list(proposals, &filters, None, None);
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn to_one_include_renders_row_to_json_subquery() {
        let model = model();
        let proposals = model.entity_by_path("proposals").unwrap();
        let funds = model.entity_by_path("funds").unwrap();
        let includes = vec![IncludeSelect {
            name: "funds",
            direction: IncludeDirection::ToOne,
            related: funds,
            our_key: "fund_id",
            their_key: "id",
        }];
        let q = select_list_with_includes(proposals, &[], None, None, &includes);
        assert!(q.sql.contains("(SELECT row_to_json(sub) FROM (SELECT"));
        assert!(q.sql.contains("WHERE \"id\" = main.\"fund_id\""));
        assert!(q.sql.contains("AS \"funds\""));
    }

    #[test]
    fn to_many_include_renders_json_agg_subquery() {
        let model = model();
        let proposals = model.entity_by_path("proposals").unwrap();
        let reviews = model.entity_by_path("reviews").unwrap();
        let includes = vec![IncludeSelect {
            name: "reviews",
            direction: IncludeDirection::ToMany,
            related: reviews,
            our_key: "id",
            their_key: "proposal_id",
        }];
        let q = select_list_with_includes(proposals, &[], None, None, &includes);
        assert!(q.sql.contains("COALESCE(json_agg(row_to_json(sub)), '[]'::json)"));
        assert!(q.sql.contains("WHERE \"proposal_id\" = main.\"id\""));
    }

    #[test]
    fn insert_skips_defaulted_columns_without_values() {
        let model = model();
        let proposals = model.entity_by_path("proposals").unwrap();
        let mut body = HashMap::new();
        body.insert("title".to_string(), json!("Fund the thing"));
        let q = insert(proposals, &body, false);
        // id (pk) and status (default) are omitted; fund_id has no default so
        // it is bound as null
        assert!(q.sql.starts_with(
            "INSERT INTO \"public\".\"proposals\" (\"title\", \"fund_id\") VALUES ($1, $2::uuid) RETURNING"
        ));
        assert_eq!(q.params, vec![json!("Fund the thing"), serde_json::Value::Null]);
    }

    #[test]
    fn update_sets_only_present_columns_and_updated_at() {
        let model = model();
        let proposals = model.entity_by_path("proposals").unwrap();
        let mut body = HashMap::new();
        body.insert("status".to_string(), json!("funded"));
        let q = update(proposals, &json!("a-uuid"), &body);
        assert!(q.sql.starts_with("UPDATE \"public\".\"proposals\" SET \"status\" = $1"));
        assert!(q.sql.contains("\"updated_at\" = NOW()"));
        assert!(q.sql.contains("WHERE \"id\" = $2::uuid"));
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn empty_update_falls_back_to_select() {
        let model = model();
        let proposals = model.entity_by_path("proposals").unwrap();
        let q = update(proposals, &json!("a-uuid"), &HashMap::new());
        assert!(q.sql.starts_with("SELECT"));
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn delete_targets_pk_without_returning() {
        let model = model();
        let reviews = model.entity_by_path("reviews").unwrap();
        let q = delete(reviews);
        assert_eq!(
            q.sql,
            "DELETE FROM \"public\".\"reviews\" WHERE \"id\" = $1::uuid"
        );
    }
}
