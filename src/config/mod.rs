pub mod types;
pub mod loader;
pub mod validator;
pub mod resolved;

pub use types::*;
pub use loader::*;
pub use validator::*;
pub use resolved::*;

/// Shared fixture: a cut-down Catalyst entity model (funds, proposals,
/// reviews) used across unit tests.
#[cfg(test)]
pub mod test_fixtures {
    use super::types::*;
    use std::collections::HashMap;

    fn column(id: &str, table_id: &str, name: &str, type_: &str, nullable: bool, default: Option<&str>) -> ColumnConfig {
        ColumnConfig {
            id: id.into(),
            table_id: table_id.into(),
            name: name.into(),
            type_: type_.into(),
            nullable,
            default: default.map(String::from),
            comment: None,
        }
    }

    pub fn catalyst_config() -> FullConfig {
        let tables = vec![
            TableConfig {
                id: "t_funds".into(),
                schema_id: None,
                name: "funds".into(),
                comment: None,
                primary_key: "id".into(),
                unique: vec![vec!["title".into()]],
            },
            TableConfig {
                id: "t_proposals".into(),
                schema_id: None,
                name: "proposals".into(),
                comment: None,
                primary_key: "id".into(),
                unique: vec![],
            },
            TableConfig {
                id: "t_reviews".into(),
                schema_id: None,
                name: "reviews".into(),
                comment: None,
                primary_key: "id".into(),
                unique: vec![],
            },
        ];
        let columns = vec![
            column("c_fund_id", "t_funds", "id", "uuid", false, Some("gen_random_uuid()")),
            column("c_fund_title", "t_funds", "title", "text", false, None),
            column("c_fund_amount", "t_funds", "amount", "numeric", true, None),
            column("c_prop_id", "t_proposals", "id", "uuid", false, Some("gen_random_uuid()")),
            column("c_prop_title", "t_proposals", "title", "text", false, None),
            column("c_prop_status", "t_proposals", "status", "text", true, Some("'pending'")),
            column("c_prop_fund_id", "t_proposals", "fund_id", "uuid", true, None),
            column("c_rev_id", "t_reviews", "id", "uuid", false, Some("gen_random_uuid()")),
            column("c_rev_proposal_id", "t_reviews", "proposal_id", "uuid", false, None),
            column("c_rev_rating", "t_reviews", "rating", "int", true, None),
        ];
        let relationships = vec![
            RelationshipConfig {
                id: "r_proposal_fund".into(),
                from_table_id: "t_proposals".into(),
                from_column_id: "c_prop_fund_id".into(),
                to_table_id: "t_funds".into(),
                to_column_id: "c_fund_id".into(),
                on_update: None,
                on_delete: Some("SET NULL".into()),
                name: None,
            },
            RelationshipConfig {
                id: "r_review_proposal".into(),
                from_table_id: "t_reviews".into(),
                from_column_id: "c_rev_proposal_id".into(),
                to_table_id: "t_proposals".into(),
                to_column_id: "c_prop_id".into(),
                on_update: None,
                on_delete: Some("CASCADE".into()),
                name: None,
            },
        ];
        let mut proposal_validation = HashMap::new();
        proposal_validation.insert(
            "title".to_string(),
            ValidationRule {
                required: Some(true),
                max_length: Some(240),
                ..ValidationRule::default()
            },
        );
        let api_entities = vec![
            ApiEntityConfig {
                entity_id: "t_funds".into(),
                path_segment: "funds".into(),
                operations: vec!["read".into(), "create".into(), "update".into(), "delete".into()],
                sensitive_columns: vec![],
                noop_includes: vec![],
                validation: HashMap::new(),
            },
            ApiEntityConfig {
                entity_id: "t_proposals".into(),
                path_segment: "proposals".into(),
                operations: vec!["read".into(), "create".into(), "update".into(), "delete".into()],
                sensitive_columns: vec![],
                noop_includes: vec!["ai_summary".into()],
                validation: proposal_validation,
            },
            ApiEntityConfig {
                entity_id: "t_reviews".into(),
                path_segment: "reviews".into(),
                operations: vec!["read".into(), "create".into()],
                sensitive_columns: vec![],
                noop_includes: vec![],
                validation: HashMap::new(),
            },
        ];
        FullConfig {
            schemas: vec![SchemaConfig {
                id: "s_public".into(),
                name: "public".into(),
                comment: None,
            }],
            tables,
            columns,
            relationships,
            api_entities,
        }
    }
}
