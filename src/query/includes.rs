//! Per-entity registry of named include handlers.
//!
//! Clients request includes by name (?include=funds,reviews). Each name maps
//! to a handler: a relation eager-load, or a registered no-op for names that
//! are accepted by convention but deliberately inert (e.g. "ai_summary").
//! A name with no handler at all fails at query-build time, before any
//! storage access.

use crate::config::{IncludeSpec, ResolvedEntity};
use crate::error::AppError;
use crate::query::ListQuery;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub enum IncludeHandler {
    /// Eager-load a related entity into the row payload.
    Relation(IncludeSpec),
    /// Accept the name, mutate nothing.
    Noop,
}

impl IncludeHandler {
    pub fn apply(&self, query: &mut ListQuery) {
        match self {
            IncludeHandler::Relation(spec) => query.add_include(spec.clone()),
            IncludeHandler::Noop => {}
        }
    }
}

/// Registry of include name -> handler for one entity. Built once from the
/// resolved model; read-only afterwards. Handlers are independent of one
/// another, so application order never matters.
#[derive(Clone, Debug, Default)]
pub struct IncludeRegistry {
    handlers: BTreeMap<String, IncludeHandler>,
}

impl IncludeRegistry {
    pub fn for_entity(entity: &ResolvedEntity) -> Self {
        let mut handlers = BTreeMap::new();
        for spec in &entity.includes {
            handlers.insert(spec.name.clone(), IncludeHandler::Relation(spec.clone()));
        }
        for name in &entity.noop_includes {
            handlers
                .entry(name.clone())
                .or_insert(IncludeHandler::Noop);
        }
        IncludeRegistry { handlers }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Apply one include by name. Unregistered names are an error.
    pub fn apply(&self, query: &mut ListQuery, name: &str) -> Result<(), AppError> {
        match self.handlers.get(name) {
            Some(handler) => {
                handler.apply(query);
                Ok(())
            }
            None => Err(AppError::UnknownInclude(name.to_string())),
        }
    }

    /// Apply a set of include names (e.g. from a comma-separated query
    /// parameter). Empty names are skipped; the first unregistered name
    /// aborts the build.
    pub fn apply_all<'a>(
        &self,
        query: &mut ListQuery,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), AppError> {
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            self.apply(query, name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_fixtures::catalyst_config;
    use crate::config::{resolve, ResolvedModel};
    use crate::sql::select_list_with_includes;

    fn model() -> ResolvedModel {
        resolve(&catalyst_config()).unwrap()
    }

    fn lowered_sql(model: &ResolvedModel, query: &ListQuery) -> String {
        let entity = model.entity_by_path("proposals").unwrap();
        let includes = query.include_selects(model).unwrap();
        select_list_with_includes(entity, &query.filters, None, None, &includes).sql
    }

    #[test]
    fn unknown_include_fails_at_build_time() {
        let model = model();
        let registry = IncludeRegistry::for_entity(model.entity_by_path("proposals").unwrap());
        let mut query = ListQuery::new();
        match registry.apply(&mut query, "votes") {
            Err(AppError::UnknownInclude(name)) => assert_eq!(name, "votes"),
            other => panic!("expected UnknownInclude, got {:?}", other.err()),
        }
    }

    #[test]
    fn noop_include_is_accepted_and_inert() {
        let model = model();
        let registry = IncludeRegistry::for_entity(model.entity_by_path("proposals").unwrap());

        let mut with_noop = ListQuery::new();
        registry.apply_all(&mut with_noop, ["ai_summary"]).unwrap();
        let without_noop = ListQuery::new();

        assert_eq!(lowered_sql(&model, &with_noop), lowered_sql(&model, &without_noop));
    }

    #[test]
    fn include_permutations_lower_identically() {
        let model = model();
        let registry = IncludeRegistry::for_entity(model.entity_by_path("proposals").unwrap());

        let mut forward = ListQuery::new();
        registry
            .apply_all(&mut forward, ["funds", "reviews", "ai_summary"])
            .unwrap();
        let mut backward = ListQuery::new();
        registry
            .apply_all(&mut backward, ["ai_summary", "reviews", "funds"])
            .unwrap();

        assert_eq!(lowered_sql(&model, &forward), lowered_sql(&model, &backward));
    }

    #[test]
    fn duplicate_includes_collapse() {
        let model = model();
        let registry = IncludeRegistry::for_entity(model.entity_by_path("proposals").unwrap());
        let mut query = ListQuery::new();
        registry.apply_all(&mut query, ["funds", "funds", " funds "]).unwrap();
        assert_eq!(query.includes().count(), 1);
    }

    #[test]
    fn relation_handler_attaches_spec() {
        let model = model();
        let entity = model.entity_by_path("proposals").unwrap();
        let registry = IncludeRegistry::for_entity(entity);
        assert!(registry.contains("funds"));
        assert!(registry.contains("reviews"));
        assert!(registry.contains("ai_summary"));
        assert!(!registry.contains("campaign"));

        let mut query = ListQuery::new();
        registry.apply(&mut query, "reviews").unwrap();
        let spec = query.includes().next().unwrap();
        assert_eq!(spec.their_key_column, "proposal_id");
    }
}
