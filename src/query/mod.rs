//! List-query value object and the include registry.

mod includes;
pub use includes::*;

use crate::config::{IncludeSpec, ResolvedModel};
use crate::error::AppError;
use crate::sql::IncludeSelect;
use serde_json::Value;
use std::collections::BTreeMap;

/// An in-progress list query: exact-match filters, paging, and the relation
/// includes attached by include handlers. Includes are keyed by name in an
/// ordered map, so any permutation of the same include set lowers to the
/// same SQL.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub filters: Vec<(String, Value)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    includes: BTreeMap<String, IncludeSpec>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_include(&mut self, spec: IncludeSpec) {
        self.includes.insert(spec.name.clone(), spec);
    }

    /// Attached includes in name order.
    pub fn includes(&self) -> impl Iterator<Item = &IncludeSpec> {
        self.includes.values()
    }

    /// Lower attached includes against the model for SQL generation. The
    /// related entity is always present: include specs are only ever derived
    /// from API entities in the same model.
    pub fn include_selects<'a>(
        &'a self,
        model: &'a ResolvedModel,
    ) -> Result<Vec<IncludeSelect<'a>>, AppError> {
        let mut out = Vec::with_capacity(self.includes.len());
        for spec in self.includes.values() {
            let related = model
                .entity_by_path(&spec.related_path_segment)
                .ok_or_else(|| {
                    AppError::Construction(format!(
                        "include '{}' references unknown entity '{}'",
                        spec.name, spec.related_path_segment
                    ))
                })?;
            out.push(IncludeSelect {
                name: &spec.name,
                direction: spec.direction,
                related,
                our_key: &spec.our_key_column,
                their_key: &spec.their_key_column,
            });
        }
        Ok(out)
    }
}
