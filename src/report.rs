//
//  report.rs
//  Depend
//
//  Created by hak (tharun)
//

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::ident::TypeId;
use crate::model::{CodeModel, ModelStats};
use crate::types::TypeKind;

/// Everything the traversals know about one type, by name.
#[derive(Debug, Clone, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub kind: TypeKind,
    pub package: Option<String>,
    pub user_defined: bool,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub dependencies: Vec<String>,
    pub children: Vec<String>,
    /// Length of the filtered parent chain.
    pub depth: usize,
}

/// A full dump of a model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub generated: DateTime<Utc>,
    pub stats: ModelStats,
    pub types: Vec<TypeSummary>,
    /// Strongly connected groups of mutually dependent types.
    pub cycles: Vec<Vec<String>>,
}

impl CodeModel {
    /// Summarize one type. `None` for a foreign handle.
    pub fn summarize(&self, ty: TypeId) -> Option<TypeSummary> {
        let node = self.get_type(ty)?;
        Some(TypeSummary {
            name: node.name().to_string(),
            kind: node.kind(),
            package: node
                .package()
                .and_then(|p| self.get_package(p))
                .map(|p| p.name().to_string()),
            user_defined: node.is_user_defined(),
            is_abstract: node.is_abstract(),
            parent: self.parent_class(ty).map(|p| self.type_name(p)),
            interfaces: self.names(self.interfaces(ty)),
            dependencies: self.names(self.resolved_dependencies(ty)),
            children: self.names(self.child_classes(ty)),
            depth: self.ancestors(ty).len(),
        })
    }

    /// Build a report over every type. Summaries are computed in parallel.
    pub fn report(&self) -> ModelReport {
        let ids: Vec<TypeId> = self.type_ids().collect();
        let types: Vec<TypeSummary> = ids.par_iter().filter_map(|&ty| self.summarize(ty)).collect();
        let cycles = self
            .dependency_cycles()
            .into_iter()
            .map(|group| self.names(group))
            .collect();

        debug!(types = types.len(), "report generated");

        ModelReport {
            generated: Utc::now(),
            stats: self.stats(),
            types,
            cycles,
        }
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.get_type(ty)
            .map(|t| t.name().to_string())
            .unwrap_or_default()
    }

    fn names(&self, ids: Vec<TypeId>) -> Vec<String> {
        ids.into_iter().map(|ty| self.type_name(ty)).collect()
    }
}

impl ModelReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
