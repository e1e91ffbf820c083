//
//  config.rs
//  Depend
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::filter::{FilterCollection, InternalPackageFilter, PackageFilter, UserDefinedFilter};

/// Top-level analysis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// Which types derived queries hide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Package name patterns to hide (`*` wildcard, case-insensitive).
    #[serde(default)]
    pub exclude_packages: Vec<String>,
    /// Hide built-in pseudo packages such as `+standard`.
    #[serde(default = "default_exclude_internal")]
    pub exclude_internal: bool,
    /// Hide types that are referenced but never declared.
    #[serde(default)]
    pub user_defined_only: bool,
}

/// Model building settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Declare placeholder types for unresolvable references.
    #[serde(default = "default_create_placeholders")]
    pub create_placeholders: bool,
}

fn default_exclude_internal() -> bool {
    true
}

fn default_create_placeholders() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_packages: Vec::new(),
            exclude_internal: default_exclude_internal(),
            user_defined_only: false,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            create_placeholders: default_create_placeholders(),
        }
    }
}

impl DependConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Build the filter collection described by `[filter]`.
    pub fn filter_collection(&self) -> FilterCollection {
        let mut filters = FilterCollection::new();
        if !self.filter.exclude_packages.is_empty() {
            filters.add(PackageFilter::new(&self.filter.exclude_packages));
        }
        if self.filter.exclude_internal {
            filters.add(InternalPackageFilter);
        }
        if self.filter.user_defined_only {
            filters.add(UserDefinedFilter);
        }
        filters
    }
}
