//
//  filter.rs
//  Depend
//
//  Created by hak (tharun)
//

//! Predicates that hide types from derived queries.
//!
//! Filters never remove anything from the model. They only decide whether
//! `parent_class`, `ancestors` and the resolved dependency queries may
//! report a type.

use std::fmt;
use std::sync::Arc;

use crate::package::{Package, GLOBAL_PACKAGE};
use crate::types::TypeNode;

/// A pure predicate over a type and its package.
pub trait TypeFilter: Send + Sync {
    /// Return `false` to hide `node`.
    fn accept(&self, node: &TypeNode, package: Option<&Package>) -> bool;

    /// Short label used in logs.
    fn describe(&self) -> String {
        "custom filter".to_string()
    }
}

/// Handle returned by [`FilterCollection::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(u64);

/// Ordered set of filters. Empty accepts everything.
#[derive(Clone, Default)]
pub struct FilterCollection {
    filters: Vec<(FilterId, Arc<dyn TypeFilter>)>,
    next_id: u64,
}

impl FilterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter: impl TypeFilter + 'static) -> FilterId {
        self.add_shared(Arc::new(filter))
    }

    pub fn add_shared(&mut self, filter: Arc<dyn TypeFilter>) -> FilterId {
        let id = FilterId(self.next_id);
        self.next_id += 1;
        self.filters.push((id, filter));
        id
    }

    /// Unregister a filter. Returns `false` when the id is unknown.
    pub fn remove(&mut self, id: FilterId) -> bool {
        let before = self.filters.len();
        self.filters.retain(|(fid, _)| *fid != id);
        self.filters.len() != before
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// True iff no registered filter rejects `node`.
    pub fn accept(&self, node: &TypeNode, package: Option<&Package>) -> bool {
        self.filters.iter().all(|(_, f)| f.accept(node, package))
    }
}

impl fmt::Debug for FilterCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|(_, filter)| filter.describe()))
            .finish()
    }
}

/// Hides types whose package name matches one of the patterns.
///
/// Patterns are case-insensitive and support `*` as a wildcard, so
/// `Vendor\*` hides every sub-namespace of `Vendor`. Types without a package
/// are never hidden.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    patterns: Vec<String>,
}

impl PackageFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl TypeFilter for PackageFilter {
    fn accept(&self, _node: &TypeNode, package: Option<&Package>) -> bool {
        let Some(package) = package else {
            return true;
        };
        let name = package.name().to_lowercase();
        !self.patterns.iter().any(|p| wildcard_match(p, &name))
    }

    fn describe(&self) -> String {
        format!("package filter {:?}", self.patterns)
    }
}

/// Hides types in pseudo packages such as `+standard` or `+spl` that hold
/// the language's built-in types. `+global` holds user code and stays.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalPackageFilter;

impl TypeFilter for InternalPackageFilter {
    fn accept(&self, _node: &TypeNode, package: Option<&Package>) -> bool {
        match package {
            Some(p) => !p.name().starts_with('+') || p.name() == GLOBAL_PACKAGE,
            None => true,
        }
    }

    fn describe(&self) -> String {
        "internal package filter".to_string()
    }
}

/// Hides types that were referenced but never declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDefinedFilter;

impl TypeFilter for UserDefinedFilter {
    fn accept(&self, node: &TypeNode, _package: Option<&Package>) -> bool {
        node.is_user_defined()
    }

    fn describe(&self) -> String {
        "user defined filter".to_string()
    }
}

/// Adapter for closures.
pub struct FnFilter<F>(pub F);

impl<F> TypeFilter for FnFilter<F>
where
    F: Fn(&TypeNode, Option<&Package>) -> bool + Send + Sync,
{
    fn accept(&self, node: &TypeNode, package: Option<&Package>) -> bool {
        (self.0)(node, package)
    }
}

/// Glob match with `*` only.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] != '*' && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}
