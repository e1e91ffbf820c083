//! Deferred type references.
//!
//! The parser sees `extends Foo` long before it may see the declaration of
//! `Foo`, so edges between types are stored by name and only resolved when
//! a traversal asks for them. A successful lookup is memoized; a failed one
//! is not, which lets a type declared later still satisfy the reference.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{DependError, Result};
use crate::ident::{symbol_key, TypeId};

/// Lookup-by-identifier used to resolve a [`TypeReference`].
pub trait SymbolResolver {
    /// Returns the type registered under `name`, or `None` when unknown.
    fn lookup(&self, name: &str) -> Option<TypeId>;
}

impl SymbolResolver for HashMap<String, TypeId> {
    fn lookup(&self, name: &str) -> Option<TypeId> {
        self.get(&symbol_key(name)).copied()
    }
}

/// What a reference is allowed to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// `extends` on a class.
    Class,
    /// `implements` on a class or `extends` on an interface.
    Interface,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Class => write!(f, "class"),
            ReferenceKind::Interface => write!(f, "interface"),
        }
    }
}

/// A named, lazily resolved pointer to a type.
#[derive(Debug, Clone)]
pub struct TypeReference {
    kind: ReferenceKind,
    name: String,
    resolved: OnceLock<TypeId>,
}

impl TypeReference {
    /// Create a reference of the given kind. Blank identifiers are rejected.
    pub fn new(kind: ReferenceKind, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().trim_start_matches('\\').is_empty() {
            return Err(DependError::invalid(format!(
                "{kind} reference needs a non-empty type name"
            )));
        }
        Ok(Self {
            kind,
            name,
            resolved: OnceLock::new(),
        })
    }

    /// Reference to a parent class.
    pub fn class(name: impl Into<String>) -> Result<Self> {
        Self::new(ReferenceKind::Class, name)
    }

    /// Reference to an implemented or extended interface.
    pub fn interface(name: impl Into<String>) -> Result<Self> {
        Self::new(ReferenceKind::Interface, name)
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// The identifier exactly as the parser reported it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once a lookup has succeeded.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Resolve against `symbols`, memoizing a hit.
    pub fn resolve(&self, symbols: &impl SymbolResolver) -> Option<TypeId> {
        if let Some(id) = self.resolved.get() {
            return Some(*id);
        }
        let id = symbols.lookup(&self.name)?;
        Some(*self.resolved.get_or_init(|| id))
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}
