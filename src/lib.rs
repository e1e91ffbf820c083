//! # Depend
//!
//! In-memory code model for dependency analysis of class-based source code.
//!
//! A [`CodeModel`] holds packages, classes, interfaces, their members and
//! free functions. Inheritance edges are stored as deferred, name-based
//! [`TypeReference`]s that resolve against the model's symbol table on
//! first use, so a parser can populate the model in any order. Derived
//! queries (parent class, transitive interfaces, dependencies) honor a
//! per-model [`FilterCollection`] and stay finite on cyclic input.
//!
//! ## Quick Start
//!
//! ```rust
//! use depend::{CodeModel, TypeReference};
//!
//! let mut model = CodeModel::new();
//! let dog = model.add_class("Dog");
//! model.add_class("Animal");
//! model
//!     .set_parent_class_reference(dog, TypeReference::class("Animal").unwrap())
//!     .unwrap();
//!
//! let parent = model.parent_class(dog).unwrap();
//! assert_eq!(model.get_type(parent).unwrap().name(), "Animal");
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod member;
pub mod model;
pub mod package;
pub mod reference;
pub mod report;
pub mod traversal;
pub mod types;

// Re-exports for convenience
pub use builder::{ModelBuilder, ModelDeclarations};
pub use config::DependConfig;
pub use error::{DependError, Result};
pub use filter::{
    FilterCollection, FilterId, FnFilter, InternalPackageFilter, PackageFilter, TypeFilter,
    UserDefinedFilter,
};
pub use ident::{FunctionId, MemberId, PackageId, TypeId};
pub use member::{Member, MemberKind};
pub use model::{CodeModel, ModelStats};
pub use package::{FunctionNode, Package, GLOBAL_PACKAGE};
pub use reference::{ReferenceKind, SymbolResolver, TypeReference};
pub use report::{ModelReport, TypeSummary};
pub use traversal::DependencyGraph;
pub use types::{Modifiers, TypeKind, TypeNode};
