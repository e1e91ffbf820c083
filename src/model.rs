//
//  model.rs
//  Depend
//
//  Created by hak (tharun)
//

use std::collections::HashMap;
use tracing::warn;

use crate::error::{DependError, Result};
use crate::filter::FilterCollection;
use crate::ident::{symbol_key, FunctionId, MemberId, PackageId, TypeId};
use crate::member::{Member, MemberKind};
use crate::package::{FunctionNode, Package};
use crate::reference::SymbolResolver;
use crate::types::{Modifiers, TypeKind, TypeNode};

/// The code model of one analysis session: every package, type, member and
/// function, plus the symbol table that deferred references resolve against.
///
/// Mutation goes through `&mut self`, so the single-writer rule of the
/// wiring phase is enforced by the borrow checker. Once built, the model is
/// `Send + Sync` and read-only traversals may run in parallel.
#[derive(Debug, Clone, Default)]
pub struct CodeModel {
    pub(crate) types: Vec<TypeNode>,
    pub(crate) members: Vec<Member>,
    pub(crate) packages: Vec<Package>,
    pub(crate) functions: Vec<FunctionNode>,
    /// Index: lowercased type name -> type (first declaration wins).
    pub(crate) symbol_index: HashMap<String, TypeId>,
    /// Index: package name -> package.
    pub(crate) package_index: HashMap<String, PackageId>,
    pub(crate) filters: FilterCollection,
}

/// Entity counts of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ModelStats {
    pub packages: usize,
    pub classes: usize,
    pub interfaces: usize,
    pub user_defined: usize,
    pub methods: usize,
    pub constants: usize,
    pub functions: usize,
}

impl CodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model that evaluates `filters` in its derived queries.
    pub fn with_filters(filters: FilterCollection) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    // ─── Entity Creation ───────────────────────────────────────

    /// Add a class and register it in the symbol table.
    pub fn add_class(&mut self, name: impl Into<String>) -> TypeId {
        self.add_type(name.into(), TypeKind::Class)
    }

    /// Add an interface and register it in the symbol table.
    pub fn add_interface(&mut self, name: impl Into<String>) -> TypeId {
        self.add_type(name.into(), TypeKind::Interface)
    }

    fn add_type(&mut self, name: String, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len());
        let key = symbol_key(&name);
        if let Some(existing) = self.symbol_index.get(&key) {
            warn!(name = %name, %existing, "duplicate type declaration, keeping the first one in the symbol table");
        } else {
            self.symbol_index.insert(key, id);
        }
        self.types.push(TypeNode::new(id, name, kind));
        id
    }

    /// Get the package registered under `name`, creating it on first use.
    pub fn add_package(&mut self, name: impl Into<String>) -> PackageId {
        let name = name.into();
        if let Some(&id) = self.package_index.get(&name) {
            return id;
        }
        let id = PackageId(self.packages.len());
        self.package_index.insert(name.clone(), id);
        self.packages.push(Package::new(id, name));
        id
    }

    /// Create an unowned method.
    pub fn new_method(&mut self, name: impl Into<String>) -> MemberId {
        self.new_member(name.into(), MemberKind::Method)
    }

    /// Create an unowned method with modifiers.
    pub fn new_method_with(&mut self, name: impl Into<String>, modifiers: Modifiers) -> MemberId {
        let id = self.new_member(name.into(), MemberKind::Method);
        self.members[id.0].modifiers = modifiers;
        id
    }

    /// Create an unowned constant.
    pub fn new_constant(&mut self, name: impl Into<String>, value: Option<&str>) -> MemberId {
        let id = self.new_member(name.into(), MemberKind::Constant);
        self.members[id.0].value = value.map(str::to_string);
        id
    }

    fn new_member(&mut self, name: String, kind: MemberKind) -> MemberId {
        let id = MemberId(self.members.len());
        self.members.push(Member::new(id, name, kind));
        id
    }

    /// Create a function that belongs to no package yet.
    pub fn add_function(&mut self, name: impl Into<String>) -> FunctionId {
        let id = FunctionId(self.functions.len());
        self.functions.push(FunctionNode::new(id, name.into()));
        id
    }

    // ─── Lookup ────────────────────────────────────────────────

    /// Resolve a type name. Case-insensitive; unknown names give `None`.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.symbol_index.get(&symbol_key(name)).copied()
    }

    pub fn find_package(&self, name: &str) -> Option<PackageId> {
        self.package_index.get(name).copied()
    }

    /// Like [`CodeModel::lookup`], but an unknown name is an error.
    pub fn require_type(&self, name: &str) -> Result<TypeId> {
        self.lookup(name)
            .ok_or_else(|| DependError::UnknownType(name.to_string()))
    }

    pub fn require_package(&self, name: &str) -> Result<PackageId> {
        self.find_package(name)
            .ok_or_else(|| DependError::UnknownPackage(name.to_string()))
    }

    pub fn get_type(&self, id: TypeId) -> Option<&TypeNode> {
        self.types.get(id.0)
    }

    pub fn get_member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.0)
    }

    pub fn get_package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.0)
    }

    pub fn get_function(&self, id: FunctionId) -> Option<&FunctionNode> {
        self.functions.get(id.0)
    }

    /// All types in creation order.
    pub fn types(&self) -> impl Iterator<Item = &TypeNode> + '_ {
        self.types.iter()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.iter().map(|t| t.id)
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> + '_ {
        self.packages.iter()
    }

    pub fn filters(&self) -> &FilterCollection {
        &self.filters
    }

    /// Swap filters between analysis runs without rebuilding the model.
    pub fn filters_mut(&mut self) -> &mut FilterCollection {
        &mut self.filters
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            packages: self.packages.len(),
            classes: self.types.iter().filter(|t| t.is_class()).count(),
            interfaces: self.types.iter().filter(|t| t.is_interface()).count(),
            user_defined: self.types.iter().filter(|t| t.user_defined).count(),
            methods: self
                .members
                .iter()
                .filter(|m| m.kind == MemberKind::Method)
                .count(),
            constants: self
                .members
                .iter()
                .filter(|m| m.kind == MemberKind::Constant)
                .count(),
            functions: self.functions.len(),
        }
    }

    // ─── Internal Helpers ──────────────────────────────────────

    pub(crate) fn type_node(&self, id: TypeId) -> Result<&TypeNode> {
        self.types
            .get(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    pub(crate) fn type_mut(&mut self, id: TypeId) -> Result<&mut TypeNode> {
        self.types
            .get_mut(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    pub(crate) fn member_node(&self, id: MemberId) -> Result<&Member> {
        self.members
            .get(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    pub(crate) fn member_mut(&mut self, id: MemberId) -> Result<&mut Member> {
        self.members
            .get_mut(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    pub(crate) fn package_node(&self, id: PackageId) -> Result<&Package> {
        self.packages
            .get(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    pub(crate) fn package_mut(&mut self, id: PackageId) -> Result<&mut Package> {
        self.packages
            .get_mut(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    pub(crate) fn function_node(&self, id: FunctionId) -> Result<&FunctionNode> {
        self.functions
            .get(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    pub(crate) fn function_mut(&mut self, id: FunctionId) -> Result<&mut FunctionNode> {
        self.functions
            .get_mut(id.0)
            .ok_or_else(|| DependError::invalid(format!("{id} does not belong to this model")))
    }

    /// Filter verdict for a type, evaluated with its package.
    pub(crate) fn accepts(&self, node: &TypeNode) -> bool {
        let package = node.package.and_then(|p| self.get_package(p));
        self.filters.accept(node, package)
    }
}

impl SymbolResolver for CodeModel {
    fn lookup(&self, name: &str) -> Option<TypeId> {
        CodeModel::lookup(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_model_is_send_and_sync() {
        assert_send_sync::<CodeModel>();
    }

    #[test]
    fn test_empty_model() {
        let model = CodeModel::new();
        assert_eq!(model.stats(), ModelStats::default());
        assert_eq!(model.lookup("anything"), None);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut model = CodeModel::new();
        let id = model.add_class("App\\Http\\Kernel");
        assert_eq!(model.lookup("\\app\\http\\KERNEL"), Some(id));
    }

    #[test]
    fn test_duplicate_declaration_keeps_first_symbol() {
        let mut model = CodeModel::new();
        let first = model.add_class("Foo");
        let second = model.add_class("foo");
        assert_ne!(first, second);
        assert_eq!(model.lookup("Foo"), Some(first));
        assert_eq!(model.stats().classes, 2);
    }

    #[test]
    fn test_require_unknown_names() {
        let mut model = CodeModel::new();
        let id = model.add_interface("Countable");
        assert_eq!(model.require_type("countable").unwrap(), id);
        assert!(matches!(
            model.require_type("Missing"),
            Err(DependError::UnknownType(name)) if name == "Missing"
        ));
        assert!(matches!(
            model.require_package("App"),
            Err(DependError::UnknownPackage(_))
        ));
    }

    #[test]
    fn test_add_package_is_idempotent() {
        let mut model = CodeModel::new();
        let a = model.add_package("App");
        let b = model.add_package("App");
        assert_eq!(a, b);
        assert_eq!(model.find_package("App"), Some(a));
        assert_eq!(model.stats().packages, 1);
    }

    #[test]
    fn test_stats_counts_every_entity() {
        let mut model = CodeModel::new();
        let class = model.add_class("Dog");
        model.add_interface("Animal");
        model.set_user_defined(class).unwrap();
        let method = model.new_method_with("bark", Modifiers::PUBLIC);
        model.add_member(class, method).unwrap();
        model.new_constant("LEGS", Some("4"));
        model.add_function("helper");

        let stats = model.stats();
        assert_eq!(stats.classes, 1);
        assert_eq!(stats.interfaces, 1);
        assert_eq!(stats.user_defined, 1);
        assert_eq!(stats.methods, 1);
        assert_eq!(stats.constants, 1);
        assert_eq!(stats.functions, 1);
        assert_eq!(
            model.get_member(method).unwrap().modifiers(),
            Modifiers::PUBLIC
        );
    }

    #[test]
    fn test_foreign_handles_are_invalid_arguments() {
        let mut model = CodeModel::new();
        let err = model.set_user_defined(TypeId(5)).unwrap_err();
        assert!(matches!(err, DependError::InvalidArgument(_)));
    }
}
