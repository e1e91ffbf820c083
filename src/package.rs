//! Packages (namespaces) and the package-level functions they group.
//!
//! A type's own `package` pointer is the authoritative link. The type list
//! kept on each package is an index over those pointers: the
//! `add_type_to_package` family writes both sides at once, and
//! [`CodeModel::rebuild_package_index`] recomputes the index after callers
//! used the pointer-only [`CodeModel::set_package`].

use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::ident::{new_uuid, FunctionId, PackageId, TypeId};
use crate::model::CodeModel;
use crate::types::TypeNode;

/// Name of the package that collects declarations outside any namespace.
pub const GLOBAL_PACKAGE: &str = "+global";

#[derive(Debug, Clone)]
pub struct Package {
    pub(crate) id: PackageId,
    pub(crate) uuid: Uuid,
    pub(crate) name: String,
    pub(crate) types: Vec<TypeId>,
    pub(crate) functions: Vec<FunctionId>,
}

impl Package {
    pub(crate) fn new(id: PackageId, name: String) -> Self {
        Self {
            id,
            uuid: new_uuid(),
            name,
            types: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for the catch-all package of un-namespaced declarations.
    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_PACKAGE
    }

    pub fn type_ids(&self) -> &[TypeId] {
        &self.types
    }

    pub fn function_ids(&self) -> &[FunctionId] {
        &self.functions
    }
}

/// A function declared at package level.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub(crate) id: FunctionId,
    pub(crate) uuid: Uuid,
    pub(crate) name: String,
    pub(crate) package: Option<PackageId>,
}

impl FunctionNode {
    pub(crate) fn new(id: FunctionId, name: String) -> Self {
        Self {
            id,
            uuid: new_uuid(),
            name,
            package: None,
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> Option<PackageId> {
        self.package
    }
}

impl CodeModel {
    /// Move `ty` into `pkg`, taking it out of the package it was listed in.
    pub fn add_type_to_package(&mut self, pkg: PackageId, ty: TypeId) -> Result<TypeId> {
        self.package_node(pkg)?;
        if let Some(previous) = self.type_node(ty)?.package {
            if previous != pkg {
                debug!(%ty, from = %previous, to = %pkg, "moving type between packages");
            }
            self.remove_type_from_package(previous, ty)?;
        }
        self.type_mut(ty)?.package = Some(pkg);
        self.package_mut(pkg)?.types.push(ty);
        Ok(ty)
    }

    /// Drop `ty` from the type list of `pkg`. The type's pointer is cleared
    /// only when it still names `pkg`.
    pub fn remove_type_from_package(&mut self, pkg: PackageId, ty: TypeId) -> Result<()> {
        let list = &mut self.package_mut(pkg)?.types;
        if let Some(pos) = list.iter().position(|&t| t == ty) {
            list.remove(pos);
        }
        let node = self.type_mut(ty)?;
        if node.package == Some(pkg) {
            node.package = None;
        }
        Ok(())
    }

    /// Move a function into `pkg`, taking it out of its previous package.
    pub fn add_function_to_package(
        &mut self,
        pkg: PackageId,
        function: FunctionId,
    ) -> Result<FunctionId> {
        self.package_node(pkg)?;
        if let Some(previous) = self.function_node(function)?.package {
            self.remove_function_from_package(previous, function)?;
        }
        self.function_mut(function)?.package = Some(pkg);
        self.package_mut(pkg)?.functions.push(function);
        Ok(function)
    }

    pub fn remove_function_from_package(
        &mut self,
        pkg: PackageId,
        function: FunctionId,
    ) -> Result<()> {
        let list = &mut self.package_mut(pkg)?.functions;
        if let Some(pos) = list.iter().position(|&f| f == function) {
            list.remove(pos);
        }
        let node = self.function_mut(function)?;
        if node.package == Some(pkg) {
            node.package = None;
        }
        Ok(())
    }

    /// Types listed in a package, in insertion order.
    pub fn package_types(&self, pkg: PackageId) -> impl Iterator<Item = &TypeNode> + '_ {
        self.get_package(pkg)
            .map(|p| p.types.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&ty| self.get_type(ty))
    }

    pub fn package_classes(&self, pkg: PackageId) -> impl Iterator<Item = &TypeNode> + '_ {
        self.package_types(pkg).filter(|t| t.is_class())
    }

    pub fn package_interfaces(&self, pkg: PackageId) -> impl Iterator<Item = &TypeNode> + '_ {
        self.package_types(pkg).filter(|t| t.is_interface())
    }

    pub fn package_functions(&self, pkg: PackageId) -> impl Iterator<Item = &FunctionNode> + '_ {
        self.get_package(pkg)
            .map(|p| p.functions.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&f| self.get_function(f))
    }

    /// Recompute every package's type and function lists from the
    /// entities' own package pointers.
    pub fn rebuild_package_index(&mut self) {
        for package in &mut self.packages {
            package.types.clear();
            package.functions.clear();
        }
        for node in &self.types {
            if let Some(package) = node.package.and_then(|p| self.packages.get_mut(p.0)) {
                package.types.push(node.id);
            }
        }
        for function in &self.functions {
            if let Some(package) = function.package.and_then(|p| self.packages.get_mut(p.0)) {
                package.functions.push(function.id);
            }
        }
    }
}
