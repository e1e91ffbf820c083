//
//  types.rs
//  Depend
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DependError, Result};
use crate::ident::{new_uuid, MemberId, PackageId, TypeId};
use crate::model::CodeModel;
use crate::reference::{ReferenceKind, TypeReference};

/// Declared modifier bits of a type or method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    /// Explicit `abstract` keyword.
    pub const ABSTRACT: Modifiers = Modifiers(0x01);
    pub const FINAL: Modifiers = Modifiers(0x02);
    /// Abstract without the keyword (interfaces, interface methods).
    pub const IMPLICIT_ABSTRACT: Modifiers = Modifiers(0x04);
    pub const STATIC: Modifiers = Modifiers(0x08);
    pub const PUBLIC: Modifiers = Modifiers(0x10);
    pub const PROTECTED: Modifiers = Modifiers(0x20);
    pub const PRIVATE: Modifiers = Modifiers(0x40);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parse a modifier keyword (`abstract`, `final`, `static`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Modifiers> {
        match keyword.to_ascii_lowercase().as_str() {
            "abstract" => Some(Self::ABSTRACT),
            "final" => Some(Self::FINAL),
            "static" => Some(Self::STATIC),
            "public" => Some(Self::PUBLIC),
            "protected" => Some(Self::PROTECTED),
            "private" => Some(Self::PRIVATE),
            _ => None,
        }
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.0 |= rhs.0;
    }
}

/// Class or interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Class => write!(f, "class"),
            TypeKind::Interface => write!(f, "interface"),
        }
    }
}

/// A declared (or merely referenced) class or interface.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub(crate) id: TypeId,
    pub(crate) uuid: Uuid,
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) modifiers: Modifiers,
    pub(crate) parent: Option<TypeReference>,
    pub(crate) interfaces: Vec<TypeReference>,
    pub(crate) package: Option<PackageId>,
    pub(crate) methods: Vec<MemberId>,
    pub(crate) constants: Vec<MemberId>,
    pub(crate) user_defined: bool,
    pub(crate) source_file: Option<PathBuf>,
}

impl TypeNode {
    pub(crate) fn new(id: TypeId, name: String, kind: TypeKind) -> Self {
        Self {
            id,
            uuid: new_uuid(),
            name,
            kind,
            modifiers: Modifiers::NONE,
            parent: None,
            interfaces: Vec::new(),
            package: None,
            methods: Vec::new(),
            constants: Vec::new(),
            user_defined: false,
            source_file: None,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// True when the type has a declaration in the analyzed sources.
    pub fn is_user_defined(&self) -> bool {
        self.user_defined
    }

    /// Interfaces are always abstract, classes only when declared so.
    pub fn is_abstract(&self) -> bool {
        match self.kind {
            TypeKind::Interface => true,
            TypeKind::Class => self.modifiers.contains(Modifiers::ABSTRACT),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self.kind {
            TypeKind::Interface => self.modifiers | Modifiers::IMPLICIT_ABSTRACT,
            TypeKind::Class => self.modifiers,
        }
    }

    /// Owning package, as last set through [`CodeModel::set_package`].
    pub fn package(&self) -> Option<PackageId> {
        self.package
    }

    pub fn parent_reference(&self) -> Option<&TypeReference> {
        self.parent.as_ref()
    }

    /// Declared interface references in source order, duplicates included.
    pub fn interface_references(&self) -> &[TypeReference] {
        &self.interfaces
    }

    pub fn method_ids(&self) -> &[MemberId] {
        &self.methods
    }

    pub fn constant_ids(&self) -> &[MemberId] {
        &self.constants
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }
}

impl CodeModel {
    /// Replace the parent class reference of a class. Last write wins.
    pub fn set_parent_class_reference(
        &mut self,
        ty: TypeId,
        reference: TypeReference,
    ) -> Result<()> {
        if reference.kind() != ReferenceKind::Class {
            return Err(DependError::invalid(format!(
                "parent of {ty} must be a class reference, got {reference}"
            )));
        }
        let node = self.type_mut(ty)?;
        if node.kind != TypeKind::Class {
            return Err(DependError::invalid(format!(
                "interface {} cannot have a parent class",
                node.name
            )));
        }
        debug!(ty = %node.name, parent = reference.name(), "set parent class reference");
        node.parent = Some(reference);
        Ok(())
    }

    /// Append an implemented (class) or extended (interface) interface.
    pub fn add_interface_reference(&mut self, ty: TypeId, reference: TypeReference) -> Result<()> {
        if reference.kind() != ReferenceKind::Interface {
            return Err(DependError::invalid(format!(
                "{ty} can only implement interface references, got {reference}"
            )));
        }
        let node = self.type_mut(ty)?;
        debug!(ty = %node.name, interface = reference.name(), "add interface reference");
        node.interfaces.push(reference);
        Ok(())
    }

    /// Point a type at its package.
    ///
    /// Only the type side is written. Use [`CodeModel::add_type_to_package`]
    /// to keep the package's type list in step.
    pub fn set_package(&mut self, ty: TypeId, package: Option<PackageId>) -> Result<()> {
        if let Some(pkg) = package {
            self.package_node(pkg)?;
        }
        self.type_mut(ty)?.package = package;
        Ok(())
    }

    /// Mark a type as declared in the analyzed sources. There is no way back.
    pub fn set_user_defined(&mut self, ty: TypeId) -> Result<()> {
        self.type_mut(ty)?.user_defined = true;
        Ok(())
    }

    pub fn set_modifiers(&mut self, ty: TypeId, modifiers: Modifiers) -> Result<()> {
        self.type_mut(ty)?.modifiers = modifiers;
        Ok(())
    }

    pub fn set_source_file(&mut self, ty: TypeId, file: impl Into<PathBuf>) -> Result<()> {
        self.type_mut(ty)?.source_file = Some(file.into());
        Ok(())
    }

    pub fn is_user_defined(&self, ty: TypeId) -> bool {
        self.get_type(ty).is_some_and(TypeNode::is_user_defined)
    }

    pub fn is_abstract(&self, ty: TypeId) -> bool {
        self.get_type(ty).is_some_and(TypeNode::is_abstract)
    }

    pub fn modifiers(&self, ty: TypeId) -> Modifiers {
        self.get_type(ty)
            .map(TypeNode::modifiers)
            .unwrap_or_default()
    }

    pub fn package_of(&self, ty: TypeId) -> Option<PackageId> {
        self.get_type(ty).and_then(TypeNode::package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_is_implicitly_abstract() {
        let mut model = CodeModel::new();
        let iface = model.add_interface("Countable");
        let class = model.add_class("Collection");

        assert!(model.is_abstract(iface));
        assert!(model.modifiers(iface).contains(Modifiers::IMPLICIT_ABSTRACT));
        assert!(!model.is_abstract(class));

        model.set_modifiers(class, Modifiers::ABSTRACT).unwrap();
        assert!(model.is_abstract(class));
        assert_eq!(model.modifiers(class), Modifiers::ABSTRACT);
    }

    #[test]
    fn test_user_defined_defaults_to_false_and_sticks() {
        let mut model = CodeModel::new();
        let class = model.add_class("Foo");
        assert!(!model.is_user_defined(class));

        model.set_user_defined(class).unwrap();
        model.set_user_defined(class).unwrap();
        assert!(model.is_user_defined(class));
    }

    #[test]
    fn test_parent_reference_last_write_wins() {
        let mut model = CodeModel::new();
        let class = model.add_class("Child");
        model
            .set_parent_class_reference(class, TypeReference::class("A").unwrap())
            .unwrap();
        model
            .set_parent_class_reference(class, TypeReference::class("B").unwrap())
            .unwrap();

        let node = model.get_type(class).unwrap();
        assert_eq!(node.parent_reference().unwrap().name(), "B");
    }

    #[test]
    fn test_wrong_reference_kinds_are_rejected() {
        let mut model = CodeModel::new();
        let class = model.add_class("Child");
        let iface = model.add_interface("Contract");

        let err = model
            .set_parent_class_reference(class, TypeReference::interface("X").unwrap())
            .unwrap_err();
        assert!(matches!(err, DependError::InvalidArgument(_)));

        let err = model
            .set_parent_class_reference(iface, TypeReference::class("X").unwrap())
            .unwrap_err();
        assert!(matches!(err, DependError::InvalidArgument(_)));

        let err = model
            .add_interface_reference(class, TypeReference::class("X").unwrap())
            .unwrap_err();
        assert!(matches!(err, DependError::InvalidArgument(_)));
    }

    #[test]
    fn test_interface_references_keep_duplicates_in_order() {
        let mut model = CodeModel::new();
        let class = model.add_class("C");
        for name in ["I1", "I2", "I1"] {
            model
                .add_interface_reference(class, TypeReference::interface(name).unwrap())
                .unwrap();
        }
        let names: Vec<&str> = model
            .get_type(class)
            .unwrap()
            .interface_references()
            .iter()
            .map(TypeReference::name)
            .collect();
        assert_eq!(names, vec!["I1", "I2", "I1"]);
    }

    #[test]
    fn test_modifier_keywords() {
        let mods = Modifiers::from_keyword("Final").unwrap() | Modifiers::PUBLIC;
        assert!(mods.contains(Modifiers::FINAL));
        assert!(mods.contains(Modifiers::PUBLIC));
        assert!(!mods.contains(Modifiers::ABSTRACT));
        assert_eq!(Modifiers::from_keyword("var"), None);
    }
}
