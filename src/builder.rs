//
//  builder.rs
//  Depend
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{DependError, Result};
use crate::filter::FilterCollection;
use crate::ident::{symbol_key, PackageId, TypeId};
use crate::model::CodeModel;
use crate::package::GLOBAL_PACKAGE;
use crate::reference::{ReferenceKind, TypeReference};
use crate::types::Modifiers;

/// Everything a parser reports about a body of source code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDeclarations {
    #[serde(default)]
    pub packages: Vec<PackageDeclaration>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDeclaration {
    pub name: String,
    #[serde(default)]
    pub classes: Vec<TypeDeclaration>,
    #[serde(default)]
    pub interfaces: Vec<TypeDeclaration>,
    #[serde(default)]
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    /// Parent class name (classes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Implemented (classes) or extended (interfaces) interface names.
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
    #[serde(default)]
    pub constants: Vec<ConstantDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstantDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ModelDeclarations {
    /// Load declarations from a `.json`, `.yaml`/`.yml` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(serde_json::from_str(&contents)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&contents)?),
            Some("toml") => Ok(toml::from_str(&contents)?),
            _ => Err(DependError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn type_count(&self) -> usize {
        self.packages
            .iter()
            .map(|p| p.classes.len() + p.interfaces.len())
            .sum()
    }
}

/// Builds a [`CodeModel`] from [`ModelDeclarations`].
///
/// Types are declared before any reference is wired, so declaration order
/// in the input does not matter.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    filters: FilterCollection,
    create_placeholders: bool,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: FilterCollection) -> Self {
        self.filters = filters;
        self
    }

    /// Declare referenced-but-missing types as non user defined types.
    pub fn create_placeholders(mut self, enabled: bool) -> Self {
        self.create_placeholders = enabled;
        self
    }

    pub fn build(self, declarations: &ModelDeclarations) -> Result<CodeModel> {
        debug!(
            package_count = declarations.packages.len(),
            type_count = declarations.type_count(),
            "building code model"
        );
        let mut model = CodeModel::with_filters(self.filters);

        // Phase 1: Declare packages, types, members and functions
        let mut declared: Vec<(TypeId, &TypeDeclaration)> = Vec::new();
        for package in &declarations.packages {
            let pkg = model.add_package(package.name.clone());

            for decl in &package.classes {
                let ty = model.add_class(decl.name.clone());
                declare_type(&mut model, pkg, ty, decl)?;
                declared.push((ty, decl));
            }
            for decl in &package.interfaces {
                let ty = model.add_interface(decl.name.clone());
                declare_type(&mut model, pkg, ty, decl)?;
                declared.push((ty, decl));
            }
            for name in &package.functions {
                let function = model.add_function(name.clone());
                model.add_function_to_package(pkg, function)?;
            }
        }

        // Phase 2: Wire parent and interface references
        for (ty, decl) in &declared {
            if let Some(parent) = &decl.parent {
                model.set_parent_class_reference(*ty, TypeReference::class(parent.clone())?)?;
            }
            for interface in &decl.interfaces {
                model.add_interface_reference(*ty, TypeReference::interface(interface.clone())?)?;
            }
        }

        // Phase 3: Placeholders for types the sources only reference
        let placeholders = if self.create_placeholders {
            declare_placeholders(&mut model)?
        } else {
            0
        };

        let stats = model.stats();
        info!(
            packages = stats.packages,
            classes = stats.classes,
            interfaces = stats.interfaces,
            placeholders,
            "code model built"
        );
        Ok(model)
    }
}

fn declare_type(
    model: &mut CodeModel,
    pkg: PackageId,
    ty: TypeId,
    decl: &TypeDeclaration,
) -> Result<()> {
    model.set_user_defined(ty)?;
    model.set_modifiers(ty, parse_modifiers(&decl.modifiers)?)?;
    if let Some(file) = &decl.file {
        model.set_source_file(ty, file.clone())?;
    }
    model.add_type_to_package(pkg, ty)?;

    for method in &decl.methods {
        let id = model.new_method_with(method.name.clone(), parse_modifiers(&method.modifiers)?);
        model.add_method(ty, id)?;
    }
    for constant in &decl.constants {
        let id = model.new_constant(constant.name.clone(), constant.value.as_deref());
        model.add_constant(ty, id)?;
    }
    Ok(())
}

fn parse_modifiers(keywords: &[String]) -> Result<Modifiers> {
    keywords.iter().try_fold(Modifiers::NONE, |acc, keyword| {
        Modifiers::from_keyword(keyword)
            .map(|m| acc | m)
            .ok_or_else(|| DependError::invalid(format!("unknown modifier `{keyword}`")))
    })
}

/// Declare every unresolvable reference target as a non user defined type,
/// filed under the namespace part of its name. A name that is implemented
/// anywhere becomes an interface. Returns how many were added.
fn declare_placeholders(model: &mut CodeModel) -> Result<usize> {
    let mut missing: Vec<(String, ReferenceKind)> = Vec::new();
    for ty in model.type_ids().collect::<Vec<_>>() {
        for reference in model.dependencies(ty) {
            if model.lookup(reference.name()).is_some() {
                continue;
            }
            let key = symbol_key(reference.name());
            match missing.iter_mut().find(|(name, _)| symbol_key(name) == key) {
                Some((_, kind)) => {
                    if reference.kind() == ReferenceKind::Interface {
                        *kind = ReferenceKind::Interface;
                    }
                }
                None => missing.push((reference.name().to_string(), reference.kind())),
            }
        }
    }

    for (name, kind) in &missing {
        let name = name.trim_start_matches('\\');
        let ty = match kind {
            ReferenceKind::Class => model.add_class(name),
            ReferenceKind::Interface => model.add_interface(name),
        };
        let pkg = model.add_package(namespace_of(name));
        model.add_type_to_package(pkg, ty)?;
        debug!(name, %kind, "declared placeholder type");
    }
    Ok(missing.len())
}

/// `Vendor\Lib\Base` -> `Vendor\Lib`, unqualified names -> `+global`.
fn namespace_of(name: &str) -> &str {
    match name.trim_start_matches('\\').rsplit_once('\\') {
        Some((namespace, _)) if !namespace.is_empty() => namespace,
        _ => GLOBAL_PACKAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zoo() -> ModelDeclarations {
        ModelDeclarations {
            packages: vec![PackageDeclaration {
                name: "Zoo".to_string(),
                classes: vec![TypeDeclaration {
                    name: "Dog".to_string(),
                    parent: Some("Vendor\\Base\\Pet".to_string()),
                    interfaces: vec!["Animal".to_string()],
                    modifiers: vec!["final".to_string()],
                    methods: vec![MethodDeclaration {
                        name: "bark".to_string(),
                        modifiers: vec!["public".to_string()],
                    }],
                    constants: vec![ConstantDeclaration {
                        name: "LEGS".to_string(),
                        value: Some("4".to_string()),
                    }],
                    file: Some(PathBuf::from("src/Dog.php")),
                }],
                interfaces: vec![TypeDeclaration {
                    name: "Animal".to_string(),
                    ..Default::default()
                }],
                functions: vec!["feed".to_string()],
            }],
        }
    }

    #[test]
    fn test_build_declares_and_wires() {
        let model = ModelBuilder::new().build(&zoo()).unwrap();
        let dog = model.lookup("Dog").unwrap();
        let animal = model.lookup("Animal").unwrap();

        assert!(model.is_user_defined(dog));
        assert!(model.modifiers(dog).contains(Modifiers::FINAL));
        assert_eq!(model.interfaces(dog), vec![animal]);
        assert_eq!(model.methods(dog).count(), 1);
        assert_eq!(model.constants(dog).count(), 1);
        assert_eq!(
            model.get_type(dog).unwrap().source_file(),
            Some(Path::new("src/Dog.php"))
        );

        let zoo = model.find_package("Zoo").unwrap();
        assert_eq!(model.package_types(zoo).count(), 2);
        assert_eq!(model.package_functions(zoo).count(), 1);

        // Parent was never declared and placeholders are off.
        assert_eq!(model.parent_class(dog), None);
        assert_eq!(model.lookup("Vendor\\Base\\Pet"), None);
    }

    #[test]
    fn test_placeholders_fill_missing_references() {
        let model = ModelBuilder::new()
            .create_placeholders(true)
            .build(&zoo())
            .unwrap();
        let dog = model.lookup("Dog").unwrap();
        let pet = model.parent_class(dog).expect("placeholder parent");

        assert!(!model.is_user_defined(pet));
        assert!(model.get_type(pet).unwrap().is_class());
        let vendor = model.find_package("Vendor\\Base").unwrap();
        assert_eq!(model.package_of(pet), Some(vendor));
    }

    #[test]
    fn test_placeholder_used_as_interface_becomes_interface() {
        let decls = ModelDeclarations {
            packages: vec![PackageDeclaration {
                name: "App".to_string(),
                classes: vec![
                    TypeDeclaration {
                        name: "A".to_string(),
                        parent: Some("Foo".to_string()),
                        ..Default::default()
                    },
                    TypeDeclaration {
                        name: "B".to_string(),
                        interfaces: vec!["foo".to_string()],
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
        };
        let model = ModelBuilder::new()
            .create_placeholders(true)
            .build(&decls)
            .unwrap();

        let foo = model.lookup("Foo").unwrap();
        let b = model.lookup("B").unwrap();
        assert!(model.get_type(foo).unwrap().is_interface());
        assert_eq!(model.stats().interfaces, 1, "one placeholder for both spellings");
        assert_eq!(model.interfaces(b), vec![foo]);
        assert!(model.is_subtype_of(b, foo));
    }

    #[test]
    fn test_interface_with_parent_is_rejected() {
        let mut decls = zoo();
        decls.packages[0].interfaces[0].parent = Some("Dog".to_string());
        let err = ModelBuilder::new().build(&decls).unwrap_err();
        assert!(matches!(err, DependError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_modifier_is_rejected() {
        let mut decls = zoo();
        decls.packages[0].classes[0].modifiers = vec!["sealed".to_string()];
        assert!(ModelBuilder::new().build(&decls).is_err());
    }

    #[test]
    fn test_namespace_of() {
        assert_eq!(namespace_of("\\Vendor\\Lib\\Base"), "Vendor\\Lib");
        assert_eq!(namespace_of("Base"), GLOBAL_PACKAGE);
    }

    #[test]
    fn test_load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("model.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        write!(f, "{}", serde_json::to_string(&zoo()).unwrap()).unwrap();
        let loaded = ModelDeclarations::load(&json_path).unwrap();
        assert_eq!(loaded.type_count(), 2);

        let yaml_path = dir.path().join("model.yaml");
        std::fs::write(
            &yaml_path,
            "packages:\n  - name: App\n    classes:\n      - name: Kernel\n        interfaces: [Runnable]\n",
        )
        .unwrap();
        let loaded = ModelDeclarations::load(&yaml_path).unwrap();
        assert_eq!(loaded.packages[0].classes[0].interfaces, vec!["Runnable"]);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.xml");
        std::fs::write(&path, "<model/>").unwrap();
        assert!(matches!(
            ModelDeclarations::load(&path),
            Err(DependError::UnsupportedFormat(_))
        ));
    }
}
