use depend::{
    CodeModel, DependConfig, FnFilter, ModelBuilder, ModelDeclarations, Package, TypeId, TypeNode,
    TypeReference,
};

fn extend(model: &mut CodeModel, ty: TypeId, parent: &str) {
    model
        .set_parent_class_reference(ty, TypeReference::class(parent).unwrap())
        .unwrap();
}

fn implement(model: &mut CodeModel, ty: TypeId, interface: &str) {
    model
        .add_interface_reference(ty, TypeReference::interface(interface).unwrap())
        .unwrap();
}

#[test]
fn test_member_ownership_moves_between_types() {
    let mut model = CodeModel::new();
    let a = model.add_class("A");
    let b = model.add_class("B");
    let m = model.new_method("run");

    model.add_member(a, m).unwrap();
    model.add_member(b, m).unwrap();

    assert_eq!(model.members(a).count(), 0, "A no longer lists the method");
    assert_eq!(
        model.members(b).map(|x| x.id()).collect::<Vec<_>>(),
        vec![m]
    );
    assert_eq!(model.get_member(m).unwrap().owner(), Some(b));
}

#[test]
fn test_removing_absent_member_is_noop() {
    let mut model = CodeModel::new();
    let a = model.add_class("A");
    let kept = model.new_method("kept");
    let stranger = model.new_method("stranger");
    model.add_member(a, kept).unwrap();

    model.remove_member(a, stranger).unwrap();

    assert_eq!(model.members(a).map(|x| x.id()).collect::<Vec<_>>(), vec![kept]);
}

#[test]
fn test_transitive_interfaces_in_declaration_order() {
    let mut model = CodeModel::new();
    let i1 = model.add_interface("I1");
    let i2 = model.add_interface("I2");
    let c = model.add_class("C");
    implement(&mut model, i1, "I2");
    implement(&mut model, c, "I1");

    assert_eq!(model.interfaces(c), vec![i1, i2]);
}

#[test]
fn test_parent_interfaces_are_inherited() {
    let mut model = CodeModel::new();
    let ibase = model.add_interface("IBase");
    let base = model.add_class("Base");
    let derived = model.add_class("Derived");
    implement(&mut model, base, "IBase");
    extend(&mut model, derived, "Base");

    assert!(model.interfaces(derived).contains(&ibase));
    assert!(model.is_subtype_of(derived, ibase));
    assert!(model.is_subtype_of(derived, base));
}

#[test]
fn test_filter_hides_parent_without_deleting_edge() {
    let mut model = CodeModel::new();
    let p = model.add_class("P");
    let child = model.add_class("Child");
    extend(&mut model, child, "P");

    let id = model
        .filters_mut()
        .add(FnFilter(|n: &TypeNode, _: Option<&Package>| n.name() != "P"));
    assert_eq!(model.parent_class(child), None);
    assert_eq!(model.dependencies(child).len(), 1, "the reference is untouched");

    assert!(model.filters_mut().remove(id));
    assert_eq!(model.parent_class(child), Some(p));
}

#[test]
fn test_diamond_interfaces_listed_once() {
    let mut model = CodeModel::new();
    let ibase = model.add_interface("IBase");
    let i1 = model.add_interface("I1");
    let i2 = model.add_interface("I2");
    let c = model.add_class("C");
    implement(&mut model, i1, "IBase");
    implement(&mut model, i2, "IBase");
    implement(&mut model, c, "I1");
    implement(&mut model, c, "I2");

    let closure = model.interfaces(c);
    assert_eq!(closure, vec![i1, ibase, i2]);
    assert_eq!(closure.iter().filter(|&&t| t == ibase).count(), 1);
}

#[test]
fn test_plain_class_has_no_interfaces_or_dependencies() {
    let mut model = CodeModel::new();
    let a = model.add_class("A");
    assert!(model.interfaces(a).is_empty());
    assert!(model.dependencies(a).is_empty());
}

#[test]
fn test_dependency_on_implemented_interface() {
    let mut model = CodeModel::new();
    model.add_interface("Animal");
    let dog = model.add_class("Dog");
    implement(&mut model, dog, "Animal");

    let deps = model.dependencies(dog);
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].name(), "Animal");
}

#[test]
fn test_cyclic_interfaces_terminate() {
    let mut model = CodeModel::new();
    let a = model.add_interface("A");
    let b = model.add_interface("B");
    implement(&mut model, a, "B");
    implement(&mut model, b, "A");

    assert_eq!(model.interfaces(a), vec![b]);
    assert_eq!(model.interfaces(b), vec![a]);
}

#[test]
fn test_build_from_declarations_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(
        &path,
        r#"{
          "packages": [
            {
              "name": "App\\Model",
              "classes": [
                { "name": "App\\Model\\Dog", "parent": "App\\Model\\Pet",
                  "interfaces": ["Vendor\\Noisy"],
                  "methods": [{ "name": "bark", "modifiers": ["public"] }] },
                { "name": "App\\Model\\Pet", "modifiers": ["abstract"] }
              ]
            }
          ]
        }"#,
    )
    .unwrap();

    let config = DependConfig::default();
    let declarations = ModelDeclarations::load(&path).unwrap();
    let model = ModelBuilder::new()
        .with_filters(config.filter_collection())
        .create_placeholders(config.model.create_placeholders)
        .build(&declarations)
        .unwrap();

    let dog = model.require_type("app\\model\\dog").unwrap();
    let pet = model.require_type("App\\Model\\Pet").unwrap();
    let noisy = model.require_type("Vendor\\Noisy").unwrap();

    assert_eq!(model.parent_class(dog), Some(pet));
    assert!(model.is_abstract(pet));
    assert!(!model.is_user_defined(noisy), "placeholders are referenced only");
    assert_eq!(model.interfaces(dog), vec![noisy]);
    assert_eq!(model.methods(dog).count(), 1);

    let report = model.report();
    assert_eq!(report.types.len(), 3);
    assert!(report.cycles.is_empty());
}
