//! Integration tests driving the metamodel from a domain model file

use spectra_core::managed::DomainObject;
use spectra_core::{ActionType, DomainModel, ManagedObject, Pojo, SpecificationLoader, TypeName};
use std::path::PathBuf;

fn demo_model() -> DomainModel {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/spectra.toml");
    DomainModel::from_file(&path).unwrap()
}

fn demo_loader() -> SpecificationLoader {
    demo_model().loader()
}

#[test]
fn test_demo_model_loads_completely() {
    let loader = demo_loader();
    let all = loader.load_all().unwrap();

    assert!(all.iter().any(|spec| spec.full_name() == "dom.Dog"));
    assert!(all.iter().all(|spec| !spec.full_name().starts_with("internal.")));
    assert!(loader.load_by_name("internal.AuditLog").unwrap().is_none());
}

#[test]
fn test_demo_titles_and_icons() {
    let loader = demo_loader();
    let cat_spec = loader.load_specification(&TypeName::new("dom.Cat")).unwrap();
    let tom = DomainObject::builder("dom.Cat")
        .field("name", Pojo::from("Tom"))
        .field("species", Pojo::from("cat"))
        .build();

    let object = ManagedObject::of(cat_spec, Some(tom)).unwrap();
    assert_eq!(object.title().unwrap(), "Tom the cat");
    // the cat's own "none" icon gives way to the animal icon
    assert_eq!(object.icon_name().unwrap().as_deref(), Some("animal"));
}

#[test]
fn test_demo_names() {
    let loader = demo_loader();
    let pet = loader.load_specification(&TypeName::new("dom.Pet")).unwrap();
    assert_eq!(pet.singular_name(), "Companion");
    assert_eq!(pet.description(), "An animal kept at home");

    let basket = loader.load_specification(&TypeName::new("dom.Basket")).unwrap();
    assert_eq!(basket.plural_name(), "Baskets");
    assert_eq!(basket.singular_name(), "Basket");
}

#[test]
fn test_demo_contributions() {
    let loader = demo_loader();
    let dog = loader.load_specification(&TypeName::new("dom.Dog")).unwrap();

    let user = dog.contributed_actions(&[ActionType::User]).unwrap();
    assert_eq!(user.len(), 1);
    assert_eq!(user[0].actions().len(), 1);

    let all = dog.contributed_actions(&ActionType::ALL).unwrap();
    let names: Vec<String> = all[0]
        .actions()
        .iter()
        .map(|action| action.name().to_string())
        .collect();
    assert_eq!(names, vec!["examine", "vaccinate"]);

    let customer = loader.load_specification(&TypeName::new("dom.Customer")).unwrap();
    let report = customer.object_action("reportOn").unwrap().unwrap();
    assert_eq!(report.return_type(), Some(&TypeName::new("string")));
    assert!(customer.object_action("audit").unwrap().is_none());
}
