//! Shared domain fixtures for integration tests

#![allow(dead_code)]

use spectra_core::descriptor::{ActionDescriptor, ParameterDescriptor, PropertyDescriptor};
use spectra_core::managed::DomainObject;
use spectra_core::{
    Pojo, ProgrammingModel, SpecificationLoader, StaticServiceRegistry, TypeCatalog,
    TypeDescriptor, TypeName,
};

pub fn name(s: &str) -> TypeName {
    TypeName::new(s)
}

/// Animals, pets, a shop and two services
pub fn zoo_catalog() -> TypeCatalog {
    let catalog = TypeCatalog::new();

    catalog.register(TypeDescriptor::class("dom.LivingThing").abstract_type());
    catalog.register(
        TypeDescriptor::class("dom.Animal")
            .extends("dom.LivingThing")
            .abstract_type()
            .annotate("nature", "entity")
            .annotate("title", "{name}")
            .annotate("icon", "animal")
            .property("name", "string")
            .collection_of("offspring", "dom.Animal"),
    );
    catalog.register(TypeDescriptor::interface("dom.Pet").annotate("named", "Companion"));
    catalog.register(
        TypeDescriptor::class("dom.Dog")
            .extends("dom.Animal")
            .implements("dom.Pet")
            .property("name", "string")
            .action(ActionDescriptor::new("bark").param("times", "i64")),
    );
    catalog.register(
        TypeDescriptor::class("dom.Cat")
            .extends("dom.Animal")
            .implements("dom.Pet")
            .property("name", "string"),
    );
    catalog.register(TypeDescriptor::collection("dom.Kennel", "dom.Animal"));

    catalog.register(
        TypeDescriptor::class("dom.Customer")
            .logical_name("customer")
            .annotate("nature", "entity")
            .annotate("title", "name")
            .property("name", "string"),
    );
    catalog.register(TypeDescriptor::class("dom.Product").annotate("nature", "entity"));
    catalog.register(
        TypeDescriptor::class("dom.Basket")
            .annotate("nature", "view-model")
            .collection_of("items", "dom.Product"),
    );

    catalog.register(
        TypeDescriptor::class("dom.ReportService")
            .annotate("nature", "service")
            .action(ActionDescriptor::new("reportOn").param("customer", "dom.Customer"))
            .action(ActionDescriptor::new("compare").param("other", "dom.ReportService"))
            .action(
                ActionDescriptor::new("dump")
                    .param("customer", "dom.Customer")
                    .action_type(spectra_core::ActionType::Debug),
            )
            .action(
                ActionDescriptor::new("audit")
                    .param("customer", "dom.Customer")
                    .with_param(ParameterDescriptor::new("token", "string").annotate("hidden", "everywhere")),
            ),
    );
    catalog.register(
        TypeDescriptor::class("dom.VetService")
            .annotate("nature", "service")
            .action(ActionDescriptor::new("examine").param("animal", "dom.Animal"))
            .action(ActionDescriptor::new("vaccinate").param("pet", "dom.Pet")),
    );

    catalog.register(
        TypeDescriptor::class("dom.Account")
            .annotate("nature", "entity")
            .with_property(PropertyDescriptor::new("secret", "string").annotate("hidden", "everywhere")),
    );

    catalog
}

pub fn services() -> StaticServiceRegistry {
    StaticServiceRegistry::new(vec![
        DomainObject::builder("dom.ReportService").build(),
        DomainObject::builder("dom.VetService").build(),
    ])
}

pub fn zoo() -> SpecificationLoader {
    SpecificationLoader::builder()
        .source(zoo_catalog())
        .services(services())
        .build()
}

pub fn zoo_with(programming_model: ProgrammingModel) -> SpecificationLoader {
    SpecificationLoader::builder()
        .source(zoo_catalog())
        .programming_model(programming_model)
        .services(services())
        .build()
}

pub fn dog(name: &str) -> Pojo {
    DomainObject::builder("dom.Dog")
        .field("name", Pojo::from(name))
        .build()
}

pub fn customer(name: &str) -> Pojo {
    DomainObject::builder("dom.Customer")
        .field("name", Pojo::from(name))
        .build()
}
