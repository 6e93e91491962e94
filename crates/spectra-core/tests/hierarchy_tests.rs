//! Integration tests for specification loading and the type hierarchy
//!
//! Tests for:
//! - Single-node identity per type
//! - Supertype/subclass linking
//! - Cyclic and broken hierarchies
//! - Cache invalidation and lazy re-resolution

mod common;

use common::{name, zoo};
use spectra_core::descriptor::ActionDescriptor;
use spectra_core::facet::standard::IconFacet;
use spectra_core::{
    BeanSort, FacetHolder, FacetType, IntrospectionState, MetaModelError, ObjectSpecId,
    Persistability, SpecificationLoader, TypeCatalog, TypeDescriptor,
};
use std::sync::Arc;

fn loader_over(catalog: TypeCatalog) -> SpecificationLoader {
    SpecificationLoader::builder().source(catalog).build()
}

// ============================================================================
// Node identity
// ============================================================================

mod identity {
    use super::*;

    #[test]
    fn test_same_node_for_same_type() {
        let loader = zoo();
        let first = loader.load_specification(&name("dom.Dog")).unwrap();
        let second = loader.load_specification(&name("dom.Dog")).unwrap();
        let by_name = loader.load_by_name("dom.Dog").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &by_name));
    }

    #[test]
    fn test_superclass_link_is_cached_node() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        let animal = loader.load_specification(&name("dom.Animal")).unwrap();

        assert!(Arc::ptr_eq(&dog.superclass().unwrap(), &animal));
    }

    #[test]
    fn test_loading_registers_supertypes() {
        let loader = zoo();
        loader.load_specification(&name("dom.Dog")).unwrap();

        let names: Vec<String> = loader
            .all_specifications()
            .iter()
            .map(|spec| spec.full_name().to_string())
            .collect();
        assert!(names.contains(&"dom.Animal".to_string()));
        assert!(names.contains(&"dom.LivingThing".to_string()));
        assert!(names.contains(&"dom.Pet".to_string()));

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_unknown_type() {
        let loader = zoo();
        let err = loader.load_specification(&name("dom.Ghost")).unwrap_err();
        assert!(matches!(err, MetaModelError::UnknownType { .. }));
        assert!(loader.load_by_name("dom.Ghost").unwrap().is_none());
        assert!(loader.cached(&name("dom.Ghost")).is_none());
    }

    #[test]
    fn test_excluded_type_is_unknown() {
        let catalog = TypeCatalog::with_exclusions(vec!["internal.".to_string()]);
        catalog.register(TypeDescriptor::class("internal.Audit"));
        let loader = loader_over(catalog);

        assert!(loader.load_by_name("internal.Audit").unwrap().is_none());
    }

    #[test]
    fn test_lookup_by_logical_name() {
        let loader = zoo();
        let customer = loader
            .lookup_by_spec_id(&ObjectSpecId::new("customer"))
            .unwrap()
            .unwrap();
        assert_eq!(customer.full_name(), "dom.Customer");
        assert_eq!(customer.spec_id().as_str(), "customer");

        let again = loader
            .lookup_by_spec_id(&ObjectSpecId::new("customer"))
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&customer, &again));
        assert!(loader
            .lookup_by_spec_id(&ObjectSpecId::new("nobody"))
            .unwrap()
            .is_none());
    }
}

// ============================================================================
// Hierarchy queries
// ============================================================================

mod hierarchy {
    use super::*;

    #[test]
    fn test_is_of_type() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        let animal = loader.load_specification(&name("dom.Animal")).unwrap();
        let pet = loader.load_specification(&name("dom.Pet")).unwrap();
        let living = loader.load_specification(&name("dom.LivingThing")).unwrap();
        let customer = loader.load_specification(&name("dom.Customer")).unwrap();

        assert!(dog.is_of_type(&dog));
        assert!(dog.is_of_type(&animal));
        assert!(dog.is_of_type(&pet));
        assert!(dog.is_of_type(&living));
        assert!(!animal.is_of_type(&dog));
        assert!(!dog.is_of_type(&customer));
    }

    #[test]
    fn test_subclasses_register_reciprocally() {
        let loader = zoo();
        let animal = loader.load_specification(&name("dom.Animal")).unwrap();
        assert!(!animal.has_subclasses());

        loader.load_specification(&name("dom.Dog")).unwrap();
        loader.load_specification(&name("dom.Cat")).unwrap();
        assert!(animal.has_subclasses());

        let mut subclasses: Vec<String> = animal
            .subclasses()
            .iter()
            .map(|spec| spec.full_name().to_string())
            .collect();
        subclasses.sort();
        assert_eq!(subclasses, vec!["dom.Cat", "dom.Dog"]);

        let pet = loader.load_specification(&name("dom.Pet")).unwrap();
        assert_eq!(pet.subclasses().len(), 2);
    }

    #[test]
    fn test_interfaces_in_declaration_order() {
        let catalog = TypeCatalog::new();
        catalog.register(TypeDescriptor::interface("dom.Walks"));
        catalog.register(TypeDescriptor::interface("dom.Swims"));
        catalog.register(
            TypeDescriptor::class("dom.Duck")
                .implements("dom.Walks")
                .implements("dom.Swims"),
        );
        let loader = loader_over(catalog);

        let duck = loader.load_specification(&name("dom.Duck")).unwrap();
        let names: Vec<String> = duck
            .interfaces()
            .iter()
            .map(|i| i.short_name().to_string())
            .collect();
        assert_eq!(names, vec!["Walks", "Swims"]);
        assert!(duck.superclass().is_none());
    }

    #[test]
    fn test_element_specification() {
        let loader = zoo();
        let kennel = loader.load_specification(&name("dom.Kennel")).unwrap();
        assert!(kennel.is_collection());

        let element = kennel.element_specification().unwrap().unwrap();
        assert_eq!(element.full_name(), "dom.Animal");

        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        assert!(dog.element_specification().unwrap().is_none());
    }
}

// ============================================================================
// Introspection phases
// ============================================================================

mod introspection {
    use super::*;

    #[test]
    fn test_loaded_specification_is_full() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        assert_eq!(dog.introspection_state(), IntrospectionState::FullyIntrospected);
    }

    #[test]
    fn test_early_member_query_forces_introspection() {
        let loader = zoo();
        let dog = loader
            .load_specification_up_to(&name("dom.Dog"), IntrospectionState::NotIntrospected)
            .unwrap();
        assert_eq!(dog.introspection_state(), IntrospectionState::NotIntrospected);

        let associations = dog.associations().unwrap();
        assert_eq!(associations.len(), 1);
        assert!(dog.introspection_state() >= IntrospectionState::TypeAndMembersIntrospected);
    }

    #[test]
    fn test_members_are_built() {
        let loader = zoo();
        let animal = loader.load_specification(&name("dom.Animal")).unwrap();

        let name_prop = animal.association("name").unwrap().unwrap();
        assert!(!name_prop.is_collection());
        assert_eq!(name_prop.type_name().full_name(), "string");

        let offspring = animal.association("offspring").unwrap().unwrap();
        assert!(offspring.is_collection());
        assert_eq!(offspring.specification().unwrap().full_name(), "dom.Animal");

        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        let bark = dog.object_action("bark").unwrap().unwrap();
        assert_eq!(bark.parameters().len(), 1);
        assert_eq!(bark.parameters()[0].name(), "times");
    }

    #[test]
    fn test_display_names() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        assert_eq!(dog.singular_name(), "Dog");
        assert_eq!(dog.plural_name(), "Dogs");

        let pet = loader.load_specification(&name("dom.Pet")).unwrap();
        assert_eq!(pet.singular_name(), "Companion");
        assert_eq!(pet.plural_name(), "Companions");

        let service = loader.load_specification(&name("dom.ReportService")).unwrap();
        assert_eq!(service.singular_name(), "Report Service");
    }

    #[test]
    fn test_classification_is_inherited() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        assert_eq!(dog.bean_sort(), BeanSort::Entity);
        assert_eq!(dog.persistability(), Persistability::UserPersistable);
        assert!(dog.is_entity());

        let basket = loader.load_specification(&name("dom.Basket")).unwrap();
        assert_eq!(basket.bean_sort(), BeanSort::ViewModel);
        assert!(!basket.is_entity());

        let string = loader.load_specification(&name("string")).unwrap();
        assert_eq!(string.bean_sort(), BeanSort::Value);
    }

    #[test]
    fn test_load_all() {
        let loader = zoo();
        let all = loader.load_all().unwrap();
        assert_eq!(all.len(), loader.source().type_names().len());
        assert!(all
            .iter()
            .all(|spec| spec.introspection_state() == IntrospectionState::FullyIntrospected));
    }
}

// ============================================================================
// Broken hierarchies
// ============================================================================

mod broken_hierarchies {
    use super::*;

    #[test]
    fn test_cycle_is_rejected() {
        let catalog = TypeCatalog::new();
        catalog.register(TypeDescriptor::class("dom.A").extends("dom.B"));
        catalog.register(TypeDescriptor::class("dom.B").extends("dom.A"));
        let loader = loader_over(catalog);

        let err = loader.load_specification(&name("dom.A")).unwrap_err();
        match err {
            MetaModelError::CyclicHierarchy { chain } => {
                assert_eq!(chain, "dom.A -> dom.B -> dom.A");
            }
            other => panic!("expected a cyclic hierarchy error, got {other:?}"),
        }

        let a = loader.cached(&name("dom.A")).unwrap();
        assert_eq!(a.introspection_state(), IntrospectionState::NotIntrospected);
        assert!(matches!(
            a.associations(),
            Err(MetaModelError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_cycle_queries_terminate() {
        let catalog = TypeCatalog::new();
        catalog.register(TypeDescriptor::class("dom.A").extends("dom.B"));
        catalog.register(TypeDescriptor::class("dom.B").extends("dom.A"));
        catalog.register(TypeDescriptor::class("dom.C"));
        let loader = loader_over(catalog);

        assert!(loader.load_specification(&name("dom.A")).is_err());
        let b = loader.cached(&name("dom.B")).unwrap();
        let c = loader.load_specification(&name("dom.C")).unwrap();
        assert!(!b.is_of_type(&c));
    }

    #[test]
    fn test_self_extension_is_rejected() {
        let catalog = TypeCatalog::new();
        catalog.register(TypeDescriptor::class("dom.Ouroboros").extends("dom.Ouroboros"));
        let loader = loader_over(catalog);

        let err = loader.load_specification(&name("dom.Ouroboros")).unwrap_err();
        assert!(err.to_string().contains("dom.Ouroboros -> dom.Ouroboros"));
    }

    #[test]
    fn test_missing_supertype() {
        let catalog = TypeCatalog::new();
        catalog.register(TypeDescriptor::class("dom.Orphan").extends("dom.Missing"));
        let loader = loader_over(catalog);

        let err = loader.load_specification(&name("dom.Orphan")).unwrap_err();
        assert!(matches!(err, MetaModelError::MissingSupertype { .. }));
    }

    #[test]
    fn test_unknown_parameter_type_does_not_abort() {
        let catalog = TypeCatalog::new();
        catalog.register(
            TypeDescriptor::class("dom.Kiosk")
                .action(ActionDescriptor::new("sell").param("item", "dom.Unlisted")),
        );
        let loader = loader_over(catalog);

        let kiosk = loader.load_specification(&name("dom.Kiosk")).unwrap();
        assert_eq!(kiosk.declared_actions().unwrap().len(), 1);
    }
}

// ============================================================================
// Invalidation
// ============================================================================

mod invalidation {
    use super::*;

    #[test]
    fn test_invalidate_unknown_type() {
        let loader = zoo();
        assert!(!loader.invalidate_cache(&name("dom.Dog")));
    }

    #[test]
    fn test_invalidated_node_detaches_from_supertypes() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        let animal = loader.load_specification(&name("dom.Animal")).unwrap();
        assert!(animal.has_subclasses());

        assert!(loader.invalidate_cache(&name("dom.Dog")));
        assert!(dog.is_invalidated());
        assert!(!animal.has_subclasses());
        assert!(loader.cached(&name("dom.Dog")).is_none());

        let reloaded = loader.load_specification(&name("dom.Dog")).unwrap();
        assert!(!Arc::ptr_eq(&dog, &reloaded));
        assert!(animal.has_subclasses());
    }

    #[test]
    fn test_subclass_reresolves_invalidated_supertype() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        let old_animal = loader.load_specification(&name("dom.Animal")).unwrap();

        assert!(loader.invalidate_cache(&name("dom.Animal")));
        assert!(old_animal.is_invalidated());

        let new_animal = loader.load_specification(&name("dom.Animal")).unwrap();
        assert!(!Arc::ptr_eq(&old_animal, &new_animal));

        let superclass = dog.superclass().unwrap();
        assert!(Arc::ptr_eq(&superclass, &new_animal));
        assert!(new_animal.has_subclasses());
        assert!(dog.is_of_type(&new_animal));

        let cached_dog = loader.cached(&name("dom.Dog")).unwrap();
        assert!(Arc::ptr_eq(&cached_dog, &dog));
    }

    #[test]
    fn test_reloaded_supertype_lists_existing_subclasses() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        let old_animal = loader.load_specification(&name("dom.Animal")).unwrap();

        assert!(loader.invalidate_cache(&name("dom.Animal")));
        let new_animal = loader.load_specification(&name("dom.Animal")).unwrap();

        assert!(new_animal.has_subclasses());
        let subclasses = new_animal.subclasses();
        assert!(subclasses.iter().any(|spec| Arc::ptr_eq(spec, &dog)));
        assert!(Arc::ptr_eq(&dog.superclass().unwrap(), &new_animal));
        assert!(!Arc::ptr_eq(&old_animal, &new_animal));
    }

    #[test]
    fn test_reresolved_supertype_keeps_facets() {
        let loader = zoo();
        let dog = loader.load_specification(&name("dom.Dog")).unwrap();
        loader.invalidate_cache(&name("dom.Animal"));

        let icon = dog
            .facet::<IconFacet>(FacetType::ICON)
            .expect("icon inherited from the reloaded superclass");
        assert_eq!(icon.value(), "animal");
        let living = loader.load_specification(&name("dom.LivingThing")).unwrap();
        assert!(dog.is_of_type(&living));
    }
}
