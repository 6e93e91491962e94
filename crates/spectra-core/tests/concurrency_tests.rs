//! Integration tests for concurrent use of one loader
//!
//! The specification graph is shared by every thread; each type must still
//! be introspected once and resolve to one node.

mod common;

use common::name;
use spectra_core::factory::TypeContext;
use spectra_core::{
    ActionType, FacetFactory, IntrospectionState, Pojo, ProgrammingModel, Result, ServiceRegistry,
    SpecificationLoader, StaticServiceRegistry, TypeCatalog, TypeDescriptor,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;

#[derive(Default)]
struct CountingFactory {
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl FacetFactory for CountingFactory {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn process_type(&self, cx: &TypeContext<'_>) -> Result<()> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(cx.descriptor.name.to_string())
            .or_default() += 1;
        Ok(())
    }
}

struct CountingRegistry {
    inner: StaticServiceRegistry,
    calls: Arc<AtomicUsize>,
}

impl ServiceRegistry for CountingRegistry {
    fn services(&self) -> Vec<Pojo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.services()
    }
}

/// While populating `dom.Parent`, lets the other thread start on
/// `dom.Child` and then loads `dom.Child` itself
struct CrossLoadingFactory {
    started: Arc<Barrier>,
    fired: AtomicBool,
}

impl FacetFactory for CrossLoadingFactory {
    fn name(&self) -> &'static str {
        "cross-loading"
    }

    fn process_type(&self, cx: &TypeContext<'_>) -> Result<()> {
        if cx.descriptor.name.full_name() != "dom.Parent" || self.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.started.wait();
        thread::sleep(Duration::from_millis(200));
        cx.loader.load_specification(&name("dom.Child"))?;
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

mod loading {
    use super::*;

    #[test]
    fn test_threads_share_one_node() {
        let factory = CountingFactory::default();
        let calls = factory.calls.clone();
        let loader = common::zoo_with(ProgrammingModel::standard().with(factory));
        let barrier = Barrier::new(THREADS);

        let specs: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        loader.load_specification(&name("dom.Dog")).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for spec in &specs {
            assert!(Arc::ptr_eq(spec, &specs[0]));
            assert_eq!(spec.introspection_state(), IntrospectionState::FullyIntrospected);
        }

        let calls = calls.lock().unwrap();
        assert!(calls.values().all(|&count| count == 1));
        assert_eq!(calls["dom.Dog"], 1);
    }

    #[test]
    fn test_siblings_share_supertypes() {
        let loader = common::zoo();
        let barrier = Barrier::new(THREADS);
        let types = ["dom.Dog", "dom.Cat", "dom.Animal", "dom.Pet"];

        std::thread::scope(|scope| {
            for i in 0..THREADS {
                let type_name = types[i % types.len()];
                let loader = &loader;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let spec = loader.load_specification(&name(type_name)).unwrap();
                    assert!(spec.singular_name().len() > 1);
                });
            }
        });

        let animal = loader.cached(&name("dom.Animal")).unwrap();
        let dog = loader.cached(&name("dom.Dog")).unwrap();
        let cat = loader.cached(&name("dom.Cat")).unwrap();
        assert!(Arc::ptr_eq(&dog.superclass().unwrap(), &animal));
        assert!(Arc::ptr_eq(&cat.superclass().unwrap(), &animal));
        assert_eq!(animal.subclasses().len(), 2);
    }

    #[test]
    fn test_crossed_population_completes() {
        let catalog = TypeCatalog::new();
        catalog.register(TypeDescriptor::class("dom.Parent"));
        catalog.register(TypeDescriptor::class("dom.Child").extends("dom.Parent"));
        let started = Arc::new(Barrier::new(2));
        let loader = SpecificationLoader::builder()
            .source(catalog)
            .programming_model(ProgrammingModel::standard().with(CrossLoadingFactory {
                started: started.clone(),
                fired: AtomicBool::new(false),
            }))
            .build();

        let (tx, rx) = mpsc::channel();
        {
            let (loader, tx) = (loader.clone(), tx.clone());
            thread::spawn(move || {
                let _ = tx.send(loader.load_specification(&name("dom.Parent")).is_ok());
            });
        }
        {
            let loader = loader.clone();
            thread::spawn(move || {
                started.wait();
                let _ = tx.send(loader.load_specification(&name("dom.Child")).is_ok());
            });
        }

        for _ in 0..2 {
            let loaded = rx
                .recv_timeout(Duration::from_secs(10))
                .expect("both threads finish populating");
            assert!(loaded);
        }

        let parent = loader.load_specification(&name("dom.Parent")).unwrap();
        let child = loader.load_specification(&name("dom.Child")).unwrap();
        assert_eq!(parent.introspection_state(), IntrospectionState::FullyIntrospected);
        assert_eq!(child.introspection_state(), IntrospectionState::FullyIntrospected);
        assert!(Arc::ptr_eq(&child.superclass().unwrap(), &parent));
        assert!(parent.has_subclasses());
    }

    #[test]
    fn test_loader_clones_share_cache() {
        let loader = common::zoo();
        let clone = loader.clone();

        let handle = std::thread::spawn(move || clone.load_specification(&name("dom.Customer")).unwrap());
        let from_thread = handle.join().unwrap();
        let local = loader.load_specification(&name("dom.Customer")).unwrap();
        assert!(Arc::ptr_eq(&from_thread, &local));
    }
}

// ============================================================================
// Contributions
// ============================================================================

mod contributions {
    use super::*;

    #[test]
    fn test_contributions_computed_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = SpecificationLoader::builder()
            .source(common::zoo_catalog())
            .services(CountingRegistry {
                inner: common::services(),
                calls: calls.clone(),
            })
            .build();
        let customer = loader.load_specification(&name("dom.Customer")).unwrap();
        let barrier = Barrier::new(THREADS);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        customer.contributed_actions(&[ActionType::User]).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for members in &results {
            assert!(Arc::ptr_eq(members, &results[0]));
        }
    }
}
