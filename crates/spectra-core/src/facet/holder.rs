//! Facet storage shared by every metamodel element

use super::{downcast_facet, Facet, FacetLookup, FacetType};
use crate::ident::Identifier;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Per-holder facet registry, keyed by facet type
#[derive(Default)]
pub struct Facets {
    by_type: RwLock<FxHashMap<FacetType, Arc<dyn Facet>>>,
}

impl Facets {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a facet under its primary type, replacing any previous one
    pub fn add(&self, facet: Arc<dyn Facet>) -> Option<Arc<dyn Facet>> {
        let facet_type = facet.facet_type();
        self.by_type.write().insert(facet_type, facet)
    }

    /// Register a facet under every type it reports
    pub fn add_multi_typed(&self, facet: Arc<dyn Facet>) {
        let mut by_type = self.by_type.write();
        for facet_type in facet.facet_types() {
            by_type.insert(facet_type, facet.clone());
        }
    }

    /// Remove the facet registered under `facet_type`
    pub fn remove(&self, facet_type: FacetType) -> Option<Arc<dyn Facet>> {
        self.by_type.write().remove(&facet_type)
    }

    /// Directly registered facet of this type, concrete or no-op
    pub fn get(&self, facet_type: FacetType) -> Option<Arc<dyn Facet>> {
        self.by_type.read().get(&facet_type).cloned()
    }

    /// Directly registered facet, classified
    pub fn lookup(&self, facet_type: FacetType) -> FacetLookup {
        FacetLookup::from_facet(self.get(facet_type))
    }

    /// Whether any facet (including a no-op) is registered under this type
    pub fn contains(&self, facet_type: FacetType) -> bool {
        self.by_type.read().contains_key(&facet_type)
    }

    /// Registered facet types, sorted
    pub fn facet_types(&self) -> Vec<FacetType> {
        let mut types: Vec<FacetType> = self.by_type.read().keys().copied().collect();
        types.sort();
        types
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.by_type.read().len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_type.read().is_empty()
    }
}

impl fmt::Debug for Facets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.facet_types()).finish()
    }
}

/// A metamodel element that carries facets
///
/// Implemented by specifications, associations, actions and parameters.
/// The provided lookups only consult this holder's own registry; an
/// [`ObjectSpecification`](crate::spec::ObjectSpecification) overrides
/// [`FacetHolder::lookup_facet`] to walk its type hierarchy.
pub trait FacetHolder {
    /// The facet registry of this holder
    fn facets(&self) -> &Facets;

    /// Identifier of this holder
    fn identifier(&self) -> &Identifier;

    /// Attach a facet under its primary type
    fn add_facet(&self, facet: Arc<dyn Facet>) {
        self.facets().add(facet);
    }

    /// Attach a facet under every type it reports
    fn add_multi_typed_facet(&self, facet: Arc<dyn Facet>) {
        self.facets().add_multi_typed(facet);
    }

    /// Detach the facet of this type
    fn remove_facet(&self, facet_type: FacetType) -> Option<Arc<dyn Facet>> {
        self.facets().remove(facet_type)
    }

    /// Resolve a facet of this type
    fn lookup_facet(&self, facet_type: FacetType) -> FacetLookup {
        self.facets().lookup(facet_type)
    }

    /// Resolved facet, concrete or no-op
    fn get_facet(&self, facet_type: FacetType) -> Option<Arc<dyn Facet>> {
        self.lookup_facet(facet_type).into_facet()
    }

    /// Whether a concrete facet of this type resolves
    fn contains_facet(&self, facet_type: FacetType) -> bool {
        self.lookup_facet(facet_type).is_concrete()
    }

    /// Resolved concrete facet downcast to `T`
    fn facet<T: Facet>(&self, facet_type: FacetType) -> Option<Arc<T>>
    where
        Self: Sized,
    {
        self.lookup_facet(facet_type)
            .into_concrete()
            .and_then(downcast_facet::<T>)
    }
}
