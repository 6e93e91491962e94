//! Specification loader
//!
//! Owns the cache of specification nodes, keyed by type name. A node is
//! registered bare before its introspection starts, so recursive lookups
//! triggered while populating it (a supertype naming it, a factory
//! cross-referencing it) find the existing node instead of recursing.
//!
//! Population of one node is serialized by a per-node reentrant lock. A
//! same-thread re-entry during population returns the partially populated
//! node; other threads block until population completes, unless the
//! populating thread is itself waiting on them, in which case the request
//! also answers with the partial node.

mod introspector;
pub(crate) mod naming;
mod waits;

use crate::descriptor::{ClassSource, TypeCatalog};
use crate::error::{MetaModelError, Result};
use crate::factory::ProgrammingModel;
use crate::ident::{ObjectSpecId, TypeName};
use crate::managed::Pojo;
use crate::services::{NoServices, ServiceRegistry};
use crate::spec::{IntrospectionState, ObjectSpecification};
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use waits::WaitGraph;

pub(crate) struct LoaderInner {
    source: Arc<dyn ClassSource>,
    programming_model: ProgrammingModel,
    services: Arc<dyn ServiceRegistry>,
    cache: DashMap<TypeName, Arc<ObjectSpecification>>,
    waits: WaitGraph,
    /// Subclasses of invalidated nodes, relinked when the type is reloaded
    orphans: DashMap<TypeName, Vec<Weak<ObjectSpecification>>>,
}

/// Non-owning handle from metamodel elements back to their loader
#[derive(Clone)]
pub(crate) struct LoaderRef(Weak<LoaderInner>);

impl LoaderRef {
    pub(crate) fn upgrade(&self) -> Result<SpecificationLoader> {
        self.0
            .upgrade()
            .map(|inner| SpecificationLoader { inner })
            .ok_or_else(|| MetaModelError::IllegalState("specification loader was dropped".to_string()))
    }
}

/// Builder for [`SpecificationLoader`]
pub struct SpecificationLoaderBuilder {
    source: Option<Arc<dyn ClassSource>>,
    programming_model: ProgrammingModel,
    services: Arc<dyn ServiceRegistry>,
}

impl SpecificationLoaderBuilder {
    /// Source of reflected type descriptions
    pub fn source(mut self, source: impl ClassSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Shared source of reflected type descriptions
    pub fn shared_source(mut self, source: Arc<dyn ClassSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Facet factories run during introspection
    pub fn programming_model(mut self, programming_model: ProgrammingModel) -> Self {
        self.programming_model = programming_model;
        self
    }

    /// Services scanned for contributed actions
    pub fn services(mut self, services: impl ServiceRegistry + 'static) -> Self {
        self.services = Arc::new(services);
        self
    }

    /// Build the loader; without a source only the builtin value types exist
    pub fn build(self) -> SpecificationLoader {
        let source = self
            .source
            .unwrap_or_else(|| Arc::new(TypeCatalog::new()));
        SpecificationLoader {
            inner: Arc::new(LoaderInner {
                source,
                programming_model: self.programming_model,
                services: self.services,
                cache: DashMap::new(),
                waits: WaitGraph::default(),
                orphans: DashMap::new(),
            }),
        }
    }
}

/// Process-scoped registry of specifications
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct SpecificationLoader {
    inner: Arc<LoaderInner>,
}

impl SpecificationLoader {
    /// Start building a loader with the standard programming model
    pub fn builder() -> SpecificationLoaderBuilder {
        SpecificationLoaderBuilder {
            source: None,
            programming_model: ProgrammingModel::standard(),
            services: Arc::new(NoServices),
        }
    }

    pub(crate) fn downgrade(&self) -> LoaderRef {
        LoaderRef(Arc::downgrade(&self.inner))
    }

    /// The programming model applied during introspection
    pub fn programming_model(&self) -> &ProgrammingModel {
        &self.inner.programming_model
    }

    /// The class source backing this loader
    pub fn source(&self) -> &Arc<dyn ClassSource> {
        &self.inner.source
    }

    /// Load the fully introspected specification of `type_name`
    ///
    /// Returns the same node for the same type on every call. Fails with
    /// [`MetaModelError::UnknownType`] if the source cannot describe the
    /// type, or with the error that aborted its introspection.
    pub fn load_specification(&self, type_name: &TypeName) -> Result<Arc<ObjectSpecification>> {
        self.load_specification_up_to(type_name, IntrospectionState::FullyIntrospected)
    }

    /// Load a specification, introspecting it at least up to `state`
    pub fn load_specification_up_to(
        &self,
        type_name: &TypeName,
        state: IntrospectionState,
    ) -> Result<Arc<ObjectSpecification>> {
        let spec = self.register(type_name)?;
        self.introspect_up_to(&spec, state)?;
        if spec.introspection_state() >= IntrospectionState::TypeAndMembersIntrospected {
            self.adopt_orphans(&spec);
        }
        Ok(spec)
    }

    /// Load by fully-qualified name; `Ok(None)` if the name is unknown or
    /// filtered out by the source
    pub fn load_by_name(&self, name: &str) -> Result<Option<Arc<ObjectSpecification>>> {
        let type_name = TypeName::new(name);
        if !self.inner.cache.contains_key(&type_name) && self.inner.source.describe(&type_name).is_none() {
            tracing::debug!(name, "no specification for name");
            return Ok(None);
        }
        self.load_specification(&type_name).map(Some)
    }

    /// Force `spec` to full introspection if it is not there yet
    pub fn introspect_if_required(&self, spec: &Arc<ObjectSpecification>) -> Result<()> {
        self.introspect_up_to(spec, IntrospectionState::FullyIntrospected)
    }

    /// The cached specification, in whatever state it is in
    pub fn cached(&self, type_name: &TypeName) -> Option<Arc<ObjectSpecification>> {
        self.inner.cache.get(type_name).map(|entry| entry.value().clone())
    }

    /// Every registered specification, sorted by type name
    pub fn all_specifications(&self) -> Vec<Arc<ObjectSpecification>> {
        let mut specs: Vec<Arc<ObjectSpecification>> = self
            .inner
            .cache
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        specs.sort_by(|a, b| a.type_name().cmp(b.type_name()));
        specs
    }

    /// Load every type the source can describe
    pub fn load_all(&self) -> Result<Vec<Arc<ObjectSpecification>>> {
        for type_name in self.inner.source.type_names() {
            self.load_specification(&type_name)?;
        }
        Ok(self.all_specifications())
    }

    /// Find a specification by its logical name
    pub fn lookup_by_spec_id(&self, spec_id: &ObjectSpecId) -> Result<Option<Arc<ObjectSpecification>>> {
        if let Some(spec) = self
            .inner
            .cache
            .iter()
            .find(|entry| entry.value().spec_id() == spec_id)
            .map(|entry| entry.value().clone())
        {
            return Ok(Some(spec));
        }

        for type_name in self.inner.source.type_names() {
            let Some(descriptor) = self.inner.source.describe(&type_name) else {
                continue;
            };
            let logical = descriptor.logical_name.as_deref().unwrap_or(type_name.full_name());
            if logical == spec_id.as_str() {
                return self.load_specification(&type_name).map(Some);
            }
        }
        Ok(None)
    }

    /// Remove a specification from the cache
    ///
    /// The node is marked invalidated and detached from its supertypes'
    /// subclass lists; every node's memoized contributions are dropped.
    /// Nodes still linking to the old node re-resolve it on next access,
    /// or are relinked as soon as the type is loaded again.
    pub fn invalidate_cache(&self, type_name: &TypeName) -> bool {
        let Some((_, spec)) = self.inner.cache.remove(type_name) else {
            return false;
        };
        let orphans: Vec<Weak<ObjectSpecification>> =
            spec.subclasses().iter().map(Arc::downgrade).collect();
        if !orphans.is_empty() {
            self.inner
                .orphans
                .entry(type_name.clone())
                .or_default()
                .extend(orphans);
        }
        spec.invalidate();

        let remaining: Vec<Arc<ObjectSpecification>> = self
            .inner
            .cache
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for other in remaining {
            other.clear_contributions();
        }

        tracing::warn!(spec = %type_name, "specification invalidated");
        true
    }

    /// Service instances scanned for contributed actions
    pub fn services(&self) -> Vec<Pojo> {
        self.inner.services.services()
    }

    /// Number of registered specifications
    pub fn len(&self) -> usize {
        self.inner.cache.len()
    }

    /// True if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.inner.cache.is_empty()
    }

    fn register(&self, type_name: &TypeName) -> Result<Arc<ObjectSpecification>> {
        if let Some(entry) = self.inner.cache.get(type_name) {
            return Ok(entry.value().clone());
        }

        let descriptor = self
            .inner
            .source
            .describe(type_name)
            .ok_or_else(|| MetaModelError::UnknownType {
                value: type_name.to_string(),
            })?;

        let spec = self
            .inner
            .cache
            .entry(type_name.clone())
            .or_insert_with(|| {
                tracing::debug!(spec = %type_name, "specification registered");
                ObjectSpecification::new(descriptor, self.downgrade())
            })
            .value()
            .clone();
        Ok(spec)
    }

    fn adopt_orphans(&self, spec: &Arc<ObjectSpecification>) {
        if self.inner.orphans.is_empty() {
            return;
        }
        let Some((_, orphans)) = self.inner.orphans.remove(spec.type_name()) else {
            return;
        };
        for orphan in orphans.iter().filter_map(Weak::upgrade) {
            if !orphan.is_invalidated() && orphan.adopt_supertype(spec) {
                tracing::debug!(spec = %orphan.type_name(), supertype = %spec.type_name(), "relinked to reloaded supertype");
            }
        }
    }

    pub(crate) fn introspect_up_to(
        &self,
        spec: &Arc<ObjectSpecification>,
        state: IntrospectionState,
    ) -> Result<()> {
        if spec.introspection_state() >= state {
            return Ok(());
        }

        let _lock = match spec.try_lock_introspection() {
            Some(lock) => lock,
            None => {
                if !self.inner.waits.begin_wait(spec.type_name()) {
                    tracing::debug!(spec = %spec.type_name(), "populating thread waits on this one; using partial node");
                    return Ok(());
                }
                let lock = spec.lock_introspection();
                self.inner.waits.end_wait();
                lock
            }
        };
        if spec.is_introspecting() {
            tracing::trace!(spec = %spec.type_name(), "re-entrant request sees partial node");
            return Ok(());
        }
        if spec.introspection_state() >= state {
            return Ok(());
        }

        let _flag = IntrospectingFlag::raise(&self.inner.waits, spec);
        introspector::introspect(self, spec, state).inspect_err(|err| {
            tracing::warn!(spec = %spec.type_name(), error = %err, "introspection failed");
        })
    }
}

impl fmt::Debug for SpecificationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationLoader")
            .field("specifications", &self.inner.cache.len())
            .field("programming_model", &self.inner.programming_model)
            .finish()
    }
}

/// Marks a node as under population by the current thread for the
/// lifetime of the guard
struct IntrospectingFlag<'a> {
    waits: &'a WaitGraph,
    spec: &'a ObjectSpecification,
}

impl<'a> IntrospectingFlag<'a> {
    fn raise(waits: &'a WaitGraph, spec: &'a ObjectSpecification) -> Self {
        spec.set_introspecting(true);
        waits.acquire(spec.type_name());
        IntrospectingFlag { waits, spec }
    }
}

impl Drop for IntrospectingFlag<'_> {
    fn drop(&mut self) {
        self.waits.release(self.spec.type_name());
        self.spec.set_introspecting(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;

    fn loader() -> SpecificationLoader {
        let catalog = TypeCatalog::with_exclusions(vec!["internal.".to_string()]);
        catalog.register(TypeDescriptor::class("dom.Animal"));
        catalog.register(TypeDescriptor::class("dom.Dog").extends("dom.Animal"));
        catalog.register(TypeDescriptor::class("internal.Hidden"));
        SpecificationLoader::builder().source(catalog).build()
    }

    #[test]
    fn test_load_by_name_not_found_is_none() {
        let loader = loader();
        assert!(loader.load_by_name("dom.Missing").unwrap().is_none());
        assert!(loader.load_by_name("internal.Hidden").unwrap().is_none());
        assert!(loader.cached(&TypeName::new("dom.Missing")).is_none());
    }

    #[test]
    fn test_load_specification_unknown_type_fails() {
        let err = loader()
            .load_specification(&TypeName::new("dom.Missing"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot determine type of dom.Missing");
    }

    #[test]
    fn test_load_up_to_stops_at_requested_state() {
        let loader = loader();
        let dog = loader
            .load_specification_up_to(
                &TypeName::new("dom.Dog"),
                IntrospectionState::TypeAndMembersIntrospected,
            )
            .unwrap();
        assert_eq!(
            dog.introspection_state(),
            IntrospectionState::TypeAndMembersIntrospected
        );

        loader.introspect_if_required(&dog).unwrap();
        assert_eq!(dog.introspection_state(), IntrospectionState::FullyIntrospected);
    }

    #[test]
    fn test_all_specifications_sorted() {
        let loader = loader();
        loader.load_specification(&TypeName::new("dom.Dog")).unwrap();
        let names: Vec<String> = loader
            .all_specifications()
            .iter()
            .map(|s| s.full_name().to_string())
            .collect();
        assert_eq!(names, vec!["dom.Animal", "dom.Dog"]);
    }

    #[test]
    fn test_lookup_by_logical_name() {
        let catalog = TypeCatalog::new();
        catalog.register(TypeDescriptor::class("dom.customer.Customer").logical_name("customer"));
        let loader = SpecificationLoader::builder().source(catalog).build();

        let spec = loader
            .lookup_by_spec_id(&ObjectSpecId::new("customer"))
            .unwrap()
            .unwrap();
        assert_eq!(spec.full_name(), "dom.customer.Customer");
        assert!(loader
            .lookup_by_spec_id(&ObjectSpecId::new("nobody"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalidate_unknown_is_noop() {
        assert!(!loader().invalidate_cache(&TypeName::new("dom.Animal")));
    }
}
