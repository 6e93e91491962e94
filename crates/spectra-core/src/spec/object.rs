//! Specification nodes

use super::contributions;
use super::member::{ActionMember, Contributed, ObjectAction, ObjectAssociation};
use super::{ActionType, BeanSort, IntrospectionState, Persistability};
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{MetaModelError, Result};
use crate::facet::{resolve_facet, FacetHolder, FacetLookup, FacetType, Facets};
use crate::ident::{Identifier, ObjectSpecId, TypeName};
use crate::loader::{naming, LoaderRef, SpecificationLoader};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard, RwLock};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

type ContributionCell = Arc<OnceCell<Arc<[ActionMember]>>>;

#[derive(Default)]
struct Hierarchy {
    superclass: Option<Arc<ObjectSpecification>>,
    interfaces: Vec<Arc<ObjectSpecification>>,
}

#[derive(Default)]
struct Members {
    associations: Vec<Arc<ObjectAssociation>>,
    actions: Vec<Arc<ObjectAction>>,
}

/// Display metadata and classification, finalized by the last pass
#[derive(Debug, Clone)]
pub(crate) struct Details {
    pub(crate) singular_name: String,
    pub(crate) plural_name: String,
    pub(crate) description: String,
    pub(crate) bean_sort: BeanSort,
    pub(crate) persistability: Persistability,
}

impl Details {
    fn provisional(descriptor: &TypeDescriptor) -> Self {
        let singular_name = naming::humanize(descriptor.name.short_name());
        let (bean_sort, persistability) = kind_classification(descriptor);
        Self {
            plural_name: naming::pluralize(&singular_name),
            singular_name,
            description: String::new(),
            bean_sort,
            persistability,
        }
    }
}

/// Classification implied by the shape of a type alone
pub(crate) fn kind_classification(descriptor: &TypeDescriptor) -> (BeanSort, Persistability) {
    let sort = match descriptor.kind {
        TypeKind::Value => BeanSort::Value,
        TypeKind::Collection => BeanSort::Collection,
        TypeKind::Interface => BeanSort::Abstract,
        TypeKind::Class if descriptor.is_abstract => BeanSort::Abstract,
        TypeKind::Class => BeanSort::Unknown,
    };
    (sort, Persistability::Transient)
}

/// The metamodel node for one type
///
/// Created bare by the [`SpecificationLoader`] and populated in place by two
/// introspection passes. Queries that need member data force the node to
/// [`IntrospectionState::TypeAndMembersIntrospected`] first.
pub struct ObjectSpecification {
    type_name: TypeName,
    spec_id: ObjectSpecId,
    identifier: Identifier,
    descriptor: Arc<TypeDescriptor>,
    facets: Facets,

    state: AtomicU8,
    introspecting: AtomicBool,
    invalidated: AtomicBool,
    introspection_lock: ReentrantMutex<()>,

    hierarchy: RwLock<Hierarchy>,
    subclasses: RwLock<Vec<Weak<ObjectSpecification>>>,
    members: RwLock<Members>,
    details: RwLock<Details>,
    contributions: Mutex<FxHashMap<Vec<ActionType>, ContributionCell>>,

    self_ref: Weak<ObjectSpecification>,
    loader: LoaderRef,
}

impl ObjectSpecification {
    pub(crate) fn new(descriptor: Arc<TypeDescriptor>, loader: LoaderRef) -> Arc<Self> {
        let type_name = descriptor.name.clone();
        let spec_id = ObjectSpecId::new(
            descriptor
                .logical_name
                .as_deref()
                .unwrap_or_else(|| type_name.full_name()),
        );
        let details = Details::provisional(&descriptor);

        Arc::new_cyclic(|self_ref| ObjectSpecification {
            identifier: Identifier::class(type_name.clone()),
            type_name,
            spec_id,
            descriptor,
            facets: Facets::new(),
            state: AtomicU8::new(IntrospectionState::NotIntrospected as u8),
            introspecting: AtomicBool::new(false),
            invalidated: AtomicBool::new(false),
            introspection_lock: ReentrantMutex::new(()),
            hierarchy: RwLock::new(Hierarchy::default()),
            subclasses: RwLock::new(Vec::new()),
            members: RwLock::new(Members::default()),
            details: RwLock::new(details),
            contributions: Mutex::new(FxHashMap::default()),
            self_ref: self_ref.clone(),
            loader,
        })
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// The corresponding type
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Fully-qualified name
    pub fn full_name(&self) -> &str {
        self.type_name.full_name()
    }

    /// Name without its namespace
    pub fn short_name(&self) -> &str {
        self.type_name.short_name()
    }

    /// Logical name used for external addressing
    pub fn spec_id(&self) -> &ObjectSpecId {
        &self.spec_id
    }

    /// The reflected description this node was built from
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Abstract classes and interfaces
    pub fn is_abstract(&self) -> bool {
        self.descriptor.is_abstract || self.descriptor.kind == TypeKind::Interface
    }

    /// Whether the type is an interface
    pub fn is_interface(&self) -> bool {
        self.descriptor.kind == TypeKind::Interface
    }

    /// Scalar value types
    pub fn is_value(&self) -> bool {
        self.descriptor.kind == TypeKind::Value
    }

    /// Collection types
    pub fn is_collection(&self) -> bool {
        self.descriptor.kind == TypeKind::Collection
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Current introspection state
    pub fn introspection_state(&self) -> IntrospectionState {
        IntrospectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True once the node has been removed from its loader's cache
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }

    /// The loader that owns this node
    pub fn loader(&self) -> Result<SpecificationLoader> {
        self.loader.upgrade()
    }

    fn self_arc(&self) -> Result<Arc<ObjectSpecification>> {
        self.self_ref.upgrade().ok_or_else(|| {
            MetaModelError::IllegalState(format!("specification {} is being dropped", self.type_name))
        })
    }

    /// Force this node to at least `state`, surfacing introspection errors
    pub fn ensure_introspected(&self, state: IntrospectionState) -> Result<()> {
        if self.introspection_state() >= state {
            return Ok(());
        }
        let this = self.self_arc()?;
        self.loader()?.introspect_up_to(&this, state)?;
        if self.introspection_state() < state {
            return Err(MetaModelError::IllegalState(format!(
                "{} is still being introspected and cannot reach {:?}",
                self.type_name, state
            )));
        }
        Ok(())
    }

    fn ensure_best_effort(&self, state: IntrospectionState) {
        if self.introspection_state() >= state || self.is_invalidated() {
            return;
        }
        if let Err(err) = self.ensure_introspected(state) {
            tracing::debug!(spec = %self.type_name, error = %err, "answering from partial state");
        }
    }

    pub(crate) fn lock_introspection(&self) -> ReentrantMutexGuard<'_, ()> {
        self.introspection_lock.lock()
    }

    /// The population lock, unless another thread holds it
    pub(crate) fn try_lock_introspection(&self) -> Option<ReentrantMutexGuard<'_, ()>> {
        self.introspection_lock.try_lock()
    }

    pub(crate) fn is_introspecting(&self) -> bool {
        self.introspecting.load(Ordering::Acquire)
    }

    pub(crate) fn set_introspecting(&self, introspecting: bool) {
        self.introspecting.store(introspecting, Ordering::Release);
    }

    pub(crate) fn advance_state(&self, state: IntrospectionState) {
        self.state.fetch_max(state as u8, Ordering::AcqRel);
        tracing::debug!(spec = %self.type_name, state = ?state, "introspection state advanced");
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Superclass specification; `None` for hierarchy roots
    pub fn superclass(&self) -> Option<Arc<ObjectSpecification>> {
        self.ensure_best_effort(IntrospectionState::TypeAndMembersIntrospected);
        let link = self.hierarchy.read().superclass.clone()?;
        if !link.is_invalidated() {
            return Some(link);
        }

        let fresh = self.reresolve(&link)?;
        let mut hierarchy = self.hierarchy.write();
        if hierarchy
            .superclass
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &link))
        {
            hierarchy.superclass = Some(fresh.clone());
        }
        Some(fresh)
    }

    /// Interface specifications, in declaration order
    pub fn interfaces(&self) -> Vec<Arc<ObjectSpecification>> {
        self.ensure_best_effort(IntrospectionState::TypeAndMembersIntrospected);
        let links = self.hierarchy.read().interfaces.clone();
        if links.iter().all(|link| !link.is_invalidated()) {
            return links;
        }

        let mut resolved = Vec::with_capacity(links.len());
        for link in &links {
            if !link.is_invalidated() {
                resolved.push(link.clone());
            } else if let Some(fresh) = self.reresolve(link) {
                resolved.push(fresh);
            }
        }
        let mut hierarchy = self.hierarchy.write();
        if hierarchy.interfaces.len() == links.len()
            && hierarchy
                .interfaces
                .iter()
                .zip(&links)
                .all(|(a, b)| Arc::ptr_eq(a, b))
        {
            hierarchy.interfaces = resolved.clone();
        }
        resolved
    }

    fn reresolve(&self, stale: &ObjectSpecification) -> Option<Arc<ObjectSpecification>> {
        let result = self
            .loader()
            .and_then(|loader| loader.load_specification(stale.type_name()));
        match result {
            Ok(fresh) => {
                tracing::debug!(spec = %self.type_name, supertype = %fresh.type_name(), "re-resolved invalidated supertype");
                fresh.add_subclass(self.self_ref.clone());
                Some(fresh)
            }
            Err(err) => {
                tracing::warn!(spec = %self.type_name, supertype = %stale.type_name(), error = %err, "supertype no longer resolvable");
                None
            }
        }
    }

    /// Live subclass specifications that registered against this node
    pub fn subclasses(&self) -> Vec<Arc<ObjectSpecification>> {
        self.subclasses
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|spec| !spec.is_invalidated())
            .collect()
    }

    /// Whether any live subclass registered against this node
    pub fn has_subclasses(&self) -> bool {
        self.subclasses
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .any(|spec| !spec.is_invalidated())
    }

    /// True if `other` is this type, or one of its supertypes
    pub fn is_of_type(&self, other: &ObjectSpecification) -> bool {
        if self.type_name == other.type_name {
            return true;
        }
        self.interfaces().iter().any(|iface| iface.is_of_type(other))
            || self.superclass().is_some_and(|sup| sup.is_of_type(other))
    }

    /// Element specification of a collection type
    pub fn element_specification(&self) -> Result<Option<Arc<ObjectSpecification>>> {
        match &self.descriptor.element_type {
            Some(element) if self.is_collection() => {
                self.loader()?.load_specification(element).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Directly declared supertypes, without forcing introspection
    pub(crate) fn declared_supertypes(&self) -> Vec<Arc<ObjectSpecification>> {
        let hierarchy = self.hierarchy.read();
        hierarchy
            .interfaces
            .iter()
            .chain(hierarchy.superclass.iter())
            .cloned()
            .collect()
    }

    /// Link supertypes and register this node reciprocally as their subclass
    pub(crate) fn link_hierarchy(
        &self,
        superclass: Option<Arc<ObjectSpecification>>,
        interfaces: Vec<Arc<ObjectSpecification>>,
    ) {
        for supertype in interfaces.iter().chain(superclass.iter()) {
            supertype.add_subclass(self.self_ref.clone());
        }
        *self.hierarchy.write() = Hierarchy {
            superclass,
            interfaces,
        };
    }

    /// Swap links to an invalidated node named like `fresh` for `fresh`
    ///
    /// Registers this node as a subclass of `fresh` if any link changed.
    pub(crate) fn adopt_supertype(&self, fresh: &Arc<ObjectSpecification>) -> bool {
        let stale = |link: &Arc<ObjectSpecification>| {
            link.is_invalidated() && link.type_name() == fresh.type_name()
        };
        let mut replaced = false;
        {
            let mut hierarchy = self.hierarchy.write();
            if let Some(superclass) = hierarchy.superclass.as_mut() {
                if stale(&*superclass) {
                    *superclass = fresh.clone();
                    replaced = true;
                }
            }
            for iface in hierarchy.interfaces.iter_mut() {
                if stale(&*iface) {
                    *iface = fresh.clone();
                    replaced = true;
                }
            }
        }
        if replaced {
            fresh.add_subclass(self.self_ref.clone());
        }
        replaced
    }

    fn add_subclass(&self, subclass: Weak<ObjectSpecification>) {
        let mut subclasses = self.subclasses.write();
        subclasses.retain(|existing| existing.strong_count() > 0);
        if !subclasses.iter().any(|existing| existing.ptr_eq(&subclass)) {
            subclasses.push(subclass);
        }
    }

    fn remove_subclass(&self, subclass: &ObjectSpecification) {
        self.subclasses.write().retain(|existing| {
            existing.strong_count() > 0 && !std::ptr::eq(existing.as_ptr(), subclass)
        });
    }

    /// Detach from supertypes and drop memoized state
    pub(crate) fn invalidate(&self) {
        self.invalidated.store(true, Ordering::Release);
        let hierarchy = std::mem::take(&mut *self.hierarchy.write());
        for supertype in hierarchy.interfaces.iter().chain(hierarchy.superclass.iter()) {
            supertype.remove_subclass(self);
        }
        self.clear_contributions();
    }

    pub(crate) fn clear_contributions(&self) {
        self.contributions.lock().clear();
    }

    // ------------------------------------------------------------------
    // Display metadata
    // ------------------------------------------------------------------

    fn details(&self) -> parking_lot::RwLockReadGuard<'_, Details> {
        self.ensure_best_effort(IntrospectionState::FullyIntrospected);
        self.details.read()
    }

    pub(crate) fn set_details(&self, details: Details) {
        *self.details.write() = details;
    }

    /// Singular display name
    pub fn singular_name(&self) -> String {
        self.details().singular_name.clone()
    }

    /// Plural display name
    pub fn plural_name(&self) -> String {
        self.details().plural_name.clone()
    }

    /// Description; empty when none was declared
    pub fn description(&self) -> String {
        self.details().description.clone()
    }

    /// Category of this type
    pub fn bean_sort(&self) -> BeanSort {
        self.details().bean_sort
    }

    /// Persistence classification
    pub fn persistability(&self) -> Persistability {
        self.details().persistability
    }

    /// Whether instances are entities
    pub fn is_entity(&self) -> bool {
        self.bean_sort() == BeanSort::Entity
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    pub(crate) fn set_members(
        &self,
        associations: Vec<Arc<ObjectAssociation>>,
        actions: Vec<Arc<ObjectAction>>,
    ) {
        *self.members.write() = Members {
            associations,
            actions,
        };
    }

    /// Declared properties and collections
    pub fn associations(&self) -> Result<Vec<Arc<ObjectAssociation>>> {
        self.ensure_introspected(IntrospectionState::TypeAndMembersIntrospected)?;
        Ok(self.members.read().associations.clone())
    }

    /// Declared association by name
    pub fn association(&self, name: &str) -> Result<Option<Arc<ObjectAssociation>>> {
        Ok(self
            .associations()?
            .into_iter()
            .find(|assoc| assoc.name() == name))
    }

    /// Actions declared by this type itself
    pub fn declared_actions(&self) -> Result<Vec<Arc<ObjectAction>>> {
        self.ensure_introspected(IntrospectionState::TypeAndMembersIntrospected)?;
        Ok(self.members.read().actions.clone())
    }

    /// Declared actions of the given types, optionally followed by one
    /// contributed action set per contributing service
    pub fn object_actions(
        &self,
        types: &[ActionType],
        contributed: Contributed,
    ) -> Result<Vec<ActionMember>> {
        let mut actions: Vec<ActionMember> = self
            .declared_actions()?
            .into_iter()
            .filter(|action| types.contains(&action.action_type()))
            .map(ActionMember::Declared)
            .collect();

        if contributed == Contributed::Included {
            actions.extend(self.contributed_actions(types)?.iter().cloned());
        }
        Ok(actions)
    }

    /// Find an action by name among declared and contributed actions
    pub fn object_action(&self, name: &str) -> Result<Option<Arc<ObjectAction>>> {
        if let Some(action) = self
            .declared_actions()?
            .into_iter()
            .find(|action| action.name() == name)
        {
            return Ok(Some(action));
        }

        let contributed = self.contributed_actions(&ActionType::ALL)?;
        Ok(contributed
            .iter()
            .flat_map(ActionMember::actions)
            .find(|action| action.name() == name))
    }

    /// Contributed action sets, memoized per set of action types
    pub fn contributed_actions(&self, types: &[ActionType]) -> Result<Arc<[ActionMember]>> {
        self.ensure_introspected(IntrospectionState::TypeAndMembersIntrospected)?;

        let mut key = types.to_vec();
        key.sort();
        key.dedup();

        let cell = self
            .contributions
            .lock()
            .entry(key.clone())
            .or_default()
            .clone();

        let members = cell.get_or_try_init(|| {
            let loader = self.loader()?;
            contributions::compute(self, &loader, &key).map(Arc::from)
        })?;
        Ok(members.clone())
    }

    /// Whether contributions for these action types have been computed
    pub fn is_contribution_memoized(&self, types: &[ActionType]) -> bool {
        let mut key = types.to_vec();
        key.sort();
        key.dedup();
        self.contributions
            .lock()
            .get(&key)
            .is_some_and(|cell| cell.get().is_some())
    }
}

impl FacetHolder for ObjectSpecification {
    fn facets(&self) -> &Facets {
        &self.facets
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    fn lookup_facet(&self, facet_type: FacetType) -> FacetLookup {
        self.ensure_best_effort(IntrospectionState::TypeAndMembersIntrospected);
        resolve_facet(self, facet_type)
    }
}

impl fmt::Debug for ObjectSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSpecification")
            .field("type_name", &self.type_name)
            .field("spec_id", &self.spec_id)
            .field("state", &self.introspection_state())
            .field("invalidated", &self.is_invalidated())
            .field("facets", &self.facets)
            .finish()
    }
}

impl fmt::Display for ObjectSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)
    }
}
