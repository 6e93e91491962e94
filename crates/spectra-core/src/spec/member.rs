//! Member specifications: associations, actions, parameters

use super::{ActionType, ObjectSpecification};
use crate::descriptor::{ActionDescriptor, ParameterDescriptor, PropertyDescriptor};
use crate::error::{MetaModelError, Result};
use crate::facet::standard::HiddenFacet;
use crate::facet::{FacetHolder, FacetLookup, FacetType, Facets};
use crate::ident::{Identifier, TypeName};
use crate::loader::LoaderRef;
use crate::managed::{ManagedObject, Pojo};
use std::fmt;
use std::sync::Arc;

/// Whether an association holds one value or many
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// Scalar or reference property
    Property,
    /// One-to-many collection
    Collection,
}

/// Whether [`ObjectSpecification::object_actions`] includes contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contributed {
    /// Append one action set per contributing service
    Included,
    /// Declared actions only
    Excluded,
}

/// A property or collection of a type
pub struct ObjectAssociation {
    identifier: Identifier,
    name: String,
    kind: AssociationKind,
    type_name: TypeName,
    facets: Facets,
    loader: LoaderRef,
}

impl ObjectAssociation {
    pub(crate) fn new(
        owner: &TypeName,
        descriptor: &PropertyDescriptor,
        kind: AssociationKind,
        loader: LoaderRef,
    ) -> Self {
        let identifier = match kind {
            AssociationKind::Property => Identifier::property(owner.clone(), &descriptor.name),
            AssociationKind::Collection => Identifier::collection(owner.clone(), &descriptor.name),
        };
        Self {
            identifier,
            name: descriptor.name.clone(),
            kind,
            type_name: descriptor.type_name.clone(),
            facets: Facets::new(),
            loader,
        }
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property or collection
    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// True for collections
    pub fn is_collection(&self) -> bool {
        self.kind == AssociationKind::Collection
    }

    /// Declared type; the element type for collections
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Specification of the declared type, loaded on first request
    pub fn specification(&self) -> Result<Arc<ObjectSpecification>> {
        self.loader.upgrade()?.load_specification(&self.type_name)
    }
}

impl FacetHolder for ObjectAssociation {
    fn facets(&self) -> &Facets {
        &self.facets
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }
}

impl fmt::Debug for ObjectAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectAssociation")
            .field("identifier", &self.identifier)
            .field("type_name", &self.type_name)
            .field("facets", &self.facets)
            .finish()
    }
}

/// A parameter of an action
pub struct ActionParameter {
    identifier: Identifier,
    name: String,
    index: usize,
    type_name: TypeName,
    facets: Facets,
}

impl ActionParameter {
    pub(crate) fn new(action: &Identifier, index: usize, descriptor: &ParameterDescriptor) -> Self {
        Self {
            identifier: Identifier::parameter(action, index),
            name: descriptor.name.clone(),
            index,
            type_name: descriptor.type_name.clone(),
            facets: Facets::new(),
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the parameter list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Declared type
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Whether the parameter takes part in no interaction at all
    pub fn is_hidden_everywhere(&self) -> bool {
        self.facet::<HiddenFacet>(FacetType::HIDDEN)
            .is_some_and(|hidden| hidden.is_hidden_everywhere())
    }
}

impl FacetHolder for ActionParameter {
    fn facets(&self) -> &Facets {
        &self.facets
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }
}

impl fmt::Debug for ActionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionParameter")
            .field("identifier", &self.identifier)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Performs the actual work of an action
///
/// The metamodel only describes actions; invocation belongs to the host.
pub trait ActionInvoker {
    /// Invoke `action` on `target`
    fn invoke(
        &self,
        action: &ObjectAction,
        target: &ManagedObject,
        arguments: &[ManagedObject],
    ) -> Result<Option<ManagedObject>>;
}

/// An action declared by a type
pub struct ObjectAction {
    identifier: Identifier,
    name: String,
    action_type: ActionType,
    parameters: Vec<Arc<ActionParameter>>,
    return_type: Option<TypeName>,
    facets: Facets,
    loader: LoaderRef,
}

impl ObjectAction {
    pub(crate) fn new(owner: &TypeName, descriptor: &ActionDescriptor, loader: LoaderRef) -> Self {
        let parameter_types = descriptor
            .parameters
            .iter()
            .map(|p| p.type_name.clone())
            .collect();
        let identifier = Identifier::action(owner.clone(), &descriptor.name, parameter_types);
        let parameters = descriptor
            .parameters
            .iter()
            .enumerate()
            .map(|(index, param)| Arc::new(ActionParameter::new(&identifier, index, param)))
            .collect();

        Self {
            identifier,
            name: descriptor.name.clone(),
            action_type: descriptor.action_type,
            parameters,
            return_type: descriptor.returns.clone(),
            facets: Facets::new(),
            loader,
        }
    }

    /// Action name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Action category
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// Type that declares the action
    pub fn owner(&self) -> &TypeName {
        self.identifier.class_name()
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[Arc<ActionParameter>] {
        &self.parameters
    }

    /// Declared return type
    pub fn return_type(&self) -> Option<&TypeName> {
        self.return_type.as_ref()
    }

    /// Check arity and argument types; empty arguments are accepted
    pub fn validate(&self, arguments: &[ManagedObject]) -> Result<()> {
        if arguments.len() != self.parameters.len() {
            return Err(MetaModelError::InvalidArguments {
                action: self.identifier.to_string(),
                reason: format!(
                    "expected {} arguments, got {}",
                    self.parameters.len(),
                    arguments.len()
                ),
            });
        }

        let loader = self.loader.upgrade()?;
        for (param, argument) in self.parameters.iter().zip(arguments) {
            if argument.pojo().is_none() {
                continue;
            }
            let expected = loader.load_specification(param.type_name())?;
            let actual = argument.specification()?;
            if !actual.is_of_type(&expected) {
                return Err(MetaModelError::InvalidArguments {
                    action: self.identifier.to_string(),
                    reason: format!(
                        "argument {} is a {}, expected {}",
                        param.index(),
                        actual.type_name(),
                        expected.type_name()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Validate the arguments, then delegate to `invoker`
    pub fn execute(
        &self,
        invoker: &dyn ActionInvoker,
        target: &ManagedObject,
        arguments: &[ManagedObject],
    ) -> Result<Option<ManagedObject>> {
        self.validate(arguments)?;
        tracing::trace!(action = %self.identifier, "invoking action");
        invoker.invoke(self, target, arguments)
    }
}

impl FacetHolder for ObjectAction {
    fn facets(&self) -> &Facets {
        &self.facets
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }
}

impl fmt::Debug for ObjectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectAction")
            .field("identifier", &self.identifier)
            .field("action_type", &self.action_type)
            .field("facets", &self.facets)
            .finish()
    }
}

/// Synthetic grouping of the actions one service contributes to a type
///
/// Behaves as a null-object action: it has no parameters and no facets and
/// rejects validation and execution. Invocation goes through the real
/// sub-actions in [`ContributedActionSet::actions`].
pub struct ContributedActionSet {
    identifier: Identifier,
    service_spec: Arc<ObjectSpecification>,
    service: Pojo,
    actions: Vec<Arc<ObjectAction>>,
}

impl ContributedActionSet {
    pub(crate) fn new(
        service_spec: Arc<ObjectSpecification>,
        service: Pojo,
        actions: Vec<Arc<ObjectAction>>,
    ) -> Self {
        Self {
            identifier: Identifier::class(service_spec.type_name().clone()),
            service_spec,
            service,
            actions,
        }
    }

    /// Identifier of the contributing service type
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Display name: the service's singular name
    pub fn name(&self) -> String {
        self.service_spec.singular_name()
    }

    /// Specification of the contributing service
    pub fn service_specification(&self) -> &Arc<ObjectSpecification> {
        &self.service_spec
    }

    /// The contributing service instance
    pub fn service(&self) -> &Pojo {
        &self.service
    }

    /// The service wrapped as the target for its contributed actions
    pub fn service_object(&self) -> Result<ManagedObject> {
        ManagedObject::of(self.service_spec.clone(), Some(self.service.clone()))
    }

    /// The contributed sub-actions
    pub fn actions(&self) -> &[Arc<ObjectAction>] {
        &self.actions
    }

    /// Always unsupported
    pub fn validate(&self, _arguments: &[ManagedObject]) -> Result<()> {
        Err(self.unsupported("validate"))
    }

    /// Always unsupported
    pub fn execute(
        &self,
        _invoker: &dyn ActionInvoker,
        _target: &ManagedObject,
        _arguments: &[ManagedObject],
    ) -> Result<Option<ManagedObject>> {
        Err(self.unsupported("execute"))
    }

    fn unsupported(&self, operation: &'static str) -> MetaModelError {
        MetaModelError::Unsupported {
            operation,
            member: format!("contributed action set {}", self.identifier),
        }
    }
}

impl fmt::Debug for ContributedActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributedActionSet")
            .field("service", &self.service_spec.type_name())
            .field("actions", &self.actions)
            .finish()
    }
}

/// An entry in a type's action list
#[derive(Debug, Clone)]
pub enum ActionMember {
    /// A real action
    Declared(Arc<ObjectAction>),
    /// The actions one service contributes, grouped
    ContributedSet(Arc<ContributedActionSet>),
}

impl ActionMember {
    /// Identifier of the action, or of the contributing service
    pub fn identifier(&self) -> &Identifier {
        match self {
            ActionMember::Declared(action) => action.identifier(),
            ActionMember::ContributedSet(set) => set.identifier(),
        }
    }

    /// Display name
    pub fn name(&self) -> String {
        match self {
            ActionMember::Declared(action) => action.name().to_string(),
            ActionMember::ContributedSet(set) => set.name(),
        }
    }

    /// Parameters; always empty for a contributed set
    pub fn parameters(&self) -> &[Arc<ActionParameter>] {
        match self {
            ActionMember::Declared(action) => action.parameters(),
            ActionMember::ContributedSet(_) => &[],
        }
    }

    /// True for [`ActionMember::ContributedSet`]
    pub fn is_contributed_set(&self) -> bool {
        matches!(self, ActionMember::ContributedSet(_))
    }

    /// The real actions behind this entry
    pub fn actions(&self) -> Vec<Arc<ObjectAction>> {
        match self {
            ActionMember::Declared(action) => vec![action.clone()],
            ActionMember::ContributedSet(set) => set.actions().to_vec(),
        }
    }

    /// Facet lookup; a contributed set carries none
    pub fn lookup_facet(&self, facet_type: FacetType) -> FacetLookup {
        match self {
            ActionMember::Declared(action) => action.lookup_facet(facet_type),
            ActionMember::ContributedSet(_) => FacetLookup::Absent,
        }
    }

    /// Validate arguments
    pub fn validate(&self, arguments: &[ManagedObject]) -> Result<()> {
        match self {
            ActionMember::Declared(action) => action.validate(arguments),
            ActionMember::ContributedSet(set) => set.validate(arguments),
        }
    }

    /// Execute through `invoker`
    pub fn execute(
        &self,
        invoker: &dyn ActionInvoker,
        target: &ManagedObject,
        arguments: &[ManagedObject],
    ) -> Result<Option<ManagedObject>> {
        match self {
            ActionMember::Declared(action) => action.execute(invoker, target, arguments),
            ActionMember::ContributedSet(set) => set.execute(invoker, target, arguments),
        }
    }
}
