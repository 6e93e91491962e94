//! Programming model: facet factories run during introspection
//!
//! Factories decide which facets a type, member or parameter carries. The
//! engine only fixes the order they run in and the holder they write to;
//! the policy lives in the factories.

pub mod standard;

use crate::descriptor::{ActionDescriptor, Annotations, ParameterDescriptor, PropertyDescriptor, TypeDescriptor};
use crate::error::Result;
use crate::facet::FacetHolder;
use crate::loader::SpecificationLoader;
use crate::spec::ObjectSpecification;
use std::fmt;
use std::sync::Arc;

/// Type-level factory input
pub struct TypeContext<'a> {
    /// Descriptor of the type under introspection
    pub descriptor: &'a TypeDescriptor,
    /// The node being populated
    pub spec: &'a Arc<ObjectSpecification>,
    /// Loader, for cross-referencing other specifications
    pub loader: &'a SpecificationLoader,
}

/// Reflected member handed to a factory
#[derive(Debug, Clone, Copy)]
pub enum MemberDescriptor<'a> {
    /// A property
    Property(&'a PropertyDescriptor),
    /// A collection
    Collection(&'a PropertyDescriptor),
    /// An action
    Action(&'a ActionDescriptor),
}

impl MemberDescriptor<'_> {
    /// Member name
    pub fn name(&self) -> &str {
        match self {
            MemberDescriptor::Property(p) | MemberDescriptor::Collection(p) => &p.name,
            MemberDescriptor::Action(a) => &a.name,
        }
    }

    /// Member annotations
    pub fn annotations(&self) -> &Annotations {
        match self {
            MemberDescriptor::Property(p) | MemberDescriptor::Collection(p) => &p.annotations,
            MemberDescriptor::Action(a) => &a.annotations,
        }
    }
}

/// Member-level factory input
pub struct MemberContext<'a> {
    /// Descriptor of the declaring type
    pub owner: &'a TypeDescriptor,
    /// The reflected member
    pub member: MemberDescriptor<'a>,
    /// The member specification being populated
    pub holder: &'a dyn FacetHolder,
    /// Loader, for cross-referencing other specifications
    pub loader: &'a SpecificationLoader,
}

/// Parameter-level factory input
pub struct ParameterContext<'a> {
    /// The declaring action
    pub action: &'a ActionDescriptor,
    /// The reflected parameter
    pub parameter: &'a ParameterDescriptor,
    /// Position of the parameter
    pub index: usize,
    /// The parameter specification being populated
    pub holder: &'a dyn FacetHolder,
    /// Loader, for cross-referencing other specifications
    pub loader: &'a SpecificationLoader,
}

/// Attaches facets to metamodel elements
///
/// An error aborts introspection of the node being processed.
pub trait FacetFactory: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str;

    /// Process a type
    fn process_type(&self, _cx: &TypeContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Process a property, collection or action
    fn process_member(&self, _cx: &MemberContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Process an action parameter
    fn process_parameter(&self, _cx: &ParameterContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Ordered list of facet factories
#[derive(Clone, Default)]
pub struct ProgrammingModel {
    factories: Vec<Arc<dyn FacetFactory>>,
}

impl ProgrammingModel {
    /// A model with no factories
    pub fn empty() -> Self {
        Self::default()
    }

    /// The annotation-driven standard factories
    pub fn standard() -> Self {
        Self::empty()
            .with(standard::NatureFacetFactory)
            .with(standard::NamingFacetFactory)
            .with(standard::TitleFacetFactory)
            .with(standard::IconFacetFactory)
            .with(standard::HiddenFacetFactory)
    }

    /// Append a factory; factories run in insertion order
    pub fn with(mut self, factory: impl FacetFactory + 'static) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Names of the installed factories, in order
    pub fn factory_names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    pub(crate) fn process_type(&self, cx: &TypeContext<'_>) -> Result<()> {
        for factory in &self.factories {
            factory.process_type(cx)?;
        }
        Ok(())
    }

    pub(crate) fn process_member(&self, cx: &MemberContext<'_>) -> Result<()> {
        for factory in &self.factories {
            factory.process_member(cx)?;
        }
        Ok(())
    }

    pub(crate) fn process_parameter(&self, cx: &ParameterContext<'_>) -> Result<()> {
        for factory in &self.factories {
            factory.process_parameter(cx)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProgrammingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factory_names()).finish()
    }
}
