//! Facets: named capability markers attached to metamodel elements
//!
//! A facet is registered on a holder under its [`FacetType`]. At most one
//! facet per type is active on a holder; adding another replaces it. A
//! multi-typed facet is registered under every tag it reports.
//!
//! A facet whose [`Facet::is_noop`] returns true is a deliberate negative
//! signal ("considered and found absent"). It is kept distinct from a
//! missing facet so that resolution over the type hierarchy can let any
//! concrete facet override it (see [`resolve_facet`]).

mod holder;
mod resolve;
pub mod standard;

pub use holder::{FacetHolder, Facets};
pub use resolve::resolve_facet;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Capability tag under which a facet is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacetType(&'static str);

impl FacetType {
    /// Title rendering
    pub const TITLE: FacetType = FacetType("title");
    /// Icon name
    pub const ICON: FacetType = FacetType("icon");
    /// Singular display name
    pub const NAMED: FacetType = FacetType("named");
    /// Plural display name
    pub const PLURAL: FacetType = FacetType("plural");
    /// Description
    pub const DESCRIBED_AS: FacetType = FacetType("describedAs");
    /// Visibility
    pub const HIDDEN: FacetType = FacetType("hidden");
    /// Bean sort and persistability classification
    pub const NATURE: FacetType = FacetType("nature");

    /// Create a custom facet type
    pub const fn new(name: &'static str) -> Self {
        FacetType(name)
    }

    /// Tag name
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Downcasting support for facet trait objects
pub trait AsAny: Any + Send + Sync {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Convert a shared facet into a shared `Any`
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A capability marker attached to a [`FacetHolder`]
pub trait Facet: AsAny + fmt::Debug {
    /// Primary tag of this facet
    fn facet_type(&self) -> FacetType;

    /// Whether this facet records the deliberate absence of the capability
    fn is_noop(&self) -> bool {
        false
    }

    /// All tags this facet is registered under when added as multi-typed
    fn facet_types(&self) -> Vec<FacetType> {
        vec![self.facet_type()]
    }

    /// Text carried for `facet_type`, for text-valued facets (names, descriptions)
    fn text_for(&self, _facet_type: FacetType) -> Option<&str> {
        None
    }
}

/// Result of looking up a facet
#[derive(Debug, Clone)]
pub enum FacetLookup {
    /// A facet providing the capability
    Concrete(Arc<dyn Facet>),
    /// A no-op placeholder: considered, found absent
    Noop(Arc<dyn Facet>),
    /// Nothing was ever registered
    Absent,
}

impl FacetLookup {
    /// Classify an optional facet
    pub fn from_facet(facet: Option<Arc<dyn Facet>>) -> Self {
        match facet {
            Some(f) if f.is_noop() => FacetLookup::Noop(f),
            Some(f) => FacetLookup::Concrete(f),
            None => FacetLookup::Absent,
        }
    }

    /// The facet found, concrete or no-op
    pub fn into_facet(self) -> Option<Arc<dyn Facet>> {
        match self {
            FacetLookup::Concrete(f) | FacetLookup::Noop(f) => Some(f),
            FacetLookup::Absent => None,
        }
    }

    /// The facet found, only if concrete
    pub fn into_concrete(self) -> Option<Arc<dyn Facet>> {
        match self {
            FacetLookup::Concrete(f) => Some(f),
            _ => None,
        }
    }

    /// True for [`FacetLookup::Concrete`]
    pub fn is_concrete(&self) -> bool {
        matches!(self, FacetLookup::Concrete(_))
    }

    /// True for [`FacetLookup::Noop`]
    pub fn is_noop(&self) -> bool {
        matches!(self, FacetLookup::Noop(_))
    }

    /// True for [`FacetLookup::Absent`]
    pub fn is_absent(&self) -> bool {
        matches!(self, FacetLookup::Absent)
    }
}

/// Downcast a shared facet to its concrete type
pub fn downcast_facet<T: Facet>(facet: Arc<dyn Facet>) -> Option<Arc<T>> {
    facet.into_any_arc().downcast::<T>().ok()
}
