//! Spectra Core
//!
//! Reflective object metamodel: a graph of type specifications built on
//! demand from reflected type descriptions, enriched with facets, and
//! queried by everything that needs to know what a domain type can do.

#![warn(missing_docs)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod facet;
pub mod factory;
pub mod ident;
pub mod loader;
pub mod managed;
pub mod services;
pub mod spec;

pub use config::{ConfigError, DomainModel};
pub use descriptor::{ClassSource, TypeCatalog, TypeDescriptor};
pub use error::{MetaModelError, Result};
pub use facet::{Facet, FacetHolder, FacetLookup, FacetType};
pub use factory::{FacetFactory, ProgrammingModel};
pub use ident::{Bookmark, Identifier, ObjectSpecId, TypeName};
pub use loader::SpecificationLoader;
pub use managed::{IdentityProvider, ManagedObject, Pojo};
pub use services::{ServiceRegistry, StaticServiceRegistry};
pub use spec::{
    ActionMember, ActionType, BeanSort, Contributed, IntrospectionState, ObjectSpecification,
    Persistability,
};
