//! Metamodel errors

use thiserror::Error;

/// Errors raised while building or querying the metamodel
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetaModelError {
    /// A value could not be wrapped against a specification
    #[error("Cannot wrap value of type {actual} as {expected}")]
    Incompatible {
        /// Type name of the specification
        expected: String,
        /// Runtime type name of the value
        actual: String,
    },

    /// The type of a value could not be resolved to a specification
    #[error("Cannot determine type of {value}")]
    UnknownType {
        /// Description of the value
        value: String,
    },

    /// The operation is not supported by this member
    #[error("{operation} is not supported by {member}")]
    Unsupported {
        /// Operation that was attempted
        operation: &'static str,
        /// Identifier of the member
        member: String,
    },

    /// A superclass chain leads back to the type being introspected
    #[error("Circular type hierarchy detected: {chain}")]
    CyclicHierarchy {
        /// Rendered chain, e.g. `A -> B -> A`
        chain: String,
    },

    /// A supertype named by a descriptor could not be loaded
    #[error("Cannot load supertype {supertype} of {type_name}")]
    MissingSupertype {
        /// Type under introspection
        type_name: String,
        /// Unresolvable supertype name
        supertype: String,
    },

    /// A facet factory rejected a type or member
    #[error("Facet factory {factory} failed on {identifier}: {message}")]
    FacetFactory {
        /// Name of the failing factory
        factory: &'static str,
        /// Identifier of the holder being processed
        identifier: String,
        /// Failure description
        message: String,
    },

    /// A specification could not be brought to the required state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Argument list does not match an action's parameters
    #[error("Invalid arguments for {action}: {reason}")]
    InvalidArguments {
        /// Action identifier
        action: String,
        /// What was wrong
        reason: String,
    },
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, MetaModelError>;
