//! The specification graph
//!
//! One [`ObjectSpecification`] exists per introspected type. Nodes link to
//! their superclass and interfaces (strongly) and to their subclasses
//! (weakly), own their member specifications, and resolve facets over the
//! hierarchy.

mod contributions;
mod member;
mod object;

pub use member::{
    ActionInvoker, ActionMember, ActionParameter, AssociationKind, Contributed,
    ContributedActionSet, ObjectAction, ObjectAssociation,
};
pub use object::ObjectSpecification;
pub(crate) use object::{kind_classification, Details};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Introspection progress of a specification
///
/// Transitions are monotonic; a node only moves back by being invalidated
/// and recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum IntrospectionState {
    /// Registered, nothing populated yet
    NotIntrospected = 0,
    /// Supertypes and members resolved, facets attached
    TypeAndMembersIntrospected = 1,
    /// Names, description and classification finalized
    FullyIntrospected = 2,
}

impl IntrospectionState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => IntrospectionState::NotIntrospected,
            1 => IntrospectionState::TypeAndMembersIntrospected,
            _ => IntrospectionState::FullyIntrospected,
        }
    }
}

/// Category of a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeanSort {
    /// Persistent domain entity
    Entity,
    /// Scalar value type
    Value,
    /// Recreatable view model
    ViewModel,
    /// Service-like managed bean
    ManagedBean,
    /// Collection type
    Collection,
    /// Mixin contributing members to another type
    Mixin,
    /// Abstract class or interface
    Abstract,
    /// Anything else
    Unknown,
}

impl fmt::Display for BeanSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BeanSort::Entity => "entity",
            BeanSort::Value => "value",
            BeanSort::ViewModel => "view-model",
            BeanSort::ManagedBean => "managed-bean",
            BeanSort::Collection => "collection",
            BeanSort::Mixin => "mixin",
            BeanSort::Abstract => "abstract",
            BeanSort::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Whether and how instances of a type are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persistability {
    /// Persisted on user request
    UserPersistable,
    /// Persisted only programmatically
    ProgramPersistable,
    /// Never persisted
    Transient,
}

impl fmt::Display for Persistability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Persistability::UserPersistable => "user-persistable",
            Persistability::ProgramPersistable => "program-persistable",
            Persistability::Transient => "transient",
        };
        f.write_str(name)
    }
}

/// Category of an action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Regular end-user action
    #[default]
    User,
    /// Exploration-mode action
    Explore,
    /// Prototyping-mode action
    Prototype,
    /// Debugging action
    Debug,
}

impl ActionType {
    /// Every action type
    pub const ALL: [ActionType; 4] = [
        ActionType::User,
        ActionType::Explore,
        ActionType::Prototype,
        ActionType::Debug,
    ];
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionType::User => "user",
            ActionType::Explore => "explore",
            ActionType::Prototype => "prototype",
            ActionType::Debug => "debug",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering() {
        assert!(IntrospectionState::NotIntrospected < IntrospectionState::TypeAndMembersIntrospected);
        assert!(IntrospectionState::TypeAndMembersIntrospected < IntrospectionState::FullyIntrospected);
    }

    #[test]
    fn test_state_round_trips_through_u8() {
        for state in [
            IntrospectionState::NotIntrospected,
            IntrospectionState::TypeAndMembersIntrospected,
            IntrospectionState::FullyIntrospected,
        ] {
            assert_eq!(IntrospectionState::from_u8(state as u8), state);
        }
    }
}
