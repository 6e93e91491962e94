//! Identifiers for types, members and instances
//!
//! All identifiers are immutable values, cheap to clone and usable as map keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Fully-qualified name of a reflected type (its "corresponding type")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Create a type name
    pub fn new(name: impl AsRef<str>) -> Self {
        TypeName(Arc::from(name.as_ref()))
    }

    /// The fully-qualified name, e.g. `dom.customer.Customer`
    pub fn full_name(&self) -> &str {
        &self.0
    }

    /// The segment after the last `.`, e.g. `Customer`
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::new(name)
    }
}

/// Logical, externally addressable name of a specification
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectSpecId(Arc<str>);

impl ObjectSpecId {
    /// Create a spec id
    pub fn new(id: impl AsRef<str>) -> Self {
        ObjectSpecId(Arc::from(id.as_ref()))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an [`Identifier`] names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentifierKind {
    /// A type
    Class,
    /// A scalar or reference property
    Property,
    /// A collection association
    Collection,
    /// An action
    Action,
    /// An action parameter
    Parameter,
}

/// Names a type or one of its members
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    class_name: TypeName,
    kind: IdentifierKind,
    member_name: Option<Arc<str>>,
    parameter_types: Vec<TypeName>,
    parameter_index: Option<usize>,
}

impl Identifier {
    /// Identifier of a type
    pub fn class(class_name: TypeName) -> Self {
        Identifier {
            class_name,
            kind: IdentifierKind::Class,
            member_name: None,
            parameter_types: Vec::new(),
            parameter_index: None,
        }
    }

    /// Identifier of a property
    pub fn property(class_name: TypeName, name: &str) -> Self {
        Self::member(class_name, IdentifierKind::Property, name)
    }

    /// Identifier of a collection
    pub fn collection(class_name: TypeName, name: &str) -> Self {
        Self::member(class_name, IdentifierKind::Collection, name)
    }

    /// Identifier of an action with its parameter types
    pub fn action(class_name: TypeName, name: &str, parameter_types: Vec<TypeName>) -> Self {
        Identifier {
            parameter_types,
            ..Self::member(class_name, IdentifierKind::Action, name)
        }
    }

    /// Identifier of the `index`-th parameter of an action
    pub fn parameter(action: &Identifier, index: usize) -> Self {
        Identifier {
            kind: IdentifierKind::Parameter,
            parameter_index: Some(index),
            ..action.clone()
        }
    }

    fn member(class_name: TypeName, kind: IdentifierKind, name: &str) -> Self {
        Identifier {
            class_name,
            kind,
            member_name: Some(Arc::from(name)),
            parameter_types: Vec::new(),
            parameter_index: None,
        }
    }

    /// Type the identified element belongs to
    pub fn class_name(&self) -> &TypeName {
        &self.class_name
    }

    /// Kind of element
    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// Member name (`None` for type identifiers)
    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    /// Parameter types (actions and parameters only)
    pub fn parameter_types(&self) -> &[TypeName] {
        &self.parameter_types
    }

    /// Parameter position (parameters only)
    pub fn parameter_index(&self) -> Option<usize> {
        self.parameter_index
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name.short_name())?;
        if let Some(member) = &self.member_name {
            write!(f, "#{}", member)?;
        }
        if matches!(self.kind, IdentifierKind::Action | IdentifierKind::Parameter) {
            let params: Vec<&str> = self.parameter_types.iter().map(|t| t.short_name()).collect();
            write!(f, "({})", params.join(","))?;
        }
        if let Some(index) = self.parameter_index {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

/// Identity token of a managed instance: `<spec-id>:<identifier>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bookmark {
    spec_id: ObjectSpecId,
    identifier: String,
}

impl Bookmark {
    /// Create a bookmark
    pub fn new(spec_id: ObjectSpecId, identifier: impl Into<String>) -> Self {
        Bookmark {
            spec_id,
            identifier: identifier.into(),
        }
    }

    /// Logical type of the bookmarked instance
    pub fn spec_id(&self) -> &ObjectSpecId {
        &self.spec_id
    }

    /// Instance identifier within its type
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.spec_id, self.identifier)
    }
}

/// Error returned when a string is not a valid bookmark
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid bookmark: {0}")]
pub struct ParseBookmarkError(String);

impl FromStr for Bookmark {
    type Err = ParseBookmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((spec, id)) if !spec.is_empty() && !id.is_empty() => {
                Ok(Bookmark::new(ObjectSpecId::new(spec), id))
            }
            _ => Err(ParseBookmarkError(s.to_string())),
        }
    }
}
