//! Reflected type descriptions
//!
//! A [`TypeDescriptor`] is the raw, reflected shape of a domain type: its
//! supertypes, members and annotations. Descriptors are supplied by a
//! [`ClassSource`]; the loader turns them into specifications and the
//! programming model turns their annotations into facets.

use crate::ident::TypeName;
use crate::spec::ActionType;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Annotation map attached to types and members
pub type Annotations = BTreeMap<String, String>;

/// Broad shape of a reflected type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A concrete or abstract class
    #[default]
    Class,
    /// An interface
    Interface,
    /// A scalar value type
    Value,
    /// A collection of elements
    Collection,
}

/// A reflected property or collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Member name
    pub name: String,
    /// Declared type (element type for collections)
    #[serde(rename = "type")]
    pub type_name: TypeName,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl PropertyDescriptor {
    /// Create a property descriptor
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: TypeName::new(type_name),
            annotations: Annotations::new(),
        }
    }

    /// Add an annotation
    pub fn annotate(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }
}

/// A reflected action parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub type_name: TypeName,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl ParameterDescriptor {
    /// Create a parameter descriptor
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: TypeName::new(type_name),
            annotations: Annotations::new(),
        }
    }

    /// Add an annotation
    pub fn annotate(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }
}

/// A reflected action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Action name
    pub name: String,
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Return type, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeName>,
    /// Action category
    #[serde(default, rename = "action-type")]
    pub action_type: ActionType,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl ActionDescriptor {
    /// Create an action descriptor with no parameters
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: Vec::new(),
            returns: None,
            action_type: ActionType::User,
            annotations: Annotations::new(),
        }
    }

    /// Append a parameter
    pub fn param(mut self, name: &str, type_name: &str) -> Self {
        self.parameters.push(ParameterDescriptor::new(name, type_name));
        self
    }

    /// Append a prepared parameter descriptor
    pub fn with_param(mut self, param: ParameterDescriptor) -> Self {
        self.parameters.push(param);
        self
    }

    /// Set the return type
    pub fn returns(mut self, type_name: &str) -> Self {
        self.returns = Some(TypeName::new(type_name));
        self
    }

    /// Set the action category
    pub fn action_type(mut self, action_type: ActionType) -> Self {
        self.action_type = action_type;
        self
    }
}

/// Reflected description of a domain type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified type name
    pub name: TypeName,
    /// Logical name used for external addressing (defaults to `name`)
    #[serde(default, rename = "logical-name", skip_serializing_if = "Option::is_none")]
    pub logical_name: Option<String>,
    /// Shape of the type
    #[serde(default)]
    pub kind: TypeKind,
    /// Superclass (none for hierarchy roots)
    #[serde(default, rename = "extends", skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeName>,
    /// Implemented interfaces, in declaration order
    #[serde(default, rename = "implements")]
    pub interfaces: Vec<TypeName>,
    /// Whether the type is abstract
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Element type of a collection type
    #[serde(default, rename = "element-type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<TypeName>,
    /// Scalar and reference properties
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Collection associations
    #[serde(default)]
    pub collections: Vec<PropertyDescriptor>,
    /// Actions
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
    /// Type-level annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl TypeDescriptor {
    /// Describe a class
    pub fn class(name: &str) -> Self {
        Self::of_kind(name, TypeKind::Class)
    }

    /// Describe an interface
    pub fn interface(name: &str) -> Self {
        Self::of_kind(name, TypeKind::Interface)
    }

    /// Describe a scalar value type
    pub fn value(name: &str) -> Self {
        Self::of_kind(name, TypeKind::Value)
    }

    /// Describe a collection type with the given element type
    pub fn collection(name: &str, element_type: &str) -> Self {
        Self {
            element_type: Some(TypeName::new(element_type)),
            ..Self::of_kind(name, TypeKind::Collection)
        }
    }

    fn of_kind(name: &str, kind: TypeKind) -> Self {
        Self {
            name: TypeName::new(name),
            logical_name: None,
            kind,
            superclass: None,
            interfaces: Vec::new(),
            is_abstract: false,
            element_type: None,
            properties: Vec::new(),
            collections: Vec::new(),
            actions: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(TypeName::new(superclass));
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(TypeName::new(interface));
        self
    }

    /// Mark the type abstract
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the logical name
    pub fn logical_name(mut self, logical_name: &str) -> Self {
        self.logical_name = Some(logical_name.to_string());
        self
    }

    /// Add a property
    pub fn property(mut self, name: &str, type_name: &str) -> Self {
        self.properties.push(PropertyDescriptor::new(name, type_name));
        self
    }

    /// Add a prepared property descriptor
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a collection
    pub fn collection_of(mut self, name: &str, element_type: &str) -> Self {
        self.collections.push(PropertyDescriptor::new(name, element_type));
        self
    }

    /// Add an action
    pub fn action(mut self, action: ActionDescriptor) -> Self {
        self.actions.push(action);
        self
    }

    /// Add a type-level annotation
    pub fn annotate(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }
}

/// Source of reflected type descriptions
///
/// `describe` returning `None` means the type is unknown or filtered out
/// by policy; callers treat that as a legitimate outcome.
pub trait ClassSource: Send + Sync {
    /// Describe the named type
    fn describe(&self, name: &TypeName) -> Option<Arc<TypeDescriptor>>;

    /// All names this source can describe
    fn type_names(&self) -> Vec<TypeName> {
        Vec::new()
    }
}

/// Names of the builtin scalar value types
pub const BUILTIN_VALUE_TYPES: [&str; 4] = ["string", "i64", "f64", "bool"];

/// In-memory registry of type descriptors with an exclusion filter
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: RwLock<FxHashMap<TypeName, Arc<TypeDescriptor>>>,
    exclude_prefixes: Vec<String>,
}

impl TypeCatalog {
    /// Create a catalog holding only the builtin value types
    pub fn new() -> Self {
        let catalog = Self::default();
        for name in BUILTIN_VALUE_TYPES {
            catalog.register(TypeDescriptor::value(name));
        }
        catalog
    }

    /// Create a catalog that hides types whose name starts with any prefix
    pub fn with_exclusions(exclude_prefixes: Vec<String>) -> Self {
        Self {
            exclude_prefixes,
            ..Self::new()
        }
    }

    /// Register or replace a descriptor
    pub fn register(&self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>> {
        self.types
            .write()
            .insert(descriptor.name.clone(), Arc::new(descriptor))
    }

    /// Remove a descriptor
    pub fn unregister(&self, name: &TypeName) -> Option<Arc<TypeDescriptor>> {
        self.types.write().remove(name)
    }

    /// Whether the name is filtered out by policy
    pub fn is_excluded(&self, name: &TypeName) -> bool {
        self.exclude_prefixes
            .iter()
            .any(|prefix| name.full_name().starts_with(prefix.as_str()))
    }

    /// Number of registered descriptors
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl ClassSource for TypeCatalog {
    fn describe(&self, name: &TypeName) -> Option<Arc<TypeDescriptor>> {
        if self.is_excluded(name) {
            return None;
        }
        self.types.read().get(name).cloned()
    }

    fn type_names(&self) -> Vec<TypeName> {
        let mut names: Vec<TypeName> = self
            .types
            .read()
            .keys()
            .filter(|name| !self.is_excluded(name))
            .cloned()
            .collect();
        names.sort();
        names
    }
}
