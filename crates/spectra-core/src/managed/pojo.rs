//! Runtime values wrapped by managed objects

use crate::ident::TypeName;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Text
    String(String),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl ScalarValue {
    /// Name of the builtin value type
    pub fn type_name(&self) -> TypeName {
        TypeName::new(match self {
            ScalarValue::String(_) => "string",
            ScalarValue::Int(_) => "i64",
            ScalarValue::Float(_) => "f64",
            ScalarValue::Bool(_) => "bool",
        })
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::Float(x) => write!(f, "{x}"),
            ScalarValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// An instance of a domain type: its runtime type and field values
#[derive(Debug)]
pub struct DomainObject {
    type_name: TypeName,
    fields: BTreeMap<String, Pojo>,
}

impl DomainObject {
    /// Start building an instance of `type_name`
    pub fn builder(type_name: &str) -> DomainObjectBuilder {
        DomainObjectBuilder {
            type_name: TypeName::new(type_name),
            fields: BTreeMap::new(),
        }
    }

    /// Runtime type
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Field value
    pub fn field(&self, name: &str) -> Option<&Pojo> {
        self.fields.get(name)
    }

    /// Field names, sorted
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Builder for [`DomainObject`]
#[derive(Debug)]
pub struct DomainObjectBuilder {
    type_name: TypeName,
    fields: BTreeMap<String, Pojo>,
}

impl DomainObjectBuilder {
    /// Set a field
    pub fn field(mut self, name: &str, value: Pojo) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Finish as a [`Pojo::Object`]
    pub fn build(self) -> Pojo {
        Pojo::Object(Arc::new(DomainObject {
            type_name: self.type_name,
            fields: self.fields,
        }))
    }
}

/// A shared, mutable list of values; may contain itself
#[derive(Clone, Default)]
pub struct PojoList(Arc<RwLock<Vec<Pojo>>>);

impl PojoList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value
    pub fn push(&self, value: Pojo) {
        self.0.write().push(value);
    }

    /// Copy of the current elements
    pub fn snapshot(&self) -> Vec<Pojo> {
        self.0.read().clone()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// True if the list has no elements
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Whether both handles share the same list
    pub fn ptr_eq(&self, other: &PojoList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for PojoList {
    // Elements are not printed: a list may contain itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PojoList(len = {})", self.len())
    }
}

impl From<Vec<Pojo>> for PojoList {
    fn from(values: Vec<Pojo>) -> Self {
        PojoList(Arc::new(RwLock::new(values)))
    }
}

/// A runtime value
#[derive(Debug, Clone)]
pub enum Pojo {
    /// An instance of a domain type
    Object(Arc<DomainObject>),
    /// A scalar
    Value(ScalarValue),
    /// A list of values
    Collection(PojoList),
}

impl Pojo {
    /// Runtime type; `None` for collections, which carry no type of their own
    pub fn type_name(&self) -> Option<TypeName> {
        match self {
            Pojo::Object(object) => Some(object.type_name().clone()),
            Pojo::Value(value) => Some(value.type_name()),
            Pojo::Collection(_) => None,
        }
    }

    /// Field of a domain object
    pub fn field(&self, name: &str) -> Option<&Pojo> {
        match self {
            Pojo::Object(object) => object.field(name),
            _ => None,
        }
    }

    /// The list behind a collection value
    pub fn as_list(&self) -> Option<&PojoList> {
        match self {
            Pojo::Collection(list) => Some(list),
            _ => None,
        }
    }

    /// Same instance for objects and lists, equal value for scalars
    pub fn same_instance(&self, other: &Pojo) -> bool {
        match (self, other) {
            (Pojo::Object(a), Pojo::Object(b)) => Arc::ptr_eq(a, b),
            (Pojo::Collection(a), Pojo::Collection(b)) => a.ptr_eq(b),
            (Pojo::Value(a), Pojo::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Pojo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pojo::Object(object) => f.write_str(object.type_name().short_name()),
            Pojo::Value(value) => write!(f, "{value}"),
            Pojo::Collection(list) => write!(f, "[{} elements]", list.len()),
        }
    }
}

impl From<&str> for Pojo {
    fn from(value: &str) -> Self {
        Pojo::Value(ScalarValue::String(value.to_string()))
    }
}

impl From<String> for Pojo {
    fn from(value: String) -> Self {
        Pojo::Value(ScalarValue::String(value))
    }
}

impl From<i64> for Pojo {
    fn from(value: i64) -> Self {
        Pojo::Value(ScalarValue::Int(value))
    }
}

impl From<bool> for Pojo {
    fn from(value: bool) -> Self {
        Pojo::Value(ScalarValue::Bool(value))
    }
}

impl From<PojoList> for Pojo {
    fn from(list: PojoList) -> Self {
        Pojo::Collection(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_types() {
        let customer = DomainObject::builder("dom.Customer").build();
        assert_eq!(customer.type_name(), Some(TypeName::new("dom.Customer")));
        assert_eq!(Pojo::from(3_i64).type_name(), Some(TypeName::new("i64")));
        assert_eq!(Pojo::from(true).type_name(), Some(TypeName::new("bool")));
        assert_eq!(Pojo::from(PojoList::new()).type_name(), None);
    }

    #[test]
    fn test_self_referential_list_debug_terminates() {
        let list = PojoList::new();
        list.push(Pojo::Collection(list.clone()));
        assert_eq!(format!("{:?}", Pojo::Collection(list.clone())), "Collection(PojoList(len = 1))");
        assert_eq!(Pojo::Collection(list).to_string(), "[1 elements]");
    }

    #[test]
    fn test_same_instance() {
        let a = DomainObject::builder("dom.A").build();
        let b = DomainObject::builder("dom.A").build();
        assert!(a.same_instance(&a.clone()));
        assert!(!a.same_instance(&b));
        assert!(Pojo::from("x").same_instance(&Pojo::from("x")));
    }
}
