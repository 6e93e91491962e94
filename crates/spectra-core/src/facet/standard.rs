//! Standard facets understood by the engine itself
//!
//! Names and descriptions feed the naming pass, titles and icons feed
//! [`ManagedObject`](crate::managed::ManagedObject), hidden facets gate
//! action contributions, and the nature facet classifies a specification.

use super::{Facet, FacetType};
use crate::managed::Pojo;
use crate::spec::{BeanSort, Persistability};

/// Explicit "considered and found absent" placeholder for any facet type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoopFacet {
    facet_type: FacetType,
}

impl NoopFacet {
    /// Create a no-op placeholder for `facet_type`
    pub fn new(facet_type: FacetType) -> Self {
        Self { facet_type }
    }
}

impl Facet for NoopFacet {
    fn facet_type(&self) -> FacetType {
        self.facet_type
    }

    fn is_noop(&self) -> bool {
        true
    }
}

macro_rules! text_facet {
    ($(#[$doc:meta])* $name:ident, $facet_type:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            value: String,
        }

        impl $name {
            /// Create the facet
            pub fn new(value: impl Into<String>) -> Self {
                Self { value: value.into() }
            }

            /// Text carried by the facet
            pub fn value(&self) -> &str {
                &self.value
            }
        }

        impl Facet for $name {
            fn facet_type(&self) -> FacetType {
                $facet_type
            }

            fn text_for(&self, facet_type: FacetType) -> Option<&str> {
                (facet_type == $facet_type).then_some(self.value.as_str())
            }
        }
    };
}

text_facet!(
    /// Singular display name
    NamedFacet,
    FacetType::NAMED
);
text_facet!(
    /// Plural display name
    PluralFacet,
    FacetType::PLURAL
);
text_facet!(
    /// Human-readable description
    DescribedAsFacet,
    FacetType::DESCRIBED_AS
);
text_facet!(
    /// Icon name
    IconFacet,
    FacetType::ICON
);

/// Singular and plural nouns in one facet; registered under both tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NounsFacet {
    singular: String,
    plural: String,
}

impl NounsFacet {
    /// Create the facet
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }
}

impl Facet for NounsFacet {
    fn facet_type(&self) -> FacetType {
        FacetType::NAMED
    }

    fn facet_types(&self) -> Vec<FacetType> {
        vec![FacetType::NAMED, FacetType::PLURAL]
    }

    fn text_for(&self, facet_type: FacetType) -> Option<&str> {
        match facet_type {
            FacetType::NAMED => Some(&self.singular),
            FacetType::PLURAL => Some(&self.plural),
            _ => None,
        }
    }
}

/// How a title is derived from an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleFacet {
    /// The same text for every instance
    Fixed(String),
    /// The rendered value of one property
    Property(String),
    /// A template with `{field}` placeholders
    Template(String),
}

impl TitleFacet {
    /// Render the title of `pojo`
    pub fn title(&self, pojo: &Pojo) -> String {
        match self {
            TitleFacet::Fixed(text) => text.clone(),
            TitleFacet::Property(field) => pojo
                .field(field)
                .map(|value| value.to_string())
                .unwrap_or_default(),
            TitleFacet::Template(template) => render_template(template, pojo),
        }
    }
}

impl Facet for TitleFacet {
    fn facet_type(&self) -> FacetType {
        FacetType::TITLE
    }
}

fn render_template(template: &str, pojo: &Pojo) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let field = &after[..end];
                if let Some(value) = pojo.field(field) {
                    out.push_str(&value.to_string());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Where a member is hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Where {
    /// Hidden from all interaction
    Everywhere,
    /// Hidden in tables only
    Tables,
    /// Hidden in forms only
    Forms,
}

/// Visibility restriction on a member or parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiddenFacet {
    /// Where the element is hidden
    pub where_: Where,
}

impl HiddenFacet {
    /// Create the facet
    pub fn new(where_: Where) -> Self {
        Self { where_ }
    }

    /// True when the element takes part in no interaction at all
    pub fn is_hidden_everywhere(&self) -> bool {
        self.where_ == Where::Everywhere
    }
}

impl Facet for HiddenFacet {
    fn facet_type(&self) -> FacetType {
        FacetType::HIDDEN
    }
}

/// Classification of a type: bean sort and persistability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NatureFacet {
    /// Bean sort of the type
    pub sort: BeanSort,
    /// Persistability of the type
    pub persistability: Persistability,
}

impl Facet for NatureFacet {
    fn facet_type(&self) -> FacetType {
        FacetType::NATURE
    }
}
