//! Managed objects: a specification paired with a runtime value
//!
//! A [`ManagedObject`] is created per interaction and is short-lived
//! compared to the specification graph. Its identity token (bookmark) is
//! computed once through an [`IdentityProvider`] and memoized until the
//! value is replaced or a refresh is requested.

mod compat;
mod memo;
mod pojo;

pub use memo::Memo;
pub use pojo::{DomainObject, DomainObjectBuilder, Pojo, PojoList, ScalarValue};

use crate::error::{MetaModelError, Result};
use crate::facet::standard::{IconFacet, TitleFacet};
use crate::facet::{FacetHolder, FacetType};
use crate::ident::Bookmark;
use crate::loader::SpecificationLoader;
use crate::spec::ObjectSpecification;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Computes the identity of managed instances
pub trait IdentityProvider {
    /// Instance identifier, or `None` if the object is not identifiable
    fn identify(&self, object: &ManagedObject) -> Option<String>;
}

enum SpecSlot {
    Known(Arc<ObjectSpecification>),
    Lazy {
        loader: SpecificationLoader,
        resolved: OnceCell<Arc<ObjectSpecification>>,
    },
}

/// A runtime value together with its specification
pub struct ManagedObject {
    spec: SpecSlot,
    pojo: RwLock<Option<Pojo>>,
    bookmark: Memo<Option<Bookmark>>,
}

impl ManagedObject {
    /// Wrap `pojo` against `spec`
    ///
    /// When the value's runtime type is the specification's type, the
    /// value is wrapped as is. Value specifications keep `spec` once the
    /// value is checked against it. Otherwise the specification of the
    /// runtime type is loaded and used if it is a subtype of `spec`;
    /// collections are checked element by element. Fails with
    /// [`MetaModelError::Incompatible`] if the value cannot be an instance
    /// of `spec`.
    pub fn of(spec: Arc<ObjectSpecification>, pojo: Option<Pojo>) -> Result<Self> {
        let Some(pojo) = pojo else {
            return Ok(Self::empty(spec));
        };
        if pojo.type_name().as_ref() == Some(spec.type_name()) {
            return Ok(Self::wrap(SpecSlot::Known(spec), Some(pojo)));
        }
        if spec.is_value() {
            compat::assert_compatible(&spec, &pojo)?;
            return Ok(Self::wrap(SpecSlot::Known(spec), Some(pojo)));
        }
        Self::adapt(spec, pojo)
    }

    fn adapt(spec: Arc<ObjectSpecification>, pojo: Pojo) -> Result<Self> {
        let Some(runtime_type) = pojo.type_name() else {
            compat::assert_compatible(&spec, &pojo)?;
            return Ok(Self::wrap(SpecSlot::Known(spec), Some(pojo)));
        };

        let runtime_spec = spec
            .loader()?
            .load_by_name(runtime_type.full_name())?
            .ok_or_else(|| MetaModelError::UnknownType {
                value: pojo.to_string(),
            })?;
        if !runtime_spec.is_of_type(&spec) {
            return Err(compat::incompatible(&spec, runtime_type.full_name()));
        }

        tracing::trace!(
            declared = %spec.type_name(),
            runtime = %runtime_spec.type_name(),
            "adapted to runtime specification"
        );
        Ok(Self::wrap(SpecSlot::Known(runtime_spec), Some(pojo)))
    }

    /// Wrap a value whose identity is already known
    pub fn bookmarked(spec: Arc<ObjectSpecification>, pojo: Pojo, bookmark: Bookmark) -> Result<Self> {
        let object = Self::of(spec, Some(pojo))?;
        object.bookmark.set(Some(bookmark));
        Ok(object)
    }

    /// Wrap a value whose specification is resolved from its runtime type
    /// on first access
    pub fn lazy(loader: SpecificationLoader, pojo: Pojo) -> Self {
        Self::wrap(
            SpecSlot::Lazy {
                loader,
                resolved: OnceCell::new(),
            },
            Some(pojo),
        )
    }

    /// A managed object with no value
    pub fn empty(spec: Arc<ObjectSpecification>) -> Self {
        Self::wrap(SpecSlot::Known(spec), None)
    }

    fn wrap(spec: SpecSlot, pojo: Option<Pojo>) -> Self {
        Self {
            spec,
            pojo: RwLock::new(pojo),
            bookmark: Memo::new(),
        }
    }

    /// The specification, resolving it first for lazy objects
    pub fn specification(&self) -> Result<Arc<ObjectSpecification>> {
        match &self.spec {
            SpecSlot::Known(spec) => Ok(spec.clone()),
            SpecSlot::Lazy { loader, resolved } => resolved
                .get_or_try_init(|| {
                    let pojo = self.pojo();
                    let unknown = || MetaModelError::UnknownType {
                        value: pojo
                            .as_ref()
                            .map_or_else(|| "an empty value".to_string(), Pojo::to_string),
                    };
                    let type_name = pojo.as_ref().and_then(Pojo::type_name).ok_or_else(unknown)?;
                    loader.load_by_name(type_name.full_name())?.ok_or_else(unknown)
                })
                .cloned(),
        }
    }

    /// Whether the specification has been resolved
    pub fn is_specification_resolved(&self) -> bool {
        match &self.spec {
            SpecSlot::Known(_) => true,
            SpecSlot::Lazy { resolved, .. } => resolved.get().is_some(),
        }
    }

    /// The wrapped value
    pub fn pojo(&self) -> Option<Pojo> {
        self.pojo.read().clone()
    }

    /// Replace the wrapped value in place; drops the memoized bookmark
    pub fn replace_pojo(&self, pojo: Option<Pojo>) -> Result<()> {
        if let Some(new_value) = &pojo {
            let spec = self.specification()?;
            compat::assert_compatible(&spec, new_value)?;
        }
        *self.pojo.write() = pojo;
        self.bookmark.invalidate();
        Ok(())
    }

    /// Title rendered through the title facet
    ///
    /// Scalars render themselves; objects without a title facet fall back to
    /// `Untitled <singular name>`; an empty object has an empty title.
    pub fn title(&self) -> Result<String> {
        let spec = self.specification()?;
        let Some(pojo) = self.pojo() else {
            return Ok(String::new());
        };
        Ok(match spec.facet::<TitleFacet>(FacetType::TITLE) {
            Some(title) => title.title(&pojo),
            None => match &pojo {
                Pojo::Value(value) => value.to_string(),
                _ => format!("Untitled {}", spec.singular_name()),
            },
        })
    }

    /// Icon name from the icon facet
    pub fn icon_name(&self) -> Result<Option<String>> {
        let spec = self.specification()?;
        Ok(spec
            .facet::<IconFacet>(FacetType::ICON)
            .map(|icon| icon.value().to_string()))
    }

    /// Identity token, computed through `provider` on first request
    ///
    /// Empty objects have no identity and are never memoized.
    pub fn bookmark(&self, provider: &dyn IdentityProvider) -> Result<Option<Bookmark>> {
        if self.pojo.read().is_none() {
            return Ok(None);
        }
        let spec = self.specification()?;
        Ok(self.bookmark.get_or_init(|| {
            let bookmark = provider
                .identify(self)
                .map(|id| Bookmark::new(spec.spec_id().clone(), id));
            tracing::trace!(spec = %spec.type_name(), bookmark = ?bookmark, "bookmark computed");
            bookmark
        }))
    }

    /// Drop the memoized bookmark so it is recomputed
    ///
    /// Entities have structural identity; the request is ignored for them
    /// and `false` is returned.
    pub fn refresh_bookmark(&self) -> bool {
        if self.specification().is_ok_and(|spec| spec.is_entity()) {
            tracing::trace!("bookmark refresh ignored for entity");
            return false;
        }
        self.bookmark.invalidate();
        true
    }

    /// Whether a bookmark is currently memoized
    pub fn is_bookmark_memoized(&self) -> bool {
        self.bookmark.is_memoized()
    }
}

impl fmt::Debug for ManagedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = match &self.spec {
            SpecSlot::Known(spec) => Some(spec.type_name().clone()),
            SpecSlot::Lazy { resolved, .. } => resolved.get().map(|spec| spec.type_name().clone()),
        };
        f.debug_struct("ManagedObject")
            .field("spec", &spec)
            .field("pojo", &self.pojo())
            .field("bookmark", &self.bookmark)
            .finish()
    }
}
