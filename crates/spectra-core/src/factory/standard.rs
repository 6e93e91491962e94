//! Annotation-driven facet factories
//!
//! | annotation     | on                       | facet                                  |
//! |----------------|--------------------------|----------------------------------------|
//! | `nature`       | type                     | [`NatureFacet`]                        |
//! | `persistence`  | type (with `nature`)     | refines [`NatureFacet`]                |
//! | `named`        | type, member, parameter  | [`NamedFacet`] or [`NounsFacet`]       |
//! | `plural`       | type                     | [`PluralFacet`] or [`NounsFacet`]      |
//! | `described-as` | type, member, parameter  | [`DescribedAsFacet`]                   |
//! | `title`        | type                     | [`TitleFacet`], `none` for a no-op     |
//! | `icon`         | type                     | [`IconFacet`], `none` for a no-op      |
//! | `hidden`       | member, parameter        | [`HiddenFacet`], `nowhere` for a no-op |

use super::{FacetFactory, MemberContext, ParameterContext, TypeContext};
use crate::descriptor::Annotations;
use crate::error::{MetaModelError, Result};
use crate::facet::standard::{
    DescribedAsFacet, HiddenFacet, IconFacet, NamedFacet, NatureFacet, NoopFacet, NounsFacet,
    PluralFacet, TitleFacet, Where,
};
use crate::facet::{FacetHolder, FacetType};
use crate::spec::{BeanSort, Persistability};
use std::sync::Arc;

const NO_FACET: &str = "none";

fn factory_error(factory: &'static str, holder: &dyn FacetHolder, message: String) -> MetaModelError {
    MetaModelError::FacetFactory {
        factory,
        identifier: holder.identifier().to_string(),
        message,
    }
}

/// Classifies types from the `nature` and `persistence` annotations
#[derive(Debug, Clone, Copy, Default)]
pub struct NatureFacetFactory;

impl FacetFactory for NatureFacetFactory {
    fn name(&self) -> &'static str {
        "nature"
    }

    fn process_type(&self, cx: &TypeContext<'_>) -> Result<()> {
        let annotations = &cx.descriptor.annotations;
        let Some(nature) = annotations.get("nature") else {
            return Ok(());
        };

        let sort = match nature.as_str() {
            "entity" => BeanSort::Entity,
            "view-model" => BeanSort::ViewModel,
            "service" | "managed-bean" => BeanSort::ManagedBean,
            "mixin" => BeanSort::Mixin,
            "value" => BeanSort::Value,
            other => {
                return Err(factory_error(
                    self.name(),
                    &**cx.spec,
                    format!("unknown nature '{other}'"),
                ))
            }
        };

        let persistability = match (sort, annotations.get("persistence").map(String::as_str)) {
            (BeanSort::Entity, None | Some("user")) => Persistability::UserPersistable,
            (BeanSort::Entity, Some("program")) => Persistability::ProgramPersistable,
            (_, None | Some("none")) => Persistability::Transient,
            (_, Some(other)) => {
                return Err(factory_error(
                    self.name(),
                    &**cx.spec,
                    format!("persistence '{other}' does not apply to nature '{nature}'"),
                ))
            }
        };

        cx.spec.add_facet(Arc::new(NatureFacet {
            sort,
            persistability,
        }));
        Ok(())
    }
}

/// Attaches names and descriptions
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingFacetFactory;

impl NamingFacetFactory {
    fn attach(holder: &dyn FacetHolder, annotations: &Annotations) {
        match (annotations.get("named"), annotations.get("plural")) {
            (Some(singular), Some(plural)) => {
                holder.add_multi_typed_facet(Arc::new(NounsFacet::new(singular, plural)));
            }
            (Some(singular), None) => holder.add_facet(Arc::new(NamedFacet::new(singular))),
            (None, Some(plural)) => holder.add_facet(Arc::new(PluralFacet::new(plural))),
            (None, None) => {}
        }
        if let Some(description) = annotations.get("described-as") {
            holder.add_facet(Arc::new(DescribedAsFacet::new(description)));
        }
    }
}

impl FacetFactory for NamingFacetFactory {
    fn name(&self) -> &'static str {
        "naming"
    }

    fn process_type(&self, cx: &TypeContext<'_>) -> Result<()> {
        Self::attach(&**cx.spec, &cx.descriptor.annotations);
        Ok(())
    }

    fn process_member(&self, cx: &MemberContext<'_>) -> Result<()> {
        Self::attach(cx.holder, cx.member.annotations());
        Ok(())
    }

    fn process_parameter(&self, cx: &ParameterContext<'_>) -> Result<()> {
        Self::attach(cx.holder, &cx.parameter.annotations);
        Ok(())
    }
}

/// Derives titles from the `title` annotation
///
/// `none` records an explicit no-op, text with `{field}` placeholders is a
/// template, the name of a declared property renders that property, and
/// anything else is fixed text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleFacetFactory;

impl FacetFactory for TitleFacetFactory {
    fn name(&self) -> &'static str {
        "title"
    }

    fn process_type(&self, cx: &TypeContext<'_>) -> Result<()> {
        let Some(title) = cx.descriptor.annotations.get("title") else {
            return Ok(());
        };

        if title == NO_FACET {
            cx.spec.add_facet(Arc::new(NoopFacet::new(FacetType::TITLE)));
            return Ok(());
        }

        let facet = if title.contains('{') {
            TitleFacet::Template(title.clone())
        } else if cx.descriptor.properties.iter().any(|p| &p.name == title) {
            TitleFacet::Property(title.clone())
        } else {
            TitleFacet::Fixed(title.clone())
        };
        cx.spec.add_facet(Arc::new(facet));
        Ok(())
    }
}

/// Attaches icon names
#[derive(Debug, Clone, Copy, Default)]
pub struct IconFacetFactory;

impl FacetFactory for IconFacetFactory {
    fn name(&self) -> &'static str {
        "icon"
    }

    fn process_type(&self, cx: &TypeContext<'_>) -> Result<()> {
        match cx.descriptor.annotations.get("icon") {
            Some(icon) if icon == NO_FACET => {
                cx.spec.add_facet(Arc::new(NoopFacet::new(FacetType::ICON)));
            }
            Some(icon) => cx.spec.add_facet(Arc::new(IconFacet::new(icon))),
            None => {}
        }
        Ok(())
    }
}

/// Attaches visibility restrictions to members and parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenFacetFactory;

impl HiddenFacetFactory {
    fn attach(&self, holder: &dyn FacetHolder, annotations: &Annotations) -> Result<()> {
        let Some(hidden) = annotations.get("hidden") else {
            return Ok(());
        };
        let where_ = match hidden.as_str() {
            "everywhere" | "true" => Where::Everywhere,
            "tables" => Where::Tables,
            "forms" => Where::Forms,
            "nowhere" | "false" => {
                holder.add_facet(Arc::new(NoopFacet::new(FacetType::HIDDEN)));
                return Ok(());
            }
            other => {
                return Err(factory_error(
                    self.name(),
                    holder,
                    format!("unknown hidden value '{other}'"),
                ))
            }
        };
        holder.add_facet(Arc::new(HiddenFacet::new(where_)));
        Ok(())
    }
}

impl FacetFactory for HiddenFacetFactory {
    fn name(&self) -> &'static str {
        "hidden"
    }

    fn process_member(&self, cx: &MemberContext<'_>) -> Result<()> {
        self.attach(cx.holder, cx.member.annotations())
    }

    fn process_parameter(&self, cx: &ParameterContext<'_>) -> Result<()> {
        self.attach(cx.holder, &cx.parameter.annotations)
    }
}
