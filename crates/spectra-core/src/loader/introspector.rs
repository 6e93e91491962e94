//! The two introspection passes

use super::{naming, SpecificationLoader};
use crate::error::{MetaModelError, Result};
use crate::facet::standard::NatureFacet;
use crate::facet::{FacetHolder, FacetType};
use crate::factory::{MemberContext, MemberDescriptor, ParameterContext, TypeContext};
use crate::ident::TypeName;
use crate::spec::{
    kind_classification, AssociationKind, Details, IntrospectionState, ObjectAction,
    ObjectAssociation, ObjectSpecification,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Drive `spec` up to `target`; the caller holds the node's lock
pub(super) fn introspect(
    loader: &SpecificationLoader,
    spec: &Arc<ObjectSpecification>,
    target: IntrospectionState,
) -> Result<()> {
    if spec.introspection_state() < IntrospectionState::TypeAndMembersIntrospected {
        introspect_type_and_members(loader, spec)?;
        spec.advance_state(IntrospectionState::TypeAndMembersIntrospected);
    }

    if target >= IntrospectionState::FullyIntrospected
        && spec.introspection_state() < IntrospectionState::FullyIntrospected
    {
        finish(spec);
        spec.advance_state(IntrospectionState::FullyIntrospected);
    }
    Ok(())
}

fn introspect_type_and_members(
    loader: &SpecificationLoader,
    spec: &Arc<ObjectSpecification>,
) -> Result<()> {
    let descriptor = spec.descriptor().clone();

    let superclass = descriptor
        .superclass
        .as_ref()
        .map(|name| load_supertype(loader, spec, name))
        .transpose()?;
    let interfaces = descriptor
        .interfaces
        .iter()
        .map(|name| load_supertype(loader, spec, name))
        .collect::<Result<Vec<_>>>()?;

    for supertype in interfaces.iter().chain(superclass.iter()) {
        check_acyclic(spec, supertype)?;
    }
    spec.link_hierarchy(superclass, interfaces);

    let model = loader.programming_model();
    model.process_type(&TypeContext {
        descriptor: &descriptor,
        spec,
        loader,
    })?;

    let loader_ref = loader.downgrade();
    let mut associations = Vec::with_capacity(descriptor.properties.len() + descriptor.collections.len());
    let groups = [
        (&descriptor.properties, AssociationKind::Property),
        (&descriptor.collections, AssociationKind::Collection),
    ];
    for (properties, kind) in groups {
        for property in properties {
            let association = Arc::new(ObjectAssociation::new(
                spec.type_name(),
                property,
                kind,
                loader_ref.clone(),
            ));
            let member = match kind {
                AssociationKind::Property => MemberDescriptor::Property(property),
                AssociationKind::Collection => MemberDescriptor::Collection(property),
            };
            model.process_member(&MemberContext {
                owner: &descriptor,
                member,
                holder: &*association,
                loader,
            })?;
            associations.push(association);
        }
    }

    let mut actions = Vec::with_capacity(descriptor.actions.len());
    for action_descriptor in &descriptor.actions {
        let action = Arc::new(ObjectAction::new(
            spec.type_name(),
            action_descriptor,
            loader_ref.clone(),
        ));
        model.process_member(&MemberContext {
            owner: &descriptor,
            member: MemberDescriptor::Action(action_descriptor),
            holder: &*action,
            loader,
        })?;
        for (param, param_descriptor) in action.parameters().iter().zip(&action_descriptor.parameters) {
            model.process_parameter(&ParameterContext {
                action: action_descriptor,
                parameter: param_descriptor,
                index: param.index(),
                holder: &**param,
                loader,
            })?;
        }
        actions.push(action);
    }

    tracing::debug!(
        spec = %spec.type_name(),
        associations = associations.len(),
        actions = actions.len(),
        "members introspected"
    );
    spec.set_members(associations, actions);
    Ok(())
}

fn load_supertype(
    loader: &SpecificationLoader,
    spec: &ObjectSpecification,
    name: &TypeName,
) -> Result<Arc<ObjectSpecification>> {
    loader
        .load_by_name(name.full_name())?
        .ok_or_else(|| MetaModelError::MissingSupertype {
            type_name: spec.type_name().to_string(),
            supertype: name.to_string(),
        })
}

/// Fail if any chain upward from `supertype` reaches `spec`
fn check_acyclic(spec: &ObjectSpecification, supertype: &Arc<ObjectSpecification>) -> Result<()> {
    let root = spec.type_name().to_string();
    let mut stack = vec![(supertype.clone(), vec![root, supertype.type_name().to_string()])];
    let mut visited: FxHashSet<TypeName> = FxHashSet::default();

    while let Some((node, path)) = stack.pop() {
        if node.type_name() == spec.type_name() {
            return Err(MetaModelError::CyclicHierarchy {
                chain: path.join(" -> "),
            });
        }
        if !visited.insert(node.type_name().clone()) {
            continue;
        }
        for next in node.declared_supertypes() {
            let mut next_path = path.clone();
            next_path.push(next.type_name().to_string());
            stack.push((next, next_path));
        }
    }
    Ok(())
}

/// Names, description and classification
fn finish(spec: &ObjectSpecification) {
    let own_text = |facet_type: FacetType| {
        spec.facets()
            .lookup(facet_type)
            .into_concrete()
            .and_then(|facet| facet.text_for(facet_type).map(str::to_owned))
    };

    let singular_name = own_text(FacetType::NAMED)
        .unwrap_or_else(|| naming::humanize(spec.short_name()));
    let plural_name = own_text(FacetType::PLURAL)
        .unwrap_or_else(|| naming::pluralize(&singular_name));
    let description = own_text(FacetType::DESCRIBED_AS).unwrap_or_default();

    let provisional = kind_classification(spec.descriptor());
    let (bean_sort, persistability) = match spec.facet::<NatureFacet>(FacetType::NATURE) {
        Some(nature) => (nature.sort, nature.persistability),
        None => provisional,
    };

    tracing::debug!(
        spec = %spec.type_name(),
        singular = %singular_name,
        sort = %bean_sort,
        "specification finished"
    );
    spec.set_details(Details {
        singular_name,
        plural_name,
        description,
        bean_sort,
        persistability,
    });
}
