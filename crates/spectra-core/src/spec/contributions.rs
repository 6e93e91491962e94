//! Contributed action assembly

use super::member::{ActionMember, ContributedActionSet};
use super::{ActionType, ObjectSpecification};
use crate::error::Result;
use crate::loader::SpecificationLoader;
use std::sync::Arc;

/// Scan every service for actions that accept `spec` as a parameter
///
/// A service never contributes to its own type. An action is eligible only
/// if none of its parameters is hidden everywhere.
pub(super) fn compute(
    spec: &ObjectSpecification,
    loader: &SpecificationLoader,
    types: &[ActionType],
) -> Result<Vec<ActionMember>> {
    let mut sets = Vec::new();

    for service in loader.services() {
        let Some(service_type) = service.type_name() else {
            tracing::warn!(service = %service, "service without a type skipped");
            continue;
        };
        if &service_type == spec.type_name() {
            continue;
        }

        let service_spec = loader.load_specification(&service_type)?;
        let mut contributed = Vec::new();

        for action in service_spec.declared_actions()? {
            if !types.contains(&action.action_type()) {
                continue;
            }
            if action.parameters().iter().any(|param| param.is_hidden_everywhere()) {
                continue;
            }

            let mut accepts = false;
            for param in action.parameters() {
                if let Some(param_spec) = loader.load_by_name(param.type_name().full_name())? {
                    if spec.is_of_type(&param_spec) {
                        accepts = true;
                        break;
                    }
                }
            }
            if accepts {
                contributed.push(action);
            }
        }

        if !contributed.is_empty() {
            tracing::debug!(
                spec = %spec.type_name(),
                service = %service_type,
                actions = contributed.len(),
                "actions contributed"
            );
            sets.push(ActionMember::ContributedSet(Arc::new(ContributedActionSet::new(
                service_spec,
                service,
                contributed,
            ))));
        }
    }

    Ok(sets)
}
