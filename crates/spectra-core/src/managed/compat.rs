//! Value/specification compatibility

use super::pojo::{Pojo, PojoList};
use crate::error::{MetaModelError, Result};
use crate::spec::ObjectSpecification;
use std::sync::Arc;

pub(super) fn incompatible(spec: &ObjectSpecification, actual: &str) -> MetaModelError {
    MetaModelError::Incompatible {
        expected: spec.type_name().to_string(),
        actual: actual.to_string(),
    }
}

/// Check that `pojo` can be an instance of `spec`
///
/// Typed values must be of `spec` or one of its subtypes. For non-scalar
/// specifications a collection is checked element by element against the
/// element specification (or `spec` itself); lists already on the descent
/// path are skipped.
pub(super) fn assert_compatible(spec: &Arc<ObjectSpecification>, pojo: &Pojo) -> Result<()> {
    let mut visited = Vec::new();
    check(spec, pojo, &mut visited)
}

fn check(spec: &Arc<ObjectSpecification>, pojo: &Pojo, visited: &mut Vec<PojoList>) -> Result<()> {
    match pojo {
        Pojo::Collection(list) if !spec.is_value() => {
            if visited.iter().any(|seen| seen.ptr_eq(list)) {
                return Ok(());
            }
            visited.push(list.clone());

            let element_spec = spec
                .element_specification()?
                .unwrap_or_else(|| spec.clone());
            for element in list.snapshot() {
                check(&element_spec, &element, visited)?;
            }
            Ok(())
        }
        _ => {
            let Some(actual) = pojo.type_name() else {
                return Err(incompatible(spec, "collection"));
            };
            if &actual == spec.type_name() {
                return Ok(());
            }
            match spec.loader()?.load_by_name(actual.full_name())? {
                Some(actual_spec) if actual_spec.is_of_type(spec) => Ok(()),
                _ => Err(incompatible(spec, actual.full_name())),
            }
        }
    }
}
