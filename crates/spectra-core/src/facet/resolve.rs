//! Facet resolution over the type hierarchy

use super::{FacetHolder, FacetLookup, FacetType};
use crate::spec::ObjectSpecification;

/// Resolve `facet_type` for `spec`, walking its hierarchy
///
/// Search order, stopping at the first concrete facet:
/// 1. the facet attached directly to `spec`
/// 2. each declared interface, in declaration order (recursively)
/// 3. the superclass (recursively)
///
/// The first no-op placeholder met along the way is remembered and returned
/// only if no concrete facet exists anywhere in the walk. A no-op never
/// shadows a concrete facet found higher up.
pub fn resolve_facet(spec: &ObjectSpecification, facet_type: FacetType) -> FacetLookup {
    let mut noop = None;

    match spec.facets().lookup(facet_type) {
        FacetLookup::Concrete(facet) => return FacetLookup::Concrete(facet),
        FacetLookup::Noop(facet) => noop = Some(facet),
        FacetLookup::Absent => {}
    }

    let supertypes = spec
        .interfaces()
        .into_iter()
        .chain(spec.superclass());

    for supertype in supertypes {
        match resolve_facet(&supertype, facet_type) {
            FacetLookup::Concrete(facet) => {
                tracing::trace!(
                    spec = %spec.type_name(),
                    facet = %facet_type,
                    from = %supertype.type_name(),
                    "facet inherited"
                );
                return FacetLookup::Concrete(facet);
            }
            FacetLookup::Noop(facet) => {
                noop.get_or_insert(facet);
            }
            FacetLookup::Absent => {}
        }
    }

    match noop {
        Some(facet) => FacetLookup::Noop(facet),
        None => FacetLookup::Absent,
    }
}
