//! `spectra facet`: resolve one facet over a type's hierarchy.

use super::Session;
use anyhow::bail;
use spectra_core::facet::{resolve_facet, FacetLookup};
use spectra_core::{FacetHolder, FacetType, ObjectSpecification};

const KNOWN: [FacetType; 7] = [
    FacetType::TITLE,
    FacetType::ICON,
    FacetType::NAMED,
    FacetType::PLURAL,
    FacetType::DESCRIBED_AS,
    FacetType::HIDDEN,
    FacetType::NATURE,
];

fn parse_facet_type(name: &str) -> anyhow::Result<FacetType> {
    match KNOWN.iter().find(|facet_type| facet_type.name() == name) {
        Some(facet_type) => Ok(*facet_type),
        None => {
            let known: Vec<&str> = KNOWN.iter().map(|t| t.name()).collect();
            bail!("Unknown facet '{}' (known: {})", name, known.join(", "))
        }
    }
}

fn label(lookup: &FacetLookup) -> &'static str {
    match lookup {
        FacetLookup::Concrete(_) => "concrete",
        FacetLookup::Noop(_) => "no-op",
        FacetLookup::Absent => "absent",
    }
}

/// The hierarchy in search order, one line per hop
fn search_path(
    spec: &ObjectSpecification,
    facet_type: FacetType,
    depth: usize,
    lines: &mut Vec<(usize, String, FacetLookup)>,
) {
    lines.push((depth, spec.full_name().to_string(), spec.facets().lookup(facet_type)));
    for iface in spec.interfaces() {
        search_path(&iface, facet_type, depth + 1, lines);
    }
    if let Some(superclass) = spec.superclass() {
        search_path(&superclass, facet_type, depth + 1, lines);
    }
}

pub fn execute(session: &Session, type_name: &str, facet: &str) -> anyhow::Result<()> {
    let facet_type = parse_facet_type(facet)?;
    let spec = session.specification(type_name)?;
    let resolved = resolve_facet(&spec, facet_type);

    let mut out = session.output();
    out.bold(spec.full_name());
    out.plain(&format!(" {} ", facet_type));
    match &resolved {
        FacetLookup::Concrete(found) => {
            out.success(label(&resolved));
            out.plain(&format!(" {:?}", found));
        }
        FacetLookup::Noop(found) => {
            out.warning(label(&resolved));
            out.plain(&format!(" {:?}", found));
        }
        FacetLookup::Absent => out.dim(label(&resolved)),
    }
    out.newline();

    let mut lines = Vec::new();
    search_path(&spec, facet_type, 0, &mut lines);
    for (depth, name, lookup) in lines {
        out.item(2 + depth * 2, &format!("{}: {}", name, label(&lookup)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_facet_type() {
        assert_eq!(parse_facet_type("describedAs").unwrap(), FacetType::DESCRIBED_AS);
        let err = parse_facet_type("colour").unwrap_err();
        assert!(err.to_string().contains("known: title, icon"));
    }
}
