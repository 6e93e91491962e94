//! `spectra inspect`: one specification in detail.

use super::{names, Session};
use serde_json::{json, Value};
use spectra_core::spec::ObjectAction;
use spectra_core::{FacetHolder, ObjectSpecification};
use std::sync::Arc;

const WIDTH: usize = 14;

fn signature(action: &ObjectAction) -> String {
    let params: Vec<String> = action
        .parameters()
        .iter()
        .map(|param| format!("{}: {}", param.name(), param.type_name()))
        .collect();
    let returns = action
        .return_type()
        .map(|ty| format!(" -> {}", ty))
        .unwrap_or_default();
    format!("{}({}){} [{}]", action.name(), params.join(", "), returns, action.action_type())
}

fn describe(spec: &Arc<ObjectSpecification>) -> anyhow::Result<Value> {
    let associations: Vec<Value> = spec
        .associations()?
        .iter()
        .map(|assoc| {
            json!({
                "name": assoc.name(),
                "type": assoc.type_name().full_name(),
                "collection": assoc.is_collection(),
                "facets": assoc.facets().facet_types().iter().map(|t| t.name()).collect::<Vec<_>>(),
            })
        })
        .collect();
    let actions: Vec<String> = spec
        .declared_actions()?
        .iter()
        .map(|action| signature(action))
        .collect();

    Ok(json!({
        "name": spec.full_name(),
        "spec-id": spec.spec_id().as_str(),
        "state": format!("{:?}", spec.introspection_state()),
        "abstract": spec.is_abstract(),
        "interface": spec.is_interface(),
        "singular": spec.singular_name(),
        "plural": spec.plural_name(),
        "description": spec.description(),
        "sort": spec.bean_sort(),
        "persistability": spec.persistability(),
        "superclass": spec.superclass().map(|sup| sup.full_name().to_string()),
        "interfaces": names(&spec.interfaces()),
        "subclasses": names(&spec.subclasses()),
        "facets": spec.facets().facet_types().iter().map(|t| t.name()).collect::<Vec<_>>(),
        "associations": associations,
        "actions": actions,
    }))
}

pub fn execute(session: &Session, type_name: &str, json: bool) -> anyhow::Result<()> {
    let spec = session.specification(type_name)?;
    let details = describe(&spec)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    let text = |key: &str| details[key].as_str().unwrap_or_default().to_string();
    let list = |key: &str| -> Vec<String> {
        details[key]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    };

    let mut out = session.output();
    out.heading(spec.full_name());
    out.field("spec id", &text("spec-id"), WIDTH);
    out.field("names", &format!("{} / {}", text("singular"), text("plural")), WIDTH);
    if !spec.description().is_empty() {
        out.field("description", &text("description"), WIDTH);
    }
    out.field("sort", &spec.bean_sort().to_string(), WIDTH);
    out.field("persistence", &spec.persistability().to_string(), WIDTH);
    if spec.is_abstract() || spec.is_interface() {
        out.field("abstract", "yes", WIDTH);
    }
    let superclass = details["superclass"].as_str().unwrap_or("-");
    out.field("superclass", superclass, WIDTH);
    out.field("interfaces", &list("interfaces").join(", "), WIDTH);
    out.field("subclasses", &list("subclasses").join(", "), WIDTH);
    out.field("own facets", &list("facets").join(", "), WIDTH);

    out.newline();
    out.heading("Associations");
    for assoc in spec.associations()? {
        let kind = if assoc.is_collection() { "collection" } else { "property" };
        out.item(2, &format!("{}: {} ({})", assoc.name(), assoc.type_name(), kind));
    }

    out.newline();
    out.heading("Actions");
    for action in list("actions") {
        out.item(2, &action);
    }
    Ok(())
}
