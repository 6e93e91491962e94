//! `spectra actions`: declared and contributed actions of a type.

use super::Session;
use serde_json::{json, Value};
use spectra_core::spec::ObjectAction;
use spectra_core::{ActionMember, ActionType, Contributed};

fn parameters(action: &ObjectAction) -> Vec<Value> {
    action
        .parameters()
        .iter()
        .map(|param| json!({ "name": param.name(), "type": param.type_name().full_name() }))
        .collect()
}

fn to_json(member: &ActionMember) -> Value {
    match member {
        ActionMember::Declared(action) => json!({
            "name": action.name(),
            "type": action.action_type(),
            "parameters": parameters(action),
        }),
        ActionMember::ContributedSet(set) => json!({
            "contributed-by": set.service_specification().full_name(),
            "name": set.name(),
            "actions": set
                .actions()
                .iter()
                .map(|action| json!({
                    "name": action.name(),
                    "type": action.action_type(),
                    "parameters": parameters(action),
                }))
                .collect::<Vec<_>>(),
        }),
    }
}

fn parameter_list(action: &ObjectAction) -> String {
    action
        .parameters()
        .iter()
        .map(|param| param.type_name().short_name().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn execute(
    session: &Session,
    type_name: &str,
    types: &[ActionType],
    include_contributed: bool,
    json: bool,
) -> anyhow::Result<()> {
    let spec = session.specification(type_name)?;
    let contributed = if include_contributed {
        Contributed::Included
    } else {
        Contributed::Excluded
    };
    let members = spec.object_actions(types, contributed)?;

    if json {
        let rows: Vec<Value> = members.iter().map(to_json).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut out = session.output();
    if members.is_empty() {
        out.dim(&format!("{} has no actions", spec.full_name()));
        out.newline();
        return Ok(());
    }

    for member in &members {
        match member {
            ActionMember::Declared(action) => {
                out.bold(action.name());
                out.plain(&format!("({})", parameter_list(action)));
                out.dim(&format!(" [{}]", action.action_type()));
                out.newline();
            }
            ActionMember::ContributedSet(set) => {
                out.info(&set.name());
                out.dim(&format!(" contributed by {}", set.service_specification().full_name()));
                out.newline();
                for action in set.actions() {
                    out.item(
                        2,
                        &format!("{}({}) [{}]", action.name(), parameter_list(action), action.action_type()),
                    );
                }
            }
        }
    }
    Ok(())
}
