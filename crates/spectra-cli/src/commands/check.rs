//! `spectra check`: introspect every type and report failures.

use super::Session;
use anyhow::bail;
use spectra_core::{ActionType, Contributed};

pub fn execute(session: &Session) -> anyhow::Result<()> {
    let type_names = session.type_names();
    let mut out = session.output();
    let mut failed = 0;

    for type_name in &type_names {
        let result = session
            .loader
            .load_specification(type_name)
            .and_then(|spec| spec.object_actions(&ActionType::ALL, Contributed::Included));
        match result {
            Ok(_) => {
                out.success("  ok  ");
                out.plain(type_name.full_name());
            }
            Err(err) => {
                failed += 1;
                out.error(" FAIL ");
                out.plain(type_name.full_name());
                out.newline();
                out.dim(&format!("       {}", err));
            }
        }
        out.newline();
    }

    out.newline();
    if failed > 0 {
        bail!("{} of {} types failed introspection", failed, type_names.len());
    }
    out.success(&format!("{} types introspected", type_names.len()));
    out.newline();
    Ok(())
}
