//! `spectra list`: every type in the model.

use super::Session;
use serde_json::json;

pub fn execute(session: &Session, json: bool) -> anyhow::Result<()> {
    let mut rows = Vec::new();
    for type_name in session.type_names() {
        let row = match session.loader.load_specification(&type_name) {
            Ok(spec) => json!({
                "name": spec.full_name(),
                "spec-id": spec.spec_id().as_str(),
                "sort": spec.bean_sort(),
                "singular": spec.singular_name(),
                "subclasses": spec.subclasses().len(),
            }),
            Err(err) => json!({
                "name": type_name.full_name(),
                "error": err.to_string(),
            }),
        };
        rows.push(row);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let width = rows
        .iter()
        .filter_map(|row| row["name"].as_str())
        .map(str::len)
        .max()
        .unwrap_or(0);

    let mut out = session.output();
    for row in &rows {
        let name = row["name"].as_str().unwrap_or_default();
        out.bold(&format!("{:<width$}", name));
        out.plain("  ");
        match row["error"].as_str() {
            Some(err) => out.error(err),
            None => {
                out.info(&format!("{:<13}", row["sort"].as_str().unwrap_or_default()));
                out.dim(row["singular"].as_str().unwrap_or_default());
            }
        }
        out.newline();
    }
    Ok(())
}
