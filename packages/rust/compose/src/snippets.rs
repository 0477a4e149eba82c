//! Snippet template loading.
//!
//! A snippet is an external JSON fragment — itself a minimal notebook tree —
//! whose cells become the raw content of an injected sequence. Snippets are
//! cleaned on load (ids and stdout stripped: injected cells must never carry
//! captured output or imported identifiers), and may contain placeholder
//! tokens substituted by exact string replacement at generation time.

use std::path::Path;

use serde_json::Value;

use nbpress_notebook::{CleanOptions, clean_tree};
use nbpress_shared::{NbPressError, Result};

/// Placeholder for the notebook's canonical documentation URL.
pub const NOTEBOOK_URL_TOKEN: &str = "__NOTEBOOK_URL__";

/// Placeholder for the framework landing-page URL.
pub const FRAMEWORK_URL_TOKEN: &str = "__FRAMEWORK_URL__";

/// Load a snippet file and return its cleaned cells.
pub fn load_snippet_cells(snippets_dir: &Path, file_title: &str) -> Result<Vec<Value>> {
    let path = snippets_dir.join(file_title);
    let content =
        std::fs::read_to_string(&path).map_err(|e| NbPressError::io(&path, e))?;

    let tree: Value = serde_json::from_str(&content)
        .map_err(|e| NbPressError::malformed(&path, format!("invalid snippet JSON: {e}")))?;

    let options = CleanOptions {
        strip_cell_ids: true,
        strip_stdout: true,
    };
    let cleaned = clean_tree(&tree, &options);

    cleaned
        .get("cells")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| NbPressError::malformed(&path, "snippet has no 'cells' array"))
}

/// Replace placeholder tokens in every source line of the given cells.
pub fn substitute_placeholders(cells: &[Value], substitutions: &[(&str, &str)]) -> Vec<Value> {
    cells
        .iter()
        .map(|cell| substitute_in_cell(cell, substitutions))
        .collect()
}

fn substitute_in_cell(cell: &Value, substitutions: &[(&str, &str)]) -> Value {
    match cell {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if key == "source" {
                        substitute_in_source(value, substitutions)
                    } else {
                        value.clone()
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_in_source(source: &Value, substitutions: &[(&str, &str)]) -> Value {
    match source {
        Value::Array(lines) => Value::Array(
            lines
                .iter()
                .map(|line| match line.as_str() {
                    Some(text) => {
                        let mut out = text.to_string();
                        for (token, replacement) in substitutions {
                            out = out.replace(token, replacement);
                        }
                        Value::String(out)
                    }
                    None => line.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
