//! Structural tree filter.
//!
//! Rebuilds a notebook tree depth-first, dropping nodes whose path signature
//! matches a known prune rule. The rule set is a closed enum rather than a
//! string-keyed table so an unknown signature cannot be introduced by a typo;
//! anything unmatched falls through to the default-keep arm. Filtering only
//! removes nodes, never rewrites scalar values, so the pass is idempotent.

use serde_json::Value;
use tracing::debug;

use crate::path::{INDEX_SEGMENT, extend, signature};

/// Options controlling the optional prune rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Drop `cells..id`. Off by default: nbformat makes the absence of the
    /// id field a hard error in future versions, so jupyter-bound output
    /// must keep it.
    pub strip_cell_ids: bool,
    /// Drop `stdout` stream outputs as well as `stderr` ones.
    pub strip_stdout: bool,
}

/// The known prune rules, keyed by exact path signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathRule {
    /// `cells..id`
    CellId,
    /// `cells..metadata.colab` — import-origin noise.
    CellColabMetadata,
    /// `cells..outputs.` — per-record output policy.
    CellOutput,
    /// `metadata.widgets` — unrenderable cross-origin widget state.
    WidgetState,
    /// `metadata.language_info.version` — volatile, environment-specific.
    LanguageVersion,
}

impl PathRule {
    /// Exact-match lookup; signatures are never treated as prefixes.
    fn for_signature(sig: &str) -> Option<Self> {
        match sig {
            "cells..id" => Some(Self::CellId),
            "cells..metadata.colab" => Some(Self::CellColabMetadata),
            "cells..outputs." => Some(Self::CellOutput),
            "metadata.widgets" => Some(Self::WidgetState),
            "metadata.language_info.version" => Some(Self::LanguageVersion),
            _ => None,
        }
    }
}

/// Filter a notebook tree, returning the rebuilt copy.
pub fn clean_tree(tree: &Value, options: &CleanOptions) -> Value {
    let cleaned = clean_value(tree, &[], options);
    debug!(
        strip_cell_ids = options.strip_cell_ids,
        strip_stdout = options.strip_stdout,
        "tree filtered"
    );
    cleaned
}

fn clean_value(value: &Value, path: &[String], options: &CleanOptions) -> Value {
    match value {
        Value::Array(items) => {
            let child_path = extend(path, INDEX_SEGMENT);
            Value::Array(
                items
                    .iter()
                    .filter(|item| keep_value(item, &child_path, options))
                    .map(|item| clean_value(item, &child_path, options))
                    .collect(),
            )
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, item)| keep_value(item, &extend(path, key), options))
                .map(|(key, item)| {
                    (key.clone(), clean_value(item, &extend(path, key), options))
                })
                .collect(),
        ),
        // Scalars pass through; predicates only apply to container decisions.
        scalar => scalar.clone(),
    }
}

fn keep_value(value: &Value, path: &[String], options: &CleanOptions) -> bool {
    match PathRule::for_signature(&signature(path)) {
        None => true,
        Some(PathRule::CellId) => !options.strip_cell_ids,
        Some(PathRule::CellColabMetadata) => false,
        Some(PathRule::WidgetState) => false,
        Some(PathRule::LanguageVersion) => false,
        Some(PathRule::CellOutput) => keep_output(value, options),
    }
}

/// Per-record policy for `cells..outputs.`.
fn keep_output(output: &Value, options: &CleanOptions) -> bool {
    match output.get("output_type").and_then(Value::as_str) {
        Some("stream") => match output.get("name").and_then(Value::as_str) {
            Some("stderr") => false,
            Some("stdout") => !options.strip_stdout,
            _ => true,
        },
        Some("display_data") => is_image_display(output),
        // execute_result and any unrecognized output type are kept.
        _ => true,
    }
}

/// Whether a `display_data` record carries an image payload.
///
/// Inferred from a substring match on the `text/plain` MIME preview
/// (IPython renders image objects as `<IPython.core.display.Image object>`).
fn is_image_display(output: &Value) -> bool {
    let Some(preview) = output
        .get("data")
        .and_then(|data| data.get("text/plain"))
    else {
        return false;
    };

    let text = match preview {
        Value::String(s) => s.clone(),
        Value::Array(lines) => lines
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(""),
        _ => return false,
    };

    text.contains("Image")
}
