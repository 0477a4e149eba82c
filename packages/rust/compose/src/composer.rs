//! Cell-sequence composition.
//!
//! Splices generated cell blocks around a notebook's authored cells:
//! `opening ++ original ++ closing`, with the opening/closing sequence lists
//! resolved per notebook from the settings tables. Result order depends only
//! on the resolved lists and the generators' outputs.

use serde_json::Value;
use tracing::{debug, instrument};

use nbpress_shared::{NbPressError, NotebookCoords, Result};

use crate::generator::{CellSequenceGenerator, ComposeContext, Registry, registry};
use crate::settings;

/// Compose the cell sequences for one notebook.
///
/// Denylisted notebooks pass through unchanged. Every sequence ID must be
/// registered; an unknown one aborts with [`NbPressError::UnknownSequence`]
/// before any cell is spliced.
#[instrument(skip(tree, ctx), fields(notebook = %coords))]
pub fn compose(coords: &NotebookCoords, tree: &Value, ctx: &ComposeContext) -> Result<Value> {
    let identity = coords.identity();

    if settings::is_denylisted(&identity) {
        debug!("denylisted, skipping cell-sequence injection");
        return Ok(tree.clone());
    }

    let (opening_ids, closing_ids) = settings::resolve_sequences(&identity);
    compose_sequences(registry(), &opening_ids, &closing_ids, coords, tree, ctx)
}

/// Composition over an explicit registry and sequence lists.
pub(crate) fn compose_sequences(
    registry: &Registry,
    opening_ids: &[&str],
    closing_ids: &[&str],
    coords: &NotebookCoords,
    tree: &Value,
    ctx: &ComposeContext,
) -> Result<Value> {
    let opening = run_generators(registry, opening_ids, coords, tree, ctx)?;
    let closing = run_generators(registry, closing_ids, coords, tree, ctx)?;

    debug!(
        opening_cells = opening.len(),
        closing_cells = closing.len(),
        "composed cell sequences"
    );

    Ok(splice_cells(tree, opening, closing))
}

/// Evaluate generators in list order, concatenating their outputs.
fn run_generators(
    registry: &Registry,
    ids: &[&str],
    coords: &NotebookCoords,
    tree: &Value,
    ctx: &ComposeContext,
) -> Result<Vec<Value>> {
    let mut cells = Vec::new();
    for id in ids {
        let generator: &dyn CellSequenceGenerator = registry
            .get(id)
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| NbPressError::UnknownSequence {
                sequence: (*id).to_string(),
            })?;
        cells.extend(generator.generate(coords, tree, ctx)?);
    }
    Ok(cells)
}

/// Rebuild the tree with the new cell list; every other key is untouched.
fn splice_cells(tree: &Value, opening: Vec<Value>, closing: Vec<Value>) -> Value {
    match tree {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if key == "cells" {
                        let original = value.as_array().cloned().unwrap_or_default();
                        let mut cells = opening.clone();
                        cells.extend(original);
                        cells.extend(closing.clone());
                        Value::Array(cells)
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
