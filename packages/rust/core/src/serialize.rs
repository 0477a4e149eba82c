//! Deterministic notebook JSON emission.
//!
//! Output contract: keys sorted (guaranteed by `serde_json`'s ordered map),
//! one-space indentation, non-ASCII characters emitted literally, and a
//! single trailing newline. Two semantically equal trees always serialize to
//! byte-identical text.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use nbpress_shared::{NbPressError, Result};

/// Serialize a notebook tree to its canonical on-disk form.
pub fn to_notebook_json(tree: &Value) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b" ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);

    tree.serialize(&mut serializer)
        .map_err(|e| NbPressError::Serialize(e.to_string()))?;

    let mut text = String::from_utf8(buffer)
        .map_err(|e| NbPressError::Serialize(format!("non-UTF-8 output: {e}")))?;
    text.push('\n');
    Ok(text)
}
