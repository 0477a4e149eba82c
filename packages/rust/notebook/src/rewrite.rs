//! Line-level rewriting of code-cell sources.
//!
//! Rules are scanned in order per physical line; the first rule whose needle
//! occurs anywhere in the line wins and its replacement (a whole line, or the
//! deletion sentinel) takes the original's place. Rules are not commutative —
//! order is part of the contract.

use serde_json::Value;
use tracing::trace;

/// One substitution rule: a needle to find and the full replacement line.
///
/// `replacement: None` is the deletion sentinel — the matched line is removed
/// entirely, not blanked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRule {
    pub needle: String,
    pub replacement: Option<String>,
}

impl ReplacementRule {
    /// Rule replacing the whole matching line.
    pub fn replace(needle: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            replacement: Some(replacement.into()),
        }
    }

    /// Rule deleting the matching line.
    pub fn delete(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            replacement: None,
        }
    }
}

/// Rewrite the source lines of every code cell; other cells pass through.
pub fn rewrite_code_lines(tree: &Value, rules: &[ReplacementRule]) -> Value {
    match tree {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if key == "cells" {
                        rewrite_cells(value, rules)
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

fn rewrite_cells(cells: &Value, rules: &[ReplacementRule]) -> Value {
    match cells {
        Value::Array(items) => Value::Array(
            items.iter().map(|cell| rewrite_cell(cell, rules)).collect(),
        ),
        other => other.clone(),
    }
}

fn rewrite_cell(cell: &Value, rules: &[ReplacementRule]) -> Value {
    if cell.get("cell_type").and_then(Value::as_str) != Some("code") {
        return cell.clone();
    }

    match cell {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if key == "source" {
                        rewrite_block(value, rules)
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

/// Rewrite one source block: a list of line strings, all but the last
/// newline-terminated. Non-string entries pass through untouched.
fn rewrite_block(source: &Value, rules: &[ReplacementRule]) -> Value {
    let Some(entries) = source.as_array() else {
        return source.clone();
    };

    let mut rewritten: Vec<Value> = Vec::with_capacity(entries.len());
    let mut line_slots: Vec<usize> = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(text) = entry.as_str() else {
            rewritten.push(entry.clone());
            continue;
        };
        // Strip the terminator so needles match line content, not boundaries.
        let line = text.strip_suffix('\n').unwrap_or(text);
        if let Some(out) = rewrite_line(line, rules) {
            line_slots.push(rewritten.len());
            rewritten.push(Value::String(out.to_string()));
        }
    }

    // Restore terminators on every line except the new last one.
    if let Some((_, all_but_last)) = line_slots.split_last() {
        for &slot in all_but_last {
            if let Value::String(line) = &mut rewritten[slot] {
                line.push('\n');
            }
        }
    }

    Value::Array(rewritten)
}

/// Apply the first matching rule; `None` means the line is deleted.
fn rewrite_line<'a>(line: &'a str, rules: &'a [ReplacementRule]) -> Option<&'a str> {
    for rule in rules {
        if line.contains(&rule.needle) {
            trace!(needle = %rule.needle, deleted = rule.replacement.is_none(), "line rewritten");
            return rule.replacement.as_deref();
        }
    }
    Some(line)
}
