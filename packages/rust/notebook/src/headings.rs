//! Markdown heading extraction.
//!
//! Recovers a title/subtitle pair from the first markdown cell containing a
//! level-one heading. Multi-cell titles are unsupported by design: the first
//! title cell wins and only its own lines contribute to the subtitle.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use nbpress_shared::Headings;

/// A level-one heading: the literal marker `# `, then the title text,
/// taken verbatim.
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# (.*)$").expect("valid regex"));

/// Scan markdown cells in order and extract the title/subtitle pair.
///
/// Returns `Headings::default()` (both fields `None`) when no markdown cell
/// carries a `# ` line.
pub fn find_headings(tree: &Value) -> Headings {
    let Some(cells) = tree.get("cells").and_then(Value::as_array) else {
        return Headings::default();
    };

    for cell in cells {
        if cell.get("cell_type").and_then(Value::as_str) != Some("markdown") {
            continue;
        }

        let lines = cell_lines(cell);
        let Some(title) = lines.iter().find_map(|line| h1_text(line)) else {
            continue;
        };

        // Everything else in the same cell that is neither blank nor a
        // heading becomes the subtitle.
        let rest: Vec<&str> = lines
            .iter()
            .map(String::as_str)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        let subtitle = if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        };

        return Headings {
            title: Some(title),
            subtitle,
        };
    }

    Headings::default()
}

/// Whitespace-stripped physical lines of a cell's source.
///
/// Source entries are line strings but may embed their own `\n`, so each
/// entry is split again before stripping.
fn cell_lines(cell: &Value) -> Vec<String> {
    cell.get("source")
        .and_then(Value::as_array)
        .map(|source| {
            source
                .iter()
                .filter_map(Value::as_str)
                .flat_map(|entry| entry.split('\n'))
                .map(|line| line.trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Title text when the line is a level-one heading, else `None`.
///
/// `## Section` never matches: the regex requires a space right after `#`.
fn h1_text(line: &str) -> Option<String> {
    H1_RE.captures(line).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nb(cells: Value) -> Value {
        json!({"cells": cells, "metadata": {}})
    }

    #[test]
    fn title_and_subtitle_from_first_cell() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["# Title\n", "Subtitle text"]}
        ]));
        let headings = find_headings(&tree);
        assert_eq!(headings.title.as_deref(), Some("Title"));
        assert_eq!(headings.subtitle.as_deref(), Some("Subtitle text"));
    }

    #[test]
    fn first_title_cell_wins() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["just prose, no heading\n"]},
            {"cell_type": "markdown", "source": ["# Winner\n"]},
            {"cell_type": "markdown", "source": ["# Loser\n", "ignored subtitle"]}
        ]));
        let headings = find_headings(&tree);
        assert_eq!(headings.title.as_deref(), Some("Winner"));
        assert_eq!(headings.subtitle, None);
    }

    #[test]
    fn code_cells_ignored() {
        let tree = nb(json!([
            {"cell_type": "code", "source": ["# not a heading, a comment\n"], "metadata": {}, "outputs": []},
            {"cell_type": "markdown", "source": ["# Real Title\n"]}
        ]));
        assert_eq!(find_headings(&tree).title.as_deref(), Some("Real Title"));
    }

    #[test]
    fn second_level_heading_is_not_a_title() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["## Section only\n", "text"]}
        ]));
        assert_eq!(find_headings(&tree), Headings::default());
    }

    #[test]
    fn multiline_source_entries_split() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["intro\n# Embedded Title\nmore prose"]}
        ]));
        let headings = find_headings(&tree);
        assert_eq!(headings.title.as_deref(), Some("Embedded Title"));
        assert_eq!(headings.subtitle.as_deref(), Some("intro more prose"));
    }

    #[test]
    fn subtitle_skips_blank_and_heading_lines() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["# T\n", "\n", "## sub-heading\n", "one\n", "two"]}
        ]));
        let headings = find_headings(&tree);
        assert_eq!(headings.subtitle.as_deref(), Some("one two"));
    }

    #[test]
    fn tab_after_hash_is_not_a_title() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["#\tTabbed\n", "text"]}
        ]));
        assert_eq!(find_headings(&tree), Headings::default());
    }

    #[test]
    fn title_text_taken_verbatim_after_marker() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["#  Double Spaced\n"]}
        ]));
        assert_eq!(find_headings(&tree).title.as_deref(), Some(" Double Spaced"));
    }

    #[test]
    fn no_title_cell_yields_none() {
        let tree = nb(json!([
            {"cell_type": "markdown", "source": ["plain prose\n"]}
        ]));
        assert_eq!(find_headings(&tree), Headings::default());
    }

    #[test]
    fn missing_cells_key_yields_none() {
        assert_eq!(find_headings(&json!({"metadata": {}})), Headings::default());
    }
}
