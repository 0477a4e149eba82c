//! Dependency-manifest parsing and the install-instruction cells.
//!
//! Each notebook directory may carry a `requirements*.txt` manifest, one
//! dependency specifier per non-comment line. An absent or empty manifest is
//! a valid empty-result case, never an error.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::debug;

use nbpress_shared::Result;

/// Line terminator on all install lines but the last.
const INSTALL_LINE_CLOSING: &str = " \\\n";
/// Terminator on the last install line.
const LAST_INSTALL_LINE_CLOSING: &str = " \n";

/// Locate the dependency manifest in a notebook's source directory.
///
/// The first `requirements*.txt` file (in name order, for determinism) wins.
pub(crate) fn find_manifest(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.starts_with("requirements") && name.ends_with(".txt")
                    })
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Parse manifest text into dependency specifiers.
///
/// Comment lines (first non-whitespace char `#`) and blanks are skipped.
pub(crate) fn parse_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Build the install cells for a notebook directory.
///
/// Emits one code cell running `pip install` over all specifiers (with line
/// continuations and a final kernel restart via `exit()`) followed by a fixed
/// markdown cell explaining the restart. Returns an empty sequence when no
/// manifest or no dependencies exist.
pub(crate) fn install_cells(source_dir: &Path) -> Result<Vec<Value>> {
    let Some(manifest_path) = find_manifest(source_dir) else {
        debug!(dir = %source_dir.display(), "no dependency manifest, skipping install cells");
        return Ok(vec![]);
    };

    let content = std::fs::read_to_string(&manifest_path)
        .map_err(|e| nbpress_shared::NbPressError::io(&manifest_path, e))?;
    let dependencies = parse_manifest(&content);

    if dependencies.is_empty() {
        return Ok(vec![]);
    }

    let count = dependencies.len();
    let mut source: Vec<Value> = vec![
        json!("# install required dependencies\n"),
        json!("! pip install -q --progress-bar off \\\n"),
    ];
    source.extend(dependencies.iter().enumerate().map(|(i, dep)| {
        let closing = if i + 1 == count {
            LAST_INSTALL_LINE_CLOSING
        } else {
            INSTALL_LINE_CLOSING
        };
        json!(format!("    \"{dep}\"{closing}"))
    }));
    source.push(json!("exit()"));

    Ok(vec![
        json!({
            "cell_type": "code",
            "execution_count": null,
            "metadata": {},
            "outputs": [],
            "source": source
        }),
        post_install_cell(),
    ])
}

/// The markdown cell shown right after the install cell.
fn post_install_cell() -> Value {
    json!({
        "cell_type": "markdown",
        "metadata": {},
        "source": [
            "⚠️ **Do not mind a \"Your session crashed...\" message you may see.**\n",
            "\n",
            "It was us, making sure your kernel restarts with all the correct dependency versions. _You can now proceed with the notebook._"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blanks() {
        let content = "\
# core dependencies
cassio>=0.1.3

langchain==0.0.249
   # indented comment
openai
";
        let deps = parse_manifest(content);
        assert_eq!(deps, vec!["cassio>=0.1.3", "langchain==0.0.249", "openai"]);
    }

    #[test]
    fn empty_manifest_parses_to_nothing() {
        assert!(parse_manifest("# only comments\n\n").is_empty());
    }

    #[test]
    fn install_cells_from_fixture_dir() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/docs/frameworks/langchain");
        let cells = install_cells(&dir).expect("install cells");
        assert_eq!(cells.len(), 2);

        let source = cells[0]["source"].as_array().unwrap();
        // header + pip line + one line per dep + exit()
        assert_eq!(source[0], "# install required dependencies\n");
        assert_eq!(source[source.len() - 1], "exit()");

        // continuation on all dep lines but the last
        let dep_lines: Vec<&str> = source[2..source.len() - 1]
            .iter()
            .map(|l| l.as_str().unwrap())
            .collect();
        for line in &dep_lines[..dep_lines.len() - 1] {
            assert!(line.ends_with(" \\\n"), "expected continuation: {line:?}");
        }
        assert!(dep_lines.last().unwrap().ends_with(" \n"));

        assert_eq!(cells[1]["cell_type"], "markdown");
    }

    #[test]
    fn missing_manifest_is_empty_not_error() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/docs/frameworks/bare");
        let cells = install_cells(&dir).expect("no manifest is fine");
        assert!(cells.is_empty());
    }
}
