//! Notebook discovery.
//!
//! Recursive scan of the source tree for `.ipynb` files, skipping editor
//! checkpoint directories and the publication output subdir (so a second run
//! never re-ingests its own output).

use std::path::Path;

use tracing::debug;

use nbpress_shared::{NOTEBOOK_EXTENSION, NbPressError, NotebookCoords, Result};

/// Directory names never descended into, besides the output subdir.
const ALWAYS_EXCLUDED: &[&str] = &[".ipynb_checkpoints"];

/// Find every notebook under `root`, in deterministic identity order.
pub fn locate_notebooks(root: &Path, output_subdir: &str) -> Result<Vec<NotebookCoords>> {
    let mut found = Vec::new();
    scan_dir(root, &mut Vec::new(), output_subdir, &mut found)?;
    found.sort_by_key(NotebookCoords::identity);
    debug!(root = %root.display(), count = found.len(), "notebook scan complete");
    Ok(found)
}

fn scan_dir(
    root: &Path,
    segments: &mut Vec<String>,
    output_subdir: &str,
    found: &mut Vec<NotebookCoords>,
) -> Result<()> {
    let mut dir = root.to_path_buf();
    for segment in segments.iter() {
        dir.push(segment);
    }

    let entries = std::fs::read_dir(&dir).map_err(|e| NbPressError::io(&dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| NbPressError::io(&dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type().map_err(|e| NbPressError::io(entry.path(), e))?;

        if file_type.is_dir() {
            if ALWAYS_EXCLUDED.contains(&name.as_str()) || name == output_subdir {
                continue;
            }
            segments.push(name);
            scan_dir(root, segments, output_subdir, found)?;
            segments.pop();
        } else if file_type.is_file()
            && name.to_lowercase().ends_with(NOTEBOOK_EXTENSION)
        {
            found.push(NotebookCoords::new(segments.clone(), name)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_fixture_notebooks_in_order() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures");
        let notebooks = locate_notebooks(&root, ".colab").expect("scan fixtures");
        let identities: Vec<String> =
            notebooks.iter().map(NotebookCoords::identity).collect();
        assert!(identities.contains(&"docs/frameworks/bare/plain.ipynb".to_string()));
        assert!(identities.contains(&"docs/frameworks/langchain/qa-basic.ipynb".to_string()));

        let mut sorted = identities.clone();
        sorted.sort();
        assert_eq!(identities, sorted);
    }

    #[test]
    fn output_subdir_not_descended() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures");
        // scanning with a subdir name that exists as a content dir hides it
        let notebooks = locate_notebooks(&root, "bare").expect("scan fixtures");
        let identities: Vec<String> =
            notebooks.iter().map(NotebookCoords::identity).collect();
        assert!(!identities.iter().any(|i| i.contains("/bare/")));
    }

    #[test]
    fn missing_root_is_io_error() {
        let result = locate_notebooks(Path::new("/nonexistent/notebook/tree"), ".colab");
        assert!(matches!(result, Err(NbPressError::Io { .. })));
    }
}
