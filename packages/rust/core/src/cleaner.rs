//! Standalone notebook cleaning, outside the publication pipeline.
//!
//! Runs the tree filter and serializer over a notebook file on disk without
//! URL derivation, rewriting, or composition. Used to normalize notebooks in
//! the working tree after an interactive session left volatile state behind.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use nbpress_notebook::{CleanOptions, clean_tree};
use nbpress_shared::{NbPressError, Result};

use crate::pipeline::load_notebook;
use crate::serialize::to_notebook_json;

/// Outcome of cleaning one notebook file.
#[derive(Debug)]
pub struct CleanResult {
    /// Where the cleaned notebook was written.
    pub output_path: PathBuf,
    /// Whether the cleaned content differs from the input file.
    pub changed: bool,
}

/// Clean one notebook file.
///
/// With `in_place` the file is rewritten where it stands; otherwise the
/// result goes to a `.copy`-suffixed sibling and the original is untouched.
/// `changed` compares content digests, so a rewrite that reproduces the
/// input byte for byte still reports `false`.
#[instrument(fields(file = %path.display()))]
pub fn clean_notebook_file(
    path: &Path,
    options: &CleanOptions,
    in_place: bool,
) -> Result<CleanResult> {
    let original = std::fs::read_to_string(path).map_err(|e| NbPressError::io(path, e))?;

    let tree = load_notebook(path)?;
    let cleaned = clean_tree(&tree, options);
    let json = to_notebook_json(&cleaned)?;

    let changed = digest(&original) != digest(&json);

    let output_path = if in_place {
        path.to_path_buf()
    } else {
        copy_sibling(path)
    };

    if in_place && !changed {
        info!("already clean");
        return Ok(CleanResult {
            output_path,
            changed,
        });
    }

    std::fs::write(&output_path, json).map_err(|e| NbPressError::io(&output_path, e))?;
    info!(output = %output_path.display(), changed, "notebook cleaned");

    Ok(CleanResult {
        output_path,
        changed,
    })
}

fn digest(content: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.finalize().into()
}

fn copy_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".copy");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn staged_copy(name: &str, tag: &str) -> PathBuf {
        let src = fixture(name);
        let dst = std::env::temp_dir().join(format!("nbpress_clean_{tag}.ipynb"));
        std::fs::copy(&src, &dst).unwrap();
        dst
    }

    #[test]
    fn cleaning_to_sibling_leaves_original_alone() {
        let path = staged_copy("docs/frameworks/langchain/qa-basic.ipynb", "sibling");
        let before = std::fs::read_to_string(&path).unwrap();

        let result = clean_notebook_file(&path, &CleanOptions::default(), false).unwrap();
        assert!(result.changed);
        assert_eq!(result.output_path, path.with_file_name(format!(
            "{}.copy",
            path.file_name().unwrap().to_string_lossy()
        )));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

        let cleaned = std::fs::read_to_string(&result.output_path).unwrap();
        assert!(!cleaned.contains("stderr"));

        std::fs::remove_file(&path).ok();
        std::fs::remove_file(&result.output_path).ok();
    }

    #[test]
    fn in_place_cleaning_is_idempotent() {
        let path = staged_copy("docs/frameworks/langchain/qa-basic.ipynb", "inplace");

        let first = clean_notebook_file(&path, &CleanOptions::default(), true).unwrap();
        assert!(first.changed);
        assert_eq!(first.output_path, path);

        let second = clean_notebook_file(&path, &CleanOptions::default(), true).unwrap();
        assert!(!second.changed);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = clean_notebook_file(
            Path::new("/nonexistent/notebook.ipynb"),
            &CleanOptions::default(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, NbPressError::Io { .. }));
    }
}
