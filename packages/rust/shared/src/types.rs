//! Core domain types for nbpress notebooks.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NbPressError, Result};

/// File extension expected on every processed notebook (lowercase match).
pub const NOTEBOOK_EXTENSION: &str = ".ipynb";

// ---------------------------------------------------------------------------
// NotebookCoords
// ---------------------------------------------------------------------------

/// Location of a notebook relative to the scan root: directory segments
/// plus the file title.
///
/// The `/`-joined form (see [`NotebookCoords::identity`]) is the notebook's
/// identity string used for override lookups, denylisting, and rule-map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotebookCoords {
    /// Directory segments from the scan root down to the containing dir.
    pub dirs: Vec<String>,
    /// File name including the `.ipynb` extension.
    pub file_title: String,
}

impl NotebookCoords {
    /// Build coordinates, checking the notebook extension.
    pub fn new(dirs: Vec<String>, file_title: impl Into<String>) -> Result<Self> {
        let file_title = file_title.into();
        if !file_title.to_lowercase().ends_with(NOTEBOOK_EXTENSION) {
            let identity = if dirs.is_empty() {
                file_title.clone()
            } else {
                format!("{}/{file_title}", dirs.join("/"))
            };
            return Err(NbPressError::invalid_path(
                identity,
                format!("expected a '{NOTEBOOK_EXTENSION}' file"),
            ));
        }
        Ok(Self { dirs, file_title })
    }

    /// Build coordinates from a path relative to the scan root.
    pub fn from_relative_path(path: &Path) -> Result<Self> {
        let mut segments: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        let file_title = segments.pop().ok_or_else(|| {
            NbPressError::invalid_path(path.display().to_string(), "empty notebook path")
        })?;
        Self::new(segments, file_title)
    }

    /// The `/`-joined identity string, e.g. `docs/frameworks/langchain/qa-basic.ipynb`.
    pub fn identity(&self) -> String {
        if self.dirs.is_empty() {
            self.file_title.clone()
        } else {
            format!("{}/{}", self.dirs.join("/"), self.file_title)
        }
    }

    /// File title without the notebook extension.
    pub fn file_stem(&self) -> &str {
        &self.file_title[..self.file_title.len() - NOTEBOOK_EXTENSION.len()]
    }

    /// Absolute (or root-relative) path of the source file.
    pub fn source_path(&self, root: &Path) -> PathBuf {
        let mut p = root.to_path_buf();
        for d in &self.dirs {
            p.push(d);
        }
        p.push(&self.file_title);
        p
    }

    /// Directory containing the source file (where the dependency manifest lives).
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        let mut p = root.to_path_buf();
        for d in &self.dirs {
            p.push(d);
        }
        p
    }

    /// Coordinates of the published output file: same directory tree plus
    /// the output subdir, file title with the output prefix.
    pub fn output_coords(&self, subdir: &str, file_prefix: &str) -> NotebookCoords {
        let mut dirs = self.dirs.clone();
        dirs.push(subdir.to_string());
        NotebookCoords {
            dirs,
            file_title: format!("{file_prefix}{}", self.file_title),
        }
    }
}

impl std::fmt::Display for NotebookCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identity())
    }
}

// ---------------------------------------------------------------------------
// Headings
// ---------------------------------------------------------------------------

/// Title/subtitle pair recovered from the first markdown title cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headings {
    /// Text after `# ` on the first matching line, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Space-joined remaining non-empty, non-heading lines of the title cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_joins_segments() {
        let coords = NotebookCoords::new(
            vec!["docs".into(), "frameworks".into(), "langchain".into()],
            "qa-basic.ipynb",
        )
        .expect("valid coords");
        assert_eq!(coords.identity(), "docs/frameworks/langchain/qa-basic.ipynb");
        assert_eq!(coords.file_stem(), "qa-basic");
    }

    #[test]
    fn non_notebook_extension_rejected() {
        let result = NotebookCoords::new(vec!["docs".into()], "notes.md");
        assert!(matches!(
            result,
            Err(NbPressError::InvalidPath { .. })
        ));
    }

    #[test]
    fn from_relative_path_splits_components() {
        let coords = NotebookCoords::from_relative_path(Path::new("docs/intro/Start.ipynb"))
            .expect("valid path");
        assert_eq!(coords.dirs, vec!["docs".to_string(), "intro".to_string()]);
        assert_eq!(coords.file_title, "Start.ipynb");
    }

    #[test]
    fn output_coords_add_subdir_and_prefix() {
        let coords =
            NotebookCoords::new(vec!["docs".into(), "intro".into()], "start.ipynb").unwrap();
        let out = coords.output_coords(".colab", "colab_");
        assert_eq!(out.identity(), "docs/intro/.colab/colab_start.ipynb");
    }

    #[test]
    fn source_path_layout() {
        let coords =
            NotebookCoords::new(vec!["docs".into(), "intro".into()], "start.ipynb").unwrap();
        let path = coords.source_path(Path::new("/repo"));
        assert_eq!(path, PathBuf::from("/repo/docs/intro/start.ipynb"));
        assert_eq!(coords.source_dir(Path::new("/repo")), PathBuf::from("/repo/docs/intro"));
    }
}
