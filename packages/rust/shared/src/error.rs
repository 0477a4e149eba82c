//! Error types for nbpress.
//!
//! Library crates use [`NbPressError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all nbpress operations.
#[derive(Debug, thiserror::Error)]
pub enum NbPressError {
    /// Input notebook is not valid JSON or violates the notebook schema.
    #[error("malformed notebook at {path:?}: {message}")]
    MalformedInput { path: PathBuf, message: String },

    /// Notebook identity does not match the expected docs-root convention.
    #[error("invalid notebook path '{identity}': {message}")]
    InvalidPath { identity: String, message: String },

    /// An override table references a cell-sequence ID absent from the registry.
    #[error("unknown cell sequence '{sequence}' referenced in sequence tables")]
    UnknownSequence { sequence: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON emission error during output serialization.
    #[error("serialize error: {0}")]
    Serialize(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NbPressError>;

impl NbPressError {
    /// Create a malformed-input error for a notebook file.
    pub fn malformed(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid-path error for a notebook identity.
    pub fn invalid_path(identity: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidPath {
            identity: identity.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = NbPressError::config("missing site base URL");
        assert_eq!(err.to_string(), "config error: missing site base URL");

        let err = NbPressError::UnknownSequence {
            sequence: "seq_bogus".into(),
        };
        assert!(err.to_string().contains("seq_bogus"));
    }

    #[test]
    fn malformed_carries_path() {
        let err = NbPressError::malformed("docs/a.ipynb", "missing 'cells' key");
        assert!(err.to_string().contains("missing 'cells' key"));
        assert!(err.to_string().contains("a.ipynb"));
    }
}
