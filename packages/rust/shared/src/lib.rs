//! Shared types, error model, and configuration for nbpress.
//!
//! This crate is the foundation depended on by all other nbpress crates.
//! It provides:
//! - [`NbPressError`] — the unified error type
//! - Domain types ([`NotebookCoords`], [`Headings`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FilterConfig, OutputConfig, SiteConfig, SnippetsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{NbPressError, Result};
pub use types::{Headings, NOTEBOOK_EXTENSION, NotebookCoords};
