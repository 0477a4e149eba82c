//! Core pipeline orchestration for nbpress.
//!
//! Ties discovery, filtering, rewriting, and composition into the end-to-end
//! publication workflow, plus the standalone cleaning entry point.

pub mod cleaner;
pub mod locate;
pub mod pipeline;
pub mod serialize;
pub mod url;

pub use cleaner::{CleanResult, clean_notebook_file};
pub use locate::locate_notebooks;
pub use pipeline::{PublishConfig, PublishResult, load_notebook, publish_notebook};
pub use serialize::to_notebook_json;
pub use url::canonical_url;
