//! Cell-sequence generation and composition.
//!
//! A cell sequence is a named, ordered group of cells injected before or
//! after a notebook's authored content. Each name maps to a
//! [`CellSequenceGenerator`] in a process-wide, read-only registry; which
//! sequences a given notebook receives is decided by the override tables in
//! [`settings`], falling back to the module-level defaults.

mod composer;
mod deps;
mod generator;
pub mod settings;
mod snippets;

pub use composer::compose;
pub use generator::{CellSequenceGenerator, ComposeContext, generator, registry};
pub use settings::{
    is_denylisted, resolve_rules, resolve_sequences, unmatched_overrides, validate_settings,
};
pub use snippets::load_snippet_cells;
