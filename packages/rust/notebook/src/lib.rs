//! Notebook-tree transformation passes.
//!
//! A notebook is an arbitrarily nested JSON tree ([`serde_json::Value`]) with
//! a `cells` array and a `metadata` object. This crate implements the pure
//! in-memory passes over that tree: structural filtering keyed by path
//! signatures, markdown heading extraction, and line-level rewriting of
//! code-cell sources. Each pass rebuilds the tree; none mutates its input.

mod filter;
mod headings;
mod path;
mod rewrite;

pub use filter::{CleanOptions, clean_tree};
pub use headings::find_headings;
pub use path::signature;
pub use rewrite::{ReplacementRule, rewrite_code_lines};
