//! The cell-sequence generator capability and its static registry.
//!
//! Each generator is a pure function of (notebook coordinates, raw tree,
//! context bag) to an ordered list of cells. Generators may read external
//! files (snippet templates, the dependency manifest) but must not depend on
//! call order or shared mutable state: the composer decides ordering, the
//! generator only supplies content.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use serde_json::{Value, json};
use tracing::warn;

use nbpress_shared::{Headings, NbPressError, NotebookCoords, Result};

use crate::deps;
use crate::snippets::{
    FRAMEWORK_URL_TOKEN, NOTEBOOK_URL_TOKEN, load_snippet_cells, substitute_placeholders,
};

// ---------------------------------------------------------------------------
// Context & trait
// ---------------------------------------------------------------------------

/// Everything a generator may consult besides the notebook tree itself.
#[derive(Debug, Clone)]
pub struct ComposeContext {
    /// Title/subtitle extracted from the notebook.
    pub headings: Headings,
    /// Canonical documentation-site URL for this notebook, when derivable.
    pub notebook_url: Option<String>,
    /// Directory holding snippet template files.
    pub snippets_dir: PathBuf,
    /// Root of the notebook source tree (manifest lookup is relative to it).
    pub source_root: PathBuf,
}

/// A named producer of injectable cells.
pub trait CellSequenceGenerator: Send + Sync + std::fmt::Debug {
    /// Produce the cells for one notebook. An empty result is valid.
    fn generate(
        &self,
        coords: &NotebookCoords,
        tree: &Value,
        ctx: &ComposeContext,
    ) -> Result<Vec<Value>>;
}

// ---------------------------------------------------------------------------
// Concrete generators
// ---------------------------------------------------------------------------

/// Re-emits the notebook's own title/subtitle as a fresh markdown cell.
#[derive(Debug)]
struct TitleCells;

impl CellSequenceGenerator for TitleCells {
    fn generate(
        &self,
        _coords: &NotebookCoords,
        _tree: &Value,
        ctx: &ComposeContext,
    ) -> Result<Vec<Value>> {
        let Some(title) = ctx.headings.title.as_deref() else {
            return Ok(vec![]);
        };

        let mut lines: Vec<String> = vec![format!("# {title}")];
        if let Some(subtitle) = ctx.headings.subtitle.as_deref() {
            lines.push(String::new());
            lines.push(subtitle.to_string());
        }

        let count = lines.len();
        let source: Vec<Value> = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                if i + 1 == count {
                    json!(line)
                } else {
                    json!(format!("{line}\n"))
                }
            })
            .collect();

        Ok(vec![json!({
            "cell_type": "markdown",
            "metadata": {},
            "source": source
        })])
    }
}

/// Loads a snippet file verbatim (after cleaning).
#[derive(Debug)]
struct SnippetCells {
    file: &'static str,
}

impl CellSequenceGenerator for SnippetCells {
    fn generate(
        &self,
        _coords: &NotebookCoords,
        _tree: &Value,
        ctx: &ComposeContext,
    ) -> Result<Vec<Value>> {
        load_snippet_cells(&ctx.snippets_dir, self.file)
    }
}

/// Loads a snippet file and substitutes the notebook-URL placeholder.
#[derive(Debug)]
struct LinkedSnippetCells {
    file: &'static str,
}

impl CellSequenceGenerator for LinkedSnippetCells {
    fn generate(
        &self,
        coords: &NotebookCoords,
        _tree: &Value,
        ctx: &ComposeContext,
    ) -> Result<Vec<Value>> {
        let cells = load_snippet_cells(&ctx.snippets_dir, self.file)?;
        let Some(url) = ctx.notebook_url.as_deref() else {
            warn!(notebook = %coords, snippet = self.file, "no canonical URL, leaving placeholder");
            return Ok(cells);
        };
        Ok(substitute_placeholders(&cells, &[(NOTEBOOK_URL_TOKEN, url)]))
    }
}

/// The closing call-to-action, linking back to both the notebook page and
/// the framework landing page.
#[derive(Debug)]
struct ClosingCta {
    file: &'static str,
}

impl CellSequenceGenerator for ClosingCta {
    fn generate(
        &self,
        coords: &NotebookCoords,
        _tree: &Value,
        ctx: &ComposeContext,
    ) -> Result<Vec<Value>> {
        let cells = load_snippet_cells(&ctx.snippets_dir, self.file)?;
        let Some(url) = ctx.notebook_url.as_deref() else {
            warn!(notebook = %coords, snippet = self.file, "no canonical URL, leaving placeholders");
            return Ok(cells);
        };
        let framework_url = framework_url_of(url);
        Ok(substitute_placeholders(
            &cells,
            &[
                (NOTEBOOK_URL_TOKEN, url),
                (FRAMEWORK_URL_TOKEN, framework_url.as_str()),
            ],
        ))
    }
}

/// Derive the framework landing page from a notebook URL: drop the notebook
/// segment and append `about/`.
///
/// `https://site/frameworks/langchain/memory-basic/` becomes
/// `https://site/frameworks/langchain/about/`.
fn framework_url_of(notebook_url: &str) -> String {
    let segments: Vec<&str> = notebook_url.split('/').collect();
    let cut = segments.len().saturating_sub(2);
    let mut out: Vec<&str> = segments[..cut].to_vec();
    out.push("about");
    out.push("");
    out.join("/")
}

/// Emits the dependency-install cells from the notebook directory's manifest.
#[derive(Debug)]
struct DependencyInstall;

impl CellSequenceGenerator for DependencyInstall {
    fn generate(
        &self,
        coords: &NotebookCoords,
        _tree: &Value,
        ctx: &ComposeContext,
    ) -> Result<Vec<Value>> {
        deps::install_cells(&coords.source_dir(&ctx.source_root))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name-to-generator mapping. Process-wide, read-only after initialization.
pub type Registry = HashMap<&'static str, Box<dyn CellSequenceGenerator>>;

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let mut map: Registry = HashMap::new();
    map.insert("seq_title", Box::new(TitleCells));
    map.insert(
        "seq_setup_preamble",
        Box::new(LinkedSnippetCells {
            file: "setup_preamble.json",
        }),
    );
    map.insert(
        "seq_setup_preamble_no_llm",
        Box::new(LinkedSnippetCells {
            file: "setup_preamble_no_llm.json",
        }),
    );
    map.insert("seq_dependency_setup", Box::new(DependencyInstall));
    map.insert(
        "seq_setup_db",
        Box::new(SnippetCells {
            file: "setup_db.json",
        }),
    );
    map.insert(
        "seq_setup_provision_db",
        Box::new(SnippetCells {
            file: "setup_provision_db.json",
        }),
    );
    map.insert(
        "seq_setup_llm",
        Box::new(SnippetCells {
            file: "setup_llm.json",
        }),
    );
    map.insert(
        "seq_setup_switch_to_gpu",
        Box::new(SnippetCells {
            file: "setup_suggest_gpu.json",
        }),
    );
    map.insert(
        "seq_setup_download_txt_stories",
        Box::new(SnippetCells {
            file: "setup_download_txt_stories.json",
        }),
    );
    map.insert(
        "seq_setup_download_llama_pdfs",
        Box::new(SnippetCells {
            file: "setup_fetch_llama_pdfs.json",
        }),
    );
    map.insert(
        "seq_setup_closing",
        Box::new(SnippetCells {
            file: "setup_closing.json",
        }),
    );
    map.insert(
        "seq_closing_cta",
        Box::new(ClosingCta {
            file: "closing_cta.json",
        }),
    );
    map
});

/// The process-wide generator registry.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Look up a generator by sequence ID.
pub fn generator(id: &str) -> Result<&'static dyn CellSequenceGenerator> {
    REGISTRY
        .get(id)
        .map(|boxed| boxed.as_ref())
        .ok_or_else(|| NbPressError::UnknownSequence {
            sequence: id.to_string(),
        })
}
