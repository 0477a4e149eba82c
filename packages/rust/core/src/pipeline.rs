//! The per-notebook publication pipeline.
//!
//! Strictly linear, terminal on the first failure:
//! Load → ExtractMetadata → Filter → Rewrite → Compose → Serialize.
//! The output file is written only after the whole composition succeeded, so
//! a failing notebook never leaves a partial file behind.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, instrument};

use nbpress_compose::{ComposeContext, compose, is_denylisted, resolve_rules};
use nbpress_notebook::{CleanOptions, clean_tree, find_headings, rewrite_code_lines};
use nbpress_shared::{
    AppConfig, FilterConfig, NbPressError, NotebookCoords, OutputConfig, Result, SiteConfig,
};

use crate::serialize::to_notebook_json;
use crate::url::canonical_url;

/// Configuration for the publication pipeline.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Directory containing the docs root (notebook identities are relative
    /// to this).
    pub source_root: PathBuf,
    /// Documentation site settings.
    pub site: SiteConfig,
    /// Output location settings.
    pub output: OutputConfig,
    /// Tree-filter options.
    pub filter: FilterConfig,
    /// Directory holding snippet templates.
    pub snippets_dir: PathBuf,
}

impl PublishConfig {
    /// Build a pipeline config from the app config and a source root.
    ///
    /// A relative snippets directory is resolved against the source root.
    pub fn from_app(source_root: impl Into<PathBuf>, app: &AppConfig) -> Self {
        let source_root = source_root.into();
        let dir = PathBuf::from(&app.snippets.dir);
        let snippets_dir = if dir.is_absolute() {
            dir
        } else {
            source_root.join(dir)
        };
        Self {
            source_root,
            site: app.site.clone(),
            output: app.output.clone(),
            filter: app.filter.clone(),
            snippets_dir,
        }
    }
}

/// Result of publishing one notebook.
#[derive(Debug)]
pub struct PublishResult {
    /// The notebook that was processed.
    pub coords: NotebookCoords,
    /// Where the published file was written.
    pub output_path: PathBuf,
    /// The canonical documentation-site URL.
    pub url: String,
    /// Whether cell sequences were injected (false for denylisted notebooks).
    pub injected: bool,
    /// Wall-clock time for this notebook.
    pub elapsed: Duration,
}

/// Run the full pipeline for one notebook.
#[instrument(skip(config), fields(notebook = %coords))]
pub fn publish_notebook(
    config: &PublishConfig,
    coords: &NotebookCoords,
) -> Result<PublishResult> {
    let start = Instant::now();

    // --- Load ---
    let input_path = coords.source_path(&config.source_root);
    let tree = load_notebook(&input_path)?;

    // --- ExtractMetadata ---
    let headings = find_headings(&tree);
    let url = canonical_url(coords, &config.site)?;
    debug!(%url, title = ?headings.title, "metadata extracted");

    // --- Filter ---
    let options = CleanOptions {
        strip_cell_ids: config.filter.strip_cell_ids,
        strip_stdout: config.filter.strip_stdout,
    };
    let filtered = clean_tree(&tree, &options);

    // --- Rewrite ---
    let rules = resolve_rules(coords);
    let rewritten = rewrite_code_lines(&filtered, &rules);

    // --- Compose ---
    let injected = !is_denylisted(&coords.identity());
    let ctx = ComposeContext {
        headings,
        notebook_url: Some(url.clone()),
        snippets_dir: config.snippets_dir.clone(),
        source_root: config.source_root.clone(),
    };
    let composed = compose(coords, &rewritten, &ctx)?;

    // --- Serialize ---
    let json = to_notebook_json(&composed)?;
    let output_coords = coords.output_coords(&config.output.subdir, &config.output.file_prefix);
    let output_path = output_coords.source_path(&config.source_root);

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| NbPressError::io(parent, e))?;
    }
    std::fs::write(&output_path, json).map_err(|e| NbPressError::io(&output_path, e))?;

    let result = PublishResult {
        coords: coords.clone(),
        output_path,
        url,
        injected,
        elapsed: start.elapsed(),
    };

    info!(
        output = %result.output_path.display(),
        injected = result.injected,
        elapsed_ms = result.elapsed.as_millis(),
        "notebook published"
    );

    Ok(result)
}

/// Load and schema-check a notebook file.
///
/// Unreadable files are I/O errors; unparseable JSON or a missing `cells`
/// key is a malformed-input error.
pub fn load_notebook(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| NbPressError::io(path, e))?;

    let tree: Value = serde_json::from_str(&content)
        .map_err(|e| NbPressError::malformed(path, format!("invalid JSON: {e}")))?;

    if tree.get("cells").and_then(Value::as_array).is_none() {
        return Err(NbPressError::malformed(path, "missing 'cells' array"));
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
    }

    fn test_config(output_subdir: &str) -> PublishConfig {
        let root = fixtures_root();
        PublishConfig {
            source_root: root.clone(),
            site: SiteConfig::default(),
            output: OutputConfig {
                subdir: output_subdir.into(),
                file_prefix: "colab_".into(),
                in_place: false,
            },
            filter: FilterConfig::default(),
            snippets_dir: root.join("snippets"),
        }
    }

    fn qa_basic() -> NotebookCoords {
        NotebookCoords::from_relative_path(Path::new("docs/frameworks/langchain/qa-basic.ipynb"))
            .unwrap()
    }

    #[test]
    fn load_rejects_missing_cells() {
        let bogus = std::env::temp_dir().join("nbpress_no_cells.json");
        std::fs::write(&bogus, "{\"metadata\": {}}").unwrap();
        let err = load_notebook(&bogus).unwrap_err();
        assert!(matches!(err, NbPressError::MalformedInput { .. }));
    }

    #[test]
    fn load_rejects_invalid_json() {
        let bogus = std::env::temp_dir().join("nbpress_invalid.json");
        std::fs::write(&bogus, "not json at all").unwrap();
        let err = load_notebook(&bogus).unwrap_err();
        assert!(matches!(err, NbPressError::MalformedInput { .. }));
    }

    #[test]
    fn publish_end_to_end() {
        let config = test_config(".colab-test-publish");
        let result = publish_notebook(&config, &qa_basic()).expect("publish fixture notebook");
        assert!(result.injected);
        assert_eq!(result.url, "https://cassio.org/frameworks/langchain/qa-basic/");

        let written = std::fs::read_to_string(&result.output_path).expect("output exists");
        assert!(written.ends_with('\n'));

        let tree: Value = serde_json::from_str(&written).unwrap();
        let text = serde_json::to_string(&tree).unwrap();

        // filter ran: stderr gone, stdout kept, volatile metadata gone
        assert!(!text.contains("stderr"));
        assert!(text.contains("loaded 42 documents"));
        assert!(tree["metadata"].get("widgets").is_none());
        assert!(tree["metadata"]["language_info"].get("version").is_none());

        // rewrite ran: dotenv loading removed, provider import replaced
        assert!(!text.contains("load_dotenv"));
        assert!(!text.contains("import suggest_llm_provider"));
        assert!(text.contains("# creation of the LLM resources"));

        // compose ran and resolved the link placeholders
        assert!(!text.contains("__NOTEBOOK_URL__"));
        assert!(!text.contains("__FRAMEWORK_URL__"));
        assert!(text.contains("https://cassio.org/frameworks/langchain/qa-basic/"));

        // authored content still present
        assert!(text.contains("Question Answering, basic"));

        std::fs::remove_dir_all(result.output_path.parent().unwrap()).ok();
    }

    #[test]
    fn publish_outside_docs_root_fails_without_output() {
        let mut config = test_config(".colab-test-invalid");
        config.site.docs_root = "elsewhere".into();

        let err = publish_notebook(&config, &qa_basic()).unwrap_err();
        assert!(matches!(err, NbPressError::InvalidPath { .. }));

        let out_dir = fixtures_root().join("docs/frameworks/langchain/.colab-test-invalid");
        assert!(!out_dir.exists());
    }
}
