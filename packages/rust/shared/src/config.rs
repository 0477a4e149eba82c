//! Application configuration for nbpress.
//!
//! User config lives at `~/.nbpress/nbpress.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{NbPressError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "nbpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".nbpress";

// ---------------------------------------------------------------------------
// Config structs (matching nbpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Documentation site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Output location settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Tree-filter options.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Snippet template settings.
    #[serde(default)]
    pub snippets: SnippetsConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the documentation site, with trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Required first segment of every notebook identity.
    #[serde(default = "default_docs_root")]
    pub docs_root: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            docs_root: default_docs_root(),
        }
    }
}

fn default_base_url() -> String {
    "https://cassio.org/".into()
}
fn default_docs_root() -> String {
    "docs".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Subdirectory (next to each notebook) receiving published output.
    #[serde(default = "default_output_subdir")]
    pub subdir: String,

    /// Prefix prepended to published file titles.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Whether the standalone cleaner overwrites files in place
    /// (otherwise it writes a `.copy` sibling).
    #[serde(default = "default_true")]
    pub in_place: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            subdir: default_output_subdir(),
            file_prefix: default_file_prefix(),
            in_place: true,
        }
    }
}

fn default_output_subdir() -> String {
    ".colab".into()
}
fn default_file_prefix() -> String {
    "colab_".into()
}
fn default_true() -> bool {
    true
}

/// `[filter]` section — options consumed by the tree filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Strip `cells..id`. Off by default: nbformat treats a missing id
    /// as a hard error in future versions.
    #[serde(default)]
    pub strip_cell_ids: bool,

    /// Strip `stdout` stream outputs (stderr is always stripped).
    #[serde(default)]
    pub strip_stdout: bool,
}

/// `[snippets]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetsConfig {
    /// Directory holding snippet template JSON fragments.
    #[serde(default = "default_snippets_dir")]
    pub dir: String,
}

impl Default for SnippetsConfig {
    fn default() -> Self {
        Self {
            dir: default_snippets_dir(),
        }
    }
}

fn default_snippets_dir() -> String {
    "snippets".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.nbpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NbPressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.nbpress/nbpress.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NbPressError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        NbPressError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NbPressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NbPressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NbPressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check the invariants the pipeline relies on: a parseable base URL with a
/// trailing slash, and a non-empty docs root.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    Url::parse(&config.site.base_url).map_err(|e| {
        NbPressError::config(format!(
            "site.base_url '{}' is not a valid URL: {e}",
            config.site.base_url
        ))
    })?;

    if !config.site.base_url.ends_with('/') {
        return Err(NbPressError::config(format!(
            "site.base_url '{}' must end with '/'",
            config.site.base_url
        )));
    }

    if config.site.docs_root.is_empty() {
        return Err(NbPressError::config("site.docs_root must not be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains(".colab"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.site.docs_root, "docs");
        assert_eq!(parsed.output.file_prefix, "colab_");
        assert!(!parsed.filter.strip_cell_ids);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[site]
base_url = "https://docs.example.com/"

[filter]
strip_stdout = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.base_url, "https://docs.example.com/");
        assert_eq!(config.site.docs_root, "docs");
        assert!(config.filter.strip_stdout);
        assert_eq!(config.snippets.dir, "snippets");
    }

    #[test]
    fn base_url_without_trailing_slash_rejected() {
        let mut config = AppConfig::default();
        config.site.base_url = "https://docs.example.com".into();
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must end with '/'"));
    }

    #[test]
    fn unparseable_base_url_rejected() {
        let mut config = AppConfig::default();
        config.site.base_url = "not a url/".into();
        assert!(validate_config(&config).is_err());
    }
}
