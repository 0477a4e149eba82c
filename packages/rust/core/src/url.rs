//! Canonical documentation-site URL derivation.

use url::Url;

use nbpress_shared::{NbPressError, NotebookCoords, Result, SiteConfig};

/// Derive the canonical site URL for a notebook.
///
/// The notebook's first directory segment must equal the configured docs
/// root; the URL is the base joined with the remaining segments and the file
/// stem, with a trailing slash:
/// `docs/frameworks/langchain/qa-basic.ipynb` →
/// `https://cassio.org/frameworks/langchain/qa-basic/`.
pub fn canonical_url(coords: &NotebookCoords, site: &SiteConfig) -> Result<String> {
    if coords.dirs.first().map(String::as_str) != Some(site.docs_root.as_str()) {
        return Err(NbPressError::invalid_path(
            coords.identity(),
            format!("expected first segment '{}'", site.docs_root),
        ));
    }

    let base = Url::parse(&site.base_url).map_err(|e| {
        NbPressError::config(format!("site.base_url '{}': {e}", site.base_url))
    })?;

    let mut segments: Vec<&str> = coords.dirs[1..].iter().map(String::as_str).collect();
    segments.push(coords.file_stem());
    segments.push("");

    let url = base
        .join(&segments.join("/"))
        .map_err(|e| NbPressError::invalid_path(coords.identity(), e.to_string()))?;
    Ok(url.to_string())
}
