//! Compiled-in publication settings.
//!
//! Code-line replacement rules, the default cell-sequence lists, per-notebook
//! overrides, and the injection denylist all live here as static tables keyed
//! by notebook identity (or identity prefix, for rules). Tables are validated
//! against the generator registry at startup by [`validate_settings`] so a
//! typo in a sequence name fails before any notebook is touched.

use std::collections::HashMap;
use std::sync::LazyLock;

use nbpress_notebook::ReplacementRule;
use nbpress_shared::{NbPressError, NotebookCoords, Result};

use crate::generator::registry;

// ---------------------------------------------------------------------------
// Code-line replacement rules
// ---------------------------------------------------------------------------

/// Rules applied to every notebook (rule-map key `""`).
///
/// These edit references to collaborators the published runtime cannot use:
/// the LLM-provider selector, dotenv credential loading, and the local DB
/// session module. The targeted setup is injected as cell sequences instead.
fn base_rules() -> Vec<ReplacementRule> {
    vec![
        ReplacementRule::replace(
            "import suggest_llm_provider",
            "# creation of the LLM resources",
        ),
        ReplacementRule::delete("= suggest_llm_provider"),
        ReplacementRule::delete("Alternatively set llm_provider"),
        ReplacementRule::replace(
            "database_mode = \"cassandra\"  # \"cassandra\" / \"astra_db\"",
            "database_mode = \"astra_db\"  # only \"astra_db\" supported on the hosted runtime",
        ),
        ReplacementRule::replace(
            "# Ensure loading of database credentials into environment variables:",
            "# Getting ready to initialize the DB connection globally ...",
        ),
        ReplacementRule::delete("from dotenv import load_dotenv"),
        ReplacementRule::delete("load_dotenv(\"../../../.env\")"),
        ReplacementRule::replace(
            "from cqlsession import getCassandraCQLSession, getCassandraCQLKeyspace",
            "    # Cassandra is not available here - define your own getCassandraCQLSession/getCassandraCQLKeyspace",
        ),
    ]
}

/// Rule map: slash-joined identity prefixes to rule lists.
///
/// A notebook receives the concatenation of every entry whose key is a
/// prefix of its own identity, root-to-leaf (most general first). Rules that
/// walk on each other are the author's responsibility.
static RULE_MAP: LazyLock<HashMap<&'static str, Vec<ReplacementRule>>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("", base_rules());
    map
});

/// Resolve the full, ordered rule list for one notebook.
///
/// Iterates the identity's prefix slices from the empty prefix down to the
/// full identity (directories plus file title), concatenating matching rule
/// lists in that order.
pub fn resolve_rules(coords: &NotebookCoords) -> Vec<ReplacementRule> {
    let mut segments = coords.dirs.clone();
    segments.push(coords.file_title.clone());

    let mut rules = Vec::new();
    for end in 0..=segments.len() {
        let key = segments[..end].join("/");
        if let Some(extra) = RULE_MAP.get(key.as_str()) {
            rules.extend(extra.iter().cloned());
        }
    }
    rules
}

// ---------------------------------------------------------------------------
// Cell-sequence tables
// ---------------------------------------------------------------------------

/// Default opening sequences, injected before the authored cells.
pub const DEFAULT_OPENING_SEQUENCES: &[&str] = &[
    "seq_title",
    "seq_setup_preamble",
    "seq_dependency_setup",
    "seq_setup_db",
    "seq_setup_llm",
    "seq_setup_closing",
];

/// Default closing sequences, appended after the authored cells.
pub const DEFAULT_CLOSING_SEQUENCES: &[&str] = &["seq_closing_cta"];

// Variant lists used by several overrides.
const WRITE_DB_NO_LLM: &[&str] = &[
    "seq_title",
    "seq_setup_preamble_no_llm",
    "seq_dependency_setup",
    "seq_setup_db",
    "seq_setup_provision_db",
    "seq_setup_closing",
];
const NO_DB_NO_LLM: &[&str] = &[
    "seq_title",
    "seq_setup_preamble_no_llm",
    "seq_dependency_setup",
    "seq_setup_closing",
];
const NO_LLM: &[&str] = &[
    "seq_title",
    "seq_setup_preamble_no_llm",
    "seq_dependency_setup",
    "seq_setup_db",
    "seq_setup_closing",
];
const NO_LLM_GPU: &[&str] = &[
    "seq_title",
    "seq_setup_preamble_no_llm",
    "seq_setup_switch_to_gpu",
    "seq_dependency_setup",
    "seq_setup_db",
    "seq_setup_closing",
];

/// Per-notebook opening-sequence overrides, keyed by exact identity.
static OPENING_OVERRIDES: LazyLock<HashMap<&'static str, Vec<&'static str>>> =
    LazyLock::new(|| {
        let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        map.insert(
            "docs/frameworks/langchain/chat-prompt-templates.ipynb",
            WRITE_DB_NO_LLM.to_vec(),
        );
        map.insert(
            "docs/frameworks/langchain/prompt-templates-basic.ipynb",
            WRITE_DB_NO_LLM.to_vec(),
        );
        map.insert(
            "docs/frameworks/langchain/prompt-templates-partialing.ipynb",
            WRITE_DB_NO_LLM.to_vec(),
        );
        map.insert(
            "docs/frameworks/langchain/qa-basic.ipynb",
            vec![
                "seq_title",
                "seq_setup_preamble",
                "seq_dependency_setup",
                "seq_setup_db",
                "seq_setup_llm",
                "seq_setup_download_txt_stories",
                "seq_setup_closing",
            ],
        );
        map.insert(
            "docs/frameworks/langchain/qa-vector-metadata.ipynb",
            vec![
                "seq_title",
                "seq_setup_preamble",
                "seq_dependency_setup",
                "seq_setup_db",
                "seq_setup_llm",
                "seq_setup_download_txt_stories",
                "seq_setup_closing",
            ],
        );
        map.insert(
            "docs/frameworks/langchain/memory-basic.ipynb",
            NO_LLM.to_vec(),
        );
        map.insert(
            "docs/frameworks/langchain/prompt-templates-engine.ipynb",
            NO_DB_NO_LLM.to_vec(),
        );
        map.insert(
            "docs/frameworks/direct/sound_similarity_vectors.ipynb",
            NO_LLM_GPU.to_vec(),
        );
        map.insert(
            "docs/frameworks/direct/image_similarity_vectors.ipynb",
            NO_LLM_GPU.to_vec(),
        );
        map.insert(
            "docs/frameworks/llamaindex/vector-quickstart.ipynb",
            vec![
                "seq_title",
                "seq_setup_preamble",
                "seq_dependency_setup",
                "seq_setup_db",
                "seq_setup_llm",
                "seq_setup_download_llama_pdfs",
                "seq_setup_closing",
            ],
        );
        map
    });

/// Per-notebook closing-sequence overrides, keyed by exact identity.
static CLOSING_OVERRIDES: LazyLock<HashMap<&'static str, Vec<&'static str>>> =
    LazyLock::new(HashMap::new);

/// Notebook identities exempted from all cell-sequence injection.
///
/// These still get filtered and rewritten; only composition is skipped.
pub const INJECTION_DENYLIST: &[&str] = &[
    "docs/frameworks/langchain/prompt-templates-feast.ipynb",
];

/// Whether a notebook identity is exempt from cell-sequence injection.
pub fn is_denylisted(identity: &str) -> bool {
    INJECTION_DENYLIST.contains(&identity)
}

/// Resolve the (opening, closing) sequence ID lists for one notebook.
///
/// Exact-identity override lookup, falling back to the module defaults.
pub fn resolve_sequences(identity: &str) -> (Vec<&'static str>, Vec<&'static str>) {
    let opening = OPENING_OVERRIDES
        .get(identity)
        .cloned()
        .unwrap_or_else(|| DEFAULT_OPENING_SEQUENCES.to_vec());
    let closing = CLOSING_OVERRIDES
        .get(identity)
        .cloned()
        .unwrap_or_else(|| DEFAULT_CLOSING_SEQUENCES.to_vec());
    (opening, closing)
}

// ---------------------------------------------------------------------------
// Startup validation
// ---------------------------------------------------------------------------

/// Check every sequence ID referenced by the tables against the registry.
///
/// Run once at startup: converts what would be a mid-batch lookup failure
/// into a configuration error raised before any file is written.
pub fn validate_settings() -> Result<()> {
    let known = registry();

    let referenced = DEFAULT_OPENING_SEQUENCES
        .iter()
        .chain(DEFAULT_CLOSING_SEQUENCES)
        .copied()
        .chain(OPENING_OVERRIDES.values().flatten().copied())
        .chain(CLOSING_OVERRIDES.values().flatten().copied());

    for id in referenced {
        if !known.contains_key(id) {
            return Err(NbPressError::UnknownSequence {
                sequence: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Override-table and denylist identities absent from the given notebook set.
///
/// Stale entries are not fatal (a notebook may have been renamed or removed)
/// but callers should surface them, since a typo here silently falls back to
/// the default sequences.
pub fn unmatched_overrides(known: &[String]) -> Vec<&'static str> {
    let mut stale: Vec<&'static str> = OPENING_OVERRIDES
        .keys()
        .chain(CLOSING_OVERRIDES.keys())
        .copied()
        .chain(INJECTION_DENYLIST.iter().copied())
        .filter(|identity| !known.iter().any(|k| k == identity))
        .collect();
    stale.sort_unstable();
    stale.dedup();
    stale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(identity: &str) -> NotebookCoords {
        NotebookCoords::from_relative_path(std::path::Path::new(identity)).unwrap()
    }

    #[test]
    fn settings_tables_validate() {
        validate_settings().expect("every referenced sequence ID must be registered");
    }

    #[test]
    fn base_rules_apply_everywhere() {
        let rules = resolve_rules(&coords("docs/frameworks/langchain/qa-basic.ipynb"));
        assert!(!rules.is_empty());
        assert_eq!(rules, resolve_rules(&coords("docs/other/deep/nested.ipynb")));
    }

    #[test]
    fn override_lookup_is_exact() {
        let (opening, closing) =
            resolve_sequences("docs/frameworks/langchain/memory-basic.ipynb");
        assert_eq!(opening, NO_LLM.to_vec());
        assert_eq!(closing, DEFAULT_CLOSING_SEQUENCES.to_vec());

        // near-miss identities fall back to defaults
        let (opening, _) =
            resolve_sequences("docs/frameworks/langchain/memory-basic2.ipynb");
        assert_eq!(opening, DEFAULT_OPENING_SEQUENCES.to_vec());
    }

    #[test]
    fn denylist_membership() {
        assert!(is_denylisted(
            "docs/frameworks/langchain/prompt-templates-feast.ipynb"
        ));
        assert!(!is_denylisted("docs/frameworks/langchain/qa-basic.ipynb"));
    }

    #[test]
    fn unmatched_overrides_reports_stale_identities() {
        let known = vec![
            "docs/frameworks/langchain/qa-basic.ipynb".to_string(),
            "docs/frameworks/langchain/memory-basic.ipynb".to_string(),
        ];
        let stale = unmatched_overrides(&known);
        assert!(!stale.contains(&"docs/frameworks/langchain/qa-basic.ipynb"));
        assert!(stale.contains(&"docs/frameworks/langchain/chat-prompt-templates.ipynb"));
        assert!(stale.contains(&"docs/frameworks/langchain/prompt-templates-feast.ipynb"));
    }

    #[test]
    fn rule_resolution_goes_root_to_leaf() {
        // with only the base entry present the resolved list equals it
        let rules = resolve_rules(&coords("docs/a.ipynb"));
        assert_eq!(rules, base_rules());
    }
}
