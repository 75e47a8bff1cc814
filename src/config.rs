use std::{fs, path::Path};

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Settings for a single extraction run.
///
/// Defaults are loaded from `extraction_config.json` in the crate root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Language kept unconditionally, and preferred over all others within a group.
    pub target_language: String,
    /// Language whose terms are kept only when a target-language reading is known.
    pub reference_language: String,
    #[serde(default)]
    pub missing_reading: MissingReading,
    #[serde(default)]
    pub qualifier_scope: QualifierScope,
}

/// What to do with a reference-language term that has no known reading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingReading {
    /// Don't record the term.
    #[default]
    Drop,
    /// Record the term without a transliteration.
    Keep,
}

/// How long a `{{qualifier|...}}` applies to following terms.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualifierScope {
    /// Until replaced by another qualifier or the translation block ends.
    #[default]
    Block,
    /// Until the end of the line it appears on.
    Line,
}

static DEFAULT: Lazy<Config> = Lazy::new(|| {
    serde_json::from_str(include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/extraction_config.json"
    )))
    .expect("\"extraction_config.json\" is either invalid json or the wrong structure")
});

impl Default for Config {
    fn default() -> Self {
        DEFAULT.clone()
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        serde_json::from_str(&contents).with_context(|| format!("parsing config {:?}", path))
    }
}
