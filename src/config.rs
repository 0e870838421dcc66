//! Classifier configuration.
//!
//! All policy constants live here rather than in the algorithms. A config is an
//! immutable value handed to [`classify`](crate::classify::classify); the
//! compiled grammar is derived from it per run, so independent runs never
//! share mutable state.
//!
//! # Example
//!
//! ```
//! use bookseg::ClassifierConfig;
//!
//! let config = ClassifierConfig::from_json_str(r#"{ "toc_lookahead": 8 }"#)?;
//! assert_eq!(config.toc_lookahead, 8);
//! assert_eq!(config.min_toc_entries, 2);
//! # Ok::<(), bookseg::Error>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration for one classification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Heading and TOC vocabulary.
    pub grammar: Grammar,
    /// Number of blocks after the TOC heading searched for entries.
    pub toc_lookahead: usize,
    /// Minimum entries for a TOC to count as detected.
    pub min_toc_entries: usize,
    /// Lines longer than this (in characters) are never TOC entries.
    pub max_entry_chars: usize,
    pub fuzzy: FuzzyConfig,
    pub back_matter: BackMatterConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            grammar: Grammar::default(),
            toc_lookahead: 5,
            min_toc_entries: 2,
            max_entry_chars: 120,
            fuzzy: FuzzyConfig::default(),
            back_matter: BackMatterConfig::default(),
        }
    }
}

impl ClassifierConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid_input(format!("configuration: {e}")))
    }

    /// Read a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json_str(&crate::util::decode_text(&bytes))
    }

    /// Set the TOC lookahead window size.
    pub fn with_toc_lookahead(mut self, blocks: usize) -> Self {
        self.toc_lookahead = blocks;
        self
    }

    /// Set the fuzzy pass edit-distance threshold.
    pub fn with_fuzzy_distance(mut self, distance: usize) -> Self {
        self.fuzzy.max_distance = distance;
        self
    }
}

/// Vocabulary of the heading grammar.
///
/// Keywords and phrases are compared after normalization, so case and
/// punctuation do not matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Grammar {
    /// Whole-block phrases that introduce a table of contents.
    pub toc_headings: Vec<String>,
    /// Keywords followed by an ordinal, e.g. "Chapter 3".
    pub chapter_keywords: Vec<String>,
    pub prologue_keywords: Vec<String>,
    pub epilogue_keywords: Vec<String>,
    /// Lines longer than this (in characters) are never headings.
    pub max_heading_chars: usize,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            toc_headings: vec!["table of contents".into(), "contents".into()],
            chapter_keywords: vec!["chapter".into(), "chap".into()],
            prologue_keywords: vec!["prologue".into()],
            epilogue_keywords: vec!["epilogue".into()],
            max_heading_chars: 120,
        }
    }
}

/// Thresholds for the fuzzy matcher pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuzzyConfig {
    /// Maximum Levenshtein distance between normalized titles.
    pub max_distance: usize,
    /// Titles shorter than this (in characters) are never fuzzy-matched.
    pub min_chars: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            max_distance: 2,
            min_chars: 4,
        }
    }
}

/// Tail refinement that splits back matter off the last chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackMatterConfig {
    pub enabled: bool,
    /// Whole-block headings that start back matter.
    pub headings: Vec<String>,
}

impl Default for BackMatterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            headings: vec![
                "acknowledgments".into(),
                "acknowledgements".into(),
                "about the author".into(),
                "colophon".into(),
                "also by the author".into(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.toc_lookahead, 5);
        assert_eq!(config.min_toc_entries, 2);
        assert_eq!(config.fuzzy.max_distance, 2);
        assert!(config.back_matter.enabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ClassifierConfig::from_json_str(r#"{"fuzzy": {"max_distance": 1}}"#).unwrap();
        assert_eq!(config.fuzzy.max_distance, 1);
        assert_eq!(config.fuzzy.min_chars, 4);
        assert_eq!(config.grammar, Grammar::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ClassifierConfig::from_json_str(r#"{"lookahead": 3}"#).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_builders() {
        let config = ClassifierConfig::default()
            .with_toc_lookahead(9)
            .with_fuzzy_distance(0);
        assert_eq!(config.toc_lookahead, 9);
        assert_eq!(config.fuzzy.max_distance, 0);
    }
}
