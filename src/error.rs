//! Error types for bookseg operations.
//!
//! Every variant is fatal: the pipeline short-circuits on the first error and
//! never emits partial artifacts.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while classifying a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("block {block_index} matches more than one heading pattern")]
    MultipleHeadingsInBlock { block_index: u32 },

    #[error("table of contents entry {entry_index} ({entry_text:?}) matches no heading")]
    UnmatchedTocEntry {
        entry_index: usize,
        entry_text: String,
    },

    #[error(
        "table of contents entry {entry_index} matched block {got}, which does not follow block {expected_after}"
    )]
    NonMonotonicOrder {
        entry_index: usize,
        expected_after: u32,
        got: u32,
    },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid grammar: {reason}")]
    InvalidGrammar { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_grammar(reason: impl Into<String>) -> Self {
        Error::InvalidGrammar {
            reason: reason.into(),
        }
    }

    /// Stable snake_case code identifying the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MultipleHeadingsInBlock { .. } => "multiple_headings_in_block",
            Error::UnmatchedTocEntry { .. } => "unmatched_toc_entry",
            Error::NonMonotonicOrder { .. } => "non_monotonic_order",
            Error::InvalidInput { .. } => "invalid_input",
            Error::InvalidGrammar { .. } => "invalid_grammar",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }

    /// Structured description of the failure, naming the offending block or entry.
    pub fn report(&self) -> ErrorReport {
        let mut report = ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            block_index: None,
            entry_index: None,
            entry_text: None,
        };
        match self {
            Error::MultipleHeadingsInBlock { block_index } => {
                report.block_index = Some(*block_index);
            }
            Error::UnmatchedTocEntry {
                entry_index,
                entry_text,
            } => {
                report.entry_index = Some(*entry_index);
                report.entry_text = Some(entry_text.clone());
            }
            Error::NonMonotonicOrder {
                entry_index, got, ..
            } => {
                report.entry_index = Some(*entry_index);
                report.block_index = Some(*got);
            }
            _ => {}
        }
        report
    }
}

/// Serializable form of an [`Error`], surfaced to callers on a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_text: Option<String>,
}
