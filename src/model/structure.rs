//! Structural types produced by the classifier pipeline.

use std::fmt;

use serde::Serialize;

use super::block::Block;
use crate::normalize::NormalizedTitle;

// ============================================================================
// Ordinals
// ============================================================================

/// How a chapter number was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalKind {
    Decimal,
    Roman,
}

/// A chapter number, used as a matching key independent of title text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OrdinalValue {
    pub kind: OrdinalKind,
    pub value: u32,
}

impl OrdinalValue {
    pub fn decimal(value: u32) -> Self {
        Self {
            kind: OrdinalKind::Decimal,
            value,
        }
    }

    pub fn roman(value: u32) -> Self {
        Self {
            kind: OrdinalKind::Roman,
            value,
        }
    }

    /// Two ordinals agree when their numeric values are equal, whatever the notation.
    pub fn same_value(&self, other: &OrdinalValue) -> bool {
        self.value == other.value
    }
}

// ============================================================================
// TOC and headings
// ============================================================================

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Entry text as it appeared, after page numbers and leaders were removed.
    pub raw_text: String,
    pub normalized_title: NormalizedTitle,
    pub ordinal: Option<OrdinalValue>,
    /// Block the entry was read from.
    pub block_index: u32,
}

/// A detected table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocWindow {
    pub heading_block: u32,
    /// Last block that contributed entries. Equals `heading_block` only when
    /// no entries were read.
    pub last_block: u32,
    pub entries: Vec<TocEntry>,
}

impl TocWindow {
    /// Whether `index` falls inside the TOC heading or its entry blocks.
    pub fn contains(&self, index: u32) -> bool {
        (self.heading_block..=self.last_block).contains(&index)
    }
}

/// The closed set of heading forms the grammar recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingKind {
    Chapter,
    Prologue,
    Epilogue,
}

impl fmt::Display for HeadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeadingKind::Chapter => "chapter",
            HeadingKind::Prologue => "prologue",
            HeadingKind::Epilogue => "epilogue",
        })
    }
}

/// A body block recognized as a heading. At most one per block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    pub block_index: u32,
    pub normalized_title: NormalizedTitle,
    pub ordinal: Option<OrdinalValue>,
    pub kind: HeadingKind,
    /// Heading line, whitespace-collapsed, for display.
    pub display_title: String,
}

// ============================================================================
// Matches
// ============================================================================

/// Which matcher pass paired an entry with its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    Exact,
    Ordinal,
    Fuzzy,
}

impl fmt::Display for MatchPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchPass::Exact => "exact",
            MatchPass::Ordinal => "ordinal",
            MatchPass::Fuzzy => "fuzzy",
        })
    }
}

/// Pairing of one TOC entry with one heading block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Match {
    pub toc_entry_index: usize,
    pub heading_block_index: u32,
    pub pass: MatchPass,
}

// ============================================================================
// Segments
// ============================================================================

/// A chapter span. `paragraphs[0]` is always the heading block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub chapter_index: u32,
    pub chapter_number: u32,
    pub title: String,
    pub start_block: u32,
    pub end_block: u32,
    pub paragraphs: Vec<Block>,
}

/// Front or back matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matter {
    /// Inclusive block range, `None` when the matter is empty.
    pub span_blocks: Option<[u32; 2]>,
    pub paragraphs: Vec<Block>,
    pub warnings: Vec<Warning>,
}

impl Matter {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

pub type FrontMatter = Matter;
pub type BackMatter = Matter;

// ============================================================================
// Warnings
// ============================================================================

/// Informational conditions. Warnings never change the emitted structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    TocNotFound,
    TocInsufficientEntries,
    PageNumberOnlyLineRemoved,
    MixedLineCleaned,
    UnreferencedHeading,
    BackMatterDetected,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::TocNotFound => "toc_not_found",
            WarningCode::TocInsufficientEntries => "toc_insufficient_entries",
            WarningCode::PageNumberOnlyLineRemoved => "page_number_only_line_removed",
            WarningCode::MixedLineCleaned => "mixed_line_cleaned",
            WarningCode::UnreferencedHeading => "unreferenced_heading",
            WarningCode::BackMatterDetected => "back_matter_detected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_index: Option<u32>,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            block_index: None,
        }
    }

    pub fn at(code: WarningCode, block_index: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            block_index: Some(block_index),
        }
    }

    /// Emit the warning through the log facade and return it.
    pub(crate) fn logged(self) -> Self {
        match self.block_index {
            Some(index) => log::warn!("{} (block {index}): {}", self.code.as_str(), self.message),
            None => log::warn!("{}: {}", self.code.as_str(), self.message),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_same_value_ignores_notation() {
        assert!(OrdinalValue::decimal(3).same_value(&OrdinalValue::roman(3)));
        assert!(!OrdinalValue::decimal(3).same_value(&OrdinalValue::decimal(4)));
    }

    #[test]
    fn test_warning_serialization() {
        let warning = Warning::at(WarningCode::MixedLineCleaned, 4, "page number removed");
        let json = serde_json::to_string(&warning).unwrap();
        assert_eq!(
            json,
            r#"{"code":"mixed_line_cleaned","message":"page number removed","block_index":4}"#
        );
        let json = serde_json::to_string(&Warning::new(WarningCode::TocNotFound, "none")).unwrap();
        assert_eq!(json, r#"{"code":"toc_not_found","message":"none"}"#);
    }

    #[test]
    fn test_toc_window_contains() {
        let window = TocWindow {
            heading_block: 2,
            last_block: 4,
            entries: Vec::new(),
        };
        assert!(!window.contains(1));
        assert!(window.contains(2));
        assert!(window.contains(4));
        assert!(!window.contains(5));
    }

    #[test]
    fn test_ordinal_serialization() {
        let json = serde_json::to_string(&OrdinalValue::roman(12)).unwrap();
        assert_eq!(json, r#"{"kind":"roman","value":12}"#);
    }
}
