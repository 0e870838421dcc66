//! Serialized shapes of the four artifacts.

use serde::Serialize;

use crate::classify::Classification;
use crate::model::{Chapter, MatchPass, Matter, OrdinalValue};

/// `toc.json`
#[derive(Debug, Serialize)]
pub struct TocDocument<'a> {
    /// Heading block through the last entry block; `null` without a TOC.
    pub span_blocks: Option<[u32; 2]>,
    pub entries: Vec<TocEntryDocument<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TocEntryDocument<'a> {
    pub raw_text: &'a str,
    pub normalized_title: &'a str,
    pub ordinal: Option<OrdinalValue>,
    pub matched_heading_block: u32,
    pub pass: MatchPass,
}

impl<'a> TocDocument<'a> {
    pub fn new(classification: &'a Classification) -> Self {
        let Some(toc) = &classification.toc else {
            return Self {
                span_blocks: None,
                entries: Vec::new(),
            };
        };
        let entries = toc
            .entries
            .iter()
            .zip(&classification.matches)
            .map(|(entry, m)| TocEntryDocument {
                raw_text: &entry.raw_text,
                normalized_title: entry.normalized_title.text(),
                ordinal: entry.ordinal,
                matched_heading_block: m.heading_block_index,
                pass: m.pass,
            })
            .collect();
        Self {
            span_blocks: Some([toc.heading_block, toc.last_block]),
            entries,
        }
    }
}

/// `chapters.json`
#[derive(Debug, Serialize)]
pub struct ChaptersDocument<'a> {
    pub chapters: &'a [Chapter],
}

/// `front_matter.json` and `back_matter.json` serialize [`Matter`] directly.
pub type MatterDocument<'a> = &'a Matter;
