//! The classification pipeline.
//!
//! ```text
//! TOC_SCAN ─┬─ no TOC ──────────────────────────────────────────────┐
//!           └─ HEADING_SCAN → MATCHING → MONOTONICITY_CHECK → SEGMENTING → DONE
//! ```
//!
//! Any stage may fail instead. A failed run returns the error and nothing
//! else; there is no partial result to write.

mod headings;
mod matcher;
mod monotonic;
mod ordinal;
mod patterns;
mod segment;
mod toc;

use std::collections::BTreeSet;
use std::fmt;

pub use headings::scan_headings;
pub use matcher::{match_entries, titles_close};
pub use monotonic::enforce_monotonic;
pub use ordinal::{parse_ordinal, to_roman};
pub use patterns::CompiledGrammar;
pub use segment::{Segmentation, segment};
pub use toc::{TocDetection, detect_toc};

use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::model::{
    BackMatter, BlockStore, Chapter, FrontMatter, HeadingCandidate, Match, TocWindow, Warning,
    WarningCode,
};

/// Pipeline stages, as they appear in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    TocScan,
    NoToc,
    HeadingScan,
    Matching,
    MonotonicityCheck,
    Segmenting,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::TocScan => "TOC_SCAN",
            Stage::NoToc => "NO_TOC",
            Stage::HeadingScan => "HEADING_SCAN",
            Stage::Matching => "MATCHING",
            Stage::MonotonicityCheck => "MONOTONICITY_CHECK",
            Stage::Segmenting => "SEGMENTING",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        })
    }
}

fn enter(stage: Stage) {
    log::info!("stage {stage}");
}

/// A successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// `None` when the document has no usable table of contents.
    pub toc: Option<TocWindow>,
    /// One match per TOC entry, in TOC order.
    pub matches: Vec<Match>,
    pub front_matter: FrontMatter,
    pub chapters: Vec<Chapter>,
    pub back_matter: BackMatter,
    /// Every warning of the run, in emission order.
    pub warnings: Vec<Warning>,
}

impl Classification {
    /// The match for TOC entry `entry_index`.
    pub fn match_for(&self, entry_index: usize) -> Option<&Match> {
        self.matches.get(entry_index)
    }
}

/// Classify a block store into front matter, chapters and back matter.
///
/// Deterministic: the same store and config always give the same result,
/// warnings order included.
///
/// ```
/// use bookseg::{BlockStore, ClassifierConfig, classify};
///
/// let store = BlockStore::from_texts([
///     "Table of Contents",
///     "1. Arrival",
///     "2. Departure",
///     "Chapter 1 Arrival",
///     "...",
///     "Chapter 2: Departure",
///     "...",
/// ]);
/// let result = classify(&store, &ClassifierConfig::default())?;
/// let spans: Vec<_> = result.chapters.iter().map(|c| (c.start_block, c.end_block)).collect();
/// assert_eq!(spans, vec![(3, 4), (5, 6)]);
/// # Ok::<(), bookseg::Error>(())
/// ```
pub fn classify(store: &BlockStore, config: &ClassifierConfig) -> Result<Classification> {
    run(store, config).inspect_err(|e| log::info!("stage {}: {e}", Stage::Failed))
}

fn run(store: &BlockStore, config: &ClassifierConfig) -> Result<Classification> {
    let grammar = CompiledGrammar::new(&config.grammar)?;

    enter(Stage::TocScan);
    let detection = detect_toc(store, &grammar, config);
    let mut warnings = detection.warnings;

    let Some(toc) = detection.window else {
        enter(Stage::NoToc);
        let mut segmentation = segment(store, None, &[], &[], &config.back_matter);
        segmentation.front_matter.warnings = warnings.clone();
        enter(Stage::Done);
        return Ok(Classification {
            toc: None,
            matches: Vec::new(),
            front_matter: segmentation.front_matter,
            chapters: segmentation.chapters,
            back_matter: segmentation.back_matter,
            warnings,
        });
    };

    enter(Stage::HeadingScan);
    let headings = scan_headings(store, &grammar, Some(&toc))?;
    // Headings ahead of the TOC belong to the front matter and never match.
    let body_start = headings.partition_point(|h| h.block_index < toc.heading_block);

    enter(Stage::Matching);
    let body_matches = match_entries(&toc.entries, &headings[body_start..], &config.fuzzy)?;

    enter(Stage::MonotonicityCheck);
    enforce_monotonic(&body_matches)?;

    warnings.extend(unreferenced(&headings, &body_matches));

    enter(Stage::Segmenting);
    let segmentation = segment(
        store,
        Some(&toc),
        &body_matches,
        &headings,
        &config.back_matter,
    );

    let Segmentation {
        mut front_matter,
        chapters,
        back_matter,
    } = segmentation;
    front_matter.warnings = warnings.clone();
    warnings.extend(back_matter.warnings.iter().cloned());

    log::info!(
        "{} chapters, {} front matter blocks, {} back matter blocks",
        chapters.len(),
        front_matter.paragraphs.len(),
        back_matter.paragraphs.len()
    );
    enter(Stage::Done);

    Ok(Classification {
        toc: Some(toc),
        matches: body_matches,
        front_matter,
        chapters,
        back_matter,
        warnings,
    })
}

fn unreferenced(headings: &[HeadingCandidate], matches: &[Match]) -> Vec<Warning> {
    let used: BTreeSet<u32> = matches.iter().map(|m| m.heading_block_index).collect();
    headings
        .iter()
        .filter(|h| !used.contains(&h.block_index))
        .map(|h| {
            Warning::at(
                WarningCode::UnreferencedHeading,
                h.block_index,
                format!("{} heading {:?} is not in the table of contents", h.kind, h.display_title),
            )
            .logged()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::MatchPass;
    use proptest::prelude::*;

    fn run_texts(texts: &[&str]) -> Result<Classification> {
        classify(
            &BlockStore::from_texts(texts.iter().copied()),
            &ClassifierConfig::default(),
        )
    }

    /// Every block index covered exactly once, in order.
    fn covered(result: &Classification) -> Vec<u32> {
        let mut indices: Vec<u32> = result.front_matter.paragraphs.iter().map(|b| b.index).collect();
        if let Some(toc) = &result.toc {
            indices.extend(toc.heading_block..=toc.last_block);
        }
        for chapter in &result.chapters {
            indices.extend(chapter.paragraphs.iter().map(|b| b.index));
        }
        indices.extend(result.back_matter.paragraphs.iter().map(|b| b.index));
        indices.sort_unstable();
        indices
    }

    #[test]
    fn test_exact_scenario() {
        let result = run_texts(&[
            "Table of Contents",
            "1. Arrival",
            "2. Departure",
            "Chapter 1 Arrival",
            "...",
            "Chapter 2: Departure",
            "...",
        ])
        .unwrap();
        assert!(result.matches.iter().all(|m| m.pass == MatchPass::Exact));
        let spans: Vec<_> = result
            .chapters
            .iter()
            .map(|c| (c.chapter_index, c.start_block, c.end_block))
            .collect();
        assert_eq!(spans, vec![(0, 3, 4), (1, 5, 6)]);
        assert!(result.warnings.is_empty());
        assert_eq!(covered(&result), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_ordinal_fallback_scenario() {
        let result = run_texts(&[
            "Contents",
            "1. Arrival\n2. Homecoming\n3. Miltary School",
            "Chapter 1: Arrival",
            "Text",
            "Chapter 2: Homecoming",
            "Text",
            "Chapter 3: Military School",
            "Text",
        ])
        .unwrap();
        assert_eq!(result.matches[2].pass, MatchPass::Ordinal);
        assert_eq!(result.matches[2].heading_block_index, 6);
    }

    #[test]
    fn test_no_toc_is_all_front_matter() {
        let result = run_texts(&["Chapter 1", "Once upon a time.", "Chapter 2"]).unwrap();
        assert!(result.toc.is_none());
        assert!(result.chapters.is_empty());
        assert_eq!(result.front_matter.paragraphs.len(), 3);
        assert_eq!(result.warnings[0].code, WarningCode::TocNotFound);
        assert_eq!(result.front_matter.warnings, result.warnings);
    }

    #[test]
    fn test_single_entry_toc_is_graceful() {
        let result = run_texts(&["Table of Contents", "1. Arrival", "Chapter 1 Arrival"]).unwrap();
        assert!(result.chapters.is_empty());
        assert_eq!(
            result.warnings.last().map(|w| w.code),
            Some(WarningCode::TocInsufficientEntries)
        );
    }

    #[test]
    fn test_multiple_headings_fail_closed() {
        let err = run_texts(&[
            "Contents",
            "1. Arrival\n2. Departure",
            "Chapter 1 Arrival\nChapter 2 Departure",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::MultipleHeadingsInBlock { block_index: 2 }));
    }

    #[test]
    fn test_non_monotonic_fails() {
        let err = run_texts(&[
            "Contents",
            "1. Arrival\n2. Departure",
            "Chapter 2: Departure",
            "Text",
            "Chapter 1: Arrival",
            "Text",
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            Error::NonMonotonicOrder { entry_index: 1, expected_after: 4, got: 2 }
        ));
    }

    #[test]
    fn test_unmatched_entry_fails() {
        let err = run_texts(&[
            "Contents",
            "Arrival\nThe Lighthouse",
            "Chapter 1: Arrival",
            "Text",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::UnmatchedTocEntry { entry_index: 1, .. }));
    }

    #[test]
    fn test_unreferenced_heading_stays_in_chapter() {
        let result = run_texts(&[
            "Contents",
            "1. Arrival\n2. Departure",
            "Chapter 1: Arrival",
            "Interlude text",
            "Chapter 5: A Dream",
            "Chapter 2: Departure",
        ])
        .unwrap();
        assert_eq!(result.chapters[0].end_block, 4);
        let warning = &result.warnings[0];
        assert_eq!(warning.code, WarningCode::UnreferencedHeading);
        assert_eq!(warning.block_index, Some(4));
    }

    #[test]
    fn test_heading_before_toc_never_matches() {
        let result = run_texts(&[
            "Prologue",
            "Contents",
            "Prologue\nChapter 1: Arrival",
            "Prologue",
            "Text",
            "Chapter 1: Arrival",
        ])
        .unwrap();
        assert_eq!(result.matches[0].heading_block_index, 3);
        assert_eq!(result.front_matter.paragraphs[0].index, 0);
        assert_eq!(covered(&result), (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_back_matter_warning_is_collected() {
        let result = run_texts(&[
            "Contents",
            "Prologue\nEpilogue",
            "Prologue",
            "Text",
            "Epilogue",
            "Text",
            "About the Author",
            "She lives in Maine.",
        ])
        .unwrap();
        assert_eq!(result.chapters[1].end_block, 5);
        assert_eq!(result.back_matter.span_blocks, Some([6, 7]));
        assert_eq!(
            result.warnings.last().map(|w| w.code),
            Some(WarningCode::BackMatterDetected)
        );
        assert!(result.front_matter.warnings.is_empty());
    }

    #[test]
    fn test_invalid_grammar() {
        let mut config = ClassifierConfig::default();
        config.grammar.chapter_keywords.clear();
        let err = classify(&BlockStore::default(), &config).unwrap_err();
        assert_eq!(err.kind(), "invalid_grammar");
    }

    const TITLES: &[&str] = &[
        "Arrival",
        "The Storm",
        "Departure",
        "Homecoming",
        "Military School",
        "The Long Road",
        "Winter",
        "Aftermath",
    ];

    fn book() -> impl Strategy<Value = Vec<String>> {
        (
            0usize..3,
            prop::collection::vec((0..TITLES.len(), 0usize..4), 2..8),
            any::<bool>(),
        )
            .prop_map(|(front, chapters, back)| {
                let mut texts: Vec<String> =
                    (0..front).map(|i| format!("Front page {i}")).collect();
                texts.push("Contents".into());
                texts.push(
                    chapters
                        .iter()
                        .enumerate()
                        .map(|(i, &(t, _))| format!("{}. {}", i + 1, TITLES[t]))
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
                for (i, &(t, body)) in chapters.iter().enumerate() {
                    texts.push(format!("Chapter {}: {}", i + 1, TITLES[t]));
                    texts.extend((0..body).map(|p| format!("Paragraph {p} of the chapter.")));
                }
                if back {
                    texts.push("Colophon".into());
                    texts.push("Set in Garamond.".into());
                }
                texts
            })
    }

    proptest! {
        #[test]
        fn prop_generated_books_classify(texts in book()) {
            let store = BlockStore::from_texts(texts.clone());
            let config = ClassifierConfig::default();
            let first = classify(&store, &config).unwrap();
            let second = classify(&store, &config).unwrap();
            prop_assert_eq!(&first, &second);

            let entries = first.toc.as_ref().map_or(0, |t| t.entries.len());
            prop_assert_eq!(first.chapters.len(), entries);
            prop_assert_eq!(covered(&first), (0..texts.len() as u32).collect::<Vec<_>>());
            for pair in first.chapters.windows(2) {
                prop_assert!(pair[0].end_block < pair[1].start_block);
                prop_assert_eq!(pair[0].end_block + 1, pair[1].start_block);
            }
            for (chapter, m) in first.chapters.iter().zip(&first.matches) {
                prop_assert_eq!(chapter.start_block, m.heading_block_index);
                prop_assert_eq!(chapter.paragraphs[0].index, chapter.start_block);
            }
        }
    }
}
