//! Table of contents detection.
//!
//! Finds the first TOC heading and reads entries from a bounded window of the
//! blocks that follow it. The window is deliberately small: body text must
//! never be read as TOC entries.

use std::collections::BTreeSet;

use super::patterns::{
    BULLET_RE, CompiledGrammar, LEADER_PAGE_RE, PAGE_NUMBER_ONLY_RE, SENTENCE_END,
    collapse_whitespace, fold, split_numbered,
};
use crate::config::ClassifierConfig;
use crate::model::{BlockStore, OrdinalValue, TocEntry, TocWindow, Warning, WarningCode};
use crate::normalize::normalize;

/// Outcome of TOC detection. `window` is `None` when no usable TOC exists;
/// that is a valid state, not an error.
#[derive(Debug, Clone, Default)]
pub struct TocDetection {
    pub window: Option<TocWindow>,
    pub warnings: Vec<Warning>,
}

/// Key used to notice that the body has started repeating TOC entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum EntryKey {
    Ordinal(u32),
    Title(String),
}

impl EntryKey {
    /// Ordinal and title keys of an entry. Either one seen before means the
    /// entry repeats.
    fn of(entry: &TocEntry) -> impl Iterator<Item = Self> {
        let ordinal = entry.ordinal.map(|o| EntryKey::Ordinal(o.value));
        let title = (!entry.normalized_title.is_empty())
            .then(|| EntryKey::Title(entry.normalized_title.key().to_string()));
        ordinal.into_iter().chain(title)
    }
}

/// What one line of the window turned out to be.
enum LineOutcome {
    Entry(TocEntry),
    /// Removed as a bare page number.
    PageNumber,
    NotEntry,
}

/// Scan for a TOC heading and read its entries.
pub fn detect_toc(
    store: &BlockStore,
    grammar: &CompiledGrammar,
    config: &ClassifierConfig,
) -> TocDetection {
    let mut detection = TocDetection::default();

    let Some(heading) = store.iter().find(|b| grammar.is_toc_heading(&b.text)) else {
        detection.warnings.push(
            Warning::new(
                WarningCode::TocNotFound,
                "no table of contents heading found; no chapters detected",
            )
            .logged(),
        );
        return detection;
    };
    log::debug!("table of contents heading at block {}", heading.index);

    let window_end = (heading.index as usize)
        .saturating_add(config.toc_lookahead)
        .min(store.len().saturating_sub(1));

    let mut entries: Vec<TocEntry> = Vec::new();
    let mut seen: BTreeSet<EntryKey> = BTreeSet::new();
    let mut last_block = heading.index;

    for block in &store.blocks()[heading.index as usize + 1..=window_end] {
        let mut block_entries = Vec::new();
        let mut block_warnings = Vec::new();
        let mut only_page_numbers = true;

        for line in block.text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match read_entry_line(line, block.index, grammar, config, &mut block_warnings) {
                LineOutcome::Entry(entry) => {
                    only_page_numbers = false;
                    block_entries.push(entry);
                }
                LineOutcome::PageNumber => {}
                LineOutcome::NotEntry => {
                    only_page_numbers = false;
                }
            }
        }

        if block_entries.is_empty() {
            if only_page_numbers {
                // Stray page numbers neither extend nor end the window.
                detection
                    .warnings
                    .extend(block_warnings.into_iter().map(Warning::logged));
                continue;
            }
            log::debug!("table of contents window ends before block {}", block.index);
            break;
        }

        let repeats = block_entries
            .iter()
            .flat_map(EntryKey::of)
            .any(|key| seen.contains(&key));
        if repeats {
            log::debug!(
                "block {} repeats an earlier entry; body starts here",
                block.index
            );
            break;
        }

        seen.extend(block_entries.iter().flat_map(EntryKey::of));
        detection
            .warnings
            .extend(block_warnings.into_iter().map(Warning::logged));
        entries.extend(block_entries);
        last_block = block.index;
    }

    if entries.len() < config.min_toc_entries {
        detection.warnings.push(
            Warning::at(
                WarningCode::TocInsufficientEntries,
                heading.index,
                format!(
                    "table of contents has {} entries, fewer than the required {}; no chapters detected",
                    entries.len(),
                    config.min_toc_entries
                ),
            )
            .logged(),
        );
        return detection;
    }

    log::info!(
        "table of contents at blocks {}..={} with {} entries",
        heading.index,
        last_block,
        entries.len()
    );
    detection.window = Some(TocWindow {
        heading_block: heading.index,
        last_block,
        entries,
    });
    detection
}

/// Classify one non-empty, trimmed line of the TOC window.
fn read_entry_line(
    line: &str,
    block_index: u32,
    grammar: &CompiledGrammar,
    config: &ClassifierConfig,
    warnings: &mut Vec<Warning>,
) -> LineOutcome {
    if PAGE_NUMBER_ONLY_RE.is_match(&fold(line)) {
        warnings.push(Warning::at(
            WarningCode::PageNumberOnlyLineRemoved,
            block_index,
            format!("page-number-only line {line:?} removed"),
        ));
        return LineOutcome::PageNumber;
    }

    let raw = clean_leaders(line, block_index, warnings);
    if raw.chars().count() > config.max_entry_chars {
        return LineOutcome::NotEntry;
    }

    let mut folded = fold(&raw);
    let unbulleted = BULLET_RE
        .captures(&folded)
        .map(|caps| caps[1].trim().to_string());
    let bulleted = unbulleted.is_some();
    if let Some(rest) = unbulleted {
        folded = rest;
    }

    let (ordinal, title): (Option<OrdinalValue>, _) = if let Some(h) = grammar.match_line(&folded)
    {
        (h.ordinal, h.title)
    } else if let Some((ordinal, rest)) = split_numbered(&folded) {
        (Some(ordinal), normalize(rest))
    } else {
        // Unmarked lines that read like sentences are body text.
        if !bulleted && folded.ends_with(SENTENCE_END) {
            return LineOutcome::NotEntry;
        }
        (None, normalize(&folded))
    };

    if ordinal.is_none() && title.is_empty() {
        return LineOutcome::NotEntry;
    }

    LineOutcome::Entry(TocEntry {
        raw_text: raw,
        normalized_title: title,
        ordinal,
        block_index,
    })
}

/// Strip dot leaders and a trailing page number, warning when anything changed.
fn clean_leaders(line: &str, block_index: u32, warnings: &mut Vec<Warning>) -> String {
    let cleaned = LEADER_PAGE_RE.captures(line).and_then(|caps| {
        let leaders = caps.get(2).is_some_and(|m| !m.as_str().trim().is_empty());
        let page = caps.get(3).map(|m| m.as_str());
        let roman_page = page.is_some_and(|p| !p.bytes().all(|b| b.is_ascii_digit()));
        let cleaned = leaders || (page.is_some() && !roman_page);
        cleaned.then(|| caps[1].to_string())
    });

    match cleaned {
        Some(title) => {
            warnings.push(Warning::at(
                WarningCode::MixedLineCleaned,
                block_index,
                format!("page reference removed from {line:?}"),
            ));
            collapse_whitespace(&title)
        }
        None => collapse_whitespace(line),
    }
}
