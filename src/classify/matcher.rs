//! Multi-pass alignment of TOC entries to body headings.
//!
//! Each entry, in TOC order, tries three passes and takes the first success:
//!
//! 1. **Exact**: equal normalized titles.
//! 2. **Ordinal**: equal chapter numbers, whatever the titles say.
//! 3. **Fuzzy**: a word-boundary title prefix, or a small edit distance.
//!
//! Candidates are tried in document order and a matched heading leaves the
//! pool. An entry that exhausts all three passes fails the whole run; there is
//! no looser fourth pass.

use crate::config::FuzzyConfig;
use crate::error::{Error, Result};
use crate::model::{HeadingCandidate, Match, MatchPass, TocEntry};
use crate::normalize::NormalizedTitle;

const PASSES: [MatchPass; 3] = [MatchPass::Exact, MatchPass::Ordinal, MatchPass::Fuzzy];

/// Match every TOC entry to exactly one unused heading.
pub fn match_entries(
    entries: &[TocEntry],
    headings: &[HeadingCandidate],
    fuzzy: &FuzzyConfig,
) -> Result<Vec<Match>> {
    let mut used = vec![false; headings.len()];
    let mut matches = Vec::with_capacity(entries.len());

    for (entry_index, entry) in entries.iter().enumerate() {
        let found = PASSES.iter().find_map(|&pass| {
            headings
                .iter()
                .enumerate()
                .find(|&(i, heading)| !used[i] && pass_accepts(pass, entry, heading, fuzzy))
                .map(|(i, _)| (i, pass))
        });

        let Some((candidate, pass)) = found else {
            log::error!(
                "table of contents entry {entry_index} ({:?}) matches no heading",
                entry.raw_text
            );
            return Err(Error::UnmatchedTocEntry {
                entry_index,
                entry_text: entry.raw_text.clone(),
            });
        };

        used[candidate] = true;
        let heading = &headings[candidate];
        log::debug!(
            "entry {entry_index} {:?} -> block {} ({pass})",
            entry.raw_text,
            heading.block_index
        );
        matches.push(Match {
            toc_entry_index: entry_index,
            heading_block_index: heading.block_index,
            pass,
        });
    }

    Ok(matches)
}

fn pass_accepts(
    pass: MatchPass,
    entry: &TocEntry,
    heading: &HeadingCandidate,
    fuzzy: &FuzzyConfig,
) -> bool {
    match pass {
        MatchPass::Exact => exact(entry, heading),
        MatchPass::Ordinal => ordinal(entry, heading),
        MatchPass::Fuzzy => fuzzy_title(entry, heading, fuzzy),
    }
}

/// Title equality only. TOC numbering often counts list positions rather than
/// chapter numbers, so the ordinals play no part here.
fn exact(entry: &TocEntry, heading: &HeadingCandidate) -> bool {
    !entry.normalized_title.is_empty()
        && entry.normalized_title.key() == heading.normalized_title.key()
}

fn ordinal(entry: &TocEntry, heading: &HeadingCandidate) -> bool {
    matches!((entry.ordinal, heading.ordinal), (Some(a), Some(b)) if a.same_value(&b))
}

fn fuzzy_title(entry: &TocEntry, heading: &HeadingCandidate, config: &FuzzyConfig) -> bool {
    titles_close(&entry.normalized_title, &heading.normalized_title, config)
}

/// Word-boundary prefix or bounded Levenshtein distance between two titles.
pub fn titles_close(a: &NormalizedTitle, b: &NormalizedTitle, config: &FuzzyConfig) -> bool {
    if a.key_chars().min(b.key_chars()) < config.min_chars {
        return false;
    }
    let (short, long) = if a.key().len() <= b.key().len() {
        (a.key(), b.key())
    } else {
        (b.key(), a.key())
    };
    let prefix = long
        .strip_prefix(short)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '));
    prefix || strsim::levenshtein(short, long) <= config.max_distance
}
