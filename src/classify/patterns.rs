//! Heading and TOC line patterns.
//!
//! Fixed patterns use LazyLock to compile once on first use. Keyword patterns
//! depend on the configured [`Grammar`] and are compiled into a
//! [`CompiledGrammar`] once per run.
//!
//! All patterns run against folded text (NFKC + lowercase), so they are
//! written in lowercase and need no case-insensitive flag.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex_lite::Regex;
use unicode_normalization::UnicodeNormalization;

use super::ordinal::{parse_decimal, parse_ordinal};
use crate::config::Grammar;
use crate::error::{Error, Result};
use crate::model::{HeadingKind, OrdinalValue};
use crate::normalize::{NormalizedTitle, normalize, normalize_key};

// === TOC line patterns ===

/// A line holding nothing but a page number ("12", "page 12", "p. 12").
pub static PAGE_NUMBER_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:page\s+|p\.\s*)?[0-9]+$").unwrap());

/// Title, then dot leaders / a tab / a wide gap, then an optional page number.
/// Runs on the original line so the cleaned title keeps its case.
pub static LEADER_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?\S)((?:\s*[.…·_]){2,}\s*|\s*\t\s*|\s{2,})([0-9]+|[ivxlcdmIVXLCDM]+)?\s*$").unwrap()
});

/// A bulleted line.
pub static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•·–—]\s+(.*)$").unwrap());

/// A numbered line with punctuation after the numeral ("3.", "iv)", "12:").
pub static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+|[ivxlcdm]+)\s*[.):]\s*(.*)$").unwrap());

/// A decimal number followed by whitespace ("3 Arrival").
pub static NUMBERED_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s+(.*)$").unwrap());

/// Characters that end a line reading as a sentence.
pub const SENTENCE_END: [char; 5] = ['.', '!', '?', '"', '\u{201D}'];

/// Punctuation that sets a heading's title off from its keyword or ordinal.
const TITLE_SEPARATORS: [char; 6] = [':', '.', '-', '\u{2013}', '\u{2014}', ')'];

/// Fold a line for pattern matching: NFKC, lowercase, trimmed.
pub fn fold(line: &str) -> String {
    line.nfkc()
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Collapse runs of whitespace in `text` to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Compiled grammar
// ============================================================================

/// A line recognized by the heading grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHeading {
    pub kind: HeadingKind,
    pub ordinal: Option<OrdinalValue>,
    /// Comparison title: the residual title for chapters, the whole line for
    /// prologues and epilogues.
    pub title: NormalizedTitle,
    /// Folded text following the keyword (and ordinal), trimmed.
    pub residual: String,
}

/// Immutable, per-run compilation of a [`Grammar`].
#[derive(Debug)]
pub struct CompiledGrammar {
    chapter: Regex,
    prologue: Regex,
    epilogue: Regex,
    toc_headings: BTreeSet<String>,
    max_heading_chars: usize,
}

impl CompiledGrammar {
    pub fn new(grammar: &Grammar) -> Result<Self> {
        let toc_headings: BTreeSet<String> = grammar
            .toc_headings
            .iter()
            .map(|phrase| normalize_key(phrase))
            .filter(|key| !key.is_empty())
            .collect();
        if toc_headings.is_empty() {
            return Err(Error::invalid_grammar("no usable table of contents heading"));
        }

        let chapter = keyword_alternation("chapter_keywords", &grammar.chapter_keywords)?;
        let prologue = keyword_alternation("prologue_keywords", &grammar.prologue_keywords)?;
        let epilogue = keyword_alternation("epilogue_keywords", &grammar.epilogue_keywords)?;

        Ok(Self {
            chapter: compile(&format!(
                r"^(?:{chapter})\.?\s+([0-9]+|[ivxlcdm]+)(?:$|([^a-z0-9])(.*)$)"
            ))?,
            prologue: compile(&format!(r"^(?:{prologue})(?:$|([^a-z0-9])(.*)$)"))?,
            epilogue: compile(&format!(r"^(?:{epilogue})(?:$|([^a-z0-9])(.*)$)"))?,
            toc_headings,
            max_heading_chars: grammar.max_heading_chars,
        })
    }

    /// Whether a whole block is a table of contents heading.
    pub fn is_toc_heading(&self, text: &str) -> bool {
        self.toc_headings.contains(&normalize_key(text))
    }

    /// Match one line against the heading grammar.
    ///
    /// A line that runs straight from the keyword into sentence text ("Chapter 1
    /// ended badly, she said.") is prose, not a heading.
    pub fn match_line(&self, line: &str) -> Option<LineHeading> {
        let line = line.trim();
        if line.is_empty() || line.chars().count() > self.max_heading_chars {
            return None;
        }
        let folded = fold(line);

        if let Some(caps) = self.chapter.captures(&folded) {
            let ordinal = parse_ordinal(&caps[1])?;
            let (separator, residual) = tail(caps.get(2), caps.get(3));
            if reads_as_prose(separator, &residual) {
                return None;
            }
            return Some(LineHeading {
                kind: HeadingKind::Chapter,
                ordinal: Some(ordinal),
                title: normalize(&residual),
                residual,
            });
        }

        for (kind, re) in [
            (HeadingKind::Prologue, &self.prologue),
            (HeadingKind::Epilogue, &self.epilogue),
        ] {
            if let Some(caps) = re.captures(&folded) {
                let (separator, residual) = tail(caps.get(1), caps.get(2));
                if reads_as_prose(separator, &residual) {
                    return None;
                }
                return Some(LineHeading {
                    kind,
                    ordinal: None,
                    title: normalize(&folded),
                    residual,
                });
            }
        }

        None
    }

    /// Whether the text after a heading's keyword holds a second numbered
    /// chapter heading, at its start or at any later word. A bare prologue or
    /// epilogue keyword there is just part of the title.
    pub fn residual_is_heading(&self, heading: &LineHeading) -> bool {
        let rest = heading.residual.as_str();
        word_starts(rest).any(|i| self.is_chapter_at(&rest[i..]))
    }

    fn is_chapter_at(&self, text: &str) -> bool {
        self.chapter
            .captures(text)
            .and_then(|caps| parse_ordinal(caps.get(1)?.as_str()))
            .is_some()
    }
}

/// Separator character and trimmed title text after a keyword match.
fn tail<'a>(
    separator: Option<regex_lite::Match<'a>>,
    rest: Option<regex_lite::Match<'a>>,
) -> (&'a str, String) {
    (
        separator.map_or("", |m| m.as_str()),
        rest.map_or("", |m| m.as_str()).trim().to_string(),
    )
}

/// No title separator after the keyword, and the text ends like a sentence.
fn reads_as_prose(separator: &str, residual: &str) -> bool {
    let separated =
        separator.starts_with(TITLE_SEPARATORS) || residual.starts_with(TITLE_SEPARATORS);
    !separated && residual.ends_with(SENTENCE_END)
}

/// Byte offsets where a word starts.
fn word_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices()
        .filter(|&(i, c)| {
            c.is_alphanumeric()
                && text[..i]
                    .chars()
                    .next_back()
                    .is_none_or(|prev| !prev.is_alphanumeric())
        })
        .map(|(i, _)| i)
}

fn keyword_alternation(field: &str, keywords: &[String]) -> Result<String> {
    let folded: Vec<String> = keywords
        .iter()
        .map(|k| fold(k))
        .filter(|k| !k.is_empty())
        .map(|k| regex_lite::escape(&k))
        .collect();
    if folded.is_empty() {
        return Err(Error::invalid_grammar(format!("{field} is empty")));
    }
    Ok(folded.join("|"))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::invalid_grammar(e.to_string()))
}

/// Leading numeral of a TOC line, returning the ordinal and the remaining title.
///
/// Roman numerals need trailing punctuation ("IV. Title"); a bare decimal may be
/// followed by whitespace alone.
pub fn split_numbered(folded: &str) -> Option<(OrdinalValue, &str)> {
    if let Some(caps) = NUMBERED_RE.captures(folded) {
        let ordinal = parse_ordinal(caps.get(1)?.as_str())?;
        return Some((ordinal, caps.get(2).map_or("", |m| m.as_str())));
    }
    let caps = NUMBERED_BARE_RE.captures(folded)?;
    let ordinal = parse_decimal(caps.get(1)?.as_str())?;
    Some((ordinal, caps.get(2).map_or("", |m| m.as_str())))
}
