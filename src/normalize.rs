//! Title normalization shared by the TOC and body sides of matching.
//!
//! Both sides go through the same function so that comparisons are
//! symmetric: `"Chapter 3: Military School"` and `"Chapter 3 - Military School"`
//! normalize identically.
//!
//! ```
//! use bookseg::normalize::normalize;
//!
//! let a = normalize("Chapter 3: Military School");
//! let b = normalize("CHAPTER 3 – Military  School");
//! assert_eq!(a, b);
//! assert_eq!(a.text(), "chapter 3 : military school");
//! assert_eq!(a.key(), "chapter 3 military school");
//! ```

use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Canonical rendering of a title separator inside [`NormalizedTitle::text`].
pub const SEPARATOR_TOKEN: &str = ":";

/// A lowercase, whitespace-collapsed, punctuation-insensitive title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedTitle {
    text: String,
    key: String,
}

impl NormalizedTitle {
    /// Display form, keeping a canonical separator token where the source had one.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Comparison form: the words only.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    pub fn has_separator(&self) -> bool {
        self.text.len() != self.key.len()
    }

    /// Number of characters in the comparison key.
    pub fn key_chars(&self) -> usize {
        self.key.chars().count()
    }
}

impl fmt::Display for NormalizedTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Characters that act as a title separator when they stand apart from a word.
fn is_separator_char(c: char) -> bool {
    matches!(c, ':' | '-' | '\u{2013}' | '\u{2014}')
}

/// Characters dropped without breaking the surrounding word (`don't`, `well-known`).
fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

/// Normalize `text` into a [`NormalizedTitle`].
///
/// Applies NFKC, folds case, collapses whitespace, drops punctuation and
/// replaces a free-standing `:`/`-` (or one that ends a word, as in `3:`)
/// and any en or em dash with [`SEPARATOR_TOKEN`]. Leading and trailing separators are dropped.
pub fn normalize(text: &str) -> NormalizedTitle {
    let chars: Vec<char> = text.nfkc().flat_map(char::to_lowercase).collect();

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut pending_separator = false;

    let flush = |current: &mut String, words: &mut Vec<String>, pending: &mut bool| {
        if current.is_empty() {
            return;
        }
        if *pending && !words.is_empty() {
            words.push(SEPARATOR_TOKEN.to_string());
        }
        *pending = false;
        words.push(std::mem::take(current));
    };

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            current.push(c);
            continue;
        }

        if is_separator_char(c) {
            let detached_before = i == 0 || !chars[i - 1].is_alphanumeric();
            let after_ws = i + 1 == chars.len() || chars[i + 1].is_whitespace();
            let long_dash = matches!(c, '\u{2013}' | '\u{2014}');
            if detached_before || after_ws || long_dash {
                flush(&mut current, &mut words, &mut pending_separator);
                pending_separator = true;
                continue;
            }
        }

        if is_joiner(c) && !current.is_empty() {
            continue;
        }

        // Whitespace and any other punctuation break words.
        flush(&mut current, &mut words, &mut pending_separator);
    }
    flush(&mut current, &mut words, &mut pending_separator);

    let key = words
        .iter()
        .filter(|w| w.as_str() != SEPARATOR_TOKEN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let text = words.join(" ");

    NormalizedTitle { text, key }
}

/// Shorthand for `normalize(text).key()` as an owned string.
pub fn normalize_key(text: &str) -> String {
    normalize(text).key
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_separators_are_canonical() {
        let colon = normalize("Chapter 3: Military School");
        let dash = normalize("Chapter 3 - Military School");
        let en_dash = normalize("Chapter 3 \u{2013} Military School");
        let em_dash = normalize("Chapter 3\u{2014}Military School");
        assert_eq!(colon, dash);
        assert_eq!(colon, en_dash);
        assert_eq!(colon, em_dash);
        assert!(colon.has_separator());
    }

    #[test]
    fn test_intra_word_hyphen_joins() {
        assert_eq!(normalize("A Well-Known Story").text(), "a wellknown story");
        assert!(!normalize("A Well-Known Story").has_separator());
    }

    #[test]
    fn test_punctuation_and_case_insensitive() {
        assert_eq!(normalize("  \"Don't  Panic!\" ").key(), "dont panic");
        assert_eq!(normalize("DON\u{2019}T PANIC").key(), "dont panic");
    }

    #[test]
    fn test_leading_and_trailing_separators_dropped() {
        let title = normalize(": Arrival -");
        assert_eq!(title.text(), "arrival");
        assert!(!title.has_separator());
    }

    #[test]
    fn test_nfkc_folds_compatibility_forms() {
        // Fullwidth letters and the "fi" ligature
        assert_eq!(normalize("\u{FF21}rrival").key(), "arrival");
        assert_eq!(normalize("\u{FB01}nal").key(), "final");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(normalize("").is_empty());
        assert!(normalize("...").is_empty());
        assert!(normalize(" - ").is_empty());
    }

    #[test]
    fn test_consecutive_separators_collapse() {
        assert_eq!(normalize("Part One : - The End").text(), "part one : the end");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent_on_key(s in "[A-Za-z0-9 :,.!'\\-\u{2013}\u{2019}]{0,40}") {
            let once = normalize(&s);
            let twice = normalize(once.key());
            prop_assert_eq!(once.key(), twice.key());
        }

        #[test]
        fn prop_separator_choice_does_not_matter(
            head in "[A-Za-z]{1,10}( [A-Za-z0-9]{1,6}){0,2}",
            tail in "[A-Za-z]{1,10}( [A-Za-z]{1,8}){0,2}",
        ) {
            let colon = normalize(&format!("{head}: {tail}"));
            let dash = normalize(&format!("{head} - {tail}"));
            let en_dash = normalize(&format!("{head} \u{2013} {tail}"));
            prop_assert_eq!(&colon, &dash);
            prop_assert_eq!(&colon, &en_dash);
        }

        #[test]
        fn prop_key_has_no_double_spaces(s in "\\PC{0,40}") {
            let title = normalize(&s);
            prop_assert!(!title.key().contains("  "));
            prop_assert_eq!(title.key().trim(), title.key());
        }
    }
}
