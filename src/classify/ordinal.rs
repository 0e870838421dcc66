//! Chapter number parsing: decimal and Roman numerals.

use crate::model::OrdinalValue;

const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Parse a decimal chapter number. Zero and values beyond `u32` are rejected.
pub fn parse_decimal(token: &str) -> Option<OrdinalValue> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = token.parse().ok()?;
    (value > 0).then(|| OrdinalValue::decimal(value))
}

/// Parse a Roman numeral, case-insensitively.
///
/// Only the canonical subtractive form is accepted, so `IIII` and `IC` are
/// rejected; the result is in `1..=3999`.
pub fn parse_roman(token: &str) -> Option<OrdinalValue> {
    if token.is_empty()
        || token.len() > 15
        || !token
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'i' | 'v' | 'x' | 'l' | 'c' | 'd' | 'm'))
    {
        return None;
    }
    let lower = token.to_ascii_lowercase();
    let mut rest = lower.as_str();
    let mut value = 0;
    for &(weight, symbol) in &ROMAN_TABLE {
        while let Some(tail) = rest.strip_prefix(symbol) {
            rest = tail;
            value += weight;
        }
    }
    if !rest.is_empty() || value == 0 || value > 3999 {
        return None;
    }
    // Only the canonical spelling of the value is accepted.
    to_roman(value)
        .eq_ignore_ascii_case(token)
        .then(|| OrdinalValue::roman(value))
}

/// Parse either notation, preferring decimal.
pub fn parse_ordinal(token: &str) -> Option<OrdinalValue> {
    parse_decimal(token).or_else(|| parse_roman(token))
}

/// Render a value as an uppercase Roman numeral.
pub fn to_roman(mut value: u32) -> String {
    let mut out = String::new();
    for &(weight, symbol) in &ROMAN_TABLE {
        while value >= weight {
            out.push_str(&symbol.to_ascii_uppercase());
            value -= weight;
        }
    }
    out
}
