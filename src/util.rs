//! Byte-level helpers for reading block files.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. Falls back to Windows-1252 (common in older extraction dumps)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8 without a BOM.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Iterate over the lines of `text`, yielding `(line_number, line)` with
/// 1-based line numbers. A trailing `\r` is stripped from each line.
pub fn lines_numbered(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut number = 0;
    std::iter::from_fn(move || {
        if start > bytes.len() || (start == bytes.len() && start != 0) {
            return None;
        }
        if bytes.is_empty() {
            start = 1;
            return None;
        }
        let end = memchr::memchr(b'\n', &bytes[start..])
            .map(|offset| start + offset)
            .unwrap_or(bytes.len());
        // Both boundaries sit on ASCII bytes, so slicing stays on char boundaries.
        let line = &text[start..end];
        start = end + 1;
        number += 1;
        Some((number, line.strip_suffix('\r').unwrap_or(line)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_strips_bom() {
        let bytes = b"\xEF\xBB\xBF{\"index\":0}";
        assert_eq!(decode_text(bytes), "{\"index\":0}");
    }

    #[test]
    fn test_decode_text_falls_back_to_cp1252() {
        // 0x93 / 0x94 are curly quotes in Windows-1252 and invalid UTF-8
        let bytes = b"\x93Hi\x94";
        assert_eq!(decode_text(bytes), "\u{201C}Hi\u{201D}");
    }

    #[test]
    fn test_lines_numbered() {
        let lines: Vec<_> = lines_numbered("a\r\nb\n\nc").collect();
        assert_eq!(lines, vec![(1, "a"), (2, "b"), (3, ""), (4, "c")]);
    }

    #[test]
    fn test_lines_numbered_trailing_newline() {
        let lines: Vec<_> = lines_numbered("a\nb\n").collect();
        assert_eq!(lines, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn test_lines_numbered_empty() {
        assert_eq!(lines_numbered("").count(), 0);
    }
}
