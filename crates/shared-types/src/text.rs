//! Text canonicalization for rule matching

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A word broken across a line end with a trailing hyphen
    static ref HYPHEN_BREAK: Regex = Regex::new(r"(\w)-[ \t]*\r?\n\s*(\w)").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonicalize raw extracted text for regex detectors.
///
/// Joins hyphenated line breaks, collapses every whitespace run (newlines
/// included) into one space, trims and lowercases. Empty input yields an
/// empty string.
pub fn normalize_for_rules(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let joined = HYPHEN_BREAK.replace_all(raw, "${1}${2}");
    let collapsed = WHITESPACE_RUN.replace_all(&joined, " ");
    collapsed.trim().to_lowercase()
}

/// Collapse whitespace runs but keep the original casing.
pub fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw, " ").trim().to_string()
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Byte window of `radius` characters on each side of `start..end`.
pub fn char_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    if radius == 0 {
        return &text[start..end];
    }
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(radius - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(idx, _)| end + idx)
        .unwrap_or(text.len());
    &text[from..to]
}
