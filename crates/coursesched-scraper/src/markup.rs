//! Marker-driven text primitives shared by every extractor.
//!
//! Upstream pages are never parsed into a tree. They are treated as text and
//! sliced around literal markers, matched ASCII case-insensitively. Offsets
//! returned here always fall on UTF-8 boundaries because a match of a whole
//! needle can only start where the needle's first byte can start.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid newline regex"));

/// Byte offset of the first case-insensitive match of `needle` at or after `from`.
#[must_use]
pub fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || from > hay.len() || pat.len() > hay.len() - from {
        return None;
    }
    (from..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

/// Byte offset of the last case-insensitive match of `needle`.
#[must_use]
pub fn rfind_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len())
        .rev()
        .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

#[must_use]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle, 0).is_some()
}

/// Splits on every case-insensitive occurrence of `separator`.
///
/// Like `str::split`, a leading or trailing separator produces an empty piece.
#[must_use]
pub fn split_ci<'a>(haystack: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    while let Some(pos) = find_ci(haystack, separator, start) {
        pieces.push(&haystack[start..pos]);
        start = pos + separator.len();
    }
    pieces.push(&haystack[start..]);
    pieces
}

/// Everything before the first case-insensitive occurrence of `separator`,
/// or the whole input when it does not occur.
#[must_use]
pub fn before_ci<'a>(haystack: &'a str, separator: &str) -> &'a str {
    find_ci(haystack, separator, 0).map_or(haystack, |pos| &haystack[..pos])
}

/// Everything after the first case-insensitive occurrence of `separator`.
#[must_use]
pub fn after_ci<'a>(haystack: &'a str, separator: &str) -> Option<&'a str> {
    find_ci(haystack, separator, 0).map(|pos| &haystack[pos + separator.len()..])
}

/// Replaces every case-insensitive occurrence of `needle`.
#[must_use]
pub fn replace_ci(haystack: &str, needle: &str, replacement: &str) -> String {
    split_ci(haystack, needle).join(replacement)
}

/// Replaces each run of tags with a newline and collapses repeated newlines,
/// giving one line per text node.
#[must_use]
pub fn strip_tags_to_lines(html: &str) -> String {
    let lines = TAG_RUN.replace_all(html, "\n");
    BLANK_RUN.replace_all(&lines, "\n").into_owned()
}

/// Visible text of a markup fragment: tags dropped, entities normalized,
/// whitespace collapsed to single spaces.
#[must_use]
pub fn fragment_text(fragment: &str) -> String {
    let without_tags = TAG_RUN.replace_all(fragment, " ");
    normalize_entities(&without_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes the handful of entities the upstream pages use.
#[must_use]
pub fn normalize_entities(text: &str) -> String {
    text.replace("&#160;", " ")
        .replace("&nbsp;", " ")
        .replace("&#8211;", "-")
        .replace("&ndash;", "-")
        .replace("&amp;", "&")
}

/// Value of attribute `name` inside a tag, accepting double or single quotes.
///
/// Returns `None` when the attribute is absent or its quote is unterminated.
#[must_use]
pub fn extract_attribute(tag: &str, name: &str) -> Option<String> {
    let bytes = tag.as_bytes();
    let mut from = 0;
    while let Some(pos) = find_ci(tag, name, from) {
        from = pos + 1;

        let boundary_before = pos == 0
            || matches!(bytes[pos - 1], b' ' | b'\t' | b'\n' | b'\r' | b'<' | b'"' | b'\'');
        if !boundary_before {
            continue;
        }

        let mut i = pos + name.len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let Some(&quote) = bytes.get(i) else {
            return None;
        };
        if quote != b'"' && quote != b'\'' {
            continue;
        }
        let value_start = i + 1;
        return tag[value_start..]
            .find(char::from(quote))
            .map(|len| tag[value_start..value_start + len].to_string());
    }
    None
}

/// Leading signed integer of `text` after leading whitespace, ignoring
/// anything that follows (`"15 seats"` → 15, `"-3"` → -3, `"abc"` → `None`).
#[must_use]
pub fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
