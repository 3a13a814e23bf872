//! 12-hour clock text ↔ minutes since midnight.

use crate::markup::leading_int;

const NOON: i64 = 12 * 60;

/// Parses `"10:00 am"` / `"1:20 pm"` into minutes since midnight.
///
/// A literal `pm` anywhere in the text adds 720 minutes; the hour is taken
/// modulo 12, so `"12:30 am"` is 30 and `"12:30 pm"` is 750.
#[must_use]
pub fn parse_clock(text: &str) -> Option<u16> {
    let lower = text.to_ascii_lowercase();
    let pm = lower.contains("pm");
    let stripped = lower.replace("pm", "").replace("am", "");
    let (hours, minutes) = stripped.split_whitespace().next()?.split_once(':')?;

    let hours = leading_int(hours)?;
    let minutes = leading_int(minutes)?;
    if hours < 0 || !(0..60).contains(&minutes) {
        return None;
    }

    let total = (hours % 12) * 60 + minutes + if pm { NOON } else { 0 };
    u16::try_from(total).ok()
}

/// Parses `"10:00 am - 11:20 am"` into `(start, end)`.
///
/// Returns `None` when the start is unusable. A missing or unparseable end
/// collapses to `end == start`.
#[must_use]
pub fn parse_clock_range(text: &str) -> Option<(u16, u16)> {
    let (left, right) = match text.split_once(" - ") {
        Some((left, right)) => (left, Some(right)),
        None => (text, None),
    };
    let start = parse_clock(left)?;
    let end = right.and_then(parse_clock).unwrap_or(start);
    Some((start, end))
}

/// Formats minutes since midnight as `"h:mm am"` / `"h:mm pm"`.
///
/// The output parses back to the same value with [`parse_clock`].
#[must_use]
pub fn format_clock(minute: u16) -> String {
    let hour = (minute / 60) % 24;
    let suffix = if hour >= 12 { "pm" } else { "am" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{:02} {suffix}", minute % 60)
}
