//! Meeting-time sub-table extraction.

use chrono::NaiveDate;
use coursesched_core::{MarkerProfile, MeetingTime};

use crate::clock::parse_clock_range;
use crate::error::ParseMismatch;
use crate::markup::{before_ci, find_ci, fragment_text, split_ci};

const DATE_FORMATS: [&str; 4] = ["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

// Cell positions within one meeting row; position 0 is the row type.
const TIME_CELL: usize = 1;
const DAY_CELL: usize = 2;
const LOCATION_CELL: usize = 3;
const DATES_CELL: usize = 4;
const SCHEDULE_TYPE_CELL: usize = 5;
const INSTRUCTOR_CELL: usize = 6;

/// Extracts the meeting times of one section block, in table order.
///
/// A block without the meeting caption has no meeting times, which is valid
/// (thesis and project sections have none).
#[must_use]
pub fn extract_times(block: &str, profile: &MarkerProfile) -> Vec<MeetingTime> {
    let mut mismatches = Vec::new();
    extract_times_tracked(block, 0, profile, &mut mismatches)
}

/// [`extract_times`], recording every defaulted clock or date cell.
pub(crate) fn extract_times_tracked(
    block: &str,
    block_index: usize,
    profile: &MarkerProfile,
    mismatches: &mut Vec<ParseMismatch>,
) -> Vec<MeetingTime> {
    let Some(caption) = find_ci(block, &profile.meeting_caption, 0) else {
        return Vec::new();
    };
    let table = before_ci(&block[caption..], &profile.meeting_table_end);

    split_ci(table, &profile.meeting_row_separator)
        .into_iter()
        .skip(1)
        .filter(|row| find_ci(row, "<td", 0).is_some())
        .enumerate()
        .map(|(row_index, row)| {
            let cells = row_cells(row);
            let cell = |i: usize| cells.get(i).map_or("", String::as_str);
            let mut time = MeetingTime::default();

            let clock_text = cell(TIME_CELL);
            match parse_clock_range(clock_text) {
                Some((start, end)) => {
                    time.start_minute = start;
                    time.end_minute = end;
                }
                None if is_unscheduled(clock_text) => {}
                None => mismatches.push(ParseMismatch::MeetingClock {
                    block: block_index,
                    row: row_index,
                }),
            }

            let day = cell(DAY_CELL);
            if !is_unscheduled(day) {
                time.day = day.to_string();
            }

            let dates_text = cell(DATES_CELL);
            let (start_date, end_date) = parse_date_range(dates_text);
            if (start_date.is_none() || end_date.is_none()) && !is_unscheduled(dates_text) {
                mismatches.push(ParseMismatch::MeetingDates {
                    block: block_index,
                    row: row_index,
                });
            }
            time.start_date = start_date;
            time.end_date = end_date;

            set_if_present(&mut time.location, cell(LOCATION_CELL));
            set_if_present(&mut time.schedule_type, cell(SCHEDULE_TYPE_CELL));
            set_if_present(&mut time.instructor, cell(INSTRUCTOR_CELL));
            time
        })
        .collect()
}

/// Visible text of each `<td>` cell of a row.
fn row_cells(row: &str) -> Vec<String> {
    split_ci(row, "<td")
        .into_iter()
        .skip(1)
        .map(|cell| {
            let content = cell.split_once('>').map_or("", |(_, rest)| rest);
            fragment_text(before_ci(content, "</td"))
        })
        .collect()
}

fn is_unscheduled(text: &str) -> bool {
    text.is_empty() || text.eq_ignore_ascii_case("TBA")
}

fn set_if_present(field: &mut String, value: &str) {
    if !value.is_empty() {
        *field = value.to_string();
    }
}

fn parse_date_range(text: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match text.split_once(" - ") {
        Some((start, end)) => (parse_date(start), parse_date(end)),
        None => (parse_date(text), None),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}
