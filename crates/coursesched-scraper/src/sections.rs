//! Section search: form submission and per-section block extraction.
//!
//! The search response is one large table. Each section starts at a header
//! row; everything up to the next header row is that section's block. Fields
//! are read from a block by literal markers, and any field that cannot be
//! read keeps its placeholder value so no block is ever dropped.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use coursesched_core::{MarkerProfile, MarkerRule, Section};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::error::ParseMismatch;
use crate::fetch::Fetcher;
use crate::markup::{before_ci, contains_ci, find_ci, fragment_text, leading_int, replace_ci, split_ci};
use crate::meeting_times::extract_times_tracked;

/// Stands in for the markup that precedes a campus name.
const LOCATION_SENTINEL: &str = "L\u{0}";
/// Stands in for the attribute shared by seat cells.
const CELL_SENTINEL: &str = "@\u{0}";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static ABBREVIATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<abbr\b[^>]*>\s*(P|TBA)\s*</abbr>").expect("valid abbreviation regex")
});

/// Term, subject and course code identifying one section search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionQuery {
    pub term: String,
    pub subject: String,
    pub code: String,
}

impl SectionQuery {
    #[must_use]
    pub fn new(term: &str, subject: &str, code: &str) -> Self {
        Self {
            term: term.to_string(),
            subject: subject.to_string(),
            code: code.to_string(),
        }
    }

    /// Copy with the term reduced to digits, the subject to letters and the
    /// code to letters and digits.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let keep = |text: &str, allowed: fn(&char) -> bool| -> String {
            text.chars().filter(allowed).collect()
        };
        Self {
            term: keep(&self.term, char::is_ascii_digit),
            subject: keep(&self.subject, char::is_ascii_alphabetic),
            code: keep(&self.code, char::is_ascii_alphanumeric),
        }
    }

    /// The `application/x-www-form-urlencoded` body the search endpoint expects.
    ///
    /// Every filter other than term, subject and code is wildcarded. The
    /// `dummy` fields and the field order are part of the endpoint contract.
    #[must_use]
    pub fn form_body(&self) -> String {
        let term = utf8_percent_encode(&self.term, COMPONENT);
        let subject = utf8_percent_encode(&self.subject, COMPONENT);
        let code = utf8_percent_encode(&self.code, COMPONENT);
        format!(
            "TRM=U&term_in={term}\
             &sel_subj=dummy&sel_day=dummy&sel_schd=dummy&sel_insm=dummy&sel_camp=dummy\
             &sel_levl=dummy&sel_sess=dummy&sel_instr=dummy&sel_ptrm=dummy&sel_attr=dummy\
             &sel_subj={subject}&sel_crse={code}&sel_title=&sel_schd=%25&sel_insm=%25\
             &sel_from_cred=&sel_to_cred=&sel_camp=%25\
             &begin_hh=0&begin_mi=0&begin_ap=a&end_hh=0&end_mi=0&end_ap=a"
        )
    }
}

/// Sections extracted from one search response, plus every field that had to
/// fall back to its placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionParse {
    pub sections: Vec<Section>,
    pub mismatches: Vec<ParseMismatch>,
}

/// Extracts every section from a search response, in upstream order.
///
/// A body without the data-table marker (including an `"Error: ..."` body
/// from the fetcher) yields an empty result.
#[must_use]
pub fn parse_sections(
    html: &str,
    term: &str,
    profile: &MarkerProfile,
    fetched_at: DateTime<Utc>,
) -> SectionParse {
    let html = html.replace("\r\n", "\n");
    let Some(start) = find_ci(&html, &profile.data_table_marker, 0) else {
        tracing::debug!(term, bytes = html.len(), "no section table in search response");
        return SectionParse::default();
    };

    let payload = ABBREVIATION.replace_all(&html[start..], "$1");
    let payload = replace_ci(&payload, &profile.location_source, LOCATION_SENTINEL);
    let payload = replace_ci(&payload, &profile.capacity_source, CELL_SENTINEL);

    let mut parse = SectionParse::default();
    for (index, block) in split_ci(&payload, &profile.header_row_marker)
        .into_iter()
        .skip(1)
        .enumerate()
    {
        let section = parse_block(block, index, term, profile, fetched_at, &mut parse.mismatches);
        parse.sections.push(section);
    }
    parse
}

fn parse_block(
    block: &str,
    index: usize,
    term: &str,
    profile: &MarkerProfile,
    fetched_at: DateTime<Utc>,
    mismatches: &mut Vec<ParseMismatch>,
) -> Section {
    let mut section = Section::placeholder(term, fetched_at);

    match parse_header(block, profile) {
        Some(identity) => {
            section.crn = identity.crn;
            section.title = identity.title;
            section.subject = identity.subject;
            section.code = identity.code;
        }
        None => mismatches.push(ParseMismatch::SectionHeader { block: index }),
    }

    let field = |needle: &str| format!("{}{needle}", profile.field_prefix);
    let location = |needle: &str| format!("{LOCATION_SENTINEL}{needle}");
    if let Some(value) = first_match(block, &profile.schedule_types, &field) {
        section.schedule_type = value;
    }
    if let Some(value) = first_match(block, &profile.campuses, &location) {
        section.campus = value;
    }
    if let Some(value) = first_match(block, &profile.instruction_methods, &field) {
        section.instruction_method = value;
    }

    match remaining_seats(block, profile.capacity_cell_index) {
        Some(seats) => section.remaining_seats = seats,
        None => mismatches.push(ParseMismatch::RemainingSeats { block: index }),
    }

    if contains_ci(block, &profile.linked_sections_marker) {
        section.linked_sections = split_ci(block, &profile.linked_crn_token)
            .into_iter()
            .skip(1)
            .filter_map(|part| part.split(' ').next())
            .filter_map(|token| leading_int(token).and_then(|n| u32::try_from(n).ok()))
            .collect();
    }

    section.times = extract_times_tracked(block, index, profile, mismatches);
    if let Some(first) = section.times.first() {
        section.instructor.clone_from(&first.instructor);
        section.location.clone_from(&first.location);
    }

    section
}

struct HeaderIdentity {
    crn: u32,
    title: String,
    subject: String,
    code: String,
}

/// Reads `"Title - CRN - SUBJ CODE - SEQ"`, counting segments from the right
/// so dashes inside the title do not shift the identity fields.
fn parse_header(block: &str, profile: &MarkerProfile) -> Option<HeaderIdentity> {
    let layout = &profile.header;
    let (_, rest) = block.split_once('>')?;
    let text = fragment_text(before_ci(rest, "</th"));

    let segments: Vec<&str> = text.split(layout.delimiter.as_str()).collect();
    let identity_span = layout.crn_from_end.max(layout.course_from_end);
    if segments.len() <= identity_span {
        return None;
    }

    let crn_segment = segments[segments.len() - layout.crn_from_end].trim();
    let crn = crn_segment.parse::<u32>().ok()?;

    let mut course = segments[segments.len() - layout.course_from_end].split_whitespace();
    let (Some(subject), Some(code), None) = (course.next(), course.next(), course.next()) else {
        return None;
    };

    let title = segments[..segments.len() - identity_span]
        .join(&layout.delimiter)
        .trim()
        .to_string();
    if title.is_empty() {
        return None;
    }

    Some(HeaderIdentity {
        crn,
        title,
        subject: subject.to_string(),
        code: code.to_string(),
    })
}

/// Value of the first rule, in table order, whose marker occurs in the block.
fn first_match<T: Copy>(
    block: &str,
    rules: &[MarkerRule<T>],
    marker: impl Fn(&str) -> String,
) -> Option<T> {
    rules
        .iter()
        .find(|rule| contains_ci(block, &marker(&rule.needle)))
        .map(|rule| rule.value)
}

fn remaining_seats(block: &str, cell_index: usize) -> Option<i32> {
    let cell = block.splitn(5, CELL_SENTINEL).nth(cell_index)?;
    let text = cell.split('<').next().unwrap_or_default().replace('>', "");
    leading_int(&text).and_then(|n| i32::try_from(n).ok())
}

/// Submits section searches to the registration system.
#[derive(Debug, Clone)]
pub struct SectionSearch {
    fetcher: Fetcher,
    profile: Arc<MarkerProfile>,
    host: String,
}

impl SectionSearch {
    #[must_use]
    pub fn new(fetcher: Fetcher, profile: Arc<MarkerProfile>, host: &str) -> Self {
        Self {
            fetcher,
            profile,
            host: host.to_string(),
        }
    }

    /// Searches one course and returns the sections with their mismatches.
    ///
    /// The query is sanitized before it is sent. Transport failures and
    /// unexpected markup both degrade to fewer (possibly zero) sections.
    pub async fn search(&self, query: &SectionQuery) -> SectionParse {
        let query = query.sanitized();
        let body = self
            .fetcher
            .post_form(&self.host, &self.profile.section_search_path, &query.form_body())
            .await;

        let parse = parse_sections(&body, &query.term, &self.profile, Utc::now());
        tracing::info!(
            term = %query.term,
            subject = %query.subject,
            code = %query.code,
            sections = parse.sections.len(),
            "parsed section search"
        );
        if !parse.mismatches.is_empty() {
            tracing::warn!(
                subject = %query.subject,
                code = %query.code,
                mismatches = parse.mismatches.len(),
                "section fields fell back to placeholders"
            );
            for mismatch in &parse.mismatches {
                tracing::debug!(%mismatch, "section parse mismatch");
            }
        }
        parse
    }

    pub async fn get_sections(&self, query: &SectionQuery) -> Vec<Section> {
        self.search(query).await.sections
    }
}

#[cfg(test)]
#[path = "sections_test.rs"]
mod tests;
