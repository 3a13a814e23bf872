//! `sections` command: concurrent per-course searches and report output.

use std::fmt::Write as _;

use coursesched_core::{group_by_course, Section};
use coursesched_scraper::{format_clock, CampusClient, SectionQuery};
use futures::stream::{self, StreamExt};

/// One `--course` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CourseArg {
    pub subject: String,
    pub code: String,
}

/// Parses `SUBJECT:CODE` (or `"SUBJECT CODE"`), uppercasing both parts.
pub(crate) fn parse_course_arg(raw: &str) -> Result<CourseArg, String> {
    let (subject, code) = raw
        .split_once(':')
        .or_else(|| raw.trim().split_once(' '))
        .ok_or_else(|| format!("expected SUBJECT:CODE, got '{raw}'"))?;

    let subject = subject.trim().to_ascii_uppercase();
    let code = code.trim().to_ascii_uppercase();
    if subject.is_empty() || code.is_empty() {
        return Err(format!("expected SUBJECT:CODE, got '{raw}'"));
    }
    Ok(CourseArg { subject, code })
}

/// Searches every course, at most `max_concurrent` at a time, and prints the
/// results in argument order.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails. Upstream failures show
/// up as courses with no sections.
pub(crate) async fn run_sections(
    client: &CampusClient,
    term: &str,
    courses: &[CourseArg],
    json: bool,
    max_concurrent: usize,
) -> anyhow::Result<()> {
    let results: Vec<(&CourseArg, Vec<Section>)> = stream::iter(courses)
        .map(|course| async move {
            let query = SectionQuery::new(term, &course.subject, &course.code);
            (course, client.get_sections(&query).await)
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    if json {
        let sections: Vec<&Section> = results.iter().flat_map(|(_, found)| found).collect();
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    for (course, found) in &results {
        print!("{}", format_course_report(course, found));
    }
    Ok(())
}

/// Text report for one searched course, grouped by the courses the search
/// actually matched.
pub(crate) fn format_course_report(course: &CourseArg, sections: &[Section]) -> String {
    if sections.is_empty() {
        return format!("{} {}: no sections found\n", course.subject, course.code);
    }

    let groups = group_by_course(sections);
    if groups.len() > 1 {
        tracing::info!(
            subject = %course.subject,
            code = %course.code,
            matched = groups.len(),
            "search matched more than one course"
        );
    }

    let mut out = String::new();
    for (key, members) in groups {
        let _ = writeln!(out, "{} {} ({})", key.subject, key.code, key.term);
        for section in members {
            out.push_str(&format_section(section));
        }
    }
    out
}

pub(crate) fn format_section(section: &Section) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:>5}  {}  [{}, {}, {}]  seats: {}",
        section.crn,
        section.title,
        section.schedule_type,
        section.campus,
        section.instruction_method,
        section.remaining_seats
    );
    for time in &section.times {
        let _ = writeln!(
            out,
            "         {} {} - {}  {}  {}",
            time.day,
            format_clock(time.start_minute),
            format_clock(time.end_minute),
            time.location,
            time.instructor
        );
    }
    if !section.linked_sections.is_empty() {
        let linked: Vec<String> = section.linked_sections.iter().map(u32::to_string).collect();
        let _ = writeln!(out, "         linked: {}", linked.join(", "));
    }
    out
}
