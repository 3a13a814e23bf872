use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use coursesched_core::{Campus, InstructionMethod, ScheduleType};

use super::*;

const SEARCH_RESULTS: &str = include_str!("../tests/fixtures/section_search.html");

fn fetched_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 1, 2, 12, 0, 0).unwrap()
}

fn parse_fixture() -> SectionParse {
    parse_sections(SEARCH_RESULTS, "201801", &MarkerProfile::default(), fetched_at())
}

#[test]
fn form_body_keeps_field_order_and_wildcards() {
    let body = SectionQuery::new("201801", "CSCI", "1060U").form_body();
    assert_eq!(
        body,
        "TRM=U&term_in=201801&sel_subj=dummy&sel_day=dummy&sel_schd=dummy&sel_insm=dummy\
         &sel_camp=dummy&sel_levl=dummy&sel_sess=dummy&sel_instr=dummy&sel_ptrm=dummy\
         &sel_attr=dummy&sel_subj=CSCI&sel_crse=1060U&sel_title=&sel_schd=%25&sel_insm=%25\
         &sel_from_cred=&sel_to_cred=&sel_camp=%25&begin_hh=0&begin_mi=0&begin_ap=a\
         &end_hh=0&end_mi=0&end_ap=a"
    );
}

#[test]
fn form_body_percent_encodes_values() {
    let body = SectionQuery::new("2018 01", "CS&CI", "10(6)0U").form_body();
    assert!(body.contains("term_in=2018%2001&"));
    assert!(body.contains("sel_subj=CS%26CI&"));
    assert!(body.contains("sel_crse=10(6)0U&"));
}

#[test]
fn sanitized_strips_foreign_characters() {
    let query = SectionQuery::new(" 2018-01'", "cs ci;", "1060U--").sanitized();
    assert_eq!(query, SectionQuery::new("201801", "csci", "1060U"));
}

#[test]
fn parses_every_block_in_upstream_order() {
    let parse = parse_fixture();
    let crns: Vec<u32> = parse.sections.iter().map(|s| s.crn).collect();
    assert_eq!(crns, vec![40123, 40456, 0]);
    assert!(parse.sections.iter().all(|s| s.term == "201801"));
    assert!(parse.sections.iter().all(|s| s.fetched_at == fetched_at()));
}

#[test]
fn lecture_block_fields() {
    let parse = parse_fixture();
    let lecture = &parse.sections[0];
    assert_eq!(lecture.title, "Programming Workshop I");
    assert_eq!(lecture.subject, "CSCI");
    assert_eq!(lecture.code, "1060U");
    assert_eq!(lecture.schedule_type, ScheduleType::Lecture);
    assert_eq!(lecture.campus, Campus::NorthOshawa);
    assert_eq!(lecture.instruction_method, InstructionMethod::InClass);
    assert_eq!(lecture.remaining_seats, 15);
    assert!(lecture.linked_sections.is_empty());

    assert_eq!(lecture.times.len(), 2);
    assert_eq!(lecture.times[0].day, "M");
    assert_eq!(lecture.times[0].start_minute, 600);
    assert_eq!(lecture.times[0].end_minute, 680);
    assert_eq!(lecture.times[1].day, "W");
    assert_eq!(lecture.times[1].start_minute, 780);

    assert_eq!(lecture.instructor, "Jane Doe (P)");
    assert_eq!(lecture.location, "UA1350");
}

#[test]
fn lab_block_collects_numeric_linked_crns() {
    let parse = parse_fixture();
    let lab = &parse.sections[1];
    assert_eq!(lab.schedule_type, ScheduleType::Lab);
    assert_eq!(lab.campus, Campus::DowntownOshawa);
    assert_eq!(lab.linked_sections, BTreeSet::from([10452, 10477]));
    assert_eq!(lab.remaining_seats, -2);
    assert_eq!(lab.instructor, "TBA");
    assert_eq!(lab.location, "UL2034");
    assert_eq!(lab.times[0].day, "T");
}

#[test]
fn unparsable_header_keeps_placeholders_and_other_fields() {
    let parse = parse_fixture();
    let seminar = &parse.sections[2];
    assert_eq!(seminar.crn, 0);
    assert_eq!(seminar.title, "Unavailable");
    assert_eq!(seminar.subject, "TBD");
    assert_eq!(seminar.code, "TBD");
    assert_eq!(seminar.schedule_type, ScheduleType::ThesisProject);
    assert_eq!(seminar.campus, Campus::Online);
    assert_eq!(seminar.instruction_method, InstructionMethod::Online);
    assert_eq!(seminar.remaining_seats, 6);
    assert!(seminar.times.is_empty());
    assert_eq!(seminar.instructor, "TBA");
    assert_eq!(seminar.location, "TBA");

    assert_eq!(parse.mismatches, vec![ParseMismatch::SectionHeader { block: 2 }]);
}

#[test]
fn header_counts_segments_from_the_right() {
    let block = r#" scope="colgroup" ><a href="x">Intro - Part A - 40999 - MATH 1010U - 002</a></th>"#;
    let identity = parse_header(block, &MarkerProfile::default()).unwrap();
    assert_eq!(identity.title, "Intro - Part A");
    assert_eq!(identity.crn, 40999);
    assert_eq!(identity.subject, "MATH");
    assert_eq!(identity.code, "1010U");
}

#[test]
fn header_with_non_numeric_crn_is_rejected() {
    let block = " >Intro - Lab - CSCI 1060U - 001</th>";
    assert!(parse_header(block, &MarkerProfile::default()).is_none());
}

#[test]
fn header_offsets_follow_the_profile() {
    let mut profile = MarkerProfile::default();
    profile.header.crn_from_end = 2;
    profile.header.course_from_end = 1;
    let identity = parse_header(" >Intro - 40123 - CSCI 1060U</th>", &profile).unwrap();
    assert_eq!(identity.crn, 40123);
    assert_eq!(identity.code, "1060U");
    assert_eq!(identity.title, "Intro");
}

#[test]
fn missing_seat_cell_defaults_to_zero_with_mismatch() {
    let html = "<table CLASS=\"datadisplaytable\"><th CLASS=\"ddheader\" >Intro - 40123 - CSCI 1060U - 001</th>\
                <td CLASS=\"dbdefault\">60</td></table>";
    let parse = parse_sections(html, "201801", &MarkerProfile::default(), fetched_at());
    assert_eq!(parse.sections.len(), 1);
    assert_eq!(parse.sections[0].remaining_seats, 0);
    assert_eq!(parse.mismatches, vec![ParseMismatch::RemainingSeats { block: 0 }]);
}

#[test]
fn linked_marker_is_required_before_scanning_crns() {
    let html = "<table CLASS=\"datadisplaytable\"><th CLASS=\"ddheader\" >Intro - 40123 - CSCI 1060U - 001</th>\
                ( CRN: 10452 )</table>";
    let parse = parse_sections(html, "201801", &MarkerProfile::default(), fetched_at());
    assert!(parse.sections[0].linked_sections.is_empty());
}

#[test]
fn body_without_data_table_is_empty() {
    let profile = MarkerProfile::default();
    assert_eq!(
        parse_sections("Error: connection refused", "201801", &profile, fetched_at()),
        SectionParse::default()
    );
    assert_eq!(parse_sections("", "201801", &profile, fetched_at()), SectionParse::default());
}

#[test]
fn crlf_line_endings_are_normalized() {
    let crlf = SEARCH_RESULTS.replace('\n', "\r\n");
    let parse = parse_sections(&crlf, "201801", &MarkerProfile::default(), fetched_at());
    assert_eq!(parse, parse_fixture());
}
