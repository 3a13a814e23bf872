//! Records produced by the extraction engine.
//!
//! Everything here is created fresh per extraction call and handed to the
//! caller; nothing in this module caches or deduplicates.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Opaque registration-system term code (e.g. `"201801"`).
pub type Term = String;

/// How long a fetched section stays fresh for a persistence layer that caches
/// sections (one day).
pub const DEFAULT_SECTION_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// A degree program listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    /// Link to the program detail page as it appeared in the listing.
    pub detail_path: String,
}

/// Requirement and elective lines for one year of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementBlock {
    /// Year label as written on the page (e.g. `"1"`).
    pub year: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScheduleType {
    Lecture,
    Tutorial,
    Lab,
    #[serde(rename = "Lecture & Lab")]
    LectureAndLab,
    #[serde(rename = "Thesis/Project")]
    ThesisProject,
    #[default]
    Other,
}

impl std::fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleType::Lecture => write!(f, "Lecture"),
            ScheduleType::Tutorial => write!(f, "Tutorial"),
            ScheduleType::Lab => write!(f, "Lab"),
            ScheduleType::LectureAndLab => write!(f, "Lecture & Lab"),
            ScheduleType::ThesisProject => write!(f, "Thesis/Project"),
            ScheduleType::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Campus {
    #[serde(rename = "North Oshawa")]
    NorthOshawa,
    #[serde(rename = "Downtown Oshawa")]
    DowntownOshawa,
    #[serde(rename = "Georgian Oshawa")]
    GeorgianOshawa,
    Online,
    #[default]
    Other,
}

impl std::fmt::Display for Campus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Campus::NorthOshawa => write!(f, "North Oshawa"),
            Campus::DowntownOshawa => write!(f, "Downtown Oshawa"),
            Campus::GeorgianOshawa => write!(f, "Georgian Oshawa"),
            Campus::Online => write!(f, "Online"),
            Campus::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstructionMethod {
    #[serde(rename = "In-class Delivery")]
    InClass,
    #[serde(rename = "In-class & Online Delivery")]
    InClassAndOnline,
    Offsite,
    #[serde(rename = "Virtual Meet Times")]
    VirtualMeetTimes,
    Online,
    #[default]
    #[serde(rename = "TBD")]
    Tbd,
}

impl std::fmt::Display for InstructionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstructionMethod::InClass => write!(f, "In-class Delivery"),
            InstructionMethod::InClassAndOnline => write!(f, "In-class & Online Delivery"),
            InstructionMethod::Offsite => write!(f, "Offsite"),
            InstructionMethod::VirtualMeetTimes => write!(f, "Virtual Meet Times"),
            InstructionMethod::Online => write!(f, "Online"),
            InstructionMethod::Tbd => write!(f, "TBD"),
        }
    }
}

/// One recurring weekly time slot of a section.
///
/// Minutes count from midnight. When the upstream row has no usable end of
/// range, `end_minute == start_minute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTime {
    /// Day code as written upstream (`M`, `T`, `W`, `R`, `F`), or `X` when unknown.
    pub day: String,
    pub start_minute: u16,
    pub end_minute: u16,
    pub location: String,
    pub schedule_type: String,
    pub instructor: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for MeetingTime {
    fn default() -> Self {
        Self {
            day: "X".to_string(),
            start_minute: 0,
            end_minute: 0,
            location: "TBA".to_string(),
            schedule_type: "Lecture".to_string(),
            instructor: "TBA".to_string(),
            start_date: None,
            end_date: None,
        }
    }
}

/// `(term, subject, code)`: identifies one course within a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseKey {
    pub term: Term,
    pub subject: String,
    pub code: String,
}

/// One offered instance of a course within a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub crn: u32,
    pub title: String,
    pub subject: String,
    pub code: String,
    pub term: Term,
    pub schedule_type: ScheduleType,
    pub campus: Campus,
    pub instruction_method: InstructionMethod,
    pub remaining_seats: i32,
    pub instructor: String,
    pub location: String,
    pub linked_sections: BTreeSet<u32>,
    pub times: Vec<MeetingTime>,
    pub fetched_at: DateTime<Utc>,
}

impl Section {
    /// A section with placeholder identity fields, used as the starting point
    /// for every parsed block.
    #[must_use]
    pub fn placeholder(term: &str, fetched_at: DateTime<Utc>) -> Self {
        Self {
            crn: 0,
            title: "Unavailable".to_string(),
            subject: "TBD".to_string(),
            code: "TBD".to_string(),
            term: term.to_string(),
            schedule_type: ScheduleType::default(),
            campus: Campus::default(),
            instruction_method: InstructionMethod::default(),
            remaining_seats: 0,
            instructor: "TBA".to_string(),
            location: "TBA".to_string(),
            linked_sections: BTreeSet::new(),
            times: Vec::new(),
            fetched_at,
        }
    }

    #[must_use]
    pub fn course_key(&self) -> CourseKey {
        CourseKey {
            term: self.term.clone(),
            subject: self.subject.clone(),
            code: self.code.clone(),
        }
    }

    /// Returns `true` once the section is older than `max_age`.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
        now.signed_duration_since(self.fetched_at) > max_age
    }
}

/// Groups sections by course, keeping the first-seen order of both courses
/// and the sections within each course.
#[must_use]
pub fn group_by_course(sections: &[Section]) -> Vec<(CourseKey, Vec<&Section>)> {
    let mut groups: Vec<(CourseKey, Vec<&Section>)> = Vec::new();
    for section in sections {
        let key = section.course_key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(section),
            None => groups.push((key, vec![section])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(crn: u32, subject: &str, code: &str) -> Section {
        let mut s = Section::placeholder("201801", Utc::now());
        s.crn = crn;
        s.subject = subject.to_string();
        s.code = code.to_string();
        s
    }

    #[test]
    fn placeholder_has_documented_defaults() {
        let s = Section::placeholder("201801", Utc::now());
        assert_eq!(s.crn, 0);
        assert_eq!(s.title, "Unavailable");
        assert_eq!(s.subject, "TBD");
        assert_eq!(s.code, "TBD");
        assert_eq!(s.schedule_type, ScheduleType::Other);
        assert_eq!(s.campus, Campus::Other);
        assert_eq!(s.instruction_method, InstructionMethod::Tbd);
        assert!(s.linked_sections.is_empty());
    }

    #[test]
    fn group_by_course_keeps_first_seen_order() {
        let sections = vec![
            section(1, "CSCI", "1060U"),
            section(2, "MATH", "1010U"),
            section(3, "CSCI", "1060U"),
        ];
        let groups = group_by_course(&sections);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.subject, "CSCI");
        let crns: Vec<u32> = groups[0].1.iter().map(|s| s.crn).collect();
        assert_eq!(crns, vec![1, 3]);
        assert_eq!(groups[1].0.code, "1010U");
    }

    #[test]
    fn is_stale_after_max_age() {
        let fetched = Utc::now();
        let s = Section::placeholder("201801", fetched);
        let max_age = TimeDelta::seconds(DEFAULT_SECTION_MAX_AGE_SECS);
        assert!(!s.is_stale(fetched + TimeDelta::hours(23), max_age));
        assert!(s.is_stale(fetched + TimeDelta::hours(25), max_age));
    }

    #[test]
    fn enums_serialize_with_display_labels() {
        assert_eq!(
            serde_json::to_string(&ScheduleType::LectureAndLab).unwrap(),
            "\"Lecture & Lab\""
        );
        assert_eq!(
            serde_json::to_string(&Campus::NorthOshawa).unwrap(),
            "\"North Oshawa\""
        );
        assert_eq!(
            serde_json::to_string(&InstructionMethod::Tbd).unwrap(),
            "\"TBD\""
        );
        assert_eq!(ScheduleType::ThesisProject.to_string(), "Thesis/Project");
    }
}
