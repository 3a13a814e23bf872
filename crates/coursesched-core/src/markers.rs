//! Literal markers and positional offsets used by the extraction engine.
//!
//! The upstream pages are scraped by locating literal substrings and slicing
//! around them. Every such literal lives here so a markup change upstream can
//! be absorbed by a YAML override instead of a code change.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::courses::{Campus, InstructionMethod, ScheduleType};
use crate::ConfigError;

/// Maps a literal needle found in a section block to a field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRule<T> {
    pub needle: String,
    pub value: T,
}

impl<T> MarkerRule<T> {
    fn new(needle: &str, value: T) -> Self {
        Self {
            needle: needle.to_string(),
            value,
        }
    }
}

/// Positions of the identity fields in a section header, counted from the
/// right of the `delimiter`-separated segments.
///
/// With the defaults, `"Intro - 40123 - CSCI 1060U - 001"` yields the CRN from
/// the third segment from the end and `"SUBJECT CODE"` from the second. The
/// title is every segment before the CRN, rejoined, so dashes inside a title
/// do not shift the positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLayout {
    pub delimiter: String,
    pub crn_from_end: usize,
    pub course_from_end: usize,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self {
            delimiter: " - ".to_string(),
            crn_from_end: 3,
            course_from_end: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerProfile {
    // Registration system endpoints.
    pub term_page_path: String,
    pub section_search_path: String,

    // Catalog pages.
    pub catalog_root_path: String,
    pub programs_link_marker: String,
    pub program_list_start: String,
    pub program_list_end: String,

    // Section search response.
    pub data_table_marker: String,
    pub header_row_marker: String,
    /// Markup that precedes the campus name; rewritten to a short sentinel.
    pub location_source: String,
    /// Attribute value shared by seat and meeting-time cells; rewritten to a short sentinel.
    pub capacity_source: String,
    /// Markup that precedes schedule-type and instruction-method labels.
    pub field_prefix: String,
    pub schedule_types: Vec<MarkerRule<ScheduleType>>,
    pub campuses: Vec<MarkerRule<Campus>>,
    pub instruction_methods: Vec<MarkerRule<InstructionMethod>>,
    /// Index into the capacity-sentinel split that holds the remaining seats.
    pub capacity_cell_index: usize,
    pub header: HeaderLayout,
    pub linked_sections_marker: String,
    pub linked_crn_token: String,

    // Meeting-time sub-table.
    pub meeting_caption: String,
    pub meeting_table_end: String,
    pub meeting_row_separator: String,

    // Program requirement pages.
    pub requirement_year_token: String,
    pub requirement_line_pattern: String,
    /// A candidate line is only considered while it is fewer than this many
    /// lines past the previous kept line.
    pub requirement_reach: usize,
}

impl Default for MarkerProfile {
    fn default() -> Self {
        Self {
            term_page_path: "/prod_uoit/bwckschd.p_disp_dyn_sched?TRM=U".to_string(),
            section_search_path: "/prod_uoit/bwckschd.p_get_crse_unsec".to_string(),
            catalog_root_path: "/".to_string(),
            programs_link_marker: "Programs (by Degree)".to_string(),
            program_list_start: "<strong>Bachelor of Applied Science (Honours)</strong></p>"
                .to_string(),
            program_list_end: "<strong>Co-operative Education</strong>".to_string(),
            data_table_marker: "\"datadisplaytable\"".to_string(),
            header_row_marker: "\"ddheader\"".to_string(),
            location_source: "<b></b></SPAN>".to_string(),
            capacity_source: "\"dbdefault\"".to_string(),
            field_prefix: "<br />\n".to_string(),
            schedule_types: vec![
                MarkerRule::new("Lecture", ScheduleType::Lecture),
                MarkerRule::new("Tutorial", ScheduleType::Tutorial),
                MarkerRule::new("Lab", ScheduleType::Lab),
                MarkerRule::new("Lecture & Lab", ScheduleType::LectureAndLab),
                MarkerRule::new("Thesis/Project", ScheduleType::ThesisProject),
            ],
            campuses: vec![
                MarkerRule::new("UOIT - North Oshawa", Campus::NorthOshawa),
                MarkerRule::new("UOIT- Downtown Oshawa", Campus::DowntownOshawa),
                MarkerRule::new("UOIT-Georgian", Campus::GeorgianOshawa),
                MarkerRule::new("UOIT-Online", Campus::Online),
            ],
            instruction_methods: vec![
                MarkerRule::new("In-class Delivery", InstructionMethod::InClass),
                MarkerRule::new(
                    "In-class & Online Delivery",
                    InstructionMethod::InClassAndOnline,
                ),
                MarkerRule::new("Offsite", InstructionMethod::Offsite),
                MarkerRule::new("Virtual Meet Times", InstructionMethod::VirtualMeetTimes),
                MarkerRule::new("Section is Fully Online", InstructionMethod::Online),
            ],
            capacity_cell_index: 3,
            header: HeaderLayout::default(),
            linked_sections_marker: "Show linked Section(s)".to_string(),
            linked_crn_token: "( CRN: ".to_string(),
            meeting_caption: "Scheduled Meeting Times".to_string(),
            meeting_table_end: "</TR>\n</TABLE>".to_string(),
            meeting_row_separator: "</TR>\n".to_string(),
            requirement_year_token: "</a>Year ".to_string(),
            requirement_line_pattern:
                r"(?i)(^Elective|^or|^one of|^Semester|^[a-z]{3,4} [0-9]{4})".to_string(),
            requirement_reach: 7,
        }
    }
}

/// Load and validate a marker profile from a YAML file.
///
/// Fields missing from the file keep their built-in values.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_marker_profile(path: &Path) -> Result<MarkerProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MarkersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile: MarkerProfile = serde_yaml::from_str(&content)?;
    validate_profile(&profile)?;
    Ok(profile)
}

pub(crate) fn validate_profile(profile: &MarkerProfile) -> Result<(), ConfigError> {
    let required = [
        ("term_page_path", &profile.term_page_path),
        ("section_search_path", &profile.section_search_path),
        ("catalog_root_path", &profile.catalog_root_path),
        ("programs_link_marker", &profile.programs_link_marker),
        ("data_table_marker", &profile.data_table_marker),
        ("header_row_marker", &profile.header_row_marker),
        ("location_source", &profile.location_source),
        ("capacity_source", &profile.capacity_source),
        ("linked_sections_marker", &profile.linked_sections_marker),
        ("linked_crn_token", &profile.linked_crn_token),
        ("meeting_caption", &profile.meeting_caption),
        ("meeting_row_separator", &profile.meeting_row_separator),
        ("requirement_year_token", &profile.requirement_year_token),
        ("header.delimiter", &profile.header.delimiter),
    ];
    for (name, value) in required {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{name} must be non-empty")));
        }
    }

    let layout = &profile.header;
    if layout.crn_from_end < 2 || layout.course_from_end < 1 {
        return Err(ConfigError::Validation(
            "header offsets must satisfy crn_from_end >= 2 and course_from_end >= 1".to_string(),
        ));
    }
    if layout.crn_from_end == layout.course_from_end {
        return Err(ConfigError::Validation(
            "header crn_from_end and course_from_end must differ".to_string(),
        ));
    }

    if profile.requirement_reach == 0 {
        return Err(ConfigError::Validation(
            "requirement_reach must be greater than zero".to_string(),
        ));
    }

    if profile.schedule_types.is_empty()
        || profile.campuses.is_empty()
        || profile.instruction_methods.is_empty()
    {
        return Err(ConfigError::Validation(
            "schedule_types, campuses and instruction_methods must each have a rule".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for needle in profile.campuses.iter().map(|r| &r.needle) {
        if needle.is_empty() || !seen.insert(needle.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "campus needle '{needle}' is empty or duplicated"
            )));
        }
    }

    regex::Regex::new(&profile.requirement_line_pattern).map_err(|e| {
        ConfigError::Validation(format!("requirement_line_pattern does not compile: {e}"))
    })?;

    Ok(())
}
