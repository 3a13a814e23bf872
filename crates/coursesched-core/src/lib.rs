pub mod app_config;
pub mod config;
pub mod courses;
pub mod markers;

pub use app_config::{AppConfig, Environment, UpstreamScheme};
pub use config::{load_app_config, load_app_config_from_env};
pub use courses::{
    group_by_course, Campus, CourseKey, InstructionMethod, MeetingTime, Program,
    RequirementBlock, ScheduleType, Section, Term, DEFAULT_SECTION_MAX_AGE_SECS,
};
pub use markers::{load_marker_profile, HeaderLayout, MarkerProfile, MarkerRule};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read marker profile {path}: {source}")]
    MarkersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse marker profile: {0}")]
    MarkersFileParse(#[from] serde_yaml::Error),

    #[error("marker profile validation failed: {0}")]
    Validation(String),
}
