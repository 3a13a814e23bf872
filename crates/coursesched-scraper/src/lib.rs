pub mod client;
pub mod clock;
pub mod error;
pub mod fetch;
pub mod forms;
pub mod markup;
pub mod meeting_times;
pub mod programs;
pub mod requirements;
pub mod sections;
pub mod terms;

pub use client::CampusClient;
pub use clock::{format_clock, parse_clock, parse_clock_range};
pub use error::{ParseMismatch, ScraperError};
pub use fetch::Fetcher;
pub use forms::{parse_forms, Form, FormInput};
pub use meeting_times::extract_times;
pub use programs::{ProgramCatalog, ProgramQuery};
pub use requirements::{extract_requirements, render_requirements};
pub use sections::{parse_sections, SectionParse, SectionQuery, SectionSearch};
pub use terms::TermDirectory;
