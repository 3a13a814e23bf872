use thiserror::Error;

/// Transport-level failures raised by [`crate::Fetcher::fetch_raw`].
///
/// Extractors never see these: [`crate::Fetcher::fetch`] logs them and hands
/// back an `"Error: ..."` text body instead.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("invalid upstream URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A marker or delimiter that was expected in upstream markup but absent or
/// unusable. Always handled locally by falling back to a default value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMismatch {
    #[error("block {block}: section header did not match the expected layout")]
    SectionHeader { block: usize },

    #[error("block {block}: remaining seats cell missing or not numeric")]
    RemainingSeats { block: usize },

    #[error("block {block}, row {row}: meeting clock range not parseable")]
    MeetingClock { block: usize, row: usize },

    #[error("block {block}, row {row}: meeting date range not parseable")]
    MeetingDates { block: usize, row: usize },
}
