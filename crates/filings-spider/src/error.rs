use thiserror::Error;

/// Failures of a single search window.
///
/// None of these abort a run: the aggregator logs them, records the outcome of the window and
/// moves on to the next one.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The body was not JSON, or was JSON without the expected `rows` shape.
    #[error("malformed response, {0}")]
    MalformedResponse(String),

    /// HTTP 429.
    #[error("rate limited, {message}")]
    RateLimited {
        message: String,
        headers: Vec<(String, String)>,
    },

    /// Any other non-200 status.
    #[error("request failed with status {status}, {body}")]
    RequestFailed { status: u16, body: String },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("transport error, {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential {0}")]
    MissingCredential(&'static str),

    #[error("token endpoint returned status {status}, {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to reach token endpoint, {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("at least one company id is required")]
    NoCompanies,

    #[error("date range start {start} is after its end {end}")]
    StartAfterEnd {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("date {date} is outside of [{min}, {max}]")]
    DateOutOfRange {
        date: chrono::NaiveDate,
        min: chrono::NaiveDate,
        max: chrono::NaiveDate,
    },

    #[error("year {year} is outside of [{min}, {max}]")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("start year {start} is after end year {end}")]
    YearsReversed { start: i32, end: i32 },

    #[error("unknown file type {0:?}")]
    UnknownFileType(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {key} has an invalid value {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read report, {0}")]
    Csv(#[from] csv::Error),

    #[error("report is missing the {0:?} column")]
    MissingColumn(&'static str),
}
