/// Bearer token providers for the documents-search API.
pub mod auth;

/// Environment driven settings (endpoints, credentials, timeouts, pacing).
pub mod config;

pub mod error;

/// The static filing type table, translating labels such as `10-K` into API identifiers.
pub mod file_types;

pub mod fs;

/// Aggregations over a pre-exported filings report (the dashboard data layer).
pub mod report;

/// Date-windowed search over the documents-search endpoint, folded into a [`ResultIndex`].
///
/// [`ResultIndex`]: search::ResultIndex
pub mod search;

pub(crate) mod tui;

pub use auth::{CiqTokenProvider, StaticToken, TokenGrant, TokenProvider};
pub use config::SpiderConfig;
pub use error::{AuthError, ConfigError, CriteriaError, ReportError, SearchError};
pub use search::{
    collect_filings, collect_filings_detailed, Collection, DateWindow, FilingRecord,
    HttpTransport, ResultIndex, SearchCriteria, SearchTransport,
};

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use dotenv::var;
    pub(crate) use reqwest::Client as HttpClient;
}

/// Build the reqwest client shared by the search transport and the token provider.
pub fn std_client_build(timeout: std::time::Duration) -> Result<http::HttpClient, reqwest::Error> {
    reqwest::ClientBuilder::new().timeout(timeout).build()
}

pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:?}", time.elapsed())
}
