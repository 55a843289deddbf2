use crate::error::ConfigError;
use crate::http::*;
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_SEARCH_URL: &str =
    "https://api-ciq.marketintelligence.spglobal.com/gds/documents/api/v1/search?docType=FILINGS_DOCUMENTS_API";
pub const DEFAULT_TOKEN_URL: &str =
    "https://api-ciq.marketintelligence.spglobal.com/gdsapi/rest/authenticate/api/v1/token";
pub const DEFAULT_REFRESH_URL: &str =
    "https://api-ciq.marketintelligence.spglobal.com/gdsapi/rest/authenticate/api/v1/token/refresh";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PACING_MS: u64 = 100;

/// Runtime settings, read from the environment (and `.env`).
///
/// | variable            | default                 |
/// |---------------------|-------------------------|
/// | `CIQ_SEARCH_URL`    | [`DEFAULT_SEARCH_URL`]  |
/// | `CIQ_TOKEN_URL`     | [`DEFAULT_TOKEN_URL`]   |
/// | `CIQ_REFRESH_URL`   | [`DEFAULT_REFRESH_URL`] |
/// | `CIQ_USERNAME`      | unset                   |
/// | `CIQ_PASSWORD`      | unset                   |
/// | `CIQ_ACCESS_TOKEN`  | unset                   |
/// | `CIQ_TIMEOUT_SECS`  | 30                      |
/// | `CIQ_PACING_MS`     | 100                     |
#[derive(Clone, Debug)]
pub struct SpiderConfig {
    pub search_url: String,
    pub token_url: String,
    pub refresh_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
    pub timeout: Duration,
    pub pacing: Duration,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            refresh_url: DEFAULT_REFRESH_URL.to_string(),
            username: None,
            password: None,
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }
}

impl SpiderConfig {
    /// Read the configuration from environment variables, falling back to the defaults.
    ///
    /// `.env` is expected to be loaded by the caller (`dotenv::dotenv()`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            search_url: var("CIQ_SEARCH_URL").unwrap_or(defaults.search_url),
            token_url: var("CIQ_TOKEN_URL").unwrap_or(defaults.token_url),
            refresh_url: var("CIQ_REFRESH_URL").unwrap_or(defaults.refresh_url),
            username: var("CIQ_USERNAME").ok(),
            password: var("CIQ_PASSWORD").ok(),
            access_token: var("CIQ_ACCESS_TOKEN").ok().filter(|token| !token.is_empty()),
            timeout: match var("CIQ_TIMEOUT_SECS").ok() {
                Some(value) => Duration::from_secs(parse_u64("CIQ_TIMEOUT_SECS", value)?),
                None => defaults.timeout,
            },
            pacing: match var("CIQ_PACING_MS").ok() {
                Some(value) => Duration::from_millis(parse_u64("CIQ_PACING_MS", value)?),
                None => defaults.pacing,
            },
        };
        trace!(
            "configuration read: search_url={}, timeout={:?}, pacing={:?}",
            config.search_url,
            config.timeout,
            config.pacing
        );
        Ok(config)
    }
}

fn parse_u64(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { key, value })
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
