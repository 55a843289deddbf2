//! The search is a bounded, sequential loop:
//!
//! 1. split the criteria's date range into 90 day windows
//! 2. POST one request per window, with a fresh bearer token
//! 3. fold each parsed page into the [`ResultIndex`]
//! 4. pace, then move on to the next window
//!
//! A failed window never stops the loop; it is logged, recorded as a [`WindowOutcome`] and
//! skipped.

mod criteria;
mod index;
mod request;
mod response;
mod transport;
mod window;

pub use criteria::{SearchCriteria, MIN_YEAR};
pub use index::{FilingEntry, ResultIndex};
pub use request::{SearchProperties, SearchRequest, FILE_SOURCES, LANGUAGE_IDS};
pub use response::{parse_response, FilingRecord, Page, RawResponse, MIN_ROW_FIELDS};
pub use transport::{HttpTransport, SearchTransport};
pub use window::{
    window_count, windows, DateWindow, DateWindows, WINDOW_SPAN_DAYS, WINDOW_STEP_DAYS,
};

use crate::auth::TokenProvider;
use crate::error::SearchError;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// What happened to one window.
///
/// Failures carry what the operator needs to see: status codes, bodies, headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WindowOutcome {
    /// `rows` rows were returned, `kept` of them made it into the index.
    Parsed { rows: usize, kept: usize },
    Malformed { reason: String },
    RateLimited {
        message: String,
        headers: Vec<(String, String)>,
    },
    RequestFailed { status: u16, body: String },
    TransportFailed { error: String },
    AuthFailed { error: String },
}

impl WindowOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, WindowOutcome::Parsed { .. })
    }
}

impl fmt::Display for WindowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowOutcome::Parsed { rows, kept } => write!(f, "{kept} of {rows} rows kept"),
            WindowOutcome::Malformed { reason } => write!(f, "malformed response, {reason}"),
            WindowOutcome::RateLimited { message, .. } => write!(f, "rate limited, {message}"),
            WindowOutcome::RequestFailed { status, body } => write!(f, "status {status}, {body}"),
            WindowOutcome::TransportFailed { error } => write!(f, "transport error, {error}"),
            WindowOutcome::AuthFailed { error } => write!(f, "no access token, {error}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowReport {
    pub window: DateWindow,
    pub outcome: WindowOutcome,
}

/// The index built by a run, and how each window fared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collection {
    pub index: ResultIndex,
    pub windows: Vec<WindowReport>,
}

impl Collection {
    /// `true` when nothing was collected; the run should be reported as "no results".
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Windows that did not parse, in search order.
    pub fn failures(&self) -> impl Iterator<Item = &WindowReport> {
        self.windows.iter().filter(|report| !report.outcome.is_parsed())
    }

    pub fn summary(&self) -> CollectionSummary {
        let mut summary = CollectionSummary {
            windows: self.windows.len(),
            companies: self.index.len(),
            filings: self.index.filing_count(),
            ..CollectionSummary::default()
        };
        for report in &self.windows {
            match report.outcome {
                WindowOutcome::Parsed { .. } => summary.parsed += 1,
                WindowOutcome::Malformed { .. } => summary.malformed += 1,
                WindowOutcome::RateLimited { .. } => summary.rate_limited += 1,
                WindowOutcome::RequestFailed { .. }
                | WindowOutcome::TransportFailed { .. }
                | WindowOutcome::AuthFailed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

/// Window and result counts of a [`Collection`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub windows: usize,
    pub parsed: usize,
    pub malformed: usize,
    pub rate_limited: usize,
    pub failed: usize,
    pub companies: usize,
    pub filings: usize,
}

impl CollectionSummary {
    /// `true` when at least one window did not parse; an empty index then may not mean "nothing
    /// exists".
    pub fn is_partial(&self) -> bool {
        self.parsed < self.windows
    }
}

impl fmt::Display for CollectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} windows ({} parsed, {} malformed, {} rate limited, {} failed), \
            {} filings across {} companies",
            self.windows,
            self.parsed,
            self.malformed,
            self.rate_limited,
            self.failed,
            self.filings,
            self.companies
        )
    }
}

/// Collect every filing matching `criteria` into a [`ResultIndex`].
///
/// See [`collect_filings_detailed`] for the per-window outcomes.
pub async fn collect_filings(
    transport: &dyn SearchTransport,
    tokens: &dyn TokenProvider,
    criteria: &SearchCriteria,
    pacing: Duration,
    tui: bool,
) -> ResultIndex {
    collect_filings_detailed(transport, tokens, criteria, pacing, tui)
        .await
        .index
}

/// Run the window loop over `criteria`, one request at a time, waiting `pacing` after each.
pub async fn collect_filings_detailed(
    transport: &dyn SearchTransport,
    tokens: &dyn TokenProvider,
    criteria: &SearchCriteria,
    pacing: Duration,
    tui: bool,
) -> Collection {
    let time = std::time::Instant::now();
    let companies = criteria.companies_label();
    let window_count = criteria.window_count();

    info!(
        "searching filings for [{companies}] from {} to {} in {window_count} windows",
        criteria.date_range_start(),
        criteria.date_range_end()
    );
    let pb = crate::tui::window_progress(window_count, tui);

    let mut collection = Collection {
        index: ResultIndex::new(),
        windows: Vec::with_capacity(window_count),
    };
    for window in criteria.windows() {
        pb.set_message(format!("searching {window} ..."));
        let outcome =
            search_window(transport, tokens, criteria, &window, &mut collection.index).await;
        pb.suspend(|| log_outcome(&companies, &window, &outcome));
        collection.windows.push(WindowReport { window, outcome });
        pb.inc(1);

        tokio::time::sleep(pacing).await;
    }
    pb.finish_and_clear();

    if collection.is_empty() {
        info!("result is empty for [{companies}]");
    } else {
        debug!(
            "search finished for [{companies}]: {}, {}",
            collection.summary(),
            crate::time_elapsed(time)
        );
    }

    collection
}

async fn search_window(
    transport: &dyn SearchTransport,
    tokens: &dyn TokenProvider,
    criteria: &SearchCriteria,
    window: &DateWindow,
    index: &mut ResultIndex,
) -> WindowOutcome {
    let token = match tokens.current_token().await {
        Ok(token) => token,
        Err(err) => {
            return WindowOutcome::AuthFailed {
                error: err.to_string(),
            }
        }
    };

    trace!("requesting filings for {window}");
    let request = SearchRequest::new(criteria, window);
    let page = transport
        .post(&request, &token)
        .await
        .and_then(|response| parse_response(&response));

    match page {
        Ok(page) => {
            if page.dropped() > 0 {
                debug!("dropped {} of {} rows for {window}", page.dropped(), page.rows);
            }
            let outcome = WindowOutcome::Parsed {
                rows: page.rows,
                kept: page.records.len(),
            };
            for record in page.records {
                index.push(record);
            }
            outcome
        }
        Err(SearchError::MalformedResponse(reason)) => WindowOutcome::Malformed { reason },
        Err(SearchError::RateLimited { message, headers }) => {
            WindowOutcome::RateLimited { message, headers }
        }
        Err(SearchError::RequestFailed { status, body }) => {
            WindowOutcome::RequestFailed { status, body }
        }
        Err(SearchError::Transport(err)) => WindowOutcome::TransportFailed {
            error: err.to_string(),
        },
    }
}

// emitted outside of `search_window` so the progress bar can be hidden while writing
fn log_outcome(companies: &str, window: &DateWindow, outcome: &WindowOutcome) {
    match outcome {
        WindowOutcome::Parsed { .. } => {
            trace!("window {window} folded into the index: {outcome:?}")
        }
        WindowOutcome::Malformed { reason } => {
            warn!("unexpected response structure for [{companies}] {window}, error({reason})")
        }
        WindowOutcome::RateLimited { message, headers } => warn!(
            "rate limiting for [{companies}] {window}, message({message}), headers({headers:?})"
        ),
        WindowOutcome::RequestFailed { status, body } => {
            error!("received status code {status} for [{companies}] {window}, response({body})")
        }
        WindowOutcome::TransportFailed { error } => {
            error!("failed to fetch filings for [{companies}] {window}, error({error})")
        }
        WindowOutcome::AuthFailed { error } => {
            error!("failed to get an access token for [{companies}] {window}, error({error})")
        }
    }
}
