use async_trait::async_trait;
use chrono::NaiveDate;
use filings_spider::search::{
    collect_filings, collect_filings_detailed, FilingEntry, RawResponse, SearchCriteria,
    SearchRequest, SearchTransport, WindowOutcome,
};
use filings_spider::{AuthError, SearchError, StaticToken, TokenProvider};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Replays canned responses, one per request, and records what was sent.
struct StubTransport {
    responses: Mutex<VecDeque<Result<RawResponse, SearchError>>>,
    requests: Mutex<Vec<(SearchRequest, String)>>,
}

impl StubTransport {
    fn new(responses: Vec<Result<RawResponse, SearchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<(SearchRequest, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchTransport for StubTransport {
    async fn post(&self, request: &SearchRequest, token: &str) -> Result<RawResponse, SearchError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), token.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::ok(r#"{"rows": []}"#)))
    }
}

struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn current_token(&self) -> Result<String, AuthError> {
        Err(AuthError::MissingCredential("CIQ_USERNAME"))
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three windows: 2021-01-01, 2021-04-01, 2021-06-30.
fn criteria() -> SearchCriteria {
    SearchCriteria::new([1], [177], date(2021, 1, 1), date(2021, 7, 15)).unwrap()
}

fn rows(rows: serde_json::Value) -> Result<RawResponse, SearchError> {
    Ok(RawResponse::ok(json!({ "rows": rows }).to_string()))
}

fn entry(filing_version_id: i64, period_year: &str, file_type_id: i32) -> FilingEntry {
    FilingEntry {
        filing_version_id,
        period_year: period_year.to_string(),
        file_type_id,
    }
}

#[tokio::test]
async fn single_row_window() {
    let day = date(2021, 5, 1);
    let criteria = SearchCriteria::new([1], [177], day, day).unwrap();
    let transport = StubTransport::new(vec![Ok(RawResponse::ok(
        r#"{"rows":[{"row":[1,2,"2021-05-01","2021-01-01","2021-05-02",177,0,0,0,0,0,99]}]}"#,
    ))]);

    let index = collect_filings(
        &transport,
        &StaticToken::new("token"),
        &criteria,
        Duration::ZERO,
        false,
    )
    .await;

    assert_eq!(index.len(), 1);
    assert_eq!(index.get(1).unwrap(), &[entry(99, "2021", 177)]);
}

#[tokio::test]
async fn one_request_per_window() {
    let transport = StubTransport::new(vec![]);
    let collection = collect_filings_detailed(
        &transport,
        &StaticToken::new("secret"),
        &criteria(),
        Duration::ZERO,
        false,
    )
    .await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(collection.windows.len(), 3);

    let bounds: Vec<(&str, &str)> = requests
        .iter()
        .map(|(request, _)| {
            (
                request.properties.min_period_date.as_str(),
                request.properties.max_period_date.as_str(),
            )
        })
        .collect();
    assert_eq!(
        bounds,
        vec![
            ("2021-01-01", "2021-03-31"),
            ("2021-04-01", "2021-06-29"),
            ("2021-06-30", "2021-09-27"),
        ]
    );
    assert!(requests.iter().all(|(request, token)| {
        token == "secret"
            && request.properties.company_id == vec![1]
            && request.properties.file_type_id == vec![177]
            && request.properties.file_source.len() == 14
            && request.properties.language_id == vec![0]
    }));
}

#[tokio::test]
async fn failed_windows_do_not_stop_the_run() {
    let transport = StubTransport::new(vec![
        Ok(RawResponse {
            status: 429,
            headers: vec![("retry-after".to_string(), "30".to_string())],
            body: r#"{"message": "Too many requests"}"#.to_string(),
        }),
        Ok(RawResponse::ok("this is not json")),
        rows(json!([
            {"row": [1, 2, "2021-07-01", "2021-06-30", "2021-07-02", 177, 0, 0, 0, 0, 0, 7]},
            {"row": [1, 2, "2021-07-01", "2021-06-30", "2021-07-02", 177, 0, 0, 0, 0, 0]},
        ])),
    ]);

    let collection = collect_filings_detailed(
        &transport,
        &StaticToken::new("token"),
        &criteria(),
        Duration::ZERO,
        false,
    )
    .await;

    let outcomes: Vec<_> = collection.windows.iter().map(|w| w.outcome.clone()).collect();
    assert_eq!(
        outcomes[0],
        WindowOutcome::RateLimited {
            message: "Too many requests".to_string(),
            headers: vec![("retry-after".to_string(), "30".to_string())],
        }
    );
    assert!(matches!(outcomes[1], WindowOutcome::Malformed { .. }));
    assert_eq!(outcomes[2], WindowOutcome::Parsed { rows: 2, kept: 1 });
    assert_eq!(collection.index.get(1).unwrap(), &[entry(7, "2021", 177)]);

    let summary = collection.summary();
    assert_eq!(summary.rate_limited, 1);
    assert_eq!(summary.malformed, 1);
    assert_eq!(summary.filings, 1);
    assert!(summary.is_partial());

    let failed: Vec<_> = collection.failures().map(|r| r.outcome.to_string()).collect();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0], "rate limited, Too many requests");
    assert!(failed[1].starts_with("malformed response"));
}

#[tokio::test]
async fn all_windows_failing_is_an_explicit_empty_result() {
    let transport = StubTransport::new(vec![
        Ok(RawResponse::with_status(500, "internal error")),
        Ok(RawResponse::with_status(403, "forbidden")),
        Ok(RawResponse::with_status(429, "slow down")),
    ]);

    let collection = collect_filings_detailed(
        &transport,
        &StaticToken::new("token"),
        &criteria(),
        Duration::ZERO,
        false,
    )
    .await;

    assert!(collection.is_empty());
    assert!(collection.index.is_empty());
    assert_eq!(
        collection.windows[0].outcome,
        WindowOutcome::RequestFailed {
            status: 500,
            body: "internal error".to_string(),
        }
    );
    assert_eq!(
        collection.windows[1].outcome,
        WindowOutcome::RequestFailed {
            status: 403,
            body: "forbidden".to_string(),
        }
    );
    assert_eq!(collection.summary().failed, 2);
    assert_eq!(serde_json::to_string(&collection.index).unwrap(), "{}");
}

#[tokio::test]
async fn dropped_rows_leave_a_complete_but_empty_result() {
    // every row is dropped, so no company key is ever created
    let transport = StubTransport::new(vec![rows(json!([{"row": [1, 2, 3]}]))]);
    let collection = collect_filings_detailed(
        &transport,
        &StaticToken::new("token"),
        &criteria(),
        Duration::ZERO,
        false,
    )
    .await;

    assert!(collection.is_empty());
    assert!(!collection.summary().is_partial());
}

#[tokio::test]
async fn token_failure_skips_the_window() {
    let transport = StubTransport::new(vec![]);
    let collection =
        collect_filings_detailed(&transport, &NoToken, &criteria(), Duration::ZERO, false).await;

    assert!(transport.requests().is_empty());
    assert!(collection.windows.iter().all(|w| w.outcome
        == WindowOutcome::AuthFailed {
            error: "missing credential CIQ_USERNAME".to_string(),
        }));
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let responses = || {
        vec![
            rows(json!([
                {"row": [2, 0, "a", "2020-12-31", "b", 142, 0, 0, 0, 0, 0, 20]},
                {"row": [1, 0, "a", "2021-03-31", "b", 142, 0, 0, 0, 0, 0, 10]},
            ])),
            rows(json!(null)),
            rows(json!([
                {"row": [2, 0, "a", "2021-06-30", "b", 160, 0, 0, 0, 0, 0, 21]},
                {"row": [2, 0, "a", "2020-12-31", "b", 142, 0, 0, 0, 0, 0, 20]},
            ])),
        ]
    };

    let token = StaticToken::new("token");
    let first = collect_filings(
        &StubTransport::new(responses()),
        &token,
        &criteria(),
        Duration::ZERO,
        false,
    )
    .await;
    let second = collect_filings(
        &StubTransport::new(responses()),
        &token,
        &criteria(),
        Duration::ZERO,
        false,
    )
    .await;

    assert_eq!(first, second);
    assert_eq!(
        first.get(2).unwrap(),
        &[entry(20, "2020", 142), entry(21, "2021", 160), entry(20, "2020", 142)]
    );

    let mut deduped = first.clone();
    deduped.dedup();
    assert_eq!(deduped.filing_count(), 3);
}
