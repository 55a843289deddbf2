use crate::error::SearchError;
use serde::Serialize;
use serde_json::Value;

/// Rows with fewer positional fields than this are dropped.
pub const MIN_ROW_FIELDS: usize = 12;

// positional layout of a search row
const COMPANY_ID: usize = 0;
const INSTITUTION_ID: usize = 1;
const FILING_DATE: usize = 2;
const PERIOD_DATE: usize = 3;
const PROCESSED_DATE: usize = 4;
const FILE_TYPE_ID: usize = 5;
const FILING_VERSION_ID: usize = 11;

/// Status, headers and body of a documents-search response, before interpretation.
#[derive(Clone, Debug, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// One filing, taken from one row of one response page.
///
/// Dates are kept exactly as the API sends them; only the period year is derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilingRecord {
    pub company_id: i64,
    pub institution_id: Option<i64>,
    pub filing_date: Option<String>,
    pub period_date: String,
    pub processed_date: Option<String>,
    pub file_type_id: i32,
    pub filing_version_id: i64,
    pub period_year: String,
}

impl FilingRecord {
    /// Build a record from the positional `row` list.
    ///
    /// Returns `None` for rows that are too short, or whose key fields (company, period date,
    /// file type, filing version) are missing or of the wrong type.
    pub fn from_row(row: &[Value]) -> Option<Self> {
        if row.len() < MIN_ROW_FIELDS {
            return None;
        }

        let period_date = row[PERIOD_DATE].as_str()?.to_string();
        let period_year = period_date.chars().take(4).collect();

        Some(Self {
            company_id: as_int(&row[COMPANY_ID])?,
            institution_id: as_int(&row[INSTITUTION_ID]),
            filing_date: as_text(&row[FILING_DATE]),
            period_date,
            processed_date: as_text(&row[PROCESSED_DATE]),
            file_type_id: i32::try_from(as_int(&row[FILE_TYPE_ID])?).ok()?,
            filing_version_id: as_int(&row[FILING_VERSION_ID])?,
            period_year,
        })
    }
}

/// The records parsed from one `200` response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Rows present in the body, kept or not.
    pub rows: usize,
    pub records: Vec<FilingRecord>,
}

impl Page {
    pub fn dropped(&self) -> usize {
        self.rows - self.records.len()
    }
}

/// Interpret a raw response.
///
/// * `200` with `{"rows": [...]}` yields a [`Page`]; `{"rows": null}` yields an empty one.
/// * `200` with any other body is a [`SearchError::MalformedResponse`].
/// * `429` is a [`SearchError::RateLimited`].
/// * anything else is a [`SearchError::RequestFailed`].
pub fn parse_response(response: &RawResponse) -> Result<Page, SearchError> {
    match response.status {
        200 => parse_page(&response.body),
        429 => Err(SearchError::RateLimited {
            message: rate_limit_message(&response.body),
            headers: response.headers.clone(),
        }),
        status => Err(SearchError::RequestFailed {
            status,
            body: response.body.clone(),
        }),
    }
}

fn parse_page(body: &str) -> Result<Page, SearchError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|err| SearchError::MalformedResponse(format!("invalid JSON, error({err})")))?;

    let rows = match json.as_object().and_then(|map| map.get("rows")) {
        Some(Value::Null) => return Ok(Page::default()),
        Some(Value::Array(rows)) => rows,
        Some(_) => {
            return Err(SearchError::MalformedResponse(
                "\"rows\" is not a list".to_string(),
            ))
        }
        None => {
            return Err(SearchError::MalformedResponse(
                "unexpected response structure".to_string(),
            ))
        }
    };

    let records = rows
        .iter()
        .filter_map(|row| {
            let fields = row.get("row").and_then(Value::as_array)?;
            FilingRecord::from_row(fields)
        })
        .collect();

    Ok(Page {
        rows: rows.len(),
        records,
    })
}

// 429 bodies are usually `{"message": ...}`, but not always JSON
fn rate_limit_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("No message field")
            .to_string(),
        Err(_) => format!("429 Too Many Requests, response text: {body}"),
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| is_whole_i64(*f)).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// `i64::MAX as f64` rounds up to 2^63, which is already out of range
fn is_whole_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn twelve_field_row() {
        let page = parse_response(&RawResponse::ok(
            r#"{"rows":[{"row":[1,2,"2021-05-01","2021-01-01","2021-05-02",177,0,0,0,0,0,99]}]}"#,
        ))
        .unwrap();

        assert_eq!(page.rows, 1);
        assert_eq!(
            page.records,
            vec![FilingRecord {
                company_id: 1,
                institution_id: Some(2),
                filing_date: Some("2021-05-01".to_string()),
                period_date: "2021-01-01".to_string(),
                processed_date: Some("2021-05-02".to_string()),
                file_type_id: 177,
                filing_version_id: 99,
                period_year: "2021".to_string(),
            }]
        );
    }

    #[test]
    fn short_rows_are_dropped() {
        let page = parse_response(&RawResponse::ok(
            json!({"rows": [
                {"row": [1, 2, "2021-05-01", "2021-01-01", "2021-05-02", 177, 0, 0, 0, 0, 0]},
                {"row": []},
                {"other": true},
                "not a row",
            ]})
            .to_string(),
        ))
        .unwrap();
        assert_eq!(page.rows, 4);
        assert_eq!(page.dropped(), 4);
        assert!(page.records.is_empty());
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let row: Vec<Value> = serde_json::from_value(json!([
            "4004205", null, null, "2019-12-31T00:00:00", null, "142", 0, 0, 0, 0, 0, 1234.0, "extra"
        ]))
        .unwrap();
        let record = FilingRecord::from_row(&row).unwrap();
        assert_eq!(record.company_id, 4004205);
        assert_eq!(record.institution_id, None);
        assert_eq!(record.file_type_id, 142);
        assert_eq!(record.filing_version_id, 1234);
        assert_eq!(record.period_year, "2019");
    }

    #[test]
    fn mistyped_key_fields_drop_the_row() {
        let row: Vec<Value> = serde_json::from_value(json!([
            1, 2, "2021-05-01", null, "2021-05-02", 177, 0, 0, 0, 0, 0, 99
        ]))
        .unwrap();
        assert!(FilingRecord::from_row(&row).is_none());
    }

    #[test]
    fn out_of_range_float_ids_drop_the_row() {
        for id in [json!(1e19), json!(-1e19), json!(9.223372036854775807e18), json!(1.5)] {
            let row: Vec<Value> = serde_json::from_value(json!([
                1, 2, "2021-05-01", "2021-01-01", "2021-05-02", 177, 0, 0, 0, 0, 0, id
            ]))
            .unwrap();
            assert!(FilingRecord::from_row(&row).is_none(), "{id}");
        }
        assert_eq!(as_int(&json!(-9.223372036854775808e18)), Some(i64::MIN));
    }

    #[test]
    fn null_rows_is_an_empty_page() {
        let page = parse_response(&RawResponse::ok(r#"{"rows": null}"#)).unwrap();
        assert_eq!(page, Page::default());
    }

    #[test]
    fn unexpected_shapes() {
        for body in [r#"{"data": []}"#, r#"[1, 2]"#, r#"{"rows": {"row": []}}"#, "<html>"] {
            let err = parse_response(&RawResponse::ok(body)).unwrap_err();
            assert!(matches!(err, SearchError::MalformedResponse(_)), "{body}");
        }
    }

    #[test]
    fn statuses() {
        match parse_response(&RawResponse::with_status(429, r#"{"message": "slow down"}"#)) {
            Err(SearchError::RateLimited { message, .. }) => assert_eq!(message, "slow down"),
            other => panic!("unexpected {other:?}"),
        }
        match parse_response(&RawResponse::with_status(429, "busy")) {
            Err(SearchError::RateLimited { message, .. }) => assert!(message.ends_with("busy")),
            other => panic!("unexpected {other:?}"),
        }
        match parse_response(&RawResponse::with_status(500, "oops")) {
            Err(SearchError::RequestFailed { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
