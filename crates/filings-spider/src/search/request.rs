use super::{DateWindow, SearchCriteria};
use serde::Serialize;

/// Source systems whose documents are searched; sent with every request.
pub const FILE_SOURCES: [&str; 14] = [
    "ACQUIREMEDIA",
    "CN_SEC_INFO",
    "COMPANIES_HOUSE",
    "EDGAR_SYSTEM",
    "EGYPT_STOCK_EX",
    "KLOOKS",
    "KOLON_BENIT",
    "NZX",
    "PALESTINE_SEC_EX",
    "PHILIPPINE_STOCK_EX",
    "SINGAPORE_STOCK_EX",
    "SP_GLOBAL",
    "SP_GLOBAL_MEG",
    "STOCK_EXCHANGE",
];

/// Language filter sent with every request.
pub const LANGUAGE_IDS: [i32; 1] = [0];

/// Body of one documents-search POST.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchRequest {
    pub properties: SearchProperties,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProperties {
    pub company_id: Vec<i64>,
    pub min_period_date: String,
    pub max_period_date: String,
    pub file_source: Vec<&'static str>,
    pub language_id: Vec<i32>,
    pub file_type_id: Vec<i32>,
}

impl SearchRequest {
    pub fn new(criteria: &SearchCriteria, window: &DateWindow) -> Self {
        Self {
            properties: SearchProperties {
                company_id: criteria.company_ids().iter().copied().collect(),
                min_period_date: window.min_period_date(),
                max_period_date: window.max_period_date(),
                file_source: FILE_SOURCES.to_vec(),
                language_id: LANGUAGE_IDS.to_vec(),
                file_type_id: criteria.file_type_ids().iter().copied().collect(),
            },
        }
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
