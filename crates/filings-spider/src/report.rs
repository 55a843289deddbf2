use crate::error::ReportError;
use isocountry::CountryCode;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Report rows counted per `(country, iso3, year, filetype)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupedCount {
    pub country: String,
    pub iso3: String,
    pub year: i32,
    pub file_type: String,
    pub report_count: u64,
}

/// Total reports of one country, the input of the choropleth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountryTotal {
    pub country: String,
    pub iso3: String,
    pub report_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileTypeShare {
    pub file_type: String,
    pub report_count: u64,
    /// Percentage of the view's reports, in `[0, 100]`.
    pub share: f64,
}

/// A filings report export, grouped.
///
/// The export is a CSV file with the columns `country`, `year`, `filetype` and optionally
/// `iso3`. Header names are trimmed and compared case-insensitively. Without an iso3 value the
/// code is looked up from the country, see [`iso3_for`]. Rows with no iso3, year or filetype are
/// dropped.
#[derive(Clone, Debug, Default)]
pub struct Report {
    grouped: Vec<GroupedCount>,
}

impl Report {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        debug!("loading report from {}", path.display());
        let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, ReportError> {
        Self::from_csv(csv::ReaderBuilder::new().flexible(true).from_reader(reader))
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, ReportError> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_lowercase())
            .collect();
        let column = |name: &str| headers.iter().position(|header| header == name);

        let country_col = column("country").ok_or(ReportError::MissingColumn("country"))?;
        let year_col = column("year").ok_or(ReportError::MissingColumn("year"))?;
        let file_type_col = column("filetype").ok_or(ReportError::MissingColumn("filetype"))?;
        let iso3_col = column("iso3");
        if iso3_col.is_none() {
            debug!("report has no iso3 column, deriving it from the country");
        }

        let mut counts: BTreeMap<(String, String, i32, String), u64> = BTreeMap::new();
        let mut total = 0usize;
        for record in reader.records() {
            let record = record?;
            total += 1;

            let field = |col: Option<usize>| {
                col.and_then(|col| record.get(col))
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
            };
            let country = field(Some(country_col)).unwrap_or_default();
            let iso3 = field(iso3_col).or_else(|| iso3_for(country));
            let (Some(iso3), Some(year), Some(file_type)) = (
                iso3,
                field(Some(year_col)).and_then(parse_year),
                field(Some(file_type_col)),
            ) else {
                trace!("dropping incomplete report row {:?}", record);
                continue;
            };

            *counts
                .entry((country.to_string(), iso3.to_string(), year, file_type.to_string()))
                .or_default() += 1;
        }

        let grouped: Vec<GroupedCount> = counts
            .into_iter()
            .map(|((country, iso3, year, file_type), report_count)| GroupedCount {
                country,
                iso3,
                year,
                file_type,
                report_count,
            })
            .collect();
        debug!("{total} report rows grouped into {} counts", grouped.len());
        if total > 0 && grouped.is_empty() {
            warn!("none of the {total} report rows is complete");
        }

        Ok(Self { grouped })
    }

    pub fn grouped(&self) -> &[GroupedCount] {
        &self.grouped
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.grouped.iter().map(|row| row.year).collect();
        years.into_iter().collect()
    }

    /// Distinct file types, ascending.
    pub fn file_types(&self) -> Vec<String> {
        let types: BTreeSet<&str> = self.grouped.iter().map(|row| row.file_type.as_str()).collect();
        types.into_iter().map(str::to_string).collect()
    }

    /// The counts of one year, restricted to `file_types`.
    pub fn filter<S: AsRef<str>>(&self, year: i32, file_types: &[S]) -> ReportView<'_> {
        let rows = self
            .grouped
            .iter()
            .filter(|row| row.year == year)
            .filter(|row| file_types.iter().any(|t| t.as_ref() == row.file_type))
            .collect();
        ReportView { rows }
    }
}

/// A filtered slice of a [`Report`].
#[derive(Clone, Debug)]
pub struct ReportView<'a> {
    rows: Vec<&'a GroupedCount>,
}

impl<'a> ReportView<'a> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.rows.iter().map(|row| row.report_count).sum()
    }

    /// Reports summed per country, ordered by country name.
    pub fn country_summary(&self) -> Vec<CountryTotal> {
        let mut totals: BTreeMap<&str, CountryTotal> = BTreeMap::new();
        for row in &self.rows {
            totals
                .entry(row.country.as_str())
                .or_insert_with(|| CountryTotal {
                    country: row.country.clone(),
                    iso3: row.iso3.clone(),
                    report_count: 0,
                })
                .report_count += row.report_count;
        }
        totals.into_values().collect()
    }

    /// The `n` countries with the most reports; ties are broken by name.
    pub fn top_countries(&self, n: usize) -> Vec<CountryTotal> {
        let mut totals = self.country_summary();
        totals.sort_by(|a, b| {
            b.report_count
                .cmp(&a.report_count)
                .then_with(|| a.country.cmp(&b.country))
        });
        totals.truncate(n);
        totals
    }

    /// Reports summed per file type, with each type's share of the view.
    pub fn file_type_distribution(&self) -> Vec<FileTypeShare> {
        let total = self.total();
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.file_type.as_str()).or_default() += row.report_count;
        }
        counts
            .into_iter()
            .map(|(file_type, report_count)| FileTypeShare {
                file_type: file_type.to_string(),
                report_count,
                share: if total == 0 {
                    0.0
                } else {
                    report_count as f64 * 100.0 / total as f64
                },
            })
            .collect()
    }

    /// The underlying counts, largest first.
    pub fn rows_by_count(&self) -> Vec<&'a GroupedCount> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b.report_count.cmp(&a.report_count));
        rows
    }
}

// spreadsheet exports sometimes carry years as floats ("2021.0")
fn parse_year(value: &str) -> Option<i32> {
    value.parse::<i32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|year| year.fract() == 0.0)
            .map(|year| year as i32)
    })
}

/// ISO 3166 alpha-3 code of a country given by its alpha-3 code, alpha-2 code or English name,
/// all compared case-insensitively.
///
/// ```rust
/// use filings_spider::report::iso3_for;
///
/// assert_eq!(iso3_for("Germany"), Some("DEU"));
/// assert_eq!(iso3_for("fr"), Some("FRA"));
/// assert_eq!(iso3_for("Atlantis"), None);
/// ```
pub fn iso3_for(country: &str) -> Option<&'static str> {
    let country = country.trim();
    if country.is_empty() {
        return None;
    }
    if let Ok(code) = CountryCode::for_alpha3_caseless(country)
        .or_else(|_| CountryCode::for_alpha2_caseless(country))
    {
        return Some(code.alpha3());
    }
    CountryCode::iter()
        .find(|code| code.name().eq_ignore_ascii_case(country))
        .map(|code| code.alpha3())
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
