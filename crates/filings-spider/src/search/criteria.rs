use super::window::{window_count, windows, DateWindows};
use crate::error::CriteriaError;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Earliest year a search range may start in.
pub const MIN_YEAR: i32 = 1990;

/// What to search for; fixed for the duration of one aggregation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    company_ids: BTreeSet<i64>,
    file_type_ids: BTreeSet<i32>,
    date_range_start: NaiveDate,
    date_range_end: NaiveDate,
}

impl SearchCriteria {
    pub fn new(
        company_ids: impl IntoIterator<Item = i64>,
        file_type_ids: impl IntoIterator<Item = i32>,
        date_range_start: NaiveDate,
        date_range_end: NaiveDate,
    ) -> Result<Self, CriteriaError> {
        Self::new_at(
            company_ids,
            file_type_ids,
            date_range_start,
            date_range_end,
            Local::now().date_naive(),
        )
    }

    fn new_at(
        company_ids: impl IntoIterator<Item = i64>,
        file_type_ids: impl IntoIterator<Item = i32>,
        date_range_start: NaiveDate,
        date_range_end: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, CriteriaError> {
        let criteria = Self {
            company_ids: company_ids.into_iter().collect(),
            file_type_ids: file_type_ids.into_iter().collect(),
            date_range_start,
            date_range_end,
        };
        criteria.validate_at(today)?;
        Ok(criteria)
    }

    /// Build criteria from a start and end year, the way the search form does.
    ///
    /// The range opens on January 1st of `start_year`. It closes on December 31st of `end_year`,
    /// or on `today` when `end_year` is the current year (or later).
    pub fn from_years(
        company_ids: impl IntoIterator<Item = i64>,
        file_type_ids: impl IntoIterator<Item = i32>,
        start_year: i32,
        end_year: i32,
        today: NaiveDate,
    ) -> Result<Self, CriteriaError> {
        let max = today.year();
        for year in [start_year, end_year] {
            if !(MIN_YEAR..=max).contains(&year) {
                return Err(CriteriaError::YearOutOfRange {
                    year,
                    min: MIN_YEAR,
                    max,
                });
            }
        }
        if start_year > end_year {
            return Err(CriteriaError::YearsReversed {
                start: start_year,
                end: end_year,
            });
        }

        // years are range checked above, so both dates exist
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap_or(today);
        let end = if end_year >= max {
            today
        } else {
            NaiveDate::from_ymd_opt(end_year, 12, 31).unwrap_or(today)
        };

        Self::new_at(company_ids, file_type_ids, start, end, today)
    }

    /// Check the invariants; criteria read from a file go through this as well.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        self.validate_at(Local::now().date_naive())
    }

    /// [`validate`](Self::validate) against a given `today`: the range must lie within
    /// January 1st of [`MIN_YEAR`] and `today`.
    pub fn validate_at(&self, today: NaiveDate) -> Result<(), CriteriaError> {
        if self.company_ids.is_empty() {
            return Err(CriteriaError::NoCompanies);
        }
        let min = NaiveDate::from_ymd_opt(MIN_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
        for date in [self.date_range_start, self.date_range_end] {
            if date < min || date > today {
                return Err(CriteriaError::DateOutOfRange {
                    date,
                    min,
                    max: today,
                });
            }
        }
        if self.date_range_start > self.date_range_end {
            return Err(CriteriaError::StartAfterEnd {
                start: self.date_range_start,
                end: self.date_range_end,
            });
        }
        Ok(())
    }

    pub fn company_ids(&self) -> &BTreeSet<i64> {
        &self.company_ids
    }

    pub fn file_type_ids(&self) -> &BTreeSet<i32> {
        &self.file_type_ids
    }

    pub fn date_range_start(&self) -> NaiveDate {
        self.date_range_start
    }

    pub fn date_range_end(&self) -> NaiveDate {
        self.date_range_end
    }

    pub fn windows(&self) -> DateWindows {
        windows(self.date_range_start, self.date_range_end)
    }

    pub fn window_count(&self) -> usize {
        window_count(self.date_range_start, self.date_range_end)
    }

    /// Company ids joined for log lines, e.g. `"4004205, 21835"`.
    pub fn companies_label(&self) -> String {
        self.company_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
