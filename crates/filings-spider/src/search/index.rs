use super::FilingRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// The part of a [`FilingRecord`] kept per company.
///
/// Serialized as a `[filing_version_id, period_year, file_type_id]` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i64, String, i32)", into = "(i64, String, i32)")]
pub struct FilingEntry {
    pub filing_version_id: i64,
    pub period_year: String,
    pub file_type_id: i32,
}

impl From<FilingRecord> for FilingEntry {
    fn from(record: FilingRecord) -> Self {
        Self {
            filing_version_id: record.filing_version_id,
            period_year: record.period_year,
            file_type_id: record.file_type_id,
        }
    }
}

impl From<(i64, String, i32)> for FilingEntry {
    fn from((filing_version_id, period_year, file_type_id): (i64, String, i32)) -> Self {
        Self {
            filing_version_id,
            period_year,
            file_type_id,
        }
    }
}

impl From<FilingEntry> for (i64, String, i32) {
    fn from(entry: FilingEntry) -> Self {
        (entry.filing_version_id, entry.period_year, entry.file_type_id)
    }
}

impl fmt::Display for FilingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.filing_version_id, self.period_year, self.file_type_id
        )
    }
}

/// Filings found per company id.
///
/// Entries keep the order they were appended in, and duplicates are kept unless [`dedup`] is
/// called.
///
/// [`dedup`]: ResultIndex::dedup
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultIndex(BTreeMap<i64, Vec<FilingEntry>>);

impl ResultIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FilingRecord) {
        self.0
            .entry(record.company_id)
            .or_default()
            .push(FilingEntry::from(record));
    }

    pub fn get(&self, company_id: i64) -> Option<&[FilingEntry]> {
        self.0.get(&company_id).map(Vec::as_slice)
    }

    /// `true` when no company has any entry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Number of entries over every company.
    pub fn filing_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&i64, &Vec<FilingEntry>)> {
        self.0.iter()
    }

    /// Remove repeated entries per company, keeping the first occurrence of each.
    pub fn dedup(&mut self) {
        for entries in self.0.values_mut() {
            let mut seen = HashSet::with_capacity(entries.len());
            entries.retain(|entry| seen.insert(entry.clone()));
        }
    }

    pub fn into_inner(self) -> BTreeMap<i64, Vec<FilingEntry>> {
        self.0
    }
}

impl fmt::Display for ResultIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (company_id, entries) in &self.0 {
            let entries = entries
                .iter()
                .map(FilingEntry::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{company_id}: [{entries}]")?;
        }
        Ok(())
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
