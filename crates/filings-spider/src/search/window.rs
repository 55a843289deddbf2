use chrono::{Duration, NaiveDate};
use std::fmt;

/// Days added to a window start to reach its (inclusive) end.
pub const WINDOW_SPAN_DAYS: i64 = 89;

/// Days between two consecutive window starts.
pub const WINDOW_STEP_DAYS: i64 = 90;

/// One bounded sub-range of the search date range.
///
/// The end is `start + 89 days` and is not clipped to the end of the overall range, so the last
/// window may reach past it (saturating at [`NaiveDate::MAX`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    fn starting_at(start: NaiveDate) -> Self {
        Self {
            start,
            end: start
                .checked_add_signed(Duration::days(WINDOW_SPAN_DAYS))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Window start as `YYYY-MM-DD`.
    pub fn min_period_date(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// Window end as `YYYY-MM-DD`.
    pub fn max_period_date(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}

/// Iterator over the windows covering `[start, end]`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use filings_spider::search::windows;
///
/// let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
/// let windows: Vec<_> = windows(start, end).collect();
///
/// assert_eq!(windows.len(), 5);
/// assert_eq!(windows[1].min_period_date(), "2020-03-31");
/// assert_eq!(windows[1].max_period_date(), "2020-06-28");
/// ```
pub fn windows(start: NaiveDate, end: NaiveDate) -> DateWindows {
    DateWindows {
        next: Some(start),
        end,
    }
}

#[derive(Clone, Debug)]
pub struct DateWindows {
    // `None` once stepping would run past the last representable date
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateWindows {
    type Item = DateWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next.filter(|next| *next <= self.end)?;
        self.next = start.checked_add_signed(Duration::days(WINDOW_STEP_DAYS));
        Some(DateWindow::starting_at(start))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.next.map_or(0, |next| window_count(next, self.end));
        (len, Some(len))
    }
}

impl ExactSizeIterator for DateWindows {}

/// Number of windows needed to cover `[start, end]`: `floor(days / 90) + 1`, or zero when the
/// range is reversed.
pub fn window_count(start: NaiveDate, end: NaiveDate) -> usize {
    if start > end {
        return 0;
    }
    ((end - start).num_days() / WINDOW_STEP_DAYS) as usize + 1
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
