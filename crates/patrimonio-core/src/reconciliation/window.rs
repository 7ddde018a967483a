//! Half-open month windows.
//!
//! Every aggregation filters dates with `[start_of_month, start_of_next_month)`.
//! The half-open shape is the load-bearing invariant of this subsystem: a
//! payment dated exactly on the first day of the next month is excluded, one
//! dated the first day of the target month is included.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PatrimonioError;
use crate::PatrimonioResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    /// First day of the target month (inclusive).
    pub start: NaiveDate,
    /// First day of the next month (exclusive).
    pub end: NaiveDate,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> PatrimonioResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            PatrimonioError::InvalidInput {
                field: "year/month".into(),
                reason: format!("{year}-{month} is not a valid month"),
            }
        })?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(|| {
            PatrimonioError::DateError(format!("Cannot compute month after {year}-{month}"))
        })?;
        Ok(MonthWindow { start, end })
    }

    pub fn for_date(date: NaiveDate) -> PatrimonioResult<Self> {
        MonthWindow::new(date.year(), date.month())
    }

    /// Half-open containment: `start <= d < end`.
    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.start && d < self.end
    }

    /// Like `contains` but treats a missing date as outside the window.
    pub fn contains_opt(&self, d: Option<NaiveDate>) -> bool {
        d.map(|d| self.contains(d)).unwrap_or(false)
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn days_in_month(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The window for the preceding month.
    pub fn pred(&self) -> PatrimonioResult<Self> {
        let (year, month) = if self.month() == 1 {
            (self.year() - 1, 12)
        } else {
            (self.year(), self.month() - 1)
        };
        MonthWindow::new(year, month)
    }

    /// Orderable month key, comparable with [`crate::records::MonthlyClosing::ordinal`].
    pub fn ordinal(&self) -> i32 {
        self.year() * 12 + self.month() as i32 - 1
    }
}
