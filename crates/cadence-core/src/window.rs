use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::error::CoreError;

/// Default cap on the span of a single occurrence query.
pub const DEFAULT_MAX_WINDOW_DAYS: i64 = 90;

/// A validated, bounded time range for expanding occurrences.
///
/// Construction rejects inverted windows and windows longer than the
/// configured maximum, so the expander never runs on an unbounded range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl QueryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, max_days: i64) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvertedWindow);
        }
        let span = end - start;
        // A cap beyond TimeDelta's range cannot be exceeded
        match TimeDelta::try_days(max_days) {
            Some(cap) if span > cap => Err(CoreError::WindowTooLarge {
                days: span.num_days(),
                max_days,
            }),
            _ => Ok(Self { start, end }),
        }
    }

    /// From the first second of `start` to the last second of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate, max_days: i64) -> Result<Self, CoreError> {
        Self::new(start_of_day(start), end_of_day(end), max_days)
    }

    /// The calendar month containing `now`: from the 1st at 00:00:00 to one
    /// second before the 1st of the next month.
    pub fn current_month(now: DateTime<Utc>, max_days: i64) -> Result<Self, CoreError> {
        let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
            .ok_or_else(|| CoreError::InvalidDate(now.to_rfc3339()))?;
        let next_first = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| CoreError::InvalidDate(now.to_rfc3339()))?;
        Self::new(
            start_of_day(first),
            start_of_day(next_first) - TimeDelta::seconds(1),
            max_days,
        )
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    // 23:59:59 always exists
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|| start_of_day(date))
}
