//! Closed-form estimate of how many occurrences a schedule will have.
//!
//! The estimate is computed once when a schedule is created and stored as
//! `total_events`. It is not reconciled with [`crate::recurrence::expand`]:
//! MONTHLY and YEARLY count calendar month/year boundaries and ignore the day
//! of month and the time of day, so the two can disagree.

use chrono::{Datelike, NaiveDate};

use crate::error::CoreError;
use crate::models::Frequency;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Estimates the lifetime occurrence count from raw creation inputs.
///
/// Validation order: interval, dates, range, frequency.
pub fn estimate_count(
    start_date: &str,
    end_date: &str,
    frequency: &str,
    interval: i64,
) -> Result<i64, CoreError> {
    if interval <= 0 {
        return Err(CoreError::InvalidInterval(interval));
    }

    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    if end < start {
        return Err(CoreError::InvalidRange {
            start: start_date.to_string(),
            end: end_date.to_string(),
        });
    }

    let frequency = frequency
        .parse::<Frequency>()
        .map_err(|_| CoreError::UnsupportedFrequency(frequency.to_string()))?;

    Ok(estimate_between(start, end, frequency, interval))
}

/// Typed form of [`estimate_count`]. Expects `interval > 0` and
/// `end >= start`.
///
/// A step longer than `i64::MAX` hours never fits in the range, so an
/// overflowing divisor yields 0.
pub fn estimate_between(start: NaiveDate, end: NaiveDate, frequency: Frequency, interval: i64) -> i64 {
    let hours = (end - start).num_hours();
    let per_step = |step_hours: i64| step_hours.checked_mul(interval).map_or(0, |divisor| hours / divisor);
    match frequency {
        Frequency::Hourly => hours / interval,
        Frequency::Daily => per_step(24),
        Frequency::Weekly => per_step(24 * 7),
        Frequency::Monthly => {
            let months = i64::from(end.year() - start.year()) * 12 + i64::from(end.month())
                - i64::from(start.month());
            months / interval
        }
        Frequency::Yearly => i64::from(end.year() - start.year()) / interval,
    }
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}
