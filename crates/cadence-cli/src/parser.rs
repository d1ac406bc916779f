use cadence_core::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_english::{parse_date_string, Dialect};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes a user-supplied date to `YYYY-MM-DD`.
///
/// ISO dates pass through unchanged; anything else goes through
/// `chrono-english` relative to `now` ("today", "next friday", "in 2 weeks").
pub fn normalize_date(input: &str, now: DateTime<Utc>) -> Result<String, CoreError> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(date.format(DATE_FORMAT).to_string());
    }

    parse_date_string(input, now, Dialect::Us)
        .map(|dt| dt.date_naive().format(DATE_FORMAT).to_string())
        .map_err(|e| CoreError::InvalidDate(format!("'{}': {}", input, e)))
}

/// [`normalize_date`] for callers that need the typed date.
pub fn parse_day(input: &str, now: DateTime<Utc>) -> Result<NaiveDate, CoreError> {
    let normalized = normalize_date(input, now)?;
    NaiveDate::parse_from_str(&normalized, DATE_FORMAT).map_err(|_| CoreError::InvalidDate(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        // A Wednesday
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
    }

    #[rstest]
    #[case("2025-03-01", "2025-03-01")]
    #[case(" 2025-03-01 ", "2025-03-01")]
    #[case("today", "2025-01-15")]
    #[case("tomorrow", "2025-01-16")]
    fn test_normalize_date(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_date(input, now()).unwrap(), expected);
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("tomorrow", now()).unwrap(), NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
    }

    #[rstest]
    #[case("not-a-date")]
    #[case("whenever")]
    fn test_normalize_date_rejects_garbage(#[case] input: &str) {
        assert!(matches!(normalize_date(input, now()), Err(CoreError::InvalidDate(_))));
    }
}
