//! Recurrence rule model and its wire form.
//!
//! A rule is stored and exchanged as a semicolon separated string:
//!
//! ```text
//! FREQ=DAILY;DTSTART=20250101T090000Z;INTERVAL=1;UNTIL=20250105T090000Z
//! ```
//!
//! [`RecurrenceRule`] is the parsed, validated form. It is cheap to copy and is
//! rebuilt from the stored string every time a schedule is read.

use chrono::{DateTime, Datelike, Months, NaiveDateTime, TimeDelta, Timelike, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::Frequency;

/// Basic ISO 8601 instant format used by `DTSTART` and `UNTIL`.
pub const INSTANT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("missing required key {0}")]
    MissingKey(&'static str),

    #[error("duplicate key {0}")]
    DuplicateKey(String),

    #[error("unsupported key {0}")]
    UnsupportedKey(String),

    #[error("malformed segment '{0}', expected KEY=VALUE")]
    MalformedSegment(String),

    #[error("unknown frequency '{0}'")]
    UnknownFrequency(String),

    #[error("invalid interval '{0}', expected a positive integer")]
    InvalidInterval(String),

    #[error("invalid instant '{0}', expected YYYYMMDDTHHMMSSZ")]
    InvalidInstant(String),

    #[error("UNTIL {until} is before DTSTART {start}")]
    UntilBeforeStart { start: String, until: String },
}

/// Truncates an instant to whole seconds.
///
/// Every instant that is stored or used as an override join key goes through
/// this function, so equal occurrences always compare equal.
#[inline]
pub fn normalize_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.with_nanosecond(0).unwrap_or(instant)
}

/// Formats an instant in the rule wire format.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

/// Parses an instant in the rule wire format (`YYYYMMDDTHHMMSSZ`).
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, RuleError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 16
        && bytes[8] == b'T'
        && bytes[15] == b'Z'
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[9..15].iter().all(u8::is_ascii_digit);
    if !well_formed {
        return Err(RuleError::InvalidInstant(value.to_string()));
    }

    NaiveDateTime::parse_from_str(value, INSTANT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| RuleError::InvalidInstant(value.to_string()))
}

/// One step of a rule's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Occurs(DateTime<Utc>),
    /// The anchor day does not exist in the target month. Carries the first
    /// day of that month at the rule's time of day.
    Skipped(DateTime<Utc>),
}

impl Slot {
    /// Sort key of the slot. Strictly increasing in `k`.
    pub(crate) fn position(self) -> DateTime<Utc> {
        match self {
            Slot::Occurs(at) | Slot::Skipped(at) => at,
        }
    }
}

/// A validated recurrence rule: `frequency` x `interval` steps from `start`,
/// bounded by `until` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
    start: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl RecurrenceRule {
    /// Builds a rule from structured fields.
    ///
    /// Both instants are truncated to whole seconds. Fails when `interval` is
    /// zero or `until` is before `start`.
    pub fn new(
        frequency: Frequency,
        interval: u32,
        start: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Self, RuleError> {
        if interval == 0 {
            return Err(RuleError::InvalidInterval(interval.to_string()));
        }

        let start = normalize_instant(start);
        let until = normalize_instant(until);
        if until < start {
            return Err(RuleError::UntilBeforeStart {
                start: format_instant(start),
                until: format_instant(until),
            });
        }

        Ok(Self {
            frequency,
            interval,
            start,
            until,
        })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn until(&self) -> DateTime<Utc> {
        self.until
    }

    /// Returns the `k`-th slot (0-based), ignoring `until`.
    ///
    /// Calendar frequencies are anchored on `start`: slot `k` of a monthly
    /// rule lands on the start's day of month, `k * interval` months later.
    /// When that day does not exist in the target month the slot is
    /// [`Slot::Skipped`], so a rule starting on the 31st only fires in
    /// 31-day months and a yearly rule from 29 Feb only in leap years.
    /// `None` means the calendar overflowed.
    pub(crate) fn nth(&self, k: u64) -> Option<Slot> {
        let steps = k.checked_mul(u64::from(self.interval))?;
        match self.frequency {
            Frequency::Hourly | Frequency::Daily | Frequency::Weekly => {
                let seconds = i64::try_from(steps)
                    .ok()?
                    .checked_mul(self.frequency.fixed_period_secs()?)?;
                self.start
                    .checked_add_signed(TimeDelta::try_seconds(seconds)?)
                    .map(Slot::Occurs)
            }
            Frequency::Monthly | Frequency::Yearly => {
                let months = steps.checked_mul(u64::from(self.frequency.calendar_months()?))?;
                let anchor = self.start.date_naive();
                let month_start = anchor
                    .with_day(1)?
                    .checked_add_months(Months::new(u32::try_from(months).ok()?))?;
                let time = self.start.time();
                Some(match month_start.with_day(anchor.day()) {
                    Some(day) => Slot::Occurs(day.and_time(time).and_utc()),
                    None => Slot::Skipped(month_start.and_time(time).and_utc()),
                })
            }
        }
    }

    /// Smallest index `k` whose slot position is at or after `instant`.
    pub(crate) fn first_index_at_or_after(&self, instant: DateTime<Utc>) -> Option<u64> {
        if instant <= self.start {
            return Some(0);
        }

        match self.frequency {
            Frequency::Hourly | Frequency::Daily | Frequency::Weekly => {
                let step = self
                    .frequency
                    .fixed_period_secs()?
                    .checked_mul(i64::from(self.interval))?;
                let elapsed = (instant - self.start).num_seconds();
                // ceil(elapsed / step) for positive operands
                let k = (elapsed + step - 1) / step;
                u64::try_from(k).ok()
            }
            Frequency::Monthly | Frequency::Yearly => {
                let step = i64::from(self.frequency.calendar_months()?) * i64::from(self.interval);
                let months = i64::from(instant.year() - self.start.year()) * 12
                    + i64::from(instant.month())
                    - i64::from(self.start.month());
                let mut k = u64::try_from((months / step - 1).max(0)).ok()?;
                while self.nth(k)?.position() < instant {
                    k += 1;
                }
                Some(k)
            }
        }
    }

    /// Whether `instant` is exactly one of this rule's occurrences.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if instant < self.start || instant > self.until {
            return false;
        }
        self.first_index_at_or_after(instant)
            .and_then(|k| self.nth(k))
            .is_some_and(|slot| slot == Slot::Occurs(instant))
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FREQ={};DTSTART={};INTERVAL={};UNTIL={}",
            self.frequency,
            format_instant(self.start),
            self.interval,
            format_instant(self.until)
        )
    }
}

impl FromStr for RecurrenceRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut frequency = None;
        let mut interval = None;
        let mut start = None;
        let mut until = None;

        for segment in s.trim().split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| RuleError::MalformedSegment(segment.to_string()))?;
            let key = key.trim().to_ascii_uppercase();
            let value = value.trim();

            match key.as_str() {
                "FREQ" => {
                    let parsed = value
                        .parse::<Frequency>()
                        .map_err(|_| RuleError::UnknownFrequency(value.to_string()))?;
                    set_once(&mut frequency, key, parsed)?;
                }
                "INTERVAL" => {
                    let parsed = value
                        .parse::<u32>()
                        .map_err(|_| RuleError::InvalidInterval(value.to_string()))?;
                    set_once(&mut interval, key, parsed)?;
                }
                "DTSTART" => set_once(&mut start, key, parse_instant(value)?)?,
                "UNTIL" => set_once(&mut until, key, parse_instant(value)?)?,
                _ => return Err(RuleError::UnsupportedKey(key)),
            }
        }

        Self::new(
            frequency.ok_or(RuleError::MissingKey("FREQ"))?,
            interval.ok_or(RuleError::MissingKey("INTERVAL"))?,
            start.ok_or(RuleError::MissingKey("DTSTART"))?,
            until.ok_or(RuleError::MissingKey("UNTIL"))?,
        )
    }
}

fn set_once<T>(slot: &mut Option<T>, key: String, value: T) -> Result<(), RuleError> {
    if slot.replace(value).is_some() {
        return Err(RuleError::DuplicateKey(key));
    }
    Ok(())
}

/// Parses a rule from its wire form.
pub fn parse(rule: &str) -> Result<RecurrenceRule, RuleError> {
    rule.parse()
}

/// Builds the canonical wire form of a rule. Inverse of [`parse`].
pub fn build(
    frequency: Frequency,
    interval: u32,
    start: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<String, RuleError> {
    RecurrenceRule::new(frequency, interval, start, until).map(|rule| rule.to_string())
}
