use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::CoreError;
use crate::rule::RecurrenceRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hourly => "HOURLY",
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Length of one step in seconds, for frequencies that advance by a fixed
    /// duration.
    pub fn fixed_period_secs(&self) -> Option<i64> {
        match self {
            Frequency::Hourly => Some(3_600),
            Frequency::Daily => Some(86_400),
            Frequency::Weekly => Some(604_800),
            Frequency::Monthly | Frequency::Yearly => None,
        }
    }

    /// Length of one step in calendar months, for frequencies that advance by
    /// calendar arithmetic.
    pub fn calendar_months(&self) -> Option<u32> {
        match self {
            Frequency::Monthly => Some(1),
            Frequency::Yearly => Some(12),
            Frequency::Hourly | Frequency::Daily | Frequency::Weekly => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HOURLY" => Ok(Frequency::Hourly),
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::InProgress => "in-progress",
            EventStatus::Completed => "completed",
            EventStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid event status: {0}")]
pub struct ParseEventStatusError(String);

impl FromStr for EventStatus {
    type Err = ParseEventStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(EventStatus::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(EventStatus::InProgress),
            "completed" => Ok(EventStatus::Completed),
            "overdue" => Ok(EventStatus::Overdue),
            _ => Err(ParseEventStatusError(s.to_string())),
        }
    }
}

/// A recurring task. The rule is kept in its canonical string form and parsed
/// again on every use.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    /// Primary key, UUIDv7 for time-ordered inserts
    pub id: Uuid,
    pub task_name: String,
    /// Canonical rule string, see [`crate::rule`]
    pub rrule: String,
    /// Creation-time estimate, never recomputed
    pub total_events: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: Frequency,
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    /// Parses the stored rule.
    pub fn rule(&self) -> Result<RecurrenceRule, CoreError> {
        Ok(self.rrule.parse()?)
    }
}

/// A stored status for one occurrence of a schedule.
/// At most one exists per `(schedule_id, event_datetime)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct EventOverride {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub event_datetime: DateTime<Utc>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One occurrence of a schedule after overrides have been applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedEvent {
    /// Set when the status comes from a stored override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub schedule_id: Uuid,
    pub event_datetime: DateTime<Utc>,
    pub status: EventStatus,
    pub task_name: String,
    pub created_at: DateTime<Utc>,
}

impl ResolvedEvent {
    pub fn is_overridden(&self) -> bool {
        self.id.is_some()
    }
}

/// Dashboard totals across every schedule.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardMetrics {
    pub total_events: i64,
    pub completed: i64,
    pub overdue: i64,
    pub in_progress: i64,
}

// ============================================================================
// Request / response shapes
// ============================================================================

/// Input for creating a schedule. Dates are `YYYY-MM-DD`, `time_of_day` is
/// `HH:MM`, `frequency` is matched case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewScheduleData {
    pub task_name: String,
    pub start_date: String,
    pub end_date: String,
    pub frequency: String,
    pub interval: i64,
    pub time_of_day: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateScheduleResponse {
    pub task_name: String,
    pub total_events: i64,
}

impl From<&Schedule> for CreateScheduleResponse {
    fn from(schedule: &Schedule) -> Self {
        Self {
            task_name: schedule.task_name.clone(),
            total_events: schedule.total_events,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventsResponse {
    pub events: Vec<ResolvedEvent>,
}

/// Input for setting the status of one occurrence. `event_datetime` is
/// RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventStatus {
    pub schedule_id: Uuid,
    pub event_datetime: String,
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn status_updated() -> Self {
        Self {
            message: "Event status updated".to_string(),
        }
    }
}
