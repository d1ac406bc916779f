use thiserror::Error;

use crate::rule::RuleError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Interval must be greater than zero, got {0}")]
    InvalidInterval(i64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("End date {end} must not be before start date {start}")]
    InvalidRange { start: String, end: String },

    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTimeOfDay(String),

    #[error("Date range must not exceed {max_days} days (got {days} days)")]
    WindowTooLarge { days: i64, max_days: i64 },

    #[error("Window end must be after window start")]
    InvertedWindow,

    #[error("{0} is not an occurrence of this schedule")]
    NotAnOccurrence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, task name)
}

impl CoreError {
    /// Whether the failure was caused by the caller's input (a 4xx-class
    /// error) rather than by the store or the cache.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            CoreError::Database(_)
                | CoreError::Migration(_)
                | CoreError::Io(_)
                | CoreError::Serialization(_)
                | CoreError::Cache(_)
        )
    }
}
