//! # Cadence Core Library
//!
//! Recurring schedules without materialized occurrences. A schedule stores a
//! compact recurrence rule; occurrences are expanded on demand for a bounded
//! window and merged with the per-occurrence status overrides that users
//! have written.
//!
//! ## Core Modules
//!
//! - [`rule`]: Canonical rule strings, parsing and building
//! - [`recurrence`]: Window expansion, override merging and overdue counting
//! - [`estimate`]: Closed-form occurrence count stored at creation
//! - [`window`]: Validated, size-capped query windows
//! - [`repository`]: Data access layer with Repository pattern
//! - [`metrics`]: Dashboard aggregation with a read-through cache
//! - [`cache`]: Cache backends for the dashboard snapshot
//! - [`db`]: Database connection and migration management
//! - [`error`]: Error types shared by every module
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cadence_core::{
//!     config::EngineConfig, db, models::NewScheduleData,
//!     repository::{EventRepository, ScheduleRepository, SqliteRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cadence_core::error::CoreError> {
//!     let pool = db::establish_connection("cadence.db").await?;
//!     let repo = SqliteRepository::new(pool, EngineConfig::default());
//!
//!     let schedule = repo
//!         .create_schedule(NewScheduleData {
//!             task_name: "Water plants".to_string(),
//!             start_date: "2025-01-01".to_string(),
//!             end_date: "2025-03-31".to_string(),
//!             frequency: "DAILY".to_string(),
//!             interval: 2,
//!             time_of_day: "09:00".to_string(),
//!         })
//!         .await?;
//!
//!     let events = repo
//!         .find_events_for_current_month(schedule.id, chrono::Utc::now())
//!         .await?;
//!     println!("{} has {} events this month", schedule.task_name, events.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod estimate;
pub mod metrics;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod rule;
pub mod window;
