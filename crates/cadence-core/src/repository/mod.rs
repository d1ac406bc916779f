use crate::config::EngineConfig;
use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    EventOverride, EventStatus, NewScheduleData, ResolvedEvent, Schedule, UpdateEventStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// Domain modules
pub mod events;
pub mod overrides;
pub mod schedules;

// Traits are defined in this module and implemented in respective domain modules

/// Domain-specific trait for schedule operations
#[async_trait]
pub trait ScheduleRepository {
    async fn create_schedule(&self, data: NewScheduleData) -> Result<Schedule, CoreError>;
    async fn find_schedule_by_id(&self, id: Uuid) -> Result<Option<Schedule>, CoreError>;
    async fn find_schedules_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Schedule>, CoreError>;
    async fn find_schedules(&self) -> Result<Vec<Schedule>, CoreError>;
    /// Sum of the stored `total_events` estimates, 0 when there are no schedules
    async fn sum_total_events(&self) -> Result<i64, CoreError>;
}

/// Domain-specific trait for per-occurrence overrides
#[async_trait]
pub trait OverrideRepository {
    /// Inserts or replaces the status of one occurrence (last write wins).
    async fn upsert_event_status(&self, data: UpdateEventStatus) -> Result<EventOverride, CoreError>;
    async fn find_overrides_for_schedule(
        &self,
        schedule_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventOverride>, CoreError>;
    async fn count_overrides_by_status(&self, status: EventStatus) -> Result<i64, CoreError>;
    async fn count_overrides_with_status_before(
        &self,
        status: EventStatus,
        before: DateTime<Utc>,
    ) -> Result<i64, CoreError>;
    /// `(schedule_id, event_datetime)` of every override strictly before `before`
    async fn find_override_instants_before(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<(Uuid, DateTime<Utc>)>, CoreError>;
}

/// Domain-specific trait for listing resolved occurrences
#[async_trait]
pub trait EventRepository {
    /// Occurrences of a schedule inside `[start, end]` with overrides applied.
    /// Fails with `InvertedWindow` or `WindowTooLarge` before touching the store.
    async fn find_events_in_window(
        &self,
        schedule_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResolvedEvent>, CoreError>;
    /// Occurrences in the calendar month containing `now`.
    async fn find_events_for_current_month(
        &self,
        schedule_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResolvedEvent>, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository: ScheduleRepository + OverrideRepository + EventRepository + Send + Sync {}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    config: EngineConfig,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, config: EngineConfig) -> Self {
        Self { pool, config }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Repository for SqliteRepository {}
