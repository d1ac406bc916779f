use crate::error::CoreError;
use crate::models::ResolvedEvent;
use crate::recurrence::{expand, index_overrides, merge};
use crate::repository::{OverrideRepository, ScheduleRepository, SqliteRepository};
use crate::window::QueryWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

impl SqliteRepository {
    /// Expands the schedule over an already validated window and applies its
    /// overrides.
    async fn resolve_window(
        &self,
        schedule_id: Uuid,
        window: QueryWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResolvedEvent>, CoreError> {
        let schedule = self
            .find_schedule_by_id(schedule_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Schedule {}", schedule_id)))?;
        let rule = schedule.rule()?;

        let occurrences = expand(&rule, window.start(), window.end(), true);
        let overrides = self
            .find_overrides_for_schedule(schedule_id, window.start(), window.end())
            .await?;

        tracing::debug!(
            %schedule_id,
            window_start = %window.start(),
            window_end = %window.end(),
            occurrences = occurrences.len(),
            overrides = overrides.len(),
            "resolving events"
        );
        Ok(merge(&occurrences, &index_overrides(overrides), &schedule, now))
    }
}

#[async_trait]
impl super::EventRepository for SqliteRepository {
    async fn find_events_in_window(
        &self,
        schedule_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResolvedEvent>, CoreError> {
        let window = QueryWindow::new(start, end, self.config().max_window_days)?;
        self.resolve_window(schedule_id, window, now).await
    }

    async fn find_events_for_current_month(
        &self,
        schedule_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResolvedEvent>, CoreError> {
        let window = QueryWindow::current_month(now, self.config().max_window_days)?;
        self.resolve_window(schedule_id, window, now).await
    }
}
