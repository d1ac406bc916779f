use crate::error::CoreError;
use crate::models::{EventOverride, EventStatus, UpdateEventStatus};
use crate::repository::{ScheduleRepository, SqliteRepository};
use crate::rule::normalize_instant;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
impl super::OverrideRepository for SqliteRepository {
    async fn upsert_event_status(&self, data: UpdateEventStatus) -> Result<EventOverride, CoreError> {
        let event_datetime = parse_event_datetime(&data.event_datetime)?;

        let schedule = self
            .find_schedule_by_id(data.schedule_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Schedule {}", data.schedule_id)))?;
        if !schedule.rule()?.contains(event_datetime) {
            return Err(CoreError::NotAnOccurrence(event_datetime.to_rfc3339()));
        }

        let now = Utc::now();
        // A single statement keeps concurrent writers from racing on the unique key
        sqlx::query(
            r#"INSERT INTO event_overrides (id, schedule_id, event_datetime, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (schedule_id, event_datetime)
            DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at"#,
        )
        .bind(Uuid::now_v7())
        .bind(data.schedule_id)
        .bind(event_datetime)
        .bind(data.status)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        let stored: EventOverride =
            sqlx::query_as("SELECT * FROM event_overrides WHERE schedule_id = $1 AND event_datetime = $2")
                .bind(data.schedule_id)
                .bind(event_datetime)
                .fetch_one(self.pool())
                .await?;

        tracing::debug!(
            schedule_id = %stored.schedule_id,
            event_datetime = %stored.event_datetime,
            status = %stored.status,
            "event status stored"
        );
        Ok(stored)
    }

    async fn find_overrides_for_schedule(
        &self,
        schedule_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventOverride>, CoreError> {
        let overrides = sqlx::query_as(
            r#"SELECT * FROM event_overrides
            WHERE schedule_id = $1 AND event_datetime >= $2 AND event_datetime <= $3
            ORDER BY event_datetime"#,
        )
        .bind(schedule_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(overrides)
    }

    async fn count_overrides_by_status(&self, status: EventStatus) -> Result<i64, CoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_overrides WHERE status = $1")
            .bind(status)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn count_overrides_with_status_before(
        &self,
        status: EventStatus,
        before: DateTime<Utc>,
    ) -> Result<i64, CoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM event_overrides WHERE status = $1 AND event_datetime < $2")
                .bind(status)
                .bind(before)
                .fetch_one(self.pool())
                .await?;
        Ok(count)
    }

    async fn find_override_instants_before(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<(Uuid, DateTime<Utc>)>, CoreError> {
        let rows: Vec<(Uuid, DateTime<Utc>)> =
            sqlx::query_as("SELECT schedule_id, event_datetime FROM event_overrides WHERE event_datetime < $1")
                .bind(before)
                .fetch_all(self.pool())
                .await?;
        Ok(rows)
    }
}

/// Parses an RFC 3339 timestamp in any offset and normalizes it to whole
/// UTC seconds, the form overrides are keyed by.
pub(crate) fn parse_event_datetime(value: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| normalize_instant(dt.with_timezone(&Utc)))
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2025-01-02T09:00:00Z")]
    #[case("2025-01-02T09:00:00+00:00")]
    #[case("2025-01-02T11:00:00+02:00")]
    #[case("2025-01-02T09:00:00.750Z")]
    #[case(" 2025-01-02T09:00:00Z ")]
    fn test_parse_event_datetime_normalizes_to_utc_seconds(#[case] input: &str) {
        let expected = Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap();
        assert_eq!(parse_event_datetime(input).unwrap(), expected);
    }

    #[rstest]
    #[case("2025-01-02")]
    #[case("2025-01-02 09:00")]
    #[case("not a date")]
    #[case("")]
    fn test_parse_event_datetime_rejects_non_rfc3339(#[case] input: &str) {
        assert!(matches!(parse_event_datetime(input), Err(CoreError::InvalidDate(_))));
    }
}
