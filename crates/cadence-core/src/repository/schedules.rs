use crate::error::CoreError;
use crate::estimate::{estimate_count, parse_date};
use crate::models::{Frequency, NewScheduleData, Schedule};
use crate::repository::SqliteRepository;
use crate::rule::{normalize_instant, RecurrenceRule};
use crate::window::end_of_day;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;

const TIME_OF_DAY_FORMAT: &str = "%H:%M";

#[async_trait]
impl super::ScheduleRepository for SqliteRepository {
    async fn create_schedule(&self, data: NewScheduleData) -> Result<Schedule, CoreError> {
        let schedule = build_schedule(&data, Utc::now())?;

        sqlx::query(
            r#"INSERT INTO schedules (id, task_name, rrule, total_events, start_date, end_date, frequency, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(schedule.id)
        .bind(&schedule.task_name)
        .bind(&schedule.rrule)
        .bind(schedule.total_events)
        .bind(schedule.start_date)
        .bind(schedule.end_date)
        .bind(schedule.frequency)
        .bind(schedule.created_at)
        .execute(self.pool())
        .await?;

        tracing::debug!(
            schedule_id = %schedule.id,
            rrule = %schedule.rrule,
            total_events = schedule.total_events,
            "schedule created"
        );
        Ok(schedule)
    }

    async fn find_schedule_by_id(&self, id: Uuid) -> Result<Option<Schedule>, CoreError> {
        let schedule = sqlx::query_as("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(schedule)
    }

    async fn find_schedules_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Schedule>, CoreError> {
        // Ids are stored as 16-byte blobs, so match against their hex form
        let hex_prefix: String = short_id.chars().filter(|c| *c != '-').collect::<String>().to_lowercase();
        if hex_prefix.is_empty() || !hex_prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let mut pattern = String::with_capacity(hex_prefix.len() + 1);
        pattern.push_str(&hex_prefix);
        pattern.push('%');

        let schedules = sqlx::query_as("SELECT * FROM schedules WHERE lower(hex(id)) LIKE $1 ORDER BY created_at")
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(schedules)
    }

    async fn find_schedules(&self) -> Result<Vec<Schedule>, CoreError> {
        let schedules = sqlx::query_as("SELECT * FROM schedules ORDER BY created_at, id")
            .fetch_all(self.pool())
            .await?;
        Ok(schedules)
    }

    async fn sum_total_events(&self) -> Result<i64, CoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(total_events), 0) FROM schedules")
            .fetch_one(self.pool())
            .await?;
        Ok(total)
    }
}

/// Validates creation input and derives the stored schedule: the estimate,
/// the canonical rule string and the typed date fields.
///
/// The rule starts on `start_date` at `time_of_day` and runs until the last
/// second of `end_date`.
pub(crate) fn build_schedule(data: &NewScheduleData, created_at: DateTime<Utc>) -> Result<Schedule, CoreError> {
    let task_name = data.task_name.trim();
    if task_name.is_empty() {
        return Err(CoreError::InvalidInput("Task name must not be empty".to_string()));
    }

    let total_events = estimate_count(&data.start_date, &data.end_date, &data.frequency, data.interval)?;

    let start_date = parse_date(&data.start_date)?;
    let end_date = parse_date(&data.end_date)?;
    let frequency: Frequency = data
        .frequency
        .parse()
        .map_err(|_| CoreError::UnsupportedFrequency(data.frequency.clone()))?;
    let interval = u32::try_from(data.interval).map_err(|_| CoreError::InvalidInterval(data.interval))?;
    let time_of_day = NaiveTime::parse_from_str(data.time_of_day.trim(), TIME_OF_DAY_FORMAT)
        .map_err(|_| CoreError::InvalidTimeOfDay(data.time_of_day.clone()))?;

    let rule = RecurrenceRule::new(
        frequency,
        interval,
        start_date.and_time(time_of_day).and_utc(),
        end_of_day(end_date),
    )?;

    Ok(Schedule {
        id: Uuid::now_v7(),
        task_name: task_name.to_string(),
        rrule: rule.to_string(),
        total_events,
        start_date,
        end_date,
        frequency,
        created_at: normalize_instant(created_at),
    })
}
