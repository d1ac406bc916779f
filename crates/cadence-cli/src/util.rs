use anyhow::{anyhow, Result};
use cadence_core::error::CoreError;
use cadence_core::repository::Repository;
use uuid::Uuid;

pub async fn resolve_schedule_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(short_id) {
        return Ok(id);
    }
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let schedules = repo.find_schedules_by_short_id_prefix(short_id).await?;
    if schedules.len() == 1 {
        Ok(schedules[0].id)
    } else if schedules.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No schedule found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let schedule_info: Vec<(String, String)> = schedules
            .into_iter()
            .map(|s| (s.id.to_string(), s.task_name))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(schedule_info)))
    }
}
