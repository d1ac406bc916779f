use anyhow::Result;
use cadence_core::metrics::MetricsAggregator;
use cadence_core::models::{MessageResponse, UpdateEventStatus};
use cadence_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::StatusCommand;
use crate::commands::print_json;
use crate::util::resolve_schedule_id;

pub async fn update_status<R: Repository>(
    repo: &R,
    metrics: &MetricsAggregator<'_, R>,
    command: StatusCommand,
) -> Result<()> {
    let schedule_id = resolve_schedule_id(repo, &command.id).await?;

    let stored = repo
        .upsert_event_status(UpdateEventStatus {
            schedule_id,
            event_datetime: command.event_datetime,
            status: command.status,
        })
        .await?;
    metrics.invalidate().await;

    let response = MessageResponse::status_updated();
    if command.json {
        return print_json(&response);
    }

    println!(
        "{} {}: {} is now {}",
        "✓".style(Style::new().green().bold()),
        response.message,
        stored.event_datetime.to_rfc3339().yellow(),
        stored.status.bold()
    );
    Ok(())
}
