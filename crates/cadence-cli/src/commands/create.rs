use anyhow::Result;
use cadence_core::metrics::MetricsAggregator;
use cadence_core::models::{CreateScheduleResponse, NewScheduleData};
use cadence_core::repository::Repository;
use chrono::Utc;
use owo_colors::{OwoColorize, Style};

use crate::cli::CreateCommand;
use crate::commands::print_json;
use crate::parser::normalize_date;

pub async fn create_schedule<R: Repository>(
    repo: &R,
    metrics: &MetricsAggregator<'_, R>,
    command: CreateCommand,
) -> Result<()> {
    let now = Utc::now();
    let data = NewScheduleData {
        task_name: command.task_name,
        start_date: normalize_date(&command.start, now)?,
        end_date: normalize_date(&command.end, now)?,
        frequency: command.every,
        interval: command.interval,
        time_of_day: command.at,
    };

    let schedule = repo.create_schedule(data).await?;
    metrics.invalidate().await;

    if command.json {
        return print_json(&CreateScheduleResponse::from(&schedule));
    }

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    println!(
        "{} Created schedule: {}",
        "✓".style(success_style),
        schedule.task_name.bright_white().bold()
    );
    println!("  {} ID: {}", "→".style(info_style), schedule.id.to_string().yellow());
    println!("  {} Rule: {}", "→".style(info_style), schedule.rrule);
    println!(
        "  {} Estimated events: {}",
        "→".style(info_style),
        schedule.total_events.to_string().bold()
    );
    Ok(())
}
