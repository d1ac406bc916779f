use anyhow::Result;
use cadence_core::models::EventsResponse;
use cadence_core::repository::Repository;
use cadence_core::window::{end_of_day, start_of_day};
use chrono::Utc;

use crate::cli::EventsCommand;
use crate::commands::print_json;
use crate::config::Config;
use crate::parser::parse_day;
use crate::util::resolve_schedule_id;
use crate::views::table::display_events;

pub async fn list_events(repo: &impl Repository, command: EventsCommand, config: &Config) -> Result<()> {
    let schedule_id = resolve_schedule_id(repo, &command.id).await?;
    let now = Utc::now();

    let events = match (&command.from, &command.to) {
        (Some(from), Some(to)) => {
            let from = parse_day(from, now)?;
            let to = parse_day(to, now)?;
            repo.find_events_in_window(schedule_id, start_of_day(from), end_of_day(to), now)
                .await?
        }
        _ => repo.find_events_for_current_month(schedule_id, now).await?,
    };

    if command.json {
        return print_json(&EventsResponse { events });
    }
    display_events(&events, &config.display_timezone());
    Ok(())
}
