use anyhow::Result;
use cadence_core::repository::Repository;

use crate::cli::ListCommand;
use crate::commands::print_json;
use crate::views::table::display_schedules;

pub async fn list_schedules(repo: &impl Repository, command: ListCommand) -> Result<()> {
    let schedules = repo.find_schedules().await?;

    if command.json {
        return print_json(&schedules);
    }
    display_schedules(&schedules);
    Ok(())
}
