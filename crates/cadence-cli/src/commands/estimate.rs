use anyhow::Result;
use cadence_core::estimate::estimate_count;
use chrono::Utc;
use serde_json::json;

use crate::cli::EstimateCommand;
use crate::commands::print_json;
use crate::parser::normalize_date;

pub fn estimate(command: EstimateCommand) -> Result<()> {
    let now = Utc::now();
    let start = normalize_date(&command.start, now)?;
    let end = normalize_date(&command.end, now)?;

    let total_events = estimate_count(&start, &end, &command.every, command.interval)?;

    if command.json {
        return print_json(&json!({ "total_events": total_events }));
    }
    println!("{}", total_events);
    Ok(())
}
