use anyhow::Result;
use cadence_core::error::CoreError;
use cadence_core::recurrence::expand;
use cadence_core::rule::RecurrenceRule;
use cadence_core::window::QueryWindow;
use chrono::{SecondsFormat, Utc};

use crate::cli::ExpandCommand;
use crate::commands::print_json;
use crate::config::Config;
use crate::parser::parse_day;

pub fn expand_rule(command: ExpandCommand, config: &Config) -> Result<()> {
    let rule: RecurrenceRule = command.rule.parse().map_err(CoreError::from)?;

    let now = Utc::now();
    let window = QueryWindow::from_dates(
        parse_day(&command.from, now)?,
        parse_day(&command.to, now)?,
        config.max_window_days,
    )?;

    let occurrences: Vec<String> = expand(&rule, window.start(), window.end(), !command.exclusive)
        .into_iter()
        .map(|occurrence| occurrence.to_rfc3339_opts(SecondsFormat::Secs, true))
        .collect();

    if command.json {
        return print_json(&occurrences);
    }
    for occurrence in occurrences {
        println!("{}", occurrence);
    }
    Ok(())
}
