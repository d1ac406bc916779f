use cadence_core::models::EventStatus;
use clap::{Parser, Subcommand};

/// Recurring schedules with on-demand occurrence expansion
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a recurring schedule
    Create(CreateCommand),
    /// List schedules
    List(ListCommand),
    /// List the occurrences of a schedule
    Events(EventsCommand),
    /// Set the status of one occurrence
    Status(StatusCommand),
    /// Show dashboard totals across all schedules
    Dashboard(DashboardCommand),
    /// Estimate how many occurrences a schedule would have
    Estimate(EstimateCommand),
    /// Expand a raw recurrence rule over a date range
    Expand(ExpandCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    /// The name of the recurring task
    pub task_name: String,
    /// First day of the schedule (YYYY-MM-DD or e.g. "today")
    #[arg(long)]
    pub start: String,
    /// Last day of the schedule (YYYY-MM-DD or e.g. "next friday")
    #[arg(long)]
    pub end: String,
    /// Frequency: hourly, daily, weekly, monthly or yearly
    #[arg(long)]
    pub every: String,
    /// Number of frequency steps between occurrences
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub interval: i64,
    /// Time of day of each occurrence, UTC
    #[arg(long, default_value = "00:00", help = "Time of day, HH:MM in UTC")]
    pub at: String,
    /// Print the response as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct EventsCommand {
    /// Schedule ID or a unique prefix of it
    pub id: String,
    /// First day of the range, defaults to the current month
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// Last day of the range (inclusive)
    #[arg(long, requires = "from")]
    pub to: Option<String>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCommand {
    /// Schedule ID or a unique prefix of it
    pub id: String,
    /// The occurrence, RFC 3339 (e.g. 2025-01-02T09:00:00Z)
    pub event_datetime: String,
    /// pending, in-progress, completed or overdue
    pub status: EventStatus,
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DashboardCommand {
    /// Recompute instead of reading the cached snapshot
    #[arg(long)]
    pub no_cache: bool,
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct EstimateCommand {
    #[arg(long)]
    pub start: String,
    #[arg(long)]
    pub end: String,
    #[arg(long)]
    pub every: String,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub interval: i64,
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ExpandCommand {
    /// Rule in canonical form, e.g. FREQ=DAILY;DTSTART=20250101T090000Z;INTERVAL=1;UNTIL=20250105T090000Z
    pub rule: String,
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub to: String,
    /// Drop occurrences that fall exactly on the range bounds
    #[arg(long)]
    pub exclusive: bool,
    #[arg(long)]
    pub json: bool,
}
