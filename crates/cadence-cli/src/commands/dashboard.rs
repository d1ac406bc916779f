use anyhow::Result;
use cadence_core::metrics::MetricsAggregator;
use cadence_core::repository::Repository;
use chrono::Utc;

use crate::cli::DashboardCommand;
use crate::commands::print_json;
use crate::views::table::display_dashboard;

pub async fn show_dashboard<R: Repository>(metrics: &MetricsAggregator<'_, R>, command: DashboardCommand) -> Result<()> {
    let now = Utc::now();
    let totals = if command.no_cache {
        metrics.aggregate(now).await?
    } else {
        metrics.dashboard(now).await?
    };

    if command.json {
        return print_json(&totals);
    }
    display_dashboard(&totals);
    Ok(())
}
