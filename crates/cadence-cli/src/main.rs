use anyhow::Result;
use cadence_core::cache::{MetricsCache, SqliteMetricsCache};
use cadence_core::db::{self, DbPool};
use cadence_core::error::CoreError;
use cadence_core::metrics::MetricsAggregator;
use cadence_core::repository::SqliteRepository;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod parser;
mod timezone;
mod util;
mod views;

use cli::{Cli, Commands};
use config::Config;

/// Exit status for errors caused by the user's input
const EXIT_CLIENT_ERROR: i32 = 2;
/// Exit status for store, cache and other internal failures
const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (config, config_error) = match Config::new() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config.log_level);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "invalid configuration, using defaults");
    }

    if let Err(e) = run(cli, &config).await {
        std::process::exit(handle_error(e));
    }
}

/// Initialize tracing/logging. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Create(command) => {
            let store = Store::open(config).await?;
            commands::create::create_schedule(&store.repository, &store.metrics(), command).await
        }
        Commands::List(command) => {
            let store = Store::open(config).await?;
            commands::list::list_schedules(&store.repository, command).await
        }
        Commands::Events(command) => {
            let store = Store::open(config).await?;
            commands::events::list_events(&store.repository, command, config).await
        }
        Commands::Status(command) => {
            let store = Store::open(config).await?;
            commands::status::update_status(&store.repository, &store.metrics(), command).await
        }
        Commands::Dashboard(command) => {
            let store = Store::open(config).await?;
            commands::dashboard::show_dashboard(&store.metrics(), command).await
        }
        // Pure commands never open the database
        Commands::Estimate(command) => commands::estimate::estimate(command),
        Commands::Expand(command) => commands::expand::expand_rule(command, config),
    }
}

/// The opened database plus the dashboard cache in front of it
struct Store {
    repository: SqliteRepository,
    cache: Option<Arc<dyn MetricsCache>>,
}

impl Store {
    async fn open(config: &Config) -> Result<Self> {
        let pool = db::establish_connection(&config.database_path).await?;
        let cache = build_cache(config, &pool).await;
        Ok(Self {
            repository: SqliteRepository::new(pool, config.engine()),
            cache,
        })
    }

    fn metrics(&self) -> MetricsAggregator<'_, SqliteRepository> {
        let metrics = MetricsAggregator::new(&self.repository, self.repository.config());
        match &self.cache {
            Some(cache) => metrics.with_cache(Arc::clone(cache)),
            None => metrics,
        }
    }
}

/// Picks the dashboard cache backend. Redis when configured and reachable,
/// otherwise the `metrics_cache` table.
async fn build_cache(config: &Config, pool: &DbPool) -> Option<Arc<dyn MetricsCache>> {
    if !config.cache.enabled {
        return None;
    }

    #[cfg(feature = "redis")]
    {
        if let Some(url) = &config.cache.redis_url {
            match cadence_core::cache::RedisMetricsCache::connect(url).await {
                Ok(cache) => return Some(Arc::new(cache)),
                Err(e) => tracing::warn!(error = %e, "redis cache unavailable, using the database cache"),
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    {
        if config.cache.redis_url.is_some() {
            tracing::warn!("cache.redis_url is set but cadence was built without the redis feature");
        }
    }

    Some(Arc::new(SqliteMetricsCache::new(pool.clone())))
}

/// Prints the error and returns the process exit status.
fn handle_error(err: anyhow::Error) -> i32 {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::AmbiguousId(schedules)) => {
            eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
            eprintln!("Did you mean one of these?");
            for (id, name) in schedules {
                eprintln!("  {} ({})", id.yellow(), name);
            }
            EXIT_CLIENT_ERROR
        }
        Some(CoreError::NotAnOccurrence(at)) => {
            eprintln!(
                "{} {} is not an occurrence of this schedule. Use `cadence events` to list them.",
                "Error:".style(error_style),
                at.yellow()
            );
            EXIT_CLIENT_ERROR
        }
        Some(core_error) if core_error.is_client_error() => {
            eprintln!("{} {}", "Error:".style(error_style), core_error);
            EXIT_CLIENT_ERROR
        }
        _ => {
            eprintln!("{} {:#}", "Error:".style(error_style), err);
            EXIT_FAILURE
        }
    }
}
