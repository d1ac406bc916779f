use std::time::Duration;

use crate::window::DEFAULT_MAX_WINDOW_DAYS;

/// Engine settings. Built once at process start and handed to the
/// components that need it; nothing in the crate reads configuration from
/// the environment on its own.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Longest allowed occurrence query, in days
    pub max_window_days: i64,
    /// How long cached dashboard metrics stay valid
    pub metrics_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            metrics_ttl: Duration::from_secs(60),
        }
    }
}
