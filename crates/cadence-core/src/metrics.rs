use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::MetricsCache;
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::models::{DashboardMetrics, EventStatus};
use crate::recurrence::count_unresolved_before;
use crate::repository::{OverrideRepository, ScheduleRepository};

/// Computes dashboard totals, optionally through a read-through cache.
///
/// `overdue` counts the stored `pending` overrides dated before `now` plus
/// every occurrence before `now` that has no override at all. Overrides with
/// any other status never count as overdue.
pub struct MetricsAggregator<'a, R> {
    repo: &'a R,
    cache: Option<Arc<dyn MetricsCache>>,
    ttl: Duration,
}

impl<'a, R> MetricsAggregator<'a, R>
where
    R: ScheduleRepository + OverrideRepository + Sync,
{
    pub fn new(repo: &'a R, config: &EngineConfig) -> Self {
        Self {
            repo,
            cache: None,
            ttl: config.metrics_ttl,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn MetricsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Recomputes the metrics from the store, bypassing the cache.
    ///
    /// Fails if any stored rule no longer parses.
    pub async fn aggregate(&self, now: DateTime<Utc>) -> Result<DashboardMetrics, CoreError> {
        let total_events = self.repo.sum_total_events().await?;
        let completed = self.repo.count_overrides_by_status(EventStatus::Completed).await?;
        let in_progress = self.repo.count_overrides_by_status(EventStatus::InProgress).await?;
        let pending_past = self
            .repo
            .count_overrides_with_status_before(EventStatus::Pending, now)
            .await?;

        let mut overridden: HashMap<Uuid, HashSet<DateTime<Utc>>> = HashMap::new();
        for (schedule_id, event_datetime) in self.repo.find_override_instants_before(now).await? {
            overridden.entry(schedule_id).or_default().insert(event_datetime);
        }

        let none = HashSet::new();
        let mut unresolved: i64 = 0;
        for schedule in self.repo.find_schedules().await? {
            let rule = schedule.rule()?;
            let seen = overridden.get(&schedule.id).unwrap_or(&none);
            let count = count_unresolved_before(&rule, seen, now);
            unresolved = unresolved.saturating_add(i64::try_from(count).unwrap_or(i64::MAX));
        }

        let metrics = DashboardMetrics {
            total_events,
            completed,
            overdue: pending_past.saturating_add(unresolved),
            in_progress,
        };
        tracing::debug!(?metrics, "dashboard metrics computed");
        Ok(metrics)
    }

    /// Serves the cached snapshot when present, otherwise computes and stores
    /// it. Cache failures are logged and never fail the call.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardMetrics, CoreError> {
        if let Some(cache) = &self.cache {
            match cache.get().await {
                Ok(Some(metrics)) => {
                    tracing::debug!("dashboard metrics served from cache");
                    return Ok(metrics);
                }
                Ok(None) => tracing::debug!("dashboard metrics cache miss"),
                Err(e) => tracing::warn!(error = %e, "metrics cache read failed, computing directly"),
            }
        }

        let metrics = self.aggregate(now).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&metrics, self.ttl).await {
                tracing::warn!(error = %e, "failed to store dashboard metrics in cache");
            }
        }
        Ok(metrics)
    }

    /// Drops the cached snapshot. Called after every write.
    pub async fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate().await {
                tracing::warn!(error = %e, "failed to invalidate dashboard metrics cache");
            }
        }
    }
}
