//! Key-value store for the dashboard metrics snapshot.
//!
//! A cache is an optimization only. [`crate::metrics::MetricsAggregator`]
//! logs and ignores every error returned from here.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::time::Duration;

use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::DashboardMetrics;

/// Key the dashboard snapshot is stored under.
pub const DASHBOARD_METRICS_KEY: &str = "dashboard_metrics";

#[async_trait]
pub trait MetricsCache: Send + Sync {
    /// The stored snapshot, or `None` when absent or expired.
    async fn get(&self) -> Result<Option<DashboardMetrics>, CoreError>;
    async fn set(&self, metrics: &DashboardMetrics, ttl: Duration) -> Result<(), CoreError>;
    async fn invalidate(&self) -> Result<(), CoreError>;
}

/// Cache backed by the `metrics_cache` table of the main database.
pub struct SqliteMetricsCache {
    pool: DbPool,
}

impl SqliteMetricsCache {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetricsCache for SqliteMetricsCache {
    async fn get(&self) -> Result<Option<DashboardMetrics>, CoreError> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM metrics_cache WHERE cache_key = $1 AND expires_at > $2")
                .bind(DASHBOARD_METRICS_KEY)
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?;

        payload
            .map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(Into::into)
    }

    async fn set(&self, metrics: &DashboardMetrics, ttl: Duration) -> Result<(), CoreError> {
        let ttl = TimeDelta::from_std(ttl).map_err(|e| CoreError::Cache(e.to_string()))?;
        let payload = serde_json::to_string(metrics)?;

        sqlx::query(
            r#"INSERT INTO metrics_cache (cache_key, payload, expires_at) VALUES ($1, $2, $3)
            ON CONFLICT (cache_key) DO UPDATE SET payload = excluded.payload, expires_at = excluded.expires_at"#,
        )
        .bind(DASHBOARD_METRICS_KEY)
        .bind(payload)
        .bind(Utc::now() + ttl)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), CoreError> {
        sqlx::query("DELETE FROM metrics_cache WHERE cache_key = $1")
            .bind(DASHBOARD_METRICS_KEY)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(feature = "redis")]
pub use self::redis_cache::RedisMetricsCache;

#[cfg(feature = "redis")]
mod redis_cache {
    use super::*;
    use redis::aio::ConnectionManager;

    fn cache_error(e: redis::RedisError) -> CoreError {
        CoreError::Cache(e.to_string())
    }

    /// Cache shared between processes through Redis. Expiry is left to the
    /// server via `SETEX`.
    #[derive(Clone)]
    pub struct RedisMetricsCache {
        conn: ConnectionManager,
    }

    impl RedisMetricsCache {
        pub async fn connect(url: &str) -> Result<Self, CoreError> {
            let client = redis::Client::open(url).map_err(cache_error)?;
            let conn = ConnectionManager::new(client).await.map_err(cache_error)?;
            tracing::debug!("connected to redis metrics cache");
            Ok(Self { conn })
        }
    }

    #[async_trait]
    impl MetricsCache for RedisMetricsCache {
        async fn get(&self) -> Result<Option<DashboardMetrics>, CoreError> {
            let mut conn = self.conn.clone();
            let payload = redis::AsyncCommands::get::<_, Option<String>>(&mut conn, DASHBOARD_METRICS_KEY)
                .await
                .map_err(cache_error)?;
            payload
                .map(|payload| serde_json::from_str(&payload))
                .transpose()
                .map_err(Into::into)
        }

        async fn set(&self, metrics: &DashboardMetrics, ttl: Duration) -> Result<(), CoreError> {
            let mut conn = self.conn.clone();
            let payload = serde_json::to_string(metrics)?;
            // SETEX rejects a zero expiry
            let seconds = ttl.as_secs().max(1);
            redis::AsyncCommands::set_ex::<_, _, ()>(&mut conn, DASHBOARD_METRICS_KEY, payload, seconds)
                .await
                .map_err(cache_error)
        }

        async fn invalidate(&self) -> Result<(), CoreError> {
            let mut conn = self.conn.clone();
            redis::AsyncCommands::del::<_, ()>(&mut conn, DASHBOARD_METRICS_KEY)
                .await
                .map_err(cache_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::establish_connection;
    use tempfile::TempDir;

    async fn sqlite_cache() -> (SqliteMetricsCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("cache.db");
        let pool = establish_connection(db_path.to_str().unwrap()).await.unwrap();
        (SqliteMetricsCache::new(pool), dir)
    }

    fn metrics() -> DashboardMetrics {
        DashboardMetrics {
            total_events: 12,
            completed: 3,
            overdue: 4,
            in_progress: 1,
        }
    }

    #[tokio::test]
    async fn test_sqlite_cache_round_trip_and_invalidate() {
        let (cache, _dir) = sqlite_cache().await;
        assert_eq!(cache.get().await.unwrap(), None);

        cache.set(&metrics(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get().await.unwrap(), Some(metrics()));

        let updated = DashboardMetrics { completed: 4, ..metrics() };
        cache.set(&updated, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get().await.unwrap(), Some(updated));

        cache.invalidate().await.unwrap();
        assert_eq!(cache.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_cache_expired_entry_is_a_miss() {
        let (cache, _dir) = sqlite_cache().await;
        cache.set(&metrics(), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get().await.unwrap(), None);
    }
}
