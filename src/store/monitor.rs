//! Per-operation query statistics and slow-query warnings.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::store::{StoreError, StoreHealth, User, UserStore};

/// One operation's usage, as rendered in the health report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStat {
    pub operation: String,
    pub count: u64,
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Usage {
    count: u64,
    last_used: DateTime<Utc>,
}

/// Counts every store operation and warns about the slow ones. Shared
/// between the [`Monitored`] wrapper that feeds it and the health
/// handler that reads it.
#[derive(Debug)]
pub struct QueryMonitor {
    slow_threshold_ms: u64,
    stats: DashMap<&'static str, Usage>,
}

impl QueryMonitor {
    pub fn new(slow_threshold_ms: u64) -> Self {
        Self {
            slow_threshold_ms,
            stats: DashMap::new(),
        }
    }

    /// Count the call up front, so failed operations show in the stats
    /// too.
    pub fn begin(&self, operation: &'static str) {
        self.stats
            .entry(operation)
            .and_modify(|usage| {
                usage.count += 1;
                usage.last_used = Utc::now();
            })
            .or_insert_with(|| Usage {
                count: 1,
                last_used: Utc::now(),
            });
    }

    pub fn finish(&self, operation: &'static str, elapsed_ms: u64, failed: bool) {
        if failed {
            tracing::error!("Query failed: {} after {}ms", operation, elapsed_ms);
        } else if elapsed_ms > self.slow_threshold_ms {
            tracing::warn!("Slow query detected: {} took {}ms", operation, elapsed_ms);
        }
    }

    pub fn total_operations(&self) -> u64 {
        self.stats.iter().map(|entry| entry.count).sum()
    }

    /// The `n` most-used operations, busiest first, name as tiebreak.
    pub fn top(&self, n: usize) -> Vec<OperationStat> {
        let mut all: Vec<OperationStat> = self
            .stats
            .iter()
            .map(|entry| OperationStat {
                operation: (*entry.key()).to_string(),
                count: entry.count,
                last_used: entry.last_used,
            })
            .collect();

        all.sort_by(|a, b| b.count.cmp(&a.count).then(a.operation.cmp(&b.operation)));
        all.truncate(n);
        all
    }
}

/// [`UserStore`] decorator that records every call in a [`QueryMonitor`].
/// The health probe is deliberately not counted as an operation.
pub struct Monitored<S> {
    inner: S,
    monitor: Arc<QueryMonitor>,
}

impl<S> Monitored<S> {
    pub fn new(inner: S, monitor: Arc<QueryMonitor>) -> Self {
        Self { inner, monitor }
    }

    async fn run<T>(
        &self,
        operation: &'static str,
        query: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        self.monitor.begin(operation);
        let started = Instant::now();

        let result = query.await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.monitor.finish(operation, elapsed_ms, result.is_err());
        result
    }
}

#[async_trait::async_trait]
impl<S: UserStore> UserStore for Monitored<S> {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        self.run("create_user", self.inner.create(email, password_hash))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.run("get_user_by_id", self.inner.find_by_id(id)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.run("get_user_by_email", self.inner.find_by_email(email))
            .await
    }

    async fn update(&self, id: Uuid, password_hash: Option<&str>) -> Result<User, StoreError> {
        self.run("update_user", self.inner.update(id, password_hash))
            .await
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.run("delete_user", self.inner.soft_delete(id)).await
    }

    async fn list(&self, page: u32, limit: u32) -> Result<(Vec<User>, u64), StoreError> {
        self.run("list_users", self.inner.list(page, limit)).await
    }

    async fn health(&self) -> StoreHealth {
        self.inner.health().await
    }
}
