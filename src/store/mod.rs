//! User persistence behind a swappable store trait.
//!
//! `MemoryStore` backs development and tests; `PgStore` backs real
//! deployments. Both are wrapped in [`monitor::Monitored`] so every
//! operation feeds the query statistics surfaced by the health report.

pub mod memory;
pub mod monitor;
pub mod postgres;

pub use memory::MemoryStore;
pub use monitor::{Monitored, OperationStat, QueryMonitor};
pub use postgres::PgStore;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A stored user row. Not serializable on purpose; responses go through
/// [`UserRecord`], which never carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire projection of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Unavailable(#[from] sqlx::Error),
}

/// Backend health probe result, embedded in the health report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    pub healthy: bool,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A ping that completes but takes this long or more means the backend
/// is in no state to serve traffic.
pub const HEALTH_PING_BUDGET_MS: u64 = 1000;

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. The email must not be in use by any row, live
    /// or soft-deleted, so deleting an account never frees its address.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Look up a live user. Soft-deleted rows are invisible here.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Look up by email, including soft-deleted rows. Callers that
    /// authenticate must check `is_deleted` themselves.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Replace the password hash (or just touch `updated_at` when no
    /// hash is supplied). `NotFound` for absent or deleted rows.
    async fn update(&self, id: Uuid, password_hash: Option<&str>) -> Result<User, StoreError>;

    /// Mark a live row deleted. `NotFound` if absent or already deleted.
    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Page through live users, oldest first. Returns the page and the
    /// total live count.
    async fn list(&self, page: u32, limit: u32) -> Result<(Vec<User>, u64), StoreError>;

    /// Ping the backend and report timing.
    async fn health(&self) -> StoreHealth;
}
