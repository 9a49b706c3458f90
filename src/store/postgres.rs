//! Postgres-backed store.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{StoreError, StoreHealth, User, UserStore, HEALTH_PING_BUDGET_MS};

/// `sqlx`-backed [`UserStore`]. Every statement is parameterized; email
/// uniqueness is enforced by the table constraint, so concurrent signups
/// resolve in the database, not in application code.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;

        tracing::info!("Connected to Postgres store");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                 id UUID PRIMARY KEY,
                 email TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL,
                 is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                 is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Duplicate("Email");
        }
    }
    StoreError::Unavailable(err)
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, email, password_hash, is_admin, is_deleted, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, is_admin, is_deleted, created_at, updated_at
             FROM users
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, is_admin, is_deleted, created_at, updated_at
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, id: Uuid, password_hash: Option<&str>) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET password_hash = COALESCE($2, password_hash), updated_at = now()
             WHERE id = $1 AND is_deleted = FALSE
             RETURNING id, email, password_hash, is_admin, is_deleted, created_at, updated_at",
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(StoreError::NotFound("User"))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users
             SET is_deleted = TRUE, updated_at = now()
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }

        Ok(())
    }

    async fn list(&self, page: u32, limit: u32) -> Result<(Vec<User>, u64), StoreError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, is_admin, is_deleted, created_at, updated_at
             FROM users
             WHERE is_deleted = FALSE
             ORDER BY created_at ASC, id ASC
             LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_deleted = FALSE")
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total as u64))
    }

    async fn health(&self) -> StoreHealth {
        let started = std::time::Instant::now();

        if let Err(err) = sqlx::query("SELECT 1 AS ping").execute(&self.pool).await {
            return StoreHealth {
                healthy: false,
                response_time_ms: started.elapsed().as_millis() as u64,
                active_connections: None,
                error: Some(err.to_string()),
            };
        }

        let response_time_ms = started.elapsed().as_millis() as u64;

        // Best effort: a failed connection count does not flip health.
        let active_connections =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pg_stat_activity WHERE state = 'active'")
                .fetch_one(&self.pool)
                .await
                .ok()
                .map(|count| count as u32);

        StoreHealth {
            healthy: response_time_ms < HEALTH_PING_BUDGET_MS,
            response_time_ms,
            active_connections,
            error: None,
        }
    }
}
