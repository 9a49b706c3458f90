//! In-memory store used in development and as the test harness.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::store::{StoreError, StoreHealth, User, UserStore, HEALTH_PING_BUDGET_MS};

/// `DashMap`-backed [`UserStore`]. The email index is the uniqueness
/// authority: `create` claims the address through an entry guard, so two
/// concurrent signups for one email cannot both win.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("Email")),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::new_v4(),
                    email: email.to_string(),
                    password_hash: password_hash.to_string(),
                    is_admin: false,
                    is_deleted: false,
                    created_at: now,
                    updated_at: now,
                };

                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .get(&id)
            .filter(|user| !user.is_deleted)
            .map(|user| user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let id = self.emails.get(email).map(|entry| *entry);

        Ok(id.and_then(|id| self.users.get(&id).map(|user| user.clone())))
    }

    async fn update(&self, id: Uuid, password_hash: Option<&str>) -> Result<User, StoreError> {
        match self.users.get_mut(&id) {
            Some(mut user) if !user.is_deleted => {
                if let Some(hash) = password_hash {
                    user.password_hash = hash.to_string();
                }
                user.updated_at = Utc::now();
                Ok(user.clone())
            }
            _ => Err(StoreError::NotFound("User")),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError> {
        match self.users.get_mut(&id) {
            Some(mut user) if !user.is_deleted => {
                user.is_deleted = true;
                user.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(StoreError::NotFound("User")),
        }
    }

    async fn list(&self, page: u32, limit: u32) -> Result<(Vec<User>, u64), StoreError> {
        let mut live: Vec<User> = self
            .users
            .iter()
            .filter(|entry| !entry.is_deleted)
            .map(|entry| entry.clone())
            .collect();
        live.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = live.len() as u64;
        let start = page.saturating_sub(1).saturating_mul(limit) as usize;
        let items = live.into_iter().skip(start).take(limit as usize).collect();

        Ok((items, total))
    }

    async fn health(&self) -> StoreHealth {
        let started = std::time::Instant::now();
        let _ = self.users.len();
        let response_time_ms = started.elapsed().as_millis() as u64;

        StoreHealth {
            healthy: response_time_ms < HEALTH_PING_BUDGET_MS,
            response_time_ms,
            active_connections: None,
            error: None,
        }
    }
}
