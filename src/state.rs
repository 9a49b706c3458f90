use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::docs::DocsRegistry;
use crate::rate_limit::RateLimiter;
use crate::store::monitor::QueryMonitor;
use crate::store::UserStore;

/// Shared application state handed to every handler via axum's `State`.
///
/// Everything in here is cheap to clone: the store and registries live behind
/// `Arc`, and `reqwest::Client` is an `Arc` internally.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub monitor: Arc<QueryMonitor>,
    pub limiter: Arc<RateLimiter>,
    pub docs: Arc<DocsRegistry>,
    pub http: reqwest::Client,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn UserStore>,
        monitor: Arc<QueryMonitor>,
        limiter: Arc<RateLimiter>,
        docs: Arc<DocsRegistry>,
    ) -> Self {
        Self {
            config,
            store,
            monitor,
            limiter,
            docs,
            http: reqwest::Client::new(),
            started_at: Utc::now(),
        }
    }
}
