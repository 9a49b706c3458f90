//! In-process test harness: the full router over a `MemoryStore`, with a
//! hand-cranked clock behind the rate limiter so window expiry is
//! controlled by tests instead of wall time.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use keel_api::app::app;
use keel_api::config::AppConfig;
use keel_api::docs;
use keel_api::rate_limit::{ManualClock, RateLimiter};
use keel_api::state::AppState;
use keel_api::store::{
    MemoryStore, Monitored, QueryMonitor, StoreError, StoreHealth, User, UserStore,
};

/// Development config with limits loose enough that ordinary test flows
/// never trip the limiter, and an upstream URL that cannot reach the
/// real internet.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.rate_limit.auth_limit = 100;
    config.rate_limit.auth_window_secs = 900;
    config.rate_limit.default_limit = 100;
    config.rate_limit.default_window_secs = 900;
    config.upstream.dog_api_url = "http://127.0.0.1:9/api/breeds/image/random".to_string();
    config
}

pub struct TestApp {
    router: Router,
    pub clock: Arc<ManualClock>,
    pub monitor: Arc<QueryMonitor>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = Arc::new(RateLimiter::with_clock(clock.clone()));
        let monitor = Arc::new(QueryMonitor::new(config.store.slow_query_threshold_ms));
        let store: Arc<dyn UserStore> = Arc::new(Monitored::new(MemoryStore::new(), monitor.clone()));
        let registry = Arc::new(docs::register_all(&config));

        let state = AppState::new(Arc::new(config), store, monitor.clone(), limiter, registry);

        Self {
            router: app(state),
            clock,
            monitor,
        }
    }

    /// Same harness but every store operation fails and the health probe
    /// reports unhealthy.
    pub fn with_failing_store() -> Self {
        let config = test_config();
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = Arc::new(RateLimiter::with_clock(clock.clone()));
        let monitor = Arc::new(QueryMonitor::new(config.store.slow_query_threshold_ms));
        let store: Arc<dyn UserStore> = Arc::new(FailingStore);
        let registry = Arc::new(docs::register_all(&config));

        let state = AppState::new(Arc::new(config), store, monitor.clone(), limiter, registry);

        Self {
            router: app(state),
            clock,
            monitor,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Response {
        self.request(
            Request::builder()
                .uri(path)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Response {
        self.request(json_request("POST", path, None, body)).await
    }

    pub async fn post_json_auth(&self, path: &str, token: &str, body: Value) -> Response {
        self.request(json_request("POST", path, Some(token), body))
            .await
    }

    pub async fn put_json_auth(&self, path: &str, token: &str, body: Value) -> Response {
        self.request(json_request("PUT", path, Some(token), body))
            .await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Response {
        self.request(
            Request::builder()
                .method("DELETE")
                .uri(path)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    /// Sign up one user and return the new id.
    pub async fn signup(&self, email: &str, password: &str) -> Uuid {
        let response = self
            .post_json(
                "/api/auth/signup",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status(), 201, "signup for {} failed", email);

        let body = body_json(response).await;
        body["data"]["userId"]
            .as_str()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .expect("signup returned a userId")
    }

    /// Log in and return the session token.
    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status(), 200, "login for {} failed", email);

        let body = body_json(response).await;
        body["data"]["token"]
            .as_str()
            .expect("login returned a token")
            .to_string()
    }
}

fn json_request(method: &str, path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).expect("request")
}

/// Collect and parse a response body.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("body is UTF-8")
}

/// Store double whose operations always fail with a closed pool, for
/// exercising the 500 and 503 paths.
pub struct FailingStore;

#[async_trait::async_trait]
impl UserStore for FailingStore {
    async fn create(&self, _email: &str, _password_hash: &str) -> Result<User, StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn update(&self, _id: Uuid, _password_hash: Option<&str>) -> Result<User, StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn soft_delete(&self, _id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn list(&self, _page: u32, _limit: u32) -> Result<(Vec<User>, u64), StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn health(&self) -> StoreHealth {
        StoreHealth {
            healthy: false,
            response_time_ms: 0,
            active_connections: None,
            error: Some("connection pool closed".to_string()),
        }
    }
}
