//! Service index at `/`.

use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};

use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - Service name, version and route map
pub async fn index(State(state): State<AppState>) -> ApiResult<Value> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);

    Ok(ApiResponse::success(json!({
        "name": "Keel API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment.as_str(),
        "startedAt": state.started_at,
        "uptimeSecs": uptime_secs,
        "endpoints": {
            "home": "/ (public)",
            "auth": "/api/auth/signup, /api/auth/login (public - strict rate limit)",
            "user": "/api/user[/:userId] (protected - session required)",
            "dog": "/api/dog (public - rate limited)",
            "health": "/api/health (public)",
            "docs": "/api/docs[?format=markdown|json] (public)",
        }
    })))
}
