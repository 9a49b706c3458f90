//! Backend health and query-statistics report.

use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/health - Probe the store and report query statistics
///
/// The same report rides in `data` when healthy and in `error.details`
/// when not, so monitoring always sees the numbers.
pub async fn report(State(state): State<AppState>) -> ApiResult<Value> {
    let database = state.store.health().await;
    let healthy = database.healthy;

    let report = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "database": database,
        "queries": {
            "totalOperations": state.monitor.total_operations(),
            "topOperations": state.monitor.top(5),
        },
    });

    if healthy {
        Ok(ApiResponse::success(report).with_message("System is healthy"))
    } else {
        tracing::error!("Health check failed: {:?}", report["database"]["error"]);
        Err(ApiError::unhealthy("System health check failed", Some(report)))
    }
}
