//! Sample upstream integration: proxy a random dog image from dog.ceo.

use std::time::Duration;

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Upstream payload: `{ "message": "<image url>", "status": "success" }`.
#[derive(Debug, Deserialize)]
struct DogApiPayload {
    message: Option<String>,
    status: Option<String>,
}

/// GET /api/dog - Fetch a random dog image from the upstream API
pub async fn random_image(State(state): State<AppState>) -> ApiResult<Value> {
    let url = &state.config.upstream.dog_api_url;

    let response = state
        .http
        .get(url)
        .timeout(UPSTREAM_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Dog API request failed: {}", e);
            ApiError::service_error("Network error: Unable to connect to dog API")
        })?;

    if !response.status().is_success() {
        tracing::warn!(status = %response.status(), "Dog API returned an error status");
        return Err(ApiError::service_error(
            "Failed to fetch dog image from external API",
        ));
    }

    let payload: DogApiPayload = response.json().await.map_err(|e| {
        tracing::error!("Dog API response body unreadable: {}", e);
        ApiError::service_error("Failed to retrieve dog image")
    })?;

    let image_url = match (payload.message, payload.status.as_deref()) {
        (Some(url), Some("success")) if !url.is_empty() => url,
        _ => {
            tracing::warn!("Dog API payload did not match the expected shape");
            return Err(ApiError::service_error("Invalid response from dog API"));
        }
    };

    Ok(ApiResponse::success(json!({
        "imageUrl": image_url,
        "source": "dog.ceo API",
    }))
    .with_message("Random dog image retrieved successfully"))
}
