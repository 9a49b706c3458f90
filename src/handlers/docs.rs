//! Rendered endpoint documentation.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DocsQuery {
    format: Option<String>,
}

/// GET /api/docs - Render the docs registry as markdown or JSON
pub async fn render(
    State(state): State<AppState>,
    Query(query): Query<DocsQuery>,
) -> Result<Response, ApiError> {
    match query.format.as_deref().unwrap_or("markdown") {
        "markdown" => Ok((
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            state.docs.to_markdown(),
        )
            .into_response()),
        "json" => {
            Ok(ApiResponse::<Value>::success(state.docs.to_json()).into_response())
        }
        _ => Err(ApiError::validation(
            "Unsupported format: use markdown or json",
        )),
    }
}
