use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::error::ErrorDetail;

/// Pagination block for list responses, carried under `meta.pagination`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl PageInfo {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self { page, limit, total, total_pages }
    }
}

/// Response metadata present on every envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
}

impl ResponseMeta {
    fn now() -> Self {
        Self { timestamp: Utc::now(), request_id: None, pagination: None }
    }
}

/// Uniform envelope for every API response.
///
/// Exactly one of `data` (success) or `error` (failure) is present, and
/// absent fields are omitted from the JSON entirely rather than sent as
/// `null`. `meta.timestamp` reflects when the envelope was built.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub meta: ResponseMeta,
    #[serde(skip)]
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            meta: ResponseMeta::now(),
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        let mut response = Self::success(data);
        response.status_code = Some(status_code);
        response
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Create a 204 No Content response (sent without a body)
    pub fn no_content() -> ApiResponse<()> {
        let mut response = ApiResponse::<()>::success(());
        response.data = None;
        response.status_code = Some(StatusCode::NO_CONTENT);
        response
    }

    /// Create a failure envelope for the given error detail.
    ///
    /// The HTTP status is chosen by the caller; this only shapes the body.
    pub fn failure(detail: ErrorDetail) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(detail),
            message: None,
            meta: ResponseMeta::now(),
            status_code: None,
        }
    }

    /// Attach a human-readable note to a success response
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach pagination metadata
    pub fn with_pagination(mut self, pagination: PageInfo) -> Self {
        self.meta.pagination = Some(pagination);
        self
    }

    /// Attach a request identifier to the metadata
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.meta.request_id = Some(request_id.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // For 204 No Content, return empty response
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let body = match serde_json::to_value(&self) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": {
                            "type": "INTERNAL_ERROR",
                            "message": "Failed to serialize response data"
                        },
                        "meta": { "timestamp": Utc::now() }
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
