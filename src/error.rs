// HTTP API error taxonomy
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::Value;

/// Closed set of error categories exposed on the wire.
///
/// Every error response carries exactly one of these under `error.type`,
/// and each maps to a fixed HTTP status. Clients match on the wire string,
/// so the set and its spellings are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    RateLimit,
    Internal,
    Service,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Authentication => "AUTHENTICATION_ERROR",
            ErrorKind::Authorization => "AUTHORIZATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND_ERROR",
            ErrorKind::Conflict => "CONFLICT_ERROR",
            ErrorKind::RateLimit => "RATE_LIMIT_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
            ErrorKind::Service => "SERVICE_ERROR",
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The `error` object embedded in failure envelopes.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation { message: String, details: Option<Value> },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 429 Too Many Requests
    RateLimited(String),

    // 500 Internal Server Error
    Internal(String),

    // 500 as well, but categorized as an upstream/external service failure
    Service(String),

    // 503 Service Unavailable (failed health checks)
    Unhealthy { message: String, details: Option<Value> },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::RateLimited(_) => 429,
            ApiError::Internal(_) => 500,
            ApiError::Service(_) => 500,
            ApiError::Unhealthy { .. } => 503,
        }
    }

    /// Get the wire category for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Unauthorized(_) => ErrorKind::Authentication,
            ApiError::Forbidden(_) => ErrorKind::Authorization,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::RateLimited(_) => ErrorKind::RateLimit,
            ApiError::Internal(_) => ErrorKind::Internal,
            ApiError::Service(_) => ErrorKind::Service,
            ApiError::Unhealthy { .. } => ErrorKind::Service,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::RateLimited(msg) => msg,
            ApiError::Internal(msg) => msg,
            ApiError::Service(msg) => msg,
            ApiError::Unhealthy { message, .. } => message,
        }
    }

    /// Build the `error` object for the response envelope
    pub fn detail(&self) -> ErrorDetail {
        let details = match self {
            ApiError::Validation { details, .. } => details.clone(),
            ApiError::Unhealthy { details, .. } => details.clone(),
            _ => None,
        };

        ErrorDetail {
            kind: self.kind(),
            message: self.message().to_string(),
            details,
            code: None,
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation { message: message.into(), details: None }
    }

    pub fn validation_with_details(message: impl Into<String>, details: Value) -> Self {
        ApiError::Validation { message: message.into(), details: Some(details) }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        ApiError::RateLimited(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_error(message: impl Into<String>) -> Self {
        ApiError::Service(message.into())
    }

    pub fn unhealthy(message: impl Into<String>, details: Option<Value>) -> Self {
        ApiError::Unhealthy { message: message.into(), details }
    }
}

// Convert other error types to ApiError
impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::Duplicate(what) => {
                ApiError::conflict(format!("{} already exists", what))
            }
            crate::store::StoreError::NotFound(what) => {
                ApiError::not_found(format!("{} not found", what))
            }
            crate::store::StoreError::Unavailable(source) => {
                // Log the real error but return a generic message
                tracing::error!("Store error: {}", source);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = crate::response::ApiResponse::<Value>::failure(self.detail());
        (status, Json(body)).into_response()
    }
}
