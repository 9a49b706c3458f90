//! Bearer-token session middleware for the protected user routes.

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Authenticated caller context, injected into request extensions by
/// [`session_middleware`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Validate the `Authorization: Bearer` header and inject [`CurrentUser`].
///
/// Every failure shape collapses to the same 401 response so callers
/// cannot probe which part of the check failed; the specific reason goes
/// to the debug log only.
pub async fn session_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers).map_err(|reason| {
        tracing::debug!("Rejected session: {}", reason);
        ApiError::unauthorized("Authentication required")
    })?;

    let claims = auth::verify_token(&token).map_err(|err| {
        tracing::debug!("Rejected session: {}", err);
        ApiError::unauthorized("Authentication required")
    })?;

    request.extensions_mut().insert(CurrentUser::from(claims));
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| "missing Authorization header".to_string())?;

    let value = header
        .to_str()
        .map_err(|_| "malformed Authorization header".to_string())?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header is not a Bearer token".to_string())?;

    if token.trim().is_empty() {
        return Err("empty bearer token".to_string());
    }

    Ok(token.to_string())
}
