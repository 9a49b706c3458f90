//! Credential endpoints: account creation and login.

use axum::extract::State;
use serde_json::{json, Value};

use crate::auth::{issue_token, password, Claims};
use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult};
use crate::security;
use crate::state::AppState;
use crate::store::UserRecord;
use crate::validation::schemas::{LoginRequest, SignupRequest};
use crate::validation::ValidatedJson;

/// POST /api/auth/signup - Register a new account
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> ApiResult<Value> {
    tracing::debug!(
        payload = %security::redact(&json!({ "email": body.email(), "password": body.password() })),
        "Signup attempt"
    );

    let hash = password::hash_password(body.password()).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal("An error occurred while processing your request")
    })?;

    // The store owns email uniqueness; a used address (live or deleted)
    // comes back as Duplicate and surfaces as a 409.
    let user = state.store.create(body.email(), &hash).await?;
    tracing::info!(user_id = %user.id, "User created");

    Ok(ApiResponse::created(json!({ "userId": user.id })).with_message("User created successfully"))
}

/// POST /api/auth/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<Value> {
    tracing::debug!(
        payload = %security::redact_for_logging(&json!({ "email": body.email() })),
        "Login attempt"
    );

    let user = state
        .store
        .find_by_email(body.email())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    // Deleted accounts keep their email reserved but cannot sign in, and
    // the rejection is indistinguishable from a wrong password.
    if user.is_deleted {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let valid = password::verify_password(body.password(), &user.password_hash).map_err(|e| {
        tracing::error!(user_id = %user.id, "Stored password hash is unreadable: {}", e);
        ApiError::internal("An error occurred while processing your request")
    })?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = issue_token(&Claims::new(user.id, user.email.clone()))?;
    tracing::info!(user_id = %user.id, "Login succeeded");

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": UserRecord::from(&user),
    }))
    .with_message("Login successful"))
}
