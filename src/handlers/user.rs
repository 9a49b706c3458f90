//! User management endpoints. All of these sit behind the session
//! middleware, so a `CurrentUser` extension is always present.

use axum::extract::{Path, State};
use axum::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::auth::password;
use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult, PageInfo};
use crate::state::AppState;
use crate::store::{StoreError, UserRecord};
use crate::validation::schemas::{ListQuery, SignupRequest, UpdateUserRequest};
use crate::validation::{ValidatedJson, ValidatedQuery};

/// Route ids must be UUIDs; anything else behaves like an id that does
/// not exist, keeping the response shape uniform.
fn parse_user_id(raw: &str, not_found_message: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found_message))
}

/// GET /api/user - List users, oldest first
pub async fn list(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> ApiResult<Value> {
    let (users, total) = state.store.list(query.page(), query.limit()).await?;
    let records: Vec<UserRecord> = users.iter().map(UserRecord::from).collect();

    Ok(ApiResponse::success(json!(records))
        .with_pagination(PageInfo::new(query.page(), query.limit(), total)))
}

/// POST /api/user - Create a user on someone's behalf
///
/// Same contract as signup, but behind a session.
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> ApiResult<Value> {
    let hash = password::hash_password(body.password()).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal("An error occurred while processing your request")
    })?;

    let user = state.store.create(body.email(), &hash).await?;
    tracing::info!(user_id = %user.id, actor = %current.user_id, "User created");

    Ok(ApiResponse::created(json!({ "userId": user.id })).with_message("User created successfully"))
}

/// GET /api/user/:userId - Fetch a single user
pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<UserRecord> {
    let id = parse_user_id(&user_id, "User not found")?;

    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(UserRecord::from(&user)).with_message("User retrieved successfully"))
}

/// PUT /api/user/:userId - Update a user's password
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserRecord> {
    let id = parse_user_id(&user_id, "User not found or update failed")?;

    let hash = match body.password() {
        Some(plain) => Some(password::hash_password(plain).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal("An error occurred while processing your request")
        })?),
        None => None,
    };

    let user = state
        .store
        .update(id, hash.as_deref())
        .await
        .map_err(|err| match err {
            StoreError::NotFound(_) => ApiError::not_found("User not found or update failed"),
            other => other.into(),
        })?;
    tracing::info!(user_id = %user.id, actor = %current.user_id, "User updated");

    Ok(ApiResponse::success(UserRecord::from(&user)).with_message("User updated successfully"))
}

/// DELETE /api/user/:userId - Soft-delete a user
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_user_id(&user_id, "User not found")?;

    state.store.soft_delete(id).await?;
    tracing::info!(user_id = %id, actor = %current.user_id, "User deleted");

    Ok(ApiResponse::success(json!({ "userId": id, "deleted": true }))
        .with_message("User deleted successfully"))
}
