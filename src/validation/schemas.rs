//! Request schemas shared by the HTTP handlers.
//!
//! Fields that the schema requires are modeled as `Option<String>` with a
//! `required` rule rather than bare `String`, so a missing field surfaces
//! as a field violation alongside the others instead of aborting
//! deserialization with a generic parse error. The accessor methods hide
//! the `Option` from handlers, which only run after validation.

use serde::Deserialize;
use validator::Validate;

/// POST /api/auth/signup
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        required(message = "Required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters")
    )]
    pub password: Option<String>,
}

impl SignupRequest {
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 1, message = "Password cannot be empty")
    )]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

/// PUT /api/user/:userId
///
/// Only the password can change. An omitted password makes the update a
/// no-op touch of `updated_at`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// GET /api/user query parameters.
#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    #[validate(range(min = 1, message = "Page number must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10)
    }
}
