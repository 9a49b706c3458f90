//! Session token issuance and verification.

pub mod middleware;
pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Claims carried by a session token. `sub` is the user id; expiry comes
/// from the configured token TTL.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String) -> Self {
        let now = Utc::now();
        let ttl_hours = config::config().auth.token_ttl_hours;

        Self {
            sub: user_id,
            email,
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours as i64)).timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    TokenGeneration(String),
    InvalidToken,
    MissingSecret,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::TokenGeneration(msg) => write!(f, "token generation error: {}", msg),
            AuthError::InvalidToken => write!(f, "invalid session token"),
            AuthError::MissingSecret => write!(f, "session secret not configured"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for crate::error::ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => {
                crate::error::ApiError::unauthorized("Authentication required")
            }
            other => {
                tracing::error!("Session token error: {}", other);
                crate::error::ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

/// Sign a session token with the configured HS256 secret.
pub fn issue_token(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().auth.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Decode and verify a session token, including its expiry.
pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    let secret = &config::config().auth.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    // No expiry leeway: a token past its `exp` is dead immediately.
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}
