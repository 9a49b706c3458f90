//! Request input validation.
//!
//! `ValidatedJson` and `ValidatedQuery` run serde deserialization and the
//! `validator` rules before a handler ever sees the input, so a handler
//! behind them is never invoked with data that failed its schema. Failures
//! become one aggregated 400 envelope; input that cannot even be parsed is
//! reported with a generic format message instead of field violations.

pub mod schemas;

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::ApiError;

/// Render every rule violation as `<field path>: <message>`, joined with
/// `", "`. Nested structs render dotted paths, list items indexed paths.
/// Entries are sorted by path so the output is stable.
pub fn format_violations(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    collect_violations("", errors, &mut parts);
    parts.sort();
    parts.join(", ")
}

fn collect_violations(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(violations) => {
                for violation in violations {
                    let message = violation
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid {}", violation.code));
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_violations(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_violations(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

/// JSON body extractor that validates after parsing.
///
/// Meant for POST/PUT/PATCH routes. A body that is not parseable JSON
/// rejects with `Invalid JSON format`; a parseable body with rule
/// violations rejects with all of them aggregated.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::Bytes::from_request(request, state)
            .await
            .map_err(|_| ApiError::validation("Invalid JSON format"))?;

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|_| ApiError::validation("Invalid JSON format"))?;

        value
            .validate()
            .map_err(|errors| ApiError::validation(format_violations(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// Query-string extractor that validates after deserialization.
///
/// Works for any method. Deserialization coerces string parameters into
/// the schema's types (`"5"` into `5`); a query string that cannot be
/// deserialized at all rejects with `Invalid query parameters`.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::try_from_uri(&parts.uri)
            .map_err(|_| ApiError::validation("Invalid query parameters"))?;

        value
            .validate()
            .map_err(|errors| ApiError::validation(format_violations(&errors)))?;

        Ok(ValidatedQuery(value))
    }
}
