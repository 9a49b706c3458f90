use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

use super::{RateLimitDecision, RateLimitPolicy, RateLimiter};
use crate::error::ApiError;

/// Shared limiter plus the policy a route group runs under.
#[derive(Clone)]
pub struct RateLimitContext {
    pub limiter: Arc<RateLimiter>,
    pub policy: RateLimitPolicy,
}

impl RateLimitContext {
    pub fn new(limiter: Arc<RateLimiter>, policy: RateLimitPolicy) -> Self {
        Self { limiter, policy }
    }
}

/// Default identifier: the client IP taken from proxy headers, prefixed
/// so limiter keys are recognizable in logs. Clients with no identifying
/// header all share the `unknown` bucket.
pub fn default_key(request: &Request) -> String {
    let ip = forwarded_ip(request.headers()).unwrap_or("unknown");
    format!("rate_limit:{}", ip)
}

fn forwarded_ip(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = value.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first);
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Enforce the context's policy before running the inner service.
///
/// `X-RateLimit-*` headers are stamped on allowed and denied responses
/// alike; a denial never reaches validation or the handler.
pub async fn rate_limit_middleware(
    State(ctx): State<RateLimitContext>,
    request: Request,
    next: Next,
) -> Response {
    let key = match &ctx.policy.key_fn {
        Some(key_fn) => key_fn(&request),
        None => default_key(&request),
    };
    let decision = ctx.limiter.check(&key, ctx.policy.limit, ctx.policy.window);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        let retry_secs = retry_after_secs(&decision, ctx.limiter.now());
        tracing::warn!(
            key = %key,
            policy = ctx.policy.name,
            count = decision.count,
            "Rate limit exceeded"
        );
        ApiError::rate_limited(format!(
            "Rate limit exceeded. Try again in {} seconds.",
            retry_secs
        ))
        .into_response()
    };

    apply_headers(response.headers_mut(), &decision);
    response
}

/// Whole seconds until the window resets, rounded up, never below 1.
fn retry_after_secs(decision: &RateLimitDecision, now: DateTime<Utc>) -> i64 {
    let ms = (decision.reset_at - now).num_milliseconds().max(0);
    ((ms + 999) / 1000).max(1)
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let reset = decision.reset_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let pairs = [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", reset),
    ];

    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(name, value);
        }
    }
}
