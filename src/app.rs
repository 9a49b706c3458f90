//! Router assembly.
//!
//! Route groups get their middleware here: the auth policy on credential
//! endpoints, the default policy on user and dog endpoints, sessions on
//! everything under `/api/user`. Rate limiting is layered after the
//! session check so it runs first and a denial never reaches it.

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::middleware::session_middleware;
use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimitContext, RateLimitPolicy};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let rate_limit = &state.config.rate_limit;

    let (auth_ctx, default_ctx) = if rate_limit.enabled {
        let auth_policy =
            RateLimitPolicy::new("auth", rate_limit.auth_limit, rate_limit.auth_window_secs);
        let default_policy = RateLimitPolicy::new(
            "default",
            rate_limit.default_limit,
            rate_limit.default_window_secs,
        );
        (
            Some(RateLimitContext::new(state.limiter.clone(), auth_policy)),
            Some(RateLimitContext::new(state.limiter.clone(), default_policy)),
        )
    } else {
        (None, None)
    };

    let mut router = Router::new()
        .merge(open_routes())
        .merge(auth_routes(auth_ctx))
        .merge(user_routes(default_ctx.clone()))
        .merge(dog_routes(default_ctx));

    if state.config.server.cors_permissive {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// No auth, no rate limit: index, health, docs.
fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root::index))
        .route("/api/health", get(handlers::health::report))
        .route("/api/docs", get(handlers::docs::render))
}

fn auth_routes(ctx: Option<RateLimitContext>) -> Router<AppState> {
    let mut router = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login));

    if let Some(ctx) = ctx {
        router = router.layer(from_fn_with_state(ctx, rate_limit_middleware));
    }
    router
}

fn user_routes(ctx: Option<RateLimitContext>) -> Router<AppState> {
    let mut router = Router::new()
        .route(
            "/api/user",
            get(handlers::user::list).post(handlers::user::create),
        )
        .route(
            "/api/user/:user_id",
            get(handlers::user::get)
                .put(handlers::user::update)
                .delete(handlers::user::delete),
        )
        .layer(from_fn(session_middleware));

    if let Some(ctx) = ctx {
        router = router.layer(from_fn_with_state(ctx, rate_limit_middleware));
    }
    router
}

fn dog_routes(ctx: Option<RateLimitContext>) -> Router<AppState> {
    let mut router = Router::new().route("/api/dog", get(handlers::dog::random_image));

    if let Some(ctx) = ctx {
        router = router.layer(from_fn_with_state(ctx, rate_limit_middleware));
    }
    router
}
