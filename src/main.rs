use std::sync::Arc;

use anyhow::Context;

use keel_api::app::app;
use keel_api::config::{self, DEV_JWT_SECRET};
use keel_api::docs;
use keel_api::is_production;
use keel_api::rate_limit::RateLimiter;
use keel_api::state::AppState;
use keel_api::store::{MemoryStore, Monitored, PgStore, QueryMonitor, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, KEEL_ENV, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Keel API in {:?} mode", config.environment);

    if is_production!() && config.auth.jwt_secret == DEV_JWT_SECRET {
        anyhow::bail!("refusing to start: KEEL_JWT_SECRET must be set in production");
    }

    let monitor = Arc::new(QueryMonitor::new(config.store.slow_query_threshold_ms));

    let store: Arc<dyn UserStore> = match &config.store.database_url {
        Some(url) => {
            let pg = PgStore::connect(url, config.store.max_connections)
                .await
                .context("connecting to Postgres")?;
            Arc::new(Monitored::new(pg, monitor.clone()))
        }
        None => {
            tracing::info!("No DATABASE_URL configured; using the in-memory store");
            Arc::new(Monitored::new(MemoryStore::new(), monitor.clone()))
        }
    };

    let limiter = Arc::new(RateLimiter::new());
    // Held for the life of the process; dropping it stops the sweep task.
    let _sweeper = limiter.spawn_sweeper(std::time::Duration::from_secs(
        config.rate_limit.sweep_interval_secs,
    ));

    let registry = Arc::new(docs::register_all(config));
    tracing::info!(endpoints = registry.len(), "Docs registry populated");

    let state = AppState::new(Arc::new(config.clone()), store, monitor, limiter, registry);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Keel API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;

    Ok(())
}
