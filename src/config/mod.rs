use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Fallback signing secret for local development only.
///
/// The server refuses to start in production while this is still in use.
pub const DEV_JWT_SECRET: &str = "keel-dev-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub store: StoreConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub default_limit: u64,
    pub default_window_secs: u64,
    pub auth_limit: u64,
    pub auth_window_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub dog_api_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("KEEL_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Auth overrides
        if let Ok(v) = env::var("KEEL_JWT_SECRET") {
            if !v.is_empty() {
                self.auth.jwt_secret = v;
            }
        }
        if let Ok(v) = env::var("KEEL_TOKEN_TTL_HOURS") {
            self.auth.token_ttl_hours = v.parse().unwrap_or(self.auth.token_ttl_hours);
        }

        // Rate limit overrides
        if let Ok(v) = env::var("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = v.parse().unwrap_or(self.rate_limit.enabled);
        }
        if let Ok(v) = env::var("RATE_LIMIT_DEFAULT_REQUESTS") {
            self.rate_limit.default_limit = v.parse().unwrap_or(self.rate_limit.default_limit);
        }
        if let Ok(v) = env::var("RATE_LIMIT_DEFAULT_WINDOW_SECS") {
            self.rate_limit.default_window_secs =
                v.parse().unwrap_or(self.rate_limit.default_window_secs);
        }
        if let Ok(v) = env::var("RATE_LIMIT_AUTH_REQUESTS") {
            self.rate_limit.auth_limit = v.parse().unwrap_or(self.rate_limit.auth_limit);
        }
        if let Ok(v) = env::var("RATE_LIMIT_AUTH_WINDOW_SECS") {
            self.rate_limit.auth_window_secs =
                v.parse().unwrap_or(self.rate_limit.auth_window_secs);
        }
        if let Ok(v) = env::var("RATE_LIMIT_SWEEP_INTERVAL_SECS") {
            self.rate_limit.sweep_interval_secs =
                v.parse().unwrap_or(self.rate_limit.sweep_interval_secs);
        }

        // Store overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.is_empty() {
                self.store.database_url = Some(v);
            }
        }
        if let Ok(v) = env::var("STORE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }
        if let Ok(v) = env::var("STORE_SLOW_QUERY_THRESHOLD_MS") {
            self.store.slow_query_threshold_ms =
                v.parse().unwrap_or(self.store.slow_query_threshold_ms);
        }

        // Upstream overrides (must be a valid URL to take effect)
        if let Ok(v) = env::var("DOG_API_URL") {
            if url::Url::parse(&v).is_ok() {
                self.upstream.dog_api_url = v;
            }
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_permissive: true,
            },
            auth: AuthConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_ttl_hours: 24 * 7, // 1 week
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                default_limit: 100,
                default_window_secs: 15 * 60,
                auth_limit: 5,
                auth_window_secs: 15 * 60,
                sweep_interval_secs: 60,
            },
            store: StoreConfig {
                database_url: None,
                max_connections: 10,
                slow_query_threshold_ms: 1000,
            },
            upstream: UpstreamConfig {
                dog_api_url: "https://dog.ceo/api/breeds/image/random".to_string(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_permissive: false,
            },
            auth: AuthConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_ttl_hours: 24,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                default_limit: 100,
                default_window_secs: 15 * 60,
                auth_limit: 5,
                auth_window_secs: 15 * 60,
                sweep_interval_secs: 60,
            },
            store: StoreConfig {
                database_url: None,
                max_connections: 20,
                slow_query_threshold_ms: 1000,
            },
            upstream: UpstreamConfig {
                dog_api_url: "https://dog.ceo/api/breeds/image/random".to_string(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_permissive: false,
            },
            auth: AuthConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_ttl_hours: 4,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                default_limit: 100,
                default_window_secs: 15 * 60,
                auth_limit: 5,
                auth_window_secs: 15 * 60,
                sweep_interval_secs: 60,
            },
            store: StoreConfig {
                database_url: None,
                max_connections: 50,
                slow_query_threshold_ms: 1000,
            },
            upstream: UpstreamConfig {
                dog_api_url: "https://dog.ceo/api/breeds/image/random".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

// Helper macro for the production-only startup checks
#[macro_export]
macro_rules! is_production {
    () => {
        matches!(
            $crate::config::CONFIG.environment,
            $crate::config::Environment::Production
        )
    };
}
