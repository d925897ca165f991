//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session configuration.
    pub session: SessionConfig,
    /// Consolidation worker configuration.
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret used to namespace session token digests.
    pub secret: String,
    /// Session time-to-live in seconds; refresh extends it.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

fn default_session_ttl() -> u64 {
    86_400 // 24 hours
}

/// Consolidation worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsolidationConfig {
    /// Poll interval for pending runs, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Soft timeout per pipeline step, in seconds.
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_step_timeout() -> u64 {
    600 // 10 minutes
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            step_timeout_secs: default_step_timeout(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, in increasing precedence:
    /// 1. `config/default` and `config/{RUN_MODE}` files
    /// 2. `MERIDIAN__`-prefixed environment variables
    /// 3. `DATABASE_URL`, or the `PGHOST`/`PGPORT`/`PGUSER`/`PGPASSWORD`/
    ///    `PGDATABASE` family assembled into a connection URL
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is incomplete.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MERIDIAN").separator("__"));

        if let Some(url) = database_url_from_env() {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }
}

/// Resolves the database URL from the conventional Postgres environment.
#[must_use]
pub fn database_url_from_env() -> Option<String> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Some(url);
    }

    let host = std::env::var("PGHOST").ok()?;
    let port = std::env::var("PGPORT").unwrap_or_else(|_| "5432".to_string());
    let user = std::env::var("PGUSER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("PGPASSWORD").unwrap_or_default();
    let database = std::env::var("PGDATABASE").unwrap_or_else(|_| user.clone());

    if password.is_empty() {
        Some(format!("postgres://{user}@{host}:{port}/{database}"))
    } else {
        Some(format!("postgres://{user}:{password}@{host}:{port}/{database}"))
    }
}
