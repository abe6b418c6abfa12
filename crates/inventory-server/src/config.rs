//! Configuration loading and management

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `INVENTORY__CACHE__REDIS_URL`
const ENV_PREFIX: &str = "INVENTORY";
const ENV_SEPARATOR: &str = "__";

/// Longest accepted cache TTL (30 days)
const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            max_connections: default_max_connections(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis server; the in-process store is used when unset
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Upper bound on one cache round trip before it counts as a miss
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    #[serde(default)]
    pub invalidate_item_on_update: bool,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: default_ttl_secs(),
            operation_timeout_ms: default_operation_timeout_ms(),
            invalidate_item_on_update: false,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: i64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_minutes: default_access_token_minutes(),
            refresh_token_days: default_refresh_token_days(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> String {
    "./data/inventory.db".to_string()
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_max_connections() -> u32 {
    5
}

fn default_ttl_secs() -> u64 {
    3600 // 1 hour
}

fn default_operation_timeout_ms() -> u64 {
    250
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_access_token_minutes() -> i64 {
    5
}

fn default_refresh_token_days() -> i64 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from an optional TOML file overlaid with
    /// `INVENTORY__*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);
        let config: Config = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration from {}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            bail!("cache.ttl_secs must be greater than zero");
        }
        if self.cache.ttl_secs > MAX_TTL_SECS {
            bail!("cache.ttl_secs must be at most {}", MAX_TTL_SECS);
        }
        if self.cache.operation_timeout_ms == 0 {
            bail!("cache.operation_timeout_ms must be greater than zero");
        }
        if self.database.acquire_timeout_secs == 0 {
            bail!("database.acquire_timeout_secs must be greater than zero");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be greater than zero");
        }
        if self.auth.access_token_minutes <= 0 || self.auth.refresh_token_days <= 0 {
            bail!("auth token lifetimes must be positive");
        }
        Ok(())
    }

    /// Whether the JWT secret was left at its shipped default
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.auth.jwt_secret == default_jwt_secret()
    }
}
