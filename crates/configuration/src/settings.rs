use serde::Deserialize;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
///
/// Every field has a default, so the service boots with no `config.toml`
/// at all; the file and `RONDAGUARD_*` environment variables only override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.acquire_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "database.acquire_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (e.g. "0.0.0.0" to accept external traffic).
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port for the API listener.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Bounds for the store connection pool. The pool itself is built by the
/// database crate; this only carries the numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Upper bound on simultaneously open store connections. Requests
    /// beyond the bound queue for a free handle.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a queued request waits for a handle before failing.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}
