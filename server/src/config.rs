//! Configuration management for the server.

use std::env;
use std::time::Duration;

const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// When set, requests must carry a bearer token
    pub auth_secret: Option<String>,
    /// Deadline for one import, from lock acquisition to commit
    pub import_timeout: Duration,
    /// Largest accepted import request body
    pub max_import_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;

        let auth_secret = lookup("AUTH_SECRET").filter(|s| !s.is_empty());

        let import_timeout = match lookup("IMPORT_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidImportTimeout)?,
            None => DEFAULT_IMPORT_TIMEOUT_SECS,
        };

        let max_import_bytes = match lookup("MAX_IMPORT_BYTES") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidMaxImportBytes)?,
            None => DEFAULT_MAX_IMPORT_BYTES,
        };

        Ok(Self {
            host,
            port,
            database_url,
            auth_secret,
            import_timeout: Duration::from_secs(import_timeout),
            max_import_bytes,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("IMPORT_TIMEOUT_SECS must be a positive number of seconds")]
    InvalidImportTimeout,

    #[error("Invalid MAX_IMPORT_BYTES value")]
    InvalidMaxImportBytes,
}
