use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default listening port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Default database file when `PAGECHECK_DB` is unset.
pub const DEFAULT_DB_PATH: &str = "pagecheck.sqlite";

/// Default page-fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration, read from the environment.
///
/// - `PORT` — listening port
/// - `PAGECHECK_DB` — SQLite database path (`:memory:` for ephemeral)
/// - `PAGECHECK_FETCH_TIMEOUT_SECS` — bound on each check's page fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database: PathBuf,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database: PathBuf::from(DEFAULT_DB_PATH),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for unset variables. Set-but-invalid values are errors rather than
    /// silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT must be a port number: {port:?}")))?;
        }

        if let Ok(database) = std::env::var("PAGECHECK_DB") {
            if database.is_empty() {
                return Err(ConfigError::Invalid("PAGECHECK_DB is empty".to_string()));
            }
            config.database = PathBuf::from(database);
        }

        if let Ok(secs) = std::env::var("PAGECHECK_FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "PAGECHECK_FETCH_TIMEOUT_SECS must be a number of seconds: {secs:?}"
                ))
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid(
                    "PAGECHECK_FETCH_TIMEOUT_SECS must be at least 1".to_string(),
                ));
            }
            config.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
