//! Database connection settings.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use hazard_common::{HazardError, HazardResult};

/// Connection and pool settings for the results database.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout: Duration,
    /// Statement timeout applied to each ranking query
    pub query_timeout: Duration,
    /// Extra attempts after a transient connectivity failure
    pub max_retries: u32,
}

impl DatabaseConfig {
    pub const DEFAULT_PORT: u16 = 5432;

    /// Create a config with default pool settings.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port,
            max_connections: 10,
            acquire_timeout: Duration::from_millis(5_000),
            query_timeout: Duration::from_millis(15_000),
            max_retries: 2,
        }
    }

    /// Load from process environment variables.
    pub fn from_env() -> HazardResult<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Load from a variable map.
    ///
    /// Required: `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`.
    /// Optional: `DB_PORT`, `DB_MAX_CONNECTIONS`, `DB_ACQUIRE_TIMEOUT_MS`,
    /// `DB_QUERY_TIMEOUT_MS`, `DB_MAX_RETRIES`.
    pub fn from_vars(vars: HashMap<String, String>) -> HazardResult<Self> {
        let required = |key: &str| {
            vars.get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| HazardError::Config(format!("{} is not set", key)))
        };

        let mut config = Self::new(
            required("DB_HOST")?,
            required("DB_USER")?,
            required("DB_PASSWORD")?,
            required("DB_NAME")?,
            optional(&vars, "DB_PORT")?.unwrap_or(Self::DEFAULT_PORT),
        );

        if let Some(max) = optional(&vars, "DB_MAX_CONNECTIONS")? {
            if max == 0 {
                return Err(HazardError::Config(
                    "DB_MAX_CONNECTIONS must be at least 1".to_string(),
                ));
            }
            config.max_connections = max;
        }
        if let Some(ms) = optional(&vars, "DB_ACQUIRE_TIMEOUT_MS")? {
            config.acquire_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = optional::<u64>(&vars, "DB_QUERY_TIMEOUT_MS")? {
            // statement_timeout = 0 disables the server-side bound
            if ms == 0 {
                return Err(HazardError::Config(
                    "DB_QUERY_TIMEOUT_MS must be at least 1".to_string(),
                ));
            }
            config.query_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = optional(&vars, "DB_MAX_RETRIES")? {
            config.max_retries = retries;
        }

        Ok(config)
    }
}

fn optional<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
) -> HazardResult<Option<T>> {
    match vars.get(key).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| HazardError::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}

// Password is never printed.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("query_timeout", &self.query_timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
