//! Startup configuration. Loaded once from the environment (and `.env`), validated, then passed by reference.

use crate::config::validate;
use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_SCHEMA: &str = "formkit";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "formkit=info";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// PostgreSQL schema holding the `forms` and `form_fields` tables.
    pub schema: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
    pub log_filter: String,
}

impl AppConfig {
    /// Read settings from the process environment after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, then validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let schema = lookup("FORMKIT_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        let bind_raw = lookup("FORMKIT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
            key: "FORMKIT_BIND_ADDR",
            reason: format!("{}", e),
        })?;
        let max_connections = match lookup("FORMKIT_MAX_CONNECTIONS") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "FORMKIT_MAX_CONNECTIONS",
                reason: format!("'{}' is not a positive integer", v),
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let body_limit_bytes = match lookup("FORMKIT_BODY_LIMIT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "FORMKIT_BODY_LIMIT",
                reason: format!("'{}' is not a byte count", v),
            })?,
            None => DEFAULT_BODY_LIMIT,
        };
        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into());

        let config = AppConfig {
            database_url,
            schema,
            bind_addr,
            max_connections,
            body_limit_bytes,
            log_filter,
        };
        validate(&config)?;
        Ok(config)
    }
}
