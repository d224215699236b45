//! Config validation: values that must hold before anything connects.

use crate::config::AppConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

/// Unquoted PostgreSQL identifier, max 63 bytes.
static IDENTIFIER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").ok());

pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER.as_ref().is_some_and(|re| re.is_match(s))
}

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let url = config.database_url.trim();
    if url.is_empty() {
        return Err(ConfigError::Missing("DATABASE_URL"));
    }
    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        return Err(ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: "must be a postgres:// URL".into(),
        });
    }
    if !is_valid_identifier(&config.schema) {
        return Err(ConfigError::Invalid {
            key: "FORMKIT_SCHEMA",
            reason: format!("'{}' is not a valid identifier", config.schema),
        });
    }
    if config.max_connections == 0 {
        return Err(ConfigError::Invalid {
            key: "FORMKIT_MAX_CONNECTIONS",
            reason: "must be at least 1".into(),
        });
    }
    if config.body_limit_bytes == 0 {
        return Err(ConfigError::Invalid {
            key: "FORMKIT_BODY_LIMIT",
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}
