use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me-in-production";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL. Without one, invoices live in memory.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Shared secret for identity tokens.
    pub jwt_secret: String,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Quiet period before a draft edit is autosaved.
    pub autosave_debounce: Duration,
    /// Public origin used to build share links.
    pub public_base_url: String,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_var("PORT", 3030u16, "u16")?;
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 20, "u32")?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", 5, "u32")?,
            jwt_secret: env::var("JWT_SECRET")
                .ok()
                .filter(|secret| !secret.is_empty())
                .unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            event_bus_capacity: parse_var("EVENT_BUS_CAPACITY", 1024, "usize")?,
            autosave_debounce: Duration::from_millis(parse_var(
                "AUTOSAVE_DEBOUNCE_MS",
                500u64,
                "u64",
            )?),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Whether tokens are signed with the well-known development secret.
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_and_rejects_garbage() {
        // Keys unique to this test so parallel tests don't interfere.
        assert_eq!(parse_var("INVOICIFY_TEST_UNSET", 7u32, "u32").unwrap(), 7);

        env::set_var("INVOICIFY_TEST_BAD", "seven");
        let err = parse_var("INVOICIFY_TEST_BAD", 7u32, "u32").unwrap_err();
        assert!(err.to_string().contains("INVOICIFY_TEST_BAD must be a valid u32"));

        env::set_var("INVOICIFY_TEST_GOOD", " 42 ");
        assert_eq!(parse_var("INVOICIFY_TEST_GOOD", 7u32, "u32").unwrap(), 42);
    }
}
