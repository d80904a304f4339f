//! Process configuration read from environment variables.
//!
//! Every variable has a default; a value that fails to parse falls back to
//! the default as well.
//!
//! - `HOST` defaults to `"127.0.0.1"`.
//! - `APP_PORT` defaults to `8000`.
//! - `DATABASE_URL` defaults to `sqlite:<DB_NAME>.db`.
//! - `DB_NAME` defaults to `"kitten_show"`.
//! - `DB_ECHO` defaults to `false`.
//! - `DB_MAX_CONNECTIONS` defaults to `5`.
//! - `DB_SEED` defaults to `false`.

use std::env;
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_NAME: &str = "kitten_show";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// sqlx SQLite connection URL.
    pub url: String,
    /// Log every executed statement at INFO.
    pub echo: bool,
    pub max_connections: u32,
    /// Insert the demo breeds on startup when the table is empty.
    pub seed: bool,
}

impl AppConfig {
    /// Creates a new `AppConfig` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `AppConfig` using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_name = lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        let url = lookup("DATABASE_URL").unwrap_or_else(|| format!("sqlite:{}.db", db_name));

        Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(lookup("APP_PORT"), DEFAULT_PORT),
            database: DatabaseConfig {
                url,
                echo: parse_flag(lookup("DB_ECHO")),
                max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)
                    .max(1),
                seed: parse_flag(lookup("DB_SEED")),
            },
        }
    }

    /// Socket address built from `host` and `port`.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))?;
        Ok(addr)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.database.url, "sqlite:kitten_show.db");
        assert!(!config.database.echo);
        assert!(!config.database.seed);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_database_url_built_from_db_name() {
        let config = config_from(&[("DB_NAME", "test_db")]);
        assert_eq!(config.database.url, "sqlite:test_db.db");
    }

    #[test]
    fn test_database_url_overrides_db_name() {
        let config = config_from(&[("DB_NAME", "ignored"), ("DATABASE_URL", "sqlite::memory:")]);
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn test_flags_and_numbers() {
        let config = config_from(&[
            ("DB_ECHO", "True"),
            ("DB_SEED", "1"),
            ("APP_PORT", "9090"),
            ("DB_MAX_CONNECTIONS", "0"),
        ]);
        assert!(config.database.echo);
        assert!(config.database.seed);
        assert_eq!(config.port, 9090);
        // A pool needs at least one connection
        assert_eq!(config.database.max_connections, 1);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = config_from(&[("APP_PORT", "not-a-port"), ("DB_ECHO", "maybe")]);
        assert_eq!(config.port, 8000);
        assert!(!config.database.echo);
    }

    #[test]
    fn test_socket_addr() {
        let config = config_from(&[("HOST", "0.0.0.0"), ("APP_PORT", "3000")]);
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);

        let bad = config_from(&[("HOST", "not a host")]);
        assert!(bad.socket_addr().is_err());
    }
}
