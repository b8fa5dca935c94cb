//! Configuration Module
//!
//! Handles loading the store connection and namespacing settings from
//! environment variables, plus small typed helpers for reading the
//! environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Connection and namespacing parameters for a cache handle.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store hostname or IP address
    pub host: String,
    /// Store TCP port
    pub port: u16,
    /// Optional credential sent with AUTH
    pub password: Option<String>,
    /// Database index selected after connecting
    pub db: i64,
    /// Namespace prefix prepended to every logical key
    pub prefix: String,
    /// Default TTL in seconds for writes without an explicit TTL (0 = none)
    pub default_ttl: Option<u64>,
    /// Seconds allowed for establishing the connection
    pub connect_timeout: u64,
    /// COUNT hint sent with every SCAN page request
    pub scan_count: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_HOST` - Store host (default: 127.0.0.1)
    /// - `CACHE_PORT` - Store port (default: 6379)
    /// - `CACHE_PASSWORD` - Credential, empty means none (default: unset)
    /// - `CACHE_DB` - Database index (default: 0)
    /// - `CACHE_PREFIX` - Namespace prefix (default: empty)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: unset)
    /// - `CACHE_CONNECT_TIMEOUT` - Connect timeout in seconds (default: 5)
    /// - `CACHE_SCAN_COUNT` - Keys requested per SCAN page (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_string("CACHE_HOST").unwrap_or(defaults.host),
            port: env_int("CACHE_PORT").unwrap_or(defaults.port),
            password: env_string("CACHE_PASSWORD"),
            db: env_int("CACHE_DB").unwrap_or(defaults.db),
            prefix: env_string("CACHE_PREFIX").unwrap_or(defaults.prefix),
            default_ttl: env_int("CACHE_DEFAULT_TTL"),
            connect_timeout: env_int("CACHE_CONNECT_TIMEOUT").unwrap_or(defaults.connect_timeout),
            scan_count: env_int("CACHE_SCAN_COUNT").unwrap_or(defaults.scan_count),
        }
    }

    /// Human-readable `host:port/db` used in logs and connection errors.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }

    /// Default TTL as a duration; zero is treated as "no default".
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            prefix: String::new(),
            default_ttl: None,
            connect_timeout: 5,
            scan_count: 100,
        }
    }
}

// == Environment Helpers ==

/// Reads a variable, treating unset and empty the same way.
pub fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Reads and parses a numeric variable. Unparseable values are ignored.
pub fn env_int<T: FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.trim().parse().ok())
}

/// True only when the variable is `true` in any letter case.
pub fn env_bool(name: &str) -> bool {
    env_string(name).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Splits a comma-separated variable, dropping blank items.
pub fn env_list(name: &str) -> Vec<String> {
    env_string(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
