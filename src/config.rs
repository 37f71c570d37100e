//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which cache backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// External Redis server
    Redis,
    /// In-process map, for local runs and tests
    Memory,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown cache backend: {value}")),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache backend selection
    pub cache_backend: CacheBackendKind,
    /// Redis connection address
    pub cache_url: String,
    /// Prefix applied to every cache key
    pub cache_key_prefix: String,
    /// Snapshot TTL in seconds
    pub cache_ttl: u64,
    /// Upper bound on any single cache call, in milliseconds
    pub cache_timeout_ms: u64,
    /// SQLite database file
    pub database_path: String,
    /// Memory backend expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `CACHE_URL` - Redis address (default: redis://127.0.0.1:6379)
    /// - `CACHE_KEY_PREFIX` - Cache key prefix (default: empty)
    /// - `CACHE_TTL` - Snapshot TTL in seconds, minimum 1 (default: 60)
    /// - `CACHE_TIMEOUT_MS` - Per-call cache timeout (default: 500)
    /// - `DATABASE_PATH` - SQLite file (default: weather.db)
    /// - `CLEANUP_INTERVAL` - Memory backend sweep in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let cache_ttl = parse_env("CACHE_TTL").unwrap_or(defaults.cache_ttl);

        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_backend: parse_env("CACHE_BACKEND").unwrap_or(defaults.cache_backend),
            cache_url: env::var("CACHE_URL").unwrap_or(defaults.cache_url),
            cache_key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.cache_key_prefix),
            // Redis rejects SET EX 0
            cache_ttl: cache_ttl.max(1),
            cache_timeout_ms: parse_env("CACHE_TIMEOUT_MS").unwrap_or(defaults.cache_timeout_ms),
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Snapshot TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Cache call timeout as a Duration.
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            cache_backend: CacheBackendKind::Redis,
            cache_url: "redis://127.0.0.1:6379".to_string(),
            cache_key_prefix: String::new(),
            cache_ttl: 60,
            cache_timeout_ms: 500,
            database_path: "weather.db".to_string(),
            cleanup_interval: 1,
        }
    }
}
