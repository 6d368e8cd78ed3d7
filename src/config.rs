//! Configuration Module
//!
//! Loads cache and server settings from environment variables.

use std::env;
use std::str::FromStr;

use chrono::Duration;

/// Default freshness window: two hours.
pub const DEFAULT_FRESHNESS_SECS: u64 = 2 * 3600;

/// Longest accepted duration setting: ten years.
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 3600;

/// Which backing store the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backing store selection
    pub backend: StoreBackend,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_password: Option<String>,
    /// Maximum entry age in seconds before recomputation
    pub freshness_secs: u64,
    /// Store-side expiration in seconds, independent of freshness
    pub store_ttl_secs: Option<u64>,
    /// Capacity of the in-process store
    pub memory_max_entries: usize,
    /// Interval in seconds between in-process store sweeps
    pub sweep_interval: u64,
    /// Compute directly (with a warning) when the store fails
    pub bypass_on_store_failure: bool,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_HOST` - Redis host (default: localhost)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_PASSWORD` - Redis password (default: toor, empty disables auth)
    /// - `CACHE_FRESHNESS_SECS` - Freshness window (default: 7200)
    /// - `STORE_TTL_SECS` - Store-side expiration (default: none)
    /// - `MEMORY_MAX_ENTRIES` - In-process store capacity (default: 1000)
    /// - `SWEEP_INTERVAL_SECS` - In-process sweep frequency (default: 60)
    /// - `CACHE_BYPASS_ON_STORE_FAILURE` - `true` to degrade instead of failing (default: false)
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    ///
    /// Durations above `MAX_DURATION_SECS` are ignored like unparsable ones.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let redis_password = match env::var("REDIS_PASSWORD") {
            Ok(v) if v.is_empty() => None,
            Ok(v) => Some(v),
            Err(_) => defaults.redis_password.clone(),
        };

        Self {
            backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var("REDIS_PORT").unwrap_or(defaults.redis_port),
            redis_password,
            freshness_secs: duration_var("CACHE_FRESHNESS_SECS")
                .unwrap_or(defaults.freshness_secs),
            store_ttl_secs: duration_var("STORE_TTL_SECS").filter(|ttl| *ttl > 0),
            memory_max_entries: parse_var("MEMORY_MAX_ENTRIES")
                .unwrap_or(defaults.memory_max_entries),
            sweep_interval: duration_var("SWEEP_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
            bypass_on_store_failure: parse_var("CACHE_BYPASS_ON_STORE_FAILURE")
                .unwrap_or(defaults.bypass_on_store_failure),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    pub fn freshness(&self) -> Duration {
        Duration::seconds(self.freshness_secs.min(MAX_DURATION_SECS) as i64)
    }

    pub fn store_ttl(&self) -> Option<Duration> {
        self.store_ttl_secs
            .map(|secs| Duration::seconds(secs.min(MAX_DURATION_SECS) as i64))
    }

    /// Connection URL for the Redis backend.
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}/",
                password, self.redis_host, self.redis_port
            ),
            None => format!("redis://{}:{}/", self.redis_host, self.redis_port),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn duration_var(name: &str) -> Option<u64> {
    env::var(name).ok().as_deref().and_then(bounded_secs)
}

/// Parses whole seconds, refusing values too large for a `chrono::Duration`.
fn bounded_secs(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs <= MAX_DURATION_SECS)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_password: Some("toor".to_string()),
            freshness_secs: DEFAULT_FRESHNESS_SECS,
            store_ttl_secs: None,
            memory_max_entries: 1000,
            sweep_interval: 60,
            bypass_on_store_failure: false,
            server_port: 5000,
        }
    }
}
