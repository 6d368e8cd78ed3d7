//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{EntryStatus, StatsSnapshot};

/// Response body for key derivation (POST /keys)
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    pub key: String,
}

/// Response body for invalidation (POST /invalidate)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The key that was invalidated
    pub key: String,
}

impl InvalidateResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' invalidated", key),
            key,
        }
    }
}

/// Response body for entry inspection (GET /entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub key: String,
    /// Write time in RFC 3339
    pub timestamp: String,
    pub age_secs: i64,
    /// Whether the entry is within the freshness window
    pub fresh: bool,
    /// Stored JSON payload, verbatim
    pub output: String,
}

impl From<EntryStatus> for EntryResponse {
    fn from(status: EntryStatus) -> Self {
        Self {
            key: status.key,
            timestamp: status.timestamp.to_rfc3339(),
            age_secs: status.age.num_seconds(),
            fresh: status.fresh,
            output: status.payload,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub computations: u64,
    pub compute_failures: u64,
    pub invalidations: u64,
    pub bypasses: u64,
    /// Cache hit rate (0.0 to 1.0)
    pub hit_rate: f64,
    pub freshness_secs: i64,
}

impl StatsResponse {
    pub fn new(stats: StatsSnapshot, freshness_secs: i64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            stale: stats.stale,
            computations: stats.computations,
            compute_failures: stats.compute_failures,
            invalidations: stats.invalidations,
            bypasses: stats.bypasses,
            hit_rate: stats.hit_rate(),
            freshness_secs,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Backing store name
    pub store: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn new(store_reachable: bool, store: impl Into<String>) -> Self {
        let status = if store_reachable { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            store: store.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
