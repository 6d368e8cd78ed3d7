//! Cache Entry Module
//!
//! Defines a memoized result and the record format it is persisted in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{CacheError, Result};

// == Cache Entry ==
/// A memoized call result as held by a backing store.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Derived cache key
    pub key: String,
    /// When the entry was written
    pub timestamp: DateTime<Utc>,
    /// JSON-encoded call result
    pub payload: String,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, timestamp: DateTime<Utc>, payload: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            timestamp,
            payload: payload.into(),
        }
    }

    // == Age ==
    /// Time elapsed between the write and `now`. Negative if the entry was
    /// stamped ahead of `now` (clock skew between writers).
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    // == Freshness ==
    /// Fresh while `now - timestamp <= window`; the boundary itself is fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) <= window
    }

    // == Persisted Form ==
    /// Encodes `{"timestamp": <unix secs>, "output": <payload>}`.
    pub fn to_record_json(&self) -> Result<String> {
        StoredRecord::from_parts(self.timestamp, &self.payload).to_json()
    }

    /// Decodes a persisted record. Anything unreadable is reported as a
    /// store failure, never as a miss.
    pub fn from_record_json(key: impl Into<String>, raw: &str) -> Result<Self> {
        let key = key.into();
        let record: StoredRecord = serde_json::from_str(raw).map_err(|e| {
            CacheError::StoreUnavailable(format!("malformed record at '{}': {}", key, e))
        })?;
        let timestamp = record.timestamp_utc().ok_or_else(|| {
            CacheError::StoreUnavailable(format!(
                "record at '{}' has invalid timestamp {}",
                key, record.timestamp
            ))
        })?;

        Ok(Self {
            key,
            timestamp,
            payload: record.output,
        })
    }
}

// == Stored Record ==
/// Wire format shared with every other reader and writer of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Unix seconds; whole when written here, possibly fractional when read
    pub timestamp: Number,
    pub output: String,
}

impl StoredRecord {
    /// Timestamps are floored to whole seconds on write, so a stored entry
    /// never looks younger than it is.
    pub fn from_parts(timestamp: DateTime<Utc>, output: &str) -> Self {
        Self {
            timestamp: Number::from(timestamp.timestamp()),
            output: output.to_string(),
        }
    }

    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        if let Some(secs) = self.timestamp.as_i64() {
            return DateTime::from_timestamp(secs, 0);
        }
        let secs = self.timestamp.as_f64()?;
        if !secs.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis((secs * 1000.0).floor() as i64)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CacheError::Serialization(e.to_string()))
    }
}
