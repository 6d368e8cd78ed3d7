//! Memoizing Cache Module
//!
//! Cache-aside wrapper around expensive calls: derive a key from the callee
//! and its arguments, answer from the backing store while the stored result
//! is fresh, otherwise run the computation and store what it returns.
//!
//! There is no single-flight: two concurrent misses on one key both run
//! their computation and both write, and the last write wins. Callers that
//! need deduplication coordinate above this layer.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::finite::ensure_finite;
use crate::cache::{
    derive_key, BackingStore, CallArgs, Clock, MemoStats, StatsSnapshot, SystemClock,
};
use crate::error::{CacheError, Result};

// == Store Failure Policy ==
/// What to do when the backing store cannot be read or written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreFailurePolicy {
    /// Fail the call with `CacheError::StoreUnavailable`.
    #[default]
    Propagate,
    /// Log a warning and answer from the computation without caching.
    Bypass,
}

// == Entry Status ==
/// Read-only view of a stored entry, as reported by [`MemoCache::inspect`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntryStatus {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub age: Duration,
    pub fresh: bool,
    pub payload: String,
}

enum Lookup<T> {
    Fresh(T),
    Stale(Duration),
    Absent,
}

// == Memo Cache ==
pub struct MemoCache {
    store: Arc<dyn BackingStore>,
    clock: Arc<dyn Clock>,
    freshness: Duration,
    policy: StoreFailurePolicy,
    stats: MemoStats,
}

impl MemoCache {
    // == Constructor ==
    /// Creates a cache over `store` where entries stay fresh for `freshness`.
    pub fn new(store: Arc<dyn BackingStore>, freshness: Duration) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            freshness,
            policy: StoreFailurePolicy::default(),
            stats: MemoStats::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_failure_policy(mut self, policy: StoreFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn failure_policy(&self) -> StoreFailurePolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn derive_key(&self, callee: &str, args: &CallArgs) -> Result<String> {
        derive_key(callee, args)
    }

    // == Fetch Or Compute ==
    /// Returns the stored result for `(callee, args)` if it is within the
    /// cache's freshness window, otherwise awaits `compute` and stores its
    /// result.
    ///
    /// Errors from `compute` come back exactly as produced and leave the
    /// store untouched. Cache failures reach the caller through
    /// `E: From<CacheError>`.
    pub async fn fetch_or_compute<T, E, F, Fut>(
        &self,
        callee: &str,
        args: &CallArgs,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.fetch_or_compute_within(callee, args, self.freshness, compute)
            .await
    }

    /// Same as [`fetch_or_compute`](Self::fetch_or_compute) with an explicit
    /// freshness window for this call.
    pub async fn fetch_or_compute_within<T, E, F, Fut>(
        &self,
        callee: &str,
        args: &CallArgs,
        window: Duration,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let key = derive_key(callee, args)?;

        match self.lookup::<T>(&key, window).await {
            Ok(Lookup::Fresh(value)) => {
                self.stats.record_hit();
                debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            Ok(Lookup::Stale(age)) => {
                self.stats.record_stale();
                debug!(key = %key, age_secs = age.num_seconds(), "Cache entry stale");
            }
            Ok(Lookup::Absent) => {
                self.stats.record_miss();
                debug!(key = %key, "Cache miss");
            }
            Err(err) => {
                self.on_store_failure(&key, err)?;
                return self.compute(compute).await;
            }
        }

        let value = self.compute(compute).await?;
        ensure_finite(&value)?;
        let payload =
            serde_json::to_string(&value).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let written_at = self.clock.now();
        if let Err(err) = self.store.set(&key, written_at, &payload).await {
            self.on_store_failure(&key, err)?;
        }

        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str, window: Duration) -> Result<Lookup<T>> {
        let Some(entry) = self.store.get(key).await? else {
            return Ok(Lookup::Absent);
        };

        let now = self.clock.now();
        if !entry.is_fresh(now, window) {
            return Ok(Lookup::Stale(entry.age(now)));
        }

        serde_json::from_str(&entry.payload)
            .map(Lookup::Fresh)
            .map_err(|e| {
                CacheError::StoreUnavailable(format!(
                    "payload at '{}' does not decode: {}",
                    key, e
                ))
            })
    }

    async fn compute<T, E, F, Fut>(&self, compute: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.stats.record_computation();
        compute()
            .await
            .inspect_err(|_| self.stats.record_compute_failure())
    }

    /// Applies the failure policy; `Ok` means carry on without the store.
    fn on_store_failure(&self, key: &str, err: CacheError) -> Result<()> {
        match self.policy {
            StoreFailurePolicy::Propagate => Err(err),
            StoreFailurePolicy::Bypass => {
                self.stats.record_bypass();
                warn!(key = %key, error = %err, "Backing store failed, bypassing cache");
                Ok(())
            }
        }
    }

    // == Invalidate ==
    /// Deletes the entry for `(callee, args)` and returns its key.
    /// Absent entries are not an error.
    pub async fn invalidate(&self, callee: &str, args: &CallArgs) -> Result<String> {
        let key = derive_key(callee, args)?;
        self.invalidate_key(&key).await?;
        Ok(key)
    }

    pub async fn invalidate_key(&self, key: &str) -> Result<()> {
        self.store.delete(key).await?;
        self.stats.record_invalidation();
        debug!(key = %key, "Cache entry invalidated");
        Ok(())
    }

    // == Inspect ==
    /// Reads an entry by raw key without computing or refreshing it.
    pub async fn inspect(&self, key: &str) -> Result<Option<EntryStatus>> {
        let now = self.clock.now();
        Ok(self.store.get(key).await?.map(|entry| EntryStatus {
            age: entry.age(now),
            fresh: entry.is_fresh(now, self.freshness),
            key: entry.key,
            timestamp: entry.timestamp,
            payload: entry.payload,
        }))
    }
}
