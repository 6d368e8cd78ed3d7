//! In-Process Store Module
//!
//! HashMap-backed `BackingStore` with a capacity bound, LRU eviction and an
//! optional store-side expiration independent of cache freshness.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{BackingStore, CacheEntry, Clock, LruTracker, SystemClock};
use crate::error::Result;

// == Slot ==
/// A persisted record and its store-side deadline.
#[derive(Debug, Clone)]
struct Slot {
    record: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Slot {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

// == Store Stats ==
/// Housekeeping counters of the in-process store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryStoreStats {
    /// Entries dropped to respect `max_entries`
    pub evictions: u64,
    /// Entries dropped because their store TTL elapsed
    pub expirations: u64,
    pub total_entries: usize,
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<String, Slot>,
    lru: LruTracker,
    stats: MemoryStoreStats,
}

impl Inner {
    fn drop_key(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        let removed = self.slots.remove(key).is_some();
        self.stats.total_entries = self.slots.len();
        removed
    }
}

// == Memory Store ==
pub struct MemoryStore {
    inner: RwLock<Inner>,
    max_entries: usize,
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` records.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity; the least recently used record is evicted beyond it
    /// * `ttl` - Optional store-side lifetime of each record
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        Self::with_clock(max_entries, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(max_entries: usize, ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            max_entries: max_entries.max(1),
            ttl,
            clock,
        }
    }

    // == Insert Raw ==
    /// Stores a record string verbatim, without encoding it.
    ///
    /// Used to share records written elsewhere and to seed corrupt data.
    pub async fn insert_raw(&self, key: &str, record: impl Into<String>) {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        self.insert_locked(&mut inner, key, record.into(), now);
    }

    fn insert_locked(&self, inner: &mut Inner, key: &str, record: String, now: DateTime<Utc>) {
        let is_overwrite = inner.slots.contains_key(key);

        if !is_overwrite && inner.slots.len() >= self.max_entries {
            if let Some(evicted) = inner.lru.evict_oldest() {
                inner.slots.remove(&evicted);
                inner.stats.evictions += 1;
                debug!(key = %evicted, "Evicted least recently used record");
            }
        }

        let slot = Slot {
            record,
            expires_at: self.ttl.map(|ttl| now + ttl),
        };
        inner.slots.insert(key.to_string(), slot);
        inner.lru.touch(key);
        inner.stats.total_entries = inner.slots.len();
    }

    // == Cleanup Expired ==
    /// Removes every record whose store TTL has elapsed.
    ///
    /// Returns the number of records removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        let expired: Vec<String> = inner
            .slots
            .iter()
            .filter(|(_, slot)| slot.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.drop_key(key);
        }
        inner.stats.expirations += expired.len() as u64;
        expired.len()
    }

    pub async fn stats(&self) -> MemoryStoreStats {
        self.inner.read().await.stats.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.slots.is_empty()
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        let (record, expired) = match inner.slots.get(key) {
            Some(slot) => (slot.record.clone(), slot.is_expired(now)),
            None => return Ok(None),
        };

        if expired {
            inner.drop_key(key);
            inner.stats.expirations += 1;
            return Ok(None);
        }

        inner.lru.touch(key);
        CacheEntry::from_record_json(key, &record).map(Some)
    }

    async fn set(&self, key: &str, timestamp: DateTime<Utc>, payload: &str) -> Result<()> {
        let record = CacheEntry::new(key, timestamp, payload).to_record_json()?;
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        self.insert_locked(&mut inner, key, record, now);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().await.drop_key(key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
