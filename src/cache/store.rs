//! Backing Store Module
//!
//! The key-value contract the memoizing cache persists entries through.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;
use crate::error::Result;

// == Backing Store ==
/// Key-value persistence for memoized results.
///
/// Implementations report unreachable storage and unreadable records as
/// `CacheError::StoreUnavailable`. They may expire entries on their own
/// schedule; the cache treats such an entry as absent.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Returns the entry stored at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Writes an entry, replacing whatever was at `key`.
    async fn set(&self, key: &str, timestamp: DateTime<Utc>, payload: &str) -> Result<()>;

    /// Removes the entry at `key`. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Short label for logs and health output.
    fn name(&self) -> &'static str;
}
