//! Cache Module
//!
//! Memoizes call results in a backing key-value store under a freshness
//! window.

mod clock;
mod entry;
mod finite;
mod key;
mod lru;
mod memo;
mod memory;
mod redis_store;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, StoredRecord};
pub use key::{derive_key, CallArgs};
pub use lru::LruTracker;
pub use memo::{EntryStatus, MemoCache, StoreFailurePolicy};
pub use memory::{MemoryStore, MemoryStoreStats};
pub use redis_store::RedisStore;
pub use stats::{MemoStats, StatsSnapshot};
pub use store::BackingStore;

// == Public Constants ==
/// Namespace prefix of every derived key
pub const KEY_PREFIX: &str = "func";

/// Maximum allowed callee identity length in bytes
pub const MAX_CALLEE_LENGTH: usize = 256;
