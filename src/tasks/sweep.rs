//! Store Sweep Task
//!
//! Periodically removes records past the in-process store's own TTL.
//! Freshness is never enforced here; a stale but unexpired record stays put
//! until the next fetch overwrites it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a background task that sweeps expired records out of `store`.
///
/// # Arguments
/// * `store` - Shared in-process store
/// * `interval_secs` - Seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_sweep_task(store: Arc<MemoryStore>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs, "Starting store sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "Store sweep removed expired records");
            } else {
                debug!("Store sweep found nothing to remove");
            }
        }
    })
}
