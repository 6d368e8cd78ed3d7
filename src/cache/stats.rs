//! Cache Statistics Module
//!
//! Counters describing how the memoizing cache answered its callers.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Memo Stats ==
/// Live counters, updated from any task holding the cache.
#[derive(Debug, Default)]
pub struct MemoStats {
    hits: AtomicU64,
    misses: AtomicU64,
    stale: AtomicU64,
    computations: AtomicU64,
    compute_failures: AtomicU64,
    invalidations: AtomicU64,
    bypasses: AtomicU64,
}

impl MemoStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh entry answered the call.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// No entry existed for the key.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// An entry existed but was past the freshness window.
    pub fn record_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compute_failure(&self) {
        self.compute_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// The store failed and the call went straight to the computation.
    pub fn record_bypass(&self) {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            compute_failures: self.compute_failures.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of [`MemoStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub computations: u64,
    pub compute_failures: u64,
    pub invalidations: u64,
    pub bypasses: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses + stale), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses + self.stale;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let snapshot = MemoStats::new().snapshot();
        assert_eq!(snapshot, StatsSnapshot::default());
        assert_eq!(snapshot.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_stale_as_lookup() {
        let stats = MemoStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_stale();
        stats.record_hit();

        assert_eq!(stats.snapshot().hit_rate(), 0.5);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let stats = MemoStats::new();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.snapshot().hit_rate(), 1.0);
    }

    #[test]
    fn test_counters_are_independent() {
        let stats = MemoStats::new();
        stats.record_computation();
        stats.record_computation();
        stats.record_compute_failure();
        stats.record_invalidation();
        stats.record_bypass();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.computations, 2);
        assert_eq!(snapshot.compute_failures, 1);
        assert_eq!(snapshot.invalidations, 1);
        assert_eq!(snapshot.bypasses, 1);
        assert_eq!(snapshot.hits, 0);
    }
}
