//! LRU Tracker Module
//!
//! Recency ordering for the in-process store's capacity bound.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Orders keys by last use with a monotonically increasing tick.
///
/// `by_tick` maps tick to key (smallest tick = least recently used) and
/// `ticks` maps key back to its current tick, so touch, remove and evict
/// are all logarithmic.
#[derive(Debug, Default)]
pub struct LruTracker {
    next_tick: u64,
    by_tick: BTreeMap<u64, String>,
    ticks: HashMap<String, u64>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks `key` as the most recently used.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        if let Some(old) = self.ticks.insert(key.to_string(), tick) {
            self.by_tick.remove(&old);
        }
        self.by_tick.insert(tick, key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

}

// Inspection helpers for the tests below.
#[cfg(test)]
impl LruTracker {
    pub fn peek_oldest(&self) -> Option<&str> {
        self.by_tick.first_key_value().map(|(_, key)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ticks.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let lru = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_touch_existing_key_moves_it_back() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some("b"));
    }

    #[test]
    fn test_evict_order() {
        let mut lru = LruTracker::new();
        for key in ["a", "b", "c"] {
            lru.touch(key);
        }
        lru.touch("a");
        lru.touch("c");
        lru.touch("b");

        assert_eq!(lru.evict_oldest().as_deref(), Some("a"));
        assert_eq!(lru.evict_oldest().as_deref(), Some("c"));
        assert_eq!(lru.evict_oldest().as_deref(), Some("b"));
        assert_eq!(lru.evict_oldest(), None);
        assert!(lru.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.remove("a");
        lru.remove("missing");

        assert_eq!(lru.len(), 1);
        assert!(!lru.contains("a"));
        assert_eq!(lru.peek_oldest(), Some("b"));
    }

    #[test]
    fn test_repeated_touch_keeps_single_slot() {
        let mut lru = LruTracker::new();
        lru.touch("k");
        lru.touch("k");
        lru.touch("k");

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.evict_oldest().as_deref(), Some("k"));
        assert!(lru.is_empty());
    }
}
