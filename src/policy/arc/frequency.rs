//! Frequency partition of the ARC cache.
//!
//! Entries sit in [`FrequencyBuckets`] keyed by access count; the victim is
//! the oldest entry of the lowest-count bucket. Evicted entries go to a FIFO
//! ghost list with their count reset to 1. Unlike the recency partition, a
//! ghost hit here only removes the ghost: re-admission always happens through
//! the recency partition.
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::trace;

use crate::ds::entry::Entry;
use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::ds::ghost_list::GhostList;
use crate::error::InvariantError;

#[derive(Debug)]
struct FrequencyCore<K, V> {
    main: FrequencyBuckets<K, V>,
    ghost: GhostList<K, V>,
    capacity: usize,
    initial_capacity: usize,
    promotion_threshold: u64,
}

impl<K, V> FrequencyCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new(capacity: usize, promotion_threshold: u64) -> Self {
        Self {
            main: FrequencyBuckets::with_capacity(capacity),
            ghost: GhostList::new(capacity),
            capacity,
            initial_capacity: capacity,
            promotion_threshold,
        }
    }

    fn put(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if let Some(slot) = self.main.value_mut(&key) {
            *slot = value;
            self.main.touch(&key);
            return true;
        }

        self.ghost.remove(&key);
        if self.main.len() >= self.capacity {
            self.evict_min();
        }
        self.main.insert(Entry::new(key, value));
        true
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.main.touch(key)?;
        self.main.get(key).map(|entry| entry.value.clone())
    }

    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.main.len() >= self.capacity {
            self.evict_min();
        }
        self.capacity -= 1;
        true
    }

    fn evict_min(&mut self) {
        let Some(entry) = self.main.pop_min() else {
            return;
        };
        let count = entry.access_count;
        if self.ghost.record(entry).is_some() {
            trace!(
                ghost_capacity = self.ghost.capacity(),
                "frequency ghost list full, dropped oldest ghost"
            );
        }
        trace!(
            access_count = count,
            len = self.main.len(),
            ghost_len = self.ghost.len(),
            "frequency partition evicted least frequent entry to ghost list"
        );
    }

    fn clear(&mut self) {
        self.main.clear();
        self.ghost.clear();
        self.capacity = self.initial_capacity;
    }

    fn check_invariants(&self) -> Result<(), String> {
        self.main.check_links()?;
        self.ghost.check_links()?;
        if self.main.len() > self.capacity {
            return Err(format!(
                "main structure holds {} entries over capacity {}",
                self.main.len(),
                self.capacity
            ));
        }
        if self.main.iter().any(|entry| self.ghost.contains(&entry.key)) {
            return Err("key is resident in both main structure and ghost list".into());
        }
        Ok(())
    }
}

/// Frequency-ordered half of [`ArcCache`](super::ArcCache).
///
/// Thread-safe: every method takes `&self` and holds the partition lock for
/// its whole duration.
#[derive(Debug)]
pub struct FrequencyPart<K, V> {
    inner: Mutex<FrequencyCore<K, V>>,
}

impl<K, V> FrequencyPart<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a partition whose main structure and ghost list both hold
    /// `capacity` entries. The ghost capacity never changes afterwards.
    pub fn new(capacity: usize, promotion_threshold: u64) -> Self {
        Self {
            inner: Mutex::new(FrequencyCore::new(capacity, promotion_threshold.max(1))),
        }
    }

    /// Inserts or updates `key`.
    ///
    /// An update replaces the value and moves the entry up one frequency. A
    /// new key is purged from the ghost list and enters the frequency-1
    /// bucket, evicting the least frequent entry first if full. Returns
    /// `false` only when the capacity is 0.
    pub fn put(&self, key: K, value: V) -> bool {
        self.inner.lock().put(key, value)
    }

    /// Replaces the value of a resident key without counting an access.
    ///
    /// Returns `false` if `key` is not resident.
    pub fn refresh(&self, key: &K, value: V) -> bool {
        let mut core = self.inner.lock();
        match core.main.value_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            },
            None => false,
        }
    }

    /// Looks up `key` and moves it to the next frequency bucket.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Returns the value of `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner
            .lock()
            .main
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Consumes a ghost hit. Never re-admits.
    pub fn check_ghost(&self, key: &K) -> bool {
        self.inner.lock().ghost.remove(key)
    }

    pub fn increase_capacity(&self) {
        self.inner.lock().capacity += 1;
    }

    /// Gives up one unit of capacity, evicting the least frequent entry first
    /// if the main structure is full. Returns `false` if the capacity is
    /// already 0.
    pub fn decrease_capacity(&self) -> bool {
        self.inner.lock().decrease_capacity()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().main.contains(key)
    }

    pub fn ghost_contains(&self, key: &K) -> bool {
        self.inner.lock().ghost.contains(key)
    }

    /// Resident keys in eviction order: ascending frequency, oldest first.
    pub fn keys(&self) -> Vec<K> {
        let core = self.inner.lock();
        core.main.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Ghost keys from oldest to most recently evicted.
    pub fn ghost_keys(&self) -> Vec<K> {
        self.inner.lock().ghost.keys().cloned().collect()
    }

    /// Access count of a resident key.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().main.frequency(key)
    }

    /// Smallest access count among resident keys.
    pub fn min_frequency(&self) -> Option<u64> {
        self.inner.lock().main.min_freq()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().main.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn ghost_capacity(&self) -> usize {
        self.inner.lock().ghost.capacity()
    }

    pub fn ghost_len(&self) -> usize {
        self.inner.lock().ghost.len()
    }

    pub fn promotion_threshold(&self) -> u64 {
        self.inner.lock().promotion_threshold
    }

    /// Drops every entry and ghost and restores the initial capacity.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner
            .lock()
            .check_invariants()
            .map_err(|msg| InvariantError::new(msg).context("frequency partition"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_put_get_roundtrip() {
        let part = FrequencyPart::new(2, 3);
        assert!(part.put("a", 1));
        assert_eq!(part.get(&"a"), Some(1));
        assert_eq!(part.frequency(&"a"), Some(2));
        assert_eq!(part.get(&"missing"), None);
    }

    #[test]
    fn frequency_evicts_least_frequent_first() {
        let part = FrequencyPart::new(3, 3);
        part.put("a", 1);
        part.put("b", 2);
        part.put("c", 3);
        part.get(&"a");
        part.get(&"c");

        part.put("d", 4);
        assert!(!part.contains(&"b"));
        assert!(part.ghost_contains(&"b"));
        assert_eq!(part.keys(), vec!["d", "a", "c"]);
        assert!(part.check_invariants().is_ok());
    }

    #[test]
    fn frequency_ties_break_by_bucket_age() {
        let part = FrequencyPart::new(2, 3);
        part.put("a", 1);
        part.put("b", 2);
        part.put("c", 3);
        assert_eq!(part.ghost_keys(), vec!["a"]);
        part.put("d", 4);
        assert_eq!(part.ghost_keys(), vec!["a", "b"]);
    }

    #[test]
    fn frequency_update_bumps_count_and_value() {
        let part = FrequencyPart::new(2, 3);
        part.put("a", 1);
        part.put("a", 2);
        assert_eq!(part.frequency(&"a"), Some(2));
        assert_eq!(part.peek(&"a"), Some(2));
    }

    #[test]
    fn frequency_refresh_keeps_count() {
        let part = FrequencyPart::new(2, 3);
        part.put("a", 1);
        assert!(part.refresh(&"a", 7));
        assert!(!part.refresh(&"b", 7));
        assert_eq!(part.frequency(&"a"), Some(1));
        assert_eq!(part.peek(&"a"), Some(7));
    }

    #[test]
    fn frequency_check_ghost_removes_without_readmitting() {
        let part = FrequencyPart::new(1, 3);
        part.put("a", 1);
        part.put("b", 2);
        assert!(part.check_ghost(&"a"));
        assert!(!part.contains(&"a"));
        assert!(!part.ghost_contains(&"a"));
        assert!(!part.check_ghost(&"a"));
    }

    #[test]
    fn frequency_min_frequency_tracks_gets() {
        let part = FrequencyPart::new(2, 3);
        part.put("a", 1);
        part.put("b", 2);
        part.get(&"a");
        assert_eq!(part.min_frequency(), Some(1));
        part.get(&"b");
        assert_eq!(part.min_frequency(), Some(2));
        assert!(part.check_invariants().is_ok());
    }

    #[test]
    fn frequency_capacity_transfer_contract() {
        let part = FrequencyPart::new(1, 3);
        part.put("a", 1);
        assert!(part.decrease_capacity());
        assert_eq!(part.capacity(), 0);
        assert!(part.is_empty());
        assert!(part.ghost_contains(&"a"));
        assert!(!part.decrease_capacity());
        assert!(!part.put("b", 2));

        part.increase_capacity();
        assert!(part.put("b", 2));
        assert_eq!(part.ghost_capacity(), 1);
        assert!(part.check_invariants().is_ok());
    }

    #[test]
    fn frequency_clear_restores_initial_capacity() {
        let part = FrequencyPart::new(2, 3);
        part.put("a", 1);
        part.decrease_capacity();
        part.clear();
        assert_eq!(part.capacity(), 2);
        assert!(part.is_empty());
        assert_eq!(part.min_frequency(), None);
    }
}
