//! Least Frequently Used cache with frequency aging.
//!
//! Entries live in [`FrequencyBuckets`]: the victim is the oldest entry of the
//! lowest non-empty frequency. Plain LFU lets a key that was hot long ago stay
//! resident forever, so the cache also tracks the sum of all access counts.
//! When the average count rises above `max_average_frequency`, every count is
//! lowered by half that limit (never below 1), keeping the relative order.
//!
//! ```text
//!   freq 1:  [ d ]           total = 1 + 12 + 13 = 26, average 8
//!   freq 12: [ b ]
//!   freq 13: [ a ]           one more hit on "a" with limit 8:
//!                            average 27 / 3 = 9 > 8 ──► subtract 4 everywhere
//!   after aging:
//!   freq 1: [ d ]   freq 8: [ b ]   freq 10: [ a ]
//! ```
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::policy::lfu::LfuCache;
//!
//! let cache = LfuCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::trace;

use crate::ds::entry::Entry;
use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError};
use crate::traits::{CacheFactory, CachePolicy, ConcurrentCache};

/// Average access count that triggers aging when none is configured.
pub const DEFAULT_MAX_AVERAGE_FREQUENCY: u64 = 10;

#[derive(Debug)]
struct LfuCore<K, V> {
    buckets: FrequencyBuckets<K, V>,
    capacity: usize,
    max_average: u64,
    total: u64,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(slot) = self.buckets.value_mut(&key) {
            *slot = value;
            self.buckets.touch(&key);
            self.record_access();
            return;
        }

        if self.buckets.len() >= self.capacity
            && let Some(evicted) = self.buckets.pop_min()
        {
            self.total = self.total.saturating_sub(evicted.access_count);
            trace!(
                access_count = evicted.access_count,
                "lfu evicted least frequently used entry"
            );
        }
        self.buckets.insert(Entry::new(key, value));
        self.record_access();
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.buckets.touch(key)?;
        self.record_access();
        self.buckets.get(key).map(|entry| entry.value.clone())
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.buckets.remove(key)?;
        self.total = self.total.saturating_sub(entry.access_count);
        Some(entry.value)
    }

    fn record_access(&mut self) {
        self.total = self.total.saturating_add(1);
        let len = self.buckets.len() as u64;
        if len > 0 && self.total / len > self.max_average {
            self.age();
        }
    }

    fn age(&mut self) {
        let reduce = (self.max_average / 2).max(1);
        self.buckets
            .rebuild_with(|freq| freq.saturating_sub(reduce).max(1));
        let before = self.total;
        self.total = self.buckets.iter().map(|entry| entry.access_count).sum();
        trace!(
            reduce,
            total_before = before,
            total_after = self.total,
            "lfu aged access counts"
        );
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.total = 0;
    }

    fn check_invariants(&self) -> Result<(), String> {
        self.buckets.check_links()?;
        if self.buckets.len() > self.capacity {
            return Err(format!(
                "{} entries over capacity {}",
                self.buckets.len(),
                self.capacity
            ));
        }
        let sum: u64 = self.buckets.iter().map(|entry| entry.access_count).sum();
        if sum != self.total {
            return Err(format!(
                "tracked total {} differs from summed counts {}",
                self.total, sum
            ));
        }
        Ok(())
    }
}

/// Thread-safe LFU cache.
pub struct LfuCache<K, V> {
    inner: Mutex<LfuCore<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_max_average(capacity, DEFAULT_MAX_AVERAGE_FREQUENCY)
    }

    /// Creates a cache that ages counts once their average exceeds
    /// `max_average`. The limit is clamped to at least 1.
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        Self {
            inner: Mutex::new(LfuCore {
                buckets: FrequencyBuckets::with_capacity(capacity),
                capacity,
                max_average: max_average.max(1),
                total: 0,
            }),
        }
    }

    /// Like [`with_max_average`](Self::with_max_average) but rejects a limit of 0.
    pub fn try_with_max_average(capacity: usize, max_average: u64) -> Result<Self, ConfigError> {
        if max_average == 0 {
            return Err(ConfigError::must_be_positive("max_average_frequency"));
        }
        Ok(Self::with_max_average(capacity, max_average))
    }

    /// Inserts or updates `key`. An update counts as an access.
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Drops every entry and resets the access total.
    pub fn purge(&self) {
        self.inner.lock().clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().buckets.contains(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().buckets.frequency(key)
    }

    /// Resident keys in eviction order.
    pub fn keys(&self) -> Vec<K> {
        let core = self.inner.lock();
        core.buckets.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Sum of the access counts of all resident keys.
    pub fn total_frequency(&self) -> u64 {
        self.inner.lock().total
    }

    pub fn max_average_frequency(&self) -> u64 {
        self.inner.lock().max_average
    }

    pub fn len(&self) -> usize {
        self.inner.lock().buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner
            .lock()
            .check_invariants()
            .map_err(|msg| InvariantError::new(msg).context("lfu"))
    }
}

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        LfuCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LfuCache::get(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn capacity(&self) -> usize {
        LfuCache::capacity(self)
    }
}

impl<K, V> CacheFactory for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn create(capacity: usize) -> Self {
        Self::new(capacity)
    }
}

impl<K: Send, V: Send> ConcurrentCache for LfuCache<K, V> {}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LfuCache")
            .field("len", &core.buckets.len())
            .field("capacity", &core.capacity)
            .field("total", &core.total)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lfu_evicts_lowest_frequency_oldest_first() {
        let cache = LfuCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get(&"b");

        cache.put("d", 4);
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.keys(), vec!["c", "d", "b"]);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn lfu_update_counts_as_access() {
        let cache = LfuCache::new(2);
        cache.put("a", 1);
        cache.put("a", 2);
        assert_eq!(cache.frequency(&"a"), Some(2));
        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.total_frequency(), 3);
    }

    #[test]
    fn lfu_ages_counts_past_average_limit() {
        let cache = LfuCache::with_max_average(2, 4);
        cache.put("a", 1);
        cache.put("b", 2);
        for _ in 0..7 {
            cache.get(&"a");
        }
        // a = 8, b = 1, total 9, average 4: still under the limit.
        assert_eq!(cache.frequency(&"a"), Some(8));

        cache.get(&"a");
        // a = 9, total 10, average 5 > 4: every count drops by 2.
        assert_eq!(cache.frequency(&"a"), Some(7));
        assert_eq!(cache.frequency(&"b"), Some(1));
        assert_eq!(cache.total_frequency(), 8);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn lfu_eviction_subtracts_from_total() {
        let cache = LfuCache::new(1);
        cache.put("a", 1);
        cache.get(&"a");
        cache.put("b", 2);
        assert_eq!(cache.total_frequency(), 1);
        assert_eq!(cache.remove(&"b"), Some(2));
        assert_eq!(cache.total_frequency(), 0);
    }

    #[test]
    fn lfu_purge_resets_state() {
        let cache = LfuCache::new(2);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.purge();
        assert!(cache.is_empty());
        assert_eq!(cache.total_frequency(), 0);
        cache.put(3, 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn lfu_rejects_zero_max_average() {
        let err = LfuCache::<u8, u8>::try_with_max_average(4, 0).unwrap_err();
        assert!(err.to_string().contains("max_average_frequency"));
        assert_eq!(LfuCache::<u8, u8>::with_max_average(4, 0).max_average_frequency(), 1);
    }

    #[test]
    fn lfu_zero_capacity_stores_nothing() {
        let cache = LfuCache::new(0);
        cache.put(1, 1);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.total_frequency(), 0);
    }
}
