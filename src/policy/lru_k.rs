//! LRU cache with history-gated admission (LRU-K).
//!
//! A key that is not resident must be seen `k` times before a later `put`
//! admits it. Accesses to non-resident keys are counted in a separate, bounded LRU
//! history; once admitted, the key's history record is dropped and it ages
//! in the main LRU like any other entry.
//!
//! ```text
//!   put(key) ──► resident? ── yes ──► update value, move to MRU
//!                   │
//!                   no
//!                   ▼
//!           history count + 1  ──►  count > k ?  ── yes ──► drop history,
//!                   │                                       admit to main
//!                   no
//!                   ▼
//!             stays in history (bounded LRU, oldest record dropped)
//! ```
//!
//! Scan-heavy workloads touch most keys once; with `k = 2` those keys never
//! displace the working set.
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::policy::lru_k::LruKCache;
//!
//! let cache = LruKCache::new(4, 16, 2);
//! cache.put("page", 1);
//! cache.put("page", 1);
//! assert!(!cache.contains(&"page"));
//! cache.put("page", 1);
//! assert_eq!(cache.get(&"page"), Some(1));
//! ```
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{ConfigError, InvariantError};
use crate::policy::lru::LruCore;
use crate::traits::{CachePolicy, ConcurrentCache};

/// Recorded accesses needed before admission when none is configured.
pub const DEFAULT_K: u64 = 2;

#[derive(Debug)]
struct LruKCore<K, V> {
    main: LruCore<K, V>,
    history: LruCore<K, ()>,
    k: u64,
}

impl<K, V> LruKCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Counts one access of a non-resident key and returns its total.
    fn record_access(&mut self, key: &K) -> u64 {
        if let Some(entry) = self.history.touch(key) {
            return entry.access_count;
        }
        if let Some(dropped) = self.history.put(key.clone(), ()) {
            trace!(
                access_count = dropped.access_count,
                "lru-k history full, dropped oldest record"
            );
        }
        1
    }

    fn put(&mut self, key: K, value: V) {
        if self.main.contains(&key) {
            self.main.put(key, value);
            return;
        }

        // Admit once `k` earlier accesses are on record.
        let count = self.record_access(&key);
        if count > self.k {
            self.history.remove(&key);
            if self.main.put(key, value).is_some() {
                trace!("lru-k evicted least recently used entry");
            }
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        if let Some(entry) = self.main.touch(key) {
            return Some(entry.value.clone());
        }
        self.record_access(key);
        None
    }
}

/// Thread-safe LRU-K cache.
pub struct LruKCache<K, V> {
    inner: Mutex<LruKCore<K, V>>,
}

impl<K, V> LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache of `capacity` entries whose admission history tracks
    /// up to `history_capacity` keys. `k` is clamped to at least 1; with
    /// `k = 1` a key is admitted on its second access.
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        Self {
            inner: Mutex::new(LruKCore {
                main: LruCore::new(capacity),
                history: LruCore::new(history_capacity),
                k: k.max(1),
            }),
        }
    }

    /// Like [`new`](Self::new) but rejects `k = 0`.
    pub fn try_new(capacity: usize, history_capacity: usize, k: u64) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::must_be_positive("k"));
        }
        Ok(Self::new(capacity, history_capacity, k))
    }

    /// Updates a resident key, or counts an access toward admitting it.
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Looks up `key`. A miss still counts as an access for admission.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut core = self.inner.lock();
        core.history.remove(key);
        core.main.remove(key).map(|entry| entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().main.contains(key)
    }

    /// Accesses recorded for a key that is not yet admitted.
    pub fn history_count(&self, key: &K) -> Option<u64> {
        self.inner
            .lock()
            .history
            .peek(key)
            .map(|entry| entry.access_count)
    }

    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }

    pub fn k(&self) -> u64 {
        self.inner.lock().k
    }

    pub fn len(&self) -> usize {
        self.inner.lock().main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().main.capacity()
    }

    /// Drops every entry and every history record.
    pub fn purge(&self) {
        let mut core = self.inner.lock();
        core.main.clear();
        core.history.clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let core = self.inner.lock();
        core.main
            .check_invariants()
            .map_err(|msg| InvariantError::new(msg).context("lru-k main"))?;
        core.history
            .check_invariants()
            .map_err(|msg| InvariantError::new(msg).context("lru-k history"))?;
        if core.main.keys().any(|key| core.history.contains(key)) {
            return Err(InvariantError::new("admitted key still has a history record"));
        }
        Ok(())
    }
}

impl<K, V> CachePolicy<K, V> for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        LruKCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LruKCache::get(self, key)
    }

    fn len(&self) -> usize {
        LruKCache::len(self)
    }

    fn capacity(&self) -> usize {
        LruKCache::capacity(self)
    }
}

impl<K: Send, V: Send> ConcurrentCache for LruKCache<K, V> {}

impl<K, V> fmt::Debug for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruKCache")
            .field("len", &core.main.len())
            .field("capacity", &core.main.capacity())
            .field("history_len", &core.history.len())
            .field("k", &core.k)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_k_admits_after_k_recorded_accesses() {
        let cache = LruKCache::new(2, 8, 3);
        for _ in 0..3 {
            cache.put("a", 1);
        }
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.history_count(&"a"), Some(3));

        cache.put("a", 1);
        assert!(cache.contains(&"a"));
        assert_eq!(cache.history_count(&"a"), None);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn lru_k_gets_count_toward_admission() {
        let cache = LruKCache::new(2, 8, 2);
        assert_eq!(cache.get(&"a"), None);
        cache.put("a", 7);
        assert!(!cache.contains(&"a"));
        cache.put("a", 7);
        assert_eq!(cache.get(&"a"), Some(7));
    }

    #[test]
    fn lru_k_resident_update_skips_history() {
        let cache = LruKCache::new(2, 8, 1);
        cache.put("a", 1);
        cache.put("a", 2);
        assert!(cache.contains(&"a"));
        cache.put("a", 3);
        assert_eq!(cache.get(&"a"), Some(3));
        assert_eq!(cache.history_len(), 0);
    }

    #[test]
    fn lru_k_history_is_bounded() {
        let cache = LruKCache::new(2, 2, 2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        assert_eq!(cache.history_len(), 2);
        assert_eq!(cache.history_count(&"a"), None);

        // "a" lost its record, so this is its first counted access again.
        cache.put("a", 1);
        assert!(!cache.contains(&"a"));
    }

    #[test]
    fn lru_k_scan_does_not_evict_admitted_keys() {
        let cache = LruKCache::new(2, 16, 2);
        for _ in 0..3 {
            cache.put(1, "hot");
            cache.put(2, "warm");
        }
        for key in 10..20 {
            cache.put(key, "scan");
        }
        assert!(cache.contains(&1));
        assert!(cache.contains(&2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn lru_k_try_new_rejects_zero_k() {
        let err = LruKCache::<u32, u32>::try_new(4, 4, 0).unwrap_err();
        assert_eq!(err.to_string(), "k must be > 0");
        assert_eq!(LruKCache::<u32, u32>::new(4, 4, 0).k(), 1);
    }

    #[test]
    fn lru_k_remove_and_purge() {
        let cache = LruKCache::new(2, 4, 1);
        for _ in 0..2 {
            cache.put("a", 1);
            cache.put("b", 2);
        }
        assert_eq!(cache.remove(&"a"), Some(1));
        cache.purge();
        assert!(cache.is_empty());
        assert_eq!(cache.history_len(), 0);
    }
}
