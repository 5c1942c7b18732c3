//! Clock (second-chance) cache.
//!
//! Approximates LRU without moving anything on a hit: a lookup only sets the
//! entry's reference bit. When a new key arrives at a full cache, the hand
//! sweeps the ring, clearing set bits, and replaces the first entry whose bit
//! was already clear.
//!
//! ```text
//!   slots:   [ A* ]  [ B  ]  [ C* ]  [ D  ]      * = referenced
//!              ▲
//!             hand
//!
//!   put(E):  A* ──► A (second chance), hand moves on
//!            B unreferenced ──► replaced by E*
//! ```
//!
//! An update of a resident key and a replacing insert both set the bit; a key
//! placed into a free slot starts with the bit clear.
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::policy::clock::ClockCache;
//!
//! let cache = ClockCache::new(2);
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

use crate::ds::clock_ring::ClockRing;
use crate::traits::{CacheFactory, CachePolicy, ConcurrentCache};

/// Thread-safe Clock cache backed by a [`ClockRing`].
pub struct ClockCache<K, V> {
    ring: Mutex<ClockRing<K, V>>,
}

impl<K, V> ClockCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(ClockRing::new(capacity)),
        }
    }

    pub fn put(&self, key: K, value: V) {
        let mut ring = self.ring.lock();
        if ring.insert(key, value).is_some() {
            trace!(len = ring.len(), "clock replaced unreferenced entry");
        }
    }

    /// Looks up `key` and sets its reference bit.
    pub fn get(&self, key: &K) -> Option<V> {
        self.ring.lock().get(key).cloned()
    }

    /// Looks up `key` without touching its reference bit.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.ring.lock().peek(key).cloned()
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.ring.lock().remove(key)
    }

    /// Evicts whichever entry the hand selects next.
    pub fn evict(&self) -> Option<(K, V)> {
        self.ring.lock().pop_victim()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.ring.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    pub fn clear(&self) {
        self.ring.lock().clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.ring.lock().debug_validate_invariants();
    }
}

impl<K, V> CachePolicy<K, V> for ClockCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        ClockCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        ClockCache::get(self, key)
    }

    fn len(&self) -> usize {
        ClockCache::len(self)
    }

    fn capacity(&self) -> usize {
        ClockCache::capacity(self)
    }
}

impl<K, V> CacheFactory for ClockCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn create(capacity: usize) -> Self {
        Self::new(capacity)
    }
}

impl<K: Send, V: Send> ConcurrentCache for ClockCache<K, V> {}

impl<K, V> fmt::Debug for ClockCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("ClockCache")
            .field("len", &ring.len())
            .field("capacity", &ring.capacity())
            .finish_non_exhaustive()
    }
}
