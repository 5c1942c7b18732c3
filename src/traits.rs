//! # Cache Capability Contract
//!
//! Every policy in this crate (ARC and its siblings) implements the same
//! small contract so callers, tests and benchmarks can swap one for another.
//!
//! ```text
//!   ┌─────────────────────────────────────────────┐
//!   │               CachePolicy<K, V>             │
//!   │                                             │
//!   │  put(&self, K, V)                           │
//!   │  get(&self, &K) → Option<V>                 │
//!   │  get_into(&self, &K, &mut V) → bool         │
//!   │  get_or_default(&self, &K) → V              │
//!   │  len(&self) → usize                         │
//!   │  capacity(&self) → usize                    │
//!   └─────────────────────────────────────────────┘
//!
//!   ConcurrentCache: Send + Sync marker
//!   CacheFactory:    create(capacity) → Self
//! ```
//!
//! All methods take `&self`: each implementation synchronizes internally, so
//! a cache can be shared across threads behind an `Arc` without an outer
//! lock. Values are returned by clone because the entry may be evicted the
//! moment the internal lock is released.
//!
//! Capacity-zero caches are a degenerate no-op configuration: `put` stores
//! nothing and every `get` misses. No method reports an error.
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::policy::arc::ArcCache;
//! use adaptive_cache::policy::lru::LruCache;
//! use adaptive_cache::traits::CachePolicy;
//!
//! fn warm<C: CachePolicy<u64, String>>(cache: &C, data: &[(u64, String)]) {
//!     for (key, value) in data {
//!         cache.put(*key, value.clone());
//!     }
//! }
//!
//! let data = vec![(1, "one".to_string()), (2, "two".to_string())];
//! let arc = ArcCache::new(8);
//! let lru = LruCache::new(8);
//! warm(&arc, &data);
//! warm(&lru, &data);
//! assert_eq!(arc.get(&1).as_deref(), Some("one"));
//! assert_eq!(CachePolicy::get(&lru, &2).as_deref(), Some("two"));
//! ```

/// Insert-or-update and lookup, shared by every cache policy.
pub trait CachePolicy<K, V> {
    /// Inserts `key` or replaces its value. Never fails observably.
    fn put(&self, key: K, value: V);

    /// Returns a copy of the value for `key`, recording the access.
    fn get(&self, key: &K) -> Option<V>;

    /// Writes the value for `key` into `out` and returns `true` on a hit.
    ///
    /// On a miss `out` is left untouched.
    fn get_into(&self, key: &K, out: &mut V) -> bool {
        match self.get(key) {
            Some(value) => {
                *out = value;
                true
            },
            None => false,
        }
    }

    /// Returns the value for `key`, or `V::default()` on a miss.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of live entries.
    fn capacity(&self) -> usize;
}

/// Marker trait for caches that are safe to share across threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use adaptive_cache::policy::arc::ArcCache;
/// use adaptive_cache::traits::{CachePolicy, ConcurrentCache};
///
/// fn share<C>(cache: Arc<C>)
/// where
///     C: CachePolicy<u32, u32> + ConcurrentCache + 'static,
/// {
///     let handles: Vec<_> = (0..4)
///         .map(|t| {
///             let cache = Arc::clone(&cache);
///             thread::spawn(move || cache.put(t, t))
///         })
///         .collect();
///     for handle in handles {
///         handle.join().unwrap();
///     }
/// }
///
/// share(Arc::new(ArcCache::new(16)));
/// ```
pub trait ConcurrentCache: Send + Sync {}

/// Builds a cache instance from a capacity alone.
///
/// Used by [`ShardedCache`](crate::policy::sharded::ShardedCache) to create
/// one instance per shard.
pub trait CacheFactory {
    fn create(capacity: usize) -> Self;
}
