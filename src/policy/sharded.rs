//! Hash-partitioned caches.
//!
//! [`ShardedCache`] splits the key space over `N` independent cache instances
//! and routes every call by `hash(key) % N`. Each shard has its own lock, so
//! threads working on different shards never contend. Each shard holds
//! `ceil(capacity / N)` entries; the policy applies per shard, not globally.
//!
//! ```text
//!                 ┌──► shard 0: C::create(ceil(cap / N))
//!   key ──► hash ─┼──► shard 1: C::create(ceil(cap / N))
//!                 └──► shard N-1
//! ```
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::policy::sharded::HashLruCache;
//!
//! let cache: HashLruCache<u64, &str> = HashLruCache::new(100, 4);
//! cache.put(1, "one");
//! assert_eq!(cache.get(&1), Some("one"));
//! assert_eq!(cache.shard_count(), 4);
//! assert_eq!(cache.capacity(), 100);
//! ```
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::ds::shard::ShardSelector;
use crate::error::ConfigError;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::{CacheFactory, CachePolicy, ConcurrentCache};

/// Seed mixed into the shard hash.
const SHARD_SEED: u64 = 0x5eed_cafe;

/// Cache split into independently locked shards.
pub struct ShardedCache<K, V, C> {
    shards: Vec<C>,
    selector: ShardSelector,
    capacity: usize,
    _marker: PhantomData<fn(K, V)>,
}

/// Sharded [`LruCache`].
pub type HashLruCache<K, V> = ShardedCache<K, V, LruCache<K, V>>;
/// Sharded [`LfuCache`].
pub type HashLfuCache<K, V> = ShardedCache<K, V, LfuCache<K, V>>;
/// Sharded [`ArcCache`].
pub type HashArcCache<K, V> = ShardedCache<K, V, ArcCache<K, V>>;

impl<K, V, C> ShardedCache<K, V, C>
where
    K: Hash,
    C: CachePolicy<K, V>,
{
    /// Creates `shards` shards (clamped to at least 1) from `build`, which
    /// receives the per-shard capacity.
    pub fn with_builder<F>(capacity: usize, shards: usize, mut build: F) -> Self
    where
        F: FnMut(usize) -> C,
    {
        let selector = ShardSelector::new(shards, SHARD_SEED);
        let per_shard = selector.capacity_per_shard(capacity);
        let shards = (0..selector.shard_count()).map(|_| build(per_shard)).collect();
        Self {
            shards,
            selector,
            capacity,
            _marker: PhantomData,
        }
    }

    /// Creates a sharded cache of shards built with [`CacheFactory::create`].
    /// A shard count of 0 is clamped to 1.
    pub fn new(capacity: usize, shards: usize) -> Self
    where
        C: CacheFactory,
    {
        Self::with_builder(capacity, shards, C::create)
    }

    /// Like [`new`](Self::new) but rejects a shard count of 0.
    pub fn try_new(capacity: usize, shards: usize) -> Result<Self, ConfigError>
    where
        C: CacheFactory,
    {
        if shards == 0 {
            return Err(ConfigError::must_be_positive("shards"));
        }
        Ok(Self::new(capacity, shards))
    }

    /// The shard responsible for `key`.
    pub fn shard(&self, key: &K) -> &C {
        &self.shards[self.selector.shard_for_key(key)]
    }

    pub fn shards(&self) -> &[C] {
        &self.shards
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn put(&self, key: K, value: V) {
        self.shard(&key).put(key, value);
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.shard(key).get(key)
    }

    /// Live entries summed over all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_empty())
    }

    /// The capacity requested at construction. The shards together may hold
    /// up to `shard_count() - 1` more because each rounds up.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V, C> CachePolicy<K, V> for ShardedCache<K, V, C>
where
    K: Hash,
    C: CachePolicy<K, V>,
{
    fn put(&self, key: K, value: V) {
        ShardedCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        ShardedCache::get(self, key)
    }

    fn len(&self) -> usize {
        ShardedCache::len(self)
    }

    fn capacity(&self) -> usize {
        ShardedCache::capacity(self)
    }
}

impl<K, V, C: ConcurrentCache> ConcurrentCache for ShardedCache<K, V, C> {}

impl<K, V, C: fmt::Debug> fmt::Debug for ShardedCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedCache")
            .field("capacity", &self.capacity)
            .field("shards", &self.shards)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sharded_routes_each_key_to_one_shard() {
        let cache: HashLruCache<u32, u32> = HashLruCache::new(64, 4);
        for key in 0..32 {
            cache.put(key, key * 10);
        }
        for key in 0..32 {
            assert_eq!(cache.get(&key), Some(key * 10));
            let holders = cache
                .shards()
                .iter()
                .filter(|shard| shard.contains(&key))
                .count();
            assert_eq!(holders, 1);
        }
        assert_eq!(cache.len(), 32);
    }

    #[test]
    fn sharded_rounds_shard_capacity_up() {
        let cache: HashLfuCache<u32, u32> = HashLfuCache::new(10, 3);
        assert!(cache.shards().iter().all(|shard| shard.capacity() == 4));
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn sharded_arc_splits_each_shard() {
        let cache: HashArcCache<u32, u32> = HashArcCache::new(20, 2);
        for shard in cache.shards() {
            assert_eq!(shard.capacity(), 10);
            assert_eq!(shard.recency_capacity(), 5);
            assert_eq!(shard.frequency_capacity(), 5);
        }
    }

    #[test]
    fn sharded_try_new_rejects_zero_shards() {
        let err = HashLruCache::<u32, u32>::try_new(10, 0).unwrap_err();
        assert_eq!(err.to_string(), "shards must be > 0");
        assert_eq!(HashLruCache::<u32, u32>::new(10, 0).shard_count(), 1);
    }

    #[test]
    fn sharded_with_builder_passes_per_shard_capacity() {
        let cache: HashLruCache<u8, u8> =
            ShardedCache::with_builder(9, 3, |cap| LruCache::new(cap + 1));
        assert!(cache.shards().iter().all(|shard| shard.capacity() == 4));
        assert!(cache.is_empty());
    }
}
