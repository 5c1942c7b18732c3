//! Unified cache builder for every eviction policy.
//!
//! One set of knobs configures any policy; knobs a policy does not use are
//! ignored. The result is a [`Cache`], an enum-dispatched wrapper that
//! implements [`CachePolicy`] so callers can pick the policy at runtime.
//!
//! ## Example
//!
//! ```rust
//! use adaptive_cache::builder::{CacheBuilder, PolicyKind};
//! use adaptive_cache::policy::arc::GhostRead;
//!
//! let cache = CacheBuilder::new(100)
//!     .promotion_threshold(2)
//!     .ghost_read(GhostRead::Resurrect)
//!     .build::<u64, String>(PolicyKind::Arc);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::arc::{ArcCache, ArcConfig, DEFAULT_PROMOTION_THRESHOLD, GhostRead};
use crate::policy::clock::ClockCache;
use crate::policy::lfu::{DEFAULT_MAX_AVERAGE_FREQUENCY, LfuCache};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::{DEFAULT_K, LruKCache};
use crate::policy::sharded::{HashArcCache, HashLfuCache, HashLruCache, ShardedCache};
use crate::traits::{CachePolicy, ConcurrentCache};

/// Shard count of the `Hash*` policies when none is configured.
pub const DEFAULT_SHARDS: usize = 4;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Adaptive Replacement Cache (recency and frequency partitions).
    Arc,
    /// Least Recently Used.
    Lru,
    /// LRU that admits a key once `k` earlier accesses are on record.
    LruK,
    /// Least Frequently Used with aging.
    Lfu,
    /// Second-chance clock.
    Clock,
    /// LRU split over `shards` shards.
    HashLru,
    /// LFU split over `shards` shards.
    HashLfu,
    /// ARC split over `shards` shards.
    HashArc,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 8] = [
        PolicyKind::Arc,
        PolicyKind::Lru,
        PolicyKind::LruK,
        PolicyKind::Lfu,
        PolicyKind::Clock,
        PolicyKind::HashLru,
        PolicyKind::HashLfu,
        PolicyKind::HashArc,
    ];
}

/// Cache built by [`CacheBuilder`], whatever its policy.
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Arc(ArcCache<K, V>),
    Lru(LruCache<K, V>),
    LruK(LruKCache<K, V>),
    Lfu(LfuCache<K, V>),
    Clock(ClockCache<K, V>),
    HashLru(HashLruCache<K, V>),
    HashLfu(HashLfuCache<K, V>),
    HashArc(HashArcCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn as_policy(&self) -> &dyn CachePolicy<K, V> {
        match &self.inner {
            CacheInner::Arc(cache) => cache,
            CacheInner::Lru(cache) => cache,
            CacheInner::LruK(cache) => cache,
            CacheInner::Lfu(cache) => cache,
            CacheInner::Clock(cache) => cache,
            CacheInner::HashLru(cache) => cache,
            CacheInner::HashLfu(cache) => cache,
            CacheInner::HashArc(cache) => cache,
        }
    }

    /// The policy this cache was built with.
    pub fn policy(&self) -> PolicyKind {
        match &self.inner {
            CacheInner::Arc(_) => PolicyKind::Arc,
            CacheInner::Lru(_) => PolicyKind::Lru,
            CacheInner::LruK(_) => PolicyKind::LruK,
            CacheInner::Lfu(_) => PolicyKind::Lfu,
            CacheInner::Clock(_) => PolicyKind::Clock,
            CacheInner::HashLru(_) => PolicyKind::HashLru,
            CacheInner::HashLfu(_) => PolicyKind::HashLfu,
            CacheInner::HashArc(_) => PolicyKind::HashArc,
        }
    }

    /// The underlying [`ArcCache`] when built with [`PolicyKind::Arc`].
    pub fn as_arc(&self) -> Option<&ArcCache<K, V>> {
        match &self.inner {
            CacheInner::Arc(cache) => Some(cache),
            _ => None,
        }
    }

    pub fn put(&self, key: K, value: V) {
        self.as_policy().put(key, value);
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.as_policy().get(key)
    }

    pub fn len(&self) -> usize {
        self.as_policy().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.as_policy().capacity()
    }
}

impl<K, V> CachePolicy<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        Cache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        Cache::get(self, key)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }
}

impl<K: Send, V: Send> ConcurrentCache for Cache<K, V> {}

impl<K, V> std::fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Builder for [`Cache`] instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    promotion_threshold: u64,
    ghost_read: GhostRead,
    shards: usize,
    k: u64,
    history_capacity: Option<usize>,
    max_average_frequency: u64,
}

impl CacheBuilder {
    /// Starts a builder for a cache of `capacity` entries with default knobs.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            ghost_read: GhostRead::default(),
            shards: DEFAULT_SHARDS,
            k: DEFAULT_K,
            history_capacity: None,
            max_average_frequency: DEFAULT_MAX_AVERAGE_FREQUENCY,
        }
    }

    /// ARC: accesses before a recency entry is copied to the frequency side.
    pub fn promotion_threshold(mut self, threshold: u64) -> Self {
        self.promotion_threshold = threshold;
        self
    }

    /// ARC: whether `get` on a recency ghost re-admits it.
    pub fn ghost_read(mut self, ghost_read: GhostRead) -> Self {
        self.ghost_read = ghost_read;
        self
    }

    /// `Hash*` policies: number of shards.
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// LRU-K: recorded accesses needed before a later `put` admits a key.
    pub fn k(mut self, k: u64) -> Self {
        self.k = k;
        self
    }

    /// LRU-K: keys tracked by the admission history. Defaults to the capacity.
    pub fn history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = Some(history_capacity);
        self
    }

    /// LFU: average access count above which counts are aged.
    pub fn max_average_frequency(mut self, max_average: u64) -> Self {
        self.max_average_frequency = max_average;
        self
    }

    /// Checks every knob, whichever policy ends up using it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.promotion_threshold == 0 {
            return Err(ConfigError::must_be_positive("promotion_threshold"));
        }
        if self.shards == 0 {
            return Err(ConfigError::must_be_positive("shards"));
        }
        if self.k == 0 {
            return Err(ConfigError::must_be_positive("k"));
        }
        if self.max_average_frequency == 0 {
            return Err(ConfigError::must_be_positive("max_average_frequency"));
        }
        Ok(())
    }

    /// Validates the knobs, then builds.
    pub fn try_build<K, V>(self, policy: PolicyKind) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        self.validate()?;
        Ok(self.build(policy))
    }

    /// Builds a cache with `policy`. Out-of-range knobs are clamped to 1.
    ///
    /// # Example
    ///
    /// ```rust
    /// use adaptive_cache::builder::{CacheBuilder, PolicyKind};
    ///
    /// let lru = CacheBuilder::new(100).build::<u64, String>(PolicyKind::Lru);
    /// let lru_k = CacheBuilder::new(100).k(3).build::<u64, String>(PolicyKind::LruK);
    /// let sharded = CacheBuilder::new(100).shards(8).build::<u64, String>(PolicyKind::HashArc);
    /// assert_eq!(sharded.capacity(), 100);
    /// ```
    pub fn build<K, V>(self, policy: PolicyKind) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let capacity = self.capacity;
        let shards = self.shards.max(1);
        let arc_config = ArcConfig {
            capacity,
            promotion_threshold: self.promotion_threshold.max(1),
            ghost_read: self.ghost_read,
        };

        let inner = match policy {
            PolicyKind::Arc => CacheInner::Arc(ArcCache::from_config(arc_config)),
            PolicyKind::Lru => CacheInner::Lru(LruCache::new(capacity)),
            PolicyKind::LruK => CacheInner::LruK(LruKCache::new(
                capacity,
                self.history_capacity.unwrap_or(capacity),
                self.k,
            )),
            PolicyKind::Lfu => CacheInner::Lfu(LfuCache::with_max_average(
                capacity,
                self.max_average_frequency,
            )),
            PolicyKind::Clock => CacheInner::Clock(ClockCache::new(capacity)),
            PolicyKind::HashLru => CacheInner::HashLru(HashLruCache::new(capacity, shards)),
            PolicyKind::HashLfu => {
                let max_average = self.max_average_frequency;
                CacheInner::HashLfu(ShardedCache::with_builder(capacity, shards, |cap| {
                    LfuCache::with_max_average(cap, max_average)
                }))
            },
            PolicyKind::HashArc => {
                CacheInner::HashArc(ShardedCache::with_builder(capacity, shards, |cap| {
                    ArcCache::from_config(ArcConfig { capacity: cap, ..arc_config })
                }))
            },
        };

        Cache { inner }
    }
}
