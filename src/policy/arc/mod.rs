//! Adaptive Replacement Cache (ARC).
//!
//! Two cooperating partitions share the configured capacity: a
//! [`RecencyPart`] (true LRU) and a [`FrequencyPart`] (lowest access count
//! first). Each remembers the entries it recently evicted in a ghost list. A
//! ghost hit means the partition that evicted the key was too small, so one
//! unit of capacity moves to it from the other partition.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                           ArcCache<K, V>                                 │
//! │   (no lock, no cached partition state)                                   │
//! │                                                                          │
//! │   ┌───────────────────────────────┐   ┌───────────────────────────────┐  │
//! │   │ RecencyPart   Mutex           │   │ FrequencyPart   Mutex         │  │
//! │   │  main:  LRU list  (cap r)     │   │  main:  freq buckets (cap f)  │  │
//! │   │  ghost: FIFO      (cap r0)    │   │  ghost: FIFO        (cap f0)  │  │
//! │   └───────────────────────────────┘   └───────────────────────────────┘  │
//! │                                                                          │
//! │   r + f == capacity at every quiescent point                             │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ghost-check / rebalance
//!
//! ```text
//!   recency ghost hit   → frequency.decrease_capacity()  ok? → recency.increase_capacity()
//!   frequency ghost hit → recency.decrease_capacity()    ok? → frequency.increase_capacity()
//! ```
//!
//! Capacity is never created: the receiving side grows only if the donor
//! shrank. The recency ghost list is consulted first; a recency ghost hit
//! also discards the key's frequency ghost, so one eviction history yields
//! at most one transfer.
//!
//! ## Operations
//!
//! - `put`: rebalance; a key that was a ghost is re-admitted into the recency
//!   partition only. Otherwise the key goes into the recency partition and,
//!   when newly inserted there, into the frequency partition as well.
//! - `get`: rebalance, then look up the recency partition. A hit whose access
//!   count reached the promotion threshold is copied into the frequency
//!   partition (the recency copy stays). A recency miss falls through to the
//!   frequency partition.
//!
//! ## Ghost reads
//!
//! A `get` on a recency ghost can either count as a miss ([`GhostRead::Miss`],
//! the default) or re-admit the ghost's last value and report it as a hit
//! ([`GhostRead::Resurrect`]). Both modes perform the capacity transfer.
//!
//! ## Thread Safety
//!
//! Each partition has its own lock and a single `put`/`get` may take them one
//! after the other. The pair is not atomic: another thread can observe a
//! consumed ghost before the matching capacity transfer, or a recency hit
//! before its promotion lands. Every partition-local invariant holds at all
//! times; capacity conservation holds whenever no call is in flight.
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::policy::arc::ArcCache;
//! use adaptive_cache::traits::CachePolicy;
//!
//! let cache = ArcCache::new(10);
//! cache.put("a", 1);
//! assert_eq!(cache.get(&"a"), Some(1));
//! assert_eq!(cache.get(&"b"), None);
//! assert_eq!(cache.recency_capacity() + cache.frequency_capacity(), 10);
//! ```
pub mod frequency;
pub mod recency;

use std::hash::Hash;

use rustc_hash::FxHashSet;
use tracing::debug;

pub use self::frequency::FrequencyPart;
pub use self::recency::{PutOutcome, RecencyPart};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::{
    metrics_impl::ArcMetrics,
    snapshot::ArcMetricsSnapshot,
    traits::{ArcMetricsRecorder, CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider},
};
use crate::traits::{CacheFactory, CachePolicy, ConcurrentCache};

/// Default total capacity of [`ArcConfig`].
pub const DEFAULT_CAPACITY: usize = 10;
/// Default access count at which a recency hit is promoted.
pub const DEFAULT_PROMOTION_THRESHOLD: u64 = 3;

/// How `get` treats a key found in the recency ghost list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GhostRead {
    /// Consume the ghost and transfer capacity, then look the key up
    /// normally. A key evicted from both partitions misses.
    #[default]
    Miss,
    /// Re-admit the ghost's last value into the recency partition before the
    /// lookup, so the read hits with that (possibly stale) value.
    Resurrect,
}

/// Construction parameters for [`ArcCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConfig {
    /// Total entries across both partitions.
    pub capacity: usize,
    /// Recency access count at which a hit is copied into the frequency
    /// partition. Must be at least 1.
    pub promotion_threshold: u64,
    /// What `get` does on a recency ghost; see [`GhostRead`].
    pub ghost_read: GhostRead,
}

impl ArcConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.promotion_threshold == 0 {
            return Err(ConfigError::must_be_positive("promotion_threshold"));
        }
        Ok(())
    }

    /// Recency gets the larger half so the split always sums to `capacity`.
    fn split(&self) -> (usize, usize) {
        let frequency = self.capacity / 2;
        (self.capacity - frequency, frequency)
    }
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            ghost_read: GhostRead::default(),
        }
    }
}

/// Which ghost list, if any, a key was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GhostHit {
    Recency,
    Frequency,
    None,
}

/// Adaptive Replacement Cache over a recency and a frequency partition.
pub struct ArcCache<K, V> {
    recency: RecencyPart<K, V>,
    frequency: FrequencyPart<K, V>,
    capacity: usize,
    promotion_threshold: u64,
    ghost_read: GhostRead,
    #[cfg(feature = "metrics")]
    metrics: ArcMetrics,
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding `capacity` entries with promotion threshold 3.
    pub fn new(capacity: usize) -> Self {
        Self::from_config(ArcConfig::new(capacity))
    }

    /// Creates a cache with an explicit promotion threshold (0 is clamped to 1).
    pub fn with_threshold(capacity: usize, promotion_threshold: u64) -> Self {
        Self::from_config(ArcConfig {
            capacity,
            promotion_threshold: promotion_threshold.max(1),
            ghost_read: GhostRead::default(),
        })
    }

    /// Like [`with_threshold`](Self::with_threshold) but rejects a zero threshold.
    pub fn try_with_threshold(
        capacity: usize,
        promotion_threshold: u64,
    ) -> Result<Self, ConfigError> {
        Self::try_from_config(ArcConfig {
            capacity,
            promotion_threshold,
            ghost_read: GhostRead::default(),
        })
    }

    pub fn try_from_config(config: ArcConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Builds the cache, clamping a zero promotion threshold to 1.
    pub fn from_config(config: ArcConfig) -> Self {
        let promotion_threshold = config.promotion_threshold.max(1);
        let (recency_capacity, frequency_capacity) = config.split();
        Self {
            recency: RecencyPart::new(recency_capacity, promotion_threshold),
            frequency: FrequencyPart::new(frequency_capacity, promotion_threshold),
            capacity: config.capacity,
            promotion_threshold,
            ghost_read: config.ghost_read,
            #[cfg(feature = "metrics")]
            metrics: ArcMetrics::default(),
        }
    }

    /// Inserts or updates `key`.
    pub fn put(&self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_put();

        if self.rebalance(&key, GhostRead::Resurrect) != GhostHit::None {
            // A frequency copy can outlive the recency eviction.
            self.frequency.refresh(&key, value.clone());
            self.recency.put(key, value);
            return;
        }

        match self.recency.put(key.clone(), value.clone()) {
            PutOutcome::Inserted => {
                self.frequency.put(key, value);
            },
            PutOutcome::Updated => {
                self.frequency.refresh(&key, value);
            },
            PutOutcome::Rejected => {},
        }
    }

    /// Looks up `key`; see the module docs for the ghost and promotion rules.
    pub fn get(&self, key: &K) -> Option<V> {
        self.rebalance(key, self.ghost_read);

        let found = match self.recency.get(key) {
            Some((value, promote)) => {
                if promote {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_promotion();
                    self.frequency.put(key.clone(), value.clone());
                }
                Some(value)
            },
            None => self.frequency.get(key),
        };

        #[cfg(feature = "metrics")]
        {
            if found.is_some() {
                self.metrics.record_get_hit();
            } else {
                self.metrics.record_get_miss();
            }
        }
        found
    }

    /// Returns the value for `key`, or `V::default()` on a miss.
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Ghost-check / rebalance protocol shared by `put` and `get`.
    ///
    /// `mode` decides whether a recency ghost is re-admitted while being
    /// consumed.
    fn rebalance(&self, key: &K, mode: GhostRead) -> GhostHit {
        let recency_hit = match mode {
            GhostRead::Resurrect => self.recency.check_ghost(key),
            GhostRead::Miss => self.recency.take_ghost(key),
        };
        if recency_hit {
            #[cfg(feature = "metrics")]
            self.metrics.record_recency_ghost_hit();
            // One ghost signal per key: drop the frequency-side history too.
            self.frequency.check_ghost(key);
            if self.frequency.decrease_capacity() {
                self.recency.increase_capacity();
                #[cfg(feature = "metrics")]
                self.metrics.record_recency_gain();
                debug!("recency ghost hit, moved one unit of capacity to recency");
            } else {
                #[cfg(feature = "metrics")]
                self.metrics.record_refused_transfer();
                debug!("recency ghost hit, frequency partition has no capacity to give");
            }
            return GhostHit::Recency;
        }

        if self.frequency.check_ghost(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_frequency_ghost_hit();
            if self.recency.decrease_capacity() {
                self.frequency.increase_capacity();
                #[cfg(feature = "metrics")]
                self.metrics.record_frequency_gain();
                debug!("frequency ghost hit, moved one unit of capacity to frequency");
            } else {
                #[cfg(feature = "metrics")]
                self.metrics.record_refused_transfer();
                debug!("frequency ghost hit, recency partition has no capacity to give");
            }
            return GhostHit::Frequency;
        }

        GhostHit::None
    }

    /// Total configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn promotion_threshold(&self) -> u64 {
        self.promotion_threshold
    }

    pub fn ghost_read(&self) -> GhostRead {
        self.ghost_read
    }

    pub fn recency_capacity(&self) -> usize {
        self.recency.capacity()
    }

    pub fn frequency_capacity(&self) -> usize {
        self.frequency.capacity()
    }

    pub fn recency_len(&self) -> usize {
        self.recency.len()
    }

    pub fn frequency_len(&self) -> usize {
        self.frequency.len()
    }

    pub fn recency_ghost_len(&self) -> usize {
        self.recency.ghost_len()
    }

    pub fn frequency_ghost_len(&self) -> usize {
        self.frequency.ghost_len()
    }

    /// Distinct resident keys. A key held by both partitions counts once.
    ///
    /// O(n): walks the frequency partition's keys.
    pub fn len(&self) -> usize {
        let recency: FxHashSet<K> = self.recency.keys().into_iter().collect();
        let frequency_only = self
            .frequency
            .keys()
            .into_iter()
            .filter(|key| !recency.contains(key))
            .count();
        recency.len() + frequency_only
    }

    pub fn is_empty(&self) -> bool {
        self.recency.is_empty() && self.frequency.is_empty()
    }

    /// `true` if either partition holds `key` (ghosts excluded).
    pub fn contains(&self, key: &K) -> bool {
        self.recency.contains(key) || self.frequency.contains(key)
    }

    pub fn recency(&self) -> &RecencyPart<K, V> {
        &self.recency
    }

    pub fn frequency(&self) -> &FrequencyPart<K, V> {
        &self.frequency
    }

    /// Empties both partitions and restores the initial capacity split.
    pub fn clear(&self) {
        self.recency.clear();
        self.frequency.clear();
    }

    /// Verifies partition-local invariants and capacity conservation.
    ///
    /// Only meaningful while no other thread is inside `put`/`get`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.recency.check_invariants()?;
        self.frequency.check_invariants()?;

        let recency = self.recency.capacity();
        let frequency = self.frequency.capacity();
        if recency + frequency != self.capacity {
            return Err(InvariantError::new(format!(
                "partition capacities {recency} + {frequency} do not sum to {}",
                self.capacity
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn metrics_snapshot(&self) -> ArcMetricsSnapshot {
        self.metrics
            .snapshot_with(self.recency.capacity(), self.frequency.capacity())
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<ArcMetricsSnapshot> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn snapshot(&self) -> ArcMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> Default for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Capacity 10, promotion threshold 3.
    fn default() -> Self {
        Self::from_config(ArcConfig::default())
    }
}

impl<K, V> std::fmt::Debug for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArcCache")
            .field("capacity", &self.capacity)
            .field("promotion_threshold", &self.promotion_threshold)
            .field("ghost_read", &self.ghost_read)
            .field("recency_capacity", &self.recency.capacity())
            .field("frequency_capacity", &self.frequency.capacity())
            .finish_non_exhaustive()
    }
}

impl<K, V> CachePolicy<K, V> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        ArcCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        ArcCache::get(self, key)
    }

    fn len(&self) -> usize {
        ArcCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> CacheFactory for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn create(capacity: usize) -> Self {
        Self::new(capacity)
    }
}

impl<K, V> ConcurrentCache for ArcCache<K, V>
where
    K: Send,
    V: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_new_splits_capacity() {
        let cache: ArcCache<u32, u32> = ArcCache::new(10);
        assert_eq!(cache.capacity(), 10);
        assert_eq!(cache.recency_capacity(), 5);
        assert_eq!(cache.frequency_capacity(), 5);
        assert_eq!(cache.promotion_threshold(), 3);

        let odd: ArcCache<u32, u32> = ArcCache::new(7);
        assert_eq!(odd.recency_capacity(), 4);
        assert_eq!(odd.frequency_capacity(), 3);
        assert_eq!(odd.recency().ghost_capacity(), 4);
        assert_eq!(odd.frequency().ghost_capacity(), 3);
    }

    #[test]
    fn arc_default_matches_config_default() {
        let cache: ArcCache<u32, u32> = ArcCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
        assert_eq!(cache.promotion_threshold(), DEFAULT_PROMOTION_THRESHOLD);
        assert_eq!(cache.ghost_read(), GhostRead::Miss);
    }

    #[test]
    fn arc_threshold_validation() {
        assert!(ArcCache::<u32, u32>::try_with_threshold(4, 0).is_err());
        assert!(ArcCache::<u32, u32>::try_with_threshold(4, 1).is_ok());
        assert_eq!(ArcCache::<u32, u32>::with_threshold(4, 0).promotion_threshold(), 1);
    }

    #[test]
    fn arc_put_fills_both_partitions() {
        let cache = ArcCache::new(4);
        cache.put("a", 1);
        assert!(cache.recency().contains(&"a"));
        assert!(cache.frequency().contains(&"a"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_update_refreshes_frequency_copy() {
        let cache = ArcCache::new(4);
        cache.put("a", 1);
        cache.put("a", 2);
        assert_eq!(cache.recency().peek(&"a"), Some(2));
        assert_eq!(cache.frequency().peek(&"a"), Some(2));
        assert_eq!(cache.frequency().frequency(&"a"), Some(1));
    }

    #[test]
    fn arc_get_falls_through_to_frequency() {
        let cache = ArcCache::new(4);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        assert!(!cache.recency().contains(&"a"));
        assert!(cache.frequency().contains(&"c"));

        cache.frequency().put("z", 26);
        assert_eq!(cache.get(&"z"), Some(26));
    }

    #[test]
    fn arc_recency_ghost_hit_on_put_moves_capacity() {
        let cache = ArcCache::new(4);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        assert!(cache.recency().ghost_contains(&"a"));

        cache.put("a", 10);
        assert_eq!(cache.recency_capacity(), 3);
        assert_eq!(cache.frequency_capacity(), 1);
        assert_eq!(cache.recency().peek(&"a"), Some(10));
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_ghost_read_miss_consumes_ghost() {
        let cache = ArcCache::with_threshold(2, 3);
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.recency().ghost_contains(&"a"));
        assert!(cache.frequency().ghost_contains(&"a"));

        assert_eq!(cache.get(&"a"), None);
        assert!(!cache.recency().ghost_contains(&"a"));
        assert_eq!(cache.recency_capacity(), 2);
        assert_eq!(cache.frequency_capacity(), 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_ghost_read_resurrect_returns_last_value() {
        let cache = ArcCache::from_config(ArcConfig {
            capacity: 2,
            promotion_threshold: 3,
            ghost_read: GhostRead::Resurrect,
        });
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.recency().ghost_contains(&"a"));

        assert_eq!(cache.get(&"a"), Some(1));
        assert!(cache.recency().contains(&"a"));
        assert_eq!(cache.recency_capacity(), 2);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_frequency_ghost_hit_moves_capacity_back() {
        let cache = ArcCache::new(4);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        // Drop "a" from the recency ghost list so only the frequency ghost remains.
        assert!(cache.recency().take_ghost(&"a"));
        assert!(cache.frequency().ghost_contains(&"a"));

        cache.put("a", 1);
        assert_eq!(cache.recency_capacity(), 1);
        assert_eq!(cache.frequency_capacity(), 3);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_refused_transfer_keeps_capacity() {
        let cache = ArcCache::new(1);
        assert_eq!(cache.recency_capacity(), 1);
        assert_eq!(cache.frequency_capacity(), 0);

        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.recency().ghost_contains(&"a"));
        cache.put("a", 3);
        assert_eq!(cache.recency_capacity(), 1);
        assert_eq!(cache.frequency_capacity(), 0);
        assert_eq!(cache.get(&"a"), Some(3));
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_promotion_copies_into_frequency() {
        let cache = ArcCache::new(4);
        cache.put("k", 1);
        cache.frequency().clear();
        for _ in 0..2 {
            cache.get(&"k");
        }
        assert!(cache.frequency().contains(&"k"));
        assert!(cache.recency().contains(&"k"));
    }

    #[test]
    fn arc_clear_restores_split() {
        let cache = ArcCache::new(4);
        for key in 0..6 {
            cache.put(key, key);
        }
        cache.put(0, 0);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.recency_capacity(), 2);
        assert_eq!(cache.frequency_capacity(), 2);
        assert_eq!(cache.recency_ghost_len(), 0);
        assert_eq!(cache.frequency_ghost_len(), 0);
    }

    #[test]
    fn arc_get_or_default_on_miss() {
        let cache: ArcCache<&str, i32> = ArcCache::new(4);
        cache.put("a", 5);
        assert_eq!(cache.get_or_default(&"a"), 5);
        assert_eq!(cache.get_or_default(&"b"), 0);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn arc_metrics_track_ghost_hits_and_transfers() {
        let cache = ArcCache::new(4);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.put("a", 4);
        cache.get(&"a");
        cache.get(&"missing");

        let snapshot = cache.metrics_snapshot();
        assert_eq!(snapshot.put_calls, 4);
        assert_eq!(snapshot.recency_ghost_hits, 1);
        assert_eq!(snapshot.recency_gains, 1);
        assert_eq!(snapshot.get_hits, 1);
        assert_eq!(snapshot.get_misses, 1);
        assert_eq!(snapshot.recency_capacity, 3);

        cache.reset_metrics();
        assert_eq!(cache.snapshot().put_calls, 0);
    }
}
