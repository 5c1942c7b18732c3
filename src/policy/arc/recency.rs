//! Recency partition of the ARC cache.
//!
//! A true LRU main list plus a FIFO ghost list of evicted entries. Both live
//! behind one [`parking_lot::Mutex`] so every operation sees the main list,
//! the ghost list and the capacity counter change together.
//!
//! ```text
//!   main (capacity = c)                          ghost (capacity fixed at c0)
//!   front ─► [LRU] ◄──► ... ◄──► [MRU] ◄── back   front ─► [oldest] ... [newest]
//!              │                                                          ▲
//!              └────────── evict when full (count reset to 1) ───────────┘
//! ```
//!
//! `get` bumps the entry's access count and reports whether it reached the
//! promotion threshold; `put` on an existing key only refreshes its value and
//! position.
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::entry::Entry;
use crate::ds::ghost_list::GhostList;
use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;

/// Result of [`RecencyPart::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The key was new to the main list.
    Inserted,
    /// The key was already resident; its value was replaced.
    Updated,
    /// The partition has zero capacity.
    Rejected,
}

impl PutOutcome {
    pub fn is_stored(self) -> bool {
        !matches!(self, PutOutcome::Rejected)
    }
}

#[derive(Debug)]
struct RecencyCore<K, V> {
    main: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    ghost: GhostList<K, V>,
    capacity: usize,
    initial_capacity: usize,
    promotion_threshold: u64,
}

impl<K, V> RecencyCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new(capacity: usize, promotion_threshold: u64) -> Self {
        Self {
            main: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ghost: GhostList::new(capacity),
            capacity,
            initial_capacity: capacity,
            promotion_threshold,
        }
    }

    fn put(&mut self, key: K, value: V) -> PutOutcome {
        if self.capacity == 0 {
            return PutOutcome::Rejected;
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.main.get_mut(id) {
                entry.value = value;
            }
            self.main.move_to_back(id);
            return PutOutcome::Updated;
        }

        self.ghost.remove(&key);
        self.admit(Entry::new(key, value));
        PutOutcome::Inserted
    }

    fn get(&mut self, key: &K) -> Option<(V, bool)> {
        let id = *self.index.get(key)?;
        let entry = self.main.get_mut(id)?;
        let count = entry.bump();
        let value = entry.value.clone();
        self.main.move_to_back(id);
        Some((value, count >= self.promotion_threshold))
    }

    fn check_ghost(&mut self, key: &K) -> bool {
        let Some(entry) = self.ghost.take(key) else {
            return false;
        };
        if self.capacity > 0 {
            self.admit(entry);
        }
        true
    }

    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.main.len() >= self.capacity {
            self.evict_lru();
        }
        self.capacity -= 1;
        true
    }

    /// Appends `entry` at the MRU end, evicting the LRU entry first if full.
    fn admit(&mut self, entry: Entry<K, V>) {
        if self.main.len() >= self.capacity {
            self.evict_lru();
        }
        let key = entry.key.clone();
        let id = self.main.push_back(entry);
        self.index.insert(key, id);
    }

    fn evict_lru(&mut self) {
        let Some(entry) = self.main.pop_front() else {
            return;
        };
        self.index.remove(&entry.key);
        if self.ghost.record(entry).is_some() {
            trace!(
                ghost_capacity = self.ghost.capacity(),
                "recency ghost list full, dropped oldest ghost"
            );
        }
        trace!(
            len = self.main.len(),
            ghost_len = self.ghost.len(),
            "recency partition evicted LRU entry to ghost list"
        );
    }

    fn clear(&mut self) {
        self.main.clear();
        self.index.clear();
        self.ghost.clear();
        self.capacity = self.initial_capacity;
    }

    fn check_invariants(&self) -> Result<(), String> {
        self.main.check_links()?;
        self.ghost.check_links()?;
        if self.index.len() != self.main.len() {
            return Err(format!(
                "index holds {} keys but main list holds {}",
                self.index.len(),
                self.main.len()
            ));
        }
        if self.main.len() > self.capacity {
            return Err(format!(
                "main list holds {} entries over capacity {}",
                self.main.len(),
                self.capacity
            ));
        }
        for (key, &id) in &self.index {
            let entry = self
                .main
                .get(id)
                .ok_or("index points at a missing main-list node")?;
            if entry.key != *key {
                return Err("index points at a foreign main-list node".into());
            }
            if entry.access_count == 0 {
                return Err("main-list entry has access count 0".into());
            }
            if self.ghost.contains(key) {
                return Err("key is resident in both main and ghost lists".into());
            }
        }
        Ok(())
    }
}

/// Recency-ordered half of [`ArcCache`](super::ArcCache).
///
/// Thread-safe: every method takes `&self` and holds the partition lock for
/// its whole duration.
#[derive(Debug)]
pub struct RecencyPart<K, V> {
    inner: Mutex<RecencyCore<K, V>>,
}

impl<K, V> RecencyPart<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a partition whose main and ghost lists both hold `capacity`
    /// entries. The ghost capacity never changes afterwards.
    pub fn new(capacity: usize, promotion_threshold: u64) -> Self {
        Self {
            inner: Mutex::new(RecencyCore::new(capacity, promotion_threshold.max(1))),
        }
    }

    /// Inserts or updates `key`.
    ///
    /// An update replaces the value and moves the entry to the MRU end
    /// without touching its access count. A new key is purged from the ghost
    /// list and admitted at the MRU end, evicting the LRU entry to the ghost
    /// list if the main list is full.
    pub fn put(&self, key: K, value: V) -> PutOutcome {
        self.inner.lock().put(key, value)
    }

    /// Looks up `key`, moving it to the MRU end and bumping its access count.
    ///
    /// The flag is `true` once the access count has reached the promotion
    /// threshold.
    pub fn get(&self, key: &K) -> Option<(V, bool)> {
        self.inner.lock().get(key)
    }

    /// Returns the value of `key` without changing order or access count.
    pub fn peek(&self, key: &K) -> Option<V> {
        let core = self.inner.lock();
        let id = *core.index.get(key)?;
        core.main.get(id).map(|entry| entry.value.clone())
    }

    /// Consumes a ghost hit and re-admits the ghost's last value.
    ///
    /// Returns whether `key` was a ghost. Re-admission happens before the
    /// caller sees the result, so this is not a read-only probe. With zero
    /// capacity the ghost is still consumed and reported, but not re-admitted.
    pub fn check_ghost(&self, key: &K) -> bool {
        self.inner.lock().check_ghost(key)
    }

    /// Consumes a ghost hit without re-admitting it.
    pub fn take_ghost(&self, key: &K) -> bool {
        self.inner.lock().ghost.remove(key)
    }

    pub fn increase_capacity(&self) {
        self.inner.lock().capacity += 1;
    }

    /// Gives up one unit of capacity, evicting the LRU entry first if the
    /// main list is full. Returns `false` if the capacity is already 0.
    pub fn decrease_capacity(&self) -> bool {
        self.inner.lock().decrease_capacity()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().index.contains_key(key)
    }

    pub fn ghost_contains(&self, key: &K) -> bool {
        self.inner.lock().ghost.contains(key)
    }

    /// Resident keys from least to most recently used.
    pub fn keys(&self) -> Vec<K> {
        let core = self.inner.lock();
        core.main.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Ghost keys from oldest to most recently evicted.
    pub fn ghost_keys(&self) -> Vec<K> {
        self.inner.lock().ghost.keys().cloned().collect()
    }

    /// Access count of a resident key.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        let core = self.inner.lock();
        let id = *core.index.get(key)?;
        core.main.get(id).map(|entry| entry.access_count)
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
            .map_err(|msg| InvariantError::new(msg).context("recency partition"))
    }
}
