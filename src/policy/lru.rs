//! Least Recently Used cache.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>
//!            │
//!            ▼
//!   list:  [ LRU ] ◄──► [  ] ◄──► [  ] ◄──► [ MRU ]
//!          front                             back
//!          (evicted next)              (last touched)
//! ```
//!
//! `get` and updating `put` move the entry to the back; a new key evicts the
//! front when the cache is full. Everything sits behind one
//! `parking_lot::Mutex`, so the cache is shared by reference across threads.
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::policy::lru::LruCache;
//!
//! let cache = LruCache::new(2);
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.get(&1);
//! cache.put(3, "three");
//!
//! assert!(cache.contains(&1));
//! assert!(!cache.contains(&2));
//! assert_eq!(cache.keys(), vec![1, 3]);
//! ```
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::entry::Entry;
use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::traits::{CacheFactory, CachePolicy, ConcurrentCache};

/// Unsynchronized LRU state, shared with the LRU-K history.
#[derive(Debug)]
pub(crate) struct LruCore<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::default(),
            capacity,
        }
    }

    /// Inserts or updates `key`, returning the evicted entry if any.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<Entry<K, V>> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
            }
            self.list.move_to_back(id);
            return None;
        }

        let evicted = if self.list.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };
        let id = self.list.push_back(Entry::new(key.clone(), value));
        self.index.insert(key, id);
        evicted
    }

    /// Marks `key` as most recently used and returns its entry.
    pub(crate) fn touch(&mut self, key: &K) -> Option<&mut Entry<K, V>> {
        let id = *self.index.get(key)?;
        self.list.move_to_back(id);
        let entry = self.list.get_mut(id)?;
        entry.bump();
        Some(entry)
    }

    pub(crate) fn peek(&self, key: &K) -> Option<&Entry<K, V>> {
        let id = *self.index.get(key)?;
        self.list.get(id)
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<Entry<K, V>> {
        let id = self.index.remove(key)?;
        self.list.remove(id)
    }

    pub(crate) fn pop_lru(&mut self) -> Option<Entry<K, V>> {
        let entry = self.list.pop_front()?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|entry| &entry.key)
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        self.list.check_links()?;
        if self.index.len() != self.list.len() {
            return Err(format!(
                "index holds {} keys but list holds {} entries",
                self.index.len(),
                self.list.len()
            ));
        }
        if self.list.len() > self.capacity {
            return Err(format!(
                "{} entries over capacity {}",
                self.list.len(),
                self.capacity
            ));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err("index points at a slot holding another key".into()),
            }
        }
        Ok(())
    }
}

/// Thread-safe LRU cache.
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries. Capacity 0 stores
    /// nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// Inserts or updates `key`; either way it becomes most recently used.
    pub fn put(&self, key: K, value: V) {
        if let Some(evicted) = self.inner.lock().put(key, value) {
            trace!(
                access_count = evicted.access_count,
                "lru evicted least recently used entry"
            );
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().touch(key).map(|entry| entry.value.clone())
    }

    /// Returns the value without changing the recency order.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).map(|entry| entry.value.clone())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key).map(|entry| entry.value)
    }

    /// Drops every entry.
    pub fn purge(&self) {
        self.inner.lock().clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError> {
        self.inner
            .lock()
            .check_invariants()
            .map_err(|msg| crate::error::InvariantError::new(msg).context("lru"))
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        LruCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LruCache::get(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        LruCache::capacity(self)
    }
}

impl<K, V> CacheFactory for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn create(capacity: usize) -> Self {
        Self::new(capacity)
    }
}

impl<K: Send, V: Send> ConcurrentCache for LruCache<K, V> {}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.list.len())
            .field("capacity", &core.capacity)
            .finish_non_exhaustive()
    }
}
