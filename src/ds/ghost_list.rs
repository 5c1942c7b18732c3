//! Bounded FIFO history of evicted entries.
//!
//! Each ARC partition keeps one of these next to its main structure. Evicted
//! entries keep their last value so a ghost hit can re-admit the key without
//! going back to the caller. Implemented as an `IntrusiveList` plus an index.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>        list: IntrusiveList<Entry<K, V>>
//!   ┌─────────┬─────────┐              front ─► [A] ◄──► [B] ◄──► [C] ◄── back
//!   │  key A  │  id_1   │                 oldest evicted     most recently evicted
//!   │  key B  │  id_2   │
//!   └─────────┴─────────┘
//! ```
//!
//! ## Behavior
//! - `record(entry)`: resets the access count to 1, appends at the back and
//!   drops the front entry if at capacity
//! - `take(k)`: removes and returns the entry
//! - `remove(k)`: deletes from list and index
//!
//! ## Performance
//! - `record` / `take` / `remove` / `contains`: O(1) average
//!
//! `debug_validate_invariants()` is available in debug/test builds.
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::entry::Entry;
use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;

#[derive(Debug)]
/// Bounded FIFO of evicted entries with their last known values.
pub struct GhostList<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K, V> GhostList<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a new ghost list holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of entries currently tracked.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if there are no entries tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records an evicted entry as the most recent ghost.
    ///
    /// Returns the entry that was dropped from the front to make room, if any.
    /// A zero-capacity list drops `entry` itself.
    pub fn record(&mut self, mut entry: Entry<K, V>) -> Option<Entry<K, V>> {
        if self.capacity == 0 {
            return Some(entry);
        }

        entry.reset_access_count();
        let replaced = self.take(&entry.key);

        let dropped = if replaced.is_none()
            && self.list.len() >= self.capacity
            && let Some(old) = self.list.pop_front()
        {
            self.index.remove(&old.key);
            Some(old)
        } else {
            replaced
        };

        let key = entry.key.clone();
        let id = self.list.push_back(entry);
        self.index.insert(key, id);
        dropped
    }

    /// Removes `key` and returns its entry.
    pub fn take(&mut self, key: &K) -> Option<Entry<K, V>> {
        let id = self.index.remove(key)?;
        self.list.remove(id)
    }

    /// Removes `key` from the ghost list; returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Iterates keys from oldest to most recently evicted.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|entry| &entry.key)
    }

    /// Clears all tracked entries.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Reports the first disagreement between list, index and capacity.
    pub fn check_links(&self) -> Result<(), String> {
        self.list.check_links()?;
        if self.list.len() != self.index.len() {
            return Err(format!(
                "ghost list holds {} entries but index holds {}",
                self.list.len(),
                self.index.len()
            ));
        }
        if self.list.len() > self.capacity {
            return Err(format!(
                "ghost list holds {} entries over capacity {}",
                self.list.len(),
                self.capacity
            ));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err("ghost index points at a foreign node".into()),
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(msg) = self.check_links() {
            panic!("{msg}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evicted(key: &'static str, value: i32) -> Entry<&'static str, i32> {
        let mut entry = Entry::new(key, value);
        entry.access_count = 5;
        entry
    }

    #[test]
    fn ghost_list_records_and_evictions() {
        let mut ghost = GhostList::new(2);
        assert!(ghost.record(evicted("a", 1)).is_none());
        assert!(ghost.record(evicted("b", 2)).is_none());
        assert!(ghost.contains(&"a"));
        assert!(ghost.contains(&"b"));

        let dropped = ghost.record(evicted("c", 3));
        assert_eq!(dropped.map(|e| e.key), Some("a"));

        assert!(!ghost.contains(&"a"));
        assert!(ghost.contains(&"b"));
        assert!(ghost.contains(&"c"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_is_fifo_not_lru() {
        let mut ghost = GhostList::new(2);
        ghost.record(evicted("a", 1));
        ghost.record(evicted("b", 2));
        assert!(ghost.contains(&"a"));

        ghost.record(evicted("c", 3));
        let keys: Vec<_> = ghost.keys().copied().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn ghost_list_take_returns_value_with_reset_count() {
        let mut ghost = GhostList::new(4);
        ghost.record(evicted("a", 10));

        let entry = ghost.take(&"a").expect("ghost entry");
        assert_eq!(entry.value, 10);
        assert_eq!(entry.access_count, 1);
        assert!(ghost.is_empty());
        assert!(ghost.take(&"a").is_none());
    }

    #[test]
    fn ghost_list_rerecord_replaces_previous_entry() {
        let mut ghost = GhostList::new(2);
        ghost.record(evicted("a", 1));
        ghost.record(evicted("b", 2));

        let dropped = ghost.record(evicted("a", 9));
        assert_eq!(dropped.map(|e| e.value), Some(1));
        assert_eq!(ghost.len(), 2);
        let keys: Vec<_> = ghost.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(ghost.take(&"a").map(|e| e.value), Some(9));
    }

    #[test]
    fn ghost_list_zero_capacity_is_noop() {
        let mut ghost = GhostList::new(0);
        let dropped = ghost.record(evicted("a", 1));
        assert_eq!(dropped.map(|e| e.key), Some("a"));
        assert!(ghost.is_empty());
        assert_eq!(ghost.len(), 0);
        assert!(!ghost.contains(&"a"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_remove_and_clear() {
        let mut ghost = GhostList::new(3);
        ghost.record(evicted("a", 1));
        ghost.record(evicted("b", 2));
        assert!(ghost.remove(&"a"));
        assert!(!ghost.remove(&"a"));
        ghost.clear();
        assert!(ghost.is_empty());
        assert!(ghost.check_links().is_ok());
    }
}
