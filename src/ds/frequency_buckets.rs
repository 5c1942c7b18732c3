//! O(1) frequency buckets holding cache entries.
//!
//! Entries are grouped by access count. Each distinct count owns a bucket
//! (a FIFO list of entries, oldest at the head) and buckets are linked to
//! their nearest lower and higher neighbours, so moving an entry up one
//! frequency and finding the eviction victim are both constant time.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>
//!
//!   buckets: FxHashMap<u64, Bucket>           (linked by frequency)
//!
//!   min_freq = 1
//!      │
//!      ▼
//!   freq=1: head ─► [A] ◄──► [B] ◄── tail      A inserted before B
//!      │ next
//!      ▼
//!   freq=3: head ─► [C] ◄── tail
//! ```
//!
//! ## Behavior
//! - `insert(entry)`: places the entry in the bucket of its access count
//! - `touch(k)`: moves the entry to the tail of the next bucket
//! - `pop_min()`: removes the head of the `min_freq` bucket (lowest count,
//!   oldest within the count)
//! - `min_freq` is corrected inside the same call that empties a bucket
//!
//! ## Performance
//! - `insert` (count 1) / `touch` / `remove` / `pop_min`: O(1) average
//! - `insert` at an arbitrary count: O(buckets)
//! - `rebuild_with`: O(n)
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::entry::Entry;
use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<K, V> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    entry: Entry<K, V>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    prev: Option<u64>,
    next: Option<u64>,
}

/// Frequency-ordered entry store with FIFO tie-breaking within a frequency.
///
/// An entry's `access_count` is its bucket key; it only changes through
/// [`touch`](Self::touch) and [`rebuild_with`](Self::rebuild_with).
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    nodes: SlotArena<Node<K, V>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the access count of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.get(key).map(|entry| entry.access_count)
    }

    /// Smallest frequency with a non-empty bucket, `None` when empty.
    pub fn min_freq(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    pub fn get(&self, key: &K) -> Option<&Entry<K, V>> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|node| &node.entry)
    }

    /// Mutable access to the value only; the access count stays bucket-owned.
    pub fn value_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = *self.index.get(key)?;
        self.nodes.get_mut(id).map(|node| &mut node.entry.value)
    }

    /// Returns the next eviction candidate without removing it.
    pub fn peek_min(&self) -> Option<&Entry<K, V>> {
        let id = self.buckets.get(&self.min_freq)?.head?;
        self.nodes.get(id).map(|node| &node.entry)
    }

    /// Inserts `entry` into the bucket of its access count (at least 1).
    ///
    /// Returns `false` and drops `entry` if the key is already present.
    pub fn insert(&mut self, mut entry: Entry<K, V>) -> bool {
        if self.index.contains_key(&entry.key) {
            return false;
        }

        let freq = entry.access_count.max(1);
        entry.access_count = freq;
        let key = entry.key.clone();
        let id = self.nodes.insert(Node {
            prev: None,
            next: None,
            entry,
        });
        self.index.insert(key, id);

        self.ensure_bucket(freq);
        self.list_push_back(freq, id);
        if self.min_freq == 0 || freq < self.min_freq {
            self.min_freq = freq;
        }
        true
    }

    /// Increments the access count of `key` and returns the new count.
    ///
    /// The entry moves to the tail of the next bucket. At `u64::MAX` the
    /// count saturates and the entry moves to the tail of its own bucket.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let current = self.nodes.get(id)?.entry.access_count;
        if current == u64::MAX {
            self.list_remove(current, id)?;
            self.list_push_back(current, id);
            return Some(current);
        }
        let next_freq = current + 1;

        let (prev_freq, next_existing) = {
            let bucket = self.buckets.get(&current)?;
            (bucket.prev, bucket.next)
        };

        self.list_remove(current, id)?;
        let bucket_empty = self.bucket_is_empty(current);
        if bucket_empty {
            self.remove_bucket(current, prev_freq, next_existing);
            if self.min_freq == current {
                self.min_freq = next_existing.unwrap_or(0);
            }
        }

        if !self.buckets.contains_key(&next_freq) {
            let prev = if bucket_empty {
                prev_freq
            } else {
                Some(current)
            };
            self.insert_bucket(next_freq, prev, next_existing);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.entry.access_count = next_freq;
        }
        self.list_push_back(next_freq, id);
        if self.min_freq == 0 || next_freq < self.min_freq {
            self.min_freq = next_freq;
        }

        Some(next_freq)
    }

    /// Removes `key` and returns its entry.
    pub fn remove(&mut self, key: &K) -> Option<Entry<K, V>> {
        let id = *self.index.get(key)?;
        let entry = self.unlink(id)?;
        self.index.remove(key);
        Some(entry)
    }

    /// Removes and returns the lowest-frequency entry, oldest first on ties.
    pub fn pop_min(&mut self) -> Option<Entry<K, V>> {
        if self.min_freq == 0 {
            return None;
        }
        let id = self.buckets.get(&self.min_freq)?.head?;
        let entry = self.unlink(id)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    /// Iterates entries by ascending frequency, oldest first within a frequency.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.iter_ids()
            .filter_map(|id| self.nodes.get(id).map(|node| &node.entry))
    }

    /// Rewrites every access count through `f` (clamped to at least 1).
    ///
    /// Relative order is kept: entries are re-inserted by ascending old
    /// frequency, oldest first.
    pub fn rebuild_with<F>(&mut self, mut f: F)
    where
        F: FnMut(u64) -> u64,
    {
        let order: Vec<SlotId> = self.iter_ids().collect();
        let mut entries = Vec::with_capacity(order.len());
        for id in order {
            if let Some(node) = self.nodes.remove(id) {
                entries.push(node.entry);
            }
        }
        self.clear();

        for mut entry in entries {
            entry.access_count = f(entry.access_count).max(1);
            self.insert(entry);
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    /// Reports the first structural inconsistency between index, buckets and entries.
    pub fn check_links(&self) -> Result<(), String> {
        if self.nodes.len() != self.index.len() {
            return Err(format!(
                "frequency store holds {} entries but index holds {}",
                self.nodes.len(),
                self.index.len()
            ));
        }

        if self.is_empty() {
            if !self.buckets.is_empty() || self.min_freq != 0 {
                return Err("empty frequency store still has buckets".into());
            }
            return Ok(());
        }

        if !self.buckets.contains_key(&self.min_freq) {
            return Err(format!("min frequency {} has no bucket", self.min_freq));
        }
        if let Some(&smallest) = self.buckets.keys().min()
            && smallest != self.min_freq
        {
            return Err(format!(
                "min frequency is {} but smallest bucket is {smallest}",
                self.min_freq
            ));
        }

        let mut linked = 0usize;
        for (&freq, bucket) in &self.buckets {
            if bucket.head.is_none() || bucket.tail.is_none() {
                return Err(format!("bucket {freq} is empty but still linked"));
            }
            match bucket.prev {
                Some(prev) if self.buckets.get(&prev).and_then(|b| b.next) != Some(freq) => {
                    return Err(format!("bucket {freq} has a broken prev link"));
                },
                None if self.min_freq != freq => {
                    return Err(format!("bucket {freq} has no prev but is not the minimum"));
                },
                _ => {},
            }
            if let Some(next) = bucket.next
                && self.buckets.get(&next).and_then(|b| b.prev) != Some(freq)
            {
                return Err(format!("bucket {freq} has a broken next link"));
            }

            let mut current = bucket.head;
            let mut last = None;
            while let Some(id) = current {
                let node = self
                    .nodes
                    .get(id)
                    .ok_or_else(|| format!("bucket {freq} links a missing entry"))?;
                if node.entry.access_count != freq {
                    return Err(format!(
                        "entry with count {} sits in bucket {freq}",
                        node.entry.access_count
                    ));
                }
                if node.prev != last {
                    return Err(format!("bucket {freq} has a broken back link"));
                }
                if self.index.get(&node.entry.key) != Some(&id) {
                    return Err(format!("bucket {freq} entry is not indexed"));
                }
                last = Some(id);
                current = node.next;
                linked += 1;
                if linked > self.nodes.len() {
                    return Err("cycle detected in frequency buckets".into());
                }
            }
            if bucket.tail != last {
                return Err(format!("bucket {freq} tail is stale"));
            }
        }

        if linked != self.nodes.len() {
            return Err(format!(
                "buckets link {linked} entries but store holds {}",
                self.nodes.len()
            ));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(msg) = self.check_links() {
            panic!("{msg}");
        }
    }

    fn iter_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        let mut freq = self.min_freq();
        let mut current = freq
            .and_then(|f| self.buckets.get(&f))
            .and_then(|bucket| bucket.head);
        std::iter::from_fn(move || {
            loop {
                if let Some(id) = current {
                    current = self.nodes.get(id)?.next;
                    return Some(id);
                }
                freq = self.buckets.get(&freq?)?.next;
                current = freq
                    .and_then(|f| self.buckets.get(&f))
                    .and_then(|bucket| bucket.head);
            }
        })
    }

    fn unlink(&mut self, id: SlotId) -> Option<Entry<K, V>> {
        let freq = self.nodes.get(id)?.entry.access_count;
        let (prev, next) = {
            let bucket = self.buckets.get(&freq)?;
            (bucket.prev, bucket.next)
        };

        self.list_remove(freq, id)?;
        if self.bucket_is_empty(freq) {
            self.remove_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }

        self.nodes.remove(id).map(|node| node.entry)
    }

    fn ensure_bucket(&mut self, freq: u64) {
        if self.buckets.contains_key(&freq) {
            return;
        }
        if self.min_freq == 0 || freq < self.min_freq {
            let next = (self.min_freq != 0).then_some(self.min_freq);
            self.insert_bucket(freq, None, next);
            return;
        }
        let mut prev = None;
        let mut next = None;
        for &f in self.buckets.keys() {
            if f < freq && prev.is_none_or(|p| f > p) {
                prev = Some(f);
            }
            if f > freq && next.is_none_or(|n| f < n) {
                next = Some(f);
            }
        }
        self.insert_bucket(freq, prev, next);
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .is_none_or(|bucket| bucket.head.is_none())
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                prev,
                next,
            },
        );

        if let Some(prev) = prev
            && let Some(prev_bucket) = self.buckets.get_mut(&prev)
        {
            prev_bucket.next = Some(freq);
        }
        if let Some(next) = next
            && let Some(next_bucket) = self.buckets.get_mut(&next)
        {
            next_bucket.prev = Some(freq);
        }
    }

    fn remove_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        if let Some(prev) = prev
            && let Some(prev_bucket) = self.buckets.get_mut(&prev)
        {
            prev_bucket.next = next;
        }
        if let Some(next) = next
            && let Some(next_bucket) = self.buckets.get_mut(&next)
        {
            next_bucket.prev = prev;
        }
        self.buckets.remove(&freq);
    }

    fn list_push_back(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let bucket = self.buckets.get_mut(&freq)?;
        let old_tail = bucket.tail;

        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail.and_then(|tail| self.nodes.get_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(id),
            None => bucket.head = Some(id),
        }
        bucket.tail = Some(id);
        Some(())
    }

    fn list_remove(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.nodes.get(id)?;
            (node.prev, node.next)
        };

        let bucket = self.buckets.get_mut(&freq)?;
        match prev.and_then(|prev| self.nodes.get_mut(prev)) {
            Some(prev_node) => prev_node.next = next,
            None => bucket.head = next,
        }
        match next.and_then(|next| self.nodes.get_mut(next)) {
            Some(next_node) => next_node.prev = prev,
            None => bucket.tail = prev,
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = None;
            node.next = None;
        }
        Some(())
    }
}

impl<K, V> Default for FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets_with(keys: &[&'static str]) -> FrequencyBuckets<&'static str, usize> {
        let mut buckets = FrequencyBuckets::new();
        for (i, key) in keys.iter().enumerate() {
            assert!(buckets.insert(Entry::new(*key, i)));
        }
        buckets
    }

    #[test]
    fn frequency_buckets_basic_flow() {
        let mut buckets = buckets_with(&["a", "b"]);
        assert_eq!(buckets.min_freq(), Some(1));

        assert_eq!(buckets.touch(&"a"), Some(2));
        assert_eq!(buckets.frequency(&"a"), Some(2));
        assert_eq!(buckets.frequency(&"b"), Some(1));
        assert_eq!(buckets.min_freq(), Some(1));

        let popped = buckets.pop_min().expect("victim");
        assert_eq!(popped.key, "b");
        assert_eq!(popped.value, 1);
        assert_eq!(buckets.min_freq(), Some(2));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn frequency_buckets_fifo_within_bucket() {
        let mut buckets = buckets_with(&["a", "b", "c"]);
        buckets.touch(&"c");

        assert_eq!(buckets.pop_min().map(|e| e.key), Some("a"));
        assert_eq!(buckets.pop_min().map(|e| e.key), Some("b"));
        assert_eq!(buckets.pop_min().map(|e| (e.key, e.access_count)), Some(("c", 2)));
        assert!(buckets.pop_min().is_none());
        assert_eq!(buckets.min_freq(), None);
    }

    #[test]
    fn frequency_buckets_touch_moves_to_bucket_tail() {
        let mut buckets = buckets_with(&["a", "b", "c"]);
        buckets.touch(&"b");
        buckets.touch(&"a");

        let order: Vec<_> = buckets.iter().map(|e| (e.key, e.access_count)).collect();
        assert_eq!(order, vec![("c", 1), ("b", 2), ("a", 2)]);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn frequency_buckets_min_freq_advances_past_gaps() {
        let mut buckets = buckets_with(&["a", "b"]);
        for _ in 0..3 {
            buckets.touch(&"a");
        }
        buckets.touch(&"b");
        assert_eq!(buckets.min_freq(), Some(2));

        buckets.remove(&"b");
        assert_eq!(buckets.min_freq(), Some(4));
        buckets.debug_validate_invariants();

        buckets.remove(&"a");
        assert_eq!(buckets.min_freq(), None);
        assert!(buckets.check_links().is_ok());
    }

    #[test]
    fn frequency_buckets_insert_keeps_existing_entry() {
        let mut buckets = buckets_with(&["a"]);
        assert!(!buckets.insert(Entry::new("a", 99)));
        assert_eq!(buckets.get(&"a").map(|e| e.value), Some(0));
    }

    #[test]
    fn frequency_buckets_insert_at_higher_count_links_in_order() {
        let mut buckets = buckets_with(&["a"]);
        let mut hot = Entry::new("hot", 10);
        hot.access_count = 5;
        assert!(buckets.insert(hot));
        let mut warm = Entry::new("warm", 20);
        warm.access_count = 3;
        assert!(buckets.insert(warm));

        let order: Vec<_> = buckets.iter().map(|e| e.key).collect();
        assert_eq!(order, vec!["a", "warm", "hot"]);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn frequency_buckets_value_mut_keeps_count() {
        let mut buckets = buckets_with(&["a"]);
        buckets.touch(&"a");
        if let Some(value) = buckets.value_mut(&"a") {
            *value = 42;
        }
        let entry = buckets.get(&"a").expect("present");
        assert_eq!(entry.value, 42);
        assert_eq!(entry.access_count, 2);
    }

    #[test]
    fn frequency_buckets_rebuild_with_halves_counts() {
        let mut buckets = buckets_with(&["a", "b", "c"]);
        for _ in 0..5 {
            buckets.touch(&"a");
        }
        buckets.touch(&"b");

        buckets.rebuild_with(|freq| freq / 2);
        assert_eq!(buckets.frequency(&"a"), Some(3));
        assert_eq!(buckets.frequency(&"b"), Some(1));
        assert_eq!(buckets.frequency(&"c"), Some(1));
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets.min_freq(), Some(1));
        assert_eq!(buckets.peek_min().map(|e| e.key), Some("c"));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn frequency_buckets_saturates_at_max() {
        let mut buckets = FrequencyBuckets::new();
        let mut entry = Entry::new("a", 0);
        entry.access_count = u64::MAX;
        buckets.insert(entry);
        assert_eq!(buckets.touch(&"a"), Some(u64::MAX));
        buckets.debug_validate_invariants();
    }
}
