//! Fixed-size ring for second-chance (CLOCK) eviction.
//!
//! A slot array and a hand. Reads and updates set a slot's reference bit;
//! when the ring is full the hand sweeps forward, clearing set bits, and
//! replaces the first slot whose bit was already clear.
//!
//! ```text
//!   index: FxHashMap<K, usize>           slots
//!   ┌─────────┬─────┐                    [0] A ref=1   ◄── hand
//!   │  key A  │  0  │                    [1] B ref=0
//!   │  key B  │  1  │                    [2] C ref=1
//!   │  key C  │  2  │
//!   └─────────┴─────┘
//!
//!   insert(D) on a full ring:
//!     [0] A ref=1 -> clear, advance
//!     [1] B ref=0 -> replace with D (ref=1), advance
//! ```
//!
//! Inserts into a free slot start unreferenced. A replacing insert starts
//! referenced, so a freshly admitted key survives one full sweep.
//!
//! ## Performance
//! - `get` / `insert` update / `remove`: O(1) average
//! - `insert` on a full ring: O(capacity) worst case, amortized O(1)
use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    referenced: bool,
}

#[derive(Debug)]
/// Fixed-size ring implementing the CLOCK (second-chance) eviction algorithm.
pub struct ClockRing<K, V> {
    slots: Vec<Option<Slot<K, V>>>,
    index: FxHashMap<K, usize>,
    hand: usize,
    len: usize,
}

impl<K, V> ClockRing<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a new ring with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            hand: 0,
            len: 0,
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns `key`'s value without setting the reference bit.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots.get(idx)?.as_ref().map(|slot| &slot.value)
    }

    /// Returns `key`'s value and sets the reference bit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        let slot = self.slots.get_mut(idx)?.as_mut()?;
        slot.referenced = true;
        Some(&slot.value)
    }

    /// Inserts or updates `key`.
    ///
    /// An update overwrites the value and sets the reference bit. Inserting
    /// into a full ring evicts and returns the swept-out `(key, value)`.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity() == 0 {
            return None;
        }

        if let Some(&idx) = self.index.get(&key) {
            if let Some(slot) = self.slots.get_mut(idx).and_then(|slot| slot.as_mut()) {
                slot.value = value;
                slot.referenced = true;
            }
            return None;
        }

        if self.len < self.capacity() {
            let idx = self.free_slot()?;
            self.slots[idx] = Some(Slot {
                key: key.clone(),
                value,
                referenced: false,
            });
            self.index.insert(key, idx);
            self.len += 1;
            return None;
        }

        let idx = self.sweep()?;
        let evicted = self.slots[idx].replace(Slot {
            key: key.clone(),
            value,
            referenced: true,
        })?;
        self.index.remove(&evicted.key);
        self.index.insert(key, idx);
        self.advance_hand();
        Some((evicted.key, evicted.value))
    }

    /// Evicts the next unreferenced entry and returns it.
    pub fn pop_victim(&mut self) -> Option<(K, V)> {
        if self.len == 0 {
            return None;
        }
        let idx = self.sweep()?;
        let evicted = self.slots[idx].take()?;
        self.index.remove(&evicted.key);
        self.len -= 1;
        self.advance_hand();
        Some((evicted.key, evicted.value))
    }

    /// Removes `key` and returns its value, if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        let slot = self.slots.get_mut(idx)?.take()?;
        self.len -= 1;
        Some(slot.value)
    }

    /// Empties every slot and resets the hand.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.index.clear();
        self.hand = 0;
        self.len = 0;
    }

    /// Advances the hand to the first occupied, unreferenced slot, clearing
    /// reference bits on the way. Terminates within two laps.
    fn sweep(&mut self) -> Option<usize> {
        let cap = self.capacity();
        for _ in 0..cap.saturating_mul(2) {
            let idx = self.hand;
            match self.slots[idx].as_mut() {
                Some(slot) if slot.referenced => slot.referenced = false,
                Some(_) => return Some(idx),
                None => {},
            }
            self.advance_hand();
        }
        None
    }

    fn free_slot(&self) -> Option<usize> {
        let cap = self.capacity();
        (0..cap)
            .map(|offset| (self.hand + offset) % cap)
            .find(|&idx| self.slots[idx].is_none())
    }

    fn advance_hand(&mut self) {
        let cap = self.capacity();
        self.hand = if cap == 0 { 0 } else { (self.hand + 1) % cap };
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(self.len, occupied);
        assert_eq!(self.len, self.index.len());
        assert!(self.capacity() == 0 || self.hand < self.capacity());

        for (key, &idx) in &self.index {
            let slot = self.slots[idx].as_ref();
            assert!(slot.is_some_and(|slot| &slot.key == key));
        }
    }
}
