//! Cache entry shared by every list in the crate.
//!
//! An [`Entry`] carries no links of its own: the list that currently owns it
//! keeps the links in its node. Moving an entry from a main list to a ghost
//! list (or between frequency buckets) moves it by value, so at most one
//! structure ever holds a given entry.

/// Key, value and access counter of one cached item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
    pub access_count: u64,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry with an access count of 1.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            access_count: 1,
        }
    }

    /// Resets the access count to 1, as done when an entry is ghosted.
    pub fn reset_access_count(&mut self) {
        self.access_count = 1;
    }

    /// Increments the access count and returns the new value.
    pub fn bump(&mut self) -> u64 {
        self.access_count = self.access_count.saturating_add(1);
        self.access_count
    }
}
