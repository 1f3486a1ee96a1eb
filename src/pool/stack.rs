//! Entry Stack Module
//!
//! Per-key sequence of pooled entries served last-in-first-out.

use crate::cache::entry::PoolEntry;

/// Most keys pool a handful of instances; avoids early regrowth.
const INITIAL_CAPACITY: usize = 10;

// == Entry Stack ==
/// LIFO stack of pooled entries for a single key.
///
/// `swap_remove` fills the hole with the top entry, so removing from the
/// middle is O(1) but reorders the survivors.
#[derive(Debug)]
pub(crate) struct EntryStack<V> {
    entries: Vec<PoolEntry<V>>,
}

impl<V> EntryStack<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn push(&mut self, entry: PoolEntry<V>) {
        self.entries.push(entry);
    }

    /// Removes the most recently pushed entry.
    pub fn pop(&mut self) -> Option<PoolEntry<V>> {
        self.entries.pop()
    }

    /// Removes the entry at `index`, moving the top entry into its place.
    pub fn swap_remove(&mut self, index: usize) -> PoolEntry<V> {
        self.entries.swap_remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&PoolEntry<V>> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the stack, yielding entries bottom to top.
    pub fn into_entries(self) -> impl Iterator<Item = PoolEntry<V>> {
        self.entries.into_iter()
    }
}

impl<V> Default for EntryStack<V> {
    fn default() -> Self {
        Self::new()
    }
}
