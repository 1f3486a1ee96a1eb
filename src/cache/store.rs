//! LRU Cache Module
//!
//! Size-bounded cache combining HashMap lookup with recency ordering.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::entry::{CacheValue, Item, LruEntry};
use crate::cache::lru::RecencyList;
use crate::cache::LruStats;

// == LRU Cache ==
/// Thread-safe LRU cache with approximate cost accounting.
///
/// Every entry carries a size in caller-chosen units. After each mutating
/// call returns, the sum of sizes never exceeds the capacity: the least
/// recently used entries are dropped until it fits. Evicted values are
/// simply released, no callback runs.
#[derive(Debug)]
pub struct LruCache<K, V> {
    inner: Mutex<LruState<K, V>>,
}

#[derive(Debug)]
struct LruState<K, V> {
    /// Key to slot in `list`
    table: HashMap<K, usize>,
    list: RecencyList<LruEntry<K, V>>,
    /// Sum of all entry sizes
    size: u64,
    capacity: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + CacheValue,
{
    // == Constructor ==
    /// Creates an empty cache bounded to `capacity` cost units.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Mutex::new(LruState {
                table: HashMap::new(),
                list: RecencyList::new(),
                size: 0,
                capacity,
            }),
        }
    }

    // == Get ==
    /// Returns a copy of the value and promotes the entry to most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.inner.lock();
        let idx = *state.table.get(key)?;
        state.promote(idx);
        state.list.get(idx).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Inserts or replaces a value.
    ///
    /// A `size` of 0 means "ask the value": [`CacheValue::size`] is used
    /// instead. Replacing a value applies the size difference and promotes
    /// the entry.
    pub fn set(&self, key: K, value: V, size: u64) {
        let size = effective_size(&value, size);
        let mut state = self.inner.lock();
        match state.table.get(&key).copied() {
            Some(idx) => state.update_in_place(idx, value, size),
            None => state.add_new(key, value, size),
        }
    }

    // == Set If Absent ==
    /// Inserts a value only if the key is missing. An existing entry is
    /// promoted but keeps its value and size.
    pub fn set_if_absent(&self, key: K, value: V, size: u64) {
        let size = effective_size(&value, size);
        let mut state = self.inner.lock();
        match state.table.get(&key).copied() {
            Some(idx) => state.promote(idx),
            None => state.add_new(key, value, size),
        }
    }

    // == Take ==
    /// Removes an entry and returns its value.
    pub fn take(&self, key: &K) -> Option<V> {
        let mut state = self.inner.lock();
        state.remove(key).map(|entry| entry.value)
    }

    // == Delete ==
    /// Removes an entry. Returns whether it was present.
    pub fn delete(&self, key: &K) -> bool {
        let mut state = self.inner.lock();
        state.remove(key).is_some()
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.table.clear();
        state.list.clear();
        state.size = 0;
    }

    // == Set Capacity ==
    /// Changes the bound and evicts immediately until the cache fits.
    pub fn set_capacity(&self, capacity: u64) {
        let mut state = self.inner.lock();
        debug!(
            old = state.capacity,
            new = capacity,
            "LRU capacity changed"
        );
        state.capacity = capacity;
        state.check_capacity();
    }

    // == Stats ==
    /// Returns a snapshot of length, size, capacity and the oldest access time.
    pub fn stats(&self) -> LruStats {
        let state = self.inner.lock();
        let mut stats = LruStats::empty(state.capacity);
        stats.length = state.list.len() as u64;
        stats.size = state.size;
        if let Some(oldest) = state.list.back() {
            stats.oldest_access = oldest.accessed_at;
        }
        stats
    }

    /// Stats rendered as JSON.
    pub fn stats_json(&self) -> String {
        self.stats().to_json()
    }

    /// Stats of an optional cache handle rendered as JSON, `{}` for `None`.
    pub fn stats_json_of(cache: Option<&Self>) -> String {
        LruStats::json_or_empty(cache.map(|c| c.stats()).as_ref())
    }

    // == Keys ==
    /// Snapshot of keys, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        let state = self.inner.lock();
        state.list.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Items ==
    /// Snapshot of entries, most recently used first.
    pub fn items(&self) -> Vec<Item<K, V>> {
        let state = self.inner.lock();
        state
            .list
            .iter()
            .map(|entry| Item {
                key: entry.key.clone(),
                value: entry.value.clone(),
                size: entry.size,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u64 {
        self.inner.lock().capacity
    }
}

fn effective_size<V: CacheValue>(value: &V, size: u64) -> u64 {
    if size == 0 {
        value.size()
    } else {
        size
    }
}

impl<K, V> LruState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn promote(&mut self, idx: usize) {
        self.list.move_to_front(idx);
        if let Some(entry) = self.list.get_mut(idx) {
            entry.touch();
        }
    }

    fn update_in_place(&mut self, idx: usize, value: V, size: u64) {
        if let Some(entry) = self.list.get_mut(idx) {
            // self.size already counts entry.size
            self.size = self.size - entry.size + size;
            entry.value = value;
            entry.size = size;
        }
        self.promote(idx);
        self.check_capacity();
    }

    fn add_new(&mut self, key: K, value: V, size: u64) {
        let idx = self.list.push_front(LruEntry::new(key.clone(), value, size));
        self.table.insert(key, idx);
        self.size += size;
        self.check_capacity();
    }

    fn remove(&mut self, key: &K) -> Option<LruEntry<K, V>> {
        let idx = self.table.remove(key)?;
        let entry = self.list.remove(idx)?;
        self.size -= entry.size;
        Some(entry)
    }

    // == Check Capacity ==
    /// Evicts from the tail until the aggregate size fits the capacity.
    fn check_capacity(&mut self) {
        while self.size > self.capacity {
            let Some(evicted) = self.list.pop_back() else {
                break;
            };
            self.table.remove(&evicted.key);
            self.size -= evicted.size;
            trace!(
                size = evicted.size,
                remaining = self.size,
                capacity = self.capacity,
                "LRU evicted least recently used entry"
            );
        }
    }
}
