//! Pool Table Module
//!
//! Unlocked core of the pool cache: per-key stacks, expiration sweep and
//! teardown. Callers pass the current instant so sweeps are deterministic.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::entry::PoolEntry;
use crate::cache::Finalizer;
use crate::error::{CacheError, Result};
use crate::pool::stack::EntryStack;

// == Pool Table ==
/// Map from key to a non-empty stack of pooled entries.
#[derive(Debug)]
pub(crate) struct PoolTable<K, V> {
    stacks: HashMap<K, EntryStack<V>>,
    default_expiration: Duration,
    closed: bool,
}

impl<K, V> PoolTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new(default_expiration: Duration) -> Self {
        Self {
            stacks: HashMap::new(),
            default_expiration,
            closed: false,
        }
    }

    // == Store ==
    /// Pushes a value expiring `default_expiration` after `now`.
    ///
    /// A closed table rejects the value after running its finalizer, so the
    /// instance is still released exactly once.
    pub fn store(
        &mut self,
        key: K,
        value: V,
        finalizer: Option<Finalizer<V>>,
        now: Instant,
    ) -> Result<()> {
        let entry = PoolEntry::new(value, now, self.default_expiration, finalizer);
        if self.closed {
            entry.finalize();
            return Err(CacheError::Closed);
        }
        self.stacks.entry(key).or_default().push(entry);
        Ok(())
    }

    // == Fetch ==
    /// Pops the most recently stored value for `key`, expired or not.
    pub fn fetch(&mut self, key: &K) -> Option<V> {
        let stack = self.stacks.get_mut(key)?;
        let entry = stack.pop();
        if stack.is_empty() {
            self.stacks.remove(key);
        }
        entry.map(PoolEntry::into_value)
    }

    // == Flush ==
    /// Removes and finalizes every entry expired at `now`.
    ///
    /// Returns the number of entries reclaimed. Survivors of a key whose
    /// stack lost entries may come back in a different order.
    pub fn flush(&mut self, now: Instant) -> usize {
        let mut reclaimed = 0;
        for stack in self.stacks.values_mut() {
            let mut i = 0;
            while i < stack.len() {
                if stack.get(i).is_some_and(|entry| entry.is_expired_at(now)) {
                    // The top entry moves into slot i; re-check it
                    stack.swap_remove(i).finalize();
                    reclaimed += 1;
                } else {
                    i += 1;
                }
            }
        }
        if reclaimed > 0 {
            self.stacks.retain(|_, stack| !stack.is_empty());
        }
        reclaimed
    }

    // == Clean ==
    /// Finalizes every remaining entry and closes the table.
    ///
    /// Returns the number of entries finalized; 0 on a closed table.
    pub fn clean(&mut self) -> usize {
        self.closed = true;
        let mut finalized = 0;
        for (_, stack) in self.stacks.drain() {
            for entry in stack.into_entries() {
                entry.finalize();
                finalized += 1;
            }
        }
        finalized
    }

    /// Total number of pooled entries across all keys.
    pub fn len(&self) -> usize {
        self.stacks.values().map(EntryStack::len).sum()
    }

    pub fn key_count(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
