//! Cache Entry Module
//!
//! Defines the records stored by both caches: sized LRU entries and pooled
//! entries carrying an expiration and an optional finalizer.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::error;

use crate::config::deadline_after;

// == Size Capability ==
/// Approximate cost of a value, in caller-chosen units (usually bytes).
///
/// The LRU cache asks for this only when a caller passes an explicit size
/// of 0. The default implementation reports 0, so a plain
/// `impl CacheValue for MyType {}` opts a type in without cost tracking.
pub trait CacheValue {
    fn size(&self) -> u64 {
        0
    }
}

impl CacheValue for String {
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl CacheValue for Vec<u8> {
    /// Capacity, not length: the allocation is what the cache holds on to.
    fn size(&self) -> u64 {
        self.capacity() as u64
    }
}

impl<T: CacheValue + ?Sized> CacheValue for Box<T> {
    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl<T: CacheValue + ?Sized> CacheValue for Arc<T> {
    fn size(&self) -> u64 {
        (**self).size()
    }
}

// == LRU Entry ==
/// A single LRU record. Its position in the recency list is tracked by the
/// owning cache, not here.
#[derive(Debug, Clone)]
pub(crate) struct LruEntry<K, V> {
    pub key: K,
    pub value: V,
    /// Cost units charged against the cache capacity
    pub size: u64,
    /// Last time the entry was inserted, updated or read
    pub accessed_at: DateTime<Utc>,
}

impl<K, V> LruEntry<K, V> {
    pub fn new(key: K, value: V, size: u64) -> Self {
        Self {
            key,
            value,
            size,
            accessed_at: Utc::now(),
        }
    }

    /// Refreshes the access timestamp.
    pub fn touch(&mut self) {
        self.accessed_at = Utc::now();
    }
}

// == Item ==
/// Snapshot of one LRU entry, as returned by `LruCache::items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<K, V> {
    pub key: K,
    pub value: V,
    pub size: u64,
}

// == Finalizer ==
/// Cleanup callback run exactly once when a pooled entry is reclaimed,
/// either because it expired or because the pool was cleaned.
///
/// It receives the pooled value by value. Use [`Finalizer::discard`] for
/// callbacks that do not need it; the value is dropped after the call.
pub struct Finalizer<V>(Box<dyn FnOnce(V) + Send>);

impl<V: 'static> Finalizer<V> {
    /// Wraps a callback that consumes the reclaimed value.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(V) + Send + 'static,
    {
        Self(Box::new(f))
    }

    /// Wraps a callback that ignores the reclaimed value.
    pub fn discard<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self(Box::new(move |_value: V| f()))
    }
}

impl<V> Finalizer<V> {
    fn call(self, value: V) {
        (self.0)(value)
    }
}

impl<V> fmt::Debug for Finalizer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Finalizer(..)")
    }
}

// == Pool Entry ==
/// A pooled instance with its absolute expiration.
#[derive(Debug)]
pub(crate) struct PoolEntry<V> {
    value: V,
    expires_at: Instant,
    finalizer: Option<Finalizer<V>>,
}

impl<V> PoolEntry<V> {
    /// Creates an entry expiring `ttl` after `now`. Durations past the
    /// clock's range never expire in practice.
    pub fn new(value: V, now: Instant, ttl: Duration, finalizer: Option<Finalizer<V>>) -> Self {
        Self {
            value,
            expires_at: deadline_after(now, ttl),
            finalizer,
        }
    }

    /// An entry is expired once its expiration lies strictly before `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at < now
    }

    /// Hands the value back to a caller. The finalizer is not run: the
    /// caller now owns the instance.
    pub fn into_value(self) -> V {
        self.value
    }

    /// Runs the finalizer, if any, consuming the entry.
    ///
    /// A panicking finalizer is contained and logged; the entry counts as
    /// reclaimed either way.
    pub fn finalize(mut self) {
        if let Some(finalizer) = self.finalizer.take() {
            let value = self.value;
            if panic::catch_unwind(AssertUnwindSafe(move || finalizer.call(value))).is_err() {
                error!("Pool finalizer panicked, instance dropped");
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Blob(u64);

    impl CacheValue for Blob {
        fn size(&self) -> u64 {
            self.0
        }
    }

    struct Opaque;

    impl CacheValue for Opaque {}

    #[test]
    fn test_size_capability() {
        assert_eq!("hello".to_string().size(), 5);
        assert_eq!(Vec::<u8>::with_capacity(64).size(), 64);
        assert_eq!(Arc::new(Blob(20)).size(), 20);
        assert_eq!(Box::new(Blob(7)).size(), 7);
        assert_eq!(Opaque.size(), 0);
    }

    #[test]
    fn test_lru_entry_touch_advances_access_time() {
        let mut entry = LruEntry::new("k", 1, 3);
        let before = entry.accessed_at;
        entry.touch();
        assert!(entry.accessed_at >= before);
        assert_eq!(entry.size, 3);
    }

    #[test]
    fn test_pool_entry_expiration_boundary() {
        let now = Instant::now();
        let entry = PoolEntry::new("v", now, Duration::from_secs(1), None);

        assert!(!entry.is_expired_at(now));
        // Exactly at the deadline is not yet expired
        assert!(!entry.is_expired_at(now + Duration::from_secs(1)));
        assert!(entry.is_expired_at(now + Duration::from_millis(1001)));
    }

    #[test]
    fn test_pool_entry_max_ttl_never_expires() {
        let now = Instant::now();
        let entry = PoolEntry::new("v", now, Duration::MAX, None);

        assert!(!entry.is_expired_at(now + Duration::from_secs(86_400 * 365 * 10)));
    }

    #[test]
    fn test_finalize_contains_panic() {
        let entry = PoolEntry::new(
            "conn",
            Instant::now(),
            Duration::from_secs(1),
            Some(Finalizer::discard(|| panic!("close failed"))),
        );

        // Must return normally
        entry.finalize();
    }

    #[test]
    fn test_finalize_passes_value() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let entry = PoolEntry::new(
            42usize,
            Instant::now(),
            Duration::from_secs(1),
            Some(Finalizer::new(move |v: usize| {
                seen_clone.store(v, Ordering::SeqCst);
            })),
        );

        entry.finalize();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_discard_finalizer_ignores_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let entry = PoolEntry::new(
            "conn",
            Instant::now(),
            Duration::from_secs(1),
            Some(Finalizer::discard(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        entry.finalize();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_into_value_skips_finalizer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let entry = PoolEntry::new(
            "conn",
            Instant::now(),
            Duration::from_secs(1),
            Some(Finalizer::discard(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(entry.into_value(), "conn");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
