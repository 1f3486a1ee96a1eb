//! Pool Cache Module
//!
//! Locked pool table plus the janitor that sweeps it.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{error, warn};

use crate::cache::Finalizer;
use crate::config::PoolConfig;
use crate::error::{CacheError, Result};
use crate::pool::PoolTable;
use crate::tasks::{spawn_janitor, Janitor};

// == Pool Cache ==
/// Thread-safe pool of reusable instances grouped by key.
///
/// Each [`store`](PoolCache::store) pushes a new instance that expires
/// `default_expiration` later; [`fetch`](PoolCache::fetch) pops the most
/// recent one without looking at its expiration. Expired instances that are
/// never fetched are reclaimed by a background janitor, which runs their
/// finalizer.
///
/// The janitor is spawned on the current tokio runtime by the constructor.
/// Call [`shutdown`](PoolCache::shutdown) to stop it and finalize every
/// remaining instance before the cache goes away. Dropping the cache
/// without it still stops the janitor, but the remaining finalizers then
/// run later on the runtime and nothing waits for them.
///
/// Finalizers run while the pool lock is held and must not call back into
/// the same cache.
#[derive(Debug)]
pub struct PoolCache<K, V> {
    table: Arc<Mutex<PoolTable<K, V>>>,
    config: PoolConfig,
    janitor: Mutex<Option<Janitor>>,
}

impl<K, V> PoolCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    // == Constructor ==
    /// Creates a pool and starts its janitor.
    ///
    /// Zero durations fall back to 30 seconds expiration and a 1 second
    /// cleanup interval. Must be called from within a tokio runtime.
    pub fn new(default_expiration: Duration, cleanup_interval: Duration) -> Result<Self> {
        Self::with_config(PoolConfig::new(default_expiration, cleanup_interval))
    }

    /// Creates a pool from an explicit configuration.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let table = Arc::new(Mutex::new(PoolTable::new(config.default_expiration)));
        let janitor = spawn_janitor(table.clone(), config.cleanup_interval, &runtime);

        Ok(Self {
            table,
            config,
            janitor: Mutex::new(Some(janitor)),
        })
    }

    // == Store ==
    /// Adds an instance under `key`.
    ///
    /// Fails with [`CacheError::Closed`] once the pool has been cleaned; the
    /// rejected instance is finalized before returning.
    pub fn store(&self, key: K, value: V, finalizer: Option<Finalizer<V>>) -> Result<()> {
        let result = self
            .table
            .lock()
            .store(key, value, finalizer, Instant::now());
        if result.is_err() {
            warn!("Store on closed pool cache, instance finalized");
        }
        result
    }

    // == Fetch ==
    /// Takes the most recently stored instance for `key`, even if expired.
    pub fn fetch(&self, key: &K) -> Option<V> {
        self.table.lock().fetch(key)
    }

    // == Flush ==
    /// Reclaims expired instances now, returning how many were finalized.
    ///
    /// The janitor calls this on every tick.
    pub fn flush(&self) -> usize {
        self.table.lock().flush(Instant::now())
    }

    // == Clean ==
    /// Finalizes every instance and closes the pool.
    ///
    /// Later stores fail with [`CacheError::Closed`] and fetches find
    /// nothing. The janitor keeps running until shutdown but has nothing
    /// left to finalize.
    pub fn clean(&self) -> usize {
        self.table.lock().clean()
    }

    // == Shutdown ==
    /// Stops the janitor and waits for it to clean the pool.
    ///
    /// Every remaining finalizer has run exactly once when this returns. If
    /// the janitor task failed, the pool is cleaned here instead and the
    /// failure is still reported.
    pub async fn shutdown(&self) -> Result<()> {
        let janitor = self
            .janitor
            .lock()
            .take()
            .ok_or(CacheError::AlreadyShutdown)?;
        if let Err(e) = janitor.stop().await {
            let finalized = self.table.lock().clean();
            error!("Pool janitor failed ({}), finalized {} entries on shutdown", e, finalized);
            return Err(e);
        }
        Ok(())
    }

    /// Total number of pooled instances.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys with at least one pooled instance.
    pub fn key_count(&self) -> usize {
        self.table.lock().key_count()
    }

    pub fn is_closed(&self) -> bool {
        self.table.lock().is_closed()
    }

    pub fn default_expiration(&self) -> Duration {
        self.config.default_expiration
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.config.cleanup_interval
    }
}
