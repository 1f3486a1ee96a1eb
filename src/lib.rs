//! Pool Cache - In-process caching primitives
//!
//! Provides a size-bounded LRU cache with approximate cost accounting, and a
//! time-boxed object pool whose expired instances are reclaimed by a
//! background janitor.

pub mod cache;
pub mod config;
pub mod error;
pub mod pool;
mod tasks;

pub use cache::{CacheValue, Finalizer, Item, LruCache, LruStats};
pub use config::PoolConfig;
pub use error::{CacheError, Result};
pub use pool::PoolCache;
