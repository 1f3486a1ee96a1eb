//! Cache Module
//!
//! Size-bounded LRU cache and the entry model shared with the pool cache.

pub(crate) mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheValue, Finalizer, Item};
pub use stats::LruStats;
pub use store::LruCache;
