//! Pool Module
//!
//! Time-boxed object pool: several instances per key, served LIFO, reclaimed
//! by a background janitor with a caller-supplied finalizer.

mod stack;
mod store;
mod table;

pub(crate) use table::PoolTable;

// Re-export public types
pub use store::PoolCache;
