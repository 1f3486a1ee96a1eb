//! Error types for the cache primitives
//!
//! Provides unified error handling using thiserror.
//!
//! Lookups on a missing key are not errors: they report absence through
//! `Option`/`bool`. Only lifecycle failures surface here.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The pool cache was constructed outside a tokio runtime
    #[error("No tokio runtime available to run the janitor")]
    NoRuntime,

    /// The pool cache has been cleaned and no longer accepts entries
    #[error("Pool cache is closed")]
    Closed,

    /// Shutdown was requested more than once
    #[error("Pool cache janitor already shut down")]
    AlreadyShutdown,

    /// The janitor task was cancelled or aborted
    #[error("Janitor failed: {0}")]
    Janitor(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache primitives.
pub type Result<T> = std::result::Result<T, CacheError>;
