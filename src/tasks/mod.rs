//! Background Tasks Module
//!
//! Contains background tasks bound to a cache's lifetime.
//!
//! # Tasks
//! - Janitor: sweeps expired pool entries at a fixed interval and cleans the
//!   pool when stopped

mod janitor;

pub(crate) use janitor::{spawn_janitor, Janitor};
