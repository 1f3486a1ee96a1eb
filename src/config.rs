//! Configuration Module
//!
//! Timing parameters for the pool cache and its janitor.

use std::time::Duration;

use tokio::time::Instant;

/// Default lifetime of a pooled entry.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(30);

/// Default interval between janitor sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Deadline used when a duration is too large to add to an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Returns `now + after`, saturating about 30 years out instead of
/// overflowing, so `Duration::MAX` reads as "never".
pub(crate) fn deadline_after(now: Instant, after: Duration) -> Instant {
    now.checked_add(after)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Pool cache configuration parameters.
///
/// Zero durations are not meaningful and are replaced by the defaults
/// (30 seconds expiration, 1 second cleanup interval).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Lifetime of every stored entry, measured from `store`
    pub default_expiration: Duration,
    /// Tick period of the background janitor
    pub cleanup_interval: Duration,
}

impl PoolConfig {
    /// Creates a config, substituting defaults for zero durations.
    pub fn new(default_expiration: Duration, cleanup_interval: Duration) -> Self {
        Self::default()
            .with_default_expiration(default_expiration)
            .with_cleanup_interval(cleanup_interval)
    }

    /// Sets the entry lifetime. Zero keeps the default.
    pub fn with_default_expiration(mut self, expiration: Duration) -> Self {
        self.default_expiration = if expiration.is_zero() {
            DEFAULT_EXPIRATION
        } else {
            expiration
        };
        self
    }

    /// Sets the janitor tick period. Zero keeps the default.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = if interval.is_zero() {
            DEFAULT_CLEANUP_INTERVAL
        } else {
            interval
        };
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_expiration: DEFAULT_EXPIRATION,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}
