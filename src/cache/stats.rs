//! Cache Statistics Module
//!
//! Point-in-time snapshot of an LRU cache's occupancy.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == LRU Stats ==
/// Occupancy snapshot of an LRU cache.
///
/// Serializes to compact JSON with exactly these keys:
/// `{"Length":n,"Size":n,"Capacity":n,"OldestAccess":"<RFC 3339>"}`.
/// Only the key set and value types are stable, not the whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LruStats {
    /// Number of entries
    pub length: u64,
    /// Sum of entry sizes
    pub size: u64,
    /// Configured bound on `size`
    pub capacity: u64,
    /// Access time of the least recently used entry, Unix epoch if empty
    pub oldest_access: DateTime<Utc>,
}

impl LruStats {
    /// Stats of an empty cache with the given capacity.
    pub fn empty(capacity: u64) -> Self {
        Self {
            length: 0,
            size: 0,
            capacity,
            oldest_access: DateTime::<Utc>::default(),
        }
    }

    // == To JSON ==
    /// Renders the snapshot as a JSON object.
    pub fn to_json(&self) -> String {
        // A struct of integers and a timestamp always serializes
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    // == Optional JSON ==
    /// Renders `stats` as JSON, or `{}` when there is nothing to report.
    pub fn json_or_empty(stats: Option<&LruStats>) -> String {
        stats.map_or_else(|| "{}".to_string(), LruStats::to_json)
    }
}
