// Core data types for tlru
//
// This module defines the records exchanged between the cache and its
// callers: policy selection, point-in-time entry snapshots, eviction
// records, and the exportable cache state.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recency policy: which operations refresh an entry's position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Policy {
    /// Least Recently Accessed
    ///
    /// `get` refreshes recency and increments the counter; `set` on an
    /// existing key is rejected with [`Error::DuplicateKey`].
    ///
    /// [`Error::DuplicateKey`]: crate::Error::DuplicateKey
    #[default]
    Lra,

    /// Least Recently Inserted
    ///
    /// `set` refreshes recency and increments the counter; `get` is a pure
    /// observation that never disturbs the list.
    Lri,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lra => write!(f, "LRA"),
            Policy::Lri => write!(f, "LRI"),
        }
    }
}

/// Why an entry left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionReason {
    /// Removed as the least-recent entry to make room for an insertion
    Dropped,
    /// Removed because its TTL elapsed
    Expired,
    /// Removed by an explicit `delete`
    Deleted,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionReason::Dropped => write!(f, "Dropped"),
            EvictionReason::Expired => write!(f, "Expired"),
            EvictionReason::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Point-in-time snapshot of a cached entry
///
/// The value is cloned at snapshot time; mutating a returned snapshot never
/// affects the live cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,

    /// Number of policy touches since the entry was (re)inserted
    pub counter: i64,

    /// When the entry was inserted
    pub created_at: DateTime<Utc>,

    /// Last policy touch, or the caller-supplied timestamp; expiry compares
    /// against this instant
    pub last_used_at: DateTime<Utc>,
}

/// Record delivered to the eviction sink, one per removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvictedEntry<K, V> {
    pub key: K,
    pub value: V,
    pub counter: i64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,

    /// When the eviction decision committed
    pub evicted_at: DateTime<Utc>,
    pub reason: EvictionReason,
}

/// Exported cache contents, ordered most-recently-touched first
///
/// Produced by `get_state` and accepted by `set_state` on a cache running
/// the same policy. Durability is the caller's concern; the state document
/// round-trips through JSON for callers that want a wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State<K, V> {
    pub policy: Policy,
    pub extracted_at: DateTime<Utc>,
    pub entries: Vec<CacheEntry<K, V>>,
}

impl<K, V> State<K, V> {
    /// Serialize this state to a JSON document
    pub fn to_json(&self) -> serde_json::Result<String>
    where
        K: Serialize,
        V: Serialize,
    {
        serde_json::to_string(self)
    }

    /// Rebuild a state from a JSON document produced by [`State::to_json`]
    pub fn from_json(json: &str) -> serde_json::Result<Self>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        serde_json::from_str(json)
    }
}
