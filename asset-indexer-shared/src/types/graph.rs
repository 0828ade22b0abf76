//! Temporal graph entities as stored in the asset inventory.
//!
//! Assets and containment edges carry a `first_seen`/`last_seen`/`expiration`
//! triple. An entity is live while its expiration equals [`unexpired()`];
//! otherwise it is expired as of that instant. Ownership edges use a nullable
//! end time instead. Nothing in the graph is ever deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unix timestamp of the sentinel "unexpired" instant, `9999-12-12T23:59:59Z`.
pub const UNEXPIRED_TIMESTAMP: i64 = 253_400_659_199;

/// Returns the expiration assigned to entities that are not expired.
///
/// The instant is far enough in the future to never be reached and compares
/// later than any expiration the indexer writes.
pub fn unexpired() -> DateTime<Utc> {
    DateTime::from_timestamp(UNEXPIRED_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// An asset node, identified by the `(asset_type, identifier)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    /// Internal ID assigned by the graph store.
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub identifier: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
}

impl Asset {
    /// Whether the asset is live at `at`.
    pub fn is_live_at(&self, at: DateTime<Utc>) -> bool {
        self.expiration > at
    }

    /// Whether the asset carries the unexpired sentinel.
    pub fn is_unexpired(&self) -> bool {
        self.expiration == unexpired()
    }
}

/// A team node, identified by its business identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub identifier: String,
    pub name: String,
}

/// An "owns" edge from a team to an asset. `end_time == None` means active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owns {
    pub id: String,
    pub team_id: String,
    pub asset_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Owns {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// A "parent of" edge relating a child asset to its parent asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParentOf {
    pub id: String,
    pub parent_id: String,
    pub child_id: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
}

impl ParentOf {
    /// Whether the edge is live at `at`.
    pub fn is_live_at(&self, at: DateTime<Utc>) -> bool {
        self.expiration > at
    }
}
