//! Storage-layer types for asset identity.
//!
//! [`AssetId`] lives here rather than in slotsweep-core because identity is
//! a storage concern: a forest only gains an ID once it is persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a stored asset.
///
/// The inner `i64` aligns with SQLite's `INTEGER PRIMARY KEY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub i64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

/// Identity and location of one persisted forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: AssetId,
    /// Storage path, e.g. `Assets/Prefabs/Enemy.prefab`.
    pub path: String,
    /// Asset kind used by discovery queries, e.g. `Prefab`.
    pub kind: String,
    /// Number of times the contents have been rewritten.
    pub revision: i64,
}
