//! DTOs describing feed synchronization outcomes.

use serde::Serialize;

use crate::domain::types::UnitId;

/// Outcome of mirroring one unit's feed.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SyncResult {
    pub unit_id: UnitId,
    pub ota: String,
    pub property_id: String,
    pub status: String,
}

/// Outcome of probing one unit's feed without storing anything.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FeedCheck {
    pub ota: String,
    pub property_id: String,
    pub status: String,
}
