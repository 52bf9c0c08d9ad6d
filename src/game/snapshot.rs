//! Match Snapshots
//!
//! Per-tick view of every live entity, in raw fixed-point integers so it
//! can be compared and hashed bit for bit.

use serde::{Serialize, Deserialize};

use crate::core::hash::{compute_state_hash, StateHash};
use super::entity::{EntityId, EntityType, Owner};

/// One entity in a snapshot. Numeric fields are raw Q32.32 values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntity {
    /// Entity id
    pub id: EntityId,
    /// Type tag
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Side
    pub owner: Owner,
    /// World position X
    pub px: i64,
    /// World position Y
    pub py: i64,
    /// World position Z
    pub pz: i64,
    /// Velocity X
    pub vx: i64,
    /// Velocity Y
    pub vy: i64,
    /// Velocity Z
    pub vz: i64,
    /// Hit points
    pub hp: i64,
}

/// Match state after a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Physics frame
    pub frame: u64,
    /// -1 = undecided, 0 = left wins, 1 = right wins
    pub winner: i32,
    /// Live entities, ascending id
    pub entities: Vec<SnapshotEntity>,
}

impl Snapshot {
    /// Winning side, if decided.
    pub fn winner_side(&self) -> Option<Owner> {
        Owner::try_from(self.winner).ok()
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode from [`Snapshot::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// SHA-256 over frame, winner and every entity field in order.
    pub fn state_hash(&self) -> StateHash {
        compute_state_hash(self.frame, self.winner, |hasher| {
            hasher.update_u32(self.entities.len() as u32);
            for e in &self.entities {
                hasher.update_u32(e.id);
                hasher.update_u8(e.entity_type as u8);
                hasher.update_u8(e.owner);
                hasher.update_i64(e.px);
                hasher.update_i64(e.py);
                hasher.update_i64(e.pz);
                hasher.update_i64(e.vx);
                hasher.update_i64(e.vy);
                hasher.update_i64(e.vz);
                hasher.update_i64(e.hp);
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
