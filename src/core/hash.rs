//! State Hashing for Verification
//!
//! Provides deterministic hashing of simulation state for:
//! - Replay validation (two runs of the same match must agree)
//! - Cross-machine desync detection

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Domain separator for per-frame snapshot hashes.
pub const SNAPSHOT_DOMAIN: &[u8] = b"LANE_BATTLE_SNAPSHOT_V1";

/// Deterministic hasher for simulation state.
///
/// Wraps SHA-256 with little-endian integer helpers. Fixed-point values
/// go in as their raw `i64`. Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a frame snapshot.
    pub fn for_snapshot() -> Self {
        Self::new(SNAPSHOT_DOMAIN)
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i64 value (little-endian).
    #[inline]
    pub fn update_i64(&mut self, value: i64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute a snapshot hash for replay verification.
///
/// Frame and winner are always hashed first; the closure adds the
/// per-entity data in snapshot order.
pub fn compute_state_hash<F>(frame: u64, winner: i32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_snapshot();

    hasher.update_u64(frame);
    hasher.update_i32(winner);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_entity(id: u32, px: i64) -> StateHash {
        compute_state_hash(100, -1, |hasher| {
            hasher.update_u32(id);
            hasher.update_u8(1);
            hasher.update_i64(px);
        })
    }

    #[test]
    fn test_state_hash_determinism() {
        assert_eq!(hash_entity(3, 5 << 32), hash_entity(3, 5 << 32));
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let hash = |domain: &[u8]| {
            let mut h = StateHasher::new(domain);
            h.update_u32(7);
            h.finalize()
        };
        assert_ne!(hash(b"DOMAIN_A"), hash(b"DOMAIN_B"));
    }

    #[test]
    fn test_single_raw_unit_changes_hash() {
        assert_ne!(hash_entity(3, 5 << 32), hash_entity(3, (5 << 32) + 1));
        assert_ne!(hash_entity(3, 0), hash_entity(4, 0));
    }

    #[test]
    fn test_frame_and_winner_are_hashed() {
        let base = compute_state_hash(100, -1, |_| {});
        assert_ne!(base, compute_state_hash(101, -1, |_| {}));
        assert_ne!(base, compute_state_hash(100, 0, |_| {}));
    }
}
