//! Collision Layers
//!
//! Bit-flag layers and the symmetric matrix deciding which layers interact.

use serde::{Serialize, Deserialize};

/// Single collision layer, stored as one bit of a u32.
///
/// Five layers are predefined; [`CollisionLayer::custom`] reaches the rest
/// of the 32 available ordinals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(u32);

impl CollisionLayer {
    /// No layer
    pub const NONE: Self = Self(0);
    /// Layer for bodies that did not pick one
    pub const DEFAULT: Self = Self(1 << 0);
    /// Melee and archer units
    pub const UNIT: Self = Self(1 << 1);
    /// Towers
    pub const TOWER: Self = Self(1 << 2);
    /// Projectiles
    pub const PROJECTILE: Self = Self(1 << 3);
    /// Static level geometry
    pub const TERRAIN: Self = Self(1 << 4);

    /// Layer with the given bit index (0..32).
    #[inline]
    pub const fn custom(index: u32) -> Self {
        Self(1 << (index & 31))
    }

    /// Raw bit mask.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Ordinal of the lowest set bit. An empty layer maps to 0.
    #[inline]
    pub const fn index(self) -> usize {
        if self.0 == 0 {
            0
        } else {
            self.0.trailing_zeros() as usize
        }
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Symmetric layer interaction table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionMatrix {
    rows: [u32; 32],
}

impl CollisionMatrix {
    /// Matrix where nothing collides.
    pub const fn empty() -> Self {
        Self { rows: [0; 32] }
    }

    /// Stock lane-battler rules.
    pub fn lane_battle() -> Self {
        let mut matrix = Self::empty();
        matrix
            .allow(CollisionLayer::UNIT, CollisionLayer::UNIT)
            .allow(CollisionLayer::UNIT, CollisionLayer::TOWER)
            .allow(CollisionLayer::PROJECTILE, CollisionLayer::UNIT)
            .allow(CollisionLayer::PROJECTILE, CollisionLayer::TOWER)
            .allow(CollisionLayer::TERRAIN, CollisionLayer::UNIT)
            .allow(CollisionLayer::TERRAIN, CollisionLayer::PROJECTILE);
        matrix
    }

    /// Let `a` and `b` collide (both directions).
    pub fn allow(&mut self, a: CollisionLayer, b: CollisionLayer) -> &mut Self {
        let (ia, ib) = (a.index(), b.index());
        self.rows[ia] |= 1 << ib;
        self.rows[ib] |= 1 << ia;
        self
    }

    /// Stop `a` and `b` from colliding (both directions).
    pub fn deny(&mut self, a: CollisionLayer, b: CollisionLayer) -> &mut Self {
        let (ia, ib) = (a.index(), b.index());
        self.rows[ia] &= !(1 << ib);
        self.rows[ib] &= !(1 << ia);
        self
    }

    /// Whether bodies on these layers interact.
    #[inline]
    pub fn should_collide(&self, a: CollisionLayer, b: CollisionLayer) -> bool {
        (self.rows[a.index()] >> b.index()) & 1 != 0
    }
}

impl Default for CollisionMatrix {
    fn default() -> Self {
        Self::lane_battle()
    }
}

// =============================================================================
// TESTS
// =============================================================================
