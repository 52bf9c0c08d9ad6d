//! Game Entities
//!
//! Towers, units and projectiles. Each entity is keyed by the id of the
//! physics body it drives; per-variant data lives in [`EntityKind`].

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::fixed::Fix64;
use crate::core::vec3::FixedVector3;
use crate::physics::body::BodyId;

/// Entity identifier. Always equal to the entity's body id.
pub type EntityId = BodyId;

/// Side of the lane: 0 = left, 1 = right.
pub type Owner = u8;

/// The side opposing `owner`.
#[inline]
pub fn opponent(owner: Owner) -> Owner {
    1 - owner.min(1)
}

/// Entity type tag, as reported in snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityType {
    /// Static HP pool at each end of the lane
    Tower = 0,
    /// Close-range unit
    Melee = 1,
    /// Ranged unit
    Archer = 2,
    /// Archer shot
    Projectile = 3,
}

/// Unit attack style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitClass {
    /// Damages the target directly
    Melee,
    /// Fires a projectile at the target
    Archer {
        /// Projectile speed, units per second
        projectile_speed: Fix64,
    },
}

/// Per-unit combat state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    /// Attack style
    pub class: UnitClass,
    /// Units per second
    pub speed: Fix64,
    /// Attack reach
    pub range: Fix64,
    /// Damage per attack
    pub damage: Fix64,
    /// Seconds between attacks
    pub cooldown: Fix64,
    /// Time until the next attack is allowed
    pub cooldown_timer: Fix64,
    /// Lane direction (right for owner 0, left for owner 1)
    pub move_dir: FixedVector3,
}

/// Per-projectile state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Damage dealt on hit
    pub damage: Fix64,
    /// Seconds left before despawn
    pub remaining_life: Fix64,
    /// Side this projectile can damage
    pub target_owner: Owner,
    /// Entity it was aimed at, if any
    pub target: Option<EntityId>,
    /// Already delivered its damage
    pub spent: bool,
}

/// Variant-specific data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// No per-tick behavior
    Tower,
    /// Melee or archer
    Unit(UnitState),
    /// Projectile in flight
    Projectile(ProjectileState),
}

/// A live game entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntity {
    /// Body id
    pub id: EntityId,
    /// Side
    pub owner: Owner,
    /// Type tag
    pub entity_type: EntityType,
    /// Current hit points, in [0, max_hp]
    pub hp: Fix64,
    /// Maximum hit points
    pub max_hp: Fix64,
    /// Set once; removal happens at the end of the tick
    pub despawn_pending: bool,
    /// Variant data
    pub kind: EntityKind,
}

impl GameEntity {
    /// New tower.
    pub fn tower(owner: Owner, max_hp: Fix64) -> Self {
        Self::new(owner, EntityType::Tower, max_hp, EntityKind::Tower)
    }

    /// New melee or archer unit, typed by its class.
    pub fn unit(owner: Owner, max_hp: Fix64, state: UnitState) -> Self {
        let entity_type = match state.class {
            UnitClass::Melee => EntityType::Melee,
            UnitClass::Archer { .. } => EntityType::Archer,
        };
        Self::new(owner, entity_type, max_hp, EntityKind::Unit(state))
    }

    /// New projectile. Projectiles carry a token 1 HP.
    pub fn projectile(owner: Owner, state: ProjectileState) -> Self {
        Self::new(owner, EntityType::Projectile, Fix64::ONE, EntityKind::Projectile(state))
    }

    fn new(owner: Owner, entity_type: EntityType, max_hp: Fix64, kind: EntityKind) -> Self {
        Self {
            id: 0,
            owner,
            entity_type,
            hp: max_hp,
            max_hp,
            despawn_pending: false,
            kind,
        }
    }

    /// Bind to the body id assigned by the physics world.
    pub fn bind_id(&mut self, id: EntityId) {
        self.id = id;
    }

    /// HP above zero.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > Fix64::ZERO
    }

    /// Alive and not scheduled for removal.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_alive() && !self.despawn_pending
    }

    /// Subtract damage, clamping at zero.
    ///
    /// No-op once HP is zero. Returns true when this call brought HP to
    /// zero, i.e. when the caller must schedule the despawn.
    pub fn apply_damage(&mut self, damage: Fix64) -> bool {
        if self.hp <= Fix64::ZERO {
            return false;
        }
        self.hp = (self.hp - damage).clamp(Fix64::ZERO, self.max_hp);
        self.hp.is_zero()
    }

    /// Flag for removal. Returns true only the first time.
    pub fn mark_despawn(&mut self) -> bool {
        if self.despawn_pending {
            return false;
        }
        self.despawn_pending = true;
        true
    }

    /// Unit state, if this is a unit.
    pub fn as_unit(&self) -> Option<&UnitState> {
        match &self.kind {
            EntityKind::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Mutable unit state, if this is a unit.
    pub fn as_unit_mut(&mut self) -> Option<&mut UnitState> {
        match &mut self.kind {
            EntityKind::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Projectile state, if this is a projectile.
    pub fn as_projectile(&self) -> Option<&ProjectileState> {
        match &self.kind {
            EntityKind::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    /// Mutable projectile state, if this is a projectile.
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileState> {
        match &mut self.kind {
            EntityKind::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    /// Called after the entity is registered.
    pub fn on_added(&self) {
        debug!(id = self.id, owner = self.owner, kind = ?self.entity_type, "Entity added");
    }

    /// Called after the entity and its body are removed.
    pub fn on_removed(&self) {
        debug!(id = self.id, owner = self.owner, kind = ?self.entity_type, hp = %self.hp, "Entity removed");
    }
}

// =============================================================================
// TESTS
// =============================================================================
