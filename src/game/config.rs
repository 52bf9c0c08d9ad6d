//! Simulation Configuration
//!
//! Immutable match parameters, decoded from JSON at load time.
//! Decimal values are converted to Fix64 once here and never again.

use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::fixed::Fix64;
use crate::core::vec3::FixedVector3;
use crate::physics::world::{PhysicsSettings, ResolutionMode};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed, incomplete, or out-of-range JSON.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value decoded but is not usable.
    #[error("Invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Map layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MapConfig {
    /// World units along X
    pub width: Fix64,
    /// World units along Z
    pub height: Fix64,
    /// Y coordinate of the lane plane
    pub lane_y: Fix64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: Fix64::from_int(30),
            height: Fix64::from_int(10),
            lane_y: Fix64::ZERO,
        }
    }
}

/// Tower stats and placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TowerConfig {
    /// Hit points
    pub hp: Fix64,
    /// Full box size
    pub size: FixedVector3,
    /// Distance from the map edge to the tower center
    pub half_gap_to_edge: Fix64,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            hp: Fix64::from_int(500),
            size: FixedVector3::from_ints(2, 5, 2),
            half_gap_to_edge: Fix64::from_int(3),
        }
    }
}

/// Melee unit stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MeleeConfig {
    /// Hit points
    pub hp: Fix64,
    /// Units per second
    pub speed: Fix64,
    /// Damage per hit
    pub damage: Fix64,
    /// Attack reach, center to center
    pub range: Fix64,
    /// Seconds between hits
    pub cooldown: Fix64,
    /// Collider radius
    pub radius: Fix64,
    /// Units spawned per side at match start
    pub count_per_side: u32,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            hp: Fix64::from_int(100),
            speed: Fix64::from_int(3),
            damage: Fix64::from_int(20),
            range: Fix64::from_ratio(3, 2),
            cooldown: Fix64::from_ratio(4, 5),
            radius: Fix64::HALF,
            count_per_side: 0,
        }
    }
}

/// Archer unit stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArcherConfig {
    /// Hit points
    pub hp: Fix64,
    /// Units per second
    pub speed: Fix64,
    /// Damage per projectile
    pub damage: Fix64,
    /// Attack reach, center to center
    pub range: Fix64,
    /// Seconds between shots
    pub cooldown: Fix64,
    /// Collider radius
    pub radius: Fix64,
    /// Projectile speed, units per second
    pub projectile_speed: Fix64,
    /// Units spawned per side at match start
    pub count_per_side: u32,
}

impl Default for ArcherConfig {
    fn default() -> Self {
        Self {
            hp: Fix64::from_int(80),
            speed: Fix64::from_ratio(5, 2),
            damage: Fix64::from_int(15),
            range: Fix64::from_int(6),
            cooldown: Fix64::from_ratio(6, 5),
            radius: Fix64::HALF,
            projectile_speed: Fix64::from_int(12),
            count_per_side: 0,
        }
    }
}

/// Projectile body parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectileConfig {
    /// Seconds before an unspent projectile despawns
    pub lifetime: Fix64,
    /// Trigger sphere radius
    pub radius: Fix64,
    /// Body mass
    pub mass: Fix64,
    /// Linear drag; zero keeps the launch speed
    pub drag: Fix64,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            lifetime: Fix64::from_int(5),
            radius: Fix64::from_ratio(1, 5),
            mass: Fix64::from_ratio(1, 10),
            drag: Fix64::ZERO,
        }
    }
}

/// Physics world parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Gravity vector
    pub gravity: FixedVector3,
    /// Seconds per tick
    pub fixed_time_step: Fix64,
    /// Broadphase cell size, at least one unit
    pub cell_size: Fix64,
    /// Linear drag on unit bodies
    pub unit_drag: Fix64,
    /// Contact resolution, disabled unless set
    #[serde(default)]
    pub resolution: ResolutionMode,
}

impl PhysicsConfig {
    /// World settings for this config.
    pub fn settings(&self) -> PhysicsSettings {
        PhysicsSettings {
            gravity: self.gravity,
            fixed_time_step: self.fixed_time_step,
            cell_size: self.cell_size,
            resolution: self.resolution,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let world = PhysicsSettings::default();
        Self {
            gravity: world.gravity,
            fixed_time_step: world.fixed_time_step,
            cell_size: world.cell_size,
            unit_drag: crate::physics::body::DEFAULT_DRAG,
            resolution: world.resolution,
        }
    }
}

/// Full match configuration.
///
/// Every field of `map`, `towers`, `melee` and `archer` is required when
/// decoding. The `projectile` and `physics` sections may be omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SimConfig {
    /// Map layout
    pub map: MapConfig,
    /// Towers
    pub towers: TowerConfig,
    /// Melee units
    pub melee: MeleeConfig,
    /// Archer units
    pub archer: ArcherConfig,
    /// Projectiles
    #[serde(default)]
    pub projectile: ProjectileConfig,
    /// Physics world
    #[serde(default)]
    pub physics: PhysicsConfig,
}

impl SimConfig {
    /// Decode and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, decode and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Encode as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = Fix64::ZERO;

        require(self.map.width > zero, "map.width", "must be positive")?;
        require(self.map.height >= zero, "map.height", "must not be negative")?;

        require(self.towers.hp > zero, "towers.hp", "must be positive")?;
        require(self.towers.half_gap_to_edge >= zero, "towers.halfGapToEdge", "must not be negative")?;
        let size = self.towers.size;
        require(size.x > zero && size.y > zero && size.z > zero, "towers.size", "must be positive on every axis")?;

        let melee = &self.melee;
        require(melee.hp > zero, "melee.hp", "must be positive")?;
        require(melee.speed >= zero, "melee.speed", "must not be negative")?;
        require(melee.damage >= zero, "melee.damage", "must not be negative")?;
        require(melee.range >= zero, "melee.range", "must not be negative")?;
        require(melee.cooldown >= zero, "melee.cooldown", "must not be negative")?;
        require(melee.radius > zero, "melee.radius", "must be positive")?;

        let archer = &self.archer;
        require(archer.hp > zero, "archer.hp", "must be positive")?;
        require(archer.speed >= zero, "archer.speed", "must not be negative")?;
        require(archer.damage >= zero, "archer.damage", "must not be negative")?;
        require(archer.range >= zero, "archer.range", "must not be negative")?;
        require(archer.cooldown >= zero, "archer.cooldown", "must not be negative")?;
        require(archer.radius > zero, "archer.radius", "must be positive")?;
        require(archer.projectile_speed > zero, "archer.projectileSpeed", "must be positive")?;

        let projectile = &self.projectile;
        require(projectile.lifetime > zero, "projectile.lifetime", "must be positive")?;
        require(projectile.radius > zero, "projectile.radius", "must be positive")?;
        require(projectile.mass > zero, "projectile.mass", "must be positive")?;
        require(projectile.drag >= zero, "projectile.drag", "must not be negative")?;

        let physics = &self.physics;
        require(physics.fixed_time_step > zero, "physics.fixedTimeStep", "must be positive")?;
        require(physics.cell_size >= Fix64::ONE, "physics.cellSize", "must be at least 1")?;
        require(physics.unit_drag >= zero, "physics.unitDrag", "must not be negative")?;

        Ok(())
    }
}

fn require(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

// =============================================================================
// TESTS
// =============================================================================
