//! Game Logic Module
//!
//! Lane battle rules on top of the physics world. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `config`: Match tuning, JSON loading and validation
//! - `entity`: Towers, units, projectiles
//! - `sim`: Authoritative tick loop, spawning, targeting, outcome
//! - `unit`: Melee and archer behavior
//! - `projectile`: Projectile lifetime and hits
//! - `snapshot`: Per-tick state view and hashing

pub mod config;
pub mod entity;
pub mod sim;
pub mod snapshot;

mod projectile;
mod unit;

// Re-export key types
pub use config::{ConfigError, SimConfig};
pub use entity::{EntityId, EntityKind, EntityType, GameEntity, Owner};
pub use sim::{BattleSim, MatchOutcome, SimError, TickResult};
pub use snapshot::{Snapshot, SnapshotEntity};
