//! Deterministic physics.
//!
//! Bodies, collision geometry, the grid broadphase, the layer policy and the
//! world that steps them. Game rules live in [`crate::game`].

pub mod body;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod layers;
pub mod world;

pub use body::{BodyId, BodyType, Collider, ColliderShape, PhysicsBody};
pub use events::{CollisionEvent, CollisionEventKind, ContactPhase};
pub use geometry::{Aabb, CollisionInfo};
pub use grid::SpatialGrid;
pub use layers::{CollisionLayer, CollisionMatrix};
pub use world::{PhysicsSettings, PhysicsWorld, ResolutionMode, StepReport};
