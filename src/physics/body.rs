//! Physics Bodies
//!
//! Rigid bodies owned by [`PhysicsWorld`](super::world::PhysicsWorld).
//! Position only, no rotational dynamics beyond integrating a rotation vector.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fix64;
use crate::core::vec3::FixedVector3;
use super::geometry::{build_aabb, Aabb};
use super::layers::CollisionLayer;

/// Body identifier, assigned by the world. Starts at 1, never reused.
pub type BodyId = u32;

/// How a body participates in integration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves
    Static,
    /// Moves by velocity, ignores gravity
    Kinematic,
    /// Moves by velocity and gravity
    Dynamic,
}

/// Collider shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Axis-aligned box, `size` is the full extent
    Box,
    /// Sphere, radius in `size.x`
    Sphere,
}

/// Shape, extent and offset of a body's collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collider {
    /// Shape
    pub shape: ColliderShape,
    /// Box: full size. Sphere: radius in x.
    pub size: FixedVector3,
    /// Offset from the body position
    pub center: FixedVector3,
}

impl Collider {
    /// Box collider with the given full size.
    pub fn cuboid(size: FixedVector3) -> Self {
        Self { shape: ColliderShape::Box, size, center: FixedVector3::ZERO }
    }

    /// Sphere collider with the given radius.
    pub fn sphere(radius: Fix64) -> Self {
        Self {
            shape: ColliderShape::Sphere,
            size: FixedVector3::new(radius, radius, radius),
            center: FixedVector3::ZERO,
        }
    }

    /// Sphere radius (meaningless for boxes).
    #[inline]
    pub fn radius(&self) -> Fix64 {
        self.size.x
    }
}

/// Default linear and angular drag (0.1).
pub const DEFAULT_DRAG: Fix64 = Fix64::from_ratio(1, 10);

/// A simulated body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    /// Assigned on insertion into a world
    pub id: BodyId,
    /// Static / kinematic / dynamic
    pub body_type: BodyType,
    /// Collider
    pub collider: Collider,
    /// Collision layer
    pub layer: CollisionLayer,
    /// Triggers raise events but are never resolved
    pub is_trigger: bool,
    /// Position (collider center is added on top)
    pub position: FixedVector3,
    /// Euler rotation, integrated but not used for collision
    pub rotation: FixedVector3,
    /// Linear velocity
    pub velocity: FixedVector3,
    /// Angular velocity
    pub angular_velocity: FixedVector3,
    /// Mass
    pub mass: Fix64,
    /// Linear drag
    pub drag: Fix64,
    /// Angular drag
    pub angular_drag: Fix64,
    /// Apply world gravity (dynamic bodies only)
    pub use_gravity: bool,
    /// Cached bounds, refreshed every step
    pub aabb: Aabb,
}

impl PhysicsBody {
    /// Create a body at the origin with default mass and drag.
    pub fn new(body_type: BodyType, collider: Collider) -> Self {
        let mut body = Self {
            id: 0,
            body_type,
            collider,
            layer: CollisionLayer::DEFAULT,
            is_trigger: false,
            position: FixedVector3::ZERO,
            rotation: FixedVector3::ZERO,
            velocity: FixedVector3::ZERO,
            angular_velocity: FixedVector3::ZERO,
            mass: Fix64::ONE,
            drag: DEFAULT_DRAG,
            angular_drag: DEFAULT_DRAG,
            use_gravity: false,
            aabb: Aabb::default(),
        };
        body.refresh_aabb();
        body
    }

    /// Set position.
    pub fn with_position(mut self, position: FixedVector3) -> Self {
        self.position = position;
        self.refresh_aabb();
        self
    }

    /// Set velocity.
    pub fn with_velocity(mut self, velocity: FixedVector3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set layer.
    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.layer = layer;
        self
    }

    /// Set trigger flag.
    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Set mass.
    pub fn with_mass(mut self, mass: Fix64) -> Self {
        self.mass = mass;
        self
    }

    /// Set linear drag.
    pub fn with_drag(mut self, drag: Fix64) -> Self {
        self.drag = drag;
        self
    }

    /// Enable or disable gravity.
    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    /// Position of the collider center.
    #[inline]
    pub fn world_position(&self) -> FixedVector3 {
        self.position + self.collider.center
    }

    /// Recompute the cached AABB from the current position.
    #[inline]
    pub fn refresh_aabb(&mut self) {
        self.aabb = build_aabb(self);
    }

    /// Whether this body is static.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }
}

// =============================================================================
// TESTS
// =============================================================================
