//! Collision Geometry
//!
//! Bounding boxes and exact narrowphase tests for box and sphere colliders.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fix64;
use crate::core::vec3::FixedVector3;
use super::body::{BodyId, ColliderShape, PhysicsBody};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: FixedVector3,
    /// Maximum corner
    pub max: FixedVector3,
}

impl Aabb {
    /// Box centered on `center` with the given half extents.
    #[inline]
    pub fn from_center(center: FixedVector3, half_extents: FixedVector3) -> Self {
        Self { min: center - half_extents, max: center + half_extents }
    }

    /// Inclusive overlap test; touching faces count.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x || self.min.x > other.max.x
            || self.max.y < other.min.y || self.min.y > other.max.y
            || self.max.z < other.min.z || self.min.z > other.max.z)
    }
}

/// Result of a successful narrowphase test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionInfo {
    /// First body, as passed to the test
    pub body_a: BodyId,
    /// Second body, as passed to the test
    pub body_b: BodyId,
    /// Contact point in world space
    pub contact_point: FixedVector3,
    /// Unit contact normal
    pub normal: FixedVector3,
    /// Penetration depth along the normal
    pub penetration: Fix64,
    /// Either body is a trigger
    pub is_trigger_pair: bool,
}

/// Compute the bounds of a body at its current position.
///
/// Spheres use a cube of half-extent `radius`, boxes half their size.
pub fn build_aabb(body: &PhysicsBody) -> Aabb {
    let center = body.world_position();
    let half = match body.collider.shape {
        ColliderShape::Sphere => {
            let r = body.collider.radius();
            FixedVector3::new(r, r, r)
        }
        ColliderShape::Box => body.collider.size * Fix64::HALF,
    };
    Aabb::from_center(center, half)
}

/// Overlap test on the cached bounds of two bodies.
#[inline]
pub fn aabb_overlap(a: &PhysicsBody, b: &PhysicsBody) -> bool {
    a.aabb.overlaps(&b.aabb)
}

/// Exact collision test between two bodies.
///
/// Returns `None` when the shapes do not overlap. `body_a`/`body_b` in the
/// result always match the argument order.
pub fn check_collision(a: &PhysicsBody, b: &PhysicsBody) -> Option<CollisionInfo> {
    let pos_a = a.world_position();
    let pos_b = b.world_position();
    let is_trigger_pair = a.is_trigger || b.is_trigger;

    let hit = match (a.collider.shape, b.collider.shape) {
        (ColliderShape::Box, ColliderShape::Box) => box_box(a, b, pos_a, pos_b),
        (ColliderShape::Sphere, ColliderShape::Sphere) => sphere_sphere(a, b, pos_a, pos_b),
        (ColliderShape::Box, ColliderShape::Sphere) => box_sphere(a, b, pos_a, pos_b),
        (ColliderShape::Sphere, ColliderShape::Box) => {
            // Evaluate as box-sphere, then flip back to caller order
            box_sphere(b, a, pos_b, pos_a).map(|contact| Contact {
                normal: -contact.normal,
                ..contact
            })
        }
    }?;

    Some(CollisionInfo {
        body_a: a.id,
        body_b: b.id,
        contact_point: hit.contact_point,
        normal: hit.normal,
        penetration: hit.penetration,
        is_trigger_pair,
    })
}

/// Shape-level contact before ids are attached.
#[derive(Clone, Copy)]
struct Contact {
    contact_point: FixedVector3,
    normal: FixedVector3,
    penetration: Fix64,
}

fn box_box(a: &PhysicsBody, b: &PhysicsBody, pos_a: FixedVector3, pos_b: FixedVector3) -> Option<Contact> {
    let half_a = a.collider.size * Fix64::HALF;
    let half_b = b.collider.size * Fix64::HALF;

    let delta = pos_b - pos_a;
    let overlap = half_a + half_b - delta.abs();

    if overlap.x <= Fix64::ZERO || overlap.y <= Fix64::ZERO || overlap.z <= Fix64::ZERO {
        return None;
    }

    // Strict comparisons: ties resolve to x, then y, then z
    let axis_normal = |d: Fix64, axis: FixedVector3| if d > Fix64::ZERO { -axis } else { axis };

    let mut penetration = overlap.x;
    let mut normal = axis_normal(delta.x, FixedVector3::RIGHT);
    if overlap.y < penetration {
        penetration = overlap.y;
        normal = axis_normal(delta.y, FixedVector3::UP);
    }
    if overlap.z < penetration {
        penetration = overlap.z;
        normal = axis_normal(delta.z, FixedVector3::FORWARD);
    }

    Some(Contact {
        contact_point: pos_a + delta * Fix64::HALF,
        normal,
        penetration,
    })
}

fn sphere_sphere(a: &PhysicsBody, b: &PhysicsBody, pos_a: FixedVector3, pos_b: FixedVector3) -> Option<Contact> {
    let ra = a.collider.radius();
    let rb = b.collider.radius();
    let rsum = ra + rb;

    let delta = pos_b - pos_a;
    let dist2 = delta.sqr_magnitude();
    if dist2 >= rsum * rsum {
        return None;
    }

    let dist = dist2.sqrt();
    let normal = if dist > Fix64::ZERO { delta / dist } else { FixedVector3::RIGHT };

    Some(Contact {
        contact_point: pos_a + normal * ra,
        normal,
        penetration: rsum - dist,
    })
}

fn box_sphere(
    boxed: &PhysicsBody,
    sphere: &PhysicsBody,
    box_pos: FixedVector3,
    sphere_pos: FixedVector3,
) -> Option<Contact> {
    let half = boxed.collider.size * Fix64::HALF;
    let r = sphere.collider.radius();

    let closest = FixedVector3::new(
        sphere_pos.x.clamp(box_pos.x - half.x, box_pos.x + half.x),
        sphere_pos.y.clamp(box_pos.y - half.y, box_pos.y + half.y),
        sphere_pos.z.clamp(box_pos.z - half.z, box_pos.z + half.z),
    );

    let delta = sphere_pos - closest;
    let dist2 = delta.sqr_magnitude();
    if dist2 >= r * r {
        return None;
    }

    let dist = dist2.sqrt();
    let normal = if dist > Fix64::ZERO { delta / dist } else { FixedVector3::UP };

    Some(Contact {
        contact_point: closest,
        normal,
        penetration: r - dist,
    })
}

// =============================================================================
// TESTS
// =============================================================================
