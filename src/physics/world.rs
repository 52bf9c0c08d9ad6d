//! Physics World
//!
//! Owns every body and advances them in fixed steps:
//! Integrate → Broadphase → Narrowphase → Events → Resolve.
//!
//! CRITICAL: Everything here must be deterministic.
//! - Bodies live in an arena; iteration follows arena order
//! - Lookups go through a BTreeMap side table
//! - No floating point

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::fixed::Fix64;
use crate::core::vec3::FixedVector3;
use super::body::{BodyId, BodyType, PhysicsBody};
use super::events::{CollisionEvent, ContactTracker};
use super::geometry::{aabb_overlap, check_collision, CollisionInfo};
use super::grid::SpatialGrid;
use super::layers::CollisionMatrix;

/// What to do with solid contacts after events are raised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionMode {
    /// Contacts are reported only
    #[default]
    Disabled,
    /// Mass-split positional correction plus a restitution impulse
    Impulse {
        /// Bounciness, 0 = inelastic
        restitution: Fix64,
    },
}

/// World tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    /// Acceleration applied to dynamic gravity-enabled bodies
    pub gravity: FixedVector3,
    /// Seconds per step
    pub fixed_time_step: Fix64,
    /// Broadphase cell edge length
    pub cell_size: Fix64,
    /// Contact resolution stage
    pub resolution: ResolutionMode,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: FixedVector3::new(Fix64::ZERO, Fix64::from_ratio(-981, 100), Fix64::ZERO),
            fixed_time_step: Fix64::from_ratio(1, 60),
            cell_size: Fix64::from_int(4),
            resolution: ResolutionMode::Disabled,
        }
    }
}

/// Output of one [`PhysicsWorld::step`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Frame number after the step
    pub frame: u64,
    /// Enter/Stay events followed by Exit events
    pub events: Vec<CollisionEvent>,
    /// Narrowphase hits, duplicates included
    pub contact_count: usize,
}

/// Deterministic rigid-body world.
#[derive(Clone, Debug)]
pub struct PhysicsWorld {
    settings: PhysicsSettings,
    matrix: CollisionMatrix,
    bodies: Vec<PhysicsBody>,
    index: BTreeMap<BodyId, usize>,
    next_id: BodyId,
    frame: u64,
    grid: SpatialGrid,
    candidate_pairs: Vec<(BodyId, BodyId)>,
    contacts: Vec<CollisionInfo>,
    tracker: ContactTracker,
    edited: Vec<BodyId>,
}

impl PhysicsWorld {
    /// World with default settings and the stock lane-battle matrix.
    pub fn new() -> Self {
        Self::with_settings(PhysicsSettings::default(), CollisionMatrix::default())
    }

    /// World with explicit settings and collision policy.
    pub fn with_settings(settings: PhysicsSettings, matrix: CollisionMatrix) -> Self {
        Self {
            grid: SpatialGrid::new(settings.cell_size),
            settings,
            matrix,
            bodies: Vec::with_capacity(128),
            index: BTreeMap::new(),
            next_id: 1,
            frame: 0,
            candidate_pairs: Vec::with_capacity(512),
            contacts: Vec::with_capacity(256),
            tracker: ContactTracker::new(),
            edited: Vec::new(),
        }
    }

    // =========================================================================
    // BODY STORAGE
    // =========================================================================

    /// Insert a body, assigning the next id.
    pub fn add_body(&mut self, mut body: PhysicsBody) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;

        body.id = id;
        body.refresh_aabb();
        self.index.insert(id, self.bodies.len());
        self.bodies.push(body);
        id
    }

    /// Remove a body, returning it. Swap-removes from the arena.
    pub fn remove_body(&mut self, id: BodyId) -> Option<PhysicsBody> {
        let idx = self.index.remove(&id)?;
        let removed = self.bodies.swap_remove(idx);
        if let Some(moved) = self.bodies.get(idx) {
            self.index.insert(moved.id, idx);
        }
        Some(removed)
    }

    /// Look up a body.
    pub fn body(&self, id: BodyId) -> Option<&PhysicsBody> {
        lookup(&self.bodies, &self.index, id)
    }

    /// Look up a body mutably. Its bounds are refreshed on the next step.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut PhysicsBody> {
        let idx = *self.index.get(&id)?;
        let body = self.bodies.get_mut(idx)?;
        self.edited.push(id);
        Some(body)
    }

    /// All bodies in arena order (not id order once removals happen).
    pub fn bodies(&self) -> &[PhysicsBody] {
        &self.bodies
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether a body with this id exists.
    pub fn contains(&self, id: BodyId) -> bool {
        self.index.contains_key(&id)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Steps taken so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds per step.
    pub fn dt(&self) -> Fix64 {
        self.settings.fixed_time_step
    }

    /// Current settings.
    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    /// Collision policy.
    pub fn matrix(&self) -> &CollisionMatrix {
        &self.matrix
    }

    /// Collision policy, editable.
    pub fn matrix_mut(&mut self) -> &mut CollisionMatrix {
        &mut self.matrix
    }

    /// Pairs that were touching at the end of the last step.
    pub fn active_pairs(&self) -> impl Iterator<Item = (BodyId, BodyId)> + '_ {
        self.tracker.active_pairs()
    }

    // =========================================================================
    // STEP
    // =========================================================================

    /// Advance one fixed step and return the events it raised.
    pub fn step(&mut self) -> StepReport {
        self.frame += 1;

        self.integrate();
        self.build_broadphase();
        self.find_contacts();
        let events = self.raise_events();
        self.resolve();

        StepReport {
            frame: self.frame,
            events,
            contact_count: self.contacts.len(),
        }
    }

    fn integrate(&mut self) {
        let dt = self.settings.fixed_time_step;
        let gravity = self.settings.gravity;

        for body in self.bodies.iter_mut() {
            if body.is_static() {
                continue;
            }

            if body.use_gravity && body.body_type == BodyType::Dynamic {
                body.velocity += gravity * dt;
            }

            if body.drag > Fix64::ZERO {
                body.velocity -= body.velocity * body.drag * dt;
            }
            body.position += body.velocity * dt;

            if body.angular_drag > Fix64::ZERO {
                body.angular_velocity -= body.angular_velocity * body.angular_drag * dt;
            }
            body.rotation += body.angular_velocity * dt;

            body.refresh_aabb();
        }
    }

    fn build_broadphase(&mut self) {
        // Statics keep their insertion bounds unless edited via body_mut
        for id in std::mem::take(&mut self.edited) {
            if let Some(&idx) = self.index.get(&id) {
                if let Some(body) = self.bodies.get_mut(idx) {
                    body.refresh_aabb();
                }
            }
        }

        self.grid.clear();
        for body in &self.bodies {
            self.grid.insert_aabb(body.id, &body.aabb);
        }
    }

    fn find_contacts(&mut self) {
        let Self { bodies, index, matrix, grid, candidate_pairs, contacts, .. } = self;
        let bodies: &[PhysicsBody] = bodies;

        contacts.clear();
        grid.query_pairs(candidate_pairs);

        for &(id_a, id_b) in candidate_pairs.iter() {
            let (Some(a), Some(b)) = (lookup(bodies, index, id_a), lookup(bodies, index, id_b)) else {
                continue;
            };

            if !matrix.should_collide(a.layer, b.layer) {
                continue;
            }
            if a.is_static() && b.is_static() {
                continue;
            }
            if !aabb_overlap(a, b) {
                continue;
            }

            if let Some(info) = check_collision(a, b) {
                contacts.push(info);
            }
        }
    }

    fn raise_events(&mut self) -> Vec<CollisionEvent> {
        let Self { bodies, index, tracker, contacts, frame, .. } = self;
        let (bodies, index): (&[PhysicsBody], &BTreeMap<BodyId, usize>) = (bodies, index);

        let events = tracker.update(*frame, contacts, |a, b| {
            let a = lookup(bodies, index, a)?;
            let b = lookup(bodies, index, b)?;
            Some(a.is_trigger || b.is_trigger)
        });

        #[cfg(feature = "debug-tracing")]
        for event in &events {
            trace!(frame = *frame, kind = ?event.kind, a = event.body_a, b = event.body_b, "Collision event");
        }
        #[cfg(not(feature = "debug-tracing"))]
        trace!(frame = *frame, count = events.len(), "Collision events raised");

        events
    }

    fn resolve(&mut self) {
        let ResolutionMode::Impulse { restitution } = self.settings.resolution else {
            return;
        };

        for k in 0..self.contacts.len() {
            let contact = self.contacts[k];
            if contact.is_trigger_pair {
                continue;
            }
            let (Some(&ia), Some(&ib)) = (self.index.get(&contact.body_a), self.index.get(&contact.body_b)) else {
                continue;
            };

            let a = self.bodies[ia].clone();
            let b = self.bodies[ib].clone();

            let total_mass = a.mass + b.mass;
            if total_mass <= Fix64::ZERO {
                continue;
            }

            // Orient the normal from A towards B
            let mut normal = contact.normal;
            if normal.dot(b.world_position() - a.world_position()) < Fix64::ZERO {
                normal = -normal;
            }

            // Positional correction, split by mass
            let move_a = contact.penetration * (b.mass / total_mass);
            let move_b = contact.penetration * (a.mass / total_mass);
            if !a.is_static() {
                self.bodies[ia].position -= normal * move_a;
            }
            if !b.is_static() {
                self.bodies[ib].position += normal * move_b;
            }

            // Velocity impulse, only for approaching bodies
            let separating = (b.velocity - a.velocity).dot(normal);
            if separating <= Fix64::ZERO {
                let impulse = -(Fix64::ONE + restitution) * separating / total_mass;
                if a.body_type == BodyType::Dynamic {
                    self.bodies[ia].velocity -= normal * impulse * b.mass;
                }
                if b.body_type == BodyType::Dynamic {
                    self.bodies[ib].velocity += normal * impulse * a.mass;
                }
            }

            self.bodies[ia].refresh_aabb();
            self.bodies[ib].refresh_aabb();
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn lookup<'a>(bodies: &'a [PhysicsBody], index: &BTreeMap<BodyId, usize>, id: BodyId) -> Option<&'a PhysicsBody> {
    index.get(&id).and_then(|&idx| bodies.get(idx))
}

// =============================================================================
// TESTS
// =============================================================================
