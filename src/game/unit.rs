//! Unit Behavior
//!
//! Melee and archer units: cool down, pick the nearest enemy in range,
//! attack it, otherwise march down the lane.

use tracing::warn;

use crate::core::fixed::Fix64;
use crate::core::vec3::FixedVector3;
use super::entity::{EntityId, UnitClass, UnitState};
use super::sim::BattleSim;

/// Run one tick of a unit's behavior.
pub(crate) fn tick_unit(sim: &mut BattleSim, id: EntityId) {
    let dt = sim.dt();
    let Some(mut state) = sim.entity(id).and_then(|e| e.as_unit()).copied() else {
        return;
    };

    if state.cooldown_timer > Fix64::ZERO {
        state.cooldown_timer -= dt;
    }

    let velocity = if engage(sim, id, &mut state) {
        FixedVector3::ZERO
    } else {
        state.move_dir * state.speed
    };

    if let Some(unit) = sim.entity_mut(id).and_then(|e| e.as_unit_mut()) {
        *unit = state;
    }
    if let Some(body) = sim.world_mut().body_mut(id) {
        body.velocity = velocity;
    }
}

/// Attack the nearest enemy in range. Returns false when there is none.
fn engage(sim: &mut BattleSim, id: EntityId, state: &mut UnitState) -> bool {
    let Some(target) = sim.find_nearest_enemy(id, state.range) else {
        return false;
    };
    let (Some(origin), Some(target_pos)) = (body_position(sim, id), body_position(sim, target)) else {
        return false;
    };
    if origin.distance(target_pos) > state.range {
        return false;
    }

    if state.cooldown_timer <= Fix64::ZERO {
        attack(sim, id, target, origin, target_pos, state);
        state.cooldown_timer = state.cooldown;
    }
    true
}

fn attack(
    sim: &mut BattleSim,
    id: EntityId,
    target: EntityId,
    origin: FixedVector3,
    target_pos: FixedVector3,
    state: &UnitState,
) {
    match state.class {
        UnitClass::Melee => sim.damage_entity(target, state.damage),
        UnitClass::Archer { projectile_speed } => {
            let direction = (target_pos - origin).normalized_or(FixedVector3::RIGHT);
            if let Err(e) = sim.spawn_projectile(id, Some(target), origin, direction, projectile_speed, state.damage) {
                warn!("Archer {} failed to fire: {}", id, e);
            }
        }
    }
}

fn body_position(sim: &BattleSim, id: EntityId) -> Option<FixedVector3> {
    sim.world().body(id).map(|body| body.world_position())
}

// =============================================================================
// TESTS
// =============================================================================
