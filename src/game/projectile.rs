//! Projectile Behavior

use tracing::debug;

use crate::core::fixed::Fix64;
use super::entity::EntityId;
use super::sim::BattleSim;

/// Burn lifetime; despawn once it runs out.
pub(crate) fn tick_projectile(sim: &mut BattleSim, id: EntityId) {
    let dt = sim.dt();
    let Some(state) = sim.entity_mut(id).and_then(|e| e.as_projectile_mut()) else {
        return;
    };

    state.remaining_life -= dt;
    if state.remaining_life <= Fix64::ZERO {
        sim.mark_for_despawn(id);
    }
}

/// Handle a trigger overlap between projectile `id` and body `other`.
///
/// Enemy hit: damage once, then despawn. Friendly or unknown bodies are
/// ignored, as is anything after the first hit.
pub(crate) fn on_trigger(sim: &mut BattleSim, id: EntityId, other: EntityId) {
    let Some(projectile) = sim.entity(id) else {
        return;
    };
    let owner = projectile.owner;
    let Some(state) = projectile.as_projectile().copied() else {
        return;
    };
    if state.spent || projectile.despawn_pending {
        return;
    }

    let Some(other_owner) = sim.entity(other).map(|e| e.owner) else {
        return;
    };
    if other_owner == owner {
        return;
    }

    debug!(projectile = id, target = other, damage = %state.damage, "Projectile hit");
    sim.damage_entity(other, state.damage);

    if let Some(state) = sim.entity_mut(id).and_then(|e| e.as_projectile_mut()) {
        state.spent = true;
    }
    sim.mark_for_despawn(id);
}

// =============================================================================
// TESTS
// =============================================================================
