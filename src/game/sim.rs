//! Battle Simulation
//!
//! The authoritative per-tick loop. Must be 100% deterministic:
//! entities update in ascending id order, physics events are consumed in
//! the order the world reports them, despawns drain in id order.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::core::fixed::Fix64;
use crate::core::vec3::FixedVector3;
use crate::physics::body::{BodyType, Collider, PhysicsBody};
use crate::physics::events::{CollisionEvent, ContactPhase};
use crate::physics::layers::{CollisionLayer, CollisionMatrix};
use crate::physics::world::PhysicsWorld;
use super::config::{ConfigError, SimConfig};
use super::entity::{
    opponent, EntityId, EntityKind, EntityType, GameEntity, Owner, ProjectileState, UnitClass, UnitState,
};
use super::projectile;
use super::snapshot::{Snapshot, SnapshotEntity};
use super::unit;

/// Spacing between units of the same initial wave.
pub const WAVE_SPACING: Fix64 = Fix64::from_ratio(3, 2);

/// Simulation errors.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Owner outside {0, 1}.
    #[error("Invalid owner: {0}")]
    InvalidOwner(Owner),

    /// No live entity with this id.
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// Configuration rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// How the match stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Both towers standing
    InProgress,
    /// The given side's tower still stands, the other fell
    Winner(Owner),
    /// Both towers fell in the same tick
    BothTowersDown,
}

impl MatchOutcome {
    /// Whether the match is decided one way or another.
    pub fn is_over(self) -> bool {
        !matches!(self, MatchOutcome::InProgress)
    }
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Physics frame after the tick
    pub frame: u64,
    /// Collision events raised by this tick's physics step
    pub events: Vec<CollisionEvent>,
    /// Entities removed at the end of the tick, ascending
    pub despawned: Vec<EntityId>,
}

/// One match.
#[derive(Clone, Debug)]
pub struct BattleSim {
    config: SimConfig,
    world: PhysicsWorld,
    entities: BTreeMap<EntityId, GameEntity>,
    despawn_buffer: Vec<EntityId>,
    towers: [EntityId; 2],
}

impl BattleSim {
    /// Validate the config, place the towers and spawn the initial waves.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let world = PhysicsWorld::with_settings(config.physics.settings(), CollisionMatrix::lane_battle());
        let mut sim = Self {
            config,
            world,
            entities: BTreeMap::new(),
            despawn_buffer: Vec::new(),
            towers: [0; 2],
        };

        sim.towers = [sim.spawn_tower(0), sim.spawn_tower(1)];
        sim.spawn_initial_waves()?;

        info!(
            "Battle created: {} entities, melee {}/side, archers {}/side",
            sim.entities.len(),
            sim.config.melee.count_per_side,
            sim.config.archer.count_per_side
        );

        Ok(sim)
    }

    // =========================================================================
    // SPAWNING
    // =========================================================================

    fn spawn_tower(&mut self, owner: Owner) -> EntityId {
        let half_width = self.config.map.width * Fix64::HALF;
        let gap = self.config.towers.half_gap_to_edge;
        let x = if owner == 0 { -half_width + gap } else { half_width - gap };

        let body = PhysicsBody::new(BodyType::Static, Collider::cuboid(self.config.towers.size))
            .with_position(FixedVector3::new(x, self.config.map.lane_y, Fix64::ZERO))
            .with_layer(CollisionLayer::TOWER);

        self.register(body, GameEntity::tower(owner, self.config.towers.hp))
    }

    fn spawn_initial_waves(&mut self) -> Result<(), SimError> {
        for i in 0..self.config.melee.count_per_side {
            let offset = WAVE_SPACING * Fix64::from_int(i as i32);
            self.spawn_unit(false, 0, Fix64::ZERO, offset)?;
            self.spawn_unit(false, 1, Fix64::ZERO, offset)?;
        }
        for i in 0..self.config.archer.count_per_side {
            let offset = WAVE_SPACING * Fix64::from_int(i as i32);
            self.spawn_unit(true, 0, Fix64::ZERO, offset)?;
            self.spawn_unit(true, 1, Fix64::ZERO, offset)?;
        }
        Ok(())
    }

    /// Spawn a unit at its side's tower line, `extra_offset_x` further
    /// down the lane and `lane_offset_z` across it.
    pub fn spawn_unit(
        &mut self,
        is_archer: bool,
        owner: Owner,
        lane_offset_z: Fix64,
        extra_offset_x: Fix64,
    ) -> Result<EntityId, SimError> {
        if owner > 1 {
            return Err(SimError::InvalidOwner(owner));
        }

        let half_width = self.config.map.width * Fix64::HALF;
        let gap = self.config.towers.half_gap_to_edge;
        let (start_x, move_dir) = if owner == 0 {
            (-half_width + gap + extra_offset_x, FixedVector3::RIGHT)
        } else {
            (half_width - gap - extra_offset_x, FixedVector3::LEFT)
        };

        let (state, hp, radius) = if is_archer {
            let archer = &self.config.archer;
            let state = UnitState {
                class: UnitClass::Archer { projectile_speed: archer.projectile_speed },
                speed: archer.speed,
                range: archer.range,
                damage: archer.damage,
                cooldown: archer.cooldown,
                cooldown_timer: Fix64::ZERO,
                move_dir,
            };
            (state, archer.hp, archer.radius)
        } else {
            let melee = &self.config.melee;
            let state = UnitState {
                class: UnitClass::Melee,
                speed: melee.speed,
                range: melee.range,
                damage: melee.damage,
                cooldown: melee.cooldown,
                cooldown_timer: Fix64::ZERO,
                move_dir,
            };
            (state, melee.hp, melee.radius)
        };

        let body = PhysicsBody::new(BodyType::Dynamic, Collider::sphere(radius))
            .with_position(FixedVector3::new(start_x, self.config.map.lane_y, lane_offset_z))
            .with_layer(CollisionLayer::UNIT)
            .with_drag(self.config.physics.unit_drag);

        Ok(self.register(body, GameEntity::unit(owner, hp, state)))
    }

    /// Launch a projectile owned by `owner_unit`'s side.
    ///
    /// The body is a trigger sphere moving at `direction * speed`.
    pub fn spawn_projectile(
        &mut self,
        owner_unit: EntityId,
        target: Option<EntityId>,
        origin: FixedVector3,
        direction: FixedVector3,
        speed: Fix64,
        damage: Fix64,
    ) -> Result<EntityId, SimError> {
        let owner = self
            .entities
            .get(&owner_unit)
            .map(|e| e.owner)
            .ok_or(SimError::UnknownEntity(owner_unit))?;

        let settings = &self.config.projectile;
        let state = ProjectileState {
            damage,
            remaining_life: settings.lifetime,
            target_owner: opponent(owner),
            target,
            spent: false,
        };

        let body = PhysicsBody::new(BodyType::Dynamic, Collider::sphere(settings.radius))
            .with_position(origin)
            .with_velocity(direction * speed)
            .with_layer(CollisionLayer::PROJECTILE)
            .with_trigger(true)
            .with_mass(settings.mass)
            .with_drag(settings.drag);

        Ok(self.register(body, GameEntity::projectile(owner, state)))
    }

    fn register(&mut self, body: PhysicsBody, mut entity: GameEntity) -> EntityId {
        let id = self.world.add_body(body);
        entity.bind_id(id);
        entity.on_added();
        self.entities.insert(id, entity);
        id
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Advance the match by one tick.
    pub fn tick(&mut self) -> TickResult {
        // Snapshot ids first: entities spawned this tick wait for the next one
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();

        for id in ids {
            let Some(entity) = self.entities.get(&id) else {
                continue;
            };
            if entity.despawn_pending {
                continue;
            }
            let kind = entity.kind;
            match kind {
                EntityKind::Tower => {}
                EntityKind::Unit(_) => unit::tick_unit(self, id),
                EntityKind::Projectile(_) => projectile::tick_projectile(self, id),
            }
        }

        let report = self.world.step();

        for event in &report.events {
            if event.is_trigger() && event.phase() != ContactPhase::Exit {
                self.dispatch_trigger(event);
            }
        }

        let despawned = self.drain_despawns();

        TickResult {
            frame: report.frame,
            events: report.events,
            despawned,
        }
    }

    fn dispatch_trigger(&mut self, event: &CollisionEvent) {
        let is_projectile = |id: EntityId| {
            self.entities
                .get(&id)
                .is_some_and(|e| e.entity_type == EntityType::Projectile)
        };
        let (a_is_projectile, b_is_projectile) = (is_projectile(event.body_a), is_projectile(event.body_b));

        if a_is_projectile {
            projectile::on_trigger(self, event.body_a, event.body_b);
        } else if b_is_projectile {
            projectile::on_trigger(self, event.body_b, event.body_a);
        }
    }

    fn drain_despawns(&mut self) -> Vec<EntityId> {
        let mut buffer = std::mem::take(&mut self.despawn_buffer);
        buffer.sort_unstable();
        buffer.dedup();

        let mut removed = Vec::with_capacity(buffer.len());
        for id in buffer {
            let Some(entity) = self.entities.remove(&id) else {
                continue;
            };
            self.world.remove_body(id);
            entity.on_removed();
            removed.push(id);
        }
        removed
    }

    // =========================================================================
    // ENTITY OPERATIONS
    // =========================================================================

    /// Schedule removal at the end of the tick. Idempotent.
    pub(crate) fn mark_for_despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            if entity.mark_despawn() {
                self.despawn_buffer.push(id);
            }
        }
    }

    /// Damage an entity, scheduling its removal when HP reaches zero.
    pub(crate) fn damage_entity(&mut self, id: EntityId, damage: Fix64) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if entity.apply_damage(damage) {
            debug!(id, owner = entity.owner, kind = ?entity.entity_type, "Entity destroyed");
            self.mark_for_despawn(id);
        }
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut GameEntity> {
        self.entities.get_mut(&id)
    }

    pub(crate) fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// Seconds per tick.
    pub fn dt(&self) -> Fix64 {
        self.world.dt()
    }

    /// Nearest active enemy of `seeker` within `range`.
    ///
    /// Skips the seeker's own side, projectiles and entities pending
    /// despawn. Distance ties go to the lower id.
    pub fn find_nearest_enemy(&self, seeker: EntityId, range: Fix64) -> Option<EntityId> {
        let owner = self.entities.get(&seeker)?.owner;
        let origin = self.world.body(seeker)?.world_position();
        let range_sqr = range * range;

        let mut best: Option<(EntityId, Fix64)> = None;
        for (&id, entity) in &self.entities {
            if entity.owner == owner || entity.entity_type == EntityType::Projectile || !entity.is_active() {
                continue;
            }
            let Some(body) = self.world.body(id) else {
                continue;
            };

            let dist_sqr = origin.distance_sqr(body.world_position());
            if dist_sqr > range_sqr {
                continue;
            }
            // Ascending iteration: strict < keeps the lower id on ties
            if best.map_or(true, |(_, best_sqr)| dist_sqr < best_sqr) {
                best = Some((id, dist_sqr));
            }
        }

        best.map(|(id, _)| id)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Look up a live entity.
    pub fn entity(&self, id: EntityId) -> Option<&GameEntity> {
        self.entities.get(&id)
    }

    /// All live entities, ascending id.
    pub fn entities(&self) -> impl Iterator<Item = &GameEntity> + '_ {
        self.entities.values()
    }

    /// The physics world.
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// The match configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Physics frame.
    pub fn frame(&self) -> u64 {
        self.world.frame()
    }

    /// Tower entity id for a side (the entity may already be removed).
    pub fn tower(&self, owner: Owner) -> Option<EntityId> {
        self.towers.get(owner as usize).copied()
    }

    /// Tower HP for a side; zero once the tower is gone.
    pub fn tower_hp(&self, owner: Owner) -> Fix64 {
        self.tower(owner)
            .and_then(|id| self.entities.get(&id))
            .map_or(Fix64::ZERO, |tower| tower.hp)
    }

    /// Current match outcome.
    pub fn outcome(&self) -> MatchOutcome {
        let left_down = self.tower_hp(0).is_zero();
        let right_down = self.tower_hp(1).is_zero();
        match (left_down, right_down) {
            (false, false) => MatchOutcome::InProgress,
            (true, true) => MatchOutcome::BothTowersDown,
            (true, false) => MatchOutcome::Winner(1),
            (false, true) => MatchOutcome::Winner(0),
        }
    }

    /// Per-tick snapshot of every live entity.
    pub fn build_snapshot(&self) -> Snapshot {
        let entities = self
            .entities
            .values()
            .filter(|e| e.is_alive())
            .filter_map(|e| {
                let body = self.world.body(e.id)?;
                let position = body.world_position();
                Some(SnapshotEntity {
                    id: e.id,
                    entity_type: e.entity_type,
                    owner: e.owner,
                    px: position.x.raw(),
                    py: position.y.raw(),
                    pz: position.z.raw(),
                    vx: body.velocity.x.raw(),
                    vy: body.velocity.y.raw(),
                    vz: body.velocity.z.raw(),
                    hp: e.hp.raw(),
                })
            })
            .collect();

        let winner = match self.outcome() {
            MatchOutcome::Winner(side) => side as i32,
            MatchOutcome::InProgress | MatchOutcome::BothTowersDown => -1,
        };

        Snapshot {
            frame: self.world.frame(),
            winner,
            entities,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(v: f64) -> Fix64 {
        Fix64::from_f64(v).unwrap()
    }

    fn config(melee: u32, archers: u32) -> SimConfig {
        let mut config = SimConfig::default();
        config.melee.count_per_side = melee;
        config.archer.count_per_side = archers;
        config
    }

    fn run_until<F: Fn(&BattleSim) -> bool>(sim: &mut BattleSim, max_ticks: usize, done: F) -> usize {
        for n in 1..=max_ticks {
            sim.tick();
            if done(sim) {
                return n;
            }
        }
        panic!("condition not reached within {} ticks", max_ticks);
    }

    #[test]
    fn test_new_places_towers() {
        let sim = BattleSim::new(config(0, 0)).unwrap();
        assert_eq!(sim.tower(0), Some(1));
        assert_eq!(sim.tower(1), Some(2));

        let left = sim.world().body(1).unwrap();
        let right = sim.world().body(2).unwrap();
        assert_eq!(left.position.x, Fix64::from_int(-12));
        assert_eq!(right.position.x, Fix64::from_int(12));
        assert_eq!(left.body_type, BodyType::Static);
        assert_eq!(sim.entity(2).unwrap().hp, Fix64::from_int(500));
        assert_eq!(sim.outcome(), MatchOutcome::InProgress);
    }

    #[test]
    fn test_initial_wave_order_and_offsets() {
        let sim = BattleSim::new(config(2, 1)).unwrap();
        let types: Vec<(EntityId, EntityType, Owner)> =
            sim.entities().map(|e| (e.id, e.entity_type, e.owner)).collect();
        assert_eq!(
            types,
            vec![
                (1, EntityType::Tower, 0),
                (2, EntityType::Tower, 1),
                (3, EntityType::Melee, 0),
                (4, EntityType::Melee, 1),
                (5, EntityType::Melee, 0),
                (6, EntityType::Melee, 1),
                (7, EntityType::Archer, 0),
                (8, EntityType::Archer, 1),
            ]
        );

        let x = |id| sim.world().body(id).unwrap().position.x;
        assert_eq!(x(3), Fix64::from_int(-12));
        assert_eq!(x(4), Fix64::from_int(12));
        assert_eq!(x(5), fx(-10.5));
        assert_eq!(x(6), fx(10.5));
        assert_eq!(sim.entity(3).unwrap().as_unit().unwrap().move_dir, FixedVector3::RIGHT);
        assert_eq!(sim.entity(4).unwrap().as_unit().unwrap().move_dir, FixedVector3::LEFT);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = SimConfig::default();
        bad.map.width = Fix64::ZERO;
        assert!(matches!(BattleSim::new(bad), Err(SimError::Config(_))));
    }

    #[test]
    fn test_spawn_errors() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        assert!(matches!(
            sim.spawn_unit(false, 2, Fix64::ZERO, Fix64::ZERO),
            Err(SimError::InvalidOwner(2))
        ));
        assert!(matches!(
            sim.spawn_projectile(99, None, FixedVector3::ZERO, FixedVector3::RIGHT, Fix64::ONE, Fix64::ONE),
            Err(SimError::UnknownEntity(99))
        ));
    }

    #[test]
    fn test_units_march_toward_enemy() {
        let mut sim = BattleSim::new(config(1, 0)).unwrap();
        sim.tick();
        let left = sim.world().body(3).unwrap();
        let right = sim.world().body(4).unwrap();
        assert!(left.velocity.x > Fix64::ZERO);
        assert!(right.velocity.x < Fix64::ZERO);
        assert_eq!(left.velocity.x, -right.velocity.x);
        assert!(left.position.x > Fix64::from_int(-12));
    }

    #[test]
    fn test_melee_duel_and_tower_siege() {
        let mut sim = BattleSim::new(config(1, 0)).unwrap();

        // Lower id strikes first each exchange, so the left unit survives
        run_until(&mut sim, 1000, |s| s.entity(4).is_none());
        let survivor = sim.entity(3).unwrap();
        assert_eq!(survivor.hp, Fix64::from_int(20));

        let mut hits = 0;
        let mut last_hp = sim.tower_hp(1);
        for _ in 0..4000 {
            sim.tick();
            let hp = sim.tower_hp(1);
            if hp != last_hp {
                assert_eq!(last_hp - hp, Fix64::from_int(20));
                hits += 1;
                last_hp = hp;
            }
            let snapshot = sim.build_snapshot();
            if hp.is_zero() {
                assert_eq!(snapshot.winner, 0);
                break;
            }
            assert_eq!(snapshot.winner, -1);
        }

        assert_eq!(hits, 25);
        assert_eq!(sim.outcome(), MatchOutcome::Winner(0));
        assert!(sim.entity(2).is_none());
        assert_eq!(sim.tower_hp(0), Fix64::from_int(500));
    }

    #[test]
    fn test_archer_projectile_hits_tower() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        let archer = sim.spawn_unit(true, 0, Fix64::ZERO, Fix64::from_int(20)).unwrap();
        assert_eq!(sim.world().body(archer).unwrap().position.x, Fix64::from_int(8));

        sim.tick();
        let projectile = archer + 1;
        let body = sim.world().body(projectile).unwrap();
        assert_eq!(body.velocity, FixedVector3::new(Fix64::from_int(12), Fix64::ZERO, Fix64::ZERO));
        assert!(body.is_trigger);
        assert_eq!(sim.entity(projectile).unwrap().as_projectile().unwrap().target, Some(2));

        let step = Fix64::from_int(12) * sim.dt();
        let mut last_x = body.position.x;
        while sim.entity(projectile).is_some() {
            sim.tick();
            if let Some(body) = sim.world().body(projectile) {
                assert_eq!(body.position.x - last_x, step);
                last_x = body.position.x;
            }
            assert!(sim.frame() < 100);
        }

        assert_eq!(sim.tower_hp(1), Fix64::from_int(485));
    }

    #[test]
    fn test_projectile_expires() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        let shooter = sim.tower(0).unwrap();
        let projectile = sim
            .spawn_projectile(shooter, None, FixedVector3::ZERO, FixedVector3::FORWARD, Fix64::ONE, Fix64::ONE)
            .unwrap();

        for _ in 0..290 {
            sim.tick();
        }
        assert!(sim.entity(projectile).is_some());

        for _ in 0..20 {
            sim.tick();
        }
        assert!(sim.entity(projectile).is_none());
        assert!(!sim.world().contains(projectile));
    }

    #[test]
    fn test_projectile_damages_once() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        let a = sim.spawn_unit(false, 1, Fix64::ZERO, Fix64::from_int(10)).unwrap();
        let b = sim.spawn_unit(false, 1, Fix64::ZERO, Fix64::from_int(10)).unwrap();
        assert_eq!(sim.world().body(a).unwrap().position.x, Fix64::from_int(2));

        let shooter = sim.tower(0).unwrap();
        let projectile = sim
            .spawn_projectile(
                shooter,
                None,
                FixedVector3::from_ints(2, 0, 0),
                FixedVector3::RIGHT,
                Fix64::ZERO,
                Fix64::from_int(7),
            )
            .unwrap();

        let result = sim.tick();
        assert!(result.despawned.contains(&projectile));

        let lost = |id| Fix64::from_int(100) - sim.entity(id).unwrap().hp;
        assert_eq!(lost(a) + lost(b), Fix64::from_int(7));
    }

    #[test]
    fn test_same_owner_overlap_ignored() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        let friend = sim.spawn_unit(false, 0, Fix64::ZERO, Fix64::from_int(10)).unwrap();
        let origin = sim.world().body(friend).unwrap().position;
        let projectile = sim
            .spawn_projectile(friend, None, origin, FixedVector3::RIGHT, Fix64::ZERO, Fix64::from_int(7))
            .unwrap();

        sim.tick();
        assert_eq!(sim.entity(friend).unwrap().hp, Fix64::from_int(100));
        assert!(sim.entity(projectile).is_some());
    }

    #[test]
    fn test_find_nearest_enemy_tie_breaks_by_id() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        let seeker = sim.spawn_unit(false, 0, Fix64::ZERO, Fix64::from_int(12)).unwrap();
        // Two enemies equally far, one on each side across the lane
        let first = sim.spawn_unit(false, 1, Fix64::ONE, Fix64::from_int(12)).unwrap();
        let second = sim.spawn_unit(false, 1, -Fix64::ONE, Fix64::from_int(12)).unwrap();

        assert_eq!(sim.find_nearest_enemy(seeker, Fix64::from_int(2)), Some(first));
        assert_eq!(sim.find_nearest_enemy(seeker, Fix64::HALF), None);

        sim.mark_for_despawn(first);
        assert_eq!(sim.find_nearest_enemy(seeker, Fix64::from_int(2)), Some(second));
    }

    #[test]
    fn test_far_enemy_never_in_range() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        // 80 000 units apart across the lane: the squared distance saturates
        let seeker = sim.spawn_unit(false, 0, Fix64::from_int(40_000), Fix64::from_int(12)).unwrap();
        let enemy = sim.spawn_unit(false, 1, Fix64::from_int(-40_000), Fix64::from_int(12)).unwrap();

        for _ in 0..120 {
            sim.tick();
            assert_eq!(sim.find_nearest_enemy(seeker, Fix64::from_ratio(3, 2)), None);
            assert_eq!(sim.find_nearest_enemy(enemy, Fix64::from_ratio(3, 2)), None);
        }

        assert_eq!(sim.entity(enemy).unwrap().hp, Fix64::from_int(100));
        assert_eq!(sim.entity(seeker).unwrap().hp, Fix64::from_int(100));
        assert!(sim.world().body(seeker).unwrap().velocity.x > Fix64::ZERO);
    }

    #[test]
    fn test_snapshot_contents() {
        let mut sim = BattleSim::new(config(1, 1)).unwrap();
        sim.tick();
        let snapshot = sim.build_snapshot();

        assert_eq!(snapshot.frame, 1);
        assert_eq!(snapshot.winner, -1);
        let ids: Vec<EntityId> = snapshot.entities.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        let tower = &snapshot.entities[0];
        assert_eq!(tower.entity_type, EntityType::Tower);
        assert_eq!(tower.px, Fix64::from_int(-12).raw());
        assert_eq!(tower.hp, Fix64::from_int(500).raw());

        let unit = &snapshot.entities[2];
        let body = sim.world().body(unit.id).unwrap();
        assert_eq!(unit.vx, body.velocity.x.raw());
        assert_eq!(unit.px, body.world_position().x.raw());
    }

    #[test]
    fn test_both_towers_down_is_unresolved() {
        let mut sim = BattleSim::new(config(0, 0)).unwrap();
        sim.damage_entity(1, Fix64::from_int(500));
        sim.damage_entity(2, Fix64::from_int(500));
        assert_eq!(sim.outcome(), MatchOutcome::BothTowersDown);
        assert!(sim.outcome().is_over());
        assert_eq!(sim.build_snapshot().winner, -1);

        let result = sim.tick();
        assert_eq!(result.despawned, vec![1, 2]);
        assert_eq!(sim.outcome(), MatchOutcome::BothTowersDown);
    }

    #[test]
    fn test_deterministic_snapshots() {
        let run = || {
            let mut sim = BattleSim::new(config(3, 2)).unwrap();
            (0..900).map(|_| {
                sim.tick();
                sim.build_snapshot()
            }).collect::<Vec<_>>()
        };
        let a = run();
        let b = run();
        assert_eq!(a, b);
        assert_eq!(a.last().unwrap().state_hash(), b.last().unwrap().state_hash());
    }
}
