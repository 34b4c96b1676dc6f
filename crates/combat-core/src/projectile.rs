//! Projectile Engine: per-projectile physics and subtype hit behavior for arrows, snowballs,
//! eggs, fishing bobbers, and ender pearls.

use std::collections::HashSet;

use combat_geometry::{Aabb, Ray};
use glam::{IVec3, Vec3};

use crate::clock::{TickClock, TickMode, VANILLA_TICKS_PER_SECOND};
use crate::config::{DamageType, KnockbackConfig};
use crate::damage::{DamageEvent, DamagePipeline, PipelineContext, apply_damage, should_dispatch_knockback};
use crate::entity::EntityId;
use crate::host::Host;
use crate::knockback::{KnockbackEngine, KnockbackKind, KnockbackRequest};
use crate::presets;
use crate::tag::TagStore;

pub const PROJECTILE_HALF_EXTENT: f32 = 0.125;
pub const ENTITY_COLLISION_EXPANSION: f32 = 0.3;
pub const WATER_DRAG: f32 = 0.6;
pub const AIR_DRAG_HORIZONTAL: f32 = 0.99;
pub const AIR_DRAG_VERTICAL: f32 = 0.99;
pub const GRAVITY_PER_TICK: f32 = 0.05;
pub const ROTATION_LERP_FACTOR: f32 = 0.2;

/// Controls which position a fishing-bobber knockback pull uses as its origin.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BobberOriginMode {
    /// Pull toward the bobber's current position.
    BobberRelative,
    /// Pull toward the rod owner's current position, not where they were standing at cast time —
    /// lets the owner reel by moving.
    OriginRelative,
}

/// Subtype-specific state and hit behavior.
#[derive(Clone, Debug)]
pub enum ProjectileKind {
    Arrow { critical: bool },
    Snowball,
    Egg,
    FishingBobber { hooked_entity: Option<EntityId>, origin_mode: BobberOriginMode },
    EnderPearl,
}

impl ProjectileKind {
    /// Whether a block collision embeds this projectile instead of breaking it: arrows and a
    /// resting bobber stick; thrown items and pearls break on contact.
    const fn sticks_on_block(&self) -> bool {
        matches!(self, Self::Arrow { .. } | Self::FishingBobber { .. })
    }

    /// Whether owner self-collision stays excluded for this subtype's entire flight instead of
    /// only the initial grace window. A cast fishing line can never hook its own caster, no
    /// matter how long it's been in the air.
    const fn never_hits_owner(&self) -> bool {
        matches!(self, Self::FishingBobber { .. })
    }
}

/// One in-flight projectile.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: EntityId,
    pub kind: ProjectileKind,
    pub spawn_position: Vec3,
    pub position: Vec3,
    pub prev_position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub stuck_direction: Option<Vec3>,
    pub stuck_ticks: u32,
    pub age_ticks: u32,
    pub no_clip: bool,
    pub piercing_level: u32,
    pub piercing_ignore: HashSet<EntityId>,
    pub fire_ticks_remaining: u32,
    pub knockback_config: Option<KnockbackConfig>,
}

impl Projectile {
    #[must_use]
    pub fn new(id: EntityId, owner: EntityId, kind: ProjectileKind, position: Vec3, velocity: Vec3) -> Self {
        Self {
            id,
            owner,
            kind,
            spawn_position: position,
            position,
            prev_position: position,
            velocity,
            on_ground: false,
            stuck_direction: None,
            stuck_ticks: 0,
            age_ticks: 0,
            no_clip: false,
            piercing_level: 0,
            piercing_ignore: HashSet::new(),
            fire_ticks_remaining: 0,
            knockback_config: None,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ProjectileTickOutcome {
    Continue,
    Remove,
}

fn ticks_per_second(clock: &TickClock) -> f32 {
    match clock.mode() {
        TickMode::Real => VANILLA_TICKS_PER_SECOND,
        TickMode::Scaled { ticks_per_second } => ticks_per_second,
    }
}

/// Whether the swept cube `[start, end]` (centered, `half_extent` per axis) overlaps any solid
/// block, using the same block-local `intersect_box` convention as [`crate::hit_detection`].
fn entity_sweep_intervenes(start: Vec3, end: Vec3, half_extent: f32, host: &dyn Host) -> bool {
    let ray = Ray::from_points(start, end);
    let half = Vec3::splat(half_extent);
    let lo = (start - half).min(end - half);
    let hi = (start + half).max(end + half);
    let bounds_min = IVec3::new(lo.x.floor() as i32, lo.y.floor() as i32, lo.z.floor() as i32);
    let bounds_max = IVec3::new(hi.x.floor() as i32, hi.y.floor() as i32, hi.z.floor() as i32);

    let local_start = -half;
    let local_end = end - start - half;
    let segment = Aabb::new(local_start.min(local_end), local_start.max(local_end) + half * 2.0);

    for cell in ray.voxel_traversal(bounds_min, bounds_max) {
        let block = host.get_block(cell);
        if !host.block_is_solid(block) {
            continue;
        }
        let shape = host.block_collision_shape(block);
        let relative = start - cell.as_vec3();
        if shape.intersect_box(relative, &segment) {
            return true;
        }
    }
    false
}

struct AxisMoveResult {
    position: Vec3,
    collided: bool,
}

fn move_axis(position: Vec3, delta: Vec3, half_extent: f32, host: &dyn Host) -> AxisMoveResult {
    if delta.length_squared() < 1e-12 {
        return AxisMoveResult { position, collided: false };
    }
    let target = position + delta;
    if entity_sweep_intervenes(position, target, half_extent, host) {
        AxisMoveResult { position, collided: true }
    } else {
        AxisMoveResult { position: target, collided: false }
    }
}

struct PhysicsResult {
    new_position: Vec3,
    collision_x: bool,
    collision_y: bool,
    collision_z: bool,
    on_ground: bool,
}

/// Swept-AABB movement against block shapes, axis-separated (Y then X then Z) so sliding along a
/// wall or floor works the way vanilla's physics does.
fn simulate_physics(position: Vec3, displacement: Vec3, host: &dyn Host) -> PhysicsResult {
    let y = move_axis(position, Vec3::new(0.0, displacement.y, 0.0), PROJECTILE_HALF_EXTENT, host);
    let x = move_axis(y.position, Vec3::new(displacement.x, 0.0, 0.0), PROJECTILE_HALF_EXTENT, host);
    let z = move_axis(x.position, Vec3::new(0.0, 0.0, displacement.z), PROJECTILE_HALF_EXTENT, host);

    PhysicsResult {
        new_position: z.position,
        collision_x: x.collided,
        collision_y: y.collided,
        collision_z: z.collided,
        on_ground: y.collided && displacement.y <= 0.0,
    }
}

fn should_unstuck(position: Vec3, host: &dyn Host) -> bool {
    let cell = IVec3::new(position.x.floor() as i32, position.y.floor() as i32, position.z.floor() as i32);
    !host.block_is_solid(host.get_block(cell))
}

/// Bundles the shared combat state a projectile tick needs on top of the host, passed explicitly
/// instead of being reached for as thread-local/static state.
pub struct ProjectileTickContext<'a> {
    pub clock: &'a TickClock,
    pub tags: &'a TagStore,
    pub pipeline: &'a mut DamagePipeline,
    pub knockback: &'a mut KnockbackEngine,
}

/// Per-tick simulation. Returns whether the caller should remove the projectile this tick.
pub fn movement_tick(projectile: &mut Projectile, ctx: &mut ProjectileTickContext<'_>, host: &mut dyn Host) -> ProjectileTickOutcome {
    if let ProjectileKind::FishingBobber { hooked_entity: Some(hooked), .. } = projectile.kind {
        return match host.position(hooked) {
            Some(pos) => {
                projectile.prev_position = projectile.position;
                projectile.position = pos;
                host.teleport(projectile.id, pos);
                ProjectileTickOutcome::Continue
            }
            None => ProjectileTickOutcome::Remove,
        };
    }

    if let Some(direction) = projectile.stuck_direction {
        if should_unstuck(projectile.position + direction * 0.01, host) {
            projectile.stuck_direction = None;
            projectile.stuck_ticks = 0;
        } else {
            projectile.stuck_ticks += 1;
            if u64::from(projectile.stuck_ticks) > presets::ONE_HOUR_TICKS {
                return ProjectileTickOutcome::Remove;
            }
            projectile.age_ticks += 1;
            return ProjectileTickOutcome::Continue;
        }
    }

    projectile.age_ticks += 1;

    if host.is_in_void(projectile.position) {
        return ProjectileTickOutcome::Remove;
    }

    let tps = ticks_per_second(ctx.clock);
    let mut displacement = projectile.velocity / tps;
    if host.in_water(projectile.id) {
        displacement *= WATER_DRAG;
    }

    let physics = simulate_physics(projectile.position, displacement, host);
    projectile.prev_position = projectile.position;

    if !projectile.no_clip {
        let candidates = host.entities_in_aabb(&Aabb::new(
            projectile.prev_position.min(physics.new_position) - Vec3::splat(ENTITY_COLLISION_EXPANSION),
            projectile.prev_position.max(physics.new_position) + Vec3::splat(ENTITY_COLLISION_EXPANSION),
        ));
        let grace = projectile.age_ticks < presets::SHOOTER_COLLISION_DELAY_TICKS || projectile.kind.never_hits_owner();
        let ray = Ray::from_points(projectile.prev_position, physics.new_position);
        let mut nearest: Option<(EntityId, f32)> = None;
        for candidate in candidates {
            if candidate == projectile.id {
                continue;
            }
            if grace && candidate == projectile.owner {
                continue;
            }
            if projectile.piercing_ignore.contains(&candidate) {
                continue;
            }
            let Some(bbox) = host.bounding_box(candidate) else { continue };
            let Some(t) = bbox.expand(ENTITY_COLLISION_EXPANSION).intersect_ray(&ray) else { continue };
            if t > 1.0 {
                continue;
            }
            if nearest.is_none_or(|(_, best)| t < best) {
                nearest = Some((candidate, t));
            }
        }

        if let Some((victim, _)) = nearest {
            if on_hit_entity(projectile, victim, ctx, host) {
                return ProjectileTickOutcome::Remove;
            }
            projectile.position = physics.new_position;
            host.teleport(projectile.id, projectile.position);
            return ProjectileTickOutcome::Continue;
        }
    }

    if (physics.collision_x || physics.collision_y || physics.collision_z) && projectile.stuck_direction.is_none() {
        let direction = Vec3::new(
            if physics.collision_x { -projectile.velocity.x.signum() } else { 0.0 },
            if physics.collision_y { -projectile.velocity.y.signum() } else { 0.0 },
            if physics.collision_z { -projectile.velocity.z.signum() } else { 0.0 },
        );
        if projectile.kind.sticks_on_block() {
            projectile.stuck_direction = Some(direction);
            projectile.stuck_ticks = 0;
            projectile.velocity = Vec3::ZERO;
            host.set_velocity(projectile.id, Vec3::ZERO);
            projectile.position = physics.new_position;
            host.teleport(projectile.id, projectile.position);
            return ProjectileTickOutcome::Continue;
        }
        let remove = on_block_hit(projectile, ctx, host);
        if remove {
            return ProjectileTickOutcome::Remove;
        }
    }

    projectile.on_ground = physics.on_ground;

    let h_drag = if host.in_water(projectile.id) { WATER_DRAG } else { AIR_DRAG_HORIZONTAL };
    let v_drag = if host.in_water(projectile.id) { WATER_DRAG } else { AIR_DRAG_VERTICAL };
    projectile.velocity.x *= h_drag;
    projectile.velocity.z *= h_drag;
    projectile.velocity.y *= v_drag;
    projectile.velocity.y -= GRAVITY_PER_TICK * tps;

    projectile.position = physics.new_position;
    host.teleport(projectile.id, projectile.position);
    host.set_velocity(projectile.id, projectile.velocity);

    if let ProjectileKind::FishingBobber { .. } = projectile.kind {
        if let Some(owner_pos) = host.position(projectile.owner) {
            if owner_pos.distance(projectile.position) > presets::FISHING_BOBBER_AUTO_RETRACT_DISTANCE {
                return ProjectileTickOutcome::Remove;
            }
        }
    }

    ProjectileTickOutcome::Continue
}

/// Subtype `on_hit` behavior for a live entity collision. Returns whether the projectile should
/// be removed this tick.
fn on_hit_entity(projectile: &mut Projectile, victim: EntityId, ctx: &mut ProjectileTickContext<'_>, host: &mut dyn Host) -> bool {
    match projectile.kind {
        ProjectileKind::Arrow { critical } => on_hit_arrow(projectile, victim, critical, ctx, host),
        ProjectileKind::Snowball | ProjectileKind::Egg => {
            let event = thrown_event(victim, projectile);
            let result = apply_damage(ctx.pipeline, ctx.tags, ctx.clock, victim, event, PipelineContext::default(), host);
            if result.applied {
                dispatch_projectile_knockback(projectile, victim, None, result.props.blockable, ctx, host);
                host.trigger_status_byte(victim, 3);
            }
            true
        }
        ProjectileKind::FishingBobber { origin_mode, .. } => {
            if host.is_player(victim) {
                let event = thrown_event(victim, projectile);
                let result = apply_damage(ctx.pipeline, ctx.tags, ctx.clock, victim, event, PipelineContext::default(), host);
                if result.applied {
                    let origin = match origin_mode {
                        BobberOriginMode::BobberRelative => Some(projectile.position),
                        BobberOriginMode::OriginRelative => {
                            host.position(projectile.owner).or(Some(projectile.spawn_position))
                        }
                    };
                    dispatch_projectile_knockback(projectile, victim, origin, result.props.blockable, ctx, host);
                }
                true
            } else {
                if let ProjectileKind::FishingBobber { hooked_entity, .. } = &mut projectile.kind {
                    *hooked_entity = Some(victim);
                }
                false
            }
        }
        ProjectileKind::EnderPearl => {
            teleport_owner_via_pearl(projectile, ctx, host);
            true
        }
    }
}

fn on_block_hit(projectile: &mut Projectile, ctx: &mut ProjectileTickContext<'_>, host: &mut dyn Host) -> bool {
    match projectile.kind {
        ProjectileKind::Snowball | ProjectileKind::Egg => {
            host.send_particles(projectile.position, "item_crack", 6);
            true
        }
        ProjectileKind::EnderPearl => {
            teleport_owner_via_pearl(projectile, ctx, host);
            true
        }
        ProjectileKind::Arrow { .. } | ProjectileKind::FishingBobber { .. } => true,
    }
}

fn thrown_event(victim: EntityId, projectile: &Projectile) -> DamageEvent {
    DamageEvent {
        damage_type: DamageType::Thrown,
        source: victim,
        attacker: Some(projectile.owner),
        source_position: Some(projectile.spawn_position),
        raw_amount: 0.0,
        cancelled: false,
    }
}

fn dispatch_projectile_knockback(
    projectile: &Projectile,
    victim: EntityId,
    origin_override: Option<Vec3>,
    blockable: bool,
    ctx: &mut ProjectileTickContext<'_>,
    host: &mut dyn Host,
) {
    let request = KnockbackRequest {
        victim,
        attacker: Some(projectile.owner),
        shooter_origin_pos: origin_override.or(Some(projectile.spawn_position)),
        kind: KnockbackKind::Projectile,
        was_sprinting: None,
        enchantment_level: 0,
    };
    let attacker_item = host.held_item(projectile.owner);
    let blocking = ctx.pipeline.blocking.is_blocking(victim);
    ctx.knockback.apply_knockback(
        ctx.tags,
        &ctx.pipeline.config,
        ctx.clock.current(),
        &request,
        attacker_item.as_ref(),
        blocking,
        blockable,
        host,
    );
}

fn on_hit_arrow(projectile: &mut Projectile, victim: EntityId, critical: bool, ctx: &mut ProjectileTickContext<'_>, host: &mut dyn Host) -> bool {
    let speed = projectile.velocity.length() / ticks_per_second(ctx.clock);
    let mut amount = (speed * presets::ARROW_BASE_DAMAGE_PER_SPEED).max(0.0).ceil();
    if critical {
        amount += fastrand::f32() * (amount / 2.0 + 2.0);
    }

    let event = DamageEvent {
        damage_type: DamageType::Arrow,
        source: victim,
        attacker: Some(projectile.owner),
        source_position: Some(projectile.spawn_position),
        raw_amount: amount,
        cancelled: false,
    };
    let result = apply_damage(ctx.pipeline, ctx.tags, ctx.clock, victim, event, PipelineContext::default(), host);
    if result.applied {
        if projectile.fire_ticks_remaining > 0 {
            host.set_on_fire_ticks(victim, projectile.fire_ticks_remaining);
        }
        if should_dispatch_knockback(&result) {
            dispatch_projectile_knockback(projectile, victim, None, result.props.blockable, ctx, host);
        }
    }

    if projectile.piercing_level > 0 {
        projectile.piercing_ignore.insert(victim);
        projectile.piercing_level -= 1;
        false
    } else {
        true
    }
}

/// Ender pearl teleport side effect: owner is moved to the pearl's last position before impact,
/// then takes 5 fall damage and has fall distance reset. The host's `Pose` does not currently
/// distinguish "in vehicle"/"sleeping", so unlike vanilla this always applies — a known
/// limitation of the current `Pose` model, not a bug.
fn teleport_owner_via_pearl(projectile: &Projectile, ctx: &mut ProjectileTickContext<'_>, host: &mut dyn Host) {
    host.teleport(projectile.owner, projectile.prev_position);
    let event = DamageEvent {
        damage_type: DamageType::Fall,
        source: projectile.owner,
        attacker: None,
        source_position: None,
        raw_amount: 5.0,
        cancelled: false,
    };
    apply_damage(ctx.pipeline, ctx.tags, ctx.clock, projectile.owner, event, PipelineContext::default(), host);
    host.reset_fall_distance(projectile.owner);
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as Map;

    use combat_geometry::Aabb;

    use super::*;
    use crate::config::{ConfigResolver, DamageTypeProperties};
    use crate::entity::{EntityKindId, GameMode, ItemStack, Material, Pose};
    use crate::host::{BlockId, CollisionShape, FullBlockShape};

    struct TestHost {
        positions: Map<EntityId, Vec3>,
        velocities: Map<EntityId, Vec3>,
        health: Map<EntityId, f32>,
        on_fire: Map<EntityId, u32>,
        solid_cells: HashSet<IVec3>,
        in_water: bool,
        void_below: f32,
        players: HashSet<EntityId>,
        fall_distance: Map<EntityId, f32>,
    }

    impl TestHost {
        fn new() -> Self {
            Self {
                positions: Map::new(),
                velocities: Map::new(),
                health: Map::new(),
                on_fire: Map::new(),
                solid_cells: HashSet::new(),
                in_water: false,
                void_below: -64.0,
                players: HashSet::new(),
                fall_distance: Map::new(),
            }
        }
    }

    impl Host for TestHost {
        fn position(&self, entity: EntityId) -> Option<Vec3> {
            self.positions.get(&entity).copied()
        }
        fn velocity(&self, entity: EntityId) -> Option<Vec3> {
            self.velocities.get(&entity).copied()
        }
        fn yaw_pitch(&self, _entity: EntityId) -> Option<(f32, f32)> {
            Some((0.0, 0.0))
        }
        fn on_ground(&self, _entity: EntityId) -> bool {
            false
        }
        fn in_water(&self, _entity: EntityId) -> bool {
            self.in_water
        }
        fn pose(&self, _entity: EntityId) -> Pose {
            Pose::Standing
        }
        fn game_mode(&self, _entity: EntityId) -> GameMode {
            GameMode::Survival
        }
        fn bounding_box(&self, entity: EntityId) -> Option<Aabb> {
            self.positions.get(&entity).map(|&p| Aabb::from_feet(p, 0.3, 1.8))
        }
        fn health(&self, entity: EntityId) -> Option<f32> {
            self.health.get(&entity).copied()
        }
        fn max_health(&self, _entity: EntityId) -> f32 {
            20.0
        }
        fn held_item(&self, _entity: EntityId) -> Option<ItemStack> {
            None
        }
        fn armor_points(&self, _entity: EntityId) -> f32 {
            0.0
        }
        fn is_player(&self, entity: EntityId) -> bool {
            self.players.contains(&entity)
        }
        fn is_sprinting(&self, _entity: EntityId) -> bool {
            false
        }
        fn fall_distance(&self, entity: EntityId) -> f32 {
            self.fall_distance.get(&entity).copied().unwrap_or(0.0)
        }
        fn eye_height(&self, _entity: EntityId, _pose: Pose) -> f32 {
            1.62
        }
        fn latency_ms(&self, _entity: EntityId) -> u32 {
            0
        }
        fn entity_kind(&self, _entity: EntityId) -> Option<EntityKindId> {
            None
        }
        fn melee_base_damage(&self, _material: Material) -> f32 {
            1.0
        }
        fn set_velocity(&mut self, entity: EntityId, velocity: Vec3) {
            self.velocities.insert(entity, velocity);
        }
        fn set_health(&mut self, entity: EntityId, health: f32) {
            self.health.insert(entity, health);
        }
        fn set_health_silent(&mut self, entity: EntityId, health: f32) {
            self.health.insert(entity, health);
        }
        fn set_pose(&mut self, _entity: EntityId, _pose: Pose) {}
        fn set_on_fire_ticks(&mut self, entity: EntityId, ticks: u32) {
            self.on_fire.insert(entity, ticks);
        }
        fn on_fire_ticks(&self, entity: EntityId) -> u32 {
            self.on_fire.get(&entity).copied().unwrap_or(0)
        }
        fn teleport(&mut self, entity: EntityId, position: Vec3) {
            self.positions.insert(entity, position);
        }
        fn remove_entity(&mut self, entity: EntityId) {
            self.positions.remove(&entity);
        }
        fn spawn_entity(&mut self, _kind: EntityKindId, position: Vec3) -> EntityId {
            let id = EntityId(500);
            self.positions.insert(id, position);
            id
        }
        fn reset_fall_distance(&mut self, entity: EntityId) {
            self.fall_distance.insert(entity, 0.0);
        }
        fn get_block(&self, position: IVec3) -> BlockId {
            if self.solid_cells.contains(&position) { BlockId(1) } else { BlockId(0) }
        }
        fn block_is_solid(&self, block: BlockId) -> bool {
            block.0 == 1
        }
        fn block_collision_shape(&self, _block: BlockId) -> Box<dyn CollisionShape> {
            Box::new(FullBlockShape)
        }
        fn block_is_harmful(&self, _block: BlockId) -> bool {
            false
        }
        fn entities_in_aabb(&self, aabb: &Aabb) -> Vec<EntityId> {
            self.positions
                .iter()
                .filter(|(_, &p)| aabb.contains_point(p))
                .map(|(&id, _)| id)
                .collect()
        }
        fn world_min_y(&self) -> i32 {
            -64
        }
        fn is_in_void(&self, position: Vec3) -> bool {
            position.y < self.void_below
        }
        fn send_equipment_update(&mut self, _entity: EntityId) {}
        fn send_particles(&mut self, _at: Vec3, _kind: &str, _count: u32) {}
        fn send_action_bar(&mut self, _entity: EntityId, _text: &str) {}
        fn play_sound(&mut self, _at: Vec3, _sound: &str, _volume: f32, _pitch: f32) {}
        fn trigger_status_byte(&mut self, _entity: EntityId, _byte: u8) {}
    }

    fn make_pipeline() -> DamagePipeline {
        let props = DamageTypeProperties::default();
        let mut defaults = std::collections::HashMap::new();
        for dt in [DamageType::Melee, DamageType::Arrow, DamageType::Thrown, DamageType::Fall] {
            defaults.insert(dt, props);
        }
        let knockback = crate::presets::vanilla_knockback();
        DamagePipeline::new(ConfigResolver::new(defaults, knockback, false))
    }

    #[test]
    fn arrow_deals_damage_and_requests_removal() {
        let owner = EntityId(1);
        let victim = EntityId(2);
        let arrow_id = EntityId(3);

        let mut host = TestHost::new();
        host.positions.insert(owner, Vec3::new(0.0, 64.0, 0.0));
        host.positions.insert(victim, Vec3::new(5.0, 64.0, 0.0));
        host.health.insert(victim, 20.0);
        host.players.insert(victim);

        let mut projectile = Projectile::new(arrow_id, owner, ProjectileKind::Arrow { critical: false }, Vec3::new(0.0, 64.0, 0.0), Vec3::new(3.0, 0.0, 0.0));
        projectile.age_ticks = presets::SHOOTER_COLLISION_DELAY_TICKS;

        let clock = TickClock::default();
        let tags = TagStore::new();
        let mut pipeline = make_pipeline();
        let mut knockback = KnockbackEngine::new();
        let mut ctx = ProjectileTickContext { clock: &clock, tags: &tags, pipeline: &mut pipeline, knockback: &mut knockback };

        let remove = on_hit_arrow(&mut projectile, victim, false, &mut ctx, &mut host);
        assert!(remove);
        assert!(host.health(victim).unwrap() < 20.0);
    }

    #[test]
    fn piercing_arrow_continues_and_ignores_victim() {
        let owner = EntityId(1);
        let victim = EntityId(2);
        let mut host = TestHost::new();
        host.health.insert(victim, 20.0);
        host.players.insert(victim);

        let mut projectile = Projectile::new(EntityId(3), owner, ProjectileKind::Arrow { critical: false }, Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        projectile.piercing_level = 1;

        let clock = TickClock::default();
        let tags = TagStore::new();
        let mut pipeline = make_pipeline();
        let mut knockback = KnockbackEngine::new();
        let mut ctx = ProjectileTickContext { clock: &clock, tags: &tags, pipeline: &mut pipeline, knockback: &mut knockback };

        let remove = on_hit_arrow(&mut projectile, victim, false, &mut ctx, &mut host);
        assert!(!remove);
        assert!(projectile.piercing_ignore.contains(&victim));
        assert_eq!(projectile.piercing_level, 0);
    }

    #[test]
    fn fishing_bobber_hooks_non_player_instead_of_damaging() {
        let owner = EntityId(1);
        let mob = EntityId(2);
        let mut host = TestHost::new();

        let mut projectile = Projectile::new(
            EntityId(3),
            owner,
            ProjectileKind::FishingBobber { hooked_entity: None, origin_mode: BobberOriginMode::BobberRelative },
            Vec3::ZERO,
            Vec3::ZERO,
        );

        let clock = TickClock::default();
        let tags = TagStore::new();
        let mut pipeline = make_pipeline();
        let mut knockback = KnockbackEngine::new();
        let mut ctx = ProjectileTickContext { clock: &clock, tags: &tags, pipeline: &mut pipeline, knockback: &mut knockback };

        let remove = on_hit_entity(&mut projectile, mob, &mut ctx, &mut host);
        assert!(!remove);
        assert!(matches!(projectile.kind, ProjectileKind::FishingBobber { hooked_entity: Some(h), .. } if h == mob));
    }

    #[test]
    fn fishing_bobber_never_hooks_its_own_caster_even_after_grace_window() {
        let owner = EntityId(1);
        let mut host = TestHost::new();
        host.positions.insert(owner, Vec3::new(5.0, 64.0, 0.0));

        let mut projectile = Projectile::new(
            EntityId(2),
            owner,
            ProjectileKind::FishingBobber { hooked_entity: None, origin_mode: BobberOriginMode::BobberRelative },
            Vec3::new(0.0, 64.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        );
        projectile.age_ticks = presets::SHOOTER_COLLISION_DELAY_TICKS * 10;

        let clock = TickClock::default();
        let tags = TagStore::new();
        let mut pipeline = make_pipeline();
        let mut knockback = KnockbackEngine::new();
        let mut ctx = ProjectileTickContext { clock: &clock, tags: &tags, pipeline: &mut pipeline, knockback: &mut knockback };

        movement_tick(&mut projectile, &mut ctx, &mut host);
        assert!(matches!(projectile.kind, ProjectileKind::FishingBobber { hooked_entity: None, .. }));
    }

    #[test]
    fn ender_pearl_teleports_owner_and_deals_fall_damage() {
        let owner = EntityId(1);
        let mut host = TestHost::new();
        host.health.insert(owner, 20.0);
        host.positions.insert(owner, Vec3::ZERO);

        let mut projectile = Projectile::new(EntityId(2), owner, ProjectileKind::EnderPearl, Vec3::ZERO, Vec3::new(5.0, 0.0, 5.0));
        projectile.prev_position = Vec3::new(10.0, 64.0, 10.0);

        let clock = TickClock::default();
        let tags = TagStore::new();
        let mut pipeline = make_pipeline();
        let mut knockback = KnockbackEngine::new();
        let mut ctx = ProjectileTickContext { clock: &clock, tags: &tags, pipeline: &mut pipeline, knockback: &mut knockback };

        teleport_owner_via_pearl(&projectile, &mut ctx, &mut host);
        assert_eq!(host.position(owner), Some(Vec3::new(10.0, 64.0, 10.0)));
        assert!(host.health(owner).unwrap() < 20.0);
    }

    #[test]
    fn void_check_schedules_removal() {
        let owner = EntityId(1);
        let mut host = TestHost::new();
        let mut projectile = Projectile::new(EntityId(2), owner, ProjectileKind::Arrow { critical: false }, Vec3::new(0.0, -100.0, 0.0), Vec3::ZERO);

        let clock = TickClock::default();
        let tags = TagStore::new();
        let mut pipeline = make_pipeline();
        let mut knockback = KnockbackEngine::new();
        let mut ctx = ProjectileTickContext { clock: &clock, tags: &tags, pipeline: &mut pipeline, knockback: &mut knockback };

        let outcome = movement_tick(&mut projectile, &mut ctx, &mut host);
        assert_eq!(outcome, ProjectileTickOutcome::Remove);
    }

    #[test]
    fn stuck_arrow_unsticks_when_block_clears() {
        let owner = EntityId(1);
        let mut host = TestHost::new();
        let mut projectile = Projectile::new(EntityId(2), owner, ProjectileKind::Arrow { critical: false }, Vec3::new(0.0, 64.0, 0.0), Vec3::ZERO);
        projectile.stuck_direction = Some(Vec3::new(0.0, 0.0, -1.0));
        projectile.stuck_ticks = 5;

        let clock = TickClock::default();
        let tags = TagStore::new();
        let mut pipeline = make_pipeline();
        let mut knockback = KnockbackEngine::new();
        let mut ctx = ProjectileTickContext { clock: &clock, tags: &tags, pipeline: &mut pipeline, knockback: &mut knockback };

        movement_tick(&mut projectile, &mut ctx, &mut host);
        assert!(projectile.stuck_direction.is_none());
    }
}
