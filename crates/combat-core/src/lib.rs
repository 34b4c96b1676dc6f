//! Combat Core: a deterministic, tick-driven combat simulation for a Minecraft-compatible server.
//! [`CombatCore`] is the crate's single entry point — it owns every subsystem and exposes the
//! host-facing operations. No subsystem is reachable through a static or thread-local; the host
//! constructs one `CombatCore` and a `Host` implementation, and drives both explicitly.

pub mod armor;
pub mod blocking;
pub mod clock;
pub mod config;
pub mod damage;
pub mod entity;
pub mod environmental;
pub mod error;
pub mod hit_detection;
pub mod host;
pub mod invuln;
pub mod knockback;
pub mod presets;
pub mod projectile;
pub mod tag;
pub mod version;

use std::collections::HashMap;

use glam::Vec3;
use slotmap::{SlotMap, new_key_type};
use tracing::warn;

use crate::clock::{TickClock, TickMode, VANILLA_TICKS_PER_SECOND};
use crate::config::{ConfigResolver, DamageType, DamageTypeProperties, IgnitionMode};
use crate::damage::{DamageEvent, DamagePipeline, DamageResult, PipelineContext, apply_damage, should_dispatch_knockback};
use crate::entity::{EntityId, EntityKindId, ItemStack, TagValue};
use crate::environmental::EnvironmentalDamage;
use crate::hit_detection::{ReachConfig, SwingWindowTracker, is_reach_valid, yaw_pitch_to_direction};
use crate::host::Host;
use crate::knockback::{KnockbackEngine, KnockbackKind, KnockbackRequest};
use crate::presets::{CombatPreset, bow_power};
use crate::projectile::{BobberOriginMode, Projectile, ProjectileKind, ProjectileTickContext, ProjectileTickOutcome, movement_tick};
use crate::tag::TagStore;
use crate::version::{ClientVersion, VersionTracker};

new_key_type! {
    /// Stable handle into [`CombatCore`]'s projectile arena. Distinct from the host's `EntityId`
    /// the projectile is also spawned under.
    pub struct ProjectileKey;
}

// `Projectile::velocity` is blocks/second (`projectile::movement_tick` divides it by the tick
// rate to get per-tick displacement), so these are vanilla's per-tick launch speeds rescaled by
// the vanilla tick rate, not per-tick speeds themselves.
const BOW_ARROW_LAUNCH_SPEED: f32 = 3.0 * VANILLA_TICKS_PER_SECOND;
const THROWABLE_LAUNCH_SPEED: f32 = 1.5 * VANILLA_TICKS_PER_SECOND;
const FISHING_BOBBER_LAUNCH_SPEED: f32 = 1.5 * VANILLA_TICKS_PER_SECOND;
const VANILLA_FIRE_DAMAGE_PER_TICK: f32 = 1.0;
const VANILLA_CACTUS_DAMAGE_PER_TICK: f32 = 1.0;

/// Which hand a `on_item_use` call originated from.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Hand {
    Main,
    Off,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ThrowableKind {
    Snowball,
    Egg,
    EnderPearl,
}

/// What a call to [`CombatCore::on_item_use`] represents. The core has no notion of item
/// semantics — the item registry is an external collaborator — so the host already knows, from
/// its own item registry and right-click/release sequencing, which of these this call is.
#[derive(Clone, Debug)]
pub enum ItemUseAction {
    BowDraw,
    BowRelease { hold_seconds: f32 },
    FishingCast,
    FishingRetrieve,
    ThrowableLaunch(ThrowableKind),
    ShieldRaise,
    ShieldLower,
}

/// Host-registry entity-kind IDs for the projectile subtypes the engine spawns. `EntityKindId` is
/// opaque to the core, so these must come from whatever the host's entity registry actually uses
/// for "arrow", "snowball", and so on.
#[derive(Copy, Clone, Debug)]
pub struct ProjectileEntityKinds {
    pub arrow: EntityKindId,
    pub snowball: EntityKindId,
    pub egg: EntityKindId,
    pub fishing_bobber: EntityKindId,
    pub ender_pearl: EntityKindId,
}

fn knockback_enchant_level(item: &ItemStack) -> u32 {
    match item.tags.get("enchant.knockback_level") {
        Some(TagValue::I64(level)) if *level > 0 => *level as u32,
        _ => 0,
    }
}

/// Owns every combat subsystem and is the only thing the host needs to construct and drive —
/// explicit dependency injection, no process-wide mutable state.
pub struct CombatCore {
    clock: TickClock,
    tags: TagStore,
    pipeline: DamagePipeline,
    knockback: KnockbackEngine,
    swing_window: SwingWindowTracker,
    environmental: EnvironmentalDamage,
    projectiles: SlotMap<ProjectileKey, Projectile>,
    version: VersionTracker,
    reach: ReachConfig,
    preset: CombatPreset,
    entity_kinds: ProjectileEntityKinds,
    bobber_origin_mode: BobberOriginMode,
    fire_damage_per_tick: f32,
    cactus_damage_per_tick: f32,
    fire_ignition_mode: IgnitionMode,
    bow_draw_start: HashMap<EntityId, u64>,
    fishing_rod_cast: HashMap<EntityId, ProjectileKey>,
}

impl CombatCore {
    #[must_use]
    pub fn new(preset: CombatPreset, resolver: ConfigResolver, mode: TickMode, entity_kinds: ProjectileEntityKinds) -> Self {
        let mut pipeline = DamagePipeline::new(resolver);
        pipeline.invulnerability_window_ticks = preset.invulnerability_ticks;
        Self {
            clock: TickClock::new(mode),
            tags: TagStore::new(),
            pipeline,
            knockback: KnockbackEngine::new(),
            swing_window: SwingWindowTracker::new(),
            environmental: EnvironmentalDamage::new(),
            projectiles: SlotMap::with_key(),
            version: VersionTracker::new(),
            reach: ReachConfig::default(),
            preset,
            entity_kinds,
            bobber_origin_mode: BobberOriginMode::BobberRelative,
            fire_damage_per_tick: VANILLA_FIRE_DAMAGE_PER_TICK,
            cactus_damage_per_tick: VANILLA_CACTUS_DAMAGE_PER_TICK,
            fire_ignition_mode: IgnitionMode::Delayed,
            bow_draw_start: HashMap::new(),
            fishing_rod_cast: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.clock.current()
    }

    #[must_use]
    pub const fn preset(&self) -> CombatPreset {
        self.preset
    }

    pub fn set_reach(&mut self, reach: ReachConfig) {
        self.reach = reach;
    }

    pub fn set_fire_damage_per_tick(&mut self, amount: f32) {
        self.fire_damage_per_tick = amount;
    }

    pub fn set_cactus_damage_per_tick(&mut self, amount: f32) {
        self.cactus_damage_per_tick = amount;
    }

    pub fn set_fire_ignition_mode(&mut self, mode: IgnitionMode) {
        self.fire_ignition_mode = mode;
    }

    pub fn set_bobber_origin_mode(&mut self, mode: BobberOriginMode) {
        self.bobber_origin_mode = mode;
    }

    #[must_use]
    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagStore {
        &mut self.tags
    }

    /// Drives scheduled work: buffered-hit resolution (which must run before projectile/
    /// environmental processing of the same tick), then projectile physics.
    pub fn on_tick(&mut self, host: &mut dyn Host) {
        self.clock.advance();

        let due = self.pipeline.fire_due_buffered_hits(&self.tags, &self.clock, host);
        for result in &due {
            self.dispatch_post_pipeline(result, result.shooter_origin_position, false, host);
        }

        self.tick_projectiles(host);
    }

    fn tick_projectiles(&mut self, host: &mut dyn Host) {
        let Self { projectiles, clock, tags, pipeline, knockback, .. } = self;
        let mut finished = Vec::new();
        for (key, projectile) in projectiles.iter_mut() {
            let mut ctx = ProjectileTickContext {
                clock: &*clock,
                tags: &*tags,
                pipeline: &mut *pipeline,
                knockback: &mut *knockback,
            };
            if movement_tick(projectile, &mut ctx, host) == ProjectileTickOutcome::Remove {
                finished.push((key, projectile.id));
            }
        }
        for (key, entity) in finished {
            projectiles.remove(key);
            host.remove_entity(entity);
        }
    }

    /// Host-reported damage: any source, not necessarily melee.
    pub fn on_entity_damage(&mut self, victim: EntityId, event: DamageEvent, host: &mut dyn Host) -> DamageResult {
        let shooter_origin_pos = event.source_position;
        self.apply_and_dispatch(victim, event, false, shooter_origin_pos, host)
    }

    /// Client-initiated melee: reach-gated before the pipeline runs.
    pub fn on_entity_attack(&mut self, attacker: EntityId, victim: EntityId, host: &mut dyn Host) -> DamageResult {
        let rejected = || DamageResult {
            applied: false,
            was_replacement: false,
            final_damage: 0.0,
            props: DamageTypeProperties::default(),
            attacker: Some(attacker),
            source: victim,
            victim,
            shooter_origin_position: None,
            was_sprinting: None,
        };

        let Some(pos) = host.position(attacker) else {
            warn!(attacker = attacker.0, "on_entity_attack: attacker has no tracked position");
            return rejected();
        };
        let eye = pos + Vec3::new(0.0, host.eye_height(attacker, host.pose(attacker)), 0.0);
        let Some(bbox) = host.bounding_box(victim) else {
            return rejected();
        };
        if !is_reach_valid(eye, &bbox, self.reach) {
            return rejected();
        }

        self.apply_and_dispatch(victim, DamageEvent::melee(attacker, victim), false, None, host)
    }

    /// Records an arm-swing animation. Victim resolution for a swing that lands a few ticks late
    /// happens per-tick in [`Self::on_player_tick`].
    pub fn on_arm_swing(&mut self, attacker: EntityId) {
        self.swing_window.record_swing(attacker, self.clock.current());
    }

    /// Drives the environmental-damage trackers, the sprint ring buffer, and swing-window
    /// consumption for one player.
    pub fn on_player_tick(&mut self, player: EntityId, host: &mut dyn Host) {
        let tick = self.clock.current();
        self.knockback.record_sprint_sample(player, tick, host.is_sprinting(player));

        if let (Some(pos), Some((yaw, pitch))) = (host.position(player), host.yaw_pitch(player)) {
            let eye = pos + Vec3::new(0.0, host.eye_height(player, host.pose(player)), 0.0);
            let direction = yaw_pitch_to_direction(yaw, pitch);
            if let Some(victim) = self.swing_window.try_consume(
                player,
                tick,
                self.preset.swing_look_check_ticks,
                self.preset.swing_hit_window_ticks,
                eye,
                direction,
                self.reach,
                host,
            ) {
                self.apply_and_dispatch(victim, DamageEvent::melee(player, victim), true, None, host);
            }
        }

        if let Some(event) = self.environmental.fall.tick(player, host) {
            let result = apply_damage(&mut self.pipeline, &self.tags, &self.clock, player, event, PipelineContext::default(), host);
            self.dispatch_post_pipeline(&result, None, false, host);
        }

        let ignition_delay = self.pipeline.config.default_damage_properties(DamageType::Fire).ignition_delay_ticks;
        if let Some(event) = self
            .environmental
            .fire
            .tick(player, tick, ignition_delay, self.fire_damage_per_tick, self.fire_ignition_mode, host)
        {
            let result = apply_damage(&mut self.pipeline, &self.tags, &self.clock, player, event, PipelineContext::default(), host);
            self.dispatch_post_pipeline(&result, None, false, host);
        }

        if let Some(event) = self.environmental.cactus.tick(player, self.cactus_damage_per_tick, host) {
            let result = apply_damage(&mut self.pipeline, &self.tags, &self.clock, player, event, PipelineContext::default(), host);
            self.dispatch_post_pipeline(&result, None, false, host);
        }
    }

    /// Bow draw/release, fishing-rod cast/retrieve, and throwable launches. Returns the spawned
    /// projectile's entity handle, if this call spawned one.
    pub fn on_item_use(
        &mut self,
        player: EntityId,
        _item: &ItemStack,
        _hand: Hand,
        action: ItemUseAction,
        host: &mut dyn Host,
    ) -> Option<EntityId> {
        match action {
            ItemUseAction::BowDraw => {
                self.bow_draw_start.insert(player, self.clock.current());
                None
            }
            ItemUseAction::BowRelease { hold_seconds } => {
                self.bow_draw_start.remove(&player);
                let power = bow_power(hold_seconds);
                if power <= 0.0 {
                    return None;
                }
                self.spawn_arrow(player, power >= 1.0, BOW_ARROW_LAUNCH_SPEED * power, host)
            }
            ItemUseAction::FishingCast => {
                if let Some(key) = self.fishing_rod_cast.remove(&player) {
                    if let Some(previous) = self.projectiles.remove(key) {
                        host.remove_entity(previous.id);
                    }
                }
                let key = self.spawn_fishing_bobber(player, host)?;
                let id = self.projectiles.get(key)?.id;
                self.fishing_rod_cast.insert(player, key);
                Some(id)
            }
            ItemUseAction::FishingRetrieve => {
                if let Some(key) = self.fishing_rod_cast.remove(&player) {
                    if let Some(bobber) = self.projectiles.remove(key) {
                        host.remove_entity(bobber.id);
                    }
                }
                None
            }
            ItemUseAction::ThrowableLaunch(kind) => self.spawn_throwable(player, kind, host),
            ItemUseAction::ShieldRaise => {
                // The `Host` trait exposes only the active hand's item, so the preserved offhand
                // snapshot is always `None` until a host implementation adds an off-hand query.
                self.pipeline.blocking.start_blocking(player, None);
                None
            }
            ItemUseAction::ShieldLower => {
                self.pipeline.blocking.stop_blocking(player);
                None
            }
        }
    }

    fn spawn_arrow(&mut self, owner: EntityId, critical: bool, speed: f32, host: &mut dyn Host) -> Option<EntityId> {
        let (eye, direction) = self.launch_vector(owner, host)?;
        let entity = host.spawn_entity(self.entity_kinds.arrow, eye);
        let projectile = Projectile::new(entity, owner, ProjectileKind::Arrow { critical }, eye, direction * speed);
        self.projectiles.insert(projectile);
        Some(entity)
    }

    fn spawn_throwable(&mut self, owner: EntityId, kind: ThrowableKind, host: &mut dyn Host) -> Option<EntityId> {
        let (eye, direction) = self.launch_vector(owner, host)?;
        let (entity_kind, projectile_kind) = match kind {
            ThrowableKind::Snowball => (self.entity_kinds.snowball, ProjectileKind::Snowball),
            ThrowableKind::Egg => (self.entity_kinds.egg, ProjectileKind::Egg),
            ThrowableKind::EnderPearl => (self.entity_kinds.ender_pearl, ProjectileKind::EnderPearl),
        };
        let entity = host.spawn_entity(entity_kind, eye);
        let projectile = Projectile::new(entity, owner, projectile_kind, eye, direction * THROWABLE_LAUNCH_SPEED);
        self.projectiles.insert(projectile);
        Some(entity)
    }

    fn spawn_fishing_bobber(&mut self, owner: EntityId, host: &mut dyn Host) -> Option<ProjectileKey> {
        let (eye, direction) = self.launch_vector(owner, host)?;
        let entity = host.spawn_entity(self.entity_kinds.fishing_bobber, eye);
        let kind = ProjectileKind::FishingBobber { hooked_entity: None, origin_mode: self.bobber_origin_mode };
        let projectile = Projectile::new(entity, owner, kind, eye, direction * FISHING_BOBBER_LAUNCH_SPEED);
        Some(self.projectiles.insert(projectile))
    }

    fn launch_vector(&self, owner: EntityId, host: &dyn Host) -> Option<(Vec3, Vec3)> {
        let pos = host.position(owner)?;
        let (yaw, pitch) = host.yaw_pitch(owner)?;
        let eye = pos + Vec3::new(0.0, host.eye_height(owner, host.pose(owner)), 0.0);
        Some((eye, yaw_pitch_to_direction(yaw, pitch)))
    }

    /// State reset on spawn: only fall tracking needs re-arming.
    pub fn on_player_spawn(&mut self, player: EntityId, host: &mut dyn Host) {
        self.environmental.fall.reset(player, host);
    }

    pub fn on_player_death(&mut self, player: EntityId, host: &mut dyn Host) {
        self.clear_player_state(player, host);
    }

    pub fn on_player_disconnect(&mut self, player: EntityId, host: &mut dyn Host) {
        self.clear_player_state(player, host);
    }

    fn clear_player_state(&mut self, player: EntityId, host: &mut dyn Host) {
        self.environmental.clear_state(player);
        self.pipeline.invuln.clear_state(player);
        self.pipeline.blocking.clear(player);
        self.knockback.clear_state(player);
        self.swing_window.clear_state(player);
        self.version.clear_state(player);
        self.bow_draw_start.remove(&player);
        if let Some(key) = self.fishing_rod_cast.remove(&player) {
            if let Some(bobber) = self.projectiles.remove(key) {
                host.remove_entity(bobber.id);
            }
        }
        self.tags.clear_entity(player);
    }

    /// ViaVersion/Velocity client-version detection.
    pub fn on_plugin_message(&mut self, player: EntityId, channel: &str, bytes: &[u8]) -> Option<ClientVersion> {
        self.version.on_plugin_message(player, channel, bytes)
    }

    #[must_use]
    pub fn is_legacy_client(&self, player: EntityId) -> bool {
        self.version.is_legacy(player)
    }

    fn apply_and_dispatch(
        &mut self,
        victim: EntityId,
        event: DamageEvent,
        from_swing_window: bool,
        shooter_origin_pos: Option<Vec3>,
        host: &mut dyn Host,
    ) -> DamageResult {
        let ctx = PipelineContext { from_swing_window, buffered_was_sprinting: None };
        let result = apply_damage(&mut self.pipeline, &self.tags, &self.clock, victim, event, ctx, host);
        self.dispatch_post_pipeline(&result, shooter_origin_pos, from_swing_window, host);
        result
    }

    /// Knockback dispatch and swing-window bookkeeping that follow every landed hit.
    fn dispatch_post_pipeline(
        &mut self,
        result: &DamageResult,
        shooter_origin_pos: Option<Vec3>,
        from_swing_window: bool,
        host: &mut dyn Host,
    ) {
        if should_dispatch_knockback(result) {
            let attacker_item = result.attacker.and_then(|a| host.held_item(a));
            let enchantment_level = attacker_item.as_ref().map_or(0, knockback_enchant_level);
            let blocking = self.pipeline.blocking.is_blocking(result.victim);
            let request = KnockbackRequest {
                victim: result.victim,
                attacker: result.attacker,
                shooter_origin_pos,
                kind: if shooter_origin_pos.is_some() { KnockbackKind::Projectile } else { KnockbackKind::Attack },
                was_sprinting: result.was_sprinting,
                enchantment_level,
            };
            self.knockback.apply_knockback(
                &self.tags,
                &self.pipeline.config,
                self.clock.current(),
                &request,
                attacker_item.as_ref(),
                blocking,
                result.props.blockable,
                host,
            );
        }

        if !from_swing_window {
            if let Some(attacker) = result.attacker {
                if host.is_player(attacker) {
                    self.swing_window.record_hit(attacker, result.victim, self.clock.current());
                }
            }
        }
    }
}
