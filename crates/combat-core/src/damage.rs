//! Damage Pipeline: the single entry point that turns a raw damage event into a health mutation,
//! running it through mitigation, i-frames, and replacement/buffering.

use std::collections::HashMap;

use glam::Vec3;
use tracing::warn;

use crate::armor::ArmorCalculator;
use crate::blocking::{BlockingState, DEFAULT_BLOCKING_DAMAGE_REDUCTION};
use crate::clock::{Scheduler, TickClock};
use crate::config::{ConfigResolver, DamageCascadeResult, DamageType, DamageTypeProperties};
use crate::entity::EntityId;
use crate::host::Host;
use crate::invuln::{BufferedHit, InvulnerabilityTracker};
use crate::tag::TagStore;

/// A damage event as delivered by the host. `cancelled` may be flipped by a listener before the
/// event reaches the pipeline; the pipeline honors it as the very first check.
#[derive(Clone, Debug)]
pub struct DamageEvent {
    pub damage_type: DamageType,
    pub source: EntityId,
    pub attacker: Option<EntityId>,
    pub source_position: Option<Vec3>,
    pub raw_amount: f32,
    pub cancelled: bool,
}

impl DamageEvent {
    #[must_use]
    pub const fn melee(attacker: EntityId, victim_as_source: EntityId) -> Self {
        Self {
            damage_type: DamageType::Melee,
            source: victim_as_source,
            attacker: Some(attacker),
            source_position: None,
            raw_amount: 0.0,
            cancelled: false,
        }
    }
}

/// Passed through every `apply_damage` call explicitly instead of living as ambient state.
/// `from_swing_window` suppresses re-recording the hit into the swing-window victim map;
/// `buffered_was_sprinting` carries the attacker's captured sprint state when a buffered hit
/// refires, since the attacker may no longer be sprinting by then.
#[derive(Copy, Clone, Debug, Default)]
pub struct PipelineContext {
    pub from_swing_window: bool,
    pub buffered_was_sprinting: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DamageResult {
    pub applied: bool,
    pub was_replacement: bool,
    pub final_damage: f32,
    pub props: DamageTypeProperties,
    pub attacker: Option<EntityId>,
    pub source: EntityId,
    pub victim: EntityId,
    pub shooter_origin_position: Option<Vec3>,
    /// The attacker's sprint state captured at the moment the hit was recorded, not re-read from
    /// the host at knockback-dispatch time — matters for a buffered hit firing ticks after the
    /// attacker may have stopped sprinting.
    pub was_sprinting: Option<bool>,
}

impl DamageResult {
    fn rejected(victim: EntityId, event: &DamageEvent, props: DamageTypeProperties) -> Self {
        Self {
            applied: false,
            was_replacement: false,
            final_damage: 0.0,
            props,
            attacker: event.attacker,
            source: event.source,
            victim,
            shooter_origin_position: None,
            was_sprinting: None,
        }
    }
}

pub const CRITICAL_HIT_MULTIPLIER: f32 = 1.5;

/// Mutable state the pipeline needs across calls, gathered so `apply_damage` has one argument
/// besides the event and context.
pub struct DamagePipeline {
    pub invuln: InvulnerabilityTracker,
    pub config: ConfigResolver,
    pub blocking: BlockingState,
    pub armor: ArmorCalculator,
    /// `(victim, tick)` dedup: at most one damage event mutates health per victim per tick.
    dedup: HashMap<EntityId, u64>,
    pub buffered: Scheduler<(EntityId, BufferedHit)>,
    /// Preset-configured i-frame window length, rescaled by the clock before use — the
    /// vanilla/minemen/hypixel presets each pick a different value here.
    pub invulnerability_window_ticks: u32,
}

impl DamagePipeline {
    #[must_use]
    pub fn new(config: ConfigResolver) -> Self {
        Self {
            invuln: InvulnerabilityTracker::new(),
            config,
            blocking: BlockingState::new(),
            armor: ArmorCalculator::new(),
            dedup: HashMap::new(),
            buffered: Scheduler::new(),
            invulnerability_window_ticks: crate::presets::VANILLA_INVULNERABILITY_TICKS,
        }
    }

    #[must_use]
    pub fn shooter_origin_for(&self, source_position: Option<Vec3>) -> Option<Vec3> {
        source_position
    }

    /// Fires every buffered hit whose deferred tick has arrived. Must run before projectile and
    /// environmental processing for the tick.
    pub fn fire_due_buffered_hits(
        &mut self,
        tags: &TagStore,
        clock: &TickClock,
        host: &mut dyn Host,
    ) -> Vec<DamageResult> {
        let due = self.buffered.drain_due(clock.current());
        let mut results = Vec::with_capacity(due.len());
        for (victim, hit) in due {
            if host.health(victim).is_none() {
                // entity removed before the buffer fired; silently dropped.
                continue;
            }
            let event = DamageEvent {
                damage_type: DamageType::from(hit.damage_type),
                source: hit.source,
                attacker: hit.attacker,
                source_position: hit.source_position,
                raw_amount: hit.raw_amount,
                cancelled: false,
            };
            let ctx = PipelineContext {
                from_swing_window: false,
                buffered_was_sprinting: Some(hit.was_sprinting),
            };
            results.push(apply_damage(self, tags, clock, victim, event, ctx, host));
        }
        results
    }
}

impl From<u32> for DamageType {
    fn from(value: u32) -> Self {
        Self::Custom(value)
    }
}

impl From<DamageType> for u32 {
    fn from(value: DamageType) -> Self {
        match value {
            DamageType::Melee => 0,
            DamageType::Arrow => 1,
            DamageType::Thrown => 2,
            DamageType::Fall => 3,
            DamageType::Fire => 4,
            DamageType::Cactus => 5,
            DamageType::Generic => 6,
            DamageType::Custom(id) => id,
        }
    }
}

/// Single entry point. Returns a `DamageResult`; never panics or propagates an error to the
/// host — internal short-circuits log via `tracing::warn!` and reject.
#[tracing::instrument(skip(pipeline, tags, clock, host), fields(victim = victim.0))]
#[allow(clippy::too_many_lines)]
pub fn apply_damage(
    pipeline: &mut DamagePipeline,
    tags: &TagStore,
    clock: &TickClock,
    victim: EntityId,
    mut event: DamageEvent,
    ctx: PipelineContext,
    host: &mut dyn Host,
) -> DamageResult {
    let current_tick = clock.current();

    if event.cancelled {
        return DamageResult::rejected(victim, &event, DamageTypeProperties::default());
    }

    // 1. Dedup: at most one damage event mutates health per (victim, tick).
    if pipeline.dedup.get(&victim) == Some(&current_tick) {
        return DamageResult::rejected(victim, &event, DamageTypeProperties::default());
    }

    let Some(current_health) = host.health(victim) else {
        warn!("apply_damage called for victim with no tracked health; rejecting");
        return DamageResult::rejected(victim, &event, DamageTypeProperties::default());
    };

    let attacker_item = event.attacker.and_then(|a| host.held_item(a));

    // 2. Resolve effective properties via the cascade.
    let cascade = pipeline.config.resolve_damage(
        tags,
        event.damage_type,
        attacker_item.as_ref(),
        None,
        event.attacker,
        victim,
        None,
    );
    let (mut props, no_damage) = match cascade {
        DamageCascadeResult::Disabled => {
            return DamageResult::rejected(victim, &event, DamageTypeProperties::default());
        }
        DamageCascadeResult::Resolved { props, no_damage } => (props, no_damage),
    };

    // 3. Enabled check.
    if !props.enabled {
        return DamageResult::rejected(victim, &event, props);
    }

    // 4. Creative gate.
    let victim_mode = host.game_mode(victim);
    if victim_mode.is_invincible() && !props.bypass_creative {
        return DamageResult::rejected(victim, &event, props);
    }

    // 5. Calculate amount.
    let mut amount = event.raw_amount;
    if amount == 0.0 && event.damage_type == DamageType::Melee {
        if let Some(item) = attacker_item.as_ref() {
            amount = host.melee_base_damage(item.material);
        }
    }
    let was_sprinting = event
        .attacker
        .map(|attacker| ctx.buffered_was_sprinting.unwrap_or_else(|| host.is_sprinting(attacker)));
    if no_damage {
        amount = 0.0;
    } else if let Some(attacker) = event.attacker {
        let airborne = !host.on_ground(attacker);
        let falling = host.fall_distance(attacker) > 0.0;
        let sprinting = was_sprinting.unwrap_or(false);
        if airborne && falling && (pipeline.config.sprint_crit_allowed || !sprinting) {
            amount *= CRITICAL_HIT_MULTIPLIER;
        }
    }
    amount *= props.multiplier;
    if !amount.is_finite() || amount < 0.0 {
        warn!(amount, "invalid damage amount, clamping to zero");
        amount = 0.0;
    }

    // 6. Blocking reduction.
    if host.is_player(victim) && pipeline.blocking.is_blocking(victim) && props.blockable {
        amount *= 1.0 - DEFAULT_BLOCKING_DAMAGE_REDUCTION;
    }

    // 7. Armor reduction.
    if !props.penetrates_armor && host.is_player(victim) {
        amount = pipeline.armor.reduce(amount, host.armor_points(victim));
    }

    // 8. I-frame gate.
    let window_ticks = clock.rescale_ticks(pipeline.invulnerability_window_ticks);
    let invulnerable = pipeline.invuln.is_invulnerable(victim, current_tick, window_ticks);

    if props.bypass_invulnerability || !invulnerable {
        return apply_hit(
            pipeline, tags, clock, victim, &mut event, &mut props, amount, current_health, was_sprinting, host,
        );
    }

    i_frame_branch(pipeline, tags, clock, victim, &event, ctx, &props, amount, window_ticks, was_sprinting, host)
}

#[allow(clippy::too_many_arguments)]
fn apply_hit(
    pipeline: &mut DamagePipeline,
    _tags: &TagStore,
    clock: &TickClock,
    victim: EntityId,
    event: &mut DamageEvent,
    props: &mut DamageTypeProperties,
    amount: f32,
    current_health: f32,
    was_sprinting: Option<bool>,
    host: &mut dyn Host,
) -> DamageResult {
    let current_tick = clock.current();
    let new_health = (current_health - amount).max(0.0);

    if props.hurt_effect {
        host.set_health(victim, new_health);
    } else {
        host.set_health_silent(victim, new_health);
    }

    pipeline.invuln.mark_damaged(
        victim,
        current_tick,
        amount,
        u32::from(event.damage_type),
        event.attacker,
        event.attacker.and_then(|a| host.held_item(a)),
    );
    pipeline.invuln.take_buffered_hit(victim);
    pipeline.dedup.insert(victim, current_tick);

    DamageResult {
        applied: true,
        was_replacement: false,
        final_damage: amount,
        props: *props,
        attacker: event.attacker,
        source: event.source,
        victim,
        shooter_origin_position: event.source_position,
        was_sprinting,
    }
}

#[allow(clippy::too_many_arguments)]
fn i_frame_branch(
    pipeline: &mut DamagePipeline,
    _tags: &TagStore,
    clock: &TickClock,
    victim: EntityId,
    event: &DamageEvent,
    ctx: PipelineContext,
    props: &DamageTypeProperties,
    amount: f32,
    window_ticks: u32,
    was_sprinting: Option<bool>,
    host: &mut dyn Host,
) -> DamageResult {
    let current_tick = clock.current();
    let last_tick = pipeline.invuln.state(victim).map_or(current_tick, |s| s.last_damage_tick);
    let remaining = (last_tick + u64::from(window_ticks)).saturating_sub(current_tick);

    // Buffer check: only for attacker-based hits.
    if let Some(attacker) = event.attacker {
        if props.invulnerability_buffer_ticks > 0
            && remaining <= u64::from(props.invulnerability_buffer_ticks)
            && !pipeline.invuln.has_buffered_hit(victim)
        {
            let fire_at = last_tick + u64::from(window_ticks);
            let hit = BufferedHit {
                damage_type: u32::from(event.damage_type),
                attacker: Some(attacker),
                source: event.source,
                source_position: event.source_position,
                raw_amount: amount,
                melee_item: host.held_item(attacker),
                was_sprinting: ctx.buffered_was_sprinting.unwrap_or_else(|| host.is_sprinting(attacker)),
                fire_at_tick: fire_at,
            };
            pipeline.invuln.set_buffered_hit(victim, hit.clone());
            pipeline.buffered.schedule_at(fire_at, (victim, hit));
            return DamageResult {
                applied: false,
                was_replacement: false,
                final_damage: 0.0,
                props: *props,
                attacker: event.attacker,
                source: event.source,
                victim,
                shooter_origin_position: event.source_position,
                was_sprinting,
            };
        }
    }

    // Replacement check.
    if props.damage_replacement {
        if props.no_replacement_same_item {
            let current_item = event.attacker.and_then(|a| host.held_item(a));
            let last_item = pipeline.invuln.state(victim).and_then(|s| s.last_melee_item.clone());
            if let (Some(a), Some(b)) = (&current_item, &last_item) {
                if a.is_same_item(b) {
                    return DamageResult::rejected(victim, event, *props);
                }
            }
        }

        let previous = pipeline.invuln.last_damage_amount(victim).unwrap_or(0.0);
        if amount < previous + props.replacement_cutoff {
            return DamageResult::rejected(victim, event, *props);
        }

        let diff = (amount - previous).max(0.0);
        let diff = if props.penetrates_armor || !host.is_player(victim) {
            diff
        } else {
            pipeline.armor.reduce(diff, host.armor_points(victim))
        };

        let Some(current_health) = host.health(victim) else {
            return DamageResult::rejected(victim, event, *props);
        };
        let new_health = (current_health - diff).max(0.0);

        if props.hurt_effect {
            host.set_health(victim, new_health);
        } else {
            host.set_health_silent(victim, new_health);
        }

        pipeline.invuln.update_amount(victim, amount);
        pipeline.invuln.set_replacement_flag(victim, true);
        pipeline.invuln.take_buffered_hit(victim);
        pipeline.dedup.insert(victim, current_tick);

        return DamageResult {
            applied: true,
            was_replacement: true,
            final_damage: diff,
            props: *props,
            attacker: event.attacker,
            source: event.source,
            victim,
            shooter_origin_position: event.source_position,
            was_sprinting,
        };
    }

    DamageResult::rejected(victim, event, *props)
}

/// Whether knockback should follow a `DamageResult`.
#[must_use]
pub fn should_dispatch_knockback(result: &DamageResult) -> bool {
    result.applied && (!result.was_replacement || result.props.knockback_on_replacement)
}
