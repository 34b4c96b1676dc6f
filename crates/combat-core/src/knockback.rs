//! Knockback Engine: resolves and applies the velocity delta that follows a landed (or
//! replacement) hit.
//!
//! Direction and magnitude are computed independently, then blended per the resolved
//! [`DirectionBlendMode`], favoring small composable value types over one monolithic formula.

use std::collections::{HashMap, VecDeque};

use glam::{Vec2, Vec3};

use crate::config::{ConfigResolver, DirectionBlendMode, KnockbackConfig};
use crate::entity::{EntityId, ItemStack};
use crate::host::Host;
use crate::tag::TagStore;

/// Source of a knockback application.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum KnockbackKind {
    Attack,
    Projectile,
}

/// Converts a Minecraft yaw (degrees, 0 = south/+Z, increasing clockwise) into a unit XZ forward
/// vector.
#[must_use]
pub fn yaw_to_forward_xz(yaw_degrees: f32) -> Vec2 {
    let rad = yaw_degrees.to_radians();
    Vec2::new(-rad.sin(), rad.cos())
}

/// Per-player record of sprint state over the last 40 ticks.
#[derive(Default)]
struct SprintRingBuffer {
    samples: VecDeque<(u64, bool)>,
}

const SPRINT_RING_BUFFER_CAPACITY: usize = 40;

impl SprintRingBuffer {
    fn push(&mut self, tick: u64, sprinting: bool) {
        self.samples.push_back((tick, sprinting));
        while self.samples.len() > SPRINT_RING_BUFFER_CAPACITY {
            self.samples.pop_front();
        }
    }

    /// Whether any sample within `[current_tick - window, current_tick]` is `true`.
    fn any_true_within(&self, current_tick: u64, window: u64) -> bool {
        let floor = current_tick.saturating_sub(window);
        self.samples
            .iter()
            .rev()
            .take_while(|(tick, _)| *tick >= floor)
            .any(|(_, sprinting)| *sprinting)
    }
}

/// State the Knockback Engine carries across ticks: per-player sprint history and the last tick a
/// dispatch happened, to dedup same-tick double-applies.
#[derive(Default)]
pub struct KnockbackEngine {
    sprint_history: HashMap<EntityId, SprintRingBuffer>,
    last_knockback_tick: HashMap<EntityId, u64>,
}

/// Everything [`KnockbackEngine::apply_knockback`] needs that isn't already owned by the engine
/// itself, passed explicitly instead of living as ambient state.
pub struct KnockbackRequest {
    pub victim: EntityId,
    pub attacker: Option<EntityId>,
    /// Present for projectiles: the position recorded at spawn time, used as the knockback source
    /// regardless of where the projectile currently is.
    pub shooter_origin_pos: Option<Vec3>,
    pub kind: KnockbackKind,
    /// `Some(trusted_value)` when the caller already knows sprint state for certain (e.g. a
    /// buffered hit's captured sprint snapshot); `None` means "ask the ring buffer".
    pub was_sprinting: Option<bool>,
    pub enchantment_level: u32,
}

impl KnockbackEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tick's sprint sample for the ring buffer; driven by `on_player_tick`.
    pub fn record_sprint_sample(&mut self, player: EntityId, tick: u64, sprinting: bool) {
        self.sprint_history.entry(player).or_default().push(tick, sprinting);
    }

    pub fn clear_state(&mut self, player: EntityId) {
        self.sprint_history.remove(&player);
        self.last_knockback_tick.remove(&player);
    }

    /// Whether knockback already fired for this victim this tick.
    #[must_use]
    pub fn already_dispatched(&self, victim: EntityId, current_tick: u64) -> bool {
        self.last_knockback_tick.get(&victim) == Some(&current_tick)
    }

    fn effective_sprint(
        &self,
        attacker: EntityId,
        current_tick: u64,
        latency_ms: u32,
        config: &KnockbackConfig,
        was_sprinting: Option<bool>,
    ) -> bool {
        if let Some(trusted) = was_sprinting {
            return trusted;
        }
        // Latency-compensated window: min(configured max, latency/2 in ticks).
        let latency_ticks = (f64::from(latency_ms) / 2.0 * 20.0 / 1000.0).round() as u64;
        let window = latency_ticks.min(u64::from(config.sprint_window_max_ticks));
        self.sprint_history
            .get(&attacker)
            .is_some_and(|buf| buf.any_true_within(current_tick, window))
    }

    /// Resolves configuration, direction, and magnitude, then calls `host.set_velocity`. Returns
    /// `false` without mutating anything if this victim already received knockback this tick.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_knockback(
        &mut self,
        tags: &TagStore,
        config: &ConfigResolver,
        current_tick: u64,
        request: &KnockbackRequest,
        attacker_item: Option<&ItemStack>,
        blocking: bool,
        blockable: bool,
        host: &mut dyn Host,
    ) -> bool {
        if self.already_dispatched(request.victim, current_tick) {
            return false;
        }

        let cfg = config.resolve_knockback(tags, attacker_item, request.attacker, request.victim, None);

        let Some(victim_pos) = host.position(request.victim) else {
            return false;
        };
        let source_pos = request
            .shooter_origin_pos
            .or_else(|| request.attacker.and_then(|a| host.position(a)));

        let forward_actor = request.attacker;
        let look_yaw = forward_actor
            .and_then(|a| host.yaw_pitch(a))
            .map_or(0.0, |(yaw, _)| yaw);
        let look_dir = yaw_to_forward_xz(look_yaw);

        let pos_dir = source_pos.map_or(look_dir, |origin| {
            let delta = Vec2::new(victim_pos.x - origin.x, victim_pos.z - origin.z);
            if delta.length_squared() < 1e-8 { look_dir } else { delta.normalize() }
        });

        let sprinting = request.attacker.map_or(false, |a| {
            self.effective_sprint(a, current_tick, host.latency_ms(a), &cfg, request.was_sprinting)
        });

        let off_ground = !host.on_ground(request.victim);
        let comp = cfg.components;

        let mut horizontal = comp.horizontal + f32::from(off_ground) * comp.air_horizontal;
        horizontal += request.enchantment_level as f32 * cfg.enchant_per_level;
        if sprinting {
            horizontal += comp.sprint_horizontal;
        }

        let mut vertical = comp.vertical + f32::from(off_ground) * comp.air_vertical;
        if sprinting {
            vertical += comp.sprint_vertical;
        }
        vertical = vertical.clamp(-cfg.vertical_limit, cfg.vertical_limit);

        let weight = if sprinting { cfg.sprint_look_weight } else { cfg.look_weight };
        let (final_xz, h_mag) = match cfg.direction_blend_mode {
            DirectionBlendMode::BlendDirections => {
                let blended = pos_dir * (1.0 - weight) + look_dir * weight;
                let normalized = if blended.length_squared() < 1e-8 { pos_dir } else { blended.normalize() };
                (normalized, horizontal)
            }
            DirectionBlendMode::AddVectors => {
                let pos_part = pos_dir * horizontal * (1.0 - weight);
                let look_part = look_dir * horizontal * weight;
                let combined = pos_part + look_part;
                let mag = combined.length();
                let dir = if mag < 1e-8 { pos_dir } else { combined / mag };
                (dir, mag)
            }
        };

        let mut new_velocity = Vec3::new(final_xz.x * h_mag, vertical, final_xz.y * h_mag);

        if blocking && blockable {
            new_velocity.x *= cfg.blocking_horizontal_multiplier;
            new_velocity.z *= cfg.blocking_horizontal_multiplier;
            new_velocity.y *= cfg.blocking_vertical_multiplier;
        }

        host.set_velocity(request.victim, new_velocity);
        self.last_knockback_tick.insert(request.victim, current_tick);
        true
    }
}
