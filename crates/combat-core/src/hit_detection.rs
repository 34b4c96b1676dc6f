//! Hit Detection & Swing Window: reach validation, server-side raycast for modern clients, and
//! the swing-window tracker that lets a later arm-swing still register as a hit on a victim
//! recorded a few ticks earlier.

use std::collections::HashMap;

use combat_geometry::{Aabb, Ray};
use glam::{IVec3, Vec3};
use tracing::debug;

use crate::entity::EntityId;
use crate::host::Host;

/// Reach configuration. Vanilla ships two tiers (survival vs. creative); presets may tune both.
#[derive(Copy, Clone, Debug)]
pub struct ReachConfig {
    pub max_reach: f32,
    /// How far the victim's hitbox is expanded before measuring reach (primary tier: 0.1 block).
    pub hitbox_expansion_limit: f32,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            max_reach: crate::presets::DEFAULT_REACH_SURVIVAL,
            hitbox_expansion_limit: crate::presets::DEFAULT_HITBOX_EXPANSION_PRIMARY,
        }
    }
}

/// Nearest point on `aabb` to `point`.
fn nearest_point(aabb: &Aabb, point: Vec3) -> Vec3 {
    point.clamp(aabb.min, aabb.max)
}

/// `is_reach_valid`: fast-rejects on horizontal distance, then checks a 3D distance reduced by
/// the expansion limit.
#[must_use]
pub fn is_reach_valid(eye: Vec3, victim_bbox: &Aabb, config: ReachConfig) -> bool {
    let nearest = nearest_point(victim_bbox, eye);
    let horizontal = Vec3::new(eye.x - nearest.x, 0.0, eye.z - nearest.z).length();
    if horizontal > config.max_reach + config.hitbox_expansion_limit {
        debug!(horizontal, "reach fast-reject");
        return false;
    }

    let center = victim_bbox.mid();
    let eye_to_center = eye.distance(center);
    let effective_distance = (eye_to_center - config.hitbox_expansion_limit).max(0.0);
    let valid = effective_distance <= config.max_reach;
    if !valid {
        debug!(effective_distance, "reach rejected");
    }
    valid
}

/// Whether any solid block's voxel cell intersects the segment `from -> to` (spec: "no intervening
/// solid block" check, shared by reach validation callers and the swing window).
#[must_use]
pub fn solid_block_intervenes(from: Vec3, to: Vec3, host: &dyn Host) -> bool {
    let ray = Ray::from_points(from, to);
    let max_dist = from.distance(to);
    let bounds_min = IVec3::new(
        from.x.min(to.x).floor() as i32 - 1,
        from.y.min(to.y).floor() as i32 - 1,
        from.z.min(to.z).floor() as i32 - 1,
    );
    let bounds_max = IVec3::new(
        from.x.max(to.x).ceil() as i32 + 1,
        from.y.max(to.y).ceil() as i32 + 1,
        from.z.max(to.z).ceil() as i32 + 1,
    );
    for cell in ray.voxel_traversal(bounds_min, bounds_max) {
        if cell.as_vec3().distance(from) > max_dist + 1.5 {
            break;
        }
        let block = host.get_block(cell);
        if !host.block_is_solid(block) {
            continue;
        }
        let shape = host.block_collision_shape(block);
        let relative = from - cell.as_vec3();
        let segment = Aabb::new(Vec3::ZERO, to - from).expand(0.001);
        if shape.intersect_box(relative, &segment) {
            return true;
        }
    }
    false
}

/// Direction vector from yaw/pitch (degrees). Matches [`crate::knockback::yaw_to_forward_xz`] on
/// the horizontal plane, adding the vertical pitch component.
#[must_use]
pub fn yaw_pitch_to_direction(yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
    let yaw = yaw_degrees.to_radians();
    let pitch = pitch_degrees.to_radians();
    Vec3::new(-yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos())
}

/// `find_target_from_swing`: server-side raycast from the attacker's eye along their look
/// direction. Returns the nearest unobstructed entity, or `None` if `filter_blocks` and a solid
/// block precedes every candidate entity.
pub fn find_target_from_swing(
    attacker: EntityId,
    eye: Vec3,
    direction: Vec3,
    candidates: &[EntityId],
    reach: ReachConfig,
    filter_blocks: bool,
    host: &dyn Host,
) -> Option<EntityId> {
    let ray = Ray::new(eye, direction);
    let mut nearest: Option<(EntityId, f32)> = None;

    for &candidate in candidates {
        if candidate == attacker {
            continue;
        }
        let Some(bbox) = host.bounding_box(candidate) else {
            continue;
        };
        let expanded = bbox.expand(reach.hitbox_expansion_limit);
        let Some(t) = expanded.intersect_ray(&ray) else {
            continue;
        };
        if t > reach.max_reach + reach.hitbox_expansion_limit {
            continue;
        }
        let hit_point = ray.at(t);
        if solid_block_intervenes(eye, hit_point, host) {
            continue;
        }
        if nearest.is_none_or(|(_, best)| t < best) {
            nearest = Some((candidate, t));
        }
    }

    if filter_blocks {
        if let Some((_, entity_t)) = nearest {
            let probe_end = ray.at(entity_t);
            if solid_block_intervenes(eye, probe_end, host) {
                return None;
            }
        }
    }

    nearest.map(|(entity, _)| entity)
}

/// Per-attacker swing-window bookkeeping.
#[derive(Default)]
struct AttackerWindow {
    /// victim -> tick the hit was recorded.
    recorded_hits: HashMap<EntityId, u64>,
    last_swing_tick: Option<u64>,
    last_consumed_swing_tick: Option<u64>,
}

/// Tracks attacker→victim hit pairs so a swing that arrives a few ticks after the client's
/// crosshair was actually over the victim still registers.
#[derive(Default)]
pub struct SwingWindowTracker {
    attackers: HashMap<EntityId, AttackerWindow>,
}

impl SwingWindowTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a landed hit that did NOT itself come from swing-window consumption (spec: the
    /// `FROM_SWING_WINDOW` flag "prevents recording swing-window hits back into the victim map").
    pub fn record_hit(&mut self, attacker: EntityId, victim: EntityId, tick: u64) {
        self.attackers.entry(attacker).or_default().recorded_hits.insert(victim, tick);
    }

    pub fn record_swing(&mut self, attacker: EntityId, tick: u64) {
        self.attackers.entry(attacker).or_default().last_swing_tick = Some(tick);
    }

    fn prune(window: &mut AttackerWindow, current_tick: u64, swing_hit_window_ticks: u32) {
        window
            .recorded_hits
            .retain(|_, hit_tick| current_tick.saturating_sub(*hit_tick) <= u64::from(swing_hit_window_ticks));
    }

    /// Each tick, for each attacker with an unconsumed swing young enough, checks every recorded
    /// victim still inside its hit window: if a raycast now lands (and reach is valid, and no
    /// block intervenes), the swing is consumed and the victim is returned so the caller can fire
    /// the pipeline with `from_swing_window = true`.
    #[allow(clippy::too_many_arguments)]
    pub fn try_consume(
        &mut self,
        attacker: EntityId,
        current_tick: u64,
        swing_look_check_ticks: u32,
        swing_hit_window_ticks: u32,
        eye: Vec3,
        direction: Vec3,
        reach: ReachConfig,
        host: &dyn Host,
    ) -> Option<EntityId> {
        let window = self.attackers.get_mut(&attacker)?;
        Self::prune(window, current_tick, swing_hit_window_ticks);

        let swing_tick = window.last_swing_tick?;
        if window.last_consumed_swing_tick == Some(swing_tick) {
            return None;
        }
        if current_tick.saturating_sub(swing_tick) > u64::from(swing_look_check_ticks) {
            return None;
        }

        let mut candidates: Vec<(EntityId, u64)> = window.recorded_hits.iter().map(|(&v, &t)| (v, t)).collect();
        candidates.sort_by_key(|(_, tick)| *tick);

        for (victim, _) in candidates {
            let Some(bbox) = host.bounding_box(victim) else { continue };
            if !is_reach_valid(eye, &bbox, reach) {
                continue;
            }
            let ray = Ray::new(eye, direction);
            let expanded = bbox.expand(reach.hitbox_expansion_limit);
            let Some(t) = expanded.intersect_ray(&ray) else { continue };
            let hit_point = ray.at(t);
            if solid_block_intervenes(eye, hit_point, host) {
                continue;
            }

            let window = self.attackers.get_mut(&attacker).expect("checked above");
            window.last_consumed_swing_tick = Some(swing_tick);
            return Some(victim);
        }
        None
    }

    pub fn clear_state(&mut self, attacker: EntityId) {
        self.attackers.remove(&attacker);
    }
}
