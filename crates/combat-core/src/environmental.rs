//! Environmental Damage: fall distance, fire/lava, and cactus ticking into the damage pipeline.
//! Every tracker here is a pure dispatcher — it decides *whether* to raise a [`DamageEvent`] this
//! tick, never applies health changes itself.

use std::collections::HashMap;

use crate::config::{DamageType, IgnitionMode};
use crate::damage::DamageEvent;
use crate::entity::EntityId;
use crate::host::Host;

/// Fall damage: amount = max(0, ceil(fall_distance - 3)). Fall distance accumulation itself is
/// the host's physics job — physics/collision is an external collaborator — so this tracker only
/// watches for the ground-contact edge and decides whether to dispatch.
#[derive(Default)]
pub struct FallTracker {
    was_on_ground: HashMap<EntityId, bool>,
}

pub const FALL_DAMAGE_FREE_DISTANCE: f32 = 3.0;

impl FallTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Call once per player per tick. Returns a `Fall` damage event exactly on the tick the
    /// player transitions from airborne to grounded with more than the free fall distance
    /// accumulated.
    pub fn tick(&mut self, entity: EntityId, host: &mut dyn Host) -> Option<DamageEvent> {
        let on_ground = host.on_ground(entity);
        let was_on_ground = self.was_on_ground.insert(entity, on_ground).unwrap_or(true);

        if on_ground && !was_on_ground {
            let distance = host.fall_distance(entity);
            host.reset_fall_distance(entity);
            if distance > FALL_DAMAGE_FREE_DISTANCE {
                let amount = (distance - FALL_DAMAGE_FREE_DISTANCE).ceil();
                return Some(DamageEvent {
                    damage_type: DamageType::Fall,
                    source: entity,
                    attacker: None,
                    source_position: None,
                    raw_amount: amount,
                    cancelled: false,
                });
            }
        }
        None
    }

    pub fn clear_state(&mut self, entity: EntityId) {
        self.was_on_ground.remove(&entity);
    }

    /// Resets tracking without dispatching damage (spec: reset on death/spawn/void/pearl-teleport
    /// — the open question about same-tick bounce re-application is resolved by simply not
    /// tracking sub-tick ground contact; only the tick-boundary transition matters here).
    pub fn reset(&mut self, entity: EntityId, host: &mut dyn Host) {
        host.reset_fall_distance(entity);
        self.was_on_ground.insert(entity, true);
    }
}

/// Fire/lava damage, scheduled per the resolved [`IgnitionMode`].
#[derive(Default)]
pub struct FireTracker {
    last_damage_tick: HashMap<EntityId, u64>,
    ignited_tick: HashMap<EntityId, u64>,
}

impl FireTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        entity: EntityId,
        current_tick: u64,
        ignition_delay_ticks: u32,
        amount_per_tick: f32,
        mode: IgnitionMode,
        host: &mut dyn Host,
    ) -> Option<DamageEvent> {
        let on_fire = host.on_fire_ticks(entity) > 0;
        if !on_fire {
            self.ignited_tick.remove(&entity);
            self.last_damage_tick.remove(&entity);
            return None;
        }

        let ignited_at = *self.ignited_tick.entry(entity).or_insert(current_tick);
        let event = |amount: f32| DamageEvent {
            damage_type: DamageType::Fire,
            source: entity,
            attacker: None,
            source_position: None,
            raw_amount: amount,
            cancelled: false,
        };

        match mode {
            IgnitionMode::Instant => {
                if self.last_damage_tick.insert(entity, current_tick).is_none() {
                    Some(event(amount_per_tick))
                } else {
                    None
                }
            }
            IgnitionMode::Delayed => {
                let already_fired = self.last_damage_tick.contains_key(&entity);
                if !already_fired && current_tick.saturating_sub(ignited_at) >= u64::from(ignition_delay_ticks) {
                    self.last_damage_tick.insert(entity, current_tick);
                    Some(event(amount_per_tick))
                } else {
                    None
                }
            }
            IgnitionMode::TickBased => {
                let interval = u64::from(ignition_delay_ticks.max(1));
                let due = match self.last_damage_tick.get(&entity) {
                    None => true,
                    Some(&last) => current_tick.saturating_sub(last) >= interval,
                };
                if due {
                    self.last_damage_tick.insert(entity, current_tick);
                    Some(event(amount_per_tick))
                } else {
                    None
                }
            }
        }
    }

    pub fn clear_state(&mut self, entity: EntityId) {
        self.ignited_tick.remove(&entity);
        self.last_damage_tick.remove(&entity);
    }
}

/// Cactus damage: dispatched once per tick the victim's bounding box overlaps a harmful block.
#[derive(Default)]
pub struct CactusTracker;

impl CactusTracker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn tick(&self, entity: EntityId, amount_per_tick: f32, host: &dyn Host) -> Option<DamageEvent> {
        let position = host.position(entity)?;
        let block = host.get_block(position.as_ivec3());
        if !host.block_is_harmful(block) {
            return None;
        }
        Some(DamageEvent {
            damage_type: DamageType::Cactus,
            source: entity,
            attacker: None,
            source_position: None,
            raw_amount: amount_per_tick,
            cancelled: false,
        })
    }
}

/// Owns all three trackers; `on_player_tick` drives it. Each tracker is purely a dispatcher into
/// the damage pipeline.
#[derive(Default)]
pub struct EnvironmentalDamage {
    pub fall: FallTracker,
    pub fire: FireTracker,
    pub cactus: CactusTracker,
}

impl EnvironmentalDamage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_state(&mut self, entity: EntityId) {
        self.fall.clear_state(entity);
        self.fire.clear_state(entity);
    }
}
