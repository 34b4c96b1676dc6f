//! Invulnerability Tracker: i-frames, damage replacement, and single-slot buffered hits.
//!
//! Vanilla's i-frame rule is "a new hit during the window only lands if it deals more damage than
//! the one that opened the window" (damage replacement); this tracker holds exactly the state
//! needed to evaluate that rule and nothing about how the replacement amount is computed — that's
//! the damage pipeline's job.

use std::collections::HashMap;

use glam::Vec3;

use crate::entity::{EntityId, ItemStack};

#[derive(Clone, Debug)]
pub struct InvulnerabilityState {
    pub last_damage_tick: u64,
    pub last_damage_amount: f32,
    pub last_damage_type: u32,
    pub last_attacker: Option<EntityId>,
    pub last_melee_item: Option<ItemStack>,
    pub was_replacement: bool,
}

/// A hit that arrived while the victim was invulnerable but didn't beat the current amount, held
/// so it can be re-evaluated once the window closes. At most one buffered hit per victim at a
/// time — a second buffered hit during the window replaces, not stacks, the first.
#[derive(Clone, Debug)]
pub struct BufferedHit {
    pub damage_type: u32,
    pub attacker: Option<EntityId>,
    pub source: EntityId,
    pub source_position: Option<Vec3>,
    pub raw_amount: f32,
    pub melee_item: Option<ItemStack>,
    pub was_sprinting: bool,
    pub fire_at_tick: u64,
}

#[derive(Default)]
pub struct InvulnerabilityTracker {
    state: HashMap<EntityId, InvulnerabilityState>,
    buffered: HashMap<EntityId, BufferedHit>,
}

impl InvulnerabilityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, entity: EntityId) -> Option<&InvulnerabilityState> {
        self.state.get(&entity)
    }

    /// Whether `entity` is still inside its i-frame window as of `current_tick`, given the
    /// effective (config-cascade-resolved) window length.
    #[must_use]
    pub fn is_invulnerable(&self, entity: EntityId, current_tick: u64, effective_ticks: u32) -> bool {
        self.state
            .get(&entity)
            .is_some_and(|s| current_tick < s.last_damage_tick + u64::from(effective_ticks))
    }

    #[must_use]
    pub fn ticks_since_last(&self, entity: EntityId, current_tick: u64) -> Option<u64> {
        self.state
            .get(&entity)
            .map(|s| current_tick.saturating_sub(s.last_damage_tick))
    }

    #[must_use]
    pub fn last_damage_amount(&self, entity: EntityId) -> Option<f32> {
        self.state.get(&entity).map(|s| s.last_damage_amount)
    }

    /// Opens (or refreshes) the i-frame window for `entity`. Called once a hit actually lands.
    pub fn mark_damaged(
        &mut self,
        entity: EntityId,
        tick: u64,
        amount: f32,
        damage_type: u32,
        attacker: Option<EntityId>,
        melee_item: Option<ItemStack>,
    ) {
        self.state.insert(
            entity,
            InvulnerabilityState {
                last_damage_tick: tick,
                last_damage_amount: amount,
                last_damage_type: damage_type,
                last_attacker: attacker,
                last_melee_item: melee_item,
                was_replacement: false,
            },
        );
    }

    /// Updates the tracked amount without resetting `last_damage_tick` — used when a damage
    /// replacement hit lands mid-window; the window itself doesn't restart, only the remembered
    /// amount does.
    pub fn update_amount(&mut self, entity: EntityId, amount: f32) {
        if let Some(state) = self.state.get_mut(&entity) {
            state.last_damage_amount = amount;
        }
    }

    pub fn set_replacement_flag(&mut self, entity: EntityId, value: bool) {
        if let Some(state) = self.state.get_mut(&entity) {
            state.was_replacement = value;
        }
    }

    pub fn clear_state(&mut self, entity: EntityId) {
        self.state.remove(&entity);
        self.buffered.remove(&entity);
    }

    #[must_use]
    pub fn has_buffered_hit(&self, entity: EntityId) -> bool {
        self.buffered.contains_key(&entity)
    }

    /// Replaces any existing buffered hit for this victim — a second buffered hit during the
    /// window overwrites, never stacks.
    pub fn set_buffered_hit(&mut self, entity: EntityId, hit: BufferedHit) {
        self.buffered.insert(entity, hit);
    }

    pub fn take_buffered_hit(&mut self, entity: EntityId) -> Option<BufferedHit> {
        self.buffered.remove(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invulnerable_window_closes_after_effective_ticks() {
        let mut tracker = InvulnerabilityTracker::new();
        let e = EntityId(1);
        tracker.mark_damaged(e, 100, 4.0, 0, None, None);

        assert!(tracker.is_invulnerable(e, 105, 10));
        assert!(!tracker.is_invulnerable(e, 110, 10));
    }

    #[test]
    fn update_amount_does_not_restart_window() {
        let mut tracker = InvulnerabilityTracker::new();
        let e = EntityId(1);
        tracker.mark_damaged(e, 100, 4.0, 0, None, None);
        tracker.update_amount(e, 6.0);

        let state = tracker.state(e).unwrap();
        assert_eq!(state.last_damage_tick, 100);
        assert_eq!(state.last_damage_amount, 6.0);
    }

    #[test]
    fn second_buffered_hit_replaces_first() {
        let mut tracker = InvulnerabilityTracker::new();
        let e = EntityId(1);
        let hit = |amount| BufferedHit {
            damage_type: 0,
            attacker: None,
            source: e,
            source_position: None,
            raw_amount: amount,
            melee_item: None,
            was_sprinting: false,
            fire_at_tick: 10,
        };
        tracker.set_buffered_hit(e, hit(1.0));
        tracker.set_buffered_hit(e, hit(2.0));
        assert_eq!(tracker.take_buffered_hit(e).unwrap().raw_amount, 2.0);
        assert!(tracker.take_buffered_hit(e).is_none());
    }
}
