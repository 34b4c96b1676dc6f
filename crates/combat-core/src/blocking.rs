//! Blocking State: per-player shield/blocking toggle and its reduction multipliers.
//!
//! The reduction percentage and the knockback multipliers applied while blocking both flow
//! through the same cascade-style resolver as everything else (read from item/player/world tags);
//! this module only tracks the boolean state transition, which the host drives from right-click
//! and release/attack events.

use std::collections::HashSet;

use crate::entity::{EntityId, ItemStack};

#[derive(Default)]
pub struct BlockingState {
    blocking: HashSet<EntityId>,
    original_offhand: std::collections::HashMap<EntityId, Option<ItemStack>>,
}

impl BlockingState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_blocking(&self, player: EntityId) -> bool {
        self.blocking.contains(&player)
    }

    /// Triggered by the host on right-click with a blockable item. `offhand` is snapshotted so it
    /// can be restored if the host needs to mirror the vanilla shield-hold animation.
    pub fn start_blocking(&mut self, player: EntityId, offhand: Option<ItemStack>) {
        self.blocking.insert(player);
        self.original_offhand.insert(player, offhand);
    }

    /// Triggered on release or on the player attempting an attack while blocking.
    pub fn stop_blocking(&mut self, player: EntityId) -> Option<ItemStack> {
        self.blocking.remove(&player);
        self.original_offhand.remove(&player).flatten()
    }

    pub fn clear(&mut self, player: EntityId) {
        self.blocking.remove(&player);
        self.original_offhand.remove(&player);
    }
}

/// Damage reduction while blocking, before armor.
pub const DEFAULT_BLOCKING_DAMAGE_REDUCTION: f32 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_stop_clears_state() {
        let mut state = BlockingState::new();
        let p = EntityId(1);
        state.start_blocking(p, None);
        assert!(state.is_blocking(p));
        state.stop_blocking(p);
        assert!(!state.is_blocking(p));
    }
}
