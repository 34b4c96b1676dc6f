//! Tag Store: typed key/value pairs attached to entities and the world.
//!
//! Item-stack tags live directly on `ItemStack::tags` (value-copied, see [`crate::entity::TagBag`])
//! since items are snapshots, not handles the store can key on. Entity and world tags are
//! transient — they live only as long as this store does and are not part of any save format.

use std::any::Any;
use std::collections::HashMap;

use crate::entity::EntityId;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TagScope {
    Entity(EntityId),
    World,
}

/// Type-erased, per-scope key/value store. Transient combat-tuning state lives here — e.g. a
/// world-wide "knockback disabled" switch, or a per-entity "last hit stun" marker a plugin wants
/// to read back.
#[derive(Default)]
pub struct TagStore {
    entity: HashMap<EntityId, HashMap<String, Box<dyn Any>>>,
    world: HashMap<String, Box<dyn Any>>,
}

impl TagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn map_for(&self, scope: TagScope) -> Option<&HashMap<String, Box<dyn Any>>> {
        match scope {
            TagScope::Entity(id) => self.entity.get(&id),
            TagScope::World => Some(&self.world),
        }
    }

    fn map_for_mut(&mut self, scope: TagScope) -> &mut HashMap<String, Box<dyn Any>> {
        match scope {
            TagScope::Entity(id) => self.entity.entry(id).or_default(),
            TagScope::World => &mut self.world,
        }
    }

    pub fn get<V: 'static + Clone>(&self, scope: TagScope, key: &str) -> Option<V> {
        self.map_for(scope)?.get(key)?.downcast_ref::<V>().cloned()
    }

    pub fn set<V: 'static>(&mut self, scope: TagScope, key: impl Into<String>, value: V) {
        self.map_for_mut(scope).insert(key.into(), Box::new(value));
    }

    pub fn remove(&mut self, scope: TagScope, key: &str) {
        if let TagScope::Entity(id) = scope {
            if let Some(map) = self.entity.get_mut(&id) {
                map.remove(key);
            }
            return;
        }
        self.world.remove(key);
    }

    pub fn contains(&self, scope: TagScope, key: &str) -> bool {
        self.map_for(scope).is_some_and(|m| m.contains_key(key))
    }

    /// Drops all tags belonging to an entity. Called when the host removes it from the world.
    pub fn clear_entity(&mut self, entity: EntityId) {
        self.entity.remove(&entity);
    }
}
