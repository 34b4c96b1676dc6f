//! Shared `Host` mock and fixture builders for the integration test suites.

use std::collections::HashMap;

use combat_core::clock::TickMode;
use combat_core::entity::{EntityId, EntityKindId, GameMode, ItemStack, Material, Pose};
use combat_core::host::{BlockId, CollisionShape, FullBlockShape, Host};
use combat_core::presets;
use combat_core::{CombatCore, ProjectileEntityKinds};
use combat_geometry::Aabb;
use glam::{IVec3, Vec3};

pub struct FakeHost {
    pub position: HashMap<EntityId, Vec3>,
    pub velocity: HashMap<EntityId, Vec3>,
    pub yaw_pitch: HashMap<EntityId, (f32, f32)>,
    pub on_ground: HashMap<EntityId, bool>,
    pub health: HashMap<EntityId, f32>,
    pub held: HashMap<EntityId, ItemStack>,
    pub sprinting: HashMap<EntityId, bool>,
    pub fall_distance: HashMap<EntityId, f32>,
    pub on_fire_ticks: HashMap<EntityId, u32>,
    pub solid_blocks: Vec<IVec3>,
    pub next_entity: u64,
    pub removed: Vec<EntityId>,
    pub spawned: Vec<(EntityKindId, Vec3)>,
    pub game_mode: HashMap<EntityId, GameMode>,
    pub latency_ms: HashMap<EntityId, u32>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            position: HashMap::new(),
            velocity: HashMap::new(),
            yaw_pitch: HashMap::new(),
            on_ground: HashMap::new(),
            health: HashMap::new(),
            held: HashMap::new(),
            sprinting: HashMap::new(),
            fall_distance: HashMap::new(),
            on_fire_ticks: HashMap::new(),
            solid_blocks: Vec::new(),
            next_entity: 1000,
            removed: Vec::new(),
            spawned: Vec::new(),
            game_mode: HashMap::new(),
            latency_ms: HashMap::new(),
        }
    }

    pub fn place(&mut self, entity: EntityId, position: Vec3) {
        self.position.insert(entity, position);
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for FakeHost {
    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.position.get(&entity).copied()
    }

    fn velocity(&self, entity: EntityId) -> Option<Vec3> {
        self.velocity.get(&entity).copied()
    }

    fn yaw_pitch(&self, entity: EntityId) -> Option<(f32, f32)> {
        self.yaw_pitch.get(&entity).copied()
    }

    fn on_ground(&self, entity: EntityId) -> bool {
        self.on_ground.get(&entity).copied().unwrap_or(true)
    }

    fn in_water(&self, _entity: EntityId) -> bool {
        false
    }

    fn pose(&self, _entity: EntityId) -> Pose {
        Pose::Standing
    }

    fn game_mode(&self, entity: EntityId) -> GameMode {
        self.game_mode.get(&entity).copied().unwrap_or_default()
    }

    fn bounding_box(&self, entity: EntityId) -> Option<Aabb> {
        self.position.get(&entity).map(|&p| Aabb::from_feet(p, 0.3, 1.8))
    }

    fn health(&self, entity: EntityId) -> Option<f32> {
        self.health.get(&entity).copied()
    }

    fn max_health(&self, _entity: EntityId) -> f32 {
        20.0
    }

    fn held_item(&self, entity: EntityId) -> Option<ItemStack> {
        self.held.get(&entity).cloned()
    }

    fn armor_points(&self, _entity: EntityId) -> f32 {
        0.0
    }

    fn is_player(&self, _entity: EntityId) -> bool {
        true
    }

    fn is_sprinting(&self, entity: EntityId) -> bool {
        self.sprinting.get(&entity).copied().unwrap_or(false)
    }

    fn fall_distance(&self, entity: EntityId) -> f32 {
        self.fall_distance.get(&entity).copied().unwrap_or(0.0)
    }

    fn eye_height(&self, _entity: EntityId, _pose: Pose) -> f32 {
        1.62
    }

    fn latency_ms(&self, entity: EntityId) -> u32 {
        self.latency_ms.get(&entity).copied().unwrap_or(50)
    }

    fn entity_kind(&self, _entity: EntityId) -> Option<EntityKindId> {
        None
    }

    fn melee_base_damage(&self, material: Material) -> f32 {
        match material.0 {
            1 => 7.0,
            2 => 8.0,
            _ => 1.0,
        }
    }

    fn set_velocity(&mut self, entity: EntityId, velocity: Vec3) {
        self.velocity.insert(entity, velocity);
    }

    fn set_health(&mut self, entity: EntityId, health: f32) {
        self.health.insert(entity, health);
    }

    fn set_health_silent(&mut self, entity: EntityId, health: f32) {
        self.health.insert(entity, health);
    }

    fn set_pose(&mut self, _entity: EntityId, _pose: Pose) {}

    fn set_on_fire_ticks(&mut self, entity: EntityId, ticks: u32) {
        self.on_fire_ticks.insert(entity, ticks);
    }

    fn on_fire_ticks(&self, entity: EntityId) -> u32 {
        self.on_fire_ticks.get(&entity).copied().unwrap_or(0)
    }

    fn teleport(&mut self, entity: EntityId, position: Vec3) {
        self.position.insert(entity, position);
    }

    fn remove_entity(&mut self, entity: EntityId) {
        self.removed.push(entity);
    }

    fn spawn_entity(&mut self, kind: EntityKindId, position: Vec3) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.position.insert(id, position);
        self.spawned.push((kind, position));
        id
    }

    fn reset_fall_distance(&mut self, entity: EntityId) {
        self.fall_distance.insert(entity, 0.0);
    }

    fn get_block(&self, position: IVec3) -> BlockId {
        if self.solid_blocks.contains(&position) {
            BlockId(1)
        } else {
            BlockId(0)
        }
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
        self.position
            .iter()
            .filter(|(_, &pos)| aabb.contains_point(pos))
            .map(|(&id, _)| id)
            .collect()
    }

    fn world_min_y(&self) -> i32 {
        -64
    }

    fn is_in_void(&self, position: Vec3) -> bool {
        position.y < -64.0
    }

    fn send_equipment_update(&mut self, _entity: EntityId) {}
    fn send_particles(&mut self, _at: Vec3, _kind: &str, _count: u32) {}
    fn send_action_bar(&mut self, _entity: EntityId, _text: &str) {}
    fn play_sound(&mut self, _at: Vec3, _sound: &str, _volume: f32, _pitch: f32) {}
    fn trigger_status_byte(&mut self, _entity: EntityId, _byte: u8) {}
}

pub fn entity_kinds() -> ProjectileEntityKinds {
    ProjectileEntityKinds {
        arrow: EntityKindId(1),
        snowball: EntityKindId(2),
        egg: EntityKindId(3),
        fishing_bobber: EntityKindId(4),
        ender_pearl: EntityKindId(5),
    }
}

pub fn vanilla_core() -> CombatCore {
    let (preset, resolver) = presets::vanilla().expect("vanilla preset validates");
    CombatCore::new(preset, resolver, TickMode::Real, entity_kinds())
}
