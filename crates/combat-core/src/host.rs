//! The `Host` trait: every capability the core needs from the surrounding server that it does
//! not own itself — entity/world state, block shapes, and the packet-layer surrogates.
//!
//! Everything the core reads is a snapshot query; the only things it mutates through this trait
//! are velocity, health, pose, fire ticks, and entity lifecycle (spawn/remove/teleport). All other
//! entity state (inventory, permissions, chat) is invisible to the core by design.

use combat_geometry::Aabb;
use glam::Vec3;

use crate::entity::{EntityId, EntityKindId, GameMode, ItemStack, Material, Pose};

/// Opaque handle to a block type, interpreted only by the host's registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BlockId(pub u32);

/// A block's collision geometry. Implementations may represent full blocks, slabs, stairs, or
/// anything else the host's block registry defines.
pub trait CollisionShape {
    /// `relative_pos` is the query AABB's position relative to the block's origin.
    fn intersect_box(&self, relative_pos: Vec3, aabb: &Aabb) -> bool;
}

/// A full, unobstructed block occupying its entire cell — the common case.
pub struct FullBlockShape;

impl CollisionShape for FullBlockShape {
    fn intersect_box(&self, relative_pos: Vec3, aabb: &Aabb) -> bool {
        Aabb::new(Vec3::ZERO, Vec3::ONE).collides(&aabb.move_by(relative_pos))
    }
}

/// Everything the core needs from the surrounding server. The host constructs one implementation
/// and hands `&mut dyn Host` (or `&dyn Host` for read-only call sites) to every entry point.
pub trait Host {
    // --- entity reads -----------------------------------------------------------------------
    fn position(&self, entity: EntityId) -> Option<Vec3>;
    fn velocity(&self, entity: EntityId) -> Option<Vec3>;
    fn yaw_pitch(&self, entity: EntityId) -> Option<(f32, f32)>;
    fn on_ground(&self, entity: EntityId) -> bool;
    fn in_water(&self, entity: EntityId) -> bool;
    fn pose(&self, entity: EntityId) -> Pose;
    fn game_mode(&self, entity: EntityId) -> GameMode;
    fn bounding_box(&self, entity: EntityId) -> Option<Aabb>;
    fn health(&self, entity: EntityId) -> Option<f32>;
    fn max_health(&self, entity: EntityId) -> f32;
    fn held_item(&self, entity: EntityId) -> Option<ItemStack>;
    fn armor_points(&self, entity: EntityId) -> f32;
    fn is_player(&self, entity: EntityId) -> bool;
    fn is_sprinting(&self, entity: EntityId) -> bool;
    fn fall_distance(&self, entity: EntityId) -> f32;
    fn eye_height(&self, entity: EntityId, pose: Pose) -> f32;
    fn latency_ms(&self, entity: EntityId) -> u32;
    fn entity_kind(&self, entity: EntityId) -> Option<EntityKindId>;
    /// Base melee damage for a weapon material, from the host's item registry — the core only
    /// consumes the number.
    fn melee_base_damage(&self, material: Material) -> f32;

    // --- entity mutation ----------------------------------------------------------------------
    fn set_velocity(&mut self, entity: EntityId, velocity: Vec3);
    fn set_health(&mut self, entity: EntityId, health: f32);
    /// Sets health without triggering the client's hurt animation/camera tilt. The host picks the
    /// legacy metadata-only path or the modern max-health-clamp trick internally.
    fn set_health_silent(&mut self, entity: EntityId, health: f32);
    fn set_pose(&mut self, entity: EntityId, pose: Pose);
    fn set_on_fire_ticks(&mut self, entity: EntityId, ticks: u32);
    fn on_fire_ticks(&self, entity: EntityId) -> u32;
    fn teleport(&mut self, entity: EntityId, position: Vec3);
    fn remove_entity(&mut self, entity: EntityId);
    fn spawn_entity(&mut self, kind: EntityKindId, position: Vec3) -> EntityId;
    fn reset_fall_distance(&mut self, entity: EntityId);

    // --- block/world queries ------------------------------------------------------------------
    fn get_block(&self, position: glam::IVec3) -> BlockId;
    fn block_is_solid(&self, block: BlockId) -> bool;
    fn block_collision_shape(&self, block: BlockId) -> Box<dyn CollisionShape>;
    fn block_is_harmful(&self, block: BlockId) -> bool;
    fn entities_in_aabb(&self, aabb: &Aabb) -> Vec<EntityId>;
    fn world_min_y(&self) -> i32;
    fn is_in_void(&self, position: Vec3) -> bool;

    // --- packet surrogates (opaque to the core) ------------------------------------------------
    fn send_equipment_update(&mut self, entity: EntityId);
    fn send_particles(&mut self, at: Vec3, kind: &str, count: u32);
    fn send_action_bar(&mut self, entity: EntityId, text: &str);
    fn play_sound(&mut self, at: Vec3, sound: &str, volume: f32, pitch: f32);
    fn trigger_status_byte(&mut self, entity: EntityId, byte: u8);
}
