//! End-to-end combat scenarios: literal inputs, literal expected outputs.

mod support;

use combat_core::entity::{EntityId, ItemStack, Material};
use combat_core::{Hand, ItemUseAction};
use glam::Vec3;
use pretty_assertions::assert_eq;
use support::{FakeHost, vanilla_core};

const P1: EntityId = EntityId(1);
const P2: EntityId = EntityId(2);

#[test]
fn s1_basic_melee_hit() {
    let mut combat = vanilla_core();
    let mut host = FakeHost::new();
    host.place(P1, Vec3::new(1.0, 64.0, 0.0));
    host.place(P2, Vec3::new(0.0, 64.0, 0.0));
    host.health.insert(P2, 20.0);
    host.held.insert(P1, ItemStack::new(Material(1), 1));

    for _ in 0..100 {
        combat.on_tick(&mut host);
    }

    let result = combat.on_entity_attack(P1, P2, &mut host);

    assert!(result.applied);
    assert_eq!(host.health(P2), Some(13.0));
    let kb = host.velocity(P2).expect("knockback velocity set");
    assert!(Vec3::new(kb.x, 0.0, kb.z).length() >= 0.4 - 1e-4);
}

#[test]
fn s2_replacement_hit_inside_i_frames() {
    let mut combat = vanilla_core();
    let mut host = FakeHost::new();
    host.place(P1, Vec3::new(1.0, 64.0, 0.0));
    host.place(P2, Vec3::new(0.0, 64.0, 0.0));
    host.health.insert(P2, 20.0);
    host.held.insert(P1, ItemStack::new(Material(1), 1));

    for _ in 0..100 {
        combat.on_tick(&mut host);
    }
    let first = combat.on_entity_attack(P1, P2, &mut host);
    assert!(first.applied);
    assert_eq!(host.health(P2), Some(13.0));

    for _ in 0..5 {
        combat.on_tick(&mut host);
    }

    host.held.insert(P1, ItemStack::new(Material(2), 1));
    host.velocity.remove(&P2);
    let second = combat.on_entity_attack(P1, P2, &mut host);

    assert!(second.was_replacement);
    assert_eq!(host.health(P2), Some(12.0));
    // knockback_on_replacement defaults to false: no new velocity written for the replacement hit.
    assert!(host.velocity(P2).is_none());
}

#[test]
fn s3_buffered_hit_fires_at_window_close() {
    let preset = combat_core::presets::CombatPreset {
        invulnerability_ticks: 10,
        sneaking_height: combat_core::presets::PLAYER_SNEAKING_HEIGHT_VANILLA,
        sprint_crit_allowed: false,
        swing_hit_window_ticks: combat_core::presets::DEFAULT_SWING_HIT_WINDOW_TICKS,
        swing_look_check_ticks: combat_core::presets::DEFAULT_SWING_LOOK_CHECK_TICKS,
    };
    let mut defaults = combat_core::presets::vanilla_damage_defaults();
    if let Some(props) = defaults.get_mut(&combat_core::config::DamageType::Melee) {
        props.invulnerability_buffer_ticks = 3;
    }
    let resolver = combat_core::config::ConfigResolver::new(defaults, combat_core::presets::vanilla_knockback(), false);
    let mut combat = combat_core::CombatCore::new(preset, resolver, combat_core::clock::TickMode::Real, support::entity_kinds());

    let mut host = FakeHost::new();
    host.place(P1, Vec3::new(1.0, 64.0, 0.0));
    host.place(P2, Vec3::new(0.0, 64.0, 0.0));
    host.health.insert(P2, 20.0);
    host.held.insert(P1, ItemStack::new(Material(1), 1));

    for _ in 0..100 {
        combat.on_tick(&mut host);
    }
    let first = combat.on_entity_attack(P1, P2, &mut host);
    assert!(first.applied);
    let health_after_first = host.health(P2).unwrap();

    for _ in 0..8 {
        combat.on_tick(&mut host);
    }
    let buffered = combat.on_entity_attack(P1, P2, &mut host);
    assert!(!buffered.applied, "hit inside the buffer window must not apply immediately");
    assert_eq!(host.health(P2), Some(health_after_first));

    for _ in 0..2 {
        combat.on_tick(&mut host);
    }
    assert!(host.health(P2).unwrap() < health_after_first, "buffered hit must fire once the window closes");
}

#[test]
fn s4_arrow_projectile_hit_uses_spawn_position_for_knockback() {
    let mut combat = vanilla_core();
    let mut host = FakeHost::new();
    host.place(P1, Vec3::new(0.0, 64.0, 0.0));
    host.yaw_pitch.insert(P1, (0.0, 0.0));
    host.place(P2, Vec3::new(0.0, 64.0, 10.0));
    host.health.insert(P2, 20.0);

    let item = ItemStack::new(Material(3), 1);
    let arrow = combat
        .on_item_use(P1, &item, Hand::Main, ItemUseAction::BowRelease { hold_seconds: 2.0 }, &mut host)
        .expect("fully drawn bow spawns an arrow");
    assert_ne!(arrow, P1);
    assert_ne!(arrow, P2);

    for _ in 0..40 {
        combat.on_tick(&mut host);
        if host.health(P2) != Some(20.0) {
            break;
        }
    }

    assert!(host.health(P2).unwrap() < 20.0, "arrow should have reached and damaged P2");
}

#[test]
fn s5_fall_damage_resets_distance_on_landing() {
    let mut combat = vanilla_core();
    let mut host = FakeHost::new();
    host.place(P1, Vec3::new(0.0, 70.0, 0.0));
    host.health.insert(P1, 20.0);
    host.on_ground.insert(P1, false);
    host.fall_distance.insert(P1, 16.0);

    combat.on_player_tick(P1, &mut host);
    host.on_ground.insert(P1, true);
    combat.on_player_tick(P1, &mut host);

    assert_eq!(host.health(P1), Some(7.0));
    assert_eq!(host.fall_distance(P1), 0.0);
}

#[test]
fn s6_swing_window_hit_consumes_after_look_check() {
    // The swing-window retry lands a few ticks inside the first hit's i-frames, so the second
    // event is a replacement, not a fresh hit. Swapping to a stronger weapon before the retry
    // makes the replacement delta (and thus the health change) unambiguous.
    let mut combat = vanilla_core();
    let mut host = FakeHost::new();
    host.place(P1, Vec3::new(1.0, 64.0, 0.0));
    host.place(P2, Vec3::new(0.0, 64.0, 0.0));
    host.health.insert(P2, 20.0);
    host.held.insert(P1, ItemStack::new(Material(1), 1));

    for _ in 0..200 {
        combat.on_tick(&mut host);
    }
    let recorded = combat.on_entity_attack(P1, P2, &mut host);
    assert!(recorded.applied);
    let health_after_first = host.health(P2).unwrap();

    for _ in 0..2 {
        combat.on_tick(&mut host);
    }
    // Tick 202: arm-swing is recorded; whether the crosshair is on the victim yet is irrelevant
    // here since `on_arm_swing` only records the swing, it never raycasts immediately.
    combat.on_arm_swing(P1);

    host.held.insert(P1, ItemStack::new(Material(2), 1));
    host.yaw_pitch.insert(P1, (90.0, 0.0));

    combat.on_tick(&mut host);
    combat.on_player_tick(P1, &mut host);

    assert_eq!(host.health(P2), Some(health_after_first - 1.0));
}
