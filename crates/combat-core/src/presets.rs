//! Reference constants and server presets.
//!
//! A preset is a plain value, built through a fallible constructor that validates ranges once at
//! startup. Reading a preset from a config file/CLI is the host's job; this crate only defines
//! and validates the value types.

use std::collections::HashMap;

use crate::config::{
    ConfigResolver, DamageType, DamageTypeProperties, DirectionBlendMode, KnockbackComponents,
    KnockbackConfig,
};
use crate::error::{CoreError, CoreResult};

pub const VANILLA_INVULNERABILITY_TICKS: u32 = 20;
pub const MINEMEN_INVULNERABILITY_TICKS: u32 = 10;
pub const HYPIXEL_INVULNERABILITY_TICKS: u32 = 15;

/// Protocol versions below this are treated as legacy clients (pre-1.9 combat: no attack cooldown,
/// no server-side sweep raycast needed for reach since the client already aims precisely).
pub const LEGACY_PROTOCOL_THRESHOLD: i32 = 107;

pub const SERVER_TICKS_PER_SECOND: f32 = 20.0;

pub const PLAYER_HITBOX_HALF_WIDTH: f32 = 0.3;
pub const PLAYER_STANDING_HEIGHT: f32 = 1.8;
pub const PLAYER_SNEAKING_HEIGHT_VANILLA: f32 = 1.65;
pub const PLAYER_SNEAKING_HEIGHT_1_8: f32 = 1.5;

pub const EYE_HEIGHT_STANDING: f32 = 1.62;
pub const EYE_HEIGHT_SNEAKING: f32 = 1.54;

pub const ARROW_BASE_DAMAGE_PER_SPEED: f32 = 2.0;

/// Bow draw power curve: `p(t) = min(1, (t² + 2t) / 3)` where `t` is hold seconds.
#[must_use]
pub fn bow_power(hold_seconds: f32) -> f32 {
    let t = hold_seconds.max(0.0);
    ((t * t + 2.0 * t) / 3.0).min(1.0)
}

pub const FISHING_BOBBER_AUTO_RETRACT_DISTANCE: f32 = 32.0;
pub const SHOOTER_COLLISION_DELAY_TICKS: u32 = 2;
pub const ONE_HOUR_TICKS: u64 = 72_000;

pub const DEFAULT_SWING_HIT_WINDOW_TICKS: u32 = 5;
pub const DEFAULT_SWING_LOOK_CHECK_TICKS: u32 = 3;

pub const DEFAULT_REACH_SURVIVAL: f32 = 3.0;
pub const DEFAULT_REACH_CREATIVE: f32 = 4.5;
/// Expansion applied to the victim's bounding box before the reach/raycast test (primary tier,
/// 0.1 block).
pub const DEFAULT_HITBOX_EXPANSION_PRIMARY: f32 = 0.1;

/// Reference knockback presets: concrete values the server-default cascade layer falls back to.
pub const KB_HEAVY: KnockbackComponents = KnockbackComponents {
    horizontal: 0.6,
    vertical: 0.5,
    sprint_horizontal: 0.7,
    sprint_vertical: 0.1,
    air_horizontal: 0.6,
    air_vertical: 0.5,
};

pub const KB_LIGHT: KnockbackComponents = KnockbackComponents {
    horizontal: 0.25,
    vertical: 0.3,
    sprint_horizontal: 0.3,
    sprint_vertical: 0.0,
    air_horizontal: 0.25,
    air_vertical: 0.3,
};

pub const KB_NONE: KnockbackComponents = KnockbackComponents::zero();

/// Negative horizontal pulls the victim toward the attacker instead of away.
pub const KB_GRAPPLE: KnockbackComponents = KnockbackComponents {
    horizontal: -0.6,
    vertical: 0.2,
    sprint_horizontal: -0.6,
    sprint_vertical: 0.2,
    air_horizontal: -0.6,
    air_vertical: 0.2,
};

pub const KB_LAUNCHER: KnockbackComponents = KnockbackComponents {
    horizontal: 0.4,
    vertical: 3.0,
    sprint_horizontal: 0.5,
    sprint_vertical: 3.0,
    air_horizontal: 0.4,
    air_vertical: 3.0,
};

/// Vanilla 1.9+ default: 0.4 horizontal, 0.4 vertical, +0.5 horizontal while sprinting.
#[must_use]
pub const fn vanilla_knockback() -> KnockbackConfig {
    KnockbackConfig {
        components: KnockbackComponents {
            horizontal: 0.4,
            vertical: 0.4,
            sprint_horizontal: 0.5,
            sprint_vertical: 0.0,
            air_horizontal: 0.4,
            air_vertical: 0.4,
        },
        look_weight: 0.0,
        sprint_look_weight: 0.0,
        direction_blend_mode: DirectionBlendMode::BlendDirections,
        vertical_limit: 0.4,
        enchant_per_level: 0.5,
        blocking_horizontal_multiplier: 0.5,
        blocking_vertical_multiplier: 0.5,
        sprint_window_max_ticks: 4,
    }
}

/// 1.8-style knockback: slightly heavier air component, blended toward look direction, which is
/// what gives legacy PvP its distinctive "W-tap" feel.
#[must_use]
pub const fn legacy_1_8_knockback() -> KnockbackConfig {
    KnockbackConfig {
        components: KnockbackComponents {
            horizontal: 0.4,
            vertical: 0.4,
            sprint_horizontal: 0.5,
            sprint_vertical: 0.1,
            air_horizontal: 0.4,
            air_vertical: 0.4,
        },
        look_weight: 0.15,
        sprint_look_weight: 0.35,
        direction_blend_mode: DirectionBlendMode::BlendDirections,
        vertical_limit: 0.4,
        enchant_per_level: 0.5,
        blocking_horizontal_multiplier: 0.5,
        blocking_vertical_multiplier: 0.5,
        sprint_window_max_ticks: 6,
    }
}

/// The server-default damage properties per type that every preset's cascade falls back to.
#[must_use]
pub fn vanilla_damage_defaults() -> HashMap<DamageType, DamageTypeProperties> {
    let melee = DamageTypeProperties::default();
    let arrow = DamageTypeProperties {
        knockback_on_replacement: false,
        ..DamageTypeProperties::default()
    };
    let thrown = DamageTypeProperties {
        damage_replacement: false,
        ..DamageTypeProperties::default()
    };
    let fall = DamageTypeProperties {
        blockable: false,
        damage_replacement: false,
        ..DamageTypeProperties::default()
    };
    let fire = DamageTypeProperties {
        blockable: false,
        damage_replacement: false,
        invulnerability_buffer_ticks: 0,
        ignition_delay_ticks: 10,
        ..DamageTypeProperties::default()
    };
    let cactus = DamageTypeProperties {
        blockable: false,
        damage_replacement: false,
        ..DamageTypeProperties::default()
    };
    let generic = DamageTypeProperties::default();

    HashMap::from([
        (DamageType::Melee, melee),
        (DamageType::Arrow, arrow),
        (DamageType::Thrown, thrown),
        (DamageType::Fall, fall),
        (DamageType::Fire, fire),
        (DamageType::Cactus, cactus),
        (DamageType::Generic, generic),
    ])
}

/// Bundles everything a server needs to construct a [`ConfigResolver`] plus the handful of
/// preset-level knobs that live outside the cascade (i-frame window, sneaking height, sprint-crit
/// policy). Validated once at construction.
#[derive(Copy, Clone, Debug)]
pub struct CombatPreset {
    pub invulnerability_ticks: u32,
    pub sneaking_height: f32,
    pub sprint_crit_allowed: bool,
    pub swing_hit_window_ticks: u32,
    pub swing_look_check_ticks: u32,
}

impl CombatPreset {
    fn validated(self) -> CoreResult<Self> {
        if self.invulnerability_ticks == 0 {
            return Err(CoreError::ConfigError(
                "invulnerability_ticks must be positive".to_string(),
            ));
        }
        if self.sneaking_height <= 0.0 || !self.sneaking_height.is_finite() {
            return Err(CoreError::ConfigError(format!(
                "sneaking_height must be finite and positive, got {}",
                self.sneaking_height
            )));
        }
        Ok(self)
    }
}

fn build_resolver(
    invuln: u32,
    sneaking_height: f32,
    sprint_crit_allowed: bool,
    knockback: KnockbackConfig,
    swing_hit_window_ticks: u32,
    swing_look_check_ticks: u32,
) -> CoreResult<(CombatPreset, ConfigResolver)> {
    let preset = CombatPreset {
        invulnerability_ticks: invuln,
        sneaking_height,
        sprint_crit_allowed,
        swing_hit_window_ticks,
        swing_look_check_ticks,
    }
    .validated()?;
    for props in vanilla_damage_defaults().values() {
        props.validated()?;
    }
    let resolver = ConfigResolver::new(vanilla_damage_defaults(), knockback, sprint_crit_allowed);
    Ok((preset, resolver))
}

/// Vanilla 1.9+ behavior: 20-tick i-frames, no sprint-crits, attack-cooldown-aware clients.
pub fn vanilla() -> CoreResult<(CombatPreset, ConfigResolver)> {
    build_resolver(
        VANILLA_INVULNERABILITY_TICKS,
        PLAYER_SNEAKING_HEIGHT_VANILLA,
        false,
        vanilla_knockback(),
        DEFAULT_SWING_HIT_WINDOW_TICKS,
        DEFAULT_SWING_LOOK_CHECK_TICKS,
    )
}

/// Minemen Club-style preset: shorter i-frames, 1.8 knockback, sprint-crits allowed.
pub fn minemen() -> CoreResult<(CombatPreset, ConfigResolver)> {
    build_resolver(
        MINEMEN_INVULNERABILITY_TICKS,
        PLAYER_SNEAKING_HEIGHT_1_8,
        true,
        legacy_1_8_knockback(),
        DEFAULT_SWING_HIT_WINDOW_TICKS,
        DEFAULT_SWING_LOOK_CHECK_TICKS,
    )
}

/// Hypixel-style preset: 15-tick i-frames, 1.8 knockback, sprint-crits allowed.
pub fn hypixel() -> CoreResult<(CombatPreset, ConfigResolver)> {
    build_resolver(
        HYPIXEL_INVULNERABILITY_TICKS,
        PLAYER_SNEAKING_HEIGHT_1_8,
        true,
        legacy_1_8_knockback(),
        DEFAULT_SWING_HIT_WINDOW_TICKS,
        DEFAULT_SWING_LOOK_CHECK_TICKS,
    )
}

/// Pure 1.8 PvP preset: vanilla 1.8 i-frames (20 ticks, damage replacement is the actual
/// legacy-feel mechanism, not a shorter window), 1.8 knockback, sprint-crits allowed.
pub fn legacy_1_8() -> CoreResult<(CombatPreset, ConfigResolver)> {
    build_resolver(
        VANILLA_INVULNERABILITY_TICKS,
        PLAYER_SNEAKING_HEIGHT_1_8,
        true,
        legacy_1_8_knockback(),
        DEFAULT_SWING_HIT_WINDOW_TICKS,
        DEFAULT_SWING_LOOK_CHECK_TICKS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_preset_builds_without_error() {
        let (preset, _resolver) = vanilla().unwrap();
        assert_eq!(preset.invulnerability_ticks, 20);
    }

    #[test]
    fn bow_power_saturates_at_one() {
        assert!((bow_power(10.0) - 1.0).abs() < f32::EPSILON);
        assert!(bow_power(0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bow_power_matches_reference_formula_mid_draw() {
        // t = 1.0s -> (1 + 2) / 3 = 1.0, already saturated; use a shorter draw to see the curve.
        let t = 0.5_f32;
        let expected = (t * t + 2.0 * t) / 3.0;
        assert!((bow_power(t) - expected).abs() < f32::EPSILON);
    }
}
