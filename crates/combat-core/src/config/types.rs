//! Value types the Config Cascade Resolver merges: damage-type properties, knockback components,
//! and the override sum types layered on top of them.

use crate::error::CoreError;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DamageType {
    Melee,
    Arrow,
    Thrown,
    Fall,
    Fire,
    Cactus,
    Generic,
    Custom(u32),
}

/// How fire damage is scheduled once ignited. Real servers mix all three depending on call site;
/// this crate pins one mode per resolved config so a given damage type's behavior is
/// deterministic.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum IgnitionMode {
    /// Damage applied the instant the entity catches fire, before any per-tick cadence.
    Instant,
    /// Damage applied once after `ignition_delay_ticks`, then stops.
    #[default]
    Delayed,
    /// Damage applied every `ignition_delay_ticks` while the entity remains on fire.
    TickBased,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CustomDamageConfig {
    Fire { ignition_mode: IgnitionMode },
}

/// Immutable, fully-resolved properties for one damage type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DamageTypeProperties {
    pub enabled: bool,
    pub multiplier: f32,
    pub blockable: bool,
    pub bypass_invulnerability: bool,
    pub bypass_creative: bool,
    pub hurt_effect: bool,
    pub damage_replacement: bool,
    pub knockback_on_replacement: bool,
    pub no_replacement_same_item: bool,
    pub replacement_cutoff: f32,
    pub invulnerability_buffer_ticks: u32,
    pub penetrates_armor: bool,
    pub ignition_delay_ticks: u32,
}

impl DamageTypeProperties {
    /// Negative tick counts and out-of-range multipliers are rejected at construction, never
    /// clamped silently.
    pub fn validated(self) -> Result<Self, CoreError> {
        if self.multiplier < 0.0 || !self.multiplier.is_finite() {
            return Err(CoreError::ConfigError(format!(
                "damage multiplier must be finite and non-negative, got {}",
                self.multiplier
            )));
        }
        if self.replacement_cutoff < 0.0 || !self.replacement_cutoff.is_finite() {
            return Err(CoreError::ConfigError(format!(
                "replacement_cutoff must be finite and non-negative, got {}",
                self.replacement_cutoff
            )));
        }
        Ok(self)
    }
}

impl Default for DamageTypeProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            multiplier: 1.0,
            blockable: true,
            bypass_invulnerability: false,
            bypass_creative: false,
            hurt_effect: true,
            damage_replacement: true,
            knockback_on_replacement: false,
            no_replacement_same_item: false,
            replacement_cutoff: 0.0,
            invulnerability_buffer_ticks: 0,
            penetrates_armor: false,
            ignition_delay_ticks: 0,
        }
    }
}

/// A layered modification targeting a damage type. `Enabled` is a no-op placeholder layer
/// (explicit "nothing to contribute here") distinct from an absent layer.
#[derive(Clone, Debug, PartialEq)]
pub enum DamageOverride {
    Enabled,
    Disabled,
    NoDamage,
    Multiplier(f32),
    Full(DamageTypeProperties),
    Custom(CustomDamageConfig),
}

/// Six-component knockback configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KnockbackComponents {
    pub horizontal: f32,
    pub vertical: f32,
    pub sprint_horizontal: f32,
    pub sprint_vertical: f32,
    pub air_horizontal: f32,
    pub air_vertical: f32,
}

impl KnockbackComponents {
    #[must_use]
    pub const fn elementwise_mul(self, other: Self) -> Self {
        Self {
            horizontal: self.horizontal * other.horizontal,
            vertical: self.vertical * other.vertical,
            sprint_horizontal: self.sprint_horizontal * other.sprint_horizontal,
            sprint_vertical: self.sprint_vertical * other.sprint_vertical,
            air_horizontal: self.air_horizontal * other.air_horizontal,
            air_vertical: self.air_vertical * other.air_vertical,
        }
    }

    #[must_use]
    pub const fn elementwise_add(self, other: Self) -> Self {
        Self {
            horizontal: self.horizontal + other.horizontal,
            vertical: self.vertical + other.vertical,
            sprint_horizontal: self.sprint_horizontal + other.sprint_horizontal,
            sprint_vertical: self.sprint_vertical + other.sprint_vertical,
            air_horizontal: self.air_horizontal + other.air_horizontal,
            air_vertical: self.air_vertical + other.air_vertical,
        }
    }

    #[must_use]
    pub const fn identity_multiplier() -> Self {
        Self {
            horizontal: 1.0,
            vertical: 1.0,
            sprint_horizontal: 1.0,
            sprint_vertical: 1.0,
            air_horizontal: 1.0,
            air_vertical: 1.0,
        }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self {
            horizontal: 0.0,
            vertical: 0.0,
            sprint_horizontal: 0.0,
            sprint_vertical: 0.0,
            air_horizontal: 0.0,
            air_vertical: 0.0,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum DirectionBlendMode {
    #[default]
    BlendDirections,
    AddVectors,
}

/// Full knockback resolution, including the blend weights and vertical clamp that ride alongside
/// the six magnitude components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KnockbackConfig {
    pub components: KnockbackComponents,
    pub look_weight: f32,
    pub sprint_look_weight: f32,
    pub direction_blend_mode: DirectionBlendMode,
    pub vertical_limit: f32,
    pub enchant_per_level: f32,
    pub blocking_horizontal_multiplier: f32,
    pub blocking_vertical_multiplier: f32,
    /// Upper bound, in ticks, on how far back the sprint ring buffer is searched when
    /// `was_sprinting` isn't trusted.
    pub sprint_window_max_ticks: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum KnockbackOverride {
    Custom(KnockbackConfig),
    Multiplier(KnockbackComponents),
    Modify(KnockbackComponents),
}
