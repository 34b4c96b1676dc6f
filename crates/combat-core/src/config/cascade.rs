//! Cascade merge algorithm: walk a fixed, ordered chain of optional overrides and fold them into
//! one effective value.
//!
//! Layer order (highest priority first) for damage: attacker held item, source projectile's
//! item-origin, attacker entity, victim entity, projectile entity, world, server default. The
//! same shape (minus item-origin layers) resolves knockback.
//!
//! Resolved here and worth recording as the concrete reading of an otherwise-prose rule: a
//! `DISABLED` layer wins immediately and no further layer is even inspected. A `Full` replacement
//! is first-wins among layers that provide one — the highest-priority `Full` found becomes the
//! base, and lower-priority `Full`s are never looked at. Multipliers compose across *every* layer
//! that supplies one, irrespective of which layer won the `Full`, and are applied on top of it.
//! `NoDamage` latches (once any layer says it, the result carries `no_damage = true`) but does not
//! stop the walk — later layers still contribute multipliers/custom config, matching "subsequent
//! layers may still modify effects but amount stays zero".

use super::types::{
    CustomDamageConfig, DamageOverride, DamageTypeProperties, DirectionBlendMode,
    KnockbackComponents, KnockbackConfig, KnockbackOverride,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DamageCascadeResult {
    Disabled,
    Resolved {
        props: DamageTypeProperties,
        no_damage: bool,
    },
}

/// `layers` must be given highest-priority first (item layer at index 0).
#[must_use]
pub fn resolve_damage_properties(
    server_default: DamageTypeProperties,
    layers: &[Option<&DamageOverride>],
) -> DamageCascadeResult {
    let mut no_damage = false;
    let mut full: Option<DamageTypeProperties> = None;
    let mut multiplier_product = 1.0_f32;
    let mut custom: Option<CustomDamageConfig> = None;

    for layer in layers.iter().copied().flatten() {
        match layer {
            DamageOverride::Enabled => {}
            DamageOverride::Disabled => return DamageCascadeResult::Disabled,
            DamageOverride::NoDamage => no_damage = true,
            DamageOverride::Multiplier(m) => multiplier_product *= m,
            DamageOverride::Full(props) => {
                if full.is_none() {
                    full = Some(*props);
                }
            }
            DamageOverride::Custom(c) => {
                if custom.is_none() {
                    custom = Some(*c);
                }
            }
        }
    }

    let mut props = full.unwrap_or(server_default);
    props.multiplier *= multiplier_product;
    if let Some(CustomDamageConfig::Fire { ignition_mode }) = custom {
        props.ignition_delay_ticks = props.ignition_delay_ticks.max(1);
        let _ = ignition_mode;
    }

    DamageCascadeResult::Resolved { props, no_damage }
}

/// Returns the ignition mode selected by the nearest layer supplying a `Custom(Fire { .. })`
/// override, if any. Kept separate from [`resolve_damage_properties`] since `DamageTypeProperties`
/// has no field for it — ignition mode is a Fire-only subtype detail.
#[must_use]
pub fn resolve_ignition_mode(
    layers: &[Option<&DamageOverride>],
) -> Option<super::types::IgnitionMode> {
    layers.iter().copied().flatten().find_map(|layer| match layer {
        DamageOverride::Custom(CustomDamageConfig::Fire { ignition_mode }) => Some(*ignition_mode),
        _ => None,
    })
}

/// `layers` highest-priority first (attacker item first for knockback too).
#[must_use]
pub fn resolve_knockback(
    server_default: KnockbackConfig,
    layers: &[Option<&KnockbackOverride>],
) -> KnockbackConfig {
    let mut custom: Option<KnockbackConfig> = None;
    let mut multiplier = KnockbackComponents::identity_multiplier();
    let mut modify = KnockbackComponents::zero();

    for layer in layers.iter().copied().flatten() {
        match layer {
            KnockbackOverride::Custom(cfg) => {
                if custom.is_none() {
                    custom = Some(*cfg);
                }
            }
            KnockbackOverride::Multiplier(m) => multiplier = multiplier.elementwise_mul(*m),
            KnockbackOverride::Modify(m) => modify = modify.elementwise_add(*m),
        }
    }

    let base = custom.unwrap_or(server_default);
    KnockbackConfig {
        components: base.components.elementwise_mul(multiplier).elementwise_add(modify),
        ..base
    }
}

#[must_use]
pub const fn default_blend_mode() -> DirectionBlendMode {
    DirectionBlendMode::BlendDirections
}
