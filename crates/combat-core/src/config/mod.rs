//! Config Cascade Resolver: produces effective per-damage-type and per-knockback configuration
//! by walking the tag chain down to a server default.

pub mod cascade;
pub mod types;

use std::collections::HashMap;

pub use cascade::{DamageCascadeResult, resolve_damage_properties, resolve_ignition_mode, resolve_knockback};
pub use types::{
    CustomDamageConfig, DamageOverride, DamageType, DamageTypeProperties, DirectionBlendMode,
    IgnitionMode, KnockbackComponents, KnockbackConfig, KnockbackOverride,
};

use crate::entity::{EntityId, ItemStack, TagValue};
use crate::tag::{TagScope, TagStore};

fn damage_tag_key(damage_type: DamageType) -> String {
    format!("combat.damage_override.{damage_type:?}")
}

const KNOCKBACK_TAG_KEY: &str = "combat.knockback_override";

/// An item can only carry a scalar multiplier override (plus an explicit disable/no-damage
/// switch) for damage, expressed through the small set of scalar `TagValue`s that persist with
/// the item. Full-property and custom replacements are reserved for entity/world tags, which are
/// not serialized and can hold the rich in-memory type directly.
fn item_damage_override(item: &ItemStack, damage_type: DamageType) -> Option<DamageOverride> {
    let key = damage_tag_key(damage_type);
    if let Some(TagValue::Bool(true)) = item.tags.get(&format!("{key}.disabled")) {
        return Some(DamageOverride::Disabled);
    }
    if let Some(TagValue::Bool(true)) = item.tags.get(&format!("{key}.no_damage")) {
        return Some(DamageOverride::NoDamage);
    }
    match item.tags.get(&format!("{key}.multiplier")) {
        Some(TagValue::F32(m)) => Some(DamageOverride::Multiplier(*m)),
        _ => None,
    }
}

/// Decodes the knockback tag an item carries: `m` (multiplier components), `d` (modify
/// components), `hc` (has-custom flag gating the six `c*` fields below).
fn item_knockback_override(item: &ItemStack) -> Option<KnockbackOverride> {
    if let Some(TagValue::Bool(true)) = item.tags.get(&format!("{KNOCKBACK_TAG_KEY}.hc")) {
        let field = |suffix: &str| -> f32 {
            match item.tags.get(&format!("{KNOCKBACK_TAG_KEY}.{suffix}")) {
                Some(TagValue::F32(v)) => *v,
                _ => 0.0,
            }
        };
        let components = KnockbackComponents {
            horizontal: field("chm"),
            vertical: field("cvm"),
            sprint_horizontal: field("csm"),
            sprint_vertical: field("cg"),
            air_horizontal: field("char"),
            air_vertical: field("cvar"),
        };
        return Some(KnockbackOverride::Custom(KnockbackConfig {
            components,
            look_weight: 0.0,
            sprint_look_weight: 0.0,
            direction_blend_mode: DirectionBlendMode::BlendDirections,
            vertical_limit: f32::MAX,
            enchant_per_level: 0.0,
            blocking_horizontal_multiplier: 1.0,
            blocking_vertical_multiplier: 1.0,
            sprint_window_max_ticks: 4,
        }));
    }

    if let Some(TagValue::F32List(values)) = item.tags.get(&format!("{KNOCKBACK_TAG_KEY}.m")) {
        if let Some(m) = components_from_slice(values) {
            return Some(KnockbackOverride::Multiplier(m));
        }
    }
    if let Some(TagValue::F32List(values)) = item.tags.get(&format!("{KNOCKBACK_TAG_KEY}.d")) {
        if let Some(m) = components_from_slice(values) {
            return Some(KnockbackOverride::Modify(m));
        }
    }
    None
}

fn components_from_slice(values: &[f32]) -> Option<KnockbackComponents> {
    if values.len() != 6 {
        return None;
    }
    Some(KnockbackComponents {
        horizontal: values[0],
        vertical: values[1],
        sprint_horizontal: values[2],
        sprint_vertical: values[3],
        air_horizontal: values[4],
        air_vertical: values[5],
    })
}

/// Owns server-default properties per damage type and the server-default knockback config, and
/// resolves the full cascade by reading tag-store layers on top of those defaults.
pub struct ConfigResolver {
    damage_defaults: HashMap<DamageType, DamageTypeProperties>,
    knockback_default: KnockbackConfig,
    /// Whether sprinting attacks can still land a critical hit. A crit applies iff the attacker is
    /// airborne with nonzero fall distance, and either this is true or the attacker isn't
    /// sprinting. Vanilla forbids sprint-crits; some presets (e.g. 1.8 PvP servers) allow them.
    pub sprint_crit_allowed: bool,
}

impl ConfigResolver {
    #[must_use]
    pub fn new(
        damage_defaults: HashMap<DamageType, DamageTypeProperties>,
        knockback_default: KnockbackConfig,
        sprint_crit_allowed: bool,
    ) -> Self {
        Self {
            damage_defaults,
            knockback_default,
            sprint_crit_allowed,
        }
    }

    #[must_use]
    pub fn default_damage_properties(&self, damage_type: DamageType) -> DamageTypeProperties {
        self.damage_defaults
            .get(&damage_type)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn knockback_default(&self) -> KnockbackConfig {
        self.knockback_default
    }

    /// Layer order: attacker held item, projectile's item-origin, attacker entity, victim entity,
    /// projectile entity, world.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn resolve_damage(
        &self,
        tags: &TagStore,
        damage_type: DamageType,
        attacker_item: Option<&ItemStack>,
        projectile_item_origin: Option<&ItemStack>,
        attacker: Option<EntityId>,
        victim: EntityId,
        projectile: Option<EntityId>,
    ) -> DamageCascadeResult {
        let key = damage_tag_key(damage_type);

        let item_layer = attacker_item.and_then(|i| item_damage_override(i, damage_type));
        let proj_item_layer =
            projectile_item_origin.and_then(|i| item_damage_override(i, damage_type));
        let attacker_layer =
            attacker.and_then(|e| tags.get::<DamageOverride>(TagScope::Entity(e), &key));
        let victim_layer = tags.get::<DamageOverride>(TagScope::Entity(victim), &key);
        let projectile_layer =
            projectile.and_then(|e| tags.get::<DamageOverride>(TagScope::Entity(e), &key));
        let world_layer = tags.get::<DamageOverride>(TagScope::World, &key);

        let layers = [
            item_layer.as_ref(),
            proj_item_layer.as_ref(),
            attacker_layer.as_ref(),
            victim_layer.as_ref(),
            projectile_layer.as_ref(),
            world_layer.as_ref(),
        ];
        resolve_damage_properties(self.default_damage_properties(damage_type), &layers)
    }

    /// Layer order mirrors [`Self::resolve_damage`] minus the projectile's item-origin slot, which
    /// the knockback cascade does not track separately.
    #[must_use]
    pub fn resolve_knockback(
        &self,
        tags: &TagStore,
        attacker_item: Option<&ItemStack>,
        attacker: Option<EntityId>,
        victim: EntityId,
        projectile: Option<EntityId>,
    ) -> KnockbackConfig {
        let item_layer = attacker_item.and_then(item_knockback_override);
        let attacker_layer =
            attacker.and_then(|e| tags.get::<KnockbackOverride>(TagScope::Entity(e), KNOCKBACK_TAG_KEY));
        let victim_layer = tags.get::<KnockbackOverride>(TagScope::Entity(victim), KNOCKBACK_TAG_KEY);
        let projectile_layer = projectile
            .and_then(|e| tags.get::<KnockbackOverride>(TagScope::Entity(e), KNOCKBACK_TAG_KEY));
        let world_layer = tags.get::<KnockbackOverride>(TagScope::World, KNOCKBACK_TAG_KEY);

        let layers = [
            item_layer.as_ref(),
            attacker_layer.as_ref(),
            victim_layer.as_ref(),
            projectile_layer.as_ref(),
            world_layer.as_ref(),
        ];
        resolve_knockback(self.knockback_default, &layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_multiplier_override_is_read_back() {
        let mut item = ItemStack::new(crate::entity::Material(1), 1);
        item.tags = item
            .tags
            .with("combat.damage_override.Melee.multiplier", TagValue::F32(2.0));
        assert_eq!(
            item_damage_override(&item, DamageType::Melee),
            Some(DamageOverride::Multiplier(2.0))
        );
    }

    #[test]
    fn resolve_damage_falls_back_to_server_default_with_no_layers() {
        let mut defaults = HashMap::new();
        defaults.insert(DamageType::Melee, DamageTypeProperties::default());
        let resolver = ConfigResolver::new(
            defaults,
            KnockbackConfig {
                components: KnockbackComponents::zero(),
                look_weight: 0.0,
                sprint_look_weight: 0.0,
                direction_blend_mode: DirectionBlendMode::BlendDirections,
                vertical_limit: 0.4,
                enchant_per_level: 0.0,
                blocking_horizontal_multiplier: 1.0,
                blocking_vertical_multiplier: 1.0,
                sprint_window_max_ticks: 4,
            },
            false,
        );
        let tags = TagStore::new();
        let result = resolver.resolve_damage(
            &tags,
            DamageType::Melee,
            None,
            None,
            Some(EntityId(1)),
            EntityId(2),
            None,
        );
        assert_eq!(
            result,
            DamageCascadeResult::Resolved {
                props: DamageTypeProperties::default(),
                no_damage: false,
            }
        );
    }
}
