//! Opaque handles and value types the core consumes from the host.
//!
//! Entities, materials, and entity types are identified by stable handles; the core never
//! interprets what they mean, only compares and hashes them. Handles here are supplied by
//! whatever arena the host already owns.

use std::collections::BTreeMap;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A stable handle to an entity owned by the host. Opaque: the core only compares and hashes it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From)]
pub struct EntityId(pub u64);

/// Opaque material identifier (e.g. "diamond sword") owned by the host's item registry.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From)]
pub struct Material(pub u32);

/// Opaque entity-type identifier (e.g. "zombie", "player") owned by the host's entity registry.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From)]
pub struct EntityKindId(pub u32);

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    #[must_use]
    pub const fn is_invincible(self) -> bool {
        matches!(self, Self::Creative | Self::Spectator)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Pose {
    #[default]
    Standing,
    Sneaking,
}

/// A single typed value a tag can hold. Item-stack tags use this directly so they round-trip
/// through `serde_json` for persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Bool(bool),
    I64(i64),
    F32(f32),
    Str(String),
    F32List(Vec<f32>),
}

/// An item's tag bag. Value-copied on mutation — items are conceptually immutable snapshots
/// inside inventories.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TagBag(BTreeMap<String, TagValue>);

impl TagBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    /// Returns a new bag with `key` set, leaving `self` untouched (value-copy semantics).
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: TagValue) -> Self {
        let mut copy = self.clone();
        copy.0.insert(key.into(), value);
        copy
    }

    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        let mut copy = self.clone();
        copy.0.remove(key);
        copy
    }
}

/// `(material, amount, tag bag)`. Two stacks are the "same item" iff material and tag bag are
/// both identical.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemStack {
    pub material: Material,
    pub amount: u8,
    pub tags: TagBag,
}

impl ItemStack {
    #[must_use]
    pub const fn new(material: Material, amount: u8) -> Self {
        Self {
            material,
            amount,
            tags: TagBag::new(),
        }
    }

    /// "Same item": material and tag bag identical. Amount does not participate.
    #[must_use]
    pub fn is_same_item(&self, other: &Self) -> bool {
        self.material == other.material && self.tags == other.tags
    }
}
