//! Client-version detection from plugin-message payloads. Feeds the legacy/modern branch point
//! hit detection and silent health updates both need: the core chooses which reach tier and
//! raycast strictness apply, the host chooses how to apply the silent-health update.

use serde::Deserialize;
use tracing::debug;

use crate::entity::EntityId;
use crate::presets::LEGACY_PROTOCOL_THRESHOLD;

pub const VIAVERSION_MOD_DETAILS_CHANNEL: &str = "vv:mod_details";
pub const VIAVERSION_PROXY_DETAILS_CHANNEL: &str = "vv:proxy_details";

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ClientVersion {
    pub protocol: i32,
}

impl ClientVersion {
    #[must_use]
    pub const fn new(protocol: i32) -> Self {
        Self { protocol }
    }

    /// Protocol versions below [`LEGACY_PROTOCOL_THRESHOLD`] get the legacy combat branch: no
    /// attack-cooldown awareness, damage replacement instead of i-frame rejection.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        self.protocol < LEGACY_PROTOCOL_THRESHOLD
    }
}

#[derive(Deserialize)]
struct ViaVersionPayload {
    version: i32,
    #[serde(rename = "versionName", default)]
    #[allow(dead_code)]
    version_name: Option<String>,
}

/// Reads a protocol VarInt from the front of `bytes`. Hand-rolled rather than pulling in a full
/// client-protocol crate for one field.
fn read_varint(bytes: &[u8]) -> Option<(i32, usize)> {
    let mut value: i32 = 0;
    for (i, &byte) in bytes.iter().enumerate().take(5) {
        value |= i32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

/// Parses a Velocity modern-forwarding payload: a 16-byte UUID followed by a VarInt protocol
/// version.
fn parse_velocity_forwarding(bytes: &[u8]) -> Option<ClientVersion> {
    if bytes.len() < 17 {
        return None;
    }
    let (protocol, _) = read_varint(&bytes[16..])?;
    Some(ClientVersion::new(protocol))
}

fn parse_viaversion(bytes: &[u8]) -> Option<ClientVersion> {
    let payload: ViaVersionPayload = serde_json::from_slice(bytes).ok()?;
    Some(ClientVersion::new(payload.version))
}

/// Parses a plugin-message payload, trying the channel-appropriate format. Returns `None` (logged
/// at debug) on anything malformed; a rejected parse never panics or corrupts tracked state.
#[must_use]
pub fn parse_plugin_message(channel: &str, bytes: &[u8]) -> Option<ClientVersion> {
    let result = match channel {
        VIAVERSION_MOD_DETAILS_CHANNEL | VIAVERSION_PROXY_DETAILS_CHANNEL => parse_viaversion(bytes),
        "velocity:player_info" => parse_velocity_forwarding(bytes),
        _ => None,
    };
    if result.is_none() {
        debug!(channel, len = bytes.len(), "unrecognized or malformed plugin message");
    }
    result
}

/// Tracks the detected client version per player; cleared on disconnect.
#[derive(Default)]
pub struct VersionTracker {
    versions: std::collections::HashMap<EntityId, ClientVersion>,
}

impl VersionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_plugin_message(&mut self, player: EntityId, channel: &str, bytes: &[u8]) -> Option<ClientVersion> {
        let version = parse_plugin_message(channel, bytes)?;
        self.versions.insert(player, version);
        Some(version)
    }

    #[must_use]
    pub fn get(&self, player: EntityId) -> Option<ClientVersion> {
        self.versions.get(&player).copied()
    }

    /// Whether `player` should be treated as a legacy client. Defaults to modern (non-legacy) when
    /// no version has been detected yet, since most clients announce themselves promptly and a
    /// false-legacy default would needlessly relax reach checks.
    #[must_use]
    pub fn is_legacy(&self, player: EntityId) -> bool {
        self.get(player).is_some_and(ClientVersion::is_legacy)
    }

    pub fn clear_state(&mut self, player: EntityId) {
        self.versions.remove(&player);
    }
}
