//! Error surface for fallible constructors and config validation.
//!
//! Internal call sites that are not part of the public API use `anyhow` instead of growing this
//! enum further.

use thiserror::Error;

use crate::entity::EntityId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    ConfigError(String),

    #[error("entity {0} has no tracked state for this operation")]
    NotInitialized(EntityId),

    #[error("expected state missing for entity {0}: {1}")]
    StateMissing(EntityId, &'static str),

    #[error("invalid damage amount {amount} for damage type {damage_type}")]
    InvalidDamage { damage_type: String, amount: f32 },

    #[error("host collaborator call failed: {0}")]
    CollaboratorFailure(#[source] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
