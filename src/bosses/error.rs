//! Error types for spawning actors.

use thiserror::Error;

use super::children::ChildKind;
use crate::core::ConfigError;

/// Why an actor could not be placed in the world.
///
/// A boss that fails to spawn stays unspawned and never becomes ready.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpawnError {
    /// A required key is absent from the spawn parameters.
    #[error("Missing spawn parameter '{0}'")]
    MissingParam(String),

    /// The key exists but holds the wrong kind of value.
    #[error("Spawn parameter '{key}' should be {expected}")]
    WrongType { key: String, expected: &'static str },

    /// The owner's child registry is full.
    #[error("No free child slot for {0:?}")]
    NoFreeSlot(ChildKind),

    /// The boss itself could not be built.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
