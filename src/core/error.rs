//! Error types for actor configuration.

use thiserror::Error;

/// Mistakes in how a state machine, sequencer or timer table was put together.
///
/// These are detected while a boss is being built, never during a tick.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The builder was finished without an initial state.
    #[error("State machine has no initial state")]
    MissingInitialState,

    /// A transition or the initial state names a state that was never registered.
    #[error("State '{0}' is referenced but was never registered")]
    UnregisteredState(&'static str),

    /// A registered, non-terminal state has nowhere to go.
    #[error("State '{0}' has no transitions and is not marked terminal")]
    NoTransitions(&'static str),

    /// A phase loop needs at least one phase.
    #[error("Phase loop must contain at least one phase")]
    EmptySequence,
}
