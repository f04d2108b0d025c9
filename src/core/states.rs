//! State definitions for the arena flow and for boss lifecycles.

use bevy::prelude::*;

/// Main arena states - controls which systems run.
///
/// - Start in `Loading`; tuning data is read on the way into `InGame`
/// - `InGame` runs the fight
/// - `Victory` once every boss in the arena is dead
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - nothing is ticking yet
    #[default]
    Loading,
    /// Active fight
    InGame,
    /// All bosses destroyed
    Victory,
}

/// Where a boss actor is in its life. Only moves forward until the next spawn.
///
/// ```text
/// Unspawned -> Spawned -> Ready -> Defeated -> Destroyed
///                  \________________________/^
/// ```
/// A spawned boss can be destroyed directly (level unload) without a defeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    /// Constructed or pooled, not placed in the world.
    #[default]
    Unspawned,
    /// Placed, waiting for its readiness condition. No combat behavior yet.
    Spawned,
    /// Running its combat state machine.
    Ready,
    /// Playing the defeat sequence; behavior frozen.
    Defeated,
    /// Terminal. Children released, fixtures off.
    Destroyed,
}

impl Lifecycle {
    /// Spawned, ready or defeated: the actor occupies the world.
    pub fn is_live(self) -> bool {
        matches!(self, Lifecycle::Spawned | Lifecycle::Ready | Lifecycle::Defeated)
    }
}
