//! Boss Actors - data-driven boss fights for a 2D action platformer in Bevy.
//!
//! Each boss is a small program made of a state machine, per-state timers
//! with time-marked callbacks, shape fixtures that switch on and off with
//! state and animation frame, and a damage table. The building blocks are
//! plain Rust and can be driven without an `App`; the plugins below host
//! them in a running game.
//!
//! # Architecture
//!
//! The crate is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Arena states, global events, timers and state machines
//! - **Bosses**: The actor runtime, the roster, and the per-frame tick
//! - **Combat**: Damage negotiation, fixtures, hits and contact damage
//! - **World**: Geometry, arena layouts, and kinematic movement

pub mod bosses;
pub mod combat;
pub mod core;
pub mod world;

use bevy::prelude::*;

/// Main plugin that adds all sub-plugins.
pub struct BossActorsPlugin;

impl Plugin for BossActorsPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Boss systems
            .add_plugins(bosses::BossPlugin)

            // Combat systems
            .add_plugins(combat::CombatPlugin)

            // Arena systems
            .add_plugins(world::ArenaPlugin);
    }
}
