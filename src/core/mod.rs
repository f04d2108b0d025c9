//! Core module - the frame-stepped building blocks every boss is made of,
//! plus arena states and global events.
//!
//! Timers, loops and state machines here are plain Rust with no ECS access,
//! so a boss can be driven and tested without an `App`.

mod error;
mod events;
mod plugin;
mod sequencer;
mod state_machine;
mod states;
mod timer;
mod tuning;

pub use error::ConfigError;
pub use events::*;
pub use plugin::CorePlugin;
pub use sequencer::Loop;
pub use state_machine::{ChangeHook, PerState, Predicate, StateId, StateMachine, StateMachineBuilder};
pub use states::*;
pub use timer::{Runnable, TimeMarkedRunnable, Timer};
pub use tuning::{interpolate, Chance, Scaled};
