//! World module - geometry, arenas, and the physics bosses stand on.

mod arena;
mod error;
mod geometry;
mod plugin;

pub use arena::{ArenaLayout, ArenaSelection, BossPlacement, ParamSpec, Target, TargetBody, ARENA_DATA_DIR};
pub use error::DataLoadError;
pub use geometry::{Bounds, Facing};
pub use plugin::{integrate_bodies, sense_bodies, ArenaPlugin, STUN_DURATION, TARGET_HEALTH};
