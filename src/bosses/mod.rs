//! Bosses module - the shared actor runtime, the roster, and the systems
//! that run them inside the app.
//!
//! Everything below `actor` is plain Rust: a boss can be spawned, fed a
//! [`WorldView`] and updated without an `App`. The ECS layer only moves
//! drivers through the schedule and relays what they ask for.

mod actor;
mod animation;
mod blackboard;
mod body;
mod children;
mod commands;
mod components;
mod data;
mod error;
mod params;
mod plugin;
mod script;
mod systems;

pub mod roster;

pub use actor::{BossActor, BossDriver, ContactSource};
pub use animation::AnimationDef;
pub use blackboard::{Blackboard, BossCtx, HealthGauge, ProjectileView, TargetView, WorldView};
pub use body::{jump_impulse, Body, SensorSet, ARRIVAL_EPSILON};
pub use children::{ChildActor, ChildKind, ChildMode, ChildRegistry};
pub use commands::{ActorCommand, BossNotice};
pub use components::*;
pub use data::{clear_boss_tuning, load_boss_tuning, parse_ron, read_data_file, BossRegistry, BOSS_DATA_DIR};
pub use error::SpawnError;
pub use params::{ParamValue, SpawnParams};
pub use plugin::{BossPlugin, BossSet};
pub use roster::BossKind;
pub use script::{BossBlueprint, BossScript};
