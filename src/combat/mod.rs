//! Combat module - damage negotiation, fixtures, and the systems that apply
//! hits to bosses and to the target.

mod components;
mod damage;
mod fixtures;
mod plugin;
mod systems;

pub use components::*;
pub use damage::*;
pub use fixtures::*;
pub use plugin::CombatPlugin;
pub use systems::{CombatSet, BODY_CONTACT_DAMAGE, CHILD_CONTACT_DAMAGE};
