//! Boss plugin - registers boss data, events and the per-frame tick.

use bevy::prelude::*;

use super::components::*;
use super::data::{clear_boss_tuning, load_boss_tuning, BossRegistry};
use super::systems;
use crate::core::GameState;

/// Order in which one frame of boss work happens.
///
/// Every boss observes the same world snapshot in `Sense`, ticks in `Think`,
/// and is moved in `Integrate`; no boss sees another mid-tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossSet {
    Spawn,
    Sense,
    Think,
    Integrate,
    Mirror,
    Cleanup,
}

/// Boss plugin - handles boss spawning, ticking, child mirroring and teardown.
pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<BossRegistry>()
            .init_resource::<ActorIdAllocator>()
            .init_resource::<ChildEntities>()
            .add_event::<SpawnBoss>()
            .add_event::<BossSpawnFailed>()

            // Tuning follows the level: read on the way in, dropped on the way out
            .add_systems(OnEnter(GameState::InGame), load_boss_tuning)
            .add_systems(
                OnExit(GameState::InGame),
                (systems::despawn_all_bosses, clear_boss_tuning),
            )

            .configure_sets(
                Update,
                (
                    BossSet::Spawn,
                    BossSet::Sense,
                    BossSet::Think,
                    BossSet::Integrate,
                    BossSet::Mirror,
                    BossSet::Cleanup,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            )
            .add_systems(Update, systems::spawn_bosses.in_set(BossSet::Spawn))
            .add_systems(
                Update,
                systems::observe_world
                    .after(crate::world::sense_bodies)
                    .in_set(BossSet::Sense),
            )
            .add_systems(Update, systems::tick_bosses.in_set(BossSet::Think))
            .add_systems(
                Update,
                (
                    systems::relay_commands,
                    systems::mirror_boss_transforms,
                    systems::mirror_child_transforms,
                )
                    .chain()
                    .in_set(BossSet::Mirror),
            )
            .add_systems(Update, systems::despawn_destroyed_bosses.in_set(BossSet::Cleanup));
    }
}
