//! Arena plugin - arena loading, the target, and kinematic movement.

use std::path::Path;

use bevy::prelude::*;

use super::arena::{ArenaLayout, ArenaSelection, Target, TargetBody, ARENA_DATA_DIR};
use crate::bosses::{Boss, BossSet, SpawnBoss};
use crate::combat::{DamageCooldown, Health};
use crate::core::{GameState, StunTarget};

pub const TARGET_HEALTH: i32 = 28;
pub const STUN_DURATION: f32 = 0.5;

/// Arena plugin - handles arena setup and the physics bosses stand on.
pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaSelection>()
            .add_systems(OnEnter(GameState::InGame), (load_arena, setup_arena).chain())
            .add_systems(OnExit(GameState::InGame), cleanup_arena)
            .add_systems(Update, sense_bodies.in_set(BossSet::Sense))
            .add_systems(
                Update,
                (stun_target, integrate_bodies).chain().in_set(BossSet::Integrate),
            );
    }
}

/// Read the selected arena, falling back to an empty room.
pub fn load_arena(mut commands: Commands, selection: Res<ArenaSelection>) {
    let path = Path::new(ARENA_DATA_DIR).join(format!("{}.ron", selection.0));
    let layout = match ArenaLayout::load(&path) {
        Ok(layout) => {
            info!("Loaded arena: {} ({} bosses)", layout.name, layout.bosses.len());
            layout
        }
        Err(err) => {
            error!("{}", err);
            warn!("Falling back to an empty arena");
            ArenaLayout::default()
        }
    };
    commands.insert_resource(layout);
}

/// Place the target and ask for every boss in the layout.
pub fn setup_arena(mut commands: Commands, arena: Res<ArenaLayout>, mut spawns: EventWriter<SpawnBoss>) {
    commands.spawn((
        Name::new("Target"),
        Target,
        TargetBody::new(arena.target_bounds()),
        Health::new(TARGET_HEALTH),
        DamageCooldown::default(),
    ));

    for placement in &arena.bosses {
        spawns.send(SpawnBoss {
            kind: placement.kind,
            params: arena.spawn_params(placement),
        });
    }
}

/// Clean up arena entities when leaving InGame state.
fn cleanup_arena(mut commands: Commands, targets: Query<Entity, With<Target>>) {
    for entity in targets.iter() {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<ArenaLayout>();
}

/// Refresh contact flags from last frame's settled positions.
pub fn sense_bodies(
    arena: Option<Res<ArenaLayout>>,
    mut bosses: Query<&mut Boss>,
    mut targets: Query<&mut TargetBody>,
) {
    let Some(arena) = arena else {
        return;
    };
    for mut boss in &mut bosses {
        let body = boss.driver.body_mut();
        body.sensors = arena.sense(&body.bounds());
    }
    for mut target in &mut targets {
        let bounds = target.bounds();
        target.body.sensors = arena.sense(&bounds);
    }
}

pub fn stun_target(mut requests: EventReader<StunTarget>, mut targets: Query<&mut TargetBody>) {
    if requests.read().count() == 0 {
        return;
    }
    for mut target in &mut targets {
        if target.is_grounded() {
            target.stun = STUN_DURATION;
            target.body.velocity.x = 0.0;
        }
    }
}

/// Move every body by the velocity written this frame.
pub fn integrate_bodies(
    time: Res<Time>,
    arena: Option<Res<ArenaLayout>>,
    mut bosses: Query<&mut Boss>,
    mut targets: Query<&mut TargetBody>,
) {
    let Some(arena) = arena else {
        return;
    };
    let dt = time.delta_secs();

    for mut boss in &mut bosses {
        if boss.driver.lifecycle().is_live() {
            arena.integrate(boss.driver.body_mut(), dt);
        }
    }
    for mut target in &mut targets {
        target.stun = (target.stun - dt).max(0.0);
        if target.is_stunned() {
            target.body.velocity.x = 0.0;
        }
        arena.integrate(&mut target.body, dt);
    }
}
