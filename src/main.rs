//! Boss Actors - Headless arena demo
//!
//! Loads an arena, lets a scripted player shoot at whatever boss is closest
//! and logs the fight until every boss is down.
//!
//! Usage: `boss-actors [arena]` where `arena` names a file in
//! `assets/data/arenas/` (default `bospider_lair`).

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use boss_actors::bosses::Boss;
use boss_actors::combat::{AttackEvent, Attacker, AttackerKind, FixtureRole};
use boss_actors::core::{BossDead, BossDefeated, BossReady, GameState};
use boss_actors::world::{ArenaSelection, Bounds, Target, TargetBody};

/// Seconds between the scripted player's shots.
const FIRE_INTERVAL: f32 = 0.4;

#[derive(Resource)]
struct Trigger(Timer);

fn main() {
    let arena = std::env::args().nth(1).unwrap_or_else(|| ArenaSelection::default().0);

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
        )
        .add_plugins((LogPlugin::default(), StatesPlugin))
        .insert_resource(ArenaSelection(arena))
        .insert_resource(Trigger(Timer::from_seconds(FIRE_INTERVAL, TimerMode::Repeating)))

        // Our plugin
        .add_plugins(boss_actors::BossActorsPlugin)

        .add_systems(Update, (fire_at_bosses, log_milestones).run_if(in_state(GameState::InGame)))
        .add_systems(OnEnter(GameState::Victory), exit_on_victory)
        .run();
}

/// Fire a bullet at the nearest open hurtbox every interval.
fn fire_at_bosses(
    time: Res<Time>,
    mut trigger: ResMut<Trigger>,
    targets: Query<&TargetBody, With<Target>>,
    bosses: Query<&Boss>,
    mut attacks: EventWriter<AttackEvent>,
) {
    if !trigger.0.tick(time.delta()).just_finished() {
        return;
    }
    let Ok(player) = targets.get_single() else {
        return;
    };
    let origin = player.bounds().center();
    let nearest = bosses
        .iter()
        .flat_map(|boss| boss.driver.fixture_statuses())
        .filter(|status| status.active && status.role == FixtureRole::Damageable)
        .map(|status| status.bounds.center())
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));

    if let Some(center) = nearest {
        attacks.send(AttackEvent {
            attacker: Attacker::new(AttackerKind::Bullet),
            region: Bounds::from_center(center, Vec2::splat(0.5)),
        });
    }
}

fn log_milestones(
    mut ready: EventReader<BossReady>,
    mut defeated: EventReader<BossDefeated>,
    mut dead: EventReader<BossDead>,
) {
    for event in ready.read() {
        info!("{:?} is fighting", event.kind);
    }
    for event in defeated.read() {
        info!("{:?} is going down", event.kind);
    }
    for event in dead.read() {
        info!("{:?} is gone", event.kind);
    }
}

fn exit_on_victory(mut exit: EventWriter<AppExit>) {
    info!("Arena cleared");
    exit.send(AppExit::Success);
}
