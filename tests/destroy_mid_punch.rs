//! Destroying the Guts Tank while its fist is out releases every child and
//! leaves nothing behind that could still deal damage.

#![allow(clippy::unwrap_used)]

use bevy::prelude::*;

use boss_actors::bosses::roster::GutsTank;
use boss_actors::bosses::{ActorCommand, BossActor, ChildKind, ChildMode, SpawnParams, TargetView, WorldView};
use boss_actors::combat::ActorId;
use boss_actors::core::Lifecycle;
use boss_actors::world::Bounds;

const DT: f32 = 0.1;

fn hangar() -> SpawnParams {
    SpawnParams::new()
        .with("room", Bounds::new(0.0, 0.0, 36.0, 18.0))
        .with("bounds", Bounds::new(22.0, 0.0, 12.0, 9.0))
        .with("front", Bounds::new(16.0, 0.0, 1.0, 1.0))
        .with("back", Bounds::new(22.0, 0.0, 1.0, 1.0))
        .with("fly_1", Bounds::new(6.0, 10.0, 1.0, 1.0))
        .with("fly_2", Bounds::new(12.0, 10.0, 1.0, 1.0))
        .with("killer_wall", Bounds::new(0.0, 0.0, 1.0, 18.0))
        .with("seed", 11_i64)
}

fn ready_tank() -> BossActor<GutsTank> {
    let mut boss = BossActor::new(GutsTank::default(), ActorId(3)).unwrap();
    boss.spawn(&hangar()).unwrap();
    boss.observe(WorldView {
        target: Some(TargetView {
            bounds: Bounds::new(3.0, 0.0, 1.0, 1.5),
            grounded: true,
            invincible: false,
        }),
        gravity: 30.0,
        ..default()
    });
    for _ in 0..10 {
        boss.update(DT);
    }
    assert_eq!(boss.lifecycle(), Lifecycle::Ready);
    boss.drain_commands();
    boss
}

#[test]
fn destroying_mid_punch_releases_the_fist() {
    let mut boss = ready_tank();
    let fist = boss.vars().fist.unwrap();
    let block = boss.vars().tank_block.unwrap();

    boss.vars_mut().launch_delay.set_to_end();
    boss.update(DT);
    assert_eq!(boss.children().get(fist).unwrap().mode, ChildMode::Launched);
    boss.drain_commands();

    boss.destroy();

    assert_eq!(boss.lifecycle(), Lifecycle::Destroyed);
    assert!(boss.vars().fist.is_none());
    assert!(boss.vars().tank_block.is_none());
    assert!(boss.children().get(fist).is_none());
    assert!(boss.children().get(block).is_none());
    assert!(boss.children().is_empty());
    assert!(!boss.fixtures().any_active());

    let released: Vec<_> = boss
        .drain_commands()
        .into_iter()
        .filter_map(|command| match command {
            ActorCommand::ReleaseChild(child) => Some(child),
            _ => None,
        })
        .collect();
    assert_eq!(released.len(), 2);
    let punched = released.iter().find(|child| child.handle() == fist).unwrap();
    assert_eq!(punched.kind, ChildKind::TankFist);
    assert!(!punched.fixtures.any_active());
    assert!(released.iter().all(|child| !child.fixtures.any_active()));
}

#[test]
fn a_destroyed_tank_ignores_further_updates() {
    let mut boss = ready_tank();
    boss.destroy();
    boss.drain_commands();
    let center = boss.body().center;

    for _ in 0..20 {
        boss.update(DT);
    }

    assert_eq!(boss.body().center, center);
    assert!(boss.children().is_empty());
    assert!(boss.drain_commands().is_empty());

    boss.destroy();
    assert!(boss.drain_commands().is_empty());
}

#[test]
fn respawning_after_destroy_rebuilds_the_children() {
    let mut boss = ready_tank();
    boss.destroy();

    boss.spawn(&hangar()).unwrap();

    assert_eq!(boss.lifecycle(), Lifecycle::Spawned);
    assert_eq!(boss.children().count(ChildKind::TankFist), 1);
    assert_eq!(boss.children().count(ChildKind::TankBlock), 1);
    let fist = boss.vars().fist.unwrap();
    assert_eq!(boss.children().get(fist).unwrap().mode, ChildMode::Attached);
}
