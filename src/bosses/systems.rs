//! Systems that carry boss drivers through the frame.

use bevy::prelude::*;

use super::blackboard::{ProjectileView, TargetView, WorldView};
use super::commands::{ActorCommand, BossNotice};
use super::components::*;
use super::data::BossRegistry;
use super::error::SpawnError;
use super::roster;
use crate::combat::{DamageCooldown, Health, Projectile};
use crate::core::{
    BossDead, BossDefeated, BossReady, EffectRequest, GameState, Lifecycle, RoomShake, SoundRequest, StunTarget,
};
use crate::world::{ArenaLayout, Target, TargetBody};

/// Builds and places bosses for every [`SpawnBoss`] request.
pub fn spawn_bosses(
    mut commands: Commands,
    mut requests: EventReader<SpawnBoss>,
    registry: Res<BossRegistry>,
    mut ids: ResMut<ActorIdAllocator>,
    mut failures: EventWriter<BossSpawnFailed>,
) {
    for request in requests.read() {
        let id = ids.allocate();
        let built = roster::create(request.kind, &registry, id)
            .map_err(SpawnError::from)
            .and_then(|mut driver| driver.spawn(&request.params).map(|_| driver));

        match built {
            Ok(driver) => {
                let health = driver.health();
                let center = driver.body().center;
                commands.spawn((
                    Name::new(format!("{:?} #{}", request.kind, id.0)),
                    Health {
                        current: health.current,
                        maximum: health.max,
                    },
                    Transform::from_translation(center.extend(0.0)),
                    Boss::new(driver),
                ));
            }
            Err(error) => {
                error!("Could not spawn {:?}: {}", request.kind, error);
                failures.send(BossSpawnFailed {
                    kind: request.kind,
                    error,
                });
            }
        }
    }
}

/// Hands every boss the same snapshot of the world, taken before any of
/// them ticks, and syncs its health gauge.
pub fn observe_world(
    arena: Option<Res<ArenaLayout>>,
    targets: Query<(&TargetBody, Option<&DamageCooldown>), With<Target>>,
    projectiles: Query<&Projectile>,
    mut bosses: Query<(&mut Boss, &Health)>,
) {
    let target = targets.iter().next().map(|(body, cooldown)| TargetView {
        bounds: body.bounds(),
        grounded: body.is_grounded(),
        invincible: cooldown.is_some_and(DamageCooldown::is_active),
    });
    let view = WorldView {
        target,
        projectiles: projectiles
            .iter()
            .map(|shot| ProjectileView {
                attacker: shot.attacker,
                bounds: shot.bounds,
            })
            .collect(),
        gravity: arena.map_or(0.0, |arena| arena.gravity),
    };

    for (mut boss, health) in &mut bosses {
        boss.driver.observe(view.clone());
        boss.driver.set_health(health.current);
    }
}

pub fn tick_bosses(time: Res<Time>, mut bosses: Query<&mut Boss>) {
    let dt = time.delta_secs();
    for mut boss in &mut bosses {
        boss.driver.update(dt);
    }
}

/// Turns queued actor commands into child entities and global events.
#[allow(clippy::too_many_arguments)]
pub fn relay_commands(
    mut commands: Commands,
    mut bosses: Query<(Entity, &mut Boss)>,
    mut children: ResMut<ChildEntities>,
    mut sounds: EventWriter<SoundRequest>,
    mut effects: EventWriter<EffectRequest>,
    mut shakes: EventWriter<RoomShake>,
    mut stuns: EventWriter<StunTarget>,
    mut ready: EventWriter<BossReady>,
    mut defeated: EventWriter<BossDefeated>,
    mut dead: EventWriter<BossDead>,
) {
    for (entity, mut boss) in &mut bosses {
        let kind = boss.driver.kind();
        for command in boss.driver.drain_commands() {
            match command {
                ActorCommand::SpawnChild { handle, kind: child } => {
                    let center = boss
                        .driver
                        .children()
                        .get(handle)
                        .map_or(Vec2::ZERO, |actor| actor.body.center);
                    let mirror = commands
                        .spawn((
                            Name::new(format!("{:?}", child)),
                            ChildMirror {
                                owner: entity,
                                handle,
                                kind: child,
                            },
                            Transform::from_translation(center.extend(0.0)),
                        ))
                        .id();
                    children.0.insert(handle, mirror);
                }
                ActorCommand::ReleaseChild(child) => {
                    if let Some(mirror) = children.0.remove(&child.handle()) {
                        commands.entity(mirror).despawn();
                    }
                }
                ActorCommand::PlaySound(cue) => {
                    sounds.send(SoundRequest { cue, looping: false });
                }
                ActorCommand::Effect {
                    effect,
                    position,
                    velocity,
                } => {
                    effects.send(EffectRequest {
                        effect,
                        position,
                        velocity,
                    });
                }
                ActorCommand::ShakeRoom {
                    duration,
                    interval,
                    intensity,
                } => {
                    shakes.send(RoomShake {
                        duration,
                        interval,
                        intensity,
                    });
                }
                ActorCommand::StunTarget => {
                    stuns.send(StunTarget);
                }
                ActorCommand::Notice(BossNotice::Spawned) => debug!("{:?} entered the arena", kind),
                ActorCommand::Notice(BossNotice::Ready) => {
                    ready.send(BossReady { entity, kind });
                }
                ActorCommand::Notice(BossNotice::Defeated) => {
                    defeated.send(BossDefeated { entity, kind });
                }
                ActorCommand::Notice(BossNotice::Dead) => {
                    dead.send(BossDead { entity, kind });
                }
            }
        }
    }
}

pub fn mirror_boss_transforms(mut bosses: Query<(&Boss, &mut Transform)>) {
    for (boss, mut transform) in &mut bosses {
        let center = boss.driver.body().center;
        transform.translation = center.extend(transform.translation.z);
    }
}

pub fn mirror_child_transforms(
    bosses: Query<&Boss>,
    mut mirrors: Query<(&ChildMirror, &mut Transform), Without<Boss>>,
) {
    for (mirror, mut transform) in &mut mirrors {
        let Ok(boss) = bosses.get(mirror.owner) else {
            continue;
        };
        if let Some(child) = boss.driver.children().get(mirror.handle) {
            transform.translation = child.body.center.extend(transform.translation.z);
        }
    }
}

/// Despawns destroyed bosses and declares victory once none are left.
pub fn despawn_destroyed_bosses(
    mut commands: Commands,
    bosses: Query<(Entity, &Boss)>,
    mut children: ResMut<ChildEntities>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let mut removed = 0;
    let mut remaining = 0;

    for (entity, boss) in &bosses {
        if boss.driver.lifecycle() != Lifecycle::Destroyed {
            remaining += 1;
            continue;
        }

        let id = boss.driver.id();
        children.0.retain(|handle, mirror| {
            if handle.owner == id {
                commands.entity(*mirror).despawn();
                false
            } else {
                true
            }
        });
        commands.entity(entity).despawn();
        removed += 1;
        info!("Despawned {:?}", boss.driver.kind());
    }

    if removed > 0 && remaining == 0 {
        info!("Every boss is down");
        next_state.set(GameState::Victory);
    }
}

/// Tears down every boss when the fight ends.
pub fn despawn_all_bosses(
    mut commands: Commands,
    mut bosses: Query<(Entity, &mut Boss)>,
    mirrors: Query<Entity, With<ChildMirror>>,
    mut children: ResMut<ChildEntities>,
) {
    for (entity, mut boss) in &mut bosses {
        boss.driver.destroy();
        commands.entity(entity).despawn();
    }
    for mirror in &mirrors {
        commands.entity(mirror).despawn();
    }
    children.0.clear();
}
