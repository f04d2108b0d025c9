//! Combat systems - attack resolution, contact damage and feedback.

use bevy::prelude::*;

use super::components::*;
use super::fixtures::HitOutcome;
use crate::bosses::{Boss, BossSet, ContactSource};
use crate::core::{GameState, RoomShake};
use crate::world::{Target, TargetBody};

/// Damage the target takes from touching a boss body.
pub const BODY_CONTACT_DAMAGE: i32 = 4;
/// Damage the target takes from touching a boss's child.
pub const CHILD_CONTACT_DAMAGE: i32 = 2;

/// System set ordering for combat.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSet {
    Attacks,
    Contact,
    Damage,
    Feedback,
}

/// Configure combat systems.
///
/// Combat runs after every boss has ticked and before anything moves, so
/// attacks are tested against the fixtures the bosses just derived.
pub fn setup_combat_systems(app: &mut App) {
    app
        // Resources
        .init_resource::<ScreenShake>()

        // Events
        .add_event::<AttackEvent>()
        .add_event::<BossHit>()

        // System ordering
        .configure_sets(
            Update,
            (
                CombatSet::Attacks,
                CombatSet::Contact,
                CombatSet::Damage,
                CombatSet::Feedback,
            )
                .chain()
                .after(BossSet::Think)
                .before(BossSet::Integrate)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(Update, resolve_attacks.in_set(CombatSet::Attacks))
        .add_systems(Update, contact_damage.in_set(CombatSet::Contact))
        .add_systems(
            Update,
            (apply_target_damage, tick_damage_cooldowns).chain().in_set(CombatSet::Damage),
        )
        .add_systems(Update, update_screen_shake.in_set(CombatSet::Feedback));
}

/// Tests every attack against boss fixtures, then their children.
///
/// An attack stops at the first boss or child it touches. Shields win over
/// damageable fixtures.
pub fn resolve_attacks(
    mut attacks: EventReader<AttackEvent>,
    mut bosses: Query<(Entity, &mut Boss, &mut Health)>,
    mut hits: EventWriter<BossHit>,
) {
    'attacks: for attack in attacks.read() {
        for (entity, mut boss, mut health) in &mut bosses {
            let driver = &mut boss.driver;

            match driver.resolve_hit(&attack.region) {
                HitOutcome::Blocked(fixture) => {
                    debug!("{:?} blocked {:?} with {}", driver.kind(), attack.attacker.kind, fixture);
                    hits.send(BossHit {
                        boss: entity,
                        outcome: HitOutcome::Blocked(fixture),
                        damage: 0,
                        on_child: false,
                    });
                    continue 'attacks;
                }
                HitOutcome::Struck(fixture) => {
                    let mut damage = 0;
                    if driver.can_be_damaged_by(&attack.attacker) {
                        damage = health.take_damage(driver.negotiate(&attack.attacker));
                        driver.set_health(health.current);
                        driver.on_damaged(&attack.attacker, damage);
                        debug!(
                            "{:?} took {} from {:?}, {} left",
                            driver.kind(),
                            damage,
                            attack.attacker.kind,
                            health.current
                        );
                        if health.is_dead() {
                            driver.trigger_defeat();
                        }
                    }
                    hits.send(BossHit {
                        boss: entity,
                        outcome: HitOutcome::Struck(fixture),
                        damage,
                        on_child: false,
                    });
                    continue 'attacks;
                }
                HitOutcome::Miss => {}
            }

            let outcome = driver.resolve_child_hit(&attack.region);
            if outcome != HitOutcome::Miss {
                hits.send(BossHit {
                    boss: entity,
                    outcome,
                    damage: 0,
                    on_child: true,
                });
                continue 'attacks;
            }
        }
    }
}

/// Turns boss damagers overlapping the target into [`DamageEvent`]s.
pub fn contact_damage(
    mut bosses: Query<(Entity, &mut Boss)>,
    mut targets: Query<(Entity, &TargetBody, &mut DamageCooldown), With<Target>>,
    mut damage: EventWriter<DamageEvent>,
) {
    for (target, body, mut cooldown) in &mut targets {
        if cooldown.is_active() {
            continue;
        }

        let hurtbox = body.bounds();
        for (entity, mut boss) in &mut bosses {
            let Some(source) = boss.driver.contact(&hurtbox) else {
                continue;
            };
            let amount = match source {
                ContactSource::Body => BODY_CONTACT_DAMAGE,
                ContactSource::Child(_) => CHILD_CONTACT_DAMAGE,
            };
            damage.send(DamageEvent {
                target,
                source: entity,
                amount,
                element: Element::Physical,
            });
            cooldown.start();
            boss.driver.on_target_damaged(source);
            break;
        }
    }
}

/// Apply contact damage to the target.
pub fn apply_target_damage(mut damage_events: EventReader<DamageEvent>, mut targets: Query<&mut Health, With<Target>>) {
    for event in damage_events.read() {
        let Ok(mut health) = targets.get_mut(event.target) else {
            continue;
        };
        let taken = health.take_damage(event.amount);
        debug!("Target took {} ({} left)", taken, health.current);
        if taken > 0 && health.is_dead() {
            info!("Target is down");
        }
    }
}

pub fn tick_damage_cooldowns(time: Res<Time>, mut query: Query<&mut DamageCooldown>) {
    for mut cooldown in &mut query {
        cooldown.tick(time.delta_secs());
    }
}

/// Update room shake from boss requests.
pub fn update_screen_shake(
    time: Res<Time>,
    mut requests: EventReader<RoomShake>,
    mut screen_shake: ResMut<ScreenShake>,
) {
    for request in requests.read() {
        screen_shake.shake(request.duration, request.interval, request.intensity);
    }
    screen_shake.update(time.delta_secs());
}
