//! Bospider: a giant spider that drops from its lair, lays baby spiders,
//! climbs one of several web paths and exposes its eye before retreating.
//!
//! The five phases always run in the same order, so the machine only ever
//! moves to whatever the phase loop points at. `act` advances the loop when
//! a phase is done.

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use super::BossKind;
use crate::bosses::animation::AnimationDef;
use crate::bosses::blackboard::{Blackboard, BossCtx};
use crate::bosses::body::ARRIVAL_EPSILON;
use crate::bosses::children::ChildKind;
use crate::bosses::error::SpawnError;
use crate::bosses::params::SpawnParams;
use crate::bosses::script::{BossBlueprint, BossScript};
use crate::combat::{
    Activation, Attacker, AttackerKind, Damage, DamageNegotiator, DamageTable, FixtureRole, FixtureSet, FixtureSpec,
    LocalShape,
};
use crate::core::{ConfigError, EffectKind, Element, Loop, Scaled, SoundCue, StateId, StateMachine, Timer};
use crate::world::{Bounds, Facing};

const ICE_SHARDS: usize = 5;
const ICE_SHARD_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BospiderState {
    Spawn,
    Climb,
    OpenEye,
    CloseEye,
    Retreat,
}

impl StateId for BospiderState {
    const ALL: &'static [Self] = &[
        BospiderState::Spawn,
        BospiderState::Climb,
        BospiderState::OpenEye,
        BospiderState::CloseEye,
        BospiderState::Retreat,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            BospiderState::Spawn => "spawn",
            BospiderState::Climb => "climb",
            BospiderState::OpenEye => "open_eye",
            BospiderState::CloseEye => "close_eye",
            BospiderState::Retreat => "retreat",
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BospiderTuning {
    pub max_health: i32,
    pub intro_delay: f32,
    pub spawn_delay: f32,
    /// Live baby spiders allowed at once.
    pub max_children: usize,
    pub return_speed: f32,
    pub climb_speed: Scaled,
    pub open_eye: Scaled,
    pub close_eye: f32,
    /// How far above its spawn point the spider starts and retreats to.
    pub start_offset: f32,
    pub burn_duration: f32,
    pub frozen_duration: f32,
    pub baby_speed: f32,
}

impl Default for BospiderTuning {
    fn default() -> Self {
        Self {
            max_health: 30,
            intro_delay: 5.0,
            spawn_delay: 2.0,
            max_children: 4,
            return_speed: 7.0,
            climb_speed: Scaled::new(7.0, 14.0),
            open_eye: Scaled::new(2.0, 0.75),
            close_eye: 0.35,
            start_offset: 2.0,
            burn_duration: 0.5,
            frozen_duration: 0.5,
            baby_speed: 4.0,
        }
    }
}

#[derive(Debug)]
pub struct BospiderVars {
    pub spawn: Vec2,
    pub paths: Vec<Vec<Vec2>>,
    pub spawners: Vec<Bounds>,
    /// Remaining points of the path being climbed.
    pub path: VecDeque<Vec2>,
    pub intro: Timer,
    pub burn: Timer,
    pub frozen: Timer,
}

impl Default for BospiderVars {
    fn default() -> Self {
        Self {
            spawn: Vec2::ZERO,
            paths: Vec::new(),
            spawners: Vec::new(),
            path: VecDeque::new(),
            intro: Timer::new(0.0),
            burn: Timer::new(0.0),
            frozen: Timer::new(0.0),
        }
    }
}

impl BospiderVars {
    pub fn is_burning(&self) -> bool {
        !self.burn.is_finished()
    }

    pub fn is_frozen(&self) -> bool {
        !self.frozen.is_finished()
    }
}

type Ctx = BossCtx<BospiderState, BospiderVars>;

#[derive(Debug, Clone, Default)]
pub struct Bospider {
    tuning: BospiderTuning,
}

impl Bospider {
    pub fn new(tuning: BospiderTuning) -> Self {
        Self { tuning }
    }

    fn damage() -> DamageNegotiator {
        let fire = Damage::Fixed(8);
        DamageNegotiator::new(
            DamageTable::new()
                .with(AttackerKind::Bullet, Damage::Fixed(2))
                .with(AttackerKind::Fireball, fire)
                .with(AttackerKind::MagmaWave, fire)
                .with(AttackerKind::MagmaFlame, fire)
                .with(AttackerKind::ChargedShot, Damage::Charged { partial: 4, full: 5 })
                .with(AttackerKind::ChargedShotExplosion, Damage::Charged { partial: 2, full: 3 })
                .with(AttackerKind::MoonScythe, Damage::Fixed(5))
                .with(AttackerKind::SmallIceCube, Damage::Fixed(2)),
        )
    }

    fn fixtures() -> FixtureSet<BospiderState> {
        use BospiderState::*;
        FixtureSet::new()
            .with(FixtureSpec::new("body", FixtureRole::Body, LocalShape::square(2.0), Activation::Always))
            .with(FixtureSpec::new("damager", FixtureRole::Damager, LocalShape::square(2.0), Activation::Always))
            .with(FixtureSpec::new(
                "hurt",
                FixtureRole::Damageable,
                LocalShape::square(2.0),
                Activation::InStates(vec![OpenEye, CloseEye]),
            ))
            .with(FixtureSpec::new(
                "shield",
                FixtureRole::Shield,
                LocalShape::square(2.25),
                Activation::InStates(vec![Spawn, Climb, Retreat]),
            ))
    }

    fn act_spawn(&self, ctx: &mut Ctx, dt: f32) {
        let board = &mut ctx.board;
        let spawn = board.vars.spawn;
        if board.body.center.distance(spawn) > ARRIVAL_EPSILON {
            board.body.steer_to(spawn, self.tuning.return_speed, dt);
            return;
        }
        board.body.stop();
        if !ctx.timer_finished(BospiderState::Spawn) {
            return;
        }

        self.spawn_babies(&mut ctx.board);
        let board = &mut ctx.board;
        let pick = board.rng.gen_range(0..board.vars.paths.len());
        board.vars.path = board.vars.paths[pick].iter().copied().collect();
        debug!("Bospider climbs path {}", pick);
        ctx.advance_phase();
    }

    fn spawn_babies(&self, board: &mut Blackboard<BospiderVars>) {
        let live = board.children.count(ChildKind::BabySpider);
        let wanted = self.tuning.max_children.saturating_sub(live);
        let spawners = board.vars.spawners.clone();
        for i in 0..wanted {
            let spot = spawners[i % spawners.len()].center();
            let facing = board
                .target_center()
                .map_or(Facing::Left, |target| Facing::toward(spot.x, target.x));
            let params = SpawnParams::new()
                .with("position", spot)
                .with("velocity", Vec2::new(facing.sign() * self.tuning.baby_speed, 0.0))
                .with("facing", facing)
                .with("gravity", true);
            board.spawn_child(ChildKind::BabySpider, params);
        }
    }

    fn act_climb(&self, ctx: &mut Ctx, dt: f32) {
        let speed = self.tuning.climb_speed.at(ctx.board.health_ratio());
        let board = &mut ctx.board;
        match board.vars.path.front().copied() {
            Some(point) => {
                if board.body.steer_to(point, speed, dt) {
                    board.vars.path.pop_front();
                }
            }
            None => {
                board.body.stop();
                ctx.advance_phase();
            }
        }
    }

    fn act_retreat(&self, ctx: &mut Ctx) {
        let board = &mut ctx.board;
        let top = board.vars.spawn.y + self.tuning.start_offset;
        if board.body.center.y < top {
            board.body.velocity = Vec2::new(0.0, self.tuning.return_speed);
            return;
        }
        board.body.center.y = top;
        board.body.stop();
        ctx.advance_phase();
    }
}

impl BossScript for Bospider {
    type State = BospiderState;
    type Vars = BospiderVars;

    fn kind(&self) -> BossKind {
        BossKind::Bospider
    }

    fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    fn body_size(&self) -> Vec2 {
        Vec2::splat(2.5)
    }

    fn blueprint(&self) -> Result<BossBlueprint<BospiderState, BospiderVars>, ConfigError> {
        use BospiderState::*;

        let phases = Loop::new(BospiderState::ALL.iter().copied())?;
        let mut builder = StateMachine::builder()
            .states(BospiderState::ALL.iter().copied())
            .initial_state(Spawn);
        for (i, &from) in BospiderState::ALL.iter().enumerate() {
            let to = BospiderState::ALL[(i + 1) % BospiderState::ALL.len()];
            builder = builder.transition(from, to, move |ctx: &Ctx| ctx.phase() == Some(to));
        }

        let open_eye = self.tuning.open_eye;
        let machine = builder
            .on_change_state(move |current, previous, ctx: &mut Ctx| {
                if current == OpenEye {
                    let duration = open_eye.at(ctx.board.health_ratio());
                    if let Some(timer) = ctx.timer_mut(OpenEye) {
                        timer.reset_duration(duration);
                    }
                }
                ctx.reset_timer(current);
                debug!("Bospider {} -> {}", previous.name(), current.name());
            })
            .build()?;

        Ok(BossBlueprint::new(machine, Self::damage())
            .timer(Spawn, Timer::new(self.tuning.spawn_delay))
            .timer(OpenEye, Timer::new(open_eye.full))
            .timer(CloseEye, Timer::new(self.tuning.close_eye))
            .phases(phases)
            .fixtures(Self::fixtures())
            .animation(Climb, AnimationDef::uniform(1, 5, 0.1, true))
            .animation(Retreat, AnimationDef::uniform(1, 5, 0.1, true))
            .animation(OpenEye, AnimationDef::uniform(1, 4, 0.1, false))
            .animation(CloseEye, AnimationDef::uniform(1, 4, 0.1, false)))
    }

    fn on_spawn(&self, ctx: &mut Ctx, params: &SpawnParams) -> Result<(), SpawnError> {
        let bounds = params.require_rect("bounds")?;
        let paths = params.paths_with_prefix("path");
        if paths.is_empty() {
            return Err(SpawnError::MissingParam("path_*".into()));
        }
        let spawners = params.rects_with_prefix("spawner");
        if spawners.is_empty() {
            return Err(SpawnError::MissingParam("spawner_*".into()));
        }

        let board = &mut ctx.board;
        let vars = &mut board.vars;
        vars.spawn = bounds.center();
        vars.paths = paths;
        vars.spawners = spawners;
        vars.intro.reset_duration(self.tuning.intro_delay);
        vars.intro.reset();
        vars.burn.reset_duration(self.tuning.burn_duration);
        vars.burn.set_to_end();
        vars.frozen.reset_duration(self.tuning.frozen_duration);
        vars.frozen.set_to_end();
        board.body.center = bounds.center() + Vec2::new(0.0, self.tuning.start_offset);
        Ok(())
    }

    fn is_ready(&self, ctx: &mut Ctx, dt: f32) -> bool {
        let intro = &mut ctx.board.vars.intro;
        intro.tick(dt);
        intro.is_finished()
    }

    fn tick_timers(&self, state: BospiderState, ctx: &mut Ctx, dt: f32) {
        let board = &mut ctx.board;
        if board.vars.is_burning() {
            board.vars.burn.tick(dt);
            if board.vars.burn.is_just_finished() {
                board.restart_damage_cooldown();
            }
            return;
        }
        if board.vars.is_frozen() {
            board.vars.frozen.tick(dt);
            if board.vars.frozen.is_just_finished() {
                board.restart_damage_cooldown();
                let center = board.body.center;
                for i in 0..ICE_SHARDS {
                    let angle = i as f32 * std::f32::consts::TAU / ICE_SHARDS as f32;
                    board.effect(EffectKind::IceShard, center, Vec2::from_angle(angle) * ICE_SHARD_SPEED);
                }
            }
            return;
        }

        match state {
            BospiderState::Spawn => {
                if board.body.center.distance(board.vars.spawn) <= ARRIVAL_EPSILON {
                    ctx.tick_timer(state, dt);
                }
            }
            BospiderState::OpenEye | BospiderState::CloseEye => ctx.tick_timer(state, dt),
            BospiderState::Climb | BospiderState::Retreat => {}
        }
    }

    fn act(&self, state: BospiderState, ctx: &mut Ctx, dt: f32) {
        if ctx.board.vars.is_burning() || ctx.board.vars.is_frozen() {
            ctx.board.body.stop();
            return;
        }

        match state {
            BospiderState::Spawn => self.act_spawn(ctx, dt),
            BospiderState::Climb => self.act_climb(ctx, dt),
            BospiderState::OpenEye | BospiderState::CloseEye => {
                ctx.board.body.stop();
                if ctx.timer_finished(state) {
                    ctx.advance_phase();
                }
            }
            BospiderState::Retreat => self.act_retreat(ctx),
        }
    }

    fn animation_key(&self, state: BospiderState, ctx: &Ctx) -> &'static str {
        let vars = &ctx.board.vars;
        if vars.is_burning() {
            return "burn";
        }
        if vars.is_frozen() {
            return "frozen";
        }
        match state {
            BospiderState::Spawn => "still",
            BospiderState::Climb | BospiderState::Retreat => "climb",
            BospiderState::OpenEye => "open_eye",
            BospiderState::CloseEye => "close_eye",
        }
    }

    fn on_damaged(&self, _state: BospiderState, ctx: &mut Ctx, attacker: &Attacker, _damage: i32) {
        let board = &mut ctx.board;
        match attacker.element {
            Element::Fire if !board.vars.is_burning() => {
                board.vars.frozen.set_to_end();
                board.vars.burn.reset();
                board.play_sound(SoundCue::AtomicFire);
            }
            Element::Ice if !board.vars.is_burning() && !board.vars.is_frozen() => {
                board.vars.frozen.reset();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bosses::actor::BossActor;
    use crate::bosses::commands::ActorCommand;
    use crate::combat::ActorId;
    use crate::core::Lifecycle;

    const DT: f32 = 0.1;

    fn params() -> SpawnParams {
        SpawnParams::new()
            .with("bounds", Bounds::new(-1.25, 10.0, 2.5, 2.5))
            .with("path_1", vec![Vec2::new(5.0, 6.0), Vec2::new(5.0, 2.0)])
            .with("spawner_1", Bounds::new(-6.0, 0.0, 1.0, 1.0))
            .with("seed", 7_i64)
    }

    fn spawned() -> BossActor<Bospider> {
        let mut boss = BossActor::new(Bospider::default(), ActorId(1)).unwrap();
        boss.spawn(&params()).unwrap();
        boss
    }

    /// Updates and applies the written velocity like the arena would.
    fn step(boss: &mut BossActor<Bospider>) {
        boss.update(DT);
        let velocity = boss.body().velocity;
        boss.body_mut().center += velocity * DT;
    }

    fn run_until(boss: &mut BossActor<Bospider>, state: BospiderState, max_steps: usize) {
        for _ in 0..max_steps {
            if boss.state() == state {
                return;
            }
            step(boss);
        }
        panic!("never reached {:?}, stuck in {:?}", state, boss.state());
    }

    #[test]
    fn spawn_needs_paths_and_spawners() {
        let mut boss = BossActor::new(Bospider::default(), ActorId(1)).unwrap();
        let no_path = SpawnParams::new()
            .with("bounds", Bounds::new(0.0, 0.0, 1.0, 1.0))
            .with("spawner_1", Bounds::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(boss.spawn(&no_path), Err(SpawnError::MissingParam("path_*".into())));
        assert_eq!(boss.lifecycle(), Lifecycle::Unspawned);

        let no_spawner = SpawnParams::new()
            .with("bounds", Bounds::new(0.0, 0.0, 1.0, 1.0))
            .with("path_1", vec![Vec2::ZERO]);
        assert_eq!(boss.spawn(&no_spawner), Err(SpawnError::MissingParam("spawner_*".into())));
    }

    #[test]
    fn waits_out_the_intro() {
        let mut boss = spawned();
        for _ in 0..45 {
            step(&mut boss);
        }
        assert_eq!(boss.lifecycle(), Lifecycle::Spawned);
        for _ in 0..10 {
            step(&mut boss);
        }
        assert_eq!(boss.lifecycle(), Lifecycle::Ready);
    }

    #[test]
    fn rotates_through_every_phase() {
        let mut boss = spawned();
        run_until(&mut boss, BospiderState::Climb, 200);
        assert_eq!(boss.children().count(ChildKind::BabySpider), 4);
        assert!(boss.fixtures().is_active("shield"));

        run_until(&mut boss, BospiderState::OpenEye, 100);
        assert!(boss.fixtures().is_active("hurt"));
        assert!(!boss.fixtures().is_active("shield"));
        assert_eq!(boss.animation_key(), "open_eye");

        run_until(&mut boss, BospiderState::CloseEye, 50);
        run_until(&mut boss, BospiderState::Retreat, 10);
        run_until(&mut boss, BospiderState::Spawn, 100);
        assert_eq!(boss.ctx().phase(), Some(BospiderState::Spawn));
    }

    #[test]
    fn open_eye_shortens_as_health_drops() {
        let mut boss = spawned();
        boss.set_health(0);
        run_until(&mut boss, BospiderState::OpenEye, 400);
        let timer = boss.timer(BospiderState::OpenEye).unwrap();
        assert!((timer.duration() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn fire_burns_and_holds_still() {
        let mut boss = spawned();
        run_until(&mut boss, BospiderState::Climb, 200);
        step(&mut boss);
        boss.drain_commands();

        boss.on_damaged(&Attacker::new(AttackerKind::Fireball), 8);
        assert!(boss.vars().is_burning());
        assert!(boss
            .drain_commands()
            .iter()
            .any(|command| matches!(command, ActorCommand::PlaySound(SoundCue::AtomicFire))));

        step(&mut boss);
        assert_eq!(boss.animation_key(), "burn");
        assert_eq!(boss.body().velocity, Vec2::ZERO);

        for _ in 0..6 {
            step(&mut boss);
        }
        assert!(!boss.vars().is_burning());
    }

    #[test]
    fn burning_out_reopens_the_damage_window() {
        let mut boss = spawned();
        run_until(&mut boss, BospiderState::Climb, 200);
        let bullet = Attacker::new(AttackerKind::Bullet);
        assert!(boss.can_be_damaged_by(&bullet));

        boss.on_damaged(&Attacker::new(AttackerKind::Fireball), 1);
        assert!(!boss.can_be_damaged_by(&bullet));

        // burn lasts 0.5 s; the window then runs 1.25 s from its end
        for _ in 0..14 {
            step(&mut boss);
        }
        assert!(!boss.vars().is_burning());
        assert!(!boss.can_be_damaged_by(&bullet));

        for _ in 0..5 {
            step(&mut boss);
        }
        assert!(boss.can_be_damaged_by(&bullet));
    }

    #[test]
    fn thawing_throws_ice_shards() {
        let mut boss = spawned();
        run_until(&mut boss, BospiderState::Climb, 200);
        boss.drain_commands();
        boss.on_damaged(&Attacker::new(AttackerKind::SmallIceCube), 2);
        assert!(boss.vars().is_frozen());

        for _ in 0..6 {
            step(&mut boss);
        }
        let shards = boss
            .drain_commands()
            .into_iter()
            .filter(|command| {
                matches!(
                    command,
                    ActorCommand::Effect {
                        effect: EffectKind::IceShard,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(shards, ICE_SHARDS);
    }

    #[test]
    fn fully_charged_shots_hit_harder() {
        let boss = spawned();
        let shot = Attacker::new(AttackerKind::ChargedShot);
        assert_eq!(boss.negotiate(&shot), 4);
        assert_eq!(boss.negotiate(&shot.charged(true)), 5);
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::MagmaWave)), 8);
    }
}
