//! The shared boss runtime: lifecycle, tick ordering, defeat and teardown.
//!
//! Every boss is a [`BossActor`] wrapping a [`BossScript`]. One update runs,
//! in order:
//!
//! 1. timers (through the script, so it can gate them on sensors),
//! 2. the state machine, which may fire the change hook,
//! 3. fixture derivation from the settled state and animation frame,
//! 4. the script's per-state behavior,
//! 5. child integration and pruning.
//!
//! Sensors and the [`WorldView`] are written by the engine layer before the
//! update; velocities and queued commands are read back afterwards.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::animation::AnimationDef;
use super::blackboard::{Blackboard, BossCtx, HealthGauge, WorldView};
use super::body::Body;
use super::children::{ChildKind, ChildRegistry};
use super::commands::{ActorCommand, BossNotice};
use super::error::SpawnError;
use super::params::SpawnParams;
use super::roster::BossKind;
use super::script::{BossBlueprint, BossScript};
use crate::combat::{ActorId, Attacker, DamageNegotiator, FixtureSet, FixtureStatus, HitOutcome, Pose};
use crate::core::{ConfigError, EffectKind, Lifecycle, PerState, SoundCue, StateId, StateMachine, Timer};
use crate::world::Bounds;

const EXPLOSION_INTERVAL: f32 = 0.25;
const EXPLOSION_SPREAD: f32 = 0.75;
const ORB_SPEED: f32 = 7.0;

/// What part of a boss touched the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSource {
    Body,
    Child(ChildKind),
}

/// A boss instance driven by its script.
pub struct BossActor<Sc: BossScript> {
    script: Sc,
    lifecycle: Lifecycle,
    machine: StateMachine<Sc::State, BossCtx<Sc::State, Sc::Vars>>,
    ctx: BossCtx<Sc::State, Sc::Vars>,
    fixtures: FixtureSet<Sc::State>,
    damage: DamageNegotiator,
    animations: PerState<Sc::State, AnimationDef>,
    defeat_timer: Timer,
    explosion_timer: Timer,
}

impl<Sc: BossScript> BossActor<Sc> {
    pub fn new(script: Sc, id: ActorId) -> Result<Self, ConfigError> {
        let BossBlueprint {
            mut machine,
            timers,
            phases,
            fixtures,
            damage,
            animations,
            defeat_duration,
        } = script.blueprint()?;

        let mut hook = machine.take_on_change_state();
        machine.set_on_change_state(
            move |current: Sc::State, previous: Sc::State, ctx: &mut BossCtx<Sc::State, Sc::Vars>| {
                ctx.board.state_time = 0.0;
                if let Some(hook) = hook.as_mut() {
                    hook(current, previous, ctx);
                }
            },
        );

        let mut defeat_timer = Timer::new(defeat_duration);
        defeat_timer.set_to_end();

        Ok(Self {
            script,
            lifecycle: Lifecycle::Unspawned,
            machine,
            ctx: BossCtx {
                board: Blackboard::new(id),
                timers,
                phases,
            },
            fixtures,
            damage,
            animations,
            defeat_timer,
            explosion_timer: Timer::new(EXPLOSION_INTERVAL),
        })
    }

    pub fn id(&self) -> ActorId {
        self.ctx.board.id
    }

    pub fn kind(&self) -> BossKind {
        self.script.kind()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> Sc::State {
        self.machine.current()
    }

    pub fn previous_state(&self) -> Option<Sc::State> {
        self.machine.previous()
    }

    pub fn script(&self) -> &Sc {
        &self.script
    }

    pub fn ctx(&self) -> &BossCtx<Sc::State, Sc::Vars> {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut BossCtx<Sc::State, Sc::Vars> {
        &mut self.ctx
    }

    pub fn board(&self) -> &Blackboard<Sc::Vars> {
        &self.ctx.board
    }

    pub fn vars(&self) -> &Sc::Vars {
        &self.ctx.board.vars
    }

    pub fn vars_mut(&mut self) -> &mut Sc::Vars {
        &mut self.ctx.board.vars
    }

    pub fn body(&self) -> &Body {
        &self.ctx.board.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.ctx.board.body
    }

    pub fn fixtures(&self) -> &FixtureSet<Sc::State> {
        &self.fixtures
    }

    pub fn children(&self) -> &ChildRegistry {
        &self.ctx.board.children
    }

    pub fn timer(&self, state: Sc::State) -> Option<&Timer<Blackboard<Sc::Vars>>> {
        self.ctx.timer(state)
    }

    pub fn animation_key(&self) -> &'static str {
        self.script.animation_key(self.machine.current(), &self.ctx)
    }

    /// Animation frame of the current state, from time spent in it.
    pub fn frame(&self) -> usize {
        self.animations
            .get(self.machine.current())
            .map_or(0, |animation| animation.frame_at(self.ctx.board.state_time))
    }

    /// Resets every piece of per-fight state and places the boss.
    pub fn spawn(&mut self, params: &SpawnParams) -> Result<(), SpawnError> {
        self.ctx.board.release_all_children();
        self.reset();

        let board = &mut self.ctx.board;
        board.room = params.rect("room");
        if let Some(seed) = params.seed() {
            board.rng = StdRng::seed_from_u64(seed);
        }

        if let Err(err) = self.script.on_spawn(&mut self.ctx, params) {
            self.ctx.board.release_all_children();
            warn!("{:?} failed to spawn: {}", self.script.kind(), err);
            return Err(err);
        }

        self.lifecycle = Lifecycle::Spawned;
        self.derive_fixtures();
        self.ctx.board.emit(ActorCommand::Notice(BossNotice::Spawned));
        info!(
            "Spawned {:?} as {:?} at {:?}",
            self.script.kind(),
            self.id(),
            self.ctx.board.body.center
        );
        Ok(())
    }

    fn reset(&mut self) {
        let board = &mut self.ctx.board;
        board.vars = Sc::Vars::default();
        board.body = Body::sized(self.script.body_size());
        board.health = HealthGauge::full(self.script.max_health());
        board.world = WorldView::default();
        board.room = None;
        board.state_time = 0.0;
        board.rng = StdRng::seed_from_u64(board.id.0);
        board.damage_cooldown.reset_duration(self.script.damage_duration());
        board.damage_cooldown.set_to_end();

        self.machine.reset();
        for (_, timer) in self.ctx.timers.iter_mut() {
            timer.reset();
            timer.rearm();
            timer.resume();
        }
        if let Some(phases) = self.ctx.phases.as_mut() {
            phases.reset();
        }
        self.fixtures.deactivate_all();
        self.defeat_timer.set_to_end();
        self.explosion_timer.reset();
        self.lifecycle = Lifecycle::Unspawned;
    }

    /// Replaces the world snapshot used by the next update.
    pub fn observe(&mut self, world: WorldView) {
        self.ctx.board.world = world;
    }

    pub fn set_health(&mut self, current: i32) {
        let health = &mut self.ctx.board.health;
        health.current = current.min(health.max);
    }

    pub fn update(&mut self, dt: f32) {
        match self.lifecycle {
            Lifecycle::Unspawned | Lifecycle::Destroyed => {}
            Lifecycle::Spawned => {
                if self.script.is_ready(&mut self.ctx, dt) {
                    self.lifecycle = Lifecycle::Ready;
                    self.script.on_ready(&mut self.ctx);
                    self.ctx.board.emit(ActorCommand::Notice(BossNotice::Ready));
                    info!("{:?} is ready", self.script.kind());
                }
                self.derive_fixtures();
            }
            Lifecycle::Ready => self.tick_behavior(dt),
            Lifecycle::Defeated => self.tick_defeat(dt),
        }
    }

    fn tick_behavior(&mut self, dt: f32) {
        let state = self.machine.current();
        self.ctx.board.state_time += dt;
        self.ctx.board.damage_cooldown.tick(dt);
        self.script.tick_timers(state, &mut self.ctx, dt);

        let state = self.machine.update(&mut self.ctx);
        self.derive_fixtures();
        self.script.act(state, &mut self.ctx, dt);

        let gravity = self.ctx.board.world.gravity;
        let floor = self.ctx.board.room.map(|room| room.bottom());
        self.ctx.board.children.advance(dt, gravity, floor);
        self.ctx.board.prune_children();
    }

    fn derive_fixtures(&mut self) {
        let body = &self.ctx.board.body;
        let pose = Pose {
            state: self.machine.current(),
            frame: self.frame(),
            facing: body.facing,
            center: body.center,
        };
        self.fixtures.derive(pose);
    }

    /// Freezes behavior and starts the explosion sequence. Only a spawned or
    /// ready boss can be defeated, and only once.
    pub fn trigger_defeat(&mut self) {
        if !matches!(self.lifecycle, Lifecycle::Spawned | Lifecycle::Ready) {
            return;
        }

        self.lifecycle = Lifecycle::Defeated;
        self.ctx.board.release_all_children();
        self.ctx.board.body.stop();
        self.script.on_defeat(&mut self.ctx);
        self.fixtures.deactivate_all();
        self.defeat_timer.reset();
        self.explosion_timer.reset();
        self.ctx.board.emit(ActorCommand::Notice(BossNotice::Defeated));
        info!("{:?} defeated", self.script.kind());
    }

    fn tick_defeat(&mut self, dt: f32) {
        let board = &mut self.ctx.board;
        board.body.stop();

        self.explosion_timer.tick(dt);
        if self.explosion_timer.is_finished() {
            let cell = Vec2::new(board.rng.gen_range(-1..=1) as f32, board.rng.gen_range(-1..=1) as f32);
            let position = board.body.center + cell * EXPLOSION_SPREAD;
            board.effect(EffectKind::Explosion, position, Vec2::ZERO);
            board.play_sound(SoundCue::Explosion);
            self.explosion_timer.reset();
        }

        self.defeat_timer.tick(dt);
        if self.defeat_timer.is_just_finished() {
            self.ctx.board.emit(ActorCommand::Notice(BossNotice::Dead));
            self.destroy();
        }
    }

    /// Tears the boss down. Safe to call in any lifecycle; a destroyed or
    /// never-spawned boss is left alone.
    pub fn destroy(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Unspawned | Lifecycle::Destroyed) {
            return;
        }

        let released = self.ctx.board.release_all_children();
        self.fixtures.deactivate_all();
        for (_, timer) in self.ctx.timers.iter_mut() {
            timer.set_to_end();
        }
        self.defeat_timer.set_to_end();
        self.explosion_timer.set_to_end();

        let board = &mut self.ctx.board;
        board.body.stop();
        if board.health.is_depleted() {
            let center = board.body.center;
            for step in 0..8 {
                let angle = step as f32 * std::f32::consts::FRAC_PI_4;
                let direction = Vec2::from_angle(angle);
                board.effect(EffectKind::ExplosionOrb, center, direction * ORB_SPEED);
            }
            board.play_sound(SoundCue::Defeat);
        }

        self.script.on_destroy(&mut self.ctx);
        self.lifecycle = Lifecycle::Destroyed;
        info!("{:?} destroyed, released {} children", self.script.kind(), released);
    }

    pub fn negotiate(&self, attacker: &Attacker) -> i32 {
        self.damage.negotiate(attacker)
    }

    pub fn damage_negotiator_mut(&mut self) -> &mut DamageNegotiator {
        &mut self.damage
    }

    /// Only a ready boss outside its invulnerability window can be hurt,
    /// never by its own attacks, and only by attackers its damage table knows.
    pub fn can_be_damaged_by(&self, attacker: &Attacker) -> bool {
        self.lifecycle == Lifecycle::Ready
            && !self.ctx.board.is_invulnerable()
            && !attacker.is_owned_by(self.id())
            && self.negotiate(attacker) > 0
            && self
                .script
                .can_be_damaged_by(self.machine.current(), &self.ctx, attacker)
    }

    pub fn on_damaged(&mut self, attacker: &Attacker, damage: i32) {
        if self.lifecycle != Lifecycle::Ready {
            return;
        }
        self.ctx.board.restart_damage_cooldown();
        let state = self.machine.current();
        self.script.on_damaged(state, &mut self.ctx, attacker, damage);
    }

    /// First active damager, the boss's own before its children's, that
    /// overlaps `region`.
    pub fn contact(&self, region: &Bounds) -> Option<ContactSource> {
        if !self.lifecycle.is_live() {
            return None;
        }
        if self.fixtures.damages(region) {
            return Some(ContactSource::Body);
        }
        self.ctx.board.children.damager_at(region).map(ContactSource::Child)
    }

    pub fn on_target_damaged(&mut self, source: ContactSource) {
        if self.lifecycle == Lifecycle::Ready {
            self.script.on_target_damaged(&mut self.ctx, source);
        }
    }

    pub fn drain_commands(&mut self) -> Vec<ActorCommand> {
        self.ctx.board.drain_commands()
    }
}

/// Object-safe face of [`BossActor`], so the engine layer can store any boss.
pub trait BossDriver: Send + Sync {
    fn id(&self) -> ActorId;
    fn kind(&self) -> BossKind;
    fn lifecycle(&self) -> Lifecycle;
    fn state_name(&self) -> &'static str;
    fn animation_key(&self) -> &'static str;
    fn frame(&self) -> usize;
    fn spawn(&mut self, params: &SpawnParams) -> Result<(), SpawnError>;
    fn observe(&mut self, world: WorldView);
    fn update(&mut self, dt: f32);
    fn trigger_defeat(&mut self);
    fn destroy(&mut self);
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn health(&self) -> HealthGauge;
    fn set_health(&mut self, current: i32);
    fn fixture_statuses(&self) -> Vec<FixtureStatus>;
    fn resolve_hit(&self, region: &Bounds) -> HitOutcome;
    /// Tests `region` against children; a struck child dies.
    fn resolve_child_hit(&mut self, region: &Bounds) -> HitOutcome;
    fn contact(&self, region: &Bounds) -> Option<ContactSource>;
    /// The target took damage from this boss.
    fn on_target_damaged(&mut self, source: ContactSource);
    fn can_be_damaged_by(&self, attacker: &Attacker) -> bool;
    fn negotiate(&self, attacker: &Attacker) -> i32;
    fn on_damaged(&mut self, attacker: &Attacker, damage: i32);
    fn children(&self) -> &ChildRegistry;
    fn drain_commands(&mut self) -> Vec<ActorCommand>;
}

impl<Sc: BossScript> BossDriver for BossActor<Sc> {
    fn id(&self) -> ActorId {
        BossActor::id(self)
    }

    fn kind(&self) -> BossKind {
        BossActor::kind(self)
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn state_name(&self) -> &'static str {
        self.machine.current().name()
    }

    fn animation_key(&self) -> &'static str {
        BossActor::animation_key(self)
    }

    fn frame(&self) -> usize {
        BossActor::frame(self)
    }

    fn spawn(&mut self, params: &SpawnParams) -> Result<(), SpawnError> {
        BossActor::spawn(self, params)
    }

    fn observe(&mut self, world: WorldView) {
        BossActor::observe(self, world);
    }

    fn update(&mut self, dt: f32) {
        BossActor::update(self, dt);
    }

    fn trigger_defeat(&mut self) {
        BossActor::trigger_defeat(self);
    }

    fn destroy(&mut self) {
        BossActor::destroy(self);
    }

    fn body(&self) -> &Body {
        &self.ctx.board.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.ctx.board.body
    }

    fn health(&self) -> HealthGauge {
        self.ctx.board.health
    }

    fn set_health(&mut self, current: i32) {
        BossActor::set_health(self, current);
    }

    fn fixture_statuses(&self) -> Vec<FixtureStatus> {
        self.fixtures.statuses()
    }

    fn resolve_hit(&self, region: &Bounds) -> HitOutcome {
        self.fixtures.resolve_hit(region)
    }

    fn resolve_child_hit(&mut self, region: &Bounds) -> HitOutcome {
        self.ctx.board.children.resolve_hit(region)
    }

    fn contact(&self, region: &Bounds) -> Option<ContactSource> {
        BossActor::contact(self, region)
    }

    fn on_target_damaged(&mut self, source: ContactSource) {
        BossActor::on_target_damaged(self, source);
    }

    fn can_be_damaged_by(&self, attacker: &Attacker) -> bool {
        BossActor::can_be_damaged_by(self, attacker)
    }

    fn negotiate(&self, attacker: &Attacker) -> i32 {
        BossActor::negotiate(self, attacker)
    }

    fn on_damaged(&mut self, attacker: &Attacker, damage: i32) {
        BossActor::on_damaged(self, attacker, damage);
    }

    fn children(&self) -> &ChildRegistry {
        &self.ctx.board.children
    }

    fn drain_commands(&mut self) -> Vec<ActorCommand> {
        BossActor::drain_commands(self)
    }
}
