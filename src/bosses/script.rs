//! The extension point every boss implements.
//!
//! A script describes one boss: its states and transitions, its timers,
//! fixtures and damage table (the [`BossBlueprint`]), plus a handful of
//! hooks the shared actor calls at fixed points of the tick. Everything a
//! script needs at runtime lives in the [`BossCtx`] it is handed.

use bevy::prelude::*;

use super::actor::ContactSource;
use super::animation::AnimationDef;
use super::blackboard::{Blackboard, BossCtx};
use super::error::SpawnError;
use super::params::SpawnParams;
use super::roster::BossKind;
use crate::combat::{Attacker, DamageNegotiator, FixtureSet};
use crate::core::{ConfigError, Loop, PerState, StateId, StateMachine, Timer};

/// How long a defeated boss keeps exploding before it is destroyed.
pub const DEFAULT_DEFEAT_DURATION: f32 = 3.0;

/// Seconds a boss shrugs off further hits after one lands.
pub const DEFAULT_DAMAGE_DURATION: f32 = 1.25;

/// Static description of a boss, built once per instance.
pub struct BossBlueprint<S: StateId, B> {
    pub machine: StateMachine<S, BossCtx<S, B>>,
    pub timers: PerState<S, Timer<Blackboard<B>>>,
    pub phases: Option<Loop<S>>,
    pub fixtures: FixtureSet<S>,
    pub damage: DamageNegotiator,
    pub animations: PerState<S, AnimationDef>,
    pub defeat_duration: f32,
}

impl<S: StateId, B> BossBlueprint<S, B> {
    pub fn new(machine: StateMachine<S, BossCtx<S, B>>, damage: DamageNegotiator) -> Self {
        Self {
            machine,
            timers: PerState::new(),
            phases: None,
            fixtures: FixtureSet::new(),
            damage,
            animations: PerState::new(),
            defeat_duration: DEFAULT_DEFEAT_DURATION,
        }
    }

    pub fn timer(mut self, state: S, timer: Timer<Blackboard<B>>) -> Self {
        self.timers.insert(state, timer);
        self
    }

    pub fn phases(mut self, phases: Loop<S>) -> Self {
        self.phases = Some(phases);
        self
    }

    pub fn fixtures(mut self, fixtures: FixtureSet<S>) -> Self {
        self.fixtures = fixtures;
        self
    }

    pub fn animation(mut self, state: S, animation: AnimationDef) -> Self {
        self.animations.insert(state, animation);
        self
    }
}

pub trait BossScript: Send + Sync + 'static {
    type State: StateId;
    type Vars: Default + Send + Sync + 'static;

    fn kind(&self) -> BossKind;

    fn max_health(&self) -> i32 {
        30
    }

    fn body_size(&self) -> Vec2;

    fn damage_duration(&self) -> f32 {
        DEFAULT_DAMAGE_DURATION
    }

    fn blueprint(&self) -> Result<BossBlueprint<Self::State, Self::Vars>, ConfigError>;

    /// Reads spawn parameters into the context. Runs after a full reset.
    fn on_spawn(&self, ctx: &mut BossCtx<Self::State, Self::Vars>, params: &SpawnParams) -> Result<(), SpawnError>;

    /// Polled once per update until it returns true.
    fn is_ready(&self, ctx: &mut BossCtx<Self::State, Self::Vars>, dt: f32) -> bool;

    fn on_ready(&self, _ctx: &mut BossCtx<Self::State, Self::Vars>) {}

    /// Advances timers before transitions are evaluated.
    fn tick_timers(&self, state: Self::State, ctx: &mut BossCtx<Self::State, Self::Vars>, dt: f32) {
        ctx.tick_timer(state, dt);
    }

    /// Per-state behavior after the machine settled for this tick.
    fn act(&self, state: Self::State, ctx: &mut BossCtx<Self::State, Self::Vars>, dt: f32);

    fn animation_key(&self, state: Self::State, _ctx: &BossCtx<Self::State, Self::Vars>) -> &'static str {
        state.name()
    }

    /// Extra vetoes on top of the lifecycle and damage table checks.
    fn can_be_damaged_by(
        &self,
        _state: Self::State,
        _ctx: &BossCtx<Self::State, Self::Vars>,
        _attacker: &Attacker,
    ) -> bool {
        true
    }

    fn on_damaged(
        &self,
        _state: Self::State,
        _ctx: &mut BossCtx<Self::State, Self::Vars>,
        _attacker: &Attacker,
        _damage: i32,
    ) {
    }

    /// One of this boss's damagers hurt the target.
    fn on_target_damaged(&self, _ctx: &mut BossCtx<Self::State, Self::Vars>, _source: ContactSource) {}

    fn on_defeat(&self, _ctx: &mut BossCtx<Self::State, Self::Vars>) {}

    fn on_destroy(&self, _ctx: &mut BossCtx<Self::State, Self::Vars>) {}
}
