//! Shared state a boss's predicates, hooks and timer marks all work on.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::body::Body;
use super::children::{ChildActor, ChildKind, ChildRegistry};
use super::commands::{ActorCommand, Outbox};
use super::params::SpawnParams;
use crate::combat::{ActorId, Attacker, ChildHandle};
use crate::core::{EffectKind, Loop, PerState, SoundCue, StateId, Timer};
use crate::world::Bounds;

/// Read-only health view. The combat layer owns the real value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthGauge {
    pub current: i32,
    pub max: i32,
}

impl Default for HealthGauge {
    fn default() -> Self {
        Self::full(30)
    }
}

impl HealthGauge {
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn ratio(&self) -> f32 {
        if self.max <= 0 {
            0.0
        } else {
            (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

/// What a boss knows about the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub bounds: Bounds,
    pub grounded: bool,
    pub invincible: bool,
}

/// A shot in flight near the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileView {
    pub attacker: Attacker,
    pub bounds: Bounds,
}

/// Snapshot of the outside world taken before the tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldView {
    pub target: Option<TargetView>,
    pub projectiles: Vec<ProjectileView>,
    /// Downward acceleration applied to ballistic children.
    pub gravity: f32,
}

/// Everything a boss reads and writes besides its timers.
#[derive(Debug)]
pub struct Blackboard<B> {
    pub id: ActorId,
    pub body: Body,
    pub vars: B,
    pub children: ChildRegistry,
    pub health: HealthGauge,
    pub world: WorldView,
    /// Arena the boss fights in, taken from the `room` spawn parameter.
    pub room: Option<Bounds>,
    pub rng: StdRng,
    /// Seconds spent in the current state.
    pub state_time: f32,
    /// Invulnerability window opened by every hit that lands.
    pub damage_cooldown: Timer,
    outbox: Outbox,
}

impl<B: Default> Blackboard<B> {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            body: Body::default(),
            vars: B::default(),
            children: ChildRegistry::new(id, 32),
            health: HealthGauge::default(),
            world: WorldView::default(),
            room: None,
            rng: StdRng::seed_from_u64(id.0),
            state_time: 0.0,
            damage_cooldown: Timer::new(0.0),
            outbox: Outbox::default(),
        }
    }
}

impl<B> Blackboard<B> {
    pub fn health_ratio(&self) -> f32 {
        self.health.ratio()
    }

    pub fn target(&self) -> Option<&TargetView> {
        self.world.target.as_ref()
    }

    pub fn target_center(&self) -> Option<Vec2> {
        self.world.target.map(|target| target.bounds.center())
    }

    /// Projectiles overlapping `area`, leaving out the boss's own.
    pub fn projectiles_in<'a>(&'a self, area: &'a Bounds) -> impl Iterator<Item = &'a ProjectileView> {
        self.world
            .projectiles
            .iter()
            .filter(move |shot| !shot.attacker.is_owned_by(self.id) && shot.bounds.overlaps(area))
    }

    pub fn is_invulnerable(&self) -> bool {
        !self.damage_cooldown.is_finished()
    }

    /// Opens the invulnerability window again from the start.
    pub fn restart_damage_cooldown(&mut self) {
        self.damage_cooldown.reset();
    }

    /// Uniform roll in `0..=100`, as chances are expressed in percent.
    pub fn roll(&mut self) -> u32 {
        self.rng.gen_range(0..=100)
    }

    pub fn emit(&mut self, command: ActorCommand) {
        self.outbox.push(command);
    }

    pub fn play_sound(&mut self, cue: SoundCue) {
        self.emit(ActorCommand::PlaySound(cue));
    }

    pub fn effect(&mut self, effect: EffectKind, position: Vec2, velocity: Vec2) {
        self.emit(ActorCommand::Effect {
            effect,
            position,
            velocity,
        });
    }

    /// Spawns a child, logging and returning `None` when that fails.
    pub fn spawn_child(&mut self, kind: ChildKind, params: SpawnParams) -> Option<ChildHandle> {
        match self.children.spawn(kind, params) {
            Ok(handle) => {
                self.emit(ActorCommand::SpawnChild { handle, kind });
                Some(handle)
            }
            Err(err) => {
                warn!("Actor {:?} could not spawn {:?}: {}", self.id, kind, err);
                None
            }
        }
    }

    pub fn release_child(&mut self, handle: ChildHandle) -> bool {
        match self.children.remove(handle) {
            Some(child) => {
                self.release(child);
                true
            }
            None => false,
        }
    }

    /// Releases dead children and any that left the room.
    pub fn prune_children(&mut self) -> usize {
        let room = self.room;
        let removed = self.children.remove_where(|child| {
            child.is_dead() || room.is_some_and(|room| !child.bounds().overlaps(&room))
        });
        let count = removed.len();
        removed.into_iter().for_each(|child| self.release(child));
        count
    }

    pub fn release_all_children(&mut self) -> usize {
        let removed = self.children.drain();
        let count = removed.len();
        removed.into_iter().for_each(|child| self.release(child));
        count
    }

    fn release(&mut self, child: ChildActor) {
        self.emit(ActorCommand::ReleaseChild(Box::new(child)));
    }

    pub fn drain_commands(&mut self) -> Vec<ActorCommand> {
        self.outbox.drain()
    }
}

/// Context handed to predicates and change hooks.
pub struct BossCtx<S: StateId, B> {
    pub board: Blackboard<B>,
    pub timers: PerState<S, Timer<Blackboard<B>>>,
    pub phases: Option<Loop<S>>,
}

impl<S: StateId, B> BossCtx<S, B> {
    pub fn timer(&self, state: S) -> Option<&Timer<Blackboard<B>>> {
        self.timers.get(state)
    }

    pub fn timer_mut(&mut self, state: S) -> Option<&mut Timer<Blackboard<B>>> {
        self.timers.get_mut(state)
    }

    /// Asking about a state without a timer is a setup mistake.
    pub fn timer_finished(&self, state: S) -> bool {
        match self.timers.get(state) {
            Some(timer) => timer.is_finished(),
            None => {
                debug_assert!(false, "no timer for state {}", state.name());
                false
            }
        }
    }

    /// Ticks the timer of `state`, running its marks against the blackboard.
    pub fn tick_timer(&mut self, state: S, dt: f32) {
        if let Some(timer) = self.timers.get_mut(state) {
            timer.update(dt, &mut self.board);
        }
    }

    pub fn reset_timer(&mut self, state: S) {
        if let Some(timer) = self.timers.get_mut(state) {
            timer.reset();
            timer.rearm();
        }
    }

    /// Phase the sequencer currently points at, if the boss uses one.
    pub fn phase(&self) -> Option<S> {
        self.phases.as_ref().map(|phases| *phases.current())
    }

    pub fn advance_phase(&mut self) -> Option<S> {
        self.phases.as_mut().map(|phases| *phases.next())
    }
}
