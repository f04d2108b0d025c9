//! Timber Woman: an axe-wielding lumberjack that stands, swings, pounds the
//! ground, runs at the player and jump-spins off walls.
//!
//! Every state decides in `tick_timers` whether it is done for this tick and
//! stores that in `advance`; the transition table then picks where to go,
//! first match wins. Rolls for the stand branch are drawn at the same time so
//! the predicates stay pure.

use bevy::prelude::*;
use serde::Deserialize;

use super::BossKind;
use crate::bosses::animation::AnimationDef;
use crate::bosses::blackboard::{Blackboard, BossCtx};
use crate::bosses::body::{jump_impulse, SensorSet};
use crate::bosses::children::ChildKind;
use crate::bosses::commands::ActorCommand;
use crate::bosses::error::SpawnError;
use crate::bosses::params::SpawnParams;
use crate::bosses::script::{BossBlueprint, BossScript};
use crate::combat::{
    Activation, Attacker, AttackerKind, Damage, DamageNegotiator, DamageTable, FixtureRole, FixtureSet, FixtureSpec,
    LocalShape,
};
use crate::core::{Chance, ConfigError, Element, SoundCue, StateId, StateMachine, TimeMarkedRunnable, Timer};
use crate::world::{Bounds, Facing};

/// Launch velocities of the pebbles thrown up by one ground burst.
const PEBBLE_IMPULSES: [Vec2; 7] = [
    Vec2::new(-15.0, 10.0),
    Vec2::new(-9.0, 18.0),
    Vec2::new(-3.0, 26.0),
    Vec2::new(0.0, 30.0),
    Vec2::new(3.0, 26.0),
    Vec2::new(9.0, 18.0),
    Vec2::new(15.0, 10.0),
];
const LEAF_FALL_SPEED: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimberWomanState {
    Init,
    Stand,
    StandSwing,
    StandPound,
    Wallslide,
    Run,
    JumpUp,
    JumpDown,
    JumpSpin,
    Burn,
}

impl StateId for TimberWomanState {
    const ALL: &'static [Self] = &[
        TimberWomanState::Init,
        TimberWomanState::Stand,
        TimberWomanState::StandSwing,
        TimberWomanState::StandPound,
        TimberWomanState::Wallslide,
        TimberWomanState::Run,
        TimberWomanState::JumpUp,
        TimberWomanState::JumpDown,
        TimberWomanState::JumpSpin,
        TimberWomanState::Burn,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            TimberWomanState::Init => "init",
            TimberWomanState::Stand => "stand",
            TimberWomanState::StandSwing => "stand_swing",
            TimberWomanState::StandPound => "stand_pound",
            TimberWomanState::Wallslide => "wallslide",
            TimberWomanState::Run => "run",
            TimberWomanState::JumpUp => "jump_up",
            TimberWomanState::JumpDown => "jump_down",
            TimberWomanState::JumpSpin => "jump_spin",
            TimberWomanState::Burn => "burn",
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct TimberWomanTuning {
    pub max_health: i32,
    pub init: f32,
    pub stand: f32,
    pub run: f32,
    pub wallslide: f32,
    pub swing: f32,
    pub pound: f32,
    pub jump_spin: f32,
    pub burn: f32,
    /// Sliding time after landing before horizontal motion is killed.
    pub stand_still: f32,
    pub swing_burst_at: f32,
    pub pound_bursts_at: [f32; 3],
    pub pound_chance: Chance,
    pub run_chance: Chance,
    pub jump_chance: Chance,
    pub jump_impulse: f32,
    pub max_jump_speed: f32,
    pub wall_jump_speed: f32,
    pub run_acceleration: f32,
    pub max_run_speed: f32,
    pub spin_radius: f32,
    /// Area ahead of her that makes a running Timber Woman stop and swing.
    pub swing_scanner: Vec2,
    /// Area around her watched for incoming shots while running.
    pub projectile_scanner: Vec2,
    /// Fraction of the stand timer skipped after catching fire.
    pub burn_stand_skip: f32,
}

impl Default for TimberWomanTuning {
    fn default() -> Self {
        Self {
            max_health: 30,
            init: 1.0,
            stand: 1.0,
            run: 2.0,
            wallslide: 0.75,
            swing: 1.0,
            pound: 2.0,
            jump_spin: 1.0,
            burn: 0.5,
            stand_still: 0.1,
            swing_burst_at: 0.35,
            pound_bursts_at: [0.35, 0.95, 1.55],
            pound_chance: Chance::flat(25.0),
            run_chance: Chance::flat(65.0),
            jump_chance: Chance::flat(50.0),
            jump_impulse: 16.0,
            max_jump_speed: 10.0,
            wall_jump_speed: 5.0,
            run_acceleration: 25.0,
            max_run_speed: 10.0,
            spin_radius: 2.5,
            swing_scanner: Vec2::new(6.0, 3.0),
            projectile_scanner: Vec2::new(8.0, 2.0),
            burn_stand_skip: 0.75,
        }
    }
}

#[derive(Debug)]
pub struct TimberWomanVars {
    /// Whether the current state finished this tick.
    pub advance: bool,
    pub stand_still: Timer,
    /// Stand states entered since the last jump.
    pub cycles: u32,
    /// Last state left that was not `Stand`.
    pub prev_non_stand: Option<TimberWomanState>,
    pub pound_roll: u32,
    pub run_roll: u32,
    pub jump_roll: u32,
    pub walls: Vec<Bounds>,
    pub leaf_spawn: Option<Bounds>,
}

impl Default for TimberWomanVars {
    fn default() -> Self {
        Self {
            advance: false,
            stand_still: Timer::new(0.0),
            cycles: 0,
            prev_non_stand: None,
            pound_roll: 100,
            run_roll: 100,
            jump_roll: 100,
            walls: Vec::new(),
            leaf_spawn: None,
        }
    }
}

type Ctx = BossCtx<TimberWomanState, TimberWomanVars>;
type Board = Blackboard<TimberWomanVars>;

fn advancing(ctx: &Ctx) -> bool {
    ctx.board.vars.advance
}

fn burning(ctx: &Ctx) -> bool {
    !ctx.timer_finished(TimberWomanState::Burn)
}

fn feet(ctx: &Ctx) -> bool {
    ctx.board.body.is_sensing(SensorSet::FEET_ON_GROUND)
}

fn should_wall_slide(ctx: &Ctx) -> bool {
    !feet(ctx) && ctx.board.body.is_blocked_ahead()
}

fn should_jump_spin(ctx: &Ctx, tuning: &TimberWomanTuning) -> bool {
    !feet(ctx)
        && ctx.board.target().is_some_and(|target| {
            !target.invincible && target.bounds.overlaps_circle(ctx.board.body.center, tuning.spin_radius)
        })
}

fn should_jump(ctx: &Ctx, tuning: &TimberWomanTuning) -> bool {
    match ctx.board.vars.cycles {
        0..=1 => false,
        2 => tuning.jump_chance.passes(ctx.board.vars.jump_roll, ctx.board.health_ratio()),
        _ => true,
    }
}

fn target_in_swing_range(ctx: &Ctx, tuning: &TimberWomanTuning) -> bool {
    let scanner = Bounds::from_center(ctx.board.body.center, tuning.swing_scanner);
    ctx.board.target().is_some_and(|target| target.bounds.overlaps(&scanner))
}

/// Shots near her, split into ones her axe can bat away and everything else.
fn incoming_shots(ctx: &Ctx, tuning: &TimberWomanTuning) -> (bool, bool) {
    let scanner = Bounds::from_center(ctx.board.body.center, tuning.projectile_scanner);
    ctx.board
        .projectiles_in(&scanner)
        .fold((false, false), |(deflectable, other), shot| match shot.attacker.kind {
            AttackerKind::Bullet | AttackerKind::ChargedShot => (true, other),
            _ => (deflectable, true),
        })
}

fn should_swing_from_run(ctx: &Ctx, tuning: &TimberWomanTuning) -> bool {
    let (deflectable, other) = incoming_shots(ctx, tuning);
    target_in_swing_range(ctx, tuning) || (deflectable && !other)
}

/// Anything she cannot swat makes her jump over it.
fn should_jump_shots(ctx: &Ctx, tuning: &TimberWomanTuning) -> bool {
    incoming_shots(ctx, tuning).1
}

fn may_run(ctx: &Ctx, tuning: &TimberWomanTuning) -> bool {
    let board = &ctx.board;
    let target_above = board.target().is_some_and(|target| target.bounds.bottom() > board.body.top());
    board.vars.prev_non_stand != Some(TimberWomanState::Run)
        && !board.body.is_blocked_ahead()
        && !target_above
        && tuning.run_chance.passes(board.vars.run_roll, board.health_ratio())
}

fn should_stop_running(ctx: &Ctx, tuning: &TimberWomanTuning) -> bool {
    let bounds = ctx.board.body.bounds();
    should_swing_from_run(ctx, tuning)
        || should_jump_shots(ctx, tuning)
        || ctx.board.target_center().is_some_and(|center| bounds.contains(center))
        || ctx.board.body.is_blocked_ahead()
}

/// Pebbles, falling leaves, a stun and a room shake.
fn ground_burst(board: &mut Board, swing: bool) {
    let facing = board.body.facing;
    let mut origin = board.body.bounds().bottom_center() + Vec2::new(0.0, 0.35);
    if swing {
        origin.x += 2.0 * facing.sign();
    }
    for impulse in PEBBLE_IMPULSES {
        let params = SpawnParams::new()
            .with("position", origin)
            .with("velocity", impulse)
            .with("gravity", true);
        board.spawn_child(ChildKind::GroundPebble, params);
    }

    if let Some(area) = board.vars.leaf_spawn {
        let first = area.random_point(&mut board.rng);
        let mut second = first + Vec2::new(1.5, 0.0);
        if board.vars.walls.iter().any(|wall| wall.contains(second)) {
            second = first - Vec2::new(3.0, 0.0);
        }
        for position in [first, second] {
            let params = SpawnParams::new()
                .with("position", position)
                .with("velocity", Vec2::new(0.0, -LEAF_FALL_SPEED));
            board.spawn_child(ChildKind::DeadlyLeaf, params);
        }
    }

    board.emit(ActorCommand::StunTarget);
    board.emit(ActorCommand::ShakeRoom {
        duration: 0.5,
        interval: 0.1,
        intensity: Vec2::new(0.001, 0.005),
    });
    board.play_sound(SoundCue::Quake);
}

#[derive(Debug, Clone, Default)]
pub struct TimberWoman {
    tuning: TimberWomanTuning,
}

impl TimberWoman {
    pub fn new(tuning: TimberWomanTuning) -> Self {
        Self { tuning }
    }

    fn body_shape() -> LocalShape {
        LocalShape::centered(Vec2::new(1.5, 1.75))
    }

    fn fixtures() -> FixtureSet<TimberWomanState> {
        use TimberWomanState::*;
        FixtureSet::new()
            .with(FixtureSpec::new("body", FixtureRole::Body, Self::body_shape(), Activation::Always))
            .with(FixtureSpec::new("hurt", FixtureRole::Damageable, Self::body_shape(), Activation::Always))
            .with(FixtureSpec::new("contact", FixtureRole::Damager, Self::body_shape(), Activation::Always))
            .with(FixtureSpec::new(
                "axe_tall",
                FixtureRole::Damager,
                LocalShape::at(Vec2::new(1.375, 0.0), Vec2::new(1.25, 2.0)),
                Activation::Frames {
                    state: StandSwing,
                    frames: 2..=2,
                },
            ))
            .with(FixtureSpec::new(
                "axe_low",
                FixtureRole::Damager,
                LocalShape::at(Vec2::new(1.625, -0.625), Vec2::new(1.75, 0.5)),
                Activation::Frames {
                    state: StandSwing,
                    frames: 3..=5,
                },
            ))
            .with(FixtureSpec::new(
                "axe_guard",
                FixtureRole::Shield,
                LocalShape::at(Vec2::new(1.6875, 0.0), Vec2::new(0.625, 2.0)),
                Activation::Frames {
                    state: StandSwing,
                    frames: 2..=2,
                },
            ))
            .with(FixtureSpec::new(
                "spin",
                FixtureRole::Damager,
                LocalShape::square(3.0),
                Activation::InStates(vec![JumpSpin]),
            ))
            .with(FixtureSpec::new(
                "spin_guard",
                FixtureRole::Shield,
                LocalShape::square(3.0),
                Activation::InStates(vec![JumpSpin]),
            ))
    }

    fn machine(&self) -> Result<StateMachine<TimberWomanState, Ctx>, ConfigError> {
        use TimberWomanState::*;
        let t = self.tuning;
        let to_burn = |ctx: &Ctx| advancing(ctx) && burning(ctx);

        StateMachine::builder()
            .states(TimberWomanState::ALL.iter().copied())
            .initial_state(Init)
            .transition(Init, Stand, advancing)
            // stand
            .transition(Stand, Burn, to_burn)
            .transition(Stand, JumpUp, move |ctx: &Ctx| advancing(ctx) && should_jump(ctx, &t))
            .transition(Stand, StandPound, move |ctx: &Ctx| {
                advancing(ctx) && t.pound_chance.passes(ctx.board.vars.pound_roll, ctx.board.health_ratio())
            })
            .transition(Stand, Run, move |ctx: &Ctx| advancing(ctx) && may_run(ctx, &t))
            .transition(Stand, StandSwing, advancing)
            // run
            .transition(Run, Burn, to_burn)
            .transition(Run, StandSwing, move |ctx: &Ctx| advancing(ctx) && should_swing_from_run(ctx, &t))
            .transition(Run, JumpUp, move |ctx: &Ctx| advancing(ctx) && should_jump_shots(ctx, &t))
            .transition(Run, Stand, advancing)
            // attacks
            .transition(StandSwing, Burn, to_burn)
            .transition(StandSwing, Stand, advancing)
            .transition(StandPound, Burn, to_burn)
            .transition(StandPound, Stand, advancing)
            // airborne
            .transition(JumpUp, Burn, to_burn)
            .transition(JumpUp, Wallslide, |ctx: &Ctx| advancing(ctx) && should_wall_slide(ctx))
            .transition(JumpUp, JumpSpin, move |ctx: &Ctx| advancing(ctx) && should_jump_spin(ctx, &t))
            .transition(JumpUp, JumpDown, advancing)
            .transition(JumpDown, Burn, to_burn)
            .transition(JumpDown, Wallslide, |ctx: &Ctx| advancing(ctx) && should_wall_slide(ctx))
            .transition(JumpDown, JumpSpin, move |ctx: &Ctx| advancing(ctx) && should_jump_spin(ctx, &t))
            .transition(JumpDown, Stand, advancing)
            .transition(Wallslide, Burn, to_burn)
            .transition(Wallslide, JumpUp, |ctx: &Ctx| advancing(ctx) && !feet(ctx))
            .transition(Wallslide, Stand, advancing)
            .transition(JumpSpin, Burn, to_burn)
            .transition(JumpSpin, JumpUp, |ctx: &Ctx| {
                advancing(ctx) && !feet(ctx) && ctx.board.body.velocity.y > 0.0
            })
            .transition(JumpSpin, JumpDown, |ctx: &Ctx| advancing(ctx) && !feet(ctx))
            .transition(JumpSpin, Stand, advancing)
            .transition(Burn, Stand, advancing)
            .on_change_state(move |current, previous, ctx: &mut Ctx| {
                if current != Burn && previous != Burn {
                    ctx.reset_timer(current);
                }
                if previous == Burn {
                    ctx.board.restart_damage_cooldown();
                }
                on_enter(current, previous, ctx, &t);
                debug!("Timber Woman {} -> {}", previous.name(), current.name());
            })
            .build()
    }
}

fn on_enter(current: TimberWomanState, previous: TimberWomanState, ctx: &mut Ctx, tuning: &TimberWomanTuning) {
    use TimberWomanState::*;
    let board = &mut ctx.board;
    if matches!(current, Init | Stand | StandSwing) {
        board.vars.stand_still.reset();
    }
    if previous != Stand {
        board.vars.prev_non_stand = Some(previous);
    }

    match current {
        Stand => board.vars.cycles += 1,
        StandSwing => {
            let body = &mut board.body;
            let reach = match body.facing {
                Facing::Left => Vec2::new(body.left() - 1.75, body.center.y),
                Facing::Right => Vec2::new(body.right() + 1.75, body.center.y),
            };
            if board.vars.walls.iter().any(|wall| wall.contains(reach)) {
                body.facing = body.facing.opposite();
            }
        }
        JumpUp => {
            let gravity = board.world.gravity;
            let target = board.target_center();
            let body = &mut board.body;
            let vx = if previous == Wallslide {
                if body.is_sensing(SensorSet::SIDE_TOUCHING_BLOCK_RIGHT) {
                    -tuning.wall_jump_speed
                } else {
                    tuning.wall_jump_speed
                }
            } else {
                target.map_or(0.0, |target| {
                    jump_impulse(body.center, target, tuning.jump_impulse, gravity).x
                })
            };
            body.velocity = Vec2::new(
                vx.clamp(-tuning.max_jump_speed, tuning.max_jump_speed),
                tuning.jump_impulse,
            );
            board.vars.cycles = 0;
        }
        JumpSpin => board.play_sound(SoundCue::Brush),
        _ => {}
    }
}

fn face_target(board: &mut Board) {
    if let Some(target) = board.target_center() {
        board.body.facing = Facing::toward(board.body.center.x, target.x);
    }
}

impl BossScript for TimberWoman {
    type State = TimberWomanState;
    type Vars = TimberWomanVars;

    fn kind(&self) -> BossKind {
        BossKind::TimberWoman
    }

    fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    fn body_size(&self) -> Vec2 {
        Vec2::new(1.5, 1.75)
    }

    fn blueprint(&self) -> Result<BossBlueprint<TimberWomanState, TimberWomanVars>, ConfigError> {
        use TimberWomanState::*;
        let t = self.tuning;

        let mut swing = Timer::new(t.swing);
        swing.add_runnable(TimeMarkedRunnable::new(t.swing_burst_at, |board: &mut Board| {
            ground_burst(board, true)
        }));
        let pound = Timer::with_runnables(
            t.pound,
            t.pound_bursts_at
                .map(|at| TimeMarkedRunnable::new(at, |board: &mut Board| ground_burst(board, false))),
        );

        let damage = DamageNegotiator::new(DamageTable::standard_boss())
            .with_override(AttackerKind::Fireball, Damage::Fixed(4))
            .with_override(AttackerKind::MagmaWave, Damage::Fixed(4))
            .with_override(AttackerKind::MagmaFlame, Damage::Fixed(4));

        Ok(BossBlueprint::new(self.machine()?, damage)
            .timer(Init, Timer::new(t.init))
            .timer(Stand, Timer::new(t.stand))
            .timer(StandSwing, swing)
            .timer(StandPound, pound)
            .timer(Run, Timer::new(t.run))
            .timer(Wallslide, Timer::new(t.wallslide))
            .timer(JumpSpin, Timer::new(t.jump_spin))
            .timer(Burn, Timer::new(t.burn))
            .fixtures(Self::fixtures())
            .animation(Init, AnimationDef::uniform(7, 1, 0.1, true))
            .animation(Stand, AnimationDef::uniform(7, 1, 0.1, true))
            .animation(
                StandSwing,
                AnimationDef::timed(2, 4, vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.25, 0.1, 0.1], false),
            )
            .animation(StandPound, AnimationDef::uniform(3, 2, 0.1, true))
            .animation(JumpSpin, AnimationDef::uniform(4, 2, 0.025, true))
            .animation(JumpUp, AnimationDef::uniform(2, 1, 0.1, true))
            .animation(JumpDown, AnimationDef::uniform(2, 1, 0.1, true))
            .animation(Run, AnimationDef::uniform(2, 2, 0.1, true))
            .animation(Wallslide, AnimationDef::still())
            .animation(Burn, AnimationDef::uniform(3, 1, 0.05, true)))
    }

    fn on_spawn(&self, ctx: &mut Ctx, params: &SpawnParams) -> Result<(), SpawnError> {
        let bounds = params.require_rect("bounds")?;

        let board = &mut ctx.board;
        board.body.set_bottom_center(bounds.bottom_center());
        board.body.gravity_on = true;
        board.vars.walls = params.rects_with_prefix("wall");
        board.vars.leaf_spawn = params.rect("leaf_spawn");
        board.vars.stand_still.reset_duration(self.tuning.stand_still);
        if let Some(timer) = ctx.timer_mut(TimberWomanState::Burn) {
            timer.set_to_end();
        }
        Ok(())
    }

    fn is_ready(&self, ctx: &mut Ctx, dt: f32) -> bool {
        if feet(ctx) {
            ctx.tick_timer(TimberWomanState::Init, dt);
        }
        ctx.timer_finished(TimberWomanState::Init)
    }

    fn tick_timers(&self, state: TimberWomanState, ctx: &mut Ctx, dt: f32) {
        use TimberWomanState::*;
        let t = &self.tuning;

        let advance = if state != Burn && burning(ctx) {
            true
        } else {
            match state {
                Init | Stand | StandSwing => {
                    if feet(ctx) {
                        let board = &mut ctx.board;
                        board.vars.stand_still.tick(dt);
                        if board.vars.stand_still.is_just_finished() {
                            board.body.velocity.x = 0.0;
                        }
                        ctx.tick_timer(state, dt);
                        ctx.timer_finished(state)
                    } else {
                        false
                    }
                }
                StandPound => {
                    ctx.tick_timer(state, dt);
                    feet(ctx) && ctx.timer_finished(state)
                }
                Run => {
                    ctx.tick_timer(state, dt);
                    should_stop_running(ctx, t) || (feet(ctx) && ctx.timer_finished(state))
                }
                Wallslide => {
                    ctx.tick_timer(state, dt);
                    let body = &ctx.board.body;
                    let on_wall = body.is_touching_side_block();
                    !on_wall || feet(ctx) || ctx.timer_finished(state)
                }
                JumpSpin => {
                    ctx.tick_timer(state, dt);
                    feet(ctx) || should_wall_slide(ctx) || ctx.timer_finished(state)
                }
                JumpUp => {
                    should_jump_spin(ctx, t)
                        || ctx.board.body.velocity.y <= 0.0
                        || feet(ctx)
                        || should_wall_slide(ctx)
                }
                JumpDown => should_jump_spin(ctx, t) || feet(ctx) || should_wall_slide(ctx),
                Burn => {
                    ctx.tick_timer(state, dt);
                    ctx.timer_finished(state)
                }
            }
        };

        let board = &mut ctx.board;
        if advance && state == Stand {
            board.vars.pound_roll = board.roll();
            board.vars.run_roll = board.roll();
            board.vars.jump_roll = board.roll();
        }
        board.vars.advance = advance;
    }

    fn act(&self, state: TimberWomanState, ctx: &mut Ctx, dt: f32) {
        use TimberWomanState::*;
        let t = &self.tuning;
        let board = &mut ctx.board;

        match state {
            Init | Stand | JumpUp | JumpDown => face_target(board),
            Run => {
                face_target(board);
                let body = &mut board.body;
                let sign = body.facing.sign();
                if body.velocity.x * sign < 0.0 {
                    body.velocity.x = 0.0;
                }
                if body.velocity.x.abs() < t.max_run_speed {
                    body.velocity.x += t.run_acceleration * sign * dt;
                }
                body.velocity.x = body.velocity.x.clamp(-t.max_run_speed, t.max_run_speed);
            }
            _ => {}
        }

        let body = &mut board.body;
        if state == Burn {
            body.stop();
            body.gravity_on = false;
        } else {
            body.gravity_on = true;
        }
        if body.is_sensing(SensorSet::HEAD_TOUCHING_BLOCK) && body.velocity.y > 0.0 {
            body.velocity.y = 0.0;
        }
    }

    fn can_be_damaged_by(&self, _state: TimberWomanState, ctx: &Ctx, _attacker: &Attacker) -> bool {
        !burning(ctx)
    }

    fn on_damaged(&self, _state: TimberWomanState, ctx: &mut Ctx, attacker: &Attacker, _damage: i32) {
        if attacker.element != Element::Fire {
            return;
        }
        ctx.reset_timer(TimberWomanState::Stand);
        ctx.tick_timer(TimberWomanState::Stand, self.tuning.burn_stand_skip * self.tuning.stand);
        ctx.reset_timer(TimberWomanState::Burn);
        ctx.board.play_sound(SoundCue::AtomicFire);
    }

    fn on_defeat(&self, ctx: &mut Ctx) {
        ctx.board.body.gravity_on = false;
    }
}
