//! Inferno Man: a fire robot that hops around the arena shooting magma goop,
//! slides down walls, sends magma waves along the floor and, every third
//! stand, lights his head to call a rain of meteors.
//!
//! Shooting runs beside the state machine. Entering `Stand` or `Jump` picks a
//! shot and restarts the shoot timer; its marks queue cues that are turned
//! into projectiles once the timer has been ticked. A grounded state only
//! finishes once the current shot and its cooldown are over.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use super::BossKind;
use crate::bosses::animation::AnimationDef;
use crate::bosses::blackboard::{Blackboard, BossCtx};
use crate::bosses::body::{jump_impulse, SensorSet};
use crate::bosses::children::ChildKind;
use crate::bosses::error::SpawnError;
use crate::bosses::params::SpawnParams;
use crate::bosses::script::{BossBlueprint, BossScript};
use crate::combat::{
    Activation, AttackerKind, Damage, DamageNegotiator, DamageTable, FixtureRole, FixtureSet, FixtureSpec,
    LocalShape,
};
use crate::core::{Chance, ConfigError, SoundCue, StateId, StateMachine, TimeMarkedRunnable, Timer};
use crate::world::{Bounds, Facing};

const BODY_SIZE: Vec2 = Vec2::new(1.15, 1.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfernoManState {
    Init,
    Stand,
    Jump,
    WallSlide,
    FlameHead,
}

impl StateId for InfernoManState {
    const ALL: &'static [Self] = &[
        InfernoManState::Init,
        InfernoManState::Stand,
        InfernoManState::Jump,
        InfernoManState::WallSlide,
        InfernoManState::FlameHead,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            InfernoManState::Init => "init",
            InfernoManState::Stand => "stand",
            InfernoManState::Jump => "jump",
            InfernoManState::WallSlide => "wall_slide",
            InfernoManState::FlameHead => "flame_head",
        }
    }
}

/// Which way the next shot goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShootMethod {
    #[default]
    Straight,
    Up,
    Down,
    /// A long wind-up that ends in a magma wave instead of goop.
    Mega,
}

/// Mark crossed on the shoot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotCue {
    Open,
    Wave,
}

/// A meteor that drops once its delay runs out.
#[derive(Debug)]
pub struct PendingMeteor {
    pub delay: Timer,
    /// Falls on the player instead of a random spot.
    pub targeted: bool,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct InfernoManTuning {
    pub max_health: i32,
    pub init: f32,
    pub stand: f32,
    pub wall_slide: f32,
    pub shoot: f32,
    pub shoot_cooldown: f32,
    /// Wait between taking off and the first airborne shot.
    pub shoot_delay: f32,
    pub mega_shoot: f32,
    pub mega_wave_at: f32,
    pub flame_head: f32,
    pub flame_head_shots: usize,
    pub flame_head_first_shot: f32,
    /// Chance a level target gets goop rather than a mega shot.
    pub straight_chance: Chance,
    /// Chance of a mega shot when the target is not level.
    pub mega_chance: Chance,
    /// Height difference under which the target counts as level.
    pub straight_threshold: f32,
    pub jump_impulse: f32,
    pub max_jump_speed: f32,
    pub max_wall_slide_speed: f32,
    pub goop_speed: f32,
    pub wave_speed: f32,
    pub orb_speed: f32,
    pub meteor_speed: f32,
    pub meteor_delay: f32,
}

impl Default for InfernoManTuning {
    fn default() -> Self {
        Self {
            max_health: 30,
            init: 1.5,
            stand: 1.5,
            wall_slide: 0.75,
            shoot: 0.25,
            shoot_cooldown: 0.5,
            shoot_delay: 0.25,
            mega_shoot: 1.0,
            mega_wave_at: 0.5,
            flame_head: 3.0,
            flame_head_shots: 4,
            flame_head_first_shot: 0.2,
            straight_chance: Chance::flat(75.0),
            mega_chance: Chance::flat(25.0),
            straight_threshold: 1.0,
            jump_impulse: 16.0,
            max_jump_speed: 10.0,
            max_wall_slide_speed: 3.0,
            goop_speed: 10.0,
            wave_speed: 12.0,
            orb_speed: 15.0,
            meteor_speed: 10.0,
            meteor_delay: 1.0,
        }
    }
}

fn finished<C>(duration: f32) -> Timer<C> {
    let mut timer = Timer::new(duration);
    timer.set_to_end();
    timer
}

#[derive(Debug)]
pub struct InfernoManVars {
    /// Whether the current state finished this tick.
    pub advance: bool,
    /// Stand states entered so far.
    pub stands: u32,
    pub method: ShootMethod,
    pub shoot: Timer<Vec<ShotCue>>,
    cues: Vec<ShotCue>,
    pub shoot_cooldown: Timer,
    pub shoot_delay: Timer,
    pub meteors: Vec<PendingMeteor>,
    /// Which orb of the current flame head calls the aimed meteor.
    pub targeted_orb: usize,
    pub meteor_spawner: Option<Bounds>,
    /// Block the meteors break on.
    pub meteor_floor: Option<Bounds>,
}

impl Default for InfernoManVars {
    fn default() -> Self {
        Self {
            advance: false,
            stands: 0,
            method: ShootMethod::default(),
            shoot: finished(0.0),
            cues: Vec::new(),
            shoot_cooldown: finished(0.0),
            shoot_delay: finished(0.0),
            meteors: Vec::new(),
            targeted_orb: 0,
            meteor_spawner: None,
            meteor_floor: None,
        }
    }
}

impl InfernoManVars {
    pub fn is_shooting(&self) -> bool {
        !self.shoot.is_finished()
    }

    fn guns_idle(&self) -> bool {
        self.shoot.is_finished() && self.shoot_cooldown.is_finished()
    }
}

type Ctx = BossCtx<InfernoManState, InfernoManVars>;
type Board = Blackboard<InfernoManVars>;

fn advancing(ctx: &Ctx) -> bool {
    ctx.board.vars.advance
}

fn feet(ctx: &Ctx) -> bool {
    ctx.board.body.is_sensing(SensorSet::FEET_ON_GROUND)
}

fn should_go_to_stand(ctx: &Ctx) -> bool {
    ctx.board.body.velocity.y <= 0.0 && feet(ctx)
}

fn is_wall_sliding(ctx: &Ctx) -> bool {
    let body = &ctx.board.body;
    let left = body.velocity.x <= 0.0 && body.is_sensing(SensorSet::SIDE_TOUCHING_BLOCK_LEFT);
    let right = body.velocity.x >= 0.0 && body.is_sensing(SensorSet::SIDE_TOUCHING_BLOCK_RIGHT);
    body.velocity.y <= 0.0 && !feet(ctx) && (left || right)
}

fn is_target_level(board: &Board, tuning: &InfernoManTuning) -> bool {
    board
        .target()
        .is_some_and(|target| (target.bounds.bottom() - board.body.bottom()).abs() <= tuning.straight_threshold)
}

/// Picks a shot for `state`. A shot already in progress never turns into a
/// mega shot when the target is level.
fn choose_method(board: &mut Board, state: InfernoManState, tuning: &InfernoManTuning) -> ShootMethod {
    match state {
        InfernoManState::Stand => {
            let roll = board.roll();
            let health = board.health_ratio();
            if is_target_level(board, tuning) {
                if board.vars.is_shooting() || tuning.straight_chance.passes(roll, health) {
                    ShootMethod::Straight
                } else {
                    ShootMethod::Mega
                }
            } else if tuning.mega_chance.passes(roll, health) {
                ShootMethod::Mega
            } else {
                ShootMethod::Up
            }
        }
        _ => {
            let below = board
                .target()
                .is_some_and(|target| target.bounds.top() < board.body.bottom());
            if below {
                ShootMethod::Down
            } else if is_target_level(board, tuning) {
                ShootMethod::Straight
            } else {
                ShootMethod::Up
            }
        }
    }
}

/// Restarts the shoot timer for a freshly entered `state`.
fn load_shot(board: &mut Board, state: InfernoManState, tuning: &InfernoManTuning) {
    let method = choose_method(board, state, tuning);
    let vars = &mut board.vars;
    vars.method = method;
    if method == ShootMethod::Mega {
        vars.shoot.reset_duration(tuning.mega_shoot);
    } else {
        vars.shoot.reset_duration(tuning.shoot);
        if state == InfernoManState::Jump {
            vars.shoot_delay.reset();
        }
    }
    vars.shoot.reset();
}

fn shoot_goop(board: &mut Board, state: InfernoManState, tuning: &InfernoManTuning) {
    let method = choose_method(board, state, tuning);
    board.vars.method = method;

    let sign = board.body.facing.sign();
    let (offset, direction) = match method {
        ShootMethod::Up => (Vec2::new(0.65, 0.4), Vec2::new(sign, 1.0).normalize()),
        ShootMethod::Down => (Vec2::new(0.85, -0.2), Vec2::new(sign, -1.0).normalize()),
        ShootMethod::Straight | ShootMethod::Mega => (Vec2::new(0.75, 0.2), Vec2::new(sign, 0.0)),
    };
    let params = SpawnParams::new()
        .with("position", board.body.center + Vec2::new(offset.x * sign, offset.y))
        .with("velocity", direction * tuning.goop_speed)
        .with("facing", board.body.facing);
    board.spawn_child(ChildKind::MagmaGoop, params);
    board.play_sound(SoundCue::Blast);
}

fn shoot_wave(board: &mut Board, tuning: &InfernoManTuning) {
    let sign = board.body.facing.sign();
    let lift = ChildKind::MagmaWave.size().y / 2.0;
    let params = SpawnParams::new()
        .with("position", board.body.bounds().bottom_center() + Vec2::new(0.75 * sign, lift))
        .with("velocity", Vec2::new(tuning.wave_speed * sign, 0.0))
        .with("facing", board.body.facing);
    board.spawn_child(ChildKind::MagmaWave, params);
    board.play_sound(SoundCue::AtomicFire);
}

/// Fires an orb straight up and books the meteor it brings down.
fn launch_orb(board: &mut Board, targeted: bool, tuning: &InfernoManTuning) {
    board.vars.meteors.push(PendingMeteor {
        delay: Timer::new(tuning.meteor_delay),
        targeted,
    });
    let sign = board.body.facing.sign();
    let position = Vec2::new(board.body.center.x + 0.1 * sign, board.body.top() + 0.1);
    let params = SpawnParams::new()
        .with("position", position)
        .with("velocity", Vec2::new(0.0, tuning.orb_speed));
    board.spawn_child(ChildKind::MagmaOrb, params);
    board.play_sound(SoundCue::ChillShoot);
}

fn drop_meteor(board: &mut Board, targeted: bool, tuning: &InfernoManTuning) {
    let Some(spawner) = board.vars.meteor_spawner else {
        debug!("Inferno Man has no meteor spawner");
        return;
    };
    let x = match board.target_center() {
        Some(target) if targeted => target.x,
        _ => board.rng.gen_range(spawner.left()..=spawner.right()),
    };
    let x = x.clamp(spawner.left(), spawner.right());
    let params = SpawnParams::new()
        .with("position", Vec2::new(x, spawner.bottom()))
        .with("velocity", Vec2::new(0.0, -tuning.meteor_speed));
    board.spawn_child(ChildKind::MagmaMeteor, params);
}

/// Meteors break on the floor block, or on the room floor without one.
fn land_meteors(board: &mut Board) {
    let floor = board
        .vars
        .meteor_floor
        .map(|block| block.top())
        .or_else(|| board.room.map(|room| room.bottom()));
    let Some(floor) = floor else {
        return;
    };
    for child in board.children.iter_mut() {
        if child.kind == ChildKind::MagmaMeteor && child.bounds().bottom() <= floor {
            child.kill();
        }
    }
}

fn update_facing(board: &mut Board) {
    let Some(target) = board.target().map(|target| target.bounds) else {
        return;
    };
    if target.right() < board.body.left() {
        board.body.facing = Facing::Left;
    } else if target.left() > board.body.right() {
        board.body.facing = Facing::Right;
    }
}

#[derive(Debug, Clone, Default)]
pub struct InfernoMan {
    tuning: InfernoManTuning,
}

impl InfernoMan {
    pub fn new(tuning: InfernoManTuning) -> Self {
        Self { tuning }
    }

    fn fixtures() -> FixtureSet<InfernoManState> {
        let shape = LocalShape::centered(BODY_SIZE);
        FixtureSet::new()
            .with(FixtureSpec::new("body", FixtureRole::Body, shape, Activation::Always))
            .with(FixtureSpec::new("hurt", FixtureRole::Damageable, shape, Activation::Always))
            .with(FixtureSpec::new("contact", FixtureRole::Damager, shape, Activation::Always))
    }

    fn flame_head_timer(&self) -> Timer<Board> {
        let t = self.tuning;
        let shots = t.flame_head_shots.max(1);
        let spacing = t.flame_head / shots as f32;
        Timer::with_runnables(
            t.flame_head,
            (0..shots).map(move |i| {
                TimeMarkedRunnable::new(t.flame_head_first_shot + spacing * i as f32, move |board: &mut Board| {
                    let targeted = board.vars.targeted_orb == i;
                    launch_orb(board, targeted, &t);
                })
            }),
        )
    }

    fn machine(&self) -> Result<StateMachine<InfernoManState, Ctx>, ConfigError> {
        use InfernoManState::*;
        let t = self.tuning;

        StateMachine::builder()
            .states(InfernoManState::ALL.iter().copied())
            .initial_state(Init)
            .transition(Init, Stand, advancing)
            .transition(Stand, FlameHead, |ctx: &Ctx| advancing(ctx) && ctx.board.vars.stands % 3 == 0)
            .transition(Stand, Jump, advancing)
            .transition(Jump, Stand, |ctx: &Ctx| advancing(ctx) && should_go_to_stand(ctx))
            .transition(Jump, WallSlide, |ctx: &Ctx| advancing(ctx) && is_wall_sliding(ctx))
            .transition(WallSlide, Stand, |ctx: &Ctx| advancing(ctx) && should_go_to_stand(ctx))
            .transition(WallSlide, Jump, advancing)
            .transition(FlameHead, Stand, advancing)
            .on_change_state(move |current, previous, ctx: &mut Ctx| {
                if previous == Jump {
                    ctx.board.vars.shoot_delay.set_to_end();
                }
                match current {
                    Stand => {
                        ctx.board.vars.stands += 1;
                        ctx.reset_timer(Stand);
                        load_shot(&mut ctx.board, Stand, &t);
                    }
                    Jump => {
                        let board = &mut ctx.board;
                        let target = board.target_center().unwrap_or(board.body.center);
                        let impulse = jump_impulse(board.body.center, target, t.jump_impulse, board.world.gravity);
                        board.body.velocity = Vec2::new(
                            impulse.x.clamp(-t.max_jump_speed, t.max_jump_speed),
                            impulse.y,
                        );
                        load_shot(board, Jump, &t);
                    }
                    FlameHead => {
                        ctx.reset_timer(FlameHead);
                        let shots = t.flame_head_shots.max(1);
                        ctx.board.vars.targeted_orb = ctx.board.rng.gen_range(0..shots);
                    }
                    WallSlide => ctx.reset_timer(WallSlide),
                    Init => {}
                }
                debug!("Inferno Man {} -> {}", previous.name(), current.name());
            })
            .build()
    }

    /// Runs the shoot timers and fires whatever their marks queued.
    fn tick_guns(&self, state: InfernoManState, board: &mut Board, dt: f32) {
        let vars = &mut board.vars;
        vars.shoot_delay.tick(dt);
        let mut done = false;
        if vars.shoot_delay.is_finished() {
            vars.shoot.update(dt, &mut vars.cues);
            done = vars.shoot.is_just_finished();
        }
        if done {
            vars.shoot_cooldown.reset();
        }
        vars.shoot_cooldown.tick(dt);

        for cue in std::mem::take(&mut board.vars.cues) {
            let mega = board.vars.method == ShootMethod::Mega;
            match cue {
                ShotCue::Open if !mega => shoot_goop(board, state, &self.tuning),
                ShotCue::Wave if mega => shoot_wave(board, &self.tuning),
                _ => {}
            }
        }
    }

    fn tick_meteors(&self, board: &mut Board, dt: f32) {
        for meteor in board.vars.meteors.iter_mut() {
            meteor.delay.tick(dt);
        }
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut board.vars.meteors)
            .into_iter()
            .partition(|meteor| meteor.delay.is_finished());
        board.vars.meteors = waiting;
        for meteor in due {
            drop_meteor(board, meteor.targeted, &self.tuning);
        }
    }
}

impl BossScript for InfernoMan {
    type State = InfernoManState;
    type Vars = InfernoManVars;

    fn kind(&self) -> BossKind {
        BossKind::InfernoMan
    }

    fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    fn body_size(&self) -> Vec2 {
        BODY_SIZE
    }

    fn blueprint(&self) -> Result<BossBlueprint<InfernoManState, InfernoManVars>, ConfigError> {
        use InfernoManState::*;
        let t = self.tuning;

        let damage = DamageNegotiator::new(
            DamageTable::new()
                .with(AttackerKind::Bullet, Damage::Fixed(1))
                .with(AttackerKind::Fireball, Damage::Fixed(2))
                .with(AttackerKind::ChargedShot, Damage::Charged { partial: 1, full: 2 })
                .with(AttackerKind::ChargedShotExplosion, Damage::Charged { partial: 1, full: 2 }),
        );

        Ok(BossBlueprint::new(self.machine()?, damage)
            .timer(Init, Timer::new(t.init))
            .timer(Stand, Timer::new(t.stand))
            .timer(WallSlide, Timer::new(t.wall_slide))
            .timer(FlameHead, self.flame_head_timer())
            .fixtures(Self::fixtures())
            .animation(Init, AnimationDef::uniform(3, 3, 0.1, false))
            .animation(Stand, AnimationDef::still())
            .animation(Jump, AnimationDef::still())
            .animation(WallSlide, AnimationDef::still())
            .animation(FlameHead, AnimationDef::uniform(2, 2, 0.1, true)))
    }

    fn on_spawn(&self, ctx: &mut Ctx, params: &SpawnParams) -> Result<(), SpawnError> {
        let bounds = params.require_rect("bounds")?;
        let t = &self.tuning;

        let board = &mut ctx.board;
        board.body.set_bottom_center(bounds.bottom_center());
        board.body.gravity_on = false;

        let vars = &mut board.vars;
        vars.meteor_spawner = params.rect("spawner");
        vars.meteor_floor = params.rect("collide");
        vars.shoot = Timer::with_runnables(
            t.shoot,
            [
                TimeMarkedRunnable::new(0.0, |cues: &mut Vec<ShotCue>| cues.push(ShotCue::Open)),
                TimeMarkedRunnable::new(t.mega_wave_at, |cues: &mut Vec<ShotCue>| cues.push(ShotCue::Wave)),
            ],
        );
        vars.shoot.set_to_end();
        vars.shoot_cooldown = finished(t.shoot_cooldown);
        vars.shoot_delay = finished(t.shoot_delay);
        Ok(())
    }

    fn is_ready(&self, ctx: &mut Ctx, dt: f32) -> bool {
        ctx.board.body.stop();
        ctx.tick_timer(InfernoManState::Init, dt);
        ctx.timer_finished(InfernoManState::Init)
    }

    fn on_ready(&self, ctx: &mut Ctx) {
        ctx.board.body.gravity_on = true;
    }

    fn tick_timers(&self, state: InfernoManState, ctx: &mut Ctx, dt: f32) {
        use InfernoManState::*;

        self.tick_meteors(&mut ctx.board, dt);
        self.tick_guns(state, &mut ctx.board, dt);

        let advance = match state {
            Jump => is_wall_sliding(ctx) || should_go_to_stand(ctx),
            Init if !feet(ctx) => false,
            WallSlide if should_go_to_stand(ctx) => true,
            _ => {
                ctx.tick_timer(state, dt);
                ctx.timer_finished(state) && ctx.board.vars.guns_idle()
            }
        };
        ctx.board.vars.advance = advance;
    }

    fn act(&self, state: InfernoManState, ctx: &mut Ctx, _dt: f32) {
        let t = &self.tuning;
        let board = &mut ctx.board;
        update_facing(board);

        let body = &mut board.body;
        if state == InfernoManState::WallSlide {
            body.velocity.x = 0.0;
            body.velocity.y = body.velocity.y.max(-t.max_wall_slide_speed);
        }
        if body.is_sensing(SensorSet::HEAD_TOUCHING_BLOCK) && body.velocity.y > 0.0 {
            body.velocity.y = 0.0;
        }
        land_meteors(board);
    }

    fn animation_key(&self, state: InfernoManState, ctx: &Ctx) -> &'static str {
        use InfernoManState::*;
        let vars = &ctx.board.vars;
        match state {
            Init if !feet(ctx) => "jump",
            Stand if vars.is_shooting() => match vars.method {
                ShootMethod::Straight => "stand_shoot_straight",
                ShootMethod::Up => "stand_shoot_up",
                ShootMethod::Mega => "stand_shoot_mega",
                ShootMethod::Down => "stand",
            },
            Jump if vars.is_shooting() => match vars.method {
                ShootMethod::Straight | ShootMethod::Mega => "jump_shoot_straight",
                ShootMethod::Up => "jump_shoot_up",
                ShootMethod::Down => "jump_shoot_down",
            },
            _ => state.name(),
        }
    }

    fn on_defeat(&self, ctx: &mut Ctx) {
        ctx.board.body.gravity_on = false;
        ctx.board.vars.meteors.clear();
    }

    fn on_destroy(&self, ctx: &mut Ctx) {
        ctx.board.vars.meteors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bosses::actor::BossActor;
    use crate::bosses::blackboard::{TargetView, WorldView};
    use crate::combat::{ActorId, Attacker};
    use crate::core::Lifecycle;

    const DT: f32 = 0.1;

    fn grounded(boss: &mut BossActor<InfernoMan>) {
        boss.body_mut().sensors = SensorSet::FEET_ON_GROUND;
    }

    fn aim(boss: &mut BossActor<InfernoMan>, target: Bounds) {
        boss.observe(WorldView {
            target: Some(TargetView {
                bounds: target,
                grounded: true,
                invincible: false,
            }),
            ..default()
        });
    }

    fn spawned_with(tuning: InfernoManTuning, target: Bounds) -> BossActor<InfernoMan> {
        let mut boss = BossActor::new(InfernoMan::new(tuning), ActorId(4)).unwrap();
        let params = SpawnParams::new()
            .with("bounds", Bounds::new(0.0, 0.0, 1.15, 1.5))
            .with("spawner", Bounds::new(2.0, 15.0, 20.0, 1.0))
            .with("collide", Bounds::new(-10.0, -1.0, 40.0, 1.0))
            .with("seed", 11_i64);
        boss.spawn(&params).unwrap();
        grounded(&mut boss);
        aim(&mut boss, target);
        boss
    }

    fn spawned() -> BossActor<InfernoMan> {
        spawned_with(InfernoManTuning::default(), Bounds::new(6.0, 0.0, 1.0, 1.5))
    }

    fn run_until(boss: &mut BossActor<InfernoMan>, state: InfernoManState, max_steps: usize) {
        for _ in 0..max_steps {
            if boss.state() == state {
                return;
            }
            boss.update(DT);
        }
        panic!("never reached {:?}, stuck in {:?}", state, boss.state());
    }

    fn steps(boss: &mut BossActor<InfernoMan>, n: usize) {
        for _ in 0..n {
            boss.update(DT);
        }
    }

    fn first(boss: &BossActor<InfernoMan>, kind: ChildKind) -> Vec2 {
        boss.children()
            .iter()
            .find(|child| child.kind == kind)
            .map(|child| child.body.velocity)
            .unwrap()
    }

    #[test]
    fn waits_for_the_ground_before_standing() {
        let mut boss = spawned();
        boss.body_mut().sensors = SensorSet::empty();
        steps(&mut boss, 20);
        assert_eq!(boss.lifecycle(), Lifecycle::Ready);
        assert!(boss.body().gravity_on);
        assert_eq!(boss.state(), InfernoManState::Init);
        assert_eq!(boss.animation_key(), "jump");

        grounded(&mut boss);
        boss.update(DT);
        assert_eq!(boss.state(), InfernoManState::Stand);
        assert_eq!(boss.vars().stands, 1);
    }

    #[test]
    fn level_target_gets_straight_goop() {
        let tuning = InfernoManTuning {
            straight_chance: Chance::flat(100.0),
            ..default()
        };
        let mut boss = spawned_with(tuning, Bounds::new(6.0, 0.0, 1.0, 1.5));
        run_until(&mut boss, InfernoManState::Stand, 30);
        assert_eq!(boss.vars().method, ShootMethod::Straight);

        boss.update(DT);
        assert_eq!(boss.children().count(ChildKind::MagmaGoop), 1);
        assert_eq!(first(&boss, ChildKind::MagmaGoop), Vec2::new(10.0, 0.0));
        assert_eq!(boss.animation_key(), "stand_shoot_straight");
    }

    #[test]
    fn mega_shot_sends_a_wave_along_the_floor() {
        let tuning = InfernoManTuning {
            mega_chance: Chance::flat(100.0),
            ..default()
        };
        let mut boss = spawned_with(tuning, Bounds::new(6.0, 4.0, 1.0, 1.5));
        run_until(&mut boss, InfernoManState::Stand, 30);
        assert_eq!(boss.vars().method, ShootMethod::Mega);
        assert_eq!(boss.animation_key(), "stand_shoot_mega");

        steps(&mut boss, 7);
        assert_eq!(boss.children().count(ChildKind::MagmaGoop), 0);
        assert_eq!(boss.children().count(ChildKind::MagmaWave), 1);
        assert_eq!(first(&boss, ChildKind::MagmaWave), Vec2::new(12.0, 0.0));
        assert_eq!(boss.state(), InfernoManState::Stand);
    }

    #[test]
    fn flame_head_rains_a_meteor_on_the_player() {
        let mut boss = spawned();
        run_until(&mut boss, InfernoManState::Stand, 30);
        boss.vars_mut().stands = 3;
        run_until(&mut boss, InfernoManState::FlameHead, 40);
        assert!(boss.vars().targeted_orb < 4);
        boss.vars_mut().targeted_orb = 0;

        steps(&mut boss, 3);
        assert_eq!(boss.children().count(ChildKind::MagmaOrb), 1);
        assert_eq!(first(&boss, ChildKind::MagmaOrb), Vec2::new(0.0, 15.0));
        assert_eq!(boss.vars().meteors.len(), 1);
        assert_eq!(boss.children().count(ChildKind::MagmaMeteor), 0);

        steps(&mut boss, 12);
        assert_eq!(boss.state(), InfernoManState::FlameHead);
        let meteor = boss
            .children()
            .iter()
            .find(|child| child.kind == ChildKind::MagmaMeteor)
            .unwrap();
        assert_eq!(meteor.body.center.x, 6.5);
        assert_eq!(meteor.body.velocity, Vec2::new(0.0, -10.0));
    }

    #[test]
    fn jumps_at_the_player_and_clings_to_walls() {
        let mut boss = spawned_with(InfernoManTuning::default(), Bounds::new(40.0, 0.0, 1.0, 1.5));
        run_until(&mut boss, InfernoManState::Stand, 30);
        run_until(&mut boss, InfernoManState::Jump, 30);
        assert_eq!(boss.body().velocity, Vec2::new(10.0, 16.0));

        let body = boss.body_mut();
        body.sensors = SensorSet::SIDE_TOUCHING_BLOCK_RIGHT;
        body.velocity.y = -2.0;
        boss.update(DT);
        assert_eq!(boss.state(), InfernoManState::WallSlide);
        assert_eq!(boss.body().velocity, Vec2::new(0.0, -2.0));
        assert!(boss.vars().shoot_delay.is_finished());

        run_until(&mut boss, InfernoManState::Jump, 20);
        assert_eq!(boss.body().velocity.y, 16.0);

        grounded(&mut boss);
        boss.body_mut().velocity.y = 0.0;
        boss.update(DT);
        assert_eq!(boss.state(), InfernoManState::Stand);
        assert_eq!(boss.vars().stands, 2);
    }

    #[test]
    fn target_below_is_shot_down_mid_jump() {
        let mut boss = spawned_with(InfernoManTuning::default(), Bounds::new(3.0, -4.0, 1.0, 1.5));
        run_until(&mut boss, InfernoManState::Jump, 60);
        assert_eq!(boss.vars().method, ShootMethod::Down);
        assert!(!boss.vars().shoot_delay.is_finished());

        steps(&mut boss, 5);
        assert_eq!(boss.state(), InfernoManState::Jump);
        let shot_down = boss.children().iter().any(|child| {
            let velocity = child.body.velocity;
            child.kind == ChildKind::MagmaGoop && velocity.y < 0.0 && velocity.x > 0.0
        });
        assert!(shot_down);
    }

    #[test]
    fn meteors_break_on_the_floor_block() {
        let mut boss = spawned();
        run_until(&mut boss, InfernoManState::Stand, 30);
        let board = &mut boss.ctx_mut().board;
        for y in [0.4, 6.0] {
            let params = SpawnParams::new()
                .with("position", Vec2::new(5.0, y))
                .with("velocity", Vec2::new(0.0, -10.0));
            board.spawn_child(ChildKind::MagmaMeteor, params).unwrap();
        }

        boss.update(DT);
        assert_eq!(boss.children().count(ChildKind::MagmaMeteor), 1);
    }

    #[test]
    fn defeat_calls_off_pending_meteors() {
        let mut boss = spawned();
        run_until(&mut boss, InfernoManState::Stand, 30);
        boss.vars_mut().stands = 3;
        run_until(&mut boss, InfernoManState::FlameHead, 40);
        steps(&mut boss, 3);
        assert_eq!(boss.vars().meteors.len(), 1);

        boss.trigger_defeat();
        assert!(boss.vars().meteors.is_empty());
        assert!(boss.children().is_empty());
        assert!(!boss.body().gravity_on);
    }

    #[test]
    fn fire_hurts_double() {
        let boss = spawned();
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::Bullet)), 1);
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::Fireball)), 2);
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::ChargedShot).charged(true)), 2);
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::ChargedShot).charged(false)), 1);
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::MagmaWave)), 0);
    }
}
