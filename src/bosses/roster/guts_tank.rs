//! Guts Tank: a huge tank that rolls back and forth at the edge of the
//! arena, throws orbs and purple blasts, drops mets and punches with a
//! detachable fist.
//!
//! Movement is a plain four-state machine. Attacks run beside it on their
//! own timers, and speed up as the tank loses health.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use super::BossKind;
use crate::bosses::actor::ContactSource;
use crate::bosses::animation::AnimationDef;
use crate::bosses::blackboard::{Blackboard, BossCtx};
use crate::bosses::body::jump_impulse;
use crate::bosses::children::{ChildKind, ChildMode};
use crate::bosses::error::SpawnError;
use crate::bosses::params::SpawnParams;
use crate::bosses::script::{BossBlueprint, BossScript};
use crate::combat::{
    Activation, AttackerKind, ChildHandle, Damage, DamageNegotiator, DamageTable, FixtureRole, FixtureSet,
    FixtureSpec, LocalShape,
};
use crate::core::{ConfigError, Scaled, SoundCue, StateId, StateMachine, Timer};
use crate::world::{Bounds, Facing};

const BODY_SIZE: Vec2 = Vec2::new(12.0, 9.0);
const BLOCK_HEIGHT: f32 = 3.0;
const FIST_ATTACHMENT: Vec2 = Vec2::new(-2.35, 0.75);
const MOUTH: Vec2 = Vec2::new(-2.0, 1.25);
/// Blast directions in degrees, each used once per volley.
const BLAST_ANGLES: [f32; 5] = [180.0, 190.0, 200.0, 210.0, 220.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GutsTankState {
    Advance,
    PauseFront,
    Retreat,
    PauseBack,
}

impl StateId for GutsTankState {
    const ALL: &'static [Self] = &[
        GutsTankState::Advance,
        GutsTankState::PauseFront,
        GutsTankState::Retreat,
        GutsTankState::PauseBack,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            GutsTankState::Advance => "advance",
            GutsTankState::PauseFront => "pause_front",
            GutsTankState::Retreat => "retreat",
            GutsTankState::PauseBack => "pause_back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankAttack {
    RunningMets,
    HeliMets,
    ChunkOrbs,
    ShootBlasts,
}

impl TankAttack {
    const ALL: [TankAttack; 4] = [
        TankAttack::RunningMets,
        TankAttack::HeliMets,
        TankAttack::ChunkOrbs,
        TankAttack::ShootBlasts,
    ];

    fn opens_mouth(self) -> bool {
        matches!(self, TankAttack::ChunkOrbs | TankAttack::ShootBlasts)
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct GutsTankTuning {
    pub max_health: i32,
    pub intro: f32,
    pub pause: f32,
    pub speed: Scaled,
    pub attack_delay: Scaled,
    pub chunk_orbs: usize,
    pub chunk_interval: f32,
    pub orb_impulse: f32,
    pub blasts: usize,
    pub blast_interval: Scaled,
    pub blast_speed: f32,
    pub running_mets: usize,
    pub heli_mets: usize,
    pub met_interval: f32,
    pub met_speed: f32,
    pub heli_speed: f32,
    pub fist_launch_delay: f32,
    pub fist_windup: f32,
    pub fist_speed: f32,
    pub fist_pause: f32,
    pub fist_return_speed: f32,
    pub laugh: f32,
}

impl Default for GutsTankTuning {
    fn default() -> Self {
        Self {
            max_health: 30,
            intro: 0.5,
            pause: 1.0,
            speed: Scaled::new(2.0, 4.0),
            attack_delay: Scaled::new(1.25, 0.75),
            chunk_orbs: 4,
            chunk_interval: 0.25,
            orb_impulse: 10.0,
            blasts: 5,
            blast_interval: Scaled::new(0.75, 0.5),
            blast_speed: 8.0,
            running_mets: 3,
            heli_mets: 2,
            met_interval: 1.0,
            met_speed: 4.0,
            heli_speed: 4.0,
            fist_launch_delay: 10.0,
            fist_windup: 1.0,
            fist_speed: 10.0,
            fist_pause: 1.0,
            fist_return_speed: 2.0,
            laugh: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct GutsTankVars {
    /// Bottom-left x the tank advances to.
    pub front: f32,
    /// Bottom-left x the tank retreats to.
    pub back: f32,
    pub fly: [Vec2; 2],
    pub killer_wall: Bounds,
    pub reached_front: bool,
    pub tank_block: Option<ChildHandle>,
    pub block_offset: Vec2,
    pub fist: Option<ChildHandle>,
    pub intro: Timer,
    pub attack: Option<TankAttack>,
    pub attack_delay: Timer,
    pub attack_timer: Timer,
    pub attack_count: usize,
    pub blast_angles: Vec<f32>,
    pub launch_delay: Timer,
    pub laugh: Timer,
}

impl Default for GutsTankVars {
    fn default() -> Self {
        Self {
            front: 0.0,
            back: 0.0,
            fly: [Vec2::ZERO; 2],
            killer_wall: Bounds::default(),
            reached_front: false,
            tank_block: None,
            block_offset: Vec2::ZERO,
            fist: None,
            intro: Timer::new(0.0),
            attack: None,
            attack_delay: Timer::new(0.0),
            attack_timer: Timer::new(0.0),
            attack_count: 0,
            blast_angles: Vec::new(),
            launch_delay: Timer::new(0.0),
            laugh: Timer::new(0.0),
        }
    }
}

impl GutsTankVars {
    pub fn is_laughing(&self) -> bool {
        !self.laugh.is_finished()
    }

    fn finish_attack(&mut self) {
        if let Some(attack) = self.attack.take() {
            debug!("Guts Tank finished {:?} after {} shots", attack, self.attack_count);
        }
        self.attack_count = 0;
        self.blast_angles.clear();
    }
}

type Ctx = BossCtx<GutsTankState, GutsTankVars>;
type Board = Blackboard<GutsTankVars>;

fn fist_attachment(board: &Board) -> Vec2 {
    board.body.center + FIST_ATTACHMENT
}

#[derive(Debug, Clone, Default)]
pub struct GutsTank {
    tuning: GutsTankTuning,
}

impl GutsTank {
    pub fn new(tuning: GutsTankTuning) -> Self {
        Self { tuning }
    }

    fn damage() -> DamageNegotiator {
        let mut table = DamageTable::new();
        for kind in [
            AttackerKind::Bullet,
            AttackerKind::ChargedShot,
            AttackerKind::ChargedShotExplosion,
            AttackerKind::Fireball,
            AttackerKind::MagmaWave,
            AttackerKind::MagmaFlame,
            AttackerKind::SmallIceCube,
            AttackerKind::PurpleBlast,
            AttackerKind::Orb,
        ] {
            table.insert(kind, Damage::FromPlayer(1));
        }
        table.insert(AttackerKind::MoonScythe, Damage::FromPlayer(2));
        table.insert(AttackerKind::Axe, Damage::FromPlayer(2));
        DamageNegotiator::new(table)
    }

    fn fixtures() -> FixtureSet<GutsTankState> {
        let face = LocalShape::at(Vec2::new(2.0, 2.0), Vec2::splat(2.0));
        FixtureSet::new()
            .with(FixtureSpec::new("face", FixtureRole::Damageable, face, Activation::Always))
            .with(FixtureSpec::new("face_damager", FixtureRole::Damager, face, Activation::Always))
            .with(FixtureSpec::new(
                "hull_damager",
                FixtureRole::Damager,
                LocalShape::at(Vec2::new(0.0, 0.5), Vec2::splat(2.5)),
                Activation::Always,
            ))
            .with(FixtureSpec::new("hull", FixtureRole::Body, LocalShape::centered(BODY_SIZE), Activation::Always))
    }

    fn pick_attack(&self, board: &mut Board, dt: f32) {
        if board.vars.attack.is_some() || !board.vars.reached_front {
            return;
        }
        board.vars.attack_delay.tick(dt);
        if !board.vars.attack_delay.is_finished() {
            return;
        }

        let attack = TankAttack::ALL[board.rng.gen_range(0..TankAttack::ALL.len())];
        let interval = match attack {
            TankAttack::ChunkOrbs => self.tuning.chunk_interval,
            TankAttack::ShootBlasts => self.tuning.blast_interval.at(board.health_ratio()),
            TankAttack::RunningMets | TankAttack::HeliMets => self.tuning.met_interval,
        };
        let vars = &mut board.vars;
        vars.attack = Some(attack);
        vars.attack_count = 0;
        vars.blast_angles = if attack == TankAttack::ShootBlasts {
            BLAST_ANGLES.to_vec()
        } else {
            Vec::new()
        };
        vars.attack_timer.reset_duration(interval);
        vars.attack_timer.reset();

        let delay = self.tuning.attack_delay.at(board.health_ratio());
        board.vars.attack_delay.reset_duration(delay);
        board.vars.attack_delay.reset();
        debug!("Guts Tank picks {:?}", attack);
    }

    fn run_attack(&self, board: &mut Board, dt: f32) {
        let Some(attack) = board.vars.attack else {
            return;
        };
        board.vars.attack_timer.tick(dt);
        if !board.vars.attack_timer.is_finished() {
            return;
        }

        let t = &self.tuning;
        let mouth = board.body.center + MOUTH;
        let shots = match attack {
            TankAttack::ChunkOrbs => {
                let velocity = match board.target_center() {
                    Some(target) => jump_impulse(mouth, target, t.orb_impulse, board.world.gravity),
                    None => Vec2::new(0.0, t.orb_impulse),
                };
                let params = SpawnParams::new()
                    .with("position", mouth)
                    .with("velocity", velocity)
                    .with("gravity", true);
                board.spawn_child(ChildKind::ChunkedOrb, params);
                board.play_sound(SoundCue::Blast);
                t.chunk_orbs
            }
            TankAttack::ShootBlasts => {
                let angles = &mut board.vars.blast_angles;
                if !angles.is_empty() {
                    let pick = board.rng.gen_range(0..angles.len());
                    let angle = angles.swap_remove(pick);
                    let params = SpawnParams::new()
                        .with("position", mouth)
                        .with("velocity", Vec2::from_angle(angle.to_radians()) * t.blast_speed)
                        .with("facing", Facing::Left);
                    board.spawn_child(ChildKind::PurpleBlast, params);
                    board.play_sound(SoundCue::BassyBlast);
                }
                let interval = t.blast_interval.at(board.health_ratio());
                board.vars.attack_timer.reset_duration(interval);
                t.blasts.min(BLAST_ANGLES.len())
            }
            TankAttack::RunningMets => {
                let position = Vec2::new(board.body.center.x - 2.25, board.body.bottom() + BLOCK_HEIGHT + 1.0);
                let params = SpawnParams::new()
                    .with("position", position)
                    .with("velocity", Vec2::new(-t.met_speed, 0.0))
                    .with("facing", Facing::Left)
                    .with("gravity", true);
                board.spawn_child(ChildKind::RunningMet, params);
                board.play_sound(SoundCue::ChillShoot);
                t.running_mets
            }
            TankAttack::HeliMets => {
                let position = Vec2::new(board.body.center.x - 2.25, board.body.bottom() + BLOCK_HEIGHT + 1.0);
                let fly = board.vars.fly[board.vars.attack_count % board.vars.fly.len()];
                let params = SpawnParams::new()
                    .with("position", position)
                    .with("target", fly)
                    .with("facing", Facing::Left);
                board.spawn_child(ChildKind::HeliMet, params);
                board.play_sound(SoundCue::ChillShoot);
                t.heli_mets
            }
        };

        board.vars.attack_count += 1;
        board.vars.attack_timer.reset();
        if board.vars.attack_count >= shots {
            board.vars.finish_attack();
        }
    }

    fn steer_fist(&self, board: &mut Board, dt: f32) {
        let Some(handle) = board.vars.fist else {
            return;
        };
        if !board.children.contains(handle) {
            board.vars.fist = None;
            return;
        }

        let t = &self.tuning;
        let attachment = fist_attachment(board);
        let target = board.target().map(|target| target.bounds);
        if board.children.get(handle).is_some_and(|fist| fist.mode == ChildMode::Attached) {
            board.vars.launch_delay.tick(dt);
        }
        let launch_due = board.vars.launch_delay.is_finished();

        let Some(fist) = board.children.get_mut(handle) else {
            return;
        };
        let mut burst = false;
        let mut launched = false;
        match fist.mode {
            ChildMode::Attached => {
                fist.body.center = attachment;
                fist.body.stop();
                if let Some(target) = target.filter(|target| launch_due && !fist.bounds().overlaps(target)) {
                    fist.body.facing = Facing::toward(fist.body.center.x, target.center().x);
                    fist.target = None;
                    fist.enter(ChildMode::Launched, t.fist_windup);
                    launched = true;
                }
            }
            ChildMode::Launched => {
                if !fist.timer.is_finished() {
                    fist.body.stop();
                } else {
                    let aim = match fist.target {
                        Some(aim) => aim,
                        None => {
                            let aim = target.map_or(attachment, |target| target.center());
                            fist.target = Some(aim);
                            burst = true;
                            aim
                        }
                    };
                    if fist.body.steer_to(aim, t.fist_speed, dt) || fist.bounds().contains(aim) {
                        fist.enter(ChildMode::Returning, t.fist_pause);
                    }
                }
            }
            ChildMode::Returning => {
                if !fist.timer.is_finished() {
                    fist.body.stop();
                } else if fist.body.steer_to(attachment, t.fist_return_speed, dt) {
                    fist.mode = ChildMode::Attached;
                    fist.target = None;
                }
            }
            ChildMode::Idle | ChildMode::Moving => {}
        }

        if burst {
            board.play_sound(SoundCue::Burst);
        }
        if launched {
            board.vars.launch_delay.reset();
        }
    }

    /// Keeps the tank block under the hull, steers heli mets and lets the
    /// killer wall take running mets.
    fn tend_children(&self, board: &mut Board, dt: f32) {
        let center = board.body.center;
        if let Some(block) = board.vars.tank_block.and_then(|handle| board.children.get_mut(handle)) {
            block.body.center = center + board.vars.block_offset;
        }

        let wall = board.vars.killer_wall;
        let heli_speed = self.tuning.heli_speed;
        for child in board.children.iter_mut() {
            match child.kind {
                ChildKind::RunningMet if child.bounds().left() <= wall.right() => child.kill(),
                ChildKind::HeliMet => match child.target {
                    Some(target) => {
                        if child.body.steer_to(target, heli_speed, dt) {
                            child.target = None;
                        }
                    }
                    None => child.body.stop(),
                },
                _ => {}
            }
        }
    }
}

impl BossScript for GutsTank {
    type State = GutsTankState;
    type Vars = GutsTankVars;

    fn kind(&self) -> BossKind {
        BossKind::GutsTank
    }

    fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    fn body_size(&self) -> Vec2 {
        BODY_SIZE
    }

    fn blueprint(&self) -> Result<BossBlueprint<GutsTankState, GutsTankVars>, ConfigError> {
        use GutsTankState::*;

        let machine = StateMachine::builder()
            .states(GutsTankState::ALL.iter().copied())
            .initial_state(Advance)
            .transition(Advance, PauseFront, |ctx: &Ctx| ctx.board.body.left() <= ctx.board.vars.front)
            .transition(PauseFront, Retreat, |ctx: &Ctx| ctx.timer_finished(PauseFront))
            .transition(Retreat, PauseBack, |ctx: &Ctx| ctx.board.body.left() >= ctx.board.vars.back)
            .transition(PauseBack, Advance, |ctx: &Ctx| ctx.timer_finished(PauseBack))
            .on_change_state(|current, previous, ctx: &mut Ctx| {
                ctx.reset_timer(current);
                let board = &mut ctx.board;
                let bottom = board.body.bottom();
                match current {
                    PauseFront => board.body.set_bottom_left(Vec2::new(board.vars.front, bottom)),
                    PauseBack => board.body.set_bottom_left(Vec2::new(board.vars.back, bottom)),
                    Retreat => board.vars.reached_front = true,
                    Advance => {}
                }
                debug!("Guts Tank {} -> {}", previous.name(), current.name());
            })
            .build()?;

        Ok(BossBlueprint::new(machine, Self::damage())
            .timer(PauseFront, Timer::new(self.tuning.pause))
            .timer(PauseBack, Timer::new(self.tuning.pause))
            .fixtures(Self::fixtures())
            .animation(Advance, AnimationDef::uniform(1, 2, 0.1, true))
            .animation(Retreat, AnimationDef::uniform(1, 2, 0.1, true))
            .animation(PauseFront, AnimationDef::still())
            .animation(PauseBack, AnimationDef::still()))
    }

    fn on_spawn(&self, ctx: &mut Ctx, params: &SpawnParams) -> Result<(), SpawnError> {
        let bounds = params.require_rect("bounds")?;
        let front = params.require_rect("front")?;
        let back = params.require_rect("back")?;
        let fly = [params.require_rect("fly_1")?.center(), params.require_rect("fly_2")?.center()];
        let killer_wall = params.require_rect("killer_wall")?;

        let t = &self.tuning;
        let board = &mut ctx.board;
        board.body.set_bottom_left(bounds.bottom_left());
        board.body.facing = Facing::Left;
        board.body.gravity_on = false;

        let vars = &mut board.vars;
        vars.front = front.bottom_left().x;
        vars.back = back.bottom_left().x;
        vars.fly = fly;
        vars.killer_wall = killer_wall;
        vars.intro.reset_duration(t.intro);
        vars.intro.reset();
        vars.attack_delay.reset_duration(t.attack_delay.full);
        vars.attack_delay.reset();
        vars.launch_delay.reset_duration(t.fist_launch_delay);
        vars.launch_delay.reset();
        vars.laugh.reset_duration(t.laugh);
        vars.laugh.set_to_end();

        let hull = board.body.bounds();
        let block = Bounds::new(hull.left(), hull.bottom(), hull.width(), BLOCK_HEIGHT);
        let block_handle = board
            .spawn_child(ChildKind::TankBlock, SpawnParams::new().with("bounds", block))
            .ok_or(SpawnError::NoFreeSlot(ChildKind::TankBlock))?;
        board.vars.tank_block = Some(block_handle);
        board.vars.block_offset = block.center() - board.body.center;

        let fist_params = SpawnParams::new()
            .with("position", fist_attachment(board))
            .with("facing", Facing::Left);
        let fist = board
            .spawn_child(ChildKind::TankFist, fist_params)
            .ok_or(SpawnError::NoFreeSlot(ChildKind::TankFist))?;
        board.vars.fist = Some(fist);
        Ok(())
    }

    fn is_ready(&self, ctx: &mut Ctx, dt: f32) -> bool {
        let grounded = ctx.board.target().is_some_and(|target| target.grounded);
        if grounded {
            ctx.board.vars.intro.tick(dt);
        }
        grounded && ctx.board.vars.intro.is_finished()
    }

    fn act(&self, state: GutsTankState, ctx: &mut Ctx, dt: f32) {
        let speed = self.tuning.speed.at(ctx.board.health_ratio());
        let board = &mut ctx.board;
        board.body.velocity = match state {
            GutsTankState::Advance => Vec2::new(-speed, 0.0),
            GutsTankState::Retreat => Vec2::new(speed, 0.0),
            GutsTankState::PauseFront | GutsTankState::PauseBack => Vec2::ZERO,
        };

        self.tend_children(board, dt);
        self.pick_attack(board, dt);
        self.steer_fist(board, dt);
        if board.vars.is_laughing() {
            board.vars.laugh.tick(dt);
        } else {
            self.run_attack(board, dt);
        }
    }

    fn animation_key(&self, state: GutsTankState, ctx: &Ctx) -> &'static str {
        let vars = &ctx.board.vars;
        let moving = matches!(state, GutsTankState::Advance | GutsTankState::Retreat);
        let mouth_open = vars.attack.is_some_and(TankAttack::opens_mouth);
        match (vars.is_laughing(), mouth_open, moving) {
            (true, _, false) => "laughing",
            (true, _, true) => "moving_laughing",
            (false, true, false) => "mouth_open",
            (false, true, true) => "moving_mouth_open",
            (false, false, false) => "mouth_closed",
            (false, false, true) => "moving_mouth_closed",
        }
    }

    fn on_target_damaged(&self, ctx: &mut Ctx, source: ContactSource) {
        let vars = &mut ctx.board.vars;
        vars.finish_attack();
        vars.attack_delay.reset();
        vars.laugh.reset();
        debug!("Guts Tank laughs at a hit from {:?}", source);
    }

    fn on_defeat(&self, ctx: &mut Ctx) {
        ctx.board.vars.fist = None;
        ctx.board.vars.tank_block = None;
    }

    fn on_destroy(&self, ctx: &mut Ctx) {
        ctx.board.vars.fist = None;
        ctx.board.vars.tank_block = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bosses::actor::BossActor;
    use crate::bosses::blackboard::{TargetView, WorldView};
    use crate::combat::{ActorId, AttackOwner, Attacker};
    use crate::core::Lifecycle;

    const DT: f32 = 0.1;

    fn params_without(skip: &str) -> SpawnParams {
        let mut params = SpawnParams::new();
        for (key, rect) in [
            ("bounds", Bounds::new(20.0, 0.0, 12.0, 9.0)),
            ("front", Bounds::new(16.0, 0.0, 1.0, 1.0)),
            ("back", Bounds::new(20.0, 0.0, 1.0, 1.0)),
            ("fly_1", Bounds::new(4.0, 8.0, 1.0, 1.0)),
            ("fly_2", Bounds::new(10.0, 8.0, 1.0, 1.0)),
            ("killer_wall", Bounds::new(-2.0, 0.0, 1.0, 10.0)),
        ] {
            if key != skip {
                params.insert(key, rect);
            }
        }
        params.with("seed", 5_i64)
    }

    fn params() -> SpawnParams {
        params_without("")
    }

    fn world(x: f32, grounded: bool) -> WorldView {
        WorldView {
            target: Some(TargetView {
                bounds: Bounds::new(x, 0.0, 1.0, 1.5),
                grounded,
                invincible: false,
            }),
            gravity: 0.0,
            ..default()
        }
    }

    fn ready() -> BossActor<GutsTank> {
        let mut boss = BossActor::new(GutsTank::default(), ActorId(9)).unwrap();
        boss.spawn(&params()).unwrap();
        boss.observe(world(2.0, true));
        for _ in 0..6 {
            boss.update(DT);
        }
        assert_eq!(boss.lifecycle(), Lifecycle::Ready);
        boss
    }

    fn step(boss: &mut BossActor<GutsTank>) {
        boss.update(DT);
        let velocity = boss.body().velocity;
        boss.body_mut().center += velocity * DT;
    }

    #[test]
    fn spawn_requires_every_marker() {
        let mut boss = BossActor::new(GutsTank::default(), ActorId(9)).unwrap();
        let partial = params_without("killer_wall");
        assert_eq!(boss.spawn(&partial), Err(SpawnError::MissingParam("killer_wall".into())));
        assert!(boss.children().is_empty());
    }

    #[test]
    fn spawns_with_block_and_fist() {
        let mut boss = BossActor::new(GutsTank::default(), ActorId(9)).unwrap();
        boss.spawn(&params()).unwrap();
        assert_eq!(boss.children().count(ChildKind::TankBlock), 1);
        let fist = boss.vars().fist.unwrap();
        assert_eq!(boss.children().get(fist).unwrap().mode, ChildMode::Attached);
        assert_eq!(boss.body().facing, Facing::Left);
    }

    #[test]
    fn waits_for_a_grounded_target() {
        let mut boss = BossActor::new(GutsTank::default(), ActorId(9)).unwrap();
        boss.spawn(&params()).unwrap();
        boss.observe(world(2.0, false));
        for _ in 0..20 {
            boss.update(DT);
        }
        assert_eq!(boss.lifecycle(), Lifecycle::Spawned);

        boss.observe(world(2.0, true));
        for _ in 0..6 {
            boss.update(DT);
        }
        assert_eq!(boss.lifecycle(), Lifecycle::Ready);
    }

    #[test]
    fn rolls_to_the_front_and_back() {
        let mut boss = ready();
        for _ in 0..25 {
            step(&mut boss);
        }
        assert_eq!(boss.state(), GutsTankState::PauseFront);
        assert_eq!(boss.body().left(), 16.0);

        for _ in 0..12 {
            step(&mut boss);
        }
        assert_eq!(boss.state(), GutsTankState::Retreat);
        assert!(boss.vars().reached_front);
        assert!(boss.body().velocity.x > 0.0);
    }

    #[test]
    fn attacks_only_after_reaching_the_front() {
        let mut boss = ready();
        for _ in 0..15 {
            step(&mut boss);
        }
        assert!(boss.vars().attack.is_none());

        let mut attacked = false;
        for _ in 0..60 {
            step(&mut boss);
            attacked |= boss.vars().attack.is_some();
        }
        assert!(attacked);
    }

    #[test]
    fn fist_punches_and_returns() {
        let mut boss = ready();
        let fist = boss.vars().fist.unwrap();
        boss.vars_mut().launch_delay.set_to_end();
        boss.update(DT);
        assert_eq!(boss.children().get(fist).unwrap().mode, ChildMode::Launched);

        let mut returned = false;
        for _ in 0..60 {
            boss.update(DT);
            let mode = boss.children().get(fist).unwrap().mode;
            returned |= mode == ChildMode::Returning;
            if returned && mode == ChildMode::Attached {
                break;
            }
        }
        assert!(returned);
    }

    #[test]
    fn laughs_when_a_child_lands_a_hit() {
        let mut boss = ready();
        boss.vars_mut().attack = Some(TankAttack::ChunkOrbs);
        boss.on_target_damaged(ContactSource::Child(ChildKind::TankFist));
        assert!(boss.vars().is_laughing());
        assert!(boss.vars().attack.is_none());
        assert!(boss.animation_key().ends_with("laughing"));
    }

    #[test]
    fn only_the_player_hurts_it() {
        let boss = ready();
        let bullet = Attacker::new(AttackerKind::Bullet);
        assert_eq!(boss.negotiate(&bullet), 1);
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::MoonScythe)), 2);

        let own_blast = Attacker::new(AttackerKind::PurpleBlast).owned_by(AttackOwner::Child(boss.vars().fist.unwrap()));
        assert!(!boss.can_be_damaged_by(&own_blast));
        let stray = Attacker::new(AttackerKind::Bullet).owned_by(AttackOwner::Actor(ActorId(1)));
        assert_eq!(boss.negotiate(&stray), 0);
        assert!(boss.can_be_damaged_by(&bullet));
    }

    #[test]
    fn overrides_can_be_tuned_per_instance() {
        let mut boss = ready();
        let stray = Attacker::new(AttackerKind::Orb).owned_by(AttackOwner::Environment);
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::Orb)), 1);
        assert_eq!(boss.negotiate(&stray), 0);
        assert!(!boss.can_be_damaged_by(&stray));

        boss.damage_negotiator_mut().set_override(AttackerKind::Orb, Damage::Fixed(3));
        assert_eq!(boss.negotiate(&stray), 3);
        assert!(boss.can_be_damaged_by(&stray));
        assert_eq!(boss.negotiate(&Attacker::new(AttackerKind::MoonScythe)), 2);
    }
}
