//! A two-state boss built from the public scripting API: STAND for one
//! second, then ATTACK for half a second, then back.

use bevy::prelude::*;

use boss_actors::bosses::{BossActor, BossBlueprint, BossCtx, BossKind, BossScript, SpawnError, SpawnParams};
use boss_actors::combat::{ActorId, DamageNegotiator, DamageTable};
use boss_actors::core::{Chance, ConfigError, Lifecycle, StateId, StateMachine, Timer};

const DT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Brute {
    Stand,
    Attack,
}

impl StateId for Brute {
    const ALL: &'static [Self] = &[Brute::Stand, Brute::Attack];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Brute::Stand => "stand",
            Brute::Attack => "attack",
        }
    }
}

#[derive(Debug, Default)]
struct BruteVars {
    changes: u32,
    roll: u32,
}

type Ctx = BossCtx<Brute, BruteVars>;

struct BruteScript {
    attack_chance: Chance,
}

impl BossScript for BruteScript {
    type State = Brute;
    type Vars = BruteVars;

    fn kind(&self) -> BossKind {
        BossKind::TimberWoman
    }

    fn body_size(&self) -> Vec2 {
        Vec2::ONE
    }

    fn blueprint(&self) -> Result<BossBlueprint<Brute, BruteVars>, ConfigError> {
        let chance = self.attack_chance;
        let machine = StateMachine::builder()
            .states(Brute::ALL.iter().copied())
            .initial_state(Brute::Stand)
            .transition(Brute::Stand, Brute::Attack, move |ctx: &Ctx| {
                ctx.timer_finished(Brute::Stand) && chance.passes(ctx.board.vars.roll, ctx.board.health_ratio())
            })
            .transition(Brute::Attack, Brute::Stand, |ctx: &Ctx| ctx.timer_finished(Brute::Attack))
            .on_change_state(|current: Brute, _previous: Brute, ctx: &mut Ctx| {
                ctx.board.vars.changes += 1;
                ctx.reset_timer(current);
            })
            .build()?;

        Ok(BossBlueprint::new(machine, DamageNegotiator::new(DamageTable::standard_boss()))
            .timer(Brute::Stand, Timer::new(1.0))
            .timer(Brute::Attack, Timer::new(0.5)))
    }

    fn on_spawn(&self, ctx: &mut Ctx, params: &SpawnParams) -> Result<(), SpawnError> {
        ctx.board.body.center = params.require_point("position")?;
        Ok(())
    }

    fn is_ready(&self, _ctx: &mut Ctx, _dt: f32) -> bool {
        true
    }

    fn act(&self, _state: Brute, _ctx: &mut Ctx, _dt: f32) {}
}

fn brute() -> BossActor<BruteScript> {
    let script = BruteScript {
        attack_chance: Chance::flat(100.0),
    };
    let mut boss = BossActor::new(script, ActorId(1)).unwrap();
    boss.spawn(&SpawnParams::new().with("position", Vec2::new(3.0, 0.0)))
        .unwrap();
    boss
}

#[test]
fn stand_turns_into_attack_on_the_eleventh_update() {
    let mut boss = brute();

    boss.update(DT);
    assert_eq!(boss.lifecycle(), Lifecycle::Ready);
    assert_eq!(boss.state(), Brute::Stand);

    for _ in 0..9 {
        boss.update(DT);
        assert_eq!(boss.state(), Brute::Stand);
    }
    assert!(!boss.timer(Brute::Stand).unwrap().is_finished());
    assert_eq!(boss.vars().changes, 0);

    boss.update(DT);
    assert_eq!(boss.state(), Brute::Attack);
    assert_eq!(boss.previous_state(), Some(Brute::Stand));
    assert_eq!(boss.vars().changes, 1);
    assert!(boss.timer(Brute::Attack).unwrap().is_at_beginning());
}

#[test]
fn attack_hands_back_to_stand_after_its_timer() {
    let mut boss = brute();
    for _ in 0..11 {
        boss.update(DT);
    }
    assert_eq!(boss.state(), Brute::Attack);

    for _ in 0..4 {
        boss.update(DT);
        assert_eq!(boss.state(), Brute::Attack);
    }
    boss.update(DT);
    assert_eq!(boss.state(), Brute::Stand);
    assert_eq!(boss.vars().changes, 2);
}

#[test]
fn spawning_twice_starts_over() {
    let mut boss = brute();
    for _ in 0..11 {
        boss.update(DT);
    }
    assert_eq!(boss.state(), Brute::Attack);

    boss.spawn(&SpawnParams::new().with("position", Vec2::ZERO))
        .unwrap();
    assert_eq!(boss.lifecycle(), Lifecycle::Spawned);
    assert_eq!(boss.state(), Brute::Stand);
    assert_eq!(boss.vars().changes, 0);
    assert_eq!(boss.body().center, Vec2::ZERO);
}
