//! Subordinate actors spawned and owned by a boss.
//!
//! Children are plain records in their owner's [`ChildRegistry`]. The owner
//! steps them during its own tick and releases them when it is defeated or
//! destroyed. Handles are generational, so a stale handle to a reused slot
//! simply resolves to nothing.

use bevy::prelude::*;

use super::body::Body;
use super::error::SpawnError;
use super::params::SpawnParams;
use crate::combat::{
    Activation, ActorId, ChildHandle, FixtureRole, FixtureSet, FixtureSpec, HitOutcome, LocalShape, Pose,
};
use crate::core::{StateId, Timer};
use crate::world::{Bounds, Facing};

/// Every kind of child a boss may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    BabySpider,
    GroundPebble,
    DeadlyLeaf,
    TankFist,
    TankBlock,
    RunningMet,
    HeliMet,
    ChunkedOrb,
    PurpleBlast,
    MagmaGoop,
    MagmaWave,
    MagmaOrb,
    MagmaMeteor,
}

impl ChildKind {
    pub fn size(self) -> Vec2 {
        match self {
            ChildKind::BabySpider => Vec2::splat(0.75),
            ChildKind::GroundPebble => Vec2::splat(0.25),
            ChildKind::DeadlyLeaf => Vec2::splat(0.5),
            ChildKind::TankFist => Vec2::splat(1.25),
            ChildKind::TankBlock => Vec2::ONE,
            ChildKind::RunningMet | ChildKind::HeliMet => Vec2::splat(1.0),
            ChildKind::ChunkedOrb | ChildKind::PurpleBlast | ChildKind::MagmaGoop => Vec2::splat(0.5),
            ChildKind::MagmaWave => Vec2::new(0.75, 1.0),
            ChildKind::MagmaOrb => Vec2::splat(0.75),
            ChildKind::MagmaMeteor => Vec2::splat(1.0),
        }
    }

    /// Mode a freshly spawned child starts in.
    pub fn initial_mode(self) -> ChildMode {
        match self {
            ChildKind::TankFist => ChildMode::Attached,
            ChildKind::TankBlock => ChildMode::Idle,
            _ => ChildMode::Moving,
        }
    }

    /// Projectiles and debris die on contact; mets, spiders and the fist can be shot.
    pub fn is_damageable(self) -> bool {
        matches!(
            self,
            ChildKind::BabySpider | ChildKind::RunningMet | ChildKind::HeliMet | ChildKind::TankFist
        )
    }

    /// Hits a child takes before it dies.
    pub fn toughness(self) -> u32 {
        match self {
            ChildKind::TankFist => 5,
            _ => 1,
        }
    }

    /// Seconds before short-lived debris expires on its own.
    pub fn lifetime(self) -> Option<f32> {
        match self {
            ChildKind::GroundPebble => Some(1.5),
            ChildKind::DeadlyLeaf => Some(4.0),
            ChildKind::ChunkedOrb | ChildKind::MagmaMeteor => Some(3.0),
            ChildKind::MagmaGoop => Some(2.0),
            ChildKind::MagmaWave => Some(2.5),
            ChildKind::MagmaOrb => Some(1.5),
            _ => None,
        }
    }

    fn fixtures(self) -> FixtureSet<ChildMode> {
        let size = self.size();
        let mut fixtures = FixtureSet::new();
        match self {
            ChildKind::TankBlock => {
                fixtures.add(FixtureSpec::new("block", FixtureRole::Body, LocalShape::centered(size), Activation::Always));
            }
            ChildKind::TankFist => {
                // authored facing right, knuckles forward
                let plate = Vec2::new(0.2, 1.05);
                fixtures.add(FixtureSpec::new(
                    "body",
                    FixtureRole::Body,
                    LocalShape::centered(size),
                    Activation::Always,
                ));
                fixtures.add(FixtureSpec::new(
                    "fist",
                    FixtureRole::Damager,
                    LocalShape::at(Vec2::new(-0.5, 0.0), Vec2::splat(1.75)),
                    Activation::Always,
                ));
                fixtures.add(FixtureSpec::new(
                    "knuckles",
                    FixtureRole::Shield,
                    LocalShape::at(Vec2::new(0.65, 0.0), plate),
                    Activation::Always,
                ));
                fixtures.add(FixtureSpec::new(
                    "wrist",
                    FixtureRole::Damageable,
                    LocalShape::at(Vec2::new(-0.75, 0.0), plate),
                    Activation::Always,
                ));
            }
            _ => {
                fixtures.add(FixtureSpec::new("hit", FixtureRole::Damager, LocalShape::centered(size), Activation::Always));
                if self.is_damageable() {
                    fixtures.add(FixtureSpec::new(
                        "hurt",
                        FixtureRole::Damageable,
                        LocalShape::centered(size),
                        Activation::Always,
                    ));
                }
            }
        }
        fixtures
    }

    /// Keys a spawn request for this kind must carry.
    fn required_params(self) -> &'static [&'static str] {
        match self {
            ChildKind::TankBlock => &["bounds"],
            _ => &["position"],
        }
    }
}

/// Behavior mode of a child, also used to gate its fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChildMode {
    #[default]
    Idle,
    Moving,
    Attached,
    Launched,
    Returning,
}

impl StateId for ChildMode {
    const ALL: &'static [Self] = &[
        ChildMode::Idle,
        ChildMode::Moving,
        ChildMode::Attached,
        ChildMode::Launched,
        ChildMode::Returning,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            ChildMode::Idle => "idle",
            ChildMode::Moving => "moving",
            ChildMode::Attached => "attached",
            ChildMode::Launched => "launched",
            ChildMode::Returning => "returning",
        }
    }
}

/// One live child.
#[derive(Debug)]
pub struct ChildActor {
    handle: ChildHandle,
    pub kind: ChildKind,
    pub mode: ChildMode,
    pub body: Body,
    pub fixtures: FixtureSet<ChildMode>,
    /// Per-mode countdown; its meaning depends on the kind.
    pub timer: Timer,
    /// Point the child is heading for, if any.
    pub target: Option<Vec2>,
    pub params: SpawnParams,
    /// Seconds since spawn.
    pub age: f32,
    hits_left: u32,
    dead: bool,
}

impl ChildActor {
    fn new(handle: ChildHandle, kind: ChildKind, params: SpawnParams) -> Self {
        let mut body = Body::sized(kind.size());
        if let Some(bounds) = params.rect("bounds") {
            body.size = bounds.size();
            body.center = bounds.center();
        } else if let Some(position) = params.point("position") {
            body.center = position;
        }
        body.velocity = params.point("velocity").unwrap_or(Vec2::ZERO);
        body.facing = params.facing("facing").unwrap_or_default();
        body.gravity_on = params.flag("gravity").unwrap_or(false);

        let mut fixtures = kind.fixtures();
        if let Some(bounds) = params.rect("bounds") {
            fixtures = FixtureSet::new().with(FixtureSpec::new(
                "block",
                FixtureRole::Body,
                LocalShape::centered(bounds.size()),
                Activation::Always,
            ));
        }

        let mut timer = Timer::new(params.float("timer").unwrap_or(0.0));
        timer.set_to_end();

        Self {
            handle,
            kind,
            mode: kind.initial_mode(),
            body,
            fixtures,
            timer,
            target: params.point("target"),
            params,
            age: 0.0,
            hits_left: kind.toughness(),
            dead: false,
        }
    }

    pub fn handle(&self) -> ChildHandle {
        self.handle
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Marks the child for release at the owner's next prune.
    pub fn kill(&mut self) {
        self.dead = true;
    }

    /// Takes one hit; returns true when that hit killed the child.
    pub fn strike(&mut self) -> bool {
        self.hits_left = self.hits_left.saturating_sub(1);
        if self.hits_left == 0 {
            self.kill();
        }
        self.dead
    }

    /// Switches mode and restarts the mode timer with `duration`.
    pub fn enter(&mut self, mode: ChildMode, duration: f32) {
        self.mode = mode;
        self.timer.reset_duration(duration);
        self.timer.reset();
    }

    pub fn derive_fixtures(&mut self) {
        self.fixtures.derive(Pose {
            state: self.mode,
            frame: 0,
            facing: self.body.facing,
            center: self.body.center,
        });
    }

    /// Ballistic step. Falling children come to rest on `floor`; there is no
    /// other collision response.
    pub fn integrate(&mut self, dt: f32, gravity: f32, floor: Option<f32>) {
        if self.body.gravity_on {
            self.body.velocity.y -= gravity * dt;
        }
        self.body.center += self.body.velocity * dt;
        if let Some(floor) = floor.filter(|_| self.body.gravity_on) {
            if self.body.bottom() < floor {
                self.body.center.y = floor + self.body.size.y / 2.0;
                self.body.velocity.y = 0.0;
            }
        }
        if self.body.velocity.x != 0.0 {
            self.body.facing = if self.body.velocity.x < 0.0 {
                Facing::Left
            } else {
                Facing::Right
            };
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.body.bounds()
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    child: Option<ChildActor>,
}

/// Fixed-capacity store of one owner's children.
#[derive(Debug)]
pub struct ChildRegistry {
    owner: ActorId,
    capacity: usize,
    slots: Vec<Slot>,
}

impl Default for ChildRegistry {
    fn default() -> Self {
        Self::new(ActorId::default(), 32)
    }
}

impl ChildRegistry {
    pub fn new(owner: ActorId, capacity: usize) -> Self {
        Self {
            owner,
            capacity,
            slots: Vec::new(),
        }
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Places a new child in a free slot.
    pub fn spawn(&mut self, kind: ChildKind, params: SpawnParams) -> Result<ChildHandle, SpawnError> {
        if let Some(missing) = kind.required_params().iter().find(|key| !params.contains(key)) {
            return Err(SpawnError::MissingParam((*missing).to_string()));
        }

        let index = match self.slots.iter().position(|slot| slot.child.is_none()) {
            Some(index) => index,
            None if self.slots.len() < self.capacity => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
            None => return Err(SpawnError::NoFreeSlot(kind)),
        };

        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        let handle = ChildHandle {
            owner: self.owner,
            index: index as u32,
            generation: slot.generation,
        };
        let mut child = ChildActor::new(handle, kind, params);
        child.derive_fixtures();
        slot.child = Some(child);
        Ok(handle)
    }

    fn slot(&self, handle: ChildHandle) -> Option<&Slot> {
        if handle.owner != self.owner {
            return None;
        }
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }

    pub fn get(&self, handle: ChildHandle) -> Option<&ChildActor> {
        self.slot(handle).and_then(|slot| slot.child.as_ref())
    }

    pub fn get_mut(&mut self, handle: ChildHandle) -> Option<&mut ChildActor> {
        self.slot(handle)?;
        self.slots[handle.index as usize].child.as_mut()
    }

    pub fn contains(&self, handle: ChildHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Takes a child out of the registry with its fixtures switched off.
    pub fn remove(&mut self, handle: ChildHandle) -> Option<ChildActor> {
        self.slot(handle)?;
        let mut child = self.slots[handle.index as usize].child.take()?;
        child.fixtures.deactivate_all();
        Some(child)
    }

    /// Removes every child matching `predicate`.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&ChildActor) -> bool) -> Vec<ChildActor> {
        let mut removed = Vec::new();
        for slot in self.slots.iter_mut() {
            if slot.child.as_ref().is_some_and(&mut predicate) {
                if let Some(mut child) = slot.child.take() {
                    child.fixtures.deactivate_all();
                    removed.push(child);
                }
            }
        }
        removed
    }

    /// Empties the registry.
    pub fn drain(&mut self) -> Vec<ChildActor> {
        self.remove_where(|_| true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildActor> {
        self.slots.iter().filter_map(|slot| slot.child.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChildActor> {
        self.slots.iter_mut().filter_map(|slot| slot.child.as_mut())
    }

    pub fn count(&self, kind: ChildKind) -> usize {
        self.iter().filter(|child| child.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integrates every non-attached child, expires debris and re-derives
    /// fixtures.
    pub fn advance(&mut self, dt: f32, gravity: f32, floor: Option<f32>) {
        for child in self.iter_mut() {
            child.age += dt;
            child.timer.tick(dt);
            if !matches!(child.mode, ChildMode::Attached | ChildMode::Idle) {
                child.integrate(dt, gravity, floor);
            }
            if child.kind.lifetime().is_some_and(|lifetime| child.age >= lifetime) {
                child.kill();
            }
            child.derive_fixtures();
        }
    }

    /// Tests an attack region against every child. The first child touched
    /// takes the hit or blocks it.
    pub fn resolve_hit(&mut self, region: &Bounds) -> HitOutcome {
        for child in self.iter_mut().filter(|child| !child.is_dead()) {
            match child.fixtures.resolve_hit(region) {
                HitOutcome::Miss => continue,
                HitOutcome::Struck(name) => {
                    child.strike();
                    return HitOutcome::Struck(name);
                }
                blocked => return blocked,
            }
        }
        HitOutcome::Miss
    }

    /// Kind of the first live child whose damager overlaps `region`.
    pub fn damager_at(&self, region: &Bounds) -> Option<ChildKind> {
        self.iter()
            .find(|child| !child.is_dead() && child.fixtures.damages(region))
            .map(|child| child.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> SpawnParams {
        SpawnParams::new().with("position", Vec2::new(x, 0.0))
    }

    #[test]
    fn stale_handles_resolve_to_nothing() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        let first = registry.spawn(ChildKind::PurpleBlast, at(0.0)).unwrap();
        assert!(registry.remove(first).is_some());

        let second = registry.spawn(ChildKind::PurpleBlast, at(1.0)).unwrap();
        assert_eq!(first.index, second.index);
        assert!(registry.get(first).is_none());
        assert_eq!(registry.get(second).unwrap().body.center.x, 1.0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut registry = ChildRegistry::new(ActorId(1), 1);
        registry.spawn(ChildKind::GroundPebble, at(0.0)).unwrap();
        assert_eq!(
            registry.spawn(ChildKind::GroundPebble, at(0.0)),
            Err(SpawnError::NoFreeSlot(ChildKind::GroundPebble))
        );
    }

    #[test]
    fn spawn_requires_a_position() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        assert_eq!(
            registry.spawn(ChildKind::HeliMet, SpawnParams::new()),
            Err(SpawnError::MissingParam("position".into()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn handles_from_other_owners_are_rejected() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        let mut handle = registry.spawn(ChildKind::HeliMet, at(0.0)).unwrap();
        handle.owner = ActorId(2);
        assert!(!registry.contains(handle));
    }

    #[test]
    fn drained_children_have_no_active_fixtures() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        registry.spawn(ChildKind::RunningMet, at(0.0)).unwrap();
        registry.spawn(ChildKind::TankFist, at(2.0)).unwrap();
        assert!(registry.iter().all(|child| child.fixtures.any_active()));

        let released = registry.drain();
        assert_eq!(released.len(), 2);
        assert!(released.iter().all(|child| !child.fixtures.any_active()));
        assert!(registry.is_empty());
    }

    #[test]
    fn shooting_a_met_kills_it() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        let met = registry.spawn(ChildKind::RunningMet, at(0.0)).unwrap();
        let shot = Bounds::from_center(Vec2::ZERO, Vec2::splat(0.2));
        assert_eq!(registry.resolve_hit(&shot), HitOutcome::Struck("hurt"));
        assert!(registry.get(met).unwrap().is_dead());
    }

    #[test]
    fn attached_children_do_not_move() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        let fist = registry
            .spawn(ChildKind::TankFist, at(0.0).with("velocity", Vec2::X))
            .unwrap();
        registry.advance(1.0, 0.0, None);
        assert_eq!(registry.get(fist).unwrap().body.center, Vec2::ZERO);

        registry.get_mut(fist).unwrap().enter(ChildMode::Launched, 1.0);
        registry.advance(1.0, 0.0, None);
        assert_eq!(registry.get(fist).unwrap().body.center, Vec2::X);
    }

    #[test]
    fn the_fist_takes_several_hits() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        let fist = registry.spawn(ChildKind::TankFist, at(0.0)).unwrap();
        let wrist = Bounds::from_center(Vec2::new(-0.75, 0.0), Vec2::splat(0.1));
        for _ in 0..4 {
            assert_eq!(registry.resolve_hit(&wrist), HitOutcome::Struck("wrist"));
        }
        assert!(!registry.get(fist).unwrap().is_dead());
        registry.resolve_hit(&wrist);
        assert!(registry.get(fist).unwrap().is_dead());
    }

    #[test]
    fn debris_expires_and_rests_on_the_floor() {
        let mut registry = ChildRegistry::new(ActorId(1), 4);
        let pebble = registry
            .spawn(ChildKind::GroundPebble, at(0.0).with("gravity", true))
            .unwrap();
        registry.advance(1.0, 10.0, Some(-1.0));
        let child = registry.get(pebble).unwrap();
        assert_eq!(child.body.bottom(), -1.0);
        assert!(!child.is_dead());

        registry.advance(0.5, 10.0, Some(-1.0));
        assert!(registry.get(pebble).unwrap().is_dead());
    }
}
