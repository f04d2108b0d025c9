//! Collision regions whose activity is re-derived every tick.
//!
//! Each fixture is declared once with a role, a shape relative to the body
//! center and an activation rule. [`FixtureSet::derive`] recomputes every
//! flag and every placed rectangle from a [`Pose`] alone, so nothing carries
//! over from the previous tick.

use std::ops::RangeInclusive;

use bevy::prelude::*;

use crate::core::StateId;
use crate::world::{Bounds, Facing};

/// What a fixture is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureRole {
    /// Hurts whatever it overlaps.
    Damager,
    /// Where the owner can be hurt.
    Damageable,
    /// Blocks incoming attacks regardless of the damageable fixture.
    Shield,
    /// Solid body.
    Body,
    /// Environment sensing only.
    Sensor,
}

/// Shape relative to the body center, authored facing right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalShape {
    pub offset: Vec2,
    pub size: Vec2,
}

impl LocalShape {
    pub fn centered(size: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            size,
        }
    }

    pub fn square(side: f32) -> Self {
        Self::centered(Vec2::splat(side))
    }

    pub fn at(offset: Vec2, size: Vec2) -> Self {
        Self { offset, size }
    }

    /// World rectangle for a body centered at `center` facing `facing`.
    pub fn place(&self, center: Vec2, facing: Facing) -> Bounds {
        let offset = Vec2::new(self.offset.x * facing.sign(), self.offset.y);
        Bounds::from_center(center + offset, self.size)
    }
}

/// When a fixture is active.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation<S> {
    Always,
    InStates(Vec<S>),
    ExceptStates(Vec<S>),
    /// Only in `state`, and only on animation frames within `frames`.
    Frames { state: S, frames: RangeInclusive<usize> },
}

impl<S: StateId> Activation<S> {
    pub fn allows(&self, state: S, frame: usize) -> bool {
        match self {
            Activation::Always => true,
            Activation::InStates(states) => states.contains(&state),
            Activation::ExceptStates(states) => !states.contains(&state),
            Activation::Frames { state: window, frames } => *window == state && frames.contains(&frame),
        }
    }
}

/// Declaration of one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSpec<S> {
    pub name: &'static str,
    pub role: FixtureRole,
    pub shape: LocalShape,
    pub activation: Activation<S>,
}

impl<S> FixtureSpec<S> {
    pub fn new(name: &'static str, role: FixtureRole, shape: LocalShape, activation: Activation<S>) -> Self {
        Self {
            name,
            role,
            shape,
            activation,
        }
    }
}

/// Everything fixture derivation may look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose<S> {
    pub state: S,
    pub frame: usize,
    pub facing: Facing,
    pub center: Vec2,
}

/// A declared fixture together with its flag and placement for this tick.
#[derive(Debug, Clone)]
pub struct Fixture<S> {
    spec: FixtureSpec<S>,
    active: bool,
    bounds: Bounds,
}

impl<S> Fixture<S> {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn role(&self) -> FixtureRole {
        self.spec.role
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Placed rectangle. Zero-sized while inactive.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Copy of a fixture's flags for renderers and the combat layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureStatus {
    pub name: &'static str,
    pub role: FixtureRole,
    pub active: bool,
    pub bounds: Bounds,
}

/// Outcome of testing an attack region against a fixture set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// An active shield overlapped; the attack is negated.
    Blocked(&'static str),
    /// An active damageable fixture overlapped.
    Struck(&'static str),
    Miss,
}

/// All fixtures of one actor.
#[derive(Debug, Clone)]
pub struct FixtureSet<S> {
    fixtures: Vec<Fixture<S>>,
    /// Body centre of the last derivation; inactive fixtures collapse onto it.
    anchor: Vec2,
}

impl<S> Default for FixtureSet<S> {
    fn default() -> Self {
        Self { fixtures: Vec::new(), anchor: Vec2::ZERO }
    }
}

fn collapsed(anchor: Vec2) -> Bounds {
    Bounds::from_center(anchor, Vec2::ZERO)
}

impl<S: StateId> FixtureSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, spec: FixtureSpec<S>) -> Self {
        self.add(spec);
        self
    }

    pub fn add(&mut self, spec: FixtureSpec<S>) {
        self.fixtures.push(Fixture {
            spec,
            active: false,
            bounds: collapsed(self.anchor),
        });
    }

    /// Recomputes every fixture from `pose`.
    pub fn derive(&mut self, pose: Pose<S>) {
        self.anchor = pose.center;
        for fixture in self.fixtures.iter_mut() {
            fixture.active = fixture.spec.activation.allows(pose.state, pose.frame);
            fixture.bounds = if fixture.active {
                fixture.spec.shape.place(pose.center, pose.facing)
            } else {
                collapsed(pose.center)
            };
        }
    }

    pub fn deactivate_all(&mut self) {
        for fixture in self.fixtures.iter_mut() {
            fixture.active = false;
            fixture.bounds = collapsed(self.anchor);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Fixture<S>> {
        self.fixtures.iter().find(|fixture| fixture.spec.name == name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.get(name).is_some_and(Fixture::is_active)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fixture<S>> {
        self.fixtures.iter()
    }

    pub fn active(&self, role: FixtureRole) -> impl Iterator<Item = &Fixture<S>> {
        self.fixtures
            .iter()
            .filter(move |fixture| fixture.active && fixture.spec.role == role)
    }

    pub fn any_active(&self) -> bool {
        self.fixtures.iter().any(Fixture::is_active)
    }

    /// Shields are checked before damageable fixtures.
    pub fn resolve_hit(&self, region: &Bounds) -> HitOutcome {
        if let Some(shield) = self.active(FixtureRole::Shield).find(|f| f.bounds.overlaps(region)) {
            return HitOutcome::Blocked(shield.name());
        }
        if let Some(hurtbox) = self.active(FixtureRole::Damageable).find(|f| f.bounds.overlaps(region)) {
            return HitOutcome::Struck(hurtbox.name());
        }
        HitOutcome::Miss
    }

    /// Whether any active damager overlaps `region`.
    pub fn damages(&self, region: &Bounds) -> bool {
        self.active(FixtureRole::Damager).any(|f| f.bounds.overlaps(region))
    }

    pub fn statuses(&self) -> Vec<FixtureStatus> {
        self.fixtures
            .iter()
            .map(|fixture| FixtureStatus {
                name: fixture.spec.name,
                role: fixture.spec.role,
                active: fixture.active,
                bounds: fixture.bounds,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Swing {
        Stand,
        Swing,
    }

    impl StateId for Swing {
        const ALL: &'static [Self] = &[Swing::Stand, Swing::Swing];

        fn index(self) -> usize {
            self as usize
        }

        fn name(self) -> &'static str {
            match self {
                Swing::Stand => "stand",
                Swing::Swing => "swing",
            }
        }
    }

    fn set() -> FixtureSet<Swing> {
        FixtureSet::new()
            .with(FixtureSpec::new(
                "body",
                FixtureRole::Damageable,
                LocalShape::square(2.0),
                Activation::Always,
            ))
            .with(FixtureSpec::new(
                "guard",
                FixtureRole::Shield,
                LocalShape::at(Vec2::new(1.5, 0.0), Vec2::new(1.0, 2.0)),
                Activation::InStates(vec![Swing::Stand]),
            ))
            .with(FixtureSpec::new(
                "axe",
                FixtureRole::Damager,
                LocalShape::at(Vec2::new(2.0, 0.0), Vec2::new(1.5, 1.0)),
                Activation::Frames {
                    state: Swing::Swing,
                    frames: 3..=5,
                },
            ))
    }

    fn pose(state: Swing, frame: usize, facing: Facing) -> Pose<Swing> {
        Pose {
            state,
            frame,
            facing,
            center: Vec2::ZERO,
        }
    }

    #[test]
    fn derivation_is_repeatable() {
        let mut a = set();
        let mut b = set();
        b.derive(pose(Swing::Swing, 4, Facing::Right));

        a.derive(pose(Swing::Stand, 0, Facing::Left));
        b.derive(pose(Swing::Stand, 0, Facing::Left));
        assert_eq!(a.statuses(), b.statuses());
    }

    #[test]
    fn frame_window_gates_the_damager() {
        let mut fixtures = set();
        for (frame, expected) in [(2, false), (3, true), (5, true), (6, false)] {
            fixtures.derive(pose(Swing::Swing, frame, Facing::Right));
            assert_eq!(fixtures.is_active("axe"), expected, "frame {frame}");
        }
        fixtures.derive(pose(Swing::Stand, 4, Facing::Right));
        assert!(!fixtures.is_active("axe"));
    }

    #[test]
    fn facing_mirrors_offsets() {
        let mut fixtures = set();
        fixtures.derive(pose(Swing::Swing, 4, Facing::Right));
        let right = fixtures.get("axe").unwrap().bounds().center();
        fixtures.derive(pose(Swing::Swing, 4, Facing::Left));
        let left = fixtures.get("axe").unwrap().bounds().center();
        assert_eq!(right.x, -left.x);
        assert!(fixtures.damages(&Bounds::from_center(Vec2::new(-2.0, 0.0), Vec2::ONE)));
    }

    #[test]
    fn shield_wins_over_damageable() {
        let mut fixtures = set();
        fixtures.derive(pose(Swing::Stand, 0, Facing::Right));
        let overlapping_both = Bounds::new(0.5, -0.5, 1.0, 1.0);
        assert_eq!(fixtures.resolve_hit(&overlapping_both), HitOutcome::Blocked("guard"));

        fixtures.derive(pose(Swing::Swing, 0, Facing::Right));
        assert_eq!(fixtures.resolve_hit(&overlapping_both), HitOutcome::Struck("body"));
        assert_eq!(
            fixtures.resolve_hit(&Bounds::new(10.0, 10.0, 1.0, 1.0)),
            HitOutcome::Miss
        );
    }

    #[test]
    fn deactivate_all_clears_every_flag() {
        let mut fixtures = set();
        fixtures.derive(pose(Swing::Swing, 4, Facing::Right));
        assert!(fixtures.any_active());
        fixtures.deactivate_all();
        assert!(!fixtures.any_active());
    }

    #[test]
    fn inactive_fixtures_collapse_onto_the_body_either_way() {
        let center = Vec2::new(6.0, 3.0);
        let mut derived = set();
        derived.derive(Pose { center, ..pose(Swing::Swing, 0, Facing::Right) });
        let mut cleared = set();
        cleared.derive(Pose { center, ..pose(Swing::Swing, 4, Facing::Right) });
        cleared.deactivate_all();

        let axe = derived.get("axe").unwrap().bounds();
        assert_eq!(axe, cleared.get("axe").unwrap().bounds());
        assert_eq!(axe.center(), center);
        assert_eq!(axe.size(), Vec2::ZERO);
    }
}
