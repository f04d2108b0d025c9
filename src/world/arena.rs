//! Arena layouts and the minimal physics bosses rely on.
//!
//! An arena is a room (floor, ceiling and side walls), optional solid
//! blocks inside it, a start point for the target and the bosses to place.
//! Bodies move kinematically: the velocity a boss writes during its tick is
//! integrated here, pushed out of solids, and turned back into sensor flags
//! for the next tick.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use super::error::DataLoadError;
use super::geometry::{Bounds, Facing};
use crate::bosses::{Body, BossKind, ParamValue, SensorSet, SpawnParams};

pub const ARENA_DATA_DIR: &str = "assets/data/arenas";

/// Contacts closer than this count as touching.
const CONTACT_EPSILON: f32 = 0.01;

/// One spawn parameter as written in an arena file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub enum ParamSpec {
    Bool(bool),
    Int(i64),
    Float(f32),
    Point((f32, f32)),
    Rect(Bounds),
    Path(Vec<(f32, f32)>),
    Facing(Facing),
}

impl From<&ParamSpec> for ParamValue {
    fn from(spec: &ParamSpec) -> Self {
        let point = |(x, y): (f32, f32)| Vec2::new(x, y);
        match spec {
            ParamSpec::Bool(value) => ParamValue::Bool(*value),
            ParamSpec::Int(value) => ParamValue::Int(*value),
            ParamSpec::Float(value) => ParamValue::Float(*value),
            ParamSpec::Point(value) => ParamValue::Point(point(*value)),
            ParamSpec::Rect(value) => ParamValue::Rect(*value),
            ParamSpec::Path(points) => ParamValue::Path(points.iter().copied().map(point).collect()),
            ParamSpec::Facing(value) => ParamValue::Facing(*value),
        }
    }
}

/// A boss to place when the arena loads.
#[derive(Deserialize, Clone, Debug)]
pub struct BossPlacement {
    pub kind: BossKind,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub params: BTreeMap<String, ParamSpec>,
}

/// Arena definition loaded from RON file.
#[derive(Resource, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ArenaLayout {
    pub name: String,
    pub room: Bounds,
    /// Solid blocks inside the room. Exposed to bosses as `wall_<n>`.
    pub walls: Vec<Bounds>,
    pub gravity: f32,
    pub target_start: (f32, f32),
    pub target_size: (f32, f32),
    pub bosses: Vec<BossPlacement>,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            name: "empty".to_string(),
            room: Bounds::new(0.0, 0.0, 32.0, 18.0),
            walls: Vec::new(),
            gravity: 30.0,
            target_start: (4.0, 0.0),
            target_size: (1.0, 1.5),
            bosses: Vec::new(),
        }
    }
}

impl ArenaLayout {
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let contents = crate::bosses::read_data_file(path)?;
        Self::parse(&contents, &path.display().to_string())
    }

    pub fn parse(contents: &str, path: &str) -> Result<Self, DataLoadError> {
        crate::bosses::parse_ron(contents, path)
    }

    pub fn floor(&self) -> f32 {
        self.room.bottom()
    }

    pub fn target_bounds(&self) -> Bounds {
        let (x, y) = self.target_start;
        let (width, height) = self.target_size;
        Bounds::new(x - width / 2.0, y, width, height)
    }

    /// Parameters for `placement`: the room, every wall, the seed and then
    /// the placement's own entries, which win on conflicts.
    pub fn spawn_params(&self, placement: &BossPlacement) -> SpawnParams {
        let mut params = SpawnParams::new().with("room", self.room);
        for (i, wall) in self.walls.iter().enumerate() {
            params.insert(format!("wall_{}", i + 1), *wall);
        }
        if let Some(seed) = placement.seed {
            params.insert("seed", seed as i64);
        }
        for (key, spec) in &placement.params {
            params.insert(key.clone(), ParamValue::from(spec));
        }
        params
    }

    /// Contact flags for a body at its current position.
    pub fn sense(&self, bounds: &Bounds) -> SensorSet {
        let room = &self.room;
        let mut sensors = SensorSet::default();

        let spans_x = |wall: &Bounds| bounds.left() < wall.right() && bounds.right() > wall.left();
        let spans_y = |wall: &Bounds| bounds.bottom() < wall.top() && bounds.top() > wall.bottom();
        let near = |a: f32, b: f32| (a - b).abs() <= CONTACT_EPSILON;

        let feet = bounds.bottom() <= room.bottom() + CONTACT_EPSILON
            || self.walls.iter().any(|w| spans_x(w) && near(bounds.bottom(), w.top()));
        let head = bounds.top() >= room.top() - CONTACT_EPSILON
            || self.walls.iter().any(|w| spans_x(w) && near(bounds.top(), w.bottom()));
        let left = bounds.left() <= room.left() + CONTACT_EPSILON
            || self.walls.iter().any(|w| spans_y(w) && near(bounds.left(), w.right()));
        let right = bounds.right() >= room.right() - CONTACT_EPSILON
            || self.walls.iter().any(|w| spans_y(w) && near(bounds.right(), w.left()));

        sensors.set(SensorSet::FEET_ON_GROUND, feet);
        sensors.set(SensorSet::HEAD_TOUCHING_BLOCK, head);
        sensors.set(SensorSet::SIDE_TOUCHING_BLOCK_LEFT, left);
        sensors.set(SensorSet::SIDE_TOUCHING_BLOCK_RIGHT, right);
        sensors
    }

    /// Moves `body` by its velocity, keeping it inside the room and out of walls.
    pub fn integrate(&self, body: &mut Body, dt: f32) {
        if body.gravity_on {
            body.velocity.y -= self.gravity * dt;
        }
        body.center += body.velocity * dt;

        for wall in &self.walls {
            let bounds = body.bounds();
            if !bounds.overlaps(wall) {
                continue;
            }
            let push_left = wall.left() - bounds.right();
            let push_right = wall.right() - bounds.left();
            let push_down = wall.bottom() - bounds.top();
            let push_up = wall.top() - bounds.bottom();
            let dx = if push_right.abs() < push_left.abs() { push_right } else { push_left };
            let dy = if push_up.abs() < push_down.abs() { push_up } else { push_down };
            if dx.abs() < dy.abs() {
                body.center.x += dx;
                body.velocity.x = 0.0;
            } else {
                body.center.y += dy;
                body.velocity.y = 0.0;
            }
        }

        let half = body.size / 2.0;
        let room = &self.room;
        let clamped = Vec2::new(
            body.center.x.clamp(room.left() + half.x, (room.right() - half.x).max(room.left() + half.x)),
            body.center.y.clamp(room.bottom() + half.y, (room.top() - half.y).max(room.bottom() + half.y)),
        );
        if clamped.x != body.center.x {
            body.velocity.x = 0.0;
        }
        if clamped.y != body.center.y {
            body.velocity.y = 0.0;
        }
        body.center = clamped;
    }
}

/// Which arena file to load on entering the fight.
#[derive(Resource, Debug, Clone)]
pub struct ArenaSelection(pub String);

impl Default for ArenaSelection {
    fn default() -> Self {
        Self("bospider_lair".to_string())
    }
}

/// Marker for the entity bosses fight.
#[derive(Component, Debug, Default)]
pub struct Target;

/// The target's physical state. Its bounds double as its hurtbox.
#[derive(Component, Debug, Clone, Copy)]
pub struct TargetBody {
    pub body: Body,
    pub stun: f32,
}

impl TargetBody {
    pub fn new(bounds: Bounds) -> Self {
        let mut body = Body::sized(bounds.size());
        body.center = bounds.center();
        body.gravity_on = true;
        Self { body, stun: 0.0 }
    }

    pub fn bounds(&self) -> Bounds {
        self.body.bounds()
    }

    pub fn is_grounded(&self) -> bool {
        self.body.is_sensing(SensorSet::FEET_ON_GROUND)
    }

    pub fn is_stunned(&self) -> bool {
        self.stun > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ArenaLayout {
        ArenaLayout {
            walls: vec![Bounds::new(10.0, 0.0, 2.0, 4.0)],
            ..default()
        }
    }

    #[test]
    fn falling_bodies_land_on_the_floor() {
        let arena = layout();
        let mut body = Body::sized(Vec2::new(1.0, 2.0));
        body.center = Vec2::new(4.0, 5.0);
        body.gravity_on = true;

        for _ in 0..120 {
            arena.integrate(&mut body, 1.0 / 60.0);
        }

        assert_eq!(body.bottom(), 0.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(arena.sense(&body.bounds()).contains(SensorSet::FEET_ON_GROUND));
    }

    #[test]
    fn walls_push_bodies_out_and_report_contact() {
        let arena = layout();
        let mut body = Body::sized(Vec2::new(1.0, 2.0));
        body.center = Vec2::new(9.0, 1.0);
        body.velocity = Vec2::new(10.0, 0.0);

        arena.integrate(&mut body, 0.1);

        assert_eq!(body.right(), 10.0);
        assert_eq!(body.velocity.x, 0.0);
        let sensors = arena.sense(&body.bounds());
        assert!(sensors.contains(SensorSet::SIDE_TOUCHING_BLOCK_RIGHT));
        assert!(!sensors.contains(SensorSet::SIDE_TOUCHING_BLOCK_LEFT));
    }

    #[test]
    fn bodies_can_stand_on_walls() {
        let arena = layout();
        let bounds = Bounds::new(10.5, 4.0, 1.0, 2.0);
        let sensors = arena.sense(&bounds);
        assert!(sensors.contains(SensorSet::FEET_ON_GROUND));
        assert!(!sensors.contains(SensorSet::HEAD_TOUCHING_BLOCK));
    }

    #[test]
    fn placements_become_spawn_params() {
        let arena: ArenaLayout = ArenaLayout::parse(
            r#"(
                name: "test",
                walls: [(x: 1.0, y: 0.0, width: 1.0, height: 3.0)],
                bosses: [(
                    kind: GutsTank,
                    seed: Some(7),
                    params: {
                        "front": Rect((x: 2.0, y: 0.0, width: 1.0, height: 1.0)),
                        "fly_1": Rect((x: 3.0, y: 4.0, width: 1.0, height: 1.0)),
                        "anchor": Point((3.0, 4.0)),
                        "path_1": Path([(0.0, 0.0), (0.0, 5.0)]),
                    },
                )],
            )"#,
            "test.ron",
        )
        .unwrap();

        let params = arena.spawn_params(&arena.bosses[0]);
        assert_eq!(params.rect("room"), Some(arena.room));
        assert_eq!(params.rect("wall_1"), Some(Bounds::new(1.0, 0.0, 1.0, 3.0)));
        assert_eq!(params.rect("fly_1").map(|r| r.center()), Some(Vec2::new(3.5, 4.5)));
        assert_eq!(params.point("anchor"), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(params.path("path_1").map(|p| p.len()), Some(2));
        assert_eq!(params.seed(), Some(7));
        assert_eq!(arena.gravity, ArenaLayout::default().gravity);
    }
}
