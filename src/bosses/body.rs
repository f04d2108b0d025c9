//! The physical half of an actor as the movement collaborator sees it.
//!
//! The collaborator writes sensor flags before a tick and reads the
//! velocity afterwards; bosses never integrate motion themselves.

use bevy::prelude::*;
use bitflags::bitflags;

use crate::world::{Bounds, Facing};

bitflags! {
    /// Discrete contacts reported by the movement collaborator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SensorSet: u8 {
        const FEET_ON_GROUND           = 1 << 0;
        const HEAD_TOUCHING_BLOCK      = 1 << 1;
        const SIDE_TOUCHING_BLOCK_LEFT  = 1 << 2;
        const SIDE_TOUCHING_BLOCK_RIGHT = 1 << 3;
    }
}

/// Position, size, velocity and sensors of an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub center: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub gravity_on: bool,
    pub facing: Facing,
    pub sensors: SensorSet,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            size: Vec2::ONE,
            velocity: Vec2::ZERO,
            gravity_on: false,
            facing: Facing::Left,
            sensors: SensorSet::default(),
        }
    }
}

impl Body {
    pub fn sized(size: Vec2) -> Self {
        Self { size, ..default() }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_center(self.center, self.size)
    }

    pub fn is_sensing(&self, sense: SensorSet) -> bool {
        self.sensors.contains(sense)
    }

    pub fn is_touching_side_block(&self) -> bool {
        self.sensors
            .intersects(SensorSet::SIDE_TOUCHING_BLOCK_LEFT | SensorSet::SIDE_TOUCHING_BLOCK_RIGHT)
    }

    /// Touching a wall on the side the body faces.
    pub fn is_blocked_ahead(&self) -> bool {
        match self.facing {
            Facing::Left => self.is_sensing(SensorSet::SIDE_TOUCHING_BLOCK_LEFT),
            Facing::Right => self.is_sensing(SensorSet::SIDE_TOUCHING_BLOCK_RIGHT),
        }
    }

    pub fn set_bottom_center(&mut self, point: Vec2) {
        self.center = Vec2::new(point.x, point.y + self.size.y / 2.0);
    }

    pub fn set_bottom_left(&mut self, point: Vec2) {
        self.center = point + self.size / 2.0;
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.size.x / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.size.x / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.size.y / 2.0
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.size.y / 2.0
    }

    /// Velocity of magnitude `speed` toward `target`, zero when already there.
    pub fn velocity_toward(&self, target: Vec2, speed: f32) -> Vec2 {
        (target - self.center).normalize_or_zero() * speed
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Heads for `target` at `speed`. When the target is reachable within this
    /// step the velocity lands exactly on it and `true` is returned.
    pub fn steer_to(&mut self, target: Vec2, speed: f32, dt: f32) -> bool {
        let offset = target - self.center;
        let distance = offset.length();
        if distance <= ARRIVAL_EPSILON || distance <= speed * dt {
            self.velocity = if dt > 0.0 { offset / dt } else { Vec2::ZERO };
            return true;
        }
        self.velocity = offset / distance * speed;
        false
    }
}

/// Distance under which a body counts as having reached a point.
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// Launch velocity with vertical speed `impulse_y` that lands on `to` under
/// `gravity` (a positive downward acceleration).
pub fn jump_impulse(from: Vec2, to: Vec2, impulse_y: f32, gravity: f32) -> Vec2 {
    let delta = to - from;
    let flight = if gravity > 0.0 {
        let discriminant = impulse_y * impulse_y - 2.0 * gravity * delta.y;
        if discriminant >= 0.0 {
            (impulse_y + discriminant.sqrt()) / gravity
        } else {
            impulse_y / gravity
        }
    } else {
        1.0
    };
    Vec2::new(delta.x / flight.max(f32::EPSILON), impulse_y)
}
