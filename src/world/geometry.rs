//! Axis-aligned geometry shared by bodies, fixtures and arena markers.
//!
//! All coordinates are in world units with y growing upward, so a
//! rectangle is anchored at its bottom-left corner.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

/// Horizontal facing. Shapes are authored facing right and mirrored when facing left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing that points from `from` toward `to` along x.
    pub fn toward(from: f32, to: f32) -> Self {
        if to < from {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// Axis-aligned rectangle anchored at its bottom-left corner.
///
/// Authored in data as `(x, y, width, height)` and held as a [`Rect`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "BoundsDef")]
pub struct Bounds(pub Rect);

#[derive(Deserialize)]
struct BoundsDef {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl From<BoundsDef> for Bounds {
    fn from(def: BoundsDef) -> Self {
        Self::new(def.x, def.y, def.width, def.height)
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self(rect)
    }
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self(Rect::from_corners(Vec2::new(x, y), Vec2::new(x + width, y + height)))
    }

    /// Rectangle of `size` centered on `center`.
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self(Rect::from_center_size(center, size))
    }

    pub fn left(&self) -> f32 {
        self.0.min.x
    }

    pub fn right(&self) -> f32 {
        self.0.max.x
    }

    pub fn bottom(&self) -> f32 {
        self.0.min.y
    }

    pub fn top(&self) -> f32 {
        self.0.max.y
    }

    pub fn width(&self) -> f32 {
        self.0.width()
    }

    pub fn height(&self) -> f32 {
        self.0.height()
    }

    pub fn size(&self) -> Vec2 {
        self.0.size()
    }

    pub fn center(&self) -> Vec2 {
        self.0.center()
    }

    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.0.center().x, self.0.min.y)
    }

    pub fn bottom_left(&self) -> Vec2 {
        self.0.min
    }

    /// Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        !self.0.intersect(other.0).is_empty()
    }

    /// Edges count as inside.
    pub fn contains(&self, point: Vec2) -> bool {
        self.0.contains(point)
    }

    /// Whether a circle at `center` with `radius` reaches into the rectangle.
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.0.min, self.0.max);
        closest.distance_squared(center) < radius * radius
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self(Rect::from_corners(self.0.min + offset, self.0.max + offset))
    }

    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        let Rect { min, max } = self.0;
        let x = if max.x > min.x { rng.gen_range(min.x..max.x) } else { min.x };
        let y = if max.y > min.y { rng.gen_range(min.y..max.y) } else { min.y };
        Vec2::new(x, y)
    }
}
