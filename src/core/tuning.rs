//! Health-scaled tuning values and percentage chances.
//!
//! Bosses speed up, shorten their cadence or change their odds as they lose
//! health. Those curves live in data so balancing never touches the engine.

use serde::Deserialize;

/// Linear interpolation from `start` (t = 0) to `end` (t = 1).
pub fn interpolate(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// A value that moves linearly between its full-health and no-health settings.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Scaled {
    /// Value while the boss is at full health.
    pub full: f32,
    /// Value as the boss approaches zero health.
    pub empty: f32,
}

impl Scaled {
    pub const fn new(full: f32, empty: f32) -> Self {
        Self { full, empty }
    }

    pub const fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Value at `health_ratio` (clamped to `[0, 1]`).
    pub fn at(&self, health_ratio: f32) -> f32 {
        interpolate(self.empty, self.full, health_ratio.clamp(0.0, 1.0))
    }
}

/// A percentage chance, optionally growing as health is lost.
///
/// `percent = base + per_missing_health * (1 - health_ratio)`, clamped to
/// `[0, 100]`.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Chance {
    pub base: f32,
    #[serde(default)]
    pub per_missing_health: f32,
}

impl Chance {
    pub const fn flat(base: f32) -> Self {
        Self {
            base,
            per_missing_health: 0.0,
        }
    }

    pub fn percent(&self, health_ratio: f32) -> f32 {
        let missing = 1.0 - health_ratio.clamp(0.0, 1.0);
        (self.base + self.per_missing_health * missing).clamp(0.0, 100.0)
    }

    /// Whether a roll in `0..=100` passes at `health_ratio`.
    pub fn passes(&self, roll: u32, health_ratio: f32) -> bool {
        roll as f32 <= self.percent(health_ratio)
    }
}
