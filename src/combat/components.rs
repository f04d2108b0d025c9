//! Combat-related components, events and feedback resources.

use bevy::prelude::*;

use super::damage::Attacker;
use super::fixtures::HitOutcome;
use crate::world::Bounds;

// Re-export from core to avoid duplication
pub use crate::core::{DamageEvent, Element};

/// Component for entities that can take damage.
///
/// Bosses mirror this into their [`HealthGauge`](crate::bosses::HealthGauge)
/// every frame; the combat layer is the only writer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub maximum: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            current: max,
            maximum: max,
        }
    }

    /// Removes up to `amount`, returning how much was actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current.max(0));
        self.current -= actual;
        actual
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.maximum - self.current);
        self.current += actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn percentage(&self) -> f32 {
        if self.maximum <= 0 {
            0.0
        } else {
            self.current as f32 / self.maximum as f32
        }
    }
}

/// Invincibility window after taking a hit.
#[derive(Component, Debug, Clone, Copy)]
pub struct DamageCooldown {
    pub duration: f32,
    pub remaining: f32,
}

impl Default for DamageCooldown {
    fn default() -> Self {
        Self::new(0.75)
    }
}

impl DamageCooldown {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    pub fn start(&mut self) {
        self.remaining = self.duration;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn tick(&mut self, delta: f32) {
        self.remaining = (self.remaining - delta).max(0.0);
    }
}

/// A shot in flight. Bosses see these in their world snapshot and may
/// dodge or swat them before they connect.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    pub attacker: Attacker,
    pub bounds: Bounds,
}

/// A player attack occupying `region` this frame.
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackEvent {
    pub attacker: Attacker,
    pub region: Bounds,
}

/// What an [`AttackEvent`] did to a boss.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BossHit {
    pub boss: Entity,
    pub outcome: HitOutcome,
    /// Health actually removed. Zero for blocks, vetoed hits and child hits.
    pub damage: i32,
    /// The hit landed on one of the boss's children rather than the boss.
    pub on_child: bool,
}

/// Room shake driven by [`RoomShake`](crate::core::RoomShake) requests.
#[derive(Resource, Default, Debug)]
pub struct ScreenShake {
    pub intensity: Vec2,
    pub interval: f32,
    pub timer: f32,
    pub offset: Vec2,
    since_jolt: f32,
}

impl ScreenShake {
    pub fn shake(&mut self, duration: f32, interval: f32, intensity: Vec2) {
        // Only override if new shake is stronger
        if intensity.length_squared() >= self.intensity.length_squared() || self.timer <= 0.0 {
            self.intensity = intensity;
            self.interval = interval;
            self.timer = duration;
            self.since_jolt = interval;
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer > 0.0
    }

    /// Advances the shake, picking a new offset every `interval`.
    pub fn update(&mut self, delta: f32) -> Vec2 {
        if self.timer <= 0.0 {
            self.offset = Vec2::ZERO;
            return self.offset;
        }

        self.timer -= delta;
        self.since_jolt += delta;
        if self.since_jolt >= self.interval {
            self.since_jolt = 0.0;
            let x = (rand::random::<f32>() - 0.5) * 2.0 * self.intensity.x;
            let y = (rand::random::<f32>() - 0.5) * 2.0 * self.intensity.y;
            self.offset = Vec2::new(x, y);
        }
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_never_goes_below_zero() {
        let mut health = Health::new(3);
        assert_eq!(health.take_damage(5), 3);
        assert!(health.is_dead());
        assert_eq!(health.take_damage(1), 0);
        assert_eq!(health.heal(10), 3);
    }

    #[test]
    fn cooldown_runs_out() {
        let mut cooldown = DamageCooldown::new(0.5);
        assert!(!cooldown.is_active());
        cooldown.start();
        cooldown.tick(0.3);
        assert!(cooldown.is_active());
        cooldown.tick(0.3);
        assert!(!cooldown.is_active());
    }

    #[test]
    fn shake_stays_inside_its_intensity() {
        let mut shake = ScreenShake::default();
        shake.shake(0.5, 0.1, Vec2::new(0.001, 0.005));
        for _ in 0..4 {
            let offset = shake.update(0.1);
            assert!(offset.x.abs() <= 0.001 && offset.y.abs() <= 0.005);
        }
        shake.update(0.2);
        assert_eq!(shake.update(0.1), Vec2::ZERO);
        assert!(!shake.is_active());
    }
}
