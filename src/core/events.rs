//! Global events used for cross-system communication.
//!
//! Bosses never call into audio, effects or the camera directly. They queue
//! requests during their tick and the engine layer turns them into these
//! events, so any listener (or none) can act on them.

use bevy::prelude::*;
use serde::Deserialize;

use crate::bosses::BossKind;

/// Element carried by an attack. Fire burns and ice freezes some bosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum Element {
    #[default]
    Physical,
    Fire,
    Ice,
}

/// Sent when a boss (or one of its children) hits the target.
///
/// The target's own health system decides what to do with it.
#[derive(Event, Debug)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Boss entity that owns the hitting fixture
    pub source: Entity,
    /// Damage before any resistances
    pub amount: i32,
    pub element: Element,
}

/// A boss finished its intro and started fighting.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossReady {
    pub entity: Entity,
    pub kind: BossKind,
}

/// A boss ran out of health and started its defeat sequence.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDefeated {
    pub entity: Entity,
    pub kind: BossKind,
}

/// A boss finished its defeat sequence and is gone.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDead {
    pub entity: Entity,
    pub kind: BossKind,
}

/// Named sound cues a boss can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Explosion,
    Defeat,
    AtomicFire,
    Quake,
    Brush,
    Blast,
    BassyBlast,
    ChillShoot,
    Burst,
}

/// Fire-and-forget sound request.
#[derive(Event, Debug, Clone, Copy)]
pub struct SoundRequest {
    pub cue: SoundCue,
    pub looping: bool,
}

/// Short-lived visuals that nobody owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Small blast played repeatedly during a defeat sequence.
    Explosion,
    /// Orb radiating outward when a boss dies.
    ExplosionOrb,
    /// Ice fragments when a frozen boss thaws.
    IceShard,
}

/// Fire-and-forget effect request.
#[derive(Event, Debug, Clone, Copy)]
pub struct EffectRequest {
    pub effect: EffectKind,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Camera shake request.
#[derive(Event, Debug, Clone, Copy)]
pub struct RoomShake {
    pub duration: f32,
    pub interval: f32,
    pub intensity: Vec2,
}

/// Asks the target to be stunned if it is standing on a surface.
#[derive(Event, Debug, Clone, Copy)]
pub struct StunTarget;
