//! Requests a boss queues during its tick for the engine layer to carry out.

use bevy::prelude::*;

use super::children::{ChildActor, ChildKind};
use crate::combat::ChildHandle;
use crate::core::{EffectKind, SoundCue};

/// Lifecycle milestones the rest of the game may listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossNotice {
    Spawned,
    Ready,
    Defeated,
    Dead,
}

#[derive(Debug)]
pub enum ActorCommand {
    SpawnChild { handle: ChildHandle, kind: ChildKind },
    /// The child left the registry. Its fixtures are already off.
    ReleaseChild(Box<ChildActor>),
    PlaySound(SoundCue),
    Effect {
        effect: EffectKind,
        position: Vec2,
        velocity: Vec2,
    },
    ShakeRoom {
        duration: f32,
        interval: f32,
        intensity: Vec2,
    },
    StunTarget,
    Notice(BossNotice),
}

/// Queue of commands, drained once per tick.
#[derive(Debug, Default)]
pub struct Outbox(Vec<ActorCommand>);

impl Outbox {
    pub fn push(&mut self, command: ActorCommand) {
        self.0.push(command);
    }

    pub fn drain(&mut self) -> Vec<ActorCommand> {
        std::mem::take(&mut self.0)
    }
}
