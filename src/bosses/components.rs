//! Boss-related components, resources and events.

use std::collections::HashMap;

use bevy::prelude::*;

use super::actor::BossDriver;
use super::children::ChildKind;
use super::error::SpawnError;
use super::params::SpawnParams;
use super::roster::BossKind;
use crate::combat::{ActorId, ChildHandle};

/// A boss entity. The driver owns every bit of behavior; the entity only
/// carries it through the schedule.
#[derive(Component)]
pub struct Boss {
    pub driver: Box<dyn BossDriver>,
}

impl Boss {
    pub fn new(driver: Box<dyn BossDriver>) -> Self {
        Self { driver }
    }
}

/// Entity standing in for one child owned by a boss.
#[derive(Component, Debug, Clone, Copy)]
pub struct ChildMirror {
    pub owner: Entity,
    pub handle: ChildHandle,
    pub kind: ChildKind,
}

/// Hands out actor ids. Ids are never reused within a run.
#[derive(Resource, Debug, Default)]
pub struct ActorIdAllocator {
    next: u64,
}

impl ActorIdAllocator {
    pub fn allocate(&mut self) -> ActorId {
        self.next += 1;
        ActorId(self.next)
    }
}

/// Mirror entity of every live child.
#[derive(Resource, Debug, Default)]
pub struct ChildEntities(pub HashMap<ChildHandle, Entity>);

/// Request to build and place a boss.
#[derive(Event, Debug, Clone)]
pub struct SpawnBoss {
    pub kind: BossKind,
    pub params: SpawnParams,
}

/// A [`SpawnBoss`] request that produced no boss.
#[derive(Event, Debug, Clone)]
pub struct BossSpawnFailed {
    pub kind: BossKind,
    pub error: SpawnError,
}
