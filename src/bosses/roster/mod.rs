//! The bosses this crate ships and the factory that builds them.

mod bospider;
mod guts_tank;
mod inferno_man;
mod timber_woman;

pub use bospider::{Bospider, BospiderState, BospiderTuning, BospiderVars};
pub use guts_tank::{GutsTank, GutsTankState, GutsTankTuning, GutsTankVars, TankAttack};
pub use inferno_man::{
    InfernoMan, InfernoManState, InfernoManTuning, InfernoManVars, PendingMeteor, ShootMethod, ShotCue,
};
pub use timber_woman::{TimberWoman, TimberWomanState, TimberWomanTuning, TimberWomanVars};

use serde::Deserialize;

use super::actor::{BossActor, BossDriver};
use super::data::BossRegistry;
use crate::combat::ActorId;
use crate::core::ConfigError;

/// Every boss the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum BossKind {
    Bospider,
    InfernoMan,
    TimberWoman,
    GutsTank,
}

impl BossKind {
    pub const ALL: [BossKind; 4] = [
        BossKind::Bospider,
        BossKind::InfernoMan,
        BossKind::TimberWoman,
        BossKind::GutsTank,
    ];

    /// Name of the tuning file under `assets/data/bosses/`, without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            BossKind::Bospider => "bospider",
            BossKind::InfernoMan => "inferno_man",
            BossKind::TimberWoman => "timber_woman",
            BossKind::GutsTank => "guts_tank",
        }
    }

    pub fn from_file_stem(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.file_stem() == stem)
    }
}

/// Builds a boss of `kind` with the tuning currently in `registry`.
pub fn create(kind: BossKind, registry: &BossRegistry, id: ActorId) -> Result<Box<dyn BossDriver>, ConfigError> {
    let driver: Box<dyn BossDriver> = match kind {
        BossKind::Bospider => Box::new(BossActor::new(Bospider::new(registry.bospider.clone()), id)?),
        BossKind::InfernoMan => Box::new(BossActor::new(InfernoMan::new(registry.inferno_man), id)?),
        BossKind::TimberWoman => Box::new(BossActor::new(TimberWoman::new(registry.timber_woman), id)?),
        BossKind::GutsTank => Box::new(BossActor::new(GutsTank::new(registry.guts_tank), id)?),
    };
    Ok(driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Lifecycle;

    #[test]
    fn every_kind_builds() {
        let registry = BossRegistry::default();
        for (i, kind) in BossKind::ALL.into_iter().enumerate() {
            let boss = create(kind, &registry, ActorId(i as u64)).unwrap();
            assert_eq!(boss.kind(), kind);
            assert_eq!(boss.lifecycle(), Lifecycle::Unspawned);
            assert_eq!(BossKind::from_file_stem(kind.file_stem()), Some(kind));
        }
    }
}
