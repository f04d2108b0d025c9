//! Damage negotiation: how much a given attacker hurts a given actor.
//!
//! A boss carries a base table and per-instance overrides. Lookups that hit
//! neither yield 0, so a new projectile type does nothing until someone
//! decides what it should do.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::core::Element;

/// Identifies a boss actor for ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActorId(pub u64);

/// Handle to a child inside its owner's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildHandle {
    pub owner: ActorId,
    pub index: u32,
    pub generation: u32,
}

/// Attack categories bosses negotiate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum AttackerKind {
    Bullet,
    ChargedShot,
    ChargedShotExplosion,
    Fireball,
    MagmaWave,
    MagmaFlame,
    MoonScythe,
    SmallIceCube,
    Axe,
    PurpleBlast,
    Orb,
}

impl AttackerKind {
    pub fn element(self) -> Element {
        match self {
            AttackerKind::Fireball | AttackerKind::MagmaWave | AttackerKind::MagmaFlame => Element::Fire,
            AttackerKind::SmallIceCube => Element::Ice,
            _ => Element::Physical,
        }
    }

    /// Explosions and flames linger in place rather than travel.
    pub fn is_projectile(self) -> bool {
        !matches!(self, AttackerKind::ChargedShotExplosion | AttackerKind::MagmaFlame)
    }
}

/// Who launched an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttackOwner {
    #[default]
    Player,
    Actor(ActorId),
    Child(ChildHandle),
    Environment,
}

/// One incoming attack as seen by the damage subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attacker {
    pub kind: AttackerKind,
    pub element: Element,
    pub fully_charged: bool,
    pub owner: AttackOwner,
}

impl Attacker {
    pub fn new(kind: AttackerKind) -> Self {
        Self {
            kind,
            element: kind.element(),
            fully_charged: false,
            owner: AttackOwner::Player,
        }
    }

    pub fn charged(mut self, fully_charged: bool) -> Self {
        self.fully_charged = fully_charged;
        self
    }

    pub fn owned_by(mut self, owner: AttackOwner) -> Self {
        self.owner = owner;
        self
    }

    pub fn is_projectile(&self) -> bool {
        self.kind.is_projectile()
    }

    /// True when `actor` or one of its children launched this attack.
    pub fn is_owned_by(&self, actor: ActorId) -> bool {
        match self.owner {
            AttackOwner::Actor(id) => id == actor,
            AttackOwner::Child(handle) => handle.owner == actor,
            _ => false,
        }
    }
}

/// Damage for one attacker category.
#[derive(Clone, Copy)]
pub enum Damage {
    Fixed(i32),
    /// Depends on whether the shot was fully charged.
    Charged { partial: i32, full: i32 },
    /// Applies only to attacks the player launched.
    FromPlayer(i32),
    /// Computed from the attacker.
    Derived(fn(&Attacker) -> i32),
}

impl fmt::Debug for Damage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Damage::Fixed(points) => f.debug_tuple("Fixed").field(points).finish(),
            Damage::Charged { partial, full } => f
                .debug_struct("Charged")
                .field("partial", partial)
                .field("full", full)
                .finish(),
            Damage::FromPlayer(points) => f.debug_tuple("FromPlayer").field(points).finish(),
            Damage::Derived(_) => f.write_str("Derived"),
        }
    }
}

impl Damage {
    pub fn resolve(&self, attacker: &Attacker) -> i32 {
        match *self {
            Damage::Fixed(points) => points,
            Damage::Charged { partial, full } => {
                if attacker.fully_charged {
                    full
                } else {
                    partial
                }
            }
            Damage::FromPlayer(points) => {
                if attacker.owner == AttackOwner::Player {
                    points
                } else {
                    0
                }
            }
            Damage::Derived(derive) => derive(attacker),
        }
    }
}

/// Data-file form of [`Damage`].
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum DamageSpec {
    Fixed(i32),
    Charged { partial: i32, full: i32 },
    FromPlayer(i32),
}

impl From<DamageSpec> for Damage {
    fn from(spec: DamageSpec) -> Self {
        match spec {
            DamageSpec::Fixed(points) => Damage::Fixed(points),
            DamageSpec::Charged { partial, full } => Damage::Charged { partial, full },
            DamageSpec::FromPlayer(points) => Damage::FromPlayer(points),
        }
    }
}

/// Attacker category to damage.
#[derive(Debug, Clone, Default)]
pub struct DamageTable {
    entries: HashMap<AttackerKind, Damage>,
}

impl DamageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: AttackerKind, damage: Damage) -> Self {
        self.entries.insert(kind, damage);
        self
    }

    pub fn insert(&mut self, kind: AttackerKind, damage: Damage) {
        self.entries.insert(kind, damage);
    }

    pub fn get(&self, kind: AttackerKind) -> Option<&Damage> {
        self.entries.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// What most bosses take from the player's arsenal.
    pub fn standard_boss() -> Self {
        Self::new()
            .with(AttackerKind::Bullet, Damage::Fixed(1))
            .with(AttackerKind::Fireball, Damage::Fixed(1))
            .with(AttackerKind::ChargedShot, Damage::Charged { partial: 1, full: 2 })
            .with(AttackerKind::ChargedShotExplosion, Damage::Charged { partial: 1, full: 2 })
            .with(AttackerKind::MoonScythe, Damage::Fixed(1))
            .with(AttackerKind::SmallIceCube, Damage::Fixed(1))
    }
}

impl FromIterator<(AttackerKind, Damage)> for DamageTable {
    fn from_iter<I: IntoIterator<Item = (AttackerKind, Damage)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Base table plus overrides that win for the lifetime of the instance.
#[derive(Debug, Clone, Default)]
pub struct DamageNegotiator {
    base: DamageTable,
    overrides: DamageTable,
}

impl DamageNegotiator {
    pub fn new(base: DamageTable) -> Self {
        Self {
            base,
            overrides: DamageTable::new(),
        }
    }

    pub fn with_override(mut self, kind: AttackerKind, damage: Damage) -> Self {
        self.set_override(kind, damage);
        self
    }

    pub fn set_override(&mut self, kind: AttackerKind, damage: Damage) {
        self.overrides.insert(kind, damage);
    }

    /// Damage `attacker` should deal; 0 for unknown categories.
    pub fn negotiate(&self, attacker: &Attacker) -> i32 {
        self.overrides
            .get(attacker.kind)
            .or_else(|| self.base.get(attacker.kind))
            .map_or(0, |damage| damage.resolve(attacker).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_deals_nothing() {
        let negotiator = DamageNegotiator::new(DamageTable::standard_boss());
        assert_eq!(negotiator.negotiate(&Attacker::new(AttackerKind::PurpleBlast)), 0);
    }

    #[test]
    fn charged_damage_depends_on_charge() {
        let negotiator = DamageNegotiator::new(DamageTable::standard_boss());
        let shot = Attacker::new(AttackerKind::ChargedShot);
        assert_eq!(negotiator.negotiate(&shot), 1);
        assert_eq!(negotiator.negotiate(&shot.charged(true)), 2);
    }

    #[test]
    fn override_beats_base_entry() {
        let negotiator = DamageNegotiator::new(DamageTable::standard_boss())
            .with_override(AttackerKind::Fireball, Damage::Fixed(4));
        assert_eq!(negotiator.negotiate(&Attacker::new(AttackerKind::Fireball)), 4);
        assert_eq!(negotiator.negotiate(&Attacker::new(AttackerKind::Bullet)), 1);
    }

    #[test]
    fn player_only_damage_ignores_other_owners() {
        let negotiator = DamageNegotiator::new(
            DamageTable::new().with(AttackerKind::Bullet, Damage::FromPlayer(1)),
        );
        let bullet = Attacker::new(AttackerKind::Bullet);
        assert_eq!(negotiator.negotiate(&bullet), 1);
        assert_eq!(
            negotiator.negotiate(&bullet.owned_by(AttackOwner::Environment)),
            0
        );
    }

    #[test]
    fn derived_damage_reads_the_attacker() {
        fn double_if_icy(attacker: &Attacker) -> i32 {
            if attacker.element == Element::Ice {
                2
            } else {
                1
            }
        }
        let negotiator =
            DamageNegotiator::new(DamageTable::new().with(AttackerKind::SmallIceCube, Damage::Derived(double_if_icy)));
        assert_eq!(negotiator.negotiate(&Attacker::new(AttackerKind::SmallIceCube)), 2);
    }

    #[test]
    fn ownership_covers_children() {
        let boss = ActorId(7);
        let child = ChildHandle {
            owner: boss,
            index: 0,
            generation: 1,
        };
        let orb = Attacker::new(AttackerKind::Orb).owned_by(AttackOwner::Child(child));
        assert!(orb.is_owned_by(boss));
        assert!(!orb.is_owned_by(ActorId(8)));
    }
}
