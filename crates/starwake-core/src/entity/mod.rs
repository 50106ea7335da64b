//! Entity module: handles and per-entity component storage.
//!
//! Every piece of simulation state belongs to exactly one entity and is
//! reached through its [`EntityId`] handle, never through a shared reference:
//! - [`EntityId`]: Stable handle into the [`Arena`](crate::arena::Arena)
//! - [`EntityTag`]: Kind of entity (mobile vessel or static installation)
//! - [`EntityInner`]: Type-safe storage for the kind-specific components
//! - [`Entity`]: The complete entity container
//!
//! # Example
//!
//! ```
//! use starwake_core::config::ShipClass;
//! use starwake_core::entity::{Entity, EntityId, EntityInner, EntityTag, VesselComponents};
//! use glam::Vec2;
//!
//! let vessel = Entity::new(
//!     EntityId::new(7),
//!     EntityInner::Vessel(VesselComponents::new(ShipClass::default(), Vec2::ZERO, 0.0)),
//! );
//!
//! assert_eq!(vessel.id().as_u64(), 7);
//! assert_eq!(vessel.tag(), EntityTag::Vessel);
//! ```

pub mod components;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    CombatState, ControlIntent, FactionId, InstallationComponents, KinematicState, Shield,
    StatusFlags, TravelPhase, VesselComponents, WeaponMount,
};

/// Handle of an entity inside an arena.
///
/// IDs are assigned monotonically by the arena and never reused, so a stale
/// handle to a despawned entity simply fails to resolve. Ordering follows the
/// numeric value and drives the deterministic iteration order of every tick.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an `EntityId` from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this handle.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Kind of entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Mobile ship driven by the movement simulator.
    Vessel,
    /// Static combat entity (station, turret platform, derelict).
    Installation,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vessel => write!(f, "Vessel"),
            Self::Installation => write!(f, "Installation"),
        }
    }
}

/// Kind-specific component storage.
///
/// The variant is the single source of truth for an entity's kind; the
/// [`EntityTag`] reported by [`Entity::tag`] is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Vessel components (kinematics, drive, combat).
    Vessel(VesselComponents),
    /// Installation components (fixed position, combat).
    Installation(InstallationComponents),
}

impl EntityInner {
    /// Returns the tag matching this variant.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Vessel(_) => EntityTag::Vessel,
            Self::Installation(_) => EntityTag::Installation,
        }
    }
}

/// A complete entity in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// Returns the entity's handle.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's kind.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns the kind-specific components.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns `true` if this entity is a vessel.
    #[must_use]
    pub const fn is_vessel(&self) -> bool {
        matches!(self.inner, EntityInner::Vessel(_))
    }

    /// Returns the vessel components, if this is a vessel.
    #[must_use]
    pub const fn as_vessel(&self) -> Option<&VesselComponents> {
        match &self.inner {
            EntityInner::Vessel(v) => Some(v),
            EntityInner::Installation(_) => None,
        }
    }

    /// Returns mutable vessel components, if this is a vessel.
    #[must_use]
    pub fn as_vessel_mut(&mut self) -> Option<&mut VesselComponents> {
        match &mut self.inner {
            EntityInner::Vessel(v) => Some(v),
            EntityInner::Installation(_) => None,
        }
    }

    /// Returns the installation components, if this is an installation.
    #[must_use]
    pub const fn as_installation(&self) -> Option<&InstallationComponents> {
        match &self.inner {
            EntityInner::Installation(i) => Some(i),
            EntityInner::Vessel(_) => None,
        }
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match &self.inner {
            EntityInner::Vessel(v) => v.kinematics.position,
            EntityInner::Installation(i) => i.position,
        }
    }

    /// Combat state; every entity kind carries one.
    #[must_use]
    pub const fn combat(&self) -> &CombatState {
        match &self.inner {
            EntityInner::Vessel(v) => &v.combat,
            EntityInner::Installation(i) => &i.combat,
        }
    }

    /// Mutable combat state.
    ///
    /// Only the combat resolver should call this during a tick.
    #[must_use]
    pub fn combat_mut(&mut self) -> &mut CombatState {
        match &mut self.inner {
            EntityInner::Vessel(v) => &mut v.combat,
            EntityInner::Installation(i) => &mut i.combat,
        }
    }

    /// Returns `true` if the entity has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.combat().is_destroyed()
    }

    /// Returns `true` for a vessel in FTL transit.
    #[must_use]
    pub fn is_in_transit(&self) -> bool {
        self.as_vessel().is_some_and(|v| v.kinematics.is_in_transit())
    }

    /// Live and in normal space: the only state weapons can reach.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        !self.is_destroyed() && !self.is_in_transit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipClass;

    fn vessel(id: u64) -> Entity {
        Entity::new(
            EntityId::new(id),
            EntityInner::Vessel(VesselComponents::new(
                ShipClass::default(),
                Vec2::new(1.0, 2.0),
                0.0,
            )),
        )
    }

    fn installation(id: u64) -> Entity {
        Entity::new(
            EntityId::new(id),
            EntityInner::Installation(InstallationComponents::new(
                Vec2::new(-5.0, 3.0),
                CombatState::new(500.0),
            )),
        )
    }

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ordering_follows_raw_value() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }

        #[test]
        fn formatting() {
            let id = EntityId::new(42);
            assert_eq!(format!("{id:?}"), "EntityId(42)");
            assert_eq!(format!("{id}"), "#42");
        }

        #[test]
        fn serialization_roundtrip() {
            let id = EntityId::new(12345);
            let json = serde_json::to_string(&id).unwrap();
            let back: EntityId = serde_json::from_str(&json).unwrap();
            assert_eq!(id, back);
        }
    }

    mod entity_tests {
        use super::*;

        #[test]
        fn tag_is_derived_from_inner() {
            assert_eq!(vessel(1).tag(), EntityTag::Vessel);
            assert_eq!(installation(2).tag(), EntityTag::Installation);
        }

        #[test]
        fn accessors_match_kind() {
            let mut v = vessel(1);
            assert!(v.is_vessel());
            assert!(v.as_vessel().is_some());
            assert!(v.as_vessel_mut().is_some());
            assert!(v.as_installation().is_none());

            let i = installation(2);
            assert!(!i.is_vessel());
            assert!(i.as_vessel().is_none());
            assert!(i.as_installation().is_some());
        }

        #[test]
        fn position_reads_from_either_kind() {
            assert_eq!(vessel(1).position(), Vec2::new(1.0, 2.0));
            assert_eq!(installation(2).position(), Vec2::new(-5.0, 3.0));
        }

        #[test]
        fn combat_state_reachable_for_both_kinds() {
            let mut i = installation(2);
            assert!((i.combat().hull - 500.0).abs() < f32::EPSILON);
            i.combat_mut().hull = 10.0;
            assert!((i.combat().hull - 10.0).abs() < f32::EPSILON);
            assert!(!i.is_destroyed());
        }

        #[test]
        fn display_tag() {
            assert_eq!(EntityTag::Vessel.to_string(), "Vessel");
            assert_eq!(EntityTag::Installation.to_string(), "Installation");
        }
    }
}
