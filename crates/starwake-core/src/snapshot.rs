//! Read-only world snapshots for the presentation layer.
//!
//! A [`WorldSnapshot`] is a plain-data copy of everything a renderer or HUD
//! needs, taken between ticks. It holds no references into the arena, so it
//! can be serialized, diffed, or sent across a thread boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::entity::{Entity, EntityId, EntityInner, EntityTag, StatusFlags, TravelPhase};

/// One entity as seen from outside the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Handle.
    pub id: EntityId,
    /// Vessel or installation.
    pub tag: EntityTag,
    /// World position.
    pub position: Vec2,
    /// Heading in radians; zero for installations.
    pub rotation: f32,
    /// Linear velocity; zero for installations.
    pub velocity: Vec2,
    /// Current hull.
    pub hull: f32,
    /// Maximum hull.
    pub hull_max: f32,
    /// Current shield, zero when none is fitted.
    pub shield: f32,
    /// Remaining fuel; `None` for installations.
    pub fuel: Option<f32>,
    /// FTL state; `None` for installations.
    pub travel: Option<TravelPhase>,
    /// Status flags.
    pub status: StatusFlags,
    /// Selected target.
    pub target: Option<EntityId>,
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        let combat = entity.combat();
        let (rotation, velocity, fuel, travel) = match entity.inner() {
            EntityInner::Vessel(v) => (
                v.kinematics.rotation,
                v.kinematics.velocity,
                Some(v.fuel),
                Some(v.kinematics.travel),
            ),
            EntityInner::Installation(_) => (0.0, Vec2::ZERO, None, None),
        };

        Self {
            id: entity.id(),
            tag: entity.tag(),
            position: entity.position(),
            rotation,
            velocity,
            hull: combat.hull,
            hull_max: combat.hull_max,
            shield: combat.shield_current(),
            fuel,
            travel,
            status: combat.status,
            target: combat.target,
        }
    }
}

/// Every entity at one tick, in ID order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// Entities in ID order.
    pub entities: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    /// Captures the arena.
    #[must_use]
    pub fn capture(arena: &Arena) -> Self {
        Self {
            tick: arena.current_tick(),
            entities: arena.entities_sorted().map(EntitySnapshot::from).collect(),
        }
    }

    /// Looks up one entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }
}
