//! Arena: owner of every entity in a sector.
//!
//! The arena stores entities in a `BTreeMap` keyed by [`EntityId`], so every
//! pass over the world visits entities in the same order on every run. All
//! other code reaches an entity through its handle; nothing holds a reference
//! across a tick.
//!
//! # Spatial index
//!
//! Positions are mirrored into a [`SpatialIndex`] for distance and radius
//! queries. The index is refreshed on spawn and by
//! [`Arena::sync_spatial`], which the simulation calls after the movement
//! phase. Code that moves an entity by hand must call
//! [`Arena::update_spatial`] before querying.
//!
//! # Example
//!
//! ```
//! use starwake_core::arena::Arena;
//! use starwake_core::config::ShipClass;
//! use starwake_core::entity::{CombatState, VesselComponents};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let a = arena.spawn_vessel(VesselComponents::new(ShipClass::default(), Vec2::ZERO, 0.0));
//! let b = arena.spawn_installation(Vec2::new(30.0, 40.0), CombatState::new(100.0));
//!
//! assert_eq!(arena.distance_between(a, b), Some(50.0));
//! assert_eq!(arena.spatial().query_radius(Vec2::ZERO, 10.0), vec![a]);
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{
    CombatState, Entity, EntityId, EntityInner, InstallationComponents, VesselComponents,
};

// =============================================================================
// Spatial Index
// =============================================================================

/// Position lookup for proximity queries.
///
/// A flat scan is enough for the entity counts of a single sector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: BTreeMap<EntityId, Vec2>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records or moves an entity.
    pub fn insert(&mut self, id: EntityId, pos: Vec2) {
        self.positions.insert(id, pos);
    }

    /// Forgets an entity.
    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Last recorded position of an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    /// Entities within `radius` of `center` (boundary inclusive), in ID order.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        self.positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Gravity wells
// =============================================================================

/// Region whose gravity disrupts an FTL charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityWell {
    /// Center of the well.
    pub center: Vec2,
    /// Radius of influence.
    pub radius: f32,
    /// Field strength inside the radius.
    pub strength: f32,
}

impl GravityWell {
    /// Creates a well.
    #[must_use]
    pub const fn new(center: Vec2, radius: f32, strength: f32) -> Self {
        Self {
            center,
            radius,
            strength,
        }
    }

    /// Whether `pos` lies inside the well.
    #[must_use]
    pub fn contains(&self, pos: Vec2) -> bool {
        self.center.distance_squared(pos) <= self.radius * self.radius
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Container of all entities and sector features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    spatial: SpatialIndex,
    gravity_wells: Vec<GravityWell>,
    tick: u64,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity and returns its handle.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, inner);
        self.spatial.insert(id, entity.position());
        self.entities.insert(id, entity);
        id
    }

    /// Adds a vessel.
    pub fn spawn_vessel(&mut self, vessel: VesselComponents) -> EntityId {
        self.spawn(EntityInner::Vessel(vessel))
    }

    /// Adds an installation.
    pub fn spawn_installation(&mut self, position: Vec2, combat: CombatState) -> EntityId {
        self.spawn(EntityInner::Installation(InstallationComponents::new(
            position, combat,
        )))
    }

    /// Removes an entity, returning it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Looks up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Looks up an entity mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Handles in ID order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Entities in ID order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Mutable entities in ID order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` when the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Current position of an entity.
    #[must_use]
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(Entity::position)
    }

    /// Distance between two entities, if both exist.
    #[must_use]
    pub fn distance_between(&self, a: EntityId, b: EntityId) -> Option<f32> {
        Some(self.position_of(a)?.distance(self.position_of(b)?))
    }

    /// The spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Refreshes one entity's indexed position.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(pos) = self.position_of(id) {
            self.spatial.insert(id, pos);
        }
    }

    /// Refreshes every indexed position.
    pub fn sync_spatial(&mut self) {
        for (id, entity) in &self.entities {
            self.spatial.insert(*id, entity.position());
        }
    }

    /// Adds a gravity well to the sector.
    pub fn add_gravity_well(&mut self, well: GravityWell) {
        self.gravity_wells.push(well);
    }

    /// Gravity wells in the sector.
    #[must_use]
    pub fn gravity_wells(&self) -> &[GravityWell] {
        &self.gravity_wells
    }

    /// Strongest gravity acting at `pos`, zero in open space.
    #[must_use]
    pub fn gravity_at(&self, pos: Vec2) -> f32 {
        self.gravity_wells
            .iter()
            .filter(|w| w.contains(pos))
            .map(|w| w.strength)
            .fold(0.0, f32::max)
    }

    /// Current tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipClass;

    fn vessel_at(pos: Vec2) -> VesselComponents {
        VesselComponents::new(ShipClass::default(), pos, 0.0)
    }

    mod spatial_index_tests {
        use super::*;

        #[test]
        fn insert_overwrites() {
            let mut index = SpatialIndex::new();
            let id = EntityId::new(1);
            index.insert(id, Vec2::new(1.0, 2.0));
            index.insert(id, Vec2::new(3.0, 4.0));
            assert_eq!(index.get(id), Some(Vec2::new(3.0, 4.0)));
            assert_eq!(index.len(), 1);
        }

        #[test]
        fn remove_missing_is_noop() {
            let mut index = SpatialIndex::new();
            index.remove(EntityId::new(9));
            assert!(index.is_empty());
        }

        #[test]
        fn query_radius_is_inclusive_and_sorted() {
            let mut index = SpatialIndex::new();
            index.insert(EntityId::new(5), Vec2::new(10.0, 0.0));
            index.insert(EntityId::new(2), Vec2::new(100.0, 0.0));
            index.insert(EntityId::new(8), Vec2::new(150.0, 0.0));

            assert_eq!(
                index.query_radius(Vec2::ZERO, 100.0),
                vec![EntityId::new(2), EntityId::new(5)]
            );
        }
    }

    mod arena_tests {
        use super::*;

        #[test]
        fn new_arena_is_empty() {
            let arena = Arena::new();
            assert!(arena.is_empty());
            assert_eq!(arena.current_tick(), 0);
        }

        #[test]
        fn ids_are_monotonic_and_not_reused() {
            let mut arena = Arena::new();
            let a = arena.spawn_vessel(vessel_at(Vec2::ZERO));
            let b = arena.spawn_vessel(vessel_at(Vec2::ZERO));
            arena.despawn(b);
            let c = arena.spawn_vessel(vessel_at(Vec2::ZERO));

            assert!(a < b && b < c);
            assert!(arena.get(b).is_none());
        }

        #[test]
        fn spawn_indexes_position() {
            let mut arena = Arena::new();
            let id = arena.spawn_installation(Vec2::new(7.0, 8.0), CombatState::new(10.0));
            assert_eq!(arena.spatial().get(id), Some(Vec2::new(7.0, 8.0)));
        }

        #[test]
        fn despawn_removes_from_index() {
            let mut arena = Arena::new();
            let id = arena.spawn_vessel(vessel_at(Vec2::ZERO));
            assert!(arena.despawn(id).is_some());
            assert!(arena.spatial().get(id).is_none());
            assert!(arena.despawn(id).is_none());
        }

        #[test]
        fn sync_spatial_follows_moved_vessels() {
            let mut arena = Arena::new();
            let id = arena.spawn_vessel(vessel_at(Vec2::ZERO));

            arena
                .get_mut(id)
                .and_then(Entity::as_vessel_mut)
                .unwrap()
                .kinematics
                .position = Vec2::new(500.0, 0.0);
            assert_eq!(arena.spatial().get(id), Some(Vec2::ZERO));

            arena.sync_spatial();
            assert_eq!(arena.spatial().get(id), Some(Vec2::new(500.0, 0.0)));
        }

        #[test]
        fn distance_requires_both_entities() {
            let mut arena = Arena::new();
            let a = arena.spawn_vessel(vessel_at(Vec2::ZERO));
            assert!(arena.distance_between(a, EntityId::new(99)).is_none());
        }

        #[test]
        fn iteration_is_in_id_order() {
            let mut arena = Arena::new();
            let ids: Vec<_> = (0..5)
                .map(|i| arena.spawn_vessel(vessel_at(Vec2::splat(i as f32))))
                .collect();
            let seen: Vec<_> = arena.entity_ids_sorted().collect();
            assert_eq!(seen, ids);
        }

        #[test]
        fn gravity_takes_strongest_containing_well() {
            let mut arena = Arena::new();
            arena.add_gravity_well(GravityWell::new(Vec2::ZERO, 100.0, 0.4));
            arena.add_gravity_well(GravityWell::new(Vec2::new(50.0, 0.0), 20.0, 0.9));

            assert!((arena.gravity_at(Vec2::ZERO) - 0.4).abs() < f32::EPSILON);
            assert!((arena.gravity_at(Vec2::new(55.0, 0.0)) - 0.9).abs() < f32::EPSILON);
            assert!(arena.gravity_at(Vec2::new(500.0, 0.0)).abs() < f32::EPSILON);
        }

        #[test]
        fn tick_advances() {
            let mut arena = Arena::new();
            arena.advance_tick();
            arena.advance_tick();
            assert_eq!(arena.current_tick(), 2);
        }
    }
}
