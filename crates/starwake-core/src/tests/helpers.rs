//! Scenario setup shared by the cross-module tests.

use glam::Vec2;

use crate::config::ShipClass;
use crate::entity::{CombatState, EntityId, VesselComponents, WeaponMount};
use crate::event::SimEvent;
use crate::simulation::Simulation;
use crate::snapshot::EntitySnapshot;

/// Spawns an unarmed corvette with full tanks.
pub fn spawn_ship(sim: &mut Simulation, pos: Vec2) -> EntityId {
    let class = sim.config().ship_class("corvette").unwrap_or_default();
    sim.arena_mut()
        .spawn_vessel(VesselComponents::new(class, pos, 0.0).with_fuel(100.0))
}

/// Spawns a corvette with a shield, armor and a mass driver in slot 0.
pub fn spawn_gunship(sim: &mut Simulation, pos: Vec2) -> EntityId {
    let combat = CombatState::new(100.0)
        .with_shield(40.0, 5.0, 2.0)
        .with_armor(5.0)
        .with_energy(100.0, 10.0)
        .with_mount(WeaponMount::new(0, "mass_driver"))
        .with_mount(WeaponMount::new(1, "pulse_laser"));
    sim.arena_mut().spawn_vessel(
        VesselComponents::new(ShipClass::default(), pos, 0.0)
            .with_fuel(100.0)
            .with_combat(combat),
    )
}

/// Shooter at the origin facing a gunship 200 units away.
pub fn setup_duel(sim: &mut Simulation) -> (EntityId, EntityId) {
    let a = spawn_gunship(sim, Vec2::ZERO);
    let b = spawn_gunship(sim, Vec2::new(200.0, 0.0));
    (a, b)
}

/// Current snapshot of one entity.
pub fn view(sim: &Simulation, id: EntityId) -> EntitySnapshot {
    sim.snapshot()
        .get(id)
        .cloned()
        .unwrap_or_else(|| panic!("{id:?} missing from snapshot"))
}

/// Drains the simulation's events, discarding envelopes.
pub fn drain(sim: &mut Simulation) -> Vec<SimEvent> {
    sim.drain_events()
        .into_iter()
        .map(crate::event::EventEnvelope::into_event)
        .collect()
}

/// Runs `ticks` fixed steps.
pub fn run(sim: &mut Simulation, ticks: u32) {
    for _ in 0..ticks {
        sim.step();
    }
}
