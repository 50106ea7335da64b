//! # Starwake Core
//!
//! Deterministic ship simulation for a 2D space combat game: Newtonian-style
//! flight with assists, a charged FTL drive, and weapon/shield/armor combat.
//!
//! ## Architecture
//!
//! - **Arena**: owns every entity (vessels and installations) behind
//!   [`EntityId`](entity::EntityId) handles, plus gravity wells and a spatial
//!   index.
//! - **Resolvers**: [`MovementSimulator`](resolver::MovementSimulator) and
//!   [`CombatResolver`](resolver::CombatResolver), each the sole writer of
//!   its slice of entity state.
//! - **Commands in, events out**: input handlers and AI submit
//!   [`Command`](command::Command)s; state transitions come back as
//!   [`SimEvent`](event::SimEvent)s drained between ticks.
//! - **Simulation**: the fixed-timestep loop that sequences all of the above.
//!
//! ## Usage
//!
//! ```
//! use starwake_core::command::Command;
//! use starwake_core::config::SimConfig;
//! use starwake_core::entity::{CombatState, VesselComponents, WeaponMount};
//! use starwake_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let config = SimConfig::default();
//! let corvette = config.ship_class("corvette").unwrap();
//! let mut sim = Simulation::from_config(config, 7);
//!
//! let ship = sim.arena_mut().spawn_vessel(
//!     VesselComponents::new(corvette, Vec2::ZERO, 0.0)
//!         .with_combat(CombatState::new(100.0).with_mount(WeaponMount::new(0, "mass_driver"))),
//! );
//! let station = sim
//!     .arena_mut()
//!     .spawn_installation(Vec2::new(200.0, 0.0), CombatState::new(300.0));
//!
//! sim.submit(Command::FireWeapon { source: ship, slot: 0, target: Some(station) });
//! sim.step();
//!
//! assert!(sim.snapshot().get(station).unwrap().hull < 300.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod resolver;
pub mod simulation;
pub mod snapshot;
pub mod weapon;

#[cfg(test)]
mod tests;
