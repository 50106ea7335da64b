//! A short fight: a corvette closes on a station, jumps out, and the event
//! stream is printed as it happens.
//!
//! ```text
//! cargo run --example skirmish -- [config.json]
//! RUST_LOG=starwake_core=debug cargo run --example skirmish
//! ```

use anyhow::{Context, Result};
use glam::Vec2;
use starwake_core::command::Command;
use starwake_core::config::SimConfig;
use starwake_core::entity::{
    CombatState, ControlIntent, FactionId, VesselComponents, WeaponMount,
};
use starwake_core::event::SimEvent;
use starwake_core::simulation::Simulation;
use tracing::info;

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => SimConfig::default(),
    };
    let corvette = config
        .ship_class("corvette")
        .context("config has no corvette class")?;

    let mut sim = Simulation::from_config(config, 2024);
    let ship = sim.arena_mut().spawn_vessel(
        VesselComponents::new(corvette, Vec2::new(-1200.0, 0.0), 0.0)
            .with_fuel(60.0)
            .with_combat(
                CombatState::new(120.0)
                    .with_shield(60.0, 6.0, 2.0)
                    .with_energy(100.0, 15.0)
                    .with_mount(WeaponMount::new(0, "mass_driver"))
                    .with_mount(WeaponMount::new(1, "pulse_laser")),
            ),
    );
    let station = sim.arena_mut().spawn_installation(
        Vec2::ZERO,
        CombatState::new(250.0)
            .with_shield(80.0, 4.0, 3.0)
            .with_armor(6.0)
            .in_faction(FactionId(1), true),
    );
    info!(%ship, %station, "sector ready");

    sim.submit(Command::SetControls {
        vessel: ship,
        intent: ControlIntent::THRUST,
    });
    sim.submit(Command::SelectTarget {
        source: ship,
        target: Some(station),
    });

    let mut jumped = false;
    let mut braking = false;
    for _ in 0..60 * 40 {
        if sim.combat().is_target_in_range(sim.arena(), ship, 0, station) {
            if !braking {
                sim.submit(Command::SetControls {
                    vessel: ship,
                    intent: ControlIntent::BRAKE,
                });
                braking = true;
            }
            sim.submit(Command::FireWeapon { source: ship, slot: 0, target: None });
            sim.submit(Command::FireWeapon { source: ship, slot: 1, target: None });
        }
        sim.step();

        for envelope in sim.drain_events() {
            match envelope.event() {
                SimEvent::CommandRejected { .. } => {}
                SimEvent::TargetDestroyed { .. } if !jumped => {
                    println!("[{:>5}] {:?}", envelope.tick(), envelope.event());
                    sim.submit(Command::InitiateTravel {
                        vessel: ship,
                        destination: Vec2::new(0.0, 8000.0),
                    });
                    jumped = true;
                }
                event => println!("[{:>5}] {event:?}", envelope.tick()),
            }
        }
    }

    let snapshot = sim.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
