//! Determinism verification.
//!
//! Replays and networked lockstep depend on a run being a pure function of
//! its seed, config and command stream.

use glam::Vec2;

use crate::command::Command;
use crate::entity::{ControlIntent, EntityId};
use crate::event::EventEnvelope;
use crate::simulation::Simulation;
use crate::snapshot::WorldSnapshot;

use super::helpers::{setup_duel, spawn_ship};

/// Scripted commands for tick `tick`.
fn script(tick: u64, a: EntityId, b: EntityId, scout: EntityId) -> Vec<Command> {
    let mut commands = Vec::new();
    match tick {
        0 => {
            commands.push(Command::SelectTarget {
                source: a,
                target: Some(b),
            });
            commands.push(Command::SetControls {
                vessel: scout,
                intent: ControlIntent::THRUST | ControlIntent::ROTATE_LEFT,
            });
            commands.push(Command::InitiateTravel {
                vessel: b,
                destination: Vec2::new(3000.0, 500.0),
            });
        }
        90 => commands.push(Command::SetControls {
            vessel: scout,
            intent: ControlIntent::STRAFE_RIGHT | ControlIntent::BOOST,
        }),
        150 => commands.push(Command::SetFlightAssist {
            vessel: scout,
            enabled: true,
        }),
        _ => {}
    }
    if tick % 3 == 0 {
        commands.push(Command::FireWeapon {
            source: a,
            slot: (tick % 2) as usize,
            target: None,
        });
    }
    commands
}

fn run_scripted(seed: u64, ticks: u64) -> (WorldSnapshot, Vec<EventEnvelope>) {
    let mut sim = Simulation::new(seed);
    let (a, b) = setup_duel(&mut sim);
    let scout = spawn_ship(&mut sim, Vec2::new(-50.0, 20.0));

    let mut events = Vec::new();
    for tick in 0..ticks {
        for command in script(tick, a, b, scout) {
            sim.submit(command);
        }
        sim.step();
        events.extend(sim.drain_events());
    }
    (sim.snapshot(), events)
}

#[test]
fn same_seed_same_run() {
    let (snap_a, events_a) = run_scripted(42, 600);
    let (snap_b, events_b) = run_scripted(42, 600);

    assert_eq!(snap_a, snap_b);
    assert_eq!(events_a, events_b);
    assert!(!events_a.is_empty());
}

#[test]
fn snapshots_match_tick_by_tick() {
    let mut sims = [Simulation::new(7), Simulation::new(7)];
    let ids: Vec<_> = sims.iter_mut().map(setup_duel).collect();
    assert_eq!(ids[0], ids[1]);
    let (a, b) = ids[0];

    for tick in 0..240 {
        for sim in &mut sims {
            sim.submit(Command::FireWeapon {
                source: a,
                slot: 1,
                target: Some(b),
            });
            sim.step();
        }
        assert_eq!(sims[0].snapshot(), sims[1].snapshot(), "diverged at tick {tick}");
    }
}

#[test]
fn events_are_ordered_within_each_tick() {
    let (_, events) = run_scripted(3, 300);
    for pair in events.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        assert!(
            (prev.tick(), prev.sequence()) < (next.tick(), next.sequence()),
            "{prev:?} not before {next:?}"
        );
    }
}
