//! Fixed-timestep driver tying the arena, resolvers and event queue together.
//!
//! One call to [`Simulation::step`] runs one tick:
//!
//! 1. Queued movement commands are applied.
//! 2. The movement simulator advances kinematics and FTL timers.
//! 3. The spatial index is refreshed from post-movement positions.
//! 4. The combat resolver advances cooldowns, heat, shields and energy.
//! 5. Queued combat commands are applied (targeting, firing).
//! 6. The tick counter advances.
//!
//! Damage dealt in step 5 is seen by the FTL interruption check in step 2 of
//! the following tick.
//!
//! [`Simulation::advance`] feeds variable frame times into the fixed tick
//! through an accumulator.
//!
//! # Determinism
//!
//! Entities are visited in ID order, commands in submission order, and every
//! random roll comes from a generator seeded at construction. Identical
//! seeds, configs and command streams give identical snapshots and events.
//!
//! # Example
//!
//! ```
//! use starwake_core::command::Command;
//! use starwake_core::config::ShipClass;
//! use starwake_core::entity::{ControlIntent, VesselComponents};
//! use starwake_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(42);
//! let ship = sim
//!     .arena_mut()
//!     .spawn_vessel(VesselComponents::new(ShipClass::default(), Vec2::ZERO, 0.0));
//!
//! sim.submit(Command::SetControls { vessel: ship, intent: ControlIntent::THRUST });
//! for _ in 0..10 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert!(sim.snapshot().get(ship).unwrap().position.x > 0.0);
//! ```

use tracing::{trace, warn};

use crate::arena::Arena;
use crate::command::Command;
use crate::config::SimConfig;
use crate::event::{EventEnvelope, EventQueue};
use crate::resolver::{route, CombatResolver, MovementSimulator, Resolver};
use crate::snapshot::WorldSnapshot;

/// The simulation: one sector, its resolvers and its command and event
/// queues.
#[derive(Debug)]
pub struct Simulation {
    arena: Arena,
    movement: MovementSimulator,
    combat: CombatResolver,
    events: EventQueue,
    pending: Vec<Command>,
    config: SimConfig,
    accumulator: f32,
    seed: u64,
}

impl Simulation {
    /// Creates an empty simulation with the default config.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::from_config(SimConfig::default(), seed)
    }

    /// Creates an empty simulation from a config.
    #[must_use]
    pub fn from_config(config: SimConfig, seed: u64) -> Self {
        Self {
            arena: Arena::new(),
            movement: MovementSimulator::from_config(&config),
            combat: CombatResolver::from_config(&config, seed),
            events: EventQueue::new(),
            pending: Vec::new(),
            config,
            accumulator: 0.0,
            seed,
        }
    }

    /// Replaces the combat resolver, e.g. to plug in a munitions collaborator.
    #[must_use]
    pub fn with_combat(mut self, combat: CombatResolver) -> Self {
        self.combat = combat;
        self
    }

    /// Queues a command for the next tick boundary.
    pub fn submit(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Runs one fixed tick.
    pub fn step(&mut self) {
        let dt = self.config.tick_dt();
        let tick = self.arena.current_tick();
        self.events.begin_tick(tick);

        let commands = std::mem::take(&mut self.pending);
        trace!(tick, commands = commands.len(), "tick start");

        let movement_cmds = route(&self.movement, &commands);
        self.movement
            .resolve(&movement_cmds, &mut self.arena, &mut self.events);
        self.movement.step(&mut self.arena, dt, &mut self.events);
        self.arena.sync_spatial();

        let combat_cmds = route(&self.combat, &commands);
        self.combat.step(&mut self.arena, dt, &mut self.events);
        self.combat
            .resolve(&combat_cmds, &mut self.arena, &mut self.events);

        self.arena.advance_tick();
    }

    /// Advances by a variable frame time, running as many fixed ticks as
    /// have accumulated. Returns the number of ticks run.
    ///
    /// At most `max_catch_up_ticks` run per call; any further backlog is
    /// dropped.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = self.config.tick_dt();
        self.accumulator += frame_dt.max(0.0);

        let mut ran = 0;
        while self.accumulator >= dt {
            if ran == self.config.max_catch_up_ticks {
                warn!(
                    backlog_secs = self.accumulator,
                    max_ticks = self.config.max_catch_up_ticks,
                    "simulation falling behind; dropping backlog"
                );
                self.accumulator = 0.0;
                break;
            }
            self.step();
            self.accumulator -= dt;
            ran += 1;
        }
        ran
    }

    /// Removes and returns every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }

    /// Captures the current world state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.arena)
    }

    /// The arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The arena, mutably. Use for setup between ticks.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// The movement simulator.
    #[must_use]
    pub fn movement(&self) -> &MovementSimulator {
        &self.movement
    }

    /// The combat resolver.
    #[must_use]
    pub fn combat(&self) -> &CombatResolver {
        &self.combat
    }

    /// The config in use.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current tick.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Seed of the combat generator.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of commands waiting for the next tick.
    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
