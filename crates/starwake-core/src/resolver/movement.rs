//! Movement simulator: flight model and FTL drive.
//!
//! Every tick, each live vessel first advances its FTL state machine, then
//! (unless in transit) integrates its control intent:
//!
//! 1. thrust along the heading
//! 2. brake decay
//! 3. rotation (fixed turn rate, no angular inertia)
//! 4. strafe perpendicular to the heading
//! 5. boost, capped at the class's safe speed
//! 6. flight-assist stabilization when no input is held
//! 7. passive drag
//! 8. `position += velocity` (semi-implicit Euler, post-update velocity)
//!
//! Per-tick constants are tuned at
//! [`REFERENCE_TICK_RATE_HZ`](crate::config::REFERENCE_TICK_RATE_HZ);
//! other tick lengths scale them by the normalized tick length `n`.
//!
//! # FTL state machine
//!
//! ```text
//! Idle --initiate--> Charging --timer--> Transit --timer--> Idle (at destination)
//!                       |
//!                       +--damage / gravity / cancel--> Idle (no fuel spent)
//! ```
//!
//! Fuel is deducted on the Charging → Transit edge and nowhere else.

use std::f32::consts::TAU;

use glam::Vec2;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::command::{Command, CommandKind};
use crate::config::{ShipClass, SimConfig, REFERENCE_TICK_RATE_HZ};
use crate::entity::{ControlIntent, Entity, EntityId, KinematicState, TravelPhase, VesselComponents};
use crate::error::TravelError;
use crate::event::{EventQueue, InterruptReason, SimEvent};

use super::Resolver;

/// Timer slack absorbing float drift from repeated `dt` subtraction.
const TIMER_EPSILON: f32 = 1e-4;

/// Integrates one tick of the flight model (steps 1–8).
///
/// `n` is the tick length in reference ticks (1.0 at 60 Hz).
pub fn integrate(kin: &mut KinematicState, class: &ShipClass, n: f32) {
    let intent = kin.effective_intent();

    if intent.contains(ControlIntent::THRUST) {
        kin.velocity += kin.heading() * class.thrust_accel * n;
    }

    if intent.contains(ControlIntent::BRAKE) {
        kin.velocity *= class.brake_factor.powf(n);
    }

    let mut turn = 0.0;
    if intent.contains(ControlIntent::ROTATE_LEFT) {
        turn += class.turn_rate;
    }
    if intent.contains(ControlIntent::ROTATE_RIGHT) {
        turn -= class.turn_rate;
    }
    kin.angular_velocity = turn;
    kin.rotation = (kin.rotation + turn * n).rem_euclid(TAU);
    // rem_euclid can round a tiny negative up to TAU itself.
    if kin.rotation >= TAU {
        kin.rotation = 0.0;
    }

    let lateral = kin.heading().perp();
    if intent.contains(ControlIntent::STRAFE_LEFT) {
        kin.velocity += lateral * class.strafe_accel * n;
    }
    if intent.contains(ControlIntent::STRAFE_RIGHT) {
        kin.velocity -= lateral * class.strafe_accel * n;
    }

    if intent.contains(ControlIntent::BOOST) {
        kin.velocity *= class.boost_multiplier.powf(n);
        kin.velocity = kin.velocity.clamp_length_max(class.max_safe_speed);
    }

    if kin.flight_assist && intent.is_empty() {
        kin.velocity *= class.stabilization_factor.powf(n);
    }

    kin.velocity *= (1.0 - class.drag_factor).powf(n);

    kin.position += kin.velocity * n;
}

/// Steps vessel kinematics and drives the FTL sequence.
#[derive(Debug, Clone)]
pub struct MovementSimulator {
    reference_tick_rate: f32,
    heavy_damage_fraction: f32,
}

impl Default for MovementSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementSimulator {
    /// Creates a simulator with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&SimConfig::default())
    }

    /// Creates a simulator using the config's heavy-damage threshold.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            reference_tick_rate: REFERENCE_TICK_RATE_HZ,
            heavy_damage_fraction: config.combat.heavy_damage_fraction,
        }
    }

    // ---------------------------------------------------------------------
    // Control input
    // ---------------------------------------------------------------------

    /// Replaces the held control inputs of a vessel.
    ///
    /// # Errors
    ///
    /// [`TravelError::NotAVessel`] when `vessel` is not a vessel.
    pub fn set_controls(
        &self,
        arena: &mut Arena,
        vessel: EntityId,
        intent: ControlIntent,
    ) -> Result<(), TravelError> {
        vessel_mut(arena, vessel)?.kinematics.intent = intent;
        Ok(())
    }

    /// Sets or clears a single control input, leaving the others held.
    ///
    /// # Errors
    ///
    /// [`TravelError::NotAVessel`] when `vessel` is not a vessel.
    pub fn set_control(
        &self,
        arena: &mut Arena,
        vessel: EntityId,
        control: ControlIntent,
        held: bool,
    ) -> Result<(), TravelError> {
        vessel_mut(arena, vessel)?.kinematics.intent.set(control, held);
        Ok(())
    }

    /// Toggles flight assist.
    ///
    /// # Errors
    ///
    /// [`TravelError::NotAVessel`] when `vessel` is not a vessel.
    pub fn set_flight_assist(
        &self,
        arena: &mut Arena,
        vessel: EntityId,
        enabled: bool,
    ) -> Result<(), TravelError> {
        vessel_mut(arena, vessel)?.kinematics.flight_assist = enabled;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // FTL
    // ---------------------------------------------------------------------

    /// Starts charging the FTL drive toward `destination`.
    ///
    /// The jump cost is fixed now but only paid when transit begins.
    ///
    /// # Errors
    ///
    /// Rejected with no state change when the vessel is missing or destroyed,
    /// already charging or in transit, or short of fuel for the jump.
    pub fn initiate_travel(
        &self,
        arena: &mut Arena,
        vessel: EntityId,
        destination: Vec2,
        events: &mut EventQueue,
    ) -> Result<(), TravelError> {
        let entity = arena.get_mut(vessel).ok_or(TravelError::NotAVessel(vessel))?;
        if entity.is_destroyed() {
            return Err(TravelError::Destroyed(vessel));
        }
        let v = entity.as_vessel_mut().ok_or(TravelError::NotAVessel(vessel))?;

        match v.kinematics.travel {
            TravelPhase::Idle => {}
            TravelPhase::Charging { .. } => return Err(TravelError::AlreadyCharging),
            TravelPhase::Transit { .. } => return Err(TravelError::InTransit),
        }

        let distance = v.kinematics.position.distance(destination);
        let fuel_cost = v.class.jump_fuel_cost(distance);
        if v.fuel < fuel_cost {
            return Err(TravelError::InsufficientFuel);
        }

        // Only hits taken during the charge count toward an interrupt.
        v.combat.recent_damage = 0.0;
        v.kinematics.travel = TravelPhase::Charging {
            destination,
            remaining_secs: v.class.ftl_charge_secs,
            transit_secs: v.class.transit_secs(distance),
            fuel_cost,
        };
        debug!(%vessel, distance, fuel_cost, "travel charge started");
        events.push(SimEvent::TravelChargeStarted {
            vessel,
            destination,
        });
        Ok(())
    }

    /// Aborts a running charge. Free: no fuel has been spent yet.
    ///
    /// # Errors
    ///
    /// [`TravelError::InTransit`] once transit has begun (transit cannot be
    /// interrupted) and [`TravelError::NotCharging`] when idle.
    pub fn cancel_travel(
        &self,
        arena: &mut Arena,
        vessel: EntityId,
        events: &mut EventQueue,
    ) -> Result<(), TravelError> {
        let v = vessel_mut(arena, vessel)?;
        match v.kinematics.travel {
            TravelPhase::Charging { .. } => {
                interrupt(vessel, v, InterruptReason::Cancelled, events);
                Ok(())
            }
            TravelPhase::Transit { .. } => Err(TravelError::InTransit),
            TravelPhase::Idle => Err(TravelError::NotCharging),
        }
    }

    // ---------------------------------------------------------------------
    // Read-only queries
    // ---------------------------------------------------------------------

    /// Kinematic state of a vessel.
    #[must_use]
    pub fn kinematics(arena: &Arena, vessel: EntityId) -> Option<&KinematicState> {
        arena
            .get(vessel)
            .and_then(Entity::as_vessel)
            .map(|v| &v.kinematics)
    }

    /// Distance between two entities.
    #[must_use]
    pub fn distance_between(arena: &Arena, a: EntityId, b: EntityId) -> Option<f32> {
        arena.distance_between(a, b)
    }

    // ---------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------

    fn step_vessel(
        &self,
        id: EntityId,
        vessel: &mut VesselComponents,
        gravity: f32,
        dt: f32,
        events: &mut EventQueue,
    ) {
        match vessel.kinematics.travel {
            TravelPhase::Idle => {}
            TravelPhase::Charging {
                destination,
                remaining_secs,
                transit_secs,
                fuel_cost,
            } => {
                if let Some(reason) = self.interruption(vessel, gravity) {
                    interrupt(id, vessel, reason, events);
                } else {
                    let remaining = remaining_secs - dt;
                    if remaining <= TIMER_EPSILON {
                        enter_transit(id, vessel, destination, transit_secs, fuel_cost, events);
                        return;
                    }
                    vessel.kinematics.travel = TravelPhase::Charging {
                        destination,
                        remaining_secs: remaining,
                        transit_secs,
                        fuel_cost,
                    };
                }
            }
            TravelPhase::Transit {
                destination,
                remaining_secs,
            } => {
                let remaining = remaining_secs - dt;
                if remaining <= TIMER_EPSILON {
                    vessel.kinematics.position = destination;
                    vessel.kinematics.travel = TravelPhase::Idle;
                    debug!(vessel = %id, "transit complete");
                    events.push(SimEvent::TravelExited {
                        vessel: id,
                        position: destination,
                    });
                } else {
                    vessel.kinematics.travel = TravelPhase::Transit {
                        destination,
                        remaining_secs: remaining,
                    };
                }
                return;
            }
        }

        integrate(
            &mut vessel.kinematics,
            &vessel.class,
            dt * self.reference_tick_rate,
        );
    }

    fn interruption(&self, vessel: &VesselComponents, gravity: f32) -> Option<InterruptReason> {
        let combat = &vessel.combat;
        if combat.recent_damage > 0.0
            && combat.recent_damage >= self.heavy_damage_fraction * combat.hull_max
        {
            return Some(InterruptReason::HeavyDamage);
        }
        if gravity > vessel.class.ftl_gravity_tolerance {
            return Some(InterruptReason::GravityWell);
        }
        None
    }
}

impl Resolver for MovementSimulator {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Movement]
    }

    fn resolve(&mut self, commands: &[&Command], arena: &mut Arena, events: &mut EventQueue) {
        for command in commands {
            let result = match command {
                Command::SetControls { vessel, intent } => {
                    self.set_controls(arena, *vessel, *intent)
                }
                Command::SetFlightAssist { vessel, enabled } => {
                    self.set_flight_assist(arena, *vessel, *enabled)
                }
                Command::InitiateTravel {
                    vessel,
                    destination,
                } => self.initiate_travel(arena, *vessel, *destination, events),
                Command::CancelTravel { vessel } => self.cancel_travel(arena, *vessel, events),
                Command::SelectTarget { .. } | Command::FireWeapon { .. } => Ok(()),
            };

            if let Err(reason) = result {
                debug!(entity = %command.issuer(), %reason, "movement command rejected");
                events.push(SimEvent::CommandRejected {
                    entity: command.issuer(),
                    reason: reason.into(),
                });
            }
        }
    }

    fn step(&mut self, arena: &mut Arena, dt: f32, events: &mut EventQueue) {
        // Sector lookups first; the second pass holds entities mutably.
        let probes: Vec<(EntityId, f32)> = arena
            .entities_sorted()
            .filter(|e| e.is_vessel())
            .map(|e| (e.id(), arena.gravity_at(e.position())))
            .collect();

        for (id, gravity) in probes {
            let Some(entity) = arena.get_mut(id) else {
                continue;
            };
            let destroyed = entity.is_destroyed();
            let Some(vessel) = entity.as_vessel_mut() else {
                continue;
            };

            if destroyed {
                if vessel.kinematics.is_charging_travel() {
                    interrupt(id, vessel, InterruptReason::Destroyed, events);
                }
                continue;
            }

            self.step_vessel(id, vessel, gravity, dt, events);
            trace!(
                vessel = %id,
                x = vessel.kinematics.position.x,
                y = vessel.kinematics.position.y,
                speed = vessel.kinematics.speed(),
                "vessel stepped"
            );
        }
    }
}

fn vessel_mut(arena: &mut Arena, id: EntityId) -> Result<&mut VesselComponents, TravelError> {
    arena
        .get_mut(id)
        .and_then(Entity::as_vessel_mut)
        .ok_or(TravelError::NotAVessel(id))
}

fn interrupt(
    id: EntityId,
    vessel: &mut VesselComponents,
    reason: InterruptReason,
    events: &mut EventQueue,
) {
    vessel.kinematics.travel = TravelPhase::Idle;
    debug!(vessel = %id, ?reason, "travel charge interrupted");
    events.push(SimEvent::TravelInterrupted { vessel: id, reason });
}

fn enter_transit(
    id: EntityId,
    vessel: &mut VesselComponents,
    destination: Vec2,
    transit_secs: f32,
    fuel_cost: f32,
    events: &mut EventQueue,
) {
    vessel.fuel = (vessel.fuel - fuel_cost).max(0.0);
    vessel.kinematics.velocity = Vec2::ZERO;
    vessel.kinematics.angular_velocity = 0.0;
    vessel.kinematics.travel = TravelPhase::Transit {
        destination,
        remaining_secs: transit_secs,
    };
    debug!(vessel = %id, fuel_cost, transit_secs, "entered transit");
    events.push(SimEvent::TravelEntered {
        vessel: id,
        fuel_spent: fuel_cost,
        transit_secs,
    });
}

// =============================================================================
// Tests
// =============================================================================
