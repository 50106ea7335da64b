//! Outbound transition events.
//!
//! Resolvers never call back into the presentation layer. They push tagged
//! [`SimEvent`]s onto an [`EventQueue`], and the presentation layer drains the
//! queue between ticks. Envelopes carry the tick and a per-tick sequence
//! number, so consumers see events in exactly the order they happened.
//!
//! # Example
//!
//! ```
//! use starwake_core::entity::EntityId;
//! use starwake_core::event::{EventQueue, SimEvent};
//!
//! let mut queue = EventQueue::new();
//! queue.begin_tick(5);
//! queue.push(SimEvent::ShieldDepleted { entity: EntityId::new(1) });
//!
//! let drained = queue.drain();
//! assert_eq!(drained[0].tick(), 5);
//! assert!(queue.is_empty());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::{FireError, TravelError};
use crate::weapon::{DamageType, WeaponDefId};

/// Why an FTL charge was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterruptReason {
    /// Damage since the last tick exceeded the heavy-damage threshold.
    HeavyDamage,
    /// The vessel sits in a gravity well stronger than its drive tolerates.
    GravityWell,
    /// The pilot cancelled.
    Cancelled,
    /// The vessel was destroyed while charging.
    Destroyed,
}

/// A rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rejection {
    /// A fire command failed.
    Fire(FireError),
    /// A travel command failed.
    Travel(TravelError),
}

impl From<FireError> for Rejection {
    fn from(e: FireError) -> Self {
        Self::Fire(e)
    }
}

impl From<TravelError> for Rejection {
    fn from(e: TravelError) -> Self {
        Self::Travel(e)
    }
}

/// Something the presentation layer may react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An FTL charge started.
    TravelChargeStarted {
        /// Charging vessel.
        vessel: EntityId,
        /// Arrival point.
        destination: Vec2,
    },
    /// An FTL charge was aborted before transit; no fuel was spent.
    TravelInterrupted {
        /// Vessel whose charge stopped.
        vessel: EntityId,
        /// Cause.
        reason: InterruptReason,
    },
    /// The vessel entered transit and paid for the jump.
    TravelEntered {
        /// Jumping vessel.
        vessel: EntityId,
        /// Fuel deducted.
        fuel_spent: f32,
        /// Transit duration.
        transit_secs: f32,
    },
    /// The vessel left transit at its destination.
    TravelExited {
        /// Arriving vessel.
        vessel: EntityId,
        /// Arrival position.
        position: Vec2,
    },
    /// A weapon discharged.
    WeaponFired {
        /// Firing entity.
        source: EntityId,
        /// Mount slot.
        slot: usize,
        /// Target.
        target: EntityId,
        /// Weapon fired.
        weapon: WeaponDefId,
    },
    /// A hit was applied.
    DamageDealt {
        /// Attacker, if known.
        source: Option<EntityId>,
        /// Entity hit.
        target: EntityId,
        /// Damage category.
        damage_type: DamageType,
        /// Shield points removed.
        shield_damage: f32,
        /// Hull points removed.
        hull_damage: f32,
        /// Crit applied.
        crit: bool,
        /// Shield skipped by the bypass roll.
        bypassed_shield: bool,
    },
    /// A shield dropped to zero.
    ShieldDepleted {
        /// Entity whose shield failed.
        entity: EntityId,
    },
    /// An entity's hull reached zero. Emitted once per entity.
    TargetDestroyed {
        /// Destroyed entity.
        entity: EntityId,
        /// Attacker, if known.
        destroyer: Option<EntityId>,
    },
    /// An entity's selected target went away.
    TargetCleared {
        /// Entity that lost its target.
        entity: EntityId,
        /// The target it had selected.
        lost: EntityId,
    },
    /// A queued command was rejected without changing state.
    CommandRejected {
        /// Entity the command was issued for.
        entity: EntityId,
        /// Reason.
        reason: Rejection,
    },
}

impl SimEvent {
    /// Entity the event is mainly about.
    #[must_use]
    pub const fn primary_entity(&self) -> EntityId {
        match self {
            Self::TravelChargeStarted { vessel, .. }
            | Self::TravelInterrupted { vessel, .. }
            | Self::TravelEntered { vessel, .. }
            | Self::TravelExited { vessel, .. } => *vessel,
            Self::WeaponFired { source, .. } => *source,
            Self::DamageDealt { target, .. } => *target,
            Self::ShieldDepleted { entity }
            | Self::TargetDestroyed { entity, .. }
            | Self::TargetCleared { entity, .. }
            | Self::CommandRejected { entity, .. } => *entity,
        }
    }
}

/// An event stamped with when it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event: SimEvent,
    tick: u64,
    sequence: u32,
}

impl EventEnvelope {
    /// The event.
    #[must_use]
    pub fn event(&self) -> &SimEvent {
        &self.event
    }

    /// Consumes the envelope, returning the event.
    #[must_use]
    pub fn into_event(self) -> SimEvent {
        self.event
    }

    /// Tick during which the event was emitted.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Position within its tick.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

/// Ordered outbound queue of events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    tick: u64,
    next_sequence: u32,
    events: Vec<EventEnvelope>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps subsequent events with `tick` and restarts the sequence.
    pub fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
        self.next_sequence = 0;
    }

    /// Appends an event.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(EventEnvelope {
            event,
            tick: self.tick,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
    }

    /// Removes and returns every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.events)
    }

    /// Queued events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> + '_ {
        self.events.iter().map(EventEnvelope::event)
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_restarts_each_tick() {
        let mut queue = EventQueue::new();
        let e = EntityId::new(1);

        queue.begin_tick(1);
        queue.push(SimEvent::ShieldDepleted { entity: e });
        queue.push(SimEvent::ShieldDepleted { entity: e });
        queue.begin_tick(2);
        queue.push(SimEvent::ShieldDepleted { entity: e });

        let stamps: Vec<_> = queue.drain().iter().map(|env| (env.tick(), env.sequence())).collect();
        assert_eq!(stamps, vec![(1, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn drain_empties_queue() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::ShieldDepleted {
            entity: EntityId::new(1),
        });
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn primary_entity() {
        let a = EntityId::new(1);
        let b = EntityId::new(2);
        let fired = SimEvent::WeaponFired {
            source: a,
            slot: 0,
            target: b,
            weapon: "gun".into(),
        };
        assert_eq!(fired.primary_entity(), a);

        let cleared = SimEvent::TargetCleared { entity: b, lost: a };
        assert_eq!(cleared.primary_entity(), b);
    }

    #[test]
    fn rejection_from_errors() {
        assert_eq!(
            Rejection::from(TravelError::InTransit),
            Rejection::Travel(TravelError::InTransit)
        );
        assert_eq!(Rejection::from(FireError::NoTarget), Rejection::Fire(FireError::NoTarget));
    }

    #[test]
    fn envelope_serializes() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::TravelExited {
            vessel: EntityId::new(4),
            position: Vec2::new(1.0, 2.0),
        });
        let env = queue.drain().remove(0);
        let json = serde_json::to_string(&env).unwrap();
        let back: EventEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }
}
