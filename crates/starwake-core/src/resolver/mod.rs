//! Resolvers: the only code that mutates entity state.
//!
//! Each resolver owns one slice of per-entity state and is the single writer
//! of it:
//!
//! - [`MovementSimulator`]: kinematics, control intents, FTL drive and fuel
//! - [`CombatResolver`]: combat state, weapon mounts, targeting
//!
//! A resolver may read the other's components through the arena, never write
//! them. Within a tick the simulation runs movement first, so combat range
//! checks always see post-movement positions.
//!
//! # Invariants
//!
//! - Commands are applied at a tick boundary, before or after a `step`,
//!   never during one.
//! - Entities are visited in ID order, so identical inputs give identical
//!   results.
//! - A rejected command changes nothing and is reported as an event.

mod combat;
mod movement;

pub use combat::{CombatResolver, DamageOutcome, Munitions, ReadyState, UnlimitedMunitions};
pub use movement::{integrate, MovementSimulator};

use crate::arena::Arena;
use crate::command::{Command, CommandKind};
use crate::event::EventQueue;

/// A subsystem that advances its slice of entity state once per tick.
///
/// # Example
///
/// ```
/// use starwake_core::arena::Arena;
/// use starwake_core::command::{Command, CommandKind};
/// use starwake_core::event::EventQueue;
/// use starwake_core::resolver::Resolver;
///
/// struct Idle;
///
/// impl Resolver for Idle {
///     fn handles(&self) -> &[CommandKind] {
///         &[]
///     }
///
///     fn resolve(&mut self, _commands: &[&Command], _arena: &mut Arena, _events: &mut EventQueue) {}
///
///     fn step(&mut self, _arena: &mut Arena, _dt: f32, _events: &mut EventQueue) {}
/// }
/// ```
pub trait Resolver {
    /// Command kinds routed to [`Resolver::resolve`].
    fn handles(&self) -> &[CommandKind];

    /// Applies queued commands, in submission order.
    ///
    /// Rejections are pushed as
    /// [`SimEvent::CommandRejected`](crate::event::SimEvent::CommandRejected).
    fn resolve(&mut self, commands: &[&Command], arena: &mut Arena, events: &mut EventQueue);

    /// Advances owned state by `dt` seconds.
    fn step(&mut self, arena: &mut Arena, dt: f32, events: &mut EventQueue);
}

/// Selects the commands a resolver handles, preserving submission order.
#[must_use]
pub fn route<'a>(resolver: &dyn Resolver, commands: &'a [Command]) -> Vec<&'a Command> {
    commands
        .iter()
        .filter(|c| resolver.handles().contains(&c.kind()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ControlIntent, EntityId};

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
    }

    #[test]
    fn route_filters_by_kind_and_keeps_order() {
        let movement = MovementSimulator::new();
        let a = EntityId::new(1);
        let commands = vec![
            Command::CancelTravel { vessel: a },
            Command::FireWeapon {
                source: a,
                slot: 0,
                target: None,
            },
            Command::SetControls {
                vessel: a,
                intent: ControlIntent::BRAKE,
            },
        ];

        let routed = route(&movement, &commands);
        assert_eq!(routed, vec![&commands[0], &commands[2]]);
    }
}
