//! Commands submitted by input handlers and AI collaborators.
//!
//! Commands are queued between ticks and applied at the next tick boundary,
//! never in the middle of an integration step. Each resolver declares the
//! [`CommandKind`]s it handles and receives only those.
//!
//! # Example
//!
//! ```
//! use starwake_core::command::{Command, CommandKind};
//! use starwake_core::entity::{ControlIntent, EntityId};
//!
//! let cmd = Command::SetControls {
//!     vessel: EntityId::new(1),
//!     intent: ControlIntent::THRUST | ControlIntent::ROTATE_LEFT,
//! };
//! assert_eq!(cmd.kind(), CommandKind::Movement);
//! assert_eq!(cmd.issuer(), EntityId::new(1));
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{ControlIntent, EntityId};

/// Routing category of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Handled by the movement simulator.
    Movement,
    /// Handled by the combat resolver.
    Combat,
}

/// A request to change simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Replace the held control inputs of a vessel.
    SetControls {
        /// Vessel to steer.
        vessel: EntityId,
        /// Complete set of held inputs.
        intent: ControlIntent,
    },
    /// Toggle flight assist.
    SetFlightAssist {
        /// Vessel to configure.
        vessel: EntityId,
        /// New flight assist state.
        enabled: bool,
    },
    /// Start charging the FTL drive.
    InitiateTravel {
        /// Vessel to jump.
        vessel: EntityId,
        /// Arrival point.
        destination: Vec2,
    },
    /// Abort a running FTL charge.
    CancelTravel {
        /// Vessel whose charge to abort.
        vessel: EntityId,
    },
    /// Select or clear the current target.
    SelectTarget {
        /// Entity choosing a target.
        source: EntityId,
        /// New target; `None` clears.
        target: Option<EntityId>,
    },
    /// Fire one weapon mount.
    FireWeapon {
        /// Firing entity.
        source: EntityId,
        /// Mount slot.
        slot: usize,
        /// Explicit target; `None` uses the selected target.
        target: Option<EntityId>,
    },
}

impl Command {
    /// Routing category.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::SetControls { .. }
            | Self::SetFlightAssist { .. }
            | Self::InitiateTravel { .. }
            | Self::CancelTravel { .. } => CommandKind::Movement,
            Self::SelectTarget { .. } | Self::FireWeapon { .. } => CommandKind::Combat,
        }
    }

    /// Entity the command is issued for.
    #[must_use]
    pub const fn issuer(&self) -> EntityId {
        match self {
            Self::SetControls { vessel, .. }
            | Self::SetFlightAssist { vessel, .. }
            | Self::InitiateTravel { vessel, .. }
            | Self::CancelTravel { vessel } => *vessel,
            Self::SelectTarget { source, .. } | Self::FireWeapon { source, .. } => *source,
        }
    }
}
