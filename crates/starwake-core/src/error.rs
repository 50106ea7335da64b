//! Error types.
//!
//! Nothing in the tick loop is fatal. A rejected command leaves state
//! untouched and reports one of these values, either as the `Err` of a
//! direct call or inside a
//! [`SimEvent::CommandRejected`](crate::event::SimEvent::CommandRejected).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityId;

/// Why a fire command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
pub enum FireError {
    /// The firing entity does not exist.
    #[error("source {0} does not exist")]
    UnknownSource(EntityId),
    /// The firing entity has been destroyed.
    #[error("source {0} is destroyed")]
    SourceDestroyed(EntityId),
    /// No mount with this slot on the firing entity.
    #[error("no weapon mount in slot {0}")]
    UnknownMount(usize),
    /// The mount references a weapon missing from the catalog.
    #[error("weapon definition for slot {0} is missing from the catalog")]
    UnknownWeapon(usize),
    /// No target given and none selected.
    #[error("no target selected")]
    NoTarget,
    /// The target is missing, destroyed, or the firer itself.
    #[error("target {0} is no longer valid")]
    TargetInvalid(EntityId),
    /// The target is beyond the weapon's effective range.
    #[error("target out of range ({distance:.1} > {range:.1})")]
    OutOfRange {
        /// Distance to the target.
        distance: f32,
        /// Effective range of the weapon.
        range: f32,
    },
    /// The mount is still cooling down.
    #[error("weapon is cooling down")]
    Cooling,
    /// The mount is at its heat cap.
    #[error("weapon is overheated")]
    Overheated,
    /// The munitions collaborator reports no ammunition.
    #[error("no ammunition")]
    NoAmmo,
    /// Not enough energy for one shot.
    #[error("insufficient energy")]
    NoEnergy,
}

/// Why an FTL command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TravelError {
    /// The entity does not exist or is not a vessel.
    #[error("{0} is not a vessel")]
    NotAVessel(EntityId),
    /// The vessel has been destroyed.
    #[error("vessel {0} is destroyed")]
    Destroyed(EntityId),
    /// A charge is already running.
    #[error("travel drive is already charging")]
    AlreadyCharging,
    /// The vessel is in transit.
    #[error("vessel is in transit")]
    InTransit,
    /// Cancel issued with no charge running.
    #[error("no travel charge to cancel")]
    NotCharging,
    /// Not enough fuel for the requested jump.
    #[error("insufficient fuel")]
    InsufficientFuel,
}

/// Failure to load a [`SimConfig`](crate::config::SimConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        let err = FireError::OutOfRange {
            distance: 120.0,
            range: 100.0,
        };
        assert_eq!(err.to_string(), "target out of range (120.0 > 100.0)");
        assert_eq!(
            FireError::TargetInvalid(EntityId::new(4)).to_string(),
            "target #4 is no longer valid"
        );
        assert_eq!(TravelError::InTransit.to_string(), "vessel is in transit");
    }

    #[test]
    fn rejections_serialize() {
        let json = serde_json::to_string(&FireError::Cooling).unwrap();
        let back: FireError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FireError::Cooling);
    }
}
