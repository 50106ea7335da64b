//! Component structs held by entities.
//!
//! - [`KinematicState`] is written only by the
//!   [`MovementSimulator`](crate::resolver::MovementSimulator).
//! - [`CombatState`] and its [`WeaponMount`]s are written only by the
//!   [`CombatResolver`](crate::resolver::CombatResolver).
//!
//! Each resolver may read the other's components, never write them.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ShipClass;
use crate::entity::EntityId;
use crate::weapon::WeaponDefId;

// =============================================================================
// Control intent
// =============================================================================

bitflags! {
    /// Control inputs held for a vessel, read atomically once per tick.
    ///
    /// Input handlers build a complete intent and hand it over in one call
    /// instead of toggling individual fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ControlIntent: u8 {
        /// Forward engine thrust along the heading.
        const THRUST = 1 << 0;
        /// Velocity decay brake.
        const BRAKE = 1 << 1;
        /// Lateral thrust to port.
        const STRAFE_LEFT = 1 << 2;
        /// Lateral thrust to starboard.
        const STRAFE_RIGHT = 1 << 3;
        /// Afterburner velocity multiplier.
        const BOOST = 1 << 4;
        /// Counter-clockwise turn.
        const ROTATE_LEFT = 1 << 5;
        /// Clockwise turn.
        const ROTATE_RIGHT = 1 << 6;
    }
}

bitflags! {
    /// Combat status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct StatusFlags: u8 {
        /// Hull reached zero. Terminal.
        const DESTROYED = 1 << 0;
        /// Shield is present but fully drained.
        const SHIELDS_DOWN = 1 << 1;
    }
}

// =============================================================================
// Kinematics
// =============================================================================

/// Phase of the faster-than-light travel sequence.
///
/// Charging and transit are variants of one enum, so a vessel can never be
/// in both at once.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TravelPhase {
    /// Normal-space flight.
    #[default]
    Idle,
    /// Drive is spooling up; interruptible.
    Charging {
        /// Where the jump will land.
        destination: Vec2,
        /// Seconds of charge left.
        remaining_secs: f32,
        /// Transit length computed when the charge started.
        transit_secs: f32,
        /// Fuel that will be spent when transit begins.
        fuel_cost: f32,
    },
    /// In transit; uninterruptible.
    Transit {
        /// Where the jump will land.
        destination: Vec2,
        /// Seconds of transit left.
        remaining_secs: f32,
    },
}

/// Physical state of one vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// World position.
    pub position: Vec2,
    /// Heading in radians, counter-clockwise from +X, kept in `[0, TAU)`.
    pub rotation: f32,
    /// Velocity in world units per normalized tick.
    pub velocity: Vec2,
    /// Turn rate applied during the last step (radians per normalized tick).
    pub angular_velocity: f32,
    /// Held control inputs.
    pub intent: ControlIntent,
    /// Automatic velocity stabilization when no input is held.
    pub flight_assist: bool,
    /// FTL sub-state.
    pub travel: TravelPhase,
}

impl KinematicState {
    /// Creates a resting state at the given position and heading.
    #[must_use]
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            intent: ControlIntent::empty(),
            flight_assist: false,
            travel: TravelPhase::Idle,
        }
    }

    /// Unit vector along the current heading.
    #[must_use]
    pub fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// Current speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// `true` while the FTL drive is charging.
    #[must_use]
    pub const fn is_charging_travel(&self) -> bool {
        matches!(self.travel, TravelPhase::Charging { .. })
    }

    /// `true` while in FTL transit.
    #[must_use]
    pub const fn is_in_transit(&self) -> bool {
        matches!(self.travel, TravelPhase::Transit { .. })
    }

    /// The intent the integrator actually applies.
    ///
    /// Engine thrust is suspended for the whole FTL sequence.
    #[must_use]
    pub fn effective_intent(&self) -> ControlIntent {
        if matches!(self.travel, TravelPhase::Idle) {
            self.intent
        } else {
            self.intent - ControlIntent::THRUST
        }
    }

    /// Whether forward thrust is currently applied.
    #[must_use]
    pub fn thrusting(&self) -> bool {
        self.effective_intent().contains(ControlIntent::THRUST)
    }
}

// =============================================================================
// Combat
// =============================================================================

/// Faction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FactionId(pub u16);

/// Regenerating energy shield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    /// Current strength, in `[0, max]`.
    pub current: f32,
    /// Maximum strength.
    pub max: f32,
    /// Regeneration once the recharge delay has elapsed.
    pub regen_per_sec: f32,
    /// Delay after taking shield damage before regeneration resumes.
    pub recharge_delay_secs: f32,
    /// Seconds left before regeneration resumes.
    pub recharge_wait_secs: f32,
}

impl Shield {
    /// Creates a full shield.
    #[must_use]
    pub fn new(max: f32, regen_per_sec: f32, recharge_delay_secs: f32) -> Self {
        Self {
            current: max,
            max,
            regen_per_sec,
            recharge_delay_secs,
            recharge_wait_secs: 0.0,
        }
    }
}

/// A weapon slot with its own cooldown and heat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponMount {
    /// Slot index on the owning entity.
    pub slot: usize,
    /// Definition this mount fires.
    pub weapon: WeaponDefId,
    /// Accumulated heat, in `[0, max_heat]`.
    pub heat: f32,
    /// Seconds until the next shot, never negative.
    pub cooldown: f32,
    /// Set when the mount fired since the last combat step; suppresses heat
    /// decay for one step.
    pub fired_since_step: bool,
}

impl WeaponMount {
    /// Creates a cold, ready mount.
    #[must_use]
    pub fn new(slot: usize, weapon: impl Into<WeaponDefId>) -> Self {
        Self {
            slot,
            weapon: weapon.into(),
            heat: 0.0,
            cooldown: 0.0,
            fired_since_step: false,
        }
    }
}

/// Combat state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Current hull, in `[0, hull_max]`.
    pub hull: f32,
    /// Maximum hull.
    pub hull_max: f32,
    /// Shield, if fitted.
    pub shield: Option<Shield>,
    /// Flat damage reduction applied to hull hits, if armored.
    pub armor_rating: Option<f32>,
    /// Weapon energy pool.
    pub energy: f32,
    /// Capacity of the energy pool.
    pub energy_max: f32,
    /// Energy regenerated per second.
    pub energy_regen_per_sec: f32,
    /// Weapon mounts.
    pub mounts: Vec<WeaponMount>,
    /// Owning faction.
    pub faction: FactionId,
    /// Whether this entity is hostile to the player.
    pub hostile_to_player: bool,
    /// Currently selected target.
    pub target: Option<EntityId>,
    /// Status flags.
    pub status: StatusFlags,
    /// Damage absorbed (shield and hull) since the last combat step.
    pub recent_damage: f32,
}

impl CombatState {
    /// Creates an unshielded, unarmored, unarmed state at full hull.
    #[must_use]
    pub fn new(hull_max: f32) -> Self {
        Self {
            hull: hull_max,
            hull_max,
            shield: None,
            armor_rating: None,
            energy: 0.0,
            energy_max: 0.0,
            energy_regen_per_sec: 0.0,
            mounts: Vec::new(),
            faction: FactionId::default(),
            hostile_to_player: false,
            target: None,
            status: StatusFlags::empty(),
            recent_damage: 0.0,
        }
    }

    /// Fits a full shield.
    #[must_use]
    pub fn with_shield(mut self, max: f32, regen_per_sec: f32, recharge_delay_secs: f32) -> Self {
        self.shield = Some(Shield::new(max, regen_per_sec, recharge_delay_secs));
        self
    }

    /// Sets the armor rating.
    #[must_use]
    pub fn with_armor(mut self, rating: f32) -> Self {
        self.armor_rating = Some(rating);
        self
    }

    /// Fits a full energy pool.
    #[must_use]
    pub fn with_energy(mut self, max: f32, regen_per_sec: f32) -> Self {
        self.energy = max;
        self.energy_max = max;
        self.energy_regen_per_sec = regen_per_sec;
        self
    }

    /// Adds a weapon mount.
    #[must_use]
    pub fn with_mount(mut self, mount: WeaponMount) -> Self {
        self.mounts.push(mount);
        self
    }

    /// Assigns a faction and hostility.
    #[must_use]
    pub fn in_faction(mut self, faction: FactionId, hostile_to_player: bool) -> Self {
        self.faction = faction;
        self.hostile_to_player = hostile_to_player;
        self
    }

    /// Returns `true` once the hull has reached zero.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.status.contains(StatusFlags::DESTROYED)
    }

    /// Current shield strength, zero when no shield is fitted.
    #[must_use]
    pub fn shield_current(&self) -> f32 {
        self.shield.map_or(0.0, |s| s.current)
    }

    /// Looks up a mount by slot.
    #[must_use]
    pub fn mount(&self, slot: usize) -> Option<&WeaponMount> {
        self.mounts.iter().find(|m| m.slot == slot)
    }

    /// Looks up a mount by slot, mutably.
    #[must_use]
    pub fn mount_mut(&mut self, slot: usize) -> Option<&mut WeaponMount> {
        self.mounts.iter_mut().find(|m| m.slot == slot)
    }
}

// =============================================================================
// Entity component bundles
// =============================================================================

/// Components of a vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselComponents {
    /// Physical state.
    pub kinematics: KinematicState,
    /// Hull class tuning.
    pub class: ShipClass,
    /// FTL fuel on board.
    pub fuel: f32,
    /// Combat state.
    pub combat: CombatState,
}

impl VesselComponents {
    /// Creates a vessel at rest with an empty tank and a default hull.
    #[must_use]
    pub fn new(class: ShipClass, position: Vec2, rotation: f32) -> Self {
        Self {
            kinematics: KinematicState::new(position, rotation),
            class,
            fuel: 0.0,
            combat: CombatState::new(100.0),
        }
    }

    /// Sets the fuel on board.
    #[must_use]
    pub fn with_fuel(mut self, fuel: f32) -> Self {
        self.fuel = fuel;
        self
    }

    /// Replaces the combat state.
    #[must_use]
    pub fn with_combat(mut self, combat: CombatState) -> Self {
        self.combat = combat;
        self
    }
}

/// Components of an installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationComponents {
    /// Fixed world position.
    pub position: Vec2,
    /// Combat state.
    pub combat: CombatState,
}

impl InstallationComponents {
    /// Creates an installation.
    #[must_use]
    pub fn new(position: Vec2, combat: CombatState) -> Self {
        Self { position, combat }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_kinematics_is_at_rest() {
        let k = KinematicState::new(Vec2::new(3.0, 4.0), 1.0);
        assert_eq!(k.velocity, Vec2::ZERO);
        assert_eq!(k.travel, TravelPhase::Idle);
        assert!(k.intent.is_empty());
        assert!(!k.is_charging_travel());
        assert!(!k.is_in_transit());
    }

    #[test]
    fn thrust_is_masked_during_travel() {
        let mut k = KinematicState::new(Vec2::ZERO, 0.0);
        k.intent = ControlIntent::THRUST | ControlIntent::ROTATE_LEFT;
        assert!(k.thrusting());

        k.travel = TravelPhase::Charging {
            destination: Vec2::ONE,
            remaining_secs: 1.0,
            transit_secs: 1.0,
            fuel_cost: 0.0,
        };
        assert!(!k.thrusting());
        assert_eq!(k.effective_intent(), ControlIntent::ROTATE_LEFT);
        // The held input survives the suspension.
        assert!(k.intent.contains(ControlIntent::THRUST));
    }

    #[test]
    fn heading_follows_rotation() {
        let k = KinematicState::new(Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        assert!(k.heading().x.abs() < 1e-6);
        assert!((k.heading().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn combat_builders() {
        let c = CombatState::new(200.0)
            .with_shield(50.0, 5.0, 2.0)
            .with_armor(10.0)
            .with_energy(100.0, 10.0)
            .with_mount(WeaponMount::new(0, "laser"))
            .in_faction(FactionId(3), true);

        assert!((c.hull - 200.0).abs() < f32::EPSILON);
        assert!((c.shield_current() - 50.0).abs() < f32::EPSILON);
        assert_eq!(c.armor_rating, Some(10.0));
        assert!((c.energy - 100.0).abs() < f32::EPSILON);
        assert!(c.mount(0).is_some());
        assert!(c.mount(1).is_none());
        assert!(c.hostile_to_player);
        assert!(!c.is_destroyed());
    }

    #[test]
    fn unshielded_reports_zero_shield() {
        assert!(CombatState::new(10.0).shield_current().abs() < f32::EPSILON);
    }

    #[test]
    fn intent_serializes_as_bits() {
        let intent = ControlIntent::THRUST | ControlIntent::BOOST;
        let json = serde_json::to_string(&intent).unwrap();
        let back: ControlIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, back);
    }
}
