//! Simulation configuration and gameplay tuning.
//!
//! Runtime settings (tick rate, catch-up limit) and gameplay tuning (ship
//! classes, combat constants, weapon definitions) are plain serde structs with
//! sensible defaults, so a config file only needs to name what it changes.
//!
//! # Example
//!
//! ```
//! use starwake_core::config::SimConfig;
//!
//! let config = SimConfig::from_json_str(r#"{ "tick_rate_hz": 30 }"#).unwrap();
//! assert_eq!(config.tick_rate_hz, 30);
//! assert!(config.ship_classes.contains_key("corvette"));
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::weapon::{DamageType, WeaponCatalog, WeaponDefinition};

/// Tick rate the per-tick movement factors are tuned for.
pub const REFERENCE_TICK_RATE_HZ: f32 = 60.0;

/// Flight and drive tuning of a hull class.
///
/// Multiplicative factors are per reference tick; the movement simulator
/// rescales them for other tick lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipClass {
    /// Forward acceleration per reference tick.
    pub thrust_accel: f32,
    /// Lateral acceleration per reference tick.
    pub strafe_accel: f32,
    /// Turn per reference tick, in radians.
    pub turn_rate: f32,
    /// Velocity multiplier while braking (< 1).
    pub brake_factor: f32,
    /// Velocity multiplier while boosting (> 1).
    pub boost_multiplier: f32,
    /// Speed cap applied while boosting.
    pub max_safe_speed: f32,
    /// Velocity multiplier of flight assist with no input held (< 1).
    pub stabilization_factor: f32,
    /// Passive drag; velocity is multiplied by `1 - drag_factor` every tick.
    pub drag_factor: f32,
    /// FTL charge duration in seconds.
    pub ftl_charge_secs: f32,
    /// FTL transit speed in world units per second.
    pub ftl_speed: f32,
    /// Shortest transit.
    pub ftl_min_transit_secs: f32,
    /// Longest transit.
    pub ftl_max_transit_secs: f32,
    /// Fuel spent by any jump.
    pub ftl_fuel_base: f32,
    /// Additional fuel per world unit travelled.
    pub ftl_fuel_per_unit: f32,
    /// Strongest gravity well the drive can charge inside.
    pub ftl_gravity_tolerance: f32,
}

impl Default for ShipClass {
    fn default() -> Self {
        Self {
            thrust_accel: 0.2,
            strafe_accel: 0.1,
            turn_rate: 0.05,
            brake_factor: 0.9,
            boost_multiplier: 1.05,
            max_safe_speed: 30.0,
            stabilization_factor: 0.95,
            drag_factor: 0.01,
            ftl_charge_secs: 3.0,
            ftl_speed: 2000.0,
            ftl_min_transit_secs: 1.0,
            ftl_max_transit_secs: 10.0,
            ftl_fuel_base: 10.0,
            ftl_fuel_per_unit: 0.001,
            ftl_gravity_tolerance: 0.5,
        }
    }
}

impl ShipClass {
    /// Fuel needed to jump `distance` world units.
    #[must_use]
    pub fn jump_fuel_cost(&self, distance: f32) -> f32 {
        self.ftl_fuel_base + distance * self.ftl_fuel_per_unit
    }

    /// Transit duration for a jump of `distance` world units.
    #[must_use]
    pub fn transit_secs(&self, distance: f32) -> f32 {
        let raw = if self.ftl_speed > 0.0 {
            distance / self.ftl_speed
        } else {
            self.ftl_max_transit_secs
        };
        raw.clamp(self.ftl_min_transit_secs, self.ftl_max_transit_secs)
    }

    /// Forward speed at which thrust and drag balance.
    #[must_use]
    pub fn cruise_speed(&self) -> f32 {
        if self.drag_factor <= 0.0 {
            return f32::INFINITY;
        }
        self.thrust_accel * (1.0 - self.drag_factor) / self.drag_factor
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let unit = |v: f32| (0.0..=1.0).contains(&v);
        if !unit(self.brake_factor) || !unit(self.stabilization_factor) {
            return Err(ConfigError::Invalid(format!(
                "ship class {name}: brake and stabilization factors must be in [0, 1]"
            )));
        }
        if !(0.0..1.0).contains(&self.drag_factor) {
            return Err(ConfigError::Invalid(format!(
                "ship class {name}: drag_factor must be in [0, 1)"
            )));
        }
        if self.boost_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "ship class {name}: boost_multiplier must be >= 1"
            )));
        }
        if self.ftl_min_transit_secs > self.ftl_max_transit_secs {
            return Err(ConfigError::Invalid(format!(
                "ship class {name}: ftl_min_transit_secs exceeds ftl_max_transit_secs"
            )));
        }
        Ok(())
    }
}

/// Global combat constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Crit chance for weapons that do not define their own.
    pub default_crit_chance: f32,
    /// Crit multiplier for weapons that do not define their own.
    pub default_crit_multiplier: f32,
    /// Heat at which a mount overheats.
    pub max_heat: f32,
    /// Heat shed per second by a mount that did not fire.
    pub heat_decay_per_sec: f32,
    /// Damage within one tick, as a fraction of max hull, that interrupts an
    /// FTL charge.
    pub heavy_damage_fraction: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            default_crit_chance: 0.05,
            default_crit_multiplier: 1.5,
            max_heat: 100.0,
            heat_decay_per_sec: 20.0,
            heavy_damage_fraction: 0.1,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed simulation tick rate.
    pub tick_rate_hz: u32,
    /// Most ticks [`Simulation::advance`](crate::simulation::Simulation::advance)
    /// runs for one frame before dropping the backlog.
    pub max_catch_up_ticks: u32,
    /// Combat constants.
    pub combat: CombatTuning,
    /// Named hull classes.
    pub ship_classes: BTreeMap<String, ShipClass>,
    /// Weapon definitions.
    pub weapons: Vec<WeaponDefinition>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let mut ship_classes = BTreeMap::new();
        ship_classes.insert("corvette".to_string(), ShipClass::default());
        ship_classes.insert(
            "freighter".to_string(),
            ShipClass {
                thrust_accel: 0.08,
                strafe_accel: 0.03,
                turn_rate: 0.02,
                max_safe_speed: 15.0,
                ftl_charge_secs: 6.0,
                ftl_gravity_tolerance: 0.3,
                ..ShipClass::default()
            },
        );

        Self {
            tick_rate_hz: 60,
            max_catch_up_ticks: 8,
            combat: CombatTuning::default(),
            ship_classes,
            weapons: vec![
                WeaponDefinition::new("pulse_laser", 12.0, DamageType::Energy)
                    .with_rate_of_fire(4.0)
                    .with_range(600.0)
                    .with_energy_cost(5.0)
                    .with_heat(8.0),
                WeaponDefinition::new("mass_driver", 40.0, DamageType::Kinetic)
                    .with_rate_of_fire(0.8)
                    .with_range(900.0)
                    .with_armor_penetration(0.5)
                    .with_heat(25.0),
                WeaponDefinition::new("ion_lance", 25.0, DamageType::Ion)
                    .with_rate_of_fire(1.0)
                    .with_range(450.0)
                    .with_shield_bypass(0.35)
                    .with_energy_cost(20.0)
                    .with_heat(30.0),
            ],
        }
    }
}

impl SimConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// the errors of [`SimConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading simulation config");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::Invalid("tick_rate_hz must be positive".into()));
        }
        if self.max_catch_up_ticks == 0 {
            return Err(ConfigError::Invalid(
                "max_catch_up_ticks must be at least 1".into(),
            ));
        }
        if self.combat.max_heat <= 0.0 {
            return Err(ConfigError::Invalid("combat.max_heat must be positive".into()));
        }
        for (name, class) in &self.ship_classes {
            class.validate(name)?;
        }
        for weapon in &self.weapons {
            weapon.validate()?;
        }
        Ok(())
    }

    /// Fixed tick length in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz as f32
    }

    /// Looks up a hull class by name.
    #[must_use]
    pub fn ship_class(&self, name: &str) -> Option<ShipClass> {
        self.ship_classes.get(name).copied()
    }

    /// Builds the shared weapon catalog from the configured definitions.
    #[must_use]
    pub fn weapon_catalog(&self) -> WeaponCatalog {
        WeaponCatalog::from_definitions(self.weapons.iter().cloned())
    }
}
