//! Weapon definitions and resolved damage.
//!
//! A [`WeaponDefinition`] is immutable once loaded. The [`WeaponCatalog`]
//! hands out `Arc`s so every mount referencing the same weapon shares one
//! definition. A [`DamageInstance`] is produced for a single hit and consumed
//! immediately; it is never stored.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identifier of a weapon definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponDefId(String);

impl WeaponDefId {
    /// Creates an identifier.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeaponDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WeaponDefId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WeaponDefId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Damage category. Carried through to events for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Slugs and railgun rounds.
    Kinetic,
    /// Lasers and plasma.
    Energy,
    /// Missiles and torpedoes.
    Explosive,
    /// Ion weapons.
    Ion,
}

fn one() -> f32 {
    1.0
}

/// Immutable weapon stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    /// Catalog key.
    pub id: WeaponDefId,
    /// Base damage per shot.
    pub damage_amount: f32,
    /// Damage category.
    pub damage_type: DamageType,
    /// Crit chance; falls back to the global default when absent.
    #[serde(default)]
    pub crit_chance: Option<f32>,
    /// Crit multiplier; falls back to the global default when absent.
    #[serde(default)]
    pub crit_multiplier: Option<f32>,
    /// Fraction of the target's armor ignored, in `[0, 1]`.
    #[serde(default)]
    pub armor_penetration: f32,
    /// Chance to skip shields entirely, in `[0, 1]`.
    #[serde(default)]
    pub shield_bypass_chance: f32,
    /// Shots per second.
    #[serde(default = "one")]
    pub rate_of_fire: f32,
    /// Longest distance at which the weapon may fire.
    #[serde(default)]
    pub effective_range: f32,
    /// Energy drawn per shot.
    #[serde(default)]
    pub energy_per_shot: f32,
    /// Heat added per shot.
    #[serde(default)]
    pub heat_per_shot: f32,
}

impl WeaponDefinition {
    /// Creates a definition firing once per second with no range, costs or
    /// modifiers; use the `with_*` builders to fill it in.
    #[must_use]
    pub fn new(id: &str, damage_amount: f32, damage_type: DamageType) -> Self {
        Self {
            id: WeaponDefId::new(id),
            damage_amount,
            damage_type,
            crit_chance: None,
            crit_multiplier: None,
            armor_penetration: 0.0,
            shield_bypass_chance: 0.0,
            rate_of_fire: 1.0,
            effective_range: 0.0,
            energy_per_shot: 0.0,
            heat_per_shot: 0.0,
        }
    }

    /// Overrides the global crit chance and multiplier.
    #[must_use]
    pub fn with_crit(mut self, chance: f32, multiplier: f32) -> Self {
        self.crit_chance = Some(chance);
        self.crit_multiplier = Some(multiplier);
        self
    }

    /// Sets the armor penetration factor.
    #[must_use]
    pub fn with_armor_penetration(mut self, factor: f32) -> Self {
        self.armor_penetration = factor;
        self
    }

    /// Sets the shield bypass chance.
    #[must_use]
    pub fn with_shield_bypass(mut self, chance: f32) -> Self {
        self.shield_bypass_chance = chance;
        self
    }

    /// Sets shots per second.
    #[must_use]
    pub fn with_rate_of_fire(mut self, per_sec: f32) -> Self {
        self.rate_of_fire = per_sec;
        self
    }

    /// Sets the effective range.
    #[must_use]
    pub fn with_range(mut self, range: f32) -> Self {
        self.effective_range = range;
        self
    }

    /// Sets the energy drawn per shot.
    #[must_use]
    pub fn with_energy_cost(mut self, energy: f32) -> Self {
        self.energy_per_shot = energy;
        self
    }

    /// Sets the heat added per shot.
    #[must_use]
    pub fn with_heat(mut self, heat: f32) -> Self {
        self.heat_per_shot = heat;
        self
    }

    /// Seconds between shots.
    #[must_use]
    pub fn refire_secs(&self) -> f32 {
        1.0 / self.rate_of_fire
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let unit = |v: f32| (0.0..=1.0).contains(&v);
        let invalid = |what: &str| ConfigError::Invalid(format!("weapon {}: {what}", self.id));

        if self.rate_of_fire <= 0.0 {
            return Err(invalid("rate_of_fire must be positive"));
        }
        if self.damage_amount < 0.0 || self.effective_range < 0.0 {
            return Err(invalid("damage and range must not be negative"));
        }
        if !unit(self.armor_penetration) || !unit(self.shield_bypass_chance) {
            return Err(invalid("penetration and bypass chance must be in [0, 1]"));
        }
        if self.crit_chance.is_some_and(|c| !unit(c)) {
            return Err(invalid("crit_chance must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Read-only registry of weapon definitions.
#[derive(Debug, Clone, Default)]
pub struct WeaponCatalog {
    defs: BTreeMap<WeaponDefId, Arc<WeaponDefinition>>,
}

impl WeaponCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog; a later definition replaces an earlier one with the
    /// same id.
    #[must_use]
    pub fn from_definitions(defs: impl IntoIterator<Item = WeaponDefinition>) -> Self {
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def);
        }
        catalog
    }

    /// Registers a definition.
    pub fn insert(&mut self, def: WeaponDefinition) {
        self.defs.insert(def.id.clone(), Arc::new(def));
    }

    /// Looks up a definition.
    #[must_use]
    pub fn get(&self, id: &WeaponDefId) -> Option<Arc<WeaponDefinition>> {
        self.defs.get(id).cloned()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// One resolved hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageInstance {
    /// Damage after the crit roll.
    pub amount: f32,
    /// Damage category.
    pub damage_type: DamageType,
    /// Whether the crit multiplier was applied.
    pub crit: bool,
    /// Fraction of armor ignored.
    pub armor_penetration: f32,
    /// Chance to skip shields.
    pub shield_bypass_chance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults_fill_missing_fields() {
        let def: WeaponDefinition = serde_json::from_str(
            r#"{ "id": "flak", "damage_amount": 5.0, "damage_type": "explosive" }"#,
        )
        .unwrap();

        assert_eq!(def.id.as_str(), "flak");
        assert_eq!(def.damage_type, DamageType::Explosive);
        assert!(def.crit_chance.is_none());
        assert!((def.rate_of_fire - 1.0).abs() < f32::EPSILON);
        assert!(def.effective_range.abs() < f32::EPSILON);
    }

    #[test]
    fn refire_is_inverse_of_rate() {
        let def = WeaponDefinition::new("gun", 1.0, DamageType::Kinetic).with_rate_of_fire(4.0);
        assert!((def.refire_secs() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn validation_catches_bad_values() {
        let zero_rate = WeaponDefinition::new("a", 1.0, DamageType::Kinetic).with_rate_of_fire(0.0);
        assert!(zero_rate.validate().is_err());

        let bad_pen =
            WeaponDefinition::new("b", 1.0, DamageType::Kinetic).with_armor_penetration(1.5);
        assert!(bad_pen.validate().is_err());

        let bad_crit = WeaponDefinition::new("c", 1.0, DamageType::Kinetic).with_crit(2.0, 2.0);
        assert!(bad_crit.validate().is_err());

        let ok = WeaponDefinition::new("d", 1.0, DamageType::Kinetic).with_range(10.0);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn catalog_shares_definitions() {
        let catalog = WeaponCatalog::from_definitions([
            WeaponDefinition::new("gun", 1.0, DamageType::Kinetic),
            WeaponDefinition::new("gun", 2.0, DamageType::Kinetic),
        ]);

        assert_eq!(catalog.len(), 1);
        let a = catalog.get(&"gun".into()).unwrap();
        let b = catalog.get(&"gun".into()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!((a.damage_amount - 2.0).abs() < f32::EPSILON);
        assert!(catalog.get(&"missing".into()).is_none());
    }
}
