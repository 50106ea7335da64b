//! Combat resolver: weapons, damage, shields and destruction.
//!
//! # Damage pipeline
//!
//! A hit is resolved in a fixed order:
//!
//! 1. Crit roll on the weapon's chance (falling back to the global default).
//! 2. Shield-bypass roll.
//! 3. If a shield with charge remains and was not bypassed, it absorbs the
//!    hit. Damage beyond the remaining charge is discarded; it does not reach
//!    the hull.
//! 4. Otherwise armor reduces the hit by `rating * (1 - penetration)` and the
//!    rest comes off the hull.
//! 5. A hull reaching zero marks the entity destroyed, exactly once.
//!
//! All rolls draw from one seeded generator owned by the resolver, so a run
//! is reproducible from its seed and command stream.
//!
//! # Readiness
//!
//! A mount can fire only when [`ReadyState::Ready`]. Blocking conditions are
//! reported in precedence order: overheated, cooling, out of ammunition, out
//! of energy.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::arena::Arena;
use crate::command::{Command, CommandKind};
use crate::config::{CombatTuning, SimConfig};
use crate::entity::{CombatState, Entity, EntityId, StatusFlags, WeaponMount};
use crate::error::FireError;
use crate::event::{EventQueue, SimEvent};
use crate::weapon::{DamageInstance, WeaponCatalog, WeaponDefId, WeaponDefinition};

use super::Resolver;

/// Ammunition collaborator.
///
/// Consulted before every shot and told about every shot fired. Energy is
/// tracked by the resolver itself; ammunition is owned elsewhere.
pub trait Munitions: fmt::Debug {
    /// Whether `entity` has ammunition for `weapon`.
    fn ammo_available(&self, entity: EntityId, weapon: &WeaponDefId) -> bool;

    /// Records one round of `weapon` spent by `entity`.
    fn consume_ammo(&mut self, entity: EntityId, weapon: &WeaponDefId);
}

/// Munitions that never run out.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedMunitions;

impl Munitions for UnlimitedMunitions {
    fn ammo_available(&self, _entity: EntityId, _weapon: &WeaponDefId) -> bool {
        true
    }

    fn consume_ammo(&mut self, _entity: EntityId, _weapon: &WeaponDefId) {}
}

/// Whether a mount can fire right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// Can fire.
    Ready,
    /// Refire timer still running.
    Cooling,
    /// Heat at the cap.
    Overheated,
    /// No ammunition.
    NoAmmo,
    /// Not enough energy for one shot.
    NoEnergy,
}

impl ReadyState {
    fn into_result(self) -> Result<(), FireError> {
        match self {
            Self::Ready => Ok(()),
            Self::Cooling => Err(FireError::Cooling),
            Self::Overheated => Err(FireError::Overheated),
            Self::NoAmmo => Err(FireError::NoAmmo),
            Self::NoEnergy => Err(FireError::NoEnergy),
        }
    }
}

/// What one hit did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Shield points removed.
    pub shield_damage: f32,
    /// Hull points removed.
    pub hull_damage: f32,
    /// Crit applied.
    pub crit: bool,
    /// Shield skipped by the bypass roll.
    pub bypassed_shield: bool,
    /// This hit destroyed the target.
    pub destroyed: bool,
}

/// Owns combat state: mounts, shields, energy, hull and targeting.
#[derive(Debug)]
pub struct CombatResolver {
    catalog: WeaponCatalog,
    tuning: CombatTuning,
    rng: ChaCha8Rng,
    munitions: Box<dyn Munitions>,
}

impl CombatResolver {
    /// Creates a resolver with unlimited ammunition.
    #[must_use]
    pub fn new(catalog: WeaponCatalog, tuning: CombatTuning, seed: u64) -> Self {
        Self {
            catalog,
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
            munitions: Box::new(UnlimitedMunitions),
        }
    }

    /// Creates a resolver from the config's weapons and combat tuning.
    #[must_use]
    pub fn from_config(config: &SimConfig, seed: u64) -> Self {
        Self::new(config.weapon_catalog(), config.combat, seed)
    }

    /// Replaces the ammunition collaborator.
    #[must_use]
    pub fn with_munitions(mut self, munitions: impl Munitions + 'static) -> Self {
        self.munitions = Box::new(munitions);
        self
    }

    /// The weapon catalog.
    #[must_use]
    pub fn catalog(&self) -> &WeaponCatalog {
        &self.catalog
    }

    /// Combat constants in use.
    #[must_use]
    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Readiness of one mount, `None` if the entity, mount or weapon is
    /// unknown.
    #[must_use]
    pub fn weapon_ready_state(
        &self,
        arena: &Arena,
        source: EntityId,
        slot: usize,
    ) -> Option<ReadyState> {
        let combat = arena.get(source)?.combat();
        let mount = combat.mount(slot)?;
        let def = self.catalog.get(&mount.weapon)?;
        Some(self.readiness(source, combat, mount, &def))
    }

    /// Whether `target` is within the mount's effective range.
    ///
    /// Destroyed targets and vessels in FTL transit are never in range.
    #[must_use]
    pub fn is_target_in_range(
        &self,
        arena: &Arena,
        source: EntityId,
        slot: usize,
        target: EntityId,
    ) -> bool {
        let Some(range) = self.mount_range(arena, source, slot) else {
            return false;
        };
        if !arena.get(target).is_some_and(Entity::is_targetable) {
            return false;
        }
        arena
            .distance_between(source, target)
            .is_some_and(|d| d <= range)
    }

    /// Live hostile entities within the mount's range, in ID order.
    ///
    /// Two entities are hostile when they differ in faction or in
    /// hostility to the player.
    #[must_use]
    pub fn targets_in_range(&self, arena: &Arena, source: EntityId, slot: usize) -> Vec<EntityId> {
        let (Some(range), Some(me)) = (self.mount_range(arena, source, slot), arena.get(source))
        else {
            return Vec::new();
        };
        let mine = me.combat();
        arena
            .spatial()
            .query_radius(me.position(), range)
            .into_iter()
            .filter(|&id| id != source)
            .filter(|&id| {
                arena
                    .get(id)
                    .is_some_and(|e| e.is_targetable() && is_hostile(mine, e.combat()))
            })
            .collect()
    }

    fn mount_range(&self, arena: &Arena, source: EntityId, slot: usize) -> Option<f32> {
        let mount = arena.get(source)?.combat().mount(slot)?;
        self.catalog.get(&mount.weapon).map(|d| d.effective_range)
    }

    fn readiness(
        &self,
        source: EntityId,
        combat: &CombatState,
        mount: &WeaponMount,
        def: &WeaponDefinition,
    ) -> ReadyState {
        if mount.heat >= self.tuning.max_heat {
            ReadyState::Overheated
        } else if mount.cooldown > 0.0 {
            ReadyState::Cooling
        } else if !self.munitions.ammo_available(source, &def.id) {
            ReadyState::NoAmmo
        } else if combat.energy < def.energy_per_shot {
            ReadyState::NoEnergy
        } else {
            ReadyState::Ready
        }
    }

    // ---------------------------------------------------------------------
    // Targeting
    // ---------------------------------------------------------------------

    /// Selects or clears the current target of `source`.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or destroyed, or when the new target
    /// is missing, destroyed, or the source itself.
    pub fn select_target(
        &self,
        arena: &mut Arena,
        source: EntityId,
        target: Option<EntityId>,
    ) -> Result<(), FireError> {
        live_source(arena, source)?;
        if let Some(t) = target {
            check_target(arena, source, t)?;
        }
        arena
            .get_mut(source)
            .ok_or(FireError::UnknownSource(source))?
            .combat_mut()
            .target = target;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Firing
    // ---------------------------------------------------------------------

    /// Fires one mount at `target`, or at the selected target when `None`.
    ///
    /// On success the mount's cooldown restarts, heat and energy are charged,
    /// and the hit is applied immediately.
    ///
    /// # Errors
    ///
    /// Any [`FireError`]; a rejected shot changes nothing.
    pub fn fire_weapon(
        &mut self,
        arena: &mut Arena,
        source: EntityId,
        slot: usize,
        target: Option<EntityId>,
        events: &mut EventQueue,
    ) -> Result<DamageOutcome, FireError> {
        let combat = live_source(arena, source)?;
        let mount = combat.mount(slot).ok_or(FireError::UnknownMount(slot))?;
        let def = self
            .catalog
            .get(&mount.weapon)
            .ok_or(FireError::UnknownWeapon(slot))?;
        let target = target.or(combat.target).ok_or(FireError::NoTarget)?;
        check_target(arena, source, target)?;

        self.readiness(source, combat, mount, &def).into_result()?;

        let distance = arena
            .distance_between(source, target)
            .ok_or(FireError::TargetInvalid(target))?;
        if distance > def.effective_range {
            return Err(FireError::OutOfRange {
                distance,
                range: def.effective_range,
            });
        }

        let combat = arena
            .get_mut(source)
            .ok_or(FireError::UnknownSource(source))?
            .combat_mut();
        combat.energy -= def.energy_per_shot;
        let mount = combat
            .mount_mut(slot)
            .ok_or(FireError::UnknownMount(slot))?;
        mount.cooldown = def.refire_secs();
        mount.heat = (mount.heat + def.heat_per_shot).min(self.tuning.max_heat);
        mount.fired_since_step = true;
        self.munitions.consume_ammo(source, &def.id);

        debug!(%source, slot, %target, weapon = %def.id, "weapon fired");
        events.push(SimEvent::WeaponFired {
            source,
            slot,
            target,
            weapon: def.id.clone(),
        });

        let damage = self.calculate_damage(&def);
        self.apply_damage(arena, Some(source), target, damage, events)
    }

    /// Rolls one hit from a weapon definition.
    pub fn calculate_damage(&mut self, def: &WeaponDefinition) -> DamageInstance {
        let chance = def.crit_chance.unwrap_or(self.tuning.default_crit_chance);
        let multiplier = def
            .crit_multiplier
            .unwrap_or(self.tuning.default_crit_multiplier);
        let crit = self.roll(chance);

        DamageInstance {
            amount: if crit {
                def.damage_amount * multiplier
            } else {
                def.damage_amount
            },
            damage_type: def.damage_type,
            crit,
            armor_penetration: def.armor_penetration,
            shield_bypass_chance: def.shield_bypass_chance,
        }
    }

    /// Applies a hit to `target` through shield, armor and hull.
    ///
    /// # Errors
    ///
    /// [`FireError::TargetInvalid`] when the target is missing, already
    /// destroyed or in FTL transit.
    pub fn apply_damage(
        &mut self,
        arena: &mut Arena,
        source: Option<EntityId>,
        target: EntityId,
        damage: DamageInstance,
        events: &mut EventQueue,
    ) -> Result<DamageOutcome, FireError> {
        if !arena.get(target).is_some_and(Entity::is_targetable) {
            return Err(FireError::TargetInvalid(target));
        }

        let bypass_roll = self.roll(damage.shield_bypass_chance);
        let shielded = arena
            .get(target)
            .is_some_and(|e| e.combat().shield_current() > 0.0);
        let bypassed_shield = shielded && bypass_roll;

        let combat = arena
            .get_mut(target)
            .ok_or(FireError::TargetInvalid(target))?
            .combat_mut();
        let mut outcome = DamageOutcome {
            crit: damage.crit,
            bypassed_shield,
            ..DamageOutcome::default()
        };
        let mut shield_depleted = false;

        match combat.shield.as_mut() {
            Some(shield) if shielded && !bypassed_shield => {
                outcome.shield_damage = damage.amount.min(shield.current);
                shield.current -= outcome.shield_damage;
                shield.recharge_wait_secs = shield.recharge_delay_secs;
                if shield.current <= 0.0 {
                    shield.current = 0.0;
                    shield_depleted = true;
                }
            }
            _ => {
                let armor = combat.armor_rating.unwrap_or(0.0);
                let mitigated = armor * (1.0 - damage.armor_penetration);
                outcome.hull_damage = (damage.amount - mitigated).max(0.0).min(combat.hull);
                combat.hull -= outcome.hull_damage;
            }
        }

        if shield_depleted {
            combat.status.insert(StatusFlags::SHIELDS_DOWN);
        }
        combat.recent_damage += outcome.shield_damage + outcome.hull_damage;
        if combat.hull <= 0.0 {
            combat.hull = 0.0;
            combat.status.insert(StatusFlags::DESTROYED);
            outcome.destroyed = true;
        }

        trace!(
            %target,
            shield = outcome.shield_damage,
            hull = outcome.hull_damage,
            crit = outcome.crit,
            "damage applied"
        );
        events.push(SimEvent::DamageDealt {
            source,
            target,
            damage_type: damage.damage_type,
            shield_damage: outcome.shield_damage,
            hull_damage: outcome.hull_damage,
            crit: outcome.crit,
            bypassed_shield,
        });
        if shield_depleted {
            events.push(SimEvent::ShieldDepleted { entity: target });
        }
        if outcome.destroyed {
            info!(entity = %target, destroyer = ?source, "entity destroyed");
            events.push(SimEvent::TargetDestroyed {
                entity: target,
                destroyer: source,
            });
            clear_targets_of(arena, target, events);
        }

        Ok(outcome)
    }

    /// `true` with probability `chance`; a chance of zero never succeeds.
    ///
    /// Always draws, so the stream position depends only on how many rolls
    /// were made.
    fn roll(&mut self, chance: f32) -> bool {
        let draw = self.rng.gen::<f32>();
        chance > 0.0 && draw < chance
    }
}

impl Resolver for CombatResolver {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Combat]
    }

    fn resolve(&mut self, commands: &[&Command], arena: &mut Arena, events: &mut EventQueue) {
        for command in commands {
            let result = match command {
                Command::SelectTarget { source, target } => {
                    self.select_target(arena, *source, *target)
                }
                Command::FireWeapon {
                    source,
                    slot,
                    target,
                } => self
                    .fire_weapon(arena, *source, *slot, *target, events)
                    .map(|_| ()),
                Command::SetControls { .. }
                | Command::SetFlightAssist { .. }
                | Command::InitiateTravel { .. }
                | Command::CancelTravel { .. } => Ok(()),
            };

            if let Err(reason) = result {
                debug!(entity = %command.issuer(), %reason, "combat command rejected");
                events.push(SimEvent::CommandRejected {
                    entity: command.issuer(),
                    reason: reason.into(),
                });
            }
        }
    }

    fn step(&mut self, arena: &mut Arena, dt: f32, _events: &mut EventQueue) {
        let decay = self.tuning.heat_decay_per_sec * dt;

        for entity in arena.entities_sorted_mut() {
            let combat = entity.combat_mut();
            combat.recent_damage = 0.0;
            if combat.is_destroyed() {
                continue;
            }

            for mount in &mut combat.mounts {
                mount.cooldown = (mount.cooldown - dt).max(0.0);
                if !mount.fired_since_step {
                    mount.heat = (mount.heat - decay).max(0.0);
                }
                mount.fired_since_step = false;
            }

            if let Some(shield) = combat.shield.as_mut() {
                if shield.recharge_wait_secs > 0.0 {
                    shield.recharge_wait_secs = (shield.recharge_wait_secs - dt).max(0.0);
                } else if shield.current < shield.max {
                    shield.current = (shield.current + shield.regen_per_sec * dt).min(shield.max);
                }
                if shield.current > 0.0 {
                    combat.status.remove(StatusFlags::SHIELDS_DOWN);
                }
            }

            combat.energy = (combat.energy + combat.energy_regen_per_sec * dt).min(combat.energy_max);
        }
    }
}

fn live_source(arena: &Arena, source: EntityId) -> Result<&CombatState, FireError> {
    let entity = arena.get(source).ok_or(FireError::UnknownSource(source))?;
    if entity.is_destroyed() {
        return Err(FireError::SourceDestroyed(source));
    }
    Ok(entity.combat())
}

fn check_target(arena: &Arena, source: EntityId, target: EntityId) -> Result<(), FireError> {
    let valid = target != source && arena.get(target).is_some_and(Entity::is_targetable);
    if valid {
        Ok(())
    } else {
        Err(FireError::TargetInvalid(target))
    }
}

fn is_hostile(a: &CombatState, b: &CombatState) -> bool {
    a.faction != b.faction || a.hostile_to_player != b.hostile_to_player
}

fn clear_targets_of(arena: &mut Arena, lost: EntityId, events: &mut EventQueue) {
    for entity in arena.entities_sorted_mut() {
        let id = entity.id();
        let combat = entity.combat_mut();
        if combat.target == Some(lost) {
            combat.target = None;
            events.push(SimEvent::TargetCleared { entity: id, lost });
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
