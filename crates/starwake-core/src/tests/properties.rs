//! Property tests for state bounds that must hold for any input.

use glam::Vec2;
use proptest::prelude::*;

use crate::arena::Arena;
use crate::config::{CombatTuning, ShipClass};
use crate::entity::{CombatState, ControlIntent, KinematicState, WeaponMount};
use crate::event::EventQueue;
use crate::resolver::{integrate, CombatResolver, Resolver};
use crate::weapon::{DamageInstance, DamageType, WeaponCatalog, WeaponDefinition};

fn arb_hit() -> impl Strategy<Value = DamageInstance> {
    (0.0f32..300.0, 0.0f32..=1.0, 0.0f32..=1.0, any::<bool>()).prop_map(
        |(amount, armor_penetration, shield_bypass_chance, crit)| DamageInstance {
            amount,
            damage_type: DamageType::Kinetic,
            crit,
            armor_penetration,
            shield_bypass_chance,
        },
    )
}

fn arb_intent() -> impl Strategy<Value = ControlIntent> {
    any::<u8>().prop_map(ControlIntent::from_bits_truncate)
}

proptest! {
    #[test]
    fn hull_and_shield_stay_in_bounds(
        hull_max in 1.0f32..500.0,
        shield_max in 0.0f32..200.0,
        armor in 0.0f32..50.0,
        hits in prop::collection::vec((arb_hit(), 0.0f32..2.0), 1..40),
        seed in any::<u64>(),
    ) {
        let mut arena = Arena::new();
        let target = arena.spawn_installation(
            Vec2::ZERO,
            CombatState::new(hull_max)
                .with_shield(shield_max, 10.0, 0.5)
                .with_armor(armor),
        );
        let mut resolver = CombatResolver::new(WeaponCatalog::new(), CombatTuning::default(), seed);
        let mut events = EventQueue::new();

        for (hit, dt) in hits {
            // Hits on a wreck are rejected; bounds must hold either way.
            let _ = resolver.apply_damage(&mut arena, None, target, hit, &mut events);
            resolver.step(&mut arena, dt, &mut events);

            let c = arena.get(target).unwrap().combat();
            prop_assert!(c.hull >= 0.0 && c.hull <= c.hull_max);
            let s = c.shield.unwrap();
            prop_assert!(s.current >= 0.0 && s.current <= s.max);
            prop_assert_eq!(c.is_destroyed(), c.hull <= 0.0);
        }
    }

    #[test]
    fn heat_never_exceeds_cap(
        heat_per_shot in 0.0f32..150.0,
        rate_of_fire in 0.1f32..20.0,
        plan in prop::collection::vec((any::<bool>(), 0.0f32..0.5), 1..100),
    ) {
        let def = WeaponDefinition::new("gun", 1.0, DamageType::Energy)
            .with_rate_of_fire(rate_of_fire)
            .with_range(100.0)
            .with_heat(heat_per_shot);
        let mut arena = Arena::new();
        let shooter = arena.spawn_installation(
            Vec2::ZERO,
            CombatState::new(10.0).with_mount(WeaponMount::new(0, "gun")),
        );
        let target = arena.spawn_installation(Vec2::new(10.0, 0.0), CombatState::new(1.0e9));
        let mut resolver = CombatResolver::new(
            WeaponCatalog::from_definitions([def]),
            CombatTuning::default(),
            0,
        );
        let mut events = EventQueue::new();
        let cap = resolver.tuning().max_heat;

        for (fire, dt) in plan {
            if fire {
                let _ = resolver.fire_weapon(&mut arena, shooter, 0, Some(target), &mut events);
            }
            resolver.step(&mut arena, dt, &mut events);

            let mount = arena.get(shooter).unwrap().combat().mount(0).unwrap();
            prop_assert!(mount.heat >= 0.0 && mount.heat <= cap);
            prop_assert!(mount.cooldown >= 0.0);
        }
    }

    #[test]
    fn thrust_alone_approaches_cruise_speed_monotonically(
        thrust_accel in 0.01f32..1.0,
        drag_factor in 0.005f32..0.2,
        ticks in 1usize..400,
    ) {
        let class = ShipClass { thrust_accel, drag_factor, ..ShipClass::default() };
        let cruise = class.cruise_speed();
        let mut kin = KinematicState::new(Vec2::ZERO, 0.0);
        kin.intent = ControlIntent::THRUST;

        let mut last = 0.0f32;
        for _ in 0..ticks {
            integrate(&mut kin, &class, 1.0);
            let speed = kin.speed();
            prop_assert!(speed + 1e-4 >= last);
            prop_assert!(speed <= cruise * (1.0 + 1e-4));
            last = speed;
        }
    }

    #[test]
    fn boost_never_exceeds_safe_speed(
        intents in prop::collection::vec(arb_intent(), 1..200),
    ) {
        let class = ShipClass::default();
        let mut kin = KinematicState::new(Vec2::ZERO, 0.0);

        for intent in intents {
            kin.intent = intent;
            integrate(&mut kin, &class, 1.0);
            if intent.contains(ControlIntent::BOOST) {
                prop_assert!(kin.speed() <= class.max_safe_speed * (1.0 + 1e-5));
            }
            prop_assert!(kin.rotation >= 0.0 && kin.rotation < std::f32::consts::TAU);
        }
    }
}
