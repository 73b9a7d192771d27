//! Property tests for the match rules.
//!
//! Random layouts and command scripts must never break invariants, and the
//! same inputs must always produce the same state.

use proptest::prelude::*;
use pw_core::combat::{effective_defense, resolve};
use pw_core::prelude::*;
use pw_test_utils::determinism::verify_determinism;
use pw_test_utils::fixtures::{default_rules, fleet};
use pw_test_utils::strategies::{arb_command_script, arb_dt, arb_layout, arb_map_config, arb_planet, arb_side};

fn play_script(layout: &[Planet], script: &[(u32, Command)], ticks: u32, dt: f64) -> Match {
    let mut game = Match::from_planets(layout.to_vec(), default_rules()).expect("unique ids");
    let mut next = 0;
    for tick in 0..ticks {
        while next < script.len() && script[next].0 == tick {
            let _ = game.submit(script[next].1);
            next += 1;
        }
        game.tick(dt);
    }
    game
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any command script keeps every invariant; `tick` would panic in a
    /// debug build otherwise.
    #[test]
    fn prop_random_commands_keep_invariants(
        layout in arb_layout(8),
        script in arb_command_script(9, 240, 40),
        dt in arb_dt(),
    ) {
        let game = play_script(&layout, &script, 240, dt);
        prop_assert!(game.check_invariants().is_empty());
        for planet in game.planets() {
            prop_assert!(planet.production_progress < Fixed::from_num(1));
        }
        for fleet in game.fleets() {
            prop_assert!(fleet.units > 0);
            prop_assert!(fleet.progress() <= Fixed::from_num(1));
        }
    }

    /// Replaying the same script from the same layout gives the same state.
    #[test]
    fn prop_scripts_are_deterministic(
        layout in arb_layout(6),
        script in arb_command_script(7, 120, 20),
        dt in arb_dt(),
    ) {
        let result = verify_determinism(
            2,
            1,
            || layout.clone(),
            |_| {},
            |layout| play_script(layout, &script, 120, dt).state_hash(),
        );
        prop_assert!(result.is_deterministic);
    }

    /// Rejected commands leave the match untouched.
    #[test]
    fn prop_rejections_do_not_mutate(
        layout in arb_layout(6),
        script in arb_command_script(12, 1, 20),
    ) {
        let mut game = Match::from_planets(layout, default_rules()).expect("unique ids");
        for (_, command) in script {
            let before = game.state_hash();
            if game.submit(command).is_err() {
                prop_assert_eq!(game.state_hash(), before);
            }
        }
    }

    /// Units are conserved by a fight: the garrison left is the difference
    /// between the larger and smaller force.
    #[test]
    fn prop_resolve_conserves_difference(
        target in arb_planet(1),
        source in arb_planet(0),
        side in arb_side(),
        units in 1u32..300,
    ) {
        let attack = fleet(1, side, &source, &target, units);
        let defense = effective_defense(&target);
        let (after, outcome) = resolve(&target, &attack);

        if target.is_owned_by(side) {
            prop_assert_eq!(outcome, BattleOutcome::Reinforced);
            prop_assert_eq!(after.units, target.units + units);
        } else if units > defense {
            prop_assert!(outcome.is_conquest());
            prop_assert_eq!(after.owner, side.owner());
            prop_assert_eq!(after.units, units - defense);
            prop_assert!(!after.is_shielded());
        } else {
            prop_assert_eq!(outcome, BattleOutcome::Defended);
            prop_assert_eq!(after.owner, target.owner);
            prop_assert_eq!(after.units, defense - units);
        }
    }

    /// Generated maps have the requested size and mirror across the center.
    #[test]
    fn prop_generated_maps_are_mirrored(config in arb_map_config(15)) {
        let map = generate_map(&config).expect("valid count");
        prop_assert_eq!(map.planets.len(), config.size.planet_count());

        let center = map.center_x();
        for planet in &map.planets {
            let mirror = planet.position.mirror_x(center);
            let twin = map.planets.iter().find(|p| p.position == mirror);
            prop_assert!(twin.is_some(), "{} has no mirror", planet.id);
            let twin = twin.expect("checked");
            prop_assert_eq!(twin.radius, planet.radius);
            prop_assert_eq!(twin.units, planet.units);
        }
        prop_assert_eq!(
            map.planets.iter().filter(|p| p.owner == Owner::Player).count(),
            1
        );
        prop_assert_eq!(map.planets.iter().filter(|p| p.owner == Owner::Ai).count(), 1);
    }
}
