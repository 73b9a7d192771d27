//! Property-based testing strategies.
//!
//! Generators for planets, layouts, commands and frame deltas. Layouts keep
//! ids unique and always give each side at least one planet so generated
//! matches start Running.

use fixed::types::I32F32;
use proptest::prelude::*;
use pw_core::commands::{AbilityKind, Command};
use pw_core::entities::{Owner, Planet, PlanetId, Side, MAX_PLANET_RADIUS, MIN_PLANET_RADIUS};
use pw_core::map_generation::MapConfig;
use pw_core::math::Vec2Fixed;

/// Generate a fixed-point coordinate inside a 1200 x 800 field.
pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
    (0i32..1200, 0i32..800).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
}

/// Generate a planet radius in the legal range.
pub fn arb_radius() -> impl Strategy<Value = u32> {
    MIN_PLANET_RADIUS..=MAX_PLANET_RADIUS
}

/// Generate a planet owner.
pub fn arb_owner() -> impl Strategy<Value = Owner> {
    prop_oneof![Just(Owner::Player), Just(Owner::Ai), Just(Owner::Neutral)]
}

/// Generate a side.
pub fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Player), Just(Side::Ai)]
}

/// Generate a garrison size.
pub fn arb_units() -> impl Strategy<Value = u32> {
    0u32..200
}

/// Generate a planet with the given id.
pub fn arb_planet(id: u32) -> impl Strategy<Value = Planet> {
    (arb_position(), arb_radius(), arb_owner(), arb_units())
        .prop_map(move |(position, radius, owner, units)| Planet::new(PlanetId(id), position, radius, owner, units))
}

/// Generate a layout of 2 to `max_planets` planets with ids `0..n`.
///
/// Planet 0 always belongs to the Player and planet 1 to the AI.
pub fn arb_layout(max_planets: usize) -> impl Strategy<Value = Vec<Planet>> {
    let max = max_planets.max(3);
    proptest::collection::vec((arb_position(), arb_radius(), arb_owner(), arb_units()), 2..max).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (position, radius, owner, units))| {
                    let owner = match i {
                        0 => Owner::Player,
                        1 => Owner::Ai,
                        _ => owner,
                    };
                    Planet::new(PlanetId(i as u32), position, radius, owner, units)
                })
                .collect()
        },
    )
}

/// Generate a dispatch over planet ids `0..planet_count`.
///
/// The command may well be invalid; that is the point.
pub fn arb_dispatch(planet_count: u32) -> impl Strategy<Value = Command> {
    let count = planet_count.max(1);
    (arb_side(), 0..count, 0..count, 0u32..120).prop_map(|(side, source, destination, units)| Command::Dispatch {
        side,
        source: PlanetId(source),
        destination: PlanetId(destination),
        units,
    })
}

/// Generate an ability activation over planet ids `0..planet_count`.
pub fn arb_activation(planet_count: u32) -> impl Strategy<Value = Command> {
    let count = planet_count.max(1);
    let ability = prop_oneof![
        Just(AbilityKind::Recall),
        Just(AbilityKind::Surge),
        Just(AbilityKind::Shield),
    ];
    (arb_side(), ability, proptest::option::of(0..count)).prop_map(|(side, ability, target)| {
        Command::Activate {
            side,
            ability,
            target: target.map(PlanetId),
        }
    })
}

/// Generate any command, mostly dispatches.
pub fn arb_command(planet_count: u32) -> impl Strategy<Value = Command> {
    prop_oneof![
        4 => arb_dispatch(planet_count),
        1 => arb_activation(planet_count),
    ]
}

/// Generate a script of `(tick, command)` pairs within `ticks` ticks.
pub fn arb_command_script(planet_count: u32, ticks: u32, max_len: usize) -> impl Strategy<Value = Vec<(u32, Command)>> {
    proptest::collection::vec((0..ticks.max(1), arb_command(planet_count)), 0..max_len).prop_map(|mut script| {
        script.sort_by_key(|(tick, _)| *tick);
        script
    })
}

/// Generate a frame delta between 1 ms and 0.5 s.
pub fn arb_dt() -> impl Strategy<Value = f64> {
    (1u32..500).prop_map(|ms| f64::from(ms) / 1000.0)
}

/// Generate a fixed-point duration in seconds.
pub fn arb_elapsed() -> impl Strategy<Value = I32F32> {
    (0i32..600).prop_map(I32F32::from_num)
}

/// Generate a map configuration with `2..=max_planets` planets and any seed.
pub fn arb_map_config(max_planets: usize) -> impl Strategy<Value = MapConfig> {
    (2..=max_planets.max(2), any::<u64>())
        .prop_map(|(count, seed)| MapConfig::default().with_planet_count(count).with_seed(seed))
}
