//! Test fixtures and helpers.
//!
//! Hand-built layouts and matches for consistent testing. Everything here
//! panics on bad input; it is only meant for tests and benches.

use fixed::types::I32F32;
use pw_core::ai::{AiController, Difficulty};
use pw_core::config::{BalanceTuning, MatchConfig, Rules};
use pw_core::entities::{Fleet, FleetId, Owner, Planet, PlanetId, Side};
use pw_core::map_generation::MapSize;
use pw_core::math::Vec2Fixed;
use pw_core::simulation::Match;

/// Radius used by fixture planets: production tier 2.
pub const FIXTURE_RADIUS: u32 = 40;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Rules from the default balance tuning.
///
/// # Panics
///
/// If the default tuning is ever made invalid.
#[must_use]
pub fn default_rules() -> Rules {
    BalanceTuning::default()
        .to_rules()
        .expect("default tuning is valid")
}

/// A planet of [`FIXTURE_RADIUS`] at `(x, y)`.
#[must_use]
pub fn planet(id: u32, x: i32, y: i32, owner: Owner, units: u32) -> Planet {
    Planet::new(PlanetId(id), Vec2Fixed::from_ints(x, y), FIXTURE_RADIUS, owner, units)
}

/// A planet with an explicit radius, and so an explicit production tier.
#[must_use]
pub fn planet_with_radius(id: u32, x: i32, y: i32, radius: u32, owner: Owner, units: u32) -> Planet {
    Planet::new(PlanetId(id), Vec2Fixed::from_ints(x, y), radius, owner, units)
}

/// A freshly launched fleet between two fixture planets.
#[must_use]
pub fn fleet(id: u64, owner: Side, origin: &Planet, destination: &Planet, units: u32) -> Fleet {
    Fleet::launch(FleetId(id), owner, origin, destination, units)
}

/// Three planets on a line: Player home, a neutral in the middle, AI home.
///
/// Homes hold 50 units and are 1000 apart; the neutral holds 20.
#[must_use]
pub fn duel_layout() -> Vec<Planet> {
    vec![
        planet(0, 100, 400, Owner::Player, 50),
        planet(1, 600, 400, Owner::Neutral, 20),
        planet(2, 1100, 400, Owner::Ai, 50),
    ]
}

/// A match on [`duel_layout`] with no built-in opponent.
///
/// # Panics
///
/// Never in practice: the layout has unique ids.
#[must_use]
pub fn duel_match() -> Match {
    Match::from_planets(duel_layout(), default_rules()).expect("duel layout is valid")
}

/// A match on [`duel_layout`] with a built-in opponent.
#[must_use]
pub fn duel_match_against(difficulty: Difficulty, seed: u64) -> Match {
    duel_match().with_opponent(AiController::new(difficulty, seed))
}

/// A generated match of the given size and opponent.
///
/// # Panics
///
/// If map generation fails for the preset.
#[must_use]
pub fn generated_match(size: MapSize, opponent: Option<Difficulty>, seed: u64) -> Match {
    let config = MatchConfig::default()
        .with_seed(seed)
        .with_map_size(size)
        .with_opponent(opponent);
    Match::new(&config).expect("preset maps always generate")
}

/// Advance `game` by `ticks` ticks of `dt` seconds each.
pub fn run_ticks(game: &mut Match, ticks: u32, dt: f64) {
    for _ in 0..ticks {
        game.tick(dt);
    }
}

/// Drive the Player side with its own AI and play until the match ends or
/// `max_ticks` pass. Returns the number of ticks run.
pub fn autoplay(game: &mut Match, autopilot: &mut AiController, max_ticks: u32, dt: f64) -> u32 {
    for tick in 0..max_ticks {
        if game.is_terminal() {
            return tick;
        }
        let commands = autopilot.update(&game.world_view(), Side::Player, dt);
        for command in commands {
            let _ = game.submit(command);
        }
        game.tick(dt);
    }
    max_ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::simulation::MatchStatus;

    #[test]
    fn test_duel_layout_is_valid() {
        let game = duel_match();
        assert_eq!(game.planets().len(), 3);
        assert_eq!(game.status(), MatchStatus::Running);
        assert!(game.check_invariants().is_empty());
    }

    #[test]
    fn test_fixture_radius_is_tier_two() {
        assert_eq!(planet(0, 0, 0, Owner::Neutral, 0).production_rate, 2);
    }

    #[test]
    fn test_run_ticks_advances_time() {
        let mut game = duel_match();
        run_ticks(&mut game, 60, 1.0 / 60.0);
        assert!((game.elapsed_secs() - 1.0).abs() < 1e-6);
    }
}
