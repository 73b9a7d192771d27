//! Match invariants - sanity checks that detect bugs.
//!
//! These should never trigger in a correct simulation. After every tick the
//! match runs [`enforce_invariants`]: violations assert in debug builds and
//! are logged and clamped in release builds so they never reach scoring.
//!
//! Unit counts are unsigned and all arithmetic on them saturates, so
//! "negative units" cannot be represented; the checks below cover what can
//! still go wrong.

use thiserror::Error;
use tracing::error;

use crate::entities::{Fleet, Planet, MAX_PRODUCTION_RATE, MIN_PRODUCTION_RATE};
use crate::math::Fixed;
use crate::simulation::{status_from_elimination, MatchStatus};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Check all match invariants.
///
/// Returns every violation found, or an empty list if all hold.
#[must_use]
pub fn check_invariants(planets: &[Planet], fleets: &[Fleet], status: MatchStatus) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let one = Fixed::from_num(1);

    for planet in planets {
        if planet.production_progress < Fixed::ZERO || planet.production_progress >= one {
            violations.push(InvariantViolation::new(format!(
                "Planet {} production remainder {} outside [0, 1)",
                planet.id, planet.production_progress
            )));
        }
        if !(MIN_PRODUCTION_RATE..=MAX_PRODUCTION_RATE).contains(&planet.production_rate) {
            violations.push(InvariantViolation::new(format!(
                "Planet {} production rate {} outside tier range",
                planet.id, planet.production_rate
            )));
        }
    }

    for fleet in fleets {
        if fleet.progress() < Fixed::ZERO || fleet.progress() > one {
            violations.push(InvariantViolation::new(format!(
                "Fleet {} progress {} outside [0, 1]",
                fleet.id,
                fleet.progress()
            )));
        }
        if fleet.units == 0 {
            violations.push(InvariantViolation::new(format!("Fleet {} carries no units", fleet.id)));
        }
        for endpoint in [fleet.origin, fleet.destination] {
            if !planets.iter().any(|p| p.id == endpoint) {
                violations.push(InvariantViolation::new(format!(
                    "Fleet {} references unknown planet {}",
                    fleet.id, endpoint
                )));
            }
        }
    }

    let expected = status_from_elimination(planets, fleets);
    if expected != status {
        violations.push(InvariantViolation::new(format!(
            "Match status {status:?} but ownership implies {expected:?}"
        )));
    }

    violations
}

/// Clamp the state back inside its invariants.
///
/// Drops fleets that cannot be resolved, clamps progress and production
/// remainders and recomputes the match status.
pub fn repair_invariants(planets: &mut [Planet], fleets: &mut Vec<Fleet>, status: &mut MatchStatus) {
    let one = Fixed::from_num(1);
    for planet in planets.iter_mut() {
        if planet.production_progress < Fixed::ZERO || planet.production_progress >= one {
            planet.production_progress = Fixed::ZERO;
        }
        planet.production_rate = planet
            .production_rate
            .clamp(MIN_PRODUCTION_RATE, MAX_PRODUCTION_RATE);
    }

    fleets.retain(|fleet| {
        fleet.units > 0
            && planets.iter().any(|p| p.id == fleet.origin)
            && planets.iter().any(|p| p.id == fleet.destination)
    });
    for fleet in fleets.iter_mut() {
        fleet.clamp_progress();
    }

    *status = status_from_elimination(planets, fleets);
}

/// Check, then assert (debug) or repair (release).
///
/// Returns the violations found before any repair.
///
/// # Panics
///
/// In debug builds, or with the `debug-validation` feature, if any invariant
/// is violated.
pub fn enforce_invariants(
    planets: &mut [Planet],
    fleets: &mut Vec<Fleet>,
    status: &mut MatchStatus,
) -> Vec<InvariantViolation> {
    let violations = check_invariants(planets, fleets, *status);
    if violations.is_empty() {
        return violations;
    }
    for violation in &violations {
        error!("{violation}");
    }
    if cfg!(any(debug_assertions, feature = "debug-validation")) {
        panic!("{} invariant violation(s), first: {}", violations.len(), violations[0]);
    }
    repair_invariants(planets, fleets, status);
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FleetId, Owner, PlanetId, Side};
    use crate::math::Vec2Fixed;

    fn state() -> (Vec<Planet>, Vec<Fleet>) {
        let planets = vec![
            Planet::new(PlanetId(0), Vec2Fixed::from_ints(100, 100), 40, Owner::Player, 10),
            Planet::new(PlanetId(1), Vec2Fixed::from_ints(500, 100), 40, Owner::Ai, 10),
        ];
        let fleets = vec![Fleet::launch(FleetId(1), Side::Player, &planets[0], &planets[1], 4)];
        (planets, fleets)
    }

    #[test]
    fn test_clean_state_has_no_violations() {
        let (planets, fleets) = state();
        assert!(check_invariants(&planets, &fleets, MatchStatus::Running).is_empty());
    }

    #[test]
    fn test_detects_bad_progress_and_status() {
        let (planets, mut fleets) = state();
        fleets[0].set_progress(Fixed::from_num(1.5));
        let violations = check_invariants(&planets, &fleets, MatchStatus::AiVictory);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("progress"));
        assert!(violations[1].to_string().starts_with("Invariant violation: Match status"));
    }

    #[test]
    fn test_huge_garrisons_are_legal() {
        let (mut planets, fleets) = state();
        planets[0].units = u32::MAX;
        assert!(check_invariants(&planets, &fleets, MatchStatus::Running).is_empty());
    }

    #[test]
    fn test_detects_empty_fleet() {
        let (planets, mut fleets) = state();
        fleets[0].units = 0;
        let violations = check_invariants(&planets, &fleets, MatchStatus::Running);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_repair_clamps_and_drops() {
        let (mut planets, mut fleets) = state();
        let mut extra = fleets[0].clone();
        extra.id = FleetId(2);
        extra.destination = PlanetId(9);
        fleets.push(extra);
        fleets[0].set_progress(Fixed::from_num(-0.25));
        planets[0].production_progress = Fixed::from_num(3);
        let mut status = MatchStatus::PlayerVictory;

        repair_invariants(&mut planets, &mut fleets, &mut status);

        assert_eq!(fleets.len(), 1);
        assert_eq!(fleets[0].progress(), Fixed::ZERO);
        assert_eq!(planets[0].production_progress, Fixed::ZERO);
        assert_eq!(status, MatchStatus::Running);
        assert!(check_invariants(&planets, &fleets, status).is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invariant violation")]
    fn test_enforce_panics_in_debug() {
        let (mut planets, mut fleets) = state();
        fleets[0].units = 0;
        let mut status = MatchStatus::Running;
        let _ = enforce_invariants(&mut planets, &mut fleets, &mut status);
    }
}
