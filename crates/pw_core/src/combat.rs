//! Fleet arrival resolution.
//!
//! A single pure function decides what happens when a fleet lands on a
//! planet. Only whole units take part; the planet's fractional production
//! remainder is left untouched.

use serde::{Deserialize, Serialize};

use crate::entities::{Fleet, Owner, Planet};

/// Result of a fleet arriving at a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// The fleet landed on a planet its side already owns.
    Reinforced,
    /// The attacker took the planet.
    Conquered {
        /// Owner before the battle.
        previous_owner: Owner,
    },
    /// The defenders held. The planet may be left with zero units.
    Defended,
}

impl BattleOutcome {
    /// Whether the arriving fleet won a fight.
    #[must_use]
    pub const fn is_conquest(self) -> bool {
        matches!(self, Self::Conquered { .. })
    }
}

/// Defense a planet presents in combat.
///
/// A shield halves the garrison, truncated toward zero.
#[must_use]
pub fn effective_defense(planet: &Planet) -> u32 {
    if planet.is_shielded() {
        planet.units / 2
    } else {
        planet.units
    }
}

/// Resolve `fleet` arriving at `planet`.
///
/// Returns the updated planet and the outcome. Neither input is modified,
/// and the same inputs always produce the same result.
///
/// # Example
///
/// ```
/// use pw_core::combat::{resolve, BattleOutcome};
/// use pw_core::entities::{Fleet, FleetId, Owner, Planet, PlanetId, Side};
/// use pw_core::math::Vec2Fixed;
///
/// let home = Planet::new(PlanetId(0), Vec2Fixed::from_ints(0, 0), 40, Owner::Player, 5);
/// let target = Planet::new(PlanetId(1), Vec2Fixed::from_ints(300, 0), 40, Owner::Neutral, 4);
/// let fleet = Fleet::launch(FleetId(1), Side::Player, &home, &target, 6);
///
/// let (planet, outcome) = resolve(&target, &fleet);
/// assert_eq!(planet.owner, Owner::Player);
/// assert_eq!(planet.units, 2);
/// assert!(matches!(outcome, BattleOutcome::Conquered { previous_owner: Owner::Neutral }));
/// ```
#[must_use]
pub fn resolve(planet: &Planet, fleet: &Fleet) -> (Planet, BattleOutcome) {
    let mut updated = planet.clone();

    if planet.owner.is(fleet.owner) {
        updated.units = planet.units.saturating_add(fleet.units);
        return (updated, BattleOutcome::Reinforced);
    }

    let attack = fleet.units;
    let defense = effective_defense(planet);

    if attack > defense {
        updated.owner = fleet.owner.owner();
        updated.units = attack - defense;
        // A shield belongs to the side that raised it.
        updated.shield_remaining = None;
        (
            updated,
            BattleOutcome::Conquered {
                previous_owner: planet.owner,
            },
        )
    } else {
        updated.units = defense - attack;
        (updated, BattleOutcome::Defended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FleetId, PlanetId, Side};
    use crate::math::{Fixed, Vec2Fixed};

    fn planet(owner: Owner, units: u32) -> Planet {
        Planet::new(PlanetId(1), Vec2Fixed::from_ints(400, 300), 40, owner, units)
    }

    fn fleet(owner: Side, units: u32) -> Fleet {
        let origin = Planet::new(PlanetId(0), Vec2Fixed::from_ints(100, 300), 40, owner.owner(), 50);
        let target = planet(Owner::Neutral, 0);
        Fleet::launch(FleetId(1), owner, &origin, &target, units)
    }

    fn shielded(owner: Owner, units: u32) -> Planet {
        let mut p = planet(owner, units);
        p.shield_remaining = Some(Fixed::from_num(15));
        p
    }

    #[test]
    fn test_reinforcement_adds_units() {
        let (result, outcome) = resolve(&planet(Owner::Player, 5), &fleet(Side::Player, 3));
        assert_eq!(outcome, BattleOutcome::Reinforced);
        assert_eq!(result.units, 8);
        assert_eq!(result.owner, Owner::Player);
    }

    #[test]
    fn test_conquest_leaves_surplus() {
        let (result, outcome) = resolve(&planet(Owner::Ai, 7), &fleet(Side::Player, 10));
        assert_eq!(
            outcome,
            BattleOutcome::Conquered {
                previous_owner: Owner::Ai
            }
        );
        assert_eq!(result.owner, Owner::Player);
        assert_eq!(result.units, 3);
    }

    #[test]
    fn test_tie_defends_with_zero() {
        let (result, outcome) = resolve(&planet(Owner::Neutral, 12), &fleet(Side::Ai, 12));
        assert_eq!(outcome, BattleOutcome::Defended);
        assert_eq!(result.owner, Owner::Neutral);
        assert_eq!(result.units, 0);
    }

    #[test]
    fn test_failed_attack_reduces_garrison() {
        let (result, outcome) = resolve(&planet(Owner::Ai, 20), &fleet(Side::Player, 8));
        assert_eq!(outcome, BattleOutcome::Defended);
        assert_eq!(result.units, 12);
        assert_eq!(result.owner, Owner::Ai);
    }

    #[test]
    fn test_empty_planet_always_falls() {
        let (result, outcome) = resolve(&planet(Owner::Ai, 0), &fleet(Side::Player, 1));
        assert!(outcome.is_conquest());
        assert_eq!(result.units, 1);
    }

    #[test]
    fn test_shield_conquered_by_six() {
        let (result, outcome) = resolve(&shielded(Owner::Ai, 10), &fleet(Side::Player, 6));
        assert!(outcome.is_conquest());
        assert_eq!(result.units, 1);
        assert_eq!(result.owner, Owner::Player);
        assert!(!result.is_shielded());
    }

    #[test]
    fn test_shield_defends_against_four() {
        let (result, outcome) = resolve(&shielded(Owner::Ai, 10), &fleet(Side::Player, 4));
        assert_eq!(outcome, BattleOutcome::Defended);
        assert_eq!(result.units, 1);
        assert!(result.is_shielded());
    }

    #[test]
    fn test_shield_truncates_odd_garrison() {
        assert_eq!(effective_defense(&shielded(Owner::Ai, 11)), 5);
        assert_eq!(effective_defense(&shielded(Owner::Ai, 1)), 0);
        assert_eq!(effective_defense(&planet(Owner::Ai, 11)), 11);
    }

    #[test]
    fn test_production_remainder_survives_capture() {
        let mut target = planet(Owner::Ai, 2);
        target.production_progress = Fixed::from_num(0.5);
        let (result, _) = resolve(&target, &fleet(Side::Player, 5));
        assert_eq!(result.production_progress, Fixed::from_num(0.5));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let p = shielded(Owner::Neutral, 17);
        let f = fleet(Side::Ai, 9);
        assert_eq!(resolve(&p, &f), resolve(&p, &f));
    }
}
