//! End-of-match scoring and per-side statistics.
//!
//! The score is only meaningful once the match is terminal:
//!
//! ```text
//! tactical   = max(0, 100 - 5 * lost_battles - 10 * lost_planets)
//! time_bonus = 50 / 30 / 15 / 5 / 0 for t < 60 / 120 / 180 / 300 / otherwise
//! final      = tactical + time_bonus on victory, 0 on defeat
//! ```

use serde::{Deserialize, Serialize};

use crate::math::Fixed;
use crate::simulation::MatchStatus;

/// Tactical score before penalties.
pub const BASE_TACTICAL_SCORE: u32 = 100;

/// Deduction per failed Player attack.
pub const LOST_BATTLE_PENALTY: u32 = 5;

/// Deduction per Player planet lost.
pub const LOST_PLANET_PENALTY: u32 = 10;

/// `(upper bound in seconds, bonus)`; the first bound the match time is
/// strictly below wins.
const TIME_BONUS_TIERS: [(u32, u32); 4] = [(60, 50), (120, 30), (180, 15), (300, 5)];

/// Counters that reduce the Player's tactical score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TacticalPenalties {
    /// Player attacks that ended Defended.
    pub lost_battles: u32,
    /// Player-owned planets that were conquered.
    pub lost_planets: u32,
}

/// Running totals for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideStats {
    /// Whole units produced on owned planets.
    pub units_produced: u64,
    /// Fleets launched.
    pub fleets_launched: u32,
    /// Conquests made plus attacks repelled.
    pub battles_won: u32,
    /// Failed attacks plus planets lost.
    pub battles_lost: u32,
    /// Planets taken from an opponent or from neutral.
    pub planets_conquered: u32,
}

/// Breakdown of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Tactical score after penalties.
    pub tactical: u32,
    /// Bonus for a fast win.
    pub time_bonus: u32,
    /// Sum awarded; 0 on defeat.
    pub total: u32,
}

/// Tactical score after penalties, floored at 0.
#[must_use]
pub fn tactical_score(penalties: &TacticalPenalties) -> u32 {
    let deduction = penalties
        .lost_battles
        .saturating_mul(LOST_BATTLE_PENALTY)
        .saturating_add(penalties.lost_planets.saturating_mul(LOST_PLANET_PENALTY));
    BASE_TACTICAL_SCORE.saturating_sub(deduction)
}

/// Bonus for finishing within `elapsed` seconds.
#[must_use]
pub fn time_bonus(elapsed: Fixed) -> u32 {
    TIME_BONUS_TIERS
        .iter()
        .find(|(limit, _)| elapsed < Fixed::from_num(*limit))
        .map_or(0, |&(_, bonus)| bonus)
}

/// Final score for a terminal match, `None` while it is still running.
#[must_use]
pub fn final_score(
    status: MatchStatus,
    elapsed: Fixed,
    penalties: &TacticalPenalties,
) -> Option<ScoreBreakdown> {
    match status {
        MatchStatus::Running => None,
        MatchStatus::AiVictory => Some(ScoreBreakdown {
            tactical: 0,
            time_bonus: 0,
            total: 0,
        }),
        MatchStatus::PlayerVictory => {
            let tactical = tactical_score(penalties);
            let bonus = time_bonus(elapsed);
            Some(ScoreBreakdown {
                tactical,
                time_bonus: bonus,
                total: tactical + bonus,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tactical_score_floor() {
        assert_eq!(tactical_score(&TacticalPenalties::default()), 100);
        let some = TacticalPenalties {
            lost_battles: 2,
            lost_planets: 3,
        };
        assert_eq!(tactical_score(&some), 60);
        let many = TacticalPenalties {
            lost_battles: 30,
            lost_planets: 1,
        };
        assert_eq!(tactical_score(&many), 0);
    }

    #[test]
    fn test_time_bonus_boundaries() {
        assert_eq!(time_bonus(Fixed::from_num(59.99)), 50);
        assert_eq!(time_bonus(Fixed::from_num(60)), 30);
        assert_eq!(time_bonus(Fixed::from_num(119)), 30);
        assert_eq!(time_bonus(Fixed::from_num(120)), 15);
        assert_eq!(time_bonus(Fixed::from_num(180)), 5);
        assert_eq!(time_bonus(Fixed::from_num(299.5)), 5);
        assert_eq!(time_bonus(Fixed::from_num(300)), 0);
    }

    #[test]
    fn test_victory_at_sixty_seconds() {
        let score = final_score(
            MatchStatus::PlayerVictory,
            Fixed::from_num(60),
            &TacticalPenalties::default(),
        );
        assert_eq!(
            score,
            Some(ScoreBreakdown {
                tactical: 100,
                time_bonus: 30,
                total: 130
            })
        );
    }

    #[test]
    fn test_defeat_scores_zero() {
        let score = final_score(
            MatchStatus::AiVictory,
            Fixed::from_num(10),
            &TacticalPenalties::default(),
        );
        assert_eq!(score.map(|s| s.total), Some(0));
    }

    #[test]
    fn test_running_has_no_score() {
        assert!(final_score(
            MatchStatus::Running,
            Fixed::from_num(10),
            &TacticalPenalties::default()
        )
        .is_none());
    }
}
