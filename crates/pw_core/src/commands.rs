//! Commands submitted by input adapters and the AI, and their rejections.
//!
//! Submitting a command validates it against the current state and either
//! queues it for the next tick or returns a [`CommandRejection`]. A rejection
//! is an ordinary value; the match state is never touched by a rejected
//! command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{PlanetId, Side};

/// One-shot special abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Turn every in-flight fleet of the side back toward its origin.
    Recall,
    /// Double production on every planet the side owns for a while.
    Surge,
    /// Protect one owned planet for a while. See
    /// [`combat::effective_defense`](crate::combat::effective_defense).
    Shield,
}

impl AbilityKind {
    /// All abilities, in display order.
    pub const ALL: [AbilityKind; 3] = [AbilityKind::Recall, AbilityKind::Surge, AbilityKind::Shield];

    /// Whether the ability needs a target planet.
    #[must_use]
    pub const fn needs_target(self) -> bool {
        matches!(self, Self::Shield)
    }
}

impl std::fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recall => f.write_str("Recall"),
            Self::Surge => f.write_str("Production Surge"),
            Self::Shield => f.write_str("Shield"),
        }
    }
}

/// A validated intent waiting for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Send units from one planet to another.
    Dispatch {
        /// Side issuing the order.
        side: Side,
        /// Planet the units leave from.
        source: PlanetId,
        /// Planet the fleet flies to.
        destination: PlanetId,
        /// Whole units to send.
        units: u32,
    },
    /// Use a one-shot ability.
    Activate {
        /// Side issuing the order.
        side: Side,
        /// Ability to activate.
        ability: AbilityKind,
        /// Target planet, required for Shield.
        target: Option<PlanetId>,
    },
}

impl Command {
    /// Side that issued this command.
    #[must_use]
    pub const fn side(&self) -> Side {
        match self {
            Self::Dispatch { side, .. } | Self::Activate { side, .. } => *side,
        }
    }
}

/// Why a command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CommandRejection {
    /// The match has already ended.
    #[error("match is over")]
    MatchOver,

    /// No planet with this id exists.
    #[error("unknown planet {0}")]
    UnknownPlanet(PlanetId),

    /// Source and destination are the same planet.
    #[error("fleet source and destination are both {0}")]
    SamePlanet(PlanetId),

    /// The source planet is not owned by the dispatching side.
    #[error("{side} does not own {planet}")]
    NotOwner {
        /// Dispatching side.
        side: Side,
        /// Source planet.
        planet: PlanetId,
    },

    /// Unit count outside `[1, available]`.
    #[error("cannot send {requested} units, {available} available")]
    InvalidUnitCount {
        /// Units asked for.
        requested: u32,
        /// Whole units not already committed this tick.
        available: u32,
    },

    /// The side has already used this ability.
    #[error("{side} already used {ability}")]
    AlreadyUsed {
        /// Activating side.
        side: Side,
        /// Ability asked for.
        ability: AbilityKind,
    },

    /// Shield was requested without a target planet.
    #[error("{0} needs a target planet")]
    MissingTarget(AbilityKind),

    /// Shield target is not owned by the activating side.
    #[error("shield target {0} is not owned by the activating side")]
    ShieldTargetNotOwned(PlanetId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_side() {
        let dispatch = Command::Dispatch {
            side: Side::Ai,
            source: PlanetId(0),
            destination: PlanetId(1),
            units: 3,
        };
        let activate = Command::Activate {
            side: Side::Player,
            ability: AbilityKind::Surge,
            target: None,
        };
        assert_eq!(dispatch.side(), Side::Ai);
        assert_eq!(activate.side(), Side::Player);
    }

    #[test]
    fn test_rejection_messages() {
        let err = CommandRejection::InvalidUnitCount {
            requested: 12,
            available: 7,
        };
        assert_eq!(err.to_string(), "cannot send 12 units, 7 available");
        let err = CommandRejection::AlreadyUsed {
            side: Side::Player,
            ability: AbilityKind::Recall,
        };
        assert_eq!(err.to_string(), "Player already used Recall");
    }
}
