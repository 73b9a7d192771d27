//! Events emitted by [`Match::tick`](crate::simulation::Match::tick).
//!
//! Events are produced synchronously, in the order their causes were
//! processed, and returned to the caller at the end of the tick.

use serde::{Deserialize, Serialize};

use crate::commands::{AbilityKind, Command, CommandRejection};
use crate::entities::{FleetId, Owner, PlanetId, Side};

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A fleet left its source planet.
    FleetLaunched {
        /// New fleet.
        fleet: FleetId,
        /// Launching side.
        side: Side,
        /// Source planet.
        origin: PlanetId,
        /// Destination planet.
        destination: PlanetId,
        /// Units aboard.
        units: u32,
    },
    /// A Recall turned a fleet around.
    FleetRecalled {
        /// Recalled fleet.
        fleet: FleetId,
        /// Owning side.
        side: Side,
        /// Planet it now flies back to.
        returning_to: PlanetId,
    },
    /// A fleet landed on a friendly planet.
    Reinforced {
        /// Arriving fleet.
        fleet: FleetId,
        /// Owning side.
        side: Side,
        /// Planet reinforced.
        planet: PlanetId,
        /// Garrison after landing.
        garrison: u32,
    },
    /// A fleet took a planet.
    AttackSucceeded {
        /// Arriving fleet.
        fleet: FleetId,
        /// Attacking side.
        side: Side,
        /// Planet taken.
        planet: PlanetId,
        /// Owner before the battle.
        previous_owner: Owner,
        /// Attackers left as the new garrison.
        garrison: u32,
    },
    /// A fleet was destroyed without taking the planet.
    AttackFailed {
        /// Arriving fleet.
        fleet: FleetId,
        /// Attacking side.
        side: Side,
        /// Planet attacked.
        planet: PlanetId,
        /// Owner that held the planet.
        defender: Owner,
        /// Defenders left.
        garrison: u32,
    },
    /// An ability took effect.
    AbilityActivated {
        /// Activating side.
        side: Side,
        /// Ability used.
        ability: AbilityKind,
        /// Shield target, if any.
        target: Option<PlanetId>,
    },
    /// A timed ability ran out.
    AbilityExpired {
        /// Side whose effect ended.
        side: Side,
        /// Ability that ended.
        ability: AbilityKind,
        /// Planet the shield was on, if any.
        planet: Option<PlanetId>,
    },
    /// A queued command became invalid before it could be applied.
    CommandRejected {
        /// The command as submitted.
        command: Command,
        /// Why it no longer applies.
        reason: CommandRejection,
    },
    /// The match ended with the Player winning.
    GameVictory {
        /// Match time at the end, in seconds.
        elapsed_secs: f64,
        /// Final score.
        score: u32,
    },
    /// The match ended with the AI winning.
    GameDefeat {
        /// Match time at the end, in seconds.
        elapsed_secs: f64,
    },
}

impl MatchEvent {
    /// Whether this event ends the match.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::GameVictory { .. } | Self::GameDefeat { .. })
    }
}

/// Events produced during one tick, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Events in emission order.
    pub events: Vec<MatchEvent>,
}

impl TickEvents {
    /// Append an event.
    pub fn push(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Iterate over events in order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter()
    }

    /// Whether the match ended during this tick.
    #[must_use]
    pub fn ended_match(&self) -> bool {
        self.events.iter().any(MatchEvent::is_terminal)
    }
}

impl IntoIterator for TickEvents {
    type Item = MatchEvent;
    type IntoIter = std::vec::IntoIter<MatchEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
