//! JSON protocol for headless play.
//!
//! A session communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** commands for the Player side
//! **Output (stdout):** match state, events and responses
//!
//! # Protocol Flow
//!
//! 1. Session starts, outputs `{"type":"ready",...}`
//! 2. The controller sends requests as JSON lines
//! 3. Ticks reply with the events they produced
//! 4. When the match ends, outputs `{"type":"game_over",...}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","planets":13}
//! -> {"cmd":"dispatch","source":0,"destination":4,"units":25}
//! <- {"type":"ack","cmd":"dispatch"}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"events","elapsed_secs":1.0,"events":[...]}
//! -> {"cmd":"ability","ability":"Shield","target":0}
//! <- {"type":"ack","cmd":"ability"}
//! -> {"cmd":"state"}
//! <- {"type":"state","elapsed_secs":1.0,...}
//! ```

use pw_core::commands::AbilityKind;
use pw_core::entities::{Fleet, Owner, Planet, Side};
use pw_core::events::MatchEvent;
use pw_core::scoring::ScoreBreakdown;
use pw_core::simulation::{Match, MatchStatus, SideSummary};
use serde::{Deserialize, Serialize};

use crate::runner::MatchOutcome;

/// Protocol version reported in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Requests (controller -> session)
// ============================================================================

/// Requests a controller can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    /// Advance the match by N ticks (default: 1).
    Tick {
        /// Ticks to run.
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Report the current state without advancing time.
    State,

    /// Send units from a Player planet.
    Dispatch {
        /// Source planet id.
        source: u32,
        /// Destination planet id.
        destination: u32,
        /// Units to send.
        units: u32,
    },

    /// Use a Player ability.
    Ability {
        /// Ability to use.
        ability: AbilityKind,
        /// Target planet id, required for Shield.
        #[serde(default)]
        target: Option<u32>,
    },

    /// Report the state hash (for determinism checks).
    Hash,

    /// End the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

impl Request {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Request name for acknowledgments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::State => "state",
            Self::Dispatch { .. } => "dispatch",
            Self::Ability { .. } => "ability",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

// ============================================================================
// Output Responses (session -> controller)
// ============================================================================

/// Responses sent by a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Session is ready to accept requests.
    Ready {
        /// Protocol version.
        version: String,
        /// Planets on the map.
        planets: usize,
    },

    /// A request was accepted.
    Ack {
        /// Request name.
        cmd: String,
    },

    /// A request failed or was rejected.
    Error {
        /// What went wrong.
        message: String,
        /// Request name, if the line parsed.
        cmd: Option<String>,
    },

    /// Full match state.
    State(StateView),

    /// Events produced by one or more ticks.
    Events {
        /// Match time after the ticks.
        elapsed_secs: f64,
        /// Events in order.
        events: Vec<MatchEvent>,
    },

    /// The match has ended.
    GameOver {
        /// Result for the Player side.
        result: MatchOutcome,
        /// Match time at the end.
        elapsed_secs: f64,
        /// Final score.
        score: Option<ScoreBreakdown>,
    },

    /// State hash for determinism verification.
    StateHash {
        /// Match time.
        elapsed_secs: f64,
        /// Hash of the match state.
        hash: u64,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// Everything a front end needs to draw a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    /// Match time in seconds.
    pub elapsed_secs: f64,
    /// Lifecycle state.
    pub status: MatchStatus,
    /// Planets.
    pub planets: Vec<PlanetView>,
    /// Fleets in flight.
    pub fleets: Vec<FleetView>,
    /// Player totals.
    pub player: SideSummary,
    /// AI totals.
    pub ai: SideSummary,
    /// State hash.
    pub hash: u64,
}

impl StateView {
    /// Capture the state of `game`.
    #[must_use]
    pub fn capture(game: &Match) -> Self {
        Self {
            elapsed_secs: game.elapsed_secs(),
            status: game.status(),
            planets: game.planets().iter().map(PlanetView::from).collect(),
            fleets: game.fleets().iter().map(FleetView::from).collect(),
            player: game.side_summary(Side::Player),
            ai: game.side_summary(Side::Ai),
            hash: game.state_hash(),
        }
    }
}

/// One planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetView {
    /// Planet id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Radius.
    pub radius: u32,
    /// Owner.
    pub owner: Owner,
    /// Whole units garrisoned.
    pub units: u32,
    /// Units per second.
    pub production_rate: u32,
    /// Whether a shield is up.
    pub shielded: bool,
}

impl From<&Planet> for PlanetView {
    fn from(planet: &Planet) -> Self {
        let (x, y) = planet.position.to_f64();
        Self {
            id: planet.id.0,
            name: planet.name.clone(),
            x,
            y,
            radius: planet.radius,
            owner: planet.owner,
            units: planet.units,
            production_rate: planet.production_rate,
            shielded: planet.is_shielded(),
        }
    }
}

/// One fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetView {
    /// Fleet id.
    pub id: u64,
    /// Display callsign.
    pub callsign: String,
    /// Owning side.
    pub owner: Side,
    /// Planet it left.
    pub origin: u32,
    /// Planet it is flying to.
    pub destination: u32,
    /// Units aboard.
    pub units: u32,
    /// Current x.
    pub x: f64,
    /// Current y.
    pub y: f64,
    /// Travel completion in `[0, 1]`.
    pub progress: f64,
}

impl From<&Fleet> for FleetView {
    fn from(fleet: &Fleet) -> Self {
        let (x, y) = fleet.position().to_f64();
        Self {
            id: fleet.id.0,
            callsign: fleet.callsign(),
            owner: fleet.owner,
            origin: fleet.origin.0,
            destination: fleet.destination.0,
            units: fleet.units,
            x,
            y,
            progress: fleet.progress().to_num::<f64>(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(planets: usize) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            planets,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","count":60}"#;
        let cmd = Request::from_json(json).unwrap();
        assert_eq!(cmd, Request::Tick { count: 60 });
    }

    #[test]
    fn test_default_tick_count() {
        let json = r#"{"cmd":"tick"}"#;
        let cmd = Request::from_json(json).unwrap();
        assert_eq!(cmd, Request::Tick { count: 1 });
    }

    #[test]
    fn test_parse_ability_command() {
        let json = r#"{"cmd":"ability","ability":"Shield","target":3}"#;
        let cmd = Request::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Request::Ability {
                ability: AbilityKind::Shield,
                target: Some(3)
            }
        );
        let json = r#"{"cmd":"ability","ability":"Surge"}"#;
        assert!(matches!(
            Request::from_json(json).unwrap(),
            Request::Ability { target: None, .. }
        ));
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Request::from_json(r#"{"cmd":"spawn"}"#).is_err());
    }

    #[test]
    fn test_serialize_responses() {
        let json = Response::ack("dispatch").to_json_line();
        assert_eq!(json, "{\"type\":\"ack\",\"cmd\":\"dispatch\"}\n");

        let json = Response::GameOver {
            result: MatchOutcome::Victory,
            elapsed_secs: 42.0,
            score: None,
        }
        .to_json_line();
        assert!(json.contains(r#""type":"game_over""#));
        assert!(json.contains(r#""result":"victory""#));
    }
}
