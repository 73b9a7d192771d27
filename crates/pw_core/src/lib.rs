//! # Planet Wars Core
//!
//! Simulation and decision-making engine for Planet Wars, a real-time
//! territory-conquest game between a human player and an AI.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO
//! - No unseeded randomness
//! - Fixed-point simulation math
//!
//! This separation enables:
//! - Headless batch play and balance testing
//! - Determinism testing on a single build
//! - Any front end driving the same rules
//!
//! ## Crate Structure
//!
//! - [`entities`] - Planet and fleet records
//! - [`map_generation`] - Mirrored planet layouts
//! - [`combat`] - Fleet arrival resolution
//! - [`abilities`] - Recall, Production Surge and Shield
//! - [`ai`] - AI opponent
//! - [`simulation`] - The match state machine
//! - [`scoring`] - Final score and statistics
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod abilities;
pub mod ai;
pub mod combat;
pub mod commands;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod invariants;
pub mod map_generation;
pub mod math;
pub mod scoring;
pub mod simulation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::abilities::AbilityStatus;
    pub use crate::ai::{AiController, Difficulty, WorldView};
    pub use crate::combat::{resolve, BattleOutcome};
    pub use crate::commands::{AbilityKind, Command, CommandRejection};
    pub use crate::config::{BalanceTuning, MatchConfig, Rules};
    pub use crate::entities::{Fleet, FleetId, Owner, Planet, PlanetId, Side};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{MatchEvent, TickEvents};
    pub use crate::map_generation::{generate_map, GeneratedMap, MapConfig, MapSize};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::scoring::{ScoreBreakdown, SideStats, TacticalPenalties};
    pub use crate::simulation::{Match, MatchSnapshot, MatchStatus, SideSummary};
}
