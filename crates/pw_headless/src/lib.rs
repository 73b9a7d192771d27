//! Headless Planet Wars runner for AI testing and balance work.
//!
//! This crate plays matches without graphics:
//!
//! - **Autopilot matches**: an AI controller plays the Player side
//! - **Batch runs**: many seeds in parallel with aggregated outcomes
//! - **Interactive play**: JSON requests on stdin drive the Player side
//! - **Scoreboard**: victories recorded in a JSON high score table
//!
//! # Protocol
//!
//! Interactive sessions use JSON lines (one JSON object per line):
//!
//! - **stdin**: requests from the controller (tick, dispatch, ability, ...)
//! - **stdout**: state, events and responses (JSON)
//! - **stderr**: logs (human-readable)
//!
//! See [`protocol`] module for the full request/response specification.
//!
//! # Example
//!
//! ```bash
//! # Play interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p pw_headless -- play
//!
//! # One autopilot match
//! cargo run -p pw_headless -- run --seed 7 --ai hard
//!
//! # Balance batch
//! cargo run -p pw_headless -- batch --count 200 --output results/
//! ```

pub mod batch;
pub mod protocol;
pub mod runner;
pub mod scoreboard;
pub mod session;
pub mod settings;

pub use batch::{run_batch, run_matrix, BatchConfig, BatchResults, BatchSummary};
pub use protocol::{Request, Response};
pub use runner::{run_match, MatchOutcome, MatchReport, MatchSettings};
pub use scoreboard::{ScoreEntry, Scoreboard, ScoreboardError};
pub use session::Session;
pub use settings::{Settings, SettingsError};
