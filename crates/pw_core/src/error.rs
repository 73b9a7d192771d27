//! Error types for the game simulation.
//!
//! Rejected player commands are not errors; see
//! [`CommandRejection`](crate::commands::CommandRejection).

use thiserror::Error;

use crate::entities::PlanetId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A map needs at least the two home planets.
    #[error("Invalid planet count {requested}: a map needs at least {minimum} planets")]
    InvalidPlanetCount {
        /// Planet count that was asked for.
        requested: usize,
        /// Smallest supported count.
        minimum: usize,
    },

    /// Map dimensions too small to hold planets inside the margins, or too large.
    #[error("Invalid map dimensions {width}x{height}")]
    InvalidMapDimensions {
        /// Map width in world units.
        width: u32,
        /// Map height in world units.
        height: u32,
    },

    /// Invalid planet reference.
    #[error("Planet not found: {0}")]
    PlanetNotFound(PlanetId),

    /// Configuration could not be parsed.
    #[error("Failed to parse match config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Configuration parsed but holds unusable values.
    #[error("Invalid match config: {0}")]
    InvalidConfig(String),

    /// Snapshot encoding or decoding failed.
    #[error("Snapshot codec error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
