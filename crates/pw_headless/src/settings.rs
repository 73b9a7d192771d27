//! Headless settings loading.
//!
//! Settings are a RON file. Every field has a default, so a settings file
//! only needs the values it changes:
//!
//! ```ron
//! (
//!     player_name: "Ada",
//!     map_size: Large,
//!     ai_difficulty: Hard,
//!     autopilot_difficulty: Medium,
//! )
//! ```

use std::path::{Path, PathBuf};

use pw_core::ai::Difficulty;
use pw_core::config::{BalanceTuning, MatchConfig};
use pw_core::map_generation::MapSize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::MatchSettings;

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// File not found.
    #[error("Settings file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A value is out of range.
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Settings for the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name recorded on the scoreboard.
    pub player_name: String,
    /// Map size preset or explicit planet count.
    pub map_size: MapSize,
    /// Built-in opponent difficulty.
    pub ai_difficulty: Difficulty,
    /// Difficulty of the autopilot playing the Player side.
    pub autopilot_difficulty: Difficulty,
    /// Fixed frame delta in seconds.
    pub frame_dt: f64,
    /// Match time cap in seconds; a match still running then is a draw.
    pub max_match_secs: f64,
    /// Scoreboard location.
    pub scoreboard_path: PathBuf,
    /// Gameplay constants.
    pub tuning: BalanceTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Commander".to_string(),
            map_size: MapSize::Medium,
            ai_difficulty: Difficulty::Medium,
            autopilot_difficulty: Difficulty::Medium,
            frame_dt: 1.0 / 60.0,
            max_match_secs: 900.0,
            scoreboard_path: PathBuf::from("scores.json"),
            tuning: BalanceTuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse settings from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, SettingsError> {
        let settings: Settings = ron::from_str(ron)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0 && self.frame_dt <= 1.0) {
            return Err(SettingsError::Invalid(format!(
                "frame_dt must be in (0, 1], got {}",
                self.frame_dt
            )));
        }
        if !(self.max_match_secs.is_finite() && self.max_match_secs > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "max_match_secs must be positive, got {}",
                self.max_match_secs
            )));
        }
        if self.player_name.trim().is_empty() {
            return Err(SettingsError::Invalid("player_name is empty".to_string()));
        }
        Ok(())
    }

    /// Core match configuration for `seed`.
    #[must_use]
    pub fn match_config(&self, seed: u64) -> MatchConfig {
        MatchSettings::from_settings(self, seed).match_config()
    }
}
