//! Match configuration.
//!
//! [`MatchConfig`] is plain serde data so adapters can load it from RON.
//! Tuning values are written as `f64` for readability and converted to
//! fixed point once, when a match is created.

use serde::{Deserialize, Serialize};

use crate::ai::Difficulty;
use crate::error::{GameError, Result};
use crate::map_generation::{MapConfig, MapSize};
use crate::math::{fixed_from_f64, Fixed};

/// Gameplay constants that are worth tweaking without touching code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceTuning {
    /// Fleet speed in world units per second.
    pub fleet_speed: f64,
    /// Production multiplier while a Surge is active.
    pub surge_multiplier: u32,
    /// Surge length in seconds.
    pub surge_duration_secs: f64,
    /// Shield length in seconds.
    pub shield_duration_secs: f64,
}

impl Default for BalanceTuning {
    fn default() -> Self {
        Self {
            fleet_speed: 200.0,
            surge_multiplier: 2,
            surge_duration_secs: 10.0,
            shield_duration_secs: 15.0,
        }
    }
}

/// Tuning converted to simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rules {
    /// Fleet speed in world units per second.
    #[serde(with = "crate::math::fixed_serde")]
    pub fleet_speed: Fixed,
    /// Production multiplier while a Surge is active.
    pub surge_multiplier: u32,
    /// Surge length in seconds.
    #[serde(with = "crate::math::fixed_serde")]
    pub surge_duration: Fixed,
    /// Shield length in seconds.
    #[serde(with = "crate::math::fixed_serde")]
    pub shield_duration: Fixed,
}

impl BalanceTuning {
    /// Validate and convert to fixed point.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] if any duration or speed is not a
    /// positive finite number, or the surge multiplier is zero.
    pub fn to_rules(&self) -> Result<Rules> {
        let positive = |name: &str, value: f64| {
            fixed_from_f64(value)
                .filter(|v| *v > Fixed::ZERO)
                .ok_or_else(|| GameError::InvalidConfig(format!("{name} must be positive, got {value}")))
        };
        if self.surge_multiplier == 0 {
            return Err(GameError::InvalidConfig(
                "surge_multiplier must be at least 1".to_string(),
            ));
        }
        Ok(Rules {
            fleet_speed: positive("fleet_speed", self.fleet_speed)?,
            surge_multiplier: self.surge_multiplier,
            surge_duration: positive("surge_duration_secs", self.surge_duration_secs)?,
            shield_duration: positive("shield_duration_secs", self.shield_duration_secs)?,
        })
    }
}

/// Everything needed to start a match.
///
/// # Example
///
/// ```
/// use pw_core::config::MatchConfig;
/// use pw_core::ai::Difficulty;
///
/// let config = MatchConfig::from_ron_str("(opponent: Some(Hard), seed: 9)").unwrap();
/// assert_eq!(config.opponent, Some(Difficulty::Hard));
/// assert_eq!(config.seed, 9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Map generation settings.
    pub map: MapConfig,
    /// Built-in AI opponent, or `None` when an adapter drives the AI side.
    pub opponent: Option<Difficulty>,
    /// Seed for the AI opponent's random stream.
    pub seed: u64,
    /// Gameplay constants.
    pub tuning: BalanceTuning,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            opponent: Some(Difficulty::Medium),
            seed: 12345,
            tuning: BalanceTuning::default(),
        }
    }
}

impl MatchConfig {
    /// Parse a RON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`GameError::ConfigParse`] on malformed RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Seed both the map and the AI stream.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.map.seed = seed;
        self
    }

    /// Set the map size.
    #[must_use]
    pub fn with_map_size(mut self, size: MapSize) -> Self {
        self.map.size = size;
        self
    }

    /// Set the built-in opponent.
    #[must_use]
    pub fn with_opponent(mut self, opponent: Option<Difficulty>) -> Self {
        self.opponent = opponent;
        self
    }
}
