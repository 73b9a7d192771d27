//! Autopilot match runner.
//!
//! Plays one match to completion with an [`AiController`] standing in for the
//! human on the Player side, and reports the outcome.

use pw_core::ai::{AiController, Difficulty};
use pw_core::config::{BalanceTuning, MatchConfig};
use pw_core::entities::Side;
use pw_core::events::MatchEvent;
use pw_core::map_generation::MapSize;
use pw_core::scoring::{ScoreBreakdown, SideStats};
use pw_core::simulation::{Match, MatchStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::settings::Settings;

/// Salt mixed into the seed for the autopilot's random stream.
const AUTOPILOT_SEED_SALT: u64 = 0xA070_9170_7A11_0001;

/// Everything that defines one autopilot match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Map and AI seed.
    pub seed: u64,
    /// Map size.
    pub map_size: MapSize,
    /// Built-in opponent.
    pub ai_difficulty: Difficulty,
    /// Autopilot on the Player side.
    pub autopilot_difficulty: Difficulty,
    /// Fixed frame delta in seconds.
    pub frame_dt: f64,
    /// Time cap in seconds.
    pub max_match_secs: f64,
    /// Gameplay constants.
    pub tuning: BalanceTuning,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), 0)
    }
}

impl MatchSettings {
    /// Take everything but the seed from headless settings.
    #[must_use]
    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        Self {
            seed,
            map_size: settings.map_size,
            ai_difficulty: settings.ai_difficulty,
            autopilot_difficulty: settings.autopilot_difficulty,
            frame_dt: settings.frame_dt,
            max_match_secs: settings.max_match_secs,
            tuning: settings.tuning.clone(),
        }
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Core match configuration.
    #[must_use]
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            tuning: self.tuning.clone(),
            ..MatchConfig::default()
        }
        .with_seed(self.seed)
        .with_map_size(self.map_size)
        .with_opponent(Some(self.ai_difficulty))
    }

    /// Set both difficulties.
    #[must_use]
    pub fn with_difficulties(mut self, autopilot: Difficulty, ai: Difficulty) -> Self {
        self.autopilot_difficulty = autopilot;
        self.ai_difficulty = ai;
        self
    }
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The Player side eliminated the AI.
    Victory,
    /// The AI eliminated the Player side.
    Defeat,
    /// The time cap ran out first.
    Draw,
}

impl MatchOutcome {
    /// Outcome for a match status; a running match is a draw.
    #[must_use]
    pub const fn from_status(status: MatchStatus) -> Self {
        match status {
            MatchStatus::PlayerVictory => Self::Victory,
            MatchStatus::AiVictory => Self::Defeat,
            MatchStatus::Running => Self::Draw,
        }
    }
}

/// Result of one autopilot match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Seed used.
    pub seed: u64,
    /// How it ended.
    pub outcome: MatchOutcome,
    /// Match time in seconds.
    pub elapsed_secs: f64,
    /// Ticks run.
    pub ticks: u64,
    /// Player score, present when the match ended.
    pub score: Option<ScoreBreakdown>,
    /// Player statistics.
    pub player_stats: SideStats,
    /// AI statistics.
    pub ai_stats: SideStats,
    /// Commands the match rejected when applying them.
    pub rejected_commands: u32,
    /// Final state hash.
    pub final_state_hash: u64,
}

/// Play one match with the Player side on autopilot.
///
/// # Errors
///
/// Map generation or tuning errors from the core.
pub fn run_match(settings: &MatchSettings) -> pw_core::error::Result<MatchReport> {
    let mut game = Match::new(&settings.match_config())?;
    let mut autopilot = AiController::new(settings.autopilot_difficulty, settings.seed ^ AUTOPILOT_SEED_SALT);
    let max_ticks = (settings.max_match_secs / settings.frame_dt).ceil() as u64;

    let mut ticks = 0u64;
    let mut rejected_commands = 0u32;
    while !game.is_terminal() && ticks < max_ticks {
        for command in autopilot.update(&game.world_view(), Side::Player, settings.frame_dt) {
            if let Err(reason) = game.submit(command) {
                debug!(?command, %reason, "Autopilot command rejected");
                rejected_commands += 1;
            }
        }
        let events = game.tick(settings.frame_dt);
        rejected_commands += events
            .iter()
            .filter(|e| matches!(e, MatchEvent::CommandRejected { .. }))
            .count() as u32;
        ticks += 1;
    }

    let outcome = MatchOutcome::from_status(game.status());
    info!(
        seed = settings.seed,
        ?outcome,
        elapsed_secs = game.elapsed_secs(),
        autopilot = %settings.autopilot_difficulty,
        ai = %settings.ai_difficulty,
        "Match finished"
    );

    Ok(MatchReport {
        seed: settings.seed,
        outcome,
        elapsed_secs: game.elapsed_secs(),
        ticks,
        score: game.final_score(),
        player_stats: *game.stats(Side::Player),
        ai_stats: *game.stats(Side::Ai),
        rejected_commands,
        final_state_hash: game.state_hash(),
    })
}
