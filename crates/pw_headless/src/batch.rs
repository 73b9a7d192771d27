//! Batch match runner for balance testing.
//!
//! Runs many seeds in parallel using rayon and aggregates the outcomes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use pw_core::ai::Difficulty;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::runner::{run_match, MatchOutcome, MatchReport, MatchSettings};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Settings shared by every match; the seed is replaced per match.
    pub base: MatchSettings,
    /// Number of matches to run
    pub match_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_matches: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            base: MatchSettings::default(),
            match_count: 100,
            parallel_matches: 0,
            seed_start: 0,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create config for `match_count` matches of `base`
    pub fn new(base: MatchSettings, match_count: u32) -> Self {
        Self {
            base,
            match_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches that finished (errors excluded).
    pub total_matches: u32,
    /// Player-side wins.
    pub victories: u32,
    /// AI wins.
    pub defeats: u32,
    /// Matches that hit the time cap.
    pub draws: u32,
    /// Mean match time in seconds.
    pub mean_duration_secs: f64,
    /// Mean Player score over victories.
    pub mean_victory_score: f64,
}

impl BatchSummary {
    /// Summarize a set of reports.
    #[must_use]
    pub fn from_reports(reports: &[MatchReport]) -> Self {
        let mut summary = Self {
            total_matches: reports.len() as u32,
            ..Self::default()
        };
        if reports.is_empty() {
            return summary;
        }
        let mut score_total = 0u64;
        for report in reports {
            match report.outcome {
                MatchOutcome::Victory => {
                    summary.victories += 1;
                    score_total += u64::from(report.score.map_or(0, |s| s.total));
                }
                MatchOutcome::Defeat => summary.defeats += 1,
                MatchOutcome::Draw => summary.draws += 1,
            }
        }
        summary.mean_duration_secs =
            reports.iter().map(|r| r.elapsed_secs).sum::<f64>() / f64::from(summary.total_matches);
        if summary.victories > 0 {
            summary.mean_victory_score = score_total as f64 / f64::from(summary.victories);
        }
        summary
    }

    /// Player-side win rate over finished matches.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.total_matches == 0 {
            return 0.0;
        }
        f64::from(self.victories) / f64::from(self.total_matches)
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match reports, in seed order
    pub matches: Vec<MatchReport>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index
    pub match_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of matches
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        matches = config.match_count,
        autopilot = %config.base.autopilot_difficulty,
        ai = %config.base.ai_difficulty,
        "Starting batch run"
    );

    // Configure thread pool if specified
    if config.parallel_matches > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_matches as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MatchReport, BatchError>> = (0..config.match_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let settings = config.base.clone().with_seed(seed);
            let result = run_match(&settings).map_err(|e| {
                warn!("Match {} failed: {}", i, e);
                BatchError {
                    match_index: i,
                    seed,
                    message: e.to_string(),
                }
            });
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 10 == 0 {
                debug!("Progress: {}/{}", done, config.match_count);
            }
            result
        })
        .collect();

    let (matches, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let matches: Vec<MatchReport> = matches.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_reports(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s, win rate {:.1}%",
        matches.len(),
        duration_seconds,
        summary.win_rate() * 100.0
    );

    BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
        errors,
    }
}

/// Run every autopilot difficulty against every AI difficulty.
///
/// Returns `(autopilot, ai, summary)` for each pairing.
pub fn run_matrix(base: &BatchConfig) -> Vec<(Difficulty, Difficulty, BatchSummary)> {
    let mut rows = Vec::new();
    for autopilot in Difficulty::ALL {
        for ai in Difficulty::ALL {
            let config = BatchConfig {
                base: base.base.clone().with_difficulties(autopilot, ai),
                ..base.clone()
            };
            rows.push((autopilot, ai, run_batch(config).summary));
        }
    }
    rows
}
