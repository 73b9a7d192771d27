//! JSON-persisted high scores.
//!
//! Only victories are recorded; a defeat scores 0 and never makes the board.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use pw_core::ai::Difficulty;
use pw_core::map_generation::MapSize;
use pw_core::scoring::SideStats;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Entries kept on disk.
pub const MAX_ENTRIES: usize = 100;

/// Error type for scoreboard operations.
#[derive(Error, Debug)]
pub enum ScoreboardError {
    /// Failed to read or write the file.
    #[error("Scoreboard IO failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid scoreboard.
    #[error("Failed to parse scoreboard: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One recorded victory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Player name.
    pub name: String,
    /// Total score.
    pub score: u32,
    /// Match time in seconds.
    pub elapsed_secs: f64,
    /// Opponent difficulty.
    pub difficulty: Difficulty,
    /// Map size played.
    pub map_size: MapSize,
    /// Match seed.
    pub seed: u64,
    /// Player statistics for the match.
    #[serde(default)]
    pub stats: SideStats,
    /// When the entry was recorded, in seconds since the Unix epoch.
    #[serde(default)]
    pub recorded_at: u64,
}

/// Current time in seconds since the Unix epoch, or 0 if the clock is
/// before it.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Board order: higher score first, then faster time.
fn rank_order(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.elapsed_secs.total_cmp(&b.elapsed_secs))
}

/// High score table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    entries: Vec<ScoreEntry>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Scoreboard {
    /// Empty scoreboard, not tied to a file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file gives an empty board tied to `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoreboardError> {
        let path = path.as_ref();
        let mut board = if path.exists() {
            let json = std::fs::read_to_string(path)?;
            let board: Scoreboard = serde_json::from_str(&json)?;
            debug!(path = %path.display(), entries = board.entries.len(), "Scoreboard loaded");
            board
        } else {
            Self::new()
        };
        board.path = Some(path.to_path_buf());
        board.sort_and_trim();
        Ok(board)
    }

    /// Write to the file this board was loaded from, if any.
    pub fn save(&self) -> Result<(), ScoreboardError> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    /// Write to `path` as pretty JSON.
    pub fn save_to(&self, path: &Path) -> Result<(), ScoreboardError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Record an entry. Returns its 1-based rank, or `None` if it did not
    /// make the board. An entry tying an existing one ranks below it.
    pub fn add_entry(&mut self, entry: ScoreEntry) -> Option<usize> {
        let index = self
            .entries
            .partition_point(|e| rank_order(e, &entry) != Ordering::Greater);
        if index >= MAX_ENTRIES {
            return None;
        }
        info!(name = %entry.name, score = entry.score, rank = index + 1, "High score recorded");
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(index + 1)
    }

    /// Best `limit` entries, highest first.
    #[must_use]
    pub fn top(&self, limit: usize) -> &[ScoreEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort by score, then faster time; ties keep insertion order.
    fn sort_and_trim(&mut self) {
        self.entries.sort_by(rank_order);
        self.entries.truncate(MAX_ENTRIES);
    }
}
