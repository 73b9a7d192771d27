//! Headless Planet Wars runner.
//!
//! This binary plays matches without graphics.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - Player commands as JSON lines on stdin
//! cargo run -p pw_headless -- play
//!
//! # One match with the Player side on autopilot
//! cargo run -p pw_headless -- run --seed 7 --ai hard --autopilot medium
//!
//! # Batch balance test
//! cargo run -p pw_headless -- batch --count 1000 --output results/
//!
//! # High scores
//! cargo run -p pw_headless -- scores --limit 10
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the level chosen by `--verbose`.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pw_core::ai::Difficulty;
use pw_core::entities::Side;
use pw_core::map_generation::MapSize;
use pw_core::scoring::SideStats;
use pw_core::simulation::Match;
use pw_headless::{
    batch::{run_batch, run_matrix, BatchConfig},
    runner::{run_match, MatchOutcome, MatchSettings},
    scoreboard::{unix_now, ScoreEntry, Scoreboard},
    session::Session,
    settings::Settings,
};

#[derive(Parser)]
#[command(name = "pw_headless")]
#[command(about = "Headless Planet Wars runner for AI testing and balance work")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (RON)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Opponent strength on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Map size preset on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MapSizeArg {
    Small,
    Medium,
    Large,
}

impl From<MapSizeArg> for MapSize {
    fn from(arg: MapSizeArg) -> Self {
        match arg {
            MapSizeArg::Small => MapSize::Small,
            MapSizeArg::Medium => MapSize::Medium,
            MapSizeArg::Large => MapSize::Large,
        }
    }
}

/// Flags that override settings fields.
#[derive(clap::Args, Debug, Clone)]
struct MatchArgs {
    /// Built-in AI difficulty
    #[arg(long)]
    ai: Option<DifficultyArg>,

    /// Map size preset
    #[arg(long)]
    map: Option<MapSizeArg>,

    /// Explicit planet count (overrides --map)
    #[arg(long)]
    planets: Option<usize>,
}

impl MatchArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(ai) = self.ai {
            settings.ai_difficulty = ai.into();
        }
        if let Some(map) = self.map {
            settings.map_size = map.into();
        }
        if let Some(count) = self.planets {
            settings.map_size = MapSize::Custom(count);
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively: Player commands as JSON lines on stdin
    Play {
        #[command(flatten)]
        match_args: MatchArgs,

        /// Map and AI seed
        #[arg(long, default_value = "12345")]
        seed: u64,
    },

    /// Run one match with the Player side on autopilot
    Run {
        #[command(flatten)]
        match_args: MatchArgs,

        /// Autopilot difficulty for the Player side
        #[arg(long)]
        autopilot: Option<DifficultyArg>,

        /// Map and AI seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Record a victory on the scoreboard
        #[arg(long)]
        record: bool,
    },

    /// Run a batch of autopilot matches for balance testing
    Batch {
        #[command(flatten)]
        match_args: MatchArgs,

        /// Autopilot difficulty for the Player side
        #[arg(long)]
        autopilot: Option<DifficultyArg>,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Run every autopilot difficulty against every AI difficulty
        #[arg(long)]
        matrix: bool,
    },

    /// Show the high score table
    Scores {
        /// Entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let mut settings = match &cli.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "Failed to load settings");
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    match cli.command {
        Some(Commands::Play { match_args, seed }) => {
            match_args.apply(&mut settings);
            cmd_play(&settings, seed);
        }
        Some(Commands::Run {
            match_args,
            autopilot,
            seed,
            record,
        }) => {
            match_args.apply(&mut settings);
            if let Some(autopilot) = autopilot {
                settings.autopilot_difficulty = autopilot.into();
            }
            cmd_run(&settings, seed, record);
        }
        Some(Commands::Batch {
            match_args,
            autopilot,
            count,
            parallel,
            output,
            seed,
            matrix,
        }) => {
            match_args.apply(&mut settings);
            if let Some(autopilot) = autopilot {
                settings.autopilot_difficulty = autopilot.into();
            }
            let config = BatchConfig {
                base: MatchSettings::from_settings(&settings, seed),
                match_count: count,
                parallel_matches: parallel,
                seed_start: seed,
                output_dir: output,
            };
            if matrix {
                cmd_matrix(&config);
            } else {
                cmd_batch(config);
            }
        }
        Some(Commands::Scores { limit }) => {
            cmd_scores(&settings, limit);
        }
        None => {
            // Default: interactive mode
            cmd_play(&settings, 12345);
        }
    }
}

/// Play one match over stdin/stdout
fn cmd_play(settings: &Settings, seed: u64) {
    tracing::info!(seed, ai = %settings.ai_difficulty, "Starting interactive session");

    let game = match Match::new(&settings.match_config(seed)) {
        Ok(game) => game,
        Err(e) => fail("Failed to start match", &e),
    };
    let mut session = Session::new(game, settings.frame_dt);

    let stdin = io::stdin();
    if let Err(e) = session.run(stdin.lock(), io::stdout().lock()) {
        fail("Session IO failed", &e);
    }

    let game = session.game();
    if MatchOutcome::from_status(game.status()) == MatchOutcome::Victory {
        if let Some(score) = game.final_score() {
            record_score(settings, seed, score.total, game.elapsed_secs(), *game.stats(Side::Player));
        }
    }
}

/// Run a single autopilot match
fn cmd_run(settings: &Settings, seed: u64, record: bool) {
    let report = match run_match(&MatchSettings::from_settings(settings, seed)) {
        Ok(report) => report,
        Err(e) => fail("Match failed", &e),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => fail("Failed to serialize report", &e),
    }

    if record && report.outcome == MatchOutcome::Victory {
        if let Some(score) = report.score {
            record_score(settings, seed, score.total, report.elapsed_secs, report.player_stats);
        }
    }
}

/// Run batch of matches for balance testing
fn cmd_batch(config: BatchConfig) {
    let output = config.output_dir.clone();
    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        fail("Cannot create output directory", &e);
    }

    let results = run_batch(config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        fail("Failed to save results", &e);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", summary.total_matches);
    if !results.errors.is_empty() {
        eprintln!("Matches failed: {}", results.errors.len());
    }
    eprintln!(
        "Victories: {}  Defeats: {}  Draws: {}",
        summary.victories, summary.defeats, summary.draws
    );
    eprintln!("Win rate: {:.1}%", summary.win_rate() * 100.0);
    eprintln!("Mean duration: {:.1}s", summary.mean_duration_secs);
    eprintln!("Results: {}", results_path.display());
}

/// Run the full difficulty matrix and print one row per pairing
fn cmd_matrix(config: &BatchConfig) {
    println!("{:<10} {:<10} {:>8} {:>8} {:>8} {:>10}", "autopilot", "ai", "wins", "losses", "draws", "mean_secs");
    for (autopilot, ai, summary) in run_matrix(config) {
        println!(
            "{:<10} {:<10} {:>8} {:>8} {:>8} {:>10.1}",
            autopilot.to_string(),
            ai.to_string(),
            summary.victories,
            summary.defeats,
            summary.draws,
            summary.mean_duration_secs
        );
    }
}

/// Print the high score table
fn cmd_scores(settings: &Settings, limit: usize) {
    let board = match Scoreboard::load(&settings.scoreboard_path) {
        Ok(board) => board,
        Err(e) => fail("Failed to load scoreboard", &e),
    };
    if board.is_empty() {
        println!("No scores yet.");
        return;
    }
    for (rank, entry) in board.top(limit).iter().enumerate() {
        println!(
            "{:>3}. {:<16} {:>5}  {:>7.1}s  {}",
            rank + 1,
            entry.name,
            entry.score,
            entry.elapsed_secs,
            entry.difficulty
        );
    }
}

fn record_score(settings: &Settings, seed: u64, score: u32, elapsed_secs: f64, stats: SideStats) {
    let mut board = match Scoreboard::load(&settings.scoreboard_path) {
        Ok(board) => board,
        Err(e) => {
            tracing::warn!(error = %e, "Scoreboard unreadable, starting a new one");
            Scoreboard::new()
        }
    };
    let rank = board.add_entry(ScoreEntry {
        name: settings.player_name.clone(),
        score,
        elapsed_secs,
        difficulty: settings.ai_difficulty,
        map_size: settings.map_size,
        seed,
        stats,
        recorded_at: unix_now(),
    });
    if let Err(e) = board.save_to(&settings.scoreboard_path) {
        tracing::error!(error = %e, "Failed to save scoreboard");
        return;
    }
    if let Some(rank) = rank {
        eprintln!("New high score: #{rank} with {score} points");
    }
}

fn fail(context: &str, error: &dyn std::fmt::Display) -> ! {
    tracing::error!(error = %error, "{context}");
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}
