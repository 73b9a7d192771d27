//! End-to-end tests for the headless runner: files on disk, batch runs and
//! the JSON-lines session against generated maps.

use pw_core::ai::Difficulty;
use pw_core::map_generation::MapSize;
use pw_core::scoring::SideStats;
use pw_core::simulation::Match;
use pw_headless::protocol::Response;
use pw_headless::runner::MatchOutcome;
use pw_headless::{run_batch, run_match, BatchConfig, MatchSettings, ScoreEntry, Scoreboard, Session, Settings};
use pw_test_utils::fixtures::duel_match_against;

fn quick_settings() -> MatchSettings {
    MatchSettings {
        map_size: MapSize::Small,
        frame_dt: 0.1,
        max_match_secs: 90.0,
        ..MatchSettings::default()
    }
}

#[test]
fn settings_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ron");
    std::fs::write(
        &path,
        "(player_name: \"Grace\", map_size: Small, ai_difficulty: Easy, frame_dt: 0.05)",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.player_name, "Grace");
    assert_eq!(settings.ai_difficulty, Difficulty::Easy);

    let game = Match::new(&settings.match_config(9)).unwrap();
    assert_eq!(game.planets().len(), MapSize::Small.planet_count());
}

#[test]
fn scoreboard_persists_between_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores").join("scores.json");

    let mut board = Scoreboard::load(&path).unwrap();
    assert!(board.is_empty());
    for (name, score) in [("ada", 120), ("grace", 180), ("linus", 95)] {
        board.add_entry(ScoreEntry {
            name: name.to_string(),
            score,
            elapsed_secs: 60.0,
            difficulty: Difficulty::Hard,
            map_size: MapSize::Medium,
            seed: 3,
            stats: SideStats::default(),
            recorded_at: 1_700_000_000,
        });
    }
    board.save().unwrap();

    let reloaded = Scoreboard::load(&path).unwrap();
    assert_eq!(reloaded.len(), 3);
    let names: Vec<&str> = reloaded.top(2).iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["grace", "ada"]);
}

#[test]
fn corrupt_scoreboard_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(Scoreboard::load(&path).is_err());
}

#[test]
fn batch_is_reproducible() {
    let a = run_batch(BatchConfig::new(quick_settings(), 4).with_seed(100));
    let b = run_batch(BatchConfig::new(quick_settings(), 4).with_seed(100));

    let hashes = |r: &pw_headless::BatchResults| -> Vec<u64> {
        r.matches.iter().map(|m| m.final_state_hash).collect()
    };
    assert_eq!(hashes(&a), hashes(&b));
    assert_eq!(a.summary.victories, b.summary.victories);
}

#[test]
fn batch_matches_single_runs() {
    let results = run_batch(BatchConfig::new(quick_settings(), 2).with_seed(40));
    for report in &results.matches {
        let single = run_match(&quick_settings().with_seed(report.seed)).unwrap();
        assert_eq!(single.final_state_hash, report.final_state_hash);
        assert_eq!(single.outcome, report.outcome);
    }
}

#[test]
fn reported_outcome_agrees_with_score() {
    for seed in 0..3 {
        let report = run_match(&quick_settings().with_seed(seed)).unwrap();
        match report.outcome {
            MatchOutcome::Victory => assert!(report.score.is_some_and(|s| s.total >= 100)),
            MatchOutcome::Defeat => assert_eq!(report.score.map(|s| s.total), Some(0)),
            MatchOutcome::Draw => assert!(report.score.is_none()),
        }
    }
}

#[test]
fn session_plays_duel_to_victory() {
    let mut session = Session::new(duel_match_against(Difficulty::Easy, 1), 0.1);
    let input = [
        r#"{"cmd":"state"}"#,
        r#"{"cmd":"dispatch","source":0,"destination":5,"units":1}"#,
        r#"{"cmd":"ability","ability":"Surge"}"#,
        r#"{"cmd":"tick","count":10}"#,
        r#"{"cmd":"hash"}"#,
    ]
    .join("\n");
    let mut output = Vec::new();
    session.run(input.as_bytes(), &mut output).unwrap();

    let responses: Vec<Response> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(matches!(responses[0], Response::Ready { planets: 3, .. }));
    assert!(matches!(responses[1], Response::State(_)));
    // Planet 5 does not exist.
    assert!(matches!(&responses[2], Response::Error { cmd: Some(cmd), .. } if cmd == "dispatch"));
    assert!(matches!(&responses[3], Response::Ack { cmd } if cmd == "ability"));
    assert!(matches!(&responses[4], Response::Events { elapsed_secs, .. } if *elapsed_secs > 0.9));
    assert!(matches!(responses[5], Response::StateHash { .. }));
    assert!(matches!(responses.last(), Some(Response::Bye)));
    assert!(!session.is_finished());
}

#[test]
fn stronger_autopilot_beats_weaker_ai() {
    let pairing = |autopilot: Difficulty, ai: Difficulty| {
        let base = MatchSettings {
            map_size: MapSize::Small,
            max_match_secs: 300.0,
            ..MatchSettings::default()
        }
        .with_difficulties(autopilot, ai);
        run_batch(BatchConfig::new(base, 16).with_seed(500)).summary
    };

    let hard_vs_easy = pairing(Difficulty::Hard, Difficulty::Easy);
    let easy_vs_hard = pairing(Difficulty::Easy, Difficulty::Hard);

    assert!(
        hard_vs_easy.victories > hard_vs_easy.defeats,
        "Hard autopilot vs Easy AI: {hard_vs_easy:?}"
    );
    assert!(
        easy_vs_hard.defeats > easy_vs_hard.victories,
        "Easy autopilot vs Hard AI: {easy_vs_hard:?}"
    );
    assert!(hard_vs_easy.victories > easy_vs_hard.victories);
}
