//! Simulation benchmarks for pw_core.
//!
//! Run with: `cargo bench -p pw_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pw_core::prelude::*;

const FRAME: f64 = 1.0 / 60.0;

fn medium_match() -> (Match, AiController) {
    let config = MatchConfig::default()
        .with_seed(2024)
        .with_map_size(MapSize::Medium)
        .with_opponent(Some(Difficulty::Hard));
    let game = Match::new(&config).expect("default config is valid");
    (game, AiController::new(Difficulty::Hard, 99))
}

/// One minute of Hard vs Hard on a medium map.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("medium_map_hard_vs_hard_60s", |b| {
        b.iter_batched(
            medium_match,
            |(mut game, mut autopilot)| {
                for _ in 0..3600 {
                    let events = game.tick(FRAME);
                    for command in autopilot.update(&game.world_view(), Side::Player, FRAME) {
                        let _ = game.submit(command);
                    }
                    if events.ended_match() {
                        break;
                    }
                }
                black_box(game.state_hash())
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("map_generation_large", |b| {
        let config = MapConfig::large();
        b.iter(|| black_box(generate_map(black_box(&config)).expect("valid config")));
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
