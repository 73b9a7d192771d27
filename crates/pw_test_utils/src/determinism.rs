//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! A match is a pure function of its configuration, its seed and the
//! commands fed to it. Sources of non-determinism include:
//!
//! - **Floating-point math**: simulation state is fixed-point via
//!   [`pw_core::math::Fixed`]; floats only appear at the `tick(dt)` boundary.
//!
//! - **Iteration order**: planets and fleets live in `Vec`s and arrivals are
//!   resolved in fleet-id order.
//!
//! - **System randomness**: map generation and AI jitter use seeded PRNGs.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual rules (combat, production, abilities)
//! 2. **Property tests**: random commands must still produce reproducible state
//! 3. **Integration tests**: full AI-vs-AI matches are reproducible
//! 4. **Parallel tests**: running N matches on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use pw_core::simulation::Match;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run ended in the same state.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute a state hash
///
/// # Example
///
/// ```
/// use pw_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
/// assert!(result.is_deterministic);
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            for _ in 0..ticks {
                step(&mut state);
            }
            hash(&state)
        })
        .collect();

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a match three times for `ticks` ticks of `dt` and compare final hashes.
pub fn verify_match_determinism<F>(setup: F, ticks: u64, dt: f64) -> DeterminismResult
where
    F: Fn() -> Match,
{
    verify_determinism(
        3,
        ticks,
        setup,
        |game| {
            game.tick(dt);
        },
        Match::state_hash,
    )
}

/// Run `num_matches` copies of a match on separate threads.
///
/// Returns the final hash of each, in spawn order.
///
/// # Panics
///
/// If a worker thread panics.
pub fn run_parallel_matches<F>(setup: F, num_matches: usize, ticks: u64, dt: f64) -> Vec<u64>
where
    F: Fn() -> Match + Sync,
{
    thread::scope(|scope| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| {
                scope.spawn(|| {
                    let mut game = setup();
                    for _ in 0..ticks {
                        game.tick(dt);
                    }
                    game.state_hash()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("match thread panicked"))
            .collect()
    })
}

/// Step two copies of a match side by side and report the first tick whose
/// state hashes differ.
///
/// Returns `None` if they agree for all `ticks`.
pub fn find_first_divergence<F>(setup: F, ticks: u64, dt: f64) -> Option<u64>
where
    F: Fn() -> Match,
{
    let mut a = setup();
    let mut b = setup();
    if a.state_hash() != b.state_hash() {
        return Some(0);
    }
    for tick in 1..=ticks {
        a.tick(dt);
        b.tick(dt);
        if a.state_hash() != b.state_hash() {
            tracing::warn!(tick, "Matches diverged");
            return Some(tick);
        }
    }
    None
}

/// Check that a match's snapshot survives a bincode round-trip unchanged
/// after `ticks` ticks.
pub fn verify_snapshot_stability<F>(setup: F, ticks: u64, dt: f64) -> bool
where
    F: Fn() -> Match,
{
    let mut game = setup();
    for _ in 0..ticks {
        game.tick(dt);
    }
    let snapshot = game.snapshot();
    let Ok(bytes) = snapshot.to_bytes() else {
        return false;
    };
    pw_core::simulation::MatchSnapshot::from_bytes(&bytes).is_ok_and(|restored| restored == snapshot)
}

/// Hash any hashable value with the standard hasher.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel_match, duel_match_against, generated_match};
    use pw_core::ai::Difficulty;
    use pw_core::entities::{PlanetId, Side};
    use pw_core::map_generation::MapSize;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
        assert_eq!(result.unique_hashes(), vec![100]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_reports_mismatch() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            ticks: 10,
        };
        result.assert_deterministic();
    }

    #[test]
    fn test_idle_match_determinism() {
        verify_match_determinism(duel_match, 300, DT).assert_deterministic();
    }

    #[test]
    fn test_scripted_attack_determinism() {
        let setup = || {
            let mut game = duel_match();
            game.dispatch_fleet(Side::Player, PlanetId(0), PlanetId(1), 30)
                .expect("player owns its home");
            game
        };
        verify_match_determinism(setup, 600, DT).assert_deterministic();
    }

    #[test]
    fn test_ai_duel_has_no_divergence() {
        let divergence = find_first_divergence(|| duel_match_against(Difficulty::Hard, 7), 900, DT);
        assert!(divergence.is_none(), "Expected no divergence, got {divergence:?}");
    }

    #[test]
    fn test_parallel_generated_matches_agree() {
        let hashes = run_parallel_matches(
            || generated_match(MapSize::Small, Some(Difficulty::Medium), 42),
            4,
            600,
            DT,
        );
        assert_eq!(hashes.len(), 4);
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_snapshot_stability_mid_match() {
        assert!(verify_snapshot_stability(
            || duel_match_against(Difficulty::Medium, 3),
            400,
            DT
        ));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = generated_match(MapSize::Medium, None, 1);
        let b = generated_match(MapSize::Medium, None, 2);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&(1u32, "a")), compute_hash(&(1u32, "a")));
    }
}
