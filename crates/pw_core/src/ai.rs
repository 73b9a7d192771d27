//! AI opponent.
//!
//! A single decision function, [`AiController::evaluate`], is driven by an
//! [`AiProfile`] parameter bundle. Profiles come from the [`Difficulty`]
//! registry at configuration time. The controller only reads the world and
//! returns [`Command`]s; it never mutates the match.
//!
//! Heuristic scoring is advisory and uses `f64`. The controller's random
//! stream is seeded, so a given seed reproduces the same decisions.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abilities::AbilityLedger;
use crate::combat::effective_defense;
use crate::commands::{AbilityKind, Command};
use crate::entities::{Fleet, Owner, Planet, PlanetId, Side};
use crate::math::Fixed;

/// Production tier at which a planet counts as high-value.
const HIGH_TIER: u32 = 3;

/// AI difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    /// Slow, cautious, picks the closest target.
    Easy,
    /// Balanced.
    #[default]
    Medium,
    /// Fast, aggressive, uses every ability.
    Hard,
}

impl Difficulty {
    /// All difficulties from weakest to strongest.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Parameter bundle for this difficulty.
    #[must_use]
    pub fn profile(self) -> AiProfile {
        match self {
            Self::Easy => AiProfile {
                decision_interval_secs: 3.0,
                send_fraction: 0.3,
                min_units_to_attack: 20,
                safety_margin: 1.5,
                jitter: 1.5,
                selection: TargetSelection::Closest,
                weights: ScoreWeights {
                    production: 1.0,
                    distance: 1.0,
                    defense: 1.0,
                    enemy: 0.0,
                },
                abilities: AbilityPolicy::default(),
            },
            Self::Medium => AiProfile {
                decision_interval_secs: 2.0,
                send_fraction: 0.5,
                min_units_to_attack: 10,
                safety_margin: 1.2,
                jitter: 0.75,
                selection: TargetSelection::BestScore,
                weights: ScoreWeights {
                    production: 1.5,
                    distance: 1.0,
                    defense: 0.8,
                    enemy: 0.5,
                },
                abilities: AbilityPolicy {
                    surge_min_high_tier: Some(3),
                    shield: false,
                    recall: false,
                },
            },
            Self::Hard => AiProfile {
                decision_interval_secs: 1.0,
                send_fraction: 0.7,
                min_units_to_attack: 5,
                safety_margin: 1.2,
                jitter: 0.25,
                selection: TargetSelection::BestScore,
                weights: ScoreWeights {
                    production: 2.0,
                    distance: 0.8,
                    defense: 0.6,
                    enemy: 1.0,
                },
                abilities: AbilityPolicy {
                    surge_min_high_tier: Some(2),
                    shield: true,
                    recall: true,
                },
            },
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => f.write_str("Easy"),
            Self::Medium => f.write_str("Medium"),
            Self::Hard => f.write_str("Hard"),
        }
    }
}

/// How the controller picks among viable targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSelection {
    /// Nearest viable target to any owned planet.
    Closest,
    /// Highest heuristic score.
    BestScore,
}

/// Target scoring weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Per production tier.
    pub production: f64,
    /// Per 100 world units from the nearest owned planet (subtracted).
    pub distance: f64,
    /// Per 10 estimated defenders (subtracted).
    pub defense: f64,
    /// Flat bonus for planets owned by the opponent.
    pub enemy: f64,
}

/// When the controller uses abilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityPolicy {
    /// Surge once this many high-tier planets are owned. `None` never surges.
    pub surge_min_high_tier: Option<usize>,
    /// Shield a planet facing more inbound enemies than it has units.
    pub shield: bool,
    /// Recall when most in-flight strength is heading into lost fights.
    pub recall: bool,
}

/// Parameter bundle consumed by the decision function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    /// Seconds between evaluations.
    pub decision_interval_secs: f64,
    /// Fraction of the source garrison sent per dispatch.
    pub send_fraction: f64,
    /// Garrison a planet needs before it is used as a source.
    pub min_units_to_attack: u32,
    /// Overkill factor required against opponent-owned planets.
    pub safety_margin: f64,
    /// Scale of the random term added to target scores. Under
    /// [`TargetSelection::Closest`] it inflates estimated defenses instead.
    pub jitter: f64,
    /// Target choice rule.
    pub selection: TargetSelection,
    /// Scoring weights.
    pub weights: ScoreWeights,
    /// Ability usage rules.
    pub abilities: AbilityPolicy,
}

/// Read-only view of the match handed to controllers.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// Planets in generation order.
    pub planets: &'a [Planet],
    /// Live fleets.
    pub fleets: &'a [Fleet],
    /// Ability usage and Surge timers.
    pub abilities: &'a AbilityLedger,
    /// Fleet speed in world units per second.
    pub fleet_speed: Fixed,
    /// Production multiplier under Surge.
    pub surge_multiplier: u32,
}

impl WorldView<'_> {
    fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Units each planet has inbound from `side`.
    fn inbound_from(&self, side: Side) -> HashMap<PlanetId, u32> {
        let mut inbound = HashMap::new();
        for fleet in self.fleets.iter().filter(|f| f.owner == side) {
            *inbound.entry(fleet.destination).or_insert(0) += fleet.units;
        }
        inbound
    }
}

/// A scored target candidate.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    target: PlanetId,
    score: f64,
    nearest: f64,
}

/// Seeded decision loop for one side.
#[derive(Debug, Clone)]
pub struct AiController {
    difficulty: Difficulty,
    profile: AiProfile,
    timer: f64,
    rng: StdRng,
}

impl AiController {
    /// Create a controller for `difficulty` with its own random stream.
    #[must_use]
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_profile(difficulty, difficulty.profile(), seed)
    }

    /// Create a controller with a custom profile.
    #[must_use]
    pub fn with_profile(difficulty: Difficulty, profile: AiProfile, seed: u64) -> Self {
        Self {
            difficulty,
            profile,
            timer: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Difficulty this controller was built from.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Active profile.
    #[must_use]
    pub const fn profile(&self) -> &AiProfile {
        &self.profile
    }

    /// Accumulate `dt` seconds and evaluate once the interval is reached.
    ///
    /// The timer resets to zero after each evaluation.
    pub fn update(&mut self, world: &WorldView<'_>, side: Side, dt: f64) -> Vec<Command> {
        self.timer += dt;
        if self.timer < self.profile.decision_interval_secs {
            return Vec::new();
        }
        self.timer = 0.0;
        self.evaluate(world, side)
    }

    /// Decide this turn's commands for `side`.
    pub fn evaluate(&mut self, world: &WorldView<'_>, side: Side) -> Vec<Command> {
        let mut commands = self.ability_commands(world, side);
        if let Some(dispatch) = self.dispatch_command(world, side) {
            commands.push(dispatch);
        }
        if !commands.is_empty() {
            debug!(side = %side, difficulty = %self.difficulty, ?commands, "AI decision");
        }
        commands
    }

    fn dispatch_command(&mut self, world: &WorldView<'_>, side: Side) -> Option<Command> {
        let owned: Vec<&Planet> = world.planets.iter().filter(|p| p.is_owned_by(side)).collect();

        let source = owned
            .iter()
            .filter(|p| p.units >= self.profile.min_units_to_attack.max(1))
            .max_by(|a, b| a.units.cmp(&b.units).then(b.id.cmp(&a.id)))?;

        let send = ((f64::from(source.units) * self.profile.send_fraction) as u32).clamp(1, source.units);

        let own_inbound = world.inbound_from(side);
        let enemy_inbound = world.inbound_from(side.opponent());
        let speed = world.fleet_speed.to_num::<f64>().max(f64::EPSILON);

        let mut candidates = Vec::new();
        for target in world.planets.iter().filter(|p| !p.is_owned_by(side)) {
            let (sx, sy) = source.position.to_f64();
            let (tx, ty) = target.position.to_f64();
            let travel_secs = (tx - sx).hypot(ty - sy) / speed;

            let defense = estimated_defense(world, target, travel_secs, &own_inbound, &enemy_inbound);
            let noise = self.rng.random_range(-1.0..=1.0) * self.profile.jitter;
            let mut required = if target.owner == Owner::Neutral {
                defense
            } else {
                defense * self.profile.safety_margin
            };
            // Closest-first players misjudge defenses instead of ranking.
            if matches!(self.profile.selection, TargetSelection::Closest) {
                required *= 1.0 + noise.abs() / 10.0;
            }
            if f64::from(send) <= required {
                continue;
            }

            let nearest = owned
                .iter()
                .map(|p| {
                    let (px, py) = p.position.to_f64();
                    (tx - px).hypot(ty - py)
                })
                .fold(f64::INFINITY, f64::min);

            let w = self.profile.weights;
            let mut score = f64::from(target.production_rate) * w.production
                - nearest / 100.0 * w.distance
                - defense / 10.0 * w.defense;
            if target.owner != Owner::Neutral {
                score += w.enemy;
            }
            candidates.push(Candidate {
                target: target.id,
                score: score + noise,
                nearest,
            });
        }

        let chosen = match self.profile.selection {
            TargetSelection::Closest => candidates
                .iter()
                .min_by(|a, b| a.nearest.total_cmp(&b.nearest).then(a.target.cmp(&b.target))),
            TargetSelection::BestScore => candidates
                .iter()
                .max_by(|a, b| a.score.total_cmp(&b.score).then(b.target.cmp(&a.target))),
        }?;

        Some(Command::Dispatch {
            side,
            source: source.id,
            destination: chosen.target,
            units: send,
        })
    }

    fn ability_commands(&mut self, world: &WorldView<'_>, side: Side) -> Vec<Command> {
        let policy = self.profile.abilities;
        let used = world.abilities.side(side);
        let mut commands = Vec::new();

        if let Some(threshold) = policy.surge_min_high_tier {
            let high_tier = world
                .planets
                .iter()
                .filter(|p| p.is_owned_by(side) && p.production_rate >= HIGH_TIER)
                .count();
            if !used.is_used(AbilityKind::Surge) && high_tier >= threshold {
                commands.push(Command::Activate {
                    side,
                    ability: AbilityKind::Surge,
                    target: None,
                });
            }
        }

        if policy.shield && !used.is_used(AbilityKind::Shield) {
            let enemy_inbound = world.inbound_from(side.opponent());
            let threatened = world
                .planets
                .iter()
                .filter(|p| p.is_owned_by(side) && !p.is_shielded())
                .filter_map(|p| {
                    let inbound = enemy_inbound.get(&p.id).copied().unwrap_or(0);
                    (inbound > p.units && inbound > effective_defense(p)).then_some((p, inbound))
                })
                .max_by(|(a, ia), (b, ib)| {
                    (a.production_rate, *ia).cmp(&(b.production_rate, *ib)).then(b.id.cmp(&a.id))
                });
            if let Some((planet, _)) = threatened {
                commands.push(Command::Activate {
                    side,
                    ability: AbilityKind::Shield,
                    target: Some(planet.id),
                });
            }
        }

        if policy.recall && !used.is_used(AbilityKind::Recall) && recall_worthwhile(world, side) {
            commands.push(Command::Activate {
                side,
                ability: AbilityKind::Recall,
                target: None,
            });
        }

        commands
    }
}

/// Defenders expected at `target` when a fleet leaving now arrives.
///
/// Full visibility: counts production during travel on opponent planets,
/// shields still up on arrival, opponent reinforcements in flight and
/// friendly fleets already on the way.
fn estimated_defense(
    world: &WorldView<'_>,
    target: &Planet,
    travel_secs: f64,
    own_inbound: &HashMap<PlanetId, u32>,
    enemy_inbound: &HashMap<PlanetId, u32>,
) -> f64 {
    let mut defense = f64::from(target.units);
    if let Some(owner_side) = target.owner.side() {
        let multiplier = if world.abilities.side(owner_side).surge_active() {
            f64::from(world.surge_multiplier)
        } else {
            1.0
        };
        defense += f64::from(target.production_rate) * travel_secs * multiplier;
        defense += f64::from(enemy_inbound.get(&target.id).copied().unwrap_or(0));
    }
    let shield_left = target.shield_remaining.map_or(0.0, |t| t.to_num::<f64>());
    if shield_left > travel_secs {
        defense = (defense / 2.0).floor();
    }
    defense -= f64::from(own_inbound.get(&target.id).copied().unwrap_or(0));
    defense.max(0.0)
}

/// Whether most of `side`'s attacking strength is flying into fights it
/// cannot win any more.
fn recall_worthwhile(world: &WorldView<'_>, side: Side) -> bool {
    let enemy_inbound = world.inbound_from(side.opponent());
    let no_friendly = HashMap::new();
    let mut committed: HashMap<PlanetId, u32> = HashMap::new();
    for fleet in world.fleets.iter().filter(|f| f.owner == side) {
        *committed.entry(fleet.destination).or_insert(0) += fleet.units;
    }

    let mut total = 0u32;
    let mut doomed = 0u32;
    for fleet in world.fleets.iter().filter(|f| f.owner == side) {
        total += fleet.units;
        let Some(target) = world.planet(fleet.destination) else {
            continue;
        };
        if target.is_owned_by(side) {
            continue;
        }
        let eta = fleet.time_to_arrival(world.fleet_speed).to_num::<f64>().min(1e6);
        let defense = estimated_defense(world, target, eta, &no_friendly, &enemy_inbound);
        let attack = committed.get(&target.id).copied().unwrap_or(0);
        if f64::from(attack) <= defense {
            doomed += fleet.units;
        }
    }
    total >= 10 && doomed * 2 > total
}
