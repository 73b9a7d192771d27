//! Procedural planet layout.
//!
//! Generates mirrored maps:
//! - Planets are placed on the left half and reflected across the vertical
//!   center line, so every Neutral on one side has a twin on the other
//! - The first left planet is the Player home, its mirror is the AI home
//! - Odd planet counts put one Neutral on the center line
//! - Spacing is relaxed step by step when placement gets crowded, and the
//!   final round accepts any candidate, so generation always finishes

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entities::{Owner, Planet, PlanetId, MAX_PLANET_RADIUS, MIN_PLANET_RADIUS};
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed};

/// Fewest planets a map can have: the two homes.
pub const MIN_PLANET_COUNT: usize = 2;

/// Largest map width or height. Squared distances across the diagonal must
/// stay inside `Fixed`.
pub const MAX_MAP_DIMENSION: u32 = 30_000;

/// Placement attempts per spacing level.
const ATTEMPTS_PER_ROUND: u32 = 250;

/// Spacing relaxations before candidates are accepted unconditionally.
const MAX_RELAXATIONS: u32 = 6;

/// Preset map sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MapSize {
    /// 7 planets.
    Small,
    /// 13 planets.
    #[default]
    Medium,
    /// 19 planets.
    Large,
    /// Explicit planet count.
    Custom(usize),
}

impl MapSize {
    /// Total planets on the map, homes included.
    #[must_use]
    pub const fn planet_count(self) -> usize {
        match self {
            Self::Small => 7,
            Self::Medium => 13,
            Self::Large => 19,
            Self::Custom(count) => count,
        }
    }
}

/// Map configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in world units.
    pub width: u32,
    /// Map height in world units.
    pub height: u32,
    /// How many planets to place.
    pub size: MapSize,
    /// Required gap between planet edges before any relaxation.
    pub min_spacing: u32,
    /// Keep planet centers this far from the map edge.
    pub margin: u32,
    /// Inclusive radius range for every planet.
    pub radius_range: (u32, u32),
    /// Units on each home planet.
    pub home_garrison: u32,
    /// Inclusive garrison range for mirrored Neutral pairs.
    pub neutral_garrison: (u32, u32),
    /// Inclusive garrison range for the center-line Neutral.
    pub center_garrison: (u32, u32),
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            size: MapSize::Medium,
            min_spacing: 180,
            margin: 80,
            radius_range: (MIN_PLANET_RADIUS, MAX_PLANET_RADIUS),
            home_garrison: 50,
            neutral_garrison: (15, 30),
            center_garrison: (20, 35),
            seed: 12345,
        }
    }
}

impl MapConfig {
    /// Create a small map (7 planets).
    #[must_use]
    pub fn small() -> Self {
        Self {
            size: MapSize::Small,
            ..Default::default()
        }
    }

    /// Create a medium map (13 planets).
    #[must_use]
    pub fn medium() -> Self {
        Self {
            size: MapSize::Medium,
            ..Default::default()
        }
    }

    /// Create a large map (19 planets).
    #[must_use]
    pub fn large() -> Self {
        Self {
            size: MapSize::Large,
            ..Default::default()
        }
    }

    /// Set an explicit planet count.
    #[must_use]
    pub fn with_planet_count(mut self, count: usize) -> Self {
        self.size = MapSize::Custom(count);
        self
    }

    /// Set the generation seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        let count = self.size.planet_count();
        if count < MIN_PLANET_COUNT {
            return Err(GameError::InvalidPlanetCount {
                requested: count,
                minimum: MIN_PLANET_COUNT,
            });
        }
        if self.width > MAX_MAP_DIMENSION
            || self.height > MAX_MAP_DIMENSION
            || self.width / 2 <= self.margin.saturating_mul(2)
            || self.height <= self.margin.saturating_mul(2)
        {
            return Err(GameError::InvalidMapDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let ranges = [self.radius_range, self.neutral_garrison, self.center_garrison];
        if let Some((lo, hi)) = ranges.into_iter().find(|(lo, hi)| lo > hi) {
            return Err(GameError::InvalidConfig(format!(
                "range {lo}..={hi} is empty"
            )));
        }
        Ok(())
    }
}

/// A generated map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMap {
    /// Map width in world units.
    pub width: u32,
    /// Map height in world units.
    pub height: u32,
    /// Planets in generation order. Ids equal their index.
    pub planets: Vec<Planet>,
    /// Player home planet.
    pub player_home: PlanetId,
    /// AI home planet.
    pub ai_home: PlanetId,
}

impl GeneratedMap {
    /// Look up a planet by id.
    #[must_use]
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.0 as usize)
    }

    /// X coordinate of the mirror line.
    #[must_use]
    pub fn center_x(&self) -> Fixed {
        Fixed::from_num(self.width) / Fixed::from_num(2)
    }
}

/// Disc already on the map, used for spacing checks.
#[derive(Clone, Copy)]
struct Disc {
    center: Vec2Fixed,
    radius: u32,
}

impl Disc {
    fn clears(self, other: Disc, spacing: Fixed) -> bool {
        let gap = Fixed::from_num(self.radius + other.radius) + spacing;
        self.center.distance_squared(other.center) >= gap.saturating_mul(gap)
    }
}

/// Generate a mirrored planet layout.
///
/// # Errors
///
/// [`GameError::InvalidPlanetCount`] for fewer than two planets,
/// [`GameError::InvalidMapDimensions`] if the margins leave no room or a
/// side exceeds [`MAX_MAP_DIMENSION`], and
/// [`GameError::InvalidConfig`] for an empty radius or garrison range.
///
/// # Example
///
/// ```
/// use pw_core::map_generation::{generate_map, MapConfig};
/// use pw_core::entities::Owner;
///
/// let map = generate_map(&MapConfig::small().with_seed(7)).unwrap();
/// assert_eq!(map.planets.len(), 7);
/// assert_eq!(map.planets.iter().filter(|p| p.owner == Owner::Player).count(), 1);
/// ```
pub fn generate_map(config: &MapConfig) -> Result<GeneratedMap> {
    config.validate()?;

    let total = config.size.planet_count();
    let per_side = total / 2;
    let has_center = total % 2 == 1;
    let center_x = Fixed::from_num(config.width) / Fixed::from_num(2);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut names = NameGenerator::default();
    let mut placed: Vec<Disc> = Vec::with_capacity(total);

    // The center planet goes down first so left-side candidates avoid it.
    let center_disc = has_center.then(|| {
        let disc = Disc {
            center: Vec2Fixed::new(center_x, Fixed::from_num(random_y(&mut rng, config))),
            radius: random_radius(&mut rng, config),
        };
        placed.push(disc);
        disc
    });

    let mut left: Vec<Disc> = Vec::with_capacity(per_side);
    for _ in 0..per_side {
        let disc = place_left_disc(&mut rng, config, center_x, &placed);
        placed.push(disc);
        placed.push(Disc {
            center: disc.center.mirror_x(center_x),
            radius: disc.radius,
        });
        left.push(disc);
    }

    let mut planets = Vec::with_capacity(total);
    let mut next_id = 0u32;
    let mut push = |planets: &mut Vec<Planet>, disc: Disc, owner: Owner, units: u32, name: String| {
        let id = PlanetId(next_id);
        next_id += 1;
        planets.push(Planet::new(id, disc.center, disc.radius, owner, units).with_name(name));
        id
    };

    // Garrisons are rolled per pair so both halves match.
    let garrisons: Vec<u32> = left
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i == 0 {
                config.home_garrison
            } else {
                rng.random_range(config.neutral_garrison.0..=config.neutral_garrison.1)
            }
        })
        .collect();

    let mut player_home = PlanetId(0);
    for (i, disc) in left.iter().enumerate() {
        let owner = if i == 0 { Owner::Player } else { Owner::Neutral };
        let id = push(&mut planets, *disc, owner, garrisons[i], names.next(&mut rng));
        if i == 0 {
            player_home = id;
        }
    }

    let mut ai_home = PlanetId(0);
    for (i, disc) in left.iter().enumerate() {
        let mirrored = Disc {
            center: disc.center.mirror_x(center_x),
            radius: disc.radius,
        };
        let owner = if i == 0 { Owner::Ai } else { Owner::Neutral };
        let id = push(&mut planets, mirrored, owner, garrisons[i], names.next(&mut rng));
        if i == 0 {
            ai_home = id;
        }
    }

    if let Some(disc) = center_disc {
        let units = rng.random_range(config.center_garrison.0..=config.center_garrison.1);
        push(&mut planets, disc, Owner::Neutral, units, names.next(&mut rng));
    }

    info!(
        planets = planets.len(),
        seed = config.seed,
        "Generated {}x{} map",
        config.width,
        config.height
    );

    Ok(GeneratedMap {
        width: config.width,
        height: config.height,
        planets,
        player_home,
        ai_home,
    })
}

fn random_radius(rng: &mut StdRng, config: &MapConfig) -> u32 {
    rng.random_range(config.radius_range.0..=config.radius_range.1)
}

fn random_y(rng: &mut StdRng, config: &MapConfig) -> u32 {
    rng.random_range(config.margin..=config.height - config.margin)
}

/// Find a spot on the left half that clears every placed disc, the mirror
/// line and its own mirror image.
fn place_left_disc(rng: &mut StdRng, config: &MapConfig, center_x: Fixed, placed: &[Disc]) -> Disc {
    let max_x = config.width / 2 - config.margin;
    let mut spacing = Fixed::from_num(config.min_spacing);
    let mut candidate = Disc {
        center: Vec2Fixed::ZERO,
        radius: config.radius_range.0,
    };

    for round in 0..=MAX_RELAXATIONS {
        for _ in 0..ATTEMPTS_PER_ROUND {
            candidate = Disc {
                center: Vec2Fixed::from_ints(
                    rng.random_range(config.margin..=max_x) as i32,
                    random_y(rng, config) as i32,
                ),
                radius: random_radius(rng, config),
            };
            let mirror = Disc {
                center: candidate.center.mirror_x(center_x),
                radius: candidate.radius,
            };
            let clear = candidate.clears(mirror, spacing)
                && placed.iter().all(|disc| candidate.clears(*disc, spacing));
            if clear {
                return candidate;
            }
        }
        debug!(round, spacing = %spacing, "Relaxing planet spacing");
        spacing = spacing * Fixed::from_num(3) / Fixed::from_num(4);
    }

    // Crowded beyond every relaxation: take the last candidate as is.
    debug!("Placing planet without spacing guarantee");
    candidate
}

const NAME_PREFIXES: &[&str] = &[
    "Amber", "Azure", "Crimson", "Distant", "Electric", "Frozen", "Golden", "Hollow", "Iron",
    "Jade", "Lonely", "Molten", "Obsidian", "Pale", "Quiet", "Rusty", "Silver", "Velvet",
];

const NAME_SUFFIXES: &[&str] = &[
    "Anchor", "Beacon", "Cluster", "Drift", "Expanse", "Forge", "Haven", "Harbor", "Nebula",
    "Outpost", "Prime", "Reach", "Rock", "Sphere", "Station", "Verge", "World",
];

const NAME_SPECIALS: &[&str] = &[
    "Abbey Road", "Cassiopeia Gate", "Hotel Andromeda", "Kepler's Rest", "Penny Lane",
    "Strawberry Fields", "Tycho Deep", "Vega Landing",
];

/// Random display names, never repeating within one map.
#[derive(Default)]
struct NameGenerator {
    used: HashSet<String>,
}

impl NameGenerator {
    fn next(&mut self, rng: &mut StdRng) -> String {
        for _ in 0..100 {
            let name = Self::roll(rng);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
        let base = Self::roll(rng);
        let mut suffix = 2u32;
        loop {
            let name = format!("{base} {suffix}");
            if self.used.insert(name.clone()) {
                return name;
            }
            suffix += 1;
        }
    }

    fn roll(rng: &mut StdRng) -> String {
        if rng.random_bool(0.25) {
            NAME_SPECIALS[rng.random_range(0..NAME_SPECIALS.len())].to_string()
        } else {
            let prefix = NAME_PREFIXES[rng.random_range(0..NAME_PREFIXES.len())];
            let suffix = NAME_SUFFIXES[rng.random_range(0..NAME_SUFFIXES.len())];
            format!("{prefix} {suffix}")
        }
    }
}
