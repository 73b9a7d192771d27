//! Planet and fleet records.
//!
//! These are pure data with small derived-state helpers. All mutation of the
//! authoritative collections happens inside [`Match::tick`](crate::simulation::Match::tick).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, option_fixed_serde, Fixed, Vec2Fixed};

/// Smallest planet radius the production curve is defined for.
pub const MIN_PLANET_RADIUS: u32 = 20;

/// Largest planet radius the production curve is defined for.
pub const MAX_PLANET_RADIUS: u32 = 70;

/// Lowest production tier (units per second).
pub const MIN_PRODUCTION_RATE: u32 = 1;

/// Highest production tier (units per second).
pub const MAX_PRODUCTION_RATE: u32 = 4;

/// Stable planet identifier, assigned in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanetId(pub u32);

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Fleet identifier, unique within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FleetId(pub u64);

impl fmt::Display for FleetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// One of the two competing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The human player.
    Player,
    /// The computer opponent.
    Ai,
}

impl Side {
    /// Both sides, player first.
    pub const ALL: [Side; 2] = [Side::Player, Side::Ai];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Ai,
            Self::Ai => Self::Player,
        }
    }

    /// The planet owner value for this side.
    #[must_use]
    pub const fn owner(self) -> Owner {
        match self {
            Self::Player => Owner::Player,
            Self::Ai => Owner::Ai,
        }
    }

    /// Index into per-side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Ai => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("Player"),
            Self::Ai => f.write_str("AI"),
        }
    }
}

/// Planet ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Owner {
    /// Owned by the human player.
    Player,
    /// Owned by the computer opponent.
    Ai,
    /// Unclaimed. Neutral planets never produce and never launch fleets.
    #[default]
    Neutral,
}

impl Owner {
    /// The side this owner belongs to, if any.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::Player => Some(Side::Player),
            Self::Ai => Some(Side::Ai),
            Self::Neutral => None,
        }
    }

    /// Whether this owner is the given side.
    #[must_use]
    pub fn is(self, side: Side) -> bool {
        self == side.owner()
    }
}

impl From<Side> for Owner {
    fn from(side: Side) -> Self {
        side.owner()
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("Player"),
            Self::Ai => f.write_str("AI"),
            Self::Neutral => f.write_str("Neutral"),
        }
    }
}

/// Production tier for a planet radius.
///
/// Linear from 1 unit/s at radius 20 to 4 units/s at radius 70, rounded to
/// the nearest whole tier and clamped outside that range.
#[must_use]
pub fn production_rate_for_radius(radius: u32) -> u32 {
    let clamped = radius.clamp(MIN_PLANET_RADIUS, MAX_PLANET_RADIUS);
    let span = MAX_PLANET_RADIUS - MIN_PLANET_RADIUS;
    let tiers = MAX_PRODUCTION_RATE - MIN_PRODUCTION_RATE;
    // round(min + (r - min_r) * tiers / span) in integer math
    let scaled = (clamped - MIN_PLANET_RADIUS) * tiers * 2 + span;
    MIN_PRODUCTION_RATE + scaled / (span * 2)
}

/// A planet on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planet {
    /// Stable identifier.
    pub id: PlanetId,
    /// Display name.
    pub name: String,
    /// Center in world coordinates.
    pub position: Vec2Fixed,
    /// Radius in world units; determines the production tier.
    pub radius: u32,
    /// Current owner.
    pub owner: Owner,
    /// Whole units garrisoned here. Only whole units fight or launch.
    pub units: u32,
    /// Fractional production carried between ticks, always in `[0, 1)`.
    #[serde(with = "fixed_serde")]
    pub production_progress: Fixed,
    /// Units produced per second while owned.
    pub production_rate: u32,
    /// Seconds of shield left, if a shield is up.
    #[serde(with = "option_fixed_serde")]
    pub shield_remaining: Option<Fixed>,
}

impl Planet {
    /// Create a planet. The production rate is derived from the radius.
    #[must_use]
    pub fn new(id: PlanetId, position: Vec2Fixed, radius: u32, owner: Owner, units: u32) -> Self {
        Self {
            id,
            name: id.to_string(),
            position,
            radius,
            owner,
            units,
            production_progress: Fixed::ZERO,
            production_rate: production_rate_for_radius(radius),
            shield_remaining: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether a shield currently protects this planet.
    #[must_use]
    pub fn is_shielded(&self) -> bool {
        self.shield_remaining.is_some_and(|t| t > Fixed::ZERO)
    }

    /// Whether this planet is owned by `side`.
    #[must_use]
    pub fn is_owned_by(&self, side: Side) -> bool {
        self.owner.is(side)
    }

    /// Units including the fractional production remainder.
    #[must_use]
    pub fn exact_units(&self) -> Fixed {
        Fixed::from_num(self.units) + self.production_progress
    }

    /// Add produced units, carrying the fractional part.
    ///
    /// Returns how many whole units were completed.
    pub fn accrue(&mut self, amount: Fixed) -> u32 {
        if amount <= Fixed::ZERO {
            return 0;
        }
        let total = self.production_progress.saturating_add(amount);
        let whole = total.floor();
        self.production_progress = total - whole;
        let produced = whole.to_num::<u32>();
        self.units = self.units.saturating_add(produced);
        produced
    }

    /// Whether a world point lies on the planet disc.
    #[must_use]
    pub fn contains_point(&self, point: Vec2Fixed) -> bool {
        let r = Fixed::from_num(self.radius);
        self.position.distance_squared(point) <= r * r
    }
}

const CALLSIGNS: [&str; 24] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega",
];

/// A fleet in flight between two planets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fleet {
    /// Unique identifier.
    pub id: FleetId,
    /// Side that launched the fleet.
    pub owner: Side,
    /// Planet the fleet is travelling from.
    pub origin: PlanetId,
    /// Planet the fleet will resolve against on arrival.
    pub destination: PlanetId,
    /// Units aboard, fixed at launch and always at least 1.
    pub units: u32,
    /// Travel completion in `[0, 1]`.
    #[serde(with = "fixed_serde")]
    progress: Fixed,
    /// Cached origin coordinates.
    origin_position: Vec2Fixed,
    /// Cached destination coordinates.
    destination_position: Vec2Fixed,
    /// Cached origin-to-destination distance.
    #[serde(with = "fixed_serde")]
    distance: Fixed,
    /// Whether a Recall turned this fleet around.
    recalled: bool,
}

impl Fleet {
    /// Launch a fleet from `origin` toward `destination`.
    #[must_use]
    pub fn launch(id: FleetId, owner: Side, origin: &Planet, destination: &Planet, units: u32) -> Self {
        Self {
            id,
            owner,
            origin: origin.id,
            destination: destination.id,
            units,
            progress: Fixed::ZERO,
            origin_position: origin.position,
            destination_position: destination.position,
            distance: origin.position.distance(destination.position),
            recalled: false,
        }
    }

    /// Travel completion in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> Fixed {
        self.progress
    }

    /// Total path length in world units.
    #[must_use]
    pub const fn distance(&self) -> Fixed {
        self.distance
    }

    /// Whether this fleet has been recalled.
    #[must_use]
    pub const fn is_recalled(&self) -> bool {
        self.recalled
    }

    /// Coordinates of the planet the fleet is currently heading from.
    #[must_use]
    pub const fn origin_position(&self) -> Vec2Fixed {
        self.origin_position
    }

    /// Coordinates of the planet the fleet is currently heading to.
    #[must_use]
    pub const fn destination_position(&self) -> Vec2Fixed {
        self.destination_position
    }

    /// Interpolated position along the path.
    #[must_use]
    pub fn position(&self) -> Vec2Fixed {
        self.origin_position
            .lerp(self.destination_position, self.progress)
    }

    /// Whether the fleet has reached its destination.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.progress >= Fixed::from_num(1)
    }

    /// Move the fleet forward by `dt` seconds at `speed` world units/second.
    ///
    /// Returns `true` once the fleet has arrived. Progress never exceeds 1.
    pub fn advance(&mut self, dt: Fixed, speed: Fixed) -> bool {
        let one = Fixed::from_num(1);
        if self.distance <= Fixed::from_num(0.001) {
            self.progress = one;
            return true;
        }
        let step = dt.saturating_mul(speed) / self.distance;
        self.progress = self.progress.saturating_add(step).min(one);
        self.has_arrived()
    }

    /// Seconds until arrival at `speed`.
    #[must_use]
    pub fn time_to_arrival(&self, speed: Fixed) -> Fixed {
        if speed <= Fixed::ZERO {
            return Fixed::MAX;
        }
        let remaining = Fixed::from_num(1) - self.progress;
        remaining.saturating_mul(self.distance) / speed
    }

    /// Turn around toward the origin planet from the current position.
    ///
    /// Origin and destination swap and progress is re-based so the fleet
    /// covers exactly the distance it has already flown.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
        std::mem::swap(&mut self.origin_position, &mut self.destination_position);
        self.progress = Fixed::from_num(1) - self.progress;
        self.recalled = true;
    }

    /// Clamp progress into `[0, 1]`. Returns `true` if a clamp was needed.
    pub(crate) fn clamp_progress(&mut self) -> bool {
        let one = Fixed::from_num(1);
        let clamped = self.progress.clamp(Fixed::ZERO, one);
        let changed = clamped != self.progress;
        self.progress = clamped;
        changed
    }

    #[cfg(test)]
    pub(crate) fn set_progress(&mut self, progress: Fixed) {
        self.progress = progress;
    }

    /// Greek-letter callsign, e.g. "Gamma" or "Alpha-2" once the list wraps.
    #[must_use]
    pub fn callsign(&self) -> String {
        let index = self.id.0.saturating_sub(1);
        let name = CALLSIGNS[(index % CALLSIGNS.len() as u64) as usize];
        let cycle = index / CALLSIGNS.len() as u64;
        if cycle == 0 {
            name.to_string()
        } else {
            format!("{name}-{}", cycle + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet_at(id: u32, x: i32, y: i32) -> Planet {
        Planet::new(PlanetId(id), Vec2Fixed::from_ints(x, y), 30, Owner::Player, 10)
    }

    #[test]
    fn test_production_tiers() {
        assert_eq!(production_rate_for_radius(20), 1);
        assert_eq!(production_rate_for_radius(30), 2); // 1.6 rounds up
        assert_eq!(production_rate_for_radius(45), 3); // 2.5 rounds up
        assert_eq!(production_rate_for_radius(55), 3); // 3.1
        assert_eq!(production_rate_for_radius(70), 4);
        assert_eq!(production_rate_for_radius(5), 1);
        assert_eq!(production_rate_for_radius(500), 4);
    }

    #[test]
    fn test_accrue_carries_fraction() {
        let mut planet = planet_at(0, 0, 0);
        let third = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(planet.accrue(third), 0);
        assert_eq!(planet.accrue(third), 0);
        assert_eq!(planet.units, 10);
        // Three thirds land a hair under 1 in fixed point, a fourth pushes it over.
        planet.accrue(third);
        planet.accrue(third);
        assert_eq!(planet.units, 11);
        assert!(planet.production_progress < Fixed::from_num(1));
    }

    #[test]
    fn test_accrue_ignores_non_positive() {
        let mut planet = planet_at(0, 0, 0);
        assert_eq!(planet.accrue(Fixed::from_num(-2)), 0);
        assert_eq!(planet.units, 10);
    }

    #[test]
    fn test_fleet_advance_and_arrival() {
        let a = planet_at(0, 0, 0);
        let b = planet_at(1, 200, 0);
        let mut fleet = Fleet::launch(FleetId(1), Side::Player, &a, &b, 5);

        assert!(!fleet.advance(Fixed::from_num(0.5), Fixed::from_num(200)));
        assert!((fleet.progress() - Fixed::from_num(0.5)).abs() < Fixed::from_num(0.001));
        assert!(fleet.advance(Fixed::from_num(0.6), Fixed::from_num(200)));
        assert_eq!(fleet.progress(), Fixed::from_num(1));
    }

    #[test]
    fn test_fleet_reverse_keeps_position() {
        let a = planet_at(0, 0, 0);
        let b = planet_at(1, 100, 0);
        let mut fleet = Fleet::launch(FleetId(1), Side::Ai, &a, &b, 5);
        fleet.set_progress(Fixed::from_num(0.75));
        let before = fleet.position();

        fleet.reverse();

        assert_eq!(fleet.origin, PlanetId(1));
        assert_eq!(fleet.destination, PlanetId(0));
        assert_eq!(fleet.progress(), Fixed::from_num(0.25));
        assert_eq!(fleet.position(), before);
        assert!(fleet.is_recalled());
    }

    #[test]
    fn test_callsigns_wrap() {
        let a = planet_at(0, 0, 0);
        let b = planet_at(1, 10, 0);
        let first = Fleet::launch(FleetId(1), Side::Player, &a, &b, 1);
        let third = Fleet::launch(FleetId(3), Side::Player, &a, &b, 1);
        let wrapped = Fleet::launch(FleetId(25), Side::Player, &a, &b, 1);
        assert_eq!(first.callsign(), "Alpha");
        assert_eq!(third.callsign(), "Gamma");
        assert_eq!(wrapped.callsign(), "Alpha-2");
    }

    #[test]
    fn test_side_owner_mapping() {
        assert_eq!(Side::Player.owner(), Owner::Player);
        assert_eq!(Owner::Ai.side(), Some(Side::Ai));
        assert_eq!(Owner::Neutral.side(), None);
        assert_eq!(Side::Player.opponent(), Side::Ai);
    }
}
