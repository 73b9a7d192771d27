//! Core match loop.
//!
//! [`Match`] owns every planet and fleet. Input adapters and the AI only
//! submit commands; all state changes happen inside [`Match::tick`].
//!
//! # Determinism
//!
//! For a fixed seed, frame-delta sequence and command sequence the match
//! plays out identically on one build:
//! - Simulation quantities are fixed point (via [`Fixed`])
//! - Randomness comes from seeded streams only
//! - Fleets arriving on the same tick resolve in fleet-id order
//!
//! # Example
//!
//! ```
//! use pw_core::config::MatchConfig;
//! use pw_core::entities::Side;
//! use pw_core::simulation::Match;
//!
//! let mut game = Match::new(&MatchConfig::default().with_seed(3)).unwrap();
//! let home = game.home_planet(Side::Player).unwrap();
//! let target = game.planets().iter().find(|p| p.id != home).unwrap().id;
//!
//! game.dispatch_fleet(Side::Player, home, target, 10).unwrap();
//! let events = game.tick(1.0 / 60.0);
//! assert!(!events.is_empty());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::abilities::{apply_recall, apply_shield, tick_shields, AbilityLedger, AbilityStatus};
use crate::ai::{AiController, WorldView};
use crate::combat::{resolve, BattleOutcome};
use crate::commands::{AbilityKind, Command, CommandRejection};
use crate::config::{MatchConfig, Rules};
use crate::entities::{Fleet, FleetId, Owner, Planet, PlanetId, Side};
use crate::error::{GameError, Result};
use crate::events::{MatchEvent, TickEvents};
use crate::invariants::{check_invariants, enforce_invariants, InvariantViolation};
use crate::map_generation::generate_map;
use crate::math::{fixed_from_f64, Fixed};
use crate::scoring::{final_score, ScoreBreakdown, SideStats, TacticalPenalties};

/// Longest frame delta accepted by [`Match::tick`], in seconds.
pub const MAX_FRAME_DELTA_SECS: f64 = 3600.0;

/// Salt mixed into the match seed for the built-in opponent's stream.
const OPPONENT_SEED_SALT: u64 = 0x5eed_a1a1_0000_0001;

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MatchStatus {
    /// In progress.
    #[default]
    Running,
    /// The AI side was eliminated.
    PlayerVictory,
    /// The Player side was eliminated.
    AiVictory,
}

impl MatchStatus {
    /// Whether the match has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Winning side, once terminal.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::Running => None,
            Self::PlayerVictory => Some(Side::Player),
            Self::AiVictory => Some(Side::Ai),
        }
    }
}

/// Whether `side` owns no planets and has no fleets in flight.
#[must_use]
pub fn is_eliminated(planets: &[Planet], fleets: &[Fleet], side: Side) -> bool {
    !planets.iter().any(|p| p.is_owned_by(side)) && !fleets.iter().any(|f| f.owner == side)
}

/// Status implied by ownership. Mutual annihilation counts as a Player
/// victory: the AI is treated as eliminated first.
#[must_use]
pub fn status_from_elimination(planets: &[Planet], fleets: &[Fleet]) -> MatchStatus {
    if is_eliminated(planets, fleets, Side::Ai) {
        MatchStatus::PlayerVictory
    } else if is_eliminated(planets, fleets, Side::Player) {
        MatchStatus::AiVictory
    } else {
        MatchStatus::Running
    }
}

/// Aggregate position of one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Planets owned.
    pub planets: usize,
    /// Units garrisoned on owned planets.
    pub units_on_planets: u64,
    /// Units aboard fleets in flight.
    pub units_in_flight: u64,
    /// Units per second across owned planets, Surge included.
    pub production_per_sec: f64,
}

impl SideSummary {
    /// Garrisons plus fleets.
    #[must_use]
    pub const fn total_units(&self) -> u64 {
        self.units_on_planets + self.units_in_flight
    }
}

/// Read-only copy of the match state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Match time in seconds.
    pub elapsed_secs: f64,
    /// Lifecycle state.
    pub status: MatchStatus,
    /// Planets in generation order.
    pub planets: Vec<Planet>,
    /// Live fleets.
    pub fleets: Vec<Fleet>,
    /// Ability usage and Surge timers.
    pub abilities: AbilityLedger,
    /// Player penalty counters.
    pub penalties: TacticalPenalties,
    /// Player statistics.
    pub player_stats: SideStats,
    /// AI statistics.
    pub ai_stats: SideStats,
    /// Final score once terminal.
    pub score: Option<ScoreBreakdown>,
}

impl MatchSnapshot {
    /// Encode with bincode.
    ///
    /// # Errors
    ///
    /// [`GameError::Snapshot`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode.
    ///
    /// # Errors
    ///
    /// [`GameError::Snapshot`] on malformed input.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }
}

/// A single Player-vs-AI match.
///
/// # Tick Order
///
/// Each tick runs, in order:
/// 1. **Commands** - apply commands queued since the last tick
/// 2. **Production** - owned planets accrue units, doubled under Surge
/// 3. **Timers** - Shield and Surge count down and expire
/// 4. **Fleets** - advance, then resolve arrivals in fleet-id order
/// 5. **Terminal check** - detect elimination
/// 6. **AI** - the built-in opponent may queue commands for the next tick
#[derive(Debug, Clone)]
pub struct Match {
    planets: Vec<Planet>,
    fleets: Vec<Fleet>,
    elapsed: Fixed,
    status: MatchStatus,
    abilities: AbilityLedger,
    penalties: TacticalPenalties,
    stats: [SideStats; 2],
    pending: Vec<Command>,
    next_fleet_id: u64,
    rules: Rules,
    opponent: Option<AiController>,
}

impl Match {
    /// Generate a map and start a match from `config`.
    ///
    /// # Errors
    ///
    /// Map generation or tuning validation errors.
    pub fn new(config: &MatchConfig) -> Result<Self> {
        let rules = config.tuning.to_rules()?;
        let map = generate_map(&config.map)?;
        let opponent = config
            .opponent
            .map(|difficulty| AiController::new(difficulty, config.seed ^ OPPONENT_SEED_SALT));
        info!(
            planets = map.planets.len(),
            opponent = ?config.opponent,
            seed = config.seed,
            "Match started"
        );
        let mut game = Self::from_planets(map.planets, rules)?;
        game.opponent = opponent;
        Ok(game)
    }

    /// Start a match on a hand-built layout with no built-in opponent.
    ///
    /// The match starts Running; elimination is first detected by the first
    /// tick.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidState`] if two planets share an id.
    pub fn from_planets(planets: Vec<Planet>, rules: Rules) -> Result<Self> {
        for (i, planet) in planets.iter().enumerate() {
            if planets[..i].iter().any(|p| p.id == planet.id) {
                return Err(GameError::InvalidState(format!("duplicate planet id {}", planet.id)));
            }
        }
        Ok(Self {
            planets,
            fleets: Vec::new(),
            elapsed: Fixed::ZERO,
            status: MatchStatus::Running,
            abilities: AbilityLedger::new(),
            penalties: TacticalPenalties::default(),
            stats: [SideStats::default(); 2],
            pending: Vec::new(),
            next_fleet_id: 1,
            rules,
            opponent: None,
        })
    }

    /// Attach (or replace) the built-in AI opponent.
    #[must_use]
    pub fn with_opponent(mut self, controller: AiController) -> Self {
        self.opponent = Some(controller);
        self
    }

    /// Remove the built-in opponent so an adapter can drive the AI side.
    #[must_use]
    pub fn without_opponent(mut self) -> Self {
        self.opponent = None;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Planets in generation order.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// Live fleets in launch order.
    #[must_use]
    pub fn fleets(&self) -> &[Fleet] {
        &self.fleets
    }

    /// Look up a planet.
    #[must_use]
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Look up a live fleet.
    #[must_use]
    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.iter().find(|f| f.id == id)
    }

    /// First planet owned by `side`, its home at the start of a match.
    #[must_use]
    pub fn home_planet(&self, side: Side) -> Option<PlanetId> {
        self.planets.iter().find(|p| p.is_owned_by(side)).map(|p| p.id)
    }

    /// Match time.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Match time in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.to_num::<f64>()
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> MatchStatus {
        self.status
    }

    /// Whether the match has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Winning side, once terminal.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        self.status.winner()
    }

    /// Final score, once terminal.
    #[must_use]
    pub fn final_score(&self) -> Option<ScoreBreakdown> {
        final_score(self.status, self.elapsed, &self.penalties)
    }

    /// Player penalty counters.
    #[must_use]
    pub const fn penalties(&self) -> &TacticalPenalties {
        &self.penalties
    }

    /// Running statistics for `side`.
    #[must_use]
    pub const fn stats(&self, side: Side) -> &SideStats {
        &self.stats[side.index()]
    }

    /// Ability usage and Surge timers.
    #[must_use]
    pub const fn abilities(&self) -> &AbilityLedger {
        &self.abilities
    }

    /// Active tuning.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Commands waiting for the next tick.
    #[must_use]
    pub fn pending_commands(&self) -> &[Command] {
        &self.pending
    }

    /// Read-only view for controllers.
    #[must_use]
    pub fn world_view(&self) -> WorldView<'_> {
        WorldView {
            planets: &self.planets,
            fleets: &self.fleets,
            abilities: &self.abilities,
            fleet_speed: self.rules.fleet_speed,
            surge_multiplier: self.rules.surge_multiplier,
        }
    }

    /// Aggregate position of `side`.
    #[must_use]
    pub fn side_summary(&self, side: Side) -> SideSummary {
        let multiplier = self
            .abilities
            .production_multiplier(side, self.rules.surge_multiplier)
            .to_num::<f64>();
        let owned = self.planets.iter().filter(|p| p.is_owned_by(side));
        let (planets, units_on_planets, base_rate) = owned.fold((0, 0u64, 0u64), |(n, units, rate), p| {
            (n + 1, units + u64::from(p.units), rate + u64::from(p.production_rate))
        });
        SideSummary {
            planets,
            units_on_planets,
            units_in_flight: self
                .fleets
                .iter()
                .filter(|f| f.owner == side)
                .map(|f| u64::from(f.units))
                .sum(),
            production_per_sec: base_rate as f64 * multiplier,
        }
    }

    /// Display state of `kind` for `side`.
    #[must_use]
    pub fn ability_status(&self, side: Side, kind: AbilityKind) -> AbilityStatus {
        let abilities = self.abilities.side(side);
        if !abilities.is_used(kind) {
            return AbilityStatus::Ready;
        }
        let remaining = match kind {
            AbilityKind::Recall => None,
            AbilityKind::Surge => abilities.surge_remaining(),
            AbilityKind::Shield => self
                .planets
                .iter()
                .filter(|p| p.is_owned_by(side))
                .find_map(|p| p.shield_remaining),
        };
        match remaining {
            Some(left) if left > Fixed::ZERO => AbilityStatus::Active {
                remaining_secs: left.to_num::<f64>(),
            },
            _ => AbilityStatus::Spent,
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            elapsed_secs: self.elapsed_secs(),
            status: self.status,
            planets: self.planets.clone(),
            fleets: self.fleets.clone(),
            abilities: self.abilities,
            penalties: self.penalties,
            player_stats: self.stats[Side::Player.index()],
            ai_stats: self.stats[Side::Ai.index()],
            score: self.final_score(),
        }
    }

    /// Calculate a hash of the current match state.
    ///
    /// Two matches with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.elapsed.to_bits().hash(&mut hasher);
        self.status.hash(&mut hasher);
        self.planets.hash(&mut hasher);
        self.fleets.hash(&mut hasher);
        self.abilities.hash(&mut hasher);
        self.penalties.hash(&mut hasher);
        self.pending.hash(&mut hasher);
        hasher.finish()
    }

    /// Check invariants without repairing anything.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        check_invariants(&self.planets, &self.fleets, self.status)
    }

    // ========================================================================
    // Command submission
    // ========================================================================

    /// Validate and queue a command for the next tick.
    ///
    /// # Errors
    ///
    /// A [`CommandRejection`] describing why the command cannot apply. The
    /// match is unchanged when a command is rejected.
    pub fn submit(&mut self, command: Command) -> std::result::Result<(), CommandRejection> {
        match command {
            Command::Dispatch {
                side,
                source,
                destination,
                units,
            } => self.dispatch_fleet(side, source, destination, units),
            Command::Activate {
                side,
                ability,
                target,
            } => self.activate_ability(side, ability, target),
        }
    }

    /// Order `units` from `source` to `destination`.
    ///
    /// Units already committed by queued dispatches from the same planet are
    /// not available again.
    ///
    /// # Errors
    ///
    /// [`CommandRejection`] if the match is over, either planet is unknown,
    /// they are the same planet, `side` does not own the source or `units`
    /// is outside `[1, available]`.
    pub fn dispatch_fleet(
        &mut self,
        side: Side,
        source: PlanetId,
        destination: PlanetId,
        units: u32,
    ) -> std::result::Result<(), CommandRejection> {
        if self.status.is_terminal() {
            return Err(CommandRejection::MatchOver);
        }
        let available = self.validate_dispatch(side, source, destination)?;
        let available = available.saturating_sub(self.reserved_units(source));
        if units == 0 || units > available {
            return Err(CommandRejection::InvalidUnitCount {
                requested: units,
                available,
            });
        }
        let command = Command::Dispatch {
            side,
            source,
            destination,
            units,
        };
        debug!(?command, "Dispatch queued");
        self.pending.push(command);
        Ok(())
    }

    /// Use a one-shot ability.
    ///
    /// The ability is claimed immediately, so a second activation by the same
    /// side is rejected rather than queued.
    ///
    /// # Errors
    ///
    /// [`CommandRejection`] if the match is over, a Shield has no target or a
    /// target not owned by `side`, or the ability was already used.
    pub fn activate_ability(
        &mut self,
        side: Side,
        ability: AbilityKind,
        target: Option<PlanetId>,
    ) -> std::result::Result<(), CommandRejection> {
        if self.status.is_terminal() {
            return Err(CommandRejection::MatchOver);
        }
        if ability.needs_target() {
            let id = target.ok_or(CommandRejection::MissingTarget(ability))?;
            let planet = self.planet(id).ok_or(CommandRejection::UnknownPlanet(id))?;
            if !planet.is_owned_by(side) {
                return Err(CommandRejection::ShieldTargetNotOwned(id));
            }
        }
        self.abilities.claim(side, ability)?;
        let command = Command::Activate {
            side,
            ability,
            target: if ability.needs_target() { target } else { None },
        };
        debug!(?command, "Ability queued");
        self.pending.push(command);
        Ok(())
    }

    /// Check ownership and endpoints; returns the source's whole units.
    fn validate_dispatch(
        &self,
        side: Side,
        source: PlanetId,
        destination: PlanetId,
    ) -> std::result::Result<u32, CommandRejection> {
        let from = self.planet(source).ok_or(CommandRejection::UnknownPlanet(source))?;
        if self.planet(destination).is_none() {
            return Err(CommandRejection::UnknownPlanet(destination));
        }
        if source == destination {
            return Err(CommandRejection::SamePlanet(source));
        }
        if !from.is_owned_by(side) {
            return Err(CommandRejection::NotOwner { side, planet: source });
        }
        Ok(from.units)
    }

    fn reserved_units(&self, source: PlanetId) -> u32 {
        self.pending
            .iter()
            .filter_map(|command| match command {
                Command::Dispatch { source: s, units, .. } if *s == source => Some(*units),
                _ => None,
            })
            .fold(0u32, u32::saturating_add)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the match by `dt` seconds.
    ///
    /// Returns the events produced, in order. A terminal match ignores
    /// ticks, and a `dt` that is not a positive finite number up to
    /// [`MAX_FRAME_DELTA_SECS`] is logged and ignored.
    pub fn tick(&mut self, dt: f64) -> TickEvents {
        let mut events = TickEvents::default();
        if self.status.is_terminal() {
            return events;
        }
        let step = fixed_from_f64(dt).filter(|d| *d > Fixed::ZERO && dt <= MAX_FRAME_DELTA_SECS);
        let Some(step) = step else {
            warn!(dt, "Ignoring invalid frame delta");
            return events;
        };

        // 1. Commands
        self.apply_pending(&mut events);

        // 2. Production
        self.elapsed = self.elapsed.saturating_add(step);
        self.run_production(step);

        // 3. Timers
        self.run_timers(step, &mut events);

        // 4. Fleets
        self.run_fleets(step, &mut events);

        // 5. Terminal check
        self.run_terminal_check(&mut events);

        // 6. AI
        if !self.status.is_terminal() {
            self.run_opponent(dt);
        }

        enforce_invariants(&mut self.planets, &mut self.fleets, &mut self.status);
        events
    }

    fn apply_pending(&mut self, events: &mut TickEvents) {
        for command in std::mem::take(&mut self.pending) {
            let applied = match command {
                Command::Dispatch {
                    side,
                    source,
                    destination,
                    units,
                } => self.launch_fleet(side, source, destination, units, events),
                Command::Activate {
                    side,
                    ability,
                    target,
                } => self.apply_ability(side, ability, target, events),
            };
            if let Err(reason) = applied {
                debug!(?command, %reason, "Queued command no longer valid");
                events.push(MatchEvent::CommandRejected { command, reason });
            }
        }
    }

    fn launch_fleet(
        &mut self,
        side: Side,
        source: PlanetId,
        destination: PlanetId,
        units: u32,
        events: &mut TickEvents,
    ) -> std::result::Result<(), CommandRejection> {
        let available = self.validate_dispatch(side, source, destination)?;
        if units == 0 || units > available {
            return Err(CommandRejection::InvalidUnitCount {
                requested: units,
                available,
            });
        }
        let (Some(src), Some(dst)) = (self.planet_index(source), self.planet_index(destination)) else {
            return Err(CommandRejection::UnknownPlanet(source));
        };

        self.planets[src].units -= units;
        let id = FleetId(self.next_fleet_id);
        self.next_fleet_id += 1;
        let fleet = Fleet::launch(id, side, &self.planets[src], &self.planets[dst], units);
        debug!(fleet = %id, callsign = %fleet.callsign(), %side, units, "Fleet launched");
        self.fleets.push(fleet);
        self.stats[side.index()].fleets_launched += 1;
        events.push(MatchEvent::FleetLaunched {
            fleet: id,
            side,
            origin: source,
            destination,
            units,
        });
        Ok(())
    }

    fn apply_ability(
        &mut self,
        side: Side,
        ability: AbilityKind,
        target: Option<PlanetId>,
        events: &mut TickEvents,
    ) -> std::result::Result<(), CommandRejection> {
        match ability {
            AbilityKind::Recall => {
                for (fleet, returning_to) in apply_recall(&mut self.fleets, side) {
                    events.push(MatchEvent::FleetRecalled {
                        fleet,
                        side,
                        returning_to,
                    });
                }
            }
            AbilityKind::Surge => self.abilities.start_surge(side, self.rules.surge_duration),
            AbilityKind::Shield => {
                let applied = target
                    .ok_or(CommandRejection::MissingTarget(ability))
                    .and_then(|id| apply_shield(&mut self.planets, side, id, self.rules.shield_duration));
                if let Err(reason) = applied {
                    self.abilities.release(side, ability);
                    return Err(reason);
                }
            }
        }
        info!(%side, %ability, ?target, "Ability activated");
        events.push(MatchEvent::AbilityActivated {
            side,
            ability,
            target,
        });
        Ok(())
    }

    fn run_production(&mut self, dt: Fixed) {
        for planet in &mut self.planets {
            let Some(side) = planet.owner.side() else {
                continue;
            };
            let multiplier = self
                .abilities
                .production_multiplier(side, self.rules.surge_multiplier);
            let amount = Fixed::from_num(planet.production_rate)
                .saturating_mul(dt)
                .saturating_mul(multiplier);
            let produced = planet.accrue(amount);
            self.stats[side.index()].units_produced += u64::from(produced);
        }
    }

    fn run_timers(&mut self, dt: Fixed, events: &mut TickEvents) {
        for (side, planet) in tick_shields(&mut self.planets, dt) {
            events.push(MatchEvent::AbilityExpired {
                side,
                ability: AbilityKind::Shield,
                planet: Some(planet),
            });
        }
        for side in self.abilities.tick_surges(dt) {
            events.push(MatchEvent::AbilityExpired {
                side,
                ability: AbilityKind::Surge,
                planet: None,
            });
        }
    }

    fn run_fleets(&mut self, dt: Fixed, events: &mut TickEvents) {
        let speed = self.rules.fleet_speed;
        for fleet in &mut self.fleets {
            fleet.advance(dt, speed);
        }
        let (mut arrived, flying): (Vec<Fleet>, Vec<Fleet>) =
            std::mem::take(&mut self.fleets).into_iter().partition(Fleet::has_arrived);
        self.fleets = flying;
        arrived.sort_by_key(|f| f.id);
        for fleet in arrived {
            self.resolve_arrival(&fleet, events);
        }
    }

    fn resolve_arrival(&mut self, fleet: &Fleet, events: &mut TickEvents) {
        let Some(index) = self.planet_index(fleet.destination) else {
            warn!(fleet = %fleet.id, planet = %fleet.destination, "Fleet arrived at unknown planet");
            return;
        };
        let (updated, outcome) = resolve(&self.planets[index], fleet);
        let planet = updated.id;
        let garrison = updated.units;
        let defender = self.planets[index].owner;
        self.planets[index] = updated;

        let side = fleet.owner;
        match outcome {
            BattleOutcome::Reinforced => {
                events.push(MatchEvent::Reinforced {
                    fleet: fleet.id,
                    side,
                    planet,
                    garrison,
                });
            }
            BattleOutcome::Conquered { previous_owner } => {
                let attacker = &mut self.stats[side.index()];
                attacker.battles_won += 1;
                attacker.planets_conquered += 1;
                if let Some(loser) = previous_owner.side() {
                    self.stats[loser.index()].battles_lost += 1;
                }
                if previous_owner == Owner::Player {
                    self.penalties.lost_planets += 1;
                }
                debug!(%side, %planet, %previous_owner, garrison, "Planet conquered");
                events.push(MatchEvent::AttackSucceeded {
                    fleet: fleet.id,
                    side,
                    planet,
                    previous_owner,
                    garrison,
                });
            }
            BattleOutcome::Defended => {
                self.stats[side.index()].battles_lost += 1;
                if let Some(holder) = defender.side() {
                    self.stats[holder.index()].battles_won += 1;
                }
                if side == Side::Player {
                    self.penalties.lost_battles += 1;
                }
                debug!(%side, %planet, %defender, garrison, "Attack repelled");
                events.push(MatchEvent::AttackFailed {
                    fleet: fleet.id,
                    side,
                    planet,
                    defender,
                    garrison,
                });
            }
        }
    }

    fn run_terminal_check(&mut self, events: &mut TickEvents) {
        self.status = status_from_elimination(&self.planets, &self.fleets);
        let elapsed_secs = self.elapsed_secs();
        match self.status {
            MatchStatus::Running => {}
            MatchStatus::PlayerVictory => {
                let score = self.final_score().map_or(0, |s| s.total);
                info!(elapsed_secs, score, "Player victory");
                events.push(MatchEvent::GameVictory { elapsed_secs, score });
            }
            MatchStatus::AiVictory => {
                info!(elapsed_secs, "Player defeated");
                events.push(MatchEvent::GameDefeat { elapsed_secs });
            }
        }
    }

    fn run_opponent(&mut self, dt: f64) {
        let Some(mut controller) = self.opponent.take() else {
            return;
        };
        let commands = controller.update(&self.world_view(), Side::Ai, dt);
        self.opponent = Some(controller);
        for command in commands {
            if let Err(reason) = self.submit(command) {
                debug!(?command, %reason, "AI command rejected");
            }
        }
    }

    fn planet_index(&self, id: PlanetId) -> Option<usize> {
        self.planets.iter().position(|p| p.id == id)
    }
}
