//! One-shot abilities: Recall, Production Surge and Shield.
//!
//! Each side may use each ability once per match. Usage is claimed on the
//! [`AbilityLedger`] when the command is accepted, so a second activation is
//! rejected at submission rather than queued. The effect itself is applied
//! by the match at the start of the next tick using the functions here.

use serde::{Deserialize, Serialize};

use crate::commands::{AbilityKind, CommandRejection};
use crate::entities::{Fleet, FleetId, Planet, PlanetId, Side};
use crate::math::{option_fixed_serde, Fixed};

/// Ability usage and the Surge timer for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideAbilities {
    recall_used: bool,
    surge_used: bool,
    shield_used: bool,
    #[serde(with = "option_fixed_serde")]
    surge_remaining: Option<Fixed>,
}

impl SideAbilities {
    /// Whether `kind` has been claimed.
    #[must_use]
    pub const fn is_used(&self, kind: AbilityKind) -> bool {
        match kind {
            AbilityKind::Recall => self.recall_used,
            AbilityKind::Surge => self.surge_used,
            AbilityKind::Shield => self.shield_used,
        }
    }

    fn mark_used(&mut self, kind: AbilityKind) {
        match kind {
            AbilityKind::Recall => self.recall_used = true,
            AbilityKind::Surge => self.surge_used = true,
            AbilityKind::Shield => self.shield_used = true,
        }
    }

    /// Seconds of Surge left, if it is running.
    #[must_use]
    pub const fn surge_remaining(&self) -> Option<Fixed> {
        self.surge_remaining
    }

    /// Whether Surge is currently doubling production.
    #[must_use]
    pub fn surge_active(&self) -> bool {
        self.surge_remaining.is_some_and(|t| t > Fixed::ZERO)
    }
}

/// Per-side ability capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityLedger {
    player: SideAbilities,
    ai: SideAbilities,
}

impl AbilityLedger {
    /// Create a ledger with every ability ready.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for one side.
    #[must_use]
    pub const fn side(&self, side: Side) -> &SideAbilities {
        match side {
            Side::Player => &self.player,
            Side::Ai => &self.ai,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideAbilities {
        match side {
            Side::Player => &mut self.player,
            Side::Ai => &mut self.ai,
        }
    }

    /// Check and claim `kind` for `side` in one step.
    ///
    /// # Errors
    ///
    /// [`CommandRejection::AlreadyUsed`] if the side has used it before.
    pub fn claim(&mut self, side: Side, kind: AbilityKind) -> Result<(), CommandRejection> {
        let abilities = self.side_mut(side);
        if abilities.is_used(kind) {
            return Err(CommandRejection::AlreadyUsed {
                side,
                ability: kind,
            });
        }
        abilities.mark_used(kind);
        Ok(())
    }

    /// Return a claim whose command could not be applied.
    pub(crate) fn release(&mut self, side: Side, kind: AbilityKind) {
        let abilities = self.side_mut(side);
        match kind {
            AbilityKind::Recall => abilities.recall_used = false,
            AbilityKind::Surge => abilities.surge_used = false,
            AbilityKind::Shield => abilities.shield_used = false,
        }
    }

    /// Start (or restart) the Surge timer for `side`.
    pub fn start_surge(&mut self, side: Side, duration: Fixed) {
        self.side_mut(side).surge_remaining = Some(duration);
    }

    /// Production multiplier for planets owned by `side`.
    #[must_use]
    pub fn production_multiplier(&self, side: Side, surge_multiplier: u32) -> Fixed {
        if self.side(side).surge_active() {
            Fixed::from_num(surge_multiplier)
        } else {
            Fixed::from_num(1)
        }
    }

    /// Count Surge timers down by `dt`. Returns the sides whose Surge ended.
    pub fn tick_surges(&mut self, dt: Fixed) -> Vec<Side> {
        let mut expired = Vec::new();
        for side in Side::ALL {
            let abilities = self.side_mut(side);
            if let Some(remaining) = abilities.surge_remaining {
                let left = remaining - dt;
                if left <= Fixed::ZERO {
                    abilities.surge_remaining = None;
                    expired.push(side);
                } else {
                    abilities.surge_remaining = Some(left);
                }
            }
        }
        expired
    }
}

/// Display state of one ability for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityStatus {
    /// Not used yet.
    Ready,
    /// Used and still in effect.
    Active {
        /// Seconds left.
        remaining_secs: f64,
    },
    /// Used and finished, or instantaneous.
    Spent,
}

/// Reverse every live fleet of `side`.
///
/// Returns `(fleet, planet it now returns to)` for each recalled fleet.
pub fn apply_recall(fleets: &mut [Fleet], side: Side) -> Vec<(FleetId, PlanetId)> {
    fleets
        .iter_mut()
        .filter(|fleet| fleet.owner == side)
        .map(|fleet| {
            fleet.reverse();
            (fleet.id, fleet.destination)
        })
        .collect()
}

/// Raise a shield on `target` for `duration` seconds.
///
/// Only one planet per side can be shielded: any other shield held by the
/// same side is dropped. Returns the planet that lost its shield, if any.
///
/// # Errors
///
/// [`CommandRejection::UnknownPlanet`] or
/// [`CommandRejection::ShieldTargetNotOwned`] if the target is not a planet
/// owned by `side`.
pub fn apply_shield(
    planets: &mut [Planet],
    side: Side,
    target: PlanetId,
    duration: Fixed,
) -> Result<Option<PlanetId>, CommandRejection> {
    let target_planet = planets
        .iter()
        .find(|p| p.id == target)
        .ok_or(CommandRejection::UnknownPlanet(target))?;
    if !target_planet.is_owned_by(side) {
        return Err(CommandRejection::ShieldTargetNotOwned(target));
    }

    let mut replaced = None;
    for planet in planets.iter_mut() {
        if planet.id == target {
            planet.shield_remaining = Some(duration);
        } else if planet.is_owned_by(side) && planet.shield_remaining.is_some() {
            planet.shield_remaining = None;
            replaced = Some(planet.id);
        }
    }
    Ok(replaced)
}

/// Count shield timers down by `dt`.
///
/// Returns `(owning side, planet)` for each shield that ran out.
pub fn tick_shields(planets: &mut [Planet], dt: Fixed) -> Vec<(Side, PlanetId)> {
    let mut expired = Vec::new();
    for planet in planets.iter_mut() {
        let Some(remaining) = planet.shield_remaining else {
            continue;
        };
        let left = remaining - dt;
        if left <= Fixed::ZERO {
            planet.shield_remaining = None;
            if let Some(side) = planet.owner.side() {
                expired.push((side, planet.id));
            }
        } else {
            planet.shield_remaining = Some(left);
        }
    }
    expired
}
