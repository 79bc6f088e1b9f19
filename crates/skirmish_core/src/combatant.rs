//! Combatant templates and per-encounter combatant state.
//!
//! A [`CombatantTemplate`] is the immutable roster entry supplied by the
//! caller. Every encounter spawns fresh [`Combatant`] instances from the
//! templates, so HP changes never leak between runs.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{calculate_damage, Multipliers, Side};
use crate::error::{Result, SimError};

/// Immutable stat block for one fighter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantTemplate {
    /// Display name (not required to be unique).
    pub name: String,
    /// Maximum and starting hit points. Must be positive.
    pub max_hp: u32,
    /// Attack stat. Must be positive.
    pub attack: u32,
    /// Defense stat subtracted from incoming hits.
    pub defense: u32,
    /// Turn order priority; higher acts first.
    pub speed: i32,
}

impl CombatantTemplate {
    /// Create a validated template.
    pub fn new(
        name: impl Into<String>,
        max_hp: u32,
        attack: u32,
        defense: u32,
        speed: i32,
    ) -> Result<Self> {
        let template = Self {
            name: name.into(),
            max_hp,
            attack,
            defense,
            speed,
        };
        template.validate()?;
        Ok(template)
    }

    /// Check the positive-stat requirements.
    ///
    /// Templates built through serde skip [`CombatantTemplate::new`], so the
    /// simulator re-checks every template before an encounter starts.
    pub fn validate(&self) -> Result<()> {
        if self.max_hp == 0 {
            return Err(SimError::InvalidStat {
                combatant: self.name.clone(),
                stat: "max_hp",
            });
        }
        if self.attack == 0 {
            return Err(SimError::InvalidStat {
                combatant: self.name.clone(),
                stat: "attack",
            });
        }
        Ok(())
    }

    /// Build a fresh, full-HP combatant for one encounter.
    #[must_use]
    pub fn spawn(&self, side: Side, slot: usize) -> Combatant {
        Combatant {
            id: CombatantId { side, slot },
            name: self.name.clone(),
            max_hp: self.max_hp,
            current_hp: self.max_hp,
            attack: self.attack,
            defense: self.defense,
            speed: self.speed,
        }
    }
}

/// Stable identity of a combatant within one encounter.
///
/// `slot` is the combatant's position in the original roster and does not
/// change when dead combatants are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId {
    /// Side the combatant fights for.
    pub side: Side,
    /// Index in the original roster.
    pub slot: usize,
}

/// A fighter's mutable state during one encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    max_hp: u32,
    current_hp: u32,
    attack: u32,
    defense: u32,
    speed: i32,
}

impl Combatant {
    /// Stable identity within the encounter.
    #[must_use]
    pub fn id(&self) -> CombatantId {
        self.id
    }

    /// Side this combatant fights for.
    #[must_use]
    pub fn side(&self) -> Side {
        self.id.side
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum hit points.
    #[must_use]
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Current hit points, always in `0..=max_hp`.
    #[must_use]
    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    /// Attack stat.
    #[must_use]
    pub fn attack(&self) -> u32 {
        self.attack
    }

    /// Defense stat.
    #[must_use]
    pub fn defense(&self) -> u32 {
        self.defense
    }

    /// Speed stat.
    #[must_use]
    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// A combatant is alive while it has HP left. Death is permanent.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Current HP as a fraction of max HP (0.0 to 1.0).
    #[must_use]
    pub fn hp_ratio(&self) -> f64 {
        f64::from(self.current_hp) / f64::from(self.max_hp)
    }

    /// Apply damage, clamping HP at zero. Returns the HP actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current_hp);
        self.current_hp -= applied;
        applied
    }

    /// Attack one target chosen uniformly at random from `target_pool`.
    ///
    /// Returns the damage dealt, or 0 when this combatant is dead or the pool
    /// is empty. The reported damage is the formula value even when it
    /// exceeds the target's remaining HP.
    pub fn act<R: Rng + ?Sized>(
        &self,
        target_pool: &mut [&mut Combatant],
        multipliers: Multipliers,
        rng: &mut R,
    ) -> u32 {
        self.act_on(target_pool, multipliers, rng)
            .map_or(0, |(_, damage)| damage)
    }

    /// Like [`Combatant::act`], but also reports which target was hit.
    pub(crate) fn act_on<R: Rng + ?Sized>(
        &self,
        target_pool: &mut [&mut Combatant],
        multipliers: Multipliers,
        rng: &mut R,
    ) -> Option<(CombatantId, u32)> {
        if !self.is_alive() {
            return None;
        }
        let target = target_pool.choose_mut(rng)?;
        let damage = calculate_damage(self.attack, target.defense, multipliers);
        target.take_damage(damage);
        Some((target.id, damage))
    }
}
