//! Flat-armor combat rules with a guaranteed minimum hit.
//!
//! This module implements the damage side of the simulation:
//! - Attack and defense are scaled by global multipliers
//! - Scaled values are truncated to whole points before subtraction
//! - Defense can never reduce a hit below [`MIN_DAMAGE`]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Minimum damage floor - a hit on a valid target always deals at least 1 damage.
pub const MIN_DAMAGE: u32 = 1;

/// Which roster a combatant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The player party. Victory is measured from this side.
    Player,
    /// The opposing roster.
    Enemy,
}

impl Side {
    /// The side this side attacks.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Enemy => f.write_str("enemy"),
        }
    }
}

/// Global scaling applied to every attack and defense value in an encounter.
///
/// The reference tuning range is 0.5 to 2.0 for both values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    /// Scales the attacker's `attack` stat.
    pub attack: f64,
    /// Scales the target's `defense` stat.
    pub defense: f64,
}

impl Multipliers {
    /// Create new multipliers.
    #[must_use]
    pub const fn new(attack: f64, defense: f64) -> Self {
        Self { attack, defense }
    }

    /// Builder method to set the attack multiplier.
    #[must_use]
    pub const fn with_attack(mut self, attack: f64) -> Self {
        self.attack = attack;
        self
    }

    /// Builder method to set the defense multiplier.
    #[must_use]
    pub const fn with_defense(mut self, defense: f64) -> Self {
        self.defense = defense;
        self
    }

    /// Reject NaN, infinite and negative multipliers.
    pub fn validate(&self) -> Result<()> {
        for (which, value) in [("attack", self.attack), ("defense", self.defense)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidMultiplier { which, value });
            }
        }
        Ok(())
    }
}

impl Default for Multipliers {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Scale a stat and truncate to whole points.
fn scaled(stat: u32, multiplier: f64) -> i64 {
    // Multipliers are validated non-negative, so floor and truncation agree.
    #[allow(clippy::cast_possible_truncation)]
    let value = (f64::from(stat) * multiplier).floor() as i64;
    value
}

/// Calculate the damage of one hit.
///
/// Formula:
/// ```text
/// Attack Value  = floor(attack × attack multiplier)
/// Defense Value = floor(defense × defense multiplier)
/// Final Damage  = max(1, Attack Value - Defense Value)
/// ```
///
/// # Arguments
/// * `attack` - Attacker's attack stat
/// * `defense` - Target's defense stat
/// * `multipliers` - Encounter-wide scaling
///
/// # Returns
/// Final damage to apply (never below [`MIN_DAMAGE`]).
#[must_use]
pub fn calculate_damage(attack: u32, defense: u32, multipliers: Multipliers) -> u32 {
    let raw = scaled(attack, multipliers.attack) - scaled(defense, multipliers.defense);
    u32::try_from(raw.max(i64::from(MIN_DAMAGE))).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Player);
        assert_eq!(Side::Player.to_string(), "player");
    }

    #[test]
    fn test_calculate_damage_plain() {
        // Warrior (atk 10) vs Goblin (def 2)
        assert_eq!(calculate_damage(10, 2, Multipliers::default()), 8);
    }

    #[test]
    fn test_calculate_damage_minimum() {
        // Very low attack against huge defense still deals the floor
        assert_eq!(calculate_damage(1, 100, Multipliers::default()), MIN_DAMAGE);
        assert_eq!(calculate_damage(5, 5, Multipliers::default()), MIN_DAMAGE);
    }

    #[test]
    fn test_calculate_damage_truncates_scaled_values() {
        // floor(5 * 1.5) = 7, floor(5 * 1.0) = 5
        assert_eq!(calculate_damage(5, 5, Multipliers::new(1.5, 1.0)), 2);

        // floor(7 * 0.8) = 5, floor(3 * 1.2) = 3
        assert_eq!(calculate_damage(7, 3, Multipliers::new(0.8, 1.2)), 2);

        // floor(10 * 1.0) = 10, floor(8 * 1.2) = 9
        assert_eq!(calculate_damage(10, 8, Multipliers::new(1.0, 1.2)), 1);
    }

    #[test]
    fn test_multiplier_builders() {
        let m = Multipliers::default().with_attack(1.5).with_defense(0.8);
        assert_eq!(m, Multipliers::new(1.5, 0.8));
    }

    #[test]
    fn test_multiplier_validation() {
        assert!(Multipliers::new(0.5, 2.0).validate().is_ok());
        assert!(Multipliers::new(0.0, 0.0).validate().is_ok());

        let err = Multipliers::new(-1.0, 1.0).validate().unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidMultiplier { which: "attack", .. }
        ));

        let err = Multipliers::new(1.0, f64::NAN).validate().unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidMultiplier {
                which: "defense",
                ..
            }
        ));
    }

    #[test]
    fn test_determinism() {
        let m = Multipliers::new(1.3, 0.7);

        // Same inputs must always produce same outputs
        for _ in 0..100 {
            assert_eq!(calculate_damage(77, 33, m), calculate_damage(77, 33, m));
        }
    }
}
