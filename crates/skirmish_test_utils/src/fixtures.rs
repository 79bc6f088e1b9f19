//! Test fixtures and helpers.
//!
//! The reference combatants used across unit tests, integration tests and
//! the built-in scenarios, plus a seeded RNG constructor.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::combatant::CombatantTemplate;

/// Build a template without going through validation.
///
/// Useful for constructing deliberately invalid stat blocks.
#[must_use]
pub fn template(name: &str, max_hp: u32, attack: u32, defense: u32, speed: i32) -> CombatantTemplate {
    CombatantTemplate {
        name: name.to_string(),
        max_hp,
        attack,
        defense,
        speed,
    }
}

/// Warrior: 50 HP, 10 ATK, 5 DEF, 10 SPD.
#[must_use]
pub fn warrior() -> CombatantTemplate {
    template("Warrior", 50, 10, 5, 10)
}

/// Mage: 30 HP, 8 ATK, 3 DEF, 12 SPD.
#[must_use]
pub fn mage() -> CombatantTemplate {
    template("Mage", 30, 8, 3, 12)
}

/// Thief: 25 HP, 7 ATK, 2 DEF, 15 SPD.
#[must_use]
pub fn thief() -> CombatantTemplate {
    template("Thief", 25, 7, 2, 15)
}

/// Goblin: 20 HP, 5 ATK, 2 DEF, 8 SPD.
#[must_use]
pub fn goblin() -> CombatantTemplate {
    template("Goblin", 20, 5, 2, 8)
}

/// Dragon: 100 HP, 15 ATK, 8 DEF, 9 SPD.
#[must_use]
pub fn dragon() -> CombatantTemplate {
    template("Dragon", 100, 15, 8, 9)
}

/// Wolf: 30 HP, 8 ATK, 3 DEF, 10 SPD.
#[must_use]
pub fn wolf() -> CombatantTemplate {
    template("Wolf", 30, 8, 3, 10)
}

/// Imp: 15 HP, 4 ATK, 1 DEF, 7 SPD.
#[must_use]
pub fn imp() -> CombatantTemplate {
    template("Imp", 15, 4, 1, 7)
}

/// `count` copies of one template.
#[must_use]
pub fn horde(template: &CombatantTemplate, count: usize) -> Vec<CombatantTemplate> {
    vec![template.clone(); count]
}

/// Seeded RNG matching the one the Monte-Carlo runner uses.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
