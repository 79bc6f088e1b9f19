//! Scenario loading and configuration.
//!
//! A scenario is a named matchup: two rosters, the multipliers to fight
//! under and an optional expected player win-rate range. Scenarios come from
//! the built-in presets or from read-only RON files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::prelude::*;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// No preset with this name.
    #[error("Unknown scenario preset '{0}' (run `skirmish list` to see presets)")]
    UnknownPreset(String),
    /// The scenario's rosters or multipliers were rejected by the simulator.
    #[error("Invalid scenario: {0}")]
    Simulation(#[from] SimError),
}

/// Names of the built-in presets, in report order.
pub const PRESET_NAMES: [&str; 5] = [
    "solo_warrior_vs_goblin",
    "party_vs_mob",
    "boss_fight",
    "underdog_challenge",
    "attrition_test",
];

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Player-side roster.
    pub players: Vec<CombatantTemplate>,
    /// Enemy-side roster.
    pub enemies: Vec<CombatantTemplate>,
    /// Multipliers for every encounter of this scenario.
    #[serde(default)]
    pub multipliers: Multipliers,
    /// Inclusive `(min, max)` player win rate this matchup should land in.
    #[serde(default)]
    pub expected_victory: Option<(f64, f64)>,
}

fn fighter(name: &str, max_hp: u32, attack: u32, defense: u32, speed: i32) -> CombatantTemplate {
    CombatantTemplate {
        name: name.to_string(),
        max_hp,
        attack,
        defense,
        speed,
    }
}

fn warrior() -> CombatantTemplate {
    fighter("Warrior", 50, 10, 5, 10)
}

fn mage() -> CombatantTemplate {
    fighter("Mage", 30, 8, 3, 12)
}

fn goblin() -> CombatantTemplate {
    fighter("Goblin", 20, 5, 2, 8)
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario = Self::from_ron_str(&contents)?;
        tracing::debug!(path = %path.display(), name = %scenario.name, "Loaded scenario");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Look up a built-in preset by key.
    pub fn preset(key: &str) -> Result<Self, ScenarioError> {
        match key {
            "solo_warrior_vs_goblin" => Ok(Self::solo_warrior_vs_goblin()),
            "party_vs_mob" => Ok(Self::party_vs_mob()),
            "boss_fight" => Ok(Self::boss_fight()),
            "underdog_challenge" => Ok(Self::underdog_challenge()),
            "attrition_test" => Ok(Self::attrition_test()),
            other => Err(ScenarioError::UnknownPreset(other.to_string())),
        }
    }

    /// Every preset with its key, in report order.
    #[must_use]
    pub fn presets() -> Vec<(&'static str, Self)> {
        vec![
            (PRESET_NAMES[0], Self::solo_warrior_vs_goblin()),
            (PRESET_NAMES[1], Self::party_vs_mob()),
            (PRESET_NAMES[2], Self::boss_fight()),
            (PRESET_NAMES[3], Self::underdog_challenge()),
            (PRESET_NAMES[4], Self::attrition_test()),
        ]
    }

    /// Resolve a CLI argument: a `.ron` path or an existing file is loaded,
    /// anything else is treated as a preset key.
    pub fn resolve(arg: &str) -> Result<Self, ScenarioError> {
        let path = Path::new(arg);
        let is_file = path.extension().is_some_and(|ext| ext == "ron") || path.is_file();
        if is_file {
            Self::load(path)
        } else {
            Self::preset(arg)
        }
    }

    /// Replace the scenario's multipliers.
    #[must_use]
    pub fn with_multipliers(mut self, multipliers: Multipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    /// Run the Monte-Carlo aggregator on this scenario.
    ///
    /// The scenario's own multipliers override the ones in `config`.
    pub fn simulate(&self, config: &MonteCarloConfig) -> Result<AggregateResult, ScenarioError> {
        let config = config.with_multipliers(self.multipliers);
        Ok(run_monte_carlo(&self.players, &self.enemies, &config)?)
    }

    /// Whether a win rate lies in the expected range, if one is set.
    #[must_use]
    pub fn meets_expectation(&self, win_rate: f64) -> Option<bool> {
        self.expected_victory
            .map(|(min, max)| win_rate >= min && win_rate <= max)
    }

    /// One warrior against one goblin at neutral multipliers.
    #[must_use]
    pub fn solo_warrior_vs_goblin() -> Self {
        Self {
            name: "Solo Warrior vs. Goblin (Balanced)".to_string(),
            description: "Baseline duel at neutral multipliers".to_string(),
            players: vec![warrior()],
            enemies: vec![goblin()],
            multipliers: Multipliers::new(1.0, 1.0),
            expected_victory: Some((0.9, 1.0)),
        }
    }

    /// Warrior and mage against three goblins, attack boosted.
    #[must_use]
    pub fn party_vs_mob() -> Self {
        Self {
            name: "Party vs. Mob (Attacker-Favored)".to_string(),
            description: "Two heroes against a goblin pack with boosted attack".to_string(),
            players: vec![warrior(), mage()],
            enemies: vec![goblin(); 3],
            multipliers: Multipliers::new(1.5, 1.0),
            expected_victory: Some((0.8, 1.0)),
        }
    }

    /// Warrior and mage against a dragon, defense boosted.
    #[must_use]
    pub fn boss_fight() -> Self {
        Self {
            name: "Boss Fight (Defender-Favored)".to_string(),
            description: "Two heroes against a dragon with boosted defense".to_string(),
            players: vec![warrior(), mage()],
            enemies: vec![fighter("Dragon", 100, 15, 8, 9)],
            multipliers: Multipliers::new(1.0, 1.2),
            expected_victory: Some((0.0, 0.3)),
        }
    }

    /// A lone thief against two wolves, attack dampened.
    #[must_use]
    pub fn underdog_challenge() -> Self {
        Self {
            name: "Underdog Challenge (Scaled)".to_string(),
            description: "A lone thief against a wolf pair with dampened attack".to_string(),
            players: vec![fighter("Thief", 25, 7, 2, 15)],
            enemies: vec![fighter("Wolf", 30, 8, 3, 10); 2],
            multipliers: Multipliers::new(0.8, 1.2),
            expected_victory: Some((0.0, 0.1)),
        }
    }

    /// A warrior against five imps, attack boosted and defense dampened.
    #[must_use]
    pub fn attrition_test() -> Self {
        Self {
            name: "Attrition Test (Extreme)".to_string(),
            description: "One warrior wading through a swarm of imps".to_string(),
            players: vec![warrior()],
            enemies: vec![fighter("Imp", 15, 4, 1, 7); 5],
            multipliers: Multipliers::new(1.5, 0.8),
            expected_victory: Some((0.9, 1.0)),
        }
    }
}
