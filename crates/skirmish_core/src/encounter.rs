//! Single encounter loop.
//!
//! An [`Encounter`] spawns fresh combatants from two rosters of templates and
//! resolves rounds until one side has no living members.
//!
//! # Termination
//!
//! While both sides are alive, the first combatant in turn order always has a
//! target and every hit deals at least [`MIN_DAMAGE`](crate::combat::MIN_DAMAGE).
//! Each round therefore removes at least one HP from the field, so an
//! encounter never lasts longer than the combined max HP of both rosters.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use skirmish_core::prelude::*;
//!
//! let players = vec![CombatantTemplate::new("Warrior", 50, 10, 5, 10).unwrap()];
//! let enemies = vec![CombatantTemplate::new("Goblin", 20, 5, 2, 8).unwrap()];
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let result = simulate_encounter(&players, &enemies, Multipliers::default(), &mut rng).unwrap();
//! assert!(result.victory);
//! assert_eq!(result.rounds, 3);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{Multipliers, Side};
use crate::combatant::{Combatant, CombatantTemplate};
use crate::error::{Result, SimError};
use crate::metrics::EngagementMetrics;
use crate::round::{resolve_round, TurnEvent};

/// Check both rosters before any simulation work.
pub fn validate_rosters(
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
) -> Result<()> {
    if players.is_empty() {
        return Err(SimError::InvalidRoster { side: Side::Player });
    }
    if enemies.is_empty() {
        return Err(SimError::InvalidRoster { side: Side::Enemy });
    }
    players.iter().chain(enemies).try_for_each(CombatantTemplate::validate)
}

fn spawn_roster(templates: &[CombatantTemplate], side: Side) -> Vec<Combatant> {
    templates
        .iter()
        .enumerate()
        .map(|(slot, template)| template.spawn(side, slot))
        .collect()
}

/// A single combat in progress.
#[derive(Debug, Clone)]
pub struct Encounter {
    players: Vec<Combatant>,
    enemies: Vec<Combatant>,
    multipliers: Multipliers,
    rounds: u32,
    damage_by_players: u64,
    damage_by_enemies: u64,
    history: Vec<TurnEvent>,
}

impl Encounter {
    /// Spawn fresh combatants from the templates.
    ///
    /// Fails with [`SimError::InvalidRoster`] if either side is empty, and
    /// with [`SimError::InvalidStat`] or [`SimError::InvalidMultiplier`] for
    /// bad stats.
    pub fn new(
        players: &[CombatantTemplate],
        enemies: &[CombatantTemplate],
        multipliers: Multipliers,
    ) -> Result<Self> {
        validate_rosters(players, enemies)?;
        multipliers.validate()?;

        Ok(Self {
            players: spawn_roster(players, Side::Player),
            enemies: spawn_roster(enemies, Side::Enemy),
            multipliers,
            rounds: 0,
            damage_by_players: 0,
            damage_by_enemies: 0,
            history: Vec::new(),
        })
    }

    /// Living player-side combatants.
    #[must_use]
    pub fn players(&self) -> &[Combatant] {
        &self.players
    }

    /// Living enemy-side combatants.
    #[must_use]
    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    /// Rounds resolved so far.
    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Turn events recorded so far.
    #[must_use]
    pub fn history(&self) -> &[TurnEvent] {
        &self.history
    }

    /// True once either side has been wiped out.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.players.is_empty() || self.enemies.is_empty()
    }

    /// Resolve one round. Returns the new events, or `None` if the encounter
    /// was already over.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&[TurnEvent]> {
        if self.is_over() {
            return None;
        }

        self.rounds += 1;
        let events = resolve_round(&mut self.players, &mut self.enemies, self.multipliers, rng);
        for event in &events {
            match event.side() {
                Side::Player => self.damage_by_players += u64::from(event.damage),
                Side::Enemy => self.damage_by_enemies += u64::from(event.damage),
            }
        }

        tracing::trace!(
            round = self.rounds,
            turns = events.len(),
            players_alive = self.players.len(),
            enemies_alive = self.enemies.len(),
            "Round resolved"
        );

        let start = self.history.len();
        self.history.extend(events);
        Some(&self.history[start..])
    }

    /// Resolve rounds until one side is eliminated.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> EncounterLog {
        while self.step(rng).is_some() {}

        EncounterLog {
            victory: !self.players.is_empty(),
            rounds: self.rounds,
            damage_by_players: self.damage_by_players,
            damage_by_enemies: self.damage_by_enemies,
            history: self.history,
            surviving_players: self.players,
            surviving_enemies: self.enemies,
        }
    }
}

/// Raw record of a finished encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterLog {
    /// True iff the player side has at least one survivor.
    pub victory: bool,
    /// Rounds resolved.
    pub rounds: u32,
    /// Total damage dealt by the player side.
    pub damage_by_players: u64,
    /// Total damage dealt by the enemy side.
    pub damage_by_enemies: u64,
    /// Every turn event in resolution order.
    pub history: Vec<TurnEvent>,
    /// Player combatants alive at the end.
    pub surviving_players: Vec<Combatant>,
    /// Enemy combatants alive at the end.
    pub surviving_enemies: Vec<Combatant>,
}

impl EncounterLog {
    /// Reduce the log to its summary statistics.
    #[must_use]
    pub fn to_result(&self) -> EncounterResult {
        EncounterResult {
            victory: self.victory,
            rounds: self.rounds,
            turns: u32::try_from(self.history.len()).unwrap_or(u32::MAX),
            damage_by_players: self.damage_by_players,
            damage_by_enemies: self.damage_by_enemies,
            metrics: EngagementMetrics::from_history(
                &self.history,
                self.surviving_players.len(),
                self.damage_by_players,
                self.damage_by_enemies,
            ),
        }
    }
}

/// Summary of one encounter, as consumed by the Monte-Carlo aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncounterResult {
    /// True iff the player side won.
    pub victory: bool,
    /// Rounds resolved.
    pub rounds: u32,
    /// Turns that produced an event.
    pub turns: u32,
    /// Total damage dealt by the player side.
    pub damage_by_players: u64,
    /// Total damage dealt by the enemy side.
    pub damage_by_enemies: u64,
    /// Derived engagement metrics.
    pub metrics: EngagementMetrics,
}

/// Run one encounter from templates and summarise it.
pub fn simulate_encounter<R: Rng + ?Sized>(
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
    multipliers: Multipliers,
    rng: &mut R,
) -> Result<EncounterResult> {
    let log = Encounter::new(players, enemies, multipliers)?.run(rng);
    tracing::trace!(
        victory = log.victory,
        rounds = log.rounds,
        turns = log.history.len(),
        "Encounter finished"
    );
    Ok(log.to_result())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn warrior() -> CombatantTemplate {
        CombatantTemplate::new("Warrior", 50, 10, 5, 10).unwrap()
    }

    fn goblin() -> CombatantTemplate {
        CombatantTemplate::new("Goblin", 20, 5, 2, 8).unwrap()
    }

    #[test]
    fn test_empty_rosters_rejected() {
        let err = Encounter::new(&[], &[goblin()], Multipliers::default()).unwrap_err();
        assert_eq!(err, SimError::InvalidRoster { side: Side::Player });

        let err = Encounter::new(&[warrior()], &[], Multipliers::default()).unwrap_err();
        assert_eq!(err, SimError::InvalidRoster { side: Side::Enemy });
    }

    #[test]
    fn test_invalid_template_rejected() {
        let broken = CombatantTemplate {
            name: "Broken".to_string(),
            max_hp: 0,
            attack: 3,
            defense: 0,
            speed: 1,
        };
        let err = Encounter::new(&[warrior()], &[broken], Multipliers::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidStat { stat: "max_hp", .. }));
    }

    #[test]
    fn test_warrior_beats_goblin() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let log = Encounter::new(&[warrior()], &[goblin()], Multipliers::default())
            .unwrap()
            .run(&mut rng);

        // 8 damage per hit against 20 HP: goblin falls in round 3 before acting
        assert!(log.victory);
        assert_eq!(log.rounds, 3);
        assert_eq!(log.history.len(), 5);
        assert_eq!(log.damage_by_players, 24);
        assert_eq!(log.damage_by_enemies, 2);
        assert_eq!(log.surviving_players[0].current_hp(), 48);
        assert!(log.surviving_enemies.is_empty());
    }

    #[test]
    fn test_step_after_end_is_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut encounter =
            Encounter::new(&[warrior()], &[goblin()], Multipliers::default()).unwrap();

        while encounter.step(&mut rng).is_some() {}
        assert!(encounter.is_over());
        assert!(encounter.step(&mut rng).is_none());
        assert_eq!(encounter.rounds(), 3);
    }

    #[test]
    fn test_victory_matches_surviving_players() {
        let dragon = CombatantTemplate::new("Dragon", 100, 15, 8, 9).unwrap();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let log = Encounter::new(&[warrior()], &[dragon.clone()], Multipliers::default())
                .unwrap()
                .run(&mut rng);
            assert_eq!(log.victory, !log.surviving_players.is_empty());
            assert!(log.surviving_players.is_empty() || log.surviving_enemies.is_empty());
        }
    }

    #[test]
    fn test_damage_totals_match_history() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let players = vec![warrior(), CombatantTemplate::new("Mage", 30, 8, 3, 12).unwrap()];
        let enemies = vec![goblin(), goblin(), goblin()];
        let log = Encounter::new(&players, &enemies, Multipliers::new(1.5, 1.0))
            .unwrap()
            .run(&mut rng);

        let by_side = |side: Side| -> u64 {
            log.history
                .iter()
                .filter(|e| e.side() == side)
                .map(|e| u64::from(e.damage))
                .sum()
        };
        assert_eq!(log.damage_by_players, by_side(Side::Player));
        assert_eq!(log.damage_by_enemies, by_side(Side::Enemy));
    }

    #[test]
    fn test_simulate_encounter_result() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let result =
            simulate_encounter(&[warrior()], &[goblin()], Multipliers::default(), &mut rng)
                .unwrap();

        assert!(result.victory);
        assert_eq!(result.turns, 5);
        // Damage values: 8, 1, 8, 1, 8
        let expected_entropy = -(0.6f64 * 0.6f64.log2() + 0.4 * 0.4f64.log2());
        assert!((result.metrics.engagement_variability - expected_entropy).abs() < 1e-12);
        assert_eq!(result.metrics.tension_index, 0.0);
        // Goblin drops from 12/20 to 4/20 between its two turns
        assert!((result.metrics.decision_impact - 20.0).abs() < 1e-12);
        assert_eq!(result.metrics.narrative_tension_ratio, 0.0);
        // |1 - 2/24|
        assert!((result.metrics.flow_state - (1.0 - 2.0 / 24.0)).abs() < 1e-12);
    }
}
