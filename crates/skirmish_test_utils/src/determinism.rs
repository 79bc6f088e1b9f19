//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical seeds.
//!
//! # Testing Strategy
//!
//! A seeded Monte-Carlo batch must be reproducible bit for bit. Sources of
//! non-determinism include:
//!
//! - **System randomness**: every encounter takes an explicit `ChaCha8Rng`.
//!   Only an unseeded batch touches entropy, and it reports the seed it drew.
//!
//! - **HashMap iteration order**: metrics never depend on it; the entropy sum
//!   runs over sorted counts.
//!
//! - **Thread scheduling**: rayon results are collected in index order, so
//!   parallel and sequential batches agree.
//!
//! Floating-point results are compared through [`f64::to_bits`], never with
//! a tolerance.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a computation multiple times and verify it hashes identically.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `produce` - Builds the result from scratch
/// * `hash` - Function to compute the result hash
pub fn verify_determinism<S, Produce, HashFn>(
    runs: usize,
    produce: Produce,
    hash: HashFn,
) -> DeterminismResult
where
    Produce: Fn() -> S,
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| hash(&produce())).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn hash_event<H: Hasher>(event: &TurnEvent, hasher: &mut H) {
    event.actor.hash(hasher);
    event.target.hash(hasher);
    event.damage.hash(hasher);
    event.actor_hp_ratio.to_bits().hash(hasher);
    event.target_killed.hash(hasher);
}

/// Hash a turn history, including the exact bits of every HP ratio.
#[must_use]
pub fn history_hash(history: &[TurnEvent]) -> u64 {
    let mut hasher = DefaultHasher::new();
    history.len().hash(&mut hasher);
    for event in history {
        hash_event(event, &mut hasher);
    }
    hasher.finish()
}

/// Hash every field of an aggregate, floats by bit pattern.
#[must_use]
pub fn aggregate_fingerprint(result: &AggregateResult) -> u64 {
    let mut hasher = DefaultHasher::new();
    result.runs.hash(&mut hasher);
    result.seed.hash(&mut hasher);
    for value in [
        result.win_rate,
        result.avg_rounds,
        result.avg_damage_by_players,
        result.avg_damage_by_enemies,
        result.avg_tension_index,
        result.avg_engagement_variability,
        result.avg_flow_state,
        result.avg_decision_impact,
        result.avg_narrative_tension_ratio,
    ] {
        value.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Run one seeded encounter `runs` times and compare the full histories.
///
/// # Panics
///
/// Panics if the rosters or multipliers are invalid.
pub fn verify_encounter_determinism(
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
    multipliers: Multipliers,
    seed: u64,
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        runs,
        || {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            Encounter::new(players, enemies, multipliers)
                .expect("valid encounter setup")
                .run(&mut rng)
        },
        |log| history_hash(&log.history),
    )
}

/// Repeat a seeded Monte-Carlo batch and compare the aggregates bit for bit.
///
/// # Panics
///
/// Panics if `config` has no seed or the setup is invalid.
pub fn verify_monte_carlo_determinism(
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
    config: &MonteCarloConfig,
    repeats: usize,
) -> DeterminismResult {
    assert!(config.seed.is_some(), "determinism check needs a fixed seed");
    verify_determinism(
        repeats,
        || run_monte_carlo(players, enemies, config).expect("valid Monte-Carlo setup"),
        aggregate_fingerprint,
    )
}

/// Step two identically seeded encounters side by side and report the first
/// round whose events differ.
///
/// # Returns
///
/// `None` if the encounters match to the end, `Some(round)` otherwise.
///
/// # Panics
///
/// Panics if the rosters or multipliers are invalid.
pub fn find_first_divergence(
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
    multipliers: Multipliers,
    seed: u64,
) -> Option<u32> {
    let setup = || Encounter::new(players, enemies, multipliers).expect("valid encounter setup");
    let (mut a, mut b) = (setup(), setup());
    let (mut rng_a, mut rng_b) = (
        ChaCha8Rng::seed_from_u64(seed),
        ChaCha8Rng::seed_from_u64(seed),
    );

    loop {
        let events_a = a.step(&mut rng_a).map(history_hash);
        let events_b = b.step(&mut rng_b).map(history_hash);
        match (events_a, events_b) {
            (None, None) => return None,
            (ea, eb) if ea != eb => return Some(a.rounds().max(b.rounds())),
            _ => {}
        }
    }
}

/// Proptest strategies for encounter inputs.
///
/// Stat ranges are kept small so generated encounters stay short.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::prelude::*;

    /// Generate a valid combatant template.
    ///
    /// HP 1-200, attack 1-30, defense 0-20, speed -5-20.
    pub fn arb_template() -> impl Strategy<Value = CombatantTemplate> {
        (1u32..200, 1u32..30, 0u32..20, -5i32..20).prop_map(|(max_hp, attack, defense, speed)| {
            CombatantTemplate {
                name: "Fighter".to_string(),
                max_hp,
                attack,
                defense,
                speed,
            }
        })
    }

    /// Generate a non-empty roster of up to `max_len` templates.
    pub fn arb_roster(max_len: usize) -> impl Strategy<Value = Vec<CombatantTemplate>> {
        proptest::collection::vec(arb_template(), 1..=max_len.max(1))
    }

    /// Generate multipliers in the reference tuning range (0.5 to 2.0).
    pub fn arb_multipliers() -> impl Strategy<Value = Multipliers> {
        (0.5f64..=2.0, 0.5f64..=2.0).prop_map(|(attack, defense)| Multipliers::new(attack, defense))
    }

    /// Generate an RNG seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::*;
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, || 100u64, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
        assert_eq!(result.unique_hashes(), vec![100]);
    }

    #[test]
    fn test_verify_determinism_detects_difference() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            3,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |n| *n,
        );

        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 3);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics() {
        DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
        }
        .assert_deterministic();
    }

    #[test]
    fn test_party_encounter_is_deterministic() {
        verify_encounter_determinism(
            &[warrior(), mage()],
            &horde(&goblin(), 3),
            Multipliers::new(1.5, 1.0),
            2024,
            5,
        )
        .assert_deterministic();
    }

    #[test]
    fn test_boss_batch_is_deterministic() {
        let config = MonteCarloConfig::new(200)
            .with_seed(7)
            .with_multipliers(Multipliers::new(1.0, 1.2));
        verify_monte_carlo_determinism(&[warrior(), mage()], &[dragon()], &config, 3)
            .assert_deterministic();
    }

    #[test]
    fn test_no_divergence_with_same_seed() {
        let divergence =
            find_first_divergence(&[thief()], &horde(&wolf(), 2), Multipliers::new(0.8, 1.2), 11);
        assert!(divergence.is_none(), "Expected no divergence");
    }

    #[test]
    fn test_fingerprint_changes_with_seed() {
        let config = MonteCarloConfig::new(50).with_seed(1);
        let a = run_monte_carlo(&[warrior(), mage()], &[dragon()], &config).unwrap();
        let b = run_monte_carlo(&[warrior(), mage()], &[dragon()], &config.with_seed(2)).unwrap();
        // The seed itself is part of the fingerprint
        assert_ne!(aggregate_fingerprint(&a), aggregate_fingerprint(&b));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_seeded_encounter_replays(
            players in arb_roster(3),
            enemies in arb_roster(3),
            multipliers in arb_multipliers(),
            seed in arb_seed(),
        ) {
            let result = verify_encounter_determinism(&players, &enemies, multipliers, seed, 2);
            prop_assert!(result.is_deterministic);
        }
    }
}
