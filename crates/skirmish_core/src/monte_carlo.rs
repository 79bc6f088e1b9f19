//! Monte-Carlo aggregation over many independent encounters.
//!
//! Encounter `i` of a batch is seeded with `base_seed.wrapping_add(i)`, so a
//! batch is fully described by its base seed and run count. Results are
//! collected in index order, which makes parallel and sequential execution
//! produce bit-identical aggregates.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::Multipliers;
use crate::combatant::CombatantTemplate;
use crate::encounter::{simulate_encounter, validate_rosters, EncounterResult};
use crate::error::{Result, SimError};

/// Default number of encounters per batch.
pub const DEFAULT_RUNS: u32 = 1000;

/// Settings for a Monte-Carlo batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of encounters to simulate. Must be positive.
    pub runs: u32,
    /// Base seed. `None` draws one from entropy and reports it in the result.
    pub seed: Option<u64>,
    /// Multipliers applied to every encounter.
    pub multipliers: Multipliers,
    /// Run encounters on the rayon pool.
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            seed: None,
            multipliers: Multipliers::default(),
            parallel: true,
        }
    }
}

impl MonteCarloConfig {
    /// Create a config for `runs` encounters with default settings.
    #[must_use]
    pub fn new(runs: u32) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    /// Set the run count
    #[must_use]
    pub fn with_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self
    }

    /// Fix the base seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the multipliers
    #[must_use]
    pub fn with_multipliers(mut self, multipliers: Multipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    /// Run encounters on the calling thread only
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(SimError::InvalidRunCount);
        }
        self.multipliers.validate()
    }
}

/// Per-encounter results of a batch, together with the base seed used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterBatch {
    /// Base seed actually used.
    pub seed: u64,
    /// One result per encounter, in seed order.
    pub results: Vec<EncounterResult>,
}

/// Run `config.runs` independent encounters and return each result.
///
/// All validation happens before the first encounter starts.
pub fn run_encounters(
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
    config: &MonteCarloConfig,
) -> Result<EncounterBatch> {
    validate_rosters(players, enemies)?;
    config.validate()?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let multipliers = config.multipliers;

    let run_one = |i: u32| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(u64::from(i)));
        simulate_encounter(players, enemies, multipliers, &mut rng)
    };

    let results = if config.parallel {
        (0..config.runs)
            .into_par_iter()
            .map(run_one)
            .collect::<Result<Vec<_>>>()?
    } else {
        (0..config.runs).map(run_one).collect::<Result<Vec<_>>>()?
    };

    tracing::debug!(
        runs = config.runs,
        seed,
        parallel = config.parallel,
        "Encounter batch complete"
    );

    Ok(EncounterBatch { seed, results })
}

fn mean(results: &[EncounterResult], field: impl Fn(&EncounterResult) -> f64) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(field).sum::<f64>() / results.len() as f64
}

/// Averages over a batch of encounters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Number of encounters aggregated.
    pub runs: u32,
    /// Base seed of the batch.
    pub seed: u64,
    /// Fraction of encounters won by the player side.
    pub win_rate: f64,
    /// Mean rounds per encounter.
    pub avg_rounds: f64,
    /// Mean damage dealt by the player side.
    pub avg_damage_by_players: f64,
    /// Mean damage dealt by the enemy side.
    pub avg_damage_by_enemies: f64,
    /// Mean tension index.
    pub avg_tension_index: f64,
    /// Mean engagement variability.
    pub avg_engagement_variability: f64,
    /// Mean flow state.
    pub avg_flow_state: f64,
    /// Mean decision impact.
    pub avg_decision_impact: f64,
    /// Mean narrative tension ratio.
    pub avg_narrative_tension_ratio: f64,
}

impl AggregateResult {
    /// Average a batch. An empty batch yields all-zero means.
    #[must_use]
    pub fn from_batch(batch: &EncounterBatch) -> Self {
        let r = &batch.results;
        Self {
            runs: u32::try_from(r.len()).unwrap_or(u32::MAX),
            seed: batch.seed,
            win_rate: mean(r, |e| if e.victory { 1.0 } else { 0.0 }),
            avg_rounds: mean(r, |e| f64::from(e.rounds)),
            avg_damage_by_players: mean(r, |e| e.damage_by_players as f64),
            avg_damage_by_enemies: mean(r, |e| e.damage_by_enemies as f64),
            avg_tension_index: mean(r, |e| e.metrics.tension_index),
            avg_engagement_variability: mean(r, |e| e.metrics.engagement_variability),
            avg_flow_state: mean(r, |e| e.metrics.flow_state),
            avg_decision_impact: mean(r, |e| e.metrics.decision_impact),
            avg_narrative_tension_ratio: mean(r, |e| e.metrics.narrative_tension_ratio),
        }
    }

    /// Standard error of the win rate, `sqrt(p(1-p)/n)`.
    #[must_use]
    pub fn win_rate_std_error(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        (self.win_rate * (1.0 - self.win_rate) / f64::from(self.runs)).sqrt()
    }
}

/// Simulate `config.runs` encounters and average every result field.
///
/// # Errors
/// Returns the first configuration error found: empty roster, zero
/// `max_hp`/`attack`, bad multiplier or zero runs. No encounter is run
/// in that case.
pub fn run_monte_carlo(
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
    config: &MonteCarloConfig,
) -> Result<AggregateResult> {
    let batch = run_encounters(players, enemies, config)?;
    let aggregate = AggregateResult::from_batch(&batch);

    tracing::debug!(
        runs = aggregate.runs,
        seed = aggregate.seed,
        win_rate = aggregate.win_rate,
        avg_rounds = aggregate.avg_rounds,
        "Monte-Carlo aggregate"
    );

    Ok(aggregate)
}
