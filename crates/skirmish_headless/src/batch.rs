//! Batch scenario runner.
//!
//! Runs the Monte-Carlo aggregator over a list of scenarios and collects the
//! aggregates, expectation checks and failures into one serializable result.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skirmish_core::prelude::*;

use crate::scenario::{Scenario, ScenarioError, PRESET_NAMES};

/// File name of the JSON batch results.
pub const RESULTS_FILE: &str = "batch_results.json";

/// File name of the CSV export.
pub const CSV_FILE: &str = "combat_results.csv";

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenarios to run: preset keys or RON file paths
    pub scenarios: Vec<String>,
    /// Encounters per scenario
    pub runs: u32,
    /// Base seed shared by every scenario (None = fresh seed per scenario)
    pub seed: Option<u64>,
    /// Run encounters on the rayon pool
    pub parallel: bool,
    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenarios: PRESET_NAMES.iter().map(|s| (*s).to_string()).collect(),
            runs: 1000,
            seed: None,
            parallel: true,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create config for all presets with `runs` encounters each
    pub fn new(runs: u32) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    /// Set the scenario list
    pub fn with_scenarios<S: Into<String>>(
        mut self,
        scenarios: impl IntoIterator<Item = S>,
    ) -> Self {
        self.scenarios = scenarios.into_iter().map(Into::into).collect();
        self
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run encounters on the calling thread only
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn monte_carlo(&self) -> MonteCarloConfig {
        let config = MonteCarloConfig::new(self.runs);
        let config = match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        };
        if self.parallel {
            config
        } else {
            config.sequential()
        }
    }
}

/// Aggregate for one scenario of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Key the scenario was requested under (preset key or file path)
    pub key: String,
    /// Display name
    pub name: String,
    /// Multipliers the scenario ran with
    pub multipliers: Multipliers,
    /// Expected win-rate range, if any
    pub expected_victory: Option<(f64, f64)>,
    /// Whether the win rate landed in the expected range
    pub within_expected: Option<bool>,
    /// Monte-Carlo averages
    pub aggregate: AggregateResult,
}

impl ScenarioResult {
    /// Pair a scenario with its aggregate.
    pub fn new(key: &str, scenario: &Scenario, aggregate: AggregateResult) -> Self {
        Self {
            key: key.to_string(),
            name: scenario.name.clone(),
            multipliers: scenario.multipliers,
            expected_victory: scenario.expected_victory,
            within_expected: scenario.meets_expectation(aggregate.win_rate),
            aggregate,
        }
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Scenario key
    pub scenario: String,
    /// Error message
    pub message: String,
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Per-scenario aggregates, in configuration order
    pub scenarios: Vec<ScenarioResult>,
    /// Total runtime
    pub duration_seconds: f64,
    /// Scenarios that could not be run
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }

    /// Scenarios whose win rate fell outside their expected range
    pub fn out_of_range(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.scenarios
            .iter()
            .filter(|s| s.within_expected == Some(false))
    }
}

fn run_scenario(key: &str, config: &MonteCarloConfig) -> Result<ScenarioResult, ScenarioError> {
    let scenario = Scenario::resolve(key)?;
    let aggregate = scenario.simulate(config)?;
    Ok(ScenarioResult::new(key, &scenario, aggregate))
}

/// Run every configured scenario
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let monte_carlo = config.monte_carlo();

    info!(
        "Starting batch run: {} scenarios x {} encounters",
        config.scenarios.len(),
        config.runs
    );

    let mut scenarios = Vec::with_capacity(config.scenarios.len());
    let mut errors = Vec::new();

    for key in &config.scenarios {
        match run_scenario(key, &monte_carlo) {
            Ok(result) => {
                debug!(
                    scenario = %key,
                    seed = result.aggregate.seed,
                    win_rate = result.aggregate.win_rate,
                    "Scenario complete"
                );
                if result.within_expected == Some(false) {
                    warn!(
                        scenario = %key,
                        win_rate = result.aggregate.win_rate,
                        expected = ?result.expected_victory,
                        "Win rate outside expected range"
                    );
                }
                scenarios.push(result);
            }
            Err(e) => {
                warn!("Scenario {} failed: {}", key, e);
                errors.push(BatchError {
                    scenario: key.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        "Batch complete: {} scenarios in {:.2}s ({} failed)",
        scenarios.len(),
        duration_seconds,
        errors.len()
    );

    BatchResults {
        config,
        scenarios,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by repeating a seeded scenario.
///
/// Runs the scenario `repeats` times on the rayon pool plus once on the
/// calling thread; every aggregate must match exactly.
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u64,
    runs: u32,
    repeats: u32,
) -> Result<bool, ScenarioError> {
    let config = MonteCarloConfig::new(runs).with_seed(seed);
    let reference = scenario.simulate(&config.sequential())?;

    for repeat in 0..repeats {
        let result = scenario.simulate(&config)?;
        if result != reference {
            warn!(repeat, seed, "Aggregate diverged from sequential reference");
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.runs, 1000);
        assert_eq!(config.scenarios.len(), PRESET_NAMES.len());
        assert!(config.parallel);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500)
            .with_scenarios(["boss_fight"])
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .sequential();

        assert_eq!(config.scenarios, vec!["boss_fight".to_string()]);
        assert_eq!(config.runs, 500);
        assert_eq!(config.seed, Some(12345));
        assert!(!config.parallel);

        let mc = config.monte_carlo();
        assert_eq!(mc.runs, 500);
        assert_eq!(mc.seed, Some(12345));
        assert!(!mc.parallel);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(BatchConfig::new(50).with_seed(1));

        assert_eq!(results.scenarios.len(), PRESET_NAMES.len());
        assert!(results.errors.is_empty());
        for (result, key) in results.scenarios.iter().zip(PRESET_NAMES) {
            assert_eq!(result.key, key);
            assert_eq!(result.aggregate.runs, 50);
            assert_eq!(result.aggregate.seed, 1);
        }
    }

    #[test]
    fn test_unknown_scenario_recorded_as_error() {
        let config = BatchConfig::new(10)
            .with_scenarios(["solo_warrior_vs_goblin", "dance_off"])
            .with_seed(2);
        let results = run_batch(config);

        assert_eq!(results.scenarios.len(), 1);
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].scenario, "dance_off");
    }

    #[test]
    fn test_out_of_range_flags() {
        // The solo duel is always won, so claim it should always be lost
        let mut scenario = Scenario::solo_warrior_vs_goblin();
        scenario.expected_victory = Some((0.0, 0.1));
        let aggregate = scenario
            .simulate(&MonteCarloConfig::new(20).with_seed(3))
            .unwrap();

        let results = BatchResults {
            config: BatchConfig::new(20),
            scenarios: vec![ScenarioResult::new("rigged", &scenario, aggregate)],
            duration_seconds: 0.0,
            errors: Vec::new(),
        };
        let flagged: Vec<_> = results.out_of_range().map(|s| s.key.as_str()).collect();
        assert_eq!(flagged, vec!["rigged"]);
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&Scenario::party_vs_mob(), 12345, 200, 3).unwrap());
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(
            BatchConfig::new(20)
                .with_scenarios(["boss_fight", "attrition_test"])
                .with_seed(9),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(RESULTS_FILE);

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.scenarios.len(), 2);
        assert_eq!(loaded.config.seed, Some(9));
        for (a, b) in loaded.scenarios.iter().zip(&results.scenarios) {
            assert_eq!(a.key, b.key);
            assert_eq!(a.aggregate.runs, b.aggregate.runs);
            assert!((a.aggregate.win_rate - b.aggregate.win_rate).abs() < 1e-12);
            assert!((a.aggregate.avg_rounds - b.aggregate.avg_rounds).abs() < 1e-9);
        }
    }
}
