//! Balance testing utilities.
//!
//! Helpers for checking Monte-Carlo win rates against expected ranges and
//! for bounding encounter length.

use skirmish_core::prelude::*;

/// Upper bound on rounds for any encounter between two rosters.
///
/// Every round with both sides alive deals at least one damage, so an
/// encounter cannot outlast the total HP on the field.
#[must_use]
pub fn max_rounds_bound(players: &[CombatantTemplate], enemies: &[CombatantTemplate]) -> u64 {
    players
        .iter()
        .chain(enemies)
        .map(|t| u64::from(t.max_hp))
        .sum()
}

/// Inclusive win-rate range a matchup is expected to land in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinRateRange {
    /// Lowest acceptable win rate.
    pub min: f64,
    /// Highest acceptable win rate.
    pub max: f64,
}

impl WinRateRange {
    /// Create a new range.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check if a win rate falls inside the range.
    #[must_use]
    pub fn contains(&self, win_rate: f64) -> bool {
        win_rate >= self.min && win_rate <= self.max
    }

    /// Assert an aggregate's win rate is in range.
    ///
    /// # Panics
    ///
    /// Panics with the observed rate and standard error when out of range.
    pub fn assert_contains(&self, label: &str, result: &AggregateResult) {
        assert!(
            self.contains(result.win_rate),
            "{label}: win rate {:.3} (±{:.3}) outside expected range [{:.2}, {:.2}] over {} runs (seed {})",
            result.win_rate,
            result.win_rate_std_error(),
            self.min,
            self.max,
            result.runs,
            result.seed
        );
    }
}

/// Run a seeded batch and assert the win rate lands in `range`.
///
/// # Panics
///
/// Panics if the setup is invalid or the win rate is out of range.
pub fn assert_win_rate(
    label: &str,
    players: &[CombatantTemplate],
    enemies: &[CombatantTemplate],
    config: &MonteCarloConfig,
    range: WinRateRange,
) -> AggregateResult {
    let result = run_monte_carlo(players, enemies, config).expect("valid Monte-Carlo setup");
    tracing::debug!(label, win_rate = result.win_rate, "Balance check");
    range.assert_contains(label, &result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn test_max_rounds_bound() {
        assert_eq!(max_rounds_bound(&[warrior()], &[goblin()]), 70);
        assert_eq!(max_rounds_bound(&[warrior()], &horde(&imp(), 5)), 125);
    }

    #[test]
    fn test_range_contains() {
        let range = WinRateRange::new(0.8, 1.0);
        assert!(range.contains(0.8));
        assert!(range.contains(1.0));
        assert!(!range.contains(0.79));
    }

    #[test]
    fn test_attrition_win_rate() {
        let config = MonteCarloConfig::new(500)
            .with_seed(3)
            .with_multipliers(Multipliers::new(1.5, 0.8));
        assert_win_rate(
            "attrition",
            &[warrior()],
            &horde(&imp(), 5),
            &config,
            WinRateRange::new(0.9, 1.0),
        );
    }

    #[test]
    #[should_panic(expected = "outside expected range")]
    fn test_out_of_range_panics() {
        let config = MonteCarloConfig::new(100).with_seed(3);
        assert_win_rate(
            "rigged",
            &[warrior()],
            &[goblin()],
            &config,
            WinRateRange::new(0.0, 0.1),
        );
    }
}
