//! Engagement metrics for a single encounter.
//!
//! All metrics are pure functions of the encounter's turn history plus its
//! final state. Degenerate inputs (no turns, no survivors, zero decision
//! impact) map to fixed fallback values instead of errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::round::TurnEvent;

/// HP ratio below which an acting combatant counts as "in danger".
pub const TENSION_HP_THRESHOLD: f64 = 0.2;

/// HP ratio at which a combatant's best move flips from attacking to defending.
pub const DECISION_HP_THRESHOLD: f64 = 0.5;

/// The five derived engagement metrics of one encounter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// Fraction of turns taken below [`TENSION_HP_THRESHOLD`].
    pub tension_index: f64,
    /// Shannon entropy (bits) of the per-turn damage distribution.
    pub engagement_variability: f64,
    /// Distance from a balanced challenge/skill ratio (0 = balanced).
    pub flow_state: f64,
    /// Percentage of turns where the actor crossed [`DECISION_HP_THRESHOLD`] downward.
    pub decision_impact: f64,
    /// Composite `tension × variability / decision impact`.
    pub narrative_tension_ratio: f64,
}

impl EngagementMetrics {
    /// Compute every metric for a finished encounter.
    ///
    /// # Arguments
    /// * `history` - All turn events in order
    /// * `surviving_players` - Player combatants alive at the end
    /// * `damage_by_players` - Total damage dealt by the player side
    /// * `damage_by_enemies` - Total damage dealt by the enemy side
    #[must_use]
    pub fn from_history(
        history: &[TurnEvent],
        surviving_players: usize,
        damage_by_players: u64,
        damage_by_enemies: u64,
    ) -> Self {
        let tension_index = tension_index(history);
        let engagement_variability = engagement_variability(history);
        let decision_impact = decision_impact(history);

        Self {
            tension_index,
            engagement_variability,
            flow_state: flow_state(surviving_players, damage_by_players, damage_by_enemies),
            decision_impact,
            narrative_tension_ratio: narrative_tension_ratio(
                tension_index,
                engagement_variability,
                decision_impact,
                history.len(),
            ),
        }
    }
}

/// Base-2 Shannon entropy of the per-turn damage values.
///
/// Returns 0 for an empty history or when every hit dealt the same damage.
#[must_use]
pub fn engagement_variability(history: &[TurnEvent]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<u32, u32> = HashMap::new();
    for event in history {
        *counts.entry(event.damage).or_default() += 1;
    }

    let total = history.len() as f64;
    let mut sorted: Vec<u32> = counts.into_values().collect();
    // Fixed summation order keeps the result bit-identical between runs
    sorted.sort_unstable();
    sorted
        .into_iter()
        .map(|count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum::<f64>()
        .max(0.0)
}

/// Fraction of turns where the actor's HP ratio is below [`TENSION_HP_THRESHOLD`].
#[must_use]
pub fn tension_index(history: &[TurnEvent]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let tense = history
        .iter()
        .filter(|e| e.actor_hp_ratio < TENSION_HP_THRESHOLD)
        .count();
    tense as f64 / history.len() as f64
}

/// Gap between damage taken and damage dealt, averaged over surviving players.
///
/// `|1 - avg_taken / avg_dealt|`, or 0 with no survivors or no damage dealt.
#[must_use]
pub fn flow_state(surviving_players: usize, damage_by_players: u64, damage_by_enemies: u64) -> f64 {
    if surviving_players == 0 {
        return 0.0;
    }
    let survivors = surviving_players as f64;
    let avg_dealt = damage_by_players as f64 / survivors;
    let avg_taken = damage_by_enemies as f64 / survivors;
    if avg_dealt <= 0.0 {
        return 0.0;
    }
    (1.0 - avg_taken / avg_dealt).abs()
}

/// Percentage of turns on which the actor's HP ratio crossed
/// [`DECISION_HP_THRESHOLD`] downward since its previous turn.
///
/// A combatant's first observation is compared against its spawn state
/// (full HP), so taking heavy damage before ever acting still counts.
#[must_use]
pub fn decision_impact(history: &[TurnEvent]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }

    let mut last_ratio: HashMap<CombatantId, f64> = HashMap::new();
    let mut shifts = 0usize;
    for event in history {
        let previous = last_ratio.insert(event.actor, event.actor_hp_ratio).unwrap_or(1.0);
        if previous > DECISION_HP_THRESHOLD && event.actor_hp_ratio <= DECISION_HP_THRESHOLD {
            shifts += 1;
        }
    }
    shifts as f64 / history.len() as f64 * 100.0
}

/// Narrative tension ratio: `tension × variability / decision impact`.
///
/// A zero decision impact is replaced by 1, and an encounter without turns
/// scores 0.
#[must_use]
pub fn narrative_tension_ratio(
    tension_index: f64,
    engagement_variability: f64,
    decision_impact: f64,
    total_turns: usize,
) -> f64 {
    if total_turns == 0 {
        return 0.0;
    }
    let denominator = if decision_impact > 0.0 {
        decision_impact
    } else {
        1.0
    };
    tension_index * engagement_variability / denominator
}
