//! Error types for the combat simulation.
//!
//! Every variant describes a malformed configuration. They are raised before
//! the first round is resolved; a running encounter has no error paths.

use thiserror::Error;

use crate::combat::Side;

/// Result type alias using [`SimError`].
pub type Result<T, E = SimError> = std::result::Result<T, E>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// One side has no combatants at encounter start.
    #[error("Invalid roster: {side} side has no combatants")]
    InvalidRoster {
        /// The empty side.
        side: Side,
    },

    /// A combatant stat that must be positive is zero.
    #[error("Invalid stat for '{combatant}': {stat} must be positive")]
    InvalidStat {
        /// Name of the offending combatant.
        combatant: String,
        /// Name of the stat (`max_hp` or `attack`).
        stat: &'static str,
    },

    /// A damage multiplier is negative, NaN or infinite.
    #[error("Invalid {which} multiplier: {value} (must be finite and non-negative)")]
    InvalidMultiplier {
        /// Which multiplier (`attack` or `defense`).
        which: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A Monte-Carlo batch was requested with zero runs.
    #[error("Invalid run count: at least one encounter is required")]
    InvalidRunCount,
}
