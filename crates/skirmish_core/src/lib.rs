//! # Skirmish Core
//!
//! Turn-based combat simulation core for Skirmish.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No global randomness (every encounter takes an explicit, seedable RNG)
//!
//! This separation enables:
//! - Reproducible Monte-Carlo estimates from a single seed
//! - Parallel encounter execution without shared mutable state
//! - Thin front-ends (CLI, reports) on top of one engine
//!
//! ## Crate Structure
//!
//! - [`combatant`] - Combatant templates and per-encounter instances
//! - [`combat`] - Sides, multipliers and the damage formula
//! - [`round`] - Speed-ordered resolution of a single round
//! - [`encounter`] - Single encounter loop until one side is wiped out
//! - [`metrics`] - Engagement metrics computed from an encounter's history
//! - [`monte_carlo`] - Repeated seeded encounters and averaged results
//! - [`error`] - Configuration errors raised before simulation starts

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod combatant;
pub mod encounter;
pub mod error;
pub mod metrics;
pub mod monte_carlo;
pub mod round;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{calculate_damage, Multipliers, Side, MIN_DAMAGE};
    pub use crate::combatant::{Combatant, CombatantId, CombatantTemplate};
    pub use crate::encounter::{simulate_encounter, Encounter, EncounterLog, EncounterResult};
    pub use crate::error::{Result, SimError};
    pub use crate::metrics::EngagementMetrics;
    pub use crate::monte_carlo::{
        run_encounters, run_monte_carlo, AggregateResult, EncounterBatch, MonteCarloConfig,
    };
    pub use crate::round::{resolve_round, TurnEvent};
}
