//! Headless scenario runner for balance testing.
//!
//! This crate wraps the `skirmish_core` engine with everything needed to run
//! it from a terminal or CI job:
//!
//! - **Scenarios**: built-in presets and read-only RON scenario files
//! - **Batch runs**: every scenario through the Monte-Carlo aggregator, with
//!   JSON results and expected-range checks
//! - **Reports**: grid table, CSV export and ASCII bar charts
//!
//! # Example
//!
//! ```bash
//! # Run one preset
//! cargo run -p skirmish_headless -- run --scenario boss_fight --seed 42
//!
//! # Run a scenario file with custom multipliers
//! cargo run -p skirmish_headless -- run --scenario scenarios/glass_cannons.ron --attack-mult 1.5
//!
//! # Run all presets and write results/
//! cargo run -p skirmish_headless -- batch --runs 1000 --seed 42 --output results
//!
//! # Verify determinism
//! cargo run -p skirmish_headless -- verify --scenario party_vs_mob --seed 12345
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod report;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, ScenarioResult};
pub use report::{render_bars, render_summary, render_table, to_csv, write_csv};
pub use scenario::{Scenario, ScenarioError, PRESET_NAMES};
