//! # Skirmish Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Reference combatant fixtures
//! - Determinism test harness
//! - Balance bounds and win-rate checks
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
