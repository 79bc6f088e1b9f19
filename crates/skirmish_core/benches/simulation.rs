//! Simulation benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_core::prelude::*;
use skirmish_test_utils::fixtures::{dragon, goblin, horde, imp, mage, seeded_rng, warrior};

/// Single encounters of increasing roster size.
pub fn encounter_benchmark(c: &mut Criterion) {
    let party = vec![warrior(), mage()];
    let mob = horde(&goblin(), 3);
    let boss = vec![dragon()];
    let swarm = horde(&imp(), 5);

    c.bench_function("encounter_party_vs_mob", |b| {
        let mut rng = seeded_rng(1);
        b.iter(|| {
            simulate_encounter(
                black_box(&party),
                black_box(&mob),
                Multipliers::new(1.5, 1.0),
                &mut rng,
            )
        })
    });

    c.bench_function("encounter_boss_fight", |b| {
        let mut rng = seeded_rng(2);
        b.iter(|| {
            simulate_encounter(
                black_box(&party),
                black_box(&boss),
                Multipliers::new(1.0, 1.2),
                &mut rng,
            )
        })
    });

    c.bench_function("encounter_attrition", |b| {
        let mut rng = seeded_rng(3);
        let solo = vec![warrior()];
        b.iter(|| {
            simulate_encounter(
                black_box(&solo),
                black_box(&swarm),
                Multipliers::new(1.5, 0.8),
                &mut rng,
            )
        })
    });
}

/// Full Monte-Carlo batches, sequential against parallel.
pub fn monte_carlo_benchmark(c: &mut Criterion) {
    let party = vec![warrior(), mage()];
    let boss = vec![dragon()];
    let config = MonteCarloConfig::new(1000)
        .with_seed(42)
        .with_multipliers(Multipliers::new(1.0, 1.2));

    let mut group = c.benchmark_group("monte_carlo_1000");
    group.sample_size(20);
    group.bench_function("sequential", |b| {
        let sequential = config.sequential();
        b.iter(|| run_monte_carlo(black_box(&party), black_box(&boss), &sequential))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| run_monte_carlo(black_box(&party), black_box(&boss), &config))
    });
    group.finish();
}

criterion_group!(benches, encounter_benchmark, monte_carlo_benchmark);
criterion_main!(benches);
