//! Headless combat simulator.
//!
//! Runs Monte-Carlo batches of turn-based encounters and prints engagement
//! reports.
//!
//! # Usage
//!
//! ```bash
//! # Simulate one preset (or a .ron scenario file)
//! skirmish run --scenario solo_warrior_vs_goblin --runs 1000 --seed 42
//!
//! # Override the scenario's multipliers and emit JSON
//! skirmish run --scenario boss_fight --attack-mult 1.3 --defense-mult 0.9 --json
//!
//! # Run every preset, write results/batch_results.json and results/combat_results.csv
//! skirmish batch --runs 1000 --seed 42 --output results
//!
//! # Verify determinism by running the same seed multiple times
//! skirmish verify --scenario party_vs_mob --seed 12345 --repeats 5
//!
//! # List presets
//! skirmish list
//! ```
//!
//! Reports go to stdout, logs to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_core::prelude::*;
use skirmish_headless::{
    batch::{run_batch, verify_determinism, BatchConfig, ScenarioResult, CSV_FILE, RESULTS_FILE},
    report::{render_bars, render_summary, render_table, write_csv, BAR_WIDTH},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "skirmish")]
#[command(about = "Turn-based combat simulator with engagement metrics")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one scenario
    Run {
        /// Preset key or path to a .ron scenario file
        #[arg(short, long)]
        scenario: String,

        /// Override the attack multiplier
        #[arg(long)]
        attack_mult: Option<f64>,

        /// Override the defense multiplier
        #[arg(long)]
        defense_mult: Option<f64>,

        /// Number of encounters
        #[arg(short, long, default_value = "1000")]
        runs: u32,

        /// Base seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the result as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Run encounters on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Run every preset and write results
    Batch {
        /// Scenarios to run (defaults to every preset)
        #[arg(short, long)]
        scenario: Vec<String>,

        /// Encounters per scenario
        #[arg(short, long, default_value = "1000")]
        runs: u32,

        /// Base seed (random per scenario if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Run encounters on a single thread
        #[arg(long)]
        sequential: bool,

        /// Exit with an error if any win rate is outside its expected range
        #[arg(long)]
        strict: bool,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Preset key or path to a .ron scenario file
        #[arg(short, long, default_value = "party_vs_mob")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Encounters per repeat
        #[arg(short, long, default_value = "1000")]
        runs: u32,

        /// Number of verification repeats
        #[arg(long, default_value = "5")]
        repeats: u32,
    },

    /// List built-in scenario presets
    List,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            attack_mult,
            defense_mult,
            runs,
            seed,
            json,
            sequential,
        } => cmd_run(
            &scenario,
            attack_mult,
            defense_mult,
            runs,
            seed,
            json,
            sequential,
        ),
        Commands::Batch {
            scenario,
            runs,
            seed,
            output,
            sequential,
            strict,
        } => cmd_batch(scenario, runs, seed, output, sequential, strict),
        Commands::Verify {
            scenario,
            seed,
            runs,
            repeats,
        } => cmd_verify(&scenario, seed, runs, repeats),
        Commands::List => cmd_list(),
    }
}

/// Load a scenario or exit
fn load_scenario(arg: &str) -> Scenario {
    match Scenario::resolve(arg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(scenario = %arg, error = %e, "Failed to load scenario");
            eprintln!("FATAL: {}", e);
            std::process::exit(1);
        }
    }
}

/// Simulate one scenario
fn cmd_run(
    arg: &str,
    attack_mult: Option<f64>,
    defense_mult: Option<f64>,
    runs: u32,
    seed: Option<u64>,
    json: bool,
    sequential: bool,
) {
    let mut scenario = load_scenario(arg);
    if attack_mult.is_some() || defense_mult.is_some() {
        let base = scenario.multipliers;
        let multipliers = Multipliers::new(
            attack_mult.unwrap_or(base.attack),
            defense_mult.unwrap_or(base.defense),
        );
        scenario = scenario.with_multipliers(multipliers);
    }

    let mut config = MonteCarloConfig::new(runs);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if sequential {
        config = config.sequential();
    }

    tracing::info!(
        scenario = %scenario.name,
        runs,
        seed = ?seed,
        attack_mult = scenario.multipliers.attack,
        defense_mult = scenario.multipliers.defense,
        "Running scenario"
    );

    let aggregate = match scenario.simulate(&config) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "Simulation failed");
            eprintln!("FATAL: {}", e);
            std::process::exit(1);
        }
    };
    let result = ScenarioResult::new(arg, &scenario, aggregate);

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", render_summary(&result.name, &result.aggregate));
    }

    if let (Some((min, max)), Some(false)) = (result.expected_victory, result.within_expected) {
        eprintln!(
            "WARNING: victory rate {:.2}% outside expected range {:.0}%-{:.0}%",
            result.aggregate.win_rate * 100.0,
            min * 100.0,
            max * 100.0
        );
    }
}

/// Run every scenario and write results
fn cmd_batch(
    scenarios: Vec<String>,
    runs: u32,
    seed: Option<u64>,
    output: PathBuf,
    sequential: bool,
    strict: bool,
) {
    let mut config = BatchConfig::new(runs).with_output(output.clone());
    if !scenarios.is_empty() {
        config = config.with_scenarios(scenarios);
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if sequential {
        config = config.sequential();
    }

    tracing::info!(
        scenarios = config.scenarios.len(),
        runs,
        seed = ?seed,
        parallel = config.parallel,
        output = %output.display(),
        "Batch configuration"
    );

    // Ensure output directory exists
    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let results = run_batch(config);

    // Save results
    let results_path = output.join(RESULTS_FILE);
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {}", e);
        std::process::exit(1);
    }
    let csv_path = output.join(CSV_FILE);
    if let Err(e) = write_csv(&csv_path, &results.scenarios) {
        tracing::error!(error = %e, path = %csv_path.display(), "Failed to write CSV");
        eprintln!("FATAL: Failed to write CSV: {}", e);
        std::process::exit(1);
    }

    println!("{}", render_table(&results.scenarios));
    println!("{}", render_bars(&results.scenarios, BAR_WIDTH));

    // Print summary
    eprintln!("{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Scenarios run: {}", results.scenarios.len());
    eprintln!("Duration: {:.2}s", results.duration_seconds);

    let flagged: Vec<_> = results.out_of_range().collect();
    if !flagged.is_empty() {
        eprintln!("\nOutside expected victory range:");
        for s in &flagged {
            if let Some((min, max)) = s.expected_victory {
                eprintln!(
                    "  {}: {:.2}% (expected {:.0}%-{:.0}%, seed {})",
                    s.name,
                    s.aggregate.win_rate * 100.0,
                    min * 100.0,
                    max * 100.0,
                    s.aggregate.seed
                );
            }
        }
    }

    if !results.errors.is_empty() {
        eprintln!("\nFAILED SCENARIOS:");
        for error in &results.errors {
            eprintln!("  {}: {}", error.scenario, error.message);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
    eprintln!("CSV saved to: {}", csv_path.display());

    if !results.errors.is_empty() || (strict && !flagged.is_empty()) {
        std::process::exit(1);
    }
}

/// Verify determinism
fn cmd_verify(arg: &str, seed: u64, runs: u32, repeats: u32) {
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs x {} repeats)",
        arg,
        seed,
        runs,
        repeats
    );

    let scenario = load_scenario(arg);
    match verify_determinism(&scenario, seed, runs, repeats) {
        Ok(true) => {
            eprintln!("PASS: All {} repeats produced identical results", repeats);
        }
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Verification could not run");
            eprintln!("FATAL: {}", e);
            std::process::exit(1);
        }
    }
}

/// List presets
fn cmd_list() {
    for (key, scenario) in Scenario::presets() {
        let expected = scenario
            .expected_victory
            .map(|(min, max)| format!("{:.0}%-{:.0}%", min * 100.0, max * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<36} atk {:.1} / def {:.1}  expected {}",
            key, scenario.name, scenario.multipliers.attack, scenario.multipliers.defense, expected
        );
        println!("{:<24} {}", "", scenario.description);
    }
}
