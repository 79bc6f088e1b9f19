//! Property tests over randomly generated encounters.
//!
//! These tests drive the full engine through proptest-generated rosters and
//! check the invariants that must hold for every valid input.

use proptest::prelude::*;
use skirmish_core::prelude::*;
use skirmish_test_utils::balance::max_rounds_bound;
use skirmish_test_utils::determinism::strategies::{
    arb_multipliers, arb_roster, arb_seed, arb_template,
};
use skirmish_test_utils::fixtures::seeded_rng;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encounter_terminates_within_hp_bound(
        players in arb_roster(4),
        enemies in arb_roster(4),
        multipliers in arb_multipliers(),
        seed in arb_seed(),
    ) {
        let mut rng = seeded_rng(seed);
        let log = Encounter::new(&players, &enemies, multipliers)
            .unwrap()
            .run(&mut rng);

        prop_assert!(u64::from(log.rounds) <= max_rounds_bound(&players, &enemies));
        prop_assert!(log.rounds >= 1);
    }

    #[test]
    fn victory_iff_players_survive(
        players in arb_roster(4),
        enemies in arb_roster(4),
        multipliers in arb_multipliers(),
        seed in arb_seed(),
    ) {
        let mut rng = seeded_rng(seed);
        let log = Encounter::new(&players, &enemies, multipliers)
            .unwrap()
            .run(&mut rng);

        prop_assert_eq!(log.victory, !log.surviving_players.is_empty());
        // Exactly one side is wiped out
        prop_assert!(log.surviving_players.is_empty() != log.surviving_enemies.is_empty());
        for c in log.surviving_players.iter().chain(&log.surviving_enemies) {
            prop_assert!(c.is_alive());
            prop_assert!(c.current_hp() <= c.max_hp());
        }
    }

    #[test]
    fn every_hit_deals_at_least_min_damage(
        attacker in arb_template(),
        target in arb_template(),
        multipliers in arb_multipliers(),
        seed in arb_seed(),
    ) {
        let mut rng = seeded_rng(seed);
        let actor = attacker.spawn(Side::Player, 0);
        let mut victim = target.spawn(Side::Enemy, 0);

        let damage = actor.act(&mut [&mut victim], multipliers, &mut rng);
        prop_assert!(damage >= MIN_DAMAGE);
        prop_assert_eq!(damage, calculate_damage(attacker.attack, target.defense, multipliers));
        prop_assert_eq!(victim.current_hp(), target.max_hp.saturating_sub(damage));
    }

    #[test]
    fn history_is_consistent(
        players in arb_roster(3),
        enemies in arb_roster(3),
        multipliers in arb_multipliers(),
        seed in arb_seed(),
    ) {
        let mut rng = seeded_rng(seed);
        let log = Encounter::new(&players, &enemies, multipliers)
            .unwrap()
            .run(&mut rng);

        let by_players: u64 = log
            .history
            .iter()
            .filter(|e| e.side() == Side::Player)
            .map(|e| u64::from(e.damage))
            .sum();
        prop_assert_eq!(by_players, log.damage_by_players);

        for event in &log.history {
            prop_assert!(event.damage >= MIN_DAMAGE);
            prop_assert!(event.actor.side != event.target.side);
            prop_assert!((0.0..=1.0).contains(&event.actor_hp_ratio));
            prop_assert!(event.actor_hp_ratio > 0.0);
        }
    }

    #[test]
    fn metrics_stay_in_range(
        players in arb_roster(3),
        enemies in arb_roster(3),
        multipliers in arb_multipliers(),
        seed in arb_seed(),
    ) {
        let mut rng = seeded_rng(seed);
        let result = simulate_encounter(&players, &enemies, multipliers, &mut rng).unwrap();
        let m = result.metrics;

        prop_assert!((0.0..=1.0).contains(&m.tension_index));
        prop_assert!((0.0..=100.0).contains(&m.decision_impact));
        prop_assert!(m.engagement_variability >= 0.0);
        prop_assert!(m.engagement_variability <= f64::from(result.turns).log2().max(0.0) + 1e-9);
        prop_assert!(m.flow_state >= 0.0);
        prop_assert!(m.narrative_tension_ratio >= 0.0);
        if !result.victory {
            prop_assert_eq!(m.flow_state, 0.0);
        }
    }
}

#[test]
fn heavy_defense_still_takes_one_damage() {
    let mut rng = seeded_rng(0);
    let attacker = CombatantTemplate::new("Feeble", 10, 1, 0, 1)
        .unwrap()
        .spawn(Side::Player, 0);
    let mut wall = CombatantTemplate::new("Wall", 10, 1, 100, 1)
        .unwrap()
        .spawn(Side::Enemy, 0);

    assert_eq!(attacker.act(&mut [&mut wall], Multipliers::default(), &mut rng), 1);
}

#[test]
fn constant_damage_encounter_has_zero_variability() {
    // Every hit deals exactly 5 damage in both directions
    let players = vec![CombatantTemplate::new("Duelist", 40, 5, 0, 3).unwrap()];
    let enemies = vec![CombatantTemplate::new("Duelist", 40, 5, 0, 2).unwrap()];

    let mut rng = seeded_rng(5);
    let log = Encounter::new(&players, &enemies, Multipliers::default())
        .unwrap()
        .run(&mut rng);
    assert!(log.history.iter().all(|e| e.damage == 5));

    let result = log.to_result();
    assert_eq!(result.metrics.engagement_variability, 0.0);
    assert_eq!(result.metrics.narrative_tension_ratio, 0.0);
    // Faster duelist lands the 8th hit first
    assert!(result.victory);
    assert_eq!(result.rounds, 8);
}
