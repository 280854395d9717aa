//! Unit tests for molecule matching

use crate::common_fixtures::{
    above_vwap, bullish_candle, scenario_atoms, scenario_registries, ts, volume_spike,
};
use sigmatch::atoms::registry::AtomRegistry;
use sigmatch::models::molecule::MoleculeDefinition;
use sigmatch::molecules::matcher::MoleculeMatcher;
use sigmatch::molecules::registry::MoleculeRegistry;
use sigmatch::signals::window::ActiveAtomWindow;
use std::collections::BTreeSet;
use std::time::Duration;

fn active(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_full_coverage_triggers_at_100() {
    let registries = scenario_registries(100.0);
    let matches =
        MoleculeMatcher::match_atoms(&active(&["STR-003", "TRG-003"]), &registries.molecules);
    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.molecule_id, "LOGIC-EXP-004");
    assert_eq!(m.ratio, 100.0);
    assert_eq!(m.grade, "A++");
    assert!(m.unmatched_atoms.is_empty());
}

#[test]
fn test_partial_coverage_below_threshold() {
    let registries = scenario_registries(100.0);
    assert!(MoleculeMatcher::match_atoms(&active(&["STR-003"]), &registries.molecules).is_empty());

    let all = MoleculeMatcher::evaluate_all(&active(&["STR-003"]), &registries.molecules);
    assert_eq!(all.len(), 1);
    assert!(!all[0].triggered);
    assert_eq!(all[0].ratio, 50.0);
    assert_eq!(all[0].grade, "B");
    assert_eq!(all[0].unmatched_atoms, active(&["TRG-003"]));
}

#[test]
fn test_three_atom_molecule_needs_all_three_at_100() {
    let atoms = AtomRegistry::load(vec![above_vwap(), bullish_candle(), volume_spike()]).unwrap();
    let molecules = MoleculeRegistry::load(
        vec![MoleculeDefinition::new(
            "LOGIC-EXP-004",
            "First pullback",
            ["CTX-010", "TRG-003", "STR-003"],
            100.0,
        )],
        &atoms,
    )
    .unwrap();

    let two = active(&["CTX-010", "STR-003"]);
    assert!(MoleculeMatcher::match_atoms(&two, &molecules).is_empty());
    let all = MoleculeMatcher::evaluate_all(&two, &molecules);
    assert!(!all[0].triggered);
    assert!((all[0].ratio - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(all[0].unmatched_atoms, active(&["TRG-003"]));

    let matches =
        MoleculeMatcher::match_atoms(&active(&["CTX-010", "STR-003", "TRG-003"]), &molecules);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].ratio, 100.0);
    assert_eq!(matches[0].matched_atoms, active(&["CTX-010", "STR-003", "TRG-003"]));
}

#[test]
fn test_threshold_is_inclusive() {
    let registries = scenario_registries(50.0);
    let matches = MoleculeMatcher::match_atoms(&active(&["STR-003"]), &registries.molecules);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].matched_atoms, active(&["STR-003"]));
    assert_eq!(matches[0].ratio, 50.0);
}

#[test]
fn test_irrelevant_atoms_do_not_count() {
    let registries = scenario_registries(100.0);
    let matches = MoleculeMatcher::match_atoms(
        &active(&["STR-003", "CTX-001", "DRV-001"]),
        &registries.molecules,
    );
    assert!(matches.is_empty());
}

#[test]
fn test_matches_in_registry_order() {
    let atoms = scenario_atoms();
    let molecules = MoleculeRegistry::load(
        vec![
            MoleculeDefinition::new("M-B", "second listed first", ["TRG-003"], 100.0),
            MoleculeDefinition::new("M-A", "both", ["STR-003", "TRG-003"], 50.0),
        ],
        &atoms,
    )
    .unwrap();

    let matches = MoleculeMatcher::match_atoms(&active(&["STR-003", "TRG-003"]), &molecules);
    let ids: Vec<&str> = matches.iter().map(|m| m.molecule_id.as_str()).collect();
    assert_eq!(ids, vec!["M-B", "M-A"]);
}

#[test]
fn test_match_ticker_reads_only_that_ticker() {
    let registries = scenario_registries(100.0);
    let mut window = ActiveAtomWindow::new(Duration::from_secs(60), 200);
    window.record("X", ["STR-003"], ts(0));
    window.record("Y", ["TRG-003"], ts(0));

    assert!(MoleculeMatcher::match_ticker("X", &window, &registries.molecules).is_empty());
    assert!(MoleculeMatcher::match_ticker("Y", &window, &registries.molecules).is_empty());

    window.record("X", ["TRG-003"], ts(1));
    let matches = MoleculeMatcher::match_ticker("X", &window, &registries.molecules);
    assert_eq!(matches.len(), 1);
}
