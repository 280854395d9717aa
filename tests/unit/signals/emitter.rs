//! Unit tests for signal emission

use crate::common_fixtures::{observation, scenario_registries, ts};
use sigmatch::molecules::matcher::MoleculeMatcher;
use sigmatch::signals::emitter::SignalEmitter;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

#[test]
fn test_ids_unique_and_increasing() {
    let registries = scenario_registries(50.0);
    let active: BTreeSet<String> = ["STR-003".to_string()].into_iter().collect();
    let matched = MoleculeMatcher::match_atoms(&active, &registries.molecules)
        .pop()
        .unwrap();
    let obs = observation("AAPL", ts(0), 100.0, 105.0, 100_000.0);

    let emitter = SignalEmitter::new();
    let ids: Vec<u64> = (0..5).map(|_| emitter.emit(&matched, "AAPL", &obs).id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_ids_unique_across_threads() {
    let registries = scenario_registries(50.0);
    let active: BTreeSet<String> = ["STR-003".to_string()].into_iter().collect();
    let matched = MoleculeMatcher::match_atoms(&active, &registries.molecules)
        .pop()
        .unwrap();
    let obs = observation("AAPL", ts(0), 100.0, 105.0, 100_000.0);
    let emitter = Arc::new(SignalEmitter::starting_at(100));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let emitter = emitter.clone();
            let matched = matched.clone();
            let obs = obs.clone();
            std::thread::spawn(move || {
                (0..50)
                    .map(|_| emitter.emit(&matched, "AAPL", &obs).id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(id >= 100);
            assert!(ids.insert(id), "duplicate id {}", id);
        }
    }
    assert_eq!(ids.len(), 200);
}

#[test]
fn test_signal_copies_match_detail() {
    let registries = scenario_registries(100.0);
    let active: BTreeSet<String> = ["STR-003".to_string(), "TRG-003".to_string()]
        .into_iter()
        .collect();
    let matched = MoleculeMatcher::match_atoms(&active, &registries.molecules)
        .pop()
        .unwrap();
    let obs = observation("AAPL", ts(0), 100.0, 105.0, 600_000.0);

    let signal = SignalEmitter::new().emit_at(&matched, "AAPL", &obs, ts(2));
    assert_eq!(signal.molecule_name, "First pullback");
    assert_eq!(signal.grade, "A++");
    assert_eq!(signal.triggered_at, ts(2));
    assert_eq!(signal.observed_at, ts(0));
}
