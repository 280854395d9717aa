//! Unit tests for the per-cycle signal pipeline

use crate::common_fixtures::{observation, scenario_registries, ts};
use chrono::NaiveTime;
use sigmatch::config::EngineConfig;
use sigmatch::error::EngineError;
use sigmatch::signals::emitter::SignalEmitter;
use sigmatch::signals::engine::SignalEngine;
use sigmatch::signals::session::TradingSession;
use std::sync::Arc;
use std::time::Duration;

fn engine_with(config: EngineConfig) -> SignalEngine {
    SignalEngine::new(config, Arc::new(SignalEmitter::new()))
}

fn engine() -> SignalEngine {
    engine_with(EngineConfig::default())
}

#[test]
fn test_full_match_emits_one_signal() {
    let registries = scenario_registries(100.0);
    let mut engine = engine();

    let obs = observation("AAPL", ts(0), 100.0, 105.0, 600_000.0);
    let report = engine.process(&registries, &obs).unwrap().unwrap();

    assert_eq!(report.fired.len(), 2);
    assert_eq!(report.signals.len(), 1);
    let signal = &report.signals[0];
    assert_eq!(signal.ticker, "AAPL");
    assert_eq!(signal.molecule_id, "LOGIC-EXP-004");
    assert_eq!(signal.match_ratio, 100.0);
    assert_eq!(signal.matched_atom_ids, vec!["STR-003", "TRG-003"]);
    assert_eq!(signal.price, 105.0);
    assert_eq!(signal.observed_at, ts(0));
}

#[test]
fn test_partial_match_below_threshold_emits_nothing() {
    let registries = scenario_registries(100.0);
    let mut engine = engine();

    let obs = observation("AAPL", ts(0), 100.0, 105.0, 100_000.0);
    let report = engine.process(&registries, &obs).unwrap().unwrap();

    assert_eq!(report.fired.len(), 1);
    assert!(report.matches.is_empty());
    assert!(report.signals.is_empty());
}

#[test]
fn test_partial_match_at_threshold_emits() {
    let registries = scenario_registries(50.0);
    let mut engine = engine();

    let obs = observation("AAPL", ts(0), 100.0, 105.0, 100_000.0);
    let report = engine.process(&registries, &obs).unwrap().unwrap();

    assert_eq!(report.signals.len(), 1);
    assert_eq!(report.signals[0].matched_atom_ids, vec!["STR-003"]);
    assert_eq!(report.signals[0].match_ratio, 50.0);
}

#[test]
fn test_atoms_co_occur_across_cycles_within_ttl() {
    let registries = scenario_registries(100.0);
    let mut engine = engine_with(EngineConfig {
        window_ttl: Duration::from_secs(60),
        ..EngineConfig::default()
    });

    // bullish, quiet
    let first = observation("AAPL", ts(0), 100.0, 105.0, 100_000.0);
    assert!(engine.process(&registries, &first).unwrap().unwrap().signals.is_empty());

    // bearish, loud
    let second = observation("AAPL", ts(30), 105.0, 104.0, 900_000.0);
    let report = engine.process(&registries, &second).unwrap().unwrap();
    assert_eq!(report.fired.len(), 1);
    assert_eq!(report.signals.len(), 1);
    assert_eq!(report.signals[0].matched_atom_ids, vec!["STR-003", "TRG-003"]);
}

#[test]
fn test_expired_atoms_do_not_count() {
    let registries = scenario_registries(100.0);
    let mut engine = engine_with(EngineConfig {
        window_ttl: Duration::from_secs(60),
        ..EngineConfig::default()
    });

    let first = observation("AAPL", ts(0), 100.0, 105.0, 100_000.0);
    engine.process(&registries, &first).unwrap();

    let late = observation("AAPL", ts(60), 105.0, 104.0, 900_000.0);
    let report = engine.process(&registries, &late).unwrap().unwrap();
    assert!(report.signals.is_empty());
    assert!(!engine.window().contains("AAPL", "STR-003"));
    assert!(engine.window().contains("AAPL", "TRG-003"));
}

#[test]
fn test_tickers_do_not_share_atoms() {
    let registries = scenario_registries(100.0);
    let mut engine = engine();

    let x = observation("X", ts(0), 100.0, 105.0, 100_000.0);
    let y = observation("Y", ts(1), 105.0, 104.0, 900_000.0);
    assert!(engine.process(&registries, &x).unwrap().unwrap().signals.is_empty());
    assert!(engine.process(&registries, &y).unwrap().unwrap().signals.is_empty());

    assert!(engine.window().contains("X", "STR-003"));
    assert!(!engine.window().contains("X", "TRG-003"));
    assert!(engine.window().contains("Y", "TRG-003"));
    assert!(!engine.window().contains("Y", "STR-003"));
}

#[test]
fn test_repeated_matches_emit_each_cycle_without_cooldown() {
    let registries = scenario_registries(100.0);
    let mut engine = engine();

    let a = engine
        .process(&registries, &observation("AAPL", ts(0), 100.0, 105.0, 600_000.0))
        .unwrap()
        .unwrap();
    let b = engine
        .process(&registries, &observation("AAPL", ts(5), 100.0, 106.0, 700_000.0))
        .unwrap()
        .unwrap();

    assert_eq!(a.signals.len(), 1);
    assert_eq!(b.signals.len(), 1);
    assert_ne!(a.signals[0].id, b.signals[0].id);
}

#[test]
fn test_cooldown_suppresses_repeat_signals() {
    let registries = scenario_registries(100.0);
    let mut engine = engine_with(EngineConfig {
        cooldown: Some(Duration::from_secs(30)),
        ..EngineConfig::default()
    });

    let first = engine
        .process(&registries, &observation("AAPL", ts(0), 100.0, 105.0, 600_000.0))
        .unwrap()
        .unwrap();
    assert_eq!(first.signals.len(), 1);

    let second = engine
        .process(&registries, &observation("AAPL", ts(10), 100.0, 105.0, 600_000.0))
        .unwrap()
        .unwrap();
    assert!(second.signals.is_empty());
    assert_eq!(second.matches.len(), 1);
    assert_eq!(second.suppressed, vec!["LOGIC-EXP-004"]);

    let third = engine
        .process(&registries, &observation("AAPL", ts(40), 100.0, 105.0, 600_000.0))
        .unwrap()
        .unwrap();
    assert_eq!(third.signals.len(), 1);
}

#[test]
fn test_out_of_order_observation_rejected() {
    let registries = scenario_registries(100.0);
    let mut engine = engine();

    engine
        .process(&registries, &observation("AAPL", ts(10), 100.0, 105.0, 100_000.0))
        .unwrap();
    let before = engine.window().entries("AAPL");

    let stale = observation("AAPL", ts(5), 105.0, 104.0, 900_000.0);
    let result = engine.process(&registries, &stale);
    assert!(matches!(result, Err(EngineError::OutOfOrder { .. })));
    assert_eq!(engine.window().entries("AAPL"), before);

    // same timestamp is accepted
    let same = observation("AAPL", ts(10), 105.0, 104.0, 900_000.0);
    assert!(engine.process(&registries, &same).unwrap().is_some());
}

#[test]
fn test_observation_outside_session_skipped() {
    let registries = scenario_registries(100.0);
    // ts(0) is 22:13:20 UTC
    let closed = TradingSession::new(
        NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        0,
    );
    let mut engine = engine_with(EngineConfig {
        session: Some(closed),
        ..EngineConfig::default()
    });
    let obs = observation("AAPL", ts(0), 100.0, 105.0, 600_000.0);
    assert!(engine.process(&registries, &obs).unwrap().is_none());
    assert!(engine.window().atoms("AAPL").is_empty());

    let open = TradingSession::new(
        NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        0,
    );
    let mut engine = engine_with(EngineConfig {
        session: Some(open),
        ..EngineConfig::default()
    });
    assert_eq!(engine.process(&registries, &obs).unwrap().unwrap().signals.len(), 1);
}

#[test]
fn test_window_capped_per_ticker() {
    let registries = scenario_registries(100.0);
    let mut engine = engine_with(EngineConfig {
        max_window_entries: 1,
        ..EngineConfig::default()
    });
    let obs = observation("AAPL", ts(0), 100.0, 105.0, 600_000.0);
    let report = engine.process(&registries, &obs).unwrap().unwrap();
    assert_eq!(report.fired.len(), 2);
    assert_eq!(engine.window().atoms("AAPL").len(), 1);
    assert!(report.signals.is_empty());
}
