//! Unit tests for signal sinks

use crate::common_fixtures::ts;
use sigmatch::error::SinkError;
use sigmatch::models::signal::Signal;
use sigmatch::signals::sink::{ChannelSink, JsonLinesSink, LogSink, RecentSignals, SignalSink};

fn signal(id: u64, ticker: &str) -> Signal {
    Signal {
        id,
        ticker: ticker.to_string(),
        molecule_id: "LOGIC-EXP-004".to_string(),
        molecule_name: "First pullback".to_string(),
        matched_atom_ids: vec!["STR-003".to_string(), "TRG-003".to_string()],
        match_ratio: 100.0,
        grade: "A++".to_string(),
        price: 105.0,
        observed_at: ts(0),
        triggered_at: ts(1),
    }
}

#[tokio::test]
async fn test_log_sink_accepts() {
    assert!(LogSink.publish(&signal(1, "AAPL")).await.is_ok());
}

#[tokio::test]
async fn test_channel_sink_forwards() {
    let (sink, mut rx) = ChannelSink::new(4);
    sink.publish(&signal(1, "AAPL")).await.unwrap();
    assert_eq!(rx.recv().await.unwrap().id, 1);

    drop(rx);
    assert!(matches!(
        sink.publish(&signal(2, "AAPL")).await,
        Err(SinkError::ChannelClosed)
    ));
}

#[tokio::test]
async fn test_jsonl_sink_appends_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signals.jsonl");
    let sink = JsonLinesSink::new(&path);

    sink.publish(&signal(1, "AAPL")).await.unwrap();
    sink.publish(&signal(2, "TSLA")).await.unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let second: Signal = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second, signal(2, "TSLA"));
    assert!(lines[0].contains("\"moleculeId\":\"LOGIC-EXP-004\""));
}

#[tokio::test]
async fn test_recent_signals_newest_first_and_bounded() {
    let recent = RecentSignals::new(3);
    for (id, ticker) in [(1, "AAPL"), (2, "TSLA"), (3, "AAPL"), (4, "AAPL")] {
        recent.publish(&signal(id, ticker)).await.unwrap();
    }

    assert_eq!(recent.len().await, 3);
    let ids: Vec<u64> = recent.recent(None).await.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![4, 3, 2]);
    let aapl: Vec<u64> = recent.recent(Some("AAPL")).await.iter().map(|s| s.id).collect();
    assert_eq!(aapl, vec![4, 3]);
}
