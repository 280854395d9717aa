//! Signal sinks: where emitted signals go once the engine is done with them

use crate::error::SinkError;
use crate::models::signal::Signal;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::info;

#[async_trait]
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(&self, signal: &Signal) -> Result<(), SinkError>;
}

/// Writes every signal to the tracing log
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn publish(&self, signal: &Signal) -> Result<(), SinkError> {
        info!(
            signal_id = signal.id,
            ticker = %signal.ticker,
            molecule_id = %signal.molecule_id,
            grade = %signal.grade,
            match_ratio = signal.match_ratio,
            atoms = ?signal.matched_atom_ids,
            "Signal: {} matched {} ({:.1}%, grade {})",
            signal.ticker,
            signal.molecule_id,
            signal.match_ratio,
            signal.grade
        );
        Ok(())
    }
}

/// Forwards signals into a bounded tokio channel
pub struct ChannelSink {
    tx: mpsc::Sender<Signal>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Signal>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl SignalSink for ChannelSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn publish(&self, signal: &Signal) -> Result<(), SinkError> {
        self.tx
            .send(signal.clone())
            .await
            .map_err(|_| SinkError::ChannelClosed)
    }
}

/// Appends signals as JSON lines to a file
pub struct JsonLinesSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl SignalSink for JsonLinesSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn publish(&self, signal: &Signal) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(signal)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Keeps the most recent signals in memory for the HTTP API
pub struct RecentSignals {
    capacity: usize,
    signals: RwLock<VecDeque<Signal>>,
}

impl RecentSignals {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            signals: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Newest first, optionally restricted to one ticker
    pub async fn recent(&self, ticker: Option<&str>) -> Vec<Signal> {
        let signals = self.signals.read().await;
        signals
            .iter()
            .rev()
            .filter(|s| ticker.map_or(true, |t| s.ticker == t))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.signals.read().await.len()
    }
}

#[async_trait]
impl SignalSink for RecentSignals {
    fn name(&self) -> &'static str {
        "recent"
    }

    async fn publish(&self, signal: &Signal) -> Result<(), SinkError> {
        let mut signals = self.signals.write().await;
        if signals.len() == self.capacity {
            signals.pop_front();
        }
        signals.push_back(signal.clone());
        Ok(())
    }
}
