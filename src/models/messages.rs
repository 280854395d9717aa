//! Boundary messages between the scanner and its clients
//!
//! Commands are decoded once at the edge into [`ScannerCommand`]; everything
//! the scanner reports goes out as a [`ScannerEvent`].

use crate::models::signal::Signal;
use crate::molecules::matcher::MoleculeMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScannerCommand {
    StartScanner { tickers: Vec<String> },
    StopScanner,
    RequestAnalysis { ticker: String },
    ReloadDefinitions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScannerEvent {
    SystemStatus {
        running: bool,
        tickers: Vec<String>,
        message: String,
    },
    AtomsFired {
        ticker: String,
        atom_ids: Vec<String>,
        observed_at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    MoleculeSignal {
        signal: Signal,
    },
    AnalysisResult {
        ticker: String,
        fired: Vec<String>,
        evaluations: Vec<MoleculeMatch>,
    },
    Error {
        message: String,
    },
}

impl ScannerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ScannerEvent::Error {
            message: message.into(),
        }
    }
}
