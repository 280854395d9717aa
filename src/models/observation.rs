//! Point-in-time market readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One market reading for a ticker.
///
/// `open`, `close` and `volume` are always present. `high`/`low` and any
/// named indicator values (moving averages, RSI, VWAP, ...) are optional and
/// supplied by whichever collaborator produced the reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indicators: BTreeMap<String, f64>,
}

impl Observation {
    pub fn new(
        ticker: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            timestamp,
            open,
            close,
            volume,
            high: None,
            low: None,
            indicators: BTreeMap::new(),
        }
    }

    pub fn with_range(mut self, high: f64, low: f64) -> Self {
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    pub fn with_indicator(mut self, name: impl Into<String>, value: f64) -> Self {
        self.indicators.insert(name.into(), value);
        self
    }

    /// Look up a field by name. Core fields shadow indicators of the same name.
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "open" => Some(self.open),
            "close" => Some(self.close),
            "volume" => Some(self.volume),
            "high" => self.high,
            "low" => self.low,
            other => self.indicators.get(other).copied(),
        }
    }
}
