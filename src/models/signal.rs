//! Emitted signal records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A molecule trigger event for one ticker.
///
/// Built once by the emitter and handed to sinks; nothing in the engine keeps
/// or mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: u64,
    pub ticker: String,
    pub molecule_id: String,
    pub molecule_name: String,
    pub matched_atom_ids: Vec<String>,
    pub match_ratio: f64,
    pub grade: String,
    /// Close of the observation that completed the match
    pub price: f64,
    pub observed_at: DateTime<Utc>,
    pub triggered_at: DateTime<Utc>,
}
