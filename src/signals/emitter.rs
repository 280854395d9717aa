//! Signal construction

use crate::models::observation::Observation;
use crate::models::signal::Signal;
use crate::molecules::matcher::MoleculeMatch;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Builds signals with a monotonically increasing id.
///
/// Shareable across tasks; ids stay unique for the emitter's lifetime.
#[derive(Debug)]
pub struct SignalEmitter {
    next_id: AtomicU64,
}

impl SignalEmitter {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first_id: u64) -> Self {
        Self {
            next_id: AtomicU64::new(first_id),
        }
    }

    pub fn emit(&self, matched: &MoleculeMatch, ticker: &str, observation: &Observation) -> Signal {
        self.emit_at(matched, ticker, observation, Utc::now())
    }

    pub fn emit_at(
        &self,
        matched: &MoleculeMatch,
        ticker: &str,
        observation: &Observation,
        triggered_at: DateTime<Utc>,
    ) -> Signal {
        Signal {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            ticker: ticker.to_string(),
            molecule_id: matched.molecule_id.clone(),
            molecule_name: matched.molecule_name.clone(),
            matched_atom_ids: matched.matched_atoms.iter().cloned().collect(),
            match_ratio: matched.ratio,
            grade: matched.grade.clone(),
            price: observation.close,
            observed_at: observation.timestamp,
            triggered_at,
        }
    }
}

impl Default for SignalEmitter {
    fn default() -> Self {
        Self::new()
    }
}
