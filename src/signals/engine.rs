//! Per-cycle signal pipeline: atoms, window, molecules, signals.

use crate::atoms::evaluator::{AtomEvaluator, PredicateWarning};
use crate::atoms::registry::AtomRegistry;
use crate::config::definitions::DefinitionSet;
use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError};
use crate::models::observation::Observation;
use crate::models::signal::Signal;
use crate::molecules::matcher::{MoleculeMatch, MoleculeMatcher};
use crate::molecules::registry::MoleculeRegistry;
use crate::signals::emitter::SignalEmitter;
use crate::signals::window::ActiveAtomWindow;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Atom and molecule registries loaded together.
///
/// Treated as an immutable snapshot: reloading builds a fresh `Registries`
/// and swaps the `Arc`, so in-flight cycles keep the snapshot they started with.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub atoms: AtomRegistry,
    pub molecules: MoleculeRegistry,
}

impl Registries {
    pub fn new(atoms: AtomRegistry, molecules: MoleculeRegistry) -> Self {
        Self { atoms, molecules }
    }

    pub fn from_definitions(set: DefinitionSet) -> Result<Self, ConfigError> {
        let grades = set.grades.unwrap_or_default().validated()?;
        let atoms = AtomRegistry::load(set.atoms)?;
        let molecules = MoleculeRegistry::load_with_grades(set.molecules, &atoms, grades)?;
        Ok(Self { atoms, molecules })
    }
}

/// What one observation produced
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub ticker: String,
    pub observed_at: DateTime<Utc>,
    pub fired: BTreeSet<String>,
    pub warnings: Vec<PredicateWarning>,
    pub matches: Vec<MoleculeMatch>,
    pub signals: Vec<Signal>,
    /// Molecules that matched but were held back by the cooldown
    pub suppressed: Vec<String>,
}

/// Runs observations through evaluation, windowing, matching and emission.
///
/// Owns the atom window (and cooldown bookkeeping) of the tickers it is fed;
/// give each concurrent task its own engine.
pub struct SignalEngine {
    config: EngineConfig,
    window: ActiveAtomWindow,
    emitter: Arc<SignalEmitter>,
    last_observed: HashMap<String, DateTime<Utc>>,
    last_triggered: HashMap<(String, String), DateTime<Utc>>,
}

impl SignalEngine {
    pub fn new(config: EngineConfig, emitter: Arc<SignalEmitter>) -> Self {
        let window = ActiveAtomWindow::new(config.window_ttl, config.max_window_entries);
        Self {
            config,
            window,
            emitter,
            last_observed: HashMap::new(),
            last_triggered: HashMap::new(),
        }
    }

    pub fn window(&self) -> &ActiveAtomWindow {
        &self.window
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one observation.
    ///
    /// Returns `Ok(None)` when the observation falls outside the configured
    /// trading session. Observations older than the last one seen for the
    /// same ticker are rejected and leave all state untouched.
    pub fn process(
        &mut self,
        registries: &Registries,
        observation: &Observation,
    ) -> Result<Option<CycleReport>, EngineError> {
        let ticker = observation.ticker.as_str();
        let now = observation.timestamp;

        if let Some(&last) = self.last_observed.get(ticker) {
            if now < last {
                return Err(EngineError::OutOfOrder {
                    ticker: ticker.to_string(),
                    last,
                    received: now,
                });
            }
        }

        if let Some(session) = &self.config.session {
            if !session.contains(now) {
                debug!(ticker = %ticker, timestamp = %now, "Observation outside trading session");
                return Ok(None);
            }
        }
        self.last_observed.insert(ticker.to_string(), now);

        let expired = self.window.expire(ticker, now);
        let evaluation = AtomEvaluator::evaluate(observation, &registries.atoms);
        self.window.record(ticker, &evaluation.fired, now);

        let matches = MoleculeMatcher::match_ticker(ticker, &self.window, &registries.molecules);

        let mut signals = Vec::new();
        let mut suppressed = Vec::new();
        for matched in &matches {
            let key = (ticker.to_string(), matched.molecule_id.clone());
            if self.cooling_down(&key, now) {
                suppressed.push(matched.molecule_id.clone());
                continue;
            }
            self.last_triggered.insert(key, now);
            signals.push(self.emitter.emit(matched, ticker, observation));
        }

        debug!(
            ticker = %ticker,
            fired = evaluation.fired.len(),
            expired = expired,
            active = self.window.atoms(ticker).len(),
            matches = matches.len(),
            signals = signals.len(),
            suppressed = suppressed.len(),
            "Cycle evaluated for {}",
            ticker
        );

        Ok(Some(CycleReport {
            ticker: ticker.to_string(),
            observed_at: now,
            fired: evaluation.fired,
            warnings: evaluation.warnings,
            matches,
            signals,
            suppressed,
        }))
    }

    fn cooling_down(&self, key: &(String, String), now: DateTime<Utc>) -> bool {
        let Some(cooldown) = self.config.cooldown else {
            return false;
        };
        match self.last_triggered.get(key) {
            Some(&last) => (now - last).to_std().map_or(true, |elapsed| elapsed < cooldown),
            None => false,
        }
    }
}
