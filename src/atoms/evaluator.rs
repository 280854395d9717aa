//! Atom evaluation against a single observation

use crate::atoms::registry::AtomRegistry;
use crate::error::PredicateError;
use crate::models::observation::Observation;
use std::collections::BTreeSet;
use tracing::warn;

/// Non-fatal failure of one atom's predicate
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateWarning {
    pub atom_id: String,
    pub error: PredicateError,
}

impl std::fmt::Display for PredicateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.atom_id, self.error)
    }
}

/// Result of running every atom against one observation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomEvaluation {
    pub fired: BTreeSet<String>,
    pub warnings: Vec<PredicateWarning>,
}

pub struct AtomEvaluator;

impl AtomEvaluator {
    /// Run every registered predicate against `observation`.
    ///
    /// A predicate error counts as "did not fire" for that atom and is
    /// returned as a warning; the remaining atoms are still evaluated.
    pub fn evaluate(observation: &Observation, registry: &AtomRegistry) -> AtomEvaluation {
        let mut evaluation = AtomEvaluation::default();

        for atom in registry.all() {
            match atom.predicate.evaluate(observation) {
                Ok(true) => {
                    evaluation.fired.insert(atom.id.clone());
                }
                Ok(false) => {}
                Err(error) => {
                    warn!(
                        ticker = %observation.ticker,
                        atom_id = %atom.id,
                        error = %error,
                        "Atom predicate failed, treating as not fired"
                    );
                    evaluation.warnings.push(PredicateWarning {
                        atom_id: atom.id.clone(),
                        error,
                    });
                }
            }
        }

        evaluation
    }
}
