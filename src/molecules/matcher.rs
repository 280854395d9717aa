//! Molecule matching against the active atom window

use crate::models::molecule::Molecule;
use crate::molecules::grade::GradeScale;
use crate::molecules::registry::MoleculeRegistry;
use crate::signals::window::ActiveAtomWindow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of checking one molecule against a set of active atoms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoleculeMatch {
    pub molecule_id: String,
    pub molecule_name: String,
    pub matched_atoms: BTreeSet<String>,
    pub unmatched_atoms: BTreeSet<String>,
    /// Percentage of required atoms present, 0-100
    pub ratio: f64,
    pub threshold: f64,
    pub grade: String,
    pub triggered: bool,
}

pub struct MoleculeMatcher;

impl MoleculeMatcher {
    /// Molecules triggered by the atoms active for `ticker`, in registry order.
    pub fn match_ticker(
        ticker: &str,
        window: &ActiveAtomWindow,
        registry: &MoleculeRegistry,
    ) -> Vec<MoleculeMatch> {
        Self::match_atoms(&window.atoms(ticker), registry)
    }

    /// Molecules triggered by `active`, in registry order.
    ///
    /// Each molecule is judged on its own; several may trigger on the same
    /// atoms. Callers wanting best-first must sort the result themselves.
    pub fn match_atoms(active: &BTreeSet<String>, registry: &MoleculeRegistry) -> Vec<MoleculeMatch> {
        Self::evaluate_all(active, registry)
            .into_iter()
            .filter(|m| m.triggered)
            .collect()
    }

    /// Every active molecule's evaluation, triggered or not.
    pub fn evaluate_all(active: &BTreeSet<String>, registry: &MoleculeRegistry) -> Vec<MoleculeMatch> {
        registry
            .all()
            .iter()
            .map(|molecule| Self::evaluate(molecule, active, registry.grades()))
            .collect()
    }

    pub fn evaluate(molecule: &Molecule, active: &BTreeSet<String>, grades: &GradeScale) -> MoleculeMatch {
        let (matched, unmatched): (Vec<&String>, Vec<&String>) = molecule
            .required_atoms
            .iter()
            .partition(|id| active.contains(id.as_str()));

        let present = matched.len() as f64;
        let required = molecule.required_atoms.len() as f64;
        let ratio = if required > 0.0 {
            present * 100.0 / required
        } else {
            0.0
        };
        let triggered = required > 0.0 && ratio >= molecule.match_threshold;

        MoleculeMatch {
            molecule_id: molecule.id.clone(),
            molecule_name: molecule.name.clone(),
            matched_atoms: matched.into_iter().cloned().collect(),
            unmatched_atoms: unmatched.into_iter().cloned().collect(),
            ratio,
            threshold: molecule.match_threshold,
            grade: grades.grade(ratio).to_string(),
            triggered,
        }
    }
}
