//! Molecule registry

use crate::atoms::registry::AtomRegistry;
use crate::error::ConfigError;
use crate::models::molecule::{Molecule, MoleculeDefinition, MoleculeStatus};
use crate::molecules::grade::GradeScale;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Immutable table of active molecules, in definition order.
#[derive(Debug, Clone, Default)]
pub struct MoleculeRegistry {
    molecules: Vec<Molecule>,
    index: HashMap<String, usize>,
    grades: GradeScale,
}

impl MoleculeRegistry {
    pub fn load<I>(definitions: I, atoms: &AtomRegistry) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = MoleculeDefinition>,
    {
        Self::load_with_grades(definitions, atoms, GradeScale::default())
    }

    /// Validate every definition against `atoms` and build the registry.
    ///
    /// Every definition is validated whatever its status; only active ones
    /// are registered. Any failure aborts the whole load.
    pub fn load_with_grades<I>(
        definitions: I,
        atoms: &AtomRegistry,
        grades: GradeScale,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = MoleculeDefinition>,
    {
        let mut molecules = Vec::new();
        let mut index = HashMap::new();
        let mut seen = HashSet::new();

        for def in definitions {
            let id = def.id.trim().to_string();
            if id.is_empty() {
                return Err(ConfigError::EmptyField {
                    kind: "molecule",
                    field: "id",
                    id: def.id,
                });
            }
            if def.name.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    kind: "molecule",
                    field: "name",
                    id,
                });
            }
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateId {
                    kind: "molecule",
                    id,
                });
            }

            let mut required_atoms: Vec<String> = Vec::new();
            for atom_id in &def.required_atom_ids {
                let atom_id = atom_id.trim();
                if atom_id.is_empty() || required_atoms.iter().any(|a| a == atom_id) {
                    continue;
                }
                if !atoms.contains(atom_id) {
                    return Err(ConfigError::UnknownAtom {
                        molecule_id: id,
                        atom_id: atom_id.to_string(),
                    });
                }
                required_atoms.push(atom_id.to_string());
            }
            if required_atoms.is_empty() {
                return Err(ConfigError::EmptyRequiredAtoms { molecule_id: id });
            }

            let threshold = def.match_threshold_percent;
            if !threshold.is_finite() || threshold <= 0.0 || threshold > 100.0 {
                return Err(ConfigError::InvalidThreshold {
                    molecule_id: id,
                    threshold,
                });
            }

            if def.status != MoleculeStatus::Active {
                debug!(molecule_id = %id, status = ?def.status, "Skipping inactive molecule");
                continue;
            }

            index.insert(id.clone(), molecules.len());
            molecules.push(Molecule {
                id,
                name: def.name,
                category: def.category,
                required_atoms,
                match_threshold: threshold,
                translation_notes: def.translation_notes,
                entry_sl_tp: def.entry_sl_tp,
            });
        }

        Ok(Self {
            molecules,
            index,
            grades,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Molecule> {
        self.index.get(id).map(|&i| &self.molecules[i])
    }

    /// Active molecules in definition order
    pub fn all(&self) -> &[Molecule] {
        &self.molecules
    }

    pub fn grades(&self) -> &GradeScale {
        &self.grades
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }
}
