//! Atom registry

use crate::error::ConfigError;
use crate::models::atom::{Atom, AtomCategory, AtomDefinition};
use std::collections::HashMap;

/// Immutable table of validated atoms, in definition order.
///
/// A registry is built in one shot by [`AtomRegistry::load`]; reloading means
/// building a new registry and swapping it in, never editing this one.
#[derive(Debug, Clone, Default)]
pub struct AtomRegistry {
    atoms: Vec<Atom>,
    index: HashMap<String, usize>,
}

impl AtomRegistry {
    /// Validate every definition and build the registry.
    ///
    /// Fails on the first empty id/name, duplicate id, missing predicate or
    /// structurally invalid predicate. No partial registry is returned.
    pub fn load<I>(definitions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = AtomDefinition>,
    {
        let mut atoms = Vec::new();
        let mut index = HashMap::new();

        for def in definitions {
            let id = def.id.trim().to_string();
            if id.is_empty() {
                return Err(ConfigError::EmptyField {
                    kind: "atom",
                    field: "id",
                    id: def.id,
                });
            }
            if def.name.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    kind: "atom",
                    field: "name",
                    id,
                });
            }
            if index.contains_key(&id) {
                return Err(ConfigError::DuplicateId { kind: "atom", id });
            }
            let predicate = def
                .predicate_spec
                .ok_or_else(|| ConfigError::MissingPredicate { id: id.clone() })?;
            if let Some(spec) = predicate.spec() {
                spec.validate()
                    .map_err(|reason| ConfigError::InvalidPredicate {
                        id: id.clone(),
                        reason,
                    })?;
            }

            index.insert(id.clone(), atoms.len());
            atoms.push(Atom {
                id,
                name: def.name,
                category: def.category,
                predicate,
                description: def.description,
                timeframe: def.timeframe,
                source_reference: def.source_reference,
            });
        }

        Ok(Self { atoms, index })
    }

    pub fn get(&self, id: &str) -> Option<&Atom> {
        self.index.get(id).map(|&i| &self.atoms[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All atoms in definition order
    pub fn all(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn by_category(&self, category: AtomCategory) -> impl Iterator<Item = &Atom> {
        self.atoms.iter().filter(move |a| a.category == category)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
