//! Atom definitions and loaded atoms

use crate::atoms::predicate::{Predicate, PredicateSpec};
use serde::{Deserialize, Serialize};

/// Descriptive atom/molecule category. Not enforced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AtomCategory {
    Context,
    Structural,
    Trigger,
    Derived,
}

/// Atom definition as supplied by the configuration loader
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomDefinition {
    pub id: String,
    pub name: String,
    pub category: AtomCategory,
    #[serde(default, alias = "predicate")]
    pub predicate_spec: Option<Predicate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub source_reference: Option<String>,
}

impl AtomDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: AtomCategory,
        predicate: impl Into<Predicate>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            predicate_spec: Some(predicate.into()),
            description: None,
            timeframe: None,
            source_reference: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }
}

/// A validated, immutable atom held by the registry.
#[derive(Debug, Clone)]
pub struct Atom {
    pub id: String,
    pub name: String,
    pub category: AtomCategory,
    pub predicate: Predicate,
    pub description: Option<String>,
    pub timeframe: Option<String>,
    pub source_reference: Option<String>,
}

/// Serializable view of an atom for API listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomSummary {
    pub id: String,
    pub name: String,
    pub category: AtomCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate_spec: Option<PredicateSpec>,
    pub native: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

impl From<&Atom> for AtomSummary {
    fn from(atom: &Atom) -> Self {
        Self {
            id: atom.id.clone(),
            name: atom.name.clone(),
            category: atom.category,
            predicate_spec: atom.predicate.spec().cloned(),
            native: atom.predicate.spec().is_none(),
            description: atom.description.clone(),
            timeframe: atom.timeframe.clone(),
        }
    }
}
