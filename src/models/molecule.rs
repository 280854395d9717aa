//! Molecule definitions and loaded molecules

use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status of a molecule definition. Only active molecules are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoleculeStatus {
    #[default]
    Active,
    Draft,
    Quarantined,
    Retired,
}

/// Molecule definition as supplied by the configuration loader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoleculeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(deserialize_with = "string_or_list")]
    pub required_atom_ids: Vec<String>,
    pub match_threshold_percent: f64,
    #[serde(default)]
    pub status: MoleculeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_sl_tp: Option<String>,
}

impl MoleculeDefinition {
    pub fn new<I, S>(
        id: impl Into<String>,
        name: impl Into<String>,
        required_atom_ids: I,
        match_threshold_percent: f64,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            required_atom_ids: required_atom_ids.into_iter().map(Into::into).collect(),
            match_threshold_percent,
            status: MoleculeStatus::Active,
            translation_notes: None,
            entry_sl_tp: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_status(mut self, status: MoleculeStatus) -> Self {
        self.status = status;
        self
    }
}

/// A validated, immutable molecule held by the registry.
///
/// `required_atoms` keeps definition order with duplicates removed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Molecule {
    pub id: String,
    pub name: String,
    pub category: String,
    pub required_atoms: Vec<String>,
    pub match_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_sl_tp: Option<String>,
}

/// Accept either a YAML/JSON list or the comma-separated form used by
/// spreadsheet exports ("CTX-009, TRG-008, STR-003").
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let ids = match Raw::deserialize(deserializer)? {
        Raw::List(list) => list,
        Raw::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}
