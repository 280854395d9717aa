//! Atom/molecule definition documents
//!
//! Definitions are plain YAML (JSON is accepted too, being a YAML subset):
//!
//! ```yaml
//! atoms:
//!   - id: STR-003
//!     name: Bullish candle
//!     category: Structural
//!     predicateSpec: { type: CompareFields, left: close, comparison: GreaterThan, right: open }
//! molecules:
//!   - id: LOGIC-EXP-004
//!     name: First pullback
//!     requiredAtomIds: [STR-003, TRG-003]
//!     matchThresholdPercent: 100
//! ```

use crate::error::ConfigError;
use crate::models::atom::AtomDefinition;
use crate::models::molecule::MoleculeDefinition;
use crate::molecules::grade::GradeScale;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionSet {
    #[serde(default)]
    pub atoms: Vec<AtomDefinition>,
    #[serde(default)]
    pub molecules: Vec<MoleculeDefinition>,
    #[serde(default)]
    pub grades: Option<GradeScale>,
}

/// Load a definition document from disk.
///
/// Only parses; registries do the semantic validation when they are built
/// from the returned set.
pub fn load_definitions(path: &Path) -> Result<DefinitionSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&content)
        .map_err(|e| ConfigError::Parse(format!("'{}': {}", path.display(), e)))
}

/// Load a definition document from a string (useful for testing)
pub fn load_definitions_from_str(content: &str) -> Result<DefinitionSet, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
}
