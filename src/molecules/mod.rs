//! Molecules: composite rules over co-occurring atoms.

pub mod grade;
pub mod matcher;
pub mod registry;

pub use grade::{GradeBand, GradeScale};
pub use matcher::{MoleculeMatch, MoleculeMatcher};
pub use registry::MoleculeRegistry;
