//! Plain data records shared across the engine layers.

pub mod atom;
pub mod messages;
pub mod molecule;
pub mod observation;
pub mod signal;

pub use atom::{Atom, AtomCategory, AtomDefinition, AtomSummary};
pub use messages::{ScannerCommand, ScannerEvent};
pub use molecule::{Molecule, MoleculeDefinition, MoleculeStatus};
pub use observation::Observation;
pub use signal::Signal;
