//! Atoms: named boolean predicates over a single observation.

pub mod evaluator;
pub mod predicate;
pub mod registry;

pub use evaluator::{AtomEvaluation, AtomEvaluator, PredicateWarning};
pub use predicate::{Comparison, Predicate, PredicateSpec};
pub use registry::AtomRegistry;
