//! Atom/molecule signal matching engine
//!
//! Atoms are named boolean predicates over a ticker's latest observation.
//! Atoms that fire are remembered per ticker for a bounded window; a
//! molecule triggers when enough of its required atoms are present in that
//! window at the same time, and every trigger becomes a [`Signal`].

pub mod atoms;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod molecules;
pub mod services;
pub mod signals;

pub use error::{ConfigError, EngineError, PredicateError, ScannerError, SinkError, UpstreamError};
pub use models::signal::Signal;
