//! Error taxonomy for the signal engine
//!
//! Configuration errors are all-or-nothing: a registry that fails to load is
//! never used partially. Predicate errors are isolated to a single atom on a
//! single observation. Upstream errors belong to the market-data side and are
//! reported to the scan runtime, which decides whether to retry.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{kind} definition has an empty {field} (id: '{id}')")]
    EmptyField {
        kind: &'static str,
        field: &'static str,
        id: String,
    },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("atom '{id}' has no predicate")]
    MissingPredicate { id: String },

    #[error("atom '{id}' has an invalid predicate: {reason}")]
    InvalidPredicate { id: String, reason: String },

    #[error("molecule '{molecule_id}' references unknown atom '{atom_id}'")]
    UnknownAtom {
        molecule_id: String,
        atom_id: String,
    },

    #[error("molecule '{molecule_id}' has no required atoms")]
    EmptyRequiredAtoms { molecule_id: String },

    #[error("molecule '{molecule_id}' has match threshold {threshold} outside (0, 100]")]
    InvalidThreshold { molecule_id: String, threshold: f64 },

    #[error("invalid grade scale: {0}")]
    InvalidGradeScale(String),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("definition parse error: {0}")]
    Parse(String),

    #[error("invalid ticker symbol '{0}'")]
    InvalidTicker(String),

    #[error("invalid environment value {name}='{value}': {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure of a single predicate on a single observation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredicateError {
    #[error("observation has no field '{0}'")]
    MissingField(String),

    #[error("field '{field}' is not finite ({value})")]
    NonFinite { field: String, value: f64 },

    #[error("{0}")]
    Custom(String),
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("market data request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("market data provider returned status {status} for {ticker}")]
    Status { ticker: String, status: u16 },

    #[error("could not decode observation for {ticker}: {reason}")]
    Decode { ticker: String, reason: String },

    #[error("no observation available for {0}")]
    NoData(String),

    #[error("invalid market data URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("signal channel closed")]
    ChannelClosed,

    #[error("sink IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("observation for {ticker} at {received} is older than the last evaluated one ({last})")]
    OutOfOrder {
        ticker: String,
        last: DateTime<Utc>,
        received: DateTime<Utc>,
    },
}

/// Failures of scanner control operations (start, reload, analysis).
#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("no tickers to scan")]
    NoTickers,

    #[error("no definitions path configured")]
    NoDefinitionsPath,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
