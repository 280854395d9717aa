//! Process configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded by
//! the binaries). Atom and molecule definitions live in a separate YAML
//! document, see [`definitions`].

pub mod definitions;

use crate::core::runtime::RuntimeConfig;
use crate::core::scheduler::ScanSchedule;
use crate::error::ConfigError;
use crate::signals::session::TradingSession;
use chrono::NaiveTime;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

pub use definitions::{load_definitions, load_definitions_from_str, DefinitionSet};

pub const DEFAULT_DEFINITIONS_PATH: &str = "config/definitions.yaml";
pub const DEFAULT_MAX_WINDOW_ENTRIES: usize = 200;
pub const MAX_TICKER_LEN: usize = 15;

/// Deployment environment name (`ENVIRONMENT`, default `sandbox`)
pub fn get_environment() -> String {
    std::env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Tuning of the per-cycle matching pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How long a fired atom stays in its ticker's window
    pub window_ttl: Duration,
    pub max_window_entries: usize,
    /// Minimum gap between two signals of the same molecule for one ticker
    pub cooldown: Option<Duration>,
    pub session: Option<TradingSession>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_ttl: Duration::from_secs(60),
            max_window_entries: DEFAULT_MAX_WINDOW_ENTRIES,
            cooldown: None,
            session: None,
        }
    }
}

impl EngineConfig {
    /// Read engine settings. `default_ttl` applies when `WINDOW_TTL_SECONDS`
    /// is unset, normally the scan interval.
    pub fn from_lookup<F>(lookup: &F, default_ttl: Duration) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let window_ttl = Duration::from_secs(parse_var(
            lookup,
            "WINDOW_TTL_SECONDS",
            default_ttl.as_secs(),
        )?);
        let max_window_entries =
            parse_var(lookup, "MAX_WINDOW_ENTRIES", DEFAULT_MAX_WINDOW_ENTRIES)?;
        if max_window_entries == 0 {
            return Err(ConfigError::InvalidEnv {
                name: "MAX_WINDOW_ENTRIES",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let cooldown_secs: u64 = parse_var(lookup, "SIGNAL_COOLDOWN_SECONDS", 0)?;
        let cooldown = (cooldown_secs > 0).then(|| Duration::from_secs(cooldown_secs));

        let session = match (lookup("SESSION_START"), lookup("SESSION_END")) {
            (Some(start), Some(end)) => Some(TradingSession::new(
                parse_time("SESSION_START", &start)?,
                parse_time("SESSION_END", &end)?,
                parse_var(lookup, "SESSION_UTC_OFFSET_MINUTES", 0)?,
            )),
            (None, None) => None,
            (Some(value), None) | (None, Some(value)) => {
                return Err(ConfigError::InvalidEnv {
                    name: "SESSION_START/SESSION_END",
                    value,
                    reason: "both ends of the session must be set".to_string(),
                })
            }
        };

        Ok(Self {
            window_ttl,
            max_window_entries,
            cooldown,
            session,
        })
    }
}

/// Full configuration of a scanner process
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub port: u16,
    pub definitions_path: String,
    pub market_data_url: Option<String>,
    pub signal_log_path: Option<String>,
    pub runtime: RuntimeConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name: &str| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RuntimeConfig::default();
        let scan_interval_seconds: u64 =
            parse_var(lookup, "SCAN_INTERVAL_SECONDS", defaults.scan_interval_seconds)?;
        ScanSchedule::new(scan_interval_seconds)?;
        let tickers = lookup("TICKERS")
            .map(|s| parse_tickers(&s))
            .transpose()?
            .unwrap_or_default();
        let fetch_max_retries = parse_var(lookup, "FETCH_MAX_RETRIES", defaults.fetch_max_retries)?;

        let engine = EngineConfig::from_lookup(lookup, Duration::from_secs(scan_interval_seconds))?;

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "sandbox".to_string()),
            port: parse_var(lookup, "PORT", 8080)?,
            definitions_path: lookup("DEFINITIONS_PATH")
                .unwrap_or_else(|| DEFAULT_DEFINITIONS_PATH.to_string()),
            market_data_url: lookup("MARKET_DATA_URL").filter(|s| !s.trim().is_empty()),
            signal_log_path: lookup("SIGNAL_LOG_PATH").filter(|s| !s.trim().is_empty()),
            runtime: RuntimeConfig {
                scan_interval_seconds,
                tickers,
                fetch_max_retries,
            },
            engine,
        })
    }
}

/// Split a comma-separated watchlist, dropping blanks and upper-casing symbols.
pub fn parse_tickers(raw: &str) -> Result<Vec<String>, ConfigError> {
    normalize_tickers(raw.split(','))
}

/// Normalize and dedupe symbols, keeping first-seen order. Blank entries are
/// skipped; anything else that is not a valid symbol fails the whole list.
pub fn normalize_tickers<I, S>(symbols: I) -> Result<Vec<String>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tickers: Vec<String> = Vec::new();
    for symbol in symbols {
        if symbol.as_ref().trim().is_empty() {
            continue;
        }
        let ticker = normalize_ticker(symbol.as_ref())?;
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    Ok(tickers)
}

/// Upper-case `raw` and check it is a plain symbol: up to
/// [`MAX_TICKER_LEN`] of `A-Z`, `0-9`, `.` and `-`, starting alphanumeric.
pub fn normalize_ticker(raw: &str) -> Result<String, ConfigError> {
    let ticker = raw.trim().to_uppercase();
    let valid = ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric())
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
    if valid {
        Ok(ticker)
    } else {
        Err(ConfigError::InvalidTicker(raw.to_string()))
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnv {
                    name,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

fn parse_time(name: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| ConfigError::InvalidEnv {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
