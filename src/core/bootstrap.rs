//! Wiring shared by the binaries

use crate::config::{load_definitions, AppConfig};
use crate::core::runtime::Scanner;
use crate::metrics::Metrics;
use crate::services::http_provider::HttpMarketDataProvider;
use crate::services::market_data::{MarketDataProvider, ReplayMarketDataProvider};
use crate::signals::engine::Registries;
use crate::signals::sink::{JsonLinesSink, LogSink, RecentSignals};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const RECENT_SIGNAL_CAPACITY: usize = 500;

pub struct Bootstrapped {
    pub scanner: Arc<Scanner>,
    pub recent: Arc<RecentSignals>,
    pub metrics: Arc<Metrics>,
}

/// Load definitions, pick the market-data provider and attach sinks.
///
/// Fails if the definitions do not validate; a scanner never starts on a
/// partially loaded registry.
pub fn build_scanner(config: &AppConfig) -> Result<Bootstrapped, Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);

    info!(path = %config.definitions_path, "Loading definitions");
    let set = load_definitions(Path::new(&config.definitions_path))?;
    let registries = Registries::from_definitions(set)?;
    info!(
        atoms = registries.atoms.len(),
        molecules = registries.molecules.len(),
        "Loaded {} atoms and {} active molecules",
        registries.atoms.len(),
        registries.molecules.len()
    );

    let provider: Arc<dyn MarketDataProvider> = match &config.market_data_url {
        Some(url) => {
            info!(url = %url, "Using HTTP market data provider");
            Arc::new(HttpMarketDataProvider::new(url)?)
        }
        None => {
            warn!("MARKET_DATA_URL not set - using an empty replay provider, no observations will arrive");
            Arc::new(ReplayMarketDataProvider::new())
        }
    };

    let recent = Arc::new(RecentSignals::new(RECENT_SIGNAL_CAPACITY));
    let mut scanner = Scanner::new(
        config.runtime.clone(),
        config.engine.clone(),
        registries,
        provider,
    )
    .with_sink(Arc::new(LogSink))
    .with_sink(recent.clone())
    .with_metrics(metrics.clone())
    .with_definitions_path(&config.definitions_path);

    if let Some(path) = &config.signal_log_path {
        info!(path = %path, "Appending signals as JSON lines");
        scanner = scanner.with_sink(Arc::new(JsonLinesSink::new(path)));
    }

    Ok(Bootstrapped {
        scanner: Arc::new(scanner),
        recent,
        metrics,
    })
}
