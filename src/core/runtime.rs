//! Scan runtime: one task per ticker, paced by the scan schedule

use crate::atoms::evaluator::AtomEvaluator;
use crate::config::{
    load_definitions, normalize_ticker, normalize_tickers, DefinitionSet, EngineConfig,
};
use crate::core::scheduler::ScanSchedule;
use crate::error::{ScannerError, UpstreamError};
use crate::metrics::Metrics;
use crate::models::messages::{ScannerCommand, ScannerEvent};
use crate::models::observation::Observation;
use crate::molecules::matcher::MoleculeMatcher;
use crate::services::market_data::MarketDataProvider;
use crate::signals::emitter::SignalEmitter;
use crate::signals::engine::{CycleReport, Registries, SignalEngine};
use crate::signals::sink::SignalSink;
use backon::{ExponentialBuilder, Retryable};
use futures_util::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 256;

/// Configuration for the scan runtime
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub scan_interval_seconds: u64,
    /// Watchlist used when a start request names no tickers
    pub tickers: Vec<String>,
    pub fetch_max_retries: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scan_interval_seconds: 60,
            tickers: Vec::new(),
            fetch_max_retries: 3,
        }
    }
}

/// Everything a ticker task needs, cheap to clone into each task
#[derive(Clone)]
struct ScanContext {
    registries: Arc<RwLock<Arc<Registries>>>,
    provider: Arc<dyn MarketDataProvider>,
    sinks: Vec<Arc<dyn SignalSink>>,
    emitter: Arc<SignalEmitter>,
    engine_config: EngineConfig,
    metrics: Option<Arc<Metrics>>,
    events: broadcast::Sender<ScannerEvent>,
    fetch_max_retries: usize,
}

struct RunningScan {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    tickers: Vec<String>,
}

/// Periodically evaluates a watchlist of tickers.
///
/// Each ticker gets its own task and its own [`SignalEngine`], so windows
/// never mix between tickers and no lock is held across a cycle. The
/// registry snapshot is read once per cycle.
pub struct Scanner {
    config: RuntimeConfig,
    ctx: ScanContext,
    definitions_path: Option<PathBuf>,
    running: Mutex<Option<RunningScan>>,
}

impl Scanner {
    pub fn new(
        config: RuntimeConfig,
        engine_config: EngineConfig,
        registries: Registries,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let fetch_max_retries = config.fetch_max_retries;
        Self {
            config,
            ctx: ScanContext {
                registries: Arc::new(RwLock::new(Arc::new(registries))),
                provider,
                sinks: Vec::new(),
                emitter: Arc::new(SignalEmitter::new()),
                engine_config,
                metrics: None,
                events,
                fetch_max_retries,
            },
            definitions_path: None,
            running: Mutex::new(None),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
        self.ctx.sinks.push(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.ctx.metrics = Some(metrics);
        self
    }

    /// File re-read by [`ScannerCommand::ReloadDefinitions`]
    pub fn with_definitions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.definitions_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current registry snapshot
    pub async fn registries(&self) -> Arc<Registries> {
        self.ctx.registries.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScannerEvent> {
        self.ctx.events.subscribe()
    }

    /// Fresh engine sharing this scanner's emitter and engine settings
    pub fn engine(&self) -> SignalEngine {
        SignalEngine::new(self.ctx.engine_config.clone(), self.ctx.emitter.clone())
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    pub async fn tickers(&self) -> Vec<String> {
        self.running
            .lock()
            .await
            .as_ref()
            .map(|r| r.tickers.clone())
            .unwrap_or_default()
    }

    /// Start scanning `tickers` (or the configured watchlist when empty).
    ///
    /// A running scan is stopped first, so this also switches watchlists.
    pub async fn start(&self, tickers: Vec<String>) -> Result<Vec<String>, ScannerError> {
        let tickers = if tickers.is_empty() {
            self.config.tickers.clone()
        } else {
            normalize_tickers(&tickers)?
        };
        if tickers.is_empty() {
            return Err(ScannerError::NoTickers);
        }
        let schedule = ScanSchedule::new(self.config.scan_interval_seconds)?;

        let mut running = self.running.lock().await;
        if let Some(previous) = running.take() {
            info!(tickers = ?previous.tickers, "Scanner: restarting with a new watchlist");
            shutdown(previous).await;
        }

        let cancel = CancellationToken::new();
        let handles: Vec<JoinHandle<()>> = tickers
            .iter()
            .map(|ticker| {
                tokio::spawn(run_ticker(
                    self.ctx.clone(),
                    ticker.clone(),
                    schedule.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        if let Some(metrics) = &self.ctx.metrics {
            metrics.active_tickers.set(tickers.len() as i64);
        }
        info!(
            tickers = ?tickers,
            interval = self.config.scan_interval_seconds,
            cron = %schedule.expression(),
            "Scanner: started for {} tickers (cron: {})",
            tickers.len(),
            schedule.expression()
        );

        *running = Some(RunningScan {
            cancel,
            handles,
            tickers: tickers.clone(),
        });
        Ok(tickers)
    }

    /// Stop all ticker tasks. Returns `false` if nothing was running.
    pub async fn stop(&self) -> bool {
        let previous = self.running.lock().await.take();
        let Some(previous) = previous else {
            return false;
        };
        shutdown(previous).await;
        if let Some(metrics) = &self.ctx.metrics {
            metrics.active_tickers.set(0);
        }
        info!("Scanner: stopped");
        true
    }

    /// Validate `set` completely, then swap it in. On error the current
    /// registries stay in place.
    pub async fn reload(&self, set: DefinitionSet) -> Result<Arc<Registries>, ScannerError> {
        let registries = Arc::new(Registries::from_definitions(set)?);
        *self.ctx.registries.write().await = registries.clone();
        info!(
            atoms = registries.atoms.len(),
            molecules = registries.molecules.len(),
            "Scanner: definitions reloaded"
        );
        Ok(registries)
    }

    /// Re-read the definitions file and [`reload`](Self::reload) it
    pub async fn reload_from_disk(&self) -> Result<Arc<Registries>, ScannerError> {
        let path = self
            .definitions_path
            .as_ref()
            .ok_or(ScannerError::NoDefinitionsPath)?;
        let set = load_definitions(path)?;
        self.reload(set).await
    }

    /// Evaluate one fresh observation against every molecule without
    /// touching any window or emitting signals.
    pub async fn analyze(&self, ticker: &str) -> Result<ScannerEvent, ScannerError> {
        let ticker = normalize_ticker(ticker)?;
        let observation = self.ctx.fetch(&ticker).await?;
        let registries = self.registries().await;

        let evaluation = AtomEvaluator::evaluate(&observation, &registries.atoms);
        let evaluations = MoleculeMatcher::evaluate_all(&evaluation.fired, &registries.molecules);

        Ok(ScannerEvent::AnalysisResult {
            ticker,
            fired: evaluation.fired.into_iter().collect(),
            evaluations,
        })
    }

    /// Run one cycle for `ticker` on `engine`, outside the schedule
    pub async fn run_cycle(&self, engine: &mut SignalEngine, ticker: &str) -> Option<CycleReport> {
        self.ctx.run_cycle(engine, ticker).await
    }

    pub async fn handle_command(&self, command: ScannerCommand) -> ScannerEvent {
        let event = match command {
            ScannerCommand::StartScanner { tickers } => match self.start(tickers).await {
                Ok(tickers) => ScannerEvent::SystemStatus {
                    running: true,
                    message: format!("Scanner started for {} tickers", tickers.len()),
                    tickers,
                },
                Err(e) => ScannerEvent::error(e.to_string()),
            },
            ScannerCommand::StopScanner => {
                let was_running = self.stop().await;
                ScannerEvent::SystemStatus {
                    running: false,
                    tickers: Vec::new(),
                    message: if was_running {
                        "Scanner stopped".to_string()
                    } else {
                        "Scanner was not running".to_string()
                    },
                }
            }
            ScannerCommand::RequestAnalysis { ticker } => match self.analyze(&ticker).await {
                Ok(result) => result,
                Err(e) => ScannerEvent::error(format!("Analysis failed: {}", e)),
            },
            ScannerCommand::ReloadDefinitions => match self.reload_from_disk().await {
                Ok(registries) => ScannerEvent::SystemStatus {
                    running: self.is_running().await,
                    tickers: self.tickers().await,
                    message: format!(
                        "Definitions reloaded: {} atoms, {} molecules",
                        registries.atoms.len(),
                        registries.molecules.len()
                    ),
                },
                Err(e) => ScannerEvent::error(format!("Reload failed: {}", e)),
            },
        };

        if matches!(event, ScannerEvent::SystemStatus { .. }) {
            let _ = self.ctx.events.send(event.clone());
        }
        event
    }
}

async fn shutdown(scan: RunningScan) {
    scan.cancel.cancel();
    for result in join_all(scan.handles).await {
        if let Err(e) = result {
            error!(error = %e, "Scanner: ticker task failed");
        }
    }
}

async fn run_ticker(
    ctx: ScanContext,
    ticker: String,
    schedule: ScanSchedule,
    cancel: CancellationToken,
) {
    let mut engine = SignalEngine::new(ctx.engine_config.clone(), ctx.emitter.clone());
    debug!(ticker = %ticker, "Scanner: task started for {}", ticker);

    loop {
        let Some(delay) = schedule.next_delay() else {
            warn!(ticker = %ticker, "Scanner: schedule exhausted");
            break;
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        ctx.run_cycle(&mut engine, &ticker).await;
    }

    debug!(ticker = %ticker, "Scanner: task stopped for {}", ticker);
}

impl ScanContext {
    async fn fetch(&self, ticker: &str) -> Result<Observation, UpstreamError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(self.fetch_max_retries);

        (|| self.provider.latest_observation(ticker))
            .retry(backoff)
            .when(|e| matches!(e, UpstreamError::Transport(_) | UpstreamError::Status { .. }))
            .notify(|e, delay| {
                warn!(
                    ticker = %ticker,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Market data fetch failed, retrying"
                );
            })
            .await
    }

    async fn run_cycle(&self, engine: &mut SignalEngine, ticker: &str) -> Option<CycleReport> {
        let started = Instant::now();

        let observation = match self.fetch(ticker).await {
            Ok(observation) => observation,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Skipping cycle for {}: market data unavailable", ticker);
                if let Some(metrics) = &self.metrics {
                    metrics.upstream_errors_total.inc();
                }
                let _ = self
                    .events
                    .send(ScannerEvent::error(format!("{}: {}", ticker, e)));
                return None;
            }
        };

        let registries = self.registries.read().await.clone();
        let report = match engine.process(&registries, &observation) {
            Ok(Some(report)) => report,
            Ok(None) => return None,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Rejected observation for {}", ticker);
                let _ = self.events.send(ScannerEvent::error(e.to_string()));
                return None;
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.observations_total.inc();
            metrics.atoms_fired_total.inc_by(report.fired.len() as u64);
            metrics
                .predicate_errors_total
                .inc_by(report.warnings.len() as u64);
        }

        if !report.fired.is_empty() || !report.warnings.is_empty() {
            let _ = self.events.send(ScannerEvent::AtomsFired {
                ticker: report.ticker.clone(),
                atom_ids: report.fired.iter().cloned().collect(),
                observed_at: report.observed_at,
                warnings: report.warnings.iter().map(|w| w.to_string()).collect(),
            });
        }

        for signal in &report.signals {
            for sink in &self.sinks {
                if let Err(e) = sink.publish(signal).await {
                    error!(
                        sink = sink.name(),
                        signal_id = signal.id,
                        error = %e,
                        "Failed to publish signal to {} sink",
                        sink.name()
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.sink_errors_total.inc();
                    }
                }
            }
            if let Some(metrics) = &self.metrics {
                metrics.signals_emitted_total.inc();
            }
            let _ = self.events.send(ScannerEvent::MoleculeSignal {
                signal: signal.clone(),
            });
        }

        if let Some(metrics) = &self.metrics {
            metrics
                .cycle_duration_seconds
                .observe(started.elapsed().as_secs_f64());
        }
        Some(report)
    }
}
