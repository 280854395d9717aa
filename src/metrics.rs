//! Prometheus metrics for the scanner

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub observations_total: IntCounter,
    pub atoms_fired_total: IntCounter,
    pub predicate_errors_total: IntCounter,
    pub signals_emitted_total: IntCounter,
    pub upstream_errors_total: IntCounter,
    pub sink_errors_total: IntCounter,
    pub active_tickers: IntGauge,
    pub cycle_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let observations_total = IntCounter::new(
            "sigmatch_observations_total",
            "Observations evaluated by the engine",
        )?;
        let atoms_fired_total =
            IntCounter::new("sigmatch_atoms_fired_total", "Atom firings across all tickers")?;
        let predicate_errors_total = IntCounter::new(
            "sigmatch_predicate_errors_total",
            "Atom predicates that failed and were treated as not fired",
        )?;
        let signals_emitted_total =
            IntCounter::new("sigmatch_signals_emitted_total", "Signals emitted")?;
        let upstream_errors_total = IntCounter::new(
            "sigmatch_upstream_errors_total",
            "Market data fetches that failed after retries",
        )?;
        let sink_errors_total = IntCounter::new(
            "sigmatch_sink_errors_total",
            "Signals a sink failed to accept",
        )?;
        let active_tickers =
            IntGauge::new("sigmatch_active_tickers", "Tickers currently being scanned")?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "sigmatch_cycle_duration_seconds",
                "Time spent evaluating one observation",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;

        registry.register(Box::new(observations_total.clone()))?;
        registry.register(Box::new(atoms_fired_total.clone()))?;
        registry.register(Box::new(predicate_errors_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(upstream_errors_total.clone()))?;
        registry.register(Box::new(sink_errors_total.clone()))?;
        registry.register(Box::new(active_tickers.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            observations_total,
            atoms_fired_total,
            predicate_errors_total,
            signals_emitted_total,
            upstream_errors_total,
            sink_errors_total,
            active_tickers,
            cycle_duration_seconds,
        })
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
