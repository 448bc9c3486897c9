//! Prometheus metrics for trading cycles.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::models::portfolio::OrderResult;

pub struct Metrics {
    registry: Registry,
    pub cycles_total: IntCounter,
    pub orders_total: IntCounterVec,
    pub cycle_duration_seconds: Histogram,
    pub candidates_scored_total: IntCounter,
    pub ticker_errors_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles_total = IntCounter::new("cycles_total", "Completed trading cycles")?;
        let orders_total = IntCounterVec::new(
            Opts::new("orders_total", "Submitted orders by side and outcome"),
            &["side", "outcome"],
        )?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Wall-clock duration of a trading cycle")
                .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;
        let candidates_scored_total =
            IntCounter::new("candidates_scored_total", "Buy candidates scored by the strategy")?;
        let ticker_errors_total =
            IntCounter::new("ticker_errors_total", "Per-ticker failures isolated during cycles")?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(orders_total.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(candidates_scored_total.clone()))?;
        registry.register(Box::new(ticker_errors_total.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            orders_total,
            cycle_duration_seconds,
            candidates_scored_total,
            ticker_errors_total,
        })
    }

    pub fn record_order(&self, result: &OrderResult) {
        let side = result.intent.side.to_string().to_ascii_lowercase();
        let outcome = if result.success { "success" } else { "failure" };
        self.orders_total.with_label_values(&[side.as_str(), outcome]).inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
