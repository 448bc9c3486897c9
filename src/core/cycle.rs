//! One full trading pass: holdings, exits, sells, candidate ranking, sizing, buys.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::session::{market_phase, MarketPhase};
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::models::market::HistoryInterval;
use crate::models::portfolio::{CycleResult, OrderIntent, OrderResult, OrderSide, TickerError};
use crate::models::signal::{SignalOutput, TradeSignal};
use crate::portfolio::reconciler::PortfolioReconciler;
use crate::risk::sizing::PositionSizer;
use crate::services::broker::BrokerPort;
use crate::services::market_data::TickerSource;
use crate::services::retry::{with_backoff, RetryPolicy};
use crate::strategies::{analyze_universe, ScanSummary, Strategy};

/// Where step 4 gets its buy candidates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Ask the configured [`TickerSource`].
    Universe,
    /// Tickers already screened elsewhere, e.g. a golden-cross list from a scan.
    Preselected(Vec<String>),
}

/// Configured way of building [`CandidateSource`] for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateMode {
    /// Every universe ticker is scored inside the cycle.
    #[default]
    Universe,
    /// Scan the universe first and trade only its entry signals.
    Scan,
}

impl FromStr for CandidateMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "universe" => Ok(CandidateMode::Universe),
            "scan" => Ok(CandidateMode::Scan),
            other => Err(EngineError::Configuration(format!(
                "unknown candidate source '{}'",
                other
            ))),
        }
    }
}

/// Everything one session produced: the optional scan and each cycle run.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub phase: MarketPhase,
    pub scan: Option<ScanSummary>,
    pub cycles: Vec<CycleResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleSettings {
    pub max_concurrent_positions: usize,
    pub budget_percentage: f64,
    pub max_buy_price: Option<f64>,
    pub request_delay: Duration,
    pub quote_concurrency: usize,
    pub history_lookback_days: u32,
    pub history_interval: HistoryInterval,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            max_concurrent_positions: 3,
            budget_percentage: 50.0,
            max_buy_price: None,
            request_delay: Duration::from_millis(1000),
            quote_concurrency: 1,
            history_lookback_days: 365,
            history_interval: HistoryInterval::Daily,
        }
    }
}

impl CycleSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_positions: config.max_concurrent_positions,
            budget_percentage: config.budget_percentage,
            max_buy_price: config.max_buy_price,
            request_delay: config.request_delay,
            quote_concurrency: config.quote_concurrency,
            history_lookback_days: config.history_lookback_days,
            history_interval: config.history_interval,
        }
    }
}

/// A buy candidate that passed scoring.
#[derive(Debug, Clone)]
struct ScoredCandidate {
    order: usize,
    ticker: String,
    price: f64,
    output: SignalOutput,
}

impl ScoredCandidate {
    fn rank_score(&self) -> f64 {
        self.output.score.unwrap_or(0.0)
    }
}

enum Evaluated {
    Candidate(ScoredCandidate),
    Skipped,
    Failed(TickerError),
}

pub struct TradingCycleOrchestrator {
    broker: Arc<dyn BrokerPort>,
    tickers: Arc<dyn TickerSource>,
    strategy: Arc<dyn Strategy>,
    reconciler: PortfolioReconciler,
    sizer: PositionSizer,
    settings: CycleSettings,
    retry: RetryPolicy,
    metrics: Option<Arc<Metrics>>,
    today: Option<NaiveDate>,
}

impl TradingCycleOrchestrator {
    pub fn new(
        broker: Arc<dyn BrokerPort>,
        tickers: Arc<dyn TickerSource>,
        strategy: Arc<dyn Strategy>,
        reconciler: PortfolioReconciler,
        sizer: PositionSizer,
        settings: CycleSettings,
    ) -> Self {
        Self {
            broker,
            tickers,
            strategy,
            reconciler,
            sizer,
            settings,
            retry: RetryPolicy::default(),
            metrics: None,
            today: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Pin the calendar date used for holding periods and new entries.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn reconciler(&self) -> &PortfolioReconciler {
        &self.reconciler
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Scan, then one cycle, with an extra cycle first when `now` falls in the pre-market hour.
    ///
    /// Both cycles share the scan's entry list.
    pub async fn run_session(
        &mut self,
        mode: CandidateMode,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<SessionReport, EngineError> {
        let phase = market_phase(now);
        info!(phase = ?phase, mode = ?mode, "TradingCycle: session starting ({:?})", phase);

        let (source, scan) = match mode {
            CandidateMode::Universe => (CandidateSource::Universe, None),
            CandidateMode::Scan => {
                let summary = self.scan().await;
                (CandidateSource::Preselected(summary.entries.clone()), Some(summary))
            }
        };

        let mut report = SessionReport {
            phase,
            scan,
            cycles: Vec::new(),
        };
        if phase == MarketPhase::PreMarket {
            info!("TradingCycle: pre-market, running an extra cycle");
            report.cycles.push(self.run_cycle(source.clone(), cancel).await?);
            if cancel.is_cancelled() {
                return Ok(report);
            }
        }
        report.cycles.push(self.run_cycle(source, cancel).await?);
        Ok(report)
    }

    /// Run the strategy over the whole universe without trading.
    pub async fn scan(&self) -> ScanSummary {
        let universe = match self.universe().await {
            Ok(universe) => universe,
            Err(e) => {
                warn!(error = %e, "TradingCycle: ticker universe unavailable, nothing to scan");
                return ScanSummary {
                    errors: vec![TickerError::new("*", format!("ticker universe: {}", e))],
                    ..ScanSummary::default()
                };
            }
        };
        analyze_universe(
            self.strategy.as_ref(),
            self.broker.as_ref(),
            &universe,
            self.settings.history_lookback_days,
            self.settings.history_interval,
            &self.retry,
        )
        .await
    }

    async fn universe(&self) -> Result<Vec<String>, EngineError> {
        with_backoff(&self.retry, "get_universe", || self.tickers.get_universe()).await
    }

    /// Run one cycle.
    ///
    /// Fails only when holdings cannot be refreshed; every later failure is isolated
    /// to its ticker or order and reported in the result.
    pub async fn run_cycle(
        &mut self,
        source: CandidateSource,
        cancel: &CancellationToken,
    ) -> Result<CycleResult, EngineError> {
        let started = Instant::now();
        let mut result = CycleResult::default();
        let today = self.today();

        // 1. Holdings, fail-closed.
        let holdings = match with_backoff(&self.retry, "get_holdings", || self.broker.get_holdings()).await {
            Ok(holdings) => holdings,
            Err(e) => {
                error!(error = %e, "TradingCycle: holdings refresh failed, aborting cycle");
                return Err(e);
            }
        };
        self.reconciler.rebuild(holdings);
        info!(
            held = self.reconciler.held_count(),
            "TradingCycle: started with {} open positions",
            self.reconciler.held_count()
        );

        // 2. Exit evaluation.
        if cancel.is_cancelled() {
            return Ok(self.finish(result, started, true));
        }
        let sells = self.evaluate_exits(today, &mut result.errors).await;

        // 3. Sell orders.
        if cancel.is_cancelled() {
            return Ok(self.finish(result, started, true));
        }
        let mut submitted = 0usize;
        for intent in sells {
            if cancel.is_cancelled() {
                return Ok(self.finish(result, started, true));
            }
            let order = self.submit(intent, &mut submitted).await;
            if order.success {
                self.reconciler.confirm_sell(&order.intent.ticker);
            } else {
                self.reconciler.sell_failed(&order.intent.ticker);
            }
            result.sell_orders.push(order);
        }

        // 4. Candidates.
        if cancel.is_cancelled() {
            return Ok(self.finish(result, started, true));
        }
        let slots = self
            .settings
            .max_concurrent_positions
            .saturating_sub(self.reconciler.held_count());
        if slots == 0 {
            info!("TradingCycle: no free position slots, skipping buys");
            return Ok(self.finish(result, started, false));
        }
        let candidates = self.candidates(source, &mut result.errors).await;

        // 5. Score, rank and select.
        if cancel.is_cancelled() {
            return Ok(self.finish(result, started, true));
        }
        let selected = self.rank(candidates, slots, &mut result.errors).await;
        if selected.is_empty() {
            info!("TradingCycle: no buy candidates selected");
            return Ok(self.finish(result, started, false));
        }

        // 6. Size and buy.
        if cancel.is_cancelled() {
            return Ok(self.finish(result, started, true));
        }
        let cash = match with_backoff(&self.retry, "get_available_cash", || {
            self.broker.get_available_cash()
        })
        .await
        {
            Ok(cash) => cash,
            Err(e) => {
                warn!(error = %e, "TradingCycle: available cash unknown, skipping buys");
                result.errors.push(TickerError::new("*", format!("available cash: {}", e)));
                return Ok(self.finish(result, started, false));
            }
        };
        let budget = self
            .sizer
            .allocate(cash, self.settings.budget_percentage, selected.len());
        info!(
            cash,
            budget_per_ticker = budget,
            candidates = selected.len(),
            "TradingCycle: allocating {:.2} to each of {} candidates",
            budget,
            selected.len()
        );

        for candidate in selected {
            if cancel.is_cancelled() {
                return Ok(self.finish(result, started, true));
            }
            let quantity = self.sizer.quantity(budget, candidate.price);
            if quantity == 0 {
                warn!(
                    ticker = %candidate.ticker,
                    price = candidate.price,
                    budget,
                    "TradingCycle: budget buys less than one share of {}, skipping",
                    candidate.ticker
                );
                result.errors.push(TickerError::new(
                    &candidate.ticker,
                    format!(
                        "budget {:.2} buys less than one share at {:.2}",
                        budget, candidate.price
                    ),
                ));
                continue;
            }

            let intent = OrderIntent {
                ticker: candidate.ticker.clone(),
                side: OrderSide::Buy,
                price: candidate.price,
                quantity,
                reason: self.buy_reason(&candidate),
            };
            let order = self.submit(intent, &mut submitted).await;
            if order.success {
                self.reconciler
                    .apply_buy(&order.intent.ticker, order.intent.quantity, order.intent.price, today);
            }
            result.buy_orders.push(order);
        }

        // 7. Summary.
        Ok(self.finish(result, started, false))
    }

    async fn evaluate_exits(&mut self, today: NaiveDate, errors: &mut Vec<TickerError>) -> Vec<OrderIntent> {
        let held: Vec<String> = self
            .reconciler
            .open_positions()
            .map(|p| p.ticker.clone())
            .collect();
        let mut sells = Vec::new();

        for ticker in held {
            let quote = match with_backoff(&self.retry, "get_quote", || self.broker.get_quote(&ticker)).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "TradingCycle: cannot evaluate exit for {}", ticker);
                    errors.push(TickerError::new(&ticker, &e));
                    continue;
                }
            };

            let signal = match self.signal_for(&ticker).await {
                Ok(output) => Some(output.signal),
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "TradingCycle: no signal for held {}", ticker);
                    errors.push(TickerError::new(&ticker, format!("signal unavailable: {}", e)));
                    None
                }
            };

            match self.reconciler.evaluate_exit(&ticker, quote.price, signal, today) {
                Ok(decision) if decision.should_sell() => {
                    info!(
                        ticker = %ticker,
                        profit_rate = decision.profit_rate,
                        days_held = decision.days_held,
                        reasons = %decision.reason_text(),
                        "TradingCycle: sell {} ({})",
                        ticker,
                        decision.reason_text()
                    );
                    self.reconciler.mark_pending_sell(&ticker);
                    sells.push(decision.to_order());
                }
                Ok(decision) => {
                    debug!(
                        ticker = %ticker,
                        profit_rate = decision.profit_rate,
                        "TradingCycle: holding {}",
                        ticker
                    );
                }
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "TradingCycle: cannot evaluate exit for {}", ticker);
                    errors.push(TickerError::new(&ticker, &e));
                }
            }
        }

        sells
    }

    async fn signal_for(&self, ticker: &str) -> Result<SignalOutput, EngineError> {
        let lookback = self.settings.history_lookback_days;
        let interval = self.settings.history_interval;
        let history = with_backoff(&self.retry, "get_price_history", || {
            self.broker.get_price_history(ticker, lookback, interval)
        })
        .await?;
        self.strategy.compute_signal(ticker, &history)
    }

    async fn candidates(&self, source: CandidateSource, errors: &mut Vec<TickerError>) -> Vec<String> {
        let universe = match source {
            CandidateSource::Preselected(tickers) => tickers,
            CandidateSource::Universe => match self.universe().await {
                Ok(tickers) => tickers,
                Err(e) => {
                    warn!(error = %e, "TradingCycle: ticker universe unavailable");
                    errors.push(TickerError::new("*", format!("ticker universe: {}", e)));
                    Vec::new()
                }
            },
        };

        let mut seen = HashSet::new();
        universe
            .into_iter()
            .filter(|t| self.reconciler.state(t).is_none())
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    async fn rank(&self, candidates: Vec<String>, slots: usize, errors: &mut Vec<TickerError>) -> Vec<ScoredCandidate> {
        let concurrency = self.settings.quote_concurrency.max(1);
        let this = &*self;
        let mut evaluated: Vec<(usize, Evaluated)> = stream::iter(candidates.into_iter().enumerate())
            .map(move |(order, ticker)| async move { (order, this.evaluate_candidate(order, ticker).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        evaluated.sort_by_key(|(order, _)| *order);

        let mut scored = Vec::new();
        for (_, outcome) in evaluated {
            match outcome {
                Evaluated::Candidate(candidate) => scored.push(candidate),
                Evaluated::Skipped => {}
                Evaluated::Failed(err) => errors.push(err),
            }
        }

        // Stable: equal scores keep universe order.
        scored.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()).then(a.order.cmp(&b.order)));
        scored.truncate(slots);

        for candidate in &scored {
            info!(
                ticker = %candidate.ticker,
                score = candidate.rank_score(),
                price = candidate.price,
                "TradingCycle: selected {} (score {:.3})",
                candidate.ticker,
                candidate.rank_score()
            );
        }
        scored
    }

    async fn evaluate_candidate(&self, order: usize, ticker: String) -> Evaluated {
        let quote = match with_backoff(&self.retry, "get_quote", || self.broker.get_quote(&ticker)).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "TradingCycle: skipping candidate {}", ticker);
                return Evaluated::Failed(TickerError::new(&ticker, &e));
            }
        };
        if !(quote.price > 0.0) {
            return Evaluated::Failed(TickerError::new(
                &ticker,
                EngineError::invalid_price(&ticker, quote.price),
            ));
        }
        if let Some(cap) = self.settings.max_buy_price {
            if quote.price >= cap {
                debug!(
                    ticker = %ticker,
                    price = quote.price,
                    cap,
                    "TradingCycle: {} at {:.2} is above the buy price cap",
                    ticker,
                    quote.price
                );
                return Evaluated::Skipped;
            }
        }

        let output = match self.signal_for(&ticker).await {
            Ok(output) => output,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "TradingCycle: skipping candidate {}", ticker);
                return Evaluated::Failed(TickerError::new(&ticker, &e));
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.candidates_scored_total.inc();
        }

        if !output.signal.is_entry() {
            debug!(ticker = %ticker, signal = %output.signal, "TradingCycle: {} is not a buy", ticker);
            return Evaluated::Skipped;
        }

        Evaluated::Candidate(ScoredCandidate {
            order,
            ticker,
            price: quote.price,
            output,
        })
    }

    fn buy_reason(&self, candidate: &ScoredCandidate) -> String {
        let signal = match (&candidate.output.signal, candidate.output.score) {
            (TradeSignal::Composite(_), Some(score)) => format!("{} (score {:.3})", candidate.output.signal, score),
            _ => candidate.output.signal.to_string(),
        };
        match self.sizer.exit_levels(candidate.price) {
            Some(levels) => format!(
                "{}; stop-loss {:.2}, take-profit {:.2}",
                signal, levels.stop_loss, levels.take_profit
            ),
            None => signal,
        }
    }

    /// Submit one order, pacing consecutive submissions. Never retried.
    async fn submit(&self, intent: OrderIntent, submitted: &mut usize) -> OrderResult {
        if *submitted > 0 && !self.settings.request_delay.is_zero() {
            tokio::time::sleep(self.settings.request_delay).await;
        }
        *submitted += 1;

        let result = match self.broker.submit_order(&intent).await {
            Ok(ack) => OrderResult::from_ack(intent, ack),
            Err(e) => {
                let message = e.to_string();
                OrderResult::failed(intent, message)
            }
        };

        if result.success {
            info!(
                ticker = %result.intent.ticker,
                side = %result.intent.side,
                quantity = result.intent.quantity,
                price = result.intent.price,
                "TradingCycle: {} {} x{} accepted",
                result.intent.side,
                result.intent.ticker,
                result.intent.quantity
            );
        } else {
            warn!(
                ticker = %result.intent.ticker,
                side = %result.intent.side,
                message = result.message.as_deref().unwrap_or(""),
                "TradingCycle: {} {} failed",
                result.intent.side,
                result.intent.ticker
            );
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_order(&result);
        }
        result
    }

    fn finish(&self, mut result: CycleResult, started: Instant, cancelled: bool) -> CycleResult {
        result.cancelled = cancelled;
        let result = result.finalize();
        let totals = &result.totals;

        if cancelled {
            warn!("TradingCycle: cancelled before completion");
        }
        info!(
            sells_ok = totals.sells_succeeded,
            sells_failed = totals.sells_failed,
            buys_ok = totals.buys_succeeded,
            buys_failed = totals.buys_failed,
            net_cash_flow = totals.net_cash_flow,
            errors = result.errors.len(),
            "TradingCycle: done, sells {}/{} ok, buys {}/{} ok, net cash flow {:.2}",
            totals.sells_succeeded,
            totals.sells_succeeded + totals.sells_failed,
            totals.buys_succeeded,
            totals.buys_succeeded + totals.buys_failed,
            totals.net_cash_flow
        );
        for err in &result.errors {
            warn!(ticker = %err.ticker, "TradingCycle: {}: {}", err.ticker, err.message);
        }

        if let Some(metrics) = &self.metrics {
            metrics.cycles_total.inc();
            metrics.cycle_duration_seconds.observe(started.elapsed().as_secs_f64());
            metrics.ticker_errors_total.inc_by(result.errors.len() as u64);
        }
        result
    }
}
