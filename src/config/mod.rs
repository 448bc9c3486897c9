//! Runtime configuration loaded from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::cycle::CandidateMode;
use crate::error::EngineError;
use crate::indicators::engine::{IndicatorConfig, IndicatorEngine};
use crate::models::market::HistoryInterval;
use crate::portfolio::reconciler::ExitThresholds;
use crate::risk::profile::RiskProfile;
use crate::risk::sizing::PositionSizer;
use crate::signals::categories::FactorWeights;
use crate::signals::decision::SignalClassifier;
use crate::signals::engine::SignalEngine;
use crate::signals::scoring::{CrossoverRule, ScoringModel};
use crate::strategies::StrategyKind;

pub const MAX_QUOTE_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

/// Current deployment environment, from `APP_ENV` (defaults to `sandbox`).
pub fn get_environment() -> String {
    std::env::var("APP_ENV")
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_else(|_| "sandbox".to_string())
}

/// Brokerage account in `NNNNNNNN-PP` form: account number plus product code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNumber {
    pub account: String,
    pub product_code: String,
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.account, self.product_code)
    }
}

impl FromStr for AccountNumber {
    type Err = ConfigError;

    /// An unhyphenated number is split so its last two digits become the product code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = |reason: &str| ConfigError::Invalid {
            key: "ACCOUNT_NUMBER",
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let (account, product) = match raw.split_once('-') {
            Some((account, product)) => (account.to_string(), product.to_string()),
            None if raw.len() > 2 => {
                let (account, product) = raw.split_at(raw.len() - 2);
                (account.to_string(), product.to_string())
            }
            None => return Err(invalid("too short")),
        };

        let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if account.len() != 8 || !all_digits(&account) {
            return Err(invalid("account part must be 8 digits"));
        }
        if product.len() != 2 || !all_digits(&product) {
            return Err(invalid("product code must be 2 digits"));
        }

        Ok(Self {
            account,
            product_code: product,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub risk_profile: RiskProfile,
    /// Percent, negative: `-7.0` sells at a 7% loss.
    pub stop_loss_threshold: f64,
    /// Percent, positive.
    pub take_profit_threshold: f64,
    pub max_holding_days: i64,
    pub max_concurrent_positions: usize,
    /// Share of available cash spent per cycle, in percent.
    pub budget_percentage: f64,
    pub ema_short_span: usize,
    pub ema_long_span: usize,
    pub macd_signal_span: usize,
    pub is_virtual_trading: bool,
    pub strategy: StrategyKind,
    /// `scan` feeds the cycle the scan's entry list instead of the whole universe.
    pub candidate_mode: CandidateMode,
    pub crossover_rule: CrossoverRule,
    /// Overrides the profile's weight table when set.
    pub factor_weights: Option<FactorWeights>,
    pub max_buy_price: Option<f64>,
    pub tickers: Option<Vec<String>>,
    pub ticker_source_url: Option<String>,
    pub request_delay: Duration,
    pub quote_concurrency: usize,
    pub history_lookback_days: u32,
    pub history_interval: HistoryInterval,
    pub account_number: Option<AccountNumber>,
    pub cycle_cron: Option<String>,
    pub paper_cash: f64,
    pub paper_state_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            risk_profile: RiskProfile::Moderate,
            stop_loss_threshold: -7.0,
            take_profit_threshold: 20.0,
            max_holding_days: 30,
            max_concurrent_positions: 3,
            budget_percentage: 50.0,
            ema_short_span: 12,
            ema_long_span: 26,
            macd_signal_span: 9,
            is_virtual_trading: true,
            strategy: StrategyKind::Composite,
            candidate_mode: CandidateMode::Universe,
            crossover_rule: CrossoverRule::EitherDirection,
            factor_weights: None,
            max_buy_price: None,
            tickers: None,
            ticker_source_url: None,
            request_delay: Duration::from_millis(1000),
            quote_concurrency: 1,
            history_lookback_days: 365,
            history_interval: HistoryInterval::Daily,
            account_number: None,
            cycle_cron: None,
            paper_cash: 10_000.0,
            paper_state_path: None,
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_crossover_rule(raw: &str) -> Result<CrossoverRule, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "either" | "either_direction" => Ok(CrossoverRule::EitherDirection),
        "bullish" | "bullish_only" => Ok(CrossoverRule::BullishOnly),
        "signed" => Ok(CrossoverRule::Signed),
        _ => Err(ConfigError::Invalid {
            key: "CROSSOVER_RULE",
            value: raw.to_string(),
            reason: "expected either, bullish or signed".to_string(),
        }),
    }
}

fn parse_weights(raw: &str) -> Result<FactorWeights, ConfigError> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| parse_value::<f64>("FACTOR_WEIGHTS", p))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [trend, bollinger, macd] => {
            FactorWeights::new(*trend, *bollinger, *macd).map_err(|e| ConfigError::Invalid {
                key: "FACTOR_WEIGHTS",
                value: raw.to_string(),
                reason: e.to_string(),
            })
        }
        _ => Err(ConfigError::Invalid {
            key: "FACTOR_WEIGHTS",
            value: raw.to_string(),
            reason: "expected trend,bollinger,macd".to_string(),
        }),
    }
}

impl Config {
    /// Load from the process environment. Binaries read `.env` before calling this.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("RISK_PROFILE") {
            config.risk_profile = v.parse().map_err(|e: EngineError| ConfigError::Invalid {
                key: "RISK_PROFILE",
                value: v.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(v) = get("STOP_LOSS_THRESHOLD") {
            config.stop_loss_threshold = parse_value("STOP_LOSS_THRESHOLD", &v)?;
        }
        if let Some(v) = get("TAKE_PROFIT_THRESHOLD") {
            config.take_profit_threshold = parse_value("TAKE_PROFIT_THRESHOLD", &v)?;
        }
        if let Some(v) = get("MAX_HOLDING_DAYS") {
            config.max_holding_days = parse_value("MAX_HOLDING_DAYS", &v)?;
        }
        if let Some(v) = get("MAX_CONCURRENT_POSITIONS") {
            config.max_concurrent_positions = parse_value("MAX_CONCURRENT_POSITIONS", &v)?;
        }
        if let Some(v) = get("BUDGET_PERCENTAGE") {
            config.budget_percentage = parse_value("BUDGET_PERCENTAGE", &v)?;
        }
        if let Some(v) = get("EMA_SHORT_SPAN") {
            config.ema_short_span = parse_value("EMA_SHORT_SPAN", &v)?;
        }
        if let Some(v) = get("EMA_LONG_SPAN") {
            config.ema_long_span = parse_value("EMA_LONG_SPAN", &v)?;
        }
        if let Some(v) = get("MACD_SIGNAL_SPAN") {
            config.macd_signal_span = parse_value("MACD_SIGNAL_SPAN", &v)?;
        }
        if let Some(v) = get("IS_VIRTUAL_TRADING") {
            config.is_virtual_trading = parse_bool("IS_VIRTUAL_TRADING", &v)?;
        }
        if let Some(v) = get("STRATEGY") {
            config.strategy = v.parse().map_err(|e: EngineError| ConfigError::Invalid {
                key: "STRATEGY",
                value: v.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(v) = get("CANDIDATE_SOURCE") {
            config.candidate_mode = v.parse().map_err(|e: EngineError| ConfigError::Invalid {
                key: "CANDIDATE_SOURCE",
                value: v.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(v) = get("CROSSOVER_RULE") {
            config.crossover_rule = parse_crossover_rule(&v)?;
        }
        if let Some(v) = get("FACTOR_WEIGHTS") {
            config.factor_weights = Some(parse_weights(&v)?);
        }
        if let Some(v) = get("MAX_BUY_PRICE") {
            config.max_buy_price = Some(parse_value("MAX_BUY_PRICE", &v)?);
        }
        if let Some(v) = get("TICKERS") {
            let tickers: Vec<String> = v
                .split(',')
                .map(|t| t.trim().to_ascii_uppercase())
                .filter(|t| !t.is_empty())
                .collect();
            if !tickers.is_empty() {
                config.tickers = Some(tickers);
            }
        }
        config.ticker_source_url = get("TICKER_SOURCE_URL").map(|v| v.trim().to_string());
        if let Some(v) = get("REQUEST_DELAY_MS") {
            config.request_delay = Duration::from_millis(parse_value("REQUEST_DELAY_MS", &v)?);
        }
        if let Some(v) = get("QUOTE_CONCURRENCY") {
            config.quote_concurrency = parse_value("QUOTE_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("HISTORY_LOOKBACK") {
            config.history_lookback_days = parse_value("HISTORY_LOOKBACK", &v)?;
        }
        if let Some(v) = get("HISTORY_INTERVAL") {
            config.history_interval = parse_value("HISTORY_INTERVAL", &v)?;
        }
        if let Some(v) = get("ACCOUNT_NUMBER") {
            config.account_number = Some(v.parse()?);
        }
        config.cycle_cron = get("CYCLE_CRON").map(|v| v.trim().to_string());
        if let Some(v) = get("PAPER_CASH") {
            config.paper_cash = parse_value("PAPER_CASH", &v)?;
        }
        config.paper_state_path = get("PAPER_STATE_PATH").map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ema_short_span == 0 || self.ema_short_span >= self.ema_long_span {
            return Err(ConfigError::Validation(format!(
                "EMA spans must satisfy 0 < short ({}) < long ({})",
                self.ema_short_span, self.ema_long_span
            )));
        }
        if self.macd_signal_span == 0 {
            return Err(ConfigError::Validation(
                "MACD signal span must be positive".to_string(),
            ));
        }
        if !(self.stop_loss_threshold < 0.0) {
            return Err(ConfigError::Validation(format!(
                "stop-loss threshold must be negative, got {}",
                self.stop_loss_threshold
            )));
        }
        if !(self.take_profit_threshold > 0.0) {
            return Err(ConfigError::Validation(format!(
                "take-profit threshold must be positive, got {}",
                self.take_profit_threshold
            )));
        }
        if !(self.budget_percentage > 0.0 && self.budget_percentage <= 100.0) {
            return Err(ConfigError::Validation(format!(
                "budget percentage must be in (0, 100], got {}",
                self.budget_percentage
            )));
        }
        if self.max_concurrent_positions == 0 {
            return Err(ConfigError::Validation(
                "max concurrent positions must be at least 1".to_string(),
            ));
        }
        if self.max_holding_days < 0 {
            return Err(ConfigError::Validation(format!(
                "max holding days must not be negative, got {}",
                self.max_holding_days
            )));
        }
        if self.quote_concurrency == 0 || self.quote_concurrency > MAX_QUOTE_CONCURRENCY {
            return Err(ConfigError::Validation(format!(
                "quote concurrency must be between 1 and {}, got {}",
                MAX_QUOTE_CONCURRENCY, self.quote_concurrency
            )));
        }
        if let Some(cap) = self.max_buy_price {
            if !(cap > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "max buy price must be positive, got {}",
                    cap
                )));
            }
        }
        if let Some(weights) = &self.factor_weights {
            if !weights.verify() {
                return Err(ConfigError::Validation(format!(
                    "factor weights must sum to 1.0, got {}",
                    weights.sum()
                )));
            }
        }
        self.indicator_config()
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        if let Some(expr) = &self.cycle_cron {
            cron::Schedule::from_str(expr).map_err(|e| ConfigError::Invalid {
                key: "CYCLE_CRON",
                value: expr.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig::default().with_ema_spans(
            self.ema_short_span,
            self.ema_long_span,
            self.macd_signal_span,
        )
    }

    pub fn factor_weights(&self) -> FactorWeights {
        self.factor_weights.unwrap_or_else(|| self.risk_profile.weights())
    }

    pub fn scoring_model(&self) -> ScoringModel {
        ScoringModel::new(self.factor_weights()).with_crossover_rule(self.crossover_rule)
    }

    pub fn signal_engine(&self) -> Result<SignalEngine, EngineError> {
        Ok(SignalEngine::new(
            IndicatorEngine::try_new(self.indicator_config())?,
            self.scoring_model(),
            SignalClassifier::default(),
        ))
    }

    pub fn exit_thresholds(&self) -> ExitThresholds {
        ExitThresholds {
            stop_loss: self.stop_loss_threshold,
            take_profit: self.take_profit_threshold,
            max_holding_days: self.max_holding_days,
        }
    }

    pub fn position_sizer(&self) -> PositionSizer {
        PositionSizer::new(self.risk_profile)
    }
}
