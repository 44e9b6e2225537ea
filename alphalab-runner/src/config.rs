//! Serializable backtest configuration.

use alphalab_core::features::FeatureBuilder;
use alphalab_core::strategy::{EqualWeight, TrendFollowing, WeightStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Configuration for a single backtest run.
///
/// Captures everything needed to reproduce the run: universe, date range,
/// capital and cost settings, strategy choice, and data resolution flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub data: DataSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    /// Universe of tickers to trade.
    pub tickers: Vec<String>,

    /// Start date (YYYY-MM-DD), inclusive.
    pub start_date: String,

    /// End date (YYYY-MM-DD), inclusive.
    pub end_date: String,

    /// Initial capital, must be > 0.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Proportional cost in basis points of traded notional, must be ≥ 0.
    #[serde(default = "default_cost_bps")]
    pub cost_bps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategySection {
    #[serde(default)]
    pub kind: StrategyKind,

    /// Fast moving-average window for the trend ratio.
    #[serde(default = "default_trend_short")]
    pub trend_short: usize,

    /// Slow moving-average window for the trend ratio.
    #[serde(default = "default_trend_long")]
    pub trend_long: usize,

    /// Rolling window for the volatility feature.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSection {
    /// Directory of the local bar store.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Never make network requests.
    #[serde(default)]
    pub offline: bool,

    /// Generate synthetic bars when real data is unavailable.
    #[serde(default)]
    pub synthetic: bool,
}

/// Which weight strategy to run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    EqualWeight,
    TrendFollowing,
}

impl StrategyKind {
    pub fn build(&self) -> Box<dyn WeightStrategy> {
        match self {
            StrategyKind::EqualWeight => Box::new(EqualWeight),
            StrategyKind::TrendFollowing => Box::new(TrendFollowing),
        }
    }
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_cost_bps() -> f64 {
    5.0
}

fn default_trend_short() -> usize {
    20
}

fn default_trend_long() -> usize {
    200
}

fn default_volatility_window() -> usize {
    20
}

fn default_store_dir() -> String {
    "data".into()
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            kind: StrategyKind::default(),
            trend_short: default_trend_short(),
            trend_long: default_trend_long(),
            volatility_window: default_volatility_window(),
        }
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            offline: false,
            synthetic: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no tickers configured")]
    EmptyUniverse,

    #[error("initial capital must be > 0, got {0}")]
    NonPositiveCapital(f64),

    #[error("cost_bps must be >= 0, got {0}")]
    NegativeCost(f64),

    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    BadDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("trend windows must satisfy 0 < short < long, got short={short} long={long}")]
    BadTrendWindows { short: usize, long: usize },
}

impl BacktestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine would refuse, before any data I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.tickers.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if !(self.backtest.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.backtest.initial_capital));
        }
        if !(self.backtest.cost_bps >= 0.0) {
            return Err(ConfigError::NegativeCost(self.backtest.cost_bps));
        }
        let start = parse_date(&self.backtest.start_date)?;
        let end = parse_date(&self.backtest.end_date)?;
        if start > end {
            return Err(ConfigError::InvertedRange {
                start: self.backtest.start_date.clone(),
                end: self.backtest.end_date.clone(),
            });
        }
        if self.strategy.trend_short == 0
            || self.strategy.trend_short >= self.strategy.trend_long
        {
            return Err(ConfigError::BadTrendWindows {
                short: self.strategy.trend_short,
                long: self.strategy.trend_long,
            });
        }
        Ok(())
    }

    pub fn start_date(&self) -> chrono::NaiveDate {
        parse_date(&self.backtest.start_date).expect("validated at construction")
    }

    pub fn end_date(&self) -> chrono::NaiveDate {
        parse_date(&self.backtest.end_date).expect("validated at construction")
    }

    pub fn feature_builder(&self) -> FeatureBuilder {
        FeatureBuilder {
            volatility_window: self.strategy.volatility_window,
            trend_short: self.strategy.trend_short,
            trend_long: self.strategy.trend_long,
        }
    }

    /// Deterministic hash id for this configuration.
    ///
    /// Two runs with identical configs share a RunId, which names their
    /// artifact directory.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate, ConfigError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConfigError::BadDate {
        value: value.to_string(),
    })
}
