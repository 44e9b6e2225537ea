//! Backtest runner — wires together data, features, strategy, and engine.
//!
//! Two entry points:
//! - `run_single_backtest()`: resolves bars through the store/provider, then
//!   runs. Used by the CLI.
//! - `run_from_bars()`: takes pre-loaded bars. Used by sweeps to avoid
//!   re-reading the store for every strategy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use alphalab_core::backtest::{
    build_matrices, simulate, AlignError, EngineError, EquityCurve, SimConfig,
};
use alphalab_core::data::{CsvStore, DataProvider, RawBar};
use alphalab_core::strategy::WeightStrategy;

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_bars, LoadError, LoadOptions, LoadedData};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] LoadError),

    #[error("alignment error: {0}")]
    Align(#[from] AlignError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete, serializable result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub strategy: String,
    pub tickers: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub cost_bps: f64,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub n_dates: usize,
    pub metrics: PerformanceMetrics,
    pub curve: EquityCurve,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest from a config (resolves bars via the store).
pub fn run_single_backtest(
    config: &BacktestConfig,
    store: &CsvStore,
    provider: Option<&dyn DataProvider>,
) -> Result<BacktestReport, RunError> {
    config.validate()?;

    let symbols: Vec<&str> = config.backtest.tickers.iter().map(|s| s.as_str()).collect();
    let opts = LoadOptions {
        start: config.start_date(),
        end: config.end_date(),
        offline: config.data.offline,
        synthetic: config.data.synthetic,
    };
    let loaded = load_bars(&symbols, store, provider, &opts)?;

    let strategy = config.strategy.kind.build();
    run_from_bars(config, strategy.as_ref(), &loaded)
}

/// Run a backtest over pre-loaded bars — no I/O.
pub fn run_from_bars(
    config: &BacktestConfig,
    strategy: &dyn WeightStrategy,
    loaded: &LoadedData,
) -> Result<BacktestReport, RunError> {
    let panel = config.feature_builder().build(&loaded.bars);
    let rows = strategy.assign(&panel);
    let (prices, weights) = build_matrices(&rows)?;

    let sim_config = SimConfig {
        initial_capital: config.backtest.initial_capital,
        cost_bps: config.backtest.cost_bps,
    };
    let run = simulate(&prices, &weights, &sim_config)?;
    let curve = EquityCurve::from_run(&run);
    let metrics = PerformanceMetrics::compute(&curve);

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        strategy: strategy.name().to_string(),
        tickers: config.backtest.tickers.clone(),
        start_date: config.backtest.start_date.clone(),
        end_date: config.backtest.end_date.clone(),
        initial_capital: config.backtest.initial_capital,
        cost_bps: config.backtest.cost_bps,
        dataset_hash: loaded.dataset_hash.clone(),
        has_synthetic: loaded.has_synthetic,
        n_dates: curve.len(),
        metrics,
        curve,
    })
}

/// Build a `LoadedData` directly from in-memory bars (tests, sweeps).
pub fn loaded_from_bars(bars: HashMap<String, Vec<RawBar>>) -> LoadedData {
    let mut hasher = blake3::Hasher::new();
    let mut symbols: Vec<&String> = bars.keys().collect();
    symbols.sort();
    for symbol in symbols {
        hasher.update(symbol.as_bytes());
        for bar in &bars[symbol] {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.close.to_le_bytes());
        }
    }
    let dataset_hash = hasher.finalize().to_hex().to_string();

    LoadedData {
        sources: HashMap::new(),
        dataset_hash,
        has_synthetic: false,
        bars,
    }
}
