//! AlphaLab Runner — backtest orchestration on top of `alphalab-core`.
//!
//! This crate provides:
//! - TOML run configuration with content-addressed run ids
//! - Data resolution with store/download/synthetic fallback
//! - A single-backtest driver (bars → features → weights → simulation)
//! - Equity-curve performance metrics
//! - Artifact export (manifest.json, equity.csv, equity.parquet)
//! - Parallel sweeps across strategies

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, StrategyKind};
pub use data_loader::{load_bars, LoadError, LoadOptions, LoadedData};
pub use export::{save_artifacts, ArtifactPaths};
pub use metrics::PerformanceMetrics;
pub use runner::{run_from_bars, run_single_backtest, BacktestReport, RunError, SCHEMA_VERSION};
pub use sweep::{run_sweep, SweepEntry, SweepReport};
