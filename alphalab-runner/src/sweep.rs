//! Parallel strategy sweeps.
//!
//! Runs several strategies over the same loaded bars. Each run owns its own
//! portfolio state and output, so runs are embarrassingly parallel — the one
//! form of parallelism the simulation allows (the per-date recurrence inside
//! a run is strictly sequential).

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{BacktestConfig, StrategyKind};
use crate::data_loader::LoadedData;
use crate::metrics::PerformanceMetrics;
use crate::runner::{run_from_bars, BacktestReport, RunError};

/// One strategy's results within a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    pub strategy: String,
    pub metrics: PerformanceMetrics,
    pub final_equity: f64,
}

/// Results for all strategies, sorted by total return (best first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }
}

/// Run every requested strategy over the same data, in parallel.
///
/// The first failing run aborts the sweep — a structural problem in the
/// shared data would poison every entry anyway.
pub fn run_sweep(
    config: &BacktestConfig,
    kinds: &[StrategyKind],
    loaded: &LoadedData,
) -> Result<SweepReport, RunError> {
    let reports: Result<Vec<BacktestReport>, RunError> = kinds
        .par_iter()
        .map(|kind| {
            let mut run_config = config.clone();
            run_config.strategy.kind = *kind;
            let strategy = kind.build();
            run_from_bars(&run_config, strategy.as_ref(), loaded)
        })
        .collect();

    let mut entries: Vec<SweepEntry> = reports?
        .into_iter()
        .map(|report| SweepEntry {
            strategy: report.strategy.clone(),
            final_equity: report
                .curve
                .equity
                .last()
                .copied()
                .unwrap_or(report.initial_capital),
            metrics: report.metrics,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.metrics
            .total_return
            .partial_cmp(&a.metrics.total_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(SweepReport { entries })
}
