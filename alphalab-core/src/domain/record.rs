//! Daily records and the completed run they accumulate into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// End-of-day snapshot emitted once per date, never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Equity after trades and costs, marked at this date's prices.
    pub equity: f64,
    /// Traded notional as a fraction of pre-trade portfolio value.
    pub turnover: f64,
}

/// The completed output of one simulation run.
///
/// Created once per run and immutable thereafter; the caller owns it for
/// reporting and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRun {
    pub initial_capital: f64,
    pub records: Vec<DailyRecord>,
}

impl BacktestRun {
    /// The equity series in date order.
    pub fn equity_curve(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.equity).collect()
    }

    /// Final equity, or the initial capital for an empty run.
    pub fn final_equity(&self) -> f64 {
        self.records
            .last()
            .map(|r| r.equity)
            .unwrap_or(self.initial_capital)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
