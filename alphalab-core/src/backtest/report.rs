//! Derived return series — the reporting view of a completed run.

use crate::domain::BacktestRun;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date-indexed table of equity, turnover, and derived returns.
///
/// Pure, total derivation from a run: the same records and initial capital
/// always produce bit-identical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    pub dates: Vec<NaiveDate>,
    pub equity: Vec<f64>,
    pub turnover: Vec<f64>,
    /// Percentage change of equity from the prior date; 0.0 on the first
    /// date, which has no prior equity.
    pub net_return: Vec<f64>,
    /// Equity as a multiple of initial capital.
    pub cumulative_return: Vec<f64>,
}

impl EquityCurve {
    pub fn from_run(run: &BacktestRun) -> Self {
        let n = run.records.len();
        let mut dates = Vec::with_capacity(n);
        let mut equity = Vec::with_capacity(n);
        let mut turnover = Vec::with_capacity(n);
        let mut net_return = Vec::with_capacity(n);
        let mut cumulative_return = Vec::with_capacity(n);

        for (t, record) in run.records.iter().enumerate() {
            dates.push(record.date);
            equity.push(record.equity);
            turnover.push(record.turnover);
            net_return.push(if t == 0 {
                0.0
            } else {
                pct_change(run.records[t - 1].equity, record.equity)
            });
            cumulative_return.push(record.equity / run.initial_capital);
        }

        Self {
            dates,
            equity,
            turnover,
            net_return,
            cumulative_return,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

fn pct_change(prev: f64, current: f64) -> f64 {
    if prev == 0.0 {
        0.0
    } else {
        (current - prev) / prev
    }
}
