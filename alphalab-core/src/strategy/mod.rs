//! Weight-assigning strategies.
//!
//! A strategy turns the feature panel into long-format target rows for the
//! aligner. Strategies see only shifted features — the panel's timing shift
//! is the no-look-ahead guarantee, and nothing here re-derives same-day
//! values.

pub mod equal_weight;
pub mod trend_following;

pub use equal_weight::EqualWeight;
pub use trend_following::TrendFollowing;

use crate::backtest::TargetRow;
use crate::features::{FeaturePanel, FeatureRow};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Maps features to target allocation weights.
pub trait WeightStrategy: Send + Sync {
    /// Human-readable name, used in configs and reports.
    fn name(&self) -> &str;

    /// One target row per (date, ticker) in the panel.
    fn assign(&self, panel: &FeaturePanel) -> Vec<TargetRow>;
}

/// Spread weight 1/N across the rows `invest` selects on each date.
///
/// Dates where nothing is selected get all-zero weights (fully in cash).
pub(crate) fn spread_equally(
    panel: &FeaturePanel,
    invest: impl Fn(&FeatureRow) -> bool,
) -> Vec<TargetRow> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for rows in panel.by_ticker.values() {
        for row in rows {
            if invest(row) {
                *counts.entry(row.date).or_default() += 1;
            }
        }
    }

    let mut out = Vec::new();
    for (ticker, rows) in &panel.by_ticker {
        for row in rows {
            let n = counts.get(&row.date).copied().unwrap_or(0);
            let weight = if n > 0 && invest(row) {
                1.0 / n as f64
            } else {
                0.0
            };
            out.push(TargetRow {
                date: row.date,
                ticker: ticker.clone(),
                close: row.close,
                weight,
            });
        }
    }
    out
}
