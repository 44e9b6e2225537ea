//! Performance metrics — pure functions over the equity curve.
//!
//! Every metric is a pure function: equity/return/turnover series in,
//! scalar out. No dependencies on the runner or the data pipeline.

use alphalab_core::backtest::EquityCurve;
use serde::{Deserialize, Serialize};

/// Trading days per year, used for annualization.
const TRADING_DAYS: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown: f64,
    /// Mean daily turnover fraction.
    pub avg_daily_turnover: f64,
    /// Mean daily turnover annualized (×252).
    pub annual_turnover: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a derived equity curve.
    pub fn compute(curve: &EquityCurve) -> Self {
        Self {
            total_return: total_return(&curve.equity),
            cagr: cagr(&curve.equity),
            sharpe: sharpe_ratio(&curve.net_return),
            sortino: sortino_ratio(&curve.net_return),
            calmar: calmar_ratio(&curve.equity),
            max_drawdown: max_drawdown(&curve.equity),
            avg_daily_turnover: mean(&curve.turnover),
            annual_turnover: mean(&curve.turnover) * TRADING_DAYS,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let initial = equity[0];
    let final_eq = *equity.last().unwrap();
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Compound annual growth rate, assuming 252 trading days per year.
pub fn cagr(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let initial = equity[0];
    let final_eq = *equity.last().unwrap();
    if initial <= 0.0 || final_eq <= 0.0 {
        return 0.0;
    }
    let years = equity.len() as f64 / TRADING_DAYS;
    (final_eq / initial).powf(1.0 / years) - 1.0
}

/// Annualized Sharpe ratio from daily net returns (risk-free rate 0).
///
/// Returns 0.0 when variance is zero or there are fewer than 2 returns.
pub fn sharpe_ratio(net_returns: &[f64]) -> f64 {
    if net_returns.len() < 2 {
        return 0.0;
    }
    let mean_ret = mean(net_returns);
    let std = std_dev(net_returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean_ret / std) * TRADING_DAYS.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
pub fn sortino_ratio(net_returns: &[f64]) -> f64 {
    if net_returns.len() < 2 {
        return 0.0;
    }
    let mean_ret = mean(net_returns);
    let downside_sq: Vec<f64> = net_returns
        .iter()
        .filter(|&&r| r < 0.0)
        .map(|r| r * r)
        .collect();
    if downside_sq.is_empty() {
        return 0.0; // no downside → ratio undefined
    }
    let downside_var = downside_sq.iter().sum::<f64>() / net_returns.len() as f64;
    let downside_std = downside_var.sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    (mean_ret / downside_std) * TRADING_DAYS.sqrt()
}

/// Calmar ratio: CAGR / |max drawdown|; 0.0 when drawdown is zero or CAGR
/// is non-positive.
pub fn calmar_ratio(equity: &[f64]) -> f64 {
    let c = cagr(equity);
    let dd = max_drawdown(equity);
    if dd >= 0.0 || c <= 0.0 {
        return 0.0;
    }
    c / dd.abs()
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
pub fn max_drawdown(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let mut peak = equity[0];
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphalab_core::domain::{BacktestRun, DailyRecord};
    use chrono::NaiveDate;

    fn curve_from(equity: &[f64], turnover: &[f64]) -> EquityCurve {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let run = BacktestRun {
            initial_capital: equity.first().copied().unwrap_or(1.0),
            records: equity
                .iter()
                .zip(turnover)
                .enumerate()
                .map(|(i, (&eq, &to))| DailyRecord {
                    date: base + chrono::Duration::days(i as i64),
                    equity: eq,
                    turnover: to,
                })
                .collect(),
        };
        EquityCurve::from_run(&run)
    }

    #[test]
    fn total_return_basic() {
        assert_eq!(total_return(&[100.0, 150.0]), 0.5);
        assert_eq!(total_return(&[100.0]), 0.0);
        assert_eq!(total_return(&[0.0, 150.0]), 0.0);
    }

    #[test]
    fn cagr_one_year_of_days() {
        // 252 days, 10% total → CAGR ≈ 10%.
        let mut equity = Vec::new();
        for i in 0..252 {
            equity.push(100.0 * (1.0 + 0.10 * i as f64 / 251.0));
        }
        let c = cagr(&equity);
        assert!((c - 0.10).abs() < 0.01, "cagr={c}");
    }

    #[test]
    fn max_drawdown_finds_worst_peak_to_trough() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 110.0, 80.0]);
        // Worst: 120 → 80 = -1/3.
        assert!((dd + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_monotonic_is_zero() {
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
    }

    #[test]
    fn sharpe_zero_for_constant_returns() {
        assert_eq!(sharpe_ratio(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn sharpe_positive_for_steady_gains() {
        let returns = vec![0.001; 100]
            .iter()
            .enumerate()
            .map(|(i, r)| r + (i % 2) as f64 * 0.0001)
            .collect::<Vec<_>>();
        assert!(sharpe_ratio(&returns) > 0.0);
    }

    #[test]
    fn sortino_zero_without_downside() {
        assert_eq!(sortino_ratio(&[0.01, 0.02, 0.0]), 0.0);
    }

    #[test]
    fn compute_bundles_all_metrics() {
        let curve = curve_from(&[100.0, 110.0, 105.0, 120.0], &[1.0, 0.2, 0.1, 0.0]);
        let metrics = PerformanceMetrics::compute(&curve);
        assert!((metrics.total_return - 0.2).abs() < 1e-12);
        assert!(metrics.max_drawdown < 0.0);
        assert!((metrics.avg_daily_turnover - 0.325).abs() < 1e-12);
        assert!((metrics.annual_turnover - 0.325 * 252.0).abs() < 1e-9);
    }
}
