//! Day-by-day portfolio simulation.
//!
//! Replays aligned price and target-weight matrices one date at a time,
//! maintaining the single portfolio state and applying a flat proportional
//! cost to traded notional. The recurrence is inherently sequential: each
//! date's trades depend on the previous date's shares and cash, and costs
//! are a nonlinear drag on compounding, so there is no closed-form
//! vectorized equivalent. Parallelism belongs across independent runs, not
//! across dates.

use crate::domain::{BacktestRun, DailyRecord, PortfolioState, PriceMatrix, WeightMatrix};
use thiserror::Error;

/// Simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub initial_capital: f64,
    /// Proportional cost in basis points of traded notional.
    pub cost_bps: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            cost_bps: 5.0,
        }
    }
}

impl SimConfig {
    /// Cost rate as a fraction of traded notional.
    pub fn cost_rate(&self) -> f64 {
        self.cost_bps / 10_000.0
    }

    /// Precondition check, run before the first transition.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_capital > 0.0) {
            return Err(EngineError::NonPositiveCapital(self.initial_capital));
        }
        if !(self.cost_bps >= 0.0) {
            return Err(EngineError::NegativeCostRate(self.cost_bps));
        }
        Ok(())
    }
}

/// Structural and precondition failures. Numeric data-quality conditions
/// (missing prices, empty eligible sets, zero portfolio value) are handled
/// by policy inside the loop and are never errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("initial capital must be > 0, got {0}")]
    NonPositiveCapital(f64),

    #[error("cost rate must be >= 0, got {0} bps")]
    NegativeCostRate(f64),

    #[error("price and weight matrices must share date and ticker axes")]
    AxisMismatch,
}

/// What one date's rebalance did to the portfolio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutcome {
    /// Cash + holdings marked at this date's prices, before trading.
    pub pre_trade_value: f64,
    /// Sum of absolute traded capital.
    pub traded_notional: f64,
    /// Cost charged on the traded notional.
    pub cost: f64,
    /// Traded notional / pre-trade value (0 when value is not positive).
    pub turnover: f64,
    /// Cash + holdings after trading, marked at this date's prices.
    pub equity: f64,
}

/// Rebalance the portfolio to the date's target weights at the date's prices.
///
/// A non-positive or missing price makes a ticker untradeable for the day:
/// its holdings mark at 0 and its target share count is 0, so capital
/// nominally allocated to it idles as cash rather than being redistributed
/// to other assets. Shares are fully replaced by the targets — the trade is
/// assumed to execute at this date's close with no impact beyond the flat
/// cost rate.
pub fn rebalance_day(
    state: &mut PortfolioState,
    prices: &[f64],
    weights: &[f64],
    cost_rate: f64,
) -> DayOutcome {
    debug_assert_eq!(prices.len(), state.shares.len());
    debug_assert_eq!(weights.len(), state.shares.len());

    let pre_trade_value = state.value(prices);

    let mut traded_notional = 0.0;
    let mut traded_net = 0.0;
    for i in 0..state.shares.len() {
        let price = prices[i];
        let tradeable = price > 0.0;
        let target_shares = if tradeable {
            weights[i] * pre_trade_value / price
        } else {
            0.0
        };
        let trade_capital = if tradeable {
            (target_shares - state.shares[i]) * price
        } else {
            0.0
        };
        traded_notional += trade_capital.abs();
        traded_net += trade_capital;
        state.shares[i] = target_shares;
    }

    let cost = traded_notional * cost_rate;
    let turnover = if pre_trade_value > 0.0 {
        traded_notional / pre_trade_value
    } else {
        0.0
    };

    state.cash -= traded_net + cost;

    DayOutcome {
        pre_trade_value,
        traded_notional,
        cost,
        turnover,
        equity: state.value(prices),
    }
}

/// Run a full simulation over the aligned matrices.
///
/// Starts from all cash and zero shares, applies one `rebalance_day`
/// transition per date in ascending order, and emits one record per date.
/// Negative equity is representable and not fatal: there is no bankruptcy
/// cutoff, only the turnover denominator is guarded.
pub fn simulate(
    prices: &PriceMatrix,
    weights: &WeightMatrix,
    config: &SimConfig,
) -> Result<BacktestRun, EngineError> {
    config.validate()?;
    if !prices.axes_match(weights) {
        return Err(EngineError::AxisMismatch);
    }

    let cost_rate = config.cost_rate();
    let mut state = PortfolioState::new(config.initial_capital, prices.n_tickers());
    let mut records = Vec::with_capacity(prices.n_dates());

    for t in 0..prices.n_dates() {
        let outcome = rebalance_day(&mut state, prices.row(t), weights.row(t), cost_rate);
        records.push(DailyRecord {
            date: prices.dates()[t],
            equity: outcome.equity,
            turnover: outcome.turnover,
        });
    }

    Ok(BacktestRun {
        initial_capital: config.initial_capital,
        records,
    })
}
