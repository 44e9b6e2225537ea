//! Property tests for simulation invariants.
//!
//! Uses proptest to verify:
//! 1. Rebalancing alone conserves value — with zero cost, end-of-day equity
//!    equals the pre-trade portfolio value
//! 2. With cost, equity equals pre-trade value minus cost
//! 3. Untradeable prices leave exactly zero shares, whatever the weight
//! 4. Non-negative weights summing to ≤ 1 never allocate more than the
//!    portfolio is worth
//! 5. The return aggregator is idempotent and pins the first-day return to 0

use alphalab_core::backtest::{rebalance_day, EquityCurve};
use alphalab_core::domain::{BacktestRun, DailyRecord, PortfolioState};
use chrono::NaiveDate;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

const N_TICKERS: usize = 4;

/// Prices that are either tradeable or explicitly missing.
fn arb_price() -> impl Strategy<Value = f64> {
    prop_oneof![
        3 => (1.0..500.0_f64),
        1 => Just(f64::NAN),
        1 => Just(0.0),
    ]
}

fn arb_prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), N_TICKERS)
}

/// Non-negative weights with row sum ≤ 1 (cash residual implicit).
fn arb_weights() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..1.0_f64, N_TICKERS).prop_map(|raw| {
        let sum: f64 = raw.iter().sum();
        if sum > 1.0 {
            raw.iter().map(|w| w / sum).collect()
        } else {
            raw
        }
    })
}

fn arb_state() -> impl Strategy<Value = PortfolioState> {
    (
        100.0..1_000_000.0_f64,
        prop::collection::vec(0.0..1_000.0_f64, N_TICKERS),
    )
        .prop_map(|(cash, shares)| {
            let mut state = PortfolioState::new(cash, N_TICKERS);
            state.shares = shares;
            state
        })
}

fn relative_eq(a: f64, b: f64, scale: f64) -> bool {
    (a - b).abs() <= 1e-9 * scale.abs().max(1.0)
}

// ── 1 & 2. Value conservation ────────────────────────────────────────

proptest! {
    /// With zero cost, rebalancing neither creates nor destroys value.
    #[test]
    fn rebalance_conserves_value_without_cost(
        mut state in arb_state(),
        prices in arb_prices(),
        weights in arb_weights(),
    ) {
        let outcome = rebalance_day(&mut state, &prices, &weights, 0.0);
        prop_assert!(
            relative_eq(outcome.equity, outcome.pre_trade_value, outcome.pre_trade_value),
            "equity {} != pre-trade value {}",
            outcome.equity,
            outcome.pre_trade_value
        );
    }

    /// With cost, the only value lost is exactly the cost charged.
    #[test]
    fn equity_is_pre_trade_value_minus_cost(
        mut state in arb_state(),
        prices in arb_prices(),
        weights in arb_weights(),
        cost_bps in 0.0..200.0_f64,
    ) {
        let outcome = rebalance_day(&mut state, &prices, &weights, cost_bps / 10_000.0);
        prop_assert!(
            relative_eq(outcome.equity, outcome.pre_trade_value - outcome.cost, outcome.pre_trade_value),
            "equity {} != pv {} - cost {}",
            outcome.equity,
            outcome.pre_trade_value,
            outcome.cost
        );
    }
}

// ── 3. Untradeable price exclusion ───────────────────────────────────

proptest! {
    /// After the day, any ticker without a positive price holds exactly
    /// zero shares, independent of its target weight.
    #[test]
    fn untradeable_price_leaves_zero_shares(
        mut state in arb_state(),
        prices in arb_prices(),
        weights in arb_weights(),
    ) {
        rebalance_day(&mut state, &prices, &weights, 0.0005);
        for (i, &price) in prices.iter().enumerate() {
            if !(price > 0.0) {
                prop_assert_eq!(state.shares[i], 0.0);
            }
        }
    }
}

// ── 4. Weight-sum bound ──────────────────────────────────────────────

proptest! {
    /// Aggregate target capital never exceeds the portfolio value when
    /// weights are non-negative and sum to at most 1.
    #[test]
    fn bounded_weights_never_over_allocate(
        state in arb_state(),
        prices in arb_prices(),
        weights in arb_weights(),
    ) {
        let value = state.value(&prices);
        let allocated: f64 = weights.iter().map(|w| w * value).sum();
        prop_assert!(allocated <= value * (1.0 + 1e-12) + 1e-9);
    }

    /// The turnover denominator is guarded: a worthless portfolio reports
    /// zero turnover.
    #[test]
    fn worthless_portfolio_reports_zero_turnover(
        prices in arb_prices(),
        weights in arb_weights(),
    ) {
        let mut state = PortfolioState::new(0.0, N_TICKERS);
        state.cash = -500.0;
        let outcome = rebalance_day(&mut state, &prices, &weights, 0.0005);
        prop_assert_eq!(outcome.turnover, 0.0);
    }
}

// ── 5. Aggregator ────────────────────────────────────────────────────

fn arb_run() -> impl Strategy<Value = BacktestRun> {
    prop::collection::vec((-1_000.0..1_000_000.0_f64, 0.0..3.0_f64), 1..40).prop_map(
        |points| {
            let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
            BacktestRun {
                initial_capital: 100_000.0,
                records: points
                    .into_iter()
                    .enumerate()
                    .map(|(i, (equity, turnover))| DailyRecord {
                        date: base + chrono::Duration::days(i as i64),
                        equity,
                        turnover,
                    })
                    .collect(),
            }
        },
    )
}

proptest! {
    /// First-day net return is 0 for any input.
    #[test]
    fn first_day_return_is_always_zero(run in arb_run()) {
        let curve = EquityCurve::from_run(&run);
        prop_assert_eq!(curve.net_return[0], 0.0);
    }

    /// Re-running the aggregator yields bit-identical series.
    #[test]
    fn aggregator_is_idempotent(run in arb_run()) {
        let a = EquityCurve::from_run(&run);
        let b = EquityCurve::from_run(&run);
        for (x, y) in a.net_return.iter().zip(&b.net_return) {
            prop_assert_eq!(x.to_bits(), y.to_bits());
        }
        for (x, y) in a.cumulative_return.iter().zip(&b.cumulative_return) {
            prop_assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}
