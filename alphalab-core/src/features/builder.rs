//! Per-ticker feature computation and the strict timing shift.
//!
//! Features are computed per ticker on date-sorted closes — no value from
//! one ticker's series ever enters another's windows — and then every
//! feature column is shifted one day later within its ticker. A feature
//! value visible on day T therefore only contains information through the
//! close of day T−1. Downstream strategies trust this shift and never touch
//! same-day raw features.

use crate::data::RawBar;
use crate::features::rolling::{lag_one, log_returns, rolling_mean, rolling_std};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// One ticker-date after feature computation. The close is the raw same-day
/// close (tradeable); every feature field is already shifted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub return_1d: f64,
    pub return_5d: f64,
    pub return_20d: f64,
    pub volatility: f64,
    /// SMA(short) / SMA(long); > 1 indicates an uptrend. `NaN` until the
    /// long window (plus the shift) has filled.
    pub trend_ratio: f64,
}

/// Feature rows per ticker, sorted by date within each ticker.
#[derive(Debug, Clone, Default)]
pub struct FeaturePanel {
    pub by_ticker: BTreeMap<String, Vec<FeatureRow>>,
}

impl FeaturePanel {
    pub fn ticker_count(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn rows(&self, ticker: &str) -> Option<&[FeatureRow]> {
        self.by_ticker.get(ticker).map(|v| v.as_slice())
    }
}

/// Computes the feature set for every ticker.
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder {
    pub volatility_window: usize,
    pub trend_short: usize,
    pub trend_long: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self {
            volatility_window: 20,
            trend_short: 20,
            trend_long: 200,
        }
    }
}

impl FeatureBuilder {
    /// Compute features for all tickers and apply the timing shift.
    pub fn build(&self, bars_by_ticker: &HashMap<String, Vec<RawBar>>) -> FeaturePanel {
        let mut panel = FeaturePanel::default();
        for (ticker, bars) in bars_by_ticker {
            panel
                .by_ticker
                .insert(ticker.clone(), self.build_one(bars));
        }
        panel
    }

    fn build_one(&self, bars: &[RawBar]) -> Vec<FeatureRow> {
        let mut sorted: Vec<&RawBar> = bars.iter().collect();
        sorted.sort_by_key(|bar| bar.date);

        let closes: Vec<f64> = sorted.iter().map(|bar| bar.close).collect();

        let r1 = lag_one(&log_returns(&closes, 1));
        let r5 = lag_one(&log_returns(&closes, 5));
        let r20 = lag_one(&log_returns(&closes, 20));
        let vol = lag_one(&rolling_std(
            &log_returns(&closes, 1),
            self.volatility_window,
        ));
        let trend = lag_one(&trend_ratio(&closes, self.trend_short, self.trend_long));

        sorted
            .iter()
            .enumerate()
            .map(|(i, bar)| FeatureRow {
                date: bar.date,
                close: bar.close,
                return_1d: r1[i],
                return_5d: r5[i],
                return_20d: r20[i],
                volatility: vol[i],
                trend_ratio: trend[i],
            })
            .collect()
    }
}

/// Ratio of a fast moving average to a slow one, elementwise.
fn trend_ratio(closes: &[f64], short: usize, long: usize) -> Vec<f64> {
    let fast = rolling_mean(closes, short);
    let slow = rolling_mean(closes, long);
    fast.iter()
        .zip(&slow)
        .map(|(&f, &s)| if s != 0.0 { f / s } else { f64::NAN })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{assert_approx, DEFAULT_EPSILON};

    fn bars(ticker: &str, closes: &[f64]) -> (String, Vec<RawBar>) {
        let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| RawBar {
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 100,
                adj_close: close,
            })
            .collect();
        (ticker.to_string(), bars)
    }

    fn small_builder() -> FeatureBuilder {
        FeatureBuilder {
            volatility_window: 2,
            trend_short: 1,
            trend_long: 2,
        }
    }

    #[test]
    fn shift_makes_day_t_carry_day_t_minus_1() {
        // Prices double, stay flat, double.
        let mut input = HashMap::new();
        let (k, v) = bars("AAA", &[10.0, 20.0, 20.0, 40.0]);
        input.insert(k, v);

        let panel = FeatureBuilder::default().build(&input);
        let rows = panel.rows("AAA").unwrap();

        // Day 1: no past data, shifted feature is NaN.
        assert!(rows[0].return_1d.is_nan());
        // Day 2: day 1's raw return was itself NaN.
        assert!(rows[1].return_1d.is_nan());
        // Day 3 carries day 2's return, ln(2).
        assert_approx(rows[2].return_1d, 2.0_f64.ln(), DEFAULT_EPSILON);
        // Day 4 carries day 3's return, 0.
        assert_approx(rows[3].return_1d, 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn tickers_do_not_bleed_into_each_other() {
        let mut input = HashMap::new();
        let (k, v) = bars("AAA", &[10.0, 20.0]);
        input.insert(k, v);
        let (k, v) = bars("BBB", &[100.0, 50.0]);
        input.insert(k, v);

        let panel = FeatureBuilder::default().build(&input);
        let b = panel.rows("BBB").unwrap();

        // BBB's day-2 feature is NaN (its own day-1 return was NaN), not
        // AAA's ln(2).
        assert!(b[1].return_1d.is_nan());
    }

    #[test]
    fn unsorted_bars_are_sorted_before_windows() {
        let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut input = HashMap::new();
        input.insert(
            "AAA".to_string(),
            vec![
                RawBar {
                    date: base + chrono::Duration::days(1),
                    open: 20.0,
                    high: 20.0,
                    low: 20.0,
                    close: 20.0,
                    volume: 100,
                    adj_close: 20.0,
                },
                RawBar {
                    date: base,
                    open: 10.0,
                    high: 10.0,
                    low: 10.0,
                    close: 10.0,
                    volume: 100,
                    adj_close: 10.0,
                },
                RawBar {
                    date: base + chrono::Duration::days(2),
                    open: 40.0,
                    high: 40.0,
                    low: 40.0,
                    close: 40.0,
                    volume: 100,
                    adj_close: 40.0,
                },
            ],
        );

        let panel = FeatureBuilder::default().build(&input);
        let rows = panel.rows("AAA").unwrap();
        assert_eq!(rows[0].close, 10.0);
        assert_eq!(rows[2].close, 40.0);
        // Day 3 carries day 2's return ln(20/10).
        assert_approx(rows[2].return_1d, 2.0_f64.ln(), DEFAULT_EPSILON);
    }

    #[test]
    fn trend_ratio_defined_after_long_window_plus_shift() {
        let mut input = HashMap::new();
        let (k, v) = bars("AAA", &[10.0, 10.0, 20.0, 20.0]);
        input.insert(k, v);

        let panel = small_builder().build(&input);
        let rows = panel.rows("AAA").unwrap();

        // long=2 → raw ratio valid from index 1; shifted → visible from 2.
        assert!(rows[0].trend_ratio.is_nan());
        assert!(rows[1].trend_ratio.is_nan());
        // Raw day 2: sma1=10 / sma2=mean(10,10)=10 → 1.0, visible day 3.
        assert_approx(rows[2].trend_ratio, 1.0, DEFAULT_EPSILON);
        // Raw day 3: 20 / mean(10,20)=15 → 4/3, visible day 4.
        assert_approx(rows[3].trend_ratio, 20.0 / 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn volatility_uses_shifted_one_day_returns() {
        let mut input = HashMap::new();
        let (k, v) = bars("AAA", &[10.0, 20.0, 10.0, 20.0, 10.0]);
        input.insert(k, v);

        let panel = small_builder().build(&input);
        let rows = panel.rows("AAA").unwrap();

        // Raw 1d returns: [NaN, ln2, -ln2, ln2, -ln2]; window 2 first valid
        // at raw index 2; shifted → visible at index 3.
        assert!(rows[2].volatility.is_nan());
        let ln2 = 2.0_f64.ln();
        // std([ln2, -ln2]) with n-1: sqrt(2) * ln2
        assert_approx(rows[3].volatility, 2.0_f64.sqrt() * ln2, DEFAULT_EPSILON);
    }
}
