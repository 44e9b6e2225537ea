//! Wide date × ticker matrix — the engine's input shape.
//!
//! Both prices and target weights are stored as one flat row-major `Vec<f64>`
//! over a shared, strictly increasing date axis and a fixed ticker axis.
//! The ticker axis is the precomputed superset for the whole run; tickers
//! that appear late in the sample simply carry `NaN` (prices) or 0.0
//! (weights) in their early rows. Per-date access is a slice borrow, so the
//! simulation loop does no allocation.

use chrono::NaiveDate;

/// Dense date × ticker matrix of `f64` values.
///
/// Missing prices are `f64::NAN`; missing weights are 0.0. The date axis is
/// strictly increasing (checked at construction).
#[derive(Debug, Clone, PartialEq)]
pub struct WideMatrix {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    values: Vec<f64>,
}

/// Close prices by date × ticker, forward-filled within each ticker column.
pub type PriceMatrix = WideMatrix;

/// Target allocation fractions by date × ticker.
pub type WeightMatrix = WideMatrix;

impl WideMatrix {
    /// Build a matrix filled with `fill`.
    ///
    /// Panics if the date axis is not strictly increasing — callers construct
    /// the axis from a `BTreeSet`, so a violation is a programming error, not
    /// a data condition.
    pub fn filled(dates: Vec<NaiveDate>, tickers: Vec<String>, fill: f64) -> Self {
        assert!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "date axis must be strictly increasing"
        );
        let values = vec![fill; dates.len() * tickers.len()];
        Self {
            dates,
            tickers,
            values,
        }
    }

    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn n_tickers(&self) -> usize {
        self.tickers.len()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Value at (date index, ticker index).
    pub fn get(&self, t: usize, i: usize) -> f64 {
        self.values[t * self.tickers.len() + i]
    }

    pub fn set(&mut self, t: usize, i: usize, value: f64) {
        let width = self.tickers.len();
        self.values[t * width + i] = value;
    }

    /// All values for one date, in ticker-axis order.
    pub fn row(&self, t: usize) -> &[f64] {
        let width = self.tickers.len();
        &self.values[t * width..(t + 1) * width]
    }

    /// True if both matrices share identical date and ticker axes.
    pub fn axes_match(&self, other: &WideMatrix) -> bool {
        self.dates == other.dates && self.tickers == other.tickers
    }

    /// Index of a ticker on the ticker axis.
    pub fn ticker_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn filled_matrix_shape() {
        let m = WideMatrix::filled(
            vec![d("2024-01-02"), d("2024-01-03")],
            vec!["SPY".into(), "QQQ".into(), "IWM".into()],
            f64::NAN,
        );
        assert_eq!(m.n_dates(), 2);
        assert_eq!(m.n_tickers(), 3);
        assert_eq!(m.row(0).len(), 3);
        assert!(m.get(1, 2).is_nan());
    }

    #[test]
    fn set_get_roundtrip() {
        let mut m = WideMatrix::filled(
            vec![d("2024-01-02"), d("2024-01-03")],
            vec!["SPY".into(), "QQQ".into()],
            0.0,
        );
        m.set(1, 0, 471.25);
        assert_eq!(m.get(1, 0), 471.25);
        assert_eq!(m.row(1), &[471.25, 0.0]);
        assert_eq!(m.row(0), &[0.0, 0.0]);
    }

    #[test]
    fn axes_match_requires_both_axes() {
        let a = WideMatrix::filled(vec![d("2024-01-02")], vec!["SPY".into()], 0.0);
        let b = WideMatrix::filled(vec![d("2024-01-02")], vec!["SPY".into()], 1.0);
        let c = WideMatrix::filled(vec![d("2024-01-03")], vec!["SPY".into()], 0.0);
        let e = WideMatrix::filled(vec![d("2024-01-02")], vec!["QQQ".into()], 0.0);
        assert!(a.axes_match(&b)); // values may differ
        assert!(!a.axes_match(&c));
        assert!(!a.axes_match(&e));
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn unsorted_date_axis_panics() {
        WideMatrix::filled(
            vec![d("2024-01-03"), d("2024-01-02")],
            vec!["SPY".into()],
            0.0,
        );
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn duplicate_date_axis_panics() {
        WideMatrix::filled(
            vec![d("2024-01-02"), d("2024-01-02")],
            vec!["SPY".into()],
            0.0,
        );
    }

    #[test]
    fn ticker_index_lookup() {
        let m = WideMatrix::filled(
            vec![d("2024-01-02")],
            vec!["QQQ".into(), "SPY".into()],
            0.0,
        );
        assert_eq!(m.ticker_index("SPY"), Some(1));
        assert_eq!(m.ticker_index("IWM"), None);
    }
}
