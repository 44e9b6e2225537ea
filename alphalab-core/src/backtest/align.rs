//! Long-to-wide matrix alignment.
//!
//! Pivots long-format (date, ticker) rows into a price matrix and a target
//! weight matrix over the union of dates and tickers. Prices are
//! forward-filled within each ticker column; a ticker with no price history
//! yet stays `NaN` (no back-filling). Weights default to 0.0 where absent.

use crate::domain::{PriceMatrix, WeightMatrix, WideMatrix};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// One long-format observation: a ticker's close and target weight on a date.
///
/// The weight is whatever the strategy layer assigned for this date — the
/// aligner does not interpret it.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
    pub weight: f64,
}

/// Structural pivot failures. Data-quality gaps (missing prices) are not
/// errors — they become `NaN` cells.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("no rows to align")]
    Empty,

    #[error("duplicate (date, ticker) pair: ({date}, {ticker})")]
    DuplicateEntry { date: NaiveDate, ticker: String },
}

/// Pivot long rows into aligned (price, weight) matrices.
///
/// Pure transform: the output axes are the sorted union of input dates and
/// tickers, shared by both matrices. Duplicate (date, ticker) pairs make the
/// grid non-rectangular and are rejected.
pub fn build_matrices(rows: &[TargetRow]) -> Result<(PriceMatrix, WeightMatrix), AlignError> {
    if rows.is_empty() {
        return Err(AlignError::Empty);
    }

    let mut date_set = BTreeSet::new();
    let mut ticker_set = BTreeSet::new();
    for row in rows {
        date_set.insert(row.date);
        ticker_set.insert(row.ticker.as_str());
    }
    let dates: Vec<NaiveDate> = date_set.into_iter().collect();
    let tickers: Vec<String> = ticker_set.into_iter().map(String::from).collect();

    let date_idx: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
    let ticker_idx: HashMap<&str, usize> = tickers
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut prices = WideMatrix::filled(dates.clone(), tickers.clone(), f64::NAN);
    let mut weights = WideMatrix::filled(dates, tickers.clone(), 0.0);
    let mut occupied = vec![false; prices.n_dates() * prices.n_tickers()];

    for row in rows {
        let t = date_idx[&row.date];
        let i = ticker_idx[row.ticker.as_str()];
        let cell = t * prices.n_tickers() + i;
        if occupied[cell] {
            return Err(AlignError::DuplicateEntry {
                date: row.date,
                ticker: row.ticker.clone(),
            });
        }
        occupied[cell] = true;
        prices.set(t, i, row.close);
        weights.set(t, i, row.weight);
    }

    forward_fill_columns(&mut prices);

    Ok((prices, weights))
}

/// Carry the last known value forward down each ticker column.
///
/// Leading gaps stay `NaN` — a ticker that has not traded yet has no price.
fn forward_fill_columns(matrix: &mut WideMatrix) {
    for i in 0..matrix.n_tickers() {
        let mut last = f64::NAN;
        for t in 0..matrix.n_dates() {
            let value = matrix.get(t, i);
            if value.is_nan() {
                matrix.set(t, i, last);
            } else {
                last = value;
            }
        }
    }
}
