//! Window primitives over close series.

/// Backward-looking log return over `period` observations.
///
/// `out[i] = ln(values[i] / values[i - period])`; `NaN` for the first
/// `period` slots and wherever either endpoint is `NaN` or non-positive.
pub fn log_returns(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "return period must be >= 1");
    let mut result = vec![f64::NAN; values.len()];
    for i in period..values.len() {
        let current = values[i];
        let base = values[i - period];
        if current > 0.0 && base > 0.0 {
            result[i] = (current / base).ln();
        }
    }
    result
}

/// Rolling mean over a trailing window.
///
/// First valid value at index `window - 1`; a window containing `NaN`
/// produces `NaN`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "window must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().sum::<f64>() / window as f64;
    }
    result
}

/// Rolling sample standard deviation (n − 1 denominator) over a trailing
/// window.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 2, "std window must be >= 2");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>()
            / (window - 1) as f64;
        result[i] = var.sqrt();
    }
    result
}

/// Shift a series one slot later: `out[0] = NaN`, `out[i] = values[i - 1]`.
///
/// What was computed at the close of day T becomes available on day T+1.
pub fn lag_one(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if !values.is_empty() {
        result[1..].copy_from_slice(&values[..values.len() - 1]);
    }
    result
}
