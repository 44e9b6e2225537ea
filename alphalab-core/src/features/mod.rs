//! Rolling features with a strict one-day availability shift.
//!
//! All window functions follow the same convention: output has the input's
//! length, with `NaN` during warmup and wherever a window contains `NaN`.

pub mod builder;
pub mod rolling;

pub use builder::{FeatureBuilder, FeaturePanel, FeatureRow};
pub use rolling::{lag_one, log_returns, rolling_mean, rolling_std};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for feature tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
