//! Equal-weight baseline.

use super::{spread_equally, WeightStrategy};
use crate::backtest::TargetRow;
use crate::features::FeaturePanel;

/// Invests 1/N across every asset whose trend ratio is defined.
///
/// An asset becomes eligible once its slow moving-average window (plus the
/// one-day shift) has filled — this keeps day-one entries out without any
/// explicit warmup bookkeeping. Days with no eligible assets hold cash.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeight;

impl WeightStrategy for EqualWeight {
    fn name(&self) -> &str {
        "equal_weight"
    }

    fn assign(&self, panel: &FeaturePanel) -> Vec<TargetRow> {
        spread_equally(panel, |row| !row.trend_ratio.is_nan())
    }
}
