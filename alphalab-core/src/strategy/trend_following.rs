//! Trend-following allocation.

use super::{spread_equally, WeightStrategy};
use crate::backtest::TargetRow;
use crate::features::FeaturePanel;

/// Invests 1/N across assets whose fast moving average sits above the slow
/// one (trend ratio > 1), and moves fully to cash when nothing is in an
/// uptrend.
///
/// An undefined trend ratio never counts as bullish, so assets still inside
/// their warmup window stay excluded the same way they do for the
/// equal-weight baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendFollowing;

impl WeightStrategy for TrendFollowing {
    fn name(&self) -> &str {
        "trend_following"
    }

    fn assign(&self, panel: &FeaturePanel) -> Vec<TargetRow> {
        spread_equally(panel, |row| row.trend_ratio > 1.0)
    }
}
