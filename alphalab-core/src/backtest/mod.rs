//! Backtest pipeline: long-to-wide alignment, the day-by-day simulation
//! loop, and equity curve derivation.

pub mod align;
pub mod engine;
pub mod report;

pub use align::{build_matrices, AlignError, TargetRow};
pub use engine::{rebalance_day, simulate, DayOutcome, EngineError, SimConfig};
pub use report::EquityCurve;
