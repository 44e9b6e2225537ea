//! Domain types for AlphaLab

pub mod matrix;
pub mod portfolio;
pub mod record;

pub use matrix::{PriceMatrix, WeightMatrix, WideMatrix};
pub use portfolio::PortfolioState;
pub use record::{BacktestRun, DailyRecord};

/// Ticker symbol type alias
pub type Ticker = String;
