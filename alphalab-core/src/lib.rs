//! AlphaLab Core — iterative portfolio simulation over aligned wide matrices.
//!
//! This crate contains the heart of the backtesting platform:
//! - Domain types (wide date × ticker matrices, portfolio state, daily records)
//! - Long-to-wide matrix alignment with forward-filled prices
//! - Day-by-day simulation engine with proportional transaction costs
//! - Equity curve derivation (net and cumulative returns)
//! - Rolling features with a strict one-day timing shift (no look-ahead)
//! - Weight-assigning strategies (equal weight, trend following)
//! - Data layer (Yahoo Finance provider, CSV store, synthetic bars)

pub mod backtest;
pub mod data;
pub mod domain;
pub mod features;
pub mod strategy;
