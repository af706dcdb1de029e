//! Pairwise statistical-arbitrage analysis.
//!
//! Given the price histories of two symbols, the pipeline correlates their
//! returns, runs an Engle-Granger cointegration test on the price levels and,
//! for cointegrated pairs, builds the spread and its Z-scores.

pub mod analysis;
pub mod cli;
pub mod market_data;
pub mod math;
pub mod observability;
pub mod report;
pub mod strategy;
pub mod types;

pub use strategy::{run_arbitrage_strategy, StrategyError, StrategyOutcome};
