//! Pairs Arbitrage Strategy
//!
//! Orchestrates the analysis of one symbol pair: fetch both histories,
//! correlate their returns, test the price levels for cointegration and,
//! for cointegrated pairs only, build the spread and its Z-scores.

pub mod arbitrage;
pub mod config;

pub use arbitrage::{run_arbitrage_strategy, ArbitrageStrategy};
pub use config::StrategyConfig;

use crate::analysis::{AnalysisError, CointegrationTest, ReturnCorrelation, ZScoreSeries};
use serde::Serialize;
use thiserror::Error;

/// Errors that escape a pipeline run. Everything else is reported and
/// turned into a [`StrategyOutcome`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Exactly two symbols are required for the arbitrage strategy.")]
    InvalidSymbolCount { got: usize },
}

/// Everything computed for a pair that made it through the cointegration test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairAnalysis {
    pub symbols: [String; 2],
    pub period: String,
    pub interval: String,
    pub correlation: ReturnCorrelation,
    pub cointegration: CointegrationTest,
    pub significance: f64,
    pub cointegrated: bool,
    /// Present only for cointegrated pairs
    pub spread: Option<ZScoreSeries>,
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// A history could not be fetched; no analysis ran
    FetchFailed { symbol: String, message: String },
    /// Returns were correlated but the cointegration test could not run
    Inconclusive {
        correlation: ReturnCorrelation,
        error: AnalysisError,
    },
    NotCointegrated(PairAnalysis),
    Cointegrated(PairAnalysis),
}

impl StrategyOutcome {
    pub fn analysis(&self) -> Option<&PairAnalysis> {
        match self {
            StrategyOutcome::NotCointegrated(a) | StrategyOutcome::Cointegrated(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_cointegrated(&self) -> bool {
        matches!(self, StrategyOutcome::Cointegrated(_))
    }
}
