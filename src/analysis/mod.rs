//! Pairwise Statistical Analysis
//!
//! The three analytical stages of the arbitrage pipeline:
//! - `correlation` - Pearson correlation of percentage returns
//! - `cointegration` - Engle-Granger test on price levels
//! - `spread` - hedge-ratio spread and full-window Z-scores
//!
//! # Example
//!
//! ```ignore
//! use statarb::analysis::{calculate_correlation, cointegration_test};
//!
//! let corr = calculate_correlation(&series1, &series2, "KO", "PEP");
//! let test = cointegration_test(&series1, &series2)?;
//! if test.is_cointegrated(0.05) { /* build the spread */ }
//! ```

pub mod cointegration;
pub mod correlation;
pub mod error;
pub mod spread;

pub use cointegration::{cointegration_test, CointegrationTest, CriticalValues};
pub use correlation::{calculate_correlation, correlate_returns, CorrelationMatrix, ReturnCorrelation};
pub use error::AnalysisError;
pub use spread::{
    compute_spread, z_scores, HedgeRatioChoice, HedgeRatioMode, SpreadRecord, SpreadSignal,
    ZScoreRow, ZScoreSeries,
};
