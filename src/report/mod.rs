//! Pipeline Reporting
//!
//! Provides a pluggable `ReportSink` trait that receives each stage's
//! result as the arbitrage pipeline progresses:
//! - `ConsoleReport` - human-readable tables on stdout

pub mod console;

pub use console::ConsoleReport;

use crate::analysis::{AnalysisError, CointegrationTest, ReturnCorrelation, ZScoreSeries};
use crate::market_data::FetchError;
use crate::types::TimeSeries;

/// Receiver for the intermediate results of one pipeline run.
///
/// Calls arrive in pipeline order. `spread` is only called for cointegrated
/// pairs; nothing after `fetch_failed` is called for that run.
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink {
    /// A symbol's history was fetched
    fn series_loaded(&self, symbol: &str, series: &TimeSeries);

    /// A symbol's history could not be fetched
    fn fetch_failed(&self, symbol: &str, error: &FetchError);

    fn correlation(&self, result: &ReturnCorrelation);

    fn cointegration(&self, test: &CointegrationTest, cointegrated: bool, significance: f64);

    /// The cointegration test could not be run at all
    fn cointegration_failed(&self, error: &AnalysisError);

    /// Spread and Z-scores of a cointegrated pair; only the last `tail_rows`
    /// rows are meant for display.
    fn spread(&self, series: &ZScoreSeries, tail_rows: usize);
}
