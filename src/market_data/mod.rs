//! Market Data Collaborators
//!
//! The arbitrage pipeline only sees the [`MarketDataFetcher`] trait. Two
//! implementations ship with the crate:
//! - `CsvFetcher` - reads `<data_dir>/<SYMBOL>.csv` bar files
//! - `SyntheticFetcher` - deterministic generated prices for offline runs

pub mod csv;
pub mod period;
pub mod synthetic;

pub use self::csv::CsvFetcher;
pub use period::{Interval, Period};
pub use synthetic::SyntheticFetcher;

use crate::types::TimeSeries;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while retrieving a price history.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid period '{0}'. Expected e.g. 1d, 5d, 1wk, 1mo, 3mo, 1y, ytd or max")]
    InvalidPeriod(String),

    #[error("Invalid interval '{0}'. Expected e.g. 1m, 5m, 1h, 1d, 1wk or 1mo")]
    InvalidInterval(String),

    #[error("No data found for {symbol} (period={period}, interval={interval})")]
    NoData {
        symbol: String,
        period: String,
        interval: String,
    },

    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Unparseable timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data frame error: {0}")]
    Polars(#[from] PolarsError),
}

/// Source of historical closing prices.
///
/// `period` and `interval` are shorthand strings (`"1mo"`, `"1h"`); an
/// implementation rejects combinations it cannot serve with a `FetchError`.
#[cfg_attr(test, mockall::automock)]
pub trait MarketDataFetcher {
    fn fetch(&self, symbol: &str, period: &str, interval: &str) -> Result<TimeSeries, FetchError>;
}
