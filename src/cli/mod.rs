//! CLI argument parsing using clap.
//!
//! `statarb` takes a pair of symbols plus the usual period/interval
//! shorthands and runs one pair analysis. Data source settings can also
//! come from the environment (or a `.env` file).

mod config;

pub use config::{ConfigError, DataSource, RunConfig};

use clap::Parser;
use std::path::PathBuf;

/// StatArb - pairwise correlation, cointegration and spread analysis
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ticker symbols to analyse (exactly two, e.g. --symbols KO PEP)
    #[arg(long, num_args = 1.., required = true)]
    pub symbols: Vec<String>,

    /// Time period to fetch data for (e.g., '1d', '1mo', '1y', 'ytd', 'max')
    #[arg(long, default_value = "1d")]
    pub period: String,

    /// Data interval (e.g., '1m', '1h', '1d', '1wk')
    #[arg(long, default_value = "1h")]
    pub interval: String,

    /// Where prices come from: 'csv' or 'synthetic'
    #[arg(long, env = "STATARB_SOURCE", default_value = "csv")]
    pub source: String,

    /// Directory holding <SYMBOL>.csv files
    #[arg(long, env = "STATARB_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Cointegration p-value threshold
    #[arg(long, default_value_t = 0.05)]
    pub significance: f64,

    /// Number of most recent spread rows to print
    #[arg(long, default_value_t = 5)]
    pub tail: usize,

    /// |Z| at which a spread row is flagged as a trade signal
    #[arg(long, default_value_t = 2.0)]
    pub entry_z: f64,

    /// Hedge ratio for the spread: 'per-row', 'mean' or 'regression'
    #[arg(long, default_value = "per-row")]
    pub hedge_ratio: String,

    /// Write the analysis as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_entry_point() {
        let cli = Cli::try_parse_from(["statarb", "--symbols", "KO", "PEP"]).unwrap();
        assert_eq!(cli.symbols, vec!["KO", "PEP"]);
        assert_eq!(cli.period, "1d");
        assert_eq!(cli.interval, "1h");
        assert_eq!(cli.tail, 5);
        assert_eq!(cli.verbose, "info");
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_symbols_required() {
        assert!(Cli::try_parse_from(["statarb", "--period", "1mo"]).is_err());
    }

    #[test]
    fn test_three_symbols_parse() {
        // Symbol count is checked by the pipeline, not the parser
        let cli = Cli::try_parse_from(["statarb", "--symbols", "A", "B", "C"]).unwrap();
        assert_eq!(cli.symbols.len(), 3);
    }
}
