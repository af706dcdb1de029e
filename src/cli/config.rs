//! CLI configuration bridging parsed arguments to validated domain types.

use super::Cli;
use crate::analysis::HedgeRatioChoice;
use crate::strategy::StrategyConfig;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Where price histories are loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// `<data_dir>/<SYMBOL>.csv` bar files
    Csv,
    /// Deterministic generated prices
    Synthetic,
}

impl FromStr for DataSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" | "file" => Ok(Self::Csv),
            "synthetic" | "synth" => Ok(Self::Synthetic),
            _ => Err(ConfigError::UnknownSource(s.to_string())),
        }
    }
}

/// Errors that can occur when validating CLI configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid significance {0}: must be strictly between 0 and 1")]
    InvalidSignificance(f64),

    #[error("Tail rows must be at least 1")]
    InvalidTailRows,

    #[error("Invalid entry Z-score {0}: must be positive")]
    InvalidEntryZ(f64),

    #[error("Unknown data source: '{0}'. Use 'csv' or 'synthetic'")]
    UnknownSource(String),

    #[error("{0}")]
    UnknownHedgeRatio(String),
}

/// Validated settings for one `statarb` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    pub period: String,
    pub interval: String,
    pub source: DataSource,
    pub data_dir: PathBuf,
    pub output: Option<PathBuf>,
    pub strategy: StrategyConfig,
}

impl TryFrom<&Cli> for RunConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if !(cli.significance > 0.0 && cli.significance < 1.0) {
            return Err(ConfigError::InvalidSignificance(cli.significance));
        }
        if cli.tail == 0 {
            return Err(ConfigError::InvalidTailRows);
        }
        if !(cli.entry_z > 0.0) || !cli.entry_z.is_finite() {
            return Err(ConfigError::InvalidEntryZ(cli.entry_z));
        }
        let hedge_ratio =
            HedgeRatioChoice::from_str(&cli.hedge_ratio).map_err(ConfigError::UnknownHedgeRatio)?;

        Ok(Self {
            symbols: cli.symbols.clone(),
            period: cli.period.clone(),
            interval: cli.interval.clone(),
            source: cli.source.parse()?,
            data_dir: cli.data_dir.clone(),
            output: cli.output.clone(),
            strategy: StrategyConfig {
                significance: cli.significance,
                tail_rows: cli.tail,
                entry_z: cli.entry_z,
                hedge_ratio,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<RunConfig, ConfigError> {
        let mut argv = vec!["statarb", "--symbols", "KO", "PEP", "--source", "csv"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        RunConfig::try_from(&cli)
    }

    #[test]
    fn test_valid_config() {
        let config = parse(&["--hedge-ratio", "regression", "--tail", "10"]).unwrap();
        assert_eq!(config.source, DataSource::Csv);
        assert_eq!(config.strategy.tail_rows, 10);
        assert_eq!(config.strategy.hedge_ratio, HedgeRatioChoice::Regression);
    }

    #[test]
    fn test_rejects_bad_significance() {
        assert_eq!(
            parse(&["--significance", "1.5"]).unwrap_err(),
            ConfigError::InvalidSignificance(1.5)
        );
        assert!(parse(&["--significance", "0"]).is_err());
    }

    #[test]
    fn test_rejects_zero_tail_and_bad_entry() {
        assert_eq!(parse(&["--tail", "0"]).unwrap_err(), ConfigError::InvalidTailRows);
        assert!(matches!(
            parse(&["--entry-z", "0"]).unwrap_err(),
            ConfigError::InvalidEntryZ(_)
        ));
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!("Synthetic".parse::<DataSource>().unwrap(), DataSource::Synthetic);
        assert!(matches!(
            "yahoo".parse::<DataSource>().unwrap_err(),
            ConfigError::UnknownSource(_)
        ));
        assert!(matches!(
            parse(&["--hedge-ratio", "kalman"]).unwrap_err(),
            ConfigError::UnknownHedgeRatio(_)
        ));
    }
}
