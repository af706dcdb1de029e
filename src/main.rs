use chrono::Utc;
use clap::Parser;
use dotenv::dotenv;
use statarb::cli::{Cli, DataSource, RunConfig};
use statarb::market_data::{CsvFetcher, MarketDataFetcher, SyntheticFetcher};
use statarb::observability::init_logging;
use statarb::report::ConsoleReport;
use statarb::strategy::{ArbitrageStrategy, StrategyOutcome};
use std::fs;
use std::process;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from the .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.verbose)?;

    let config = match RunConfig::try_from(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let fetcher: Box<dyn MarketDataFetcher> = match config.source {
        DataSource::Csv => Box::new(CsvFetcher::new(config.data_dir.clone())),
        DataSource::Synthetic => Box::new(SyntheticFetcher::new(Utc::now())),
    };
    info!(source = ?config.source, data_dir = %config.data_dir.display(), "Data source ready");

    let report = ConsoleReport::new();
    let strategy = ArbitrageStrategy::new(fetcher.as_ref(), &report, config.strategy);
    let outcome = match strategy.run(&config.symbols, &config.period, &config.interval) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    if let Some(path) = &config.output {
        match outcome.analysis() {
            Some(analysis) => {
                fs::write(path, serde_json::to_string_pretty(analysis)?)?;
                info!(path = %path.display(), "Analysis written");
            }
            None => info!(path = %path.display(), "Nothing to write, analysis incomplete"),
        }
    }

    if let StrategyOutcome::Cointegrated(analysis) = &outcome {
        if let Some(latest) = analysis.spread.as_ref().and_then(|s| s.latest()) {
            println!("\nLatest signal: {} (z = {:.4})", latest.signal, latest.z_score);
        }
    }

    Ok(())
}
