use super::{PairAnalysis, StrategyConfig, StrategyError, StrategyOutcome};
use crate::analysis::{cointegration_test, compute_spread, correlate_returns, z_scores};
use crate::market_data::MarketDataFetcher;
use crate::report::{ConsoleReport, ReportSink};
use crate::types::TimeSeries;
use tracing::{debug, info, warn};

/// One pair analysis wired to a data source and a report sink.
pub struct ArbitrageStrategy<'a> {
    fetcher: &'a dyn MarketDataFetcher,
    report: &'a dyn ReportSink,
    config: StrategyConfig,
}

impl<'a> ArbitrageStrategy<'a> {
    pub fn new(
        fetcher: &'a dyn MarketDataFetcher,
        report: &'a dyn ReportSink,
        config: StrategyConfig,
    ) -> Self {
        Self {
            fetcher,
            report,
            config,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Run the full pipeline for exactly two symbols.
    ///
    /// Only a wrong symbol count is returned as an error, and it is raised
    /// before anything is fetched. Fetch and analysis failures are reported
    /// to the sink and end the run with the matching [`StrategyOutcome`].
    pub fn run<S: AsRef<str>>(
        &self,
        symbols: &[S],
        period: &str,
        interval: &str,
    ) -> Result<StrategyOutcome, StrategyError> {
        let [symbol1, symbol2] = symbols else {
            return Err(StrategyError::InvalidSymbolCount { got: symbols.len() });
        };
        let (symbol1, symbol2) = (symbol1.as_ref(), symbol2.as_ref());

        info!(
            symbol1 = symbol1,
            symbol2 = symbol2,
            period = period,
            interval = interval,
            "Starting pair analysis"
        );

        let series1 = match self.fetch(symbol1, period, interval) {
            Ok(series) => series,
            Err(outcome) => return Ok(outcome),
        };
        let series2 = match self.fetch(symbol2, period, interval) {
            Ok(series) => series,
            Err(outcome) => return Ok(outcome),
        };

        let correlation = correlate_returns(&series1, &series2, symbol1, symbol2);
        info!(
            correlation = correlation.coefficient,
            observations = correlation.observations,
            "Return correlation"
        );
        self.report.correlation(&correlation);

        let cointegration = match cointegration_test(&series1, &series2) {
            Ok(test) => test,
            Err(error) => {
                warn!(error = %error, "Cointegration test failed");
                self.report.cointegration_failed(&error);
                return Ok(StrategyOutcome::Inconclusive { correlation, error });
            }
        };

        let significance = self.config.significance;
        let cointegrated = cointegration.is_cointegrated(significance);
        info!(
            p_value = cointegration.p_value,
            statistic = cointegration.statistic,
            cointegrated = cointegrated,
            "Cointegration test"
        );
        self.report.cointegration(&cointegration, cointegrated, significance);

        let mut analysis = PairAnalysis {
            symbols: [symbol1.to_string(), symbol2.to_string()],
            period: period.to_string(),
            interval: interval.to_string(),
            correlation,
            cointegration,
            significance,
            cointegrated,
            spread: None,
        };

        if !cointegrated {
            return Ok(StrategyOutcome::NotCointegrated(analysis));
        }

        let mode = self
            .config
            .hedge_ratio
            .resolve(analysis.cointegration.hedge_ratio);
        let records = compute_spread(&series1, &series2, mode);
        let spread = z_scores(&records, mode, self.config.entry_z);

        if let Some(latest) = spread.latest() {
            info!(
                hedge_ratio = %mode,
                z_score = latest.z_score,
                signal = %latest.signal,
                "Latest spread"
            );
        }
        self.report.spread(&spread, self.config.tail_rows);

        analysis.spread = Some(spread);
        Ok(StrategyOutcome::Cointegrated(analysis))
    }

    fn fetch(&self, symbol: &str, period: &str, interval: &str) -> Result<TimeSeries, StrategyOutcome> {
        match self.fetcher.fetch(symbol, period, interval) {
            Ok(series) => {
                debug!(symbol = symbol, rows = series.len(), "Fetched series");
                self.report.series_loaded(symbol, &series);
                Ok(series)
            }
            Err(e) => {
                warn!(symbol = symbol, error = %e, "Fetch failed");
                self.report.fetch_failed(symbol, &e);
                Err(StrategyOutcome::FetchFailed {
                    symbol: symbol.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

/// Run the pair analysis with default settings, reporting to stdout.
pub fn run_arbitrage_strategy<S: AsRef<str>>(
    fetcher: &dyn MarketDataFetcher,
    symbols: &[S],
    period: &str,
    interval: &str,
) -> Result<StrategyOutcome, StrategyError> {
    let report = ConsoleReport::new();
    ArbitrageStrategy::new(fetcher, &report, StrategyConfig::default()).run(symbols, period, interval)
}
