//! Console report
//!
//! Prints each stage to stdout as it completes. Tabular output (price
//! history, correlation matrix, spread tail) goes through polars so the
//! tables get its column layout and row elision.

use super::ReportSink;
use crate::analysis::{
    AnalysisError, CointegrationTest, CorrelationMatrix, ReturnCorrelation, ZScoreRow,
    ZScoreSeries,
};
use crate::market_data::FetchError;
use crate::types::TimeSeries;
use polars::prelude::*;
use tracing::warn;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Report sink that writes human-readable output to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReport;

impl ConsoleReport {
    pub fn new() -> Self {
        Self
    }
}

impl ReportSink for ConsoleReport {
    fn series_loaded(&self, symbol: &str, series: &TimeSeries) {
        println!("\n{} Data:", symbol);
        print_frame(series_frame(series));
    }

    fn fetch_failed(&self, symbol: &str, error: &FetchError) {
        println!("Error fetching data for {}: {}", symbol, error);
    }

    fn correlation(&self, result: &ReturnCorrelation) {
        println!("\nCorrelation matrix of returns:");
        print_frame(matrix_frame(&result.matrix));
        println!(
            "Correlation between {} and {}: {:.4} ({} observations)",
            result.matrix.labels[0], result.matrix.labels[1], result.coefficient, result.observations
        );
    }

    fn cointegration(&self, test: &CointegrationTest, cointegrated: bool, significance: f64) {
        let cv = &test.critical_values;
        println!(
            "\nCointegration test: statistic={:.4}, p-value={:.4} (nobs={}, lag={})",
            test.statistic, test.p_value, test.nobs, test.used_lag
        );
        println!(
            "Critical values: 1%={:.4}, 5%={:.4}, 10%={:.4}",
            cv.one_pct, cv.five_pct, cv.ten_pct
        );
        println!(
            "Hedge regression: price1 = {:.4} + {:.4} * price2",
            test.intercept, test.hedge_ratio
        );
        if cointegrated {
            println!("The pair is cointegrated (p < {}).", significance);
        } else {
            println!("The pair is not cointegrated (p >= {}).", significance);
        }
    }

    fn cointegration_failed(&self, error: &AnalysisError) {
        println!("\nCointegration test could not be run: {}", error);
    }

    fn spread(&self, series: &ZScoreSeries, tail_rows: usize) {
        println!(
            "\nSpread using {} hedge ratio: mean={:.6}, std={:.6}",
            series.hedge_ratio, series.spread_mean, series.spread_std
        );
        match series.half_life {
            Some(h) => println!("Mean-reversion half-life: {:.2} bars", h),
            None => println!("Mean-reversion half-life: n/a"),
        }
        println!("Latest {} of {} rows:", tail_rows.min(series.len()), series.len());
        print_frame(spread_frame(series.tail(tail_rows)));
    }
}

fn print_frame(frame: PolarsResult<DataFrame>) {
    match frame {
        Ok(df) => println!("{}", df),
        Err(e) => warn!(error = %e, "Could not render table"),
    }
}

/// Price history as a `timestamp | close` frame in timestamp order.
pub fn series_frame(series: &TimeSeries) -> PolarsResult<DataFrame> {
    let points = series.sorted_points();
    let stamps: Vec<String> = points
        .iter()
        .map(|p| p.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .collect();
    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    df!("timestamp" => stamps, "close" => closes)
}

/// Square correlation matrix with a leading label column.
pub fn matrix_frame(matrix: &CorrelationMatrix) -> PolarsResult<DataFrame> {
    let [left, right] = &matrix.labels;
    // Same symbol on both sides would collide as column names
    let right = if left == right {
        format!("{}_2", right)
    } else {
        right.clone()
    };
    let labels = vec![left.clone(), right.clone()];
    let first = [matrix.values[0][0], matrix.values[1][0]];
    let second = [matrix.values[0][1], matrix.values[1][1]];
    df!(
        "column" => labels,
        left.as_str() => first,
        right.as_str() => second,
    )
}

/// `timestamp | spread | z_score | signal` frame of the given rows.
pub fn spread_frame(rows: &[ZScoreRow]) -> PolarsResult<DataFrame> {
    let stamps: Vec<String> = rows
        .iter()
        .map(|r| r.record.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .collect();
    let spreads: Vec<f64> = rows.iter().map(|r| r.record.spread).collect();
    let z: Vec<f64> = rows.iter().map(|r| r.z_score).collect();
    let signals: Vec<String> = rows.iter().map(|r| r.signal.to_string()).collect();
    df!(
        "timestamp" => stamps,
        "spread" => spreads,
        "z_score" => z,
        "signal" => signals,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_spread, z_scores, HedgeRatioMode};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn days(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn test_series_frame_is_sorted() {
        let stamps = days(3);
        let series = TimeSeries::from_parts(&[stamps[2], stamps[0], stamps[1]], &[3.0, 1.0, 2.0]);
        let df = series_frame(&series).unwrap();
        assert_eq!(df.shape(), (3, 2));
        let closes: Vec<Option<f64>> = df.column("close").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(closes, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_matrix_frame_layout() {
        let matrix = CorrelationMatrix {
            labels: ["returns_A".to_string(), "returns_B".to_string()],
            values: [[1.0, 0.25], [0.25, 1.0]],
        };
        let df = matrix_frame(&matrix).unwrap();
        assert_eq!(df.get_column_names(), vec!["column", "returns_A", "returns_B"]);
        assert_eq!(df.column("returns_B").unwrap().f64().unwrap().get(0), Some(0.25));
    }

    #[test]
    fn test_matrix_frame_same_symbol_twice() {
        let matrix = CorrelationMatrix {
            labels: ["returns_A".to_string(), "returns_A".to_string()],
            values: [[1.0, 1.0], [1.0, 1.0]],
        };
        assert!(matrix_frame(&matrix).is_ok());
    }

    #[test]
    fn test_spread_frame_tail() {
        let stamps = days(10);
        let a: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let b: Vec<f64> = (0..10).map(|i| 50.0 + (i % 3) as f64).collect();
        let records = compute_spread(
            &TimeSeries::from_parts(&stamps, &a),
            &TimeSeries::from_parts(&stamps, &b),
            HedgeRatioMode::Mean,
        );
        let series = z_scores(&records, HedgeRatioMode::Mean, 2.0);
        let df = spread_frame(series.tail(5)).unwrap();
        assert_eq!(df.shape(), (5, 4));
    }
}
