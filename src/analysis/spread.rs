//! Spread construction and Z-score normalization
//!
//! The spread is `price1 - ratio * price2` on timestamp-aligned prices. By
//! default the ratio is recomputed on every row (`price1 / price2`), which
//! makes the spread a floating-point residual around zero; `Mean` and
//! `Regression` fix a single hedge ratio across the window instead.
//!
//! Z-scores use the mean and sample standard deviation of the whole spread
//! series, so each row sees rows that come after it. Offline reporting only.

use crate::math::stats::{mean, sample_std_dev};
use crate::types::{AlignedPair, TimeSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How the hedge ratio applied to `price2` is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum HedgeRatioMode {
    /// `price1 / price2` recomputed for every row
    #[default]
    PerRow,
    /// Mean of the per-row ratios, applied to every row
    Mean,
    /// A fixed ratio supplied by the caller (the cointegrating β)
    Regression(f64),
}

impl fmt::Display for HedgeRatioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HedgeRatioMode::PerRow => write!(f, "per-row"),
            HedgeRatioMode::Mean => write!(f, "mean"),
            HedgeRatioMode::Regression(beta) => write!(f, "regression (β = {:.6})", beta),
        }
    }
}

/// Hedge-ratio selection as given on the command line; `Regression` is
/// resolved to a concrete β once the cointegration stage has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HedgeRatioChoice {
    #[default]
    PerRow,
    Mean,
    Regression,
}

impl HedgeRatioChoice {
    pub fn resolve(self, regression_beta: f64) -> HedgeRatioMode {
        match self {
            HedgeRatioChoice::PerRow => HedgeRatioMode::PerRow,
            HedgeRatioChoice::Mean => HedgeRatioMode::Mean,
            HedgeRatioChoice::Regression => HedgeRatioMode::Regression(regression_beta),
        }
    }
}

impl FromStr for HedgeRatioChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-row" | "row" => Ok(Self::PerRow),
            "mean" => Ok(Self::Mean),
            "regression" | "ols" => Ok(Self::Regression),
            _ => Err(format!(
                "Unknown hedge ratio mode: '{}'. Use 'per-row', 'mean' or 'regression'",
                s
            )),
        }
    }
}

/// One aligned row of the spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadRecord {
    pub timestamp: DateTime<Utc>,
    pub price1: f64,
    pub price2: f64,
    /// `price1 / price2` for this row
    pub ratio: f64,
    pub spread: f64,
}

/// Mean-reversion trade hint for one Z-score row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpreadSignal {
    /// Spread is rich: short leg 1, long leg 2
    ShortSpread,
    /// Spread is cheap: long leg 1, short leg 2
    LongSpread,
    Neutral,
}

impl SpreadSignal {
    pub fn from_z_score(z: f64, entry_z: f64) -> Self {
        if z >= entry_z {
            SpreadSignal::ShortSpread
        } else if z <= -entry_z {
            SpreadSignal::LongSpread
        } else {
            SpreadSignal::Neutral
        }
    }
}

impl fmt::Display for SpreadSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadSignal::ShortSpread => write!(f, "SHORT_SPREAD"),
            SpreadSignal::LongSpread => write!(f, "LONG_SPREAD"),
            SpreadSignal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Spread row with its full-window Z-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZScoreRow {
    #[serde(flatten)]
    pub record: SpreadRecord,
    pub z_score: f64,
    pub signal: SpreadSignal,
}

/// Spread series normalised by its own mean and sample standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreSeries {
    pub rows: Vec<ZScoreRow>,
    pub spread_mean: f64,
    pub spread_std: f64,
    pub hedge_ratio: HedgeRatioMode,
    /// Mean-reversion half-life in bars, when the spread reverts at all
    pub half_life: Option<f64>,
}

impl ZScoreSeries {
    /// The most recent `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> &[ZScoreRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&ZScoreRow> {
        self.rows.last()
    }
}

/// Build the spread of two price series on their common timestamps.
///
/// A zero `price2` makes that row's ratio infinite or `NaN`; nothing guards
/// against it, and it contaminates `Mean` mode and any later Z-scores.
pub fn compute_spread(
    series1: &TimeSeries,
    series2: &TimeSeries,
    mode: HedgeRatioMode,
) -> Vec<SpreadRecord> {
    let aligned = AlignedPair::inner_join(series1, series2, "close", "1", "2");
    let ratios: Vec<f64> = aligned.rows().iter().map(|r| r.left / r.right).collect();

    let fixed = match mode {
        HedgeRatioMode::PerRow => None,
        HedgeRatioMode::Mean => Some(mean(&ratios)),
        HedgeRatioMode::Regression(beta) => Some(beta),
    };

    aligned
        .rows()
        .iter()
        .zip(ratios)
        .map(|(row, ratio)| {
            let hedge = fixed.unwrap_or(ratio);
            SpreadRecord {
                timestamp: row.timestamp,
                price1: row.left,
                price2: row.right,
                ratio,
                spread: row.left - hedge * row.right,
            }
        })
        .collect()
}

/// Z-score every spread row against the whole series.
///
/// Zero dispersion gives `NaN` Z-scores (0/0), which classify as `Neutral`.
pub fn z_scores(records: &[SpreadRecord], mode: HedgeRatioMode, entry_z: f64) -> ZScoreSeries {
    let spreads: Vec<f64> = records.iter().map(|r| r.spread).collect();
    let spread_mean = mean(&spreads);
    let spread_std = sample_std_dev(&spreads);

    let rows = records
        .iter()
        .map(|record| {
            let z_score = (record.spread - spread_mean) / spread_std;
            ZScoreRow {
                record: *record,
                z_score,
                signal: SpreadSignal::from_z_score(z_score, entry_z),
            }
        })
        .collect();

    ZScoreSeries {
        rows,
        spread_mean,
        spread_std,
        hedge_ratio: mode,
        half_life: half_life(&spreads),
    }
}

/// Estimate mean-reversion half-life from lag-1 autocorrelation.
///
/// ρ = lag-1 autocorrelation, half_life = -ln(2) / ln(ρ). `None` unless
/// 0 < ρ < 1.
pub fn half_life(spread: &[f64]) -> Option<f64> {
    if spread.len() < 3 {
        return None;
    }
    let m = mean(spread);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for w in spread.windows(2) {
        let dx = w[0] - m;
        let dy = w[1] - m;
        numerator += dx * dy;
        denominator += dx * dx;
    }

    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    let rho = numerator / denominator;

    if rho > 0.0 && rho < 1.0 {
        Some(-2.0f64.ln() / rho.ln())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn days(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn test_per_row_ratio_collapses_spread() {
        let stamps = days(4);
        let a = TimeSeries::from_parts(&stamps, &[100.0, 105.0, 98.0, 110.0]);
        let b = TimeSeries::from_parts(&stamps, &[50.0, 49.0, 51.0, 52.0]);
        let records = compute_spread(&a, &b, HedgeRatioMode::PerRow);
        assert_eq!(records.len(), 4);
        for r in &records {
            assert!((r.ratio - r.price1 / r.price2).abs() < 1e-15);
            assert!(r.spread.abs() < 1e-9, "spread = {}", r.spread);
        }
    }

    #[test]
    fn test_mean_ratio_spread() {
        let stamps = days(3);
        let a = TimeSeries::from_parts(&stamps, &[100.0, 120.0, 90.0]);
        let b = TimeSeries::from_parts(&stamps, &[50.0, 50.0, 50.0]);
        let records = compute_spread(&a, &b, HedgeRatioMode::Mean);
        // mean ratio = (2.0 + 2.4 + 1.8) / 3
        let hedge = (2.0 + 2.4 + 1.8) / 3.0;
        assert!((records[1].spread - (120.0 - hedge * 50.0)).abs() < 1e-9);
        assert!((records[1].ratio - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_regression_ratio_spread() {
        let stamps = days(2);
        let a = TimeSeries::from_parts(&stamps, &[10.0, 12.0]);
        let b = TimeSeries::from_parts(&stamps, &[4.0, 5.0]);
        let records = compute_spread(&a, &b, HedgeRatioMode::Regression(2.0));
        assert_eq!(records[0].spread, 2.0);
        assert_eq!(records[1].spread, 2.0);
    }

    #[test]
    fn test_spread_uses_common_timestamps_only() {
        let stamps = days(5);
        let a = TimeSeries::from_parts(&stamps, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = TimeSeries::from_parts(&stamps[2..], &[1.0, 1.0, 1.0]);
        let records = compute_spread(&a, &b, HedgeRatioMode::PerRow);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].timestamp, stamps[2]);
    }

    #[test]
    fn test_zero_price_contaminates_z_scores() {
        let stamps = days(3);
        let a = TimeSeries::from_parts(&stamps, &[10.0, 11.0, 12.0]);
        let b = TimeSeries::from_parts(&stamps, &[5.0, 0.0, 6.0]);
        let records = compute_spread(&a, &b, HedgeRatioMode::PerRow);
        assert!(records[1].ratio.is_infinite());
        assert!(records[1].spread.is_nan());
        let z = z_scores(&records, HedgeRatioMode::PerRow, 2.0);
        assert!(z.rows.iter().all(|r| r.z_score.is_nan()));
        assert!(z.rows.iter().all(|r| r.signal == SpreadSignal::Neutral));
    }

    #[test]
    fn test_z_scores_are_standardised() {
        let stamps = days(6);
        let a = TimeSeries::from_parts(&stamps, &[10.0, 12.0, 9.0, 11.0, 13.0, 8.0]);
        let b = TimeSeries::from_parts(&stamps, &[5.0; 6]);
        let records = compute_spread(&a, &b, HedgeRatioMode::Regression(1.0));
        let z = z_scores(&records, HedgeRatioMode::Regression(1.0), 2.0);

        let values: Vec<f64> = z.rows.iter().map(|r| r.z_score).collect();
        assert!(mean(&values).abs() < 1e-12);
        assert!((sample_std_dev(&values) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_signal_thresholds() {
        assert_eq!(SpreadSignal::from_z_score(2.5, 2.0), SpreadSignal::ShortSpread);
        assert_eq!(SpreadSignal::from_z_score(-2.0, 2.0), SpreadSignal::LongSpread);
        assert_eq!(SpreadSignal::from_z_score(1.9, 2.0), SpreadSignal::Neutral);
        assert_eq!(SpreadSignal::from_z_score(f64::NAN, 2.0), SpreadSignal::Neutral);
    }

    #[test]
    fn test_tail_returns_latest_rows() {
        let stamps = days(8);
        let a = TimeSeries::from_parts(&stamps, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let b = TimeSeries::from_parts(&stamps, &[1.0; 8]);
        let records = compute_spread(&a, &b, HedgeRatioMode::Regression(0.0));
        let z = z_scores(&records, HedgeRatioMode::Regression(0.0), 2.0);
        let tail = z.tail(5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].record.timestamp, stamps[3]);
        assert_eq!(z.latest().unwrap().record.timestamp, stamps[7]);
        assert_eq!(z.tail(100).len(), 8);
    }

    #[test]
    fn test_half_life() {
        // AR(1) with ρ = 0.5 around zero
        let mut spread = vec![8.0];
        for i in 1..60 {
            let shock = if i % 7 == 0 { 4.0 } else { 0.0 };
            let next = 0.5 * spread[i - 1] + shock;
            spread.push(next);
        }
        let hl = half_life(&spread).unwrap();
        assert!(hl > 0.0 && hl < 5.0, "half-life = {hl}");
        assert!(half_life(&[1.0, 1.0, 1.0, 1.0]).is_none());
        assert!(half_life(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_hedge_ratio_choice_parsing() {
        assert_eq!("per-row".parse::<HedgeRatioChoice>(), Ok(HedgeRatioChoice::PerRow));
        assert_eq!("OLS".parse::<HedgeRatioChoice>(), Ok(HedgeRatioChoice::Regression));
        assert!("kalman".parse::<HedgeRatioChoice>().is_err());
        assert_eq!(
            HedgeRatioChoice::Regression.resolve(1.25),
            HedgeRatioMode::Regression(1.25)
        );
    }
}
