//! CSV bar files
//!
//! Reads `<data_dir>/<SYMBOL>.csv` with a timestamp column and a closing
//! price column, trims it to the requested period (anchored at the newest
//! row) and resamples it to the requested interval, keeping the last close
//! of every bar.

use super::period::{Interval, Period};
use super::{FetchError, MarketDataFetcher};
use crate::types::{PricePoint, TimeSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Accepted names for the timestamp column, matched case-insensitively
const TIMESTAMP_COLUMNS: &[&str] = &["datetime", "date", "timestamp", "time"];
/// Accepted names for the close column, matched case-insensitively
const CLOSE_COLUMNS: &[&str] = &["close", "adj close", "adj_close"];

/// Fetcher backed by a directory of per-symbol CSV files.
#[derive(Debug, Clone)]
pub struct CsvFetcher {
    data_dir: PathBuf,
}

impl CsvFetcher {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    /// Load every row of a bar file, unfiltered.
    pub fn load(path: &Path) -> Result<Vec<PricePoint>, FetchError> {
        let file = File::open(path)?;
        let df = CsvReader::new(file).finish()?;
        let source_name = path.display().to_string();

        let ts_name = find_column(&df, TIMESTAMP_COLUMNS, &source_name)?;
        let close_name = find_column(&df, CLOSE_COLUMNS, &source_name)?;

        let stamps = df.column(&ts_name)?.cast(&DataType::String)?;
        let closes = df.column(&close_name)?.cast(&DataType::Float64)?;

        let mut points = Vec::with_capacity(df.height());
        for (stamp, close) in stamps.str()?.into_iter().zip(closes.f64()?.into_iter()) {
            let (Some(stamp), Some(close)) = (stamp, close) else {
                continue;
            };
            if !close.is_finite() {
                debug!(source = %source_name, stamp = stamp, "Skipping non-finite close");
                continue;
            }
            points.push(PricePoint::new(parse_timestamp(stamp)?, close));
        }
        Ok(points)
    }
}

impl MarketDataFetcher for CsvFetcher {
    fn fetch(&self, symbol: &str, period: &str, interval: &str) -> Result<TimeSeries, FetchError> {
        let window: Period = period.parse()?;
        let bar: Interval = interval.parse()?;
        let path = self.path_for(symbol);

        let no_data = || FetchError::NoData {
            symbol: symbol.to_string(),
            period: period.to_string(),
            interval: interval.to_string(),
        };

        if !path.exists() {
            debug!(path = %path.display(), "No bar file for symbol");
            return Err(no_data());
        }

        let points = Self::load(&path)?;
        let Some(anchor) = points.iter().map(|p| p.timestamp).max() else {
            return Err(no_data());
        };

        let in_window = points
            .into_iter()
            .filter(|p| window.contains(anchor, p.timestamp));
        let series = resample_last(in_window, bar);

        if series.is_empty() {
            return Err(no_data());
        }

        info!(
            symbol = symbol,
            rows = series.len(),
            period = %window,
            "Loaded bars from CSV"
        );
        Ok(series)
    }
}

/// Keep the latest close inside every interval bucket, stamped at the
/// bucket's opening time.
pub fn resample_last(points: impl IntoIterator<Item = PricePoint>, interval: Interval) -> TimeSeries {
    let mut buckets: BTreeMap<i64, PricePoint> = BTreeMap::new();
    for point in points {
        let key = interval.bucket(point.timestamp);
        match buckets.get(&key) {
            Some(existing) if existing.timestamp > point.timestamp => {}
            _ => {
                buckets.insert(key, point);
            }
        }
    }

    TimeSeries::new(
        buckets
            .into_iter()
            .filter_map(|(key, last)| {
                interval
                    .bucket_start(key)
                    .map(|start| PricePoint::new(start, last.close))
            })
            .collect(),
    )
}

/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S`, `%Y-%m-%d` or unix seconds.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(secs) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(secs, 0) {
            return Ok(dt);
        }
    }
    Err(FetchError::InvalidTimestamp(raw.to_string()))
}

fn find_column(df: &DataFrame, candidates: &[&str], source_name: &str) -> Result<String, FetchError> {
    df.get_column_names()
        .into_iter()
        .find(|name| candidates.contains(&name.to_lowercase().as_str()))
        .map(|name| name.to_string())
        .ok_or_else(|| FetchError::MissingColumn {
            column: candidates.join("|"),
            source_name: source_name.to_string(),
        })
}
