//! Synthetic price source for running without data files.
//!
//! Every symbol shares a slow sine "market" factor and carries its own
//! mean-reverting idiosyncratic term seeded from the symbol name, so the
//! same request always yields the same series and any two symbols move
//! together to some degree.

use super::period::{Interval, Period};
use super::{FetchError, MarketDataFetcher};
use crate::types::{PricePoint, TimeSeries};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Upper bound on generated bars per request
pub const DEFAULT_MAX_BARS: usize = 5_000;

/// Deterministic generated prices ending at a fixed anchor.
#[derive(Debug, Clone)]
pub struct SyntheticFetcher {
    anchor: DateTime<Utc>,
    max_bars: usize,
}

impl SyntheticFetcher {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            max_bars: DEFAULT_MAX_BARS,
        }
    }

    pub fn with_max_bars(mut self, max_bars: usize) -> Self {
        self.max_bars = max_bars;
        self
    }

    /// Closing price of `symbol` for the bar with key `bar`.
    pub fn price_at(symbol: &str, bar: i64) -> f64 {
        let seed = symbol_seed(symbol);
        let t = bar as f64;

        let base = 20.0 + (seed % 180) as f64;
        let market = 0.08 * (t * 0.021).sin() + 0.03 * (t * 0.0047).sin();

        let phase = (seed >> 8) as f64 % std::f64::consts::TAU;
        let idio = 0.015 * (t * 0.13 + phase).sin() + 0.01 * unit_noise(seed, bar);

        base * (market + idio).exp()
    }
}

impl MarketDataFetcher for SyntheticFetcher {
    fn fetch(&self, symbol: &str, period: &str, interval: &str) -> Result<TimeSeries, FetchError> {
        let window: Period = period.parse()?;
        let bar: Interval = interval.parse()?;

        let mut points = Vec::new();
        let mut cursor = bar.bucket_start(bar.bucket(self.anchor));
        while let Some(ts) = cursor {
            if points.len() >= self.max_bars || !window.contains(self.anchor, ts) {
                break;
            }
            points.push(PricePoint::new(ts, Self::price_at(symbol, bar.bucket(ts))));
            cursor = bar.step_back(ts);
        }
        points.reverse();

        if points.is_empty() {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
                period: period.to_string(),
                interval: interval.to_string(),
            });
        }

        debug!(symbol = symbol, bars = points.len(), "Generated synthetic bars");
        Ok(TimeSeries::new(points))
    }
}

/// FNV-1a fold of the symbol bytes. Stable across runs and platforms.
fn symbol_seed(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

/// splitmix64 of `(seed, bar)` mapped to [-1, 1).
fn unit_noise(seed: u64, bar: i64) -> f64 {
    let mut z = seed ^ (bar as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
}
