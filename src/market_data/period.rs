//! Period and interval shorthands.
//!
//! Periods select how far back from an anchor to look (`5d`, `3mo`, `ytd`,
//! `max`); intervals select the bar size (`15m`, `1h`, `1d`, `1wk`, `1mo`).
//! Both follow the common market-data convention where `mo` is months and
//! `m` is minutes.

use super::FetchError;
use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Look-back window ending at an anchor timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Period {
    /// Exclusive lower bound of the window ending at `anchor`.
    ///
    /// `None` for `Max`, and for any window reaching past the earliest
    /// representable timestamp, which then behaves like `Max`.
    pub fn start(&self, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Period::Days(n) => anchor.checked_sub_signed(Duration::days(n as i64)),
            Period::Weeks(n) => anchor.checked_sub_signed(Duration::weeks(n as i64)),
            Period::Months(n) => anchor.checked_sub_months(Months::new(n)),
            Period::Years(n) => anchor.checked_sub_months(Months::new(n.saturating_mul(12))),
            // Exclusive bound, so step one second before Jan 1st
            Period::YearToDate => Utc
                .with_ymd_and_hms(anchor.year(), 1, 1, 0, 0, 0)
                .single()
                .and_then(|jan1| jan1.checked_sub_signed(Duration::seconds(1))),
            Period::Max => None,
        }
    }

    /// Whether `timestamp` falls inside the window ending at `anchor`.
    pub fn contains(&self, anchor: DateTime<Utc>, timestamp: DateTime<Utc>) -> bool {
        timestamp <= anchor && self.start(anchor).map_or(true, |start| timestamp > start)
    }
}

impl FromStr for Period {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "ytd" => return Ok(Period::YearToDate),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let invalid = || FetchError::InvalidPeriod(s.to_string());
        let (count, unit) = split_count(&lower).ok_or_else(invalid)?;
        match unit {
            "d" => Ok(Period::Days(count)),
            "wk" => Ok(Period::Weeks(count)),
            "mo" => Ok(Period::Months(count)),
            "y" => Ok(Period::Years(count)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{}d", n),
            Period::Weeks(n) => write!(f, "{}wk", n),
            Period::Months(n) => write!(f, "{}mo", n),
            Period::Years(n) => write!(f, "{}y", n),
            Period::YearToDate => write!(f, "ytd"),
            Period::Max => write!(f, "max"),
        }
    }
}

/// Bar size used to bucket observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// Fixed-width bars
    Fixed(Duration),
    /// Calendar-month bars, `n` months wide
    Months(u32),
}

impl Interval {
    /// Bucket key for `timestamp`. Timestamps sharing a key belong to one bar.
    pub fn bucket(&self, timestamp: DateTime<Utc>) -> i64 {
        match *self {
            Interval::Fixed(width) => {
                let secs = width.num_seconds().max(1);
                timestamp.timestamp().div_euclid(secs)
            }
            Interval::Months(n) => {
                let month_index = timestamp.year() as i64 * 12 + timestamp.month0() as i64;
                month_index.div_euclid(n.max(1) as i64)
            }
        }
    }

    /// Opening timestamp of the bar with the given bucket key.
    pub fn bucket_start(&self, bucket: i64) -> Option<DateTime<Utc>> {
        match *self {
            Interval::Fixed(width) => {
                let secs = width.num_seconds().max(1);
                DateTime::from_timestamp(bucket.checked_mul(secs)?, 0)
            }
            Interval::Months(n) => {
                let month_index = bucket.checked_mul(n.max(1) as i64)?;
                let year = i32::try_from(month_index.div_euclid(12)).ok()?;
                let month = month_index.rem_euclid(12) as u32 + 1;
                Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
            }
        }
    }

    /// Timestamp one bar after `timestamp`.
    pub fn step(&self, timestamp: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Interval::Fixed(width) => timestamp.checked_add_signed(width),
            Interval::Months(n) => timestamp.checked_add_months(Months::new(n)),
        }
    }

    /// Timestamp one bar before `timestamp`.
    pub fn step_back(&self, timestamp: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Interval::Fixed(width) => timestamp.checked_sub_signed(width),
            Interval::Months(n) => timestamp.checked_sub_months(Months::new(n)),
        }
    }
}

impl FromStr for Interval {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let invalid = || FetchError::InvalidInterval(s.to_string());
        let (count, unit) = split_count(&lower).ok_or_else(invalid)?;
        let n = count as i64;
        match unit {
            "m" => Ok(Interval::Fixed(Duration::minutes(n))),
            "h" => Ok(Interval::Fixed(Duration::hours(n))),
            "d" => Ok(Interval::Fixed(Duration::days(n))),
            "wk" => Ok(Interval::Fixed(Duration::weeks(n))),
            "mo" => Ok(Interval::Months(count)),
            _ => Err(invalid()),
        }
    }
}

/// Split `"15m"` into `(15, "m")`. The count must be a positive integer.
fn split_count(s: &str) -> Option<(u32, &str)> {
    let digits = s.find(|c: char| !c.is_ascii_digit())?;
    let (count, unit) = s.split_at(digits);
    let count: u32 = count.parse().ok()?;
    if count == 0 {
        return None;
    }
    Some((count, unit))
}
