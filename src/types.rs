//! Common Types Module
//!
//! Time series shared by the market data collaborators and the analysis
//! stages. Series are keyed by timestamp; anything pairing two series goes
//! through [`AlignedPair`], never through positional zipping.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// A single closing price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Closing-price history for one symbol.
///
/// Timestamps are expected to be unique. No ordering is enforced; callers
/// that need chronological order use [`TimeSeries::sorted_points`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// Build a series from parallel timestamp/close slices.
    ///
    /// Extra elements on the longer side are ignored.
    pub fn from_parts(timestamps: &[DateTime<Utc>], closes: &[f64]) -> Self {
        Self::new(
            timestamps
                .iter()
                .zip(closes.iter())
                .map(|(ts, close)| PricePoint::new(*ts, *close))
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.iter().min_by_key(|p| p.timestamp)
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.iter().max_by_key(|p| p.timestamp)
    }

    /// Points in ascending timestamp order.
    pub fn sorted_points(&self) -> Vec<PricePoint> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.timestamp);
        points
    }

    /// Simple percentage change against the previous record in timestamp order.
    ///
    /// The first record has no predecessor, so its return is `None`. A change
    /// from zero to zero is also `None`; a change from zero to anything else
    /// is infinite and kept as such.
    pub fn pct_change(&self) -> ReturnSeries {
        let sorted = self.sorted_points();
        let mut returns = Vec::with_capacity(sorted.len());
        let mut previous: Option<f64> = None;

        for point in &sorted {
            let value = previous.and_then(|prev| {
                let change = point.close / prev - 1.0;
                if change.is_nan() {
                    None
                } else {
                    Some(change)
                }
            });
            returns.push(ReturnPoint {
                timestamp: point.timestamp,
                value,
            });
            previous = Some(point.close);
        }

        ReturnSeries { points: returns }
    }
}

/// One period's simple return; `None` where it is undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Percentage-change series derived from a [`TimeSeries`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Anything that can be viewed as `(timestamp, value)` rows for a join.
pub trait Keyed {
    type Value: Copy;

    fn rows(&self) -> Vec<(DateTime<Utc>, Self::Value)>;
}

impl Keyed for TimeSeries {
    type Value = f64;

    fn rows(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.points.iter().map(|p| (p.timestamp, p.close)).collect()
    }
}

impl Keyed for ReturnSeries {
    type Value = Option<f64>;

    fn rows(&self) -> Vec<(DateTime<Utc>, Option<f64>)> {
        self.points.iter().map(|p| (p.timestamp, p.value)).collect()
    }
}

/// One row of an inner join: a timestamp present on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRow<T> {
    pub timestamp: DateTime<Utc>,
    pub left: T,
    pub right: T,
}

/// Inner join of two keyed series on timestamp.
///
/// Column labels carry the symbol suffix (`close_BTC`, `close_ETH`) so the
/// two sides stay distinguishable when rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair<T> {
    pub left_label: String,
    pub right_label: String,
    rows: Vec<AlignedRow<T>>,
}

impl<T: Copy> AlignedPair<T> {
    /// Join `left` and `right` on exact timestamp equality.
    ///
    /// Only timestamps present in both series survive; the result is in
    /// ascending timestamp order.
    pub fn inner_join<S>(
        left: &S,
        right: &S,
        field: &str,
        left_symbol: &str,
        right_symbol: &str,
    ) -> Self
    where
        S: Keyed<Value = T>,
    {
        let lookup: HashMap<DateTime<Utc>, T> = right.rows().into_iter().collect();

        let mut rows: Vec<AlignedRow<T>> = left
            .rows()
            .into_iter()
            .filter_map(|(timestamp, l)| {
                lookup.get(&timestamp).map(|r| AlignedRow {
                    timestamp,
                    left: l,
                    right: *r,
                })
            })
            .collect();
        rows.sort_by_key(|row| row.timestamp);

        Self {
            left_label: format!("{}_{}", field, left_symbol),
            right_label: format!("{}_{}", field, right_symbol),
            rows,
        }
    }

    pub fn rows(&self) -> &[AlignedRow<T>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn left_values(&self) -> Vec<T> {
        self.rows.iter().map(|r| r.left).collect()
    }

    pub fn right_values(&self) -> Vec<T> {
        self.rows.iter().map(|r| r.right).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }
}
