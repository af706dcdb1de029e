//! Correlation of returns between two price series
//!
//! Each series is turned into simple percentage returns, the two return
//! series are inner-joined on timestamp, and the Pearson coefficient is
//! computed with pairwise deletion of undefined returns.

use crate::math::stats::{has_variance, pearson};
use crate::types::{AlignedPair, TimeSeries};
use serde::Serialize;
use tracing::debug;

/// Symmetric 2×2 correlation matrix of two labelled return columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: [String; 2],
    pub values: [[f64; 2]; 2],
}

impl CorrelationMatrix {
    /// The off-diagonal coefficient.
    pub fn cross(&self) -> f64 {
        self.values[0][1]
    }
}

/// Correlation stage output: the scalar coefficient and the full matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnCorrelation {
    /// Pearson coefficient in [-1, 1], `NaN` when undefined
    pub coefficient: f64,
    pub matrix: CorrelationMatrix,
    /// Rows where both returns were defined
    pub observations: usize,
}

/// Correlate the percentage returns of two price series.
///
/// `label1` and `label2` only name the matrix columns.
pub fn correlate_returns(
    series1: &TimeSeries,
    series2: &TimeSeries,
    label1: &str,
    label2: &str,
) -> ReturnCorrelation {
    let returns1 = series1.pct_change();
    let returns2 = series2.pct_change();
    let aligned = AlignedPair::inner_join(&returns1, &returns2, "returns", label1, label2);

    let coefficient = pearson(aligned.rows().iter().map(|row| (row.left, row.right)));
    let observations = aligned
        .rows()
        .iter()
        .filter(|row| defined(row.left) && defined(row.right))
        .count();

    let diagonal = |column: Vec<Option<f64>>| {
        if has_variance(&column) {
            1.0
        } else {
            f64::NAN
        }
    };
    let d1 = diagonal(aligned.left_values());
    let d2 = diagonal(aligned.right_values());

    debug!(
        aligned = aligned.len(),
        observations = observations,
        coefficient = coefficient,
        "Return correlation computed"
    );

    ReturnCorrelation {
        coefficient,
        matrix: CorrelationMatrix {
            labels: [aligned.left_label.clone(), aligned.right_label.clone()],
            values: [[d1, coefficient], [coefficient, d2]],
        },
        observations,
    }
}

/// Pearson correlation of the two series' percentage returns.
pub fn calculate_correlation(
    series1: &TimeSeries,
    series2: &TimeSeries,
    label1: &str,
    label2: &str,
) -> f64 {
    correlate_returns(series1, series2, label1, label2).coefficient
}

fn defined(value: Option<f64>) -> bool {
    value.is_some_and(|v| !v.is_nan())
}
