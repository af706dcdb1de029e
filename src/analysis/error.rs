//! Error types for the analysis stages

use crate::math::regression::RegressionError;
use thiserror::Error;

/// Errors that stop an analysis stage from producing a result.
///
/// Degenerate numerics (zero variance, zero prices) are not errors; they
/// surface as `NaN`/infinite values in the stage output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Too few aligned observations for the test
    #[error("Insufficient data: {stage} needs at least {expected} aligned observations, got {actual}")]
    InsufficientData {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Regression could not be fitted
    #[error("Regression failed: {0}")]
    Regression(#[from] RegressionError),
}
