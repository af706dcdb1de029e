//! Ordinary least squares on small dense design matrices.
//!
//! Solves the least-squares problem through an SVD of the design itself,
//! never through XᵀX, so price-level regressors far from zero keep their
//! precision. Rank-deficient designs (a constant regressor next to the
//! intercept, say) produce the minimum-norm solution instead of failing.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Errors from fitting a regression.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegressionError {
    #[error("design has {rows} rows but {targets} targets")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("need more observations ({nobs}) than regressors ({regressors})")]
    Underdetermined { nobs: usize, regressors: usize },

    #[error("least-squares solve failed: {0}")]
    Decomposition(&'static str),
}

/// Result of an OLS fit `y = Xβ + ε`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    pub fn regressors(&self) -> usize {
        self.params.len()
    }

    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.params[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood evaluated at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every column of X as a parameter.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.regressors() as f64
    }

    /// Centered R² of the fit against the targets it was fitted on.
    pub fn r_squared(&self, y: &[f64]) -> f64 {
        let n = y.len() as f64;
        let y_mean = y.iter().sum::<f64>() / n;
        let tss: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
        1.0 - self.ssr / tss
    }
}

/// Fit `y` on the columns of `x`.
pub fn ols(y: &[f64], x: &DMatrix<f64>) -> Result<OlsFit, RegressionError> {
    let nobs = x.nrows();
    let k = x.ncols();

    if nobs != y.len() {
        return Err(RegressionError::ShapeMismatch {
            rows: nobs,
            targets: y.len(),
        });
    }
    if nobs <= k {
        return Err(RegressionError::Underdetermined { nobs, regressors: k });
    }

    let y_vec = DVector::from_column_slice(y);
    let svd = x.clone().svd(true, true);
    let largest = svd.singular_values.iter().fold(0.0f64, |acc, s| acc.max(*s));
    let tolerance = largest * nobs.max(k) as f64 * f64::EPSILON;

    let beta = svd
        .solve(&y_vec, tolerance)
        .map_err(RegressionError::Decomposition)?;
    let fitted = x * &beta;
    let residuals: Vec<f64> = (&y_vec - fitted).iter().copied().collect();
    let ssr: f64 = residuals.iter().map(|r| r * r).sum();

    // diag((XᵀX)⁺) = Σⱼ V[i,j]² / σⱼ² over the retained singular values
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or(RegressionError::Decomposition("right singular vectors not computed"))?;
    let mut inverse_diag = vec![0.0; k];
    for (j, sigma) in svd.singular_values.iter().enumerate() {
        if *sigma <= tolerance {
            continue;
        }
        for (i, d) in inverse_diag.iter_mut().enumerate() {
            *d += v_t[(j, i)].powi(2) / (sigma * sigma);
        }
    }

    let sigma2 = ssr / (nobs - k) as f64;
    let std_errors = inverse_diag.iter().map(|d| (sigma2 * d).sqrt()).collect();

    Ok(OlsFit {
        params: beta.iter().copied().collect(),
        std_errors,
        residuals,
        ssr,
        nobs,
    })
}

/// Fit `y = α + βx` and return the full fit; params are `[α, β]`.
pub fn ols_with_intercept(y: &[f64], x: &[f64]) -> Result<OlsFit, RegressionError> {
    let design = DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { 1.0 } else { x[i] });
    ols(y, &design)
}
