//! Engle-Granger cointegration test
//!
//! Regresses the first price series on the second (with an intercept) and
//! runs an augmented Dickey-Fuller test on the residuals. The p-value uses
//! MacKinnon's approximate asymptotic distribution for two variables.
//!
//! # Algorithm
//! 1. Inner-join both series on timestamp
//! 2. OLS: price1 = α + β * price2 + ε
//! 3. Non-finite prices or an undefined R² give a NaN statistic (never significant).
//!    If R² is (numerically) one, the series are collinear: statistic = -∞
//! 4. Otherwise ADF on ε without deterministic terms, lag order by AIC
//! 5. p-value = Φ(polynomial(statistic)) per MacKinnon (1994)

use super::error::AnalysisError;
use crate::math::regression::{ols, ols_with_intercept, OlsFit, RegressionError};
use crate::types::{AlignedPair, TimeSeries};
use nalgebra::DMatrix;
use serde::Serialize;
use statrs::function::erf::erfc;
use tracing::{debug, warn};

/// Minimum aligned observations for the cointegrating regression
const MIN_OBSERVATIONS: usize = 3;

/// Cointegration test with a constant, two series (MacKinnon 1994, N = 2).
/// Statistics above this are assigned p = 1.
const TAU_MAX: f64 = 0.92;
/// Statistics below this are assigned p = 0.
const TAU_MIN: f64 = -18.86;
/// Switch point between the small-p and large-p polynomials.
const TAU_STAR: f64 = -2.62;
/// Small-p polynomial, ascending powers. MacKinnon (1994) Table 3, constant,
/// N = 2 row [2.92, 1.5012, 3.9796] scaled by [1, 1, 1e-2].
const TAU_SMALLP: [f64; 3] = [2.92, 1.5012, 0.039796];
/// Large-p polynomial, ascending powers. MacKinnon (1994) Table 3, constant,
/// N = 2 row [2.1945, 6.4695, -2.9198, -4.2377] with the table's column
/// scaling [1, 1e-1, 1e-1, 1e-2] already applied.
const TAU_LARGEP: [f64; 4] = [2.1945, 0.64695, -0.29198, -0.042377];

/// Finite-sample critical value surface (MacKinnon 2010), constant, N = 2.
/// Rows are 1%, 5%, 10%; columns are coefficients on 1, 1/T, 1/T², 1/T³.
const TAU_CRIT: [[f64; 4]; 3] = [
    [-3.89644, -10.9519, -33.527, 0.0],
    [-3.33613, -6.1101, -6.823, 0.0],
    [-3.04445, -4.2412, -2.720, 0.0],
];

/// Critical values of the cointegration statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// Outcome of the Engle-Granger test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CointegrationTest {
    /// ADF t-statistic of the residuals (more negative = stronger evidence)
    pub statistic: f64,
    /// MacKinnon approximate p-value in [0, 1]
    pub p_value: f64,
    pub critical_values: CriticalValues,
    /// β of price1 = α + β * price2
    pub hedge_ratio: f64,
    /// α of price1 = α + β * price2
    pub intercept: f64,
    /// Number of lagged differences in the ADF regression
    pub used_lag: usize,
    /// Aligned observations in the cointegrating regression
    pub nobs: usize,
}

impl CointegrationTest {
    /// Whether the p-value clears `significance`. `NaN` never does.
    pub fn is_cointegrated(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Run the Engle-Granger test on the raw closing prices of two series.
pub fn cointegration_test(
    series1: &TimeSeries,
    series2: &TimeSeries,
) -> Result<CointegrationTest, AnalysisError> {
    let aligned = AlignedPair::inner_join(series1, series2, "close", "1", "2");
    let y0 = aligned.left_values();
    let y1 = aligned.right_values();
    engle_granger(&y0, &y1)
}

/// Engle-Granger test on already aligned price columns.
pub fn engle_granger(y0: &[f64], y1: &[f64]) -> Result<CointegrationTest, AnalysisError> {
    let nobs = y0.len().min(y1.len());
    if nobs < MIN_OBSERVATIONS {
        return Err(AnalysisError::InsufficientData {
            stage: "cointegration test",
            expected: MIN_OBSERVATIONS,
            actual: nobs,
        });
    }
    let (y0, y1) = (&y0[..nobs], &y1[..nobs]);

    if y0.iter().chain(y1).any(|v| !v.is_finite()) {
        warn!(nobs = nobs, "Non-finite prices in the aligned pair; no test statistic");
        return Ok(CointegrationTest {
            statistic: f64::NAN,
            p_value: f64::NAN,
            critical_values: mackinnon_critical_values(nobs - 1),
            hedge_ratio: f64::NAN,
            intercept: f64::NAN,
            used_lag: 0,
            nobs,
        });
    }

    let fit = ols_with_intercept(y0, y1)?;
    let intercept = fit.params[0];
    let hedge_ratio = fit.params[1];
    let r_squared = fit.r_squared(y0);

    let collinear_threshold = 1.0 - 100.0 * f64::EPSILON.sqrt();
    let (statistic, used_lag) = if r_squared.is_nan() {
        warn!("Regression fit is undefined; no test statistic");
        (f64::NAN, 0)
    } else if r_squared < collinear_threshold {
        let adf = adf_no_trend(&fit.residuals)?;
        (adf.statistic, adf.used_lag)
    } else {
        warn!(
            r_squared = r_squared,
            "Series are (almost) perfectly collinear; cointegration test is not reliable"
        );
        (f64::NEG_INFINITY, 0)
    };

    let p_value = mackinnon_p_value(statistic);
    let critical_values = mackinnon_critical_values(nobs - 1);

    debug!(
        nobs = nobs,
        statistic = statistic,
        p_value = p_value,
        hedge_ratio = hedge_ratio,
        used_lag = used_lag,
        "Engle-Granger test complete"
    );

    Ok(CointegrationTest {
        statistic,
        p_value,
        critical_values,
        hedge_ratio,
        intercept,
        used_lag,
        nobs,
    })
}

/// ADF statistic and the lag order that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Augmented Dickey-Fuller test without constant or trend.
///
/// Regresses Δy[t] on y[t-1] and Δy[t-1..t-p]; p is chosen by minimum AIC
/// over `0..=maxlag` on a common sample, then the chosen model is refitted on
/// all usable rows. Ties go to the shorter lag.
pub fn adf_no_trend(series: &[f64]) -> Result<AdfResult, AnalysisError> {
    let n = series.len();
    let maxlag = default_max_lag(n).ok_or(AnalysisError::InsufficientData {
        stage: "ADF test",
        expected: 2,
        actual: n,
    })?;

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=maxlag {
        let fit = match adf_regression(series, &diffs, lag, maxlag) {
            Ok(fit) => fit,
            Err(e) => {
                debug!(lag = lag, error = %e, "Skipping ADF lag order");
                continue;
            }
        };
        let aic = fit.aic();
        if aic.is_nan() {
            continue;
        }
        match best {
            Some((best_aic, _)) if aic >= best_aic => {}
            _ => best = Some((aic, lag)),
        }
    }
    let used_lag = best.map(|(_, lag)| lag).unwrap_or(0);

    let fit = adf_regression(series, &diffs, used_lag, used_lag)?;
    Ok(AdfResult {
        statistic: fit.t_value(0),
        used_lag,
        nobs: fit.nobs,
    })
}

/// `min(n/2 - 1, ceil(12 * (n/100)^¼))`, or `None` when negative.
fn default_max_lag(n: usize) -> Option<usize> {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as i64;
    let cap = (n / 2) as i64 - 1;
    let maxlag = schwert.min(cap);
    usize::try_from(maxlag).ok()
}

/// Fit Δy[t] = γ y[t-1] + Σ δᵢ Δy[t-i] for i in 1..=lag over rows
/// t = start..diffs.len(), where diffs[t] = y[t+1] - y[t].
fn adf_regression(
    levels: &[f64],
    diffs: &[f64],
    lag: usize,
    start: usize,
) -> Result<OlsFit, RegressionError> {
    let rows = diffs.len().saturating_sub(start);
    let design = DMatrix::from_fn(rows, lag + 1, |r, c| {
        let t = start + r;
        if c == 0 {
            levels[t]
        } else {
            diffs[t - c]
        }
    });
    ols(&diffs[start..], &design)
}

/// MacKinnon (1994) approximate p-value for the two-variable cointegration
/// statistic with a constant.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let z = if statistic <= TAU_STAR {
        polyval(&TAU_SMALLP, statistic)
    } else {
        polyval(&TAU_LARGEP, statistic)
    };
    standard_normal_cdf(z)
}

/// Critical values at sample size `nobs` (MacKinnon 2010 response surface).
pub fn mackinnon_critical_values(nobs: usize) -> CriticalValues {
    let t = nobs as f64;
    let at = |row: &[f64; 4]| row[0] + row[1] / t + row[2] / t.powi(2) + row[3] / t.powi(3);
    CriticalValues {
        one_pct: at(&TAU_CRIT[0]),
        five_pct: at(&TAU_CRIT[1]),
        ten_pct: at(&TAU_CRIT[2]),
    }
}

/// Evaluate a polynomial given in ascending powers.
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Seeded LCG producing uniform noise in [-0.5, 0.5)
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        }
    }

    fn random_walk(n: usize, seed: u64, start: f64) -> Vec<f64> {
        let mut rng = Lcg(seed);
        let mut level = start;
        (0..n)
            .map(|_| {
                level += rng.next();
                level
            })
            .collect()
    }

    #[test]
    fn test_p_value_boundaries() {
        assert_eq!(mackinnon_p_value(f64::NEG_INFINITY), 0.0);
        assert_eq!(mackinnon_p_value(-25.0), 0.0);
        assert_eq!(mackinnon_p_value(5.0), 1.0);
        assert!(mackinnon_p_value(f64::NAN).is_nan());
    }

    #[test]
    fn test_p_value_monotonic_and_bounded() {
        let mut previous = 0.0;
        for step in 0..=200 {
            let stat = -18.0 + step as f64 * 0.09;
            let p = mackinnon_p_value(stat);
            assert!((0.0..=1.0).contains(&p), "p out of range at {stat}: {p}");
            assert!(p + 1e-6 >= previous, "p decreased at {stat}");
            previous = p;
        }
    }

    #[test]
    fn test_p_value_near_five_percent_critical_value() {
        // The asymptotic 5% critical value for N = 2 is about -3.34
        let p = mackinnon_p_value(-3.34);
        assert!((p - 0.05).abs() < 0.01, "got {p}");
    }

    #[test]
    fn test_critical_values_order() {
        let cv = mackinnon_critical_values(99);
        assert!(cv.one_pct < cv.five_pct && cv.five_pct < cv.ten_pct);
        assert!((cv.five_pct - (-3.33613 - 6.1101 / 99.0 - 6.823 / 9801.0)).abs() < 1e-12);
    }

    #[test]
    fn test_default_max_lag() {
        assert_eq!(default_max_lag(100), Some(12));
        assert_eq!(default_max_lag(10), Some(4));
        assert_eq!(default_max_lag(3), Some(0));
        assert_eq!(default_max_lag(1), None);
    }

    #[test]
    fn test_collinear_prices_have_zero_p_value() {
        let a: Vec<f64> = (0..10).map(|i| 100.0 + 10.0 * i as f64).collect();
        let b: Vec<f64> = a.iter().map(|p| p * 2.0).collect();
        let result = engle_granger(&a, &b).unwrap();
        assert_eq!(result.statistic, f64::NEG_INFINITY);
        assert_eq!(result.p_value, 0.0);
        assert!(result.is_cointegrated(0.05));
        assert!((result.hedge_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cointegrated_pair_detected() {
        let x = random_walk(250, 3, 100.0);
        let mut rng = Lcg(11);
        let y: Vec<f64> = x.iter().map(|v| 5.0 + 1.5 * v + rng.next()).collect();
        let result = engle_granger(&y, &x).unwrap();
        assert!(result.statistic.is_finite());
        assert!(result.p_value < 0.01, "p = {}", result.p_value);
        assert!((result.hedge_ratio - 1.5).abs() < 0.1);
    }

    #[test]
    fn test_cointegrated_pair_detected_at_high_price_level() {
        for level in [1000.0, 5000.0] {
            let x = random_walk(250, 3, level);
            let mut rng = Lcg(11);
            let y: Vec<f64> = x.iter().map(|v| 5.0 + 1.5 * v + rng.next()).collect();
            let result = engle_granger(&y, &x).unwrap();
            assert!(result.p_value < 0.01, "level {level}: p = {}", result.p_value);
            assert!(
                (result.hedge_ratio - 1.5).abs() < 0.1,
                "level {level}: beta = {}",
                result.hedge_ratio
            );
        }
    }

    #[test]
    fn test_non_finite_price_is_not_cointegrated() {
        let mut a: Vec<f64> = (0..20).map(|i| 100.0 + (i % 5) as f64).collect();
        let b: Vec<f64> = (0..20).map(|i| 50.0 + (i % 7) as f64).collect();
        a[7] = f64::NAN;
        for result in [engle_granger(&a, &b).unwrap(), engle_granger(&b, &a).unwrap()] {
            assert!(result.statistic.is_nan());
            assert!(result.p_value.is_nan());
            assert!(!result.is_cointegrated(0.05));
        }
    }

    #[test]
    fn test_continuity_at_polynomial_switch() {
        let below = mackinnon_p_value(TAU_STAR - 1e-9);
        let above = mackinnon_p_value(TAU_STAR + 1e-9);
        assert!((below - above).abs() < 0.01, "{below} vs {above}");
    }

    #[test]
    fn test_independent_walks_not_cointegrated() {
        let x = random_walk(250, 3, 100.0);
        let y = random_walk(250, 17, 50.0);
        let result = engle_granger(&y, &x).unwrap();
        assert!(result.statistic.is_finite());
        assert!(result.p_value > 0.05, "p = {}", result.p_value);
    }

    #[test]
    fn test_insufficient_data() {
        let err = engle_granger(&[1.0, 2.0], &[2.0, 1.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { actual: 2, .. }));
    }

    #[test]
    fn test_alignment_uses_timestamps() {
        let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let stamps: Vec<_> = (0..12).map(|i| base + Duration::days(i)).collect();
        let a: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let s1 = TimeSeries::from_parts(&stamps, &a);
        // Second series only overlaps on the first 8 days
        let s2 = TimeSeries::from_parts(&stamps[..8], &a[..8]);
        let result = cointegration_test(&s1, &s2).unwrap();
        assert_eq!(result.nobs, 8);
    }
}
