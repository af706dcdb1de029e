//! Descriptive statistics over `f64` slices.
//!
//! Degenerate inputs (empty slices, zero variance) produce `NaN` rather
//! than errors so that undefined results flow through to the report.

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N-1 denominator). `NaN` below two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Pearson correlation coefficient with pairwise deletion.
///
/// Pairs where either side is `None` or `NaN` are skipped. Returns `NaN`
/// when fewer than two pairs remain or either side has zero variance.
///
/// # Mathematical Definition
/// r = Σ[(xi - x̄)(yi - ȳ)] / √[Σ(xi - x̄)² × Σ(yi - ȳ)²]
pub fn pearson<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some((x, y)),
            _ => None,
        })
        .unzip();

    if xs.len() < 2 {
        return f64::NAN;
    }

    let mean_x = mean(&xs);
    let mean_y = mean(&ys);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    let r = covariance / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}

/// Whether a column has any spread once undefined values are dropped.
pub fn has_variance(values: &[Option<f64>]) -> bool {
    let defined: Vec<f64> = values
        .iter()
        .filter_map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    match defined.first() {
        Some(first) => defined.len() >= 2 && defined.iter().any(|x| x != first),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_mean_and_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        // Population std is 2.0; sample std is sqrt(32/7)
        assert!((sample_std_dev(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(sample_std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn test_pearson_perfect() {
        let a = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let corr = pearson(a.iter().copied().zip(a.iter().copied()));
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_negative() {
        let a = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = some(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let corr = pearson(a.into_iter().zip(b));
        assert!((corr + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_pairwise_deletion() {
        let a = vec![None, Some(1.0), Some(2.0), Some(f64::NAN), Some(3.0)];
        let b = vec![Some(9.0), Some(2.0), Some(4.0), Some(5.0), Some(6.0)];
        let corr = pearson(a.into_iter().zip(b));
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance_is_nan() {
        let a = some(&[3.0, 3.0, 3.0]);
        let b = some(&[1.0, 2.0, 3.0]);
        assert!(pearson(a.into_iter().zip(b)).is_nan());
    }

    #[test]
    fn test_has_variance() {
        assert!(has_variance(&[None, Some(1.0), Some(2.0)]));
        assert!(!has_variance(&[None, Some(1.0), Some(1.0)]));
        assert!(!has_variance(&[None]));
    }
}
