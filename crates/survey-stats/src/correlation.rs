//! Product-moment and rank correlation with significance tests.
//!
//! Both coefficients are tested against zero with the usual t approximation,
//! `t = r * sqrt((n - 2) / (1 - r^2))` on `n - 2` degrees of freedom.

use serde::Serialize;

use crate::{StatsError, distribution, is_negligible};

/// A correlation coefficient with its two-tailed p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    /// Coefficient in `[-1, 1]`.
    pub coefficient: f64,
    /// Two-tailed p-value for the null hypothesis of zero correlation.
    pub p_value: f64,
    /// Number of paired observations.
    pub n: usize,
}

/// Pearson product-moment correlation.
///
/// # Errors
///
/// * [`StatsError::LengthMismatch`] if the slices differ in length
/// * [`StatsError::InsufficientData`] with fewer than two pairs
/// * [`StatsError::ConstantInput`] if either side has zero variance
///
/// # Examples
///
/// ```
/// use survey_stats::correlation::pearson;
///
/// let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
/// assert!((r.coefficient - 1.0).abs() < 1e-12);
/// assert!(r.p_value < 1e-10);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(StatsError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    let (mut xx, mut yy) = (0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
        xx += xi * xi;
        yy += yi * yi;
    }
    if is_negligible(sxx, xx) || is_negligible(syy, yy) {
        return Err(StatsError::ConstantInput);
    }

    let coefficient = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let p_value = correlation_p_value(coefficient, n)?;
    Ok(Correlation {
        coefficient,
        p_value,
        n,
    })
}

/// Spearman rank correlation: Pearson correlation of the average ranks.
///
/// # Examples
///
/// ```
/// use survey_stats::correlation::spearman;
///
/// // Monotonic but not linear
/// let r = spearman(&[1.0, 2.0, 3.0, 4.0], &[1.0, 4.0, 9.0, 16.0]).unwrap();
/// assert!((r.coefficient - 1.0).abs() < 1e-12);
/// ```
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Correlation, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Ranks values from 1, giving tied values the mean of their ranks.
///
/// ```
/// use survey_stats::correlation::average_ranks;
///
/// assert_eq!(average_ranks(&[10.0, 30.0, 20.0, 20.0]), vec![1.0, 4.0, 2.5, 2.5]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end share ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

#[expect(clippy::cast_precision_loss)]
fn correlation_p_value(r: f64, n: usize) -> Result<f64, StatsError> {
    if n == 2 {
        // Two points always lie on a line.
        return Ok(1.0);
    }
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    distribution::students_t_two_tailed(t, df)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_pearson_reference_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 1.0, 4.0, 3.0, 7.0, 5.0];
        let r = pearson(&x, &y).unwrap();
        // r = 16 / sqrt(17.5 * 23.333..)
        assert!((r.coefficient - 0.7918).abs() < 1e-4);
        assert!(r.p_value > 0.05 && r.p_value < 0.1);
        assert_eq!(r.n, 6);
    }

    #[test]
    fn test_pearson_errors() {
        assert_eq!(
            pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(StatsError::LengthMismatch { left: 3, right: 2 })
        );
        assert_eq!(
            pearson(&[1.0], &[1.0]),
            Err(StatsError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
        assert_eq!(
            pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::ConstantInput)
        );
    }

    #[test]
    fn test_inexact_constant_column_is_constant_input() {
        let x = (0..10).map(f64::from).collect::<Vec<_>>();
        for value in [0.1, 0.7, 1.1, 3.3] {
            assert_eq!(
                pearson(&x, &[value; 10]),
                Err(StatsError::ConstantInput),
                "value {value}"
            );
            assert_eq!(pearson(&[value; 10], &x), Err(StatsError::ConstantInput));
        }
    }

    #[test]
    fn test_two_points_have_unit_p_value() {
        let r = pearson(&[1.0, 2.0], &[3.0, 1.0]).unwrap();
        assert!((r.coefficient + 1.0).abs() < 1e-12);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_spearman_with_ties() {
        let r = spearman(&[1.0, 2.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(r.coefficient > 0.9 && r.coefficient < 1.0);
    }

    proptest! {
        #[test]
        fn prop_pearson_bounds(
            pairs in prop::collection::vec((-1.0e3..1.0e3f64, -1.0e3..1.0e3f64), 3..40)
        ) {
            let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            if let Ok(r) = pearson(&x, &y) {
                prop_assert!((-1.0..=1.0).contains(&r.coefficient));
                prop_assert!((0.0..=1.0).contains(&r.p_value));
            }
        }

        #[test]
        fn prop_ranks_sum_to_triangular_number(values in prop::collection::vec(-50i32..50, 1..60)) {
            let values = values.into_iter().map(f64::from).collect::<Vec<_>>();
            let n = values.len();
            let sum = average_ranks(&values).iter().sum::<f64>();
            let expected = (n * (n + 1)) as f64 / 2.0;
            prop_assert!((sum - expected).abs() < 1e-9);
        }
    }
}
