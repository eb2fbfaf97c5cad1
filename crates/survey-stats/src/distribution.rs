//! Upper-tail probabilities of the reference distributions used by the tests
//! in this crate.
//!
//! Infinite statistics map to a p-value of exactly `0.0`, which happens when a
//! fit has no residual variance but a non-zero effect.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

use crate::StatsError;

fn distribution_error<E>(err: E) -> StatsError
where
    E: std::fmt::Display,
{
    StatsError::Distribution {
        message: err.to_string(),
    }
}

/// Two-tailed p-value of a Student's t statistic.
///
/// # Examples
///
/// ```
/// use survey_stats::distribution::students_t_two_tailed;
///
/// let p = students_t_two_tailed(0.0, 10.0).unwrap();
/// assert!((p - 1.0).abs() < 1e-12);
/// assert_eq!(students_t_two_tailed(f64::INFINITY, 10.0).unwrap(), 0.0);
/// ```
pub fn students_t_two_tailed(t: f64, df: f64) -> Result<f64, StatsError> {
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df).map_err(distribution_error)?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

/// Upper-tail probability `P(F > f)` of the F distribution.
pub fn fisher_f_upper_tail(f: f64, df_numerator: f64, df_denominator: f64) -> Result<f64, StatsError> {
    if f.is_infinite() {
        return Ok(0.0);
    }
    let dist = FisherSnedecor::new(df_numerator, df_denominator).map_err(distribution_error)?;
    Ok(dist.sf(f).clamp(0.0, 1.0))
}

/// Upper-tail probability `P(X > x)` of the chi-squared distribution.
pub fn chi_squared_upper_tail(x: f64, df: f64) -> Result<f64, StatsError> {
    if x.is_infinite() {
        return Ok(0.0);
    }
    let dist = ChiSquared::new(df).map_err(distribution_error)?;
    Ok(dist.sf(x).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_two_tailed_matches_reference() {
        // t = 2.228 with 10 df is the 97.5% quantile
        let p = students_t_two_tailed(2.228_138_85, 10.0).unwrap();
        assert!((p - 0.05).abs() < 1e-6);
        let p_neg = students_t_two_tailed(-2.228_138_85, 10.0).unwrap();
        assert!((p - p_neg).abs() < 1e-15);
    }

    #[test]
    fn test_f_upper_tail_reference() {
        // F(2, 27) critical value at alpha = 0.05 is 3.354
        let p = fisher_f_upper_tail(3.354_130_8, 2.0, 27.0).unwrap();
        assert!((p - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_chi_squared_upper_tail_reference() {
        let p = chi_squared_upper_tail(3.841_458_82, 1.0).unwrap();
        assert!((p - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_degrees_of_freedom() {
        assert!(matches!(
            students_t_two_tailed(1.0, 0.0),
            Err(StatsError::Distribution { .. })
        ));
    }
}
