//! Ordinary least squares fits and linear-hypothesis t-tests.
//!
//! The model is `y = X β + ε` with homoscedastic errors. After fitting, the
//! covariance of the estimates is `σ² (XᵀX)⁻¹` where `σ² = RSS / (n - p)`,
//! which is all a single linear hypothesis `cᵀβ = 0` needs.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::{StatsError, distribution, is_negligible};

/// A fitted ordinary least squares model.
#[derive(Debug, Clone)]
pub struct LinearModel {
    parameter_names: Vec<String>,
    coefficients: DVector<f64>,
    /// `(XᵀX)⁻¹`, scaled by [`Self::scale`] to obtain the covariance.
    normalized_covariance: DMatrix<f64>,
    residual_sum_of_squares: f64,
    /// `Σy²`, the scale against which the residuals are judged.
    response_sum_of_squares: f64,
    n_observations: usize,
}

/// Result of a t-test of a single linear combination of coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    /// `cᵀβ`.
    pub estimate: f64,
    /// `sqrt(cᵀ Σ c)`.
    pub std_error: f64,
    pub t_statistic: f64,
    pub degrees_of_freedom: usize,
    /// Two-tailed p-value.
    pub p_value: f64,
}

impl LinearModel {
    /// Fits the model by solving the normal equations.
    ///
    /// # Errors
    ///
    /// * [`StatsError::LengthMismatch`] if the design, response or names disagree
    /// * [`StatsError::InsufficientData`] if there are no residual degrees of freedom
    /// * [`StatsError::SingularDesign`] if `XᵀX` cannot be inverted
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::{DMatrix, DVector};
    /// use survey_stats::linear_model::LinearModel;
    ///
    /// // y = 1 + 2x
    /// let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
    /// let y = DVector::from_vec(vec![1.0, 3.0, 5.0, 7.0]);
    /// let model = LinearModel::fit(vec!["intercept".into(), "x".into()], &x, &y).unwrap();
    /// assert!((model.coefficient("x").unwrap() - 2.0).abs() < 1e-12);
    /// ```
    pub fn fit(
        parameter_names: Vec<String>,
        design: &DMatrix<f64>,
        response: &DVector<f64>,
    ) -> Result<Self, StatsError> {
        let (n, p) = design.shape();
        if response.len() != n {
            return Err(StatsError::LengthMismatch {
                left: n,
                right: response.len(),
            });
        }
        if parameter_names.len() != p {
            return Err(StatsError::LengthMismatch {
                left: p,
                right: parameter_names.len(),
            });
        }
        if n <= p {
            return Err(StatsError::InsufficientData {
                required: p + 1,
                actual: n,
            });
        }

        let xtx = design.transpose() * design;
        let normalized_covariance = xtx.try_inverse().ok_or(StatsError::SingularDesign)?;
        let coefficients = &normalized_covariance * (design.transpose() * response);
        let residuals = response - design * &coefficients;
        let residual_sum_of_squares = residuals.norm_squared();

        Ok(Self {
            parameter_names,
            coefficients,
            normalized_covariance,
            residual_sum_of_squares,
            response_sum_of_squares: response.norm_squared(),
            n_observations: n,
        })
    }

    /// Fits a cell-means model: one indicator column per level and no intercept,
    /// so each coefficient is the mean response of its level.
    ///
    /// `assignments[i]` is the index into `levels` of observation `i`.
    ///
    /// # Examples
    ///
    /// ```
    /// use survey_stats::linear_model::LinearModel;
    ///
    /// let levels = vec!["a".to_string(), "b".to_string()];
    /// let model = LinearModel::fit_cell_means(levels, &[0, 0, 1, 1], &[1.0, 3.0, 10.0, 12.0]).unwrap();
    /// assert!((model.coefficient("a").unwrap() - 2.0).abs() < 1e-12);
    /// assert!((model.coefficient("b").unwrap() - 11.0).abs() < 1e-12);
    /// ```
    pub fn fit_cell_means(
        levels: Vec<String>,
        assignments: &[usize],
        response: &[f64],
    ) -> Result<Self, StatsError> {
        if assignments.len() != response.len() {
            return Err(StatsError::LengthMismatch {
                left: assignments.len(),
                right: response.len(),
            });
        }
        let design = DMatrix::from_fn(assignments.len(), levels.len(), |row, col| {
            if assignments[row] == col { 1.0 } else { 0.0 }
        });
        let response = DVector::from_column_slice(response);
        Self::fit(levels, &design, &response)
    }

    /// Fits `y = intercept + slope * x`, returning `(intercept, slope)`.
    pub fn fit_line(x: &[f64], y: &[f64]) -> Result<(f64, f64), StatsError> {
        if x.len() != y.len() {
            return Err(StatsError::LengthMismatch {
                left: x.len(),
                right: y.len(),
            });
        }
        let design = DMatrix::from_fn(x.len(), 2, |row, col| if col == 0 { 1.0 } else { x[row] });
        let response = DVector::from_column_slice(y);
        let model = Self::fit(vec!["intercept".into(), "slope".into()], &design, &response)?;
        Ok((model.coefficients[0], model.coefficients[1]))
    }

    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.as_slice()
    }

    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        let idx = self.parameter_names.iter().position(|n| n == name)?;
        Some(self.coefficients[idx])
    }

    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    #[must_use]
    pub fn residual_sum_of_squares(&self) -> f64 {
        self.residual_sum_of_squares
    }

    #[must_use]
    pub fn df_residual(&self) -> usize {
        self.n_observations - self.parameter_names.len()
    }

    /// Returns `true` when the residuals are rounding noise, i.e. the model
    /// reproduces the response exactly.
    #[must_use]
    pub fn is_exact_fit(&self) -> bool {
        is_negligible(self.residual_sum_of_squares, self.response_sum_of_squares)
    }

    /// Residual variance estimate `RSS / (n - p)`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.residual_sum_of_squares / self.df_residual() as f64
    }

    /// Tests `cᵀβ = 0` for a vector `c` aligned with [`Self::parameter_names`].
    ///
    /// An exact fit (see [`Self::is_exact_fit`]) has a zero standard error. A
    /// non-zero estimate then gives an infinite t statistic and a p-value of
    /// zero. Estimates within rounding of `Σ|cᵢβᵢ|` count as zero.
    ///
    /// # Errors
    ///
    /// * [`StatsError::LengthMismatch`] if `contrast` does not match the parameters
    /// * [`StatsError::UndefinedStatistic`] if both estimate and standard error are zero
    #[expect(clippy::cast_precision_loss)]
    pub fn t_test(&self, contrast: &[f64]) -> Result<TTest, StatsError> {
        if contrast.len() != self.coefficients.len() {
            return Err(StatsError::LengthMismatch {
                left: self.coefficients.len(),
                right: contrast.len(),
            });
        }
        let c = DVector::from_column_slice(contrast);
        let estimate = c.dot(&self.coefficients);
        let magnitude = c.component_mul(&self.coefficients).abs().sum();
        let std_error = if self.is_exact_fit() {
            0.0
        } else {
            let variance =
                self.scale() * (c.transpose() * &self.normalized_covariance * &c)[(0, 0)];
            variance.max(0.0).sqrt()
        };

        let t_statistic = if std_error > 0.0 {
            estimate / std_error
        } else if !is_negligible(estimate, magnitude) {
            f64::INFINITY.copysign(estimate)
        } else {
            return Err(StatsError::UndefinedStatistic);
        };

        let degrees_of_freedom = self.df_residual();
        let p_value = distribution::students_t_two_tailed(t_statistic, degrees_of_freedom as f64)?;
        Ok(TTest {
            estimate,
            std_error,
            t_statistic,
            degrees_of_freedom,
            p_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_cell_means_scale_is_pooled_variance() {
        // group a: 1, 3 (var 2), group b: 10, 14 (var 8) -> pooled = 5
        let model =
            LinearModel::fit_cell_means(levels(&["a", "b"]), &[0, 0, 1, 1], &[1.0, 3.0, 10.0, 14.0])
                .unwrap();
        assert_eq!(model.df_residual(), 2);
        assert!((model.scale() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_t_test_difference_of_means() {
        let model =
            LinearModel::fit_cell_means(levels(&["a", "b"]), &[0, 0, 1, 1], &[1.0, 3.0, 10.0, 14.0])
                .unwrap();
        let test = model.t_test(&[-1.0, 1.0]).unwrap();
        assert!((test.estimate - 10.0).abs() < 1e-12);
        // se = sqrt(5 * (1/2 + 1/2))
        assert!((test.std_error - 5f64.sqrt()).abs() < 1e-12);
        assert_eq!(test.degrees_of_freedom, 2);
        assert!(test.p_value > 0.0 && test.p_value < 0.1);
    }

    #[test]
    fn test_zero_residual_variance() {
        let model =
            LinearModel::fit_cell_means(levels(&["a", "b"]), &[0, 0, 1, 1], &[2.0, 2.0, 5.0, 5.0])
                .unwrap();
        let test = model.t_test(&[1.0, -1.0]).unwrap();
        assert!(test.t_statistic.is_infinite() && test.t_statistic < 0.0);
        assert_eq!(test.p_value, 0.0);
        assert_eq!(model.t_test(&[0.0, 0.0]), Err(StatsError::UndefinedStatistic));
    }

    #[test]
    fn test_constant_response_is_undefined() {
        // 0.7 is not representable, so the fitted means carry rounding noise
        let assignments = [0, 0, 0, 1, 1, 1, 1, 1, 1, 1];
        for value in [0.1, 0.7, 1.1, 3.3] {
            let model =
                LinearModel::fit_cell_means(levels(&["a", "b"]), &assignments, &[value; 10]).unwrap();
            assert!(model.is_exact_fit());
            assert_eq!(
                model.t_test(&[1.0, -1.0]),
                Err(StatsError::UndefinedStatistic),
                "value {value}"
            );
        }
    }

    #[test]
    fn test_fit_errors() {
        assert!(matches!(
            LinearModel::fit_cell_means(levels(&["a", "b"]), &[0, 1], &[1.0, 2.0]),
            Err(StatsError::InsufficientData { .. })
        ));
        // level "c" has no observations
        assert_eq!(
            LinearModel::fit_cell_means(levels(&["a", "b", "c"]), &[0, 0, 1, 1], &[1.0, 2.0, 3.0, 4.0])
                .unwrap_err(),
            StatsError::SingularDesign
        );
        let model =
            LinearModel::fit_cell_means(levels(&["a", "b"]), &[0, 0, 1, 1], &[1.0, 2.0, 3.0, 4.0])
                .unwrap();
        assert!(matches!(
            model.t_test(&[1.0]),
            Err(StatsError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_line() {
        let (intercept, slope) = LinearModel::fit_line(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.5]).unwrap();
        assert!((slope - 2.25).abs() < 1e-12);
        assert!((intercept - 0.916_666_666_666_666_7).abs() < 1e-12);
    }
}
