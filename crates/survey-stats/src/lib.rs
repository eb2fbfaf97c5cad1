//! Numeric building blocks for the survey analysis pipeline.
//!
//! This crate works on plain `f64` slices and knows nothing about tables or
//! column names. It provides:
//!
//! - **Descriptive statistics**: count, mean, sample standard deviation, quartiles
//! - **Percentiles**: linearly interpolated percentile lookup
//! - **Histogram generation**: equal-width frequency distributions
//! - **Correlation**: Pearson and Spearman coefficients with t-based p-values
//! - **Contingency tables**: chi-squared test of independence and Cramér's V
//! - **Linear models**: ordinary least squares and t-tests of linear hypotheses
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile interpolation on sorted data
//! - [`histogram`]: Histogram construction for distribution plots
//! - [`correlation`]: Product-moment and rank correlation
//! - [`contingency`]: Cross-tabulation and association of categorical data
//! - [`linear_model`]: Least squares fits and linear-hypothesis tests
//! - [`distribution`]: Tail probabilities of the t, F and chi-squared distributions
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use survey_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Correlating two samples
//!
//! ```
//! use survey_stats::correlation::{pearson, spearman};
//!
//! let hours = [5.0, 6.0, 7.0, 8.0, 9.0];
//! let stress = [9.0, 7.0, 6.0, 4.0, 2.0];
//! assert!(pearson(&hours, &stress).unwrap().coefficient < -0.9);
//! assert_eq!(spearman(&hours, &stress).unwrap().coefficient, -1.0);
//! ```
//!
//! ## Testing a difference of group means
//!
//! ```
//! use survey_stats::linear_model::LinearModel;
//!
//! let levels = vec!["control".to_string(), "treated".to_string()];
//! let groups = [0, 0, 0, 1, 1, 1];
//! let values = [4.0, 5.0, 6.0, 8.0, 9.0, 10.0];
//! let model = LinearModel::fit_cell_means(levels, &groups, &values).unwrap();
//! let test = model.t_test(&[-1.0, 1.0]).unwrap();
//! assert!(test.t_statistic > 0.0);
//! assert!(test.p_value < 0.05);
//! ```

pub use self::error::StatsError;

pub mod contingency;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
mod error;
pub mod histogram;
pub mod linear_model;
pub mod percentiles;

/// Fraction of the data's own magnitude below which a sum of squares or an
/// estimate is rounding noise rather than signal.
pub const RELATIVE_TOLERANCE: f64 = 1e-12;

/// Returns `true` when `value` is indistinguishable from zero at `scale`.
///
/// ```
/// use survey_stats::is_negligible;
///
/// assert!(is_negligible(1e-31, 4.41));
/// assert!(!is_negligible(0.5, 4.41));
/// assert!(is_negligible(0.0, 0.0));
/// ```
#[must_use]
pub fn is_negligible(value: f64, scale: f64) -> bool {
    value.abs() <= RELATIVE_TOLERANCE * scale.abs()
}
