use serde::Serialize;

use crate::percentiles;

/// Descriptive statistics summarizing a dataset.
///
/// Mirrors the usual "describe" summary of a numeric column: count, mean,
/// sample standard deviation, extrema and quartiles. Quartiles use linear
/// interpolation between the closest ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The arithmetic mean of the dataset.
    pub mean: f64,
    /// The sample standard deviation (`n - 1` denominator).
    ///
    /// `None` for a single observation.
    pub std_dev: Option<f64>,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The 25th percentile.
    pub q1: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The 75th percentile.
    pub q3: f64,
    /// The maximum value in the dataset.
    pub max: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use survey_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let mean = mean(sorted_values)?;
        let std_dev = sample_variance(sorted_values).map(f64::sqrt);

        Some(Self {
            count: sorted_values.len(),
            mean,
            std_dev,
            min,
            q1: percentiles::compute_percentile(sorted_values, 25.0),
            median: percentiles::compute_percentile(sorted_values, 50.0),
            q3: percentiles::compute_percentile(sorted_values, 75.0),
            max,
        })
    }
}

/// Arithmetic mean, or `None` for an empty slice.
///
/// ```
/// # use survey_stats::descriptive::mean;
/// assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
/// assert_eq!(mean(&[]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with an `n - 1` denominator, or `None` below two values.
///
/// ```
/// # use survey_stats::descriptive::sample_variance;
/// assert_eq!(sample_variance(&[2.0, 4.0, 6.0]), Some(4.0));
/// assert_eq!(sample_variance(&[2.0]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(sum_sq / (values.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_none() {
        assert!(DescriptiveStats::new(std::iter::empty()).is_none());
    }

    #[test]
    fn test_single_value_has_no_std_dev() {
        let stats = DescriptiveStats::new([7.5]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.q1, 7.5);
        assert_eq!(stats.q3, 7.5);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let stats = DescriptiveStats::new([10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert_eq!(stats.q1, 20.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.q3, 40.0);
        let std_dev = stats.std_dev.unwrap();
        assert!((std_dev - 15.811_388_300_841_896).abs() < 1e-12);
    }
}
