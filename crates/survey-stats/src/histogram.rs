use std::ops::Range;

use serde::Serialize;

/// An equal-width histogram of a dataset's distribution.
///
/// The bins span `[min, max]` of the data. Each bin covers a half-open range
/// except the last one, which also includes the maximum value.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    /// The range of values covered by this bin.
    pub range: Range<f64>,
    /// The number of values that fall within this bin.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram with `num_bins` equal-width bins.
    ///
    /// An empty dataset or `num_bins == 0` yields a histogram without bins.
    /// A constant dataset yields a single bin of width one centered on the value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survey_stats::histogram::Histogram;
    /// let values = [1.0, 2.0, 2.0, 3.0, 4.0];
    /// let histogram = Histogram::new(values, 3);
    /// assert_eq!(histogram.bins.len(), 3);
    /// assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 5);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if values.is_empty() || num_bins == 0 {
            return Self { bins: vec![] };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if (max - min).abs() < f64::EPSILON {
            return Self {
                bins: vec![HistogramBin {
                    range: (min - 0.5)..(min + 0.5),
                    count: values.len() as u64,
                }],
            };
        }

        let width = (max - min) / num_bins as f64;
        // Recompute bin edges from the index to avoid accumulating error
        let mut bins = (0..num_bins)
            .map(|i| HistogramBin {
                range: (min + width * i as f64)..(min + width * (i + 1) as f64),
                count: 0,
            })
            .collect::<Vec<_>>();
        if let Some(last) = bins.last_mut() {
            last.range.end = max;
        }

        for value in values {
            let idx = (((value - min) / width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Largest bin count, used to scale rendered bars.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert!(Histogram::new([], 5).bins.is_empty());
        assert!(Histogram::new([1.0, 2.0], 0).bins.is_empty());
    }

    #[test]
    fn test_constant_values_single_bin() {
        let histogram = Histogram::new([4.0, 4.0, 4.0], 10);
        assert_eq!(histogram.bins.len(), 1);
        assert_eq!(histogram.bins[0].count, 3);
        assert!(histogram.bins[0].range.contains(&4.0));
    }

    #[test]
    fn test_maximum_lands_in_last_bin() {
        let histogram = Histogram::new([0.0, 1.0, 2.0, 3.0, 4.0], 4);
        let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert_eq!(histogram.max_count(), 2);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let histogram = Histogram::new([1.0, f64::NAN, 2.0], 2);
        assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 2);
    }
}
