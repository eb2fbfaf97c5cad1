//! Contingency tables, the chi-squared test of independence and Cramér's V.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{StatsError, distribution};

/// Cross-tabulated counts of two categorical variables.
///
/// Row and column labels are kept in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

/// Result of a chi-squared test of independence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquaredTest {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// Whether Yates' continuity correction was applied (2x2 tables only).
    pub yates_corrected: bool,
}

impl ContingencyTable {
    /// Cross-tabulates paired labels.
    ///
    /// # Examples
    ///
    /// ```
    /// use survey_stats::contingency::ContingencyTable;
    ///
    /// let table = ContingencyTable::from_pairs([("a", "x"), ("a", "y"), ("b", "y")]);
    /// assert_eq!(table.shape(), (2, 2));
    /// assert_eq!(table.count("a", "y"), 1);
    /// assert_eq!(table.total(), 3);
    /// ```
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut cells = BTreeMap::<(&str, &str), u64>::new();
        let mut rows = BTreeMap::<&str, ()>::new();
        let mut cols = BTreeMap::<&str, ()>::new();
        for (row, col) in pairs {
            *cells.entry((row, col)).or_default() += 1;
            rows.insert(row, ());
            cols.insert(col, ());
        }

        let counts = rows
            .keys()
            .map(|row| {
                cols.keys()
                    .map(|col| cells.get(&(*row, *col)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();
        Self {
            row_labels: rows.into_keys().map(str::to_owned).collect(),
            col_labels: cols.into_keys().map(str::to_owned).collect(),
            counts,
        }
    }

    /// Number of (rows, columns).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    /// Total number of observations.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Count of a single cell, zero for unknown labels.
    #[must_use]
    pub fn count(&self, row: &str, col: &str) -> u64 {
        let Some(r) = self.row_labels.iter().position(|l| l == row) else {
            return 0;
        };
        let Some(c) = self.col_labels.iter().position(|l| l == col) else {
            return 0;
        };
        self.counts[r][c]
    }

    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    #[must_use]
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Pearson's chi-squared test of independence.
    ///
    /// Expected counts are `row_total * col_total / n`. With a single degree of
    /// freedom Yates' continuity correction is applied, moving each observed
    /// count up to 0.5 towards its expectation.
    ///
    /// # Errors
    ///
    /// * [`StatsError::InsufficientData`] for an empty table
    /// * [`StatsError::DegenerateTable`] when either dimension is below two
    #[expect(clippy::cast_precision_loss)]
    pub fn chi_squared(&self) -> Result<ChiSquaredTest, StatsError> {
        let total = self.total();
        if total == 0 {
            return Err(StatsError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let (rows, cols) = self.shape();
        if rows < 2 || cols < 2 {
            return Err(StatsError::DegenerateTable { rows, cols });
        }

        let n = total as f64;
        let row_totals = self
            .counts
            .iter()
            .map(|row| row.iter().sum::<u64>() as f64)
            .collect::<Vec<_>>();
        let col_totals = (0..cols)
            .map(|c| self.counts.iter().map(|row| row[c]).sum::<u64>() as f64)
            .collect::<Vec<_>>();

        let degrees_of_freedom = (rows - 1) * (cols - 1);
        let yates_corrected = degrees_of_freedom == 1;

        let mut statistic = 0.0;
        for (r, row) in self.counts.iter().enumerate() {
            for (c, &observed) in row.iter().enumerate() {
                let expected = row_totals[r] * col_totals[c] / n;
                let mut diff = (observed as f64 - expected).abs();
                if yates_corrected {
                    diff = (diff - 0.5).max(0.0);
                }
                statistic += diff * diff / expected;
            }
        }

        let p_value = distribution::chi_squared_upper_tail(statistic, degrees_of_freedom as f64)?;
        Ok(ChiSquaredTest {
            statistic,
            degrees_of_freedom,
            p_value,
            yates_corrected,
        })
    }

    /// Cramér's V derived from a chi-squared statistic computed on this table:
    /// `sqrt(chi2 / (n * (min(rows, cols) - 1)))`, clamped to `[0, 1]`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn cramers_v(&self, test: &ChiSquaredTest) -> f64 {
        let (rows, cols) = self.shape();
        let min_dim = rows.min(cols).saturating_sub(1);
        let denominator = self.total() as f64 * min_dim as f64;
        if denominator == 0.0 {
            return 0.0;
        }
        (test.statistic / denominator).sqrt().clamp(0.0, 1.0)
    }
}
