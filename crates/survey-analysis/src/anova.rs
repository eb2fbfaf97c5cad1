//! One-way analysis of variance.
//!
//! The value column is fitted on one indicator per group, the same cell-means
//! least-squares model used for planned contrasts. The residual sum of squares
//! of that fit is the within-group sum of squares. With a single factor the
//! Type I, II and III decompositions coincide.

use serde::Serialize;
use survey_frame::Table;
use survey_stats::{StatsError, distribution, is_negligible};
use tracing::{error, info, warn};

use crate::{
    AnalysisError,
    groups::{GroupSummary, fit_cell_means, grouped_values, summarize},
};

/// Groups smaller than this trigger a warning.
pub const SMALL_GROUP_SIZE: usize = 5;

/// The ANOVA table of a single-factor design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaTable {
    pub group_column: String,
    pub value_column: String,
    pub sum_of_squares_between: f64,
    pub sum_of_squares_within: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub mean_square_between: f64,
    pub mean_square_within: f64,
    pub f_statistic: f64,
    pub p_value: f64,
    pub groups: Vec<GroupSummary>,
}

/// Runs a one-way ANOVA of `value_col` across the labels of `group_col`.
///
/// Groups with fewer than [`SMALL_GROUP_SIZE`] observations are reported with
/// a warning but still take part. Zero within-group variance with distinct
/// group means gives an infinite F statistic and a p-value of zero.
///
/// # Errors
///
/// * [`AnalysisError::ColumnNotFound`] / [`AnalysisError::TypeKind`] for bad columns
/// * [`AnalysisError::TooFewGroups`] with fewer than two groups
/// * [`AnalysisError::NoResidualDegreesOfFreedom`] when every group has one observation
/// * [`AnalysisError::Stats`] when the data has no variance at all
///
/// # Examples
///
/// ```
/// use survey_analysis::anova::one_way_anova;
/// use survey_frame::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::from_labels("g", ["a", "a", "a", "b", "b", "b"]),
///     Column::from_values("v", [1.0, 2.0, 3.0, 7.0, 8.0, 9.0]),
/// ])
/// .unwrap();
/// let anova = one_way_anova(&table, "g", "v").unwrap();
/// assert_eq!(anova.df_between, 1);
/// assert_eq!(anova.df_within, 4);
/// assert!((anova.sum_of_squares_between - 54.0).abs() < 1e-9);
/// assert!((anova.sum_of_squares_within - 4.0).abs() < 1e-9);
/// assert!(anova.p_value < 0.01);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn one_way_anova(
    table: &Table,
    group_col: &str,
    value_col: &str,
) -> Result<AnovaTable, AnalysisError> {
    info!(group_col, value_col, "running one-way ANOVA");
    let grouped = grouped_values(table, group_col, value_col)?;

    let k = grouped.len();
    if k < 2 {
        error!(group_col, found = k, "ANOVA needs at least two groups");
        return Err(AnalysisError::TooFewGroups { found: k });
    }
    let n: usize = grouped.values().map(Vec::len).sum();
    if n <= k {
        error!(observations = n, groups = k, "no residual degrees of freedom");
        return Err(AnalysisError::NoResidualDegreesOfFreedom {
            observations: n,
            groups: k,
        });
    }

    let small = grouped
        .iter()
        .filter(|(_, values)| values.len() < SMALL_GROUP_SIZE)
        .map(|(label, values)| format!("{label}={}", values.len()))
        .collect::<Vec<_>>();
    if !small.is_empty() {
        warn!(groups = %small.join(", "), "small groups detected");
    }

    let model = fit_cell_means(&grouped)?;

    let grand_mean = grouped.values().flatten().sum::<f64>() / n as f64;
    let total = grouped
        .values()
        .flatten()
        .map(|v| (v - grand_mean).powi(2))
        .sum::<f64>();
    let magnitude = grouped.values().flatten().map(|v| v * v).sum::<f64>();
    if is_negligible(total, magnitude) {
        error!(value_col, "value column has no variance");
        return Err(StatsError::UndefinedStatistic.into());
    }
    let within = model.residual_sum_of_squares();
    let between = (total - within).max(0.0);

    let df_between = k - 1;
    let df_within = model.df_residual();
    let mean_square_between = between / df_between as f64;
    let mean_square_within = within / df_within as f64;
    let f_statistic = if is_negligible(within, total) {
        f64::INFINITY
    } else {
        mean_square_between / mean_square_within
    };
    let p_value =
        distribution::fisher_f_upper_tail(f_statistic, df_between as f64, df_within as f64)?;

    info!(f_statistic, p_value, df_between, df_within, "ANOVA completed");
    Ok(AnovaTable {
        group_column: group_col.to_owned(),
        value_column: value_col.to_owned(),
        sum_of_squares_between: between,
        sum_of_squares_within: within,
        df_between,
        df_within,
        mean_square_between,
        mean_square_within,
        f_statistic,
        p_value,
        groups: summarize(&grouped),
    })
}

#[cfg(test)]
mod tests {
    use survey_frame::Column;

    use super::*;

    fn synthetic() -> Table {
        let labels = ["A"; 10].into_iter().chain(["B"; 10]).chain(["C"; 10]);
        let values = [10.0; 10].into_iter().chain([2.0; 10]).chain([6.0; 10]);
        Table::new(vec![
            Column::from_labels("Group", labels),
            Column::from_values("Score", values),
        ])
        .unwrap()
    }

    #[test]
    fn test_distinct_constant_groups_are_significant() {
        let anova = one_way_anova(&synthetic(), "Group", "Score").unwrap();
        assert!(anova.p_value < 0.05);
        assert_eq!(anova.df_between, 2);
        assert_eq!(anova.df_within, 27);
        // 10 * ((10-6)^2 + (2-6)^2 + 0)
        assert!((anova.sum_of_squares_between - 320.0).abs() < 1e-9);
        assert!(anova.sum_of_squares_within.abs() < 1e-9);
        assert_eq!(anova.groups.len(), 3);
    }

    #[test]
    fn test_matches_textbook_f() {
        // groups: [2, 3, 7], [4, 5, 6, 9], [1, 2]
        let table = Table::new(vec![
            Column::from_labels("g", ["x", "x", "x", "y", "y", "y", "y", "z", "z"]),
            Column::from_values("v", [2.0, 3.0, 7.0, 4.0, 5.0, 6.0, 9.0, 1.0, 2.0]),
        ])
        .unwrap();
        let anova = one_way_anova(&table, "g", "v").unwrap();
        // grand mean 13/3; SSB = 3*(4-13/3)^2 + 4*(6-13/3)^2 + 2*(1.5-13/3)^2
        let grand: f64 = 13.0 / 3.0;
        let ssb = 3.0 * (4.0 - grand).powi(2) + 4.0 * (6.0 - grand).powi(2) + 2.0 * (1.5 - grand).powi(2);
        assert!((anova.sum_of_squares_between - ssb).abs() < 1e-9);
        // SSW = 14 + 14 + 0.5
        assert!((anova.sum_of_squares_within - 28.5).abs() < 1e-9);
        let f = (ssb / 2.0) / (28.5 / 6.0);
        assert!((anova.f_statistic - f).abs() < 1e-9);
        assert!(anova.p_value > 0.05 && anova.p_value < 1.0);
    }

    #[test]
    fn test_identical_groups_are_undefined() {
        for value in [0.1, 0.7, 1.1] {
            let table = Table::new(vec![
                Column::from_labels("g", ["a", "a", "a", "b", "b", "b", "c", "c", "c"]),
                Column::from_values("v", [value; 9]),
            ])
            .unwrap();
            assert_eq!(
                one_way_anova(&table, "g", "v"),
                Err(AnalysisError::Stats(StatsError::UndefinedStatistic)),
                "value {value}"
            );
        }
    }

    #[test]
    fn test_distinct_inexact_constant_groups_are_significant() {
        let table = Table::new(vec![
            Column::from_labels("g", ["a", "a", "a", "b", "b", "b"]),
            Column::from_values("v", [0.1, 0.1, 0.1, 0.7, 0.7, 0.7]),
        ])
        .unwrap();
        let anova = one_way_anova(&table, "g", "v").unwrap();
        assert!(anova.f_statistic.is_infinite());
        assert_eq!(anova.p_value, 0.0);
    }

    #[test]
    fn test_too_few_groups() {
        let table = Table::new(vec![
            Column::from_labels("g", ["a", "a", "a"]),
            Column::from_values("v", [1.0, 2.0, 3.0]),
        ])
        .unwrap();
        assert_eq!(
            one_way_anova(&table, "g", "v"),
            Err(AnalysisError::TooFewGroups { found: 1 })
        );
    }

    #[test]
    fn test_singleton_groups_have_no_residual_df() {
        let table = Table::new(vec![
            Column::from_labels("g", ["a", "b"]),
            Column::from_values("v", [1.0, 2.0]),
        ])
        .unwrap();
        assert!(matches!(
            one_way_anova(&table, "g", "v"),
            Err(AnalysisError::NoResidualDegreesOfFreedom { .. })
        ));
    }

    #[test]
    fn test_constant_response_is_undefined() {
        let table = Table::new(vec![
            Column::from_labels("g", ["a", "a", "b", "b"]),
            Column::from_values("v", [3.0; 4]),
        ])
        .unwrap();
        assert_eq!(
            one_way_anova(&table, "g", "v"),
            Err(AnalysisError::Stats(StatsError::UndefinedStatistic))
        );
    }

    #[test]
    fn test_column_errors() {
        let table = synthetic();
        assert!(matches!(
            one_way_anova(&table, "Nope", "Score"),
            Err(AnalysisError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            one_way_anova(&table, "Score", "Group"),
            Err(AnalysisError::TypeKind { .. })
        ));
    }
}
