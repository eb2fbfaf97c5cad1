//! Planned contrasts between groups of a single factor.
//!
//! A contrast is a zero-sum weight per group. It is tested as the linear
//! hypothesis `cᵀβ = 0` on a no-intercept cell-means fit, where every
//! coefficient is the mean of one group and `c` holds the weights in the same
//! order (zero for unweighted groups).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use survey_frame::Table;
use tracing::{debug, error, info};

use crate::{
    AnalysisError,
    groups::{GroupSummary, fit_cell_means, grouped_values, summarize},
};

/// Tolerance of the zero-sum check.
pub const ZERO_SUM_TOLERANCE: f64 = 1e-9;

/// Weight of each group in a planned contrast. The weights sum to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContrastWeights {
    weights: BTreeMap<String, f64>,
}

impl ContrastWeights {
    /// Validates hand-written weights.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::EmptyGroups`] if `weights` is empty
    /// * [`AnalysisError::NotZeroSum`] if the weights do not cancel out
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use survey_analysis::contrast::ContrastWeights;
    ///
    /// let ok = BTreeMap::from([("A".to_string(), 2.0), ("B".to_string(), -1.0), ("C".to_string(), -1.0)]);
    /// assert!(ContrastWeights::new(ok).is_ok());
    /// let bad = BTreeMap::from([("A".to_string(), 1.0), ("B".to_string(), -0.5)]);
    /// assert!(ContrastWeights::new(bad).is_err());
    /// ```
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self, AnalysisError> {
        if weights.is_empty() {
            return Err(AnalysisError::EmptyGroups);
        }
        let sum = weights.values().sum::<f64>();
        if !sum.is_finite() || sum.abs() > ZERO_SUM_TOLERANCE {
            return Err(AnalysisError::NotZeroSum { sum });
        }
        Ok(Self { weights })
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.weights.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.weights.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Builds contrast weights comparing the groups expected to score higher
/// (`positive`) with those expected to score lower (`negative`).
///
/// Each positive group weighs `1 / |positive|` and each negative group
/// `-1 / |negative|`. Repeated labels within one list count once.
///
/// # Errors
///
/// * [`AnalysisError::EmptyGroups`] if either list is empty
/// * [`AnalysisError::OverlappingGroups`] if a label is in both lists
///
/// # Examples
///
/// ```
/// use survey_analysis::contrast::build_contrast;
///
/// let weights = build_contrast(&["Vegan", "Vegetarian"], &["Keto"]).unwrap();
/// assert_eq!(weights.get("Vegan"), Some(0.5));
/// assert_eq!(weights.get("Keto"), Some(-1.0));
/// assert!(weights.sum().abs() < 1e-9);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn build_contrast<S>(positive: &[S], negative: &[S]) -> Result<ContrastWeights, AnalysisError>
where
    S: AsRef<str>,
{
    let positive = positive.iter().map(|s| s.as_ref()).collect::<BTreeSet<&str>>();
    let negative = negative.iter().map(|s| s.as_ref()).collect::<BTreeSet<&str>>();
    if positive.is_empty() || negative.is_empty() {
        error!("both positive and negative groups must be provided");
        return Err(AnalysisError::EmptyGroups);
    }
    let overlap = positive
        .intersection(&negative)
        .map(|s| (*s).to_owned())
        .collect::<Vec<_>>();
    if !overlap.is_empty() {
        error!(labels = ?overlap, "groups on both sides of the contrast");
        return Err(AnalysisError::OverlappingGroups { labels: overlap });
    }

    let positive_weight = 1.0 / positive.len() as f64;
    let negative_weight = -1.0 / negative.len() as f64;
    let weights = positive
        .iter()
        .map(|g| ((*g).to_owned(), positive_weight))
        .chain(negative.iter().map(|g| ((*g).to_owned(), negative_weight)))
        .collect::<BTreeMap<_, _>>();
    info!(?weights, "contrast weights created");
    ContrastWeights::new(weights)
}

/// Mean of a group alongside its contrast weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedMean {
    pub label: String,
    pub weight: f64,
    pub mean: f64,
}

/// Outcome of [`evaluate_contrast`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastResult {
    pub group_column: String,
    pub value_column: String,
    /// Weighted sum of group means.
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub degrees_of_freedom: usize,
    /// Two-tailed.
    pub p_value: f64,
    pub weighted_means: Vec<WeightedMean>,
    pub groups: Vec<GroupSummary>,
}

/// Tests a planned contrast of `value_col` across the groups of `group_col`.
///
/// The residual variance is pooled over every group in the data, including
/// groups without weight, and the degrees of freedom are `N - k`.
///
/// # Errors
///
/// * [`AnalysisError::ColumnNotFound`] / [`AnalysisError::TypeKind`] for bad columns
/// * [`AnalysisError::MissingGroups`] if a weighted label has no observations
/// * [`AnalysisError::NoResidualDegreesOfFreedom`] when `N <= k`
/// * [`AnalysisError::Stats`] if the fit or the test is degenerate
///
/// # Examples
///
/// ```
/// use survey_analysis::contrast::{build_contrast, evaluate_contrast};
/// use survey_frame::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::from_labels("Diet", ["Vegan", "Vegan", "Vegan", "Keto", "Keto", "Keto"]),
///     Column::from_values("Happiness", [8.0, 9.0, 7.0, 4.0, 5.0, 3.0]),
/// ])
/// .unwrap();
/// let weights = build_contrast(&["Vegan"], &["Keto"]).unwrap();
/// let result = evaluate_contrast(&table, "Diet", "Happiness", &weights).unwrap();
/// assert!((result.estimate - 4.0).abs() < 1e-12);
/// assert_eq!(result.degrees_of_freedom, 4);
/// assert!(result.t_statistic > 0.0 && result.p_value < 0.05);
/// ```
pub fn evaluate_contrast(
    table: &Table,
    group_col: &str,
    value_col: &str,
    weights: &ContrastWeights,
) -> Result<ContrastResult, AnalysisError> {
    info!(group_col, value_col, "running planned contrast");
    let grouped = grouped_values(table, group_col, value_col)?;

    let missing = weights
        .labels()
        .filter(|label| !grouped.contains_key(*label))
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        error!(labels = ?missing, "groups missing from data");
        return Err(AnalysisError::MissingGroups { labels: missing });
    }

    let n: usize = grouped.values().map(Vec::len).sum();
    if n <= grouped.len() {
        error!(observations = n, groups = grouped.len(), "no residual degrees of freedom");
        return Err(AnalysisError::NoResidualDegreesOfFreedom {
            observations: n,
            groups: grouped.len(),
        });
    }

    let model = fit_cell_means(&grouped)?;

    let contrast = model
        .parameter_names()
        .iter()
        .map(|name| weights.get(name).unwrap_or(0.0))
        .collect::<Vec<_>>();
    debug!(?contrast, "contrast vector aligned to group means");
    let test = model.t_test(&contrast)?;

    let weighted_means = weights
        .iter()
        .filter_map(|(label, weight)| {
            Some(WeightedMean {
                label: label.to_owned(),
                weight,
                mean: model.coefficient(label)?,
            })
        })
        .collect();

    info!(
        t = test.t_statistic,
        df = test.degrees_of_freedom,
        p = test.p_value,
        "planned contrast completed"
    );
    Ok(ContrastResult {
        group_column: group_col.to_owned(),
        value_column: value_col.to_owned(),
        estimate: test.estimate,
        std_error: test.std_error,
        t_statistic: test.t_statistic,
        degrees_of_freedom: test.degrees_of_freedom,
        p_value: test.p_value,
        weighted_means,
        groups: summarize(&grouped),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use survey_frame::Column;
    use survey_stats::{StatsError, distribution::students_t_two_tailed};

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

    fn weights(pairs: &[(&str, f64)]) -> ContrastWeights {
        ContrastWeights::new(pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()).unwrap()
    }

    #[test]
    fn test_build_contrast_weights() {
        let w = build_contrast(&["A", "B"], &["C", "D", "E"]).unwrap();
        assert_eq!(w.get("A"), Some(0.5));
        assert_eq!(w.get("B"), Some(0.5));
        assert!((w.get("C").unwrap() + 1.0 / 3.0).abs() < 1e-15);
        assert!(w.sum().abs() < ZERO_SUM_TOLERANCE);
    }

    #[test]
    fn test_build_contrast_empty_groups() {
        let none: [&str; 0] = [];
        assert_eq!(build_contrast(&none, &["A"]), Err(AnalysisError::EmptyGroups));
        assert_eq!(build_contrast(&["A"], &none), Err(AnalysisError::EmptyGroups));
    }

    #[test]
    fn test_build_contrast_rejects_overlap() {
        assert_eq!(
            build_contrast(&["A", "B"], &["B", "C"]),
            Err(AnalysisError::OverlappingGroups {
                labels: vec!["B".into()]
            })
        );
    }

    #[test]
    fn test_build_contrast_collapses_repeats() {
        let w = build_contrast(&["A", "A"], &["B"]).unwrap();
        assert_eq!(w.get("A"), Some(1.0));
    }

    #[test]
    fn test_weights_must_sum_to_zero() {
        let err = ContrastWeights::new(BTreeMap::from([("A".to_string(), 1.0)])).unwrap_err();
        assert!(matches!(err, AnalysisError::NotZeroSum { .. }));
    }

    #[test]
    fn test_positive_contrast() {
        let result = evaluate_contrast(&synthetic(), "Group", "Score", &weights(&[("A", 1.0), ("B", -1.0)])).unwrap();
        assert!(result.t_statistic > 0.0);
        assert!(result.p_value < 0.05);
        assert_eq!(result.degrees_of_freedom, 27);
        assert!((result.estimate - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_swapped_contrast_mirrors() {
        let table = synthetic();
        let ab = evaluate_contrast(&table, "Group", "Score", &weights(&[("A", 1.0), ("B", -1.0)])).unwrap();
        let ba = evaluate_contrast(&table, "Group", "Score", &weights(&[("B", 1.0), ("A", -1.0)])).unwrap();
        assert!(ba.t_statistic < 0.0);
        assert_eq!(ab.t_statistic.abs(), ba.t_statistic.abs());
        assert_eq!(ab.p_value, ba.p_value);
    }

    #[test]
    fn test_missing_group() {
        let err = evaluate_contrast(
            &synthetic(),
            "Group",
            "Score",
            &weights(&[("A", 1.0), ("GhostGroup", -1.0)]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MissingGroups {
                labels: vec!["GhostGroup".into()]
            }
        );
    }

    #[test]
    fn test_identical_unbalanced_groups_are_undefined() {
        for value in [0.7, 3.3] {
            let table = Table::new(vec![
                Column::from_labels("g", ["a"; 3].into_iter().chain(["b"; 7])),
                Column::from_values("v", [value; 10]),
            ])
            .unwrap();
            let err = evaluate_contrast(&table, "g", "v", &weights(&[("a", 1.0), ("b", -1.0)]))
                .unwrap_err();
            assert_eq!(err, AnalysisError::Stats(StatsError::UndefinedStatistic));
        }
    }

    #[test]
    fn test_noisy_groups_use_pooled_variance() {
        // A: 1, 3 (var 2); B: 10, 14 (var 8); C: 5, 5, 5 (var 0) -> pooled = 10 / 4
        let table = Table::new(vec![
            Column::from_labels("g", ["A", "A", "B", "B", "C", "C", "C"]),
            Column::from_values("v", [1.0, 3.0, 10.0, 14.0, 5.0, 5.0, 5.0]),
        ])
        .unwrap();
        let result = evaluate_contrast(&table, "g", "v", &weights(&[("B", 1.0), ("A", -1.0)])).unwrap();
        let se = (2.5_f64 * (0.5 + 0.5)).sqrt();
        assert!((result.std_error - se).abs() < 1e-12);
        assert!((result.t_statistic - 10.0 / se).abs() < 1e-9);
        assert_eq!(result.degrees_of_freedom, 4);
        assert_eq!(result.weighted_means.len(), 2);
    }

    /// `Σ w_g ȳ_g / sqrt(Σ w_g² s_g² / n_g)`, with `N - k` degrees of freedom.
    #[expect(clippy::cast_precision_loss)]
    fn closed_form(groups: &[Vec<f64>], weights: &[f64]) -> (f64, f64) {
        let mut estimate = 0.0;
        let mut variance = 0.0;
        for (values, w) in groups.iter().zip(weights) {
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            estimate += w * mean;
            variance += w * w * var / n;
        }
        let t = estimate / variance.sqrt();
        let df = groups.iter().map(Vec::len).sum::<usize>() - groups.len();
        (t, students_t_two_tailed(t, df as f64).unwrap())
    }

    proptest! {
        #[test]
        fn test_regression_matches_closed_form(
            deviations in prop::collection::vec(-5.0..5.0f64, 3..8),
            means in prop::collection::vec(-20.0..20.0f64, 3..5),
            raw_weights in prop::collection::vec(-3.0..3.0f64, 3..5),
        ) {
            let spread = deviations.iter().map(|d| (d - deviations[0]).abs()).sum::<f64>();
            prop_assume!(spread > 1e-3);

            // every group shares the same deviations, so within-group variances agree
            let groups = means
                .iter()
                .map(|m| deviations.iter().map(|d| m + d).collect::<Vec<_>>())
                .collect::<Vec<_>>();
            let k = groups.len();
            let mut w = raw_weights.iter().copied().cycle().take(k).collect::<Vec<_>>();
            let mean_w = w.iter().sum::<f64>() / k as f64;
            w.iter_mut().for_each(|x| *x -= mean_w);
            prop_assume!(w.iter().any(|x| x.abs() > 1e-3));

            let labels = (0..k).map(|i| format!("g{i}")).collect::<Vec<_>>();
            let table = Table::new(vec![
                Column::from_labels(
                    "g",
                    labels.iter().flat_map(|l| std::iter::repeat_n(l.clone(), deviations.len())),
                ),
                Column::from_values("v", groups.iter().flatten().copied()),
            ])
            .unwrap();
            let weights = ContrastWeights::new(
                labels.iter().cloned().zip(w.iter().copied()).collect(),
            )
            .unwrap();

            let result = evaluate_contrast(&table, "g", "v", &weights).unwrap();
            let (t, p) = closed_form(&groups, &w);
            prop_assert!((result.t_statistic - t).abs() <= 1e-6 * t.abs().max(1.0));
            prop_assert!((result.p_value - p).abs() <= 1e-6);
        }
    }
}
