//! Partitioning rows by a grouping column and per-group summaries.

use std::collections::BTreeMap;

use serde::Serialize;
use survey_frame::{Column, Table};
use survey_stats::{
    StatsError,
    descriptive::{mean, sample_variance},
    linear_model::LinearModel,
};
use tracing::{debug, error, info};

use crate::AnalysisError;

/// Row indices of each distinct label of a grouping column.
///
/// Groups are disjoint and together cover every row whose grouping cell is
/// present. Numeric grouping columns are labelled by their rendered value.
///
/// # Examples
///
/// ```
/// use survey_analysis::groups::GroupPartition;
/// use survey_frame::Column;
///
/// let diet = Column::text("Diet", [Some("Vegan"), None, Some("Keto"), Some("Vegan")]);
/// let partition = GroupPartition::from_column(&diet);
/// assert_eq!(partition.rows("Vegan"), Some(&[0, 3][..]));
/// assert_eq!(partition.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct GroupPartition {
    groups: BTreeMap<String, Vec<usize>>,
}

impl GroupPartition {
    #[must_use]
    pub fn from_column(column: &Column) -> Self {
        let mut groups = BTreeMap::<String, Vec<usize>>::new();
        for (row, cell) in column.cells().enumerate() {
            if !cell.is_missing() {
                groups.entry(cell.to_string()).or_default().push(row);
            }
        }
        Self { groups }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.groups.contains_key(label)
    }

    #[must_use]
    pub fn rows(&self, label: &str) -> Option<&[usize]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Count, mean and sample variance of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    /// `None` for a group with a single observation.
    pub variance: Option<f64>,
}

/// Present values of `value_col` per label of `group_col`.
///
/// Rows missing either cell are skipped, and groups left without values are
/// omitted.
pub(crate) fn grouped_values(
    table: &Table,
    group_col: &str,
    value_col: &str,
) -> Result<BTreeMap<String, Vec<f64>>, AnalysisError> {
    let group = table.column(group_col).inspect_err(|e| error!(error = %e, "group column lookup failed"))?;
    let value = table.column(value_col).inspect_err(|e| error!(error = %e, "value column lookup failed"))?;
    let Some(values) = value.as_numeric() else {
        error!(column = value_col, "value column is not numeric");
        return Err(AnalysisError::TypeKind {
            name: value_col.to_owned(),
        });
    };

    let partition = GroupPartition::from_column(group);
    let grouped = partition
        .iter()
        .filter_map(|(label, rows)| {
            let present = rows.iter().filter_map(|&row| values[row]).collect::<Vec<_>>();
            if present.is_empty() {
                debug!(label, "group has no values, skipped");
                None
            } else {
                Some((label.to_owned(), present))
            }
        })
        .collect();
    Ok(grouped)
}

/// Per-group summaries of `value_col`, sorted by label.
///
/// # Errors
///
/// * [`AnalysisError::ColumnNotFound`] if either column is absent
/// * [`AnalysisError::TypeKind`] if `value_col` is not numeric
pub fn group_summaries(
    table: &Table,
    group_col: &str,
    value_col: &str,
) -> Result<Vec<GroupSummary>, AnalysisError> {
    let grouped = grouped_values(table, group_col, value_col)?;
    Ok(summarize(&grouped))
}

pub(crate) fn summarize(grouped: &BTreeMap<String, Vec<f64>>) -> Vec<GroupSummary> {
    grouped
        .iter()
        .filter_map(|(label, values)| {
            Some(GroupSummary {
                label: label.clone(),
                count: values.len(),
                mean: mean(values)?,
                variance: sample_variance(values),
            })
        })
        .collect()
}

/// Fits the no-intercept cell-means model of grouped values. Parameters are
/// the group labels in sorted order.
pub(crate) fn fit_cell_means(
    grouped: &BTreeMap<String, Vec<f64>>,
) -> Result<LinearModel, StatsError> {
    let levels = grouped.keys().cloned().collect::<Vec<_>>();
    let (assignments, response): (Vec<usize>, Vec<f64>) = grouped
        .values()
        .enumerate()
        .flat_map(|(level, values)| values.iter().map(move |&v| (level, v)))
        .unzip();
    LinearModel::fit_cell_means(levels, &assignments, &response)
}

/// Mean of `value_col` for every label of `group_col`.
///
/// ```
/// use survey_analysis::groups::group_means;
/// use survey_frame::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::from_labels("Diet", ["Vegan", "Keto", "Vegan"]),
///     Column::numeric("Happiness", [Some(8.0), Some(5.0), Some(6.0)]),
/// ])
/// .unwrap();
/// let means = group_means(&table, "Diet", "Happiness").unwrap();
/// assert_eq!(means["Vegan"], 7.0);
/// assert_eq!(means["Keto"], 5.0);
/// ```
pub fn group_means(
    table: &Table,
    group_col: &str,
    value_col: &str,
) -> Result<BTreeMap<String, f64>, AnalysisError> {
    info!(group_col, value_col, "computing group means");
    let means = group_summaries(table, group_col, value_col)?
        .into_iter()
        .map(|s| (s.label, s.mean))
        .collect();
    Ok(means)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messy() -> Table {
        Table::new(vec![
            Column::text(
                "Diet Type",
                [Some("Vegan"), Some("Keto"), Some("Vegan"), None, Some("Keto"), Some("Paleo")],
            ),
            Column::numeric(
                "Happiness Score",
                [Some(8.0), Some(4.0), None, Some(9.0), Some(6.0), None],
            ),
            Column::from_labels("Name", ["a", "b", "c", "d", "e", "f"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_partition_is_disjoint_and_covers_present_rows() {
        let partition = GroupPartition::from_column(messy().column("Diet Type").unwrap());
        let mut rows = partition.iter().flat_map(|(_, r)| r.iter().copied()).collect::<Vec<_>>();
        rows.sort_unstable();
        assert_eq!(rows, vec![0, 1, 2, 4, 5]);
        assert_eq!(partition.labels().collect::<Vec<_>>(), ["Keto", "Paleo", "Vegan"]);
    }

    #[test]
    fn test_numeric_group_column() {
        let partition = GroupPartition::from_column(&Column::from_values("Year", [1.0, 2.0, 1.0]));
        assert_eq!(partition.rows("1"), Some(&[0, 2][..]));
    }

    #[test]
    fn test_summaries_skip_missing_values() {
        let summaries = group_summaries(&messy(), "Diet Type", "Happiness Score").unwrap();
        // Paleo has no values left
        assert_eq!(summaries.len(), 2);
        assert_eq!(
            summaries[0],
            GroupSummary {
                label: "Keto".into(),
                count: 2,
                mean: 5.0,
                variance: Some(2.0),
            }
        );
        assert_eq!(summaries[1].count, 1);
        assert_eq!(summaries[1].variance, None);
    }

    #[test]
    fn test_errors() {
        let table = messy();
        assert_eq!(
            group_means(&table, "Missing", "Happiness Score"),
            Err(AnalysisError::ColumnNotFound {
                name: "Missing".into()
            })
        );
        assert_eq!(
            group_means(&table, "Diet Type", "Missing"),
            Err(AnalysisError::ColumnNotFound {
                name: "Missing".into()
            })
        );
        assert_eq!(
            group_means(&table, "Diet Type", "Name"),
            Err(AnalysisError::TypeKind { name: "Name".into() })
        );
    }
}
