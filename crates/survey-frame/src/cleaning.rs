//! Table cleaning: missing values, z-score outliers and duplicate rows.
//!
//! Every transform takes a `&Table` and returns a new one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use survey_stats::{
    descriptive::{mean, sample_variance},
    is_negligible,
};
use tracing::{debug, info};

use crate::{CellKey, Column, ColumnData, Table};

/// Settings of the full cleaning pipeline run by [`clean`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub impute_missing: bool,
    /// `None` disables outlier removal.
    pub z_threshold: Option<f64>,
    pub drop_duplicates: bool,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            impute_missing: true,
            z_threshold: Some(3.0),
            drop_duplicates: true,
        }
    }
}

/// A cleaned table together with what was changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOutcome {
    pub table: Table,
    /// Numeric cells filled with their column mean.
    pub filled_cells: usize,
    pub dropped_rows: usize,
}

/// Number of outliers found in one numeric column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlierCount {
    pub column: String,
    pub count: usize,
}

/// Replaces whitespace-only text cells with missing cells.
#[must_use]
pub fn blank_to_missing(table: &Table) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|column| match column.data() {
            ColumnData::Text(values) => column.with_data(ColumnData::Text(
                values
                    .iter()
                    .map(|v| v.clone().filter(|s| !s.trim().is_empty()))
                    .collect(),
            )),
            ColumnData::Numeric(_) => column.clone(),
        })
        .collect::<Vec<_>>();
    rebuild(table, columns)
}

/// Fills missing numeric cells with the column mean and drops every row that
/// still has a missing text cell. Whitespace-only text counts as missing.
///
/// # Examples
///
/// ```
/// use survey_frame::{Column, Table, cleaning::handle_missing_values};
///
/// let table = Table::new(vec![
///     Column::numeric("Age", [Some(20.0), None, Some(40.0)]),
///     Column::text("City", [Some("NY"), Some("LA"), Some(" ")]),
/// ])
/// .unwrap();
/// let outcome = handle_missing_values(&table);
/// assert_eq!(outcome.table.n_rows(), 2);
/// assert_eq!(outcome.filled_cells, 1);
/// assert_eq!(outcome.dropped_rows, 1);
/// ```
#[must_use]
pub fn handle_missing_values(table: &Table) -> CleaningOutcome {
    let blanked = blank_to_missing(table);

    let mut filled_cells = 0;
    let columns = blanked
        .columns()
        .iter()
        .map(|column| match column.data() {
            ColumnData::Numeric(values) => {
                let present = column.present_values();
                // An all-missing column has no mean and stays missing.
                let Some(fill) = mean(&present) else {
                    return column.clone();
                };
                filled_cells += values.len() - present.len();
                column.with_data(ColumnData::Numeric(
                    values.iter().map(|v| Some(v.unwrap_or(fill))).collect(),
                ))
            }
            ColumnData::Text(_) => column.clone(),
        })
        .collect::<Vec<_>>();
    let filled = rebuild(&blanked, columns);
    if filled_cells > 0 {
        info!(filled_cells, "filled missing numeric cells with column means");
    }

    let keep = (0..filled.n_rows())
        .map(|row| {
            filled
                .columns()
                .iter()
                .filter(|c| !c.is_numeric())
                .all(|c| !c.cell(row).is_missing())
        })
        .collect::<Vec<_>>();
    let cleaned = filled.filter_rows(&keep);
    let dropped_rows = filled.n_rows() - cleaned.n_rows();
    if dropped_rows > 0 {
        info!(dropped_rows, "dropped rows with missing text cells");
    }

    CleaningOutcome {
        table: cleaned,
        filled_cells,
        dropped_rows,
    }
}

/// Mean and sample standard deviation of a numeric column, `None` when the
/// deviation is zero or undefined.
fn z_params(column: &Column) -> Option<(f64, f64)> {
    let present = column.present_values();
    let mean = mean(&present)?;
    let variance = sample_variance(&present)?;
    (!is_negligible(variance, mean * mean)).then_some((mean, variance.sqrt()))
}

/// Counts, per numeric column, the cells with `|z| > threshold`.
///
/// Columns with zero standard deviation report zero outliers. The result is
/// sorted by count, largest first.
#[must_use]
pub fn detect_outliers(table: &Table, threshold: f64) -> Vec<OutlierCount> {
    let mut counts = table
        .columns()
        .iter()
        .filter_map(|column| {
            let values = column.as_numeric()?;
            let count = z_params(column).map_or(0, |(mean, std_dev)| {
                values
                    .iter()
                    .flatten()
                    .filter(|v| ((*v - mean) / std_dev).abs() > threshold)
                    .count()
            });
            Some(OutlierCount {
                column: column.name().to_owned(),
                count,
            })
        })
        .collect::<Vec<_>>();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Keeps the rows whose every numeric cell lies within `threshold` standard
/// deviations of its column mean.
///
/// Missing cells and zero-deviation columns never reject a row.
#[must_use]
pub fn remove_outliers(table: &Table, threshold: f64) -> Table {
    let params = table
        .columns()
        .iter()
        .filter_map(|column| Some((column.as_numeric()?, z_params(column)?)))
        .collect::<Vec<_>>();

    let keep = (0..table.n_rows())
        .map(|row| {
            params.iter().all(|(values, (mean, std_dev))| {
                values[row].is_none_or(|v| ((v - mean) / std_dev).abs() <= threshold)
            })
        })
        .collect::<Vec<_>>();
    let cleaned = table.filter_rows(&keep);
    let dropped = table.n_rows() - cleaned.n_rows();
    if dropped > 0 {
        info!(dropped, threshold, "removed rows with outliers");
    }
    cleaned
}

/// Drops exact duplicate rows, keeping the first occurrence.
#[must_use]
pub fn remove_duplicates(table: &Table) -> Table {
    let mut seen = HashSet::new();
    let keep = (0..table.n_rows())
        .map(|row| {
            let key = table.row(row).iter().map(|c| c.key()).collect::<Vec<CellKey>>();
            seen.insert(key)
        })
        .collect::<Vec<_>>();
    let cleaned = table.filter_rows(&keep);
    let dropped = table.n_rows() - cleaned.n_rows();
    if dropped > 0 {
        info!(dropped, "removed duplicate rows");
    }
    cleaned
}

/// Runs the configured cleaning steps in order: missing values, outliers,
/// duplicates.
#[must_use]
pub fn clean(table: &Table, options: &CleaningOptions) -> CleaningOutcome {
    let initial_rows = table.n_rows();
    let (mut current, filled_cells) = if options.impute_missing {
        let outcome = handle_missing_values(table);
        (outcome.table, outcome.filled_cells)
    } else {
        (table.clone(), 0)
    };
    if let Some(threshold) = options.z_threshold {
        current = remove_outliers(&current, threshold);
    }
    if options.drop_duplicates {
        current = remove_duplicates(&current);
    }
    debug!(initial_rows, final_rows = current.n_rows(), "cleaning finished");
    CleaningOutcome {
        dropped_rows: initial_rows - current.n_rows(),
        filled_cells,
        table: current,
    }
}

// Column lengths are unchanged by the callers, so rebuilding cannot fail.
fn rebuild(original: &Table, columns: Vec<Column>) -> Table {
    Table::new(columns).unwrap_or_else(|_| original.clone())
}
