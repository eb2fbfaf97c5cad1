//! Summaries of a table used before any hypothesis testing.
//!
//! Every function here rejects an empty table with
//! [`AnalysisError::EmptyTable`].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use survey_frame::{Column, Table};
use survey_stats::{descriptive::DescriptiveStats, histogram::Histogram};
use tracing::{debug, error, info};

use crate::AnalysisError;

/// Label of the bucket collecting the categories beyond `top_n`.
pub const OTHER_LABEL: &str = "Other";

fn ensure_not_empty(table: &Table, operation: &str) -> Result<(), AnalysisError> {
    if table.is_empty() {
        error!(operation, "table is empty");
        return Err(AnalysisError::EmptyTable);
    }
    Ok(())
}

fn dtype(column: &Column) -> &'static str {
    if column.is_numeric() { "numeric" } else { "text" }
}

/// Shape, column types, missing counts and the first rows of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
    pub dtypes: Vec<&'static str>,
    pub missing_values: Vec<usize>,
    pub head: Table,
}

/// Builds an [`Overview`] with the first `n` rows.
pub fn overview(table: &Table, n: usize) -> Result<Overview, AnalysisError> {
    ensure_not_empty(table, "overview")?;
    Ok(Overview {
        n_rows: table.n_rows(),
        n_cols: table.n_cols(),
        columns: table.column_names().map(str::to_owned).collect(),
        dtypes: table.columns().iter().map(dtype).collect(),
        missing_values: table.columns().iter().map(Column::missing_count).collect(),
        head: table.head(n),
    })
}

/// Type and completeness of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: &'static str,
    pub missing_count: usize,
    /// Rounded to two decimals.
    pub missing_percent: f64,
    /// Distinct non-missing values.
    pub unique_values: usize,
}

/// One [`ColumnInfo`] per column, the least complete columns first.
#[expect(clippy::cast_precision_loss)]
pub fn data_info(table: &Table) -> Result<Vec<ColumnInfo>, AnalysisError> {
    ensure_not_empty(table, "data_info")?;
    let n_rows = table.n_rows() as f64;
    let mut info = table
        .columns()
        .iter()
        .map(|column| {
            let missing_count = column.missing_count();
            ColumnInfo {
                name: column.name().to_owned(),
                dtype: dtype(column),
                missing_count,
                missing_percent: (missing_count as f64 / n_rows * 10_000.0).round() / 100.0,
                unique_values: column.unique_count(),
            }
        })
        .collect::<Vec<_>>();
    info.sort_by(|a, b| b.missing_percent.total_cmp(&a.missing_percent));
    info!("data info table created");
    Ok(info)
}

/// Describe-style summary of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub stats: DescriptiveStats,
}

/// Describe-style summary of a text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    /// Non-missing cells.
    pub count: usize,
    pub unique: usize,
    /// Most frequent value; the earliest seen wins a tie.
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DescriptiveReport {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
}

/// Summaries of every column, split by type.
///
/// Numeric columns without any present value are left out.
///
/// # Examples
///
/// ```
/// use survey_analysis::exploration::descriptive_stats;
/// use survey_frame::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::from_values("Age", [10.0, 20.0, 30.0, 40.0, 50.0]),
///     Column::from_labels("Color", ["Red", "Blue", "Red", "Green", "Red"]),
/// ])
/// .unwrap();
/// let report = descriptive_stats(&table).unwrap();
/// assert_eq!(report.numeric[0].stats.mean, 30.0);
/// assert_eq!(report.categorical[0].top.as_deref(), Some("Red"));
/// assert_eq!(report.categorical[0].freq, 3);
/// ```
pub fn descriptive_stats(table: &Table) -> Result<DescriptiveReport, AnalysisError> {
    ensure_not_empty(table, "descriptive_stats")?;
    let mut report = DescriptiveReport::default();
    for column in table.columns() {
        if column.is_numeric() {
            match DescriptiveStats::new(column.present_values()) {
                Some(stats) => report.numeric.push(NumericSummary {
                    column: column.name().to_owned(),
                    stats,
                }),
                None => debug!(column = column.name(), "no values to describe"),
            }
        } else {
            let counts = value_counts(column, false);
            let (top, freq) = counts
                .first()
                .map_or((None, 0), |f| (f.value.clone(), f.count));
            report.categorical.push(CategoricalSummary {
                column: column.name().to_owned(),
                count: column.len() - column.missing_count(),
                unique: counts.len(),
                top,
                freq,
            });
        }
    }
    info!(
        numeric = report.numeric.len(),
        categorical = report.categorical.len(),
        "descriptive stats computed"
    );
    Ok(report)
}

/// Occurrences of one value. `None` is the missing bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frequency {
    pub value: Option<String>,
    pub count: usize,
}

/// Values by count, largest first; ties keep first-seen order.
fn value_counts(column: &Column, include_missing: bool) -> Vec<Frequency> {
    let mut order = Vec::<Option<String>>::new();
    let mut counts = HashMap::<Option<String>, usize>::new();
    for cell in column.cells() {
        let value = (!cell.is_missing()).then(|| cell.to_string());
        if value.is_none() && !include_missing {
            continue;
        }
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    let mut frequencies = order
        .into_iter()
        .map(|value| {
            let count = counts[&value];
            Frequency { value, count }
        })
        .collect::<Vec<_>>();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies
}

/// Frequency tables of the text columns, missing cells included.
///
/// At most `top_n` values are kept per column. With `add_other`, the
/// remaining values are summed into an [`OTHER_LABEL`] entry.
///
/// # Errors
///
/// * [`AnalysisError::EmptyTable`] for an empty table
/// * [`AnalysisError::InvalidArgument`] if `top_n` is zero
pub fn categorical_frequencies(
    table: &Table,
    top_n: usize,
    add_other: bool,
) -> Result<BTreeMap<String, Vec<Frequency>>, AnalysisError> {
    ensure_not_empty(table, "categorical_frequencies")?;
    if top_n == 0 {
        error!("top_n must be positive");
        return Err(AnalysisError::InvalidArgument {
            message: "top_n must be a positive integer".to_owned(),
        });
    }
    let result = table
        .columns()
        .iter()
        .filter(|c| !c.is_numeric())
        .map(|column| {
            let mut counts = value_counts(column, true);
            if counts.len() > top_n {
                let rest = counts.split_off(top_n);
                if add_other {
                    counts.push(Frequency {
                        value: Some(OTHER_LABEL.to_owned()),
                        count: rest.iter().map(|f| f.count).sum(),
                    });
                }
            }
            (column.name().to_owned(), counts)
        })
        .collect();
    info!(top_n, "categorical frequencies created");
    Ok(result)
}

/// Spread of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub median: f64,
}

/// Min, max, mean, standard deviation and median of each numeric column.
pub fn numeric_ranges(table: &Table) -> Result<Vec<NumericRange>, AnalysisError> {
    ensure_not_empty(table, "numeric_ranges")?;
    let ranges = table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .filter_map(|column| {
            let stats = DescriptiveStats::new(column.present_values())?;
            Some(NumericRange {
                column: column.name().to_owned(),
                min: stats.min,
                max: stats.max,
                mean: stats.mean,
                std_dev: stats.std_dev,
                median: stats.median,
            })
        })
        .collect::<Vec<_>>();
    if ranges.is_empty() {
        info!("no numeric columns found");
    }
    Ok(ranges)
}

/// Distribution of one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnHistogram {
    pub column: String,
    pub histogram: Histogram,
}

/// Equal-width histogram of every numeric column.
///
/// # Errors
///
/// * [`AnalysisError::EmptyTable`] for an empty table
/// * [`AnalysisError::InvalidArgument`] if `bins` is zero
pub fn numeric_histograms(
    table: &Table,
    bins: usize,
) -> Result<Vec<ColumnHistogram>, AnalysisError> {
    ensure_not_empty(table, "numeric_histograms")?;
    if bins == 0 {
        return Err(AnalysisError::InvalidArgument {
            message: "histogram needs at least one bin".to_owned(),
        });
    }
    Ok(table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .map(|column| ColumnHistogram {
            column: column.name().to_owned(),
            histogram: Histogram::new(column.present_values(), bins),
        })
        .collect())
}
