use std::{collections::BTreeSet, fmt};

use serde::Serialize;

use crate::FrameError;

/// A single cell of a [`Table`], borrowed from its column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl Cell<'_> {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Hashable identity of the cell, used for duplicate detection.
    #[must_use]
    pub fn key(&self) -> CellKey {
        match self {
            Cell::Number(v) => CellKey::Number(v.to_bits()),
            Cell::Text(s) => CellKey::Text((*s).to_owned()),
            Cell::Missing => CellKey::Missing,
        }
    }
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Missing => Ok(()),
        }
    }
}

/// Owned, hashable identity of a cell. Floats compare by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKey {
    Missing,
    Number(u64),
    Text(String),
}

/// Typed storage of a column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// A named column of a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Creates a numeric column.
    ///
    /// ```
    /// use survey_frame::Column;
    ///
    /// let age = Column::numeric("Age", [Some(20.0), None, Some(40.0)]);
    /// assert!(age.is_numeric());
    /// assert_eq!(age.missing_count(), 1);
    /// ```
    pub fn numeric<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values.into_iter().collect()),
        }
    }

    /// Creates a text column.
    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            data: ColumnData::Text(values.into_iter().map(|v| v.map(Into::into)).collect()),
        }
    }

    /// Creates a numeric column without missing cells.
    pub fn from_values<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::numeric(name, values.into_iter().map(Some))
    }

    /// Creates a text column without missing cells.
    ///
    /// ```
    /// use survey_frame::Column;
    ///
    /// let level = Column::from_labels("Stress Level", ["Low", "High"]);
    /// assert_eq!(level.cell(1).to_string(), "High");
    /// ```
    pub fn from_labels<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::text(name, values.into_iter().map(Some))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    #[must_use]
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Text(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Cell at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn cell(&self, row: usize) -> Cell<'_> {
        match &self.data {
            ColumnData::Numeric(v) => v[row].map_or(Cell::Missing, Cell::Number),
            ColumnData::Text(v) => v[row].as_deref().map_or(Cell::Missing, Cell::Text),
        }
    }

    /// Iterates over all cells in row order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        (0..self.len()).map(|row| self.cell(row))
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.cells().filter(Cell::is_missing).count()
    }

    /// Non-missing numeric values; empty for a text column.
    #[must_use]
    pub fn present_values(&self) -> Vec<f64> {
        self.as_numeric()
            .map(|v| v.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Sorted set of distinct non-missing values rendered as strings.
    #[must_use]
    pub fn distinct_labels(&self) -> BTreeSet<String> {
        self.cells()
            .filter(|c| !c.is_missing())
            .map(|c| c.to_string())
            .collect()
    }

    /// Number of distinct non-missing values.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.cells()
            .filter(|c| !c.is_missing())
            .map(|c| c.key())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// A new column holding the cells at `indices`, in that order.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let data = match &self.data {
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => {
                ColumnData::Text(indices.iter().map(|&i| v[i].clone()).collect())
            }
        };
        Self {
            name: self.name.clone(),
            data,
        }
    }

    /// A new column with the same name and different data.
    #[must_use]
    pub fn with_data(&self, data: ColumnData) -> Self {
        Self {
            name: self.name.clone(),
            data,
        }
    }
}

/// An ordered collection of equally long, uniquely named columns.
///
/// Tables are never modified in place by the analysis code; row filters and
/// transforms return a new table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Builds a table, checking that column lengths agree and names are unique.
    ///
    /// # Examples
    ///
    /// ```
    /// use survey_frame::{Column, Table};
    ///
    /// let table = Table::new(vec![
    ///     Column::from_values("Age", [20.0, 30.0]),
    ///     Column::from_labels("City", ["NY", "LA"]),
    /// ])
    /// .unwrap();
    /// assert_eq!(table.n_rows(), 2);
    /// assert!(table.column("Salary").is_err());
    /// ```
    pub fn new(columns: Vec<Column>) -> Result<Self, FrameError> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.len() != n_rows {
                return Err(FrameError::LengthMismatch {
                    name: column.name.clone(),
                    expected: n_rows,
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(FrameError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows or no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.columns.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Column::name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, FrameError> {
        self.get(name).ok_or_else(|| FrameError::ColumnNotFound {
            name: name.to_owned(),
        })
    }

    /// Cells of one row, in column order.
    #[must_use]
    pub fn row(&self, row: usize) -> Vec<Cell<'_>> {
        self.columns.iter().map(|c| c.cell(row)).collect()
    }

    /// A new table with the rows at `indices`.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.select(indices)).collect(),
            n_rows: indices.len(),
        }
    }

    /// A new table with the rows whose `keep` flag is set.
    ///
    /// # Panics
    ///
    /// Panics if `keep` is shorter than the row count.
    #[must_use]
    pub fn filter_rows(&self, keep: &[bool]) -> Self {
        let indices = (0..self.n_rows).filter(|&i| keep[i]).collect::<Vec<_>>();
        self.select_rows(&indices)
    }

    /// The first `n` rows.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        let indices = (0..self.n_rows.min(n)).collect::<Vec<_>>();
        self.select_rows(&indices)
    }

    /// A new table with `column` replacing the column of the same name, or
    /// appended when no such column exists.
    pub fn with_column(&self, column: Column) -> Result<Self, FrameError> {
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => *slot = column,
            None => columns.push(column),
        }
        Self::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::numeric("Age", [Some(20.0), None, Some(40.0)]),
            Column::text("City", [Some("NY"), Some("LA"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::from_values("a", [1.0, 2.0]),
            Column::from_values("b", [1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::from_values("a", [1.0]),
            Column::from_values("a", [2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, FrameError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_cells_and_missing() {
        let table = sample();
        assert_eq!(table.row(1), vec![Cell::Missing, Cell::Text("LA")]);
        assert_eq!(table.column("Age").unwrap().missing_count(), 1);
        assert_eq!(table.column("City").unwrap().present_values(), Vec::<f64>::new());
        assert_eq!(table.column("Age").unwrap().present_values(), vec![20.0, 40.0]);
    }

    #[test]
    fn test_row_selection_returns_new_table() {
        let table = sample();
        let filtered = table.filter_rows(&[true, false, true]);
        assert_eq!(filtered.n_rows(), 2);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(filtered.row(1), vec![Cell::Number(40.0), Cell::Missing]);
        assert_eq!(table.head(1).n_rows(), 1);
        assert_eq!(table.head(10).n_rows(), 3);
    }

    #[test]
    fn test_with_column_replaces_by_name() {
        let table = sample();
        let replaced = table
            .with_column(Column::from_values("Age", [1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(replaced.n_cols(), 2);
        assert_eq!(replaced.column("Age").unwrap().missing_count(), 0);
        assert!(table.with_column(Column::from_values("x", [1.0])).is_err());
    }

    #[test]
    fn test_distinct_and_unique() {
        let column = Column::text("c", [Some("b"), Some("a"), None, Some("b")]);
        assert_eq!(
            column.distinct_labels().into_iter().collect::<Vec<_>>(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(column.unique_count(), 2);
        assert_eq!(Cell::Number(10.0).to_string(), "10");
    }

    #[test]
    fn test_empty_table() {
        let table = Table::default();
        assert!(table.is_empty());
        assert_eq!(Table::new(vec![]).unwrap().n_rows(), 0);
    }
}
