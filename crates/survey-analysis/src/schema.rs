//! Ranked label vocabularies for ordinal survey answers.

use serde::{Deserialize, Serialize};
use survey_frame::{Column, ColumnData};

/// An ordered list of labels, lowest first.
///
/// The label at position `i` ranks as `i + 1`.
///
/// # Examples
///
/// ```
/// use survey_analysis::schema::OrdinalSchema;
/// use survey_frame::{Cell, Column};
///
/// let schema = OrdinalSchema::default();
/// let level = Column::from_labels("Stress Level", ["Low", "Moderate", "High"]);
/// assert!(schema.is_ordinal_level(&level));
///
/// let ranks = schema.to_ranks(&level);
/// assert_eq!(ranks.present_values(), vec![1.0, 2.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrdinalSchema {
    levels: Vec<String>,
}

impl Default for OrdinalSchema {
    fn default() -> Self {
        Self::new(["Low", "Moderate", "High"])
    }
}

impl OrdinalSchema {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Rank of a label, starting at 1.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rank(&self, label: &str) -> Option<f64> {
        self.levels
            .iter()
            .position(|l| l == label)
            .map(|i| (i + 1) as f64)
    }

    /// Whether every non-missing value of a text column is a schema label.
    ///
    /// Numeric columns are never ordinal. A text column without any
    /// non-missing value is vacuously ordinal.
    #[must_use]
    pub fn is_ordinal_level(&self, column: &Column) -> bool {
        match column.data() {
            ColumnData::Text(values) => values
                .iter()
                .flatten()
                .all(|v| self.levels.iter().any(|l| l == v)),
            ColumnData::Numeric(_) => false,
        }
    }

    /// Converts labels to their ranks. Values outside the schema, and numeric
    /// columns, become missing.
    #[must_use]
    pub fn to_ranks(&self, column: &Column) -> Column {
        let ranks = match column.data() {
            ColumnData::Text(values) => values
                .iter()
                .map(|v| v.as_deref().and_then(|label| self.rank(label)))
                .collect(),
            ColumnData::Numeric(values) => vec![None; values.len()],
        };
        column.with_data(ColumnData::Numeric(ranks))
    }
}

#[cfg(test)]
mod tests {
    use survey_frame::Cell;

    use super::*;

    #[test]
    fn test_subset_detection() {
        let schema = OrdinalSchema::default();
        assert!(schema.is_ordinal_level(&Column::text("s", [Some("High"), None, Some("Low")])));
        assert!(!schema.is_ordinal_level(&Column::from_labels("s", ["High", "Extreme"])));
        assert!(!schema.is_ordinal_level(&Column::from_values("n", [1.0, 2.0])));
    }

    #[test]
    fn test_empty_column_is_vacuously_ordinal() {
        let schema = OrdinalSchema::default();
        assert!(schema.is_ordinal_level(&Column::text::<_, String>("s", [])));
        assert!(schema.is_ordinal_level(&Column::text::<_, String>("s", [None, None])));
    }

    #[test]
    fn test_unknown_labels_become_missing() {
        let schema = OrdinalSchema::default();
        let ranks = schema.to_ranks(&Column::text("s", [Some("High"), Some("Extreme"), None]));
        assert_eq!(ranks.name(), "s");
        assert_eq!(ranks.cell(0), Cell::Number(3.0));
        assert_eq!(ranks.cell(1), Cell::Missing);
        assert_eq!(ranks.cell(2), Cell::Missing);
    }

    #[test]
    fn test_custom_schema_from_json() {
        let schema: OrdinalSchema = serde_json::from_str(r#"["Never", "Sometimes", "Often", "Always"]"#).unwrap();
        assert_eq!(schema.rank("Always"), Some(4.0));
        assert_eq!(schema.rank("Low"), None);
    }
}
