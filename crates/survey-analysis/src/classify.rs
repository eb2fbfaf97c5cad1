//! Column kind inference.

use serde::Serialize;
use survey_frame::{Column, Table};

use crate::schema::OrdinalSchema;

/// Runtime kind of a column, which decides the applicable statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    #[display("numeric")]
    Numeric,
    #[display("ordinal")]
    Ordinal,
    #[display("nominal")]
    Nominal,
}

/// Column names split by kind, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub non_numeric: Vec<String>,
}

/// Splits the columns of `table` into numeric and non-numeric names.
///
/// ```
/// use survey_analysis::classify::classify_columns;
/// use survey_frame::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::from_values("Age", [20.0]),
///     Column::from_labels("Gender", ["Female"]),
/// ])
/// .unwrap();
/// let partition = classify_columns(&table);
/// assert_eq!(partition.numeric, ["Age"]);
/// assert_eq!(partition.non_numeric, ["Gender"]);
/// ```
#[must_use]
pub fn classify_columns(table: &Table) -> ColumnPartition {
    let mut partition = ColumnPartition::default();
    for column in table.columns() {
        let bucket = if column.is_numeric() {
            &mut partition.numeric
        } else {
            &mut partition.non_numeric
        };
        bucket.push(column.name().to_owned());
    }
    partition
}

/// Kind of a single column under `schema`.
#[must_use]
pub fn classify(column: &Column, schema: &OrdinalSchema) -> VariableKind {
    if column.is_numeric() {
        VariableKind::Numeric
    } else if schema.is_ordinal_level(column) {
        VariableKind::Ordinal
    } else {
        VariableKind::Nominal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed() -> Table {
        Table::new(vec![
            Column::numeric("Age", [Some(20.0), None]),
            Column::text("City", [Some("NY"), None]),
            Column::from_values("Salary", [1.0, 2.0]),
            Column::from_labels("Stress Level", ["Low", "High"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_partition_preserves_order() {
        let partition = classify_columns(&mixed());
        assert_eq!(partition.numeric, ["Age", "Salary"]);
        assert_eq!(partition.non_numeric, ["City", "Stress Level"]);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let table = mixed();
        assert_eq!(classify_columns(&table), classify_columns(&table));
    }

    #[test]
    fn test_empty_and_single_kind_tables() {
        assert_eq!(classify_columns(&Table::default()), ColumnPartition::default());

        let numeric = Table::new(vec![Column::from_values("a", [1.0])]).unwrap();
        assert!(classify_columns(&numeric).non_numeric.is_empty());
    }

    #[test]
    fn test_classify_kinds() {
        let table = mixed();
        let schema = OrdinalSchema::default();
        let kind = |name| classify(table.column(name).unwrap(), &schema);
        assert_eq!(kind("Age"), VariableKind::Numeric);
        assert_eq!(kind("City"), VariableKind::Nominal);
        assert_eq!(kind("Stress Level"), VariableKind::Ordinal);
    }
}
