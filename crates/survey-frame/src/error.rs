use std::{io, path::PathBuf};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum FrameError {
    #[display("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("malformed CSV: {_0}")]
    #[from]
    Csv(csv::Error),
    #[display("line {line}: expected {expected} fields, found {actual}")]
    RaggedRow {
        line: u64,
        expected: usize,
        actual: usize,
    },
    #[display("column not found: {name:?}")]
    ColumnNotFound { name: String },
    #[display("column {name:?} has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[display("duplicate column name: {name:?}")]
    DuplicateColumn { name: String },
}
