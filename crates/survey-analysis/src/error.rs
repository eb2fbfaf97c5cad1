use survey_frame::FrameError;
use survey_stats::StatsError;

use crate::classify::VariableKind;

/// Failures of the statistics core.
///
/// Degenerate numeric inputs surface as [`AnalysisError::Stats`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("column not found: {name:?}")]
    ColumnNotFound { name: String },
    #[display("column {name:?} must be numeric")]
    TypeKind { name: String },
    #[display("cannot correlate a {left} column with a {right} column")]
    InvalidInputKind {
        left: VariableKind,
        right: VariableKind,
    },
    #[display("inputs differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[display("input columns are empty")]
    EmptyInput,
    #[display("both the positive and the negative group lists must be non-empty")]
    EmptyGroups,
    #[display("groups appear on both sides of the contrast: {labels:?}")]
    OverlappingGroups { labels: Vec<String> },
    #[display("contrast weights sum to {sum}, expected 0")]
    NotZeroSum { sum: f64 },
    #[display("groups not present in the data: {labels:?}")]
    MissingGroups { labels: Vec<String> },
    #[display("at least 2 groups are required, found {found}")]
    TooFewGroups { found: usize },
    #[display("no residual degrees of freedom ({observations} observations, {groups} groups)")]
    NoResidualDegreesOfFreedom { observations: usize, groups: usize },
    #[display("the table is empty")]
    EmptyTable,
    #[display("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[display("{_0}")]
    #[from]
    Stats(StatsError),
}

impl From<FrameError> for AnalysisError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::ColumnNotFound { name } => Self::ColumnNotFound { name },
            other => Self::InvalidArgument {
                message: other.to_string(),
            },
        }
    }
}
