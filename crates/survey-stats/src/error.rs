/// Errors raised by the numeric routines of this crate.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    #[display("inputs have different lengths ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[display("at least {required} observations are required, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[display("input is constant, the statistic is undefined")]
    ConstantInput,
    #[display("contingency table of shape {rows}x{cols} has no degrees of freedom")]
    DegenerateTable { rows: usize, cols: usize },
    #[display("design matrix is singular")]
    SingularDesign,
    #[display("test statistic is undefined (zero estimate over zero standard error)")]
    UndefinedStatistic,
    #[display("invalid distribution parameters: {message}")]
    Distribution { message: String },
}
