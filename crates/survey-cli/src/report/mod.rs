//! Rendering of analysis results: text tables, a JSON report and plot data.

use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use survey_analysis::{
    anova::AnovaTable,
    contrast::ContrastResult,
    correlation::{CorrelationMethod, CorrelationResult},
    exploration::{ColumnInfo, DescriptiveReport, Frequency, NumericRange},
};
use survey_frame::cleaning::OutlierCount;

pub use self::plot::PlotWriter;

mod plot;
pub mod table;

/// A result together with the significance gate decision.
#[derive(Debug, Clone, Serialize)]
pub struct Gated<T> {
    #[serde(flatten)]
    pub result: T,
    pub significant: bool,
}

/// Correlation result without the effective columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationSummary {
    pub a: String,
    pub b: String,
    pub method: CorrelationMethod,
    pub coefficient: f64,
    pub p_value: f64,
    pub n: usize,
}

impl From<&CorrelationResult> for CorrelationSummary {
    fn from(result: &CorrelationResult) -> Self {
        Self {
            a: result.effective_a.name().to_owned(),
            b: result.effective_b.name().to_owned(),
            method: result.method,
            coefficient: result.coefficient,
            p_value: result.p_value,
            n: result.n,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub filled_cells: usize,
    pub dropped_rows: usize,
    pub z_threshold: Option<f64>,
    /// Outlier counts seen before removal.
    pub outliers: Vec<OutlierCount>,
}

/// An analysis step that failed without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Exploration {
    pub columns: Vec<ColumnInfo>,
    pub descriptive: DescriptiveReport,
    pub frequencies: BTreeMap<String, Vec<Frequency>>,
    pub ranges: Vec<NumericRange>,
}

/// Everything produced by one `run`, serialized with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub source: PathBuf,
    pub alpha: f64,
    pub cleaning: Option<CleaningSummary>,
    pub exploration: Option<Exploration>,
    pub correlations: Vec<Gated<CorrelationSummary>>,
    pub anovas: Vec<Gated<AnovaTable>>,
    pub contrasts: Vec<Gated<ContrastResult>>,
    pub plots: Vec<PathBuf>,
    pub failures: Vec<StepFailure>,
}

impl Report {
    pub fn new(source: PathBuf, alpha: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            source,
            alpha,
            cleaning: None,
            exploration: None,
            correlations: vec![],
            anovas: vec![],
            contrasts: vec![],
            plots: vec![],
            failures: vec![],
        }
    }

    pub fn significant_count(&self) -> usize {
        self.correlations.iter().filter(|c| c.significant).count()
            + self.anovas.iter().filter(|a| a.significant).count()
            + self.contrasts.iter().filter(|c| c.significant).count()
    }
}
