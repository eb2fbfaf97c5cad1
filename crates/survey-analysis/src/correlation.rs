//! Correlation of two columns, with the method chosen by column kind.
//!
//! | kinds                               | method                               |
//! |-------------------------------------|--------------------------------------|
//! | numeric + numeric                   | Pearson                              |
//! | numeric + ordinal, ordinal + ordinal| Spearman on ranks                    |
//! | nominal + nominal                   | chi-squared test, Cramér's V         |
//!
//! Any other combination is rejected with [`AnalysisError::InvalidInputKind`].

use serde::Serialize;
use survey_frame::Column;
use survey_stats::{contingency::ContingencyTable, correlation};
use tracing::{debug, error, info};

use crate::{
    AnalysisError,
    classify::{VariableKind, classify},
    schema::OrdinalSchema,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
    #[display("Cramér's V")]
    CramersV,
}

/// Outcome of [`CorrelationEngine::correlate`].
///
/// `effective_a` and `effective_b` are the columns the coefficient was
/// computed on: ordinal inputs appear as their ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub method: CorrelationMethod,
    pub effective_a: Column,
    pub effective_b: Column,
    pub coefficient: f64,
    pub p_value: f64,
    /// Complete pairs used.
    pub n: usize,
}

/// Picks and runs a correlation method for a pair of columns.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    schema: OrdinalSchema,
}

impl CorrelationEngine {
    #[must_use]
    pub fn new(schema: OrdinalSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn schema(&self) -> &OrdinalSchema {
        &self.schema
    }

    /// Correlates two equally long columns.
    ///
    /// Rows where either side is missing are dropped before computing.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::LengthMismatch`] if the columns differ in length
    /// * [`AnalysisError::EmptyInput`] if they have no rows
    /// * [`AnalysisError::InvalidInputKind`] for an unsupported kind combination
    /// * [`AnalysisError::Stats`] for degenerate data, such as a constant column
    ///
    /// # Examples
    ///
    /// ```
    /// use survey_analysis::correlation::{CorrelationEngine, CorrelationMethod};
    /// use survey_frame::Column;
    ///
    /// let engine = CorrelationEngine::default();
    /// let sleep = Column::from_values("Sleep Hours", [8.0, 7.5, 6.0, 5.0]);
    /// let stress = Column::from_labels("Stress Level", ["Low", "Low", "Moderate", "High"]);
    /// let result = engine.correlate(&sleep, &stress).unwrap();
    /// assert_eq!(result.method, CorrelationMethod::Spearman);
    /// assert!(result.coefficient < -0.9);
    /// ```
    pub fn correlate(&self, a: &Column, b: &Column) -> Result<CorrelationResult, AnalysisError> {
        if a.len() != b.len() {
            error!(a = a.name(), b = b.name(), "columns differ in length");
            return Err(AnalysisError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        if a.is_empty() {
            error!(a = a.name(), b = b.name(), "columns are empty");
            return Err(AnalysisError::EmptyInput);
        }

        let kind_a = classify(a, &self.schema);
        let kind_b = classify(b, &self.schema);
        debug!(a = a.name(), %kind_a, b = b.name(), %kind_b, "classified inputs");

        let result = match (kind_a, kind_b) {
            (VariableKind::Numeric, VariableKind::Numeric) => {
                Self::numeric(CorrelationMethod::Pearson, a.clone(), b.clone())
            }
            (VariableKind::Numeric | VariableKind::Ordinal, VariableKind::Ordinal)
            | (VariableKind::Ordinal, VariableKind::Numeric) => {
                let a = self.ranked(a, kind_a);
                let b = self.ranked(b, kind_b);
                Self::numeric(CorrelationMethod::Spearman, a, b)
            }
            (VariableKind::Nominal, VariableKind::Nominal) => Self::nominal(a, b),
            (left, right) => {
                error!(a = a.name(), b = b.name(), %left, %right, "unsupported kinds for correlation");
                return Err(AnalysisError::InvalidInputKind { left, right });
            }
        };
        match &result {
            Ok(r) => info!(
                a = a.name(),
                b = b.name(),
                method = %r.method,
                coefficient = r.coefficient,
                p_value = r.p_value,
                "correlation computed"
            ),
            Err(e) => error!(a = a.name(), b = b.name(), error = %e, "correlation failed"),
        }
        result
    }

    fn ranked(&self, column: &Column, kind: VariableKind) -> Column {
        match kind {
            VariableKind::Ordinal => self.schema.to_ranks(column),
            VariableKind::Numeric | VariableKind::Nominal => column.clone(),
        }
    }

    fn numeric(
        method: CorrelationMethod,
        a: Column,
        b: Column,
    ) -> Result<CorrelationResult, AnalysisError> {
        let (x, y): (Vec<f64>, Vec<f64>) = complete_pairs(&a, &b).unzip();
        let stats = match method {
            CorrelationMethod::Spearman => correlation::spearman(&x, &y)?,
            CorrelationMethod::Pearson | CorrelationMethod::CramersV => {
                correlation::pearson(&x, &y)?
            }
        };
        Ok(CorrelationResult {
            method,
            effective_a: a,
            effective_b: b,
            coefficient: stats.coefficient,
            p_value: stats.p_value,
            n: stats.n,
        })
    }

    fn nominal(a: &Column, b: &Column) -> Result<CorrelationResult, AnalysisError> {
        let (left, right) = (a.as_text().unwrap_or_default(), b.as_text().unwrap_or_default());
        let table = ContingencyTable::from_pairs(
            left.iter()
                .zip(right)
                .filter_map(|(l, r)| Some((l.as_deref()?, r.as_deref()?))),
        );
        let test = table.chi_squared()?;
        let coefficient = table.cramers_v(&test);
        debug!(
            chi_squared = test.statistic,
            dof = test.degrees_of_freedom,
            yates = test.yates_corrected,
            "chi-squared test of independence"
        );
        Ok(CorrelationResult {
            method: CorrelationMethod::CramersV,
            effective_a: a.clone(),
            effective_b: b.clone(),
            coefficient,
            p_value: test.p_value,
            n: usize::try_from(table.total()).unwrap_or(usize::MAX),
        })
    }
}

/// Pairs of values where both columns are present.
fn complete_pairs<'a>(a: &'a Column, b: &'a Column) -> impl Iterator<Item = (f64, f64)> + 'a {
    let left = a.as_numeric().unwrap_or_default();
    let right = b.as_numeric().unwrap_or_default();
    left.iter()
        .zip(right)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
}
