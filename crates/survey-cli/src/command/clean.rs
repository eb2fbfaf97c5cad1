use std::path::PathBuf;

use anyhow::{Context, ensure};
use survey_frame::{
    cleaning::{self, CleaningOptions},
    loader::{self, LoadOptions},
};
use tracing::info;

use crate::{command::InputArg, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CleanArg {
    #[command(flatten)]
    pub input: InputArg,
    /// Rows with a numeric |z-score| above this are removed
    #[arg(long, default_value_t = 3.0)]
    pub z_threshold: f64,
    /// Keep outlier rows
    #[arg(long)]
    pub keep_outliers: bool,
    /// Keep duplicate rows
    #[arg(long)]
    pub keep_duplicates: bool,
    /// Leave missing values as they are
    #[arg(long)]
    pub no_impute: bool,
    /// Cleaned CSV destination, stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl CleanArg {
    fn options(&self) -> CleaningOptions {
        CleaningOptions {
            impute_missing: !self.no_impute,
            z_threshold: (!self.keep_outliers).then_some(self.z_threshold),
            drop_duplicates: !self.keep_duplicates,
        }
    }
}

pub(crate) fn run(arg: &CleanArg) -> anyhow::Result<()> {
    ensure!(arg.z_threshold > 0.0, "--z-threshold must be positive");
    let data = arg.input.load(&LoadOptions::default())?;

    let options = arg.options();
    if let Some(threshold) = options.z_threshold {
        for outlier in cleaning::detect_outliers(&data, threshold) {
            info!(column = %outlier.column, count = outlier.count, threshold, "outliers detected");
        }
    }
    let outcome = cleaning::clean(&data, &options);
    info!(
        rows_before = data.n_rows(),
        rows_after = outcome.table.n_rows(),
        filled_cells = outcome.filled_cells,
        dropped_rows = outcome.dropped_rows,
        "data cleaned"
    );

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    loader::write_csv(&outcome.table, &mut output)
        .with_context(|| format!("Failed to write cleaned CSV to {}", output.display_path()))?;
    output.finish()
}
