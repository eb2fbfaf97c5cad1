use std::path::PathBuf;

use survey_analysis::{
    correlation::CorrelationEngine, schema::OrdinalSchema, significance::SignificanceGate,
};
use survey_frame::loader::LoadOptions;
use tracing::info;

use crate::{
    command::InputArg,
    report::{CorrelationSummary, Gated, PlotWriter, table},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CorrelateArg {
    #[command(flatten)]
    pub input: InputArg,
    /// First column
    pub a: String,
    /// Second column
    pub b: String,
    /// Significance level
    #[arg(long, default_value_t = survey_analysis::significance::DEFAULT_ALPHA)]
    pub alpha: f64,
    /// Ordinal levels, lowest first
    #[arg(long, value_delimiter = ',', default_values = ["Low", "Moderate", "High"])]
    pub levels: Vec<String>,
    /// Directory for scatter plot data, written only when significant
    #[arg(long)]
    pub plot_dir: Option<PathBuf>,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn run(arg: &CorrelateArg) -> anyhow::Result<()> {
    let data = arg.input.load(&LoadOptions::default())?;
    let engine = CorrelationEngine::new(OrdinalSchema::new(&arg.levels));
    let gate = SignificanceGate::new(arg.alpha);

    let result = engine.correlate(data.column(&arg.a)?, data.column(&arg.b)?)?;
    let significant = gate.check(result.p_value);
    if significant
        && let Some(dir) = &arg.plot_dir
        && let Some(path) = PlotWriter::new(dir)?.scatter(&result)?
    {
        info!(path = %path.display(), "scatter plot data saved");
    }

    let summary = CorrelationSummary::from(&result);
    let mut output = Output::from_output_path(arg.output.as_deref())?;
    if arg.json {
        output.write_json(&Gated {
            result: summary,
            significant,
        })?;
    } else {
        table::write_correlation(&mut output, &summary, significant, arg.alpha)?;
        output.finish()?;
    }
    Ok(())
}
