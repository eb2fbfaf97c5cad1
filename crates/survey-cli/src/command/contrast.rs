use std::path::PathBuf;

use survey_analysis::{
    contrast::{build_contrast, evaluate_contrast},
    significance::{DEFAULT_ALPHA, SignificanceGate},
};
use survey_frame::loader::LoadOptions;
use tracing::info;

use crate::{
    command::InputArg,
    report::{Gated, PlotWriter, table},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ContrastArg {
    #[command(flatten)]
    pub input: InputArg,
    /// Grouping column
    pub group: String,
    /// Numeric column compared across groups
    pub value: String,
    /// Groups weighted positively, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub positive: Vec<String>,
    /// Groups weighted negatively, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub negative: Vec<String>,
    /// Significance level
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,
    /// Directory for the weighted means bar chart data
    #[arg(long)]
    pub plot_dir: Option<PathBuf>,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn run(arg: &ContrastArg) -> anyhow::Result<()> {
    let data = arg.input.load(&LoadOptions::default())?;
    let gate = SignificanceGate::new(arg.alpha);

    let weights = build_contrast(&arg.positive, &arg.negative)?;
    let contrast = evaluate_contrast(&data, &arg.group, &arg.value, &weights)?;
    let significant = gate.check(contrast.p_value);
    if let Some(dir) = &arg.plot_dir {
        let path = PlotWriter::new(dir)?.weighted_means(&contrast)?;
        info!(path = %path.display(), "weighted means plot data saved");
    }

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    if arg.json {
        output.write_json(&Gated {
            result: contrast,
            significant,
        })?;
    } else {
        table::write_contrast(&mut output, &contrast, significant, arg.alpha)?;
        output.finish()?;
    }
    Ok(())
}
