use std::path::PathBuf;

use survey_analysis::{
    anova::one_way_anova,
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
pub(crate) struct AnovaArg {
    #[command(flatten)]
    pub input: InputArg,
    /// Grouping column
    pub group: String,
    /// Numeric column compared across groups
    pub value: String,
    /// Significance level
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,
    /// Directory for box plot data
    #[arg(long)]
    pub plot_dir: Option<PathBuf>,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn run(arg: &AnovaArg) -> anyhow::Result<()> {
    let data = arg.input.load(&LoadOptions::default())?;
    let gate = SignificanceGate::new(arg.alpha);

    let anova = one_way_anova(&data, &arg.group, &arg.value)?;
    let significant = gate.check(anova.p_value);
    if let Some(dir) = &arg.plot_dir {
        let path = PlotWriter::new(dir)?.groups(&data, &arg.group, &arg.value)?;
        info!(path = %path.display(), "group plot data saved");
    }

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    if arg.json {
        output.write_json(&Gated {
            result: anova,
            significant,
        })?;
    } else {
        table::write_anova(&mut output, &anova, significant, arg.alpha)?;
        output.finish()?;
    }
    Ok(())
}
