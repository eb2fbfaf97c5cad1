use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use survey_frame::{
    Table,
    loader::{self, LoadOptions},
};

use crate::logging::{self, LogConfig, LogFormat};

use self::{
    anova::AnovaArg, clean::CleanArg, contrast::ContrastArg, correlate::CorrelateArg,
    explore::ExploreArg, generate_sample::GenerateSampleArg, run::RunArg,
};

mod anova;
mod clean;
mod contrast;
mod correlate;
mod explore;
mod generate_sample;
mod run;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, global = true, default_value = logging::DEFAULT_LEVEL)]
    log_level: String,
    /// Log line format: full, compact or pretty
    #[arg(long, global = true, default_value = "full")]
    log_format: LogFormat,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Summarize the columns of a survey CSV
    Explore(#[clap(flatten)] ExploreArg),
    /// Impute missing values, drop outliers and duplicates, write the result
    Clean(#[clap(flatten)] CleanArg),
    /// Correlate two columns with a method chosen from their kinds
    Correlate(#[clap(flatten)] CorrelateArg),
    /// One-way ANOVA of a numeric column across groups
    Anova(#[clap(flatten)] AnovaArg),
    /// Test a planned contrast between groups
    Contrast(#[clap(flatten)] ContrastArg),
    /// Run the full configured analysis pipeline
    Run(#[clap(flatten)] RunArg),
    /// Generate a synthetic survey CSV
    GenerateSample(#[clap(flatten)] GenerateSampleArg),
}

/// The survey file every analysis command reads.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InputArg {
    /// Survey CSV file
    pub csv: PathBuf,
    /// Directory a relative CSV path is resolved against
    #[arg(long)]
    pub base_dir: Option<PathBuf>,
}

impl InputArg {
    pub fn load(&self, options: &LoadOptions) -> anyhow::Result<Table> {
        let mut options = options.clone();
        if let Some(base_dir) = &self.base_dir {
            options.base_dir = Some(base_dir.clone());
        }
        loader::load_csv(&self.csv, &options)
            .with_context(|| format!("Failed to load survey data: {}", self.csv.display()))
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init_logging(&LogConfig {
        level: args.log_level,
        format: args.log_format,
    })?;
    match args.mode {
        Mode::Explore(arg) => explore::run(&arg)?,
        Mode::Clean(arg) => clean::run(&arg)?,
        Mode::Correlate(arg) => correlate::run(&arg)?,
        Mode::Anova(arg) => anova::run(&arg)?,
        Mode::Contrast(arg) => contrast::run(&arg)?,
        Mode::Run(arg) => run::run(&arg)?,
        Mode::GenerateSample(arg) => generate_sample::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_contrast() {
        let args = CommandArgs::try_parse_from([
            "survey-eda",
            "--log-format",
            "compact",
            "contrast",
            "survey.csv",
            "Diet Type",
            "Happiness Score",
            "--positive",
            "Balanced,Vegan",
            "--negative",
            "Junk Food",
        ])
        .unwrap();
        assert_eq!(args.log_format, LogFormat::Compact);
        let Mode::Contrast(arg) = args.mode else {
            panic!("expected contrast mode");
        };
        assert_eq!(arg.input.csv, PathBuf::from("survey.csv"));
        assert_eq!(arg.positive, ["Balanced", "Vegan"]);
        assert_eq!(arg.negative, ["Junk Food"]);
    }
}
