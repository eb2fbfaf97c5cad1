//! The full pipeline: load, clean, explore, then every configured test.
//!
//! A failing analysis step is logged and recorded in the report; the
//! remaining steps still run.

use std::{
    fmt,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use survey_analysis::{
    AnalysisError,
    anova::one_way_anova,
    contrast::{build_contrast, evaluate_contrast},
    correlation::{CorrelationEngine, CorrelationResult},
    significance::SignificanceGate,
};
use survey_frame::{Table, cleaning, loader};
use tracing::{info, warn};

use crate::{
    command::{
        InputArg,
        explore::{self, ExploreSettings},
    },
    config::{AnalysisConfig, CorrelationSpec},
    report::{
        CleaningSummary, CorrelationSummary, Gated, PlotWriter, Report, StepFailure, table,
    },
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    #[command(flatten)]
    pub input: InputArg,
    /// Analysis config JSON; the built-in survey study when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory for plot data files
    #[arg(long)]
    pub plot_dir: Option<PathBuf>,
    /// Also save the cleaned data as CSV
    #[arg(long)]
    pub cleaned_output: Option<PathBuf>,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write a JSON report instead of text
    #[arg(long)]
    pub json: bool,
}

/// Records a failed step and carries on.
fn record_failure(report: &mut Report, step: String, error: &impl fmt::Display) {
    warn!(%step, %error, "analysis step failed, continuing");
    report.failures.push(StepFailure {
        step,
        error: error.to_string(),
    });
}

fn clean(data: &Table, config: &AnalysisConfig, report: &mut Report) -> Table {
    let outliers = config
        .cleaning
        .z_threshold
        .map(|threshold| cleaning::detect_outliers(data, threshold))
        .unwrap_or_default();
    let outcome = cleaning::clean(data, &config.cleaning);
    info!(
        rows_before = data.n_rows(),
        rows_after = outcome.table.n_rows(),
        "data cleaned"
    );
    report.cleaning = Some(CleaningSummary {
        rows_before: data.n_rows(),
        rows_after: outcome.table.n_rows(),
        filled_cells: outcome.filled_cells,
        dropped_rows: outcome.dropped_rows,
        z_threshold: config.cleaning.z_threshold,
        outliers,
    });
    outcome.table
}

fn correlate(
    engine: &CorrelationEngine,
    data: &Table,
    spec: &CorrelationSpec,
) -> Result<CorrelationResult, AnalysisError> {
    let a = data.column(&spec.a)?;
    let b = data.column(&spec.b)?;
    engine.correlate(a, b)
}

/// Runs the configured tests on `data`, writing plot data into `plots`.
pub(crate) fn analyze(
    data: &Table,
    config: &AnalysisConfig,
    plots: Option<&PlotWriter>,
    report: &mut Report,
) {
    let gate = SignificanceGate::new(config.alpha);
    let engine = CorrelationEngine::new(config.ordinal_levels.clone());

    for spec in &config.correlations {
        let step = format!("correlation {} vs {}", spec.a, spec.b);
        match correlate(&engine, data, spec) {
            Ok(result) => {
                let significant = gate.check(result.p_value);
                if significant && let Some(plots) = plots {
                    match plots.scatter(&result) {
                        Ok(Some(path)) => report.plots.push(path),
                        Ok(None) => {}
                        Err(e) => record_failure(report, format!("{step} plot"), &e),
                    }
                }
                report.correlations.push(Gated {
                    result: CorrelationSummary::from(&result),
                    significant,
                });
            }
            Err(e) => record_failure(report, step, &e),
        }
    }

    for spec in &config.anovas {
        let step = format!("ANOVA {} by {}", spec.value, spec.group);
        match one_way_anova(data, &spec.group, &spec.value) {
            Ok(anova) => {
                if let Some(plots) = plots {
                    match plots.groups(data, &spec.group, &spec.value) {
                        Ok(path) => report.plots.push(path),
                        Err(e) => record_failure(report, format!("{step} plot"), &e),
                    }
                }
                let significant = gate.check(anova.p_value);
                report.anovas.push(Gated {
                    result: anova,
                    significant,
                });
            }
            Err(e) => record_failure(report, step, &e),
        }
    }

    for spec in &config.contrasts {
        let step = format!(
            "contrast {} vs {} on {}",
            spec.positive.join("+"),
            spec.negative.join("+"),
            spec.value
        );
        let result = build_contrast(&spec.positive, &spec.negative)
            .and_then(|weights| evaluate_contrast(data, &spec.group, &spec.value, &weights));
        match result {
            Ok(contrast) => {
                let significant = gate.check(contrast.p_value);
                if significant && let Some(plots) = plots {
                    match plots.weighted_means(&contrast) {
                        Ok(path) => report.plots.push(path),
                        Err(e) => record_failure(report, format!("{step} plot"), &e),
                    }
                }
                report.contrasts.push(Gated {
                    result: contrast,
                    significant,
                });
            }
            Err(e) => record_failure(report, step, &e),
        }
    }
}

fn render<W: Write>(
    w: &mut W,
    report: &Report,
    explored: Option<&explore::Explored>,
) -> io::Result<()> {
    table::write_heading(w, "Survey Analysis Report")?;
    writeln!(w, "Source: {}", report.source.display())?;
    writeln!(w, "Generated: {}", report.generated_at.to_rfc3339())?;
    writeln!(w)?;
    if let Some(cleaning) = &report.cleaning {
        table::write_heading(w, "Cleaning")?;
        writeln!(w, "  Rows before:   {}", cleaning.rows_before)?;
        writeln!(w, "  Rows after:    {}", cleaning.rows_after)?;
        writeln!(w, "  Filled cells:  {}", cleaning.filled_cells)?;
        writeln!(w, "  Dropped rows:  {}", cleaning.dropped_rows)?;
        writeln!(w)?;
        if let Some(threshold) = cleaning.z_threshold
            && !cleaning.outliers.is_empty()
        {
            table::write_outliers(w, threshold, &cleaning.outliers)?;
        }
    }
    if let Some(explored) = explored {
        explore::render(w, explored)?;
    }

    table::write_heading(w, "Hypothesis Tests")?;
    for entry in &report.correlations {
        table::write_correlation(w, &entry.result, entry.significant, report.alpha)?;
    }
    for entry in &report.anovas {
        table::write_anova(w, &entry.result, entry.significant, report.alpha)?;
    }
    for entry in &report.contrasts {
        table::write_contrast(w, &entry.result, entry.significant, report.alpha)?;
    }

    writeln!(
        w,
        "{} of {} tests significant at alpha={}",
        report.significant_count(),
        report.correlations.len() + report.anovas.len() + report.contrasts.len(),
        report.alpha
    )?;
    if !report.plots.is_empty() {
        writeln!(w, "Plot data:")?;
        for path in &report.plots {
            writeln!(w, "  {}", path.display())?;
        }
    }
    if !report.failures.is_empty() {
        writeln!(w, "Failed steps:")?;
        for failure in &report.failures {
            writeln!(w, "  {}: {}", failure.step, failure.error)?;
        }
    }
    Ok(())
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let config = AnalysisConfig::load(arg.config.as_deref())?;
    let raw = arg.input.load(&config.load)?;
    let mut report = Report::new(arg.input.csv.clone(), config.alpha);

    let data = clean(&raw, &config, &mut report);
    if let Some(path) = &arg.cleaned_output {
        loader::save_csv(&data, path)
            .with_context(|| format!("Failed to save cleaned data: {}", path.display()))?;
    }

    let settings = ExploreSettings {
        head: config.head_rows,
        top_n: config.top_n,
        add_other: config.add_other,
        bins: config.histogram_bins,
    };
    let explored = match explore::explore(&data, settings) {
        Ok(explored) => {
            report.exploration = Some(explored.exploration.clone());
            Some(explored)
        }
        Err(e) => {
            record_failure(&mut report, "exploration".to_owned(), &e);
            None
        }
    };

    let plots = arg.plot_dir.as_deref().map(PlotWriter::new).transpose()?;
    analyze(&data, &config, plots.as_ref(), &mut report);
    info!(
        significant = report.significant_count(),
        failures = report.failures.len(),
        "analysis finished"
    );

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    if arg.json {
        output.write_json(&report)?;
    } else {
        render(&mut output, &report, explored.as_ref())?;
        output.finish()?;
    }
    Ok(())
}
