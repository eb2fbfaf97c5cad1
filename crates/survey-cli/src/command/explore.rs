use std::{
    io::{self, Write},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use survey_analysis::{
    AnalysisError,
    exploration::{self, ColumnHistogram, Overview},
};
use survey_frame::{Table, loader::LoadOptions};
use tracing::info;

use crate::{
    command::InputArg,
    report::{Exploration, table},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExploreArg {
    #[command(flatten)]
    pub input: InputArg,
    /// Rows shown in the overview
    #[arg(long, default_value_t = 5)]
    pub head: usize,
    /// Most frequent values listed per text column
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,
    /// Sum the values beyond --top-n into an "Other" entry
    #[arg(long)]
    pub add_other: bool,
    /// Histogram bins per numeric column
    #[arg(long, default_value_t = 10)]
    pub bins: usize,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write a JSON report instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ExploreSettings {
    pub head: usize,
    pub top_n: usize,
    pub add_other: bool,
    pub bins: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Explored {
    pub overview: Overview,
    #[serde(flatten)]
    pub exploration: Exploration,
    pub histograms: Vec<ColumnHistogram>,
}

#[derive(Debug, Serialize)]
struct ExploreReport<'a> {
    generated_at: DateTime<Utc>,
    source: &'a PathBuf,
    #[serde(flatten)]
    explored: &'a Explored,
}

/// Runs every exploration summary on `table`.
pub(crate) fn explore(table: &Table, settings: ExploreSettings) -> Result<Explored, AnalysisError> {
    info!(rows = table.n_rows(), columns = table.n_cols(), "exploring data");
    Ok(Explored {
        overview: exploration::overview(table, settings.head)?,
        exploration: Exploration {
            columns: exploration::data_info(table)?,
            descriptive: exploration::descriptive_stats(table)?,
            frequencies: exploration::categorical_frequencies(
                table,
                settings.top_n,
                settings.add_other,
            )?,
            ranges: exploration::numeric_ranges(table)?,
        },
        histograms: exploration::numeric_histograms(table, settings.bins)?,
    })
}

pub(crate) fn render<W: Write>(w: &mut W, explored: &Explored) -> io::Result<()> {
    table::write_heading(w, "Data Overview")?;
    table::write_overview(w, &explored.overview)?;
    table::write_column_info(w, &explored.exploration.columns)?;
    table::write_heading(w, "Descriptive Statistics")?;
    table::write_descriptive(w, &explored.exploration.descriptive)?;
    table::write_heading(w, "Categorical Frequencies")?;
    table::write_frequencies(w, &explored.exploration.frequencies)?;
    table::write_heading(w, "Distributions")?;
    table::write_ranges(w, &explored.exploration.ranges)?;
    table::write_histograms(w, &explored.histograms)
}

pub(crate) fn run(arg: &ExploreArg) -> anyhow::Result<()> {
    let data = arg.input.load(&LoadOptions::default())?;
    let settings = ExploreSettings {
        head: arg.head,
        top_n: arg.top_n,
        add_other: arg.add_other,
        bins: arg.bins,
    };
    let explored = explore(&data, settings)?;

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    if arg.json {
        output.write_json(&ExploreReport {
            generated_at: Utc::now(),
            source: &arg.input.csv,
            explored: &explored,
        })?;
    } else {
        render(&mut output, &explored)?;
        output.finish()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use survey_frame::Column;

    use super::*;

    const SETTINGS: ExploreSettings = ExploreSettings {
        head: 3,
        top_n: 2,
        add_other: true,
        bins: 4,
    };

    fn survey() -> Table {
        Table::new(vec![
            Column::from_values("Age", [25.0, 30.0, 35.0, 40.0, 45.0]),
            Column::text(
                "Diet Type",
                [Some("Vegan"), Some("Keto"), Some("Vegan"), None, Some("Paleo")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_has_every_section() {
        let explored = explore(&survey(), SETTINGS).unwrap();
        let mut buf = Vec::new();
        render(&mut buf, &explored).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for heading in [
            "Data Overview",
            "Descriptive Statistics",
            "Categorical Frequencies",
            "Distributions",
            "Distribution of Age:",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("Number of participants: 5"));
    }

    #[test]
    fn test_frequencies_respect_top_n() {
        let explored = explore(&survey(), SETTINGS).unwrap();
        let diet = &explored.exploration.frequencies["Diet Type"];
        assert_eq!(diet.len(), 3);
        assert_eq!(diet[0].value.as_deref(), Some("Vegan"));
        assert_eq!(diet[2].value.as_deref(), Some(exploration::OTHER_LABEL));
        assert_eq!(diet[2].count, 2);
    }

    #[test]
    fn test_empty_table_fails() {
        assert_eq!(
            explore(&Table::default(), SETTINGS).unwrap_err(),
            AnalysisError::EmptyTable
        );
    }
}
