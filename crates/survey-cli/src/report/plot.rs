//! Plot-ready CSV files.
//!
//! Each writer produces one tidy CSV that a plotting tool can load directly.
//! Which results deserve a plot is decided by the caller through the
//! significance gate.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use survey_analysis::{
    contrast::ContrastResult,
    correlation::{CorrelationMethod, CorrelationResult},
};
use survey_frame::Table;
use survey_stats::linear_model::LinearModel;
use tracing::info;

use crate::util::slug;

/// Writes plot data files into one directory.
#[derive(Debug, Clone)]
pub struct PlotWriter {
    dir: PathBuf,
}

impl PlotWriter {
    pub fn new(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create plot directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_owned(),
        })
    }

    fn writer(&self, file_name: &str) -> anyhow::Result<(csv::Writer<fs::File>, PathBuf)> {
        let path = self.dir.join(file_name);
        let writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create plot file: {}", path.display()))?;
        Ok((writer, path))
    }

    /// Scatter points plus the two endpoints of the least-squares line.
    ///
    /// Rows are `series,x,y` where `series` is `point` or `fit`. Returns
    /// `None` for Cramér's V, which has no scatter to draw.
    pub fn scatter(&self, result: &CorrelationResult) -> anyhow::Result<Option<PathBuf>> {
        if result.method == CorrelationMethod::CramersV {
            return Ok(None);
        }
        let (Some(a), Some(b)) = (
            result.effective_a.as_numeric(),
            result.effective_b.as_numeric(),
        ) else {
            return Ok(None);
        };
        let (x, y): (Vec<f64>, Vec<f64>) = a
            .iter()
            .zip(b)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip();
        let (intercept, slope) = LinearModel::fit_line(&x, &y)
            .context("Failed to fit regression line for scatter plot")?;

        let name_a = result.effective_a.name();
        let name_b = result.effective_b.name();
        let (mut writer, path) =
            self.writer(&format!("scatter_{}_vs_{}.csv", slug(name_a), slug(name_b)))?;
        writer.write_record(["series", name_a, name_b])?;
        for (x, y) in x.iter().zip(&y) {
            writer.write_record(["point".to_owned(), x.to_string(), y.to_string()])?;
        }
        let min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for end in [min, max] {
            let fitted = intercept + slope * end;
            writer.write_record(["fit".to_owned(), end.to_string(), fitted.to_string()])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write plot file: {}", path.display()))?;
        info!(path = %path.display(), points = x.len(), "scatter data written");
        Ok(Some(path))
    }

    /// Box/strip plot data: one `group,value` row per observation.
    pub fn groups(
        &self,
        table: &Table,
        group_col: &str,
        value_col: &str,
    ) -> anyhow::Result<PathBuf> {
        let group = table.column(group_col)?;
        let value = table.column(value_col)?;
        let (mut writer, path) =
            self.writer(&format!("box_{}_by_{}.csv", slug(value_col), slug(group_col)))?;
        writer.write_record([group_col, value_col])?;
        let mut rows = 0;
        for (g, v) in group.cells().zip(value.cells()) {
            if g.is_missing() || v.is_missing() {
                continue;
            }
            writer.write_record([g.to_string(), v.to_string()])?;
            rows += 1;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write plot file: {}", path.display()))?;
        info!(path = %path.display(), rows, "group data written");
        Ok(path)
    }

    /// Bar chart data of the weighted group means of a contrast.
    pub fn weighted_means(&self, contrast: &ContrastResult) -> anyhow::Result<PathBuf> {
        let (mut writer, path) = self.writer(&format!(
            "contrast_{}_by_{}.csv",
            slug(&contrast.value_column),
            slug(&contrast.group_column)
        ))?;
        writer.write_record(["group", "weight", "mean", "weighted_mean"])?;
        for w in &contrast.weighted_means {
            writer.write_record([
                w.label.clone(),
                w.weight.to_string(),
                w.mean.to_string(),
                (w.weight * w.mean).to_string(),
            ])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write plot file: {}", path.display()))?;
        info!(path = %path.display(), "weighted means written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use survey_analysis::correlation::CorrelationEngine;
    use survey_frame::Column;

    use super::*;

    #[test]
    fn test_scatter_includes_fit_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let plots = PlotWriter::new(dir.path()).unwrap();
        let a = Column::numeric("Age", [Some(20.0), Some(30.0), None, Some(40.0)]);
        let b = Column::from_values("Sleep Hours", [8.0, 7.0, 9.0, 5.5]);
        let result = CorrelationEngine::default().correlate(&a, &b).unwrap();

        let path = plots.scatter(&result).unwrap().unwrap();
        assert!(path.ends_with("scatter_age_vs_sleep_hours.csv"));
        let text = fs::read_to_string(path).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "series,Age,Sleep Hours");
        assert_eq!(lines.iter().filter(|l| l.starts_with("point,")).count(), 3);
        let fit = lines[4..]
            .iter()
            .map(|l| {
                let fields = l.split(',').collect::<Vec<_>>();
                assert_eq!(fields[0], "fit");
                (fields[1].parse::<f64>().unwrap(), fields[2].parse::<f64>().unwrap())
            })
            .collect::<Vec<_>>();
        // y = 127/12 - 0.125x
        assert_eq!(fit.len(), 2);
        assert_eq!((fit[0].0, fit[1].0), (20.0, 40.0));
        assert!((fit[0].1 - (127.0 / 12.0 - 2.5)).abs() < 1e-9);
        assert!((fit[1].1 - (127.0 / 12.0 - 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_nominal_pairs_have_no_scatter() {
        let dir = tempfile::tempdir().unwrap();
        let plots = PlotWriter::new(dir.path()).unwrap();
        let a = Column::from_labels("Diet", ["Vegan", "Keto", "Vegan", "Keto"]);
        let b = Column::from_labels("Country", ["UK", "US", "UK", "US"]);
        let result = CorrelationEngine::default().correlate(&a, &b).unwrap();
        assert_eq!(plots.scatter(&result).unwrap(), None);
    }

    #[test]
    fn test_group_rows_skip_missing() {
        let dir = tempfile::tempdir().unwrap();
        let plots = PlotWriter::new(&dir.path().join("plots")).unwrap();
        let table = Table::new(vec![
            Column::text("Diet", [Some("Vegan"), None, Some("Keto")]),
            Column::numeric("Happiness", [Some(8.0), Some(5.0), None]),
        ])
        .unwrap();
        let path = plots.groups(&table, "Diet", "Happiness").unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "Diet,Happiness\nVegan,8\n");
    }
}
