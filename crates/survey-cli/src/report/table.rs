//! Fixed-width text rendering of analysis results.
//!
//! Every function writes one section to any [`Write`] sink and ends with a
//! blank line.

use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use survey_analysis::{
    anova::AnovaTable,
    contrast::ContrastResult,
    exploration::{
        ColumnHistogram, ColumnInfo, DescriptiveReport, Frequency, NumericRange, Overview,
    },
    groups::GroupSummary,
};
use survey_frame::{Table, cleaning::OutlierCount};

use super::CorrelationSummary;

/// Longest bar of a text histogram.
const BAR_WIDTH: u64 = 40;

/// Widest label column before truncation.
const MAX_CELL_WIDTH: usize = 24;

pub fn write_heading<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    writeln!(w, "{title}")?;
    writeln!(w, "{}", "=".repeat(title.chars().count().max(40)))?;
    writeln!(w)
}

fn write_separator<W: Write>(w: &mut W, width: usize) -> io::Result<()> {
    writeln!(w, "  {}", "-".repeat(width))
}

fn fit(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        label.to_owned()
    } else {
        let mut short = label.chars().take(width - 1).collect::<String>();
        short.push('~');
        short
    }
}

fn opt(value: Option<f64>) -> String {
    value.map_or("N/A".to_string(), |v| format!("{v:.3}"))
}

fn significance(significant: bool, alpha: f64) -> String {
    if significant {
        format!("significant at alpha={alpha}")
    } else {
        format!("not significant at alpha={alpha}")
    }
}

pub fn write_overview<W: Write>(w: &mut W, overview: &Overview) -> io::Result<()> {
    writeln!(w, "Number of participants: {}", overview.n_rows)?;
    writeln!(w, "Number of columns: {}", overview.n_cols)?;
    writeln!(w)?;
    writeln!(w, "  {:<24} {:>8} {:>8}", "Column", "Type", "Missing")?;
    write_separator(w, 42)?;
    for ((name, dtype), missing) in overview
        .columns
        .iter()
        .zip(&overview.dtypes)
        .zip(&overview.missing_values)
    {
        writeln!(w, "  {:<24} {:>8} {:>8}", fit(name, 24), dtype, missing)?;
    }
    writeln!(w)?;
    writeln!(w, "First {} rows:", overview.head.n_rows())?;
    write_rows(w, &overview.head)?;
    writeln!(w)
}

/// Renders every row of `table`, missing cells as `-`.
pub fn write_rows<W: Write>(w: &mut W, table: &Table) -> io::Result<()> {
    let rendered = (0..table.n_rows())
        .map(|i| {
            table
                .row(i)
                .iter()
                .map(|cell| {
                    if cell.is_missing() {
                        "-".to_string()
                    } else {
                        fit(&cell.to_string(), MAX_CELL_WIDTH)
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let widths = table
        .column_names()
        .enumerate()
        .map(|(i, name)| {
            rendered
                .iter()
                .map(|row| row[i].chars().count())
                .chain([name.chars().count().min(MAX_CELL_WIDTH)])
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let header = table
        .column_names()
        .zip(&widths)
        .map(|(name, &width)| format!("{:<width$}", fit(name, MAX_CELL_WIDTH)))
        .collect::<Vec<_>>();
    writeln!(w, "  {}", header.join(" | ").trim_end())?;
    let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    write_separator(w, total)?;
    for row in &rendered {
        let cells = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>();
        writeln!(w, "  {}", cells.join(" | ").trim_end())?;
    }
    Ok(())
}

pub fn write_column_info<W: Write>(w: &mut W, info: &[ColumnInfo]) -> io::Result<()> {
    writeln!(w, "Column Summary:")?;
    writeln!(
        w,
        "  {:<24} {:>8} {:>8} {:>9} {:>8}",
        "Column", "Type", "Missing", "Missing%", "Unique"
    )?;
    write_separator(w, 61)?;
    for column in info {
        writeln!(
            w,
            "  {:<24} {:>8} {:>8} {:>8.2}% {:>8}",
            fit(&column.name, 24),
            column.dtype,
            column.missing_count,
            column.missing_percent,
            column.unique_values,
        )?;
    }
    writeln!(w)
}

pub fn write_descriptive<W: Write>(w: &mut W, report: &DescriptiveReport) -> io::Result<()> {
    if !report.numeric.is_empty() {
        writeln!(w, "Numeric Columns:")?;
        writeln!(
            w,
            "  {:<24} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"
        )?;
        write_separator(w, 104)?;
        for summary in &report.numeric {
            let s = &summary.stats;
            writeln!(
                w,
                "  {:<24} {:>6} {:>9.3} {:>9} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
                fit(&summary.column, 24),
                s.count,
                s.mean,
                opt(s.std_dev),
                s.min,
                s.q1,
                s.median,
                s.q3,
                s.max,
            )?;
        }
        writeln!(w)?;
    }
    if !report.categorical.is_empty() {
        writeln!(w, "Categorical Columns:")?;
        writeln!(
            w,
            "  {:<24} {:>6} {:>7} {:<20} {:>6}",
            "Column", "Count", "Unique", "Top", "Freq"
        )?;
        write_separator(w, 67)?;
        for summary in &report.categorical {
            writeln!(
                w,
                "  {:<24} {:>6} {:>7} {:<20} {:>6}",
                fit(&summary.column, 24),
                summary.count,
                summary.unique,
                fit(summary.top.as_deref().unwrap_or("-"), 20),
                summary.freq,
            )?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_frequencies<W: Write>(
    w: &mut W,
    frequencies: &BTreeMap<String, Vec<Frequency>>,
) -> io::Result<()> {
    for (column, counts) in frequencies {
        writeln!(w, "{column}:")?;
        for frequency in counts {
            writeln!(
                w,
                "  {:<24} {:>8}",
                fit(frequency.value.as_deref().unwrap_or("<missing>"), 24),
                frequency.count
            )?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_ranges<W: Write>(w: &mut W, ranges: &[NumericRange]) -> io::Result<()> {
    writeln!(w, "Numeric Ranges:")?;
    writeln!(
        w,
        "  {:<24} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Column", "Min", "Max", "Mean", "Std", "Median"
    )?;
    write_separator(w, 74)?;
    for range in ranges {
        writeln!(
            w,
            "  {:<24} {:>9.3} {:>9.3} {:>9.3} {:>9} {:>9.3}",
            fit(&range.column, 24),
            range.min,
            range.max,
            range.mean,
            opt(range.std_dev),
            range.median,
        )?;
    }
    writeln!(w)
}

pub fn write_histograms<W: Write>(w: &mut W, histograms: &[ColumnHistogram]) -> io::Result<()> {
    for ColumnHistogram { column, histogram } in histograms {
        writeln!(w, "Distribution of {column}:")?;
        let max = histogram.max_count().max(1);
        for bin in &histogram.bins {
            let bar = usize::try_from(bin.count * BAR_WIDTH / max).unwrap_or(0);
            writeln!(
                w,
                "  [{:>9.2}, {:>9.2}) {:>6} {}",
                bin.range.start,
                bin.range.end,
                bin.count,
                "#".repeat(bar)
            )?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_outliers<W: Write>(
    w: &mut W,
    threshold: f64,
    outliers: &[OutlierCount],
) -> io::Result<()> {
    writeln!(w, "Outliers (|z| > {threshold}):")?;
    for outlier in outliers {
        writeln!(w, "  {:<24} {:>8}", fit(&outlier.column, 24), outlier.count)?;
    }
    writeln!(w)
}

pub fn write_correlation<W: Write>(
    w: &mut W,
    result: &CorrelationSummary,
    significant: bool,
    alpha: f64,
) -> io::Result<()> {
    writeln!(w, "Correlation: {} vs {}", result.a, result.b)?;
    writeln!(w, "  Method:       {}", result.method)?;
    writeln!(w, "  Coefficient:  {:.4}", result.coefficient)?;
    writeln!(w, "  p-value:      {:.4e}", result.p_value)?;
    writeln!(w, "  Pairs:        {}", result.n)?;
    writeln!(w, "  Result:       {}", significance(significant, alpha))?;
    writeln!(w)
}

pub fn write_group_summaries<W: Write>(w: &mut W, groups: &[GroupSummary]) -> io::Result<()> {
    writeln!(w, "  {:<20} {:>8} {:>10} {:>10}", "Group", "Count", "Mean", "Variance")?;
    write_separator(w, 51)?;
    for group in groups {
        writeln!(
            w,
            "  {:<20} {:>8} {:>10.3} {:>10}",
            fit(&group.label, 20),
            group.count,
            group.mean,
            opt(group.variance),
        )?;
    }
    Ok(())
}

pub fn write_anova<W: Write>(
    w: &mut W,
    anova: &AnovaTable,
    significant: bool,
    alpha: f64,
) -> io::Result<()> {
    writeln!(w, "ANOVA: {} by {}", anova.value_column, anova.group_column)?;
    write_group_summaries(w, &anova.groups)?;
    writeln!(w)?;
    writeln!(
        w,
        "  {:<10} {:>12} {:>6} {:>12} {:>10} {:>12}",
        "Source", "Sum Sq", "df", "Mean Sq", "F", "PR(>F)"
    )?;
    write_separator(w, 67)?;
    writeln!(
        w,
        "  {:<10} {:>12.4} {:>6} {:>12.4} {:>10.4} {:>12.4e}",
        fit(&anova.group_column, 10),
        anova.sum_of_squares_between,
        anova.df_between,
        anova.mean_square_between,
        anova.f_statistic,
        anova.p_value,
    )?;
    writeln!(
        w,
        "  {:<10} {:>12.4} {:>6} {:>12.4}",
        "Residual", anova.sum_of_squares_within, anova.df_within, anova.mean_square_within,
    )?;
    writeln!(w, "  Result: {}", significance(significant, alpha))?;
    writeln!(w)
}

pub fn write_contrast<W: Write>(
    w: &mut W,
    contrast: &ContrastResult,
    significant: bool,
    alpha: f64,
) -> io::Result<()> {
    writeln!(
        w,
        "Planned Contrast: {} by {}",
        contrast.value_column, contrast.group_column
    )?;
    writeln!(w, "  {:<20} {:>8} {:>10}", "Group", "Weight", "Mean")?;
    write_separator(w, 40)?;
    for weighted in &contrast.weighted_means {
        writeln!(
            w,
            "  {:<20} {:>8.3} {:>10.3}",
            fit(&weighted.label, 20),
            weighted.weight,
            weighted.mean
        )?;
    }
    writeln!(w)?;
    writeln!(w, "  Estimate:     {:.4}", contrast.estimate)?;
    writeln!(w, "  Std. error:   {:.4}", contrast.std_error)?;
    writeln!(
        w,
        "  t({}):        {:.4}",
        contrast.degrees_of_freedom, contrast.t_statistic
    )?;
    writeln!(w, "  p-value:      {:.4e}", contrast.p_value)?;
    writeln!(w, "  Result:       {}", significance(significant, alpha))?;
    writeln!(w)
}
