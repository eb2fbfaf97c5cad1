//! CSV reading and writing.
//!
//! Every column is read as text first and then typed: a column becomes
//! numeric when each of its non-missing tokens parses as a finite `f64`.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, info};

use crate::{Column, FrameError, Table};

/// Options controlling how a CSV file is located and parsed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Directory relative paths are resolved against. `None` uses the
    /// current working directory.
    pub base_dir: Option<PathBuf>,
    /// Tokens read as a missing cell. Compared exactly, without trimming.
    pub missing_tokens: Vec<String>,
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            // "None" is left out on purpose: it is a valid survey answer.
            missing_tokens: ["", "NA", "N/A", "NaN", "nan", "null", "NULL"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            delimiter: b',',
        }
    }
}

impl LoadOptions {
    /// Resolves `path` against [`Self::base_dir`] unless it is absolute.
    ///
    /// ```
    /// use std::path::Path;
    /// use survey_frame::loader::LoadOptions;
    ///
    /// let options = LoadOptions {
    ///     base_dir: Some("/data".into()),
    ///     ..LoadOptions::default()
    /// };
    /// assert_eq!(options.resolve(Path::new("survey.csv")), Path::new("/data/survey.csv"));
    /// assert_eq!(options.resolve(Path::new("/tmp/x.csv")), Path::new("/tmp/x.csv"));
    /// ```
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn is_missing(&self, token: &str) -> bool {
        self.missing_tokens.iter().any(|t| t == token)
    }
}

/// Loads a CSV file with a header row into a [`Table`].
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Table, FrameError> {
    let path = options.resolve(path);
    let file = File::open(&path).map_err(|source| FrameError::Io {
        path: path.clone(),
        source,
    })?;
    let table = read_csv(file, options)?;
    info!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.n_cols(),
        "loaded CSV"
    );
    Ok(table)
}

/// Reads CSV data with a header row from any reader.
///
/// # Examples
///
/// ```
/// use survey_frame::loader::{LoadOptions, read_csv};
///
/// let data = "Age,Gender\n20,Male\nNA,Female\n";
/// let table = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap();
/// assert!(table.column("Age").unwrap().is_numeric());
/// assert_eq!(table.column("Age").unwrap().missing_count(), 1);
/// assert!(!table.column("Gender").unwrap().is_numeric());
/// ```
pub fn read_csv<R: io::Read>(reader: R, options: &LoadOptions) -> Result<Table, FrameError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .headers()?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();

    let mut raw = vec![Vec::<Option<String>>::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        if record.len() != headers.len() {
            return Err(FrameError::RaggedRow {
                line: record.position().map_or(0, csv::Position::line),
                expected: headers.len(),
                actual: record.len(),
            });
        }
        for (cells, token) in raw.iter_mut().zip(record.iter()) {
            cells.push((!options.is_missing(token)).then(|| token.to_owned()));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| type_column(name, cells))
        .collect();
    Table::new(columns)
}

fn type_column(name: String, cells: Vec<Option<String>>) -> Column {
    let parsed = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(token) => parse_number(token).map(Some),
        })
        .collect::<Option<Vec<_>>>();
    match parsed {
        Some(values) => {
            debug!(column = %name, "typed as numeric");
            Column::numeric(name, values)
        }
        None => {
            debug!(column = %name, "typed as text");
            Column::text(name, cells)
        }
    }
}

fn parse_number(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Writes a [`Table`] as CSV with a header row. Missing cells are empty.
pub fn write_csv<W: io::Write>(table: &Table, writer: W) -> Result<(), FrameError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.column_names())?;
    for row in 0..table.n_rows() {
        writer.write_record(table.row(row).iter().map(ToString::to_string))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes a [`Table`] to a CSV file.
pub fn save_csv(table: &Table, path: &Path) -> Result<(), FrameError> {
    let file = File::create(path).map_err(|source| FrameError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(table, file)?;
    info!(path = %path.display(), rows = table.n_rows(), "saved CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::Cell;

    #[test]
    fn test_missing_tokens_and_none_category() {
        let data = "Score,Answer\n1.5,None\nnan,NA\n,Yes\n";
        let table = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap();
        let score = table.column("Score").unwrap();
        assert!(score.is_numeric());
        assert_eq!(score.missing_count(), 2);
        let answer = table.column("Answer").unwrap();
        assert_eq!(answer.cell(0), Cell::Text("None"));
        assert_eq!(answer.cell(1), Cell::Missing);
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let data = "Code\n10\nabc\n";
        let table = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap();
        let code = table.column("Code").unwrap();
        assert!(!code.is_numeric());
        assert_eq!(code.cell(0), Cell::Text("10"));
    }

    #[test]
    fn test_ragged_row() {
        let data = "a,b\n1,2\n3\n";
        let err = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, FrameError::RaggedRow { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_load_from_base_dir_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("survey.csv")).unwrap();
        writeln!(file, "Age,City").unwrap();
        writeln!(file, "20,NY").unwrap();
        writeln!(file, ",LA").unwrap();
        drop(file);

        let options = LoadOptions {
            base_dir: Some(dir.path().to_path_buf()),
            ..LoadOptions::default()
        };
        let table = load_csv(Path::new("survey.csv"), &options).unwrap();
        assert_eq!(table.n_rows(), 2);

        let out = dir.path().join("out.csv");
        save_csv(&table, &out).unwrap();
        let reloaded = load_csv(&out, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded, table);
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv(Path::new("/nonexistent/survey.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, FrameError::Io { .. }));
    }
}
