use super::types::Dataset;
use crate::error::{CarbonError, Result, ResultExt as _};
use calamine::{Data, Reader as _, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Tabular encodings accepted by [`load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
    Spreadsheet,
}

impl SourceFormat {
    /// Resolves a format from a bare extension (`csv`, `.xlsx`).
    ///
    /// # Errors
    ///
    /// Returns [`CarbonError::UnsupportedFormat`] for anything unknown.
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "parquet" | "pq" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "" => Err(CarbonError::UnsupportedFormat("no file extension".to_owned())),
            other => Err(CarbonError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    /// Resolves a format from a MIME type such as an upload widget reports.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_lowercase();
        match essence.as_str() {
            "text/csv" | "application/csv" => Ok(Self::Csv),
            "text/tab-separated-values" => Ok(Self::Tsv),
            "application/json" => Ok(Self::Json),
            "application/vnd.apache.parquet" | "application/x-parquet" => Ok(Self::Parquet),
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.oasis.opendocument.spreadsheet" => Ok(Self::Spreadsheet),
            _ => Err(CarbonError::UnsupportedFormat(mime.to_owned())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }

    /// Resolves a declared type: a MIME type, a file name or a bare extension.
    pub fn from_declared(declared: &str) -> Result<Self> {
        if declared.contains('/') {
            return Self::from_mime(declared);
        }
        let as_path = Path::new(declared);
        if as_path.extension().is_some() {
            Self::from_path(as_path)
        } else {
            Self::from_extension(declared)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Parquet => "parquet",
            Self::Json => "json",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// Where raw activity data comes from.
#[derive(Clone, Debug)]
pub enum Source {
    Path(PathBuf),
    /// An in-memory upload. `declared` is its file name, extension or MIME type.
    Bytes { declared: String, data: Vec<u8> },
}

impl Source {
    pub fn bytes(declared: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            declared: declared.into(),
            data: data.into(),
        }
    }

    pub fn format(&self) -> Result<SourceFormat> {
        match self {
            Self::Path(path) => SourceFormat::from_path(path),
            Self::Bytes { declared, .. } => SourceFormat::from_declared(declared),
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Loads raw activity data into a [`Dataset`].
///
/// The format is decided from the declared type before any bytes are read,
/// so unsupported inputs fail closed.
///
/// # Errors
///
/// [`CarbonError::UnsupportedFormat`] for unknown encodings,
/// [`CarbonError::Other`] naming the path when a file cannot be read, and
/// [`CarbonError::DataProcessing`] for malformed content.
pub fn load(source: impl Into<Source>) -> Result<Dataset> {
    let source = source.into();
    let format = source.format()?;

    let (label, data) = match source {
        Source::Path(path) => {
            let data = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (path.display().to_string(), data)
        }
        Source::Bytes { declared, data } => (declared, data),
    };

    let df = read_frame(format, data)?;
    tracing::info!(
        source = %label,
        format = format.as_str(),
        rows = df.height(),
        columns = df.width(),
        "Activity data loaded"
    );
    Dataset::new(df)
}

fn read_frame(format: SourceFormat, data: Vec<u8>) -> Result<DataFrame> {
    match format {
        SourceFormat::Csv => read_delimited(data, b','),
        SourceFormat::Tsv => read_delimited(data, b'\t'),
        SourceFormat::Parquet => ParquetReader::new(Cursor::new(data))
            .finish()
            .map_err(|e| malformed("Parquet", &e)),
        SourceFormat::Json => JsonReader::new(Cursor::new(data))
            .finish()
            .map_err(|e| malformed("JSON", &e)),
        SourceFormat::Spreadsheet => read_spreadsheet(data),
    }
}

fn read_delimited(data: Vec<u8>, separator: u8) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .map_parse_options(|opts| opts.with_separator(separator).with_try_parse_dates(true))
        .into_reader_with_file_handle(Cursor::new(data))
        .finish()
        .map_err(|e| malformed("delimited text", &e))
}

fn malformed(format: &str, err: &PolarsError) -> CarbonError {
    CarbonError::DataProcessing(format!("Failed to read {format}: {err}"))
}

/// Reads the first worksheet, taking its first row as the header.
///
/// A column whose non-empty cells are all whole numbers becomes `Int64`, one
/// with any fractional number becomes `Float64`, anything else is kept as text.
fn read_spreadsheet(data: Vec<u8>) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CarbonError::DataProcessing("spreadsheet has no worksheets".to_owned()))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let mut columns = Vec::with_capacity(header.len());
    for (idx, head) in header.iter().enumerate() {
        let name = cell_to_string(head).unwrap_or_else(|| format!("column_{}", idx + 1));
        let cells: Vec<Option<&Data>> = body
            .iter()
            .map(|row| row.get(idx).filter(|cell| !matches!(cell, Data::Empty)))
            .collect();

        let all_numeric = cells
            .iter()
            .flatten()
            .all(|cell| matches!(cell, Data::Int(_) | Data::Float(_)));

        let all_integral = all_numeric && cells.iter().flatten().all(|cell| cell_to_i64(cell).is_some());

        let series = if all_integral {
            let values: Vec<Option<i64>> = cells.iter().map(|cell| cell.and_then(cell_to_i64)).collect();
            Series::new(name.into(), values)
        } else if all_numeric {
            let values: Vec<Option<f64>> = cells.iter().map(|cell| cell.and_then(cell_to_f64)).collect();
            Series::new(name.into(), values)
        } else {
            let values: Vec<Option<String>> =
                cells.iter().map(|cell| cell.and_then(cell_to_string)).collect();
            Series::new(name.into(), values)
        };
        columns.push(Column::from(series));
    }

    DataFrame::new(columns).map_err(|e| malformed("spreadsheet", &e))
}

fn cell_to_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(v) => Some(*v as f64),
        Data::Float(v) => Some(*v),
        _ => None,
    }
}

/// Excel stores every number as a float, so whole floats count as integers.
fn cell_to_i64(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(v) => Some(*v),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Some(*v as i64),
        _ => None,
    }
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(v.to_string()),
        Data::Bool(v) => Some(v.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(|ts| {
            if ts.time() == chrono::NaiveTime::MIN {
                ts.format("%Y-%m-%d").to_string()
            } else {
                ts.format("%Y-%m-%dT%H:%M:%S").to_string()
            }
        }),
        Data::Error(e) => Some(e.to_string()),
    }
}
