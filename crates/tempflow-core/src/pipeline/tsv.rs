//! Tab-separated artifact format shared by the stages.
//!
//! ```text
//! date        min_temp
//! 2020-01-01
//! 2020-01-02  10.0
//! ```
//!
//! Header `date<TAB><column>[<TAB><column>]`, dates as `YYYY-MM-DD`, missing
//! values as empty fields, no index column. Stages hold the data as a polars
//! [`DataFrame`] with a `Date` key column and `Float64` value columns; polars
//! does the reading and writing.

use std::io::Cursor;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

use crate::domain::{ArtifactId, PipelineError};

pub const DATE_COLUMN: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Why a TSV artifact could not be read.
///
/// The caller decides which pipeline error it becomes: the same bad row is
/// a parse problem for a cleaning stage and a join problem for the combiner.
#[derive(Debug, thiserror::Error)]
pub enum TsvError {
    #[error("bad header: {0}")]
    Header(String),

    #[error("line {line}: {message}")]
    Row { line: usize, message: String },

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

impl TsvError {
    pub fn into_parse(self, artifact: &ArtifactId) -> PipelineError {
        match self {
            TsvError::Header(message) => PipelineError::Parse {
                artifact: artifact.clone(),
                line: 1,
                message,
            },
            TsvError::Row { line, message } => PipelineError::Parse {
                artifact: artifact.clone(),
                line,
                message,
            },
            TsvError::Frame(source) => PipelineError::Frame {
                artifact: artifact.clone(),
                source,
            },
        }
    }

    /// Every unreadable combiner input is a join failure, whatever went wrong.
    pub fn into_join(self, artifact: &ArtifactId) -> PipelineError {
        PipelineError::Join {
            artifact: artifact.clone(),
            message: self.to_string(),
        }
    }
}

/// Build a `date, <column>` frame from days and values in row order.
pub fn series_frame(
    column: &str,
    dates: &[NaiveDate],
    values: Vec<Option<f64>>,
) -> PolarsResult<DataFrame> {
    let days: Vec<i32> = dates
        .iter()
        .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    let date = Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;
    let value = Series::new(column.into(), values);
    DataFrame::new(vec![date.into(), value.into()])
}

/// Name of the first non-key column.
pub fn value_column(df: &DataFrame) -> PolarsResult<PlSmallStr> {
    df.get_column_names()
        .into_iter()
        .find(|name| name.as_str() != DATE_COLUMN)
        .cloned()
        .ok_or_else(|| PolarsError::ColumnNotFound("frame has no value column".into()))
}

/// Render a frame as a TSV artifact.
pub fn write_frame(df: &mut DataFrame, artifact: &ArtifactId) -> Result<String, PipelineError> {
    let frame_error = |source: PolarsError| PipelineError::Frame {
        artifact: artifact.clone(),
        source,
    };

    let mut buf: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b'\t')
        .finish(df)
        .map_err(frame_error)?;
    String::from_utf8(buf).map_err(|e| frame_error(PolarsError::ComputeError(e.to_string().into())))
}

fn parse_value(field: &str) -> Result<Option<f64>, String> {
    let v: f64 = field
        .parse()
        .map_err(|_| format!("invalid value {field:?}"))?;
    Ok(if v.is_nan() { None } else { Some(v) })
}

fn header_column(header: &str) -> Result<String, TsvError> {
    match header.split('\t').collect::<Vec<_>>().as_slice() {
        &[DATE_COLUMN, column] if !column.is_empty() && column != DATE_COLUMN => {
            Ok(column.to_string())
        }
        _ => Err(TsvError::Header(format!(
            "expected \"date<TAB><column>\", got {header:?}"
        ))),
    }
}

/// Read a two-column series artifact written by [`write_frame`].
///
/// Dates must be strictly increasing.
pub fn read_series(text: &str) -> Result<DataFrame, TsvError> {
    let mut lines = text.lines();
    let column = header_column(lines.next().unwrap_or_default())?;

    let mut rows = 0;
    for (i, row) in lines.enumerate() {
        let fields = row.split('\t').count();
        if fields != 2 {
            return Err(TsvError::Row {
                line: i + 2,
                message: format!("expected 2 fields, got {fields}"),
            });
        }
        rows += 1;
    }
    if rows == 0 {
        return Ok(series_frame(&column, &[], Vec::new())?);
    }

    // Everything comes in as strings so each cell can be checked with its line.
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes()))
        .finish()?;

    let date_cells = raw.column(DATE_COLUMN)?.str()?;
    let value_cells = raw.column(&column)?.str()?;

    let mut dates: Vec<NaiveDate> = Vec::with_capacity(raw.height());
    let mut values: Vec<Option<f64>> = Vec::with_capacity(raw.height());
    for (i, (date, value)) in date_cells.into_iter().zip(value_cells).enumerate() {
        let line = i + 2;
        let row_error = |message: String| TsvError::Row { line, message };

        let cell = date.unwrap_or_default();
        let date = NaiveDate::parse_from_str(cell, DATE_FORMAT)
            .map_err(|_| row_error(format!("invalid date {cell:?}")))?;
        let value = value
            .map(parse_value)
            .transpose()
            .map_err(row_error)?
            .flatten();

        if dates.last().is_some_and(|prev| *prev >= date) {
            return Err(row_error(format!("date {date} out of order")));
        }
        dates.push(date);
        values.push(value);
    }

    Ok(series_frame(&column, &dates, values)?)
}
