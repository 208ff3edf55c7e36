//! Parse stage: raw whitespace-delimited text into a dated series.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::*;

use super::{expect_inputs, tsv};
use crate::domain::{ArtifactId, PipelineError, TaskId, TaskInput};
use crate::task::Task;

fn parse_date(token: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(token, "%Y%m%d"))
        .ok()
}

/// Parse a raw artifact into a `date, <column>` frame.
///
/// Line 1 is a header and is skipped. Every other line holds a date
/// (`YYYY-MM-DD` or `YYYYMMDD`) and a number separated by whitespace; `NaN`
/// reads as missing. Blank lines may only trail the data. Rows come out
/// sorted by date and a repeated date is an error.
pub fn parse_raw(
    artifact: &ArtifactId,
    text: &str,
    column: &str,
) -> Result<DataFrame, PipelineError> {
    let error = |line: usize, message: String| PipelineError::Parse {
        artifact: artifact.clone(),
        line,
        message,
    };

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut values: Vec<Option<f64>> = Vec::new();
    let mut seen: HashMap<NaiveDate, usize> = HashMap::new();
    let mut first_blank: Option<usize> = None;

    for (idx, raw) in text.lines().enumerate().skip(1) {
        let line = idx + 1;
        let tokens: Vec<&str> = raw.split_whitespace().collect();

        if tokens.is_empty() {
            first_blank.get_or_insert(line);
            continue;
        }
        if let Some(blank) = first_blank {
            return Err(error(blank, "blank line inside the data".to_string()));
        }

        let &[date, value] = tokens.as_slice() else {
            return Err(error(
                line,
                format!("expected 2 fields, got {}", tokens.len()),
            ));
        };
        let date = parse_date(date).ok_or_else(|| error(line, format!("invalid date {date:?}")))?;
        let value: f64 = value
            .parse()
            .map_err(|_| error(line, format!("invalid value {value:?}")))?;
        if value.is_infinite() {
            return Err(error(line, format!("non-finite value {value}")));
        }
        if let Some(first) = seen.insert(date, line) {
            return Err(error(
                line,
                format!("duplicate date {date} (first on line {first})"),
            ));
        }

        dates.push(date);
        values.push(if value.is_nan() { None } else { Some(value) });
    }

    let frame_error = |source: PolarsError| PipelineError::Frame {
        artifact: artifact.clone(),
        source,
    };
    tsv::series_frame(column, &dates, values)
        .and_then(|df| {
            df.lazy()
                .sort([tsv::DATE_COLUMN], SortMultipleOptions::default())
                .collect()
        })
        .map_err(frame_error)
}

/// Reads the raw artifact of one upstream task, writes the series as TSV.
pub struct ParseTask {
    id: TaskId,
    dependency: TaskId,
    output: ArtifactId,
    column: String,
}

impl ParseTask {
    pub fn new(
        id: impl Into<TaskId>,
        dependency: impl Into<TaskId>,
        output: impl Into<ArtifactId>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            dependency: dependency.into(),
            output: output.into(),
            column: column.into(),
        }
    }
}

#[async_trait]
impl Task for ParseTask {
    fn id(&self) -> TaskId {
        self.id.clone()
    }

    fn dependencies(&self) -> Vec<TaskId> {
        vec![self.dependency.clone()]
    }

    fn output(&self) -> ArtifactId {
        self.output.clone()
    }

    async fn run(&self, inputs: &[TaskInput]) -> Result<String, PipelineError> {
        let raw = &expect_inputs(&self.id, inputs, 1)?[0];
        let mut df = parse_raw(raw.artifact(), raw.content(), &self.column)?;
        tsv::write_frame(&mut df, &self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw() -> ArtifactId {
        ArtifactId::new("min_temps.csv")
    }

    fn values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
        df.column(column).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn skips_header_and_reads_both_date_forms() {
        let text = "date minT\n2020-01-01 99999.9\n20200102   10.0\n2020-01-03\t12.0\n\n";
        let df = parse_raw(&raw(), text, "min_temp").unwrap();

        assert_eq!(tsv::value_column(&df).unwrap().as_str(), "min_temp");
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(
            values(&df, "min_temp"),
            vec![Some(99999.9), Some(10.0), Some(12.0)]
        );
    }

    #[test]
    fn sorts_by_date_and_reads_nan_as_missing() {
        let text = "header\n2020-01-03 3.0\n2020-01-01 NaN\n2020-01-02 2.0\n";
        let df = parse_raw(&raw(), text, "v").unwrap();

        assert_eq!(values(&df, "v"), vec![None, Some(2.0), Some(3.0)]);
        assert_eq!(
            tsv::write_frame(&mut df.clone(), &raw()).unwrap(),
            "date\tv\n2020-01-01\t\n2020-01-02\t2.0\n2020-01-03\t3.0\n"
        );
    }

    #[test]
    fn header_only_is_empty() {
        assert_eq!(parse_raw(&raw(), "date minT\n", "v").unwrap().height(), 0);
    }

    #[rstest]
    #[case::one_token("h\n2020-01-01 1.0\n2020-01-02\n", 3)]
    #[case::three_tokens("h\n2020-01-01 1.0 2.0\n", 2)]
    #[case::bad_date("h\n2020-02-30 1.0\n", 2)]
    #[case::bad_value("h\n2020-01-01 warm\n", 2)]
    #[case::infinite("h\n2020-01-01 inf\n", 2)]
    #[case::inner_blank("h\n2020-01-01 1.0\n\n2020-01-02 2.0\n", 3)]
    #[case::duplicate("h\n2020-01-01 1.0\n2020-01-02 2.0\n2020-01-01 3.0\n", 4)]
    fn reports_failing_line(#[case] text: &str, #[case] expected_line: usize) {
        match parse_raw(&raw(), text, "v") {
            Err(PipelineError::Parse { line, artifact, .. }) => {
                assert_eq!(line, expected_line);
                assert_eq!(artifact, raw());
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn task_writes_tsv() {
        let task = ParseTask::new("import", "download", "min_temps.df", "min_temp");
        let inputs = [TaskInput::new(raw(), "date minT\n2020-01-02 10.0\n2020-01-01 NaN\n")];

        assert_eq!(task.dependencies(), vec![TaskId::new("download")]);
        assert_eq!(
            task.run(&inputs).await.unwrap(),
            "date\tmin_temp\n2020-01-01\t\n2020-01-02\t10.0\n"
        );
    }
}
