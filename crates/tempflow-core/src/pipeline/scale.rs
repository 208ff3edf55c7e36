//! Scale stage: robust scaling by median and interquartile range.

use async_trait::async_trait;
use polars::prelude::*;

use super::{map_series, tsv};
use crate::domain::{ArtifactId, PipelineError, TaskId, TaskInput};
use crate::task::Task;

/// Median and IQR of the present values, if there are any.
///
/// Quartiles interpolate linearly between the closest ranks.
pub fn median_iqr(df: &DataFrame) -> PolarsResult<Option<(f64, f64)>> {
    let name = tsv::value_column(df)?;
    let value = name.as_str();
    let stats = df
        .clone()
        .lazy()
        .select([
            col(value).median().alias("median"),
            col(value)
                .quantile(lit(0.25), QuantileMethod::Linear)
                .alias("q1"),
            col(value)
                .quantile(lit(0.75), QuantileMethod::Linear)
                .alias("q3"),
        ])
        .collect()?;

    let get = |stat: &str| -> PolarsResult<Option<f64>> {
        Ok(stats.column(stat)?.cast(&DataType::Float64)?.f64()?.get(0))
    };
    Ok(match (get("median")?, get("q1")?, get("q3")?) {
        (Some(median), Some(q1), Some(q3)) => Some((median, q3 - q1)),
        _ => None,
    })
}

/// `(value - median) / IQR` for every present value.
///
/// A frame with no present value or a zero IQR is returned unchanged.
pub fn scale(df: &DataFrame) -> PolarsResult<DataFrame> {
    let (median, iqr) = match median_iqr(df)? {
        Some((median, iqr)) if iqr != 0.0 && iqr.is_finite() => (median, iqr),
        _ => return Ok(df.clone()),
    };
    let name = tsv::value_column(df)?;
    let value = name.as_str();
    df.clone()
        .lazy()
        .with_column(((col(value) - lit(median)) / lit(iqr)).alias(value))
        .collect()
}

pub struct ScaleTask {
    id: TaskId,
    dependency: TaskId,
    output: ArtifactId,
}

impl ScaleTask {
    pub fn new(
        id: impl Into<TaskId>,
        dependency: impl Into<TaskId>,
        output: impl Into<ArtifactId>,
    ) -> Self {
        Self {
            id: id.into(),
            dependency: dependency.into(),
            output: output.into(),
        }
    }
}

#[async_trait]
impl Task for ScaleTask {
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
        map_series(&self.id, inputs, &self.output, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use rstest::rstest;

    fn frame(values: &[Option<f64>]) -> DataFrame {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..values.len())
            .map(|i| start + Days::new(i as u64))
            .collect();
        tsv::series_frame("v", &dates, values.to_vec()).unwrap()
    }

    fn present(values: &[f64]) -> DataFrame {
        frame(&values.iter().copied().map(Some).collect::<Vec<_>>())
    }

    #[rstest]
    #[case::odd(&[1.0, 2.0, 3.0], 2.0, 1.0)]
    #[case::even(&[10.0, 12.0], 11.0, 1.0)]
    #[case::single(&[4.0], 4.0, 0.0)]
    #[case::between_ranks(&[1.0, 2.0, 3.0, 4.0], 2.5, 1.5)]
    fn quartiles_interpolate_between_ranks(
        #[case] values: &[f64],
        #[case] median: f64,
        #[case] iqr: f64,
    ) {
        assert_eq!(median_iqr(&present(values)).unwrap(), Some((median, iqr)));
    }

    #[test]
    fn scales_and_keeps_missing() {
        let df = scale(&frame(&[None, Some(10.0), Some(12.0)])).unwrap();
        let values: Vec<Option<f64>> = df.column("v").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![None, Some(-1.0), Some(1.0)]);
    }

    #[test]
    fn scaled_series_has_zero_median_and_unit_iqr() {
        let df = scale(&frame(&[
            Some(3.0),
            Some(-2.0),
            Some(8.5),
            None,
            Some(1.0),
            Some(4.0),
        ]))
        .unwrap();
        let (median, iqr) = median_iqr(&df).unwrap().unwrap();
        assert!(median.abs() < 1e-12);
        assert!((iqr - 1.0).abs() < 1e-12);
    }

    #[rstest]
    #[case::constant(&[Some(5.0), Some(5.0), Some(5.0)])]
    #[case::empty(&[])]
    #[case::all_missing(&[None, None])]
    fn degenerate_input_is_unchanged(#[case] values: &[Option<f64>]) {
        let df = frame(values);
        assert!(scale(&df).unwrap().equals_missing(&df));
    }

    #[tokio::test]
    async fn task_reads_and_writes_tsv() {
        let task = ScaleTask::new("scale", "clean", "scaled.df");
        let inputs = [TaskInput::new(
            ArtifactId::new("clean.df"),
            "date\tmax_temp\n2020-01-01\t20.0\n2020-01-02\t22.0\n2020-01-03\t24.0\n",
        )];

        assert_eq!(
            task.run(&inputs).await.unwrap(),
            "date\tmax_temp\n2020-01-01\t-1.0\n2020-01-02\t0.0\n2020-01-03\t1.0\n"
        );
    }
}
