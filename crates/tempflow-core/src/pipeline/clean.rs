//! Clean stage: sentinel replacement and linear interpolation.

use async_trait::async_trait;
use polars::prelude::*;

use super::{map_series, tsv};
use crate::domain::{ArtifactId, PipelineError, TaskId, TaskInput};
use crate::task::Task;

/// Reserved reading that stands for "no measurement".
pub const DEFAULT_SENTINEL: f64 = 99999.9;

/// Replace `sentinel` with missing, then fill gaps by linear interpolation.
///
/// A gap is filled from its nearest known neighbours, weighted by row
/// position. Gaps before the first or after the last known value stay
/// missing. Dates and row count are unchanged.
pub fn clean(df: &DataFrame, sentinel: f64) -> PolarsResult<DataFrame> {
    let name = tsv::value_column(df)?;
    let value = name.as_str();
    df.clone()
        .lazy()
        .with_column(
            when(col(value).eq(lit(sentinel)))
                .then(lit(NULL))
                .otherwise(col(value))
                .cast(DataType::Float64)
                .interpolate(InterpolationMethod::Linear)
                .alias(value),
        )
        .collect()
}

pub struct CleanTask {
    id: TaskId,
    dependency: TaskId,
    output: ArtifactId,
    sentinel: f64,
}

impl CleanTask {
    pub fn new(
        id: impl Into<TaskId>,
        dependency: impl Into<TaskId>,
        output: impl Into<ArtifactId>,
        sentinel: f64,
    ) -> Self {
        Self {
            id: id.into(),
            dependency: dependency.into(),
            output: output.into(),
            sentinel,
        }
    }
}

#[async_trait]
impl Task for CleanTask {
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
        map_series(&self.id, inputs, &self.output, |df| clean(df, self.sentinel))
    }
}
