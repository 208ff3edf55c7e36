//! Combine stage: inner join of two series on date.

use async_trait::async_trait;
use polars::prelude::*;

use super::{expect_inputs, tsv};
use crate::domain::{ArtifactId, PipelineError, TaskId, TaskInput};
use crate::task::Task;

/// Join `left` and `right` on date, keeping only dates present in both.
///
/// Columns are `date, <left name>, <right name>`, so the two names must
/// differ and neither may be `date`. `artifact` names the output in errors.
pub fn combine(
    left: &DataFrame,
    right: &DataFrame,
    artifact: &ArtifactId,
) -> Result<DataFrame, PipelineError> {
    let join_error = |message: String| PipelineError::Join {
        artifact: artifact.clone(),
        message,
    };
    let left_name = tsv::value_column(left).map_err(|e| join_error(e.to_string()))?;
    let right_name = tsv::value_column(right).map_err(|e| join_error(e.to_string()))?;
    if left_name == right_name {
        return Err(join_error(format!(
            "both inputs use the column name {left_name:?}"
        )));
    }

    left.clone()
        .lazy()
        .join(
            right.clone().lazy(),
            [col(tsv::DATE_COLUMN)],
            [col(tsv::DATE_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([tsv::DATE_COLUMN], SortMultipleOptions::default())
        .collect()
        .map_err(|e| join_error(e.to_string()))
}

/// Joins the artifacts of two upstream tasks; the first dependency supplies
/// the left column.
pub struct CombineTask {
    id: TaskId,
    left: TaskId,
    right: TaskId,
    output: ArtifactId,
}

impl CombineTask {
    pub fn new(
        id: impl Into<TaskId>,
        left: impl Into<TaskId>,
        right: impl Into<TaskId>,
        output: impl Into<ArtifactId>,
    ) -> Self {
        Self {
            id: id.into(),
            left: left.into(),
            right: right.into(),
            output: output.into(),
        }
    }
}

#[async_trait]
impl Task for CombineTask {
    fn id(&self) -> TaskId {
        self.id.clone()
    }

    fn dependencies(&self) -> Vec<TaskId> {
        vec![self.left.clone(), self.right.clone()]
    }

    fn output(&self) -> ArtifactId {
        self.output.clone()
    }

    async fn run(&self, inputs: &[TaskInput]) -> Result<String, PipelineError> {
        let inputs = expect_inputs(&self.id, inputs, 2)?;
        let read = |input: &TaskInput| {
            tsv::read_series(input.content()).map_err(|e| e.into_join(input.artifact()))
        };
        let left = read(&inputs[0])?;
        let right = read(&inputs[1])?;

        let mut table = combine(&left, &right, &self.output)?;
        tsv::write_frame(&mut table, &self.output)
    }
}
