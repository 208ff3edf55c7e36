//! Pipeline stages and the temperature graph.
//!
//! Each stage is a function over a polars `DataFrame` keyed by `date` plus a
//! [`Task`](crate::task::Task) wrapper that reads its inputs from and writes
//! its output to tab-separated artifacts.
//!
//! - **fetch**: raw text from a URL, written line by line
//! - **parse**: raw whitespace-delimited text into a dated series
//! - **clean**: sentinel removal and linear interpolation
//! - **scale**: median/IQR robust scaling
//! - **combine**: inner join of two series on date
//! - **temperature**: the nine-task min/max temperature graph

pub mod clean;
pub mod combine;
pub mod fetch;
pub mod parse;
pub mod scale;
pub mod temperature;
pub mod tsv;

use polars::prelude::{DataFrame, PolarsResult};

use crate::domain::{ArtifactId, PipelineError, TaskId, TaskInput};

pub use self::clean::{CleanTask, clean};
pub use self::combine::{CombineTask, combine};
pub use self::fetch::{FetchTask, to_lines};
pub use self::parse::{ParseTask, parse_raw};
pub use self::scale::{ScaleTask, scale};
pub use self::temperature::temperature_pipeline;

/// Fails with `InputArity` unless exactly `expected` inputs were supplied.
pub(crate) fn expect_inputs<'a>(
    task: &TaskId,
    inputs: &'a [TaskInput],
    expected: usize,
) -> Result<&'a [TaskInput], PipelineError> {
    if inputs.len() != expected {
        return Err(PipelineError::InputArity {
            task: task.clone(),
            expected,
            actual: inputs.len(),
        });
    }
    Ok(inputs)
}

/// Read the single series input, apply `f`, and render the result as TSV.
pub(crate) fn map_series(
    task: &TaskId,
    inputs: &[TaskInput],
    output: &ArtifactId,
    f: impl FnOnce(&DataFrame) -> PolarsResult<DataFrame>,
) -> Result<String, PipelineError> {
    let input = &expect_inputs(task, inputs, 1)?[0];
    let df = tsv::read_series(input.content()).map_err(|e| e.into_parse(input.artifact()))?;
    let mut out = f(&df).map_err(|source| PipelineError::Frame {
        artifact: output.clone(),
        source,
    })?;
    tsv::write_frame(&mut out, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_names_the_task() {
        let inputs = vec![TaskInput::new(ArtifactId::new("a"), "x")];
        let err = expect_inputs(&TaskId::new("combine_temps"), &inputs, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "task combine_temps expected 2 input(s), got 1"
        );
        assert!(expect_inputs(&TaskId::new("t"), &inputs, 1).is_ok());
    }
}
