//! Pipeline errors and their classification.

use std::path::PathBuf;

use thiserror::Error;

use super::task::{ArtifactId, TaskId};

/// Operational classification of a [`PipelineError`].
///
/// Every error is fatal to the run; the kind only tells the operator where to
/// look (remote feed, input data, graph wiring, disk, configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Parse,
    Join,
    Cycle,
    DependencyFailure,
    Graph,
    Storage,
    Config,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetching {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{artifact} line {line}: {message}")]
    Parse {
        artifact: ArtifactId,
        line: usize,
        message: String,
    },

    #[error("cannot join {artifact}: {message}")]
    Join {
        artifact: ArtifactId,
        message: String,
    },

    #[error("dependency cycle: {}", join_ids(.cycle, " -> "))]
    Cycle { cycle: Vec<TaskId> },

    #[error("task {failed} failed; aborted dependent task(s): {}", join_ids(.aborted, ", "))]
    DependencyFailure {
        failed: TaskId,
        aborted: Vec<TaskId>,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("task {0} is registered more than once")]
    DuplicateTask(TaskId),

    #[error("artifact {artifact} is produced by both {first} and {second}")]
    DuplicateArtifact {
        artifact: ArtifactId,
        first: TaskId,
        second: TaskId,
    },

    #[error("task {task} depends on unregistered task {dependency}")]
    MissingDependency { task: TaskId, dependency: TaskId },

    #[error("task {task} expected {expected} input(s), got {actual}")]
    InputArity {
        task: TaskId,
        expected: usize,
        actual: usize,
    },

    #[error("artifact {0} does not exist")]
    ArtifactMissing(ArtifactId),

    #[error("artifact {0} already exists and artifacts are never overwritten")]
    ArtifactExists(ArtifactId),

    #[error("invalid artifact name {0:?}")]
    InvalidArtifactName(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data frame error in {artifact}: {source}")]
    Frame {
        artifact: ArtifactId,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Network { .. } => ErrorKind::Network,
            PipelineError::Parse { .. }
            | PipelineError::InputArity { .. }
            | PipelineError::Frame { .. } => ErrorKind::Parse,
            PipelineError::Join { .. } => ErrorKind::Join,
            PipelineError::Cycle { .. } => ErrorKind::Cycle,
            PipelineError::DependencyFailure { .. } => ErrorKind::DependencyFailure,
            PipelineError::UnknownTask(_)
            | PipelineError::DuplicateTask(_)
            | PipelineError::DuplicateArtifact { .. }
            | PipelineError::MissingDependency { .. } => ErrorKind::Graph,
            PipelineError::ArtifactMissing(_)
            | PipelineError::ArtifactExists(_)
            | PipelineError::InvalidArtifactName(_)
            | PipelineError::Io { .. } => ErrorKind::Storage,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }

    /// The error that started it all, looking through `DependencyFailure` wrappers.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::DependencyFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn join_ids(ids: &[TaskId], sep: &str) -> String {
    ids.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_the_path() {
        let err = PipelineError::Cycle {
            cycle: vec![TaskId::new("a"), TaskId::new("b"), TaskId::new("a")],
        };
        assert_eq!(err.to_string(), "dependency cycle: a -> b -> a");
        assert_eq!(err.kind(), ErrorKind::Cycle);
    }

    #[test]
    fn dependency_failure_keeps_the_cause() {
        let cause = PipelineError::Network {
            url: "http://example.invalid".into(),
            message: "HTTP 503".into(),
        };
        let err = PipelineError::DependencyFailure {
            failed: TaskId::new("download"),
            aborted: vec![TaskId::new("import"), TaskId::new("clean")],
            source: Box::new(cause),
        };

        assert_eq!(
            err.to_string(),
            "task download failed; aborted dependent task(s): import, clean"
        );
        assert_eq!(err.kind(), ErrorKind::DependencyFailure);
        assert_eq!(err.root_cause().kind(), ErrorKind::Network);

        let source = std::error::Error::source(&err).expect("source is chained");
        assert!(source.to_string().contains("HTTP 503"));
    }
}
