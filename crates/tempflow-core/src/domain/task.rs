use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a task inside a graph (e.g. `clean_min_temps`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name of an artifact in the flat artifact namespace (e.g. `clean_min_temps.df`).
///
/// Whether a name is acceptable is up to the store; the local store rejects
/// anything that is not a plain file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ArtifactId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Content of one dependency artifact, handed to a task when it runs.
///
/// Inputs arrive in the order the task declared its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    artifact: ArtifactId,
    content: String,
}

impl TaskInput {
    pub fn new(artifact: ArtifactId, content: impl Into<String>) -> Self {
        Self {
            artifact,
            content: content.into(),
        }
    }

    pub fn artifact(&self) -> &ArtifactId {
        &self.artifact
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
