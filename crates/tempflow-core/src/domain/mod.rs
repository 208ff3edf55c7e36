//! Domain model (IDs, names, errors, reports).

pub mod errors;
pub mod ids;
pub mod report;
pub mod task;

pub use errors::{ErrorKind, PipelineError};
pub use ids::RunId;
pub use report::RunReport;
pub use task::{ArtifactId, TaskId, TaskInput};
