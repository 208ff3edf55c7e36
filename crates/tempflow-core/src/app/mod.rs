//! App - wires tasks, graph and ports together.
//!
//! # Components
//! - **PipelineBuilder**: registration and fail-fast validation of a graph
//! - **Scheduler**: planning and sequential execution against a store
//! - **artifact_status**: read-only view of which artifacts exist

pub mod builder;
pub mod scheduler;
pub mod status;

pub use self::builder::PipelineBuilder;
pub use self::scheduler::Scheduler;
pub use self::status::{ArtifactStatus, artifact_status};
