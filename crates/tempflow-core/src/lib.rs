//! tempflow-core
//!
//! Building blocks for the tempflow batch pipeline.
//!
//! # Modules
//! - **domain**: domain model (ids, task/artifact names, errors, run report)
//! - **ports**: abstraction layer (ArtifactStore, Fetcher)
//! - **impls**: implementations (local directory store, HTTP fetcher, in-memory variants)
//! - **task**: the `Task` trait and the task registry
//! - **graph**: dependency graph and the validated `TaskGraph`
//! - **app**: pipeline builder, scheduler, artifact status view
//! - **pipeline**: the stages (fetch, parse, clean, scale, combine) and the temperature graph
//! - **config**: pipeline configuration

pub mod app;
pub mod config;
pub mod domain;
pub mod graph;
pub mod impls;
pub mod pipeline;
pub mod ports;
pub mod task;

pub use app::{PipelineBuilder, Scheduler};
pub use config::PipelineConfig;
pub use domain::{ArtifactId, PipelineError, RunReport, TaskId};
pub use graph::TaskGraph;
