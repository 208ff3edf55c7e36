//! Ports - abstraction layer
//!
//! Each trait is the seam to something outside the pipeline: where artifacts
//! live and where raw series come from. Implementations live in `impls`.

pub mod artifact_store;
pub mod fetcher;

pub use self::artifact_store::ArtifactStore;
pub use self::fetcher::Fetcher;
