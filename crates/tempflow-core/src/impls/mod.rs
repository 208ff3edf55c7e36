//! Implementations of the ports.
//!
//! - **LocalArtifactStore**: one file per artifact, temp-then-rename writes
//! - **HttpFetcher**: `reqwest` GET with a timeout
//! - **InMemoryArtifactStore** / **StaticFetcher**: in-process variants for tests

pub mod fs_store;
pub mod http_fetcher;
pub mod inmem_store;
pub mod static_fetcher;

pub use self::fs_store::LocalArtifactStore;
pub use self::http_fetcher::HttpFetcher;
pub use self::inmem_store::InMemoryArtifactStore;
pub use self::static_fetcher::StaticFetcher;
