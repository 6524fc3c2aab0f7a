//! Shared test utilities for the repository-mirror workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`remote`]: [`FakeRemote`], an in-memory remote repository service
//! - [`snapshot`]: zip archives shaped like branch snapshots
//! - [`tree`]: [`TestTree`], a temporary local folder with assertions

pub mod remote;
pub mod snapshot;
pub mod tree;

pub use remote::{FakeRemote, RemoteCall};
pub use snapshot::build_snapshot_zip;
pub use tree::TestTree;
