//! Remote repository service client for Repository Mirror
//!
//! Exposes the [`RemoteRepository`] seam the sync engine drives, a GitHub
//! REST implementation of it, and in-memory snapshot unpacking.

pub mod archive;
pub mod error;
pub mod github;
pub mod provider;
pub mod types;

pub use archive::{SnapshotEntry, unpack_snapshot};
pub use error::{Error, Result};
pub use github::{DEFAULT_API_BASE, DEFAULT_ARCHIVE_BASE, GitHubRemote, GitHubSettings};
pub use provider::RemoteRepository;
pub use types::{RepoSlug, TreeChange, TreeEntry};
