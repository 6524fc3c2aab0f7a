//! Filesystem layer for Repository Mirror
//!
//! Provides normalized paths, content checksums, atomic I/O and
//! format-agnostic configuration files for the sync engine.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum};
pub use config::ConfigStore;
pub use constants::MirrorPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
