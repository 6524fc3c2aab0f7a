//! Sync engine for Repository Mirror
//!
//! Keeps a local folder and a remote branch consistent without a full
//! version-control client:
//!
//! - **Manifest**: last synced revision and per-file digests, stored under `.git/`
//! - **Change detection**: local edits found by content hash
//! - **Pull**: snapshot download, write, prune
//! - **Push**: partial tree, commit, ref update
//! - **Sync / force-sync / status**: orchestration over pull and push
//! - **Scheduling**: cron matching, periodic tasks and missed-run detection
//!
//! # Architecture
//!
//! ```text
//!                mirror-cli
//!                    |
//!               mirror-core
//!                    |
//!          +---------+---------+
//!          |                   |
//!      mirror-fs         mirror-remote
//! ```

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod locator;
pub mod locks;
pub mod manifest;
pub mod progress;
pub mod pull;
pub mod push;
pub mod schedule;
pub mod status;
pub mod sync;

pub use config::{ConfigResolver, MirrorConfig, PathsConfig, RemoteConfig, RepoEntry, SyncConfig};
pub use detect::{FileChange, FileStatus, detect_changes, diff_tree, scan_tree};
pub use engine::{Mirror, SyncRequest};
pub use error::{Error, ErrorKind, Result};
pub use locator::{ParsedReference, RepoLocation, default_local_path, parse_reference, resolve};
pub use locks::OperationLocks;
pub use manifest::{SyncManifest, current_branch};
pub use progress::{ProgressFn, SyncProgress};
pub use pull::PullReport;
pub use push::PushReport;
pub use schedule::{
    CronExpression, Scheduler, cron_matches, should_have_run_between, should_have_run_since,
};
pub use status::{RecommendedAction, SyncStatus};
pub use sync::{ForceMode, ForceReport, SyncReport};
