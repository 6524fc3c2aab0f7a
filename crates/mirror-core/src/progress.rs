//! Progress events emitted while an operation runs

use std::fmt;

/// A step reached by a pull, push or force-sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncProgress {
    Resolving,
    FetchingRevision,
    Downloading,
    Extracting,
    Writing { done: usize, total: usize },
    Pruning,
    Saving,
    DetectingChanges,
    Uploading { changes: usize },
    Committing,
    UpdatingRef,
    Clearing,
    PullPhase,
    PushPhase,
    Done,
}

/// Callback receiving [`SyncProgress`] events.
pub type ProgressFn<'a> = &'a (dyn Fn(&SyncProgress) + Send + Sync);

impl fmt::Display for SyncProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolving => f.write_str("Resolving repository"),
            Self::FetchingRevision => f.write_str("Fetching remote revision"),
            Self::Downloading => f.write_str("Downloading snapshot"),
            Self::Extracting => f.write_str("Extracting"),
            Self::Writing { done, total } => {
                let percent = if *total == 0 { 100 } else { done * 100 / total };
                write!(f, "Writing files {done}/{total} ({percent}%)")
            }
            Self::Pruning => f.write_str("Pruning"),
            Self::Saving => f.write_str("Saving manifest"),
            Self::DetectingChanges => f.write_str("Detecting local changes"),
            Self::Uploading { changes } => write!(f, "Uploading {changes} change(s)"),
            Self::Committing => f.write_str("Creating commit"),
            Self::UpdatingRef => f.write_str("Updating branch"),
            Self::Clearing => f.write_str("Cleaning local folder"),
            Self::PullPhase => f.write_str("Syncing from remote"),
            Self::PushPhase => f.write_str("Syncing to remote"),
            Self::Done => f.write_str("Done"),
        }
    }
}
