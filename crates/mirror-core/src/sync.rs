//! Sync and force-sync orchestration

use std::fmt;
use std::str::FromStr;

use mirror_fs::io;
use mirror_remote::RemoteRepository;
use serde::{Deserialize, Serialize};

use crate::engine::{Mirror, SyncRequest};
use crate::progress::SyncProgress;
use crate::pull::PullReport;
use crate::push::PushReport;
use crate::{Error, Result};

/// Outcome of a pull followed by a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub pull: PullReport,
    pub push: PushReport,
}

/// Which side wins a force-sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceMode {
    /// Local folder becomes an exact copy of the remote branch
    Remote,
    /// Remote branch receives every local change
    Local,
}

impl fmt::Display for ForceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Local => f.write_str("local"),
        }
    }
}

impl FromStr for ForceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => Err(Error::Configuration {
                message: format!("unknown force mode '{other}', expected 'remote' or 'local'"),
            }),
        }
    }
}

/// Outcome of a force-sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ForceReport {
    Remote {
        /// Entries the wipe could not remove
        wipe_failures: usize,
        pull: PullReport,
    },
    Local { push: PushReport },
}

impl<R: RemoteRepository> Mirror<R> {
    /// Pull, then push local changes, against one resolved location.
    ///
    /// A failed pull stops before anything is pushed.
    pub async fn sync(&self, request: &SyncRequest<'_>) -> Result<SyncReport> {
        let location = self.locate(request).await?;
        let message = self.commit_message(request);

        request.report(SyncProgress::PullPhase);
        let pull = self.pull_into(&location, request).await?;

        request.report(SyncProgress::PushPhase);
        let push = self.push_from(&location, &message, request).await?;

        request.report(SyncProgress::Done);
        Ok(SyncReport { pull, push })
    }

    /// Sync a reference with every default: resolved branch, default folder
    /// and the configured commit message.
    pub async fn smart_sync(&self, reference: &str) -> Result<SyncReport> {
        self.sync(&SyncRequest::new(reference)).await
    }

    /// Destructive sync where one side overwrites the other.
    ///
    /// Callers are expected to have confirmed the operation.
    pub async fn force_sync(&self, request: &SyncRequest<'_>, mode: ForceMode) -> Result<ForceReport> {
        let report = match mode {
            ForceMode::Remote => {
                let (wipe_failures, pull) = self.wipe_and_pull(request).await?;
                ForceReport::Remote {
                    wipe_failures,
                    pull,
                }
            }
            ForceMode::Local => ForceReport::Local {
                push: self.push_with_force_message(request).await?,
            },
        };
        request.report(SyncProgress::Done);
        Ok(report)
    }

    /// Local folder becomes a mirror of the remote branch.
    pub async fn force_remote(&self, request: &SyncRequest<'_>) -> Result<PullReport> {
        let (_, pull) = self.wipe_and_pull(request).await?;
        request.report(SyncProgress::Done);
        Ok(pull)
    }

    /// Remote branch receives every local change under the force-push message.
    pub async fn force_local(&self, request: &SyncRequest<'_>) -> Result<PushReport> {
        let push = self.push_with_force_message(request).await?;
        request.report(SyncProgress::Done);
        Ok(push)
    }

    async fn wipe_and_pull(&self, request: &SyncRequest<'_>) -> Result<(usize, PullReport)> {
        let location = self.locate(request).await?;
        let root = &location.local_path;

        request.report(SyncProgress::Clearing);
        let wipe_failures = if root.is_dir() {
            io::clear_directory(root)
        } else {
            0
        };
        if wipe_failures > 0 {
            tracing::warn!(path = %root, failures = wipe_failures, "Local folder only partly cleared");
        }

        request.report(SyncProgress::PullPhase);
        let pull = self.pull_into(&location, request).await?;
        tracing::info!(path = %root, branch = %location.branch, "Replaced local folder with remote snapshot");
        Ok((wipe_failures, pull))
    }

    async fn push_with_force_message(&self, request: &SyncRequest<'_>) -> Result<PushReport> {
        let location = self.locate(request).await?;
        request.report(SyncProgress::PushPhase);
        let message = &self.config.sync.force_push_message;
        let push = self.push_from(&location, message, request).await?;
        tracing::info!(path = %location.local_path, branch = %location.branch, "Force-pushed local folder");
        Ok(push)
    }
}
