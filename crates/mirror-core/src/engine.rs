//! Mirror engine entry point
//!
//! [`Mirror`] owns the remote client and configuration; pull, push, sync and
//! status are implemented on it in their own modules. Every operation takes
//! a [`SyncRequest`] naming the repository and optional overrides.

use mirror_fs::NormalizedPath;
use mirror_remote::RemoteRepository;

use crate::Result;
use crate::config::MirrorConfig;
use crate::detect::{FileChange, detect_changes};
use crate::locator::{RepoLocation, resolve_with_branch};
use crate::progress::{ProgressFn, SyncProgress};

/// Inputs shared by every engine operation.
#[derive(Clone)]
pub struct SyncRequest<'a> {
    pub reference: String,
    pub local_path: Option<NormalizedPath>,
    pub branch: Option<String>,
    pub message: Option<String>,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> SyncRequest<'a> {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            local_path: None,
            branch: None,
            message: None,
            progress: None,
        }
    }

    pub fn local_path(mut self, path: impl Into<NormalizedPath>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub(crate) fn report(&self, event: SyncProgress) {
        if let Some(progress) = self.progress {
            progress(&event);
        }
    }
}

impl std::fmt::Debug for SyncRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRequest")
            .field("reference", &self.reference)
            .field("local_path", &self.local_path)
            .field("branch", &self.branch)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Sync engine bound to one remote service.
///
/// Operations on the same local path and branch must not overlap; see
/// [`crate::locks::OperationLocks`].
#[derive(Debug)]
pub struct Mirror<R> {
    pub(crate) remote: R,
    pub(crate) config: MirrorConfig,
}

impl<R: RemoteRepository> Mirror<R> {
    pub fn new(remote: R, config: MirrorConfig) -> Self {
        Self { remote, config }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Resolve the request's reference, honouring its branch and path overrides.
    pub async fn locate(&self, request: &SyncRequest<'_>) -> Result<RepoLocation> {
        request.report(SyncProgress::Resolving);
        resolve_with_branch(
            &self.remote,
            &self.config,
            &request.reference,
            request.local_path.as_ref(),
            request.branch.as_deref(),
        )
        .await
    }

    /// Local changes since the last sync of `location`.
    pub fn changes(&self, location: &RepoLocation) -> Vec<FileChange> {
        detect_changes(&location.local_path, &location.branch)
    }

    pub(crate) fn commit_message(&self, request: &SyncRequest<'_>) -> String {
        request
            .message
            .clone()
            .unwrap_or_else(|| self.config.sync.commit_message.clone())
    }
}
