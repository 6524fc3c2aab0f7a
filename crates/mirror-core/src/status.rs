//! Read-only comparison of local and remote state

use mirror_remote::RemoteRepository;
use serde::Serialize;

use crate::Result;
use crate::detect::{FileChange, diff_tree};
use crate::engine::{Mirror, SyncRequest};
use crate::manifest::SyncManifest;

/// Where a local folder stands relative to its remote branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub remote_revision: String,
    pub local_revision: String,
    /// Remote tip differs from the revision last synced
    pub is_ahead: bool,
    /// Local files differ from the manifest
    pub is_dirty: bool,
    pub changes: Vec<FileChange>,
}

/// Operation that brings a folder back in step with its branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendedAction {
    UpToDate,
    Pull,
    Push,
    Sync,
}

impl SyncStatus {
    pub fn new(remote_revision: String, manifest: &SyncManifest, changes: Vec<FileChange>) -> Self {
        Self {
            is_ahead: remote_revision != manifest.revision,
            is_dirty: !changes.is_empty(),
            remote_revision,
            local_revision: manifest.revision.clone(),
            changes,
        }
    }

    /// Action to take next.
    ///
    /// A push interrupted between the ref update and the manifest save shows
    /// up as ahead and dirty. If the caller knows that happened, force-sync
    /// from the remote rather than following this recommendation.
    pub fn recommended_action(&self) -> RecommendedAction {
        match (self.is_ahead, self.is_dirty) {
            (false, false) => RecommendedAction::UpToDate,
            (true, false) => RecommendedAction::Pull,
            (false, true) => RecommendedAction::Push,
            (true, true) => RecommendedAction::Sync,
        }
    }
}

impl<R: RemoteRepository> Mirror<R> {
    /// Compare the remote tip, the manifest and the local tree without changing anything.
    pub async fn fetch_status(&self, request: &SyncRequest<'_>) -> Result<SyncStatus> {
        let location = self.locate(request).await?;
        let remote_revision = self
            .remote
            .ref_head(&location.slug(), &location.branch)
            .await?;
        let manifest = SyncManifest::load(&location.local_path, &location.branch);
        let changes = diff_tree(&location.local_path, &manifest);

        Ok(SyncStatus::new(remote_revision, &manifest, changes))
    }
}
