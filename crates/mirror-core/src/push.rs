//! Tree-based push
//!
//! Local changes become one commit: the detected paths are applied on top
//! of the branch's current root tree, committed with the current tip as
//! parent, and the branch ref is moved last. Nothing is sent when there is
//! nothing to push.

use mirror_fs::{NormalizedPath, compute_content_checksum, io};
use mirror_remote::{RemoteRepository, TreeEntry};
use serde::Serialize;

use crate::Result;
use crate::detect::{FileChange, FileStatus, diff_tree};
use crate::engine::{Mirror, SyncRequest};
use crate::locator::RepoLocation;
use crate::manifest::SyncManifest;
use crate::progress::SyncProgress;

/// Outcome of a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushReport {
    /// New branch tip; `None` when there was nothing to push
    pub commit: Option<String>,
    pub changes: Vec<FileChange>,
}

impl PushReport {
    pub fn is_noop(&self) -> bool {
        self.commit.is_none()
    }
}

impl<R: RemoteRepository> Mirror<R> {
    /// Upload local changes as a new commit on the remote branch.
    ///
    /// Uses the request's message, else the configured commit message.
    pub async fn push(&self, request: &SyncRequest<'_>) -> Result<PushReport> {
        let location = self.locate(request).await?;
        let message = self.commit_message(request);
        let report = self.push_from(&location, &message, request).await?;
        request.report(SyncProgress::Done);
        Ok(report)
    }

    /// Push from an already resolved location.
    pub async fn push_from(
        &self,
        location: &RepoLocation,
        message: &str,
        request: &SyncRequest<'_>,
    ) -> Result<PushReport> {
        let root = &location.local_path;
        let branch = location.branch.as_str();

        request.report(SyncProgress::DetectingChanges);
        let manifest = SyncManifest::load(root, branch);
        let changes = diff_tree(root, &manifest);
        if changes.is_empty() {
            tracing::info!(path = %root, branch, "Nothing to push");
            return Ok(PushReport {
                commit: None,
                changes,
            });
        }

        let slug = location.slug();
        let parent = self.remote.ref_head(&slug, branch).await?;
        let base_tree = self.remote.commit_tree(&slug, &parent).await?;

        request.report(SyncProgress::Uploading {
            changes: changes.len(),
        });
        let mut entries = Vec::with_capacity(changes.len());
        for change in &changes {
            if change.status == FileStatus::Deleted {
                entries.push(TreeEntry::delete(&change.path));
                continue;
            }

            let bytes = io::read_bytes(&root.join(&change.path))?;
            match String::from_utf8(bytes) {
                Ok(text) => entries.push(TreeEntry::content(&change.path, text)),
                Err(e) => {
                    let blob = self.remote.create_blob(&slug, e.as_bytes()).await?;
                    tracing::debug!(path = %change.path, blob = %blob, "Uploaded binary blob");
                    entries.push(TreeEntry::blob(&change.path, blob));
                }
            }
        }

        request.report(SyncProgress::Committing);
        let tree = self.remote.create_tree(&slug, &base_tree, &entries).await?;
        let commit = self
            .remote
            .create_commit(&slug, message, &tree, std::slice::from_ref(&parent))
            .await?;

        request.report(SyncProgress::UpdatingRef);
        self.remote.update_ref(&slug, branch, &commit).await?;

        request.report(SyncProgress::Saving);
        if let Err(e) = record_push(root, branch, manifest, &changes, &commit) {
            tracing::warn!(
                repository = %slug,
                branch,
                commit = %commit,
                error = %e,
                "Remote advanced but local manifest is stale; pull before the next push"
            );
            return Err(e);
        }

        tracing::info!(
            repository = %slug,
            branch,
            commit = %commit,
            changes = changes.len(),
            "Pushed local changes"
        );
        Ok(PushReport {
            commit: Some(commit),
            changes,
        })
    }
}

/// Fold a pushed change list into the manifest and persist it.
fn record_push(
    root: &NormalizedPath,
    branch: &str,
    mut manifest: SyncManifest,
    changes: &[FileChange],
    commit: &str,
) -> Result<()> {
    for change in changes {
        if change.status == FileStatus::Deleted {
            manifest.files.remove(&change.path);
        } else {
            let bytes = io::read_bytes(&root.join(&change.path))?;
            manifest
                .files
                .insert(change.path.clone(), compute_content_checksum(&bytes));
        }
    }
    manifest.revision = commit.to_string();
    manifest.save(root, branch)
}
