//! Snapshot pull with pruning
//!
//! A pull downloads the whole branch as an archive, writes every file it
//! contains, then deletes files the previous manifest tracked that the
//! snapshot no longer has. Files never tracked are left alone. The manifest
//! only advances once every write has succeeded.
//!
//! A tracked file that became a directory upstream (or the reverse) is
//! pruned before the writes, since the new entry cannot land while it exists.

use std::collections::{BTreeMap, BTreeSet};

use mirror_fs::{NormalizedPath, compute_content_checksum, io};
use mirror_remote::{RemoteRepository, unpack_snapshot};
use serde::Serialize;

use crate::Result;
use crate::engine::{Mirror, SyncRequest};
use crate::locator::RepoLocation;
use crate::manifest::SyncManifest;
use crate::progress::SyncProgress;

const PROGRESS_EVERY: usize = 10;

/// Outcome of a successful pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullReport {
    /// Revision now recorded in the manifest
    pub revision: String,
    /// Files written from the snapshot
    pub written: usize,
    /// Previously tracked paths removed locally
    pub pruned: Vec<String>,
}

impl<R: RemoteRepository> Mirror<R> {
    /// Make the local folder match the remote branch.
    pub async fn pull(&self, request: &SyncRequest<'_>) -> Result<PullReport> {
        let location = self.locate(request).await?;
        let report = self.pull_into(&location, request).await?;
        request.report(SyncProgress::Done);
        Ok(report)
    }

    /// Pull into an already resolved location.
    pub async fn pull_into(
        &self,
        location: &RepoLocation,
        request: &SyncRequest<'_>,
    ) -> Result<PullReport> {
        let root = &location.local_path;
        let branch = location.branch.as_str();
        let slug = location.slug();

        let previous = SyncManifest::load(root, branch);

        request.report(SyncProgress::FetchingRevision);
        let revision = self.remote.branch_head(&slug, branch).await?;

        request.report(SyncProgress::Downloading);
        let archive = self.remote.download_snapshot(&slug, branch).await?;

        request.report(SyncProgress::Extracting);
        let entries = unpack_snapshot(&archive)?;
        let total = entries.len();

        let incoming = entries.iter().map(|e| e.path.as_str()).collect::<BTreeSet<_>>();
        let (blocking, stale): (Vec<_>, Vec<_>) = previous
            .files
            .keys()
            .filter(|path| !incoming.contains(path.as_str()))
            .partition(|path| blocks_incoming(path, &incoming));
        let mut pruned = prune(root, blocking);

        let mut files = BTreeMap::new();
        for (index, entry) in entries.iter().enumerate() {
            io::write_atomic(&root.join(&entry.path), &entry.contents)?;
            files.insert(entry.path.clone(), compute_content_checksum(&entry.contents));
            tracing::debug!(path = %entry.path, bytes = entry.contents.len(), "Wrote file");

            let done = index + 1;
            if done % PROGRESS_EVERY == 0 || done == total {
                request.report(SyncProgress::Writing { done, total });
            }
        }

        request.report(SyncProgress::Pruning);
        pruned.extend(prune(root, stale));

        request.report(SyncProgress::Saving);
        SyncManifest::new(revision.clone(), files).save(root, branch)?;

        tracing::info!(
            repository = %slug,
            branch,
            revision = %revision,
            written = total,
            pruned = pruned.len(),
            "Pulled snapshot"
        );
        Ok(PullReport {
            revision,
            written: total,
            pruned,
        })
    }
}

/// Whether a stale tracked path stands where an incoming entry must go.
///
/// True when `path` is a parent of some incoming entry, or lies under one.
fn blocks_incoming(path: &str, incoming: &BTreeSet<&str>) -> bool {
    let as_dir = format!("{path}/");
    let is_parent = incoming
        .range(as_dir.as_str()..)
        .next()
        .is_some_and(|next| next.starts_with(&as_dir));
    let is_under = path
        .match_indices('/')
        .any(|(idx, _)| incoming.contains(&path[..idx]));
    is_parent || is_under
}

/// Delete tracked files missing from the new snapshot; best-effort.
///
/// Directories left empty by a removal are removed too.
fn prune<'a>(root: &NormalizedPath, paths: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut pruned = Vec::new();
    for path in paths {
        let target = root.join(path);
        match io::remove_file(&target) {
            Ok(true) => {
                tracing::debug!(path = %path, "Pruned file removed upstream");
                io::remove_empty_parents(&target, root);
                pruned.push(path.clone());
            }
            Ok(false) => tracing::debug!(path = %path, "Pruned file already gone"),
            Err(e) => tracing::warn!(path = %path, error = %e, "Failed to prune file"),
        }
    }
    pruned
}
