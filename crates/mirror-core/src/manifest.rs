//! Sync manifest persistence
//!
//! A manifest records the remote revision last materialized in a local
//! folder and the digest of every file that revision contained. It lives
//! under the reserved `.git` directory of the folder:
//!
//! ```text
//! .git/HEAD                  ref: refs/heads/<branch>
//! .git/refs/heads/<branch>   <revision>
//! .git/index/<branch>.json   { "<path>": "<digest>", ... }
//! ```

use std::collections::BTreeMap;
use std::fs;

use mirror_fs::{MirrorPath, NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::Result;

const HEAD_PREFIX: &str = "ref: refs/heads/";

/// Last-known remote state of one local path and branch pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncManifest {
    /// Revision last fully materialized locally; empty when never synced
    pub revision: String,
    /// Repository-relative path to content digest
    pub files: BTreeMap<String, String>,
}

impl SyncManifest {
    pub fn new(revision: impl Into<String>, files: BTreeMap<String, String>) -> Self {
        Self {
            revision: revision.into(),
            files,
        }
    }

    /// True for a folder that has never completed a sync.
    pub fn is_empty(&self) -> bool {
        self.revision.is_empty() && self.files.is_empty()
    }

    /// Load the manifest for `branch`, or the empty manifest if none is usable.
    ///
    /// Missing and corrupt manifests are treated alike; corruption is only logged.
    pub fn load(root: &NormalizedPath, branch: &str) -> Self {
        let ref_path = ref_path(root, branch);
        let revision = match io::read_text(&ref_path) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                if !e.is_not_found() {
                    tracing::warn!(path = %ref_path, error = %e, "Unreadable revision marker, starting fresh");
                }
                return Self::default();
            }
        };

        let index_path = index_path(root, branch);
        let files = match io::read_bytes(&index_path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(path = %index_path, error = %e, "Corrupt manifest index, starting fresh");
                    return Self::default();
                }
            },
            Err(e) => {
                if !e.is_not_found() {
                    tracing::warn!(path = %index_path, error = %e, "Unreadable manifest index, starting fresh");
                }
                return Self::default();
            }
        };

        Self { revision, files }
    }

    /// Persist the manifest so a later [`SyncManifest::load`] returns it unchanged.
    ///
    /// A regular file squatting on the metadata location is removed first.
    ///
    /// Writes go index, then ref, then `HEAD`; the ref is the commit point.
    /// Interrupted before the ref, the folder pairs the new index with the
    /// old revision and reads as behind, so the next pull repairs it.
    pub fn save(&self, root: &NormalizedPath, branch: &str) -> Result<()> {
        let meta = metadata_dir(root);
        if meta.is_file() {
            tracing::debug!(path = %meta, "Replacing metadata file with directory");
            fs::remove_file(meta.to_native()).map_err(|e| mirror_fs::Error::io(meta.to_native(), e))?;
        }

        let index = serde_json::to_vec_pretty(&self.files).map_err(|e| mirror_fs::Error::ConfigSerialize {
            path: index_path(root, branch).to_native(),
            format: "json".to_string(),
            message: e.to_string(),
        })?;

        io::write_atomic(&index_path(root, branch), &index)?;
        io::write_text(&ref_path(root, branch), &self.revision)?;
        io::write_text(&meta.join(MirrorPath::Head.as_str()), &format!("{HEAD_PREFIX}{branch}"))?;

        tracing::debug!(
            root = %root,
            branch,
            revision = %self.revision,
            files = self.files.len(),
            "Saved manifest"
        );
        Ok(())
    }
}

/// Branch recorded in `HEAD` by the last save, if any.
pub fn current_branch(root: &NormalizedPath) -> Option<String> {
    let head = io::read_text(&metadata_dir(root).join(MirrorPath::Head.as_str())).ok()?;
    let branch = head.trim().strip_prefix(HEAD_PREFIX)?.trim();
    (!branch.is_empty()).then(|| branch.to_string())
}

fn metadata_dir(root: &NormalizedPath) -> NormalizedPath {
    root.join(MirrorPath::MetadataDir.as_str())
}

fn ref_path(root: &NormalizedPath, branch: &str) -> NormalizedPath {
    metadata_dir(root)
        .join(MirrorPath::RefsHeads.as_str())
        .join(branch)
}

fn index_path(root: &NormalizedPath, branch: &str) -> NormalizedPath {
    metadata_dir(root)
        .join(MirrorPath::IndexDir.as_str())
        .join(&format!("{branch}.json"))
}
