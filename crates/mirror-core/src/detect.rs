//! Hash-based change detection
//!
//! Compares the files currently on disk against the digests recorded in the
//! manifest. The walk never fails as a whole: unreadable subtrees and files
//! are logged and skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use mirror_fs::{MirrorPath, NormalizedPath, compute_content_checksum, io};
use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::manifest::SyncManifest;

/// How a path differs from the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    /// Part of the vocabulary, never emitted by [`detect_changes`]
    Unmodified,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Unmodified => "unmodified",
        };
        f.write_str(label)
    }
}

/// One classified path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
}

impl FileChange {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

struct Scan {
    /// Readable files in walk order
    files: Vec<(String, String)>,
    /// Files that exist but could not be hashed
    unreadable: BTreeSet<String>,
}

/// Classify every local difference from the manifest stored for `branch`.
pub fn detect_changes(root: &NormalizedPath, branch: &str) -> Vec<FileChange> {
    let manifest = SyncManifest::load(root, branch);
    diff_tree(root, &manifest)
}

/// Classify every local difference from an already loaded manifest.
///
/// Added and modified files come first in walk order, deletions follow in
/// path order. A tracked file that exists but cannot be read is reported as
/// neither modified nor deleted.
pub fn diff_tree(root: &NormalizedPath, manifest: &SyncManifest) -> Vec<FileChange> {
    let scan = walk(root);
    let mut changes = Vec::new();
    let mut present = scan.unreadable;

    for (path, digest) in scan.files {
        match manifest.files.get(&path) {
            None => changes.push(FileChange::new(&path, FileStatus::Added)),
            Some(recorded) if *recorded != digest => {
                changes.push(FileChange::new(&path, FileStatus::Modified))
            }
            Some(_) => {}
        }
        present.insert(path);
    }

    changes.extend(
        manifest
            .files
            .keys()
            .filter(|path| !present.contains(*path))
            .map(|path| FileChange::new(path, FileStatus::Deleted)),
    );

    tracing::debug!(root = %root, changes = changes.len(), "Detected local changes");
    changes
}

/// Digest of every regular file under `root`, keyed by relative path.
pub fn scan_tree(root: &NormalizedPath) -> BTreeMap<String, String> {
    walk(root).files.into_iter().collect()
}

fn walk(root: &NormalizedPath) -> Scan {
    let native_root = root.to_native();
    let mut scan = Scan {
        files: Vec::new(),
        unreadable: BTreeSet::new(),
    };

    let walker = WalkDir::new(&native_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(root = %root, error = %e, "Skipping unreadable subtree");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = relative_path(&native_root, entry.path()) else {
            continue;
        };

        match io::read_bytes(&NormalizedPath::new(entry.path())) {
            Ok(bytes) => scan.files.push((relative, compute_content_checksum(&bytes))),
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "Skipping unreadable file");
                scan.unreadable.insert(relative);
            }
        }
    }

    scan
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    MirrorPath::is_reserved_component(&name) || io::is_temp_file_name(&name)
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let normalized = NormalizedPath::new(relative);
    (normalized.as_str() != ".").then(|| normalized.as_str().to_string())
}
