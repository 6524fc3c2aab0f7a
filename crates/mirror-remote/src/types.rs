//! Typed values exchanged with the remote repository service

use std::fmt;

/// `owner/repo` pair identifying a remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// What a tree entry does to its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// Create or replace the file with inline UTF-8 content
    Content(String),
    /// Create or replace the file with a previously uploaded blob
    Blob(String),
    /// Remove the path from the tree
    Delete,
}

/// One path-level instruction applied on top of a base tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub change: TreeChange,
}

impl TreeEntry {
    pub fn content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change: TreeChange::Content(content.into()),
        }
    }

    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change: TreeChange::Blob(sha.into()),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change: TreeChange::Delete,
        }
    }
}
