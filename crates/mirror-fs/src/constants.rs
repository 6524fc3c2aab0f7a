//! Reserved names inside a mirrored directory.

use std::path::Path;

/// Paths the sync engine reserves for its own metadata.
///
/// Everything under [`MirrorPath::MetadataDir`] belongs to the engine and is
/// never reported as repository content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPath {
    /// The `.git` directory holding all sync metadata
    MetadataDir,
    /// `HEAD`, pointing at the branch last synced into this folder
    Head,
    /// `refs/heads`, one file per branch holding its last synced revision
    RefsHeads,
    /// `index`, one JSON file per branch holding the path -> digest map
    IndexDir,
}

impl MirrorPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetadataDir => ".git",
            Self::Head => "HEAD",
            Self::RefsHeads => "refs/heads",
            Self::IndexDir => "index",
        }
    }

    /// Whether a single path component names the reserved metadata location.
    pub fn is_reserved_component(name: &str) -> bool {
        name == Self::MetadataDir.as_str()
    }
}

impl AsRef<Path> for MirrorPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for MirrorPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for MirrorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
