//! [`TestTree`]: a temporary local folder for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use mirror_fs::NormalizedPath;
use tempfile::TempDir;

/// A temporary folder standing in for a mirrored repository checkout.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("notes/today.md", "# Today");
/// tree.assert_file_contains("notes/today.md", "Today");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestTree::new: failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as the engine sees it.
    pub fn root(&self) -> NormalizedPath {
        NormalizedPath::new(self.path())
    }

    fn full(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) {
        let full_path = self.full(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, contents)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        let full_path = self.full(relative);
        fs::read(&full_path).unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    pub fn remove(&self, relative: &str) {
        let full_path = self.full(relative);
        fs::remove_file(&full_path)
            .unwrap_or_else(|e| panic!("Could not remove {}: {e}", full_path.display()));
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.full(relative).exists()
    }

    /// Assert that `path` (relative to the root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.full(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.full(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.full(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
