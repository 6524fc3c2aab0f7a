//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Suffix shared by every temporary file `write_atomic` creates.
pub const TEMP_SUFFIX: &str = ".mirror-tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Whether a file name was produced by [`write_atomic`] as a temporary file.
pub fn is_temp_file_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.{}{}",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
        TEMP_SUFFIX
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    let written = temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    Ok(())
}

/// Read raw bytes from a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a file.
///
/// Returns `Ok(false)` when there was nothing to remove.
pub fn remove_file(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::remove_file(&native_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Remove empty directories from `path`'s parent up to, not including, `root`.
///
/// Stops at the first directory that is not empty or cannot be removed.
/// Returns how many directories were removed.
pub fn remove_empty_parents(path: &NormalizedPath, root: &NormalizedPath) -> usize {
    let mut removed = 0;
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.relative_to(root).is_none() {
            break;
        }
        if fs::remove_dir(dir.to_native()).is_err() {
            break;
        }
        removed += 1;
        current = dir.parent();
    }
    removed
}

/// Remove every entry directly under `dir`, recursing into directories.
///
/// Best-effort: failures are logged and counted, never returned. A missing
/// or unreadable `dir` counts as a single failure.
pub fn clear_directory(dir: &NormalizedPath) -> usize {
    let native_dir = dir.to_native();
    let entries = match fs::read_dir(&native_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir, error = %e, "Could not list directory for clearing");
            return 1;
        }
    };

    let mut failures = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %dir, error = %e, "Skipping unreadable directory entry");
                failures += 1;
                continue;
            }
        };

        let entry_path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let removed = if is_dir {
            fs::remove_dir_all(&entry_path)
        } else {
            fs::remove_file(&entry_path)
        };

        if let Err(e) = removed {
            tracing::warn!(path = %entry_path.display(), error = %e, "Failed to remove entry");
            failures += 1;
        }
    }

    failures
}
