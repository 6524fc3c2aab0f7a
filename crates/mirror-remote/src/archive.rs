//! Snapshot archive unpacking
//!
//! Branch snapshots arrive as zip files with every entry nested under a
//! single generated folder (`owner-repo-<sha>/`). Unpacking happens fully
//! in memory so a corrupt archive is detected before anything touches disk.

use std::io::{Cursor, Read};
use std::path::Component;

use zip::ZipArchive;

use crate::{Error, Result};

/// One regular file from a snapshot, keyed by repository-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub path: String,
    pub contents: Vec<u8>,
}

/// Unpack every regular file in `bytes`.
///
/// The common wrapper folder is stripped from each path. Entries whose
/// names would escape the extraction root are rejected, and anything under
/// a `.git/` directory is skipped.
pub fn unpack_snapshot(bytes: &[u8]) -> Result<Vec<SnapshotEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut raw = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        let enclosed = file
            .enclosed_name()
            .ok_or_else(|| Error::archive(format!("entry escapes extraction root: {name}")))?;

        let components = enclosed
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>();
        if components.is_empty() {
            continue;
        }

        let mut contents = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut contents)
            .map_err(|e| Error::archive(format!("{name}: {e}")))?;

        raw.push((components, contents));
    }

    let strip = usize::from(has_wrapper(&raw));
    let entries = raw
        .into_iter()
        .filter_map(|(components, contents)| {
            let rest = &components[strip..];
            if rest.is_empty() || rest.iter().any(|c| c == ".git") {
                return None;
            }
            Some(SnapshotEntry {
                path: rest.join("/"),
                contents,
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(files = entries.len(), "Unpacked snapshot");
    Ok(entries)
}

/// True when every file sits below one shared top-level folder.
fn has_wrapper(files: &[(Vec<String>, Vec<u8>)]) -> bool {
    let Some((first, _)) = files.first() else {
        return false;
    };
    let wrapper = &first[0];
    files
        .iter()
        .all(|(components, _)| components.len() > 1 && &components[0] == wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    fn paths(entries: &[SnapshotEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn strips_wrapper_folder() {
        let bytes = zip_of(&[
            ("octo-notes-abc123/", b""),
            ("octo-notes-abc123/README.md", b"# notes"),
            ("octo-notes-abc123/docs/", b""),
            ("octo-notes-abc123/docs/a.md", b"a"),
        ]);
        let entries = unpack_snapshot(&bytes).unwrap();
        assert_eq!(paths(&entries), vec!["README.md", "docs/a.md"]);
        assert_eq!(entries[0].contents, b"# notes");
    }

    #[test]
    fn flat_archive_is_kept_as_is() {
        let bytes = zip_of(&[("a.txt", b"1"), ("dir/b.txt", b"2")]);
        let entries = unpack_snapshot(&bytes).unwrap();
        assert_eq!(paths(&entries), vec!["a.txt", "dir/b.txt"]);
    }

    #[test]
    fn empty_repository_yields_no_files() {
        let bytes = zip_of(&[("octo-empty-000/", b"")]);
        assert!(unpack_snapshot(&bytes).unwrap().is_empty());
    }

    #[test]
    fn metadata_directory_is_skipped() {
        let bytes = zip_of(&[
            ("wrap/.git/HEAD", b"ref: refs/heads/main"),
            ("wrap/keep.txt", b"k"),
        ]);
        assert_eq!(paths(&unpack_snapshot(&bytes).unwrap()), vec!["keep.txt"]);
    }

    #[test]
    fn escaping_entry_is_rejected() {
        let bytes = zip_of(&[("wrap/ok.txt", b"ok"), ("../evil.txt", b"x")]);
        let err = unpack_snapshot(&bytes).unwrap_err();
        assert!(matches!(err, Error::Archive { .. }), "{err}");
    }

    #[test]
    fn garbage_is_an_archive_error() {
        let err = unpack_snapshot(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, Error::Archive { .. }));
    }

    #[test]
    fn binary_contents_survive() {
        let blob: &[u8] = &[0, 159, 146, 150, 255];
        let bytes = zip_of(&[("w/img.bin", blob)]);
        assert_eq!(unpack_snapshot(&bytes).unwrap()[0].contents, blob);
    }
}
