//! Branch snapshot archives.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip `files` under a single `wrapper/` folder, the way hosted snapshots
/// are laid out. Parent directory entries are emitted before their files.
///
/// # Panics
/// Panics if the archive cannot be written.
pub fn build_snapshot_zip<P, C>(wrapper: &str, files: impl IntoIterator<Item = (P, C)>) -> Vec<u8>
where
    P: AsRef<str>,
    C: AsRef<[u8]>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut dirs = std::collections::BTreeSet::new();

    writer
        .add_directory(format!("{wrapper}/"), options)
        .expect("build_snapshot_zip: wrapper directory");

    for (path, contents) in files {
        let path = path.as_ref();
        let components = path.split('/').collect::<Vec<_>>();
        for depth in 1..components.len() {
            let dir = components[..depth].join("/");
            if dirs.insert(dir.clone()) {
                writer
                    .add_directory(format!("{wrapper}/{dir}/"), options)
                    .expect("build_snapshot_zip: directory entry");
            }
        }

        writer
            .start_file(format!("{wrapper}/{path}"), options)
            .expect("build_snapshot_zip: file entry");
        writer
            .write_all(contents.as_ref())
            .expect("build_snapshot_zip: file contents");
    }

    writer
        .finish()
        .expect("build_snapshot_zip: finish archive")
        .into_inner()
}
