//! Change detection tests

use std::collections::BTreeMap;

use mirror_core::{FileChange, FileStatus, SyncManifest, detect_changes, scan_tree};
use mirror_fs::compute_content_checksum;
use mirror_test_utils::TestTree;
use pretty_assertions::assert_eq;

/// Record every file currently in `tree` as synced.
fn snapshot(tree: &TestTree) {
    SyncManifest::new("rev1", scan_tree(&tree.root()))
        .save(&tree.root(), "main")
        .unwrap();
}

#[test]
fn empty_manifest_reports_everything_added() {
    let tree = TestTree::new();
    tree.write("b.txt", "b");
    tree.write("a/z.txt", "z");

    assert_eq!(
        detect_changes(&tree.root(), "main"),
        vec![
            FileChange::new("a/z.txt", FileStatus::Added),
            FileChange::new("b.txt", FileStatus::Added),
        ]
    );
}

#[test]
fn classifies_added_modified_deleted_and_skips_unmodified() {
    let tree = TestTree::new();
    tree.write("keep.txt", "same");
    tree.write("edit.txt", "before");
    tree.write("gone.txt", "bye");
    snapshot(&tree);

    tree.write("edit.txt", "after");
    tree.remove("gone.txt");
    tree.write("new.txt", "hello");

    assert_eq!(
        detect_changes(&tree.root(), "main"),
        vec![
            FileChange::new("edit.txt", FileStatus::Modified),
            FileChange::new("new.txt", FileStatus::Added),
            FileChange::new("gone.txt", FileStatus::Deleted),
        ]
    );
}

#[test]
fn clean_tree_has_no_changes() {
    let tree = TestTree::new();
    tree.write("docs/a.md", "a");
    snapshot(&tree);

    assert!(detect_changes(&tree.root(), "main").is_empty());
}

#[test]
fn metadata_is_never_content() {
    let tree = TestTree::new();
    tree.write("a.txt", "a");
    snapshot(&tree);
    tree.write("nested/.git", "gitdir: somewhere");

    let scanned = scan_tree(&tree.root());
    assert_eq!(scanned.keys().collect::<Vec<_>>(), vec!["a.txt"]);
    assert!(detect_changes(&tree.root(), "main").is_empty());
}

#[test]
fn scan_tree_hashes_raw_bytes() {
    let tree = TestTree::new();
    let binary = [0xff_u8, 0x00, 0xfe, 0x10];
    tree.write("img.bin", binary);

    let mut expected = BTreeMap::new();
    expected.insert("img.bin".to_string(), compute_content_checksum(binary));
    assert_eq!(scan_tree(&tree.root()), expected);
}

#[test]
fn missing_root_yields_only_deletions() {
    let tree = TestTree::new();
    tree.write("a.txt", "a");
    snapshot(&tree);
    let manifest = SyncManifest::load(&tree.root(), "main");

    let elsewhere = TestTree::new();
    let vanished = elsewhere.root().join("does-not-exist");
    assert_eq!(
        mirror_core::diff_tree(&vanished, &manifest),
        vec![FileChange::new("a.txt", FileStatus::Deleted)]
    );
}

#[test]
fn branch_scopes_the_comparison() {
    let tree = TestTree::new();
    tree.write("a.txt", "a");
    snapshot(&tree);

    assert!(detect_changes(&tree.root(), "main").is_empty());
    assert_eq!(
        detect_changes(&tree.root(), "dev"),
        vec![FileChange::new("a.txt", FileStatus::Added)]
    );
}
