//! End-to-end flow across two folders mirroring one branch
//!
//! config file -> resolver -> engine -> remote -> second folder.

use std::fs;

use mirror_core::{
    ConfigResolver, FileStatus, Mirror, RecommendedAction, SyncManifest, SyncRequest,
    detect_changes,
};
use mirror_test_utils::{FakeRemote, TestTree};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn request(tree: &TestTree) -> SyncRequest<'static> {
    SyncRequest::new("octo/notes").local_path(tree.root())
}

#[tokio::test]
async fn edits_travel_between_two_folders() {
    let remote = FakeRemote::new().with_branch(
        "main",
        [("README.md", "# Notes"), ("journal/2024-06-01.md", "day one")],
    );
    let mirror = Mirror::new(remote, Default::default());
    let laptop = TestTree::new();
    let phone = TestTree::new();

    // Both start from the same snapshot
    mirror.pull(&request(&laptop)).await.unwrap();
    mirror.pull(&request(&phone)).await.unwrap();

    // Laptop writes a new entry, edits the readme and drops day one
    laptop.write("journal/2024-06-02.md", "day two");
    laptop.write("README.md", "# Notes\n\nDaily journal.");
    laptop.remove("journal/2024-06-01.md");
    let pushed = mirror.push(&request(&laptop)).await.unwrap();
    assert_eq!(pushed.changes.len(), 3);

    // Phone is now behind but clean
    let status = mirror.fetch_status(&request(&phone)).await.unwrap();
    assert_eq!(status.recommended_action(), RecommendedAction::Pull);

    // Phone adds a file and syncs: pull brings the laptop's work, push sends the new file
    phone.write("ideas.md", "- mirror the wiki");
    let report = mirror.sync(&request(&phone)).await.unwrap();
    phone.assert_file_contains("journal/2024-06-02.md", "day two");
    phone.assert_file_contains("README.md", "Daily journal.");
    phone.assert_file_not_exists("journal/2024-06-01.md");
    assert_eq!(report.pull.pruned, vec!["journal/2024-06-01.md".to_string()]);
    assert_eq!(report.push.changes.len(), 1);
    assert_eq!(report.push.changes[0].status, FileStatus::Added);

    // Laptop pulls the phone's file
    let pulled = mirror.pull(&request(&laptop)).await.unwrap();
    assert!(pulled.pruned.is_empty());
    laptop.assert_file_contains("ideas.md", "- mirror the wiki");

    let laptop_manifest = SyncManifest::load(&laptop.root(), "main");
    let phone_manifest = SyncManifest::load(&phone.root(), "main");
    assert_eq!(laptop_manifest, phone_manifest);
    assert_eq!(Some(laptop_manifest.revision), mirror.remote().head("main"));
    assert!(detect_changes(&laptop.root(), "main").is_empty());
    assert!(detect_changes(&phone.root(), "main").is_empty());
}

#[tokio::test]
async fn configured_defaults_drive_smart_sync() {
    let config_dir = TempDir::new().unwrap();
    let documents = TempDir::new().unwrap();
    let explicit = config_dir.path().join("mirror.toml");
    fs::write(
        config_dir.path().join("config.toml"),
        "[sync]\ncommit_message = \"Global message\"\n",
    )
    .unwrap();
    fs::write(
        &explicit,
        format!(
            "[paths]\ndocuments_root = {:?}\n\n[sync]\ncommit_message = \"Phone edit\"\n",
            documents.path().display().to_string()
        ),
    )
    .unwrap();

    let config = ConfigResolver::new()
        .with_config_dir(config_dir.path())
        .with_config_file(&explicit)
        .resolve()
        .unwrap();
    assert_eq!(config.sync.commit_message, "Phone edit");
    assert_eq!(config.sync.force_push_message, "Force Push from Mirror");

    let remote = FakeRemote::new().with_branch("main", [("todo.txt", "milk")]);
    let mirror = Mirror::new(remote, config);

    // Bare repo name: owner comes from the token's identity
    mirror.smart_sync("notes").await.unwrap();
    let folder = documents.path().join("github").join("notes");
    assert_eq!(fs::read_to_string(folder.join("todo.txt")).unwrap(), "milk");

    fs::write(folder.join("shopping.txt"), "eggs").unwrap();
    let report = mirror.smart_sync("notes").await.unwrap();

    let commit = report.push.commit.unwrap();
    assert_eq!(mirror.remote().commit_message(&commit).as_deref(), Some("Phone edit"));
    assert_eq!(mirror.remote().branch_files("main")["shopping.txt"], b"eggs".to_vec());
}
