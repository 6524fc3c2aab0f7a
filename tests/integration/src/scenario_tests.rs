//! Failure and recovery scenarios

use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use mirror_core::{
    ErrorKind, ForceMode, Mirror, MirrorConfig, OperationLocks, RecommendedAction, SyncManifest,
    SyncRequest, detect_changes, should_have_run_between,
};
use mirror_test_utils::{FakeRemote, RemoteCall, TestTree};
use pretty_assertions::assert_eq;

fn request(tree: &TestTree) -> SyncRequest<'static> {
    SyncRequest::new("octo/notes").local_path(tree.root())
}

fn mirror(files: &[(&str, &str)]) -> Mirror<FakeRemote> {
    Mirror::new(
        FakeRemote::new().with_branch("main", files.iter().copied()),
        MirrorConfig::default(),
    )
}

#[tokio::test]
async fn outage_then_recovery() {
    let mirror = mirror(&[("a.txt", "a")]);
    let tree = TestTree::new();
    mirror.pull(&request(&tree)).await.unwrap();

    mirror
        .remote()
        .commit_upstream("main", &[("b.txt", Some(b"b".as_slice()))]);
    mirror.remote().fail_downloads(true);

    let err = mirror.sync(&request(&tree)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    // A failed pull stops the sync before anything is pushed
    assert!(mirror.remote().write_calls().is_empty());
    assert!(
        mirror
            .fetch_status(&request(&tree))
            .await
            .unwrap()
            .is_ahead
    );

    mirror.remote().fail_downloads(false);
    mirror.sync(&request(&tree)).await.unwrap();
    tree.assert_file_contains("b.txt", "b");
}

#[tokio::test]
async fn rejected_push_recovers_with_force_remote() {
    let mirror = mirror(&[("a.txt", "a")]);
    let tree = TestTree::new();
    mirror.pull(&request(&tree)).await.unwrap();

    tree.write("a.txt", "local");
    tree.write("junk.txt", "junk");
    mirror.remote().reject_ref_updates(true);
    let err = mirror.push(&request(&tree)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteRejected);

    let status = mirror.fetch_status(&request(&tree)).await.unwrap();
    assert_eq!(status.recommended_action(), RecommendedAction::Push);

    mirror.remote().reject_ref_updates(false);
    mirror
        .force_sync(&request(&tree), ForceMode::Remote)
        .await
        .unwrap();

    tree.assert_file_contains("a.txt", "a");
    tree.assert_file_not_exists("junk.txt");
    let status = mirror.fetch_status(&request(&tree)).await.unwrap();
    assert_eq!(status.recommended_action(), RecommendedAction::UpToDate);
}

#[tokio::test]
async fn force_local_overrides_upstream_edit_of_same_file() {
    let mirror = mirror(&[("shared.txt", "v1"), ("other.txt", "o")]);
    let tree = TestTree::new();
    mirror.pull(&request(&tree)).await.unwrap();

    mirror
        .remote()
        .commit_upstream("main", &[("shared.txt", Some(b"upstream".as_slice()))]);
    tree.write("shared.txt", "mine");

    mirror
        .force_sync(&request(&tree), ForceMode::Local)
        .await
        .unwrap();

    let files = mirror.remote().branch_files("main");
    assert_eq!(files["shared.txt"], b"mine".to_vec());
    assert_eq!(files["other.txt"], b"o".to_vec());
    assert!(detect_changes(&tree.root(), "main").is_empty());
}

#[tokio::test]
async fn branches_mirror_independently_in_one_folder() {
    let remote = FakeRemote::new()
        .with_branch("main", [("a.txt", "main")])
        .with_branch("dev", [("a.txt", "dev"), ("wip.txt", "w")]);
    let mirror = Mirror::new(remote, MirrorConfig::default());
    let tree = TestTree::new();

    mirror.pull(&request(&tree).branch("main")).await.unwrap();
    let main = SyncManifest::load(&tree.root(), "main");
    mirror.pull(&request(&tree).branch("dev")).await.unwrap();

    assert_eq!(SyncManifest::load(&tree.root(), "main"), main);
    assert_eq!(SyncManifest::load(&tree.root(), "dev").files.len(), 2);
    tree.assert_file_contains("a.txt", "dev");
}

#[tokio::test]
async fn locks_serialize_overlapping_runs() {
    let mirror = Arc::new(mirror(&[("a.txt", "a")]));
    let locks = OperationLocks::new();
    let tree = TestTree::new();
    let root = tree.root();

    let first = locks.acquire(&root, "main").await;
    assert!(locks.try_acquire(&root, "main").is_none());
    assert!(locks.try_acquire(&root, "dev").is_some());

    let waiter = {
        let mirror = Arc::clone(&mirror);
        let locks = locks.clone();
        let root = root.clone();
        tokio::spawn(async move {
            let _guard = locks.acquire(&root, "main").await;
            mirror
                .pull(&SyncRequest::new("octo/notes").local_path(root.clone()).branch("main"))
                .await
                .map(|report| report.written)
        })
    };

    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());
    assert!(
        mirror
            .remote()
            .calls()
            .iter()
            .all(|call| !matches!(call, RemoteCall::DownloadSnapshot { .. }))
    );

    drop(first);
    assert_eq!(waiter.await.unwrap().unwrap(), 1);
}

#[test]
fn daily_schedule_catches_a_missed_morning() {
    let expression = "0 9 * * *";
    let last = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 5).unwrap();

    // Same day, afternoon: nothing missed yet
    let afternoon = Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap();
    assert!(!should_have_run_between(expression, last, afternoon));

    // Device was off overnight; next morning at 10:00 the 09:00 run was missed
    let next_morning = last + TimeDelta::hours(25);
    assert!(should_have_run_between(expression, last, next_morning));
}
