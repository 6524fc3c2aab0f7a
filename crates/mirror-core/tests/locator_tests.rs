//! Remote locator tests against the in-memory remote

use mirror_core::{Error, MirrorConfig, resolve};
use mirror_fs::NormalizedPath;
use mirror_test_utils::{FakeRemote, RemoteCall};
use pretty_assertions::assert_eq;

fn config() -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.paths.documents_root = Some("/home/me/Documents".into());
    config
}

#[tokio::test]
async fn owner_repo_uses_remote_default_branch() {
    let remote = FakeRemote::new();
    remote.set_default_branch("trunk");

    let location = resolve(&remote, &config(), "acme/wiki", None).await.unwrap();

    assert_eq!(location.owner, "acme");
    assert_eq!(location.repo, "wiki");
    assert_eq!(location.branch, "trunk");
    assert_eq!(location.local_path.as_str(), "/home/me/Documents/github/wiki");
    assert_eq!(remote.calls(), vec![RemoteCall::DefaultBranch]);
}

#[tokio::test]
async fn bare_repo_is_owned_by_authenticated_user() {
    let remote = FakeRemote::new();
    remote.set_login("me");

    let location = resolve(&remote, &config(), "notes", None).await.unwrap();

    assert_eq!(location.owner, "me");
    assert_eq!(location.repo, "notes");
    assert!(remote.calls().contains(&RemoteCall::AuthenticatedLogin));
}

#[tokio::test]
async fn tree_branch_skips_default_lookup() {
    let remote = FakeRemote::new();

    let location = resolve(&remote, &config(), "https://github.com/acme/wiki/tree/dev", None)
        .await
        .unwrap();

    assert_eq!(location.branch, "dev");
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn tree_folder_url_resolves_to_branch() {
    let remote = FakeRemote::new().with_branch("main", [("docs/a.md", "a")]);

    let location = resolve(
        &remote,
        &config(),
        "https://github.com/acme/wiki/tree/main/docs",
        None,
    )
    .await
    .unwrap();

    assert_eq!(location.branch, "main");
    assert_eq!(remote.calls(), vec![RemoteCall::ListBranches]);
}

#[tokio::test]
async fn slashed_branch_is_matched_against_remote_branches() {
    let remote = FakeRemote::new()
        .with_branch("release", [("a.txt", "a")])
        .with_branch("release/2.0", [("a.txt", "b")]);

    let location = resolve(
        &remote,
        &config(),
        "https://github.com/acme/wiki/tree/release/2.0/docs",
        None,
    )
    .await
    .unwrap();

    assert_eq!(location.branch, "release/2.0");
}

#[tokio::test]
async fn unlisted_branches_fall_back_to_first_tree_segment() {
    let remote = FakeRemote::new();
    remote.fail_branch_list(true);

    let location = resolve(&remote, &config(), "acme/wiki/tree/release/2.0", None)
        .await
        .unwrap();

    assert_eq!(location.branch, "release");
}

#[tokio::test]
async fn failed_default_lookup_falls_back() {
    let remote = FakeRemote::new();
    remote.fail_default_branch(true);
    let mut config = config();
    config.sync.fallback_branch = "master".to_string();

    let location = resolve(&remote, &config, "acme/wiki", None).await.unwrap();
    assert_eq!(location.branch, "master");
}

#[tokio::test]
async fn path_hint_wins_over_default() {
    let remote = FakeRemote::new();
    let hint = NormalizedPath::new("/srv/mirrors/wiki");

    let location = resolve(&remote, &config(), "acme/wiki", Some(&hint))
        .await
        .unwrap();
    assert_eq!(location.local_path, hint);
}

#[tokio::test]
async fn unparseable_reference_never_reaches_remote() {
    let remote = FakeRemote::new();

    let err = resolve(&remote, &config(), "https://github.com/", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidReference { .. }));
    assert!(remote.calls().is_empty());
}
