//! [`FakeRemote`]: an in-memory remote repository service.
//!
//! Holds whole-file trees per commit, mints deterministic ids, applies
//! partial tree updates the way the hosted service does, serves branch
//! snapshots as zip archives and records every call it receives.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mirror_fs::compute_content_checksum;
use mirror_remote::{Error, RemoteRepository, RepoSlug, Result, TreeChange, TreeEntry};

use crate::snapshot::build_snapshot_zip;

type Files = BTreeMap<String, Vec<u8>>;

/// One call received by [`FakeRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    AuthenticatedLogin,
    DefaultBranch,
    ListBranches,
    BranchHead { branch: String },
    RefHead { branch: String },
    CommitTree { commit: String },
    CreateBlob,
    CreateTree { base_tree: String, entries: Vec<TreeEntry> },
    CreateCommit { message: String, tree: String, parents: Vec<String> },
    UpdateRef { branch: String, commit: String },
    DownloadSnapshot { branch: String },
}

#[derive(Debug, Clone)]
struct Commit {
    tree: String,
    message: String,
}

#[derive(Debug, Default)]
struct State {
    login: String,
    default_branch: String,
    fail_default_branch: bool,
    fail_branch_list: bool,
    download_outage: bool,
    reject_ref_updates: bool,
    branches: BTreeMap<String, String>,
    commits: HashMap<String, Commit>,
    parents: HashMap<String, Vec<String>>,
    trees: HashMap<String, Files>,
    blobs: HashMap<String, Vec<u8>>,
    calls: Vec<RemoteCall>,
    minted: u64,
}

impl State {
    fn mint(&mut self, kind: &str, payload: &[u8]) -> String {
        self.minted += 1;
        let digest = compute_content_checksum(payload);
        let seed = format!("{kind}:{}:{digest}", self.minted);
        let id = compute_content_checksum(seed.as_bytes());
        id.trim_start_matches("sha256:")[..40].to_string()
    }

    fn store_tree(&mut self, files: Files) -> String {
        let listing = files
            .iter()
            .map(|(path, contents)| format!("{path}={}", compute_content_checksum(contents)))
            .collect::<Vec<_>>()
            .join("\n");
        let id = self.mint("tree", listing.as_bytes());
        self.trees.insert(id.clone(), files);
        id
    }

    fn store_commit(&mut self, tree: String, message: &str, parents: Vec<String>) -> String {
        let id = self.mint("commit", format!("{tree}\n{message}").as_bytes());
        self.commits.insert(
            id.clone(),
            Commit {
                tree,
                message: message.to_string(),
            },
        );
        self.parents.insert(id.clone(), parents);
        id
    }

    fn tip(&self, branch: &str) -> Result<String> {
        self.branches
            .get(branch)
            .cloned()
            .ok_or_else(|| Error::rejected("get branch", 404, "Branch not found"))
    }

    fn files_at(&self, commit: &str) -> Files {
        self.commits
            .get(commit)
            .and_then(|c| self.trees.get(&c.tree))
            .cloned()
            .unwrap_or_default()
    }
}

/// In-memory [`RemoteRepository`] for engine tests.
///
/// Serves any owner/repo; all branches live in one namespace. The
/// authenticated login defaults to `octo` and the default branch to `main`.
#[derive(Debug)]
pub struct FakeRemote {
    state: Mutex<State>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                login: "octo".to_string(),
                default_branch: "main".to_string(),
                ..State::default()
            }),
        }
    }

    /// Builder form of [`FakeRemote::set_branch`].
    pub fn with_branch<P, C>(self, branch: &str, files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        self.set_branch(branch, files);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("FakeRemote state poisoned")
    }

    /// Point `branch` at a fresh root commit holding exactly `files`.
    pub fn set_branch<P, C>(&self, branch: &str, files: impl IntoIterator<Item = (P, C)>) -> String
    where
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let files = files
            .into_iter()
            .map(|(p, c)| (p.as_ref().to_string(), c.as_ref().to_vec()))
            .collect::<Files>();
        let mut state = self.lock();
        let tree = state.store_tree(files);
        let commit = state.store_commit(tree, "Initial commit", Vec::new());
        state.branches.insert(branch.to_string(), commit.clone());
        commit
    }

    /// Simulate an upstream commit: `Some` writes a file, `None` deletes it.
    pub fn commit_upstream(&self, branch: &str, changes: &[(&str, Option<&[u8]>)]) -> String {
        let mut state = self.lock();
        let parent = state.tip(branch).expect("commit_upstream: unknown branch");
        let mut files = state.files_at(&parent);
        for (path, contents) in changes {
            match contents {
                Some(contents) => files.insert(path.to_string(), contents.to_vec()),
                None => files.remove(*path),
            };
        }
        let tree = state.store_tree(files);
        let commit = state.store_commit(tree, "Upstream change", vec![parent]);
        state.branches.insert(branch.to_string(), commit.clone());
        commit
    }

    pub fn head(&self, branch: &str) -> Option<String> {
        self.lock().branches.get(branch).cloned()
    }

    /// Files at the tip of `branch`; empty for an unknown branch.
    pub fn branch_files(&self, branch: &str) -> BTreeMap<String, Vec<u8>> {
        let state = self.lock();
        state
            .branches
            .get(branch)
            .map(|tip| state.files_at(tip))
            .unwrap_or_default()
    }

    pub fn commit_message(&self, commit: &str) -> Option<String> {
        self.lock().commits.get(commit).map(|c| c.message.clone())
    }

    pub fn commit_parents(&self, commit: &str) -> Vec<String> {
        self.lock().parents.get(commit).cloned().unwrap_or_default()
    }

    pub fn set_login(&self, login: &str) {
        self.lock().login = login.to_string();
    }

    pub fn set_default_branch(&self, branch: &str) {
        self.lock().default_branch = branch.to_string();
    }

    /// Make the default-branch lookup fail.
    pub fn fail_default_branch(&self, fail: bool) {
        self.lock().fail_default_branch = fail;
    }

    /// Make the branch listing fail.
    pub fn fail_branch_list(&self, fail: bool) {
        self.lock().fail_branch_list = fail;
    }

    /// Make every snapshot download fail as if both hosts were unreachable.
    pub fn fail_downloads(&self, fail: bool) {
        self.lock().download_outage = fail;
    }

    /// Reject every ref update.
    pub fn reject_ref_updates(&self, reject: bool) {
        self.lock().reject_ref_updates = reject;
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Calls that create objects or move refs.
    pub fn write_calls(&self) -> Vec<RemoteCall> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    RemoteCall::CreateBlob
                        | RemoteCall::CreateTree { .. }
                        | RemoteCall::CreateCommit { .. }
                        | RemoteCall::UpdateRef { .. }
                )
            })
            .collect()
    }
}

#[async_trait]
impl RemoteRepository for FakeRemote {
    async fn authenticated_login(&self) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::AuthenticatedLogin);
        Ok(state.login.clone())
    }

    async fn default_branch(&self, _slug: &RepoSlug) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::DefaultBranch);
        if state.fail_default_branch {
            return Err(Error::rejected("get repository", 404, "Not Found"));
        }
        Ok(state.default_branch.clone())
    }

    async fn list_branches(&self, _slug: &RepoSlug) -> Result<Vec<String>> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::ListBranches);
        if state.fail_branch_list {
            return Err(Error::rejected("list branches", 403, "Forbidden"));
        }
        Ok(state.branches.keys().cloned().collect())
    }

    async fn branch_head(&self, _slug: &RepoSlug, branch: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::BranchHead {
            branch: branch.to_string(),
        });
        state.tip(branch)
    }

    async fn ref_head(&self, _slug: &RepoSlug, branch: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::RefHead {
            branch: branch.to_string(),
        });
        state.tip(branch)
    }

    async fn commit_tree(&self, _slug: &RepoSlug, commit: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CommitTree {
            commit: commit.to_string(),
        });
        state
            .commits
            .get(commit)
            .map(|c| c.tree.clone())
            .ok_or_else(|| Error::rejected("get commit", 404, "No commit found"))
    }

    async fn create_blob(&self, _slug: &RepoSlug, content: &[u8]) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateBlob);
        let id = state.mint("blob", content);
        state.blobs.insert(id.clone(), content.to_vec());
        Ok(id)
    }

    async fn create_tree(
        &self,
        _slug: &RepoSlug,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateTree {
            base_tree: base_tree.to_string(),
            entries: entries.to_vec(),
        });

        let mut files = state
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| Error::rejected("create tree", 422, "base_tree is not a valid tree"))?;
        for entry in entries {
            match &entry.change {
                TreeChange::Content(text) => {
                    files.insert(entry.path.clone(), text.as_bytes().to_vec());
                }
                TreeChange::Blob(sha) => {
                    let contents = state
                        .blobs
                        .get(sha)
                        .cloned()
                        .ok_or_else(|| Error::rejected("create tree", 422, "unknown blob"))?;
                    files.insert(entry.path.clone(), contents);
                }
                TreeChange::Delete => {
                    files.remove(&entry.path);
                }
            }
        }
        Ok(state.store_tree(files))
    }

    async fn create_commit(
        &self,
        _slug: &RepoSlug,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateCommit {
            message: message.to_string(),
            tree: tree.to_string(),
            parents: parents.to_vec(),
        });
        if !state.trees.contains_key(tree) {
            return Err(Error::rejected("create commit", 422, "tree not found"));
        }
        Ok(state.store_commit(tree.to_string(), message, parents.to_vec()))
    }

    async fn update_ref(&self, _slug: &RepoSlug, branch: &str, commit: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::UpdateRef {
            branch: branch.to_string(),
            commit: commit.to_string(),
        });
        if state.reject_ref_updates {
            return Err(Error::rejected("update ref", 422, "Reference update rejected"));
        }

        let tip = state.tip(branch)?;
        let parents = state.parents.get(commit).cloned().unwrap_or_default();
        if !parents.contains(&tip) {
            return Err(Error::rejected("update ref", 422, "Update is not a fast forward"));
        }
        state.branches.insert(branch.to_string(), commit.to_string());
        Ok(())
    }

    async fn download_snapshot(&self, slug: &RepoSlug, branch: &str) -> Result<Vec<u8>> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::DownloadSnapshot {
            branch: branch.to_string(),
        });
        if state.download_outage {
            return Err(Error::Unreachable {
                repository: slug.to_string(),
                attempts: vec![
                    "primary: connection refused".to_string(),
                    "alternate: connection refused".to_string(),
                ],
            });
        }

        let tip = state.tip(branch)?;
        let wrapper = format!("{}-{}-{}", slug.owner, slug.repo, &tip[..7]);
        Ok(build_snapshot_zip(&wrapper, state.files_at(&tip)))
    }
}
