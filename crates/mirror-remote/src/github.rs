//! GitHub REST implementation of [`RemoteRepository`]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::provider::RemoteRepository;
use crate::types::{RepoSlug, TreeChange, TreeEntry};
use crate::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_ARCHIVE_BASE: &str = "https://codeload.github.com";

const API_VERSION: &str = "2022-11-28";
const BRANCH_PAGE_SIZE: usize = 100;

/// Endpoints and client identity used by [`GitHubRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    /// REST API root
    pub api_base: String,
    /// Host serving archives directly, tried when the API download fails
    pub archive_base: String,
    /// Sent as `User-Agent` on every request
    pub user_agent: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            archive_base: DEFAULT_ARCHIVE_BASE.to_string(),
            user_agent: concat!("repo-mirror/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Remote repository backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubRemote {
    client: reqwest::Client,
    settings: GitHubSettings,
}

#[derive(Deserialize)]
struct WireUser {
    login: String,
}

#[derive(Deserialize)]
struct WireRepository {
    default_branch: String,
}

#[derive(Deserialize)]
struct WireSha {
    sha: String,
}

#[derive(Deserialize)]
struct WireBranch {
    name: String,
    commit: WireSha,
}

#[derive(Deserialize)]
struct WireRef {
    object: WireSha,
}

#[derive(Deserialize)]
struct WireCommit {
    tree: WireSha,
}

#[derive(Deserialize)]
struct WireError {
    message: String,
}

impl GitHubRemote {
    /// Build a client that authenticates every request with `token`.
    pub fn new(token: &str, settings: GitHubSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::InvalidCredential)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| Error::Transport {
                operation: "client setup".to_string(),
                source,
            })?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &GitHubSettings {
        &self.settings
    }

    /// Snapshot URLs in the order they are attempted.
    pub fn snapshot_urls(&self, slug: &RepoSlug, branch: &str) -> [String; 2] {
        [
            format!(
                "{}/repos/{}/{}/zipball/{}",
                self.settings.api_base.trim_end_matches('/'),
                slug.owner,
                slug.repo,
                branch
            ),
            format!(
                "{}/{}/{}/zip/refs/heads/{}",
                self.settings.archive_base.trim_end_matches('/'),
                slug.owner,
                slug.repo,
                branch
            ),
        ]
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.api_base.trim_end_matches('/'), path)
    }

    fn repo_url(&self, slug: &RepoSlug, path: &str) -> String {
        self.api_url(&format!("repos/{}/{}/{}", slug.owner, slug.repo, path))
    }

    async fn fetch<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        tracing::debug!(operation, "Calling remote");
        let response = request.send().await.map_err(|source| Error::Transport {
            operation: operation.to_string(),
            source,
        })?;
        let response = ensure_success(operation, response).await?;
        let body = response.bytes().await.map_err(|source| Error::Transport {
            operation: operation.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|e| Error::InvalidResponse {
            operation: operation.to_string(),
            message: e.to_string(),
        })
    }
}

async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::rejected(operation, status.as_u16(), rejection_message(&body)))
}

/// Extract GitHub's `message` field from an error body, or return the body as-is.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<WireError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn require_id(operation: &str, sha: String) -> Result<String> {
    if sha.trim().is_empty() {
        return Err(Error::InvalidResponse {
            operation: operation.to_string(),
            message: "empty object id".to_string(),
        });
    }
    Ok(sha)
}

/// Wire form of a tree entry; deletions are a blob entry with a null sha.
fn tree_entry_json(entry: &TreeEntry) -> Value {
    match &entry.change {
        TreeChange::Content(content) => json!({
            "path": entry.path,
            "mode": "100644",
            "type": "blob",
            "content": content,
        }),
        TreeChange::Blob(sha) => json!({
            "path": entry.path,
            "mode": "100644",
            "type": "blob",
            "sha": sha,
        }),
        TreeChange::Delete => json!({
            "path": entry.path,
            "mode": "100644",
            "type": "blob",
            "sha": Value::Null,
        }),
    }
}

#[async_trait]
impl RemoteRepository for GitHubRemote {
    async fn authenticated_login(&self) -> Result<String> {
        let user: WireUser = self
            .fetch("get authenticated user", self.client.get(self.api_url("user")))
            .await?;
        Ok(user.login)
    }

    async fn default_branch(&self, slug: &RepoSlug) -> Result<String> {
        let url = self.api_url(&format!("repos/{}/{}", slug.owner, slug.repo));
        let repository: WireRepository = self.fetch("get repository", self.client.get(url)).await?;
        Ok(repository.default_branch)
    }

    async fn list_branches(&self, slug: &RepoSlug) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut page = 1;
        loop {
            let url = self.repo_url(
                slug,
                &format!("branches?per_page={BRANCH_PAGE_SIZE}&page={page}"),
            );
            let batch: Vec<WireBranch> = self.fetch("list branches", self.client.get(url)).await?;
            let count = batch.len();
            names.extend(batch.into_iter().map(|b| b.name));
            if count < BRANCH_PAGE_SIZE {
                return Ok(names);
            }
            page += 1;
        }
    }

    async fn branch_head(&self, slug: &RepoSlug, branch: &str) -> Result<String> {
        let url = self.repo_url(slug, &format!("branches/{branch}"));
        let wire: WireBranch = self.fetch("get branch", self.client.get(url)).await?;
        require_id("get branch", wire.commit.sha)
    }

    async fn ref_head(&self, slug: &RepoSlug, branch: &str) -> Result<String> {
        let url = self.repo_url(slug, &format!("git/ref/heads/{branch}"));
        let wire: WireRef = self.fetch("get ref", self.client.get(url)).await?;
        require_id("get ref", wire.object.sha)
    }

    async fn commit_tree(&self, slug: &RepoSlug, commit: &str) -> Result<String> {
        let url = self.repo_url(slug, &format!("git/commits/{commit}"));
        let wire: WireCommit = self.fetch("get commit", self.client.get(url)).await?;
        require_id("get commit", wire.tree.sha)
    }

    async fn create_blob(&self, slug: &RepoSlug, content: &[u8]) -> Result<String> {
        let body = json!({
            "content": STANDARD.encode(content),
            "encoding": "base64",
        });
        let request = self.client.post(self.repo_url(slug, "git/blobs")).json(&body);
        let wire: WireSha = self.fetch("create blob", request).await?;
        require_id("create blob", wire.sha)
    }

    async fn create_tree(
        &self,
        slug: &RepoSlug,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String> {
        let body = json!({
            "base_tree": base_tree,
            "tree": entries.iter().map(tree_entry_json).collect::<Vec<_>>(),
        });
        let request = self.client.post(self.repo_url(slug, "git/trees")).json(&body);
        let wire: WireSha = self.fetch("create tree", request).await?;
        require_id("create tree", wire.sha)
    }

    async fn create_commit(
        &self,
        slug: &RepoSlug,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String> {
        let body = json!({
            "message": message,
            "tree": tree,
            "parents": parents,
        });
        let request = self.client.post(self.repo_url(slug, "git/commits")).json(&body);
        let wire: WireSha = self.fetch("create commit", request).await?;
        require_id("create commit", wire.sha)
    }

    async fn update_ref(&self, slug: &RepoSlug, branch: &str, commit: &str) -> Result<()> {
        let body = json!({ "sha": commit, "force": false });
        let request = self
            .client
            .patch(self.repo_url(slug, &format!("git/refs/heads/{branch}")))
            .json(&body);
        let _: Value = self.fetch("update ref", request).await?;
        Ok(())
    }

    async fn download_snapshot(&self, slug: &RepoSlug, branch: &str) -> Result<Vec<u8>> {
        let mut attempts = Vec::new();

        for url in self.snapshot_urls(slug, branch) {
            tracing::debug!(url = %url, "Downloading snapshot");
            let response = match self.client.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Snapshot download failed");
                    attempts.push(format!("{url}: {e}"));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(url = %url, status = status.as_u16(), "Snapshot download rejected");
                attempts.push(format!("{url}: HTTP {}", status.as_u16()));
                continue;
            }

            match response.bytes().await {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Snapshot body interrupted");
                    attempts.push(format!("{url}: {e}"));
                }
            }
        }

        Err(Error::Unreachable {
            repository: slug.to_string(),
            attempts,
        })
    }
}
