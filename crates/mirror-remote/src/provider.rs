//! Remote repository trait consumed by the sync engine

use async_trait::async_trait;

use crate::Result;
use crate::types::{RepoSlug, TreeEntry};

/// Operations the sync engine needs from a hosted Git repository.
///
/// Every method returns narrowly typed identifiers validated at the
/// boundary; implementations carry their own credential.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Login of the identity the credential belongs to
    async fn authenticated_login(&self) -> Result<String>;

    /// Default branch configured for the repository
    async fn default_branch(&self, slug: &RepoSlug) -> Result<String>;

    /// Names of every branch in the repository
    async fn list_branches(&self, slug: &RepoSlug) -> Result<Vec<String>>;

    /// Commit id at the tip of `branch`, read through the branch endpoint
    async fn branch_head(&self, slug: &RepoSlug, branch: &str) -> Result<String>;

    /// Commit id `heads/<branch>` points at, read through the ref endpoint
    async fn ref_head(&self, slug: &RepoSlug, branch: &str) -> Result<String>;

    /// Root tree id of a commit
    async fn commit_tree(&self, slug: &RepoSlug, commit: &str) -> Result<String>;

    /// Upload raw bytes as a blob and return its id
    async fn create_blob(&self, slug: &RepoSlug, content: &[u8]) -> Result<String>;

    /// Materialize a new tree from `base_tree` plus `entries`
    async fn create_tree(
        &self,
        slug: &RepoSlug,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String>;

    /// Create a commit object and return its id
    async fn create_commit(
        &self,
        slug: &RepoSlug,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String>;

    /// Move `heads/<branch>` to `commit`
    async fn update_ref(&self, slug: &RepoSlug, branch: &str, commit: &str) -> Result<()>;

    /// Download a zip snapshot of the branch's current tree
    async fn download_snapshot(&self, slug: &RepoSlug, branch: &str) -> Result<Vec<u8>>;
}
