//! Mirror configuration
//!
//! - [`MirrorConfig`]: endpoints, paths, commit messages and managed repos
//! - [`ConfigResolver`]: layers the global config file under an explicit one

mod resolver;

pub use resolver::ConfigResolver;

use std::path::PathBuf;

use mirror_fs::NormalizedPath;
use mirror_remote::GitHubSettings;
use serde::{Deserialize, Serialize};

/// Effective configuration of the sync engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub remote: RemoteConfig,
    pub paths: PathsConfig,
    pub sync: SyncConfig,
    /// Repositories the scheduling daemon manages
    pub repos: Vec<RepoEntry>,
}

/// `[remote]`: where and how the remote service is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    /// Alternate snapshot host
    pub archive_base: String,
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        let settings = GitHubSettings::default();
        Self {
            api_base: settings.api_base,
            archive_base: settings.archive_base,
            user_agent: settings.user_agent,
        }
    }
}

impl RemoteConfig {
    pub fn github_settings(&self) -> GitHubSettings {
        GitHubSettings {
            api_base: self.api_base.clone(),
            archive_base: self.archive_base.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// `[paths]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root under which default local paths are synthesized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_root: Option<PathBuf>,
}

impl PathsConfig {
    /// Configured documents root, else the platform documents directory,
    /// else `<home>/Documents`, else `./Documents`.
    pub fn documents_root(&self) -> NormalizedPath {
        let root = self
            .documents_root
            .clone()
            .or_else(dirs::document_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .unwrap_or_else(|| PathBuf::from("Documents"));
        NormalizedPath::new(root)
    }
}

/// `[sync]`: commit messages and branch fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub commit_message: String,
    pub force_push_message: String,
    /// Used when the remote's default branch cannot be queried
    pub fallback_branch: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            commit_message: "Mirror Sync".to_string(),
            force_push_message: "Force Push from Mirror".to_string(),
            fallback_branch: "main".to_string(),
        }
    }
}

/// `[[repos]]`: one repository kept in sync by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

impl RepoEntry {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            local_path: None,
            branch: None,
            cron: None,
        }
    }

    /// Stable key for scheduling and run bookkeeping.
    pub fn task_id(&self) -> String {
        match &self.branch {
            Some(branch) => format!("{}@{}", self.reference, branch),
            None => self.reference.clone(),
        }
    }
}
