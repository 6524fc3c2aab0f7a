//! Per-invocation context
//!
//! Carries the global flags every command needs: where configuration lives,
//! which file layers over it, and the access token. The remote client is
//! only built when a command actually talks to the hosting service.

use std::path::{Path, PathBuf};

use colored::Colorize;
use mirror_core::{
    ConfigResolver, Mirror, MirrorConfig, SyncProgress, SyncRequest, current_branch,
    parse_reference,
};
use mirror_fs::NormalizedPath;
use mirror_remote::GitHubRemote;

use crate::cli::RepoArgs;
use crate::error::{CliError, Result};

const RUN_LOG_FILE: &str = "last-run.json";

#[derive(Debug, Clone)]
pub struct AppContext {
    resolver: ConfigResolver,
    token: Option<String>,
}

impl AppContext {
    pub fn new(
        token: Option<String>,
        config_file: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let mut resolver = ConfigResolver::new();
        if let Some(file) = config_file {
            resolver = resolver.with_config_file(file);
        }
        if let Some(dir) = config_dir {
            resolver = resolver.with_config_dir(dir);
        }
        Self {
            resolver,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn config(&self) -> Result<MirrorConfig> {
        Ok(self.resolver.resolve()?)
    }

    /// Engine bound to the hosted service; requires a token.
    pub fn mirror(&self) -> Result<Mirror<GitHubRemote>> {
        let config = self.config()?;
        let token = self.token.as_deref().ok_or_else(|| {
            CliError::user("No access token. Pass --token or set GITHUB_TOKEN.")
        })?;
        let remote = GitHubRemote::new(token, config.remote.github_settings())?;
        Ok(Mirror::new(remote, config))
    }

    /// Where scheduled runs are recorded.
    pub fn run_log_path(&self) -> Result<PathBuf> {
        self.resolver
            .config_dir()
            .map(|dir| dir.join(RUN_LOG_FILE))
            .ok_or_else(|| CliError::user("Could not determine a configuration directory"))
    }
}

/// Build an engine request from command-line repository arguments.
///
/// Without `--branch` or a `/tree/<branch>` reference, a folder that was
/// mirrored before keeps its branch.
pub fn build_request(repo: &RepoArgs) -> SyncRequest<'static> {
    let mut request = SyncRequest::new(repo.reference.as_str());
    if let Some(path) = &repo.path {
        let path = NormalizedPath::new(path);
        let names_branch = parse_reference(&repo.reference).is_ok_and(|p| p.branch.is_some());
        let mirrored = || current_branch(&path).filter(|_| !names_branch);
        if let Some(branch) = repo.branch.clone().or_else(mirrored) {
            request = request.branch(branch);
        }
        request = request.local_path(path);
    } else if let Some(branch) = &repo.branch {
        request = request.branch(branch.as_str());
    }
    request
}

/// Progress printer handed to engine requests.
pub fn print_progress(event: &SyncProgress) {
    eprintln!("{} {}", "=>".blue().bold(), event);
}
