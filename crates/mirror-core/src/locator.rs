//! Repository reference resolution
//!
//! Turns loose user input (`owner/repo`, a browser URL, an SSH remote, a
//! bare repo name) into a concrete owner, repo, branch and local folder.
//! Parsing is pure; only owner and default-branch lookup touch the remote.

use std::sync::LazyLock;

use mirror_fs::NormalizedPath;
use mirror_remote::{RemoteRepository, RepoSlug};
use regex::Regex;

use crate::config::MirrorConfig;
use crate::{Error, Result};

/// `/tree/<branch>[/<rest>]`; the first segment after `tree` is the branch.
static TREE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/tree/([^/]+)((?:/[^/]*)*)$").expect("Invalid tree segment regex")
});

/// Leading `scheme://`
static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("Invalid scheme regex"));

/// Leading `[user@]host:` of an SCP-style remote
static SCP_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^@/:]+@)?[^@/:]+:").expect("Invalid scp host regex"));

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid name regex"));

/// What the reference text itself says, before any remote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    /// Absent when only a repo name was given
    pub owner: Option<String>,
    pub repo: String,
    /// Present when the reference carried `/tree/<branch>`
    pub branch: Option<String>,
    /// Segments after the branch, e.g. the folder in `/tree/main/docs`
    pub tree_rest: Option<String>,
}

/// A fully resolved repository and the folder it mirrors into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub local_path: NormalizedPath,
}

impl RepoLocation {
    pub fn slug(&self) -> RepoSlug {
        RepoSlug::new(&self.owner, &self.repo)
    }
}

/// Parse a repository reference without contacting the remote.
pub fn parse_reference(input: &str) -> Result<ParsedReference> {
    let trimmed = input.trim();
    let mut rest = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_string();

    let mut branch = None;
    let mut tree_rest = None;
    if let Some(caps) = TREE_SEGMENT.captures(&rest) {
        branch = Some(caps[1].to_string());
        let tail = caps[2].split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();
        if !tail.is_empty() {
            tree_rest = Some(tail.join("/"));
        }
        if let Some(m) = caps.get(0) {
            rest.truncate(m.start());
        }
    }

    let mut had_host = false;
    if let Some(m) = SCHEME.find(&rest) {
        rest = rest[m.end()..].to_string();
        had_host = true;
    } else if let Some(m) = SCP_HOST.find(&rest) {
        rest = rest[m.end()..].to_string();
    }

    let mut segments = rest
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    // A dotted first segment is a host when something follows it
    if !segments.is_empty() && (had_host || (segments.len() > 1 && segments[0].contains('.'))) {
        segments.remove(0);
    }

    let strip_git = |s: &str| s.strip_suffix(".git").unwrap_or(s).to_string();
    let (owner, repo) = match segments.as_slice() {
        [] => return Err(Error::invalid_reference(input, "no repository name")),
        [repo] => (None, strip_git(repo)),
        [owner, repo, ..] => (Some(owner.to_string()), strip_git(repo)),
    };

    for name in owner.iter().chain(std::iter::once(&repo)) {
        if !NAME.is_match(name) || name == "." || name == ".." {
            return Err(Error::invalid_reference(input, format!("'{name}' is not a valid name")));
        }
    }

    Ok(ParsedReference {
        owner,
        repo,
        branch: branch.filter(|b| !b.trim().is_empty()),
        tree_rest,
    })
}

/// Longest `branch[/rest...]` prefix that names an existing remote branch.
///
/// `/tree/feature/x/docs` is ambiguous until the branch list is known. When
/// the list cannot be fetched the first segment is taken.
async fn disambiguate_tree_branch<R>(
    remote: &R,
    slug: &RepoSlug,
    branch: String,
    rest: &str,
) -> String
where
    R: RemoteRepository + ?Sized,
{
    let branches = match remote.list_branches(slug).await {
        Ok(branches) => branches,
        Err(e) => {
            tracing::warn!(
                repository = %slug,
                error = %e,
                branch = %branch,
                "Branch list unavailable, using first tree segment"
            );
            return branch;
        }
    };

    let mut candidate = branch.clone();
    let mut best = branch;
    for segment in rest.split('/') {
        candidate = format!("{candidate}/{segment}");
        if branches.iter().any(|b| *b == candidate) {
            best = candidate.clone();
        }
    }
    best
}

/// Default folder for a repo when the caller gives none.
pub fn default_local_path(config: &MirrorConfig, repo: &str) -> NormalizedPath {
    config.paths.documents_root().join("github").join(repo)
}

/// Resolve a reference to owner, repo, branch and local folder.
///
/// A bare repo name is owned by the authenticated identity. Without a
/// branch in the reference the remote default branch is used, falling back
/// to the configured branch when that lookup fails.
pub async fn resolve<R>(
    remote: &R,
    config: &MirrorConfig,
    reference: &str,
    local_path_hint: Option<&NormalizedPath>,
) -> Result<RepoLocation>
where
    R: RemoteRepository + ?Sized,
{
    resolve_with_branch(remote, config, reference, local_path_hint, None).await
}

/// [`resolve`], with a branch override that skips the default-branch lookup.
///
/// The override beats a `/tree/<branch>` in the reference.
pub async fn resolve_with_branch<R>(
    remote: &R,
    config: &MirrorConfig,
    reference: &str,
    local_path_hint: Option<&NormalizedPath>,
    branch_override: Option<&str>,
) -> Result<RepoLocation>
where
    R: RemoteRepository + ?Sized,
{
    let parsed = parse_reference(reference)?;

    let owner = match parsed.owner {
        Some(owner) => owner,
        None => {
            let login = remote.authenticated_login().await?;
            tracing::debug!(login = %login, "Using authenticated identity as owner");
            login
        }
    };
    let slug = RepoSlug::new(&owner, &parsed.repo);

    let from_reference = match (parsed.branch, parsed.tree_rest.as_deref()) {
        (Some(branch), Some(rest)) if branch_override.is_none_or(str::is_empty) => {
            Some(disambiguate_tree_branch(remote, &slug, branch, rest).await)
        }
        (branch, _) => branch,
    };

    let branch = match branch_override
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .or(from_reference)
    {
        Some(branch) => branch,
        None => match remote.default_branch(&slug).await {
            Ok(branch) => branch,
            Err(e) => {
                tracing::warn!(
                    repository = %slug,
                    error = %e,
                    fallback = %config.sync.fallback_branch,
                    "Default branch lookup failed, using fallback"
                );
                config.sync.fallback_branch.clone()
            }
        },
    };

    let local_path = local_path_hint
        .cloned()
        .unwrap_or_else(|| default_local_path(config, &parsed.repo));

    tracing::debug!(owner = %owner, repo = %parsed.repo, branch = %branch, path = %local_path, "Resolved repository");
    Ok(RepoLocation {
        owner,
        repo: parsed.repo,
        branch,
        local_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parsed(owner: Option<&str>, repo: &str, branch: Option<&str>) -> ParsedReference {
        ParsedReference {
            owner: owner.map(str::to_string),
            repo: repo.to_string(),
            branch: branch.map(str::to_string),
            tree_rest: None,
        }
    }

    fn in_tree(owner: &str, repo: &str, branch: &str, rest: &str) -> ParsedReference {
        ParsedReference {
            tree_rest: Some(rest.to_string()),
            ..parsed(Some(owner), repo, Some(branch))
        }
    }

    #[rstest]
    #[case("octo/notes", parsed(Some("octo"), "notes", None))]
    #[case("notes", parsed(None, "notes", None))]
    #[case("https://github.com/octo/notes", parsed(Some("octo"), "notes", None))]
    #[case("https://github.com/octo/notes.git", parsed(Some("octo"), "notes", None))]
    #[case("https://github.com/octo/notes/", parsed(Some("octo"), "notes", None))]
    #[case("github.com/octo/notes", parsed(Some("octo"), "notes", None))]
    #[case("git@github.com:octo/notes.git", parsed(Some("octo"), "notes", None))]
    #[case("https://github.com/octo/notes/tree/dev", parsed(Some("octo"), "notes", Some("dev")))]
    #[case("octo/notes/tree/feature/x/", in_tree("octo", "notes", "feature", "x"))]
    #[case("https://github.com/octo/notes/tree/main/docs", in_tree("octo", "notes", "main", "docs"))]
    #[case("https://github.com/octo/notes/tree/main/docs/2024/?tab=files", in_tree("octo", "notes", "main", "docs/2024"))]
    #[case("octo/notes/tree/dev/", parsed(Some("octo"), "notes", Some("dev")))]
    #[case("https://github.com/octo/notes?tab=readme#top", parsed(Some("octo"), "notes", None))]
    #[case("https://github.com/octo/notes/blob/main/README.md", parsed(Some("octo"), "notes", None))]
    #[case("  octo/my.site  ", parsed(Some("octo"), "my.site", None))]
    #[case("my.site", parsed(None, "my.site", None))]
    fn parses_reference_shapes(#[case] input: &str, #[case] expected: ParsedReference) {
        assert_eq!(parse_reference(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("https://github.com/")]
    #[case("octo/no spaces")]
    #[case("/tree/main")]
    fn rejects_unusable_references(#[case] input: &str) {
        let err = parse_reference(input).unwrap_err();
        assert!(matches!(err, Error::InvalidReference { .. }), "{input}: {err}");
    }

    #[test]
    fn default_path_nests_under_documents_github() {
        let mut config = MirrorConfig::default();
        config.paths.documents_root = Some("/home/me/Documents".into());
        assert_eq!(
            default_local_path(&config, "notes").as_str(),
            "/home/me/Documents/github/notes"
        );
    }
}
