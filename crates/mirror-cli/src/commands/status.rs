//! Status and changes command implementations

use colored::Colorize;
use mirror_core::{
    FileChange, FileStatus, RecommendedAction, current_branch, default_local_path,
    detect_changes, parse_reference,
};
use mirror_fs::NormalizedPath;

use super::short_revision;
use crate::cli::RepoArgs;
use crate::context::{AppContext, build_request};
use crate::error::Result;

/// Run the status command
///
/// Contacts the remote for its tip; changes nothing on either side.
pub async fn run_status(ctx: &AppContext, repo: &RepoArgs, json: bool) -> Result<()> {
    let mirror = ctx.mirror()?;
    let request = build_request(repo);
    let location = mirror.locate(&request).await?;
    let request = request
        .local_path(location.local_path.clone())
        .branch(location.branch.clone());
    let status = mirror.fetch_status(&request).await?;
    let action = status.recommended_action();

    if json {
        let value = serde_json::json!({
            "owner": location.owner,
            "repo": location.repo,
            "branch": location.branch,
            "path": location.local_path.as_str(),
            "status": status,
            "recommended_action": action,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Mirror Status".bold());
    println!();
    println!(
        "{}:  {}/{}@{}",
        "Remote".dimmed(),
        location.owner,
        location.repo,
        location.branch.cyan()
    );
    println!("{}:    {}", "Path".dimmed(), location.local_path);
    println!(
        "{}:  {}",
        "Remote tip".dimmed(),
        short_revision(&status.remote_revision)
    );
    let local = if status.local_revision.is_empty() {
        "never synced".dimmed().to_string()
    } else {
        short_revision(&status.local_revision).to_string()
    };
    println!("{}:  {}", "Last sync".dimmed(), local);
    println!();

    if status.is_dirty {
        println!("{}:", "Local changes".bold());
        print_changes(&status.changes);
        println!();
    }

    let (label, hint) = match action {
        RecommendedAction::UpToDate => ("UP TO DATE".green().bold(), None),
        RecommendedAction::Pull => ("BEHIND".yellow().bold(), Some("mirror pull")),
        RecommendedAction::Push => ("CHANGED".yellow().bold(), Some("mirror push")),
        RecommendedAction::Sync => ("DIVERGED".red().bold(), Some("mirror sync")),
    };
    match hint {
        Some(hint) => println!("{} Run {} to catch up.", label, hint.cyan()),
        None => println!("{} Nothing to do.", label),
    }
    Ok(())
}

/// Run the changes command
///
/// Works offline: the folder and branch come from the arguments, the
/// folder's own metadata, or configuration.
pub fn run_changes(ctx: &AppContext, repo: &RepoArgs, json: bool) -> Result<()> {
    let config = ctx.config()?;
    let parsed = parse_reference(&repo.reference)?;
    let root = repo
        .path
        .as_ref()
        .map(NormalizedPath::new)
        .unwrap_or_else(|| default_local_path(&config, &parsed.repo));
    let branch = repo
        .branch
        .clone()
        .or(parsed.branch)
        .or_else(|| current_branch(&root))
        .unwrap_or_else(|| config.sync.fallback_branch.clone());

    let changes = detect_changes(&root, &branch);

    if json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
        return Ok(());
    }

    if changes.is_empty() {
        println!("{} No local changes on {}.", "OK".green().bold(), branch.cyan());
    } else {
        println!(
            "{} local change(s) on {} in {}:",
            changes.len(),
            branch.cyan(),
            root
        );
        print_changes(&changes);
    }
    Ok(())
}

pub(crate) fn print_changes(changes: &[FileChange]) {
    for change in changes {
        let marker = match change.status {
            FileStatus::Added => "+".green(),
            FileStatus::Modified => "~".yellow(),
            FileStatus::Deleted => "-".red(),
            FileStatus::Unmodified => " ".normal(),
        };
        println!("   {} {} ({})", marker, change.path, change.status.to_string().dimmed());
    }
}
