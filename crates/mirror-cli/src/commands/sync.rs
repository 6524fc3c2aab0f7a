//! Pull, push and sync command implementations

use colored::Colorize;

use super::short_revision;
use super::status::print_changes;
use crate::cli::RepoArgs;
use crate::context::{AppContext, build_request, print_progress};
use crate::error::Result;

/// Run the pull command
pub async fn run_pull(ctx: &AppContext, repo: &RepoArgs) -> Result<()> {
    let mirror = ctx.mirror()?;
    let request = build_request(repo).progress(&print_progress);

    let report = mirror.pull(&request).await?;

    println!(
        "{} Pulled {}: {} file(s) written, {} pruned.",
        "OK".green().bold(),
        short_revision(&report.revision).cyan(),
        report.written,
        report.pruned.len()
    );
    for path in &report.pruned {
        println!("   {} {}", "-".red(), path);
    }
    Ok(())
}

/// Run the push command
pub async fn run_push(ctx: &AppContext, repo: &RepoArgs, message: Option<&str>) -> Result<()> {
    let mirror = ctx.mirror()?;
    let mut request = build_request(repo).progress(&print_progress);
    if let Some(message) = message {
        request = request.message(message);
    }

    let report = mirror.push(&request).await?;

    match &report.commit {
        Some(commit) => {
            println!(
                "{} Pushed {} change(s) as {}.",
                "OK".green().bold(),
                report.changes.len(),
                short_revision(commit).cyan()
            );
            print_changes(&report.changes);
        }
        None => println!("{} Nothing to push.", "OK".green().bold()),
    }
    Ok(())
}

/// Run the sync command
pub async fn run_sync(ctx: &AppContext, repo: &RepoArgs, message: Option<&str>) -> Result<()> {
    let mirror = ctx.mirror()?;
    let mut request = build_request(repo).progress(&print_progress);
    if let Some(message) = message {
        request = request.message(message);
    }

    let report = mirror.sync(&request).await?;

    println!(
        "{} Pulled {} ({} written, {} pruned).",
        "OK".green().bold(),
        short_revision(&report.pull.revision).cyan(),
        report.pull.written,
        report.pull.pruned.len()
    );
    match &report.push.commit {
        Some(commit) => {
            println!(
                "{} Pushed {} change(s) as {}.",
                "OK".green().bold(),
                report.push.changes.len(),
                short_revision(commit).cyan()
            );
            print_changes(&report.push.changes);
        }
        None => println!("{} No local changes to push.", "OK".green().bold()),
    }
    Ok(())
}
