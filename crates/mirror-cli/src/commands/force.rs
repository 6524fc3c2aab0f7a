//! Force-sync command implementation

use colored::Colorize;
use mirror_core::{ForceMode, ForceReport};

use super::short_revision;
use super::status::print_changes;
use crate::cli::RepoArgs;
use crate::context::{AppContext, build_request, print_progress};
use crate::error::Result;
use crate::interactive;

/// Run the force command
///
/// Resolves first so the confirmation names the exact folder and branch,
/// then runs against that resolution.
pub async fn run_force(ctx: &AppContext, repo: &RepoArgs, mode: ForceMode, yes: bool) -> Result<()> {
    let mirror = ctx.mirror()?;
    let request = build_request(repo);
    let location = mirror.locate(&request).await?;

    if mode == ForceMode::Local {
        let pending = mirror.changes(&location);
        println!("{} change(s) to push:", pending.len());
        print_changes(&pending);
    }

    if !yes && !interactive::confirm_force(mode, &location)? {
        println!("{}", "Aborted.".dimmed());
        return Ok(());
    }

    let request = request
        .local_path(location.local_path.clone())
        .branch(location.branch.clone())
        .progress(&print_progress);

    match mirror.force_sync(&request, mode).await? {
        ForceReport::Remote {
            wipe_failures,
            pull,
        } => {
            println!(
                "{} {} now mirrors {} ({} file(s)).",
                "OK".green().bold(),
                location.local_path,
                short_revision(&pull.revision).cyan(),
                pull.written
            );
            if wipe_failures > 0 {
                println!(
                    "{} {} entr(ies) could not be removed before the pull.",
                    "WARNING".yellow().bold(),
                    wipe_failures
                );
            }
        }
        ForceReport::Local { push } => match push.commit {
            Some(commit) => println!(
                "{} Force-pushed {} change(s) as {}.",
                "OK".green().bold(),
                push.changes.len(),
                short_revision(&commit).cyan()
            ),
            None => println!("{} Nothing to push.", "OK".green().bold()),
        },
    }
    Ok(())
}
