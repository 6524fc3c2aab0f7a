//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based confirmation.

use std::io::IsTerminal;

use colored::Colorize;
use dialoguer::Confirm;
use mirror_core::{ForceMode, RepoLocation};

use crate::error::{CliError, Result};

/// What a force-sync is about to destroy, in words.
pub fn force_warning(mode: ForceMode, location: &RepoLocation) -> String {
    match mode {
        ForceMode::Remote => format!(
            "Every file in {} will be deleted and replaced with {}/{}@{}.",
            location.local_path, location.owner, location.repo, location.branch
        ),
        ForceMode::Local => format!(
            "{}/{}@{} will receive every local change from {}, overwriting remote edits to those files.",
            location.owner, location.repo, location.branch, location.local_path
        ),
    }
}

/// Ask before a force-sync. Returns whether the user agreed.
///
/// Refuses outright when stdin is not a terminal.
pub fn confirm_force(mode: ForceMode, location: &RepoLocation) -> Result<bool> {
    println!("{} {}", "WARNING".yellow().bold(), force_warning(mode, location));

    if !std::io::stdin().is_terminal() {
        return Err(CliError::user(
            "Refusing to force-sync without confirmation. Pass --yes to proceed.",
        ));
    }

    let confirmed = Confirm::new()
        .with_prompt(format!("Force-sync from {mode}?"))
        .default(false)
        .interact()?;
    Ok(confirmed)
}
