//! Resolve command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::resolve;
use mirror_fs::NormalizedPath;

use crate::context::AppContext;
use crate::error::Result;

/// Run the resolve command
pub async fn run_resolve(
    ctx: &AppContext,
    reference: &str,
    path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mirror = ctx.mirror()?;
    let hint = path.map(NormalizedPath::new);
    let location = resolve(mirror.remote(), mirror.config(), reference, hint.as_ref()).await?;

    if json {
        let value = serde_json::json!({
            "owner": location.owner,
            "repo": location.repo,
            "branch": location.branch,
            "path": location.local_path.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}:   {}", "Owner".dimmed(), location.owner);
    println!("{}:    {}", "Repo".dimmed(), location.repo.cyan());
    println!("{}:  {}", "Branch".dimmed(), location.branch.cyan());
    println!("{}:    {}", "Path".dimmed(), location.local_path);
    Ok(())
}
