//! Repository Mirror CLI
//!
//! Mirrors hosted repository branches into plain local folders and pushes
//! local edits back, on demand or on a cron schedule.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;
mod run_log;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::AppContext;
use error::Result;

const LOG_TARGETS: [&str; 4] = ["mirror", "mirror_core", "mirror_remote", "mirror_fs"];

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} Repository Mirror CLI", "mirror".green().bold());
        println!();
        println!("Run {} for available commands.", "mirror --help".cyan());
        return Ok(());
    };

    let ctx = AppContext::new(cli.token, cli.config, cli.config_dir);
    execute_command(&ctx, command).await
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(format!("warn,{directives}"))
    });

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

async fn execute_command(ctx: &AppContext, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status { repo, json } => commands::run_status(ctx, &repo, json).await,
        Commands::Changes { repo, json } => commands::run_changes(ctx, &repo, json),
        Commands::Pull { repo } => commands::run_pull(ctx, &repo).await,
        Commands::Push { repo, message } => {
            commands::run_push(ctx, &repo, message.as_deref()).await
        }
        Commands::Sync { repo, message } => {
            commands::run_sync(ctx, &repo, message.as_deref()).await
        }
        Commands::Force { repo, mode, yes } => commands::run_force(ctx, &repo, mode, yes).await,
        Commands::Resolve {
            reference,
            path,
            json,
        } => commands::run_resolve(ctx, &reference, path.as_deref(), json).await,
        Commands::Daemon => commands::run_daemon(ctx).await,
        Commands::CatchUp => commands::run_catch_up(ctx).await,
        Commands::CronCheck { expression, since } => {
            commands::run_cron_check(&expression, since.as_deref())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mirror", &mut std::io::stdout());
            Ok(())
        }
    }
}
