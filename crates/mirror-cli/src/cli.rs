//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use mirror_core::ForceMode;

/// Repository Mirror - Keep plain folders in step with hosted branches
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Access token for the hosting service
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Configuration file layered over the global one
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the global config and run log
    #[arg(long, global = true, env = "MIRROR_CONFIG_DIR", hide = true)]
    pub config_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Repository reference plus the optional local overrides
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RepoArgs {
    /// owner/repo, a bare repo name, or a repository URL
    pub reference: String,

    /// Local folder (defaults to <documents>/github/<repo>)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Branch (defaults to the folder's current branch, then the remote default)
    #[arg(short, long)]
    pub branch: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Compare the local folder with the remote branch
    Status {
        #[command(flatten)]
        repo: RepoArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List local changes since the last sync (no network)
    Changes {
        #[command(flatten)]
        repo: RepoArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Make the local folder match the remote branch
    Pull {
        #[command(flatten)]
        repo: RepoArgs,
    },

    /// Upload local changes as one commit
    Push {
        #[command(flatten)]
        repo: RepoArgs,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Pull, then push local changes
    Sync {
        #[command(flatten)]
        repo: RepoArgs,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Overwrite one side with the other
    ///
    /// Examples:
    ///   mirror force octo/notes --mode remote   # discard local state
    ///   mirror force octo/notes --mode local -y # push everything, no prompt
    Force {
        #[command(flatten)]
        repo: RepoArgs,

        /// Which side wins: remote or local
        #[arg(long)]
        mode: ForceMode,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show what a reference resolves to
    Resolve {
        /// owner/repo, a bare repo name, or a repository URL
        reference: String,

        /// Local folder override
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run scheduled syncs for every configured repository until Ctrl-C
    Daemon,

    /// Sync configured repositories whose schedule was missed, then exit
    CatchUp,

    /// Validate a cron expression
    CronCheck {
        /// Five-field cron expression, e.g. "*/15 * * * *"
        expression: String,

        /// Report whether it would have fired since this RFC 3339 instant
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
