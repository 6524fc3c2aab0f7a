//! Daemon and catch-up command implementations
//!
//! Both work from the `[[repos]]` list in configuration. The daemon
//! schedules every entry that has a cron expression; catch-up only syncs
//! entries whose last recorded run is older than their schedule allows.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;
use mirror_core::{CronExpression, Mirror, OperationLocks, RepoEntry, Scheduler, SyncRequest};
use mirror_fs::NormalizedPath;
use mirror_remote::RemoteRepository;
use tokio::sync::Mutex;

use crate::context::AppContext;
use crate::error::Result;
use crate::run_log::RunLog;

/// Runs syncs for configured entries and records when they finished.
pub struct Runner<R> {
    mirror: Arc<Mirror<R>>,
    locks: OperationLocks,
    log: Arc<Mutex<RunLog>>,
    log_path: Arc<PathBuf>,
}

impl<R> Clone for Runner<R> {
    fn clone(&self) -> Self {
        Self {
            mirror: Arc::clone(&self.mirror),
            locks: self.locks.clone(),
            log: Arc::clone(&self.log),
            log_path: Arc::clone(&self.log_path),
        }
    }
}

impl<R: RemoteRepository> Runner<R> {
    pub fn new(mirror: Mirror<R>, log_path: PathBuf) -> Result<Self> {
        let log = RunLog::load(&log_path)?;
        Ok(Self {
            mirror: Arc::new(mirror),
            locks: OperationLocks::new(),
            log: Arc::new(Mutex::new(log)),
            log_path: Arc::new(log_path),
        })
    }

    pub fn entries(&self) -> &[RepoEntry] {
        &self.mirror.config().repos
    }

    /// Sync one entry. Failures are logged, not returned.
    pub async fn run(&self, entry: &RepoEntry) -> bool {
        let id = entry.task_id();
        let mut request = SyncRequest::new(entry.reference.as_str());
        if let Some(path) = &entry.local_path {
            request = request.local_path(NormalizedPath::new(path));
        }
        if let Some(branch) = &entry.branch {
            request = request.branch(branch.as_str());
        }

        let location = match self.mirror.locate(&request).await {
            Ok(location) => location,
            Err(e) => {
                tracing::error!(id = %id, error = %e, "Could not resolve scheduled repository");
                return false;
            }
        };

        let _guard = self.locks.acquire(&location.local_path, &location.branch).await;
        let request = request
            .local_path(location.local_path.clone())
            .branch(location.branch.clone());

        match self.mirror.sync(&request).await {
            Ok(report) => {
                tracing::info!(
                    id = %id,
                    revision = %report.pull.revision,
                    pushed = report.push.changes.len(),
                    "Scheduled sync finished"
                );
                self.record(&id).await;
                true
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, kind = ?e.kind(), "Scheduled sync failed");
                false
            }
        }
    }

    async fn record(&self, id: &str) {
        let mut log = self.log.lock().await;
        log.record(id, Utc::now());
        if let Err(e) = log.save(&self.log_path) {
            tracing::warn!(id, path = %self.log_path.display(), error = %e, "Failed to save run log");
        }
    }

    /// Sync every entry that missed a run. Returns (due, succeeded).
    pub async fn catch_up(&self) -> (usize, usize) {
        let now = Utc::now();
        let due = {
            let log = self.log.lock().await;
            self.entries()
                .iter()
                .filter(|entry| log.is_due(entry, now))
                .cloned()
                .collect::<Vec<_>>()
        };

        let mut succeeded = 0;
        for entry in &due {
            tracing::info!(id = %entry.task_id(), "Catching up missed sync");
            if self.run(entry).await {
                succeeded += 1;
            }
        }
        (due.len(), succeeded)
    }
}

/// Run the catch-up command
pub async fn run_catch_up(ctx: &AppContext) -> Result<()> {
    let runner = Runner::new(ctx.mirror()?, ctx.run_log_path()?)?;
    let (due, succeeded) = runner.catch_up().await;

    if due == 0 {
        println!("{} No missed syncs.", "OK".green().bold());
    } else {
        println!(
            "{} Caught up {}/{} repositor(ies).",
            if succeeded == due { "OK".green().bold() } else { "PARTIAL".yellow().bold() },
            succeeded,
            due
        );
    }
    Ok(())
}

/// Run the daemon command
///
/// Catches up first, then schedules every entry with a valid cron
/// expression and runs until Ctrl-C.
pub async fn run_daemon(ctx: &AppContext) -> Result<()> {
    let runner = Runner::new(ctx.mirror()?, ctx.run_log_path()?)?;

    let mut scheduler = Scheduler::new();
    for entry in runner.entries() {
        let Some(expression) = entry.cron.as_deref() else {
            continue;
        };
        if let Err(e) = CronExpression::parse(expression) {
            println!("{} Skipping {}: {}", "WARNING".yellow().bold(), entry.task_id(), e);
            continue;
        }

        let task_runner = runner.clone();
        let task_entry = entry.clone();
        scheduler.schedule(entry.task_id(), expression, move || {
            let runner = task_runner.clone();
            let entry = task_entry.clone();
            async move {
                runner.run(&entry).await;
            }
        });
    }

    if scheduler.is_empty() {
        println!(
            "No repositories with a schedule. Add {} entries with a {} to the config.",
            "[[repos]]".cyan(),
            "cron".cyan()
        );
        return Ok(());
    }

    let (due, _) = runner.catch_up().await;
    if due > 0 {
        println!("{} Caught up {} missed sync(s).", "=>".blue().bold(), due);
    }

    println!(
        "{} Watching {} repositor(ies): {}",
        "=>".blue().bold(),
        scheduler.len(),
        scheduler.ids().join(", ")
    );
    println!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c().await?;
    scheduler.stop_all();
    println!("{}", "Stopped.".dimmed());
    Ok(())
}
