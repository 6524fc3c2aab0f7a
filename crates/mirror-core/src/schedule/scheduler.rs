//! Periodic cron tasks

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::cron::{CronExpression, cron_matches};

/// How often a scheduled expression is evaluated.
pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

/// Owns one timer task per id.
///
/// Must be used from within a tokio runtime. Dropping the scheduler stops
/// every timer; runs already in progress finish on their own.
#[derive(Debug)]
pub struct Scheduler {
    tasks: HashMap<String, JoinHandle<()>>,
    period: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_period(DEFAULT_TICK)
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            tasks: HashMap::new(),
            period,
        }
    }

    /// Run `task` on every tick whose local time matches `expression`.
    ///
    /// Replaces any task already scheduled under `id`. The first tick comes
    /// one period after scheduling. A malformed expression is accepted but
    /// never fires.
    pub fn schedule<F, Fut>(&mut self, id: impl Into<String>, expression: &str, task: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = id.into();
        self.stop(&id);

        if let Err(e) = CronExpression::parse(expression) {
            tracing::warn!(id = %id, error = %e, "Scheduled expression is not valid cron");
        }

        tracing::info!(id = %id, expression, "Task scheduled");

        let period = self.period;
        let expression = expression.to_string();
        let task_id = id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let now = Local::now();
                if cron_matches(&expression, &now) {
                    tracing::info!(id = %task_id, at = %now.to_rfc3339(), "Running scheduled task");
                    tokio::spawn(task());
                }
            }
        });

        self.tasks.insert(id, handle);
    }

    /// Stop the task scheduled under `id`. Returns whether one existed.
    pub fn stop(&mut self, id: &str) -> bool {
        match self.tasks.remove(id) {
            Some(handle) => {
                handle.abort();
                tracing::info!(id, "Task stopped");
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        for (id, handle) in self.tasks.drain() {
            handle.abort();
            tracing::debug!(id = %id, "Task stopped");
        }
    }

    pub fn is_scheduled(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Ids of every scheduled task, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids = self.tasks.keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}
