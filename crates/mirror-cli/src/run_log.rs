//! Last-run timestamps for scheduled repositories

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mirror_core::{RepoEntry, should_have_run_between};
use mirror_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Hours before a repo without a schedule is caught up.
pub const UNSCHEDULED_INTERVAL_HOURS: i64 = 24;

/// Task id to the time its last sync finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLog {
    runs: BTreeMap<String, DateTime<Utc>>,
}

impl RunLog {
    /// Read the log; a missing file is an empty log.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(&NormalizedPath::new(path))?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(ConfigStore::new().save(&NormalizedPath::new(path), self)?)
    }

    pub fn last_run(&self, id: &str) -> Option<DateTime<Utc>> {
        self.runs.get(id).copied()
    }

    pub fn record(&mut self, id: impl Into<String>, at: DateTime<Utc>) {
        self.runs.insert(id.into(), at);
    }

    /// Whether `entry` missed a run and should sync now.
    ///
    /// Repos that never ran are left to their schedule. With a cron
    /// expression the gap is a missed match; without one it is a day.
    pub fn is_due(&self, entry: &RepoEntry, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_run(&entry.task_id()) else {
            return false;
        };
        match &entry.cron {
            Some(expression) => should_have_run_between(
                expression,
                last.with_timezone(&Local),
                now.with_timezone(&Local),
            ),
            None => now - last >= TimeDelta::hours(UNSCHEDULED_INTERVAL_HOURS),
        }
    }
}
