//! Cron-style scheduling with missed-run detection
//!
//! - [`cron`]: five-field expression matching and gap correction
//! - [`scheduler`]: per-id periodic tasks on the tokio runtime

pub mod cron;
pub mod scheduler;

pub use cron::{
    CronExpression, LOOKBACK_DAYS, cron_matches, should_have_run_between, should_have_run_since,
};
pub use scheduler::{DEFAULT_TICK, Scheduler};
