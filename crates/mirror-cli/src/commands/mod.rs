//! Command implementations for mirror-cli

pub mod cron;
pub mod daemon;
pub mod force;
pub mod resolve;
pub mod status;
pub mod sync;

pub use cron::run_cron_check;
pub use daemon::{run_catch_up, run_daemon};
pub use force::run_force;
pub use resolve::run_resolve;
pub use status::{run_changes, run_status};
pub use sync::{run_pull, run_push, run_sync};

/// First seven characters of a revision id.
pub(crate) fn short_revision(revision: &str) -> &str {
    revision.get(..7).unwrap_or(revision)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_revision_truncates() {
        assert_eq!(short_revision("0123456789abcdef"), "0123456");
        assert_eq!(short_revision("abc"), "abc");
        assert_eq!(short_revision(""), "");
    }
}
