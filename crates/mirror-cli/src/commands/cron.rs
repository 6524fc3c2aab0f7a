//! Cron check command implementation

use chrono::{DateTime, Local};
use colored::Colorize;
use mirror_core::{CronExpression, should_have_run_since};

use crate::error::{CliError, Result};

/// Run the cron-check command
pub fn run_cron_check(expression: &str, since: Option<&str>) -> Result<()> {
    let cron = CronExpression::parse(expression)?;
    println!("{} {} is a valid schedule.", "OK".green().bold(), cron.as_str().cyan());

    if let Some(since) = since {
        let since = DateTime::parse_from_rfc3339(since)
            .map_err(|e| CliError::user(format!("Invalid --since '{since}': {e}")))?
            .with_timezone(&Local);
        if should_have_run_since(cron.as_str(), since) {
            println!("It would have run since {}.", since.to_rfc3339());
        } else {
            println!("It would not have run since {}.", since.to_rfc3339());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_expression() {
        let err = run_cron_check("61 * * * *", None).unwrap_err();
        assert!(matches!(err, CliError::Core(mirror_core::Error::InvalidSchedule { .. })));
    }

    #[test]
    fn rejects_malformed_since() {
        let err = run_cron_check("* * * * *", Some("yesterday")).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn accepts_valid_input() {
        run_cron_check("*/15 * * * *", Some("2024-06-01T00:00:00Z")).unwrap();
    }
}
