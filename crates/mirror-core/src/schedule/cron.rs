//! Five-field cron expressions
//!
//! ```text
//! * * * * *
//! | | | | +-- day of week (0-6, Sunday = 0)
//! | | | +---- month (1-12)
//! | | +------ day of month (1-31)
//! | +-------- hour (0-23)
//! +---------- minute (0-59)
//! ```
//!
//! Each field is `*`, `*/N` (value divisible by N), or a comma list of
//! literals and `A-B` ranges. Matching is lenient: anything malformed simply
//! never matches. [`CronExpression::parse`] is the strict counterpart for
//! callers that want to reject bad input up front.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, TimeDelta, TimeZone, Timelike};

use crate::{Error, Result};

/// Upper bound on how far back gap correction looks.
pub const LOOKBACK_DAYS: i64 = 31;

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
}

const FIELDS: [FieldSpec; 5] = [
    FieldSpec { name: "minute", min: 0, max: 59 },
    FieldSpec { name: "hour", min: 0, max: 23 },
    FieldSpec { name: "day of month", min: 1, max: 31 },
    FieldSpec { name: "month", min: 1, max: 12 },
    FieldSpec { name: "day of week", min: 0, max: 6 },
];

/// A validated cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    source: String,
    fields: Vec<String>,
}

impl CronExpression {
    /// Parse and validate every field against its range.
    pub fn parse(expression: &str) -> Result<Self> {
        let fields = expression
            .split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>();
        if fields.len() != FIELDS.len() {
            return Err(Error::invalid_schedule(
                expression,
                format!("expected 5 fields, found {}", fields.len()),
            ));
        }

        for (pattern, spec) in fields.iter().zip(FIELDS.iter()) {
            validate_field(pattern, spec)
                .map_err(|reason| Error::invalid_schedule(expression, reason))?;
        }

        Ok(Self {
            source: expression.trim().to_string(),
            fields,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches<T: Datelike + Timelike>(&self, instant: &T) -> bool {
        fields_match(&self.fields, instant)
    }
}

impl FromStr for CronExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Whether `expression` fires at `instant`; malformed input never fires.
pub fn cron_matches<T: Datelike + Timelike>(expression: &str, instant: &T) -> bool {
    let fields = expression.split_whitespace().collect::<Vec<_>>();
    fields.len() == FIELDS.len() && fields_match(&fields, instant)
}

/// Whether `expression` would have fired after `last_run`, up to the current time.
pub fn should_have_run_since(expression: &str, last_run: DateTime<Local>) -> bool {
    should_have_run_between(expression, last_run, Local::now())
}

/// Whether `expression` matches a minute-aligned instant in `(last_run, now]`.
///
/// Scans backward from `now` one minute at a time, no further than
/// [`LOOKBACK_DAYS`]. A `last_run` at or after `now` is never a gap.
pub fn should_have_run_between<Tz: TimeZone>(
    expression: &str,
    last_run: DateTime<Tz>,
    now: DateTime<Tz>,
) -> bool {
    if last_run >= now {
        return false;
    }

    let Some(mut check) = now.with_second(0).and_then(|t| t.with_nanosecond(0)) else {
        return false;
    };
    let limit = std::cmp::max(last_run, now - TimeDelta::days(LOOKBACK_DAYS));
    let step = TimeDelta::minutes(1);

    while check > limit {
        if cron_matches(expression, &check) {
            return true;
        }
        check = check - step;
    }
    false
}

fn fields_match<S: AsRef<str>, T: Datelike + Timelike>(fields: &[S], instant: &T) -> bool {
    let values = [
        instant.minute(),
        instant.hour(),
        instant.day(),
        instant.month(),
        instant.weekday().num_days_from_sunday(),
    ];
    fields
        .iter()
        .zip(values)
        .all(|(pattern, value)| field_matches(pattern.as_ref(), value))
}

fn field_matches(pattern: &str, value: u32) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(step) = pattern.strip_prefix("*/") {
        return match step.parse::<u32>() {
            Ok(step) if step > 0 => value % step == 0,
            _ => false,
        };
    }
    pattern.split(',').any(|item| item_matches(item, value))
}

fn item_matches(item: &str, value: u32) -> bool {
    match item.split_once('-') {
        Some((start, end)) => match (start.parse::<u32>(), end.parse::<u32>()) {
            (Ok(start), Ok(end)) => (start..=end).contains(&value),
            _ => false,
        },
        None => item.parse::<u32>().is_ok_and(|literal| literal == value),
    }
}

fn validate_field(pattern: &str, spec: &FieldSpec) -> std::result::Result<(), String> {
    if pattern == "*" {
        return Ok(());
    }
    if let Some(step) = pattern.strip_prefix("*/") {
        return match step.parse::<u32>() {
            Ok(step) if step > 0 => Ok(()),
            _ => Err(format!("{}: step must be a positive integer, got '{step}'", spec.name)),
        };
    }

    for item in pattern.split(',') {
        let (start, end) = match item.split_once('-') {
            Some((start, end)) => (start, end),
            None => (item, item),
        };
        let start = parse_in_range(start, spec)?;
        let end = parse_in_range(end, spec)?;
        if start > end {
            return Err(format!("{}: range '{item}' runs backwards", spec.name));
        }
    }
    Ok(())
}

fn parse_in_range(text: &str, spec: &FieldSpec) -> std::result::Result<u32, String> {
    let value = text
        .parse::<u32>()
        .map_err(|_| format!("{}: '{text}' is not a number", spec.name))?;
    if value < spec.min || value > spec.max {
        return Err(format!(
            "{}: {value} is outside {}-{}",
            spec.name, spec.min, spec.max
        ));
    }
    Ok(value)
}
