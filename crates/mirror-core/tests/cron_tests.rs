//! Cron matching and gap-correction tests

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use mirror_core::{CronExpression, cron_matches, should_have_run_between, should_have_run_since};
use pretty_assertions::assert_eq;

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    let mut t = start;
    while t < end {
        out.push(t);
        t += TimeDelta::minutes(1);
    }
    out
}

#[test]
fn every_fifteen_minutes_fires_four_times_an_hour() {
    let hits = minutes_between(utc(2024, 6, 4, 10, 0, 0), utc(2024, 6, 4, 11, 0, 0))
        .into_iter()
        .filter(|t| cron_matches("*/15 * * * *", t))
        .map(|t| t.format("%H:%M").to_string())
        .collect::<Vec<_>>();

    assert_eq!(hits, vec!["10:00", "10:15", "10:30", "10:45"]);
}

#[test]
fn weekday_mornings_skip_the_weekend() {
    // 2024-06-02 is a Sunday
    let hits = minutes_between(utc(2024, 6, 2, 0, 0, 0), utc(2024, 6, 9, 0, 0, 0))
        .into_iter()
        .filter(|t| cron_matches("0 9 * * 1-5", t))
        .map(|t| t.format("%a").to_string())
        .collect::<Vec<_>>();

    assert_eq!(hits, vec!["Mon", "Tue", "Wed", "Thu", "Fri"]);
}

#[test]
fn naive_times_match_too() {
    let t = NaiveDate::from_ymd_opt(2024, 12, 25)
        .unwrap()
        .and_hms_opt(7, 30, 0)
        .unwrap();
    assert!(cron_matches("30 7 25 12 *", &t));
    assert!(!cron_matches("30 7 24 12 *", &t));
}

#[test]
fn malformed_expressions_never_match() {
    let t = utc(2024, 6, 4, 10, 0, 0);
    for expression in ["", "* * * *", "bogus * * * *", "*/0 * * * *", "* * * * * *"] {
        assert!(!cron_matches(expression, &t), "{expression:?}");
    }
}

#[test]
fn missed_hourly_run_is_detected() {
    let now = utc(2024, 6, 4, 10, 30, 0);
    let last = now - TimeDelta::hours(3);
    assert!(should_have_run_between("0 * * * *", last, now));
}

#[test]
fn no_gap_when_last_run_is_recent() {
    let now = utc(2024, 6, 4, 10, 30, 0);
    let last = now - TimeDelta::seconds(30);
    assert!(!should_have_run_between("0 * * * *", last, now));
}

#[test]
fn window_excludes_last_run_and_includes_now() {
    let now = utc(2024, 6, 4, 10, 30, 0);
    assert!(!should_have_run_between("0 10 * * *", utc(2024, 6, 4, 10, 0, 0), now));
    assert!(should_have_run_between("0 10 * * *", utc(2024, 6, 4, 9, 59, 59), now));
    assert!(should_have_run_between("30 10 * * *", utc(2024, 6, 4, 10, 0, 0), now));
}

#[test]
fn seconds_on_now_are_truncated() {
    let now = utc(2024, 6, 4, 10, 0, 45);
    assert!(should_have_run_between("0 10 * * *", utc(2024, 6, 4, 9, 0, 0), now));
}

#[test]
fn last_run_in_the_future_is_never_a_gap() {
    let now = utc(2024, 6, 4, 10, 30, 0);
    assert!(!should_have_run_between("* * * * *", now, now));
    assert!(!should_have_run_between("* * * * *", now + TimeDelta::hours(1), now));
}

#[test]
fn lookback_stops_after_thirty_one_days() {
    let last = utc(2020, 1, 1, 0, 0, 0);
    // New Year is months behind
    assert!(!should_have_run_between("0 0 1 1 *", last, utc(2024, 6, 4, 10, 30, 0)));
    // ...but within the window two weeks into January
    assert!(should_have_run_between("0 0 1 1 *", last, utc(2024, 1, 15, 10, 30, 0)));
}

#[test]
fn run_since_uses_the_local_clock() {
    let last = Local::now() - TimeDelta::minutes(2);
    assert!(should_have_run_since("* * * * *", last));
    assert!(!should_have_run_since("* * * * *", Local::now() + TimeDelta::minutes(5)));
}

#[test]
fn parsed_expression_round_trips_through_display() {
    let expr: CronExpression = " 0 9 * * 1-5 ".parse().unwrap();
    assert_eq!(expr.to_string(), "0 9 * * 1-5");
    assert!(expr.matches(&utc(2024, 6, 3, 9, 0, 0)));
}
