// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};

use crate::{ContestSchedule, DEFAULT_TIMEZONE, DomainError, parse_timezone};

/// 2026-01-01T00:00:00Z
const CREATED_AT: i64 = 1_767_225_600;

fn creation_time() -> DateTime<Utc> {
    DateTime::from_timestamp(CREATED_AT, 0).expect("valid timestamp")
}

#[test]
fn test_schedule_offsets_from_creation_time() {
    let zone = parse_timezone("UTC").expect("valid zone");
    let schedule: ContestSchedule =
        ContestSchedule::from_creation(creation_time(), 2, zone).expect("valid schedule");

    assert_eq!(schedule.activate.epoch(), CREATED_AT);
    assert_eq!(schedule.start.epoch(), CREATED_AT + 10);
    assert_eq!(schedule.freeze.epoch(), CREATED_AT + 20);
    assert_eq!(schedule.end.epoch(), CREATED_AT + 10 + 2 * 3600);
    assert_eq!(schedule.unfreeze.epoch(), CREATED_AT + 10 + 2 * 3600 + 10);
    assert_eq!(schedule.deactivate.epoch(), CREATED_AT + 60 * 86_400);
}

#[test]
fn test_schedule_strings_use_configured_zone() {
    let zone = parse_timezone(DEFAULT_TIMEZONE).expect("valid zone");
    let schedule: ContestSchedule =
        ContestSchedule::from_creation(creation_time(), 2, zone).expect("valid schedule");

    assert_eq!(schedule.activate.formatted(), "2026-01-01 05:30:00 Asia/Kolkata");
    assert_eq!(schedule.start.formatted(), "2026-01-01 05:30:10 Asia/Kolkata");
    assert_eq!(schedule.end.formatted(), "2026-01-01 07:30:10 Asia/Kolkata");
    assert_eq!(schedule.deactivate.formatted(), "2026-03-02 05:30:00 Asia/Kolkata");
}

#[test]
fn test_schedule_epoch_as_float_matches_integer() {
    let zone = parse_timezone("UTC").expect("valid zone");
    let schedule: ContestSchedule =
        ContestSchedule::from_creation(creation_time(), 1, zone).expect("valid schedule");

    assert!((schedule.end.epoch_f64() - 1_767_229_210.0).abs() < f64::EPSILON);
}

#[test]
fn test_parse_timezone_rejects_unknown_zone() {
    assert_eq!(
        parse_timezone("Mars/Olympus").unwrap_err(),
        DomainError::InvalidTimezone(String::from("Mars/Olympus"))
    );
}
