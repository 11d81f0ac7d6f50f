// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Static contest schedule computed at creation time.
//!
//! The schedule is fixed once: the contest activates immediately, starts
//! shortly after, freezes almost at once and stays visible for sixty days.
//! No state transitions happen afterwards.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::error::DomainError;

/// Seconds between activation and start.
pub const START_DELAY_SECS: i64 = 10;

/// Seconds between activation and scoreboard freeze.
pub const FREEZE_DELAY_SECS: i64 = 20;

/// Seconds between end and scoreboard unfreeze.
pub const UNFREEZE_DELAY_SECS: i64 = 10;

/// Days between activation and deactivation.
pub const DEACTIVATE_AFTER_DAYS: i64 = 60;

/// Time zone used for the formatted timestamp strings when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Parses an IANA time zone name.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` if the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// One schedule point: epoch seconds plus its `YYYY-MM-DD HH:MM:SS Zone` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestTimestamp {
    epoch: i64,
    formatted: String,
}

impl ContestTimestamp {
    fn new(epoch: i64, zone: Tz, field: &'static str) -> Result<Self, DomainError> {
        let utc: DateTime<Utc> = DateTime::from_timestamp(epoch, 0)
            .ok_or(DomainError::TimestampOutOfRange { field })?;
        let formatted: String = format!(
            "{} {}",
            utc.with_timezone(&zone).format("%Y-%m-%d %H:%M:%S"),
            zone.name()
        );
        Ok(Self { epoch, formatted })
    }

    #[must_use]
    pub const fn epoch(&self) -> i64 {
        self.epoch
    }

    /// The epoch as stored in the `*time` columns.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn epoch_f64(&self) -> f64 {
        self.epoch as f64
    }

    #[must_use]
    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

/// The six timestamps stored on a contest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestSchedule {
    pub activate: ContestTimestamp,
    pub start: ContestTimestamp,
    pub freeze: ContestTimestamp,
    pub end: ContestTimestamp,
    pub unfreeze: ContestTimestamp,
    pub deactivate: ContestTimestamp,
}

impl ContestSchedule {
    /// Computes the schedule for a contest created at `now`.
    ///
    /// Sub-second precision of `now` is discarded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TimestampOutOfRange` if any point cannot be
    /// represented.
    pub fn from_creation(
        now: DateTime<Utc>,
        duration_hours: u32,
        zone: Tz,
    ) -> Result<Self, DomainError> {
        let activate: i64 = now.timestamp();
        let start: i64 = activate + START_DELAY_SECS;
        let freeze: i64 = activate + FREEZE_DELAY_SECS;
        let end: i64 = start + i64::from(duration_hours) * 3600;
        let unfreeze: i64 = end + UNFREEZE_DELAY_SECS;
        let deactivate: i64 = activate + TimeDelta::days(DEACTIVATE_AFTER_DAYS).num_seconds();

        Ok(Self {
            activate: ContestTimestamp::new(activate, zone, "activate")?,
            start: ContestTimestamp::new(start, zone, "start")?,
            freeze: ContestTimestamp::new(freeze, zone, "freeze")?,
            end: ContestTimestamp::new(end, zone, "end")?,
            unfreeze: ContestTimestamp::new(unfreeze, zone, "unfreeze")?,
            deactivate: ContestTimestamp::new(deactivate, zone, "deactivate")?,
        })
    }
}
