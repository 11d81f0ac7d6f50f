// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types for contest registration provisioning.
//!
//! This crate holds the backend-independent vocabulary shared by the
//! persistence and operations layers: validated emails, derived usernames,
//! issued credentials, contest schedules and ranked standings.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod schedule;
mod standings;
mod types;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use schedule::{
    ContestSchedule, ContestTimestamp, DEACTIVATE_AFTER_DAYS, DEFAULT_TIMEZONE, FREEZE_DELAY_SECS,
    START_DELAY_SECS, UNFREEZE_DELAY_SECS, parse_timezone,
};
pub use standings::{Standing, rank_standings};
pub use types::{
    Contest, DEFAULT_ROLE_ID, Email, IssuedCredentials, NewContest, PARTICIPANT_CATEGORY_ID,
    Secret, UserAccount, UserKey, username_for,
};
