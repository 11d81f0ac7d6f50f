// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::schedule::ContestSchedule;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Role granted to every registered participant (`team` in DOMjudge).
pub const DEFAULT_ROLE_ID: i32 = 3;

/// Team category assigned to every registered participant.
pub const PARTICIPANT_CATEGORY_ID: i32 = 3;

/// Returns the username derived from a registration id (`user<id>`).
#[must_use]
pub fn username_for(id: i32) -> String {
    format!("user{id}")
}

/// A participant email address.
///
/// The address is the natural key for user lookup. Only the minimal shape is
/// enforced: a non-empty local part, an `@`, a non-empty domain and no
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Parses an email address, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEmail` if the value is not shaped like an
    /// address.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(DomainError::InvalidEmail(trimmed.to_string()));
        };
        if local.is_empty() || domain.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidEmail(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the full address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display name: the address with the `@domain` suffix removed.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.0.split_once('@').map_or(self.0.as_str(), |(local, _)| local)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A plaintext secret.
///
/// It exists only long enough to be written to the details file and mailed to
/// the registrant; it is never persisted. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// How a user row is located for deregistration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    /// By `userid`. Team teardown uses this with the team id, since a team's
    /// owning user shares its id.
    Id(i32),
    /// By email address.
    Email(Email),
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "userid={id}"),
            Self::Email(email) => write!(f, "email={email}"),
        }
    }
}

/// Credentials handed out by a registration or a secret rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredentials {
    pub user_id: i32,
    pub team_id: i32,
    pub username: String,
    pub display_name: String,
    pub email: Email,
    pub secret: Secret,
}

/// A user row as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: i32,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub team_id: Option<i32>,
    pub enabled: bool,
}

/// A contest row as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub contest_id: i32,
    pub short_name: String,
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Formatted end time, used as the registration deadline in emails.
    pub end_time_string: String,
    pub enabled: bool,
    pub public: bool,
}

/// A contest that has been validated and scheduled but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContest {
    name: String,
    short_name: String,
    duration_hours: u32,
    schedule: ContestSchedule,
}

impl NewContest {
    /// Validates the contest fields and computes its schedule from `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or short name is empty, the short name
    /// contains whitespace, the duration is zero, or a timestamp overflows.
    pub fn new(
        name: &str,
        short_name: &str,
        duration_hours: u32,
        now: DateTime<Utc>,
        zone: Tz,
    ) -> Result<Self, DomainError> {
        let name: &str = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidContestName(name.to_string()));
        }
        let short_name: &str = short_name.trim();
        if short_name.is_empty() || short_name.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidShortName(short_name.to_string()));
        }
        if duration_hours == 0 {
            return Err(DomainError::InvalidDuration(duration_hours));
        }

        let schedule: ContestSchedule = ContestSchedule::from_creation(now, duration_hours, zone)?;

        Ok(Self {
            name: name.to_string(),
            short_name: short_name.to_string(),
            duration_hours,
            schedule,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    #[must_use]
    pub const fn duration_hours(&self) -> u32 {
        self.duration_hours
    }

    #[must_use]
    pub const fn schedule(&self) -> &ContestSchedule {
        &self.schedule
    }
}
