// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The email address is empty or malformed.
    InvalidEmail(String),
    /// The contest short name is empty or contains whitespace.
    InvalidShortName(String),
    /// The contest display name is empty.
    InvalidContestName(String),
    /// The contest duration must be at least one hour.
    InvalidDuration(u32),
    /// The time zone name is not a known IANA zone.
    InvalidTimezone(String),
    /// A computed timestamp falls outside the representable range.
    TimestampOutOfRange {
        /// The schedule field that overflowed.
        field: &'static str,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "Invalid email address: '{value}'"),
            Self::InvalidShortName(value) => write!(f, "Invalid contest short name: '{value}'"),
            Self::InvalidContestName(value) => write!(f, "Invalid contest name: '{value}'"),
            Self::InvalidDuration(hours) => {
                write!(f, "Invalid contest duration: {hours} hours")
            }
            Self::InvalidTimezone(value) => write!(f, "Unknown time zone: '{value}'"),
            Self::TimestampOutOfRange { field } => {
                write!(f, "Contest {field} timestamp is out of range")
            }
        }
    }
}

impl std::error::Error for DomainError {}
