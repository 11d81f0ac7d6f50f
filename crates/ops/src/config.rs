// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Run configuration.
//!
//! Settings come from an optional JSON file and from command-line flags with
//! the same kebab-case names. A non-empty flag value overrides the file.
//! `Settings::validate` turns the merged settings into a `RunConfig`; every
//! configuration error surfaces there, before the store is opened.

use chrono_tz::Tz;
use contestreg_domain::{DEFAULT_TIMEZONE, parse_timezone};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors. All of them are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    ReadFile { path: String, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    ParseFile { path: String, reason: String },

    #[error("{0} arg missing")]
    Missing(&'static str),

    #[error("Unknown op '{0}'")]
    UnknownOperation(String),

    #[error("Unknown delete-errors policy '{0}' (expected continue or abort)")]
    UnknownDeletionPolicy(String),

    #[error("users-file arg file not found: {0}")]
    UsersFileNotFound(String),

    #[error("Unknown time zone: '{0}'")]
    InvalidTimezone(String),

    #[error(
        "if sendwithus-api-key is set, then sendwithus-template-id, sendwithus-reply-to, \
         sendwithus-from, sendwithus-from-name and contest-url must be present (missing {0})"
    )]
    SendwithusIncomplete(&'static str),
}

/// The operation a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateContest,
    AddUsers,
    ResendEmailUsers,
    DeleteUsers,
    DeleteContest,
    ShowResults,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateContest => "CREATE_CONTEST",
            Self::AddUsers => "ADD_USERS",
            Self::ResendEmailUsers => "RESEND_EMAIL_USERS",
            Self::DeleteUsers => "DELETE_USERS",
            Self::DeleteContest => "DELETE_CONTEST",
            Self::ShowResults => "SHOW_RESULTS",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CREATE_CONTEST" => Ok(Self::CreateContest),
            "ADD_USERS" => Ok(Self::AddUsers),
            "RESEND_EMAIL_USERS" => Ok(Self::ResendEmailUsers),
            "DELETE_USERS" => Ok(Self::DeleteUsers),
            "DELETE_CONTEST" => Ok(Self::DeleteContest),
            "SHOW_RESULTS" => Ok(Self::ShowResults),
            other => Err(ConfigError::UnknownOperation(other.to_string())),
        }
    }
}

/// What a per-line deletion failure does to the rest of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Log the failure and go on with the next line.
    #[default]
    Continue,
    /// Stop the batch and return the error.
    Abort,
}

impl FromStr for DeletionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            _ => Err(ConfigError::UnknownDeletionPolicy(s.to_string())),
        }
    }
}

/// Raw settings, as read from the config file or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    pub op: Option<String>,
    pub contest_name: Option<String>,
    pub contest_short_name: Option<String>,
    pub contest_duration_hours: Option<u32>,
    pub users_file: Option<String>,
    pub results_file: Option<String>,
    pub db_conn_str: Option<String>,
    pub sendwithus_api_key: Option<String>,
    pub sendwithus_template_id: Option<String>,
    pub sendwithus_reply_to: Option<String>,
    pub sendwithus_from: Option<String>,
    pub sendwithus_from_name: Option<String>,
    /// Comma-separated addresses copied on every welcome email.
    pub sendwithus_cc: Option<String>,
    /// Comma-separated addresses blind-copied on every welcome email.
    pub sendwithus_bcc: Option<String>,
    pub contest_url: Option<String>,
    pub timezone: Option<String>,
    pub delete_errors: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pick(base: Option<String>, overriding: Option<String>) -> Option<String> {
    non_empty(overriding).or_else(|| non_empty(base))
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::Missing(name))
}

fn split_addresses(value: Option<String>) -> Vec<String> {
    non_empty(value)
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Settings {
    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ReadFile` or `ParseFile`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw: String = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Overlays `overrides` on `self`: every non-empty value in `overrides`
    /// wins; a zero duration counts as unset.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            op: pick(self.op, overrides.op),
            contest_name: pick(self.contest_name, overrides.contest_name),
            contest_short_name: pick(self.contest_short_name, overrides.contest_short_name),
            contest_duration_hours: overrides
                .contest_duration_hours
                .filter(|h| *h != 0)
                .or(self.contest_duration_hours),
            users_file: pick(self.users_file, overrides.users_file),
            results_file: pick(self.results_file, overrides.results_file),
            db_conn_str: pick(self.db_conn_str, overrides.db_conn_str),
            sendwithus_api_key: pick(self.sendwithus_api_key, overrides.sendwithus_api_key),
            sendwithus_template_id: pick(
                self.sendwithus_template_id,
                overrides.sendwithus_template_id,
            ),
            sendwithus_reply_to: pick(self.sendwithus_reply_to, overrides.sendwithus_reply_to),
            sendwithus_from: pick(self.sendwithus_from, overrides.sendwithus_from),
            sendwithus_from_name: pick(self.sendwithus_from_name, overrides.sendwithus_from_name),
            sendwithus_cc: pick(self.sendwithus_cc, overrides.sendwithus_cc),
            sendwithus_bcc: pick(self.sendwithus_bcc, overrides.sendwithus_bcc),
            contest_url: pick(self.contest_url, overrides.contest_url),
            timezone: pick(self.timezone, overrides.timezone),
            delete_errors: pick(self.delete_errors, overrides.delete_errors),
        }
    }

    /// Checks the settings and resolves them into a `RunConfig`.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        let operation: Operation = required(self.op, "op")?.parse()?;
        let db_conn_str: String = required(self.db_conn_str, "db-conn-str")?;
        let contest_short_name: String =
            required(self.contest_short_name, "contest-short-name")?;

        let timezone_name: String =
            non_empty(self.timezone).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz =
            parse_timezone(&timezone_name).map_err(|_| ConfigError::InvalidTimezone(timezone_name))?;

        let deletion_policy: DeletionPolicy = match non_empty(self.delete_errors) {
            Some(value) => value.parse()?,
            None => DeletionPolicy::default(),
        };

        let task: Task = match operation {
            Operation::CreateContest => {
                let name: String = required(self.contest_name, "contest-name")?;
                let duration_hours: u32 = self
                    .contest_duration_hours
                    .filter(|h| *h != 0)
                    .ok_or(ConfigError::Missing("contest-duration-hours"))?;
                Task::CreateContest {
                    name,
                    duration_hours,
                }
            }
            Operation::AddUsers | Operation::ResendEmailUsers | Operation::DeleteUsers => {
                let users_file: PathBuf = PathBuf::from(required(self.users_file, "users-file")?);
                if !users_file.exists() {
                    return Err(ConfigError::UsersFileNotFound(
                        users_file.display().to_string(),
                    ));
                }
                let op: BatchOp = match operation {
                    Operation::AddUsers => BatchOp::Add,
                    Operation::ResendEmailUsers => BatchOp::Resend,
                    _ => BatchOp::Delete,
                };
                Task::ProcessUsers { op, users_file }
            }
            Operation::DeleteContest => Task::DeleteContest,
            Operation::ShowResults => Task::ShowResults {
                results_file: PathBuf::from(required(self.results_file, "results-file")?),
            },
        };

        let sendwithus: Option<SendwithusSettings> = match non_empty(self.sendwithus_api_key) {
            None => None,
            Some(api_key) => Some(SendwithusSettings {
                api_key,
                template_id: non_empty(self.sendwithus_template_id)
                    .ok_or(ConfigError::SendwithusIncomplete("sendwithus-template-id"))?,
                reply_to: non_empty(self.sendwithus_reply_to)
                    .ok_or(ConfigError::SendwithusIncomplete("sendwithus-reply-to"))?,
                from: non_empty(self.sendwithus_from)
                    .ok_or(ConfigError::SendwithusIncomplete("sendwithus-from"))?,
                from_name: non_empty(self.sendwithus_from_name)
                    .ok_or(ConfigError::SendwithusIncomplete("sendwithus-from-name"))?,
                contest_url: non_empty(self.contest_url)
                    .ok_or(ConfigError::SendwithusIncomplete("contest-url"))?,
                cc: split_addresses(self.sendwithus_cc),
                bcc: split_addresses(self.sendwithus_bcc),
            }),
        };

        Ok(RunConfig {
            operation,
            task,
            db_conn_str,
            contest_short_name,
            timezone,
            deletion_policy,
            sendwithus,
        })
    }
}

/// Per-line action of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    Add,
    Resend,
    Delete,
}

/// Operation-specific inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    CreateContest { name: String, duration_hours: u32 },
    ProcessUsers { op: BatchOp, users_file: PathBuf },
    DeleteContest,
    ShowResults { results_file: PathBuf },
}

/// Welcome email settings; present only when an API key is configured.
#[derive(Clone, PartialEq, Eq)]
pub struct SendwithusSettings {
    pub api_key: String,
    pub template_id: String,
    pub reply_to: String,
    pub from: String,
    pub from_name: String,
    pub contest_url: String,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl fmt::Debug for SendwithusSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendwithusSettings")
            .field("api_key", &"***")
            .field("template_id", &self.template_id)
            .field("reply_to", &self.reply_to)
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .field("contest_url", &self.contest_url)
            .field("cc", &self.cc)
            .field("bcc", &self.bcc)
            .finish()
    }
}

/// A validated run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub operation: Operation,
    pub task: Task,
    pub db_conn_str: String,
    pub contest_short_name: String,
    pub timezone: Tz,
    pub deletion_policy: DeletionPolicy,
    pub sendwithus: Option<SendwithusSettings>,
}
