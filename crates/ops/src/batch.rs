// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Line-oriented batch processing of a users file.
//!
//! Each non-blank line holds one email address and is handled in its own
//! transaction. A failing line is logged and counted; it never stops the rest
//! of the file, except for deletions under `DeletionPolicy::Abort`.

use contestreg_domain::{Contest, Email, IssuedCredentials, UserKey};
use contestreg_persistence::{Persistence, PersistenceError, Registration};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::{BatchOp, DeletionPolicy};
use crate::details::DetailsWriter;
use crate::error::OpsError;
use crate::notifier::WelcomeNotifier;

/// Per-line tallies of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lines: {} succeeded, {} skipped, {} failed",
            self.processed, self.succeeded, self.skipped, self.failed
        )
    }
}

enum LineOutcome {
    Done,
    Skipped,
}

struct BatchContext<'a> {
    store: &'a mut Persistence,
    notifier: &'a dyn WelcomeNotifier,
    details: DetailsWriter,
    contest: Contest,
}

impl BatchContext<'_> {
    fn hand_out(&mut self, credentials: &IssuedCredentials) {
        if let Err(e) = self.details.record(credentials) {
            error!(email = %credentials.email, error = %e, "Failed to record credentials");
        }
        if let Err(e) = self.notifier.send_welcome(credentials, &self.contest) {
            error!(email = %credentials.email, error = %e, "Failed to send welcome email");
        }
    }

    fn add(&mut self, email: &Email) -> Result<LineOutcome, PersistenceError> {
        match self.store.register(email, self.contest.contest_id)? {
            Registration::Created(credentials) => {
                info!(
                    email = %email,
                    username = %credentials.username,
                    team_id = credentials.team_id,
                    contest_id = self.contest.contest_id,
                    "Registered user"
                );
                self.hand_out(&credentials);
                Ok(LineOutcome::Done)
            }
            Registration::AlreadyRegistered(existing) => {
                info!(
                    email = %email,
                    username = %existing.username,
                    "User already present, skipping"
                );
                Ok(LineOutcome::Skipped)
            }
        }
    }

    fn resend(&mut self, email: &Email) -> Result<LineOutcome, PersistenceError> {
        let credentials: IssuedCredentials = match self.store.rotate_secret(email) {
            Ok(credentials) => credentials,
            Err(PersistenceError::UserNotFound(_)) => {
                warn!(email = %email, "User not found, skipping resend");
                return Ok(LineOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };
        info!(email = %email, username = %credentials.username, "Issued new secret");
        self.hand_out(&credentials);
        Ok(LineOutcome::Done)
    }

    fn delete(&mut self, email: &Email) -> Result<LineOutcome, PersistenceError> {
        let removed = self.store.deregister(&UserKey::Email(email.clone()))?;
        info!(
            email = %email,
            username = %removed.username,
            user_id = removed.user_id,
            team_id = ?removed.team_id,
            contest_id = self.contest.contest_id,
            "Deregistered user"
        );
        Ok(LineOutcome::Done)
    }
}

/// Applies `op` to every email in `users_file` for the contest `contest_short_name`.
///
/// Credentials of created or rotated registrations are appended to
/// `<users_file>.details` and mailed through `notifier`.
///
/// # Errors
///
/// Returns an error if the contest cannot be resolved, the users file cannot
/// be opened or read, the details file cannot be opened, or a deletion fails
/// under `DeletionPolicy::Abort`.
pub fn run_batch(
    store: &mut Persistence,
    notifier: &dyn WelcomeNotifier,
    users_file: &Path,
    contest_short_name: &str,
    op: BatchOp,
    policy: DeletionPolicy,
) -> Result<BatchSummary, OpsError> {
    let contest: Contest = store.resolve_contest(contest_short_name)?;

    let input: File = File::open(users_file).map_err(|source| OpsError::Open {
        path: users_file.to_path_buf(),
        source,
    })?;
    let details: DetailsWriter = DetailsWriter::open(users_file)?;

    let mut ctx: BatchContext<'_> = BatchContext {
        store,
        notifier,
        details,
        contest,
    };
    let mut summary: BatchSummary = BatchSummary::default();

    for line in BufReader::new(input).lines() {
        let line: String = line.map_err(|source| OpsError::Read {
            path: users_file.to_path_buf(),
            source,
        })?;
        let line: &str = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.processed += 1;

        let email: Email = match Email::parse(line) {
            Ok(email) => email,
            Err(e) => {
                warn!(line, error = %e, "Skipping invalid line");
                summary.failed += 1;
                continue;
            }
        };

        let result: Result<LineOutcome, PersistenceError> = match op {
            BatchOp::Add => ctx.add(&email),
            BatchOp::Resend => ctx.resend(&email),
            BatchOp::Delete => ctx.delete(&email),
        };

        match result {
            Ok(LineOutcome::Done) => summary.succeeded += 1,
            Ok(LineOutcome::Skipped) => summary.skipped += 1,
            Err(e) if op == BatchOp::Delete && policy == DeletionPolicy::Abort => {
                error!(email = %email, error = %e, "Deletion failed, aborting batch");
                return Err(OpsError::DeletionAborted {
                    email: email.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                error!(email = %email, ?op, error = %e, "Line failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        ?op,
        file = %users_file.display(),
        details = %ctx.details.path().display(),
        contest = contest_short_name,
        %summary,
        "Finished processing users file"
    );
    Ok(summary)
}
