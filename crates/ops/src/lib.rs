// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operations over a contest registry.
//!
//! `execute` runs one validated `RunConfig` against an open store: contest
//! creation and teardown, batch registration from a users file, and results
//! export.

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
#![allow(clippy::multiple_crate_versions)]

mod batch;
mod config;
mod details;
mod error;
mod export;
mod notifier;
mod tsv;

#[cfg(test)]
mod tests;

pub use batch::{BatchSummary, run_batch};
pub use config::{
    BatchOp, ConfigError, DeletionPolicy, Operation, RunConfig, SendwithusSettings, Settings,
    Task,
};
pub use details::{DETAILS_HEADER, DetailsWriter, details_path};
pub use error::OpsError;
pub use export::{RESULTS_HEADER, write_results};
pub use notifier::{
    DisabledNotifier, NotifyError, SENDWITHUS_SEND_URL, SendPayload, SendwithusNotifier,
    WelcomeNotifier, build_payload,
};

use chrono::{DateTime, Utc};
use contestreg_domain::{NewContest, Standing};
use contestreg_persistence::{ContestCreation, ContestTeardown, Persistence};
use std::path::PathBuf;
use tracing::{info, warn};

/// What a completed operation did.
#[derive(Debug)]
pub enum Outcome {
    ContestCreated(ContestCreation),
    UsersProcessed(BatchSummary),
    ContestDeleted(ContestTeardown),
    ResultsExported { path: PathBuf, rows: usize },
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContestCreated(ContestCreation::Created(contest)) => write!(
                f,
                "created contest {} (cid {})",
                contest.short_name, contest.contest_id
            ),
            Self::ContestCreated(ContestCreation::AlreadyExists(contest)) => write!(
                f,
                "contest {} already exists (cid {})",
                contest.short_name, contest.contest_id
            ),
            Self::UsersProcessed(summary) => write!(f, "{summary}"),
            Self::ContestDeleted(teardown) => write!(
                f,
                "deleted contest {}: {} teams removed, {} failed",
                teardown.contest_id,
                teardown.removed.len(),
                teardown.failed.len()
            ),
            Self::ResultsExported { path, rows } => {
                write!(f, "exported {rows} standings to {}", path.display())
            }
        }
    }
}

/// Builds the notifier for `run`: Sendwithus when configured, otherwise a
/// no-op.
///
/// # Errors
///
/// Returns `NotifyError::Client` if the HTTP client cannot be built.
pub fn build_notifier(run: &RunConfig) -> Result<Box<dyn WelcomeNotifier>, OpsError> {
    Ok(match &run.sendwithus {
        Some(settings) => Box::new(SendwithusNotifier::new(settings.clone())?),
        None => {
            info!("No sendwithus-api-key configured, welcome emails are disabled");
            Box::new(DisabledNotifier)
        }
    })
}

/// Runs the operation described by `run`.
///
/// `now` is the creation instant for new contests.
///
/// # Errors
///
/// Returns the operation's fatal error. Per-line batch failures and per-team
/// teardown failures are not errors; they are logged and reported in the
/// `Outcome`.
pub fn execute(
    run: &RunConfig,
    store: &mut Persistence,
    notifier: &dyn WelcomeNotifier,
    now: DateTime<Utc>,
) -> Result<Outcome, OpsError> {
    info!(op = %run.operation, contest = %run.contest_short_name, "Starting operation");

    match &run.task {
        Task::CreateContest {
            name,
            duration_hours,
        } => {
            let contest: NewContest = NewContest::new(
                name,
                &run.contest_short_name,
                *duration_hours,
                now,
                run.timezone,
            )?;
            let creation: ContestCreation = store.create_contest(&contest)?;
            if let ContestCreation::AlreadyExists(existing) = &creation {
                info!(
                    short_name = %existing.short_name,
                    contest_id = existing.contest_id,
                    "Contest already present, skipping"
                );
            }
            Ok(Outcome::ContestCreated(creation))
        }
        Task::ProcessUsers { op, users_file } => run_batch(
            store,
            notifier,
            users_file,
            &run.contest_short_name,
            *op,
            run.deletion_policy,
        )
        .map(Outcome::UsersProcessed),
        Task::DeleteContest => {
            let teardown: ContestTeardown = store.delete_contest_full(&run.contest_short_name)?;
            for (team_id, error) in &teardown.failed {
                warn!(team_id, %error, "Team was not removed");
            }
            Ok(Outcome::ContestDeleted(teardown))
        }
        Task::ShowResults { results_file } => {
            let standings: Vec<Standing> = store.fetch_results(&run.contest_short_name)?;
            write_results(results_file, &standings)?;
            Ok(Outcome::ResultsExported {
                path: results_file.clone(),
                rows: standings.len(),
            })
        }
    }
}
