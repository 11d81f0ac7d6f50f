// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contest creation and full contest teardown.

use contestreg_domain::{Contest, NewContest, UserKey};
use tracing::{info, warn};

use crate::data_models::{ContestRow, NewContestRow};
use crate::error::PersistenceError;
use crate::guard::{Presence, insert_if_absent};
use crate::id_allocator::{IdTable, SeedPolicy, allocate_next_id};
use crate::removal::deregister;
use crate::store::RegistryStore;
use crate::transaction::run_unit_of_work;

/// Outcome of `create_contest` and `seed_contest`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContestCreation {
    Created(Contest),
    /// A contest with this short name exists; it was left untouched.
    AlreadyExists(Contest),
}

impl ContestCreation {
    #[must_use]
    pub const fn contest(&self) -> &Contest {
        match self {
            Self::Created(contest) | Self::AlreadyExists(contest) => contest,
        }
    }
}

/// Result of `delete_contest_full`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestTeardown {
    pub contest_id: i32,
    /// Team ids whose registration was removed.
    pub removed: Vec<i32>,
    /// Team ids whose removal failed, with the error. Their rows remain.
    pub failed: Vec<(i32, PersistenceError)>,
}

/// Inserts `contest` under the next contest id unless its short name exists.
///
/// The contest table must already hold at least one row.
///
/// # Errors
///
/// Returns `NoRows` on an empty contest table, `InsertFailed`, or
/// `CommitFailed`.
pub fn create_contest<C: RegistryStore>(
    conn: &mut C,
    contest: &NewContest,
) -> Result<ContestCreation, PersistenceError> {
    run_unit_of_work(conn, "create_contest", |tx| {
        insert_contest_if_absent(tx, contest, |tx| {
            allocate_next_id(tx, &[IdTable::Contest], SeedPolicy::RequireExisting)
        })
    })
}

/// Inserts `contest` under an explicit id unless its short name exists.
///
/// Used to give an empty store its first contest.
///
/// # Errors
///
/// Returns `InsertFailed` (e.g. the id is taken) or `CommitFailed`.
pub fn seed_contest<C: RegistryStore>(
    conn: &mut C,
    contest_id: i32,
    contest: &NewContest,
) -> Result<ContestCreation, PersistenceError> {
    run_unit_of_work(conn, "seed_contest", |tx| {
        insert_contest_if_absent(tx, contest, |_| Ok(contest_id))
    })
}

fn insert_contest_if_absent<C, F>(
    tx: &mut C,
    contest: &NewContest,
    next_id: F,
) -> Result<ContestCreation, PersistenceError>
where
    C: RegistryStore,
    F: FnOnce(&mut C) -> Result<i32, PersistenceError>,
{
    let outcome = insert_if_absent(
        tx,
        |tx| tx.find_contest_by_short_name(contest.short_name()),
        |tx| {
            let cid: i32 = next_id(tx)?;
            let row: NewContestRow<'_> = NewContestRow::new(cid, contest);
            tx.insert_contest(&row)?;
            Ok(row.to_contest())
        },
    )?;

    Ok(match outcome {
        Presence::Inserted(created) => {
            info!(
                contest_id = created.contest_id,
                short_name = %created.short_name,
                "Created contest"
            );
            ContestCreation::Created(created)
        }
        Presence::AlreadyPresent(existing) => {
            info!(
                contest_id = existing.cid,
                short_name = %existing.shortname,
                "Contest already exists"
            );
            ContestCreation::AlreadyExists(existing.into())
        }
    })
}

/// Looks up a contest by short name.
///
/// # Errors
///
/// Returns `ContestNotFound` if no contest has this short name.
pub fn resolve_contest<C: RegistryStore>(
    conn: &mut C,
    short_name: &str,
) -> Result<Contest, PersistenceError> {
    conn.find_contest_by_short_name(short_name)?
        .map(Contest::from)
        .ok_or_else(|| PersistenceError::ContestNotFound(short_name.to_string()))
}

/// Deregisters every team of a contest, then deletes the contest row.
///
/// Each team is removed in its own transaction through its owning user,
/// whose id equals the team id. A failing team is logged and recorded in the
/// report; it never stops the enumeration.
///
/// # Errors
///
/// Returns `ContestNotFound`, a query error while listing teams, or the error
/// from deleting the contest row.
pub fn delete_contest_full<C: RegistryStore>(
    conn: &mut C,
    short_name: &str,
) -> Result<ContestTeardown, PersistenceError> {
    let contest: ContestRow = conn
        .find_contest_by_short_name(short_name)?
        .ok_or_else(|| PersistenceError::ContestNotFound(short_name.to_string()))?;
    let team_ids: Vec<i32> = conn.list_contest_team_ids(contest.cid)?;
    info!(contest_id = contest.cid, teams = team_ids.len(), "Tearing down contest");

    let mut removed: Vec<i32> = Vec::with_capacity(team_ids.len());
    let mut failed: Vec<(i32, PersistenceError)> = Vec::new();
    for team_id in team_ids {
        match deregister(conn, &UserKey::Id(team_id)) {
            Ok(_) => removed.push(team_id),
            Err(e) => {
                warn!(contest_id = contest.cid, team_id, error = %e, "Failed to remove team");
                failed.push((team_id, e));
            }
        }
    }

    run_unit_of_work(conn, "delete_contest", |tx| tx.delete_contest(contest.cid))?;
    info!(
        contest_id = contest.cid,
        removed = removed.len(),
        failed = failed.len(),
        "Deleted contest"
    );

    Ok(ContestTeardown {
        contest_id: contest.cid,
        removed,
        failed,
    })
}
