// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use contestreg_domain::{Standing, rank_standings};
use tracing::{debug, warn};

use crate::contest_lifecycle::resolve_contest;
use crate::error::PersistenceError;
use crate::store::RegistryStore;

/// Reads the cached scoreboard of a contest and ranks it.
///
/// Each rank row is joined to the user owning the team (same id). Rows whose
/// user no longer exists are skipped with a warning.
///
/// # Errors
///
/// Returns `ContestNotFound` or a query error.
pub fn fetch_results<C: RegistryStore>(
    conn: &mut C,
    short_name: &str,
) -> Result<Vec<Standing>, PersistenceError> {
    let contest_id: i32 = resolve_contest(conn, short_name)?.contest_id;
    let rows = conn.list_rank_rows(contest_id)?;

    let mut standings: Vec<Standing> = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(user) = conn.find_user_by_id(row.teamid)? else {
            warn!(contest_id, team_id = row.teamid, "No user for ranked team, skipping");
            continue;
        };
        standings.push(Standing {
            email: user.email.unwrap_or_default(),
            username: user.username,
            user_id: user.userid,
            contest_id: row.cid,
            points: row.points_restricted,
            total_time: i64::from(row.totaltime_restricted),
        });
    }

    rank_standings(&mut standings);
    debug!(contest_id, teams = standings.len(), "Fetched contest results");
    Ok(standings)
}
