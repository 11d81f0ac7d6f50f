// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contest lookups.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{ContestRow, RankRow};
use crate::diesel_schema::{contest, contestteam, rankcache};
use crate::error::PersistenceError;

backend_fn! {
/// Finds a contest by its short name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_contest_by_short_name(
    conn: &mut _,
    short_name: &str,
) -> Result<Option<ContestRow>, PersistenceError> {
    Ok(contest::table
        .filter(contest::shortname.eq(short_name))
        .select(ContestRow::as_select())
        .first(conn)
        .optional()?)
}
}

backend_fn! {
/// Lists the ids of every team linked to a contest, lowest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_contest_team_ids(
    conn: &mut _,
    contest_id: i32,
) -> Result<Vec<i32>, PersistenceError> {
    Ok(contestteam::table
        .filter(contestteam::cid.eq(contest_id))
        .select(contestteam::teamid)
        .order(contestteam::teamid.asc())
        .load(conn)?)
}
}

backend_fn! {
/// Lists the cached scoreboard rows of a contest.
///
/// Rows come back ordered by points descending, then total time ascending;
/// the caller still ranks them after joining user data.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_rank_rows(
    conn: &mut _,
    contest_id: i32,
) -> Result<Vec<RankRow>, PersistenceError> {
    Ok(rankcache::table
        .filter(rankcache::cid.eq(contest_id))
        .select(RankRow::as_select())
        .order((
            rankcache::points_restricted.desc(),
            rankcache::totaltime_restricted.asc(),
        ))
        .load(conn)?)
}
}
