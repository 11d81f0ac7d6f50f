// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::NewContestRow;
use crate::diesel_schema::contest;
use crate::error::{PersistenceError, Table};

backend_fn! {
/// Inserts a contest row.
///
/// # Errors
///
/// Returns `InsertFailed { table: contest }` if the insert fails.
pub fn insert_contest(
    conn: &mut _,
    row: &NewContestRow<'_>,
) -> Result<(), PersistenceError> {
    diesel::insert_into(contest::table)
        .values(row)
        .execute(conn)
        .map_err(|e| PersistenceError::insert_failed(Table::Contest, &e))?;
    debug!(contest_id = row.cid, short_name = row.shortname, "Inserted contest");
    Ok(())
}
}

backend_fn! {
/// Removes a contest row. Memberships and cached ranks cascade.
///
/// # Errors
///
/// Returns `DeleteFailed { table: contest }` if the delete fails.
pub fn delete_contest(
    conn: &mut _,
    contest_id: i32,
) -> Result<usize, PersistenceError> {
    let removed: usize = diesel::delete(contest::table.find(contest_id))
        .execute(conn)
        .map_err(|e| PersistenceError::delete_failed(Table::Contest, &e))?;
    debug!(contest_id, removed, "Deleted contest");
    Ok(removed)
}
}
