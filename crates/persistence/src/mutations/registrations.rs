// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inserts and deletes for the four registration tables.

use contestreg_domain::PARTICIPANT_CATEGORY_ID;
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::diesel_schema::{contestteam, team, user, userrole};
use crate::error::{PersistenceError, Table};

backend_fn! {
/// Inserts a participant team named after its owning user.
///
/// # Errors
///
/// Returns `InsertFailed { table: team }` if the insert fails.
pub fn insert_team(
    conn: &mut _,
    team_id: i32,
    username: &str,
) -> Result<(), PersistenceError> {
    diesel::insert_into(team::table)
        .values((
            team::teamid.eq(team_id),
            team::name.eq(username),
            team::categoryid.eq(PARTICIPANT_CATEGORY_ID),
            team::enabled.eq(1),
            team::members.eq(username),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::insert_failed(Table::Team, &e))?;
    debug!(team_id, "Inserted team");
    Ok(())
}
}

backend_fn! {
/// Inserts a user linked to the team with the same id.
///
/// # Errors
///
/// Returns `InsertFailed { table: user }` if the insert fails.
pub fn insert_user(
    conn: &mut _,
    user_id: i32,
    username: &str,
    display_name: &str,
    email: &str,
    secret_hash: &str,
) -> Result<(), PersistenceError> {
    diesel::insert_into(user::table)
        .values((
            user::userid.eq(user_id),
            user::username.eq(username),
            user::name.eq(display_name),
            user::email.eq(email),
            user::password.eq(secret_hash),
            user::enabled.eq(1),
            user::teamid.eq(user_id),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::insert_failed(Table::User, &e))?;
    debug!(user_id, "Inserted user");
    Ok(())
}
}

backend_fn! {
/// Grants a role to a user.
///
/// # Errors
///
/// Returns `InsertFailed { table: userrole }` if the insert fails.
pub fn insert_role_assignment(
    conn: &mut _,
    user_id: i32,
    role_id: i32,
) -> Result<(), PersistenceError> {
    diesel::insert_into(userrole::table)
        .values((userrole::userid.eq(user_id), userrole::roleid.eq(role_id)))
        .execute(conn)
        .map_err(|e| PersistenceError::insert_failed(Table::UserRole, &e))?;
    debug!(user_id, role_id, "Inserted role assignment");
    Ok(())
}
}

backend_fn! {
/// Links a team to a contest.
///
/// # Errors
///
/// Returns `InsertFailed { table: contestteam }` if the insert fails.
pub fn insert_membership(
    conn: &mut _,
    contest_id: i32,
    team_id: i32,
) -> Result<(), PersistenceError> {
    diesel::insert_into(contestteam::table)
        .values((contestteam::cid.eq(contest_id), contestteam::teamid.eq(team_id)))
        .execute(conn)
        .map_err(|e| PersistenceError::insert_failed(Table::ContestTeam, &e))?;
    debug!(contest_id, team_id, "Inserted contest membership");
    Ok(())
}
}

backend_fn! {
/// Replaces a user's password hash. No other column is touched.
///
/// # Errors
///
/// Returns an error if the update fails or no row matched.
pub fn update_user_password(
    conn: &mut _,
    user_id: i32,
    secret_hash: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(user::table.find(user_id))
        .set(user::password.eq(secret_hash))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::UserNotFound(format!("userid={user_id}")));
    }
    debug!(user_id, "Updated password hash");
    Ok(())
}
}

backend_fn! {
/// Removes every contest membership of a team.
///
/// # Errors
///
/// Returns `DeleteFailed { table: contestteam }` if the delete fails.
pub fn delete_memberships_for_team(
    conn: &mut _,
    team_id: i32,
) -> Result<usize, PersistenceError> {
    let removed: usize = diesel::delete(contestteam::table.filter(contestteam::teamid.eq(team_id)))
        .execute(conn)
        .map_err(|e| PersistenceError::delete_failed(Table::ContestTeam, &e))?;
    debug!(team_id, removed, "Deleted contest memberships");
    Ok(removed)
}
}

backend_fn! {
/// Removes every role assignment of a user.
///
/// # Errors
///
/// Returns `DeleteFailed { table: userrole }` if the delete fails.
pub fn delete_role_assignments_for_user(
    conn: &mut _,
    user_id: i32,
) -> Result<usize, PersistenceError> {
    let removed: usize = diesel::delete(userrole::table.filter(userrole::userid.eq(user_id)))
        .execute(conn)
        .map_err(|e| PersistenceError::delete_failed(Table::UserRole, &e))?;
    debug!(user_id, removed, "Deleted role assignments");
    Ok(removed)
}
}

backend_fn! {
/// Removes a user row.
///
/// # Errors
///
/// Returns `DeleteFailed { table: user }` if the delete fails.
pub fn delete_user(
    conn: &mut _,
    user_id: i32,
) -> Result<usize, PersistenceError> {
    let removed: usize = diesel::delete(user::table.find(user_id))
        .execute(conn)
        .map_err(|e| PersistenceError::delete_failed(Table::User, &e))?;
    debug!(user_id, removed, "Deleted user");
    Ok(removed)
}
}

backend_fn! {
/// Removes a team row.
///
/// # Errors
///
/// Returns `DeleteFailed { table: team }` if the delete fails.
pub fn delete_team(
    conn: &mut _,
    team_id: i32,
) -> Result<usize, PersistenceError> {
    let removed: usize = diesel::delete(team::table.find(team_id))
        .execute(conn)
        .map_err(|e| PersistenceError::delete_failed(Table::Team, &e))?;
    debug!(team_id, removed, "Deleted team");
    Ok(removed)
}
}
