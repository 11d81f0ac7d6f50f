// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lookups over the rows that make up a registration.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{MembershipRow, RoleAssignmentRow, TeamRow, UserRow};
use crate::diesel_schema::{contestteam, team, user, userrole};
use crate::error::PersistenceError;

backend_fn! {
/// Finds a user by email address.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_user_by_email(
    conn: &mut _,
    email: &str,
) -> Result<Option<UserRow>, PersistenceError> {
    Ok(user::table
        .filter(user::email.eq(email))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?)
}
}

backend_fn! {
/// Finds a user by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_user_by_id(
    conn: &mut _,
    user_id: i32,
) -> Result<Option<UserRow>, PersistenceError> {
    Ok(user::table
        .find(user_id)
        .select(UserRow::as_select())
        .first(conn)
        .optional()?)
}
}

backend_fn! {
/// Finds a team by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_team(
    conn: &mut _,
    team_id: i32,
) -> Result<Option<TeamRow>, PersistenceError> {
    Ok(team::table
        .find(team_id)
        .select(TeamRow::as_select())
        .first(conn)
        .optional()?)
}
}

backend_fn! {
/// Finds any role assignment held by a user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_role_assignment(
    conn: &mut _,
    user_id: i32,
) -> Result<Option<RoleAssignmentRow>, PersistenceError> {
    Ok(userrole::table
        .filter(userrole::userid.eq(user_id))
        .select(RoleAssignmentRow::as_select())
        .first(conn)
        .optional()?)
}
}

backend_fn! {
/// Finds any contest membership held by a team.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_membership(
    conn: &mut _,
    team_id: i32,
) -> Result<Option<MembershipRow>, PersistenceError> {
    Ok(contestteam::table
        .filter(contestteam::teamid.eq(team_id))
        .select(MembershipRow::as_select())
        .first(conn)
        .optional()?)
}
}
