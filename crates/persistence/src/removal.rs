// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Removal of a registration.
//!
//! Rows are deleted in the reverse of creation order: contest memberships,
//! role assignments, user, team.

use contestreg_domain::UserKey;
use tracing::{debug, info, warn};

use crate::data_models::UserRow;
use crate::error::PersistenceError;
use crate::store::RegistryStore;
use crate::transaction::run_unit_of_work;

/// What `deregister` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deregistration {
    pub user_id: i32,
    /// The team the user pointed at, if any. The team row itself may have
    /// been missing already.
    pub team_id: Option<i32>,
    pub username: String,
}

/// Removes every row of the registration identified by `key`.
///
/// A missing team is logged and the team-keyed deletes then match nothing.
///
/// # Errors
///
/// Returns `UserNotFound` if no user matches, `DeleteFailed` naming the table
/// whose delete failed, or `CommitFailed`. On error nothing is removed.
pub fn deregister<C: RegistryStore>(
    conn: &mut C,
    key: &UserKey,
) -> Result<Deregistration, PersistenceError> {
    run_unit_of_work(conn, "deregister", |tx| {
        let user: UserRow = match key {
            UserKey::Id(id) => tx.find_user_by_id(*id)?,
            UserKey::Email(email) => tx.find_user_by_email(email.as_str())?,
        }
        .ok_or_else(|| PersistenceError::UserNotFound(key.to_string()))?;

        match user.teamid {
            Some(team_id) => {
                match tx.find_team(team_id)? {
                    Some(team) => debug!(team_id = team.teamid, team = %team.name, "Removing team"),
                    None => warn!(user_id = user.userid, team_id, "Team row is missing"),
                }
                tx.delete_memberships_for_team(team_id)?;
            }
            None => warn!(user_id = user.userid, "User has no team"),
        }

        tx.delete_role_assignments_for_user(user.userid)?;
        tx.delete_user(user.userid)?;

        if let Some(team_id) = user.teamid {
            tx.delete_team(team_id)?;
        }

        info!(%key, user_id = user.userid, "Deregistered user");
        Ok(Deregistration {
            user_id: user.userid,
            team_id: user.teamid,
            username: user.username,
        })
    })
}
