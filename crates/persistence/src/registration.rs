// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Creation of a registration and secret rotation.
//!
//! A registration is written in a fixed order: team, user, role assignment,
//! contest membership. The team and user share one id.

use contestreg_domain::{
    DEFAULT_ROLE_ID, Email, IssuedCredentials, Secret, UserAccount, username_for,
};
use tracing::{debug, info};

use crate::credentials::{generate_secret, hash_secret};
use crate::error::PersistenceError;
use crate::guard::{Presence, insert_if_absent};
use crate::id_allocator::{IdTable, SeedPolicy, allocate_next_id};
use crate::store::RegistryStore;
use crate::transaction::run_unit_of_work;

/// First id handed out on an empty store.
const FIRST_REGISTRATION_ID: i32 = 1;

/// Outcome of `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// All four rows were written.
    Created(IssuedCredentials),
    /// A user with this email already exists; nothing was written.
    AlreadyRegistered(UserAccount),
}

/// Registers `email` for the contest with id `contest_id`.
///
/// # Errors
///
/// Returns the first failing step's error (`InsertFailed` naming the table,
/// a query error, `SecretHashFailed`) or `CommitFailed`. In every error case
/// no row is left behind.
pub fn register<C: RegistryStore>(
    conn: &mut C,
    email: &Email,
    contest_id: i32,
) -> Result<Registration, PersistenceError> {
    run_unit_of_work(conn, "register", |tx| {
        let outcome = insert_if_absent(
            tx,
            |tx| tx.find_user_by_email(email.as_str()),
            |tx| write_registration(tx, email, contest_id),
        )?;
        Ok(match outcome {
            Presence::Inserted(credentials) => {
                info!(
                    email = %email,
                    user_id = credentials.user_id,
                    contest_id,
                    "Registered user"
                );
                Registration::Created(credentials)
            }
            Presence::AlreadyPresent(row) => {
                debug!(email = %email, user_id = row.userid, "User already registered");
                Registration::AlreadyRegistered(row.into())
            }
        })
    })
}

fn write_registration<C: RegistryStore>(
    tx: &mut C,
    email: &Email,
    contest_id: i32,
) -> Result<IssuedCredentials, PersistenceError> {
    let id: i32 = allocate_next_id(
        tx,
        &[IdTable::Team, IdTable::User],
        SeedPolicy::StartAt(FIRST_REGISTRATION_ID),
    )?;
    let username: String = username_for(id);
    let display_name: &str = email.display_name();
    let secret: Secret = generate_secret();
    let secret_hash: String = hash_secret(&secret)?;

    tx.insert_team(id, &username)?;
    tx.insert_user(id, &username, display_name, email.as_str(), &secret_hash)?;

    if let Presence::AlreadyPresent(existing) = insert_if_absent(
        tx,
        |tx| tx.find_role_assignment(id),
        |tx| tx.insert_role_assignment(id, DEFAULT_ROLE_ID),
    )? {
        debug!(
            user_id = existing.userid,
            role_id = existing.roleid,
            "Role assignment already present"
        );
    }

    if let Presence::AlreadyPresent(existing) = insert_if_absent(
        tx,
        |tx| tx.find_membership(id),
        |tx| tx.insert_membership(contest_id, id),
    )? {
        debug!(
            team_id = existing.teamid,
            contest_id = existing.cid,
            "Contest membership already present"
        );
    }

    Ok(IssuedCredentials {
        user_id: id,
        team_id: id,
        username,
        display_name: display_name.to_string(),
        email: email.clone(),
        secret,
    })
}

/// Replaces the secret of the user registered under `email`.
///
/// Only the password column changes. A user without a team reports its own
/// id as the team id.
///
/// # Errors
///
/// Returns `UserNotFound` if no user has this email, `SecretHashFailed`, or a
/// store error.
pub fn rotate_secret<C: RegistryStore>(
    conn: &mut C,
    email: &Email,
) -> Result<IssuedCredentials, PersistenceError> {
    run_unit_of_work(conn, "rotate_secret", |tx| {
        let user = tx
            .find_user_by_email(email.as_str())?
            .ok_or_else(|| PersistenceError::UserNotFound(format!("email={email}")))?;

        let secret: Secret = generate_secret();
        let secret_hash: String = hash_secret(&secret)?;
        tx.update_user_password(user.userid, &secret_hash)?;
        info!(email = %email, user_id = user.userid, "Rotated secret");

        Ok(IssuedCredentials {
            user_id: user.userid,
            team_id: user.teamid.unwrap_or(user.userid),
            username: user.username,
            display_name: user.name,
            email: email.clone(),
            secret,
        })
    })
}
