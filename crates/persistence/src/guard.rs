// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::PersistenceError;

/// Outcome of `insert_if_absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence<R, T> {
    /// The probe found nothing and the insert ran.
    Inserted(T),
    /// The probe found this row; nothing was written.
    AlreadyPresent(R),
}

/// Runs `insert` only if `probe` finds no existing row.
///
/// This is the one lookup-before-write primitive used for users by email,
/// role assignments, contest memberships and contests by short name.
///
/// # Errors
///
/// Returns whatever error the probe or the insert returns.
pub fn insert_if_absent<C, R, T, P, I>(
    conn: &mut C,
    probe: P,
    insert: I,
) -> Result<Presence<R, T>, PersistenceError>
where
    P: FnOnce(&mut C) -> Result<Option<R>, PersistenceError>,
    I: FnOnce(&mut C) -> Result<T, PersistenceError>,
{
    match probe(conn)? {
        Some(existing) => Ok(Presence::AlreadyPresent(existing)),
        None => insert(conn).map(Presence::Inserted),
    }
}
