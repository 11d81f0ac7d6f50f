// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifier allocation without auto-increment.
//!
//! DOMjudge expects a registration's team and user to share one id, so ids
//! are assigned by the application as `highest existing id + 1`. The read goes
//! through `PersistenceBackend::locked_max_id` inside the caller's write
//! transaction, which keeps the value reserved until commit.

use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::error::{PersistenceError, Table};

/// Tables whose primary key is application-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdTable {
    Contest,
    Team,
    User,
}

impl IdTable {
    #[must_use]
    pub const fn table(self) -> Table {
        match self {
            Self::Contest => Table::Contest,
            Self::Team => Table::Team,
            Self::User => Table::User,
        }
    }
}

impl std::fmt::Display for IdTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.table().fmt(f)
    }
}

/// What to return when every consulted table is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Start numbering at the given id.
    StartAt(i32),
    /// Refuse to allocate; there is no bootstrap path.
    RequireExisting,
}

/// Returns one more than the highest id found across `tables`.
///
/// # Errors
///
/// Returns `PersistenceError::NoRows` if every table is empty under
/// `SeedPolicy::RequireExisting`, `IdSpaceExhausted` if the next id would
/// overflow, or a query error.
pub fn allocate_next_id<C: PersistenceBackend>(
    conn: &mut C,
    tables: &[IdTable],
    seed: SeedPolicy,
) -> Result<i32, PersistenceError> {
    let mut highest: Option<i32> = None;
    for &table in tables {
        highest = highest.max(conn.locked_max_id(table)?);
    }

    let primary: Table = tables.first().map_or(Table::User, |t| t.table());
    let next: i32 = match (highest, seed) {
        (Some(current), _) => current
            .checked_add(1)
            .ok_or(PersistenceError::IdSpaceExhausted(primary))?,
        (None, SeedPolicy::StartAt(first)) => first,
        (None, SeedPolicy::RequireExisting) => return Err(PersistenceError::NoRows(primary)),
    };

    debug!(next, ?tables, "Allocated id");
    Ok(next)
}
