// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;

use super::{execute, sqlite, store_with_contest};
use crate::id_allocator::{IdTable, SeedPolicy, allocate_next_id};
use crate::transaction::run_unit_of_work;
use crate::{Persistence, PersistenceError, Table};

fn allocate(
    store: &mut Persistence,
    tables: &[IdTable],
    seed: SeedPolicy,
) -> Result<i32, PersistenceError> {
    run_unit_of_work(sqlite(store), "allocate", |tx: &mut SqliteConnection| {
        allocate_next_id(tx, tables, seed)
    })
}

#[test]
fn test_empty_tables_use_seed() {
    let mut store = store_with_contest();

    let id = allocate(&mut store, &[IdTable::Team, IdTable::User], SeedPolicy::StartAt(1));

    assert_eq!(id, Ok(1));
}

#[test]
fn test_empty_table_without_seed_fails() {
    let mut store = Persistence::new_in_memory().expect("store");

    let id = allocate(&mut store, &[IdTable::Contest], SeedPolicy::RequireExisting);

    assert_eq!(id, Err(PersistenceError::NoRows(Table::Contest)));
}

#[test]
fn test_existing_rows_ignore_seed() {
    let mut store = store_with_contest();

    let id = allocate(&mut store, &[IdTable::Contest], SeedPolicy::StartAt(100));

    assert_eq!(id, Ok(6));
}

#[test]
fn test_maximum_is_taken_across_tables() {
    let mut store = store_with_contest();
    execute(
        &mut store,
        "INSERT INTO team (teamid, name, categoryid, enabled) VALUES (4, 'four', 3, 1)",
    );
    execute(
        &mut store,
        "INSERT INTO user (userid, username, name, enabled) VALUES (11, 'admin', 'Admin', 1)",
    );

    let id = allocate(&mut store, &[IdTable::Team, IdTable::User], SeedPolicy::StartAt(1));

    assert_eq!(id, Ok(12));
}

#[test]
fn test_overflow_is_reported() {
    let mut store = store_with_contest();
    execute(
        &mut store,
        "INSERT INTO team (teamid, name, categoryid, enabled) VALUES (2147483647, 'last', 3, 1)",
    );

    let id = allocate(&mut store, &[IdTable::Team, IdTable::User], SeedPolicy::StartAt(1));

    assert_eq!(id, Err(PersistenceError::IdSpaceExhausted(Table::Team)));
}
