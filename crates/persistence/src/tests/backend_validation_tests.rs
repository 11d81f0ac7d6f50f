// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests for `MariaDB`/`MySQL`.
//!
//! Standard tests run against `SQLite`. These tests are marked `#[ignore]`
//! and run only via `cargo xtask test-mariadb`, which provisions a scratch
//! `MariaDB` container and sets:
//!
//! - `DATABASE_URL`: the connection URL
//! - `CONTESTREG_TEST_BACKEND=mariadb`
//!
//! They check schema compatibility, the `FOR UPDATE` id read, the catalog
//! query for the email index and the register/deregister round trip. Each
//! test uses its own contest short name and emails so that reruns against
//! the same container stay independent.

use contestreg_domain::UserKey;
use diesel::MysqlConnection;
use diesel::prelude::*;
use std::env;

use super::{email, test_contest};
use crate::id_allocator::{IdTable, SeedPolicy, allocate_next_id};
use crate::transaction::run_unit_of_work;
use crate::{BackendConnection, Persistence, Registration};

fn get_mariadb_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - MariaDB tests must be run via `cargo xtask test-mariadb`")
}

fn verify_mariadb_test_environment() {
    let backend = env::var("CONTESTREG_TEST_BACKEND").expect(
        "CONTESTREG_TEST_BACKEND not set - MariaDB tests must be run via `cargo xtask test-mariadb`",
    );
    assert_eq!(backend, "mariadb", "CONTESTREG_TEST_BACKEND must be 'mariadb'");
}

fn migrated_store() -> Persistence {
    verify_mariadb_test_environment();
    Persistence::new_with_mysql_migrated(&get_mariadb_url()).expect("migrated MariaDB store")
}

fn mysql(store: &mut Persistence) -> &mut MysqlConnection {
    match &mut store.conn {
        BackendConnection::Mysql(conn) => conn,
        BackendConnection::Sqlite(_) => panic!("expected a MariaDB connection"),
    }
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_connection() {
    verify_mariadb_test_environment();

    let result = MysqlConnection::establish(&get_mariadb_url());

    assert!(result.is_ok(), "Failed to connect to MariaDB: {:?}", result.err());
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_migrations_apply_and_open_skips_them() {
    let _migrated = migrated_store();

    let opened = Persistence::open(&get_mariadb_url());

    assert!(opened.is_ok(), "open failed: {:?}", opened.err());
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_email_index_is_created_once() {
    let mut store = migrated_store();

    store.ensure_email_index().expect("first ensure");
    let mut second = Persistence::open(&get_mariadb_url()).expect("second handle");
    second.ensure_email_index().expect("second ensure");

    assert!(store.email_index_verified());
    assert!(second.email_index_verified());
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_locked_allocation_returns_next_id() {
    let mut store = migrated_store();
    store
        .seed_contest(9_000, &test_contest("mariadb-alloc"))
        .expect("seed contest");

    let next = run_unit_of_work(mysql(&mut store), "allocate", |tx: &mut MysqlConnection| {
        allocate_next_id(tx, &[IdTable::Contest], SeedPolicy::RequireExisting)
    })
    .expect("allocate");

    assert!(next > 9_000, "next contest id {next} must exceed seeded id");
    store.delete_contest_full("mariadb-alloc").expect("cleanup");
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_register_deregister_round_trip() {
    let mut store = migrated_store();
    let creation = store
        .seed_contest(9_100, &test_contest("mariadb-roundtrip"))
        .expect("seed contest");
    let contest_id = creation.contest().contest_id;
    let address = email("roundtrip@mariadb.test");

    let registration = store.register(&address, contest_id).expect("register");
    let Registration::Created(credentials) = registration else {
        panic!("leftover registration from a previous run: {registration:?}");
    };
    assert_eq!(credentials.user_id, credentials.team_id);

    let again = store.register(&address, contest_id).expect("register again");
    assert!(matches!(again, Registration::AlreadyRegistered(_)));

    let removed = store
        .deregister(&UserKey::Email(address.clone()))
        .expect("deregister");
    assert_eq!(removed.user_id, credentials.user_id);
    assert!(store.find_user_by_email(&address).expect("lookup").is_none());

    let teardown = store.delete_contest_full("mariadb-roundtrip").expect("teardown");
    assert!(teardown.failed.is_empty());
}
