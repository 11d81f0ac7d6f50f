// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod backend_validation_tests;
mod contest_tests;
mod id_allocation_tests;

use chrono::{DateTime, Utc};
use contestreg_domain::{Email, NewContest};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::SqliteConnection;

use crate::diesel_schema::user;
use crate::{BackendConnection, Persistence};

/// 2026-01-01T00:00:00Z.
pub const CREATED_AT: i64 = 1_767_225_600;

/// Contest id used by `store_with_contest`.
pub const CONTEST_ID: i32 = 5;

/// Short name used by `store_with_contest`.
pub const CONTEST_SHORT_NAME: &str = "demo";

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

pub fn test_contest(short_name: &str) -> NewContest {
    let now: DateTime<Utc> = DateTime::from_timestamp(CREATED_AT, 0).expect("valid timestamp");
    NewContest::new("Practice Round", short_name, 2, now, chrono_tz::Asia::Kolkata)
        .expect("valid contest")
}

pub fn email(value: &str) -> Email {
    Email::parse(value).expect("valid email")
}

/// An in-memory store holding contest `CONTEST_ID` (`CONTEST_SHORT_NAME`).
pub fn store_with_contest() -> Persistence {
    let mut store: Persistence = Persistence::new_in_memory().expect("in-memory store");
    store
        .seed_contest(CONTEST_ID, &test_contest(CONTEST_SHORT_NAME))
        .expect("seed contest");
    store
}

pub fn sqlite(store: &mut Persistence) -> &mut SqliteConnection {
    match &mut store.conn {
        BackendConnection::Sqlite(conn) => conn,
        BackendConnection::Mysql(_) => panic!("tests run against SQLite"),
    }
}

pub fn execute(store: &mut Persistence, sql: &str) {
    diesel::sql_query(sql)
        .execute(sqlite(store))
        .unwrap_or_else(|e| panic!("failed to execute `{sql}`: {e}"));
}

pub fn count_rows(store: &mut Persistence, table: &str) -> i64 {
    count_where(store, table, "1 = 1")
}

pub fn count_where(store: &mut Persistence, table: &str, condition: &str) -> i64 {
    diesel::sql_query(format!("SELECT COUNT(*) AS count FROM {table} WHERE {condition}"))
        .get_result::<CountRow>(sqlite(store))
        .expect("count query")
        .count
}

/// Row counts of team, user, userrole and contestteam, in that order.
pub fn registration_row_counts(store: &mut Persistence) -> [i64; 4] {
    [
        count_rows(store, "team"),
        count_rows(store, "user"),
        count_rows(store, "userrole"),
        count_rows(store, "contestteam"),
    ]
}

pub fn stored_password(store: &mut Persistence, user_id: i32) -> String {
    user::table
        .find(user_id)
        .select(user::password)
        .first::<Option<String>>(sqlite(store))
        .expect("user row")
        .expect("password set")
}
