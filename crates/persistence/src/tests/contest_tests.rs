// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{
    CONTEST_ID, CONTEST_SHORT_NAME, count_rows, count_where, email, execute,
    store_with_contest, test_contest,
};
use crate::{ContestCreation, Persistence, PersistenceError, Table};

fn email_index_count(store: &mut Persistence) -> i64 {
    count_where(
        store,
        "sqlite_master",
        "type = 'index' AND tbl_name = 'user' AND name = 'user_email'",
    )
}

#[test]
fn test_create_contest_on_empty_store_fails_with_no_rows() {
    let mut store = Persistence::new_in_memory().expect("store");

    let result = store.create_contest(&test_contest("spring"));

    assert_eq!(result, Err(PersistenceError::NoRows(Table::Contest)));
    assert_eq!(count_rows(&mut store, "contest"), 0);
}

#[test]
fn test_create_contest_takes_next_id() {
    let mut store = store_with_contest();

    let creation = store.create_contest(&test_contest("spring")).expect("create");

    let ContestCreation::Created(contest) = creation else {
        panic!("expected a new contest, got {creation:?}");
    };
    assert_eq!(contest.contest_id, CONTEST_ID + 1);
    assert_eq!(contest.short_name, "spring");
    assert_eq!(contest.name, "Practice Round");
    assert!(contest.enabled);
    assert!(!contest.public);
    assert_eq!(contest.end_time_string, "2026-01-01 07:30:10 Asia/Kolkata");
    assert!((contest.start_time - 1_767_225_610.0).abs() < f64::EPSILON);
    assert!((contest.end_time - 1_767_232_810.0).abs() < f64::EPSILON);
}

#[test]
fn test_create_contest_stores_full_schedule() {
    let mut store = store_with_contest();

    store.create_contest(&test_contest("spring")).expect("create");

    assert_eq!(
        count_where(
            &mut store,
            "contest",
            "cid = 6 AND externalid = 'spring' AND enabled = 1 AND public = 0 \
             AND activatetime = 1767225600 AND freezetime = 1767225620 \
             AND unfreezetime = 1767232820 AND deactivatetime = 1772409600 \
             AND activatetime_string = '2026-01-01 05:30:00 Asia/Kolkata' \
             AND deactivatetime_string = '2026-03-02 05:30:00 Asia/Kolkata'"
        ),
        1
    );
}

#[test]
fn test_create_same_short_name_twice_keeps_one_row() {
    let mut store = store_with_contest();
    store.create_contest(&test_contest("spring")).expect("create");

    let second = store.create_contest(&test_contest("spring")).expect("create");

    assert!(
        matches!(&second, ContestCreation::AlreadyExists(contest) if contest.contest_id == 6),
        "unexpected outcome: {second:?}"
    );
    assert_eq!(count_where(&mut store, "contest", "shortname = 'spring'"), 1);
}

#[test]
fn test_seed_contest_is_idempotent() {
    let mut store = store_with_contest();

    let again = store
        .seed_contest(CONTEST_ID, &test_contest(CONTEST_SHORT_NAME))
        .expect("seed");

    assert!(matches!(again, ContestCreation::AlreadyExists(_)));
    assert_eq!(again.contest().contest_id, CONTEST_ID);
    assert_eq!(count_rows(&mut store, "contest"), 1);
}

#[test]
fn test_create_contest_ensures_email_index_once() {
    let mut store = store_with_contest();
    assert_eq!(email_index_count(&mut store), 0);
    assert!(!store.email_index_verified());

    store.create_contest(&test_contest("spring")).expect("create");
    store.create_contest(&test_contest("summer")).expect("create");

    assert_eq!(email_index_count(&mut store), 1);
    assert!(store.email_index_verified());
}

#[test]
fn test_ensure_email_index_accepts_existing_index() {
    let mut store = store_with_contest();
    execute(&mut store, "CREATE INDEX user_email ON user (email)");

    store.ensure_email_index().expect("ensure index");

    assert_eq!(email_index_count(&mut store), 1);
    assert!(store.email_index_verified());
}

#[test]
fn test_resolve_contest() {
    let mut store = store_with_contest();

    let found = store.resolve_contest(CONTEST_SHORT_NAME).expect("resolve");
    let missing = store.resolve_contest("nope");

    assert_eq!(found.contest_id, CONTEST_ID);
    assert_eq!(missing, Err(PersistenceError::ContestNotFound("nope".to_string())));
    assert!(store.find_contest("nope").expect("lookup").is_none());
}

#[test]
fn test_teardown_removes_every_team_and_the_contest() {
    let mut store = store_with_contest();
    for address in ["a@x.com", "b@x.com"] {
        store.register(&email(address), CONTEST_ID).expect("register");
    }

    let teardown = store.delete_contest_full(CONTEST_SHORT_NAME).expect("teardown");

    assert_eq!(teardown.contest_id, CONTEST_ID);
    assert_eq!(teardown.removed, vec![1, 2]);
    assert!(teardown.failed.is_empty());
    assert_eq!(count_rows(&mut store, "contest"), 0);
    assert_eq!(count_rows(&mut store, "team"), 0);
    assert_eq!(count_rows(&mut store, "user"), 0);
}

#[test]
fn test_teardown_continues_past_a_failing_team() {
    let mut store = store_with_contest();
    for address in ["a@x.com", "b@x.com", "c@x.com"] {
        store.register(&email(address), CONTEST_ID).expect("register");
    }
    execute(
        &mut store,
        "CREATE TRIGGER fail_second_user_delete BEFORE DELETE ON user WHEN OLD.userid = 2 \
         BEGIN SELECT RAISE(ABORT, 'forced user failure'); END",
    );

    let teardown = store.delete_contest_full(CONTEST_SHORT_NAME).expect("teardown");

    assert_eq!(teardown.removed, vec![1, 3]);
    assert_eq!(teardown.failed.len(), 1);
    let (failed_team, error) = &teardown.failed[0];
    assert_eq!(*failed_team, 2);
    assert!(
        matches!(error, PersistenceError::DeleteFailed { table: Table::User, .. }),
        "unexpected error: {error:?}"
    );

    assert_eq!(count_where(&mut store, "team", "teamid = 2"), 1);
    assert_eq!(count_where(&mut store, "user", "userid = 2"), 1);
    assert_eq!(count_rows(&mut store, "team"), 1);
    assert_eq!(count_rows(&mut store, "user"), 1);
    assert_eq!(count_rows(&mut store, "contest"), 0);
    assert_eq!(count_rows(&mut store, "contestteam"), 0);
}

#[test]
fn test_teardown_of_unknown_contest_fails() {
    let mut store = store_with_contest();

    let result = store.delete_contest_full("nope");

    assert_eq!(result, Err(PersistenceError::ContestNotFound("nope".to_string())));
    assert_eq!(count_rows(&mut store, "contest"), 1);
}
