// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use contestreg_domain::{Email, Standing};
use contestreg_persistence::{ContestCreation, Persistence, PersistenceError};
use std::path::PathBuf;

use super::{CONTEST_ID, CONTEST_SHORT_NAME, RecordingNotifier, created_at, read_tsv, store_with_contest};
use crate::config::{DeletionPolicy, Operation, RunConfig, Task};
use crate::error::OpsError;
use crate::export::write_results;
use crate::{Outcome, execute};

fn run_config(operation: Operation, short_name: &str, task: Task) -> RunConfig {
    RunConfig {
        operation,
        task,
        db_conn_str: ":memory:".to_string(),
        contest_short_name: short_name.to_string(),
        timezone: chrono_tz::Asia::Kolkata,
        deletion_policy: DeletionPolicy::Continue,
        sendwithus: None,
    }
}

#[test]
fn test_create_contest_takes_next_id() {
    let mut store: Persistence = store_with_contest();
    let run: RunConfig = run_config(
        Operation::CreateContest,
        "finals",
        Task::CreateContest {
            name: "Finals".to_string(),
            duration_hours: 3,
        },
    );

    let outcome: Outcome =
        execute(&run, &mut store, &RecordingNotifier::default(), created_at()).expect("create");

    match outcome {
        Outcome::ContestCreated(ContestCreation::Created(contest)) => {
            assert_eq!(contest.contest_id, CONTEST_ID + 1);
            assert_eq!(contest.short_name, "finals");
            assert_eq!(contest.name, "Finals");
        }
        other => panic!("expected a created contest, got {other:?}"),
    }
    assert!(store.email_index_verified());

    let again: Outcome =
        execute(&run, &mut store, &RecordingNotifier::default(), created_at()).expect("create");
    assert!(matches!(
        again,
        Outcome::ContestCreated(ContestCreation::AlreadyExists(_))
    ));
}

#[test]
fn test_create_contest_rejects_invalid_short_name() {
    let mut store: Persistence = store_with_contest();
    let run: RunConfig = run_config(
        Operation::CreateContest,
        "two words",
        Task::CreateContest {
            name: "Finals".to_string(),
            duration_hours: 3,
        },
    );

    let result = execute(&run, &mut store, &RecordingNotifier::default(), created_at());

    assert!(matches!(result, Err(OpsError::Domain(_))));
}

#[test]
fn test_delete_contest_removes_every_registration() {
    let mut store: Persistence = store_with_contest();
    for address in ["a@x.com", "b@x.com", "c@x.com"] {
        store
            .register(&Email::parse(address).expect("email"), CONTEST_ID)
            .expect("register");
    }
    let run: RunConfig = run_config(
        Operation::DeleteContest,
        CONTEST_SHORT_NAME,
        Task::DeleteContest,
    );

    let outcome: Outcome =
        execute(&run, &mut store, &RecordingNotifier::default(), created_at()).expect("teardown");

    match outcome {
        Outcome::ContestDeleted(teardown) => {
            assert_eq!(teardown.contest_id, CONTEST_ID);
            assert_eq!(teardown.removed, vec![1, 2, 3]);
            assert!(teardown.failed.is_empty());
        }
        other => panic!("expected a teardown, got {other:?}"),
    }
    assert!(matches!(
        store.resolve_contest(CONTEST_SHORT_NAME),
        Err(PersistenceError::ContestNotFound(_))
    ));
}

#[test]
fn test_show_results_writes_header_for_empty_scoreboard() {
    let dir = tempfile::tempdir().expect("tempdir");
    let results: PathBuf = dir.path().join("results.tsv");
    let mut store: Persistence = store_with_contest();
    let run: RunConfig = run_config(
        Operation::ShowResults,
        CONTEST_SHORT_NAME,
        Task::ShowResults {
            results_file: results.clone(),
        },
    );

    let outcome: Outcome =
        execute(&run, &mut store, &RecordingNotifier::default(), created_at()).expect("export");

    assert!(matches!(outcome, Outcome::ResultsExported { rows: 0, .. }));
    assert_eq!(
        read_tsv(&results),
        vec![vec![
            "email",
            "username",
            "userid",
            "contestid",
            "points",
            "totaltime"
        ]]
    );
}

#[test]
fn test_results_file_rows_follow_standings_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let results: PathBuf = dir.path().join("results.tsv");
    let standings: Vec<Standing> = vec![
        Standing {
            email: "c@x.com".to_string(),
            username: "user3".to_string(),
            user_id: 3,
            contest_id: CONTEST_ID,
            points: 5,
            total_time: 150,
        },
        Standing {
            email: "a@x.com".to_string(),
            username: "user1".to_string(),
            user_id: 1,
            contest_id: CONTEST_ID,
            points: 3,
            total_time: 100,
        },
    ];

    write_results(&results, &standings).expect("write results");
    write_results(&results, &standings[..1]).expect("append results");

    let rows: Vec<Vec<String>> = read_tsv(&results);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1], vec!["c@x.com", "user3", "3", "5", "5", "150"]);
    assert_eq!(rows[2], vec!["a@x.com", "user1", "1", "5", "3", "100"]);
    assert_eq!(rows[3][0], "email");
}

#[test]
fn test_unknown_contest_results_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store: Persistence = store_with_contest();
    let run: RunConfig = run_config(
        Operation::ShowResults,
        "missing",
        Task::ShowResults {
            results_file: dir.path().join("results.tsv"),
        },
    );

    let result = execute(&run, &mut store, &RecordingNotifier::default(), created_at());

    assert!(matches!(
        result,
        Err(OpsError::Persistence(PersistenceError::ContestNotFound(_)))
    ));
    assert!(!dir.path().join("results.tsv").exists());
}
