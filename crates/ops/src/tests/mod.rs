// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod config_tests;
mod execute_tests;

use chrono::{DateTime, Utc};
use contestreg_domain::{Contest, IssuedCredentials, NewContest};
use contestreg_persistence::Persistence;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::notifier::{NotifyError, WelcomeNotifier};

/// 2026-01-01T00:00:00Z.
pub const CREATED_AT: i64 = 1_767_225_600;

pub const CONTEST_ID: i32 = 5;
pub const CONTEST_SHORT_NAME: &str = "demo";

pub fn created_at() -> DateTime<Utc> {
    DateTime::from_timestamp(CREATED_AT, 0).expect("valid timestamp")
}

pub fn test_contest(short_name: &str) -> NewContest {
    NewContest::new("Practice Round", short_name, 2, created_at(), chrono_tz::Asia::Kolkata)
        .expect("valid contest")
}

/// An in-memory store holding contest `CONTEST_ID` (`CONTEST_SHORT_NAME`).
pub fn store_with_contest() -> Persistence {
    let mut store: Persistence = Persistence::new_in_memory().expect("in-memory store");
    store
        .seed_contest(CONTEST_ID, &test_contest(CONTEST_SHORT_NAME))
        .expect("seed contest");
    store
}

/// Writes `contents` to `name` inside `dir` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, contents).expect("write test file");
    path
}

/// Reads a TSV file into rows of fields.
pub fn read_tsv(path: &Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .expect("read tsv")
        .lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

/// Captures every welcome email instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<(String, String, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    /// `(email, username, secret)` of every attempted delivery.
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.borrow().clone()
    }
}

impl WelcomeNotifier for RecordingNotifier {
    fn send_welcome(
        &self,
        credentials: &IssuedCredentials,
        _contest: &Contest,
    ) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push((
            credentials.email.to_string(),
            credentials.username.clone(),
            credentials.secret.expose().to_string(),
        ));
        if self.fail {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}
