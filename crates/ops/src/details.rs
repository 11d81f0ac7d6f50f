// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use contestreg_domain::IssuedCredentials;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::OpsError;
use crate::tsv::TsvAppender;

pub const DETAILS_HEADER: [&str; 4] = ["email", "username", "password", "teamid"];

/// Returns the details file that accompanies `users_file` (`<file>.details`).
#[must_use]
pub fn details_path(users_file: &Path) -> PathBuf {
    let mut name: OsString = users_file.as_os_str().to_os_string();
    name.push(".details");
    PathBuf::from(name)
}

/// Record of the credentials handed out during a batch run.
pub struct DetailsWriter {
    out: TsvAppender,
}

impl DetailsWriter {
    /// Opens the details file for `users_file` and writes the header.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::Open` or `OpsError::Write`.
    pub fn open(users_file: &Path) -> Result<Self, OpsError> {
        let out: TsvAppender = TsvAppender::open(&details_path(users_file), &DETAILS_HEADER)?;
        Ok(Self { out })
    }

    /// Appends one credentials line.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::Write`.
    pub fn record(&mut self, credentials: &IssuedCredentials) -> Result<(), OpsError> {
        let team_id: String = credentials.team_id.to_string();
        self.out.write_row([
            credentials.email.as_str(),
            credentials.username.as_str(),
            credentials.secret.expose(),
            team_id.as_str(),
        ])
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.out.path()
    }
}
