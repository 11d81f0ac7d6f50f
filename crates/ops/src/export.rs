// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use contestreg_domain::Standing;
use std::path::Path;

use crate::error::OpsError;
use crate::tsv::TsvAppender;

pub const RESULTS_HEADER: [&str; 6] = [
    "email",
    "username",
    "userid",
    "contestid",
    "points",
    "totaltime",
];

/// Appends ranked standings to `path`, header first.
///
/// # Errors
///
/// Returns `OpsError::Open` or `OpsError::Write`.
pub fn write_results(path: &Path, standings: &[Standing]) -> Result<(), OpsError> {
    let mut out: TsvAppender = TsvAppender::open(path, &RESULTS_HEADER)?;
    for standing in standings {
        out.write_row([
            standing.email.clone(),
            standing.username.clone(),
            standing.user_id.to_string(),
            standing.contest_id.to_string(),
            standing.points.to_string(),
            standing.total_time.to_string(),
        ])?;
    }
    Ok(())
}
