// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked team in a contest results export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub email: String,
    pub username: String,
    pub user_id: i32,
    pub contest_id: i32,
    pub points: i32,
    /// Total elapsed time including penalties, in minutes.
    pub total_time: i64,
}

/// Orders standings by points descending, then total time ascending.
///
/// The sort is stable, so teams tied on both keys keep their input order.
pub fn rank_standings(standings: &mut [Standing]) {
    standings.sort_by(|a, b| match b.points.cmp(&a.points) {
        Ordering::Equal => a.total_time.cmp(&b.total_time),
        other => other,
    });
}
